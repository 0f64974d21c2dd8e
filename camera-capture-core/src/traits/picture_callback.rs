use image::DynamicImage;

/// Receives the decoded picture of one `take_picture` request.
///
/// `None` when the device returned no data or it could not be decoded.
/// Invoked at most once by construction.
pub type BitmapCallback = Box<dyn FnOnce(Option<DynamicImage>) + 'static>;
