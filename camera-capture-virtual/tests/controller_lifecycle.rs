use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use camera_capture_core::models::camera_models::{
    DeviceSettings, PictureFormat, RecorderEncoding,
};
use camera_capture_core::{
    BitmapCallback, CameraEvent, CaptureController, FocusMode, PreviewState, QualityTier,
    RecordState, Rotation, Size, SurfaceHandle, UsageError,
};
use camera_capture_virtual::{CallJournal, HostCall, VirtualCameraHost, VirtualCameraSpec};
use image::DynamicImage;

const SURFACE: SurfaceHandle = SurfaceHandle(1);

type Deliveries = Rc<RefCell<Vec<Option<(u32, u32)>>>>;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn controller(host: VirtualCameraHost) -> (CaptureController<VirtualCameraHost>, CallJournal) {
    init_logging();
    let journal = host.journal();
    let mut camera = CaptureController::new(host);
    camera.init(SURFACE);
    (camera, journal)
}

fn surface_ready(camera: &mut CaptureController<VirtualCameraHost>) {
    camera.event_sender().post(CameraEvent::SurfaceCreated(SURFACE));
    camera.dispatch_pending();
}

/// Controller with a ready surface and preview running.
fn previewing(host: VirtualCameraHost) -> (CaptureController<VirtualCameraHost>, CallJournal) {
    let (mut camera, journal) = controller(host);
    surface_ready(&mut camera);
    camera.start_preview();
    assert_eq!(camera.preview_state(), PreviewState::Active);
    (camera, journal)
}

fn sink() -> (BitmapCallback, Deliveries) {
    let seen: Deliveries = Rc::new(RefCell::new(Vec::new()));
    let inner = Rc::clone(&seen);
    let callback: BitmapCallback = Box::new(move |bmp: Option<DynamicImage>| {
        inner.borrow_mut().push(bmp.map(|b| (b.width(), b.height())));
    });
    (callback, seen)
}

fn host_with(configure: impl FnOnce(&mut VirtualCameraSpec)) -> VirtualCameraHost {
    let mut spec = VirtualCameraSpec::default();
    configure(&mut spec);
    VirtualCameraHost::single(spec)
}

fn calls_after(journal: &CallJournal, call: &HostCall) -> Vec<HostCall> {
    let calls = journal.calls();
    let start = calls.iter().position(|c| c == call).expect("call not found");
    calls[start + 1..].to_vec()
}

fn make_read_only(path: &Path) {
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_readonly(true);
    fs::set_permissions(path, perms).unwrap();
}

// --- Configuration ---

#[test]
fn invalid_configuration_is_rejected_synchronously() {
    let (mut camera, _) = controller(VirtualCameraHost::default());

    assert_eq!(
        camera.set_max_picture_size(0, 10),
        Err(UsageError::NonPositiveDimensions { width: 0, height: 10 })
    );
    assert_eq!(camera.set_rotation_angle(45), Err(UsageError::InvalidRotation(45)));
    assert!(camera.set_max_video_size(10, 0).is_err());
    assert!(camera.set_max_preview_size(640, 480).is_ok());
    assert!(camera.set_rotation_angle(90).is_ok());

    assert_eq!(camera.configuration().max_picture, Size::new(32767, 32767));
    assert_eq!(camera.configuration().max_preview, Size::new(640, 480));
    assert_eq!(camera.configuration().rotation, Rotation::Deg90);
}

#[test]
fn camera_index_out_of_range_is_ignored() {
    let host =
        VirtualCameraHost::new(vec![VirtualCameraSpec::default(), VirtualCameraSpec::default()]);
    let (mut camera, _) = controller(host);

    assert_eq!(camera.set_camera_index(1), 1);
    assert_eq!(camera.set_camera_index(5), 1);
}

// --- Preview ---

#[test]
fn preview_waits_for_surface() {
    let (mut camera, journal) = controller(VirtualCameraHost::default());

    camera.start_preview();
    assert_eq!(camera.preview_state(), PreviewState::Requested);
    assert!(!journal.contains(&HostCall::Open(0)));

    surface_ready(&mut camera);

    assert_eq!(camera.preview_state(), PreviewState::Active);
    assert_eq!(journal.count(&HostCall::Open(0)), 1);
    assert!(journal.contains(&HostCall::SetPreviewDisplay(SURFACE)));
    assert!(journal.contains(&HostCall::StartPreview));
    // 720p profile matches a preview size exactly.
    assert_eq!(camera.preview_size(), Some(Size::new(1280, 720)));
    assert_eq!(camera.picture_size(), Some(Size::new(1024, 768)));
    assert_eq!(camera.encoder_profile().map(|p| p.tier), Some(QualityTier::P720));
}

#[test]
fn start_preview_is_idempotent() {
    let (mut camera, journal) = previewing(VirtualCameraHost::default());

    camera.start_preview();

    assert_eq!(journal.count(&HostCall::Open(0)), 1);
}

#[test]
fn stop_preview_cancels_deferred_start() {
    let (mut camera, journal) = controller(VirtualCameraHost::default());

    camera.start_preview();
    camera.stop_preview();
    surface_ready(&mut camera);

    assert_eq!(camera.preview_state(), PreviewState::Idle);
    assert!(journal.is_empty());
}

#[test]
fn stop_preview_twice_touches_device_once() {
    let (mut camera, journal) = previewing(VirtualCameraHost::default());

    camera.stop_preview();
    let after_first = journal.len();
    camera.stop_preview();

    assert_eq!(journal.len(), after_first);
    assert_eq!(journal.count(&HostCall::Release), 1);
    assert_eq!(camera.preview_state(), PreviewState::Idle);
}

#[test]
fn quarter_rotation_swaps_reported_preview_size() {
    let (mut camera, journal) = controller(VirtualCameraHost::default());
    camera.set_rotation_angle(90).unwrap();
    surface_ready(&mut camera);
    camera.start_preview();

    assert_eq!(camera.preview_size(), Some(Size::new(720, 1280)));
    assert!(journal.contains(&HostCall::ApplySettings(DeviceSettings {
        preview_size: Some(Size::new(1280, 720)),
        picture_size: Some(Size::new(1024, 768)),
        focus_mode: Some(FocusMode::Auto),
        rotation: Rotation::Deg90,
        picture_format: PictureFormat::Jpeg,
    })));
    assert!(journal.contains(&HostCall::DisplayOrientation(Rotation::Deg90)));
}

#[test]
fn open_failure_clears_preview_intent() {
    let host = host_with(|spec| spec.fail_open = true);
    let (mut camera, journal) = controller(host);
    surface_ready(&mut camera);

    camera.start_preview();

    assert_eq!(camera.preview_state(), PreviewState::Idle);
    assert_eq!(journal.calls(), vec![HostCall::Open(0)]);
}

#[test]
fn capability_query_failure_clears_preview_intent() {
    let host = host_with(|spec| spec.fail_capabilities = true);
    let (mut camera, journal) = controller(host);
    surface_ready(&mut camera);

    camera.start_preview();

    assert_eq!(camera.preview_state(), PreviewState::Idle);
    assert_eq!(journal.calls(), vec![HostCall::Open(0), HostCall::Release]);
}

#[test]
fn surface_destroyed_releases_everything() {
    let dir = tempfile::tempdir().unwrap();
    let (mut camera, journal) = previewing(VirtualCameraHost::default());
    camera.set_output_video_file(Some(dir.path().join("clip.mp4")));
    camera.start_recording();
    camera.dispatch_pending();
    assert_eq!(camera.record_state(), RecordState::Recording);

    camera.event_sender().post(CameraEvent::SurfaceDestroyed(SURFACE));
    camera.dispatch_pending();

    assert_eq!(camera.preview_state(), PreviewState::Idle);
    assert!(!camera.is_recording());
    assert!(journal.contains(&HostCall::RecorderRelease));
    assert!(journal.contains(&HostCall::Release));

    // The old surface is no longer bound.
    camera.start_preview();
    surface_ready(&mut camera);
    assert_eq!(camera.preview_state(), PreviewState::Requested);
}

#[test]
fn unbound_surface_events_are_ignored() {
    let (mut camera, journal) = controller(VirtualCameraHost::default());
    camera.start_preview();

    camera.event_sender().post(CameraEvent::SurfaceCreated(SurfaceHandle(99)));
    camera.dispatch_pending();

    assert_eq!(camera.preview_state(), PreviewState::Requested);
    assert!(journal.is_empty());
}

#[test]
fn dropping_the_controller_releases_the_device() {
    let (camera, journal) = previewing(VirtualCameraHost::default());
    drop(camera);
    assert_eq!(journal.count(&HostCall::Release), 1);
}

// --- Still capture ---

#[test]
fn take_picture_without_preview_is_silent() {
    let (mut camera, journal) = controller(VirtualCameraHost::default());
    let (callback, seen) = sink();

    camera.take_picture(None, Some(callback));
    camera.dispatch_pending();

    assert!(seen.borrow().is_empty());
    assert!(!camera.is_capture_pending());
    assert!(journal.is_empty());
}

#[test]
fn second_take_picture_while_pending_is_dropped() {
    let (mut camera, journal) = previewing(VirtualCameraHost::default());
    let (first, first_seen) = sink();
    let (second, second_seen) = sink();

    camera.take_picture(None, Some(first));
    camera.take_picture(None, Some(second));
    camera.dispatch_pending();

    assert_eq!(*first_seen.borrow(), vec![Some((1024, 768))]);
    assert!(second_seen.borrow().is_empty());
    assert_eq!(journal.count(&HostCall::AutoFocus), 1);
    assert_eq!(journal.count(&HostCall::TakePicture), 1);
    assert!(!camera.is_capture_pending());
}

#[test]
fn capture_restarts_preview_stream() {
    let (mut camera, journal) = previewing(VirtualCameraHost::default());
    let (callback, _) = sink();

    camera.take_picture(None, Some(callback));
    camera.dispatch_pending();

    let after_capture = calls_after(&journal, &HostCall::TakePicture);
    assert_eq!(after_capture, vec![HostCall::StartPreview]);
}

#[test]
fn full_cycle_writes_picture_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shot.jpg");
    let (mut camera, _) = controller(VirtualCameraHost::default());
    camera.start_preview();
    surface_ready(&mut camera);
    assert!(camera.is_preview_active());

    let (callback, seen) = sink();
    camera.take_picture(Some(path.clone()), Some(callback));
    camera.dispatch_pending();

    assert_eq!(*seen.borrow(), vec![Some((1024, 768))]);
    assert!(path.exists());
    let saved = image::open(&path).unwrap();
    assert_eq!((saved.width(), saved.height()), (1024, 768));
}

#[test]
fn existing_destination_is_not_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shot.jpg");
    fs::write(&path, b"keep").unwrap();
    let (mut camera, _) = previewing(VirtualCameraHost::default());

    let (callback, seen) = sink();
    camera.take_picture(Some(path.clone()), Some(callback));
    camera.dispatch_pending();

    assert_eq!(seen.borrow().len(), 1);
    assert_eq!(fs::read(&path).unwrap(), b"keep");
}

#[test]
fn take_picture_to_file_without_callback() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("IMG_0001.jpg");
    let (mut camera, _) = previewing(VirtualCameraHost::default());

    camera.take_picture_to(&path);
    camera.dispatch_pending();

    assert!(path.exists());
}

#[test]
fn rejected_autofocus_still_captures_and_is_not_retried() {
    let host = host_with(|spec| spec.reject_auto_focus = true);
    let (mut camera, journal) = previewing(host);

    for _ in 0..2 {
        let (callback, seen) = sink();
        camera.take_picture(None, Some(callback));
        camera.dispatch_pending();
        assert_eq!(*seen.borrow(), vec![Some((1024, 768))]);
    }

    assert_eq!(journal.count(&HostCall::AutoFocus), 1);
    assert_eq!(journal.count(&HostCall::TakePicture), 2);
}

#[test]
fn continuous_focus_captures_without_trigger() {
    let host = host_with(|spec| {
        spec.capabilities.focus_modes = Some(vec![FocusMode::Auto, FocusMode::ContinuousPicture]);
    });
    let (mut camera, journal) = previewing(host);
    let (callback, seen) = sink();

    camera.take_picture(None, Some(callback));
    camera.dispatch_pending();

    assert_eq!(seen.borrow().len(), 1);
    assert!(!journal.contains(&HostCall::AutoFocus));
}

#[test]
fn missed_focus_still_captures() {
    let host = host_with(|spec| spec.auto_focus_misses = true);
    let (mut camera, journal) = previewing(host);
    let (callback, seen) = sink();

    camera.take_picture(None, Some(callback));
    camera.dispatch_pending();

    assert_eq!(*seen.borrow(), vec![Some((1024, 768))]);
    assert_eq!(journal.count(&HostCall::AutoFocus), 1);
}

#[test]
fn picture_from_closed_session_is_discarded() {
    let host = host_with(|spec| {
        spec.capabilities.focus_modes = Some(vec![FocusMode::ContinuousPicture]);
    });
    let (mut camera, _) = previewing(host);

    // The first device's JPEG is still queued when the session ends.
    let (first, first_seen) = sink();
    camera.take_picture(None, Some(first));
    camera.stop_preview();
    assert_eq!(*first_seen.borrow(), vec![None]);

    camera.set_max_picture_size(320, 240).unwrap();
    camera.start_preview();
    assert!(camera.is_preview_active());
    let (second, second_seen) = sink();
    camera.take_picture(None, Some(second));
    camera.dispatch_pending();

    assert_eq!(*first_seen.borrow(), vec![None]);
    assert_eq!(*second_seen.borrow(), vec![Some((320, 240))]);
    assert!(!camera.is_capture_pending());
}

#[test]
fn capture_waits_for_its_own_focus_pass() {
    let dir = tempfile::tempdir().unwrap();
    let (mut camera, journal) = previewing(VirtualCameraHost::default());
    camera.set_output_video_file(Some(dir.path().join("clip.mp4")));

    // Recording asks for focus; the picture stops it and asks again.
    camera.start_recording();
    let (callback, seen) = sink();
    camera.take_picture(None, Some(callback));
    assert_eq!(journal.count(&HostCall::AutoFocus), 2);

    camera.handle_event(CameraEvent::AutoFocusDone { success: true });
    assert!(!journal.contains(&HostCall::TakePicture));
    assert!(camera.is_capture_pending());

    camera.dispatch_pending();

    assert_eq!(journal.count(&HostCall::TakePicture), 1);
    assert_eq!(*seen.borrow(), vec![Some((1024, 768))]);
}

#[test]
fn capture_failure_delivers_none_once() {
    let host = host_with(|spec| spec.fail_capture = true);
    let (mut camera, _) = previewing(host);
    let (callback, seen) = sink();

    camera.take_picture(None, Some(callback));
    camera.dispatch_pending();

    assert_eq!(*seen.borrow(), vec![None]);
    assert!(!camera.is_capture_pending());
}

#[test]
fn stop_preview_resolves_pending_capture() {
    let (mut camera, _) = previewing(VirtualCameraHost::default());
    let (callback, seen) = sink();

    camera.take_picture(None, Some(callback));
    assert!(camera.is_capture_pending());
    camera.stop_preview();
    camera.dispatch_pending();

    assert_eq!(*seen.borrow(), vec![None]);
}

// --- Recording ---

#[test]
fn recording_without_output_file_is_noop() {
    let (mut camera, journal) = previewing(VirtualCameraHost::default());

    camera.start_recording();

    assert!(!camera.is_recording());
    assert!(!journal.contains(&HostCall::Unlock));
}

#[test]
fn recording_to_read_only_file_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.mp4");
    fs::write(&path, b"").unwrap();
    make_read_only(&path);
    let (mut camera, journal) = previewing(VirtualCameraHost::default());

    camera.set_output_video_file(Some(path));
    camera.start_recording();

    assert!(!camera.is_recording());
    assert!(!journal.contains(&HostCall::Unlock));
}

#[test]
fn recording_full_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.mp4");
    let (mut camera, journal) = previewing(VirtualCameraHost::default());
    camera.set_output_video_file(Some(path.clone()));

    camera.start_recording();
    assert_eq!(camera.record_state(), RecordState::Focusing);
    assert!(camera.is_recording());

    camera.dispatch_pending();
    assert_eq!(camera.record_state(), RecordState::Recording);

    let configured = journal.calls().into_iter().find_map(|c| match c {
        HostCall::RecorderConfigure(config) => Some(config),
        _ => None,
    });
    let configured = configured.expect("recorder was not configured");
    assert!(matches!(
        configured.encoding,
        RecorderEncoding::Profile(ref p) if p.tier == QualityTier::P720
    ));
    assert_eq!(configured.output_file, path);
    assert_eq!(configured.video_size, None);
    assert_eq!(configured.orientation_hint, Rotation::Deg0);
    assert_eq!(configured.preview_display, SURFACE);
    assert!(journal.position(&HostCall::Unlock) < journal.position(&HostCall::RecorderPrepare));

    camera.stop_recording();

    assert!(!camera.is_recording());
    assert_eq!(
        calls_after(&journal, &HostCall::RecorderStart),
        vec![HostCall::RecorderStop, HostCall::RecorderRelease, HostCall::Reconnect]
    );
    let written = fs::read(&path).unwrap();
    let frame = image::load_from_memory(&written).unwrap();
    assert_eq!((frame.width(), frame.height()), (1280, 720));
}

#[test]
fn recording_waits_for_preview() {
    let dir = tempfile::tempdir().unwrap();
    let (mut camera, journal) = controller(VirtualCameraHost::default());
    camera.set_output_video_file(Some(dir.path().join("clip.mp4")));

    camera.start_preview();
    camera.start_recording();
    assert_eq!(camera.record_state(), RecordState::Requested);
    assert!(!journal.contains(&HostCall::Unlock));

    surface_ready(&mut camera);

    assert_eq!(camera.preview_state(), PreviewState::Active);
    assert_eq!(camera.record_state(), RecordState::Recording);
}

#[test]
fn prepare_failure_rolls_back() {
    let dir = tempfile::tempdir().unwrap();
    let host = host_with(|spec| spec.fail_prepare = true);
    let (mut camera, journal) = previewing(host);
    camera.set_output_video_file(Some(dir.path().join("clip.mp4")));

    camera.start_recording();
    camera.dispatch_pending();

    assert!(!camera.is_recording());
    assert_eq!(
        calls_after(&journal, &HostCall::RecorderPrepare),
        vec![HostCall::RecorderRelease, HostCall::Lock]
    );
    assert!(!journal.contains(&HostCall::RecorderStart));
}

#[test]
fn missed_focus_still_records() {
    let dir = tempfile::tempdir().unwrap();
    let host = host_with(|spec| spec.auto_focus_misses = true);
    let (mut camera, _) = previewing(host);
    camera.set_output_video_file(Some(dir.path().join("clip.mp4")));

    camera.start_recording();
    camera.dispatch_pending();

    assert_eq!(camera.record_state(), RecordState::Recording);
}

#[test]
fn rejected_autofocus_starts_recording_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let host = host_with(|spec| spec.reject_auto_focus = true);
    let (mut camera, journal) = previewing(host);
    camera.set_output_video_file(Some(dir.path().join("clip.mp4")));

    camera.start_recording();

    assert_eq!(camera.record_state(), RecordState::Recording);
    assert_eq!(journal.count(&HostCall::AutoFocus), 1);
    assert!(journal.contains(&HostCall::RecorderStart));
}

#[test]
fn recorder_start_failure_rolls_back() {
    let dir = tempfile::tempdir().unwrap();
    let host = host_with(|spec| spec.fail_start = true);
    let (mut camera, journal) = previewing(host);
    camera.set_output_video_file(Some(dir.path().join("clip.mp4")));

    camera.start_recording();
    camera.dispatch_pending();

    assert!(!camera.is_recording());
    assert_eq!(
        calls_after(&journal, &HostCall::RecorderStart),
        vec![HostCall::RecorderRelease, HostCall::Reconnect]
    );
    assert!(!journal.contains(&HostCall::RecorderStop));

    // The camera is usable again for stills.
    let (callback, seen) = sink();
    camera.take_picture(None, Some(callback));
    camera.dispatch_pending();
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn take_picture_stops_recording_first() {
    let dir = tempfile::tempdir().unwrap();
    let (mut camera, journal) = previewing(VirtualCameraHost::default());
    camera.set_output_video_file(Some(dir.path().join("clip.mp4")));
    camera.start_recording();
    camera.dispatch_pending();
    assert!(camera.is_recording());

    let (callback, seen) = sink();
    camera.take_picture(None, Some(callback));
    camera.dispatch_pending();

    assert!(!camera.is_recording());
    assert!(journal.position(&HostCall::RecorderStop) < journal.position(&HostCall::TakePicture));
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn recorder_error_stops_recording() {
    let dir = tempfile::tempdir().unwrap();
    let host = host_with(|spec| spec.fail_while_recording = true);
    let (mut camera, journal) = previewing(host);
    camera.set_output_video_file(Some(dir.path().join("clip.mp4")));

    camera.start_recording();
    camera.dispatch_pending();

    assert!(!camera.is_recording());
    assert!(journal.contains(&HostCall::RecorderStop));
    assert!(journal.contains(&HostCall::Reconnect));
}

#[test]
fn samsung_restarts_preview_after_recording() {
    let dir = tempfile::tempdir().unwrap();
    let host = VirtualCameraHost::default().with_manufacturer("samsung");
    let (mut camera, journal) = previewing(host);
    camera.set_output_video_file(Some(dir.path().join("clip.mp4")));

    camera.start_recording();
    camera.dispatch_pending();
    camera.stop_recording();

    assert_eq!(
        calls_after(&journal, &HostCall::Reconnect),
        vec![HostCall::StopPreview, HostCall::StartPreview]
    );
}

#[test]
fn other_manufacturers_keep_preview_running_after_recording() {
    let dir = tempfile::tempdir().unwrap();
    let (mut camera, journal) = previewing(VirtualCameraHost::default());
    camera.set_output_video_file(Some(dir.path().join("clip.mp4")));

    camera.start_recording();
    camera.dispatch_pending();
    camera.stop_recording();

    assert!(calls_after(&journal, &HostCall::Reconnect).is_empty());
}

#[test]
fn independent_video_stream_sets_recorder_size() {
    let dir = tempfile::tempdir().unwrap();
    let host = host_with(|spec| {
        spec.capabilities.video_sizes = Some(vec![Size::new(1920, 1080), Size::new(1280, 720)]);
        spec.capabilities.preferred_preview_size_for_video = Some(Size::new(800, 480));
        spec.capabilities.focus_modes = Some(vec![FocusMode::ContinuousVideo, FocusMode::Auto]);
    });
    let (mut camera, journal) = controller(host);
    camera.set_max_video_size(1280, 720).unwrap();
    surface_ready(&mut camera);
    camera.start_preview();

    assert_eq!(camera.preview_size(), Some(Size::new(800, 480)));
    assert_eq!(camera.video_size(), Some(Size::new(1280, 720)));

    camera.set_output_video_file(Some(dir.path().join("clip.mp4")));
    camera.start_recording();

    // No explicit focus trigger: recording starts right away.
    assert_eq!(camera.record_state(), RecordState::Recording);
    assert!(!journal.contains(&HostCall::AutoFocus));
    let configured = journal.calls().into_iter().find_map(|c| match c {
        HostCall::RecorderConfigure(config) => Some(config),
        _ => None,
    });
    assert_eq!(configured.and_then(|c| c.video_size), Some(Size::new(1280, 720)));
}
