use crate::models::size::Size;

/// Pick the supported size that best fills a `max_width` x `max_height` budget.
///
/// Returns the largest-area size not exceeding the budget's area (first one
/// wins on ties). When every size is larger than the budget, falls back to
/// the smallest one instead of failing. `None` only for an empty list.
pub fn select_best(max_width: u32, max_height: u32, supported: &[Size]) -> Option<Size> {
    let budget = u64::from(max_width) * u64::from(max_height);

    let mut best: Option<Size> = None;
    let mut smallest: Option<Size> = None;

    for &size in supported {
        let area = size.area();
        if smallest.map_or(true, |s| area < s.area()) {
            smallest = Some(size);
        }
        if area <= budget && best.map_or(true, |b| area > b.area()) {
            best = Some(size);
        }
    }

    best.or(smallest)
}

/// `select_best` with the budget given as a `Size`.
pub fn select_best_within(cap: Size, supported: &[Size]) -> Option<Size> {
    select_best(cap.width, cap.height, supported)
}
