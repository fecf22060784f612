use greenread_core::Vec2;

/// Segments shorter than this (squared, m^2) count as zero-length.
const MIN_SEGMENT_LEN_SQ: f64 = 1e-24;

/// Exact hole-capture test for one integration step.
///
/// Projects `centre` onto the segment `p0 -> p1` (clamped to the segment, not
/// the infinite line) and reports that closest point when it lies within
/// `radius`. Both endpoints may be outside the circle while the segment
/// between them still clips it, which sampling the endpoints alone misses.
pub fn segment_circle_hit(p0: Vec2, p1: Vec2, centre: Vec2, radius: f64) -> Option<Vec2> {
    let seg = p1 - p0;
    let len_sq = seg.length_squared();
    if len_sq < MIN_SEGMENT_LEN_SQ {
        return None;
    }

    let t = ((centre - p0).dot(seg) / len_sq).clamp(0.0, 1.0);
    let closest = p0 + seg * t;

    if (closest - centre).length_squared() <= radius * radius {
        Some(closest)
    } else {
        None
    }
}
