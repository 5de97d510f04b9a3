//! Polyline preparation for thick-line rendering.
//!
//! The thick-line primitive draws every consecutive pair of points as its own segment and
//! breaks visually on repeated vertices, so raw kernel polylines go through [`segmentize`]
//! before they reach the renderer.

use glamx::Vec3;

/// Default tolerance used to collapse near-duplicate points.
pub const DEFAULT_TOLERANCE: f32 = 1e-7;

#[inline]
pub fn approx_eq(a: Vec3, b: Vec3, tolerance: f32) -> bool {
    (a - b).abs().cmple(Vec3::splat(tolerance)).all()
}

/// Removes consecutive points that are equal within `tolerance` on every axis.
pub fn dedup_consecutive(points: &[Vec3], tolerance: f32) -> Vec<Vec3> {
    let mut out: Vec<Vec3> = Vec::with_capacity(points.len());
    for &point in points {
        match out.last() {
            Some(&last) if approx_eq(last, point, tolerance) => {}
            _ => out.push(point),
        }
    }
    out
}

/// True when every segment's end equals the next segment's start, i.e. the points are
/// laid out as `(a, b), (b, c), ..`.
pub fn is_segmented(points: &[Vec3], tolerance: f32) -> bool {
    if points.len() % 2 != 0 {
        return false;
    }
    (1..points.len().saturating_sub(1))
        .step_by(2)
        .all(|i| approx_eq(points[i], points[i + 1], tolerance))
}

/// Converts a polyline into explicit segment pairs.
///
/// Output holds `2 * (len - 1)` points for `len` deduplicated input points. Inputs that
/// are already in segment-pair form, or have fewer than two distinct points, are returned
/// after deduplication only.
pub fn segmentize(points: &[Vec3], tolerance: f32) -> Vec<Vec3> {
    let points = dedup_consecutive(points, tolerance);
    if points.len() < 2 || is_segmented(&points, tolerance) {
        return points;
    }

    let mut segments = Vec::with_capacity(2 * (points.len() - 1));
    for pair in points.windows(2) {
        segments.push(pair[0]);
        segments.push(pair[1]);
    }
    segments
}

/// Groups segmentized output into `[start, end]` pairs. A trailing odd point is dropped.
pub fn segment_pairs(segmented: &[Vec3]) -> Vec<[Vec3; 2]> {
    segmented
        .chunks_exact(2)
        .map(|pair| [pair[0], pair[1]])
        .collect()
}

/// Appends the first point if the polyline does not already end where it starts.
pub fn close_polyline(points: &[Vec3], tolerance: f32) -> Vec<Vec3> {
    let mut closed = points.to_vec();
    if let (Some(&first), Some(&last)) = (points.first(), points.last())
        && points.len() > 2
        && !approx_eq(first, last, tolerance)
    {
        closed.push(first);
    }
    closed
}
