/// Planar helpers shared by the grid geometry code
///
/// Geographic points are treated as planar `DVec2` values (`x` = longitude,
/// `y` = latitude) wherever the grid code compares positions in degree space.
use glam::DVec2;

/// Assert that two floating point values are within an absolute tolerance
///
/// Works like `assert_eq!` but for measured quantities (metres, degrees).
/// An optional trailing format string is appended to the panic message.
#[macro_export]
macro_rules! assert_close {
    ($actual:expr, $expected:expr, $tolerance:expr) => {
        {
            let actual_val: f64 = $actual;
            let expected_val: f64 = $expected;
            let tolerance: f64 = $tolerance;
            let diff = (actual_val - expected_val).abs();

            if !(diff <= tolerance) {
                panic!(
                    "assertion failed: |actual - expected| = {:e} > {:e}\n  actual: {:?},\n  expected: {:?}",
                    diff, tolerance, actual_val, expected_val
                );
            }
        }
    };
    ($actual:expr, $expected:expr, $tolerance:expr, $($arg:tt)+) => {
        {
            let actual_val: f64 = $actual;
            let expected_val: f64 = $expected;
            let tolerance: f64 = $tolerance;
            let diff = (actual_val - expected_val).abs();

            if !(diff <= tolerance) {
                panic!(
                    "assertion failed: |actual - expected| = {:e} > {:e}: {}\n  actual: {:?},\n  expected: {:?}",
                    diff, tolerance, format_args!($($arg)+), actual_val, expected_val
                );
            }
        }
    };
}

/// Midpoint of the segment `a`-`b`
pub fn midpoint(a: DVec2, b: DVec2) -> DVec2 {
    (a + b) * 0.5
}

/// Arithmetic mean of a point set, `None` when the set is empty
///
/// # Examples
/// ```
/// use glam::DVec2;
/// use hexgrid_geomock::math_utils::mean;
///
/// let c = mean(&[DVec2::new(0.0, 0.0), DVec2::new(2.0, 4.0)]).unwrap();
/// assert_eq!(c, DVec2::new(1.0, 2.0));
/// assert!(mean(&[]).is_none());
/// ```
pub fn mean(points: &[DVec2]) -> Option<DVec2> {
    if points.is_empty() {
        return None;
    }
    let sum = points.iter().fold(DVec2::ZERO, |acc, p| acc + *p);
    Some(sum / points.len() as f64)
}

/// Perpendicular distance from `point` to the infinite line through
/// `line_start` and `line_end`
///
/// Uses the cross-product form `|d × (p - a)| / |d|`. Returns `None` when the
/// two line points coincide, since no line is defined.
///
/// # Examples
/// ```
/// use glam::DVec2;
/// use hexgrid_geomock::math_utils::perpendicular_distance;
///
/// let d = perpendicular_distance(DVec2::new(1.0, 3.0), DVec2::ZERO, DVec2::new(5.0, 0.0));
/// assert_eq!(d, Some(3.0));
/// ```
pub fn perpendicular_distance(point: DVec2, line_start: DVec2, line_end: DVec2) -> Option<f64> {
    let direction = line_end - line_start;
    let length = direction.length();
    if length <= f64::EPSILON {
        return None;
    }
    Some(direction.perp_dot(point - line_start).abs() / length)
}
