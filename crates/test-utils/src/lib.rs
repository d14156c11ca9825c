//! Fixtures and assertions shared by the workspace's tests.
//!
//! ```ignore
//! use test_utils::{capabilities, layers};
//!
//! let ids = ogc_protocol::wms::get_layer_ids(capabilities::WMS_1_3_0);
//! assert_eq!(ids, layers::WMS_IDS);
//! ```

pub mod fixtures;
pub mod paths;

pub use fixtures::*;
pub use paths::*;

/// Path of a captured capabilities document, or return early from the test.
///
/// Captured documents come from live servers and are not checked in; point
/// `TEST_DATA_DIR` at a directory holding them.
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {{
        match $crate::find_test_file($name) {
            Some(path) => path,
            None => {
                eprintln!(
                    "SKIPPED: capabilities document '{}' not found (set TEST_DATA_DIR)",
                    $name
                );
                return;
            }
        }
    }};
}

/// `|left - right| <= epsilon`, compared as `f64`.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// [`assert_approx_eq!`] over `[min_x, min_y, max_x, max_y]` arrays.
#[macro_export]
macro_rules! assert_bbox_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: [f64; 4] = $left;
        let right: [f64; 4] = $right;
        for i in 0..4 {
            $crate::assert_approx_eq!(left[i], right[i], $epsilon);
        }
    }};
}
