pub mod totals;

pub use totals::{REGULAR_THRESHOLD_MINUTES, compute_totals};
