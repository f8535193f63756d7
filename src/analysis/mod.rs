//! Analysis modules.
//!
//! Pure functions over stage records: per-client aggregation, thresholds
//! and alerts, cross-client comparisons and the stage catalogue.

pub mod aggregator;
pub mod portfolio;
pub mod stages;
pub mod thresholds;

pub use aggregator::*;
pub use portfolio::*;
pub use stages::*;
pub use thresholds::*;
