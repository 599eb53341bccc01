//! Aircraft conceptual sizing.
//!
//! The component crates are re-exported here so front-ends only depend on
//! this facade: the atmosphere and units in [`sizing_core`], catalogs and
//! case files in [`sizing_config`], the mission weight estimate in
//! [`sizing_weight`], takeoff charts in [`sizing_takeoff`], the matching
//! chart in [`sizing_constraints`], and the design point search in
//! [`sizing_optimizer`]. [`pipeline`] chains them for one design case.

pub mod error;
pub mod pipeline;

pub use error::{ErrorKind, SizingError};
pub use pipeline::{SizingReport, run_case};

pub use sizing_config;
pub use sizing_constraints;
pub use sizing_core;
pub use sizing_export;
pub use sizing_optimizer;
pub use sizing_takeoff;
pub use sizing_weight;

/// Returns the version of the library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
