//! `invgrid-recon`: reporting-table extraction and reconciliation engine.
//!
//! Pure engine crate: receives tables through a [`WorkbookSource`], returns
//! country × year matrices plus diagnostics. No CLI or filesystem access.

pub mod assemble;
pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod extract;
pub mod groups;
pub mod layout;
pub mod locator;
pub mod model;
pub mod pattern;
pub mod schedule;
pub mod table;
pub mod transition;

pub use assemble::{LongFormTable, MetricKey, MetricMatrix};
pub use config::ReconConfig;
pub use engine::{
    resolve_sheet_name, run_hwp, run_land_transition, LoadedTable, RunOutput, WorkbookSource,
};
pub use error::{ReconError, SourceError};
pub use groups::CountryGroup;
pub use model::{Diagnostic, Issue, RunSummary, Scalar, YearRange};
pub use schedule::WorkbookRef;
pub use table::{Cell, Table, TableShape};
