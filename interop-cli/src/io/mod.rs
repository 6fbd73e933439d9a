//! Report output.
//!
//! - `report.json` through the [`Filesystem`](interop_fs::Filesystem) trait
//! - the plain-text summary printed at the end of a run

pub mod report_writer;
pub mod summary;

pub use report_writer::{
    CaseEntry, EntityEntry, Report, ReportWriter, ReportWriterError, Totals, REPORT_FILE_NAME,
};
pub use summary::render_summary;
