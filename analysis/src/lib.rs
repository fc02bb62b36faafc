//! Reports over an ingested [`Dataset`](benchlog_ingest::Dataset).

pub mod summary;
pub mod table;

pub use summary::{ReportError, Summary};
pub use table::{render_table, render_warnings, Axis, UnknownAxis};
