//! Ingestion of benchmark runner output for logging handler comparisons.
//!
//! The runner emits one result line per (handler, test) pair, interspersed
//! with `# ` warning lines and tool noise. [`Dataset::ingest`] scans that text
//! once and builds two mirrored indices (test → handler → record and
//! handler → test → record) plus a log of the captured warnings.

pub mod config;
pub mod dataset;
pub mod parse;
pub mod record;

pub use config::Source;
pub use dataset::{Dataset, HandlerRecords, TestRecords};
pub use record::{HandlerTag, MetricKind, TestRecord, TestTag, UnknownMetricKind};

use std::{fmt, num::ParseIntError, path::PathBuf};
use thiserror::Error;

/// Numeric fields extracted from a result line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    CpuCount,
    Iterations,
    NanosPerOp,
    MemAllocsPerOp,
    MemBytesPerOp,
    MbPerSec,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::CpuCount => "cpu count",
            Field::Iterations => "iterations",
            Field::NanosPerOp => "ns/op",
            Field::MemAllocsPerOp => "allocs/op",
            Field::MemBytesPerOp => "B/op",
            Field::MbPerSec => "MB/s",
        })
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to read benchmark output")]
    Read(#[from] std::io::Error),
    #[error("Failed to open benchmark output {path:?}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Line {line}: {field} '{value}' is not an unsigned integer")]
    InvalidInteger {
        line: usize,
        field: Field,
        value: String,
        #[source]
        source: ParseIntError,
    },
    #[error("Line {line}: {field} '{value}' is not an unsigned decimal")]
    InvalidDecimal {
        line: usize,
        field: Field,
        value: String,
    },
}

impl IngestError {
    /// the field that failed to parse, if the error stems from a malformed line
    pub fn field(&self) -> Option<Field> {
        match self {
            Self::InvalidInteger { field, .. } | Self::InvalidDecimal { field, .. } => Some(*field),
            Self::Read(_) | Self::Open { .. } => None,
        }
    }

    /// the 1-based line number of the malformed line
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::InvalidInteger { line, .. } | Self::InvalidDecimal { line, .. } => Some(*line),
            Self::Read(_) | Self::Open { .. } => None,
        }
    }
}
