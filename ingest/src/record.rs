//! Measurement records and the metric kinds used to select their fields.

use serde::{Deserialize, Serialize};
use std::{borrow::Borrow, fmt, str::FromStr};
use thiserror::Error;

/// Identifier of a single benchmark scenario, e.g. `Attributes`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestTag(String);

/// Identifier of a single logging handler under test, e.g. `samber_logrus`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandlerTag(String);

macro_rules! tag_impls {
    ($tag:ident) => {
        impl $tag {
            pub fn new(tag: impl Into<String>) -> Self {
                Self(tag.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $tag {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Borrow<str> for $tag {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $tag {
            fn from(tag: &str) -> Self {
                Self(tag.to_owned())
            }
        }
    };
}

tag_impls!(TestTag);
tag_impls!(HandlerTag);

/// Measured values for one (test, handler) pair.
///
/// Gigabyte and terabyte throughput are always derived from `mb_per_sec`,
/// construct records through [`TestRecord::new`] to keep them in sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TestRecord {
    pub iterations: u64,
    pub nanos_per_op: f64,
    pub mem_bytes_per_op: u64,
    pub mem_allocs_per_op: u64,
    pub mb_per_sec: f64,
    pub gb_per_sec: f64,
    pub tb_per_sec: f64,
}

impl TestRecord {
    pub fn new(
        iterations: u64,
        nanos_per_op: f64,
        mem_allocs_per_op: u64,
        mem_bytes_per_op: u64,
        mb_per_sec: f64,
    ) -> Self {
        Self {
            iterations,
            nanos_per_op,
            mem_bytes_per_op,
            mem_allocs_per_op,
            mb_per_sec,
            gb_per_sec: mb_per_sec / 1_000.0,
            tb_per_sec: mb_per_sec / 1_000_000.0,
        }
    }

    /// a record without any iterations carries no measurement
    pub fn is_empty(&self) -> bool {
        self.iterations == 0
    }

    /// return the selected field widened to f64
    pub fn value(&self, kind: MetricKind) -> f64 {
        match kind {
            MetricKind::Iterations => self.iterations as f64,
            MetricKind::NanosPerOp => self.nanos_per_op,
            MetricKind::MemAllocsPerOp => self.mem_allocs_per_op as f64,
            MetricKind::MemBytesPerOp => self.mem_bytes_per_op as f64,
            MetricKind::MbPerSec => self.mb_per_sec,
            MetricKind::GbPerSec => self.gb_per_sec,
            MetricKind::TbPerSec => self.tb_per_sec,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetricKind {
    Iterations,
    NanosPerOp,
    MemAllocsPerOp,
    MemBytesPerOp,
    MbPerSec,
    GbPerSec,
    TbPerSec,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown metric kind '{0}'")]
pub struct UnknownMetricKind(pub String);

impl MetricKind {
    pub const ALL: [MetricKind; 7] = [
        MetricKind::Iterations,
        MetricKind::NanosPerOp,
        MetricKind::MemAllocsPerOp,
        MetricKind::MemBytesPerOp,
        MetricKind::MbPerSec,
        MetricKind::GbPerSec,
        MetricKind::TbPerSec,
    ];

    /// label used for table headers
    pub fn short_label(self) -> &'static str {
        match self {
            MetricKind::Iterations => "Runs",
            MetricKind::NanosPerOp => "ns/op",
            MetricKind::MemAllocsPerOp => "allocs/op",
            MetricKind::MemBytesPerOp => "B/op",
            MetricKind::MbPerSec => "MB/s",
            MetricKind::GbPerSec => "GB/s",
            MetricKind::TbPerSec => "TB/s",
        }
    }

    /// label used for descriptive text
    pub fn long_label(self) -> &'static str {
        match self {
            MetricKind::Iterations => "Test Iterations",
            MetricKind::NanosPerOp => "Nanoseconds per Operation",
            MetricKind::MemAllocsPerOp => "Allocations per Operation",
            MetricKind::MemBytesPerOp => "Bytes Allocated per Operation",
            MetricKind::MbPerSec => "Megabytes per Second",
            MetricKind::GbPerSec => "Gigabytes per Second",
            MetricKind::TbPerSec => "Terabytes per Second",
        }
    }

    fn name(self) -> &'static str {
        match self {
            MetricKind::Iterations => "iterations",
            MetricKind::NanosPerOp => "nanos-per-op",
            MetricKind::MemAllocsPerOp => "mem-allocs-per-op",
            MetricKind::MemBytesPerOp => "mem-bytes-per-op",
            MetricKind::MbPerSec => "mb-per-sec",
            MetricKind::GbPerSec => "gb-per-sec",
            MetricKind::TbPerSec => "tb-per-sec",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_label())
    }
}

impl FromStr for MetricKind {
    type Err = UnknownMetricKind;

    /// accepts either the short label (`ns/op`) or the kebab-case name (`nanos-per-op`)
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let needle = input.trim();

        MetricKind::ALL
            .into_iter()
            .find(|kind| {
                kind.short_label().eq_ignore_ascii_case(needle)
                    || kind.name().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| UnknownMetricKind(input.to_owned()))
    }
}
