use benchlog_ingest::{Dataset, MetricKind, TestRecord};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::{fmt, iter, str::FromStr};
use thiserror::Error;

/// Identifiers listed down the first column of a table
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// one row per test, one column per handler
    #[default]
    Tests,
    /// one row per handler, one column per test
    Handlers,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown table axis '{0}', expected 'tests' or 'handlers'")]
pub struct UnknownAxis(pub String);

impl FromStr for Axis {
    type Err = UnknownAxis;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_lowercase().as_str() {
            "tests" | "test" => Ok(Self::Tests),
            "handlers" | "handler" => Ok(Self::Handlers),
            _ => Err(UnknownAxis(input.to_owned())),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Tests => "tests",
            Self::Handlers => "handlers",
        })
    }
}

const MISSING: &str = "-";

fn format_value(kind: MetricKind, value: f64) -> String {
    match kind {
        MetricKind::Iterations | MetricKind::MemAllocsPerOp | MetricKind::MemBytesPerOp => {
            format!("{value:.0}")
        }
        MetricKind::NanosPerOp => format!("{value:.2}"),
        MetricKind::MbPerSec => format!("{value:.3}"),
        MetricKind::GbPerSec => format!("{value:.6}"),
        MetricKind::TbPerSec => format!("{value:.9}"),
    }
}

fn format_cell(kind: MetricKind, record: Option<&TestRecord>) -> String {
    record
        .filter(|record| !record.is_empty())
        .map(|record| format_value(kind, record.value(kind)))
        .unwrap_or_else(|| MISSING.to_owned())
}

/// Render one metric of the dataset as a plain text table.
///
/// Rows and columns follow the sorted tag order of the dataset, absent or
/// empty records print as `-`.
pub fn render_table(dataset: &Dataset, kind: MetricKind, axis: Axis) -> String {
    let (corner, columns, rows): (&str, Vec<String>, Vec<Vec<String>>) = match axis {
        Axis::Tests => (
            "Test",
            dataset
                .handler_tags()
                .iter()
                .map(|handler| dataset.handler_name(handler).to_owned())
                .collect(),
            dataset
                .test_tags()
                .iter()
                .map(|test| {
                    iter::once(dataset.test_name(test).to_owned())
                        .chain(
                            dataset
                                .handler_tags()
                                .iter()
                                .map(|handler| format_cell(kind, dataset.record(test, handler))),
                        )
                        .collect()
                })
                .collect(),
        ),
        Axis::Handlers => (
            "Handler",
            dataset
                .test_tags()
                .iter()
                .map(|test| dataset.test_name(test).to_owned())
                .collect(),
            dataset
                .handler_tags()
                .iter()
                .map(|handler| {
                    iter::once(dataset.handler_name(handler).to_owned())
                        .chain(
                            dataset
                                .test_tags()
                                .iter()
                                .map(|test| format_cell(kind, dataset.record(test, handler))),
                        )
                        .collect()
                })
                .collect(),
        ),
    };

    let header = iter::once(corner.to_owned()).chain(columns).collect_vec();
    let widths = (0..header.len())
        .map(|column| {
            iter::once(&header)
                .chain(rows.iter())
                .map(|row| row[column].chars().count())
                .max()
                .unwrap_or_default()
        })
        .collect_vec();

    let format_row = |row: &[String]| {
        row.iter()
            .zip(widths.iter())
            .enumerate()
            .map(|(column, (cell, &width))| {
                if column == 0 {
                    format!("{cell:<width$}")
                } else {
                    format!("{cell:>width$}")
                }
            })
            .join("  ")
            .trim_end()
            .to_owned()
    };

    let mut lines = vec![
        format!("{} ({})", kind.long_label(), kind.short_label()),
        String::new(),
        format_row(&header),
        widths.iter().map(|width| "-".repeat(*width)).join("  "),
    ];
    lines.extend(rows.iter().map(|row| format_row(row)));

    let mut table = lines.join("\n");
    table.push('\n');
    table
}

/// Render the captured warnings, `None` when the input had none
pub fn render_warnings(dataset: &Dataset) -> Option<String> {
    dataset.has_warnings().then(|| {
        iter::once("Warnings:\n".to_owned())
            .chain(
                dataset
                    .warnings()
                    .iter()
                    .map(|warning| format!("  {warning}\n")),
            )
            .join("")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(text: &str) -> Dataset {
        let mut dataset = Dataset::new();
        dataset.ingest(text.as_bytes()).unwrap();
        dataset
    }

    const OUTPUT: &str = "\
BenchmarkZerolog/Benchmark_Simple-8 5000 20.5 ns/op 0 B/op 0 allocs/op
samber/logrus/Benchmark_Simple-8 1000 300 ns/op 128 B/op 4 allocs/op
samber/logrus/Benchmark_Big_Logs-8 10 90000 ns/op 12.5 MB/s
# GOMAXPROCS=4
";

    #[test]
    fn tests_by_handler() {
        let table = render_table(&dataset(OUTPUT), MetricKind::NanosPerOp, Axis::Tests);

        assert_eq!(
            table,
            "\
Nanoseconds per Operation (ns/op)

Test      Samber Logrus  Zerolog
--------  -------------  -------
Big Logs       90000.00        -
Simple           300.00    20.50
"
        );
    }

    #[test]
    fn warnings_block() {
        assert_eq!(
            render_warnings(&dataset(OUTPUT)).as_deref(),
            Some("Warnings:\n  GOMAXPROCS=4\n")
        );
        assert_eq!(render_warnings(&Dataset::new()), None);
    }

    #[test]
    fn handlers_by_test() {
        let table = render_table(&dataset(OUTPUT), MetricKind::MemAllocsPerOp, Axis::Handlers);
        let lines = table.lines().collect_vec();

        assert_eq!(lines[2], "Handler        Big Logs  Simple");
        assert_eq!(lines[4], "Samber Logrus         0       4");
        assert_eq!(lines[5], "Zerolog               -       0");
    }

    #[test]
    fn empty_dataset() {
        let table = render_table(&Dataset::new(), MetricKind::MbPerSec, Axis::Tests);

        assert_eq!(table, "Megabytes per Second (MB/s)\n\nTest\n----\n");
    }

    #[test]
    fn axis_from_str() {
        assert_eq!("Handlers".parse::<Axis>(), Ok(Axis::Handlers));
        assert_eq!("test".parse::<Axis>(), Ok(Axis::Tests));
        assert!("columns".parse::<Axis>().is_err());
    }
}
