use benchlog_analysis::Axis;
use benchlog_ingest::{MetricKind, Source};
use clap::{ArgAction, Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum ConfigErrors {
    #[error("Failed to read config file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Config file is not valid")]
    Parse(#[from] serde_yaml::Error),
    #[error("Config file {0:?} not found")]
    FileNotFound(PathBuf),
}

/// Summarize benchmark output of logging handlers
#[derive(Parser, Debug, Default)]
#[command(author, version, about)]
pub struct Cli {
    /// YAML config file, command line flags take precedence
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// benchmark output to read, stdin if omitted
    #[arg(short, long)]
    pub bench: Option<PathBuf>,

    /// metric to report (e.g. `ns/op`, `allocs/op`, `B/op`, `MB/s`), repeatable
    #[arg(short, long = "metric")]
    pub metrics: Vec<MetricKind>,

    /// list tests or handlers down the first column
    #[arg(long)]
    pub by: Option<Axis>,

    #[arg(short, long, value_enum)]
    pub format: Option<Format>,

    /// raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Table,
    Yaml,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    // benchmark output file, stdin if absent
    #[serde(default, alias = "bench")]
    pub input: Option<PathBuf>,
    #[serde(default)]
    pub metrics: Vec<MetricKind>,
    #[serde(default)]
    pub by: Axis,
    #[serde(default)]
    pub format: Format,
}

impl ReportConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigErrors> {
        if !path.is_file() {
            return Err(ConfigErrors::FileNotFound(path.to_path_buf()));
        }

        let text = fs::read_to_string(path).map_err(|source| ConfigErrors::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigErrors> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// apply command line flags on top of the file config
    pub fn merge(mut self, cli: &Cli) -> Self {
        if let Some(ref bench) = cli.bench {
            self.input = Some(bench.clone());
        }
        if !cli.metrics.is_empty() {
            self.metrics = cli.metrics.clone();
        }
        if let Some(by) = cli.by {
            self.by = by;
        }
        if let Some(format) = cli.format {
            self.format = format;
        }

        self
    }

    /// Normalize the config and report every problem at once.
    /// Returns true if the config contains an error.
    pub fn preflight_checks(&mut self) -> bool {
        let mut contains_error = false;

        if let Some(ref input) = self.input {
            if !input.is_file() {
                error!(
                    "Failed to find input. Either not a file or not found at {}",
                    input.to_string_lossy()
                );
                contains_error = true;
            }
        }

        if self.metrics.is_empty() {
            self.metrics.push(MetricKind::NanosPerOp);
        } else {
            let requested = self.metrics.len();
            let mut seen = Vec::with_capacity(requested);
            self.metrics.retain(|kind| {
                let first = !seen.contains(kind);
                seen.push(*kind);
                first
            });

            if self.metrics.len() != requested {
                warn!("Metrics were requested more than once, duplicates are dropped");
            }
        }

        if self.format == Format::Yaml && self.metrics != [MetricKind::NanosPerOp] {
            warn!("Yaml output always contains every metric, the metric selection is ignored");
        }

        contains_error
    }

    pub fn source(&self) -> Source {
        Source::from_path(self.input.clone())
    }
}
