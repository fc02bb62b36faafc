mod config;

use benchlog_analysis::{render_table, render_warnings, ReportError, Summary};
use benchlog_ingest::{Dataset, IngestError};
use clap::Parser;
use config::{Cli, ConfigErrors, Format, ReportConfig};
use std::process::ExitCode;
use thiserror::Error;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
enum RunError {
    #[error("Failed to load config")]
    Config(#[from] ConfigErrors),
    #[error("Config failed preflight checks")]
    Preflight,
    #[error("Failed to ingest benchmark output")]
    Ingest(#[from] IngestError),
    #[error("Failed to build report")]
    Report(#[from] ReportError),
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<String, RunError> {
    let mut config = match cli.config {
        Some(ref path) => {
            debug!(path = ?path, "Loading config file");

            ReportConfig::load(path)?
        }
        None => ReportConfig::default(),
    }
    .merge(&cli);

    if config.preflight_checks() {
        return Err(RunError::Preflight);
    }

    // the sorted views are filled here, before any report reads them
    let dataset = Dataset::load(&config.source())?;
    info!(
        tests = dataset.test_tags().len(),
        handlers = dataset.handler_tags().len(),
        "Loaded benchmark results"
    );

    match config.format {
        Format::Yaml => Ok(Summary::build(&dataset).to_yaml()?),
        Format::Table => {
            let mut sections = config
                .metrics
                .iter()
                .map(|kind| render_table(&dataset, *kind, config.by))
                .collect::<Vec<_>>();
            sections.extend(render_warnings(&dataset));

            Ok(sections.join("\n"))
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(report) => {
            print!("{report}");

            ExitCode::SUCCESS
        }
        Err(error) => {
            match std::error::Error::source(&error) {
                Some(source) => error!("{error}: {source}"),
                None => error!("{error}"),
            }

            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{io::Write, path::PathBuf};

    fn bench_file(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn table_report() {
        let file = bench_file(
            "BenchmarkZerolog/Benchmark_Simple-8 5000 20.5 ns/op 2 allocs/op\n# GOMAXPROCS=4\n",
        );
        let cli = Cli {
            bench: Some(file.path().to_path_buf()),
            metrics: vec![
                "ns/op".parse().unwrap(),
                "allocs/op".parse().unwrap(),
            ],
            ..Default::default()
        };

        let report = run(cli).unwrap();

        assert!(report.starts_with("Nanoseconds per Operation (ns/op)\n"));
        assert!(report.contains("Allocations per Operation (allocs/op)\n"));
        assert!(report.contains("Simple    20.50"));
        assert!(report.ends_with("Warnings:\n  GOMAXPROCS=4\n"));
    }

    #[test]
    fn yaml_report() {
        let file = bench_file("samber/logrus/Benchmark_Attributes-8 10 1.5 ns/op\n");
        let cli = Cli {
            bench: Some(file.path().to_path_buf()),
            format: Some(Format::Yaml),
            ..Default::default()
        };

        let report = run(cli).unwrap();

        assert!(report.contains("tag: samber_logrus"));
        assert!(report.contains("name: Samber Logrus"));
    }

    #[test]
    fn malformed_input_fails() {
        let file = bench_file("BenchmarkZap/Benchmark_Simple-8 ten 1 ns/op\n");
        let cli = Cli {
            bench: Some(file.path().to_path_buf()),
            ..Default::default()
        };

        assert!(matches!(run(cli), Err(RunError::Ingest(_))));
    }

    #[test]
    fn missing_input_fails_preflight() {
        let cli = Cli {
            bench: Some(PathBuf::from("/definitely/not/here/bench.txt")),
            ..Default::default()
        };

        assert!(matches!(run(cli), Err(RunError::Preflight)));
    }
}
