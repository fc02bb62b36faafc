use benchlog_ingest::{Dataset, HandlerTag, TestRecord, TestTag};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to serialize summary")]
    Serialize(#[from] serde_yaml::Error),
}

/// Serializable view of a whole dataset, tests and handlers in display order
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Summary {
    pub tests: Vec<TestSummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct TestSummary {
    pub tag: TestTag,
    pub name: String,
    pub cpu_count: Option<u32>,
    pub handlers: Vec<HandlerResult>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct HandlerResult {
    pub tag: HandlerTag,
    pub name: String,
    #[serde(flatten)]
    pub record: TestRecord,
}

impl Summary {
    pub fn build(dataset: &Dataset) -> Self {
        let tests = dataset
            .test_tags()
            .iter()
            .map(|test| TestSummary {
                tag: test.clone(),
                name: dataset.test_name(test).to_owned(),
                cpu_count: dataset.cpu_count(test),
                handlers: dataset
                    .handler_tags()
                    .iter()
                    .filter_map(|handler| {
                        dataset.record(test, handler).map(|record| HandlerResult {
                            tag: handler.clone(),
                            name: dataset.handler_name(handler).to_owned(),
                            record: *record,
                        })
                    })
                    .collect(),
            })
            .collect();

        Self {
            tests,
            warnings: dataset.warnings().to_vec(),
        }
    }

    pub fn to_yaml(&self) -> Result<String, ReportError> {
        serde_yaml::to_string(self).map_err(|error| {
            error!(error = ?error, "Failed to serialize summary as yaml");

            ReportError::from(error)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_follows_display_order() {
        let mut dataset = Dataset::new();
        dataset
            .ingest(
                "BenchmarkZerolog/Benchmark_Simple-8 5000 20.5 ns/op\n\
                 samber/logrus/Benchmark_Simple-8 1000 300 ns/op 4 allocs/op\n\
                 samber/logrus/Benchmark_Big_Logs-4 10 90000 ns/op 12.5 MB/s\n\
                 # GOMAXPROCS=4\n"
                    .as_bytes(),
            )
            .unwrap();

        let summary = Summary::build(&dataset);

        assert_eq!(summary.tests.len(), 2);
        assert_eq!(summary.tests[0].name, "Big Logs");
        assert_eq!(summary.tests[0].cpu_count, Some(4));
        assert_eq!(summary.tests[0].handlers.len(), 1);
        assert_eq!(summary.tests[1].handlers[0].name, "Samber Logrus");
        assert_eq!(summary.tests[1].handlers[0].record.mem_allocs_per_op, 4);
        assert_eq!(summary.tests[1].handlers[1].tag, HandlerTag::from("Zerolog"));
        assert_eq!(summary.warnings, ["GOMAXPROCS=4"]);

        let yaml = summary.to_yaml().unwrap();
        assert!(yaml.contains("name: Samber Logrus"));
        assert!(yaml.contains("mb_per_sec: 12.5"));
        assert!(yaml.contains("- GOMAXPROCS=4"));
    }

    #[test]
    fn empty_summary() {
        let summary = Summary::build(&Dataset::new());

        assert!(summary.tests.is_empty());
        assert_eq!(summary.to_yaml().unwrap(), "tests: []\n");
    }
}
