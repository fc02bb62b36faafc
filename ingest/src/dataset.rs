use crate::{
    config::Source,
    parse::{self, DataLine, LineKind},
    record::{HandlerTag, TestRecord, TestTag},
    IngestError,
};
use itertools::Itertools;
use once_cell::sync::OnceCell;
use std::{collections::BTreeMap, io::BufRead};
use tracing::{debug, error, info, trace};

/// map of handler -> record for a single test
pub type HandlerRecords = BTreeMap<HandlerTag, TestRecord>;
/// map of test -> record for a single handler
pub type TestRecords = BTreeMap<TestTag, TestRecord>;

static NO_HANDLER_RECORDS: HandlerRecords = BTreeMap::new();
static NO_TEST_RECORDS: TestRecords = BTreeMap::new();

/// Benchmark results indexed by test and by handler.
///
/// Both indices hold their own copy of every record and are only written
/// through [`Dataset::ingest`], which keeps them mirrored. Once ingestion is
/// done the dataset can be shared between threads; the sorted tag views are
/// computed at most once even under concurrent first access.
#[derive(Debug, Default)]
pub struct Dataset {
    by_test: BTreeMap<TestTag, HandlerRecords>,
    by_handler: BTreeMap<HandlerTag, TestRecords>,
    test_names: BTreeMap<TestTag, String>,
    handler_names: BTreeMap<HandlerTag, String>,
    cpu_counts: BTreeMap<TestTag, u32>,
    warnings: Vec<String>,
    test_tags: OnceCell<Vec<TestTag>>,
    handler_tags: OnceCell<Vec<HandlerTag>>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// read and ingest all lines from `source`
    pub fn load(source: &Source) -> Result<Self, IngestError> {
        let mut dataset = Self::new();

        dataset.ingest(source.open()?)?;

        Ok(dataset)
    }

    /// Scan `reader` line by line and add every result to the indices.
    ///
    /// Stops at the first I/O error or malformed numeric field. Lines read
    /// before the failure stay in the dataset, callers should discard it on
    /// error.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn ingest<R: BufRead>(&mut self, reader: R) -> Result<(), IngestError> {
        // later lines may add tags, drop views computed so far
        self.test_tags.take();
        self.handler_tags.take();

        let mut results = 0usize;
        let mut warnings = 0usize;

        // split on raw bytes, stray non-utf8 noise must not end the scan
        for (index, bytes) in reader.split(b'\n').enumerate() {
            let mut bytes = bytes?;
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
            let line = String::from_utf8_lossy(&bytes);

            match parse::classify(index + 1, &line) {
                Ok(LineKind::Warning(text)) => {
                    debug!(line = index + 1, warning = text, "Captured warning");

                    self.warnings.push(text.to_owned());
                    warnings += 1;
                }
                Ok(LineKind::Data(data)) => {
                    debug!(
                        line = index + 1,
                        test = %data.test,
                        handler = %data.handler,
                        "Ingested benchmark result"
                    );

                    self.insert(data);
                    results += 1;
                }
                Ok(LineKind::Ignored) => trace!(line = index + 1, "Ignored line"),
                Err(error) => {
                    error!(error = %error, "Aborting ingestion on malformed result line");

                    return Err(error);
                }
            }
        }

        info!(
            results,
            warnings,
            tests = self.by_test.len(),
            handlers = self.by_handler.len(),
            "Finished ingesting benchmark output"
        );

        Ok(())
    }

    fn insert(&mut self, data: DataLine) {
        let DataLine {
            test,
            handler,
            cpu_count,
            record,
        } = data;

        self.test_names
            .insert(test.clone(), parse::test_display_name(&test));
        self.handler_names
            .insert(handler.clone(), parse::handler_display_name(&handler));
        self.cpu_counts.insert(test.clone(), cpu_count);

        // repeated (test, handler) pairs overwrite, the last line wins
        self.by_handler
            .entry(handler.clone())
            .or_default()
            .insert(test.clone(), record);
        self.by_test.entry(test).or_default().insert(handler, record);
    }

    /// display name of a test, the tag itself if it was never ingested
    pub fn test_name<'a>(&'a self, test: &'a TestTag) -> &'a str {
        self.test_names
            .get(test)
            .map(String::as_str)
            .unwrap_or(test.as_str())
    }

    /// display name of a handler, the tag itself if it was never ingested
    pub fn handler_name<'a>(&'a self, handler: &'a HandlerTag) -> &'a str {
        self.handler_names
            .get(handler)
            .map(String::as_str)
            .unwrap_or(handler.as_str())
    }

    /// all records of a test keyed by handler, empty for unknown tests
    pub fn handler_records(&self, test: &TestTag) -> &HandlerRecords {
        self.by_test.get(test).unwrap_or(&NO_HANDLER_RECORDS)
    }

    /// all records of a handler keyed by test, empty for unknown handlers
    pub fn test_records(&self, handler: &HandlerTag) -> &TestRecords {
        self.by_handler.get(handler).unwrap_or(&NO_TEST_RECORDS)
    }

    pub fn record(&self, test: &TestTag, handler: &HandlerTag) -> Option<&TestRecord> {
        self.handler_records(test).get(handler)
    }

    /// cpu count of the last result line seen for `test`
    pub fn cpu_count(&self, test: &TestTag) -> Option<u32> {
        self.cpu_counts.get(test).copied()
    }

    /// All test tags ordered by display name, ties ordered by tag.
    pub fn test_tags(&self) -> &[TestTag] {
        self.test_tags.get_or_init(|| {
            self.by_test
                .keys()
                .cloned()
                .sorted_by(|left, right| {
                    self.test_name(left)
                        .cmp(self.test_name(right))
                        .then_with(|| left.cmp(right))
                })
                .collect()
        })
    }

    /// All handler tags ordered by display name, ties ordered by tag.
    pub fn handler_tags(&self) -> &[HandlerTag] {
        self.handler_tags.get_or_init(|| {
            self.by_handler
                .keys()
                .cloned()
                .sorted_by(|left, right| {
                    self.handler_name(left)
                        .cmp(self.handler_name(right))
                        .then_with(|| left.cmp(right))
                })
                .collect()
        })
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// captured warning text in input order
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.by_test.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT: &str = "\
goos: linux
# GOMAXPROCS=4
BenchmarkZerolog/Benchmark_Simple-8  5000  20.5 ns/op  0 B/op  0 allocs/op
samber/logrus/Benchmark_Simple-8  1000  300 ns/op  128 B/op  4 allocs/op
samber/logrus/Benchmark__Big_Logs-4  10  90000 ns/op  12.5 MB/s
Benchmark/Benchmark_Simple-8  3000  45 ns/op
# handler samber/logrus dropped a field
PASS
";

    fn dataset() -> Dataset {
        let mut dataset = Dataset::new();
        dataset.ingest(OUTPUT.as_bytes()).unwrap();
        dataset
    }

    #[test]
    fn indices_and_names() {
        let dataset = dataset();
        let simple = TestTag::from("Simple");
        let logrus = HandlerTag::from("samber_logrus");

        assert_eq!(dataset.handler_records(&simple).len(), 3);
        assert_eq!(dataset.test_records(&logrus).len(), 2);
        assert_eq!(dataset.record(&simple, &logrus).unwrap().mem_allocs_per_op, 4);
        assert_eq!(dataset.test_name(&TestTag::from("Big_Logs")), "Big Logs");
        assert_eq!(dataset.handler_name(&logrus), "Samber Logrus");
        assert_eq!(dataset.cpu_count(&TestTag::from("Big_Logs")), Some(4));
    }

    #[test]
    fn unknown_tags_fall_back() {
        let dataset = dataset();
        let test = TestTag::from("Missing_Test");
        let handler = HandlerTag::from("missing");

        assert_eq!(dataset.test_name(&test), "Missing_Test");
        assert_eq!(dataset.handler_name(&handler), "missing");
        assert!(dataset.handler_records(&test).is_empty());
        assert!(dataset.test_records(&handler).is_empty());
        assert_eq!(dataset.record(&test, &handler), None);
        assert_eq!(dataset.cpu_count(&test), None);
    }

    #[test]
    fn warnings_in_order() {
        let dataset = dataset();

        assert!(dataset.has_warnings());
        assert_eq!(
            dataset.warnings(),
            ["GOMAXPROCS=4", "handler samber/logrus dropped a field"]
        );
        assert!(!Dataset::new().has_warnings());
    }

    #[test]
    fn sorted_views_are_cached() {
        let dataset = dataset();

        let handlers = dataset.handler_tags();
        assert_eq!(
            handlers
                .iter()
                .map(|handler| dataset.handler_name(handler))
                .collect::<Vec<_>>(),
            ["Samber Logrus", "Slog", "Zerolog"]
        );
        assert!(std::ptr::eq(handlers, dataset.handler_tags()));

        let tests = dataset.test_tags();
        assert_eq!(tests, [TestTag::from("Big_Logs"), TestTag::from("Simple")]);
        assert!(std::ptr::eq(tests, dataset.test_tags()));
    }

    #[test]
    fn further_ingestion_refreshes_views() {
        let mut dataset = dataset();
        assert_eq!(dataset.test_tags().len(), 2);

        dataset
            .ingest("BenchmarkZap/Benchmark_Attributes-8 10 1 ns/op\n".as_bytes())
            .unwrap();

        assert_eq!(
            dataset.test_tags(),
            [
                TestTag::from("Attributes"),
                TestTag::from("Big_Logs"),
                TestTag::from("Simple")
            ]
        );
    }

    #[test]
    fn shareable_after_ingestion() {
        fn assert_shareable<T: Send + Sync>() {}

        assert_shareable::<Dataset>();
    }
}
