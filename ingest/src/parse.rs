use crate::{
    record::{HandlerTag, TestRecord, TestTag},
    Field, IngestError,
};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use std::{num::ParseIntError, str::FromStr};

/// marker opening a warning line, the remainder is captured verbatim
pub const WARNING_PREFIX: &str = "# ";
/// prefix of the benchmark function wrapping each handler
pub const HANDLER_PREFIX: &str = "Benchmark";
/// identifier of the reference handler, whose result lines carry no handler suffix
pub const BASELINE_HANDLER: &str = "slog";

// Iterations, ns/op and the optional fields capture whole tokens so a
// malformed number fails loudly instead of turning the line into noise.
static DATA_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\S*?)/Benchmark_([^-\s]+)-(\d+)\s+(\S+)\s+(\S+)\s+ns/op")
        .expect("data line pattern is valid")
});
static ALLOCS_PER_OP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\S+)\s+allocs/op").expect("allocs/op pattern is valid"));
static BYTES_PER_OP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\S+)\s+B/op").expect("B/op pattern is valid"));
static MB_PER_SEC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\S+)\s+MB/s").expect("MB/s pattern is valid"));

/// A fully parsed result line
#[derive(Debug, Clone, PartialEq)]
pub struct DataLine {
    pub test: TestTag,
    pub handler: HandlerTag,
    pub cpu_count: u32,
    pub record: TestRecord,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LineKind<'a> {
    /// text following the `# ` marker
    Warning(&'a str),
    Data(DataLine),
    Ignored,
}

/// Classify a single line of runner output.
///
/// `number` is the 1-based line number and only used for error context.
/// Lines that neither carry a warning nor match the result grammar are
/// [`LineKind::Ignored`], only numeric fields of a recognized result line
/// can fail.
pub fn classify(number: usize, line: &str) -> Result<LineKind<'_>, IngestError> {
    if let Some(warning) = line.strip_prefix(WARNING_PREFIX) {
        return Ok(LineKind::Warning(warning));
    }

    let Some(captures) = DATA_LINE.captures(line) else {
        return Ok(LineKind::Ignored);
    };

    let cpu_count = parse_integer(number, Field::CpuCount, &captures[3])?;
    let iterations = parse_integer(number, Field::Iterations, &captures[4])?;
    let nanos_per_op = parse_decimal(number, Field::NanosPerOp, &captures[5])?;

    let mem_allocs_per_op = optional(&ALLOCS_PER_OP, line)
        .map(|value| parse_integer(number, Field::MemAllocsPerOp, value))
        .transpose()?
        .unwrap_or_default();
    let mem_bytes_per_op = optional(&BYTES_PER_OP, line)
        .map(|value| parse_integer(number, Field::MemBytesPerOp, value))
        .transpose()?
        .unwrap_or_default();
    let mb_per_sec = optional(&MB_PER_SEC, line)
        .map(|value| parse_decimal(number, Field::MbPerSec, value))
        .transpose()?
        .unwrap_or_default();

    Ok(LineKind::Data(DataLine {
        test: test_tag(&captures[2]),
        handler: handler_tag(&captures[1]),
        cpu_count,
        record: TestRecord::new(
            iterations,
            nanos_per_op,
            mem_allocs_per_op,
            mem_bytes_per_op,
            mb_per_sec,
        ),
    }))
}

fn optional<'a>(pattern: &Regex, line: &'a str) -> Option<&'a str> {
    pattern
        .captures(line)
        .and_then(|captures| captures.get(1))
        .map(|value| value.as_str())
}

fn parse_integer<T>(line: usize, field: Field, value: &str) -> Result<T, IngestError>
where
    T: FromStr<Err = ParseIntError>,
{
    value
        .parse()
        .map_err(|source| IngestError::InvalidInteger {
            line,
            field,
            value: value.to_owned(),
            source,
        })
}

/// only plain digits with an optional fraction, f64's own parser would also
/// accept signs, exponents, `inf` and `NaN`
fn parse_decimal(line: usize, field: Field, value: &str) -> Result<f64, IngestError> {
    let invalid = || IngestError::InvalidDecimal {
        line,
        field,
        value: value.to_owned(),
    };

    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));
    let digits_only = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());

    if whole.is_empty() || !digits_only(whole) || !digits_only(fraction) {
        return Err(invalid());
    }

    value
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(invalid)
}

/// Derive the test identifier from the raw `Benchmark_<test>` segment
pub fn test_tag(raw: &str) -> TestTag {
    TestTag::new(raw.trim_start_matches('_'))
}

/// Derive the handler identifier from the raw segment preceding `/Benchmark_`.
///
/// Nested benchmark names (`samber/logrus`) are joined with underscores. The
/// baseline handler has no suffix after [`HANDLER_PREFIX`] and is mapped to
/// [`BASELINE_HANDLER`].
pub fn handler_tag(raw: &str) -> HandlerTag {
    let suffix = raw.strip_prefix(HANDLER_PREFIX).unwrap_or(raw);
    let joined = suffix.replace('/', "_");
    let tag = joined.trim_start_matches('_');

    if tag.is_empty() {
        HandlerTag::from(BASELINE_HANDLER)
    } else {
        HandlerTag::from(tag)
    }
}

/// `Big_Logs` becomes `Big Logs`, casing is left alone
pub fn test_display_name(tag: &TestTag) -> String {
    tag.as_str().replace('_', " ")
}

/// `samber_logrus` becomes `Samber Logrus`
pub fn handler_display_name(tag: &HandlerTag) -> String {
    tag.as_str()
        .split('_')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .join(" ")
}
