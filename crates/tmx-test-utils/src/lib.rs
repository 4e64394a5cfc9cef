#![forbid(unsafe_code)]

//! Shared test tooling: structured per-case logs and property-test settings.
//!
//! Configuration is read from the environment:
//! `TMX_PROPTEST_CASES` sets the property case count, `TMX_PROPTEST_SEED` (or
//! proptest's own `PROPTEST_RNG_SEED`) is recorded in logs, and
//! `TMX_TEST_LOG_DIR` turns log writing on.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::any::Any;
use std::fs;
use std::panic::{AssertUnwindSafe, catch_unwind, resume_unwind};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

pub const TEST_LOG_SCHEMA_VERSION: &str = "tmx.test-log.v1";
pub const PROPTEST_CASES_ENV: &str = "TMX_PROPTEST_CASES";
pub const PROPTEST_SEED_ENV: &str = "TMX_PROPTEST_SEED";
pub const TEST_LOG_DIR_ENV: &str = "TMX_TEST_LOG_DIR";

const DEFAULT_CASES: u32 = 256;
const CI_CASES: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestResult {
    Pass,
    Fail,
    Skip,
}

/// Where and with what toolchain a case ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunEnv {
    pub rustc: String,
    pub os: String,
    pub target_dir: Option<String>,
    pub started_unix_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PhaseTimings {
    pub setup_ms: u64,
    pub execute_ms: u64,
    pub verify_ms: u64,
    pub teardown_ms: u64,
}

/// One test case run, as written to `TMX_TEST_LOG_DIR`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestLogV1 {
    pub schema_version: String,
    pub test_id: String,
    /// Matrix combination name, when the test ran one.
    pub case_name: Option<String>,
    pub fixture_id: String,
    pub proptest_seed: Option<u64>,
    pub sample_seed: Option<u64>,
    pub env: RunEnv,
    pub result: TestResult,
    pub artifact_refs: Vec<String>,
    pub details: Option<String>,
    pub duration_ms: u64,
    pub phase_timings: PhaseTimings,
}

impl TestLogV1 {
    /// A fresh log for `test_id`, stamped with the current seeds and
    /// environment.
    #[must_use]
    pub fn new(
        test_id: impl Into<String>,
        case_name: Option<String>,
        fixture_id: impl Into<String>,
        result: TestResult,
    ) -> Self {
        Self {
            schema_version: TEST_LOG_SCHEMA_VERSION.to_owned(),
            test_id: test_id.into(),
            case_name,
            fixture_id: fixture_id.into(),
            proptest_seed: capture_proptest_seed(),
            sample_seed: tmx_sample::capture_sample_seed(),
            env: capture_env(),
            result,
            artifact_refs: Vec::new(),
            details: None,
            duration_ms: 0,
            phase_timings: PhaseTimings::default(),
        }
    }

    /// `<test id>[__<case>].json`, with path separators and brackets in the
    /// case name replaced by `-`.
    #[must_use]
    pub fn file_name(&self) -> String {
        let mut stem = self.test_id.replace("::", "__");
        if let Some(case) = &self.case_name {
            stem.push_str("__");
            stem.extend(case.chars().map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' {
                    c
                } else {
                    '-'
                }
            }));
        }
        format!("{stem}.json")
    }
}

#[derive(Debug)]
pub enum TestLogError {
    Io(std::io::Error),
    Serialize(serde_json::Error),
}

impl std::fmt::Display for TestLogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "test log io failed: {err}"),
            Self::Serialize(err) => write!(f, "test log serialize failed: {err}"),
        }
    }
}

impl std::error::Error for TestLogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Serialize(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for TestLogError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for TestLogError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err)
    }
}

#[must_use]
pub fn capture_env() -> RunEnv {
    let rustc = Command::new("rustc")
        .arg("--version")
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map_or_else(
            || "rustc <unknown>".to_owned(),
            |output| String::from_utf8_lossy(&output.stdout).trim().to_owned(),
        );
    let started_unix_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| saturating_ms(elapsed.as_millis()));
    RunEnv {
        rustc,
        os: std::env::consts::OS.to_owned(),
        target_dir: std::env::var("CARGO_TARGET_DIR").ok(),
        started_unix_ms,
    }
}

/// SHA-256 over the fixture's JSON encoding, hex encoded.
pub fn fixture_id_from_json<T: Serialize>(fixture: &T) -> Result<String, serde_json::Error> {
    let digest = Sha256::digest(serde_json::to_vec(fixture)?);
    Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
}

/// Cases per property test: `TMX_PROPTEST_CASES` when positive, otherwise
/// 1024 under `CI` and 256 locally.
#[must_use]
pub fn property_test_case_count() -> u32 {
    match env_parse::<u32>(PROPTEST_CASES_ENV) {
        Some(cases) if cases > 0 => cases,
        _ if std::env::var_os("CI").is_some() => CI_CASES,
        _ => DEFAULT_CASES,
    }
}

#[must_use]
pub fn capture_proptest_seed() -> Option<u64> {
    env_parse(PROPTEST_SEED_ENV).or_else(|| env_parse("PROPTEST_RNG_SEED"))
}

#[must_use]
pub fn test_id(module_path: &str, test_name: &str) -> String {
    format!("{module_path}::{test_name}")
}

/// Directory structured logs go to. Logging is off when unset or empty.
#[must_use]
pub fn test_log_dir() -> Option<PathBuf> {
    std::env::var_os(TEST_LOG_DIR_ENV)
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
}

pub fn write_log(dir: &Path, log: &TestLogV1) -> Result<PathBuf, TestLogError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(log.file_name());
    fs::write(&path, serde_json::to_string_pretty(log)?)?;
    Ok(path)
}

/// Runs `body` as one logged test case and returns its log.
///
/// The body yields artifact references on success or a failure detail. When
/// `log_dir` is given the log is written there before any failure is
/// re-raised.
///
/// # Panics
///
/// Re-raises a panicking body and panics with the detail of a failing one.
/// Also panics when the fixture cannot be encoded or the log cannot be
/// written.
pub fn run_logged_case<Fixture, F>(
    test_id: &str,
    case_name: Option<&str>,
    fixture: &Fixture,
    log_dir: Option<&Path>,
    body: F,
) -> TestLogV1
where
    Fixture: Serialize,
    F: FnOnce() -> Result<Vec<String>, String>,
{
    let run_start = Instant::now();

    let phase = Instant::now();
    let fixture_id = fixture_id_from_json(fixture).expect("fixture digest");
    let mut log = TestLogV1::new(
        test_id,
        case_name.map(str::to_owned),
        fixture_id,
        TestResult::Fail,
    );
    log.phase_timings.setup_ms = elapsed_ms(phase);

    let phase = Instant::now();
    let outcome = catch_unwind(AssertUnwindSafe(body));
    log.phase_timings.execute_ms = elapsed_ms(phase);

    let phase = Instant::now();
    let failure = match outcome {
        Ok(Ok(artifact_refs)) => {
            log.result = TestResult::Pass;
            log.artifact_refs = artifact_refs;
            None
        }
        Ok(Err(detail)) => {
            log.details = Some(detail.clone());
            Some(CaseFailure::Detail(detail))
        }
        Err(payload) => {
            log.details = Some(describe_panic(payload.as_ref()));
            Some(CaseFailure::Panic(payload))
        }
    };
    log.phase_timings.verify_ms = elapsed_ms(phase);

    let phase = Instant::now();
    if let Some(dir) = log_dir {
        log.artifact_refs
            .push(dir.join(log.file_name()).display().to_string());
    }
    log.phase_timings.teardown_ms = elapsed_ms(phase);
    log.duration_ms = elapsed_ms(run_start);
    if let Some(dir) = log_dir {
        write_log(dir, &log).expect("test log write should succeed");
    }

    match failure {
        None => log,
        Some(CaseFailure::Detail(detail)) => panic!("{detail}"),
        Some(CaseFailure::Panic(payload)) => resume_unwind(payload),
    }
}

enum CaseFailure {
    Detail(String),
    Panic(Box<dyn Any + Send>),
}

fn describe_panic(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| payload.downcast_ref::<&str>().map(|msg| (*msg).to_owned()))
        .unwrap_or_else(|| "non-string panic payload".to_owned())
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok()?.trim().parse().ok()
}

fn elapsed_ms(start: Instant) -> u64 {
    saturating_ms(start.elapsed().as_millis())
}

fn saturating_ms(millis: u128) -> u64 {
    u64::try_from(millis).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::{
        TEST_LOG_SCHEMA_VERSION, TestLogV1, TestResult, fixture_id_from_json,
        property_test_case_count, run_logged_case, test_id, write_log,
    };
    use std::panic::catch_unwind;

    #[test]
    fn test_fixture_digest_deterministic_json() {
        let fixture = serde_json::json!({
            "suite": "abs",
            "cases": ["SI8", "F32"]
        });
        let digest_a = fixture_id_from_json(&fixture).expect("digest should build");
        let digest_b = fixture_id_from_json(&fixture).expect("digest should build");
        assert_eq!(digest_a, digest_b);
        assert_eq!(digest_a.len(), 64);
        let other = fixture_id_from_json(&["SI8"]).expect("digest should build");
        assert_ne!(digest_a, other);
    }

    #[test]
    fn test_property_case_count_is_positive() {
        assert!(property_test_case_count() > 0);
    }

    #[test]
    fn test_log_file_name_sanitizes_case() {
        let log = TestLogV1::new(
            test_id("tmx_matrix::tests", "abs"),
            Some("PerAxis[SI8_F32:2]".to_owned()),
            "fixture-id",
            TestResult::Pass,
        );
        assert_eq!(
            log.file_name(),
            "tmx_matrix__tests__abs__PerAxis-SI8_F32-2-.json"
        );
    }

    #[test]
    fn test_log_written_to_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = TestLogV1::new(
            test_id(module_path!(), "test_log_written_to_dir"),
            None,
            "fixture-id",
            TestResult::Pass,
        );
        let path = write_log(dir.path(), &log).expect("write log");
        let raw = std::fs::read_to_string(path).expect("read log");
        let decoded: TestLogV1 = serde_json::from_str(&raw).expect("decode log");
        assert_eq!(decoded, log);
        assert_eq!(decoded.schema_version, TEST_LOG_SCHEMA_VERSION);
    }

    #[test]
    fn test_run_logged_case_records_pass() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = run_logged_case(
            &test_id(module_path!(), "test_run_logged_case_records_pass"),
            Some("SI4:F32"),
            &["SI4", "F32"],
            Some(dir.path()),
            || Ok(vec!["artifact".to_owned()]),
        );
        assert_eq!(log.result, TestResult::Pass);
        assert_eq!(log.case_name.as_deref(), Some("SI4:F32"));
        assert_eq!(log.artifact_refs.len(), 2);
        assert!(dir.path().join(log.file_name()).exists());
    }

    #[test]
    fn test_run_logged_case_without_dir_writes_nothing() {
        let log = run_logged_case("tmx_test_utils::quiet", None, &1_u8, None, || Ok(Vec::new()));
        assert_eq!(log.result, TestResult::Pass);
        assert!(log.artifact_refs.is_empty());
    }

    #[test]
    fn test_run_logged_case_reraises_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().to_path_buf();
        let outcome = catch_unwind(move || {
            run_logged_case(
                "tmx_test_utils::failing",
                None,
                &0_u8,
                Some(path.as_path()),
                || Err("case failed".to_owned()),
            )
        });
        assert!(outcome.is_err());

        let written = std::fs::read_to_string(dir.path().join("tmx_test_utils__failing.json"))
            .expect("failure log");
        let decoded: TestLogV1 = serde_json::from_str(&written).expect("decode log");
        assert_eq!(decoded.result, TestResult::Fail);
        assert_eq!(decoded.details.as_deref(), Some("case failed"));
    }
}
