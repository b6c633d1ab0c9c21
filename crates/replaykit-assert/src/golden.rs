//! Golden file store.
//!
//! A golden file holds the expected output of one test, at
//! `<dir>/<sanitized test name>.golden`. In update mode the current output is
//! written first and then read back, so recording also exercises the replay
//! path. Files are re-read on every call; nothing is cached.

use std::path::PathBuf;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info};

use replaykit_core::{
    atomic_write, DiffSettings, Error, GoldenSettings, Message, Result, TestReporter, VerifyConfig,
};
use replaykit_diff::DiffRenderer;

use crate::compare::Comparison;
use crate::failure::Failure;

/// File suffix of golden files.
pub const GOLDEN_SUFFIX: &str = "golden";

lazy_static! {
    static ref UNSAFE_CHARS: Regex = Regex::new(r"[^A-Za-z0-9._-]").unwrap();
}

/// Make a test name usable as a file name.
///
/// Every character outside `[A-Za-z0-9._-]` becomes `_`, so
/// `golden::tests::listing` maps to `golden__tests__listing`.
pub fn sanitize_name(name: &str) -> String {
    let sanitized = UNSAFE_CHARS.replace_all(name, "_");
    match sanitized.trim_matches('.') {
        "" => "unnamed".to_string(),
        _ => sanitized.into_owned(),
    }
}

/// Why a golden comparison did not pass.
#[derive(Debug, thiserror::Error)]
pub enum GoldenError {
    /// The golden file could not be written or read
    #[error(transparent)]
    Io(Error),
    /// The golden file exists but is empty
    #[error("empty golden file {}", .0.display())]
    Empty(PathBuf),
    /// The golden file content differs from the output
    #[error(transparent)]
    Mismatch(Failure),
}

/// Maps test identities to golden files and compares output against them.
#[derive(Debug, Clone)]
pub struct GoldenStore {
    settings: GoldenSettings,
    renderer: DiffRenderer,
}

impl GoldenStore {
    /// Create a store with the given settings and diff flags.
    pub fn new(settings: GoldenSettings, diff: &DiffSettings) -> Self {
        Self {
            settings,
            renderer: DiffRenderer::from_settings(diff),
        }
    }

    /// Create a store from a full configuration.
    pub fn from_config(config: &VerifyConfig) -> Self {
        Self::new(config.golden.clone(), &config.diff)
    }

    /// Create a store from the process-wide configuration.
    pub fn from_env() -> Self {
        Self::from_config(VerifyConfig::global())
    }

    /// Store settings.
    pub fn settings(&self) -> &GoldenSettings {
        &self.settings
    }

    /// Whether the store rewrites golden files.
    pub fn is_update(&self) -> bool {
        self.settings.update
    }

    /// Golden file path for a test name.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.settings
            .dir
            .join(format!("{}.{}", sanitize_name(name), GOLDEN_SUFFIX))
    }

    /// Write `content` as the golden file of `name`.
    pub fn update(&self, name: &str, content: &[u8]) -> Result<PathBuf> {
        let path = self.path_for(name);
        atomic_write(&path, content)?;
        info!("Updated golden file {}", path.display());
        Ok(path)
    }

    /// Read the golden file of `name`.
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.path_for(name);
        let content = std::fs::read(&path).map_err(|e| Error::read(&path, e))?;
        debug!("Read {} bytes from golden file {}", content.len(), path.display());
        Ok(content)
    }

    /// Compare `got` with the golden file of `name`, updating it first in
    /// update mode.
    pub fn check(
        &self,
        name: &str,
        got: &str,
        message: Option<Message>,
    ) -> std::result::Result<(), GoldenError> {
        if self.settings.update {
            self.update(name, got.as_bytes()).map_err(GoldenError::Io)?;
        }

        let want = self.read(name).map_err(GoldenError::Io)?;
        if want.is_empty() {
            return Err(GoldenError::Empty(self.path_for(name)));
        }

        let want = String::from_utf8_lossy(&want);
        Comparison::lines(got, &want)
            .check(&self.renderer, message)
            .map_err(GoldenError::Mismatch)
    }

    /// Compare `got` with the golden file of the running test.
    ///
    /// A missing, unreadable or empty golden file stops the test with a
    /// fatal failure quoting `got`, so the expected output can be reviewed
    /// and recorded. A mismatch is a soft failure.
    pub fn match_golden(
        &self,
        reporter: &dyn TestReporter,
        got: &str,
        message: impl Into<Message>,
    ) -> bool {
        let name = reporter.name();
        match self.check(&name, got, Some(message.into())) {
            Ok(()) => true,
            Err(GoldenError::Io(e @ Error::FixtureWrite { .. })) => reporter.fatal(&e.to_string()),
            Err(GoldenError::Io(e)) => reporter.fatal(&format!(
                "cannot read golden file {}: {}.\nTest output is:\n{}",
                self.path_for(&name).display(),
                e,
                got
            )),
            Err(GoldenError::Empty(path)) => reporter.fatal(&format!(
                "no existing or empty golden file {}.\nTest output is:\n{}",
                path.display(),
                got
            )),
            Err(GoldenError::Mismatch(failure)) => {
                reporter.error(&failure.report());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replaykit_core::TestContext;
    use tempfile::TempDir;

    fn store(dir: &TempDir, update: bool) -> GoldenStore {
        let settings = GoldenSettings {
            update,
            dir: dir.path().to_path_buf(),
        };
        GoldenStore::new(settings, &DiffSettings::default())
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("golden::tests::listing"), "golden__tests__listing");
        assert_eq!(sanitize_name("case/sub case"), "case_sub_case");
        assert_eq!(sanitize_name("v1.2-rc_3"), "v1.2-rc_3");
        assert_eq!(sanitize_name(""), "unnamed");
        assert_eq!(sanitize_name(".."), "unnamed");
    }

    #[test]
    fn test_path_for() {
        let dir = TempDir::new().unwrap();
        let path = store(&dir, false).path_for("mod::case");
        assert_eq!(path, dir.path().join("mod__case.golden"));
    }

    #[test]
    fn test_update_then_read() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, true);

        let path = store.update("case", b"X").unwrap();
        assert!(path.exists());
        assert_eq!(store.read("case").unwrap(), b"X");
    }

    #[test]
    fn test_read_missing() {
        let dir = TempDir::new().unwrap();
        let err = store(&dir, false).read("missing").unwrap_err();
        assert!(matches!(err, Error::FixtureNotFound { .. }));
    }

    #[test]
    fn test_check_update_creates_directories() {
        let dir = TempDir::new().unwrap();
        let settings = GoldenSettings::update(dir.path().join("nested").join("golden"));
        let store = GoldenStore::new(settings, &DiffSettings::default());

        assert!(store.check("case", "output\n", None).is_ok());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("nested/golden/case.golden")).unwrap(),
            "output\n"
        );
    }

    #[test]
    fn test_check_empty_golden() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("case.golden"), b"").unwrap();

        let result = store(&dir, false).check("case", "output", None);
        assert!(matches!(result, Err(GoldenError::Empty(_))));
    }

    #[test]
    fn test_check_mismatch() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("case.golden"), b"old output").unwrap();

        match store(&dir, false).check("case", "new output", None) {
            Err(GoldenError::Mismatch(failure)) => {
                assert_eq!(failure.want, "old output");
                assert_eq!(failure.got, "new output");
            }
            other => panic!("expected mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_golden_error_display() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, false);

        let err = GoldenError::Empty(PathBuf::from("/tmp/case.golden"));
        assert_eq!(err.to_string(), "empty golden file /tmp/case.golden");

        let err = store.check("absent", "output", None).unwrap_err();
        let inner = store.read("absent").unwrap_err();
        assert_eq!(err.to_string(), inner.to_string());

        std::fs::write(dir.path().join("case.golden"), b"old").unwrap();
        match store.check("case", "new", Some(Message::new("context"))) {
            Err(err @ GoldenError::Mismatch(_)) => {
                assert!(err.to_string().starts_with("context\n"));
                assert!(std::error::Error::source(&err).is_none());
            }
            other => panic!("expected mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_golden_error_propagates_as_boxed_error() {
        fn run(store: &GoldenStore) -> std::result::Result<(), Box<dyn std::error::Error>> {
            store.check("case", "output", None)?;
            Ok(())
        }

        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("case.golden"), b"").unwrap();
        let err = run(&store(&dir, false)).unwrap_err();
        assert!(err.to_string().starts_with("empty golden file"));
    }

    #[test]
    fn test_check_rereads_external_edits() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, false);
        let path = dir.path().join("case.golden");

        std::fs::write(&path, b"v1").unwrap();
        assert!(store.check("case", "v1", None).is_ok());

        std::fs::write(&path, b"v2").unwrap();
        assert!(store.check("case", "v2", None).is_ok());
    }

    #[test]
    fn test_match_golden_replay() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("suite__replay.golden"), b"expected").unwrap();

        let t = TestContext::new("suite::replay");
        let store = store(&dir, false);
        assert!(store.match_golden(&t, "expected", ""));
        assert!(!store.match_golden(&t, "unexpected", "second run"));

        let failures = t.take_failures();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].starts_with("second run\n"));
    }

    #[test]
    fn test_match_golden_missing_is_fatal() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, false);

        let result = std::panic::catch_unwind(|| {
            let t = TestContext::new("suite::missing");
            store.match_golden(&t, "live output", "");
        });

        let payload = result.unwrap_err();
        let message = payload.downcast_ref::<String>().unwrap();
        assert!(message.contains("cannot read golden file"));
        assert!(message.contains("Test output is:\nlive output"));
    }

    #[test]
    fn test_match_golden_empty_is_fatal() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("suite__empty.golden"), b"").unwrap();
        let store = store(&dir, false);

        let result = std::panic::catch_unwind(|| {
            let t = TestContext::new("suite::empty");
            store.match_golden(&t, "live output", "");
        });

        let payload = result.unwrap_err();
        let message = payload.downcast_ref::<String>().unwrap();
        assert!(message.contains("no existing or empty golden file"));
        assert!(message.contains("live output"));
    }
}
