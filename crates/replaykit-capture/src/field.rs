//! Temporary filesystem test fields.
//!
//! A [`TestField`] is a scratch directory owned by one test. It is populated
//! from a list of relative paths, inspected, and removed when dropped.
//! Setup failures are fatal to the test; content checks are soft.

use std::fs;
use std::io::{self, Cursor};
use std::path::{Component, Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;
use walkdir::WalkDir;

use replaykit_assert::{sanitize_name, Verifier};
use replaykit_core::{Message, TestReporter};

/// A temporary directory tree owned by one test.
pub struct TestField<'a> {
    reporter: &'a dyn TestReporter,
    root: TempDir,
}

impl<'a> TestField<'a> {
    /// Create an empty test field named after the running test.
    pub fn new(reporter: &'a dyn TestReporter) -> Self {
        let prefix = format!("{}-", sanitize_name(&reporter.name()));
        let root = match tempfile::Builder::new().prefix(&prefix).tempdir() {
            Ok(root) => root,
            Err(e) => reporter.fatal(&format!("Cannot create temporary test field: {}", e)),
        };
        debug!(root = %root.path().display(), "Created test field");
        Self { reporter, root }
    }

    /// Root directory of the field.
    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Create the given tree.
    ///
    /// Paths are relative to the root. A path whose last element has no dot
    /// is a directory; any other path (`.hidden` included) is an empty
    /// file, created along with its parent directories.
    pub fn populate(&self, tree: &[&str]) {
        for entry in tree {
            let path = self.fullpath(entry);
            let result = if has_extension(&path) {
                create_empty_file(&path)
            } else {
                fs::create_dir_all(&path)
            };
            if let Err(e) = result {
                self.reporter.fatal(&format!(
                    "Cannot create {} in test field: {}",
                    entry, e
                ));
            }
        }
    }

    /// Every file and directory in the field, relative to the root, in
    /// lexical walk order.
    pub fn list(&self) -> Vec<String> {
        let mut tree = Vec::new();
        for entry in WalkDir::new(self.root()).min_depth(1).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => self
                    .reporter
                    .fatal(&format!("Cannot list temporary test field: {}", e)),
            };
            if let Ok(relpath) = entry.path().strip_prefix(self.root()) {
                tree.push(to_slash(relpath));
            }
        }
        tree
    }

    /// Absolute path of `relpath`, which never escapes the root.
    pub fn fullpath(&self, relpath: &str) -> PathBuf {
        let mut parts: Vec<&std::ffi::OsStr> = Vec::new();
        for component in Path::new(relpath).components() {
            match component {
                Component::Normal(part) => parts.push(part),
                Component::ParentDir => {
                    parts.pop();
                }
                Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
            }
        }
        parts.iter().fold(self.root().to_path_buf(), |path, part| path.join(part))
    }

    /// Whether `relpath` exists in the field.
    pub fn exists(&self, relpath: &str) -> bool {
        let path = self.fullpath(relpath);
        match fs::metadata(&path) {
            Ok(_) => true,
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => {
                self.reporter
                    .error(&format!("Cannot stat '{}': {}", path.display(), e));
                false
            }
        }
    }

    /// Verify that the field holds exactly `wanted`, in any order.
    pub fn should_have_content(&self, wanted: &[&str], message: impl Into<Message>) -> bool {
        Verifier::from_env(self.reporter).equal_without_order(&self.list(), wanted, message)
    }

    /// Verify that `wanted` exists in the field.
    pub fn should_have_file(&self, wanted: &str, message: impl Into<Message>) -> bool {
        if self.exists(wanted) {
            return true;
        }
        self.reporter
            .log(&format!("Test field should contain {}", wanted));
        self.reporter.error(&message.into().render());
        false
    }

    /// Verify that `unwanted` does not exist in the field.
    pub fn should_not_have_file(&self, unwanted: &str, message: impl Into<Message>) -> bool {
        if !self.exists(unwanted) {
            return true;
        }
        self.reporter
            .log(&format!("Test field should not contain {}", unwanted));
        self.reporter.error(&message.into().render());
        false
    }

    /// Remove the field now, failing the test if it cannot be removed.
    pub fn close(self) {
        let Self { reporter, root } = self;
        if let Err(e) = root.close() {
            reporter.fatal(&format!("Cannot remove temporary test field: {}", e));
        }
    }
}

fn create_empty_file(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::File::create(path).map(|_| ())
}

fn has_extension(path: &Path) -> bool {
    path.file_name()
        .map_or(false, |name| name.to_string_lossy().contains('.'))
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// In-memory reader over `content`, for mocking files.
pub fn io_reader(content: &str) -> Cursor<Vec<u8>> {
    Cursor::new(content.as_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use replaykit_core::TestContext;
    use std::io::BufRead;

    #[test]
    fn test_populate_and_list() {
        let t = TestContext::new("field::populate");
        let field = TestField::new(&t);

        field.populate(&["b", "a/x.txt", "a/sub", "c.md"]);

        assert_eq!(field.list(), vec!["a", "a/sub", "a/x.txt", "b", "c.md"]);
        assert!(field.root().join("a/x.txt").is_file());
        assert!(field.root().join("b").is_dir());
    }

    #[test]
    fn test_populate_dotfiles_are_files() {
        let t = TestContext::new("field::dotfiles");
        let field = TestField::new(&t);

        field.populate(&[".hidden", "conf/.env", "bin"]);

        assert!(field.root().join(".hidden").is_file());
        assert!(field.root().join("conf/.env").is_file());
        assert!(field.root().join("bin").is_dir());
        assert_eq!(field.list(), vec![".hidden", "bin", "conf", "conf/.env"]);
    }

    #[test]
    fn test_list_walks_depth_first_in_lexical_order() {
        let t = TestContext::new("field::walk");
        let field = TestField::new(&t);

        field.populate(&["b/z.txt", "a.txt", "b/c/d.txt", "b/a", "ab"]);

        assert_eq!(
            field.list(),
            vec!["a.txt", "ab", "b", "b/a", "b/c", "b/c/d.txt", "b/z.txt"]
        );
    }

    #[test]
    fn test_fullpath_is_confined() {
        let t = TestContext::new("field::fullpath");
        let field = TestField::new(&t);

        assert_eq!(field.fullpath("a/b.txt"), field.root().join("a").join("b.txt"));
        assert_eq!(field.fullpath("/etc/passwd"), field.root().join("etc").join("passwd"));
        assert_eq!(field.fullpath("../../x"), field.root().join("x"));
        assert_eq!(field.fullpath("a/../b"), field.root().join("b"));
        assert_eq!(field.fullpath(""), field.root());
    }

    #[test]
    fn test_exists() {
        let t = TestContext::new("field::exists");
        let field = TestField::new(&t);
        field.populate(&["dir/file.txt"]);

        assert!(field.exists("dir"));
        assert!(field.exists("/dir/file.txt"));
        assert!(!field.exists("dir/other.txt"));
    }

    #[test]
    fn test_should_have_content() {
        let t = TestContext::new("field::content");
        let field = TestField::new(&t);
        field.populate(&["a", "a/b.txt"]);

        assert!(field.should_have_content(&["a/b.txt", "a"], ""));
        assert!(!field.should_have_content(&["a"], "tree"));

        let failures = t.take_failures();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].starts_with("tree\n"));
    }

    #[test]
    fn test_should_have_file() {
        let t = TestContext::new("field::files");
        let field = TestField::new(&t);
        field.populate(&["present.txt"]);

        assert!(field.should_have_file("present.txt", "unused"));
        assert!(field.should_not_have_file("absent.txt", "unused"));
        assert!(!field.should_have_file("absent.txt", "missing file"));
        assert!(!field.should_not_have_file("present.txt", "unexpected file"));

        assert_eq!(t.take_failures(), vec!["missing file", "unexpected file"]);
        assert!(t
            .logs()
            .iter()
            .any(|l| l == "Test field should contain absent.txt"));
    }

    #[test]
    fn test_removed_on_drop_and_close() {
        let t = TestContext::new("field::cleanup");

        let field = TestField::new(&t);
        let root = field.root().to_path_buf();
        drop(field);
        assert!(!root.exists());

        let field = TestField::new(&t);
        let root = field.root().to_path_buf();
        field.close();
        assert!(!root.exists());
    }

    #[test]
    fn test_io_reader() {
        let lines: Vec<String> = io_reader("one\ntwo\n").lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["one", "two"]);
    }
}
