use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use tempfile::TempDir;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Stand-in for the `op` binary. It answers the commands the client sends
/// and has a few extra commands for exercising failure paths.
pub const FAKE_OP: &str = r#"#!/bin/sh
case "$1" in
  --version)
    echo "2.30.0"
    ;;
  read)
    case "$2" in
      */binary) printf '\377\376secret\n' ;;
      *) printf 'value-for-%s\n' "$2" ;;
    esac
    ;;
  vault)
    echo '[{"id":"v1","name":"Personal"},{"id":"v2","name":"Shared"}]'
    ;;
  item)
    echo "[{\"id\":\"i1\",\"title\":\"GitHub\",\"category\":\"LOGIN\",\"vault\":{\"name\":\"$4\"}}]"
    ;;
  fail)
    echo "" >&2
    echo "[ERROR] something went wrong" >&2
    exit 3
    ;;
  hang)
    exec sleep 5
    ;;
  orphan)
    sleep 3 &
    echo "2.30.0"
    exit 0
    ;;
  big)
    head -c 200000 /dev/zero | tr '\000' 'a'
    ;;
  binary)
    printf '\377\376secret\n'
    ;;
  *)
    echo "unknown command: $1" >&2
    exit 1
    ;;
esac
"#;

// Tests in one binary share the environment and fork concurrently; a script
// that is still open for writing in another thread cannot be executed.
static FIXTURE_LOCK: Mutex<()> = Mutex::new(());

/// Test helper that owns a temporary directory with a fake `op` script
pub struct TestFixture {
    _temp_dir: TempDir,
    pub base_path: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl TestFixture {
    pub fn new() -> Self {
        let lock = FIXTURE_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let temp_dir = TempDir::new().unwrap();
        let base_path = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            base_path,
            _lock: lock,
        }
    }

    /// Writes the fake `op` script and returns its path
    #[cfg(unix)]
    pub fn fake_op(&self) -> PathBuf {
        let path = self.base_path.join("op");
        fs::write(&path, FAKE_OP).unwrap();
        let mut permissions = fs::metadata(&path).unwrap().permissions();
        permissions.set_mode(0o755);
        fs::set_permissions(&path, permissions).unwrap();
        path
    }

    /// Writes a file into the fixture directory and returns its path
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.base_path.join(name);
        fs::write(&path, contents).unwrap();
        path
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
