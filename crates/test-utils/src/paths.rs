//! Path utilities for locating test data files.
//!
//! Most tests use the compiled-in documents in [`crate::fixtures`]. These
//! helpers are for tests that want to point at a capabilities document on
//! disk, for example one captured from a live server via `TEST_DATA_DIR`.

use std::path::PathBuf;

/// Two levels above this crate's manifest (`crates/test-utils`).
pub fn workspace_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let root = manifest_dir.ancestors().nth(2).map(PathBuf::from);
    root.unwrap_or(manifest_dir)
}

/// The directory holding the shared XML fixtures.
pub fn testdata_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

/// First existing `name` under `$TEST_DATA_DIR`, this crate's `testdata/`,
/// or `testdata/` at the workspace root.
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    let from_env = std::env::var_os("TEST_DATA_DIR").map(|dir| PathBuf::from(dir).join(name));
    from_env
        .into_iter()
        .chain([
            testdata_dir().join(name),
            workspace_root().join("testdata").join(name),
        ])
        .find(|path| path.is_file())
}

/// Read a fixture document by file name.
///
/// Panics when the file cannot be found or read; use
/// [`require_test_file!`](crate::require_test_file) for optional data.
pub fn load_fixture(name: &str) -> String {
    let path = find_test_file(name).unwrap_or_else(|| panic!("fixture '{}' not found", name));
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {:?}: {}", path, e))
}
