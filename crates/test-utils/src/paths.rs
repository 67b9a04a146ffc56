//! Temporary directories for cache tests.

use std::path::PathBuf;

/// Returns the workspace root directory.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Path to the sample fetcher configuration shipped with the workspace.
pub fn sample_config_path() -> PathBuf {
    workspace_root().join("config").join("fetcher.yaml")
}

/// Creates a temporary cache directory, removed when the returned `TempDir` is dropped.
pub fn temp_cache_dir() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("coastal_cache")
        .tempdir()
        .expect("Failed to create temporary cache directory")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_root_is_valid() {
        let root = workspace_root();
        assert!(root.join("Cargo.toml").exists());
    }

    #[test]
    fn test_sample_config_exists() {
        assert!(sample_config_path().exists());
    }

    #[test]
    fn test_temp_cache_dir_cleanup() {
        let path = {
            let dir = temp_cache_dir();
            assert!(dir.path().exists());
            dir.path().to_path_buf()
        };
        assert!(!path.exists());
    }
}
