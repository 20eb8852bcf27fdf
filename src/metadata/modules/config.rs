//! Loader configuration for multi-file assemblies
//!
//! Controls where satellite modules are looked up and how their bytes are accessed.

use std::path::{Path, PathBuf};

/// Configuration for opening the satellite files of an assembly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Directory satellite names are resolved against; `None` uses the manifest's directory
    pub search_dir: Option<PathBuf>,
    /// Memory-map satellite files instead of reading them into memory
    pub memory_mapped: bool,
    /// Reject satellite names that are not plain file names, so that a crafted `File` table
    /// cannot reach outside of the search directory
    pub restrict_to_search_dir: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            search_dir: None,
            memory_mapped: true,
            restrict_to_search_dir: true,
        }
    }
}

impl LoaderConfig {
    /// Memory-maps every file, resolving satellites next to the manifest
    #[must_use]
    pub fn memory_mapped() -> Self {
        Self::default()
    }

    /// Reads every file into memory, resolving satellites next to the manifest
    ///
    /// Useful when the files may change on disk while the collection is alive.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            memory_mapped: false,
            ..Self::default()
        }
    }

    /// Resolves satellites against `dir` instead of the manifest's directory
    #[must_use]
    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dir = Some(dir.into());
        self
    }

    /// The directory satellites of `manifest` are resolved against
    #[must_use]
    pub fn search_dir_for(&self, manifest: &Path) -> PathBuf {
        match &self.search_dir {
            Some(dir) => dir.clone(),
            None => manifest
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_config_presets() {
        let default = LoaderConfig::default();
        assert!(default.memory_mapped);
        assert!(default.restrict_to_search_dir);
        assert!(default.search_dir.is_none());
        assert_eq!(LoaderConfig::memory_mapped(), default);

        let in_memory = LoaderConfig::in_memory();
        assert!(!in_memory.memory_mapped);
        assert!(in_memory.restrict_to_search_dir);
    }

    #[test]
    fn test_search_dir() {
        let manifest = Path::new("/opt/app/Main.dll");
        assert_eq!(
            LoaderConfig::default().search_dir_for(manifest),
            PathBuf::from("/opt/app")
        );
        assert_eq!(
            LoaderConfig::in_memory()
                .with_search_dir("/srv/modules")
                .search_dir_for(manifest),
            PathBuf::from("/srv/modules")
        );
        assert_eq!(
            LoaderConfig::default().search_dir_for(Path::new("Main.dll")),
            PathBuf::from("")
        );
    }
}
