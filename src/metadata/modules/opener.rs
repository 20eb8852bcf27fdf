use std::path::{Component, Path, PathBuf};

use log::trace;

use crate::{
    metadata::{
        modules::{FileOpener, LoaderConfig, MetadataFile},
        pefile::PeFile,
    },
    Result,
};

/// Opens satellite modules from a directory on disk as [`PeFile`]s
#[derive(Debug, Clone)]
pub struct FileSystemOpener {
    search_dir: PathBuf,
    memory_mapped: bool,
    restrict_to_search_dir: bool,
}

impl FileSystemOpener {
    /// Creates an opener for the satellites of `manifest`
    #[must_use]
    pub fn new(manifest: &Path, config: &LoaderConfig) -> Self {
        FileSystemOpener {
            search_dir: config.search_dir_for(manifest),
            memory_mapped: config.memory_mapped,
            restrict_to_search_dir: config.restrict_to_search_dir,
        }
    }

    /// Directory satellite names are resolved against
    #[must_use]
    pub fn search_dir(&self) -> &Path {
        &self.search_dir
    }

    /// Resolves a satellite name to a path
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the name is empty, or if it is not a plain file
    /// name while the opener is restricted to its search directory.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() {
            return Err(malformed_error!("Satellite module has an empty name"));
        }

        let relative = Path::new(name);
        if self.restrict_to_search_dir {
            let mut components = relative.components();
            let plain = matches!(
                (components.next(), components.next()),
                (Some(Component::Normal(_)), None)
            );
            if !plain {
                return Err(malformed_error!(
                    "Satellite module name escapes the search directory - {}",
                    name
                ));
            }
        }

        Ok(self.search_dir.join(relative))
    }
}

impl FileOpener for FileSystemOpener {
    fn open(&self, name: &str) -> Result<Box<dyn MetadataFile>> {
        let path = self.resolve(name)?;
        trace!("opening satellite module {}", path.display());

        Ok(Box::new(PeFile::from_path(&path, self.memory_mapped)?))
    }
}
