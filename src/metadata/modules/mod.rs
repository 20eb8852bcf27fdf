//! The modules of a multi-file assembly.
//!
//! [`ModuleCollection`] owns the manifest file of an assembly and every satellite module it
//! opens on its behalf. Index `0` is the manifest module; indexes `1..count` are the rows of the
//! manifest's `File` table, in table order. Satellites are opened on first access, exactly once,
//! however many threads ask for them concurrently.
//!
//! # Architecture
//!
//! - The manifest module and the number of satellites are fixed at construction and read
//!   without locking.
//! - Satellite slots and every owned file sit behind a single [`std::sync::RwLock`]. Loaded
//!   slots are served under the shared lock; a load takes the exclusive lock and checks the slot
//!   again before opening anything.
//! - [`ModuleCollection::dispose`] takes the exclusive lock, so it never overlaps a load. It
//!   releases the manifest and every opened satellite once; later calls do nothing.
//!
//! # Examples
//!
//! ```rust,no_run
//! use cilmeta::{LoaderConfig, ModuleCollection};
//! use std::path::Path;
//!
//! let modules = ModuleCollection::open(Path::new("Assembly.dll"), &LoaderConfig::default())?;
//! for module in modules.iter()? {
//!     let module = module?;
//!     println!("{} (metadata: {})", module.name(), module.has_metadata());
//! }
//! modules.dispose()?;
//! # Ok::<(), cilmeta::Error>(())
//! ```

mod config;
mod opener;
mod source;

pub use config::LoaderConfig;
pub use opener::FileSystemOpener;
pub use source::{FileOpener, MetadataFile};

use std::{
    path::Path,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, PoisonError, RwLock,
    },
};

use log::{debug, warn};

use crate::{
    metadata::{
        index::ZeroBasedIndex,
        module::{Module, ModuleRc},
        pefile::PeFile,
        tables::TableId,
    },
    Error, Result,
};

/// A satellite module that has been opened
enum LoadedModule {
    /// Backed by a metadata file owned by the collection
    Metadata(Box<dyn MetadataFile>),
    /// A file without metadata; nothing to release
    NonMetadata(ModuleRc),
}

impl LoadedModule {
    fn module(&self) -> ModuleRc {
        match self {
            LoadedModule::Metadata(file) => file.module(),
            LoadedModule::NonMetadata(module) => module.clone(),
        }
    }
}

enum ModuleSlot {
    Unloaded,
    Loaded(LoadedModule),
}

/// Everything the collection releases on disposal
struct Resources {
    manifest: Box<dyn MetadataFile>,
    satellites: Vec<ModuleSlot>,
}

impl Resources {
    fn release(mut self) -> usize {
        self.manifest.dispose();
        let mut released = 1;

        for slot in &mut self.satellites {
            if let ModuleSlot::Loaded(LoadedModule::Metadata(file)) = slot {
                file.dispose();
                released += 1;
            }
        }

        released
    }
}

/// The ordered set of modules forming one assembly.
///
/// `ModuleCollection` is `Send + Sync`; share it behind an [`Arc`] to load modules from several
/// threads.
pub struct ModuleCollection {
    manifest_module: ModuleRc,
    satellite_count: usize,
    disposed: AtomicBool,
    resources: RwLock<Option<Resources>>,
    opener: Box<dyn FileOpener>,
}

impl ModuleCollection {
    /// Creates a collection that takes ownership of `manifest`.
    ///
    /// The manifest is disposed when the collection is, or right away if construction fails.
    ///
    /// ## Arguments
    /// * `manifest` - The file holding the assembly manifest
    /// * `opener` - Opens satellite modules by name
    ///
    /// # Errors
    /// Returns [`crate::Error::Disposed`] if `manifest` has already been disposed, or the error
    /// of [`MetadataFile::row_count`] if its `File` table cannot be read.
    pub fn new(
        mut manifest: Box<dyn MetadataFile>,
        opener: Box<dyn FileOpener>,
    ) -> Result<ModuleCollection> {
        if manifest.is_disposed() {
            return Err(Error::Disposed("manifest file"));
        }

        let file_rows = match manifest.row_count(TableId::File) {
            Ok(rows) => rows as usize,
            Err(error) => {
                manifest.dispose();
                return Err(error);
            }
        };

        let mut satellites = Vec::with_capacity(file_rows);
        satellites.resize_with(file_rows, || ModuleSlot::Unloaded);

        debug!(
            "module collection for '{}' with {} satellite files",
            manifest.module().name(),
            file_rows
        );

        Ok(ModuleCollection {
            manifest_module: manifest.module(),
            satellite_count: file_rows,
            disposed: AtomicBool::new(false),
            resources: RwLock::new(Some(Resources {
                manifest,
                satellites,
            })),
            opener,
        })
    }

    /// Opens the assembly whose manifest is stored at `path`.
    ///
    /// Satellites are resolved and accessed according to `config`.
    ///
    /// # Errors
    /// Returns an error if the manifest cannot be read or parsed.
    pub fn open(path: &Path, config: &LoaderConfig) -> Result<ModuleCollection> {
        let manifest = PeFile::from_path(path, config.memory_mapped)?;
        let opener = FileSystemOpener::new(path, config);

        Self::new(Box::new(manifest), Box::new(opener))
    }

    /// Number of modules: the manifest plus one per `File` row
    ///
    /// # Errors
    /// Returns [`crate::Error::Disposed`] after [`ModuleCollection::dispose`].
    pub fn count(&self) -> Result<usize> {
        self.check_live()?;
        Ok(self.satellite_count + 1)
    }

    /// The manifest module, same as `get(0)`
    ///
    /// # Errors
    /// Returns [`crate::Error::Disposed`] after [`ModuleCollection::dispose`].
    pub fn manifest(&self) -> Result<ModuleRc> {
        self.check_live()?;
        Ok(self.manifest_module.clone())
    }

    /// Returns the module at `index`, opening it on first access.
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexOutOfRange`] if `index >= count`,
    /// [`crate::Error::Disposed`] after disposal, or the error raised while opening the module.
    /// A failed load leaves the slot unloaded, so a later call tries again.
    pub fn get(&self, index: usize) -> Result<ModuleRc> {
        self.check_live()?;

        let count = self.satellite_count + 1;
        if index >= count {
            return Err(Error::IndexOutOfRange { index, count });
        }

        if index == 0 {
            return Ok(self.manifest_module.clone());
        }

        let slot = index - 1;
        {
            let guard = read_lock!(self.resources);
            let Some(resources) = guard.as_ref() else {
                return Err(Error::Disposed("module collection"));
            };

            if let Some(ModuleSlot::Loaded(loaded)) = resources.satellites.get(slot) {
                return Ok(loaded.module());
            }
        }

        let mut guard = write_lock!(self.resources);
        let Some(resources) = guard.as_mut() else {
            return Err(Error::Disposed("module collection"));
        };

        if let Some(ModuleSlot::Loaded(loaded)) = resources.satellites.get(slot) {
            return Ok(loaded.module());
        }

        let loaded = match self.load(resources.manifest.as_ref(), slot) {
            Ok(loaded) => loaded,
            Err(error) => {
                warn!("failed to load module {}: {}", index, error);
                return Err(error);
            }
        };

        let module = loaded.module();
        if let Some(entry) = resources.satellites.get_mut(slot) {
            *entry = ModuleSlot::Loaded(loaded);
        }

        Ok(module)
    }

    /// Iterates over all modules in index order, loading them as needed.
    ///
    /// # Errors
    /// Returns [`crate::Error::Disposed`] after [`ModuleCollection::dispose`].
    pub fn iter(&self) -> Result<ModuleIter<'_>> {
        Ok(ModuleIter {
            collection: self,
            next: 0,
            count: self.count()?,
        })
    }

    /// Releases the manifest and every opened satellite. Calling it again has no effect.
    ///
    /// # Errors
    /// Returns [`crate::Error::LockError`] if the lock has been poisoned.
    pub fn dispose(&self) -> Result<()> {
        let mut guard = write_lock!(self.resources);
        self.disposed.store(true, Ordering::Release);

        if let Some(resources) = guard.take() {
            let released = resources.release();
            debug!("module collection disposed, released {} files", released);
        }

        Ok(())
    }

    /// True once [`ModuleCollection::dispose`] has been called
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    fn check_live(&self) -> Result<()> {
        if self.is_disposed() {
            return Err(Error::Disposed("module collection"));
        }
        Ok(())
    }

    fn load(&self, manifest: &dyn MetadataFile, slot: usize) -> Result<LoadedModule> {
        let row = manifest.file_row(ZeroBasedIndex::try_from(slot)?)?;
        let name = manifest.read_string(row.name)?;

        if !row.contains_metadata() {
            debug!("module {} '{}' has no metadata", slot + 1, name);
            return Ok(LoadedModule::NonMetadata(Arc::new(Module::NonMetadata {
                name,
            })));
        }

        let file = self.opener.open(&name)?;
        debug!("module {} '{}' loaded", slot + 1, name);

        Ok(LoadedModule::Metadata(file))
    }
}

impl Drop for ModuleCollection {
    fn drop(&mut self) {
        let resources = self
            .resources
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(resources) = resources {
            *self.disposed.get_mut() = true;
            resources.release();
        }
    }
}

/// Iterator over the modules of a [`ModuleCollection`], created by [`ModuleCollection::iter`]
pub struct ModuleIter<'a> {
    collection: &'a ModuleCollection,
    next: usize,
    count: usize,
}

impl Iterator for ModuleIter<'_> {
    type Item = Result<ModuleRc>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }

        let index = self.next;
        self.next += 1;
        Some(self.collection.get(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ModuleIter<'_> {}
