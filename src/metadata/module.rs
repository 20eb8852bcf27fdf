//! Modules of an assembly.
//!
//! An assembly is made of one manifest module and any number of satellite files listed in the
//! manifest's `File` table. Satellites either carry their own metadata, or are plain resource
//! files that are only known by name.

use std::{fmt, sync::Arc};

/// A reference to a [`Module`]. Every caller asking for the same module receives the same `Arc`.
pub type ModuleRc = Arc<Module>;

/// A module backed by a file with metadata, described by its `Module` table row
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetadataModule {
    /// Name of this module
    pub name: String,
    /// a 2-byte value, reserved, shall be zero
    pub generation: u32,
    /// A Guid used to distinguish between two versions of the same module
    pub mvid: uguid::Guid,
}

/// One module of an assembly
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Module {
    /// A file with its own metadata
    Metadata(MetadataModule),
    /// A file without metadata, e.g. a linked resource
    NonMetadata {
        /// The file name from the `File` table
        name: String,
    },
}

impl Module {
    /// Name of the module
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Module::Metadata(module) => &module.name,
            Module::NonMetadata { name } => name,
        }
    }

    /// True if this module is backed by metadata
    #[must_use]
    pub fn has_metadata(&self) -> bool {
        matches!(self, Module::Metadata(_))
    }

    /// The module version id, `None` for modules without metadata
    #[must_use]
    pub fn mvid(&self) -> Option<uguid::Guid> {
        match self {
            Module::Metadata(module) => Some(module.mvid),
            Module::NonMetadata { .. } => None,
        }
    }
}

impl From<MetadataModule> for Module {
    fn from(module: MetadataModule) -> Self {
        Module::Metadata(module)
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
