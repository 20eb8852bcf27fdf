//! Metadata decoding for CLI modules.
//!
//! This module contains the decoding layer a decompiler builds on: the CLR header and metadata
//! root of a PE image, the `#~`, `#Strings` and `#GUID` streams, the row and coded indexes that
//! link tables together, method body exception sections, and the lazily loaded set of modules
//! forming one assembly.
//!
//! # Key Components
//!
//! - [`modules`] - [`modules::ModuleCollection`], the thread-safe set of an assembly's modules
//! - [`pefile`] - A PE image or metadata blob with its parsed streams
//! - [`tables`] - Table identifiers, column widths, coded indexes and typed row views
//! - [`method`] - Fat exception headers and clauses of method bodies
//! - [`index`] and [`token`] - Row positions and metadata tokens
//!
//! # Examples
//!
//! ```rust,no_run
//! use cilmeta::metadata::{pefile::PeFile, modules::MetadataFile, tables::TableId};
//! use std::path::Path;
//!
//! let manifest = PeFile::from_path(Path::new("Assembly.dll"), true)?;
//! println!("{}: {} files", manifest.module().name(), manifest.row_count(TableId::File)?);
//! # Ok::<(), cilmeta::Error>(())
//! ```

/// Implementation of the Header of CIL
pub mod cor20header;
/// Zero- and one-based row positions
pub mod index;
/// Method body sections
pub mod method;
/// The module representation handed out by [`modules::ModuleCollection`]
pub mod module;
/// Lazily loaded modules of a multi-file assembly
pub mod modules;
/// PE images and metadata blobs
pub mod pefile;
/// Implementation of the root metadata structure
pub mod root;
/// Implementation of the physical metadata streams
pub mod streams;
/// Implementation of the '#~' stream tables
pub mod tables;
/// Metadata tokens
pub mod token;
