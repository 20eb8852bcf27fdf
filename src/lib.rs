// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
//#![deny(unsafe_code)]
// - 'file/physical.rs' uses mmap to map a file into memory

//! # cilmeta
//!
//! Metadata decoding for .NET (CLI) executables, the layer a decompiler or analyzer sits on.
//! `cilmeta` reads the ECMA-335 structures of managed PE images in pure Rust: the CLR header, the
//! metadata root and its streams, table rows and coded indexes, the exception sections of method
//! bodies, and the modules that together form a multi-file assembly.
//!
//! ## Features
//!
//! - **Lazy multi-module loading** - [`ModuleCollection`] opens satellite modules on first access,
//!   exactly once, from any number of threads
//! - **Strongly typed indexes** - [`metadata::index::OneBasedIndex`] and
//!   [`metadata::index::ZeroBasedIndex`] never mix, and [`TypeDefOrRef`] decodes, orders and
//!   hashes coded tokens
//! - **Memory-mapped access** - Files are mapped by default, see [`LoaderConfig`]
//! - **Exception sections** - [`FatExceptionHeader`] and its clauses
//!
//! ## Quick Start
//!
//! Add `cilmeta` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! cilmeta = "0.1"
//! ```
//!
//! ### Using the Prelude
//!
//! ```rust,no_run
//! use cilmeta::prelude::*;
//!
//! let modules = ModuleCollection::open("Assembly.dll".as_ref(), &LoaderConfig::default())?;
//! println!("{} modules", modules.count()?);
//! # Ok::<(), cilmeta::Error>(())
//! ```
//!
//! ### Decoding tokens
//!
//! ```rust
//! use cilmeta::{metadata::tables::TableId, TypeDefOrRef};
//!
//! let token = TypeDefOrRef::decode(0x49)?;
//! assert_eq!(token.table()?, TableId::TypeRef);
//! assert_eq!(token.index()?.value(), 0x11);
//! # Ok::<(), cilmeta::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`prelude`] - Convenient re-exports of commonly used types and traits
//! - [`metadata`] - Metadata headers, streams, tables, method sections and modules
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Logging
//!
//! Module loads and disposal are reported through the [`log`](https://docs.rs/log) facade at
//! `debug` level, failed loads at `warn`. Install any logger to see them.
//!
//! ## Standards Compliance
//!
//! ### References
//!
//! - [ECMA-335 Standard](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf) - Official CLI specification
//! - [.NET Runtime](https://github.com/dotnet/runtime) - Microsoft's reference implementation
#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;
pub(crate) mod file;

/// Convenient re-exports of the most commonly used types and traits.
///
/// ```rust,no_run
/// use cilmeta::prelude::*;
///
/// let modules = ModuleCollection::open("Assembly.dll".as_ref(), &LoaderConfig::in_memory())?;
/// for module in modules.iter()? {
///     println!("{}", module?.name());
/// }
/// # Ok::<(), Error>(())
/// ```
pub mod prelude;

/// Metadata decoding for CLI modules.
///
/// # Key Components
///
/// ## Headers
/// - [`metadata::cor20header`] - CLR 2.0 header information
/// - [`metadata::root`] - Metadata root and stream directory
///
/// ## Metadata Streams
/// - [`metadata::streams`] - The `#~`, `#Strings` and `#GUID` streams
/// - Heaps and stream headers via [`Strings`], [`Guid`], [`TablesHeader`], [`StreamHeader`]
///
/// ## Tables and Tokens
/// - [`metadata::tables`] - Table identifiers, column widths and coded indexes
/// - [`metadata::token`] - Metadata tokens for cross-references
///
/// ## Modules
/// - [`metadata::modules`] - Lazily loaded modules of an assembly
///
/// # Examples
///
/// ```rust,no_run
/// use cilmeta::{metadata::pefile::PeFile, metadata::modules::MetadataFile};
/// use std::path::Path;
///
/// let file = PeFile::from_path(Path::new("Assembly.dll"), false)?;
/// println!("Module: {}", file.module().name());
/// # Ok::<(), cilmeta::Error>(())
/// ```
pub mod metadata;

/// `cilmeta` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `cilmeta` Error type
///
/// # Examples
///
/// ```rust,no_run
/// use cilmeta::{Error, LoaderConfig, ModuleCollection};
///
/// match ModuleCollection::open("Assembly.dll".as_ref(), &LoaderConfig::default()) {
///     Ok(modules) => println!("Loaded {} modules", modules.count().unwrap_or(0)),
///     Err(Error::Malformed { message, .. }) => println!("Malformed: {}", message),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
pub use error::Error;

/// The modules of an assembly, see [`metadata::modules`]
pub use metadata::modules::{
    FileOpener, FileSystemOpener, LoaderConfig, MetadataFile, ModuleCollection, ModuleIter,
};

/// The module representation returned by [`ModuleCollection`]
pub use metadata::module::{MetadataModule, Module, ModuleRc};

/// PE images and metadata blobs
pub use metadata::pefile::PeFile;

/// Metadata streams and heaps for direct access to ECMA-335 data structures.
pub use metadata::streams::{Guid, StreamHeader, Strings, TablesHeader};

/// Coded `TypeDefOrRef` tokens
pub use metadata::tables::TypeDefOrRef;

/// Metadata tokens
pub use metadata::token::{MetadataToken, Token};

/// Fat exception sections of method bodies
pub use metadata::method::{ExceptionSection, FatExceptionClause, FatExceptionHeader};

/// Raw file access
pub use file::File;
