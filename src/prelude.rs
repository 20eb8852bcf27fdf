//! # cilmeta Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the cilmeta library.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all cilmeta operations
pub use crate::Error;

/// The result type used throughout cilmeta
pub use crate::Result;

// ================================================================================================
// Modules
// ================================================================================================

pub use crate::{
    FileOpener, LoaderConfig, MetadataFile, Module, ModuleCollection, ModuleRc, PeFile,
};

// ================================================================================================
// Indexes and Tokens
// ================================================================================================

pub use crate::metadata::index::{OneBasedIndex, ZeroBasedIndex};
pub use crate::metadata::tables::{TableId, TypeDefOrRef};
pub use crate::metadata::token::{MetadataToken, Token};

// ================================================================================================
// Method Sections
// ================================================================================================

pub use crate::metadata::method::{
    ExceptionHandlerFlags, ExceptionHeaderFlags, FatExceptionClause, FatExceptionHeader,
};
