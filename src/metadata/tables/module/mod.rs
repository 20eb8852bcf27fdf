//! `Module` table (0x00): the single row describing the current module.

mod raw;

pub use raw::*;
