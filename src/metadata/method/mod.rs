//! Method-level layout primitives.
//!
//! Only the exception-handling data sections that follow a method body are decoded here; IL
//! instructions themselves are out of scope.
//!
//! - [`FatExceptionHeader`]: the 4-byte header of a fat exception section
//! - [`FatExceptionClause`], [`ExceptionSection`]: the clauses that follow it
//! - [`ExceptionHeaderFlags`], [`ExceptionHandlerFlags`]: section and clause flags

mod exceptions;

pub use exceptions::*;
