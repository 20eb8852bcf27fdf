use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// # Error Categories
///
/// ## Format Errors
/// - [`Error::Malformed`] - A token, header or table decodes to a shape the format does not define
/// - [`Error::OutOfBounds`] - Attempted to read beyond the end of a buffer
/// - [`Error::Empty`] - Empty input provided
///
/// ## Reference Errors
/// - [`Error::NullReference`] - An operation needing a non-null token or index got a null one
/// - [`Error::IndexOutOfRange`] - A module index outside of `[0, count)` was requested
///
/// ## Lifecycle Errors
/// - [`Error::Disposed`] - The object has already released its backing resources
/// - [`Error::LockError`] - A lock guarding shared state was poisoned
///
/// ## I/O and External Errors
/// - [`Error::FileError`] - Filesystem I/O errors
/// - [`Error::GoblinErr`] - PE parsing errors from the goblin crate
/// - [`Error::Error`] - Miscellaneous failures, e.g. memory mapping
///
/// # Examples
///
/// ```rust,no_run
/// use cilmeta::{Error, ModuleCollection, LoaderConfig};
/// use std::path::Path;
///
/// match ModuleCollection::open(Path::new("assembly.dll"), &LoaderConfig::default()) {
///     Ok(modules) => println!("{} modules", modules.count()?),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("Malformed file: {} ({}:{})", message, file, line);
///     }
///     Err(Error::FileError(io_err)) => eprintln!("I/O error: {}", io_err),
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok::<(), cilmeta::Error>(())
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The data is damaged and could not be decoded.
    ///
    /// Raised for coded tokens with an undefined table tag, metadata headers with a
    /// wrong signature, unknown tables in the `#~` stream and similar defects of the
    /// fixed binary format. The error includes the source location where the
    /// malformation was detected.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while reading a buffer.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// An operation that requires a non-null token or one-based index was given a null one.
    #[error("The token or index is null")]
    NullReference,

    /// A module index outside of the valid range was requested.
    #[error("Module index {index} is out of range - count is {count}")]
    IndexOutOfRange {
        /// The requested index
        index: usize,
        /// The number of modules available
        count: usize,
    },

    /// The object has been disposed and can no longer be used.
    ///
    /// The associated value names the kind of object that was accessed.
    #[error("Access to disposed object - {0}")]
    Disposed(&'static str),

    /// Failed to lock target.
    #[error("Failed to lock target")]
    LockError,

    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),

    /// Error from the goblin crate during PE parsing.
    #[error("{0}")]
    GoblinErr(#[from] goblin::error::Error),
}
