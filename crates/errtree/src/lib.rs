//! # errtree
//!
//! Layered error values built from plain errors, sentinels and key/value
//! metadata, without defining a new error type per layer.
//!
//! ## Design Philosophy
//!
//! - **Sentinel**: Know which layer failed (e.g. driver, repository), matched by identity
//! - **Metadata**: Assist in locating the cause with ordered key/value pairs
//! - **Cause**: Keep the upstream failure reachable instead of flattening it to text
//! - **Error**: One opaque handle for everything, so nothing leaks a concrete shape
//!
//! ## Usage
//!
//! ```rust
//! use errtree::{Error, meta, new_err, sentinel, with_err};
//!
//! sentinel!(ERR_REPOSITORY = "repository");
//! sentinel!(ERR_DRIVER = "driver");
//!
//! fn load(id: u64) -> Result<(), Error> {
//!     let io = Error::external(std::io::Error::other("connection refused"));
//!     Err(new_err!(&ERR_REPOSITORY, &ERR_DRIVER, "id", id, io))
//! }
//!
//! let err = load(42).unwrap_err();
//! let err = with_err!(Some(&err), "table", "users");
//!
//! assert!(err.is(&ERR_DRIVER));
//! assert_eq!(meta(&err).len(), 2);
//! assert_eq!(
//!     err.to_string(),
//!     "repository; driver; id=42; table=users; connection refused"
//! );
//! ```
//!
//! ## Principles
//!
//! - Construction never fails out of band: a malformed argument list returns
//!   an error value tagged with a validation sentinel
//! - Enrichment appends metadata to the most recent entry reachable from the
//!   top, one level deep, and never adds a sentinel or a cause
//! - Values are immutable; enrichment allocates new nodes
//! - Entries from a different engine copy are flagged, never merged into

mod combine;
mod engine;
mod entry;
mod error;
mod extract;
mod kind;
mod parse;
mod sentinel;
mod value;

pub use combine::combine;
pub use engine::{Engine, EngineOption, OriginId};
pub use error::Error;
pub use extract::{children, find, meta};
pub use kind::ViolationKind;
pub use sentinel::{
    ERR_CROSS_PACKAGE_ERROR, ERR_INVALID_ARGUMENT_TYPE, ERR_MISPLACED_ERROR, ERR_MISSING_SENTINEL,
    ERR_ODD_KEY_VALUE_COUNT, ERR_TRAILING_KEY, Sentinel,
};
pub use value::{AnyValue, Arg, Kv, Value};

/// Result type alias using errtree Error
pub type Result<T> = std::result::Result<T, Error>;

/// Build an entry with the process-wide engine. See [`Engine::construct`].
pub fn construct(args: Vec<Arg>) -> Error {
    Engine::global().construct(args)
}

/// Enrich with the process-wide engine. See [`Engine::enrich`].
pub fn enrich(prior: Option<&Error>, args: Vec<Arg>) -> Error {
    Engine::global().enrich(prior, args)
}

/// `new_err!(sentinels..., key, value, ..., cause?)`
#[macro_export]
macro_rules! new_err {
    ($($arg:expr),* $(,)?) => {
        $crate::construct(::std::vec![$($crate::Arg::from($arg)),*])
    };
}

/// `with_err!(prior, key, value, ...)` where `prior` is an `Option<&Error>`.
#[macro_export]
macro_rules! with_err {
    ($prior:expr $(, $arg:expr)* $(,)?) => {
        $crate::enrich($prior, ::std::vec![$($crate::Arg::from($arg)),*])
    };
}
