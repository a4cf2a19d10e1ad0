//! JSON-LD core processing library.
//!
//! Implements the three algorithms at the heart of the JSON-LD processing
//! model: context processing, expansion and compaction. Parsing of the
//! textual interchange format, remote context loading, framing and
//! canonical hashing are treated as external collaborators and are out of
//! scope of this crate.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub use self::{
    compact::compact,
    context::Context,
    error::{Error, ErrorKind, Result},
    expand::expand,
    processor::{Processor, ProcessorOptions},
};

pub(crate) mod compact;
pub(crate) mod context;
pub(crate) mod error;
pub(crate) mod expand;
pub(crate) mod iri;
pub(crate) mod json;
pub(crate) mod processor;
pub(crate) mod syntax;
