//! # Header Module
//!
//! Everything that deals with one file's header: where the desired header
//! comes from ([`definition`]), how its tokens are expanded ([`properties`]),
//! and how it is inserted, replaced or removed ([`document`]).

pub mod definition;
pub mod document;
mod file_io;
pub mod preparer;
pub mod properties;

pub use definition::{DEFINITION_FILE_EXTENSION, HeaderDefinitionMap, is_definition_file};
pub use document::{AccessMode, DocumentError, HeaderAction, HeaderDocument, Rewrite};
pub use properties::{AdditionalProperty, PropertyExpander};
