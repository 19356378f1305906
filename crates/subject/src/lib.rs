//! Subject types and tagged property extraction.
//!
//! A *subject* is any value whose runtime type and tagged properties decide
//! which implementation handles a call. This crate holds the declared type
//! hierarchy and turns a subject into the [`PropertySet`] the resolver probes
//! with.
//!
//! # Modules
//!
//! - [`types`] - Declared subject hierarchy ([`TypeCatalog`])
//! - [`property`] - [`TaggedProperty`] and name-unique [`PropertySet`]
//! - [`extract`] - [`PropertyExtractor`] and its per-type [`PropertyCache`]
//! - [`value`] - Raw accessor values and normalization input

pub mod error;
pub mod extract;
pub mod property;
mod subject;
pub mod types;
pub mod value;

pub use error::{CatalogError, PropertyError};
pub use extract::{Accessor, PropertyCache, PropertyExtractor};
pub use property::{PropertySet, TaggedProperty};
pub use subject::Subject;
pub use types::{TagDecl, TypeCatalog, TypeCatalogBuilder, TypeDecl, TypeKey, TypeNode};
pub use value::{IntoTagValue, TagValue};
