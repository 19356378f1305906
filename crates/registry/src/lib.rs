//! Registration store and specificity-ordered resolution.
//!
//! Implementations register under a [`RegistrationKey`] made of a service
//! point name, a subject type and a set of `tag = value` constraints. The
//! [`Resolver`] turns a subject into a ranked list of probe keys and returns
//! the first registration that matches one exactly.
//!
//! # Registration sources
//!
//! - Runtime: [`RegistrationStore::add`] / [`RegistrationStore::activate`]
//! - Static: [`domain_service!`] declarations, loaded with
//!   [`RegistrationStore::load_static`]
//! - Manifest: TOML files, loaded with [`RegistrationStore::load_manifest`]

pub mod error;
pub mod key;
pub mod manifest;
pub mod resolver;
mod statics;
pub mod store;

pub use error::{ManifestError, ResolveError};
#[doc(hidden)]
pub use inventory;
pub use key::{Constraint, ImplementationHandle, Registration, RegistrationKey, RegistrationSource};
pub use manifest::{Manifest, ServiceEntry};
pub use resolver::{Candidate, Resolver};
pub use statics::{StaticRegistration, static_registrations};
pub use store::{ActiveRegistration, RegistrationStore, StoreSnapshot};
