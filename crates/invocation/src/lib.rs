//! Subject-routed contract invocation.
//!
//! A contract declared with [`service_point!`] can be called through a
//! [`ServicePoint`]: each call picks its `#[subject]` argument, resolves the
//! most specific registration for it and forwards the call's arguments to
//! the implementation supplied by a [`ComponentFactory`].
//!
//! # Modules
//!
//! - [`contract`] - Static contract descriptors and validation
//! - [`router`] - [`MethodRouter`], the per-call dispatch path
//! - [`factory`] - Implementation instances and activation guards
//! - [`signal`] - Single-method callbacks bound to a target method

mod arguments;
pub mod contract;
pub mod error;
pub mod factory;
mod macros;
pub mod router;
mod service_point;
pub mod signal;

pub use arguments::{Argument, SubjectArg};
pub use contract::{Contract, ContractDescriptor, MethodDescriptor, ParamDescriptor};
pub use error::{ContractError, DispatchError};
pub use factory::{ActiveService, ComponentFactory, Components};
pub use router::MethodRouter;
pub use service_point::ServicePoint;
pub use signal::SignalBinding;
