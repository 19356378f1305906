//! Dispatch and contract errors.

use orbit_registry::{ImplementationHandle, ResolveError};
use thiserror::Error;

/// Errors raised while routing a contract call.
///
/// Contract error types must implement `From<DispatchError>` so routing
/// failures can be reported through the contract's own `Result`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
	/// The designated subject argument is missing or `None`.
	#[error("cannot find subject for {service_point}::{method}")]
	SubjectNotFound {
		/// Service point name.
		service_point: String,
		/// Called method.
		method: &'static str,
	},

	/// No registration matched the subject.
	#[error("no service registered at '{service_point}' for subject type {subject_type}")]
	ServiceNotFound {
		/// Service point name.
		service_point: String,
		/// Concrete subject type name.
		subject_type: &'static str,
	},

	/// A registration matched but its implementation is not available.
	#[error("implementation '{implementation}' for '{service_point}' is not available")]
	ComponentNotFound {
		/// Service point name.
		service_point: String,
		/// Implementation handle from the matched registration.
		implementation: ImplementationHandle,
	},

	/// Resolution failed.
	#[error(transparent)]
	Resolve(#[from] ResolveError),
}

/// Errors raised while validating a contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
	/// A routed method has no `#[subject]` parameter.
	#[error("method {contract}::{method} has no subject parameter")]
	MissingSubject {
		/// Contract name.
		contract: &'static str,
		/// Method name.
		method: &'static str,
	},

	/// A routed method marks more than one parameter as subject.
	#[error("method {contract}::{method} has {count} subject parameters")]
	AmbiguousSubject {
		/// Contract name.
		contract: &'static str,
		/// Method name.
		method: &'static str,
		/// Number of subject parameters.
		count: usize,
	},

	/// A signal contract must have exactly one routed method.
	#[error("{contract} is not a signal contract: it has {methods} routed methods")]
	NotSignal {
		/// Contract name.
		contract: &'static str,
		/// Number of routed methods found.
		methods: usize,
	},

	/// The signal's parameters do not line up with the target method.
	#[error("signal {signal} does not match target: expected {expected}, found {found}")]
	SignalMismatch {
		/// Signal contract name.
		signal: &'static str,
		/// Target method signature.
		expected: String,
		/// Signal method signature.
		found: String,
	},
}
