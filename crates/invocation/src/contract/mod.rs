//! Static descriptions of service-point contracts.
//!
//! # Role
//!
//! A contract is a trait whose methods are dispatched by subject. The
//! [`service_point!`](crate::service_point) macro records, for each method,
//! its parameters and which one carries the subject. The descriptor is
//! validated once when a [`ServicePoint`](crate::ServicePoint) is built, so
//! routing never has to re-check it.
//!
//! # Invariants
//!
//! - A valid contract designates exactly one subject parameter on every
//!   method without a default body.

use crate::error::ContractError;


/// One declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamDescriptor {
	/// Parameter name.
	pub name: &'static str,
	/// Parameter type as written.
	pub ty: &'static str,
	/// True if marked `#[subject]`.
	pub subject: bool,
}

/// One contract method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodDescriptor {
	/// Method name.
	pub name: &'static str,
	/// Parameters after the receiver.
	pub params: &'static [ParamDescriptor],
	/// True if the method has a default body and is never routed.
	pub provided: bool,
}

impl MethodDescriptor {
	/// Index of the first subject parameter.
	pub fn subject_index(&self) -> Option<usize> {
		self.params.iter().position(|p| p.subject)
	}

	fn subject_count(&self) -> usize {
		self.params.iter().filter(|p| p.subject).count()
	}

	/// Parameter types in declaration order.
	pub fn param_types(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.params.iter().map(|p| p.ty)
	}

	fn signature(&self) -> String {
		format!("{}({})", self.name, self.param_types().collect::<Vec<_>>().join(", "))
	}
}

/// A whole contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractDescriptor {
	/// Contract trait name.
	pub name: &'static str,
	/// Methods in declaration order.
	pub methods: &'static [MethodDescriptor],
}

impl ContractDescriptor {
	/// Looks up a method by name.
	pub fn method(&self, name: &str) -> Option<&'static MethodDescriptor> {
		self.methods.iter().find(|m| m.name == name)
	}

	/// Methods that are routed (no default body).
	pub fn routed(&self) -> impl Iterator<Item = &'static MethodDescriptor> + '_ {
		self.methods.iter().filter(|m| !m.provided)
	}

	/// Checks that every routed method designates exactly one subject.
	pub fn validate(&self) -> Result<(), ContractError> {
		for method in self.routed() {
			match method.subject_count() {
				1 => {}
				0 => {
					return Err(ContractError::MissingSubject {
						contract: self.name,
						method: method.name,
					});
				}
				count => {
					return Err(ContractError::AmbiguousSubject {
						contract: self.name,
						method: method.name,
						count,
					});
				}
			}
		}
		Ok(())
	}

	/// Validates the contract as a signal and returns its single method.
	pub fn signal_method(&self) -> Result<&'static MethodDescriptor, ContractError> {
		self.validate()?;
		let mut routed = self.routed();
		match (routed.next(), routed.next()) {
			(Some(method), None) => Ok(method),
			_ => Err(ContractError::NotSignal {
				contract: self.name,
				methods: self.routed().count(),
			}),
		}
	}

	/// Checks that this signal contract can be fired for `target`: the signal
	/// method's parameter types must equal the target method's, in order.
	pub fn check_signal_for(&self, target: &MethodDescriptor) -> Result<(), ContractError> {
		let signal = self.signal_method()?;
		if signal.param_types().eq(target.param_types()) {
			Ok(())
		} else {
			Err(ContractError::SignalMismatch {
				signal: self.name,
				expected: target.signature(),
				found: signal.signature(),
			})
		}
	}
}

/// Implemented for `dyn Trait` by [`service_point!`](crate::service_point).
pub trait Contract {
	/// Static descriptor of the contract.
	const DESCRIPTOR: &'static ContractDescriptor;
}
