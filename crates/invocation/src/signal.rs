//! Signal bindings: single-method callbacks fired for a target method.
//!
//! A signal contract has exactly one routed method whose parameters mirror a
//! target method of another contract. Binding checks that shape, then
//! registers the implementation like any domain service; dropping the
//! binding withdraws it.

use std::sync::Arc;

use orbit_registry::{Registration, RegistrationStore};

use crate::contract::{Contract, MethodDescriptor};
use crate::error::ContractError;
use crate::factory::{ActiveService, Components};

/// An active signal implementation.
#[must_use = "the signal is unbound when the binding is dropped"]
pub struct SignalBinding<S: ?Sized + Send + Sync + 'static> {
	target: &'static str,
	service: ActiveService<S>,
}

impl<S: ?Sized + Contract + Send + Sync + 'static> SignalBinding<S> {
	/// Binds `component` as the signal implementation for `registration`.
	///
	/// `target` is the method the signal is fired for; the signal method's
	/// parameter types must equal the target's.
	pub fn bind(
		target: &'static MethodDescriptor,
		registration: Registration,
		component: Arc<S>,
		store: &Arc<RegistrationStore>,
		components: &Arc<Components<S>>,
	) -> Result<Self, ContractError> {
		S::DESCRIPTOR.check_signal_for(target)?;
		tracing::info!(
			signal = S::DESCRIPTOR.name,
			target = target.name,
			key = %registration.key(),
			"signal bound",
		);
		Ok(Self {
			target: target.name,
			service: components.activate(store, registration, component),
		})
	}
}

impl<S: ?Sized + Send + Sync + 'static> SignalBinding<S> {
	/// Name of the target method.
	pub fn target(&self) -> &'static str {
		self.target
	}

	/// The bound registration.
	pub fn registration(&self) -> &Registration {
		self.service.registration()
	}
}

impl<S: ?Sized + Send + Sync + 'static> std::fmt::Debug for SignalBinding<S> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SignalBinding")
			.field("target", &self.target)
			.field("registration", self.registration())
			.finish()
	}
}
