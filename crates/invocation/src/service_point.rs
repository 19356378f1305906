//! Contract-typed entry points.

use std::sync::Arc;

use orbit_registry::Resolver;

use crate::arguments::Argument;
use crate::contract::{Contract, MethodDescriptor};
use crate::error::{ContractError, DispatchError};
use crate::factory::ComponentFactory;
use crate::router::MethodRouter;

/// Callable front of a contract.
///
/// [`service_point!`](crate::service_point) implements the contract trait for
/// `ServicePoint<dyn Trait>`, so callers hold a value that looks like any
/// other implementation while every call is routed by subject.
pub struct ServicePoint<C: ?Sized> {
	router: MethodRouter<C>,
}

impl<C: ?Sized + Contract> ServicePoint<C> {
	/// Builds a service point named `name` after validating the contract.
	pub fn new(
		name: impl Into<Arc<str>>,
		resolver: Resolver,
		components: Arc<dyn ComponentFactory<C>>,
	) -> Result<Self, ContractError> {
		C::DESCRIPTOR.validate()?;
		let router = MethodRouter::new(name, resolver, components);
		tracing::debug!(
			service_point = router.service_point(),
			contract = C::DESCRIPTOR.name,
			"service point created",
		);
		Ok(Self { router })
	}

	/// Builds a service point named after the contract trait.
	pub fn for_contract(
		resolver: Resolver,
		components: Arc<dyn ComponentFactory<C>>,
	) -> Result<Self, ContractError> {
		Self::new(C::DESCRIPTOR.name, resolver, components)
	}
}

impl<C: ?Sized> ServicePoint<C> {
	/// Service point name.
	pub fn name(&self) -> &str {
		self.router.service_point()
	}

	/// The underlying router.
	pub fn router(&self) -> &MethodRouter<C> {
		&self.router
	}

	/// Routes one call; used by the generated forwarders.
	#[doc(hidden)]
	pub fn route<R, E>(
		&self,
		method: &MethodDescriptor,
		args: &[Argument<'_>],
		call: impl FnOnce(&C) -> Result<R, E>,
	) -> Result<R, E>
	where
		E: From<DispatchError>,
	{
		self.router.route(method, args, call)
	}
}

impl<C: ?Sized> std::fmt::Debug for ServicePoint<C> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("ServicePoint").field(&self.name()).finish()
	}
}
