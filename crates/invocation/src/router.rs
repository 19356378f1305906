//! Routing of one contract call to the resolved implementation.

use std::sync::Arc;

use orbit_registry::Resolver;

use crate::arguments::Argument;
use crate::contract::MethodDescriptor;
use crate::error::DispatchError;
use crate::factory::ComponentFactory;

/// Routes calls on one service point.
pub struct MethodRouter<C: ?Sized> {
	service_point: Arc<str>,
	resolver: Resolver,
	components: Arc<dyn ComponentFactory<C>>,
}

impl<C: ?Sized> MethodRouter<C> {
	/// Creates a router for `service_point`.
	pub fn new(
		service_point: impl Into<Arc<str>>,
		resolver: Resolver,
		components: Arc<dyn ComponentFactory<C>>,
	) -> Self {
		Self {
			service_point: service_point.into(),
			resolver,
			components,
		}
	}

	/// Service point name used as the registration key's first component.
	pub fn service_point(&self) -> &str {
		&self.service_point
	}

	/// The resolver.
	pub fn resolver(&self) -> &Resolver {
		&self.resolver
	}

	/// Resolves the subject of `args` and invokes `call` on the matched
	/// implementation.
	///
	/// The subject is read at `method`'s designated index. Routing failures
	/// are converted into the contract's error type; whatever `call` returns
	/// is passed through unchanged.
	pub fn route<R, E>(
		&self,
		method: &MethodDescriptor,
		args: &[Argument<'_>],
		call: impl FnOnce(&C) -> Result<R, E>,
	) -> Result<R, E>
	where
		E: From<DispatchError>,
	{
		let subject = method
			.subject_index()
			.and_then(|index| args.get(index))
			.and_then(Argument::as_subject)
			.ok_or_else(|| DispatchError::SubjectNotFound {
				service_point: self.service_point.to_string(),
				method: method.name,
			})?;

		let registration = self
			.resolver
			.resolve(&self.service_point, subject)
			.map_err(DispatchError::from)?
			.ok_or_else(|| DispatchError::ServiceNotFound {
				service_point: self.service_point.to_string(),
				subject_type: subject.subject_type_name(),
			})?;

		let component = self
			.components
			.component(registration.implementation())
			.ok_or_else(|| DispatchError::ComponentNotFound {
				service_point: self.service_point.to_string(),
				implementation: registration.implementation().clone(),
			})?;

		tracing::debug!(
			service_point = %self.service_point,
			method = method.name,
			implementation = %registration.implementation(),
			"routing call",
		);
		call(&component)
	}
}

impl<C: ?Sized> std::fmt::Debug for MethodRouter<C> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MethodRouter")
			.field("service_point", &self.service_point)
			.finish_non_exhaustive()
	}
}
