//! Implementation lookup by handle.

use std::sync::Arc;

use orbit_registry::{ActiveRegistration, ImplementationHandle, Registration, RegistrationStore};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Supplies implementation instances for matched registrations.
pub trait ComponentFactory<C: ?Sized>: Send + Sync {
	/// Returns the instance registered under `handle`.
	fn component(&self, handle: &ImplementationHandle) -> Option<Arc<C>>;
}

/// In-memory component factory for one contract.
pub struct Components<C: ?Sized> {
	instances: RwLock<FxHashMap<ImplementationHandle, Arc<C>>>,
}

impl<C: ?Sized> Default for Components<C> {
	fn default() -> Self {
		Self {
			instances: RwLock::new(FxHashMap::default()),
		}
	}
}

impl<C: ?Sized + Send + Sync + 'static> Components<C> {
	/// Creates an empty factory.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds an instance, returning the one it replaced.
	pub fn insert(
		&self,
		handle: impl Into<ImplementationHandle>,
		component: Arc<C>,
	) -> Option<Arc<C>> {
		self.instances.write().insert(handle.into(), component)
	}

	/// Removes an instance.
	pub fn remove(&self, handle: &ImplementationHandle) -> Option<Arc<C>> {
		self.instances.write().remove(handle)
	}

	/// Number of instances.
	pub fn len(&self) -> usize {
		self.instances.read().len()
	}

	/// Returns true if no instance is registered.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Installs `component` under the registration's handle and adds the
	/// registration to `store`; both are withdrawn when the guard drops.
	pub fn activate(
		self: &Arc<Self>,
		store: &Arc<RegistrationStore>,
		registration: Registration,
		component: Arc<C>,
	) -> ActiveService<C> {
		let handle = registration.implementation().clone();
		self.insert(handle.clone(), Arc::clone(&component));
		ActiveService {
			active: Some(store.activate(registration.clone())),
			registration,
			components: Arc::clone(self),
			handle,
			component,
		}
	}
}

impl<C: ?Sized + Send + Sync> ComponentFactory<C> for Components<C> {
	fn component(&self, handle: &ImplementationHandle) -> Option<Arc<C>> {
		self.instances.read().get(handle).cloned()
	}
}

impl<C: ?Sized> std::fmt::Debug for Components<C> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let instances = self.instances.read();
		let mut handles: Vec<_> = instances.keys().collect();
		handles.sort_unstable();
		f.debug_struct("Components")
			.field("handles", &handles)
			.finish()
	}
}

/// A registered and installed implementation, withdrawn on drop.
#[must_use = "the service is deactivated when the guard is dropped"]
pub struct ActiveService<C: ?Sized + Send + Sync + 'static> {
	registration: Registration,
	active: Option<ActiveRegistration>,
	components: Arc<Components<C>>,
	handle: ImplementationHandle,
	component: Arc<C>,
}

impl<C: ?Sized + Send + Sync + 'static> ActiveService<C> {
	/// The active registration.
	pub fn registration(&self) -> &Registration {
		&self.registration
	}

	/// The installed instance.
	pub fn component(&self) -> &Arc<C> {
		&self.component
	}
}

impl<C: ?Sized + Send + Sync + 'static> Drop for ActiveService<C> {
	fn drop(&mut self) {
		// Withdraw the registration before the instance so resolution never
		// finds a handle without a component.
		drop(self.active.take());

		let mut instances = self.components.instances.write();
		if instances
			.get(&self.handle)
			.is_some_and(|current| Arc::ptr_eq(current, &self.component))
		{
			instances.remove(&self.handle);
		}
	}
}
