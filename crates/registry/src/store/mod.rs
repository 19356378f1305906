//! Concurrent registration store with atomic snapshot publication.
//!
//! # Role
//!
//! Holds every known [`Registration`] keyed by its exact [`RegistrationKey`].
//! Readers load the current snapshot without locking; writers copy it, apply
//! their change and publish with a compare-and-swap loop.
//!
//! # Invariants
//!
//! - A published snapshot is never mutated; lookups against one snapshot are
//!   consistent with each other.
//! - On an exact key collision the last `add` wins.
//! - Concurrent writers never lose each other's updates.
//! - Each stored entry has its own identity; an activation guard only ever
//!   withdraws the entry it inserted, even when another entry compares equal.

use std::sync::Arc;

use arc_swap::ArcSwap;
use rustc_hash::FxHashMap;

use crate::key::{Registration, RegistrationKey};

#[cfg(test)]
mod tests;

/// Immutable view of the store at one point in time.
#[derive(Debug, Default, Clone)]
pub struct StoreSnapshot {
	entries: FxHashMap<RegistrationKey, Arc<Registration>>,
}

impl StoreSnapshot {
	/// Exact-key lookup.
	pub fn lookup(&self, key: &RegistrationKey) -> Option<&Registration> {
		self.entries.get(key).map(Arc::as_ref)
	}

	/// Number of registrations.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns true if nothing is registered.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterates registrations in unspecified order.
	pub fn iter(&self) -> impl Iterator<Item = &Registration> {
		self.entries.values().map(Arc::as_ref)
	}
}

/// Thread-safe registration store.
pub struct RegistrationStore {
	snap: ArcSwap<StoreSnapshot>,
}

impl Default for RegistrationStore {
	fn default() -> Self {
		Self::new()
	}
}

impl RegistrationStore {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self {
			snap: ArcSwap::from_pointee(StoreSnapshot::default()),
		}
	}

	/// Adds `registration`, returning the one it replaced on an exact key
	/// collision.
	pub fn add(&self, registration: Registration) -> Option<Registration> {
		self.insert(Arc::new(registration)).map(Arc::unwrap_or_clone)
	}

	fn insert(&self, registration: Arc<Registration>) -> Option<Arc<Registration>> {
		let key = registration.key().clone();
		let replaced =
			self.publish(|entries| entries.insert(key.clone(), Arc::clone(&registration)));
		match &replaced {
			Some(old) => tracing::info!(
				key = %key,
				implementation = %registration.implementation(),
				replaced = %old.implementation(),
				source = %registration.source(),
				"registration replaced",
			),
			None => tracing::info!(
				key = %key,
				implementation = %registration.implementation(),
				source = %registration.source(),
				"registration added",
			),
		}
		replaced
	}

	/// Removes the registration stored under `key`.
	pub fn remove(&self, key: &RegistrationKey) -> Option<Registration> {
		let removed = self.remove_matching(key, |_| true).map(Arc::unwrap_or_clone);
		if let Some(removed) = &removed {
			tracing::info!(
				key = %key,
				implementation = %removed.implementation(),
				"registration removed",
			);
		}
		removed
	}

	/// Exact-key lookup against the current snapshot.
	pub fn lookup(&self, key: &RegistrationKey) -> Option<Registration> {
		self.snap.load().lookup(key).cloned()
	}

	/// Returns the current snapshot.
	pub fn snapshot(&self) -> Arc<StoreSnapshot> {
		self.snap.load_full()
	}

	/// Number of registrations.
	pub fn len(&self) -> usize {
		self.snap.load().len()
	}

	/// Returns true if the store is empty.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// All registrations, sorted by service point, subject type name and
	/// constraints.
	pub fn registrations(&self) -> Vec<Registration> {
		let snap = self.snap.load_full();
		let mut all: Vec<_> = snap.iter().cloned().collect();
		all.sort_by_cached_key(|r| r.key().listing_order());
		all
	}

	/// Adds `registration` for as long as the returned guard lives.
	///
	/// Dropping the guard removes the entry unless it has since been replaced
	/// under the same key, including by an equal registration from another
	/// guard.
	pub fn activate(self: &Arc<Self>, registration: Registration) -> ActiveRegistration {
		let registration = Arc::new(registration);
		self.insert(Arc::clone(&registration));
		ActiveRegistration {
			store: Arc::clone(self),
			registration,
		}
	}

	fn remove_matching(
		&self,
		key: &RegistrationKey,
		matches: impl Fn(&Arc<Registration>) -> bool,
	) -> Option<Arc<Registration>> {
		loop {
			let old = self.snap.load_full();
			let current = old.entries.get(key)?;
			if !matches(current) {
				return None;
			}

			let mut entries = old.entries.clone();
			let removed = entries.remove(key);
			let prev = self.snap.compare_and_swap(&old, Arc::new(StoreSnapshot { entries }));
			if Arc::ptr_eq(&prev, &old) {
				return removed;
			}
		}
	}

	fn publish<R>(
		&self,
		mut apply: impl FnMut(&mut FxHashMap<RegistrationKey, Arc<Registration>>) -> R,
	) -> R {
		loop {
			let old = self.snap.load_full();
			let mut entries = old.entries.clone();
			let out = apply(&mut entries);

			let prev = self.snap.compare_and_swap(&old, Arc::new(StoreSnapshot { entries }));
			if Arc::ptr_eq(&prev, &old) {
				return out;
			}
			// Lost the race; retry against the newer snapshot.
		}
	}
}

impl std::fmt::Debug for RegistrationStore {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RegistrationStore")
			.field("len", &self.len())
			.finish()
	}
}

/// Keeps a registration in its store until dropped.
#[must_use = "the registration is removed when the guard is dropped"]
pub struct ActiveRegistration {
	store: Arc<RegistrationStore>,
	registration: Arc<Registration>,
}

impl ActiveRegistration {
	/// The guarded registration.
	pub fn registration(&self) -> &Registration {
		&self.registration
	}
}

impl std::fmt::Debug for ActiveRegistration {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("ActiveRegistration")
			.field(&self.registration)
			.finish()
	}
}

impl Drop for ActiveRegistration {
	fn drop(&mut self) {
		let key = self.registration.key();
		if self
			.store
			.remove_matching(key, |current| Arc::ptr_eq(current, &self.registration))
			.is_some()
		{
			tracing::info!(
				key = %key,
				implementation = %self.registration.implementation(),
				"registration deactivated",
			);
		}
	}
}
