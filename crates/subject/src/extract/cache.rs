//! Per-type memoization of flattened accessor lists.
//!
//! # Invariants
//!
//! - A cached list for type `T` holds `T`'s own accessors (ascending
//!   priority) followed by every ancestor's, most derived first.
//! - Population is idempotent: concurrent builders for the same type produce
//!   equivalent lists and the first insert wins.

use std::any::{Any, TypeId};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::types::{ReadFn, TypeCatalog, TypeKey};

/// A tag reader bound to a concrete subject type.
///
/// For inherited tags the reader already includes the upcast chain, so it
/// can be invoked directly on the concrete subject.
#[derive(Clone)]
pub struct Accessor {
	pub(crate) declaring_type: TypeKey,
	pub(crate) name: Arc<str>,
	pub(crate) priority: i32,
	pub(crate) read: ReadFn,
}

impl Accessor {
	/// Type that declared the tag.
	pub fn declaring_type(&self) -> TypeKey {
		self.declaring_type
	}

	/// Tag name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Declared priority.
	pub fn priority(&self) -> i32 {
		self.priority
	}
}

impl std::fmt::Debug for Accessor {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}.{}@{}", self.declaring_type, self.name, self.priority)
	}
}

/// Cache of accessor lists keyed by concrete subject type.
#[derive(Default)]
pub struct PropertyCache {
	lists: RwLock<FxHashMap<TypeId, Arc<[Accessor]>>>,
}

impl PropertyCache {
	/// Creates an empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the accessor list for `ty`, building and caching it on first use.
	pub fn accessors(&self, catalog: &TypeCatalog, ty: TypeKey) -> Arc<[Accessor]> {
		if let Some(list) = self.lists.read().get(&ty.id()) {
			return list.clone();
		}

		let built = self.build(catalog, ty);
		self.lists.write().entry(ty.id()).or_insert(built).clone()
	}

	/// Number of cached types.
	pub fn len(&self) -> usize {
		self.lists.read().len()
	}

	/// Returns true if nothing is cached yet.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn build(&self, catalog: &TypeCatalog, ty: TypeKey) -> Arc<[Accessor]> {
		tracing::debug!(subject_type = %ty, "building accessor list");
		let Some(node) = catalog.node(ty.id()) else {
			return Arc::from(Vec::new());
		};

		let mut own: Vec<Accessor> = node
			.tags()
			.iter()
			.map(|tag| Accessor {
				declaring_type: ty,
				name: tag.name.clone(),
				priority: tag.priority,
				read: tag.read.clone(),
			})
			.collect();
		own.sort_by_key(|a| a.priority);

		if let Some((parent, upcast)) = catalog.upcast(ty) {
			for inherited in self.accessors(catalog, parent).iter() {
				let upcast = upcast.clone();
				let read = inherited.read.clone();
				own.push(Accessor {
					read: Arc::new(move |any: &dyn Any| upcast(any).and_then(|p| read(p))),
					..inherited.clone()
				});
			}
		}

		tracing::debug!(subject_type = %ty, accessors = own.len(), "accessor list built");
		Arc::from(own)
	}
}
