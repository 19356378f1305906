//! Declared subject type hierarchy.
//!
//! # Role
//!
//! Rust has no class inheritance, so the hierarchy that drives dispatch is
//! declared explicitly: each subject type names its parent together with an
//! upcast projection (`&Child -> &Parent`, usually a field access into the
//! embedded parent value) and lists its own tagged accessors.
//!
//! # Invariants
//!
//! - A parent is declared before its children, so the graph is a forest.
//! - Type names are unique within a catalog.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::CatalogError;
use crate::value::{IntoTagValue, TagValue};

#[cfg(test)]
mod tests;

/// Identity of a subject type.
///
/// Equality and hashing only look at the [`TypeId`]; the name is carried for
/// diagnostics and manifest lookups.
#[derive(Clone, Copy)]
pub struct TypeKey {
	id: TypeId,
	name: &'static str,
}

impl TypeKey {
	/// Key for `T`, named after the last path segment of its Rust type name.
	pub fn of<T: Any>() -> Self {
		Self::named::<T>(short_type_name(std::any::type_name::<T>()))
	}

	/// Key for `T` with an explicit display name.
	pub fn named<T: Any>(name: &'static str) -> Self {
		Self {
			id: TypeId::of::<T>(),
			name,
		}
	}

	/// The underlying [`TypeId`].
	pub fn id(&self) -> TypeId {
		self.id
	}

	/// Display name.
	pub fn name(&self) -> &'static str {
		self.name
	}
}

impl PartialEq for TypeKey {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for TypeKey {}

impl std::hash::Hash for TypeKey {
	fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}

impl fmt::Debug for TypeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}

impl fmt::Display for TypeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}

fn short_type_name(full: &'static str) -> &'static str {
	let base = full.split('<').next().unwrap_or(full);
	base.rsplit("::").next().unwrap_or(base)
}

/// Type-erased tag reader: downcasts the subject and reads one value.
pub(crate) type ReadFn = Arc<dyn Fn(&dyn Any) -> Option<TagValue> + Send + Sync>;

/// Type-erased projection from a child value to its embedded parent value.
pub(crate) type UpcastFn = Arc<dyn Fn(&dyn Any) -> Option<&dyn Any> + Send + Sync>;

/// A tagged accessor declared directly on one type.
#[derive(Clone)]
pub struct TagDecl {
	pub(crate) name: Arc<str>,
	pub(crate) priority: i32,
	pub(crate) read: ReadFn,
}

impl TagDecl {
	/// Tag name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Declared priority (higher is more specific).
	pub fn priority(&self) -> i32 {
		self.priority
	}
}

impl fmt::Debug for TagDecl {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TagDecl")
			.field("name", &self.name)
			.field("priority", &self.priority)
			.finish_non_exhaustive()
	}
}

pub(crate) fn upcast_fn<F>(f: F) -> UpcastFn
where
	F: for<'a> Fn(&'a dyn Any) -> Option<&'a dyn Any> + Send + Sync + 'static,
{
	Arc::new(f)
}

#[derive(Clone)]
pub(crate) struct ParentLink {
	pub(crate) key: TypeKey,
	pub(crate) upcast: UpcastFn,
}

/// One declared type: its key, parent link and own tags.
#[derive(Clone)]
pub struct TypeNode {
	pub(crate) key: TypeKey,
	pub(crate) parent: Option<ParentLink>,
	pub(crate) tags: Vec<TagDecl>,
}

impl TypeNode {
	/// Key of this type.
	pub fn key(&self) -> TypeKey {
		self.key
	}

	/// Key of the direct parent, if any.
	pub fn parent(&self) -> Option<TypeKey> {
		self.parent.as_ref().map(|p| p.key)
	}

	/// Tags declared directly on this type.
	pub fn tags(&self) -> &[TagDecl] {
		&self.tags
	}
}

/// Immutable catalog of declared subject types.
#[derive(Clone, Default)]
pub struct TypeCatalog {
	nodes: FxHashMap<TypeId, TypeNode>,
	by_name: FxHashMap<&'static str, TypeKey>,
}

impl TypeCatalog {
	/// Starts a new catalog builder.
	pub fn builder() -> TypeCatalogBuilder {
		TypeCatalogBuilder::default()
	}

	/// Looks up a declared type by [`TypeId`].
	pub fn node(&self, id: TypeId) -> Option<&TypeNode> {
		self.nodes.get(&id)
	}

	/// Looks up a declared type by its display name.
	pub fn by_name(&self, name: &str) -> Option<TypeKey> {
		self.by_name.get(name).copied()
	}

	/// Returns the key for `id` if declared.
	pub fn key(&self, id: TypeId) -> Option<TypeKey> {
		self.nodes.get(&id).map(|n| n.key)
	}

	/// Number of declared types.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Returns true if no types are declared.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Returns the chain `[ty, parent, grandparent, ..]`, most derived first.
	///
	/// Empty if `ty` is not declared.
	pub fn ancestors(&self, ty: TypeKey) -> Vec<TypeKey> {
		let mut chain = Vec::new();
		let mut cursor = self.nodes.get(&ty.id);
		while let Some(node) = cursor {
			chain.push(node.key);
			cursor = node.parent.as_ref().and_then(|p| self.nodes.get(&p.key.id));
		}
		chain
	}

	/// Returns true if `sub` is `sup` or (transitively) derives from it.
	pub fn is_subtype(&self, sub: TypeKey, sup: TypeKey) -> bool {
		if sub == sup {
			return true;
		}
		let mut cursor = self.nodes.get(&sub.id).and_then(|n| n.parent.as_ref());
		while let Some(link) = cursor {
			if link.key == sup {
				return true;
			}
			cursor = self.nodes.get(&link.key.id).and_then(|n| n.parent.as_ref());
		}
		false
	}

	pub(crate) fn upcast(&self, ty: TypeKey) -> Option<(TypeKey, UpcastFn)> {
		let link = self.nodes.get(&ty.id)?.parent.as_ref()?;
		Some((link.key, link.upcast.clone()))
	}
}

impl fmt::Debug for TypeCatalog {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut names: Vec<_> = self.by_name.keys().collect();
		names.sort_unstable();
		f.debug_struct("TypeCatalog").field("types", &names).finish()
	}
}

/// Builder collecting type declarations into a [`TypeCatalog`].
#[derive(Default)]
pub struct TypeCatalogBuilder {
	catalog: TypeCatalog,
	errors: Vec<CatalogError>,
}

impl TypeCatalogBuilder {
	/// Declares a root type (no parent), named after its Rust type.
	pub fn root<T: Any + Send + Sync>(&mut self) -> TypeDecl<'_, T> {
		self.root_named::<T>(TypeKey::of::<T>().name)
	}

	/// Declares a root type with an explicit name.
	pub fn root_named<T: Any + Send + Sync>(&mut self, name: &'static str) -> TypeDecl<'_, T> {
		let key = TypeKey::named::<T>(name);
		self.insert(key, None);
		TypeDecl {
			builder: self,
			key,
			_ty: std::marker::PhantomData,
		}
	}

	/// Declares `T` as a subtype of the already declared `P`.
	///
	/// `upcast` projects a `&T` onto its embedded parent value so that tags
	/// declared on `P` can be read from `T` instances.
	pub fn derive<T, P>(&mut self, upcast: fn(&T) -> &P) -> TypeDecl<'_, T>
	where
		T: Any + Send + Sync,
		P: Any + Send + Sync,
	{
		self.derive_named::<T, P>(TypeKey::of::<T>().name, upcast)
	}

	/// Declares `T` as a subtype of `P` with an explicit name.
	pub fn derive_named<T, P>(
		&mut self,
		name: &'static str,
		upcast: fn(&T) -> &P,
	) -> TypeDecl<'_, T>
	where
		T: Any + Send + Sync,
		P: Any + Send + Sync,
	{
		let key = TypeKey::named::<T>(name);
		let parent = match self.catalog.key(TypeId::of::<P>()) {
			Some(parent) => Some(ParentLink {
				key: parent,
				upcast: upcast_fn(move |any| {
					any.downcast_ref::<T>().map(|child| upcast(child) as &dyn Any)
				}),
			}),
			None => {
				self.errors.push(CatalogError::UnknownParent {
					child: name,
					parent: std::any::type_name::<P>(),
				});
				None
			}
		};
		self.insert(key, parent);
		TypeDecl {
			builder: self,
			key,
			_ty: std::marker::PhantomData,
		}
	}

	/// Finishes the catalog, reporting the first declaration error.
	pub fn build(self) -> Result<TypeCatalog, CatalogError> {
		match self.errors.into_iter().next() {
			Some(err) => Err(err),
			None => Ok(self.catalog),
		}
	}

	fn insert(&mut self, key: TypeKey, parent: Option<ParentLink>) {
		if self.catalog.nodes.contains_key(&key.id) || self.catalog.by_name.contains_key(key.name) {
			self.errors.push(CatalogError::DuplicateType { name: key.name });
			return;
		}
		self.catalog.by_name.insert(key.name, key);
		self.catalog.nodes.insert(
			key.id,
			TypeNode {
				key,
				parent,
				tags: Vec::new(),
			},
		);
	}
}

/// Declaration handle for one type; adds tagged accessors.
pub struct TypeDecl<'b, T> {
	builder: &'b mut TypeCatalogBuilder,
	key: TypeKey,
	_ty: std::marker::PhantomData<fn(&T)>,
}

impl<T: Any + Send + Sync> TypeDecl<'_, T> {
	/// Declares a tagged accessor on this type.
	///
	/// Accessors with an empty name are skipped with a warning.
	pub fn tag<V, F>(self, name: &str, priority: i32, read: F) -> Self
	where
		V: IntoTagValue,
		F: Fn(&T) -> V + Send + Sync + 'static,
	{
		let name = name.trim();
		if name.is_empty() {
			tracing::warn!(
				subject_type = self.key.name,
				priority,
				"cannot declare tagged accessor without a name; skipping",
			);
			return self;
		}

		let read: ReadFn = Arc::new(move |any: &dyn Any| {
			any.downcast_ref::<T>().map(|value| read(value).into_tag_value())
		});
		if let Some(node) = self.builder.catalog.nodes.get_mut(&self.key.id) {
			node.tags.push(TagDecl {
				name: Arc::from(name),
				priority,
				read,
			});
		}
		self
	}

	/// Key of the type being declared.
	pub fn key(&self) -> TypeKey {
		self.key
	}
}
