//! Tagged properties and name-unique property sets.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::types::{TypeCatalog, TypeKey};

#[cfg(test)]
mod tests;

/// A named, priority-ranked value read from a subject.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TaggedProperty {
	declaring_type: TypeKey,
	name: Arc<str>,
	priority: i32,
	value: String,
}

impl TaggedProperty {
	/// Creates a property.
	pub fn new(
		declaring_type: TypeKey,
		name: impl Into<Arc<str>>,
		priority: i32,
		value: impl Into<String>,
	) -> Self {
		Self {
			declaring_type,
			name: name.into(),
			priority,
			value: value.into(),
		}
	}

	/// Type that declared the accessor producing this property.
	pub fn declaring_type(&self) -> TypeKey {
		self.declaring_type
	}

	/// Property name; nested map entries use `parent.child`.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Declared priority of the accessor.
	pub fn priority(&self) -> i32 {
		self.priority
	}

	/// String-normalized value.
	pub fn value(&self) -> &str {
		&self.value
	}

	/// Returns true if `self` should replace `other` under the same name.
	///
	/// A property declared on a subtype (or the same type) replaces one from
	/// a supertype; priority is not consulted.
	pub fn can_replace(&self, other: &TaggedProperty, catalog: &TypeCatalog) -> bool {
		catalog.is_subtype(self.declaring_type, other.declaring_type)
	}
}

impl fmt::Debug for TaggedProperty {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}.{}@{}={:?}",
			self.declaring_type, self.name, self.priority, self.value
		)
	}
}

/// Properties of one subject, unique by name, iterated in name order.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PropertySet {
	by_name: BTreeMap<Arc<str>, TaggedProperty>,
}

impl PropertySet {
	/// Creates an empty set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Merges a property, resolving a same-name conflict with
	/// [`TaggedProperty::can_replace`].
	///
	/// Returns true if `property` was retained.
	pub fn merge(&mut self, property: TaggedProperty, catalog: &TypeCatalog) -> bool {
		match self.by_name.get_mut(&property.name) {
			Some(existing) => {
				if property.can_replace(existing, catalog) {
					*existing = property;
					true
				} else {
					false
				}
			}
			None => {
				self.by_name.insert(property.name.clone(), property);
				true
			}
		}
	}

	/// Looks up a property by name.
	pub fn get(&self, name: &str) -> Option<&TaggedProperty> {
		self.by_name.get(name)
	}

	/// Number of properties.
	pub fn len(&self) -> usize {
		self.by_name.len()
	}

	/// Returns true if the set is empty.
	pub fn is_empty(&self) -> bool {
		self.by_name.is_empty()
	}

	/// Iterates in name order.
	pub fn iter(&self) -> impl Iterator<Item = &TaggedProperty> {
		self.by_name.values()
	}
}

impl fmt::Debug for PropertySet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_set().entries(self.by_name.values()).finish()
	}
}

impl<'a> IntoIterator for &'a PropertySet {
	type Item = &'a TaggedProperty;
	type IntoIter = std::collections::btree_map::Values<'a, Arc<str>, TaggedProperty>;

	fn into_iter(self) -> Self::IntoIter {
		self.by_name.values()
	}
}
