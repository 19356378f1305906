//! Registration keys and registered entries.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use orbit_subject::{TaggedProperty, TypeKey};

/// One required `tag = value` pair of a registration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Constraint {
	tag: Arc<str>,
	value: Arc<str>,
}

impl Constraint {
	/// Creates a constraint.
	pub fn new(tag: impl Into<Arc<str>>, value: impl Into<Arc<str>>) -> Self {
		Self {
			tag: tag.into(),
			value: value.into(),
		}
	}

	/// Tag name.
	pub fn tag(&self) -> &str {
		&self.tag
	}

	/// Required value.
	pub fn value(&self) -> &str {
		&self.value
	}
}

impl From<&TaggedProperty> for Constraint {
	fn from(property: &TaggedProperty) -> Self {
		Self::new(property.name(), property.value())
	}
}

impl fmt::Display for Constraint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}={}", self.tag, self.value)
	}
}

/// Identity of a registration: service point, subject type and constraints.
///
/// Matching is exact structural equality; constraint order never matters.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RegistrationKey {
	service_point: Arc<str>,
	subject_type: TypeKey,
	constraints: BTreeSet<Constraint>,
}

impl RegistrationKey {
	/// Key without constraints.
	pub fn new(service_point: impl Into<Arc<str>>, subject_type: TypeKey) -> Self {
		Self {
			service_point: service_point.into(),
			subject_type,
			constraints: BTreeSet::new(),
		}
	}

	/// Adds a constraint.
	pub fn with(mut self, tag: impl Into<Arc<str>>, value: impl Into<Arc<str>>) -> Self {
		self.constraints.insert(Constraint::new(tag, value));
		self
	}

	/// Adds every constraint from `constraints`.
	pub fn with_constraints(mut self, constraints: impl IntoIterator<Item = Constraint>) -> Self {
		self.constraints.extend(constraints);
		self
	}

	/// Service point name.
	pub fn service_point(&self) -> &str {
		&self.service_point
	}

	/// Subject type the registration targets.
	pub fn subject_type(&self) -> TypeKey {
		self.subject_type
	}

	/// Constraints in tag order.
	pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
		self.constraints.iter()
	}

	/// Ordering used for diagnostic listings.
	pub(crate) fn listing_order(&self) -> (Arc<str>, &'static str, Vec<Constraint>) {
		(
			self.service_point.clone(),
			self.subject_type.name(),
			self.constraints.iter().cloned().collect(),
		)
	}
}

impl fmt::Debug for RegistrationKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(self, f)
	}
}

impl fmt::Display for RegistrationKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}{{", self.service_point, self.subject_type)?;
		for (i, constraint) in self.constraints.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{constraint}")?;
		}
		f.write_str("}")
	}
}

/// Stable name of an implementation, resolved to an instance by a component
/// factory.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImplementationHandle(Arc<str>);

impl ImplementationHandle {
	/// Creates a handle.
	pub fn new(name: impl Into<Arc<str>>) -> Self {
		Self(name.into())
	}

	/// Handle name.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<&str> for ImplementationHandle {
	fn from(name: &str) -> Self {
		Self::new(name)
	}
}

impl From<String> for ImplementationHandle {
	fn from(name: String) -> Self {
		Self::new(name)
	}
}

impl fmt::Debug for ImplementationHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:?}", self.0)
	}
}

impl fmt::Display for ImplementationHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Where a registration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RegistrationSource {
	/// Declared in a crate with `domain_service!`.
	Static(&'static str),
	/// Loaded from a TOML manifest.
	Manifest,
	/// Added programmatically at runtime.
	Runtime,
}

impl fmt::Display for RegistrationSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Static(name) => write!(f, "crate:{name}"),
			Self::Manifest => f.write_str("manifest"),
			Self::Runtime => f.write_str("runtime"),
		}
	}
}

/// A registered implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
	key: RegistrationKey,
	implementation: ImplementationHandle,
	source: RegistrationSource,
}

impl Registration {
	/// Creates a runtime registration.
	pub fn new(key: RegistrationKey, implementation: impl Into<ImplementationHandle>) -> Self {
		Self {
			key,
			implementation: implementation.into(),
			source: RegistrationSource::Runtime,
		}
	}

	/// Overrides the source.
	pub fn with_source(mut self, source: RegistrationSource) -> Self {
		self.source = source;
		self
	}

	/// Registration key.
	pub fn key(&self) -> &RegistrationKey {
		&self.key
	}

	/// Implementation handle.
	pub fn implementation(&self) -> &ImplementationHandle {
		&self.implementation
	}

	/// Source of the registration.
	pub fn source(&self) -> RegistrationSource {
		self.source
	}
}
