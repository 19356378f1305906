//! Tagged property extraction.
//!
//! [`PropertyExtractor::properties`] reads every cached accessor of the
//! subject's concrete type, normalizes the values into strings and merges the
//! result by name so that subtype declarations override supertype ones.

use std::sync::Arc;

use crate::error::PropertyError;
use crate::property::{PropertySet, TaggedProperty};
use crate::subject::Subject;
use crate::types::{TypeCatalog, TypeKey};
use crate::value::TagValue;

mod cache;

pub use cache::{Accessor, PropertyCache};

/// Extracts [`PropertySet`]s from subjects using a shared [`TypeCatalog`].
pub struct PropertyExtractor {
	catalog: Arc<TypeCatalog>,
	cache: PropertyCache,
}

impl PropertyExtractor {
	/// Creates an extractor over `catalog` with an empty cache.
	pub fn new(catalog: Arc<TypeCatalog>) -> Self {
		Self {
			catalog,
			cache: PropertyCache::new(),
		}
	}

	/// The catalog this extractor reads declarations from.
	pub fn catalog(&self) -> &Arc<TypeCatalog> {
		&self.catalog
	}

	/// The accessor cache.
	pub fn cache(&self) -> &PropertyCache {
		&self.cache
	}

	/// Resolves the declared concrete type of `subject`.
	pub fn subject_type(&self, subject: &dyn Subject) -> Result<TypeKey, PropertyError> {
		self.catalog
			.key(subject.as_any().type_id())
			.ok_or(PropertyError::UndeclaredType {
				type_name: subject.subject_type_name(),
			})
	}

	/// Extracts the tagged properties of `subject`.
	pub fn properties(&self, subject: &dyn Subject) -> Result<PropertySet, PropertyError> {
		let ty = self.subject_type(subject)?;
		tracing::debug!(subject_type = %ty, "extracting properties");

		let accessors = self.cache.accessors(&self.catalog, ty);
		let any = subject.as_any();

		let mut extracted = Vec::with_capacity(accessors.len());
		for accessor in accessors.iter() {
			let value = (accessor.read)(any).ok_or_else(|| PropertyError::Projection {
				subject_type: ty.name(),
				declaring_type: accessor.declaring_type.name(),
				property: accessor.name.to_string(),
			})?;
			flatten_into(&mut extracted, accessor, accessor.name.to_string(), value)?;
		}

		let mut properties = PropertySet::new();
		for property in extracted {
			properties.merge(property, &self.catalog);
		}

		tracing::debug!(subject_type = %ty, properties = properties.len(), "properties extracted");
		Ok(properties)
	}
}

impl std::fmt::Debug for PropertyExtractor {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PropertyExtractor")
			.field("catalog", &self.catalog)
			.field("cached_types", &self.cache.len())
			.finish()
	}
}

fn flatten_into(
	out: &mut Vec<TaggedProperty>,
	accessor: &Accessor,
	name: String,
	value: TagValue,
) -> Result<(), PropertyError> {
	match value {
		TagValue::Null => Ok(()),
		TagValue::Map(entries) => {
			for (key, child) in entries {
				let key = key.trim();
				if key.is_empty() {
					continue;
				}
				flatten_into(out, accessor, format!("{name}.{key}"), child)?;
			}
			Ok(())
		}
		TagValue::Unsupported { type_name } => Err(PropertyError::Unsupported {
			subject_type: accessor.declaring_type.name(),
			property: name,
			value_type: type_name,
		}),
		scalar => {
			if let Some(text) = scalar.scalar_string() {
				out.push(TaggedProperty::new(
					accessor.declaring_type,
					name,
					accessor.priority,
					text,
				));
			}
			Ok(())
		}
	}
}
