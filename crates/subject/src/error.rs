//! Error types for catalog construction and property extraction.

use thiserror::Error;

/// Errors raised while declaring subject types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
	/// The same Rust type or the same name was declared twice.
	#[error("subject type '{name}' is declared more than once")]
	DuplicateType {
		/// Name of the duplicated declaration.
		name: &'static str,
	},

	/// A derived type names a parent that has not been declared yet.
	#[error("subject type '{child}' extends undeclared parent '{parent}'")]
	UnknownParent {
		/// Name of the derived type.
		child: &'static str,
		/// Rust type name of the missing parent.
		parent: &'static str,
	},
}

/// Errors raised while extracting tagged properties from a subject.
///
/// A single bad accessor fails extraction for the whole subject; none of
/// these are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
	/// The subject's concrete type is not in the catalog.
	#[error("subject type '{type_name}' is not declared")]
	UndeclaredType {
		/// Rust type name of the subject.
		type_name: &'static str,
	},

	/// A tagged accessor produced a value that cannot become a property.
	#[error("cannot create property '{property}' of '{subject_type}' from {value_type}")]
	Unsupported {
		/// Declared type that owns the accessor.
		subject_type: &'static str,
		/// Property name (dotted for nested map entries).
		property: String,
		/// Rust type name of the offending value.
		value_type: &'static str,
	},

	/// An upcast projection or accessor downcast did not match the declared
	/// types; indicates an inconsistent catalog.
	#[error("cannot read '{property}' declared on '{declaring_type}' from a '{subject_type}'")]
	Projection {
		/// Concrete subject type.
		subject_type: &'static str,
		/// Type declaring the accessor.
		declaring_type: &'static str,
		/// Property name.
		property: String,
	},
}
