//! The [`Subject`] trait: values whose runtime type drives dispatch.

use std::any::Any;

/// A value that can be handed to the resolver as a dispatch subject.
///
/// Implemented for every `'static + Send + Sync` type, so domain models need no
/// extra impl. Domain traits that should be usable as subject parameters only
/// need `Subject` as a supertrait:
///
/// ```
/// use orbit_subject::Subject;
///
/// trait Animal: Subject {
/// 	fn name(&self) -> &str;
/// }
/// ```
///
/// Calling the methods through a trait object dispatches to the concrete type,
/// which is what lets `&dyn Animal` be extracted by its real type.
pub trait Subject: Any + Send + Sync {
	/// Returns the concrete value as [`Any`].
	fn as_any(&self) -> &dyn Any;

	/// Returns the concrete value as a `dyn Subject`.
	fn as_subject(&self) -> &dyn Subject;

	/// Rust type name of the concrete value, for diagnostics.
	fn subject_type_name(&self) -> &'static str;
}

impl<T: Any + Send + Sync> Subject for T {
	fn as_any(&self) -> &dyn Any {
		self
	}

	fn as_subject(&self) -> &dyn Subject {
		self
	}

	fn subject_type_name(&self) -> &'static str {
		std::any::type_name::<T>()
	}
}

impl dyn Subject {
	/// Returns `true` if the concrete type is `T`.
	pub fn is<T: Any>(&self) -> bool {
		self.as_any().is::<T>()
	}

	/// Downcasts to the concrete type.
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.as_any().downcast_ref::<T>()
	}
}

impl std::fmt::Debug for dyn Subject {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("Subject")
			.field(&self.subject_type_name())
			.finish()
	}
}
