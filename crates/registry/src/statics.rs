//! Link-time registration declarations.
//!
//! Crates declare domain services with [`domain_service!`]; the declarations
//! are collected through `inventory` and added to a store with
//! [`RegistrationStore::load_static`].

use std::any::Any;

use orbit_subject::{TypeCatalog, TypeKey};

use crate::key::{Registration, RegistrationKey, RegistrationSource};
use crate::store::RegistrationStore;

/// A registration declared in code.
#[derive(Debug)]
pub struct StaticRegistration {
	/// Service point name.
	pub service_point: &'static str,
	/// Subject type.
	pub subject: fn() -> TypeKey,
	/// Required `(tag, value)` pairs.
	pub constraints: &'static [(&'static str, &'static str)],
	/// Implementation handle.
	pub implementation: &'static str,
	/// Crate that declared the registration.
	pub crate_name: &'static str,
}

inventory::collect!(StaticRegistration);

impl StaticRegistration {
	#[doc(hidden)]
	pub fn subject_key<T: Any>() -> TypeKey {
		TypeKey::of::<T>()
	}

	/// Converts into a registration, using the catalog's key for the subject.
	///
	/// Returns `None` if the subject type is not declared in `catalog`.
	pub fn to_registration(&self, catalog: &TypeCatalog) -> Option<Registration> {
		let subject = catalog.key((self.subject)().id())?;
		let key = RegistrationKey::new(self.service_point, subject).with_constraints(
			self.constraints
				.iter()
				.map(|&(tag, value)| crate::key::Constraint::new(tag, value)),
		);
		Some(
			Registration::new(key, self.implementation)
				.with_source(RegistrationSource::Static(self.crate_name)),
		)
	}
}

/// Iterates every linked [`StaticRegistration`].
pub fn static_registrations() -> impl Iterator<Item = &'static StaticRegistration> {
	inventory::iter::<StaticRegistration>.into_iter()
}

impl RegistrationStore {
	/// Adds every `domain_service!` declaration linked into the binary.
	///
	/// Declarations whose subject type is missing from `catalog` are skipped
	/// with a warning. Returns the number added.
	pub fn load_static(&self, catalog: &TypeCatalog) -> usize {
		let mut count = 0;
		for decl in static_registrations() {
			match decl.to_registration(catalog) {
				Some(registration) => {
					self.add(registration);
					count += 1;
				}
				None => tracing::warn!(
					crate_name = decl.crate_name,
					implementation = decl.implementation,
					subject = (decl.subject)().name(),
					"static registration targets an undeclared subject type; skipping",
				),
			}
		}
		tracing::info!(count, "loaded static registrations");
		count
	}
}

/// Declares a domain service registration collected at link time.
///
/// ```ignore
/// domain_service!("animal", Pokemon { "type" = "PIKACHU" } => "pikachu");
/// domain_service!("animal", Animal => "generic");
/// ```
#[macro_export]
macro_rules! domain_service {
	($service_point:literal, $subject:ty $({ $($tag:literal = $value:literal),* $(,)? })? => $implementation:literal) => {
		$crate::inventory::submit! {
			$crate::StaticRegistration {
				service_point: $service_point,
				subject: $crate::StaticRegistration::subject_key::<$subject>,
				constraints: &[$($(($tag, $value)),*)?],
				implementation: $implementation,
				crate_name: env!("CARGO_PKG_NAME"),
			}
		}
	};
}
