//! Specificity-ordered resolution of a subject to a registration.
//!
//! # Role
//!
//! Given a service point and a subject, the resolver extracts the subject's
//! tagged properties, ranks the candidate `(type, floor)` probes from most to
//! least specific and returns the first registration whose key exactly
//! matches a probe.
//!
//! # Invariants
//!
//! - All probes of one call read the same store snapshot.
//! - Resolution never mutates the extracted property set.
//! - "Nothing registered" is `Ok(None)`, never an error.

use std::sync::Arc;

use orbit_subject::{PropertyExtractor, Subject};

use crate::error::ResolveError;
use crate::key::Registration;
use crate::store::RegistrationStore;

mod candidate;

pub use candidate::{Candidate, rank};

/// Resolves subjects against a [`RegistrationStore`].
#[derive(Debug, Clone)]
pub struct Resolver {
	store: Arc<RegistrationStore>,
	extractor: Arc<PropertyExtractor>,
}

impl Resolver {
	/// Creates a resolver over `store`, extracting with `extractor`.
	pub fn new(store: Arc<RegistrationStore>, extractor: Arc<PropertyExtractor>) -> Self {
		Self { store, extractor }
	}

	/// The backing store.
	pub fn store(&self) -> &Arc<RegistrationStore> {
		&self.store
	}

	/// The property extractor.
	pub fn extractor(&self) -> &Arc<PropertyExtractor> {
		&self.extractor
	}

	/// Finds the most specific registration for `subject` at `service_point`.
	pub fn resolve(
		&self,
		service_point: &str,
		subject: &dyn Subject,
	) -> Result<Option<Registration>, ResolveError> {
		let subject_type = self.extractor.subject_type(subject)?;
		let properties = self.extractor.properties(subject)?;
		let catalog = self.extractor.catalog();
		let candidates = rank(catalog, subject_type, &properties)?;

		tracing::debug!(
			service_point,
			subject_type = %subject_type,
			properties = properties.len(),
			candidates = candidates.len(),
			"resolving",
		);

		let service_point: Arc<str> = Arc::from(service_point);
		let snap = self.store.snapshot();
		for candidate in &candidates {
			let key = candidate.probe_key(&service_point, &properties, catalog);
			if let Some(found) = snap.lookup(&key) {
				tracing::debug!(
					key = %key,
					implementation = %found.implementation(),
					"resolved",
				);
				return Ok(Some(found.clone()));
			}
		}

		tracing::debug!(
			service_point = %service_point,
			subject_type = %subject_type,
			"no registration matched",
		);
		Ok(None)
	}
}
