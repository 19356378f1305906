//! Candidate generation, specificity ranking and probe keys.
//!
//! # Invariants
//!
//! - Candidates are ordered most specific first: strict subtypes before their
//!   supertypes; for one type, present floors before the absent floor and
//!   lower floors before higher ones.
//! - Every pair of candidate types is checked for comparability before the
//!   sort, so the sort itself cannot fail.

use std::cmp::Reverse;
use std::sync::Arc;

use orbit_subject::{PropertySet, TypeCatalog, TypeKey};
use rustc_hash::FxHashSet;

use crate::error::ResolveError;
use crate::key::{Constraint, RegistrationKey};

/// One probe during resolution: a subject type and an optional priority floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Candidate {
	subject_type: TypeKey,
	floor: Option<i32>,
}

impl Candidate {
	/// Creates a candidate.
	pub fn new(subject_type: TypeKey, floor: Option<i32>) -> Self {
		Self {
			subject_type,
			floor,
		}
	}

	/// Subject type probed by this candidate.
	pub fn subject_type(&self) -> TypeKey {
		self.subject_type
	}

	/// Minimum priority of the subject type's own properties admitted into
	/// the probe key; `None` admits none of them.
	pub fn floor(&self) -> Option<i32> {
		self.floor
	}

	/// Builds the probe key for this candidate from the subject's properties.
	///
	/// Properties declared on strict ancestors of the candidate type are
	/// always kept. Properties declared on the candidate type itself are kept
	/// only when their priority reaches the floor. Properties of unrelated or
	/// more derived types are dropped.
	pub fn probe_key(
		&self,
		service_point: &Arc<str>,
		properties: &PropertySet,
		catalog: &TypeCatalog,
	) -> RegistrationKey {
		let constraints = properties
			.iter()
			.filter(|p| catalog.is_subtype(self.subject_type, p.declaring_type()))
			.filter(|p| {
				p.declaring_type() != self.subject_type
					|| self.floor.is_some_and(|floor| p.priority() >= floor)
			})
			.map(Constraint::from);
		RegistrationKey::new(service_point.clone(), self.subject_type).with_constraints(constraints)
	}
}

/// Builds the ranked candidate list for a subject of type `subject_type`.
pub fn rank(
	catalog: &TypeCatalog,
	subject_type: TypeKey,
	properties: &PropertySet,
) -> Result<Vec<Candidate>, ResolveError> {
	let mut seen = FxHashSet::default();
	let mut candidates: Vec<Candidate> = catalog
		.ancestors(subject_type)
		.into_iter()
		.map(|ty| Candidate::new(ty, None))
		.chain(
			properties
				.iter()
				.map(|p| Candidate::new(p.declaring_type(), Some(p.priority()))),
		)
		.filter(|c| seen.insert(*c))
		.collect();

	let mut types: Vec<TypeKey> = Vec::new();
	for candidate in &candidates {
		if !types.contains(&candidate.subject_type) {
			types.push(candidate.subject_type);
		}
	}
	for (i, &first) in types.iter().enumerate() {
		for &second in &types[i + 1..] {
			if !catalog.is_subtype(first, second) && !catalog.is_subtype(second, first) {
				return Err(ResolveError::UnrelatedCandidates { first, second });
			}
		}
	}

	// Types are pairwise comparable, so ancestor depth orders them by subtyping.
	candidates.sort_by_cached_key(|c| {
		(
			Reverse(catalog.ancestors(c.subject_type).len()),
			c.floor.is_none(),
			c.floor,
		)
	});
	Ok(candidates)
}
