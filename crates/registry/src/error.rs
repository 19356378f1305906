//! Resolution and manifest errors.

use std::path::PathBuf;

use orbit_subject::{PropertyError, TypeKey};
use thiserror::Error;

/// Errors raised while resolving a subject to a registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
	/// Property extraction failed.
	#[error(transparent)]
	Property(#[from] PropertyError),

	/// Two candidate subject types are not related by subtyping.
	#[error("cannot rank unrelated subject types '{first}' and '{second}'")]
	UnrelatedCandidates {
		/// First type of the incomparable pair.
		first: TypeKey,
		/// Second type of the incomparable pair.
		second: TypeKey,
	},
}

/// Errors raised while loading a registration manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
	/// The manifest is not valid TOML or does not match the schema.
	#[error("invalid registration manifest: {0}")]
	Parse(#[from] toml::de::Error),

	/// The manifest file could not be read.
	#[error("cannot read registration manifest {}: {source}", path.display())]
	Io {
		/// Manifest path.
		path: PathBuf,
		/// Underlying I/O error.
		#[source]
		source: std::io::Error,
	},

	/// An entry names a subject type that is not in the catalog.
	#[error("implementation '{implementation}' targets undeclared subject type '{subject}'")]
	UnknownSubjectType {
		/// Subject type name as written.
		subject: String,
		/// Implementation of the offending entry.
		implementation: String,
	},
}
