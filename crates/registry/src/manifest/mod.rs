//! TOML registration manifests.
//!
//! ```toml
//! [[service]]
//! service_point = "animal"
//! subject = "Pokemon"
//! implementation = "trained-pikachu"
//!
//! [service.constraints]
//! type = "PIKACHU"
//! state = "TRAINED"
//! ```
//!
//! Subject names are resolved through the [`TypeCatalog`]. Constraint values
//! may be strings, integers, floats or booleans; they are compared in their
//! string form, the same form extracted properties take. Nested tables match
//! map-valued properties: `colors.primary = "RED"` constrains the
//! `colors.primary` property.

use std::collections::BTreeMap;
use std::path::Path;

use orbit_subject::TypeCatalog;
use serde::Deserialize;

use crate::error::ManifestError;
use crate::key::{Constraint, Registration, RegistrationKey, RegistrationSource};
use crate::store::RegistrationStore;


/// A parsed registration manifest.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
	/// Service entries in file order.
	#[serde(default, rename = "service")]
	pub services: Vec<ServiceEntry>,
}

/// One `[[service]]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceEntry {
	/// Service point name.
	pub service_point: String,
	/// Declared subject type name.
	pub subject: String,
	/// Implementation handle.
	pub implementation: String,
	/// Required tag values.
	#[serde(default)]
	pub constraints: BTreeMap<String, toml::Value>,
}

impl Manifest {
	/// Parses a manifest from TOML text.
	pub fn parse(text: &str) -> Result<Self, ManifestError> {
		Ok(toml::from_str(text)?)
	}

	/// Reads and parses a manifest file.
	pub fn load(path: &Path) -> Result<Self, ManifestError> {
		let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		Self::parse(&text)
	}

	/// Converts the entries into registrations.
	///
	/// Entries with a blank tag, or a constraint value that is neither a
	/// scalar nor a table, are skipped with a warning; an unknown subject type
	/// fails the whole manifest.
	pub fn registrations(&self, catalog: &TypeCatalog) -> Result<Vec<Registration>, ManifestError> {
		let mut out = Vec::with_capacity(self.services.len());
		for entry in &self.services {
			let Some(subject_type) = catalog.by_name(entry.subject.trim()) else {
				return Err(ManifestError::UnknownSubjectType {
					subject: entry.subject.clone(),
					implementation: entry.implementation.clone(),
				});
			};

			let mut constraints = Vec::new();
			if !entry
				.constraints
				.iter()
				.all(|(tag, value)| constraint(entry, tag, value, &mut constraints))
			{
				continue;
			}
			let key = RegistrationKey::new(entry.service_point.trim(), subject_type)
				.with_constraints(constraints);

			out.push(
				Registration::new(key, entry.implementation.trim())
					.with_source(RegistrationSource::Manifest),
			);
		}
		Ok(out)
	}
}

/// Appends the constraints of one top-level `tag = value` pair.
///
/// Returns `false` if the entry has to be skipped.
fn constraint(
	entry: &ServiceEntry,
	tag: &str,
	value: &toml::Value,
	out: &mut Vec<Constraint>,
) -> bool {
	let tag = tag.trim();
	if tag.is_empty() {
		tracing::warn!(
			implementation = %entry.implementation,
			"manifest constraint has a blank tag; skipping entry",
		);
		return false;
	}
	flatten_constraint(entry, tag.to_string(), value, out)
}

/// Nested tables flatten to `parent.child` names with trimmed keys; blank
/// child keys are skipped.
fn flatten_constraint(
	entry: &ServiceEntry,
	name: String,
	value: &toml::Value,
	out: &mut Vec<Constraint>,
) -> bool {
	let text = match value {
		toml::Value::Table(table) => {
			return table.iter().all(|(key, child)| {
				let key = key.trim();
				key.is_empty() || flatten_constraint(entry, format!("{name}.{key}"), child, out)
			});
		}
		toml::Value::String(s) => s.clone(),
		toml::Value::Integer(i) => i.to_string(),
		toml::Value::Float(f) => f.to_string(),
		toml::Value::Boolean(b) => b.to_string(),
		other => {
			tracing::warn!(
				implementation = %entry.implementation,
				tag = %name,
				kind = other.type_str(),
				"manifest constraint value is not a scalar; skipping entry",
			);
			return false;
		}
	};
	out.push(Constraint::new(name, text));
	true
}

impl RegistrationStore {
	/// Adds every registration of `manifest`, returning how many were added.
	pub fn load_manifest(
		&self,
		manifest: &Manifest,
		catalog: &TypeCatalog,
	) -> Result<usize, ManifestError> {
		let registrations = manifest.registrations(catalog)?;
		let count = registrations.len();
		for registration in registrations {
			self.add(registration);
		}
		tracing::info!(
			count,
			skipped = manifest.services.len() - count,
			"loaded registration manifest",
		);
		Ok(count)
	}
}
