//! Document approval workflow.
//!
//! Each (type, state) pair is served by its own implementation; the routing
//! table lives in the registration manifest. A document's state changes
//! between calls, so the next call on the same document lands on a
//! different implementation.

use std::sync::Arc;

use orbit_invocation::{Components, DispatchError, ServicePoint, service_point};
use orbit_registry::Resolver;
use orbit_subject::{TagValue, TypeCatalogBuilder};
use parking_lot::RwLock;
use strum_macros::{Display, IntoStaticStr};
use thiserror::Error;

/// Prefix a Facebook page URI must carry to be approved.
const FACEBOOK_PREFIX: &str = "https://www.facebook.com/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
	FacebookPage,
	UserGuide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentState {
	Requested,
	Created,
	Updated,
	Approved,
	Rejected,
}

#[derive(Debug)]
pub struct Document {
	pub id: String,
	pub kind: DocumentType,
	state: RwLock<DocumentState>,
	uri: RwLock<Option<String>>,
}

impl Document {
	/// A freshly requested document.
	pub fn requested(id: impl Into<String>, kind: DocumentType) -> Self {
		Self {
			id: id.into(),
			kind,
			state: RwLock::new(DocumentState::Requested),
			uri: RwLock::new(None),
		}
	}

	pub fn state(&self) -> DocumentState {
		*self.state.read()
	}

	pub fn uri(&self) -> Option<String> {
		self.uri.read().clone()
	}

	fn transition(&self, to: DocumentState) {
		let from = std::mem::replace(&mut *self.state.write(), to);
		tracing::info!(document = %self.id, %from, %to, "document state changed");
	}
}

/// Declares the document type. The type tag outranks the state tag.
pub fn declare(builder: &mut TypeCatalogBuilder) {
	builder
		.root::<Document>()
		.tag("type", 100, |d: &Document| TagValue::variant(d.kind))
		.tag("state", 10, |d: &Document| TagValue::variant(d.state()));
}

#[derive(Debug, Error)]
pub enum DocumentError {
	#[error(transparent)]
	Dispatch(#[from] DispatchError),
	#[error("cannot {operation} document {id} in state {state}")]
	NotAllowed {
		operation: &'static str,
		id: String,
		state: DocumentState,
	},
}

impl DocumentError {
	fn not_allowed(operation: &'static str, document: &Document) -> Self {
		Self::NotAllowed {
			operation,
			id: document.id.clone(),
			state: document.state(),
		}
	}
}

service_point! {
	/// Document lifecycle, dispatched on the document's type and state.
	pub trait DocumentService {
		fn create_document(&self, #[subject] document: &Document, uri: &str) -> Result<(), DocumentError>;

		fn update_document(&self, #[subject] document: &Document, uri: &str) -> Result<(), DocumentError>;

		/// Returns whether the document was approved.
		fn approve_document(&self, #[subject] document: &Document) -> Result<bool, DocumentError>;
	}
}

/// Fills in a requested document.
struct Requested;

impl DocumentService for Requested {
	fn create_document(&self, document: &Document, uri: &str) -> Result<(), DocumentError> {
		*document.uri.write() = Some(uri.to_string());
		document.transition(DocumentState::Created);
		Ok(())
	}

	fn update_document(&self, document: &Document, _: &str) -> Result<(), DocumentError> {
		Err(DocumentError::not_allowed("update", document))
	}

	fn approve_document(&self, document: &Document) -> Result<bool, DocumentError> {
		Err(DocumentError::not_allowed("approve", document))
	}
}

/// Accepts a corrected URI for a rejected document.
struct Rejected;

impl DocumentService for Rejected {
	fn create_document(&self, document: &Document, _: &str) -> Result<(), DocumentError> {
		Err(DocumentError::not_allowed("create", document))
	}

	fn update_document(&self, document: &Document, uri: &str) -> Result<(), DocumentError> {
		*document.uri.write() = Some(uri.to_string());
		document.transition(DocumentState::Updated);
		Ok(())
	}

	fn approve_document(&self, document: &Document) -> Result<bool, DocumentError> {
		Err(DocumentError::not_allowed("approve", document))
	}
}

/// Reviews a created or updated document.
struct Review {
	/// Required URI prefix, if any.
	prefix: Option<&'static str>,
}

impl DocumentService for Review {
	fn create_document(&self, document: &Document, _: &str) -> Result<(), DocumentError> {
		Err(DocumentError::not_allowed("create", document))
	}

	fn update_document(&self, document: &Document, uri: &str) -> Result<(), DocumentError> {
		*document.uri.write() = Some(uri.to_string());
		document.transition(DocumentState::Updated);
		Ok(())
	}

	fn approve_document(&self, document: &Document) -> Result<bool, DocumentError> {
		let approved = match self.prefix {
			Some(prefix) => document.uri().is_some_and(|uri| uri.starts_with(prefix)),
			None => true,
		};
		document.transition(if approved {
			DocumentState::Approved
		} else {
			DocumentState::Rejected
		});
		Ok(approved)
	}
}

/// Approved documents are final.
struct Final;

impl DocumentService for Final {
	fn create_document(&self, document: &Document, _: &str) -> Result<(), DocumentError> {
		Err(DocumentError::not_allowed("create", document))
	}

	fn update_document(&self, document: &Document, _: &str) -> Result<(), DocumentError> {
		Err(DocumentError::not_allowed("update", document))
	}

	fn approve_document(&self, document: &Document) -> Result<bool, DocumentError> {
		Err(DocumentError::not_allowed("approve", document))
	}
}

/// Implementations keyed by the handles the manifest refers to.
pub fn components() -> Arc<Components<dyn DocumentService>> {
	let components: Arc<Components<dyn DocumentService>> = Arc::new(Components::new());
	components.insert("document.requested", Arc::new(Requested));
	components.insert("document.rejected", Arc::new(Rejected));
	components.insert(
		"document.review.facebook",
		Arc::new(Review {
			prefix: Some(FACEBOOK_PREFIX),
		}),
	);
	components.insert("document.review", Arc::new(Review { prefix: None }));
	components.insert("document.final", Arc::new(Final));
	components
}

pub fn service_point(resolver: &Resolver) -> anyhow::Result<ServicePoint<dyn DocumentService>> {
	Ok(ServicePoint::<dyn DocumentService>::new(
		"document",
		resolver.clone(),
		components(),
	)?)
}

pub fn run(resolver: &Resolver) -> anyhow::Result<()> {
	let documents = service_point(resolver)?;

	let page = Document::requested("fb-1", DocumentType::FacebookPage);
	documents.create_document(&page, "https://example.com/orbit")?;
	let approved = documents.approve_document(&page)?;
	tracing::info!(document = %page.id, approved, "first review");
	documents.update_document(&page, "https://www.facebook.com/orbit")?;
	let approved = documents.approve_document(&page)?;
	tracing::info!(document = %page.id, approved, "second review");
	if let Err(err) = documents.update_document(&page, "https://example.com/late") {
		tracing::info!(%err, "update refused");
	}

	let guide = Document::requested("guide-1", DocumentType::UserGuide);
	documents.create_document(&guide, "docs/guide.md")?;
	let approved = documents.approve_document(&guide)?;
	tracing::info!(document = %guide.id, approved, "guide reviewed");
	Ok(())
}
