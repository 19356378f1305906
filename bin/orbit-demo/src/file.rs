//! File printing: plain subject-type routing.
//!
//! Only text files have a printer. Nothing is registered for the base file
//! type, so other files are reported as unroutable.

use std::sync::Arc;

use orbit_invocation::{Components, DispatchError, ServicePoint, service_point};
use orbit_registry::{Resolver, domain_service};
use orbit_subject::{Subject, TypeCatalogBuilder};
use thiserror::Error;

pub trait FileLike: Subject {
	fn path(&self) -> &str;
}

pub struct File {
	pub path: String,
}

pub struct TxtFile {
	pub file: File,
	pub lines: Vec<String>,
}

pub struct PdfFile {
	pub file: File,
}

impl FileLike for File {
	fn path(&self) -> &str {
		&self.path
	}
}

impl FileLike for TxtFile {
	fn path(&self) -> &str {
		&self.file.path
	}
}

impl FileLike for PdfFile {
	fn path(&self) -> &str {
		&self.file.path
	}
}

pub fn declare(builder: &mut TypeCatalogBuilder) {
	builder.root::<File>();
	builder.derive::<TxtFile, File>(|t| &t.file);
	builder.derive::<PdfFile, File>(|p| &p.file);
}

#[derive(Debug, Error)]
pub enum FileError {
	#[error(transparent)]
	Dispatch(#[from] DispatchError),
}

service_point! {
	pub trait FilePrintService {
		/// Returns the printed text.
		fn print(&self, #[subject] file: &dyn FileLike) -> Result<String, FileError>;
	}
}

domain_service!("file-print", TxtFile => "file.print.txt");

struct TxtPrinter;

impl FilePrintService for TxtPrinter {
	fn print(&self, file: &dyn FileLike) -> Result<String, FileError> {
		let Some(txt) = file.as_subject().downcast_ref::<TxtFile>() else {
			return Ok(format!("{}: <empty>", file.path()));
		};
		Ok(format!("{}: {}", txt.path(), txt.lines.join(" / ")))
	}
}

pub fn service_point(resolver: &Resolver) -> anyhow::Result<ServicePoint<dyn FilePrintService>> {
	let components: Arc<Components<dyn FilePrintService>> = Arc::new(Components::new());
	components.insert("file.print.txt", Arc::new(TxtPrinter));
	Ok(ServicePoint::<dyn FilePrintService>::new(
		"file-print",
		resolver.clone(),
		components,
	)?)
}

pub fn run(resolver: &Resolver) -> anyhow::Result<()> {
	let printer = service_point(resolver)?;
	let files: Vec<Box<dyn FileLike>> = vec![
		Box::new(TxtFile {
			file: File {
				path: "notes.txt".into(),
			},
			lines: vec!["buy milk".into(), "call home".into()],
		}),
		Box::new(PdfFile {
			file: File {
				path: "report.pdf".into(),
			},
		}),
	];
	for file in &files {
		match printer.print(file.as_ref()) {
			Ok(text) => tracing::info!(path = file.path(), %text, "printed"),
			Err(FileError::Dispatch(err @ DispatchError::ServiceNotFound { .. })) => {
				tracing::info!(path = file.path(), %err, "no printer");
			}
			Err(err) => return Err(err.into()),
		}
	}
	Ok(())
}
