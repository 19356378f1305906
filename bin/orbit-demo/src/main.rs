//! Orbit demo binary.
//!
//! Runs a handful of scenarios against one shared registration store:
//! - animals routed by type and tags (static declarations)
//! - document and task workflows routed by state (manifest)
//! - file printing routed by subject type alone
//! - payment callbacks routed through signal bindings (runtime activation)

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use orbit_registry::{Manifest, RegistrationStore, Resolver};
use orbit_subject::{PropertyExtractor, TypeCatalog};
use strum::IntoEnumIterator;
use tracing::info;

mod animal;
mod document;
mod file;
mod issue;
mod payment;


/// Manifest used when `--manifest` is not given.
const DEFAULT_MANIFEST: &str = include_str!("../registrations.toml");

/// Demo command line arguments.
#[derive(Parser, Debug)]
#[command(name = "orbit-demo")]
#[command(about = "Subject-driven service dispatch demo")]
struct Args {
	/// Registration manifest to load instead of the built-in one
	#[arg(short, long, value_name = "PATH")]
	manifest: Option<PathBuf>,

	/// Scenario to run
	#[arg(short, long, value_enum, default_value_t = Scenario::All)]
	scenario: Scenario,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,
}

#[derive(
	Debug, Clone, Copy, PartialEq, Eq, ValueEnum, strum_macros::Display, strum_macros::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
enum Scenario {
	Animals,
	Documents,
	Issues,
	Files,
	Callbacks,
	All,
}

/// Everything the scenarios share.
struct App {
	catalog: Arc<TypeCatalog>,
	store: Arc<RegistrationStore>,
	resolver: Resolver,
}

impl App {
	fn new(manifest: &Manifest) -> anyhow::Result<Self> {
		let mut builder = TypeCatalog::builder();
		animal::declare(&mut builder);
		document::declare(&mut builder);
		issue::declare(&mut builder);
		file::declare(&mut builder);
		payment::declare(&mut builder);
		let catalog = Arc::new(builder.build()?);

		let store = Arc::new(RegistrationStore::new());
		store.load_static(&catalog);
		store
			.load_manifest(manifest, &catalog)
			.context("loading registration manifest")?;

		let resolver = Resolver::new(
			Arc::clone(&store),
			Arc::new(PropertyExtractor::new(Arc::clone(&catalog))),
		);
		Ok(Self {
			catalog,
			store,
			resolver,
		})
	}

	fn run(&self, scenario: Scenario) -> anyhow::Result<()> {
		info!(%scenario, "running scenario");
		match scenario {
			Scenario::Animals => animal::run(&self.resolver),
			Scenario::Documents => document::run(&self.resolver),
			Scenario::Issues => issue::run(&self.resolver),
			Scenario::Files => file::run(&self.resolver),
			Scenario::Callbacks => payment::run(&self.resolver),
			Scenario::All => Scenario::iter()
				.filter(|s| *s != Scenario::All)
				.try_for_each(|s| self.run(s)),
		}
	}
}

fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	setup_tracing(args.verbose);

	let manifest = match &args.manifest {
		Some(path) => Manifest::load(path)?,
		None => Manifest::parse(DEFAULT_MANIFEST)?,
	};
	let app = App::new(&manifest)?;
	info!(
		types = app.catalog.len(),
		registrations = app.store.len(),
		"registry ready"
	);
	for registration in app.store.registrations() {
		tracing::debug!(
			key = %registration.key(),
			implementation = %registration.implementation(),
			source = %registration.source(),
			"registration",
		);
	}

	app.run(args.scenario)
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new(
				"orbit_demo=trace,orbit_invocation=debug,orbit_registry=debug,orbit_subject=debug,info",
			)
		} else {
			EnvFilter::new("orbit_demo=info,warn")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(verbose)
		.init();
}
