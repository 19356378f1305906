//! End-to-end resolution over a small animal hierarchy.

use std::collections::BTreeMap;
use std::sync::Arc;

use orbit_registry::{
	Manifest, Registration, RegistrationKey, RegistrationSource, RegistrationStore, ResolveError, Resolver,
	domain_service,
};
use orbit_subject::{PropertyExtractor, PropertyError, Subject, TagValue, TypeCatalog, TypeKey};
use pretty_assertions::assert_eq;
use rstest::rstest;

struct Animal {
	name: &'static str,
}

struct Cat {
	animal: Animal,
}

struct Kitten {
	cat: Cat,
}

struct Dog {
	animal: Animal,
}

struct Fish {
	animal: Animal,
}

#[derive(Clone, Copy, strum_macros::IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
enum Species {
	Pikachu,
	Charmander,
}

#[derive(Clone, Copy, strum_macros::IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
enum State {
	Wild,
	Trained,
}

struct Pokemon {
	animal: Animal,
	species: Species,
	state: State,
}

/// An animal with map-valued markings, flattened to `colors.<part>`.
struct Egg {
	animal: Animal,
	colors: BTreeMap<&'static str, &'static str>,
}

struct Unregistered;

domain_service!("feed", Cat => "cat-feeder");
domain_service!("feed", Pokemon { "type" = "PIKACHU" } => "berry-feeder");

fn catalog() -> TypeCatalog {
	let mut builder = TypeCatalog::builder();
	builder.root::<Animal>();
	builder.derive::<Cat, Animal>(|c| &c.animal);
	builder.derive::<Kitten, Cat>(|k| &k.cat);
	builder.derive::<Dog, Animal>(|d| &d.animal);
	builder.derive::<Fish, Animal>(|f| &f.animal);
	builder
		.derive::<Egg, Animal>(|e| &e.animal)
		.tag("colors", 0, |e: &Egg| e.colors.clone());
	builder
		.derive::<Pokemon, Animal>(|p| &p.animal)
		.tag("type", 1, |p: &Pokemon| TagValue::variant(p.species))
		.tag("state", 0, |p: &Pokemon| TagValue::variant(p.state));
	builder.build().expect("catalog")
}

fn animal() -> Animal {
	Animal { name: "any" }
}

fn pokemon(species: Species, state: State) -> Pokemon {
	Pokemon {
		animal: animal(),
		species,
		state,
	}
}

fn key<T: 'static>() -> RegistrationKey {
	RegistrationKey::new("animal", TypeKey::of::<T>())
}

fn resolver_with(registrations: &[(RegistrationKey, &str)]) -> Resolver {
	let store = Arc::new(RegistrationStore::new());
	for (key, implementation) in registrations {
		store.add(Registration::new(key.clone(), *implementation));
	}
	Resolver::new(store, Arc::new(PropertyExtractor::new(Arc::new(catalog()))))
}

fn scenario() -> Resolver {
	resolver_with(&[
		(key::<Animal>(), "generic"),
		(key::<Cat>(), "cat"),
		(key::<Pokemon>().with("type", "PIKACHU"), "pikachu"),
		(
			key::<Pokemon>()
				.with("type", "PIKACHU")
				.with("state", "TRAINED"),
			"trained-pikachu",
		),
	])
}

fn resolved(resolver: &Resolver, subject: &dyn Subject) -> Option<String> {
	resolver
		.resolve("animal", subject)
		.expect("resolve")
		.map(|r| r.implementation().to_string())
}

#[rstest]
#[case::wild_pikachu(Box::new(pokemon(Species::Pikachu, State::Wild)), Some("pikachu"))]
#[case::trained_pikachu(Box::new(pokemon(Species::Pikachu, State::Trained)), Some("trained-pikachu"))]
#[case::other_pokemon(Box::new(pokemon(Species::Charmander, State::Trained)), Some("generic"))]
#[case::cat(Box::new(Cat { animal: animal() }), Some("cat"))]
#[case::kitten(Box::new(Kitten { cat: Cat { animal: animal() } }), Some("cat"))]
#[case::dog(Box::new(Dog { animal: animal() }), Some("generic"))]
#[case::fish(Box::new(Fish { animal: animal() }), Some("generic"))]
#[case::animal(Box::new(animal()), Some("generic"))]
fn test_animal_scenario(#[case] subject: Box<dyn Subject>, #[case] expected: Option<&str>) {
	let resolver = scenario();
	assert_eq!(resolved(&resolver, subject.as_ref()).as_deref(), expected);
}

/// Without an `Animal`-level entry a fish has nothing to fall back to.
#[test]
fn test_fish_without_generic_entry() {
	let resolver = resolver_with(&[(key::<Cat>(), "cat")]);
	assert_eq!(resolved(&resolver, &Fish { animal: animal() }), None);
}

#[test]
fn test_specificity_monotonicity() {
	let resolver = resolver_with(&[
		(key::<Animal>(), "animal"),
		(key::<Cat>(), "cat"),
		(key::<Kitten>(), "kitten"),
	]);
	let kitten = Kitten {
		cat: Cat { animal: animal() },
	};
	assert_eq!(resolved(&resolver, &kitten).as_deref(), Some("kitten"));
}

/// A registration that constrains a matching property beats the bare type
/// registration.
#[test]
fn test_priority_tie_break() {
	let resolver = resolver_with(&[
		(key::<Pokemon>(), "any-pokemon"),
		(key::<Pokemon>().with("type", "PIKACHU"), "pikachu"),
	]);
	let subject = pokemon(Species::Pikachu, State::Wild);
	assert_eq!(resolved(&resolver, &subject).as_deref(), Some("pikachu"));

	let subject = pokemon(Species::Charmander, State::Wild);
	assert_eq!(resolved(&resolver, &subject).as_deref(), Some("any-pokemon"));
}

#[test]
fn test_no_match_is_none() {
	let resolver = scenario();
	let found = resolver
		.resolve("unknown", &pokemon(Species::Pikachu, State::Wild))
		.expect("resolve");
	assert!(found.is_none());
}

#[test]
fn test_undeclared_subject_is_error() {
	let resolver = scenario();
	let err = resolver.resolve("animal", &Unregistered).unwrap_err();
	assert!(matches!(
		err,
		ResolveError::Property(PropertyError::UndeclaredType { .. })
	));
}

/// New subtypes and registrations do not change what existing subjects
/// resolve to.
#[test]
fn test_adding_registrations_keeps_existing_results() {
	let resolver = scenario();
	let dog = Dog { animal: animal() };
	assert_eq!(resolved(&resolver, &dog).as_deref(), Some("generic"));

	resolver
		.store()
		.add(Registration::new(key::<Fish>(), "fish"));
	assert_eq!(resolved(&resolver, &dog).as_deref(), Some("generic"));
	assert_eq!(
		resolved(&resolver, &Fish { animal: animal() }).as_deref(),
		Some("fish")
	);

	resolver.store().remove(&key::<Fish>());
	assert_eq!(
		resolved(&resolver, &Fish { animal: animal() }).as_deref(),
		Some("generic")
	);
}

#[test]
fn test_static_declarations() {
	let catalog = Arc::new(catalog());
	let store = Arc::new(RegistrationStore::new());
	assert_eq!(store.load_static(&catalog), 2);

	let resolver = Resolver::new(store, Arc::new(PropertyExtractor::new(catalog)));
	let found = resolver
		.resolve("feed", &pokemon(Species::Pikachu, State::Wild))
		.expect("resolve")
		.expect("registered");
	assert_eq!(found.implementation().as_str(), "berry-feeder");
	assert_eq!(
		found.source(),
		RegistrationSource::Static(env!("CARGO_PKG_NAME"))
	);

	let kitten = Kitten {
		cat: Cat { animal: animal() },
	};
	let found = resolver.resolve("feed", &kitten).expect("resolve");
	assert_eq!(
		found.map(|r| r.implementation().to_string()).as_deref(),
		Some("cat-feeder")
	);
}

#[test]
fn test_animal_name_is_not_a_property() {
	let extractor = PropertyExtractor::new(Arc::new(catalog()));
	let subject = Animal { name: "Rex" };
	assert!(extractor.properties(&subject).expect("properties").is_empty());
	assert_eq!(subject.name, "Rex");
}

/// Nested manifest tables register against map-valued properties.
#[test]
fn test_manifest_composite_constraint() {
	let manifest = Manifest::parse(
		r#"
[[service]]
service_point = "animal"
subject = "Animal"
implementation = "generic"

[[service]]
service_point = "animal"
subject = "Egg"
implementation = "red-egg"

[service.constraints]
colors.primary = "RED"
"#,
	)
	.expect("manifest");

	let catalog = Arc::new(catalog());
	let store = Arc::new(RegistrationStore::new());
	assert_eq!(store.load_manifest(&manifest, &catalog).expect("load"), 2);
	let resolver = Resolver::new(store, Arc::new(PropertyExtractor::new(catalog)));

	let egg = |primary| Egg {
		animal: animal(),
		colors: BTreeMap::from([("primary", primary)]),
	};
	assert_eq!(resolved(&resolver, &egg("RED")).as_deref(), Some("red-egg"));
	assert_eq!(resolved(&resolver, &egg("BLUE")).as_deref(), Some("generic"));
}
