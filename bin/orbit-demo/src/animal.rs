//! Animals: type inheritance and tag overrides.
//!
//! Registrations for this scenario are declared statically with
//! `domain_service!`.

use std::sync::Arc;

use orbit_invocation::{Components, DispatchError, ServicePoint, service_point};
use orbit_registry::{Resolver, domain_service};
use orbit_subject::{Subject, TagValue, TypeCatalogBuilder};
use strum_macros::{Display, IntoStaticStr};
use thiserror::Error;

/// Anything that can be asked to make a sound.
pub trait Animal: Subject {
	fn name(&self) -> &str;
}

/// Plain animal; the root of the hierarchy.
pub struct Creature {
	pub name: String,
}

pub struct Cat {
	pub base: Creature,
}

pub struct Dog {
	pub base: Creature,
}

pub struct Fish {
	pub base: Creature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PokemonType {
	Pikachu,
	Charizard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PokemonState {
	Wild,
	Trained,
}

pub struct Pokemon {
	pub base: Creature,
	pub kind: PokemonType,
	pub state: PokemonState,
}

impl Creature {
	pub fn new(name: impl Into<String>) -> Self {
		Self { name: name.into() }
	}
}

impl Pokemon {
	pub fn new(kind: PokemonType, state: PokemonState) -> Self {
		Self {
			base: Creature::new(format!("{kind}:{state}")),
			kind,
			state,
		}
	}
}

macro_rules! impl_animal {
	($($ty:ty => |$this:ident| $name:expr),+ $(,)?) => {
		$(
			impl Animal for $ty {
				fn name(&self) -> &str {
					let $this = self;
					$name
				}
			}
		)+
	};
}

impl_animal! {
	Creature => |this| &this.name,
	Cat => |this| &this.base.name,
	Dog => |this| &this.base.name,
	Fish => |this| &this.base.name,
	Pokemon => |this| &this.base.name,
}

/// Declares the animal hierarchy.
pub fn declare(builder: &mut TypeCatalogBuilder) {
	builder.root_named::<Creature>("Animal");
	builder.derive::<Cat, Creature>(|c| &c.base);
	builder.derive::<Dog, Creature>(|d| &d.base);
	builder.derive::<Fish, Creature>(|f| &f.base);
	builder
		.derive::<Pokemon, Creature>(|p| &p.base)
		.tag("type", 1, |p: &Pokemon| TagValue::variant(p.kind))
		.tag("state", 0, |p: &Pokemon| TagValue::variant(p.state));
}

#[derive(Debug, Error)]
pub enum AnimalError {
	#[error(transparent)]
	Dispatch(#[from] DispatchError),
	#[error("{0} doesn't make sound")]
	Silent(String),
}

service_point! {
	/// Animal behavior dispatched on the animal's type and tags.
	pub trait AnimalService {
		fn make_sound(&self, #[subject] animal: &dyn Animal) -> Result<String, AnimalError>;
	}
}

domain_service!("animal", Creature => "animal.generic");
domain_service!("animal", Cat => "animal.cat");
domain_service!("animal", Dog => "animal.dog");
domain_service!("animal", Pokemon => "animal.pokemon");
domain_service!("animal", Pokemon { "type" = "PIKACHU" } => "animal.pikachu");
domain_service!("animal", Pokemon { "type" = "PIKACHU", "state" = "TRAINED" } => "animal.trained-pikachu");

struct Generic;
struct Sound(&'static str);

impl AnimalService for Generic {
	fn make_sound(&self, animal: &dyn Animal) -> Result<String, AnimalError> {
		Err(AnimalError::Silent(animal.name().to_string()))
	}
}

impl AnimalService for Sound {
	fn make_sound(&self, animal: &dyn Animal) -> Result<String, AnimalError> {
		Ok(format!("{}: {}", animal.name(), self.0))
	}
}

/// Implementations keyed by the handles used in the declarations above.
pub fn components() -> Arc<Components<dyn AnimalService>> {
	let components: Arc<Components<dyn AnimalService>> = Arc::new(Components::new());
	components.insert("animal.generic", Arc::new(Generic));
	components.insert("animal.cat", Arc::new(Sound("meow meow")));
	components.insert("animal.dog", Arc::new(Sound("woof woof")));
	components.insert("animal.pokemon", Arc::new(Sound("roar")));
	components.insert("animal.pikachu", Arc::new(Sound("pika?")));
	components.insert("animal.trained-pikachu", Arc::new(Sound("pika pika!")));
	components
}

/// The animals the scenario walks through.
pub fn zoo() -> Vec<Box<dyn Animal>> {
	vec![
		Box::new(Dog {
			base: Creature::new("Buddy"),
		}),
		Box::new(Cat {
			base: Creature::new("Tigger"),
		}),
		Box::new(Pokemon::new(PokemonType::Charizard, PokemonState::Wild)),
		Box::new(Pokemon::new(PokemonType::Pikachu, PokemonState::Wild)),
		Box::new(Pokemon::new(PokemonType::Pikachu, PokemonState::Trained)),
		Box::new(Fish {
			base: Creature::new("Nemo"),
		}),
	]
}

/// Asks every animal of the zoo for its sound.
///
/// Silent animals produce their error message instead of a sound; dispatch
/// failures abort the scenario.
pub fn sounds(resolver: &Resolver) -> anyhow::Result<Vec<String>> {
	let animals = ServicePoint::<dyn AnimalService>::new("animal", resolver.clone(), components())?;
	let mut out = Vec::new();
	for animal in zoo() {
		match animals.make_sound(animal.as_ref()) {
			Ok(sound) => out.push(sound),
			Err(err @ AnimalError::Silent(_)) => out.push(err.to_string()),
			Err(err) => return Err(err.into()),
		}
	}
	Ok(out)
}

pub fn run(resolver: &Resolver) -> anyhow::Result<()> {
	for line in sounds(resolver)? {
		tracing::info!("{line}");
	}
	Ok(())
}
