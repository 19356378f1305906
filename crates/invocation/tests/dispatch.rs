//! Service-point dispatch through generated forwarders.

use std::sync::Arc;

use orbit_invocation::{
	ComponentFactory, Components, Contract, ContractError, DispatchError, ServicePoint,
	SignalBinding, service_point,
};
use orbit_registry::{
	ImplementationHandle, Registration, RegistrationKey, RegistrationStore, Resolver,
};
use orbit_subject::{PropertyExtractor, Subject, TypeCatalog, TypeKey};
use pretty_assertions::assert_eq;
use rstest::rstest;

trait Animal: Subject {
	fn name(&self) -> &str;
}

struct Creature {
	name: &'static str,
}

struct Cat {
	creature: Creature,
}

struct Dog {
	creature: Creature,
}

struct Rock;

impl Animal for Creature {
	fn name(&self) -> &str {
		self.name
	}
}

impl Animal for Cat {
	fn name(&self) -> &str {
		self.creature.name
	}
}

impl Animal for Dog {
	fn name(&self) -> &str {
		self.creature.name
	}
}

impl Animal for Rock {
	fn name(&self) -> &str {
		"rock"
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum GreetError {
	Dispatch(DispatchError),
	Grumpy(String),
}

impl From<DispatchError> for GreetError {
	fn from(err: DispatchError) -> Self {
		Self::Dispatch(err)
	}
}

service_point! {
	/// Greets animals.
	pub trait Greeter {
		fn greet(&self, #[subject] animal: &dyn Animal, punctuation: char) -> Result<String, GreetError>;

		fn greet_maybe(&self, #[subject] animal: Option<&dyn Animal>) -> Result<String, GreetError>;

		fn greet_plain(&self, animal: &dyn Animal) -> Result<String, GreetError> {
			self.greet(animal, '.')
		}
	}
}

service_point! {
	trait Unmarked {
		fn feed(&self, animal: &dyn Animal) -> Result<(), GreetError>;
	}
}

service_point! {
	pub trait OnGreeted {
		fn greeted(&self, #[subject] animal: &dyn Animal, punctuation: char) -> Result<(), GreetError>;
	}
}

struct Generic;

impl Greeter for Generic {
	fn greet(&self, animal: &dyn Animal, punctuation: char) -> Result<String, GreetError> {
		Ok(format!("hello {}{punctuation}", animal.name()))
	}

	fn greet_maybe(&self, animal: Option<&dyn Animal>) -> Result<String, GreetError> {
		Ok(format!("hello {}", animal.map_or("nobody", |a| a.name())))
	}
}

struct CatGreeter;

impl Greeter for CatGreeter {
	fn greet(&self, animal: &dyn Animal, punctuation: char) -> Result<String, GreetError> {
		Ok(format!("purr {}{punctuation}", animal.name()))
	}

	fn greet_maybe(&self, _: Option<&dyn Animal>) -> Result<String, GreetError> {
		Err(GreetError::Grumpy("cats do not answer maybes".into()))
	}
}

fn catalog() -> Arc<TypeCatalog> {
	let mut builder = TypeCatalog::builder();
	builder.root::<Creature>();
	builder.derive::<Cat, Creature>(|c| &c.creature);
	builder.derive::<Dog, Creature>(|d| &d.creature);
	builder.root::<Rock>();
	Arc::new(builder.build().expect("catalog"))
}

struct Fixture {
	store: Arc<RegistrationStore>,
	components: Arc<Components<dyn Greeter>>,
	greeter: ServicePoint<dyn Greeter>,
}

fn fixture() -> Fixture {
	let store = Arc::new(RegistrationStore::new());
	let resolver = Resolver::new(
		Arc::clone(&store),
		Arc::new(PropertyExtractor::new(catalog())),
	);
	let components: Arc<Components<dyn Greeter>> = Arc::new(Components::new());

	store.add(Registration::new(
		RegistrationKey::new("greeter", TypeKey::of::<Creature>()),
		"generic",
	));
	store.add(Registration::new(
		RegistrationKey::new("greeter", TypeKey::of::<Cat>()),
		"cat",
	));
	components.insert("generic", Arc::new(Generic));
	components.insert("cat", Arc::new(CatGreeter));

	let greeter = ServicePoint::<dyn Greeter>::new("greeter", resolver, components.clone())
		.expect("contract");
	Fixture {
		store,
		components,
		greeter,
	}
}

fn creature(name: &'static str) -> Creature {
	Creature { name }
}

#[rstest]
#[case::cat(Box::new(Cat { creature: creature("Tom") }), "purr Tom!")]
#[case::dog(Box::new(Dog { creature: creature("Rex") }), "hello Rex!")]
#[case::creature(Box::new(creature("Blob")), "hello Blob!")]
fn test_routes_to_most_specific(#[case] animal: Box<dyn Animal>, #[case] expected: &str) {
	let fixture = fixture();
	assert_eq!(
		fixture.greeter.greet(animal.as_ref(), '!').as_deref(),
		Ok(expected)
	);
}

/// Default bodies run on the service point and route through the other
/// methods.
#[test]
fn test_provided_method_forwards() {
	let fixture = fixture();
	let cat = Cat {
		creature: creature("Tom"),
	};
	assert_eq!(fixture.greeter.greet_plain(&cat).as_deref(), Ok("purr Tom."));
}

#[test]
fn test_missing_subject() {
	let fixture = fixture();
	let err = fixture.greeter.greet_maybe(None).unwrap_err();
	assert_eq!(
		err,
		GreetError::Dispatch(DispatchError::SubjectNotFound {
			service_point: "greeter".into(),
			method: "greet_maybe",
		})
	);

	let dog = Dog {
		creature: creature("Rex"),
	};
	assert_eq!(
		fixture.greeter.greet_maybe(Some(&dog)).as_deref(),
		Ok("hello Rex")
	);
}

#[test]
fn test_service_not_found() {
	let fixture = fixture();
	let err = fixture.greeter.greet(&Rock, '!').unwrap_err();
	assert!(matches!(
		err,
		GreetError::Dispatch(DispatchError::ServiceNotFound { .. })
	));
}

#[test]
fn test_component_not_found() {
	let fixture = fixture();
	fixture.components.remove(&ImplementationHandle::from("cat"));

	let cat = Cat {
		creature: creature("Tom"),
	};
	let err = fixture.greeter.greet(&cat, '!').unwrap_err();
	assert_eq!(
		err,
		GreetError::Dispatch(DispatchError::ComponentNotFound {
			service_point: "greeter".into(),
			implementation: "cat".into(),
		})
	);
}

/// Errors raised by the implementation reach the caller unchanged.
#[test]
fn test_callee_error_passes_through() {
	let fixture = fixture();
	let cat = Cat {
		creature: creature("Tom"),
	};
	assert_eq!(
		fixture.greeter.greet_maybe(Some(&cat)),
		Err(GreetError::Grumpy("cats do not answer maybes".into()))
	);
}

#[test]
fn test_undeclared_subject_is_resolve_error() {
	let fixture = fixture();
	struct Ghost;
	impl Animal for Ghost {
		fn name(&self) -> &str {
			"ghost"
		}
	}
	let err = fixture.greeter.greet(&Ghost, '!').unwrap_err();
	assert!(matches!(
		err,
		GreetError::Dispatch(DispatchError::Resolve(_))
	));
}

#[test]
fn test_invalid_contract_rejected() {
	let fixture = fixture();
	let components: Arc<Components<dyn Unmarked>> = Arc::new(Components::new());
	let err = ServicePoint::<dyn Unmarked>::new(
		"unmarked",
		fixture.greeter.router().resolver().clone(),
		components,
	)
	.unwrap_err();
	assert!(matches!(err, ContractError::MissingSubject { method: "feed", .. }));
}

/// An activated service serves calls until its guard is dropped.
#[test]
fn test_activated_service_lifecycle() {
	let fixture = fixture();
	let dog = Dog {
		creature: creature("Rex"),
	};

	struct DogGreeter;
	impl Greeter for DogGreeter {
		fn greet(&self, animal: &dyn Animal, _: char) -> Result<String, GreetError> {
			Ok(format!("woof {}", animal.name()))
		}

		fn greet_maybe(&self, _: Option<&dyn Animal>) -> Result<String, GreetError> {
			Ok("woof?".into())
		}
	}

	let active = fixture.components.activate(
		&fixture.store,
		Registration::new(
			RegistrationKey::new("greeter", TypeKey::of::<Dog>()),
			"dog",
		),
		Arc::new(DogGreeter),
	);
	assert_eq!(active.registration().implementation().as_str(), "dog");
	assert_eq!(fixture.greeter.greet(&dog, '!').as_deref(), Ok("woof Rex"));

	drop(active);
	assert_eq!(fixture.greeter.greet(&dog, '!').as_deref(), Ok("hello Rex!"));
	assert!(
		fixture
			.components
			.component(&ImplementationHandle::from("dog"))
			.is_none()
	);
}

#[derive(Default)]
struct Recorder {
	seen: parking_lot::Mutex<Vec<String>>,
}

impl OnGreeted for Recorder {
	fn greeted(&self, animal: &dyn Animal, punctuation: char) -> Result<(), GreetError> {
		self.seen.lock().push(format!("{}{punctuation}", animal.name()));
		Ok(())
	}
}

#[test]
fn test_signal_binding() {
	let fixture = fixture();
	let target = <dyn Greeter as Contract>::DESCRIPTOR
		.method("greet")
		.expect("greet");
	let signals: Arc<Components<dyn OnGreeted>> = Arc::new(Components::new());
	let recorder = Arc::new(Recorder::default());

	let binding = SignalBinding::bind(
		target,
		Registration::new(
			RegistrationKey::new("on-greeted", TypeKey::of::<Cat>()),
			"recorder",
		),
		recorder.clone() as Arc<dyn OnGreeted>,
		&fixture.store,
		&signals,
	)
	.expect("signal shape");
	assert_eq!(binding.target(), "greet");

	let on_greeted = ServicePoint::<dyn OnGreeted>::new(
		"on-greeted",
		fixture.greeter.router().resolver().clone(),
		signals.clone(),
	)
	.expect("contract");
	let cat = Cat {
		creature: creature("Tom"),
	};
	on_greeted.greeted(&cat, '!').expect("fired");
	assert_eq!(*recorder.seen.lock(), vec!["Tom!".to_string()]);

	drop(binding);
	assert!(matches!(
		on_greeted.greeted(&cat, '!'),
		Err(GreetError::Dispatch(DispatchError::ServiceNotFound { .. }))
	));
}

#[test]
fn test_signal_mismatch_rejected() {
	let fixture = fixture();
	let target = <dyn Greeter as Contract>::DESCRIPTOR
		.method("greet_maybe")
		.expect("greet_maybe");
	let signals: Arc<Components<dyn OnGreeted>> = Arc::new(Components::new());

	let err = SignalBinding::bind(
		target,
		Registration::new(
			RegistrationKey::new("on-greeted", TypeKey::of::<Cat>()),
			"recorder",
		),
		Arc::new(Recorder::default()) as Arc<dyn OnGreeted>,
		&fixture.store,
		&signals,
	)
	.unwrap_err();
	assert!(matches!(err, ContractError::SignalMismatch { .. }));
	assert!(signals.is_empty());
	assert_eq!(fixture.store.len(), 2);
}
