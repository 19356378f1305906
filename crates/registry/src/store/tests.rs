use std::sync::Arc;
use std::thread;

use orbit_subject::TypeKey;
use pretty_assertions::assert_eq;

use super::*;
use crate::key::RegistrationSource;

struct Animal;
struct Cat;

fn key(service_point: &str) -> RegistrationKey {
	RegistrationKey::new(service_point, TypeKey::of::<Animal>())
}

#[test]
fn test_add_lookup_remove() {
	let store = RegistrationStore::new();
	let key = key("greet").with("state", "WILD");
	assert!(store.add(Registration::new(key.clone(), "wild")).is_none());

	let found = store.lookup(&key).expect("registered");
	assert_eq!(found.implementation().as_str(), "wild");
	assert_eq!(found.source(), RegistrationSource::Runtime);

	let removed = store.remove(&key).expect("removed");
	assert_eq!(removed.implementation().as_str(), "wild");
	assert!(store.lookup(&key).is_none());
	assert!(store.remove(&key).is_none());
	assert!(store.is_empty());
}

/// Constraint order does not affect key identity.
#[test]
fn test_key_equality_ignores_constraint_order() {
	let store = RegistrationStore::new();
	store.add(Registration::new(
		key("greet").with("type", "PIKACHU").with("state", "WILD"),
		"wild-pikachu",
	));

	let probe = key("greet").with("state", "WILD").with("type", "PIKACHU");
	assert!(store.lookup(&probe).is_some());
	assert!(store.lookup(&key("greet").with("state", "WILD")).is_none());
}

#[test]
fn test_last_add_wins() {
	let store = RegistrationStore::new();
	store.add(Registration::new(key("greet"), "first"));
	let replaced = store
		.add(Registration::new(key("greet"), "second"))
		.expect("replaced");

	assert_eq!(replaced.implementation().as_str(), "first");
	assert_eq!(
		store.lookup(&key("greet")).map(|r| r.implementation().clone()),
		Some("second".into())
	);
	assert_eq!(store.len(), 1);
}

/// A held snapshot is unaffected by later writes.
#[test]
fn test_snapshot_isolation() {
	let store = RegistrationStore::new();
	store.add(Registration::new(key("greet"), "generic"));
	let before = store.snapshot();

	store.remove(&key("greet"));
	store.add(Registration::new(key("feed"), "feeder"));

	assert!(before.lookup(&key("greet")).is_some());
	assert!(before.lookup(&key("feed")).is_none());
	assert_eq!(before.len(), 1);
	assert!(!Arc::ptr_eq(&before, &store.snapshot()));
}

#[test]
fn test_registrations_are_sorted() {
	let store = RegistrationStore::new();
	store.add(Registration::new(
		RegistrationKey::new("greet", TypeKey::of::<Cat>()),
		"cat",
	));
	store.add(Registration::new(key("greet").with("type", "B"), "b"));
	store.add(Registration::new(key("feed"), "feeder"));
	store.add(Registration::new(key("greet"), "generic"));

	let listed: Vec<_> = store
		.registrations()
		.iter()
		.map(|r| r.implementation().to_string())
		.collect();
	assert_eq!(listed, vec!["feeder", "generic", "b", "cat"]);
}

/// Dropping the guard removes the entry, but never a later replacement.
#[test]
fn test_activation_guard() {
	let store = Arc::new(RegistrationStore::new());

	let guard = store.activate(Registration::new(key("greet"), "temporary"));
	assert_eq!(guard.registration().implementation().as_str(), "temporary");
	assert!(store.lookup(&key("greet")).is_some());
	drop(guard);
	assert!(store.lookup(&key("greet")).is_none());

	let guard = store.activate(Registration::new(key("greet"), "temporary"));
	store.add(Registration::new(key("greet"), "replacement"));
	drop(guard);
	assert_eq!(
		store
			.lookup(&key("greet"))
			.map(|r| r.implementation().to_string()),
		Some("replacement".to_string())
	);
}

/// Two guards for equal registrations each own their entry: dropping the
/// replaced guard leaves the live one in place.
#[test]
fn test_equal_activations_keep_own_entry() {
	let store = Arc::new(RegistrationStore::new());
	let registration = Registration::new(key("greet"), "temporary");

	let first = store.activate(registration.clone());
	let second = store.activate(registration.clone());
	assert_eq!(first.registration(), second.registration());

	drop(first);
	assert_eq!(store.lookup(&key("greet")), Some(registration));

	drop(second);
	assert!(store.lookup(&key("greet")).is_none());
}

/// Concurrent writers on distinct keys never lose updates, and readers only
/// ever observe complete registrations.
#[test]
fn test_concurrent_add_remove_lookup() {
	let store = Arc::new(RegistrationStore::new());
	let writers: Vec<_> = (0..8)
		.map(|t| {
			let store = Arc::clone(&store);
			thread::spawn(move || {
				for i in 0..50 {
					let key = key("greet").with("slot", format!("{t}-{i}"));
					store.add(Registration::new(key.clone(), format!("impl-{t}-{i}")));
					if i % 2 == 1 {
						assert!(store.remove(&key).is_some());
					}
				}
			})
		})
		.collect();

	let reader = {
		let store = Arc::clone(&store);
		thread::spawn(move || {
			for _ in 0..200 {
				let snap = store.snapshot();
				for registration in snap.iter() {
					let slot = registration
						.key()
						.constraints()
						.next()
						.map(|c| c.value().to_string())
						.unwrap_or_default();
					assert_eq!(
						registration.implementation().to_string(),
						format!("impl-{slot}")
					);
				}
			}
		})
	};

	for handle in writers {
		handle.join().expect("writer");
	}
	reader.join().expect("reader");

	assert_eq!(store.len(), 8 * 25);
	for t in 0..8 {
		for i in (0..50).step_by(2) {
			let key = key("greet").with("slot", format!("{t}-{i}"));
			assert!(store.lookup(&key).is_some(), "lost update for {t}-{i}");
		}
	}
}
