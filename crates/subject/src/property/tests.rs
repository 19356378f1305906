use pretty_assertions::assert_eq;

use super::*;

struct Document;
struct Guide;
struct Unrelated;

fn catalog() -> TypeCatalog {
	let mut builder = TypeCatalog::builder();
	builder.root::<Document>();
	builder.derive::<Guide, Document>(|_| &Document);
	builder.root::<Unrelated>();
	builder.build().expect("catalog")
}

fn prop<T: 'static>(name: &str, priority: i32, value: &str) -> TaggedProperty {
	TaggedProperty::new(TypeKey::of::<T>(), name, priority, value)
}

#[test]
fn test_subtype_replaces_supertype() {
	let catalog = catalog();
	let base = prop::<Document>("type", 100, "DOC");
	let derived = prop::<Guide>("type", 1, "GUIDE");

	assert!(derived.can_replace(&base, &catalog));
	assert!(!base.can_replace(&derived, &catalog));
	assert!(base.can_replace(&base.clone(), &catalog));
	assert!(!prop::<Unrelated>("type", 0, "x").can_replace(&base, &catalog));
}

/// Merge order does not matter: the subtype's property wins either way.
#[test]
fn test_merge_keeps_most_derived() {
	let catalog = catalog();

	let mut forward = PropertySet::new();
	assert!(forward.merge(prop::<Guide>("type", 1, "GUIDE"), &catalog));
	assert!(!forward.merge(prop::<Document>("type", 100, "DOC"), &catalog));

	let mut backward = PropertySet::new();
	assert!(backward.merge(prop::<Document>("type", 100, "DOC"), &catalog));
	assert!(backward.merge(prop::<Guide>("type", 1, "GUIDE"), &catalog));

	assert_eq!(forward, backward);
	assert_eq!(forward.get("type").map(TaggedProperty::value), Some("GUIDE"));
}

#[test]
fn test_iteration_is_name_ordered() {
	let catalog = catalog();
	let mut set = PropertySet::new();
	set.merge(prop::<Document>("workflow", 10, "ISSUE"), &catalog);
	set.merge(prop::<Document>("state", 5, "OPEN"), &catalog);
	set.merge(prop::<Document>("attrs.a", 0, "1"), &catalog);

	let names: Vec<_> = set.iter().map(TaggedProperty::name).collect();
	assert_eq!(names, vec!["attrs.a", "state", "workflow"]);
	assert_eq!(set.len(), 3);
	assert!(!set.is_empty());
}

#[test]
fn test_debug_format() {
	let p = prop::<Document>("state", 10, "OPEN");
	assert_eq!(format!("{p:?}"), r#"Document.state@10="OPEN""#);
}
