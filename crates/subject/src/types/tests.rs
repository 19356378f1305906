use pretty_assertions::assert_eq;

use super::*;

struct Animal {
	name: String,
}

struct Cat {
	animal: Animal,
}

struct Lion {
	cat: Cat,
}

struct Rock;

fn catalog() -> TypeCatalog {
	let mut builder = TypeCatalog::builder();
	builder
		.root::<Animal>()
		.tag("name", 0, |a: &Animal| a.name.clone());
	builder.derive::<Cat, Animal>(|c| &c.animal);
	builder.derive::<Lion, Cat>(|l| &l.cat);
	builder.root::<Rock>();
	builder.build().expect("catalog")
}

#[test]
fn test_type_key_uses_short_name() {
	assert_eq!(TypeKey::of::<Cat>().name(), "Cat");
	assert_eq!(TypeKey::of::<Vec<u8>>().name(), "Vec");
	assert_eq!(TypeKey::named::<Cat>("Feline"), TypeKey::of::<Cat>());
}

/// Ancestors are listed from the queried type up to its root.
#[test]
fn test_ancestors_most_derived_first() {
	let catalog = catalog();
	let chain: Vec<_> = catalog
		.ancestors(TypeKey::of::<Lion>())
		.into_iter()
		.map(|k| k.name())
		.collect();
	assert_eq!(chain, vec!["Lion", "Cat", "Animal"]);
	assert!(catalog.ancestors(TypeKey::of::<String>()).is_empty());
}

#[test]
fn test_is_subtype() {
	let catalog = catalog();
	let animal = TypeKey::of::<Animal>();
	let cat = TypeKey::of::<Cat>();
	let lion = TypeKey::of::<Lion>();
	let rock = TypeKey::of::<Rock>();

	assert!(catalog.is_subtype(lion, animal));
	assert!(catalog.is_subtype(cat, cat));
	assert!(!catalog.is_subtype(animal, cat));
	assert!(!catalog.is_subtype(rock, animal));
}

#[test]
fn test_lookup_by_name() {
	let catalog = catalog();
	assert_eq!(catalog.by_name("Cat"), Some(TypeKey::of::<Cat>()));
	assert_eq!(catalog.by_name("Dog"), None);
	assert_eq!(catalog.len(), 4);
}

/// Upcast projections read the embedded parent value of a child.
#[test]
fn test_upcast_reaches_parent_value() {
	let catalog = catalog();
	let lion = Lion {
		cat: Cat {
			animal: Animal {
				name: "Leo".into(),
			},
		},
	};

	let (parent, upcast) = catalog.upcast(TypeKey::of::<Lion>()).expect("parent");
	assert_eq!(parent, TypeKey::of::<Cat>());
	let cat = upcast(&lion as &dyn Any).expect("projection");
	assert!(cat.is::<Cat>());
	assert!(upcast(&Rock as &dyn Any).is_none());
	assert!(catalog.upcast(TypeKey::of::<Animal>()).is_none());
}

#[test]
fn test_duplicate_declaration_rejected() {
	let mut builder = TypeCatalog::builder();
	builder.root::<Animal>();
	builder.root_named::<Cat>("Animal");
	assert_eq!(
		builder.build().unwrap_err(),
		CatalogError::DuplicateType { name: "Animal" }
	);
}

#[test]
fn test_unknown_parent_rejected() {
	let mut builder = TypeCatalog::builder();
	builder.derive::<Cat, Animal>(|c| &c.animal);
	assert!(matches!(
		builder.build(),
		Err(CatalogError::UnknownParent { child: "Cat", .. })
	));
}

/// Blank tag names are dropped instead of failing the declaration.
#[test]
fn test_blank_tag_name_skipped() {
	let mut builder = TypeCatalog::builder();
	builder
		.root::<Animal>()
		.tag("  ", 3, |a: &Animal| a.name.clone())
		.tag(" kind ", 1, |_: &Animal| "animal");
	let catalog = builder.build().expect("catalog");

	let node = catalog.node(TypeId::of::<Animal>()).expect("node");
	let names: Vec<_> = node.tags().iter().map(TagDecl::name).collect();
	assert_eq!(names, vec!["kind"]);
}
