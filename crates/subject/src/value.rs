//! Values produced by tagged accessors.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;

/// Raw value read from a subject by a tagged accessor.
///
/// Scalars are stringified into a property value, maps expand into
/// `parent.child` properties, `Null` produces nothing and `Unsupported` fails
/// the extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
	/// Absent value; no property is produced.
	Null,
	/// Text value.
	Text(String),
	/// Single character.
	Char(char),
	/// Signed integer.
	Int(i64),
	/// Unsigned integer.
	UInt(u64),
	/// Floating point number.
	Float(f64),
	/// Boolean.
	Bool(bool),
	/// Enumeration, carried as its variant name.
	Variant(&'static str),
	/// Composite value; each entry becomes `parent.key`.
	Map(Vec<(String, TagValue)>),
	/// A value shape that cannot become a property.
	Unsupported {
		/// Rust type name of the rejected value.
		type_name: &'static str,
	},
}

impl TagValue {
	/// Wraps an enum variant name, e.g. from a `strum::IntoStaticStr` derive.
	pub fn variant(name: impl Into<&'static str>) -> Self {
		Self::Variant(name.into())
	}

	/// Marks a value of type `T` as unsupported.
	pub fn unsupported<T: ?Sized>() -> Self {
		Self::Unsupported {
			type_name: std::any::type_name::<T>(),
		}
	}

	/// Collects a map-like iterator into a [`TagValue::Map`].
	pub fn map<K, V, I>(entries: I) -> Self
	where
		K: Display,
		V: IntoTagValue,
		I: IntoIterator<Item = (K, V)>,
	{
		Self::Map(
			entries
				.into_iter()
				.map(|(k, v)| (k.to_string(), v.into_tag_value()))
				.collect(),
		)
	}

	/// Returns the stringified form of a scalar, or `None` for
	/// `Null`, `Map` and `Unsupported`.
	pub fn scalar_string(&self) -> Option<String> {
		match self {
			Self::Text(s) => Some(s.clone()),
			Self::Char(c) => Some(c.to_string()),
			Self::Int(v) => Some(v.to_string()),
			Self::UInt(v) => Some(v.to_string()),
			Self::Float(v) => Some(v.to_string()),
			Self::Bool(v) => Some(v.to_string()),
			Self::Variant(name) => Some((*name).to_string()),
			Self::Null | Self::Map(_) | Self::Unsupported { .. } => None,
		}
	}
}

/// Conversion used by tag accessors.
pub trait IntoTagValue {
	/// Converts `self` into a [`TagValue`].
	fn into_tag_value(self) -> TagValue;
}

impl IntoTagValue for TagValue {
	fn into_tag_value(self) -> TagValue {
		self
	}
}

impl IntoTagValue for String {
	fn into_tag_value(self) -> TagValue {
		TagValue::Text(self)
	}
}

impl IntoTagValue for &str {
	fn into_tag_value(self) -> TagValue {
		TagValue::Text(self.to_string())
	}
}

impl IntoTagValue for &String {
	fn into_tag_value(self) -> TagValue {
		TagValue::Text(self.clone())
	}
}

impl IntoTagValue for char {
	fn into_tag_value(self) -> TagValue {
		TagValue::Char(self)
	}
}

impl IntoTagValue for bool {
	fn into_tag_value(self) -> TagValue {
		TagValue::Bool(self)
	}
}

macro_rules! impl_into_tag_value {
	($variant:ident as $repr:ty: $($ty:ty),+) => {
		$(
			impl IntoTagValue for $ty {
				fn into_tag_value(self) -> TagValue {
					TagValue::$variant(<$repr>::from(self))
				}
			}
		)+
	};
}

impl_into_tag_value!(Int as i64: i8, i16, i32, i64);
impl_into_tag_value!(UInt as u64: u8, u16, u32, u64);
impl_into_tag_value!(Float as f64: f32, f64);

impl IntoTagValue for usize {
	fn into_tag_value(self) -> TagValue {
		TagValue::UInt(self as u64)
	}
}

impl IntoTagValue for isize {
	fn into_tag_value(self) -> TagValue {
		TagValue::Int(self as i64)
	}
}

impl<T: IntoTagValue> IntoTagValue for Option<T> {
	fn into_tag_value(self) -> TagValue {
		self.map_or(TagValue::Null, IntoTagValue::into_tag_value)
	}
}

impl<K: Display, V: IntoTagValue> IntoTagValue for BTreeMap<K, V> {
	fn into_tag_value(self) -> TagValue {
		TagValue::map(self)
	}
}

impl<K: Display, V: IntoTagValue, S> IntoTagValue for HashMap<K, V, S> {
	fn into_tag_value(self) -> TagValue {
		TagValue::map(self)
	}
}

impl<T> IntoTagValue for Vec<T> {
	fn into_tag_value(self) -> TagValue {
		TagValue::unsupported::<Vec<T>>()
	}
}
