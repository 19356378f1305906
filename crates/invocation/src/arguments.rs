//! Type-erased call arguments handed to the router.

use orbit_subject::Subject;

/// One argument of an intercepted call.
///
/// Only subject parameters carry a value; everything else stays with the
/// forwarding closure and is passed to the implementation untouched.
#[derive(Debug, Clone, Copy)]
pub enum Argument<'a> {
	/// A `#[subject]` parameter; `None` if the caller passed no subject.
	Subject(Option<&'a dyn Subject>),
	/// Any other parameter.
	Value,
}

impl<'a> Argument<'a> {
	/// Wraps a subject parameter.
	pub fn subject(param: impl SubjectArg<'a>) -> Self {
		Self::Subject(param.subject_arg())
	}

	/// Returns the subject if this is a present subject argument.
	pub fn as_subject(&self) -> Option<&'a dyn Subject> {
		match self {
			Self::Subject(subject) => *subject,
			Self::Value => None,
		}
	}
}

/// Parameter types usable as `#[subject]`.
pub trait SubjectArg<'a> {
	/// Returns the subject, or `None` when absent.
	fn subject_arg(self) -> Option<&'a dyn Subject>;
}

impl<'a, T: ?Sized + Subject> SubjectArg<'a> for &'a T {
	fn subject_arg(self) -> Option<&'a dyn Subject> {
		Some(self.as_subject())
	}
}

impl<'a, T: ?Sized + Subject> SubjectArg<'a> for Option<&'a T> {
	fn subject_arg(self) -> Option<&'a dyn Subject> {
		self.map(|subject| subject.as_subject())
	}
}
