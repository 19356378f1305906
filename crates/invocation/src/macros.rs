//! Contract declaration macros.

/// Declares a service-point contract.
///
/// Expands to the trait itself (with `Send + Sync` supertraits), its
/// [`Contract`](crate::Contract) descriptor on `dyn Trait`, and an
/// implementation of the trait for [`ServicePoint<dyn Trait>`](crate::ServicePoint)
/// that routes every method without a default body by its `#[subject]`
/// parameter.
///
/// Routed methods must return `Result<_, E>` with `E: From<DispatchError>`.
/// Subject parameters are references (`&T`, `&dyn Trait`) or `Option` of one.
///
/// ```ignore
/// service_point! {
/// 	pub trait Greeter {
/// 		fn greet(&self, #[subject] animal: &dyn Animal, loud: bool) -> Result<String, GreetError>;
///
/// 		fn greet_quietly(&self, animal: &dyn Animal) -> Result<String, GreetError> {
/// 			self.greet(animal, false)
/// 		}
/// 	}
/// }
/// ```
#[macro_export]
macro_rules! service_point {
	(
		$(#[$meta:meta])*
		$vis:vis trait $name:ident {
			$(
				$(#[$mmeta:meta])*
				fn $method:ident(&$slf:ident $(, $(#[$pattr:ident])? $param:ident : $pty:ty)* $(,)?) -> $ret:ty
				$(;)? $($body:block)?
			)*
		}
	) => {
		$(#[$meta])*
		$vis trait $name: ::core::marker::Send + ::core::marker::Sync {
			$(
				$crate::__contract_method! {
					[$($body)?]
					$(#[$mmeta])*
					fn $method(&$slf $(, $param: $pty)*) -> $ret
				}
			)*
		}

		impl $crate::Contract for dyn $name {
			const DESCRIPTOR: &'static $crate::ContractDescriptor = &$crate::ContractDescriptor {
				name: stringify!($name),
				methods: &[
					$(
						$crate::__method_descriptor!(
							$method [$($body)?] ($([$($pattr)?] $param: $pty),*)
						),
					)*
				],
			};
		}

		impl $name for $crate::ServicePoint<dyn $name> {
			$(
				$crate::__forward_method! {
					[$($body)?]
					fn $method(&$slf $(, [$($pattr)?] $param: $pty)*) -> $ret
				}
			)*
		}
	};
}

/// Emits one trait method, with or without its default body.
#[doc(hidden)]
#[macro_export]
macro_rules! __contract_method {
	([$body:block] $(#[$m:meta])* fn $method:ident(&$slf:ident $(, $param:ident: $pty:ty)*) -> $ret:ty) => {
		$(#[$m])*
		fn $method(&$slf $(, $param: $pty)*) -> $ret $body
	};
	([] $(#[$m:meta])* fn $method:ident(&$slf:ident $(, $param:ident: $pty:ty)*) -> $ret:ty) => {
		$(#[$m])*
		fn $method(&$slf $(, $param: $pty)*) -> $ret;
	};
}

/// Builds a `MethodDescriptor` literal.
#[doc(hidden)]
#[macro_export]
macro_rules! __method_descriptor {
	($method:ident [$($body:block)?] ($([$($pattr:ident)?] $param:ident: $pty:ty),*)) => {
		$crate::MethodDescriptor {
			name: stringify!($method),
			params: &[$(
				$crate::ParamDescriptor {
					name: stringify!($param),
					ty: stringify!($pty),
					subject: $crate::__is_subject!($($pattr)?),
				}
			),*],
			provided: $crate::__is_provided!($($body)?),
		}
	};
}

/// Emits the routing forwarder for methods without a default body.
#[doc(hidden)]
#[macro_export]
macro_rules! __forward_method {
	([$body:block] fn $method:ident(&$slf:ident $(, [$($pattr:ident)?] $param:ident: $pty:ty)*) -> $ret:ty) => {};
	([] fn $method:ident(&$slf:ident $(, [$($pattr:ident)?] $param:ident: $pty:ty)*) -> $ret:ty) => {
		fn $method(&$slf $(, $param: $pty)*) -> $ret {
			const METHOD: &$crate::MethodDescriptor =
				&$crate::__method_descriptor!($method [] ($([$($pattr)?] $param: $pty),*));
			$slf.route(
				METHOD,
				&[$($crate::__argument!([$($pattr)?] $param)),*],
				|component| component.$method($($param),*),
			)
		}
	};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __is_subject {
	() => {
		false
	};
	(subject) => {
		true
	};
	($other:ident) => {
		compile_error!(concat!(
			"unknown parameter attribute `",
			stringify!($other),
			"`; expected `subject`"
		))
	};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __is_provided {
	() => {
		false
	};
	($body:block) => {
		true
	};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __argument {
	([subject] $param:ident) => {
		$crate::Argument::subject($param)
	};
	([$($other:ident)?] $param:ident) => {
		$crate::Argument::Value
	};
}
