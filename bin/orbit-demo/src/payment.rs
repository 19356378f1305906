//! Payments with routed completion callbacks.
//!
//! The caller passes a [`ServiceRef`] naming who should hear about the
//! finished payment. The executor fires [`PaymentCallback`] with the same
//! arguments it was called with, and the callback is routed by the
//! reference's tags to whichever signal binding claimed it.

use std::sync::Arc;

use orbit_invocation::{
	ActiveService, Components, Contract, DispatchError, ServicePoint, SignalBinding, service_point,
};
use orbit_registry::{Registration, RegistrationKey, Resolver};
use orbit_subject::{TypeCatalogBuilder, TypeKey};
use parking_lot::Mutex;
use thiserror::Error;

/// Names the recipient of a callback, either by name or by value.
#[derive(Debug, Clone, Default)]
pub struct ServiceRef {
	pub name: Option<String>,
	pub value: Option<String>,
}

impl ServiceRef {
	pub fn named(name: impl Into<String>) -> Self {
		Self {
			name: Some(name.into()),
			value: None,
		}
	}

	pub fn valued(value: impl Into<String>) -> Self {
		Self {
			name: None,
			value: Some(value.into()),
		}
	}
}

pub fn declare(builder: &mut TypeCatalogBuilder) {
	builder
		.root::<ServiceRef>()
		.tag("name", 0, |r: &ServiceRef| r.name.clone())
		.tag("value", 0, |r: &ServiceRef| r.value.clone());
}

#[derive(Debug, Error)]
pub enum PaymentError {
	#[error(transparent)]
	Dispatch(#[from] DispatchError),
	#[error("payment {0} has no amount")]
	Empty(String),
}

service_point! {
	pub trait PaymentService {
		fn execute_payment(&self, id: &str, amount: u64, #[subject] callback: &ServiceRef) -> Result<(), PaymentError>;
	}
}

service_point! {
	/// Fired once a payment has been executed.
	pub trait PaymentCallback {
		fn payment_executed(&self, id: &str, amount: u64, #[subject] callback: &ServiceRef) -> Result<(), PaymentError>;
	}
}

/// Executes payments and notifies the referenced callback.
struct Executor {
	callbacks: ServicePoint<dyn PaymentCallback>,
}

impl PaymentService for Executor {
	fn execute_payment(&self, id: &str, amount: u64, callback: &ServiceRef) -> Result<(), PaymentError> {
		if amount == 0 {
			return Err(PaymentError::Empty(id.to_string()));
		}
		tracing::info!(payment = id, amount, "payment executed");
		self.callbacks.payment_executed(id, amount, callback)
	}
}

/// Records the payments it was told about.
pub struct Ledger {
	label: &'static str,
	entries: Mutex<Vec<String>>,
}

impl Ledger {
	fn new(label: &'static str) -> Self {
		Self {
			label,
			entries: Mutex::default(),
		}
	}

	pub fn entries(&self) -> Vec<String> {
		self.entries.lock().clone()
	}
}

impl PaymentCallback for Ledger {
	fn payment_executed(&self, id: &str, amount: u64, _: &ServiceRef) -> Result<(), PaymentError> {
		tracing::info!(ledger = self.label, payment = id, amount, "payment callback");
		self.entries.lock().push(format!("{id}:{amount}"));
		Ok(())
	}
}

/// The wired payment scenario. Dropping it unbinds every callback and
/// withdraws the executor.
pub struct Payments {
	pub payments: ServicePoint<dyn PaymentService>,
	pub loans: Arc<Ledger>,
	pub orders: Arc<Ledger>,
	_executor: ActiveService<dyn PaymentService>,
	_bindings: Vec<SignalBinding<dyn PaymentCallback>>,
}

/// Activates the executor and binds the loan and order callbacks.
pub fn wire(resolver: &Resolver) -> anyhow::Result<Payments> {
	let store = resolver.store();
	let callbacks: Arc<Components<dyn PaymentCallback>> = Arc::new(Components::new());
	let executors: Arc<Components<dyn PaymentService>> = Arc::new(Components::new());

	let target = <dyn PaymentService as Contract>::DESCRIPTOR
		.method("execute_payment")
		.ok_or_else(|| anyhow::anyhow!("PaymentService has no execute_payment method"))?;

	let loans = Arc::new(Ledger::new("loan"));
	let orders = Arc::new(Ledger::new("order"));
	let bindings = vec![
		SignalBinding::bind(
			target,
			Registration::new(
				RegistrationKey::new("payment-callback", TypeKey::of::<ServiceRef>())
					.with("name", "loan-service"),
				"loan.payment-callback",
			),
			loans.clone() as Arc<dyn PaymentCallback>,
			store,
			&callbacks,
		)?,
		SignalBinding::bind(
			target,
			Registration::new(
				RegistrationKey::new("payment-callback", TypeKey::of::<ServiceRef>())
					.with("value", "order-service#payment-callback"),
				"order.payment-callback",
			),
			orders.clone() as Arc<dyn PaymentCallback>,
			store,
			&callbacks,
		)?,
	];

	let executor = Executor {
		callbacks: ServicePoint::<dyn PaymentCallback>::new(
			"payment-callback",
			resolver.clone(),
			callbacks,
		)?,
	};
	let executor = executors.activate(
		store,
		Registration::new(
			RegistrationKey::new("payment", TypeKey::of::<ServiceRef>()),
			"payment.executor",
		),
		Arc::new(executor),
	);

	Ok(Payments {
		payments: ServicePoint::<dyn PaymentService>::new("payment", resolver.clone(), executors)?,
		loans,
		orders,
		_executor: executor,
		_bindings: bindings,
	})
}

pub fn run(resolver: &Resolver) -> anyhow::Result<()> {
	let wired = wire(resolver)?;
	wired
		.payments
		.execute_payment("LOAN-7", 10_000, &ServiceRef::named("loan-service"))?;
	wired.payments.execute_payment(
		"ORDER-42",
		250,
		&ServiceRef::valued("order-service#payment-callback"),
	)?;
	if let Err(err) = wired
		.payments
		.execute_payment("GIFT-1", 5, &ServiceRef::named("nobody"))
	{
		tracing::info!(%err, "callback not delivered");
	}
	for ledger in [&wired.loans, &wired.orders] {
		tracing::info!(ledger = ledger.label, entries = ?ledger.entries(), "ledger");
	}
	Ok(())
}
