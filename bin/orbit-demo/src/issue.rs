//! Issue tracking as a state machine.
//!
//! Every state of a task is a separate implementation of [`IssueService`];
//! a transition is just a state change on the issue, after which the next
//! call resolves to the implementation for the new state.

use std::sync::Arc;

use orbit_invocation::{Components, DispatchError, ServicePoint, service_point};
use orbit_registry::Resolver;
use orbit_subject::{TagValue, TypeCatalogBuilder};
use parking_lot::RwLock;
use strum_macros::{Display, IntoStaticStr};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueType {
	Task,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING-KEBAB-CASE")]
pub enum IssueState {
	Opened,
	InProgress,
	InTest,
	Closed,
}

#[derive(Debug)]
pub struct Issue {
	pub id: String,
	pub kind: IssueType,
	state: RwLock<IssueState>,
}

impl Issue {
	pub fn opened(id: impl Into<String>, kind: IssueType) -> Self {
		Self {
			id: id.into(),
			kind,
			state: RwLock::new(IssueState::Opened),
		}
	}

	pub fn state(&self) -> IssueState {
		*self.state.read()
	}

	fn transition(&self, to: IssueState) {
		let from = std::mem::replace(&mut *self.state.write(), to);
		tracing::info!(issue = %self.id, %from, %to, "issue state changed");
	}
}

pub fn declare(builder: &mut TypeCatalogBuilder) {
	builder
		.root::<Issue>()
		.tag("type", 1, |i: &Issue| TagValue::variant(i.kind))
		.tag("state", 0, |i: &Issue| TagValue::variant(i.state()));
}

#[derive(Debug, Error)]
pub enum IssueError {
	#[error(transparent)]
	Dispatch(#[from] DispatchError),
	#[error("issue {id} cannot be {event} while {state}")]
	NotAllowed {
		event: &'static str,
		id: String,
		state: IssueState,
	},
}

fn not_allowed(event: &'static str, issue: &Issue) -> IssueError {
	IssueError::NotAllowed {
		event,
		id: issue.id.clone(),
		state: issue.state(),
	}
}

service_point! {
	/// Task workflow events.
	pub trait IssueService {
		fn implementation_started(&self, #[subject] issue: &Issue) -> Result<(), IssueError>;

		fn implementation_finished(&self, #[subject] issue: &Issue) -> Result<(), IssueError>;

		fn tested(&self, #[subject] issue: &Issue, passed: bool) -> Result<(), IssueError>;
	}
}

struct Opened;
struct InProgress;
struct InTest;
struct Closed;

impl IssueService for Opened {
	fn implementation_started(&self, issue: &Issue) -> Result<(), IssueError> {
		issue.transition(IssueState::InProgress);
		Ok(())
	}

	fn implementation_finished(&self, issue: &Issue) -> Result<(), IssueError> {
		Err(not_allowed("finished", issue))
	}

	fn tested(&self, issue: &Issue, _: bool) -> Result<(), IssueError> {
		Err(not_allowed("tested", issue))
	}
}

impl IssueService for InProgress {
	fn implementation_started(&self, issue: &Issue) -> Result<(), IssueError> {
		Err(not_allowed("started", issue))
	}

	fn implementation_finished(&self, issue: &Issue) -> Result<(), IssueError> {
		issue.transition(IssueState::InTest);
		Ok(())
	}

	fn tested(&self, issue: &Issue, _: bool) -> Result<(), IssueError> {
		Err(not_allowed("tested", issue))
	}
}

impl IssueService for InTest {
	fn implementation_started(&self, issue: &Issue) -> Result<(), IssueError> {
		Err(not_allowed("started", issue))
	}

	fn implementation_finished(&self, issue: &Issue) -> Result<(), IssueError> {
		Err(not_allowed("finished", issue))
	}

	fn tested(&self, issue: &Issue, passed: bool) -> Result<(), IssueError> {
		// A failed test sends the task back to the start.
		issue.transition(if passed {
			IssueState::Closed
		} else {
			IssueState::Opened
		});
		Ok(())
	}
}

impl IssueService for Closed {
	fn implementation_started(&self, issue: &Issue) -> Result<(), IssueError> {
		Err(not_allowed("started", issue))
	}

	fn implementation_finished(&self, issue: &Issue) -> Result<(), IssueError> {
		Err(not_allowed("finished", issue))
	}

	fn tested(&self, issue: &Issue, _: bool) -> Result<(), IssueError> {
		Err(not_allowed("tested", issue))
	}
}

pub fn components() -> Arc<Components<dyn IssueService>> {
	let components: Arc<Components<dyn IssueService>> = Arc::new(Components::new());
	components.insert("task.opened", Arc::new(Opened));
	components.insert("task.in-progress", Arc::new(InProgress));
	components.insert("task.in-test", Arc::new(InTest));
	components.insert("task.closed", Arc::new(Closed));
	components
}

pub fn service_point(resolver: &Resolver) -> anyhow::Result<ServicePoint<dyn IssueService>> {
	Ok(ServicePoint::<dyn IssueService>::new(
		"issue",
		resolver.clone(),
		components(),
	)?)
}

pub fn run(resolver: &Resolver) -> anyhow::Result<()> {
	let issues = service_point(resolver)?;
	let task = Issue::opened("TASK-1", IssueType::Task);

	issues.implementation_started(&task)?;
	issues.implementation_finished(&task)?;
	issues.tested(&task, false)?;
	issues.implementation_started(&task)?;
	issues.implementation_finished(&task)?;
	issues.tested(&task, true)?;

	if let Err(err) = issues.implementation_started(&task) {
		tracing::info!(%err, "event refused");
	}
	Ok(())
}
