//! Single-slot approval gates.
//!
//! A gate parks one signing request until the UI (or a policy) approves or
//! denies it.  The requesting side awaits a [`PendingApproval`]; the UI side
//! polls [`ApprovalGate::current`] and calls [`ApprovalGate::approve`] or
//! [`ApprovalGate::deny`].  Every slot mutation happens under one mutex, so
//! a request is resolved at most once no matter which side acts first.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::crypto;
use crate::error::GateError;

/// Reason handed to a request displaced under [`CollisionPolicy::Replace`].
pub const SUPERSEDED_REASON: &str = "superseded by a newer request";

/// Which of the two process-wide gates a request goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateKind {
	/// Approval to let an auto-sign policy act.
	AutoSign,
	/// Approval for the embedded ("ghost wallet") key backend.
	GhostWallet,
}

impl GateKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::AutoSign => "auto-sign",
			Self::GhostWallet => "ghost-wallet",
		}
	}
}

/// What `open` does when the slot is already taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
	/// Refuse the new request with [`GateError::Collision`].
	#[default]
	Reject,
	/// Deny the pending request and let the new one take its place.
	Replace,
}

/// Read-only view of a pending request, for rendering a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
	pub id: String,
	pub kind: GateKind,
	pub origin: String,
	pub summary: String,
	pub opened_at: DateTime<Utc>,
}

struct Slot {
	info: RequestInfo,
	tx: oneshot::Sender<Result<(), GateError>>,
}

/// The caller's half of an open request.  Resolves once the gate is
/// approved or denied.
pub struct PendingApproval {
	info: RequestInfo,
	rx: oneshot::Receiver<Result<(), GateError>>,
}

impl PendingApproval {
	pub fn info(&self) -> &RequestInfo {
		&self.info
	}
}

impl Future for PendingApproval {
	type Output = Result<(), GateError>;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		Pin::new(&mut self.rx)
			.poll(cx)
			.map(|r| r.unwrap_or(Err(GateError::Abandoned)))
	}
}

pub struct ApprovalGate {
	kind: GateKind,
	policy: CollisionPolicy,
	timeout: Option<Duration>,
	slot: Mutex<Option<Slot>>,
}

impl ApprovalGate {
	pub fn new(kind: GateKind) -> Self {
		Self {
			kind,
			policy: CollisionPolicy::default(),
			timeout: None,
			slot: Mutex::new(None),
		}
	}

	pub fn with_policy(mut self, policy: CollisionPolicy) -> Self {
		self.policy = policy;
		self
	}

	/// Bound how long [`request`](Self::request) waits for a decision.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);
		self
	}

	pub fn kind(&self) -> GateKind {
		self.kind
	}

	pub fn policy(&self) -> CollisionPolicy {
		self.policy
	}

	fn slot(&self) -> MutexGuard<'_, Option<Slot>> {
		self.slot.lock().unwrap_or_else(PoisonError::into_inner)
	}

	/// Park a new request in the slot.
	///
	/// A slot whose caller has already dropped its [`PendingApproval`] counts
	/// as free.
	pub fn open(
		&self,
		origin: impl Into<String>,
		summary: impl Into<String>,
	) -> Result<PendingApproval, GateError> {
		let origin = origin.into();
		let summary = summary.into();
		let opened_at = Utc::now();
		let nonce: [u8; 16] = rand::random();
		let info = RequestInfo {
			id: crypto::compute_request_id(
				&origin,
				&summary,
				opened_at.timestamp_nanos_opt().unwrap_or_default(),
				&nonce,
			),
			kind: self.kind,
			origin,
			summary,
			opened_at,
		};
		let (tx, rx) = oneshot::channel();

		let displaced = {
			let mut slot = self.slot();
			let displaced = match slot.take() {
				Some(old) if old.tx.is_closed() => {
					debug!(gate = self.kind.as_str(), id = %old.info.id, "reclaiming abandoned slot");
					None
				}
				Some(old) if self.policy == CollisionPolicy::Reject => {
					let pending_id = old.info.id.clone();
					*slot = Some(old);
					warn!(gate = self.kind.as_str(), %pending_id, "rejected request: gate busy");
					return Err(GateError::Collision {
						gate: self.kind.as_str(),
						pending_id,
					});
				}
				other => other,
			};
			*slot = Some(Slot {
				info: info.clone(),
				tx,
			});
			displaced
		};

		if let Some(old) = displaced {
			warn!(gate = self.kind.as_str(), id = %old.info.id, "replacing pending request");
			let _ = old.tx.send(Err(GateError::Denied(SUPERSEDED_REASON.into())));
		}

		info!(
			gate = self.kind.as_str(),
			id = %info.id,
			origin = %info.origin,
			"approval requested"
		);
		Ok(PendingApproval { info, rx })
	}

	/// Open a request and wait for its outcome, honouring the gate timeout.
	pub async fn request(
		&self,
		origin: impl Into<String>,
		summary: impl Into<String>,
	) -> Result<(), GateError> {
		let pending = self.open(origin, summary)?;
		let Some(limit) = self.timeout else {
			return pending.await;
		};

		let mut pending = pending;
		match tokio::time::timeout(limit, &mut pending).await {
			Ok(outcome) => outcome,
			Err(_) => self.settle_expired(pending, limit).await,
		}
	}

	/// Finish a request whose timer fired.  A resolver may have taken the
	/// slot between the timer firing and this call; its outcome wins.
	async fn settle_expired(
		&self,
		pending: PendingApproval,
		limit: Duration,
	) -> Result<(), GateError> {
		let id = &pending.info.id;
		if self.take_if(id).is_some() {
			warn!(gate = self.kind.as_str(), %id, "approval timed out");
			return Err(GateError::TimedOut(limit));
		}
		pending.await
	}

	/// Snapshot of the pending request, if any.  Never blocks on a decision.
	pub fn current(&self) -> Option<RequestInfo> {
		self.slot().as_ref().map(|s| s.info.clone())
	}

	pub fn is_pending(&self) -> bool {
		self.slot().is_some()
	}

	/// Approve whatever is pending.  Returns `false` on an empty slot.
	pub fn approve(&self) -> bool {
		let taken = self.slot().take();
		self.resolve(taken, Ok(()))
	}

	/// Deny whatever is pending.  Returns `false` on an empty slot.
	pub fn deny(&self, reason: impl Into<String>) -> bool {
		let taken = self.slot().take();
		self.resolve(taken, Err(GateError::Denied(reason.into())))
	}

	/// Approve only if `id` is still the pending request.
	pub fn approve_id(&self, id: &str) -> bool {
		let taken = self.take_if(id);
		self.resolve(taken, Ok(()))
	}

	/// Deny only if `id` is still the pending request.
	pub fn deny_id(&self, id: &str, reason: impl Into<String>) -> bool {
		let taken = self.take_if(id);
		self.resolve(taken, Err(GateError::Denied(reason.into())))
	}

	fn take_if(&self, id: &str) -> Option<Slot> {
		let mut slot = self.slot();
		if slot.as_ref().is_some_and(|s| s.info.id == id) {
			slot.take()
		} else {
			None
		}
	}

	fn resolve(&self, taken: Option<Slot>, outcome: Result<(), GateError>) -> bool {
		let Some(slot) = taken else {
			debug!(gate = self.kind.as_str(), "no pending request to resolve");
			return false;
		};

		match &outcome {
			Ok(()) => info!(gate = self.kind.as_str(), id = %slot.info.id, "request approved"),
			Err(e) => info!(gate = self.kind.as_str(), id = %slot.info.id, reason = %e, "request denied"),
		}
		if slot.tx.send(outcome).is_err() {
			debug!(gate = self.kind.as_str(), id = %slot.info.id, "requester no longer waiting");
		}
		true
	}
}

/// The two independent gates a wallet process runs.
#[derive(Clone)]
pub struct Gates {
	auto_sign: Arc<ApprovalGate>,
	ghost_wallet: Arc<ApprovalGate>,
}

impl Gates {
	pub fn new(policy: CollisionPolicy, timeout: Option<Duration>) -> Self {
		let build = |kind| {
			let gate = ApprovalGate::new(kind).with_policy(policy);
			Arc::new(match timeout {
				Some(t) => gate.with_timeout(t),
				None => gate,
			})
		};
		Self {
			auto_sign: build(GateKind::AutoSign),
			ghost_wallet: build(GateKind::GhostWallet),
		}
	}

	pub fn get(&self, kind: GateKind) -> &Arc<ApprovalGate> {
		match kind {
			GateKind::AutoSign => &self.auto_sign,
			GateKind::GhostWallet => &self.ghost_wallet,
		}
	}

	pub fn auto_sign(&self) -> &Arc<ApprovalGate> {
		&self.auto_sign
	}

	pub fn ghost_wallet(&self) -> &Arc<ApprovalGate> {
		&self.ghost_wallet
	}
}

impl Default for Gates {
	fn default() -> Self {
		Self::new(CollisionPolicy::default(), None)
	}
}
