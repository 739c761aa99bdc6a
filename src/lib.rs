pub mod cli;
pub mod commands;
pub mod config;
pub mod crypto;
pub mod error;
pub mod flow;
pub mod gate;
pub mod recovery;
pub mod signer;
pub mod store;
pub mod trust;

pub use error::{FlowError, GateError, RecoveryError, StoreError};
pub use flow::{ApprovalFlow, SigningRequest};
pub use gate::{ApprovalGate, CollisionPolicy, GateKind, Gates, PendingApproval, RequestInfo};
pub use recovery::{KeyRecovery, RecoveredKey};
pub use trust::{DomainTrust, TrustedDomain};
