//! Append-only audit trail of actor actions.
//!
//! Auditing is a side channel: a failed write is logged and dropped, never
//! surfaced to the operation that triggered it.

mod event;
mod recorder;

pub use event::{AuditAction, AuditEvent, RequestMetadata};
pub use recorder::{AuditConfig, AuditRecorder};
