//! Steward: record-quality validation and stewardship decisions for
//! healthcare-provider master data.
//!
//! Entities assembled from upstream sources are scored by an ordered catalog
//! of rules, adjudicated by human stewards, and every action lands in an
//! append-only audit trail.
//!
//! # Core Principles
//!
//! - **Rule failures are data**: a rule that cannot run becomes a failing
//!   result, never a failed request
//! - **Additive history**: validation runs and decisions are never edited
//! - **Best-effort audit**: audit writes never block the primary operation
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use steward::{Actor, RequestContext, Role, Steward, StewardConfig};
//! use steward::entity::{Credential, Entity};
//! use steward::store::MemoryStore;
//!
//! # tokio_test_block(async {
//! let store = Arc::new(MemoryStore::with_entities(vec![
//!     Entity::new("HCP-1", "Ana Lima")
//!         .with_credential(Credential::new("SP", "123456").with_status("ACTIVE"))
//!         .with_email("ana@clinic.com"),
//! ]));
//! let steward = Steward::in_memory(store, StewardConfig::default());
//! let ctx = RequestContext::local(Actor::new("maria", Role::Steward));
//!
//! let result = steward.validate(&ctx, "HCP-1").await.unwrap();
//! assert!(result.score <= 1.0);
//! # });
//! # fn tokio_test_block(f: impl std::future::Future<Output = ()>) {
//! #     tokio::runtime::Runtime::new().unwrap().block_on(f)
//! # }
//! ```

pub mod access;
pub mod audit;
pub mod config;
pub mod decision;
pub mod entity;
pub mod error;
pub mod report;
pub mod store;
pub mod validation;

mod steward;

pub use crate::steward::{
    Comparison, EntityReport, EntityView, REPORT_AUDIT_LIMIT, ReportHeader, RequestContext,
    Steward, UPLOAD_HISTORY_LIMIT, VIEW_DECISION_LIMIT,
};
pub use access::{AccessPolicy, Actor, Permission, Role};
pub use config::StewardConfig;
pub use decision::{Decision, DecisionInput, DecisionType};
pub use entity::{Entity, EntityStatus};
pub use error::{Result, StewardError};
pub use report::{SummaryFilter, SummaryReport};
pub use validation::{RuleResult, Severity, ValidationResult};
