//! HCP entity data model.

mod ingest;
mod model;
mod normalize;

pub use ingest::{IngestSummary, UploadSession, UploadStatus, entity_from_record};
pub use model::{
    Address, Affiliation, Credential, Email, Entity, EntityStatus, Phone, SourceAttribution,
    Specialty, TrailEntry,
};
pub use normalize::normalize_name;
