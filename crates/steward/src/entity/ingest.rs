//! Turning loosely-shaped upstream records into entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, StewardError};

use super::model::Entity;

/// Outcome of ingesting a batch of records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    /// The upload session recorded for this batch.
    pub session_id: String,
    pub processed: usize,
    pub errors: usize,
    /// One line per rejected record.
    pub log: Vec<String>,
}

/// How an upload batch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UploadStatus {
    /// Every record was handled; some may have been rejected.
    Completed,
    /// The store failed part-way through the batch.
    Failed,
}

/// Persisted history entry for one upload batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadSession {
    pub id: String,
    pub user: String,
    /// File name or other label the batch arrived under.
    pub source: String,
    pub status: UploadStatus,
    pub processed: usize,
    pub errors: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub log: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Build an entity from one upstream record.
///
/// The identifier may arrive as `id` or as `_id`. A `score` on a 0-100 scale
/// is rescaled into `quality_score`; a `quality_score` given directly must
/// already lie in `[0, 1]`.
pub fn entity_from_record(record: Value) -> Result<Entity> {
    let Value::Object(mut fields) = record else {
        return Err(StewardError::InvalidInput("record is not a JSON object".into()));
    };

    if !has_text(&fields, "id") {
        match fields.remove("_id") {
            Some(id) if is_text(&id) => {
                fields.insert("id".into(), id);
            }
            _ => {
                return Err(StewardError::InvalidInput(format!(
                    "record without id or _id: {}",
                    preview(&fields)
                )));
            }
        }
    }

    if let Some(score) = fields.remove("score").and_then(|s| s.as_f64()) {
        let scaled = if score > 1.0 { score / 100.0 } else { score };
        fields.insert("quality_score".into(), Value::from(scaled.clamp(0.0, 1.0)));
    }

    let mut entity: Entity = serde_json::from_value(Value::Object(fields))
        .map_err(|e| StewardError::InvalidInput(format!("malformed record: {}", e)))?;
    if !(0.0..=1.0).contains(&entity.quality_score) {
        return Err(StewardError::InvalidInput(format!(
            "record {}: quality_score {} is outside [0, 1]",
            entity.id, entity.quality_score
        )));
    }
    entity.refresh_normalized_name();
    Ok(entity)
}

fn is_text(value: &Value) -> bool {
    value.as_str().is_some_and(|s| !s.trim().is_empty())
}

fn has_text(fields: &Map<String, Value>, key: &str) -> bool {
    fields.get(key).is_some_and(is_text)
}

fn preview(fields: &Map<String, Value>) -> String {
    Value::Object(fields.clone()).to_string().chars().take(100).collect()
}
