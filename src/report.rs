//! Report encoding
//!
//! Wraps a computed comparison in an envelope carrying producer metadata and
//! the computation time, and renders it as JSON.

use crate::error::{AnalyticsError, Result};
use crate::{ENGINE_VERSION, PRODUCER_NAME};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Producer metadata attached to every report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// A comparison plus the metadata of the run that produced it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport<T> {
    pub producer: ReportProducer,
    pub computed_at_utc: DateTime<Utc>,
    #[serde(flatten)]
    pub body: T,
}

/// Report encoder with a stable instance id
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn encode<T>(&self, body: T) -> MetricsReport<T> {
        MetricsReport {
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now(),
            body,
        }
    }

    /// Encode to a JSON string
    pub fn encode_to_json<T: Serialize>(&self, body: T, pretty: bool) -> Result<String> {
        let report = self.encode(body);
        let rendered = if pretty {
            serde_json::to_string_pretty(&report)
        } else {
            serde_json::to_string(&report)
        };
        rendered.map_err(|e| AnalyticsError::EncodingError(e.to_string()))
    }
}
