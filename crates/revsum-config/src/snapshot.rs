//! Config snapshots for session output.
//!
//! A snapshot records the input settings next to what they resolved to, with
//! a content hash so two sessions can be compared for identical configuration.

use revsum_common::{SessionId, SCHEMA_VERSION};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::resolve::ResolvedConfig;
use crate::settings::Settings;

/// Serializable record of one resolution.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSnapshot {
    pub schema_version: String,
    pub session_id: SessionId,
    /// RFC 3339 timestamp.
    pub resolved_at: String,
    /// SHA-256 of the JSON-serialized settings.
    pub config_hash: String,
    pub settings: Settings,
    pub resolved: ResolvedConfig,
}

impl ConfigSnapshot {
    pub fn new(settings: &Settings, resolved: &ResolvedConfig) -> Result<Self, serde_json::Error> {
        Ok(Self {
            schema_version: SCHEMA_VERSION.to_string(),
            session_id: SessionId::new(),
            resolved_at: chrono::Utc::now().to_rfc3339(),
            config_hash: settings_hash(settings)?,
            settings: settings.clone(),
            resolved: resolved.clone(),
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Content hash of the settings.
pub fn settings_hash(settings: &Settings) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(settings)?;
    Ok(sha256_hex(json.as_bytes()))
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
