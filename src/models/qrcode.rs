use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::db::connection::GameDb;
use crate::models::{content_key, list_story_content, put_content};
use crate::EnigmaError;

/// What scanning a code does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QrAction {
    Enter,
    Explore,
    Talk,
    Collect,
    Examine,
    /// Authored action this engine does not know.
    #[serde(untagged)]
    Other(String),
}

/// Conditions checked before a scan is accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AccessRequirements {
    #[serde(default)]
    pub current_location_id: Option<i64>,
    #[serde(default)]
    pub specialization_required: BTreeMap<String, u32>,
    #[serde(default)]
    pub required_objects: Vec<i64>,
}

impl AccessRequirements {
    pub fn is_empty(&self) -> bool {
        self.current_location_id.is_none()
            && self.specialization_required.is_empty()
            && self.required_objects.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QrCode {
    #[serde(default)]
    pub story_id: String,
    pub uuid: String,
    pub target_type: String,
    pub target_id: i64,
    pub action: QrAction,
    #[serde(default)]
    pub parameters: Option<serde_json::Value>,
    #[serde(default)]
    pub access_requirements: AccessRequirements,
    #[serde(default)]
    pub location_requirement: Option<i64>,
}

/// Write a QR code document for its story.
pub async fn create_qr_code(db: &GameDb, data: QrCode) -> Result<QrCode, EnigmaError> {
    let key = content_key(&data.story_id, &data.uuid);
    put_content(db, "qr_code", key, data).await
}

/// All QR codes of a story ordered by uuid.
pub async fn list_qr_codes(db: &GameDb, story_id: &str) -> Result<Vec<QrCode>, EnigmaError> {
    list_story_content(db, "qr_code", "uuid", story_id).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_action_is_kept() {
        let qr: QrCode = serde_json::from_str(
            r#"{"uuid":"a-1","target_type":"object","target_id":3,"action":"dance"}"#,
        )
        .unwrap();
        assert_eq!(qr.action, QrAction::Other("dance".into()));
        assert!(qr.access_requirements.is_empty());

        let qr: QrCode = serde_json::from_str(
            r#"{"uuid":"a-2","target_type":"location","target_id":1,"action":"enter",
                "access_requirements":{"specialization_required":{"analise":2}}}"#,
        )
        .unwrap();
        assert_eq!(qr.action, QrAction::Enter);
        assert!(!qr.access_requirements.is_empty());
    }
}
