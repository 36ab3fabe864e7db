use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Request body of `POST /events`.
///
/// Every field is optional at the wire level so that missing fields are
/// reported by validation instead of by the JSON decoder.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewEvent {
    pub name: Option<String>,
    pub date: Option<String>,
    pub languages: Option<Vec<String>>,
    #[serde(rename = "VideoQuality")]
    pub video_qualities: Option<Vec<String>>,
    #[serde(rename = "AudioQuality")]
    pub audio_qualities: Option<Vec<String>>,
    pub invitees: Option<Vec<String>>,
    pub description: Option<String>,
}

/// A validated event that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub name: String,
    pub date: String,
    pub languages: Vec<String>,
    pub video_qualities: Vec<String>,
    pub audio_qualities: Vec<String>,
    pub invitees: Vec<String>,
    pub description: Option<String>,
}

impl EventDraft {
    pub fn into_event(self, id: i64) -> Event {
        Event {
            id,
            name: self.name,
            date: self.date,
            languages: self.languages,
            video_qualities: self.video_qualities,
            audio_qualities: self.audio_qualities,
            invitees: self.invitees,
            description: self.description,
        }
    }
}

/// A stored event, echoed back to the creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub date: String,
    pub languages: Vec<String>,
    #[serde(rename = "VideoQuality")]
    pub video_qualities: Vec<String>,
    #[serde(rename = "AudioQuality")]
    pub audio_qualities: Vec<String>,
    pub invitees: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    pub id: i64,
    pub name: String,
    pub date: String,
    pub description: Option<String>,
}

// Neither view carries invitees; the guest list is never handed out.

/// Single-event view with one negotiated video and audio quality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    pub id: i64,
    pub name: String,
    pub date: String,
    #[serde(rename = "language")]
    pub languages: Vec<String>,
    pub video_quality: String,
    pub audio_quality: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// List view entry with every offered quality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub id: i64,
    pub name: String,
    pub date: String,
    #[serde(rename = "language")]
    pub languages: Vec<String>,
    #[serde(rename = "videoQuality")]
    pub video_qualities: Vec<String>,
    #[serde(rename = "audioQuality")]
    pub audio_qualities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Query string of `GET /events/:id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QualityQuery {
    pub video_quality: Option<String>,
    pub audio_quality: Option<String>,
}

impl QualityQuery {
    /// Builds the query from raw pairs; a repeated key keeps its first value.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "videoQuality" => &mut query.video_quality,
                "audioQuality" => &mut query.audio_quality,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }
}
