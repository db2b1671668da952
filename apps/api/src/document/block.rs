use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a unit of text came from.
///
/// A block produced by the fill pipeline starts `AiGenerated`; the first user
/// commit moves it to `UserEdited`, and nothing moves it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    UserProvided,
    AiGenerated,
    UserEdited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub Uuid);

impl BlockId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One user-committed edit. `text` is the accepted state after the edit;
/// `previous_text` is what it replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditRecord {
    pub text: String,
    pub previous_text: String,
    pub edited_at: DateTime<Utc>,
    pub edited_by: String,
}

/// The atomic unit of authored content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub block_id: BlockId,
    pub section_id: String,
    pub text: String,
    pub origin: Origin,
    /// 0.0 – 1.0. Only meaningful for `AiGenerated`; UI signal, never control flow.
    pub confidence: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_fill_reason: Option<String>,
    /// Append-only.
    pub edit_history: Vec<EditRecord>,
}

impl Block {
    pub fn new(
        section_id: impl Into<String>,
        text: impl Into<String>,
        origin: Origin,
        confidence: Option<f32>,
    ) -> Self {
        Self {
            block_id: BlockId::new(),
            section_id: section_id.into(),
            text: text.into(),
            origin,
            confidence: confidence.unwrap_or(1.0).clamp(0.0, 1.0),
            auto_fill_reason: None,
            edit_history: Vec::new(),
        }
    }
}
