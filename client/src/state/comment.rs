use std::fmt;

use serde::{Deserialize, Serialize};

/// Store-assigned comment identity. Serialized as a bare integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub u64);

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for CommentId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().trim_start_matches('#').parse().map(CommentId)
    }
}

/// A single relayed comment with its local favorite counter.
///
/// Field names on disk follow the stored list format: `content`, `fav`, `id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub content: String,
    #[serde(rename = "fav")]
    pub favorite_count: u32,
    pub id: CommentId,
}

impl Comment {
    pub fn new(id: CommentId, content: impl Into<String>) -> Self {
        Self { content: content.into(), favorite_count: 0, id }
    }
}
