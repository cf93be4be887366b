//! Comment list rendering.
//!
//! Rows keep storage order. Each row gets one of two tiers depending on
//! whether its favorite count is above the running average.

use std::fmt::Write as _;

use crate::state::comment::{Comment, CommentId};
use crate::state::comments::CommentStore;
use crate::util::storage::KeyValueStorage;

/// Display tier for a row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tier {
    AboveAverage,
    Regular,
}

/// One rendered comment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommentRow {
    pub id: CommentId,
    pub content: String,
    pub favorite_count: u32,
    pub tier: Tier,
}

impl CommentRow {
    fn from_comment(comment: &Comment, tier: Tier) -> Self {
        Self { id: comment.id, content: comment.content.clone(), favorite_count: comment.favorite_count, tier }
    }

    /// `#<id> <content> ★<count>`, marked when above average.
    #[must_use]
    pub fn render(&self) -> String {
        let marker = match self.tier {
            Tier::AboveAverage => '*',
            Tier::Regular => ' ',
        };
        format!("{marker} #{} {} ★{}", self.id, self.content, self.favorite_count)
    }
}

/// Build display rows in storage order.
pub fn rows<S: KeyValueStorage>(store: &CommentStore<S>) -> Vec<CommentRow> {
    store
        .comments()
        .iter()
        .map(|c| {
            let tier = if store.is_above_average(c) { Tier::AboveAverage } else { Tier::Regular };
            CommentRow::from_comment(c, tier)
        })
        .collect()
}

/// Render the full list as text, one row per line.
pub fn render<S: KeyValueStorage>(store: &CommentStore<S>) -> String {
    let rows = rows(store);
    if rows.is_empty() {
        return "(no comments yet)\n".to_string();
    }
    let mut out = String::new();
    for row in rows {
        let _ = writeln!(out, "{}", row.render());
    }
    out
}

#[cfg(test)]
#[path = "list_test.rs"]
mod tests;
