//! Client-side comment state.
//!
//! DESIGN
//! ======
//! `comment` holds the record type; `comments` holds the store that owns the
//! ordered list and keeps the persisted copy in step with it.

pub mod comment;
pub mod comments;
