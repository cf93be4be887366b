//! Storage plumbing shared by the comment store.

pub mod persistence;
pub mod storage;
