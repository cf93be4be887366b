//! Text view over the comment store.
//!
//! DESIGN
//! ======
//! `list` turns store state into rows; `input` turns user lines into
//! actions. Neither touches the network or storage directly.

pub mod input;
pub mod list;
