//! # client
//!
//! Client half of the comment relay: a comment store with per-comment
//! favorite counters, persisted to key-value storage on every change, plus
//! the relay connection and chat session that feed it.
//!
//! This crate contains the state, storage, view, and network modules. The
//! `cli` crate hosts a session on a terminal.

pub mod net;
pub mod state;
pub mod util;
pub mod view;

pub use net::connection::{ConnectionError, RelayConnection, RelayEvent};
pub use net::session::{ActionOutcome, ChatSession};
pub use state::comment::{Comment, CommentId};
pub use state::comments::CommentStore;
pub use util::persistence::{COMMENTS_KEY, CommentPersistence};
pub use util::storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use view::input::{Action, InputError, parse_line};
