//! Relay networking: the owned connection and the session built on it.

pub mod connection;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;
