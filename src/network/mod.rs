//! Network layer - executes resolved calls over HTTP
//!
//! One request per dispatch, no retries. Transport failures come back as
//! `RequesterError::ConnectionFailure`.

pub mod client;

#[cfg(test)]
pub(crate) mod test_server;

pub use client::{create_client, Dispatcher};
