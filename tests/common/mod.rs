//! Integration test common infrastructure.
//!
//! Provides utilities for spawning test servers and talking to them over HTTP.

pub mod server;

#[allow(unused_imports)]
pub use server::{Backend, TestServer};
