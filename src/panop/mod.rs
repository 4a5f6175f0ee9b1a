//! Transport adapter and wire types for the Panop management API.

pub mod client;
pub mod types;

pub use client::{HttpTransport, RawResponse, Transport};
