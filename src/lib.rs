//! Horizon - a terminal client for the Horizon course assistant.
//!
//! Talks to the Horizon chat backend over HTTP and consumes streamed
//! responses as Server-Sent Events. The `sse` module does the frame
//! reassembly and event decoding; `session` applies decoded events to a
//! chat transcript.

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod picker;
pub mod session;
pub mod sse;
pub mod theme;
