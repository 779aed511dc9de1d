//! Request/response sessions with a simple_step controller.
//!
//! A [`Session`] owns a [`RawTransport`](simplestep_transport::RawTransport)
//! and turns it into a strict one-request-in-flight exchange: write a frame,
//! read a frame, verify the echoed command id. Reads that return no data are
//! retried a bounded number of times.

pub mod config;
pub mod error;
pub mod session;

pub use config::SessionConfig;
pub use error::{Result, SessionError};
pub use session::Session;
