//! Internship placement coordination service: allocation reads, the
//! proposal/request/application state machines, and their notification side
//! channel, exposed over an axum boundary.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
