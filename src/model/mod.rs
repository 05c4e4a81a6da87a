//! Data models
//!
//! - `arg`: command line flags
//! - `config`: environment configuration
//! - `credentials`: tokens and temporary credentials passed between stages
//! - `response`: gateway call outcome

pub mod arg;
pub mod config;
pub mod credentials;
pub mod response;
