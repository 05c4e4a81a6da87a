//! API Gateway module
//!
//! - `request`: request description built from the command line
//! - `client`: SigV4 signing, dispatch and response classification

pub mod client;
pub mod request;
