//! Deploy Listener Library
//!
//! Watches OpsWorks deployments and announces their lifecycle on Slack,
//! deduplicated through a persistent store of started deployments.

pub mod app;
pub mod authn;
pub mod deploy;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod logs;
pub mod models;
pub mod notify;
pub mod source;
pub mod state;
pub mod storage;
pub mod utils;
