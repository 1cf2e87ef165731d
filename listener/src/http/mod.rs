//! HTTP clients for the chat API

pub mod client;
pub mod slack;
