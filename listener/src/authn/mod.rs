//! Cloud API authentication

pub mod aws;
