//! Deployment lifecycle tracking

pub mod fsm;
pub mod tracker;
