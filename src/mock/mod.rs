//! Mock server module for rr-iops
//!
//! This module provides a mock management server that serves a simulated
//! cluster with healthy and unhealthy hosts and a mix of LUN multipathing
//! configurations, so the client can be exercised end to end.

pub mod args;
pub mod constants;
pub mod inventory;
pub mod server;

pub use args::Args;
pub use server::start_server;
