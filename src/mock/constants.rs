//! Defaults for the mock management server

pub const DEFAULT_CLUSTER_NAME: &str = "prod-01";
pub const DEFAULT_USERNAME: &str = "administrator@vsphere.local";
pub const DEFAULT_PASSWORD: &str = "mock-password";
pub const HOST_DOMAIN: &str = "lab.local";

// LUN sizes in bytes
pub const LUN_SIZE_500GB: u64 = 500 * 1024 * 1024 * 1024;
pub const LUN_SIZE_2TB: u64 = 2 * 1024 * 1024 * 1024 * 1024;
pub const CDROM_SIZE: u64 = 0;

pub const SESSION_TOKEN_PREFIX: &str = "mock-session-";
