pub mod client;
pub mod probe;
pub mod wire;

pub use client::RestManagementClient;
pub use probe::{ReachabilityProbe, TcpProbe};
