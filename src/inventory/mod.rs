pub mod classify;
pub mod types;

pub use classify::{classify_hosts, classify_volumes, HostClassification, VolumeClassification};
pub use types::{
    ClusterRef, ConnectionState, Host, LunType, MultipathPolicy, PowerState, Session, Volume,
    VolumeCategory,
};
