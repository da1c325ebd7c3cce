//! Simulated cluster inventory served by the mock server

use std::collections::{BTreeMap, HashSet};

use crate::inventory::{ConnectionState, Host, LunType, MultipathPolicy, PowerState};
use crate::mock::args::Args;
use crate::mock::constants::{
    CDROM_SIZE, HOST_DOMAIN, LUN_SIZE_2TB, LUN_SIZE_500GB, SESSION_TOKEN_PREFIX,
};
use crate::network::wire::{ClusterSummary, HostSummary, MultipathInfo, ScsiLunSummary};

pub struct MockInventory {
    pub cluster: ClusterSummary,
    pub hosts: Vec<Host>,
    /// LUNs keyed by host id.
    pub luns: BTreeMap<String, Vec<ScsiLunSummary>>,
    username: String,
    password: String,
    sessions: HashSet<String>,
    next_session: u64,
    updates: usize,
    fail_updates_after: Option<usize>,
}

/// Policy and threshold for the `index`th LUN: one in four is MRU, one in
/// four is already compliant, the rest use round-robin with `default_iops`.
fn lun_multipath(index: u32, default_iops: u32) -> MultipathInfo {
    match index % 4 {
        0 => MultipathInfo {
            policy: MultipathPolicy::MostRecentlyUsed,
            commands_per_path: None,
        },
        1 => MultipathInfo {
            policy: MultipathPolicy::RoundRobin,
            commands_per_path: Some(1),
        },
        _ => MultipathInfo {
            policy: MultipathPolicy::RoundRobin,
            commands_per_path: Some(default_iops),
        },
    }
}

impl MockInventory {
    pub fn generate(args: &Args) -> Self {
        let mut hosts = Vec::new();
        let total_hosts = args.healthy_hosts + args.unhealthy_hosts;
        for i in 0..total_hosts {
            let (connection_state, power_state) = if i < args.healthy_hosts {
                (ConnectionState::Connected, PowerState::PoweredOn)
            } else if (i - args.healthy_hosts) % 2 == 0 {
                (ConnectionState::Connected, PowerState::PoweredOff)
            } else {
                (ConnectionState::Disconnected, PowerState::PoweredOn)
            };
            hosts.push(Host {
                id: format!("host-{}", 1001 + i),
                name: format!("esx{:02}.{HOST_DOMAIN}", i + 1),
                connection_state,
                power_state,
            });
        }

        // Every host sees the same shared LUNs, like datastores in a real cluster.
        let mut luns = BTreeMap::new();
        for host in &hosts {
            let mut host_luns: Vec<ScsiLunSummary> = (0..args.luns_per_host)
                .map(|lun| ScsiLunSummary {
                    canonical_name: format!("naa.6000d31000{lun:022x}"),
                    lun_type: LunType::Disk.as_str().to_string(),
                    capacity_bytes: if lun % 3 == 0 {
                        LUN_SIZE_2TB
                    } else {
                        LUN_SIZE_500GB
                    },
                    multipath: lun_multipath(lun, args.default_iops),
                })
                .collect();
            host_luns.push(ScsiLunSummary {
                canonical_name: format!("mpx.vmhba32:C0:T0:L0-{}", host.id),
                lun_type: LunType::CdRom.as_str().to_string(),
                capacity_bytes: CDROM_SIZE,
                multipath: MultipathInfo {
                    policy: MultipathPolicy::Fixed,
                    commands_per_path: None,
                },
            });
            luns.insert(host.id.clone(), host_luns);
        }

        Self {
            cluster: ClusterSummary {
                cluster: "domain-c8".to_string(),
                name: args.cluster.clone(),
            },
            hosts,
            luns,
            username: args.username.clone(),
            password: args.password.clone(),
            sessions: HashSet::new(),
            next_session: 1,
            updates: 0,
            fail_updates_after: args.fail_updates_after,
        }
    }

    /// Open a session for matching credentials.
    pub fn login(&mut self, username: &str, password: &str) -> Option<String> {
        if username != self.username || password != self.password {
            return None;
        }
        let token = format!("{SESSION_TOKEN_PREFIX}{:08}", self.next_session);
        self.next_session += 1;
        self.sessions.insert(token.clone());
        Some(token)
    }

    pub fn logout(&mut self, token: &str) -> bool {
        self.sessions.remove(token)
    }

    pub fn is_valid_session(&self, token: &str) -> bool {
        self.sessions.contains(token)
    }

    /// Case-insensitive, like a loose server-side filter; clients must match
    /// exactly themselves.
    pub fn clusters_named(&self, names: Option<&str>) -> Vec<ClusterSummary> {
        match names {
            Some(name) if !self.cluster.name.eq_ignore_ascii_case(name) => Vec::new(),
            _ => vec![self.cluster.clone()],
        }
    }

    pub fn hosts_in(&self, cluster_id: Option<&str>) -> Vec<HostSummary> {
        if cluster_id.is_some_and(|id| id != self.cluster.cluster) {
            return Vec::new();
        }
        self.hosts
            .iter()
            .map(|h| HostSummary {
                host: h.id.clone(),
                name: h.name.clone(),
                connection_state: h.connection_state.clone(),
                power_state: h.power_state.clone(),
            })
            .collect()
    }

    pub fn host(&self, host_id: &str) -> Option<&Host> {
        self.hosts.iter().find(|h| h.id == host_id)
    }

    pub fn luns_of(&self, host_id: &str, lun_type: Option<&str>) -> Option<Vec<ScsiLunSummary>> {
        let luns = self.luns.get(host_id)?;
        Some(
            luns.iter()
                .filter(|l| match lun_type {
                    Some(t) => l.lun_type.eq_ignore_ascii_case(t),
                    None => true,
                })
                .cloned()
                .collect(),
        )
    }

    /// `Err(true)` when the LUN is unknown, `Err(false)` when the update was
    /// rejected by failure simulation.
    pub fn update_multipath(
        &mut self,
        host_id: &str,
        canonical_name: &str,
        policy: MultipathPolicy,
        commands_per_path: u32,
    ) -> Result<ScsiLunSummary, bool> {
        if self
            .fail_updates_after
            .is_some_and(|limit| self.updates >= limit)
        {
            return Err(false);
        }
        let lun = self
            .luns
            .get_mut(host_id)
            .and_then(|luns| luns.iter_mut().find(|l| l.canonical_name == canonical_name))
            .ok_or(true)?;
        lun.multipath = MultipathInfo {
            policy,
            commands_per_path: Some(commands_per_path),
        };
        self.updates += 1;
        Ok(lun.clone())
    }
}
