// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! In-memory stand-ins for the management server, the reachability probe and
//! the report files, with call counting and failure injection.

use std::collections::BTreeMap;
use std::io;
use std::sync::Mutex;
use std::time::Duration;

use crate::common::config::{Credentials, Endpoint};
use crate::error::{Error, Result};
use crate::inventory::{
    ClusterRef, ConnectionState, Host, LunType, MultipathPolicy, PowerState, Session, Volume,
};
use crate::network::ReachabilityProbe;
use crate::report::{HostRecord, ReportKind, VolumeRecord};
use crate::traits::{ManagementApi, ReportSink};

pub const GB: u64 = 1024 * 1024 * 1024;

/// Operation that the fake server fails on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    Connect,
    ResolveCluster,
    ListHosts,
    ListVolumes,
    SetThreshold,
    Disconnect,
}

/// Calls the fake server received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallLog {
    pub connect: usize,
    pub disconnect: usize,
    pub resolve_cluster: usize,
    pub list_hosts: usize,
    pub list_volumes: usize,
    pub set_threshold: usize,
    /// Host ids passed to `list_volumes`, in call order.
    pub queried_hosts: Vec<String>,
    /// Canonical names passed to `set_volume_threshold`.
    pub updated_volumes: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FakeCluster {
    pub id: String,
    pub name: String,
    pub hosts: Vec<Host>,
    pub volumes: Vec<Volume>,
}

impl FakeCluster {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            hosts: Vec::new(),
            volumes: Vec::new(),
        }
    }

    pub fn host(mut self, host: Host, volumes: Vec<Volume>) -> Self {
        self.hosts.push(host);
        self.volumes.extend(volumes);
        self
    }
}

pub fn host(name: &str, connection_state: ConnectionState, power_state: PowerState) -> Host {
    Host {
        id: format!("host-{name}"),
        name: name.to_string(),
        connection_state,
        power_state,
    }
}

pub fn healthy_host(name: &str) -> Host {
    host(name, ConnectionState::Connected, PowerState::PoweredOn)
}

pub fn volume(
    host: &Host,
    canonical_name: &str,
    policy: MultipathPolicy,
    commands_per_path: Option<u32>,
) -> Volume {
    Volume {
        canonical_name: canonical_name.to_string(),
        capacity_bytes: 512 * GB,
        host_id: host.id.clone(),
        host_name: host.name.clone(),
        policy,
        commands_per_path,
    }
}

/// `count` round-robin volumes on `host`, all with the same threshold.
pub fn round_robin_volumes(host: &Host, count: usize, commands_per_path: u32) -> Vec<Volume> {
    (0..count)
        .map(|i| {
            volume(
                host,
                &format!("naa.{}{i:04}", host.name),
                MultipathPolicy::RoundRobin,
                Some(commands_per_path),
            )
        })
        .collect()
}

/// A management server that lives in memory.
pub struct FakeManagementApi {
    clusters: Mutex<Vec<FakeCluster>>,
    credentials: Credentials,
    fail_at: Option<FailPoint>,
    calls: Mutex<CallLog>,
}

impl FakeManagementApi {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            clusters: Mutex::new(Vec::new()),
            credentials,
            fail_at: None,
            calls: Mutex::new(CallLog::default()),
        }
    }

    pub fn with_cluster(self, cluster: FakeCluster) -> Self {
        self.clusters
            .lock()
            .expect("fake inventory lock poisoned")
            .push(cluster);
        self
    }

    pub fn failing_at(mut self, point: FailPoint) -> Self {
        self.fail_at = Some(point);
        self
    }

    pub fn calls(&self) -> CallLog {
        self.calls.lock().expect("fake call log poisoned").clone()
    }

    /// Current state of every volume the fake knows about.
    pub fn volumes(&self) -> Vec<Volume> {
        self.clusters
            .lock()
            .expect("fake inventory lock poisoned")
            .iter()
            .flat_map(|c| c.volumes.clone())
            .collect()
    }

    fn record(&self, f: impl FnOnce(&mut CallLog)) {
        f(&mut self.calls.lock().expect("fake call log poisoned"));
    }

    fn fails(&self, point: FailPoint) -> bool {
        self.fail_at == Some(point)
    }
}

impl ManagementApi for FakeManagementApi {
    async fn connect(&self, endpoint: &Endpoint, credentials: &Credentials) -> Result<Session> {
        self.record(|c| c.connect += 1);
        if self.fails(FailPoint::Connect)
            || credentials.username != self.credentials.username
            || credentials.password() != self.credentials.password()
        {
            return Err(Error::Authentication {
                endpoint: endpoint.to_string(),
                message: "credentials rejected (HTTP 401 Unauthorized)".to_string(),
            });
        }
        Ok(Session::new(endpoint.base_url(), "fake-session"))
    }

    async fn disconnect(&self, _session: Session) -> Result<()> {
        self.record(|c| c.disconnect += 1);
        if self.fails(FailPoint::Disconnect) {
            return Err(Error::Teardown("session already expired".to_string()));
        }
        Ok(())
    }

    async fn resolve_cluster(&self, _session: &Session, name: &str) -> Result<ClusterRef> {
        self.record(|c| c.resolve_cluster += 1);
        if self.fails(FailPoint::ResolveCluster) {
            return Err(Error::ClusterResolution {
                name: name.to_string(),
                reason: "HTTP 500 Internal Server Error".to_string(),
            });
        }
        self.clusters
            .lock()
            .expect("fake inventory lock poisoned")
            .iter()
            .find(|c| c.name == name)
            .map(|c| ClusterRef {
                id: c.id.clone(),
                name: c.name.clone(),
            })
            .ok_or_else(|| Error::ClusterResolution {
                name: name.to_string(),
                reason: "no cluster with that exact name".to_string(),
            })
    }

    async fn list_hosts(&self, _session: &Session, cluster: &ClusterRef) -> Result<Vec<Host>> {
        self.record(|c| c.list_hosts += 1);
        if self.fails(FailPoint::ListHosts) {
            return Err(Error::Inventory {
                operation: "list hosts",
                message: "HTTP 503 Service Unavailable".to_string(),
            });
        }
        Ok(self
            .clusters
            .lock()
            .expect("fake inventory lock poisoned")
            .iter()
            .find(|c| c.id == cluster.id)
            .map(|c| c.hosts.clone())
            .unwrap_or_default())
    }

    async fn list_volumes(
        &self,
        _session: &Session,
        hosts: &[Host],
        _lun_type: LunType,
    ) -> Result<Vec<Volume>> {
        self.record(|c| {
            c.list_volumes += 1;
            c.queried_hosts.extend(hosts.iter().map(|h| h.id.clone()));
        });
        if self.fails(FailPoint::ListVolumes) {
            return Err(Error::Inventory {
                operation: "list volumes",
                message: "HTTP 500 Internal Server Error".to_string(),
            });
        }
        let clusters = self.clusters.lock().expect("fake inventory lock poisoned");
        Ok(clusters
            .iter()
            .flat_map(|c| c.volumes.iter())
            .filter(|v| hosts.iter().any(|h| h.id == v.host_id))
            .cloned()
            .collect())
    }

    async fn set_volume_threshold(
        &self,
        _session: &Session,
        volumes: &[Volume],
        commands_per_path: u32,
    ) -> Result<Vec<Volume>> {
        self.record(|c| c.set_threshold += 1);
        let mut clusters = self.clusters.lock().expect("fake inventory lock poisoned");
        let mut updated = Vec::with_capacity(volumes.len());
        for target in volumes {
            if self.fails(FailPoint::SetThreshold) {
                return Err(Error::Remediation {
                    volume: target.canonical_name.clone(),
                    message: "HTTP 409 Conflict".to_string(),
                });
            }
            self.record(|c| c.updated_volumes.push(target.canonical_name.clone()));
            for stored in clusters.iter_mut().flat_map(|c| c.volumes.iter_mut()) {
                if stored.canonical_name == target.canonical_name
                    && stored.host_id == target.host_id
                {
                    stored.policy = MultipathPolicy::RoundRobin;
                    stored.commands_per_path = Some(commands_per_path);
                    updated.push(stored.clone());
                }
            }
        }
        Ok(updated)
    }
}

/// Probe with a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct FakeProbe {
    pub reachable: bool,
}

impl FakeProbe {
    pub fn reachable() -> Self {
        Self { reachable: true }
    }

    pub fn unreachable() -> Self {
        Self { reachable: false }
    }
}

impl ReachabilityProbe for FakeProbe {
    async fn probe(&self, _endpoint: &Endpoint, _timeout: Duration) -> io::Result<()> {
        if self.reachable {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))
        }
    }
}

/// Keeps every report in memory.
#[derive(Debug, Default)]
pub struct MemoryReportSink {
    pub hosts: BTreeMap<ReportKind, Vec<HostRecord>>,
    pub volumes: BTreeMap<ReportKind, Vec<VolumeRecord>>,
    pub fail_on: Option<ReportKind>,
}

impl MemoryReportSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(kind: ReportKind) -> Self {
        Self {
            fail_on: Some(kind),
            ..Self::default()
        }
    }

    /// Number of records in a volume report, `None` if it was never written.
    pub fn volume_count(&self, kind: ReportKind) -> Option<usize> {
        self.volumes.get(&kind).map(Vec::len)
    }

    pub fn written(&self) -> Vec<ReportKind> {
        let mut kinds: Vec<_> = self
            .hosts
            .keys()
            .chain(self.volumes.keys())
            .copied()
            .collect();
        kinds.sort();
        kinds
    }

    fn check(&self, kind: ReportKind) -> Result<()> {
        if self.fail_on == Some(kind) {
            return Err(Error::Report(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("cannot write {}", kind.file_name()),
            )));
        }
        Ok(())
    }
}

impl ReportSink for MemoryReportSink {
    fn write_hosts(&mut self, kind: ReportKind, records: &[HostRecord]) -> Result<()> {
        self.check(kind)?;
        self.hosts.insert(kind, records.to_vec());
        Ok(())
    }

    fn write_volumes(&mut self, kind: ReportKind, records: &[VolumeRecord]) -> Result<()> {
        self.check(kind)?;
        self.volumes.insert(kind, records.to_vec());
        Ok(())
    }
}
