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

//! Record sets written at each stage of a run.

pub mod console;
pub mod file_sink;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::inventory::{Host, Volume};

pub use file_sink::FileReportSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReportKind {
    UnhealthyHosts,
    NonRoundRobin,
    Compliant,
    RemediationTargets,
    Remediated,
}

impl ReportKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            ReportKind::UnhealthyHosts => "unhealthy_hosts.json",
            ReportKind::NonRoundRobin => "non_round_robin_volumes.json",
            ReportKind::Compliant => "compliant_volumes.json",
            ReportKind::RemediationTargets => "remediation_targets.json",
            ReportKind::Remediated => "remediated_volumes.json",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::UnhealthyHosts => "Hosts not connected or not powered on",
            ReportKind::NonRoundRobin => "Volumes not using round-robin",
            ReportKind::Compliant => "Round-robin volumes already switching every command",
            ReportKind::RemediationTargets => "Round-robin volumes needing remediation",
            ReportKind::Remediated => "Volumes remediated",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostRecord {
    pub name: String,
    pub connection_state: String,
    pub power_state: String,
}

impl From<&Host> for HostRecord {
    fn from(host: &Host) -> Self {
        Self {
            name: host.name.clone(),
            connection_state: host.connection_state.to_string(),
            power_state: host.power_state.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeRecord {
    pub canonical_name: String,
    pub capacity_gb: f64,
    pub host: String,
    pub multipath_policy: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub commands_per_path: Option<u32>,
}

impl From<&Volume> for VolumeRecord {
    fn from(volume: &Volume) -> Self {
        // Threshold only means something under round-robin.
        let commands_per_path = if volume.policy.is_round_robin() {
            volume.commands_per_path
        } else {
            None
        };
        Self {
            canonical_name: volume.canonical_name.clone(),
            capacity_gb: volume.capacity_gb(),
            host: volume.host_name.clone(),
            multipath_policy: volume.policy.to_string(),
            commands_per_path,
        }
    }
}

pub fn host_records(hosts: &[Host]) -> Vec<HostRecord> {
    hosts.iter().map(HostRecord::from).collect()
}

pub fn volume_records(volumes: &[Volume]) -> Vec<VolumeRecord> {
    volumes.iter().map(VolumeRecord::from).collect()
}
