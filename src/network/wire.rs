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

//! JSON bodies exchanged with the management server.

use serde::{Deserialize, Serialize};

use crate::inventory::{ConnectionState, Host, MultipathPolicy, PowerState, Volume};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub cluster: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostSummary {
    pub host: String,
    pub name: String,
    pub connection_state: ConnectionState,
    pub power_state: PowerState,
}

impl From<HostSummary> for Host {
    fn from(summary: HostSummary) -> Self {
        Host {
            id: summary.host,
            name: summary.name,
            connection_state: summary.connection_state,
            power_state: summary.power_state,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultipathInfo {
    pub policy: MultipathPolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands_per_path: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScsiLunSummary {
    pub canonical_name: String,
    pub lun_type: String,
    pub capacity_bytes: u64,
    pub multipath: MultipathInfo,
}

impl ScsiLunSummary {
    pub fn into_volume(self, host_id: &str, host_name: &str) -> Volume {
        Volume {
            canonical_name: self.canonical_name,
            capacity_bytes: self.capacity_bytes,
            host_id: host_id.to_string(),
            host_name: host_name.to_string(),
            policy: self.multipath.policy,
            commands_per_path: self.multipath.commands_per_path,
        }
    }
}

/// Body of the multipath update request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultipathUpdate {
    pub policy: MultipathPolicy,
    pub commands_per_path: u32,
}
