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

use super::types::{Host, Volume, VolumeCategory};

/// Hosts split by health. Every input host lands in exactly one list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostClassification {
    pub healthy: Vec<Host>,
    pub unhealthy: Vec<Host>,
}

/// Volumes split by multipathing compliance. The three lists are disjoint
/// and together hold every input volume.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VolumeClassification {
    pub non_round_robin: Vec<Volume>,
    pub compliant: Vec<Volume>,
    pub needs_remediation: Vec<Volume>,
}

impl VolumeClassification {
    pub fn total(&self) -> usize {
        self.non_round_robin.len() + self.compliant.len() + self.needs_remediation.len()
    }
}

pub fn classify_hosts(hosts: &[Host]) -> HostClassification {
    let (healthy, unhealthy): (Vec<Host>, Vec<Host>) =
        hosts.iter().cloned().partition(Host::is_healthy);
    HostClassification { healthy, unhealthy }
}

pub fn classify_volumes(volumes: Vec<Volume>, target: u32) -> VolumeClassification {
    let mut classification = VolumeClassification::default();
    for volume in volumes {
        match volume.category(target) {
            VolumeCategory::NonRoundRobin => classification.non_round_robin.push(volume),
            VolumeCategory::Compliant => classification.compliant.push(volume),
            VolumeCategory::NeedsRemediation => classification.needs_remediation.push(volume),
        }
    }
    classification
}
