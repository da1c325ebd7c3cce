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

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::config::AppConfig;

/// Lowercase and drop separators so `POWERED_ON`, `poweredOn` and
/// `powered-on` compare equal.
fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// An authenticated connection to the management server.
///
/// Only [`crate::traits::ManagementApi::disconnect`] consumes a session, so a
/// session can be closed at most once.
pub struct Session {
    pub base_url: String,
    token: String,
}

impl Session {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Opaque reference to a resolved cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConnectionState {
    Connected,
    Disconnected,
    NotResponding,
    Other(String),
}

impl ConnectionState {
    pub fn as_str(&self) -> &str {
        match self {
            ConnectionState::Connected => "CONNECTED",
            ConnectionState::Disconnected => "DISCONNECTED",
            ConnectionState::NotResponding => "NOT_RESPONDING",
            ConnectionState::Other(raw) => raw,
        }
    }
}

impl From<String> for ConnectionState {
    fn from(raw: String) -> Self {
        match normalize(&raw).as_str() {
            "connected" => ConnectionState::Connected,
            "disconnected" => ConnectionState::Disconnected,
            "notresponding" => ConnectionState::NotResponding,
            _ => ConnectionState::Other(raw),
        }
    }
}

impl From<ConnectionState> for String {
    fn from(state: ConnectionState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PowerState {
    PoweredOn,
    PoweredOff,
    Standby,
    Other(String),
}

impl PowerState {
    pub fn as_str(&self) -> &str {
        match self {
            PowerState::PoweredOn => "POWERED_ON",
            PowerState::PoweredOff => "POWERED_OFF",
            PowerState::Standby => "STANDBY",
            PowerState::Other(raw) => raw,
        }
    }
}

impl From<String> for PowerState {
    fn from(raw: String) -> Self {
        match normalize(&raw).as_str() {
            "poweredon" => PowerState::PoweredOn,
            "poweredoff" => PowerState::PoweredOff,
            "standby" => PowerState::Standby,
            _ => PowerState::Other(raw),
        }
    }
}

impl From<PowerState> for String {
    fn from(state: PowerState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    pub id: String,
    pub name: String,
    pub connection_state: ConnectionState,
    pub power_state: PowerState,
}

impl Host {
    /// Connected and powered on. Only healthy hosts have their volumes queried.
    pub fn is_healthy(&self) -> bool {
        self.connection_state == ConnectionState::Connected
            && self.power_state == PowerState::PoweredOn
    }
}

/// Path selection plugin assigned to a volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MultipathPolicy {
    RoundRobin,
    MostRecentlyUsed,
    Fixed,
    Other(String),
}

impl MultipathPolicy {
    pub fn as_str(&self) -> &str {
        match self {
            MultipathPolicy::RoundRobin => AppConfig::ROUND_ROBIN_PLUGIN,
            MultipathPolicy::MostRecentlyUsed => "VMW_PSP_MRU",
            MultipathPolicy::Fixed => "VMW_PSP_FIXED",
            MultipathPolicy::Other(raw) => raw,
        }
    }

    pub fn is_round_robin(&self) -> bool {
        matches!(self, MultipathPolicy::RoundRobin)
    }
}

impl From<String> for MultipathPolicy {
    fn from(raw: String) -> Self {
        match normalize(&raw).as_str() {
            "vmwpsprr" | "roundrobin" => MultipathPolicy::RoundRobin,
            "vmwpspmru" | "mostrecentlyused" => MultipathPolicy::MostRecentlyUsed,
            "vmwpspfixed" | "fixed" => MultipathPolicy::Fixed,
            _ => MultipathPolicy::Other(raw),
        }
    }
}

impl From<MultipathPolicy> for String {
    fn from(policy: MultipathPolicy) -> Self {
        policy.as_str().to_string()
    }
}

impl fmt::Display for MultipathPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// LUN type filter for volume queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LunType {
    Disk,
    CdRom,
}

impl LunType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LunType::Disk => "disk",
            LunType::CdRom => "cdrom",
        }
    }
}

/// Where a volume falls relative to the remediation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeCategory {
    NonRoundRobin,
    Compliant,
    NeedsRemediation,
}

/// A disk-type SCSI LUN as seen from one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volume {
    pub canonical_name: String,
    pub capacity_bytes: u64,
    pub host_id: String,
    pub host_name: String,
    pub policy: MultipathPolicy,
    /// Commands issued on a path before switching. `None` when the server
    /// reports no value, which only happens outside round-robin in practice.
    pub commands_per_path: Option<u32>,
}

impl Volume {
    pub fn category(&self, target: u32) -> VolumeCategory {
        if !self.policy.is_round_robin() {
            VolumeCategory::NonRoundRobin
        } else if self.commands_per_path == Some(target) {
            VolumeCategory::Compliant
        } else {
            VolumeCategory::NeedsRemediation
        }
    }

    pub fn capacity_gb(&self) -> f64 {
        let gb = self.capacity_bytes as f64 / AppConfig::BYTES_PER_GB;
        (gb * 100.0).round() / 100.0
    }
}
