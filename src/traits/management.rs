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

#![allow(async_fn_in_trait)]

use crate::common::config::{Credentials, Endpoint};
use crate::error::Result;
use crate::inventory::{ClusterRef, Host, LunType, Session, Volume};

/// Operations the remediation workflow needs from a management server.
///
/// Every call is attempted once. Implementations return complete result sets
/// and report failures with the error variant that belongs to the operation:
///
/// | operation              | error                        |
/// |------------------------|------------------------------|
/// | `connect`              | `Error::Authentication`      |
/// | `disconnect`           | `Error::Teardown`            |
/// | `resolve_cluster`      | `Error::ClusterResolution`   |
/// | `list_hosts`           | `Error::Inventory`           |
/// | `list_volumes`         | `Error::Inventory`           |
/// | `set_volume_threshold` | `Error::Remediation`         |
pub trait ManagementApi {
    /// Open an authenticated session.
    async fn connect(&self, endpoint: &Endpoint, credentials: &Credentials) -> Result<Session>;

    /// Close a session. Consumes it so it cannot be closed twice.
    async fn disconnect(&self, session: Session) -> Result<()>;

    /// Find the cluster whose name matches `name` exactly.
    async fn resolve_cluster(&self, session: &Session, name: &str) -> Result<ClusterRef>;

    /// All hosts in the cluster, whatever their state.
    async fn list_hosts(&self, session: &Session, cluster: &ClusterRef) -> Result<Vec<Host>>;

    /// Volumes of the given type visible to `hosts`, one entry per host and LUN.
    async fn list_volumes(
        &self,
        session: &Session,
        hosts: &[Host],
        lun_type: LunType,
    ) -> Result<Vec<Volume>>;

    /// Set round-robin with `commands_per_path` on every volume, stopping at
    /// the first failure. Returns the volumes as the server reports them
    /// after the change.
    async fn set_volume_threshold(
        &self,
        session: &Session,
        volumes: &[Volume],
        commands_per_path: u32,
    ) -> Result<Vec<Volume>>;
}
