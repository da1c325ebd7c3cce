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

//! The remediation run: probe, authenticate, resolve the cluster, classify
//! hosts and volumes, report, remediate, disconnect.
//!
//! Steps run strictly in order. The session opened by `connect` is closed by
//! exactly one `disconnect` call that follows the session body on every exit
//! path; a failure before the session exists skips teardown entirely.

use std::fmt;

use crate::common::config::WorkflowConfig;
use crate::error::{Error, Result};
use crate::inventory::{
    classify_hosts, classify_volumes, ClusterRef, HostClassification, LunType, Session, Volume,
    VolumeClassification,
};
use crate::network::ReachabilityProbe;
use crate::report::{host_records, volume_records, ReportKind};
use crate::traits::{ManagementApi, ReportSink};

/// Progress through a run. Stages only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Start,
    Initialized,
    Connected,
    Authenticated,
    ClusterResolved,
    HostsClassified,
    VolumesClassified,
    Remediated,
    Disconnected,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::Initialized => "initialized",
            Stage::Connected => "connected",
            Stage::Authenticated => "authenticated",
            Stage::ClusterResolved => "cluster resolved",
            Stage::HostsClassified => "hosts classified",
            Stage::VolumesClassified => "volumes classified",
            Stage::Remediated => "remediated",
            Stage::Disconnected => "disconnected",
        };
        f.write_str(name)
    }
}

/// What happened to the remediation target set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemediationOutcome {
    /// No round-robin volume needed a change.
    NothingToDo,
    /// Every target was updated.
    Applied,
    /// Targets were reported but `dry_run` was set.
    DryRun,
    /// The operator declined the confirmation prompt.
    Declined,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub cluster: ClusterRef,
    pub hosts: HostClassification,
    pub volumes: VolumeClassification,
    pub remediated: Vec<Volume>,
    pub outcome: RemediationOutcome,
    /// Last stage reached before teardown.
    pub stage: Stage,
}

impl RunSummary {
    pub fn summary_line(&self) -> String {
        let outcome = match self.outcome {
            RemediationOutcome::NothingToDo => "nothing to remediate",
            RemediationOutcome::Applied => "remediation applied",
            RemediationOutcome::DryRun => "dry run, no changes made",
            RemediationOutcome::Declined => "remediation declined, no changes made",
        };
        format!(
            "Cluster {}: {} healthy / {} unhealthy hosts, {} volumes ({} non-round-robin, {} compliant, {} needing remediation), {} remediated; {outcome}",
            self.cluster.name,
            self.hosts.healthy.len(),
            self.hosts.unhealthy.len(),
            self.volumes.total(),
            self.volumes.non_round_robin.len(),
            self.volumes.compliant.len(),
            self.volumes.needs_remediation.len(),
            self.remediated.len(),
        )
    }
}

/// Asked once, with the target set, before any volume is changed.
pub type ConfirmFn<'a> = Box<dyn FnMut(&[Volume]) -> Result<bool> + 'a>;

pub struct Workflow<'a, A, P> {
    api: &'a A,
    probe: &'a P,
    config: WorkflowConfig,
    confirm: Option<ConfirmFn<'a>>,
    stage: Stage,
}

impl<'a, A, P> Workflow<'a, A, P>
where
    A: ManagementApi,
    P: ReachabilityProbe,
{
    pub fn new(api: &'a A, probe: &'a P, config: WorkflowConfig) -> Self {
        Self {
            api,
            probe,
            config,
            confirm: None,
            stage: Stage::Start,
        }
    }

    /// Require confirmation before remediation. Without one, targets are
    /// remediated as soon as they are reported.
    pub fn with_confirmation(mut self, confirm: impl FnMut(&[Volume]) -> Result<bool> + 'a) -> Self {
        self.confirm = Some(Box::new(confirm));
        self
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn advance(&mut self, next: Stage) {
        debug_assert!(next >= self.stage, "stage moved backwards");
        tracing::debug!(from = %self.stage, to = %next, "Workflow stage");
        self.stage = next;
    }

    pub async fn run<R: ReportSink>(&mut self, sink: &mut R) -> Result<RunSummary> {
        self.config.validate()?;
        self.advance(Stage::Initialized);

        let endpoint = self.config.endpoint.clone();
        self.probe
            .probe(&endpoint, self.config.probe_timeout)
            .await
            .map_err(|source| Error::Unreachable {
                endpoint: endpoint.to_string(),
                source,
            })?;
        self.advance(Stage::Connected);

        let session = self
            .api
            .connect(&endpoint, &self.config.credentials)
            .await?;
        self.advance(Stage::Authenticated);
        tracing::info!(endpoint = %endpoint, "Connected to management server");

        let outcome = self.run_with_session(&session, sink).await;

        if let Err(e) = self.api.disconnect(session).await {
            tracing::warn!("{e}");
        }
        self.advance(Stage::Disconnected);

        if let Err(e) = &outcome {
            tracing::error!("Run aborted: {e}");
        }
        outcome
    }

    async fn run_with_session<R: ReportSink>(
        &mut self,
        session: &Session,
        sink: &mut R,
    ) -> Result<RunSummary> {
        let cluster = self
            .api
            .resolve_cluster(session, &self.config.cluster_name)
            .await?;
        self.advance(Stage::ClusterResolved);
        tracing::info!(cluster = %cluster.name, id = %cluster.id, "Cluster resolved");

        let hosts = self.api.list_hosts(session, &cluster).await?;
        let hosts = classify_hosts(&hosts);
        if !hosts.unhealthy.is_empty() {
            tracing::warn!(
                count = hosts.unhealthy.len(),
                "Skipping hosts that are not connected and powered on"
            );
            sink.write_hosts(ReportKind::UnhealthyHosts, &host_records(&hosts.unhealthy))?;
        }
        self.advance(Stage::HostsClassified);

        let volumes = if hosts.healthy.is_empty() {
            tracing::warn!(cluster = %cluster.name, "No healthy hosts; no volumes to inspect");
            Vec::new()
        } else {
            self.api
                .list_volumes(session, &hosts.healthy, LunType::Disk)
                .await?
        };
        let target = self.config.target_commands_per_path;
        let volumes = classify_volumes(volumes, target);
        tracing::info!(
            total = volumes.total(),
            non_round_robin = volumes.non_round_robin.len(),
            compliant = volumes.compliant.len(),
            needs_remediation = volumes.needs_remediation.len(),
            "Volumes classified"
        );
        for (kind, set) in [
            (ReportKind::NonRoundRobin, &volumes.non_round_robin),
            (ReportKind::Compliant, &volumes.compliant),
            (ReportKind::RemediationTargets, &volumes.needs_remediation),
        ] {
            if !set.is_empty() {
                sink.write_volumes(kind, &volume_records(set))?;
            }
        }
        self.advance(Stage::VolumesClassified);

        let (outcome, remediated) = self
            .remediate(session, &volumes.needs_remediation, sink)
            .await?;

        Ok(RunSummary {
            cluster,
            hosts,
            volumes,
            remediated,
            outcome,
            stage: self.stage,
        })
    }

    async fn remediate<R: ReportSink>(
        &mut self,
        session: &Session,
        targets: &[Volume],
        sink: &mut R,
    ) -> Result<(RemediationOutcome, Vec<Volume>)> {
        if targets.is_empty() {
            tracing::info!("All round-robin volumes already switch paths every command");
            self.advance(Stage::Remediated);
            return Ok((RemediationOutcome::NothingToDo, Vec::new()));
        }
        if self.config.dry_run {
            tracing::info!(count = targets.len(), "Dry run; leaving volumes unchanged");
            return Ok((RemediationOutcome::DryRun, Vec::new()));
        }
        if let Some(confirm) = self.confirm.as_mut() {
            if !confirm(targets)? {
                tracing::info!("Remediation declined");
                return Ok((RemediationOutcome::Declined, Vec::new()));
            }
        }

        let target = self.config.target_commands_per_path;
        tracing::info!(
            count = targets.len(),
            commands_per_path = target,
            "Applying round-robin path-switch threshold"
        );
        let updated = self
            .api
            .set_volume_threshold(session, targets, target)
            .await?;
        if !updated.is_empty() {
            sink.write_volumes(ReportKind::Remediated, &volume_records(&updated))?;
        }
        self.advance(Stage::Remediated);
        Ok((RemediationOutcome::Applied, updated))
    }
}
