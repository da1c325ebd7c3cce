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

//! End-to-end runs of the remediation workflow against an in-memory server.

use std::cell::Cell;

use rr_iops::common::config::{Credentials, Endpoint, WorkflowConfig};
use rr_iops::inventory::{ConnectionState, MultipathPolicy, PowerState};
use rr_iops::report::{FileReportSink, ReportKind};
use rr_iops::testing::{
    healthy_host, host, round_robin_volumes, volume, FailPoint, FakeCluster, FakeManagementApi,
    FakeProbe, MemoryReportSink,
};
use rr_iops::workflow::{RemediationOutcome, Stage, Workflow};
use rr_iops::Error;

fn credentials() -> Credentials {
    Credentials::new("administrator@vsphere.local", "correct-horse")
}

fn config(cluster: &str) -> WorkflowConfig {
    WorkflowConfig::new(
        Endpoint::parse("vc01.lab.local", 443).unwrap(),
        cluster,
        credentials(),
    )
}

/// Two healthy hosts with a mix of volumes, one powered-off host.
fn mixed_cluster() -> FakeCluster {
    let esx01 = healthy_host("esx01");
    let esx02 = healthy_host("esx02");
    let esx03 = host("esx03", ConnectionState::Connected, PowerState::PoweredOff);

    let mut esx01_volumes = round_robin_volumes(&esx01, 2, 1000);
    esx01_volumes.push(volume(&esx01, "naa.esx01-mru", MultipathPolicy::MostRecentlyUsed, None));
    let mut esx02_volumes = round_robin_volumes(&esx02, 2, 1);
    esx02_volumes.push(volume(&esx02, "naa.esx02-rr-unset", MultipathPolicy::RoundRobin, None));
    let esx03_volumes = round_robin_volumes(&esx03, 3, 1000);

    FakeCluster::new("domain-c8", "prod-01")
        .host(esx01, esx01_volumes)
        .host(esx02, esx02_volumes)
        .host(esx03, esx03_volumes)
}

#[tokio::test]
async fn test_all_compliant_cluster_needs_no_remediation() {
    let esx01 = healthy_host("esx01");
    let esx02 = healthy_host("esx02");
    let cluster = FakeCluster::new("domain-c8", "prod-01")
        .host(esx01.clone(), round_robin_volumes(&esx01, 4, 1))
        .host(esx02.clone(), round_robin_volumes(&esx02, 4, 1));
    let api = FakeManagementApi::new(credentials()).with_cluster(cluster);
    let probe = FakeProbe::reachable();
    let mut sink = MemoryReportSink::new();

    let summary = Workflow::new(&api, &probe, config("prod-01"))
        .run(&mut sink)
        .await
        .expect("run should succeed");

    assert_eq!(summary.outcome, RemediationOutcome::NothingToDo);
    assert!(summary.remediated.is_empty());
    assert_eq!(sink.volume_count(ReportKind::Compliant), Some(8));
    assert_eq!(sink.volume_count(ReportKind::RemediationTargets), None);
    assert_eq!(sink.volume_count(ReportKind::Remediated), None);
    assert!(!sink.hosts.contains_key(&ReportKind::UnhealthyHosts));

    let calls = api.calls();
    assert_eq!(calls.set_threshold, 0);
    assert_eq!(calls.disconnect, 1);
}

#[tokio::test]
async fn test_unhealthy_host_is_reported_and_never_queried() {
    let off = host("esx01", ConnectionState::Connected, PowerState::PoweredOff);
    let on = healthy_host("esx02");
    let off_volumes = round_robin_volumes(&off, 2, 1000);
    let on_volumes = vec![
        volume(&on, "naa.a", MultipathPolicy::Fixed, None),
        volume(&on, "naa.b", MultipathPolicy::MostRecentlyUsed, None),
        volume(&on, "naa.c", MultipathPolicy::Fixed, None),
    ];
    let cluster = FakeCluster::new("domain-c9", "prod-02")
        .host(off.clone(), off_volumes)
        .host(on.clone(), on_volumes);
    let api = FakeManagementApi::new(credentials()).with_cluster(cluster);
    let probe = FakeProbe::reachable();
    let mut sink = MemoryReportSink::new();

    let summary = Workflow::new(&api, &probe, config("prod-02"))
        .run(&mut sink)
        .await
        .unwrap();

    let unhealthy = &sink.hosts[&ReportKind::UnhealthyHosts];
    assert_eq!(unhealthy.len(), 1);
    assert_eq!(unhealthy[0].name, "esx01");
    assert_eq!(unhealthy[0].power_state, "POWERED_OFF");

    assert_eq!(sink.volume_count(ReportKind::NonRoundRobin), Some(3));
    assert_eq!(sink.volume_count(ReportKind::RemediationTargets), None);
    assert_eq!(summary.outcome, RemediationOutcome::NothingToDo);

    let calls = api.calls();
    assert_eq!(calls.queried_hosts, vec![on.id.clone()]);
    assert_eq!(calls.set_threshold, 0);
    assert!(calls.updated_volumes.is_empty());
}

#[tokio::test]
async fn test_authentication_failure_skips_cluster_and_teardown() {
    let api = FakeManagementApi::new(credentials()).with_cluster(mixed_cluster());
    let probe = FakeProbe::reachable();
    let mut sink = MemoryReportSink::new();
    let mut config = config("prod-01");
    config.credentials = Credentials::new("administrator@vsphere.local", "wrong");

    let mut workflow = Workflow::new(&api, &probe, config);
    let err = workflow.run(&mut sink).await.unwrap_err();

    assert!(matches!(err, Error::Authentication { .. }), "got {err}");
    assert_eq!(err.exit_code(), 1);
    assert_eq!(workflow.stage(), Stage::Connected);

    let calls = api.calls();
    assert_eq!(calls.connect, 1);
    assert_eq!(calls.resolve_cluster, 0);
    assert_eq!(calls.disconnect, 0);
}

#[tokio::test]
async fn test_unknown_cluster_tears_down_and_is_not_reachability_error() {
    let api = FakeManagementApi::new(credentials()).with_cluster(mixed_cluster());
    let probe = FakeProbe::reachable();
    let mut sink = MemoryReportSink::new();

    let mut workflow = Workflow::new(&api, &probe, config("prod-1"));
    let err = workflow.run(&mut sink).await.unwrap_err();

    assert!(matches!(err, Error::ClusterResolution { .. }), "got {err}");
    assert!(err.to_string().contains("prod-1"));
    assert!(!err.to_string().contains("unreachable"));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(workflow.stage(), Stage::Disconnected);

    let calls = api.calls();
    assert_eq!(calls.disconnect, 1);
    assert_eq!(calls.list_hosts, 0);
}

#[tokio::test]
async fn test_unreachable_endpoint_fails_before_authentication() {
    let api = FakeManagementApi::new(credentials()).with_cluster(mixed_cluster());
    let probe = FakeProbe::unreachable();
    let mut sink = MemoryReportSink::new();

    let err = Workflow::new(&api, &probe, config("prod-01"))
        .run(&mut sink)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Unreachable { .. }), "got {err}");
    assert!(err.to_string().contains("vc01.lab.local:443"));
    let calls = api.calls();
    assert_eq!(calls.connect, 0);
    assert_eq!(calls.disconnect, 0);
}

#[tokio::test]
async fn test_invalid_config_fails_without_session() {
    let api = FakeManagementApi::new(credentials()).with_cluster(mixed_cluster());
    let probe = FakeProbe::reachable();
    let mut sink = MemoryReportSink::new();

    let mut workflow = Workflow::new(&api, &probe, config(""));
    let err = workflow.run(&mut sink).await.unwrap_err();

    assert!(matches!(err, Error::Config(_)));
    assert_eq!(workflow.stage(), Stage::Start);
    assert_eq!(api.calls().connect, 0);
    assert_eq!(api.calls().disconnect, 0);
}

#[tokio::test]
async fn test_teardown_runs_exactly_once_at_every_failure_point() {
    let cases = [
        (FailPoint::ResolveCluster, 1),
        (FailPoint::ListHosts, 1),
        (FailPoint::ListVolumes, 1),
        (FailPoint::SetThreshold, 1),
        (FailPoint::Connect, 0),
    ];

    for (point, expected_disconnects) in cases {
        let api = FakeManagementApi::new(credentials())
            .with_cluster(mixed_cluster())
            .failing_at(point);
        let probe = FakeProbe::reachable();
        let mut sink = MemoryReportSink::new();

        let result = Workflow::new(&api, &probe, config("prod-01"))
            .run(&mut sink)
            .await;

        assert!(result.is_err(), "{point:?} should abort the run");
        assert_eq!(
            api.calls().disconnect,
            expected_disconnects,
            "disconnect count after failure at {point:?}"
        );
    }
}

#[tokio::test]
async fn test_failure_errors_match_operation() {
    let expectations: [(FailPoint, fn(&Error) -> bool); 4] = [
        (FailPoint::ResolveCluster, |e| {
            matches!(e, Error::ClusterResolution { .. })
        }),
        (FailPoint::ListHosts, |e| {
            matches!(e, Error::Inventory { operation: "list hosts", .. })
        }),
        (FailPoint::ListVolumes, |e| {
            matches!(e, Error::Inventory { operation: "list volumes", .. })
        }),
        (FailPoint::SetThreshold, |e| matches!(e, Error::Remediation { .. })),
    ];

    for (point, check) in expectations {
        let api = FakeManagementApi::new(credentials())
            .with_cluster(mixed_cluster())
            .failing_at(point);
        let probe = FakeProbe::reachable();
        let mut sink = MemoryReportSink::new();
        let err = Workflow::new(&api, &probe, config("prod-01"))
            .run(&mut sink)
            .await
            .unwrap_err();
        assert!(check(&err), "unexpected error for {point:?}: {err}");
    }
}

#[tokio::test]
async fn test_remediation_failure_aborts_without_remediated_report() {
    let api = FakeManagementApi::new(credentials())
        .with_cluster(mixed_cluster())
        .failing_at(FailPoint::SetThreshold);
    let probe = FakeProbe::reachable();
    let mut sink = MemoryReportSink::new();

    let mut workflow = Workflow::new(&api, &probe, config("prod-01"));
    let err = workflow.run(&mut sink).await.unwrap_err();

    assert!(matches!(err, Error::Remediation { .. }));
    assert_eq!(sink.volume_count(ReportKind::RemediationTargets), Some(3));
    assert_eq!(sink.volume_count(ReportKind::Remediated), None);
    assert_eq!(api.calls().set_threshold, 1);
}

#[tokio::test]
async fn test_teardown_failure_is_only_a_warning() {
    let api = FakeManagementApi::new(credentials())
        .with_cluster(mixed_cluster())
        .failing_at(FailPoint::Disconnect);
    let probe = FakeProbe::reachable();
    let mut sink = MemoryReportSink::new();

    let mut workflow = Workflow::new(&api, &probe, config("prod-01"));
    let summary = workflow.run(&mut sink).await.expect("teardown failure is not fatal");

    assert_eq!(summary.outcome, RemediationOutcome::Applied);
    assert_eq!(workflow.stage(), Stage::Disconnected);
    assert_eq!(api.calls().disconnect, 1);
}

#[tokio::test]
async fn test_mixed_cluster_classification_and_remediation() {
    let api = FakeManagementApi::new(credentials()).with_cluster(mixed_cluster());
    let probe = FakeProbe::reachable();
    let mut sink = MemoryReportSink::new();

    let summary = Workflow::new(&api, &probe, config("prod-01"))
        .run(&mut sink)
        .await
        .unwrap();

    assert_eq!(summary.hosts.healthy.len(), 2);
    assert_eq!(summary.hosts.unhealthy.len(), 1);
    assert_eq!(summary.volumes.total(), 6);
    assert_eq!(summary.volumes.non_round_robin.len(), 1);
    assert_eq!(summary.volumes.compliant.len(), 2);
    assert_eq!(summary.volumes.needs_remediation.len(), 3);
    assert_eq!(summary.outcome, RemediationOutcome::Applied);
    assert_eq!(summary.stage, Stage::Remediated);
    assert_eq!(summary.remediated.len(), 3);
    assert!(summary
        .remediated
        .iter()
        .all(|v| v.commands_per_path == Some(1)));

    assert_eq!(
        sink.written(),
        vec![
            ReportKind::UnhealthyHosts,
            ReportKind::NonRoundRobin,
            ReportKind::Compliant,
            ReportKind::RemediationTargets,
            ReportKind::Remediated,
        ]
    );

    // The powered-off host's volumes are untouched.
    let calls = api.calls();
    assert!(calls
        .updated_volumes
        .iter()
        .all(|name| !name.starts_with("naa.esx03")));
    assert!(api
        .volumes()
        .iter()
        .filter(|v| v.host_name == "esx03")
        .all(|v| v.commands_per_path == Some(1000)));

    let line = summary.summary_line();
    assert!(line.contains("3 remediated"));
    assert!(line.contains("remediation applied"));
}

#[tokio::test]
async fn test_second_run_finds_nothing_to_remediate() {
    let api = FakeManagementApi::new(credentials()).with_cluster(mixed_cluster());
    let probe = FakeProbe::reachable();

    let mut first_sink = MemoryReportSink::new();
    let first = Workflow::new(&api, &probe, config("prod-01"))
        .run(&mut first_sink)
        .await
        .unwrap();
    assert_eq!(first.volumes.needs_remediation.len(), 3);

    let mut second_sink = MemoryReportSink::new();
    let second = Workflow::new(&api, &probe, config("prod-01"))
        .run(&mut second_sink)
        .await
        .unwrap();

    assert!(second.volumes.needs_remediation.is_empty());
    assert_eq!(second.volumes.compliant.len(), 5);
    assert_eq!(second.outcome, RemediationOutcome::NothingToDo);
    assert_eq!(second_sink.volume_count(ReportKind::RemediationTargets), None);
    assert_eq!(api.calls().set_threshold, 1);
    assert_eq!(api.calls().disconnect, 2);
}

#[tokio::test]
async fn test_dry_run_reports_but_changes_nothing() {
    let api = FakeManagementApi::new(credentials()).with_cluster(mixed_cluster());
    let probe = FakeProbe::reachable();
    let mut sink = MemoryReportSink::new();

    let summary = Workflow::new(&api, &probe, config("prod-01").dry_run(true))
        .run(&mut sink)
        .await
        .unwrap();

    assert_eq!(summary.outcome, RemediationOutcome::DryRun);
    assert_eq!(summary.stage, Stage::VolumesClassified);
    assert_eq!(sink.volume_count(ReportKind::RemediationTargets), Some(3));
    assert_eq!(sink.volume_count(ReportKind::Remediated), None);
    assert_eq!(api.calls().set_threshold, 0);
    assert_eq!(api.calls().disconnect, 1);
}

#[tokio::test]
async fn test_confirmation_gates_remediation() {
    let api = FakeManagementApi::new(credentials()).with_cluster(mixed_cluster());
    let probe = FakeProbe::reachable();

    let asked = Cell::new(0usize);
    let mut sink = MemoryReportSink::new();
    let summary = Workflow::new(&api, &probe, config("prod-01"))
        .with_confirmation(|targets| {
            asked.set(targets.len());
            Ok(false)
        })
        .run(&mut sink)
        .await
        .unwrap();

    assert_eq!(asked.get(), 3);
    assert_eq!(summary.outcome, RemediationOutcome::Declined);
    assert_eq!(api.calls().set_threshold, 0);

    let mut sink = MemoryReportSink::new();
    let summary = Workflow::new(&api, &probe, config("prod-01"))
        .with_confirmation(|_| Ok(true))
        .run(&mut sink)
        .await
        .unwrap();
    assert_eq!(summary.outcome, RemediationOutcome::Applied);
    assert_eq!(api.calls().set_threshold, 1);
}

#[tokio::test]
async fn test_no_healthy_hosts_is_an_empty_result() {
    let off = host("esx01", ConnectionState::Connected, PowerState::PoweredOff);
    let gone = host("esx02", ConnectionState::NotResponding, PowerState::PoweredOn);
    let cluster = FakeCluster::new("domain-c8", "prod-01")
        .host(off.clone(), round_robin_volumes(&off, 2, 1000))
        .host(gone.clone(), round_robin_volumes(&gone, 2, 1000));
    let api = FakeManagementApi::new(credentials()).with_cluster(cluster);
    let probe = FakeProbe::reachable();
    let mut sink = MemoryReportSink::new();

    let summary = Workflow::new(&api, &probe, config("prod-01"))
        .run(&mut sink)
        .await
        .unwrap();

    assert_eq!(summary.hosts.unhealthy.len(), 2);
    assert_eq!(summary.volumes.total(), 0);
    assert_eq!(summary.outcome, RemediationOutcome::NothingToDo);
    assert_eq!(sink.written(), vec![ReportKind::UnhealthyHosts]);
    assert_eq!(api.calls().list_volumes, 0);
}

#[tokio::test]
async fn test_report_failure_is_terminal_and_tears_down() {
    let api = FakeManagementApi::new(credentials()).with_cluster(mixed_cluster());
    let probe = FakeProbe::reachable();
    let mut sink = MemoryReportSink::failing_on(ReportKind::Compliant);

    let err = Workflow::new(&api, &probe, config("prod-01"))
        .run(&mut sink)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Report(_)));
    assert_eq!(api.calls().set_threshold, 0);
    assert_eq!(api.calls().disconnect, 1);
}

#[tokio::test]
async fn test_file_reports_only_for_non_empty_categories() {
    let dir = tempfile::TempDir::new().unwrap();
    let esx01 = healthy_host("esx01");
    let cluster = FakeCluster::new("domain-c8", "prod-01")
        .host(esx01.clone(), round_robin_volumes(&esx01, 3, 1000));
    let api = FakeManagementApi::new(credentials()).with_cluster(cluster);
    let probe = FakeProbe::reachable();
    let mut sink = FileReportSink::new(dir.path());

    Workflow::new(&api, &probe, config("prod-01").output_dir(dir.path()))
        .run(&mut sink)
        .await
        .unwrap();

    let exists = |kind: ReportKind| dir.path().join(kind.file_name()).exists();
    assert!(!exists(ReportKind::UnhealthyHosts));
    assert!(!exists(ReportKind::NonRoundRobin));
    assert!(!exists(ReportKind::Compliant));
    assert!(exists(ReportKind::RemediationTargets));
    assert!(exists(ReportKind::Remediated));

    let remediated: Vec<serde_json::Value> = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join(ReportKind::Remediated.file_name())).unwrap(),
    )
    .unwrap();
    assert_eq!(remediated.len(), 3);
    assert!(remediated
        .iter()
        .all(|r| r["commands_per_path"] == 1 && r["multipath_policy"] == "VMW_PSP_RR"));
    assert_eq!(sink.written().len(), 2);
}
