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

use std::fmt::Write;

use super::{HostRecord, ReportKind, VolumeRecord};

const NAME_WIDTH: usize = 36;
const HOST_WIDTH: usize = 28;
const POLICY_WIDTH: usize = 14;
const CAPACITY_WIDTH: usize = 12;
const STATE_WIDTH: usize = 16;

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let mut out: String = value.chars().take(width.saturating_sub(1)).collect();
        out.push('~');
        out
    }
}

fn heading(out: &mut String, kind: ReportKind, count: usize) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{} ({count})", kind.title());
}

pub fn render_hosts(kind: ReportKind, records: &[HostRecord]) -> String {
    let mut out = String::new();
    heading(&mut out, kind, records.len());
    let _ = writeln!(
        out,
        "{:<HOST_WIDTH$} {:<STATE_WIDTH$} {:<STATE_WIDTH$}",
        "Name", "Connection", "Power"
    );
    let _ = writeln!(out, "{}", "-".repeat(HOST_WIDTH + 2 * STATE_WIDTH + 2));
    for record in records {
        let _ = writeln!(
            out,
            "{:<HOST_WIDTH$} {:<STATE_WIDTH$} {:<STATE_WIDTH$}",
            truncate(&record.name, HOST_WIDTH),
            truncate(&record.connection_state, STATE_WIDTH),
            truncate(&record.power_state, STATE_WIDTH),
        );
    }
    out
}

pub fn render_volumes(kind: ReportKind, records: &[VolumeRecord]) -> String {
    let mut out = String::new();
    heading(&mut out, kind, records.len());
    let _ = writeln!(
        out,
        "{:<NAME_WIDTH$} {:>CAPACITY_WIDTH$} {:<HOST_WIDTH$} {:<POLICY_WIDTH$} {:>8}",
        "CanonicalName", "CapacityGB", "Host", "Policy", "IOPS"
    );
    let _ = writeln!(
        out,
        "{}",
        "-".repeat(NAME_WIDTH + CAPACITY_WIDTH + HOST_WIDTH + POLICY_WIDTH + 8 + 4)
    );
    for record in records {
        let iops = record
            .commands_per_path
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:<NAME_WIDTH$} {:>CAPACITY_WIDTH$.2} {:<HOST_WIDTH$} {:<POLICY_WIDTH$} {:>8}",
            truncate(&record.canonical_name, NAME_WIDTH),
            record.capacity_gb,
            truncate(&record.host, HOST_WIDTH),
            truncate(&record.multipath_policy, POLICY_WIDTH),
            iops,
        );
    }
    out
}
