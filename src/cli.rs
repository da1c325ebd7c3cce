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

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::common::config::AppConfig;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Management server address (hostname, FQDN or URL).
    pub server: String,
    /// Port used when the server address does not name one.
    #[arg(short, long, default_value_t = AppConfig::DEFAULT_PORT)]
    pub port: u16,
    /// Cluster to remediate. Prompted for when omitted.
    #[arg(short, long)]
    pub cluster: Option<String>,
    /// Username. Prompted for when omitted. The password is always prompted
    /// unless RR_IOPS_PASSWORD is set.
    #[arg(short, long)]
    pub user: Option<String>,
    /// Directory the JSON reports are written to.
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,
    /// Accept self-signed or otherwise invalid server certificates.
    #[arg(long)]
    pub insecure: bool,
    /// Report only; change nothing.
    #[arg(long)]
    pub dry_run: bool,
    /// Remediate without asking for confirmation.
    #[arg(short, long)]
    pub yes: bool,
    /// Seconds to wait for the TCP reachability probe.
    #[arg(long, default_value_t = AppConfig::PROBE_TIMEOUT_SECS)]
    pub probe_timeout: u64,
    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
