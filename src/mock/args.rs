//! Command-line argument parsing for the mock server

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

use crate::mock::constants::{DEFAULT_CLUSTER_NAME, DEFAULT_PASSWORD, DEFAULT_USERNAME};
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Mock management server for rr-iops", long_about = None)]
pub struct Args {
    #[arg(long, default_value_t = 18443, help = "Port to listen on (127.0.0.1, plain HTTP)")]
    pub port: u16,

    #[arg(long, default_value = DEFAULT_CLUSTER_NAME, help = "Name of the simulated cluster")]
    pub cluster: String,

    #[arg(long, default_value_t = 4, help = "Number of connected, powered-on hosts")]
    pub healthy_hosts: u32,

    #[arg(
        long,
        default_value_t = 1,
        help = "Number of hosts that are powered off or disconnected"
    )]
    pub unhealthy_hosts: u32,

    #[arg(long, default_value_t = 8, help = "Disk LUNs presented to every host")]
    pub luns_per_host: u32,

    #[arg(
        long,
        default_value_t = 1000,
        help = "Path-switch threshold of round-robin LUNs that need remediation"
    )]
    pub default_iops: u32,

    #[arg(long, default_value = DEFAULT_USERNAME, help = "Accepted username")]
    pub username: String,

    #[arg(long, default_value = DEFAULT_PASSWORD, help = "Accepted password")]
    pub password: String,

    #[arg(
        long,
        help = "Reject multipath updates after this many have succeeded (simulates a partial failure)"
    )]
    pub fail_updates_after: Option<usize>,
}
