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

use std::time::Duration;

use clap::Parser;
use rr_iops::cli::Cli;
use rr_iops::common::config::{Endpoint, WorkflowConfig};
use rr_iops::common::logging::{filter_for_verbosity, init_tracing};
use rr_iops::network::{RestManagementClient, TcpProbe};
use rr_iops::prompt;
use rr_iops::report::FileReportSink;
use rr_iops::workflow::{RunSummary, Workflow};
use rr_iops::Result;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(filter_for_verbosity(cli.verbose));

    let started = chrono::Local::now();
    tracing::info!(started = %started.format("%Y-%m-%d %H:%M:%S"), "rr-iops starting");

    let code = match run(cli).await {
        Ok(summary) => {
            println!();
            println!("{}", summary.summary_line());
            0
        }
        Err(e) => {
            eprintln!("Error: {e}");
            e.exit_code()
        }
    };

    let elapsed = chrono::Local::now() - started;
    tracing::info!(
        elapsed_ms = elapsed.num_milliseconds(),
        exit_code = code,
        "rr-iops finished"
    );
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<RunSummary> {
    let endpoint = Endpoint::parse(&cli.server, cli.port)?;
    let cluster_name = match cli.cluster {
        Some(name) => name,
        None => prompt::cluster_name()?,
    };
    let credentials = prompt::credentials(cli.user, &endpoint)?;

    let config = WorkflowConfig::new(endpoint, cluster_name, credentials)
        .output_dir(cli.output_dir)
        .dry_run(cli.dry_run)
        .accept_invalid_certs(cli.insecure)
        .probe_timeout(Duration::from_secs(cli.probe_timeout));
    if config.accept_invalid_certs {
        tracing::warn!("Server certificate validation is disabled");
    }

    let client = RestManagementClient::new(config.accept_invalid_certs)?;
    let probe = TcpProbe;
    let mut sink = FileReportSink::new(config.output_dir.clone()).with_echo(true);

    let mut workflow = Workflow::new(&client, &probe, config);
    if !cli.yes {
        workflow = workflow.with_confirmation(prompt::confirm_remediation);
    }
    workflow.run(&mut sink).await
}
