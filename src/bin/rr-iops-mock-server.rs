use anyhow::Result;
use clap::Parser;
use rr_iops::common::logging::init_tracing;
use rr_iops::mock::{start_server, Args};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("rr_iops=info,tower_http=debug");
    let args = Args::parse();
    start_server(args).await
}
