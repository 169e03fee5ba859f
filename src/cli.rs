use clap::{Parser, Subcommand};
use std::net::SocketAddr;

#[derive(Parser, Debug)]
#[command(name = "fetchbox")]
#[command(about = "Job-ingestion pipeline: gateway, scraper, and loader", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP trigger/read API and status push-channel.
    Gateway(GatewayArgs),

    /// Run the scraper worker, consuming `job_requested` events.
    Scraper,

    /// Run the loader worker, consuming `loading_requested` events.
    Loader,
}

#[derive(clap::Args, Debug)]
pub struct GatewayArgs {
    /// Address to bind the HTTP server to. Overrides `server.bind_addr` from config.
    #[arg(long)]
    pub address: Option<SocketAddr>,
}
