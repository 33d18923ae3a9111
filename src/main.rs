//! docdb-frontdoor
//!
//! HTTP front door of a document database server node.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!                 │                     FRONT DOOR                       │
//!                 │                                                      │
//!   Request       │  ┌────────┐   ┌─────────────┐   ┌──────────────┐     │
//!   ──────────────┼─▶│  http  │──▶│   safety    │──▶│   routing    │     │
//!                 │  │ server │   │    gate     │   │ (handlers)   │     │
//!                 │  └────────┘   └─────────────┘   └──────┬───────┘     │
//!                 │                                        │ Fault       │
//!                 │                                        ▼             │
//!   Response      │  ┌────────┐   ┌─────────────┐   ┌──────────────┐     │
//!   ◀─────────────┼──│response│◀──│   faults    │◀──│   dispatch   │     │
//!                 │  │ writer │   │ (classify)  │   │   pipeline   │     │
//!                 │  └────────┘   └─────────────┘   └──────┬───────┘     │
//!                 │                                        │ event       │
//!                 │                                        ▼             │
//!                 │                                ┌──────────────┐      │
//!                 │   admin listener ◀─ websocket ─│traffic_watch │      │
//!                 │                                └──────────────┘      │
//!                 └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use docdb_frontdoor::lifecycle::startup;

#[derive(Parser)]
#[command(name = "docdb-frontdoor")]
#[command(about = "HTTP front door of a document database node", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = startup::load(args.config.as_deref())?;
    startup::run(config, args.config).await?;

    Ok(())
}
