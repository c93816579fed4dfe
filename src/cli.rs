use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "marketlens")]
#[command(about = "Cached AI market analyses for a business description", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to bind (overrides settings and MARKETLENS_ADDR)
        #[arg(long)]
        addr: Option<String>,
    },

    /// Analyse the stored input for one feature
    Analyze {
        /// Feature slug, e.g. compliance, market-trends
        feature: String,

        /// Ignore any cached result and fetch again
        #[arg(long)]
        refresh: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Read or replace the stored business input
    #[command(subcommand)]
    Input(InputCommands),

    /// List the available features
    Features {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum InputCommands {
    /// Print the stored input
    Get,

    /// Replace the stored input
    Set {
        /// The business description
        value: String,
    },
}
