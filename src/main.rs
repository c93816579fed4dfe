// MarketLens - command line entry point

use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use marketlens::cli::{Cli, Commands, InputCommands};
use marketlens::models::{AnalysisResult, AnalysisState, FeatureInfo, ProviderSecrets};
use marketlens::server;
use marketlens::state::AppState;
use marketlens_core::Feature;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("marketlens=info".parse()?))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Commands::Features { json } = cli.command {
        return list_features(json);
    }

    let state = Arc::new(AppState::new(ProviderSecrets::from_env()));
    state.initialize().await?;

    let result = match cli.command {
        Commands::Serve { addr } => serve(state.clone(), addr).await,
        Commands::Analyze {
            feature,
            refresh,
            json,
        } => analyze(&state, &feature, refresh, json).await,
        Commands::Input(InputCommands::Get) => {
            let dashboard = state.dashboard().await?;
            println!("{}", dashboard.stored_input().read());
            Ok(())
        }
        Commands::Input(InputCommands::Set { value }) => {
            let dashboard = state.dashboard().await?;
            dashboard.set_input(&value)?;
            tracing::info!("Stored input updated");
            Ok(())
        }
        Commands::Features { .. } => Ok(()),
    };

    state.shutdown().await;
    result
}

async fn serve(state: Arc<AppState>, addr: Option<String>) -> Result<()> {
    let addr = match addr {
        Some(addr) => addr,
        None => state.get_config().await?.bind_addr,
    };

    server::serve(state, &addr, async {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutting down");
        }
    })
    .await?;
    Ok(())
}

async fn analyze(state: &AppState, slug: &str, refresh: bool, json: bool) -> Result<()> {
    let feature = Feature::from_str(slug)?;
    let dashboard = state.dashboard().await?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    let signal = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let (outcome, analysis) = dashboard.analyze(feature, refresh, cancel).await;
    signal.abort();
    tracing::debug!(?outcome, "Analysis finished");

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    match analysis {
        AnalysisState::Success { result, .. } => match result {
            AnalysisResult::Text(text) => println!("{}", text),
            AnalysisResult::Json(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        },
        AnalysisState::Failure { message, .. } => anyhow::bail!(message),
        AnalysisState::Idle => {
            if dashboard.stored_input().read().trim().is_empty() {
                anyhow::bail!("No stored input. Set one with `marketlens input set <text>`");
            }
            eprintln!("Analysis cancelled");
        }
        AnalysisState::Loading { .. } => eprintln!("Analysis still in progress"),
    }
    Ok(())
}

fn list_features(json: bool) -> Result<()> {
    let features: Vec<FeatureInfo> = Feature::ALL.into_iter().map(FeatureInfo::from).collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&features)?);
        return Ok(());
    }
    for info in features {
        println!("{:<18} {:<8} {}", info.slug, info.source, info.title);
    }
    Ok(())
}
