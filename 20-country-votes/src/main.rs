use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};

use country_votes::{
    cli::Cli, routes, service::QueryService, store::VoteStore, upstream::RestCountries,
};

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let votes = VoteStore::connect(&cli.database_url)
        .await
        .with_context(|| format!("failed to open vote store at {}", cli.database_url))?;
    let source = RestCountries::new(
        &cli.countries_url,
        Duration::from_secs(cli.upstream_timeout_secs),
    )?;
    let service = QueryService::new(Arc::new(source), votes);

    let listener = TcpListener::bind(cli.listen)
        .await
        .with_context(|| format!("failed to bind {}", cli.listen))?;
    info!("server listening on {}", listener.local_addr()?);

    routes::serve_until(listener, service, async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = ?err, "failed to install ctrl-c handler");
        }
        info!("received ctrl-c, shutting down");
    })
    .await?;

    Ok(())
}
