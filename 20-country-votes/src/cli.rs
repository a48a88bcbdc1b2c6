use std::net::SocketAddr;

use clap::Parser;

use crate::upstream::DEFAULT_BASE_URL;

/// Country lookups backed by REST Countries, plus per-country votes.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Socket address the HTTP server binds to. Use port 0 for an ephemeral port.
    #[arg(long, env = "COUNTRY_VOTES_LISTEN", default_value = "0.0.0.0:8000")]
    pub listen: SocketAddr,

    /// SQLite database holding the votes; created on startup if missing.
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://avaliacoes.db")]
    pub database_url: String,

    /// Base URL of the REST Countries v3.1 API.
    #[arg(long, env = "COUNTRIES_API_URL", default_value = DEFAULT_BASE_URL)]
    pub countries_url: String,

    /// Seconds to wait for the countries API before giving up on a request.
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = 10)]
    pub upstream_timeout_secs: u64,
}
