//! Vote persistence.
//!
//! Every vote is its own row in the `avaliacoes` table; tallies are
//! `COUNT(*)` queries computed on every read, so there are no counters to
//! keep in sync. Rows are never updated or deleted.

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use tracing::{debug, info};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS avaliacoes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    pais TEXT NOT NULL,
    tipo_avaliacao TEXT NOT NULL
)";

const CREATE_INDEX: &str = "CREATE INDEX IF NOT EXISTS ix_avaliacoes_pais ON avaliacoes (pais)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteKind {
    Like,
    Dislike,
}

impl VoteKind {
    /// Tag used on the wire and in the `tipo_avaliacao` column.
    pub fn as_str(self) -> &'static str {
        match self {
            VoteKind::Like => "curti",
            VoteKind::Dislike => "nao_curti",
        }
    }
}

impl fmt::Display for VoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVoteKind(pub String);

impl fmt::Display for UnknownVoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown vote kind '{}'", self.0)
    }
}

impl std::error::Error for UnknownVoteKind {}

impl FromStr for VoteKind {
    type Err = UnknownVoteKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "curti" => Ok(VoteKind::Like),
            "nao_curti" => Ok(VoteKind::Dislike),
            other => Err(UnknownVoteKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    pub id: i64,
    pub country: String,
    pub kind: VoteKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    #[serde(rename = "curti")]
    pub likes: u64,
    #[serde(rename = "nao_curti")]
    pub dislikes: u64,
}

/// Handle to the vote table. Cloning shares the underlying pool.
#[derive(Clone, Debug)]
pub struct VoteStore {
    pool: SqlitePool,
}

impl VoteStore {
    /// Opens (creating if needed) the database at `database_url` and makes
    /// sure the schema exists.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        info!(database_url, "vote store connected");
        Self::with_pool(pool).await
    }

    /// A private in-memory database.
    ///
    /// Each SQLite `:memory:` connection is its own database, so the pool is
    /// pinned to a single connection that is never recycled.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    pub async fn with_pool(pool: SqlitePool) -> Result<Self, sqlx::Error> {
        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        sqlx::query(CREATE_INDEX).execute(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn record(&self, country: &str, kind: VoteKind) -> Result<Vote, sqlx::Error> {
        let id = sqlx::query("INSERT INTO avaliacoes (pais, tipo_avaliacao) VALUES (?, ?)")
            .bind(country)
            .bind(kind.as_str())
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        debug!(id, country, %kind, "vote recorded");
        Ok(Vote {
            id,
            country: country.to_string(),
            kind,
        })
    }

    /// Number of votes of `kind` for exactly `country` (case-sensitive).
    pub async fn count(&self, country: &str, kind: VoteKind) -> Result<u64, sqlx::Error> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM avaliacoes WHERE pais = ? AND tipo_avaliacao = ?",
        )
        .bind(country)
        .bind(kind.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    pub async fn tally(&self, country: &str) -> Result<VoteTally, sqlx::Error> {
        Ok(VoteTally {
            likes: self.count(country, VoteKind::Like).await?,
            dislikes: self.count(country, VoteKind::Dislike).await?,
        })
    }
}
