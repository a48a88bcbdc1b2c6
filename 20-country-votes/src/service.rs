use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    country::{normalize, NormalizedCountry},
    error::ApiError,
    store::{VoteKind, VoteStore, VoteTally},
    upstream::{CountryQuery, CountrySource},
};

const TOP_LIMIT: usize = 10;
const INVALID_KIND: &str = "Avaliação deve ser 'curti' ou 'nao_curti'";
const VOTE_OK: &str = "sucesso";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryWithVotes {
    #[serde(flatten)]
    pub country: NormalizedCountry,
    #[serde(rename = "avaliacoes")]
    pub votes: VoteTally,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRequest {
    #[serde(rename = "pais")]
    pub country: String,
    /// Raw tag as sent by the caller; validated by [`QueryService::submit_vote`].
    #[serde(rename = "avaliacao")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
    #[serde(rename = "pais")]
    pub country: String,
    pub status: String,
    #[serde(rename = "avaliacoes_totais")]
    pub totals: VoteTally,
}

/// Ties the country source and the vote store together.
#[derive(Clone)]
pub struct QueryService {
    source: Arc<dyn CountrySource>,
    votes: VoteStore,
}

impl QueryService {
    pub fn new(source: Arc<dyn CountrySource>, votes: VoteStore) -> Self {
        Self { source, votes }
    }

    /// The ten most populous countries, largest first. Ties keep upstream order.
    pub async fn top10(&self) -> Result<Vec<NormalizedCountry>, ApiError> {
        let raw = match self.source.fetch(&CountryQuery::All).await {
            Ok(raw) => raw,
            Err(ApiError::NotFound) => {
                return Err(ApiError::Upstream(
                    "countries api reported no countries".to_string(),
                ))
            }
            Err(err) => return Err(err),
        };

        let mut countries: Vec<NormalizedCountry> = raw.iter().map(normalize).collect();
        countries.sort_by(|a, b| b.population.cmp(&a.population));
        countries.truncate(TOP_LIMIT);

        debug!(fetched = raw.len(), returned = countries.len(), "top countries");
        Ok(countries)
    }

    /// First upstream match for `name`, with the tally stored under its
    /// normalized name.
    pub async fn lookup(&self, name: &str) -> Result<CountryWithVotes, ApiError> {
        let raw = self
            .source
            .fetch(&CountryQuery::Name(name.to_string()))
            .await?;
        let first = raw.first().ok_or(ApiError::NotFound)?;

        let country = normalize(first);
        let votes = self.votes.tally(&country.name).await?;
        Ok(CountryWithVotes { country, votes })
    }

    /// Validates the tag, stores the vote and returns the fresh totals.
    pub async fn submit_vote(&self, request: VoteRequest) -> Result<VoteReceipt, ApiError> {
        let kind: VoteKind = request
            .kind
            .parse()
            .map_err(|_| ApiError::BadRequest(INVALID_KIND.to_string()))?;

        let vote = self.votes.record(&request.country, kind).await?;
        info!(id = vote.id, country = %vote.country, kind = %vote.kind, "vote accepted");

        let totals = self.votes.tally(&request.country).await?;
        Ok(VoteReceipt {
            country: request.country,
            status: VOTE_OK.to_string(),
            totals,
        })
    }
}
