//! Access to the external country-data API.
//!
//! The service only ever talks to a [`CountrySource`], so tests can swap the
//! live REST Countries client for a stub.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use crate::{country::RawCountry, error::ApiError};

pub const DEFAULT_BASE_URL: &str = "https://restcountries.com/v3.1";

/// Only the fields the normalizer reads are requested.
const FIELDS: &str = "name,population,region";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountryQuery {
    All,
    /// Countries whose name contains the fragment.
    Name(String),
}

/// Fetches country records. Implementations report "no such country" as
/// [`ApiError::NotFound`] and every other failure as [`ApiError::Upstream`].
#[async_trait]
pub trait CountrySource: Send + Sync {
    async fn fetch(&self, query: &CountryQuery) -> Result<Vec<RawCountry>, ApiError>;
}

/// The upstream answers either with a list of countries or with a status
/// object such as `{"status": 404, "message": "Not Found"}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Payload {
    Countries(Vec<RawCountry>),
    Status {
        status: u16,
        #[serde(default)]
        message: Option<String>,
    },
}

/// REST Countries v3.1 over HTTPS.
#[derive(Debug, Clone)]
pub struct RestCountries {
    client: Client,
    base_url: Url,
}

impl RestCountries {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url).map_err(|err| {
            ApiError::Upstream(format!("invalid countries url '{base_url}': {err}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Upstream(format!(
                "countries url '{base_url}' cannot be used as a base"
            )));
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn url_for(&self, query: &CountryQuery) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            match query {
                CountryQuery::All => {
                    segments.push("all");
                }
                CountryQuery::Name(name) => {
                    segments.push("name").push(name);
                }
            }
        }
        url.query_pairs_mut().append_pair("fields", FIELDS);
        url
    }
}

#[async_trait]
impl CountrySource for RestCountries {
    async fn fetch(&self, query: &CountryQuery) -> Result<Vec<RawCountry>, ApiError> {
        // URL path handling drops `.` and `..` segments, so such a name would
        // turn into a request for the wrong resource.
        if let CountryQuery::Name(name) = query {
            if is_dot_segment(name) {
                return Err(ApiError::NotFound);
            }
        }

        let url = self.url_for(query);
        debug!(%url, "fetching countries");

        // The status object arrives with a non-2xx code, so the body is
        // decoded regardless of the HTTP status.
        let response = self.client.get(url).send().await?;
        let http_status = response.status();
        let body = response.bytes().await?;

        match serde_json::from_slice::<Payload>(&body) {
            Ok(Payload::Countries(countries)) => Ok(countries),
            Ok(Payload::Status { status: 404, .. }) => Err(ApiError::NotFound),
            Ok(Payload::Status { status, message }) => Err(ApiError::Upstream(format!(
                "countries api returned status {status}: {}",
                message.unwrap_or_default()
            ))),
            Err(err) => Err(ApiError::Upstream(format!(
                "malformed countries api response ({http_status}): {err}"
            ))),
        }
    }
}

fn is_dot_segment(name: &str) -> bool {
    matches!(name, "." | "..")
}
