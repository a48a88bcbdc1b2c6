use serde::{Deserialize, Serialize};

/// One record as returned by the REST Countries API.
///
/// Every field is optional; anything else the upstream sends is ignored.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct RawCountry {
    pub name: Option<RawName>,
    pub population: Option<u64>,
    pub region: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct RawName {
    pub common: Option<String>,
}

impl RawCountry {
    pub fn population(&self) -> u64 {
        self.population.unwrap_or(0)
    }
}

/// The standard shape handed back to callers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizedCountry {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "populacao")]
    pub population: u64,
    #[serde(rename = "continente")]
    pub continent: String,
}

/// Reshapes an upstream record. Missing fields fall back to `""` or `0`.
pub fn normalize(raw: &RawCountry) -> NormalizedCountry {
    NormalizedCountry {
        name: raw
            .name
            .as_ref()
            .and_then(|name| name.common.clone())
            .unwrap_or_default(),
        population: raw.population(),
        continent: raw.region.clone().unwrap_or_default(),
    }
}
