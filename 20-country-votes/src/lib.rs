//! HTTP backend that proxies the REST Countries API and records per-country
//! "curti"/"nao_curti" votes in SQLite.
//!
//! Each module focuses on a concrete responsibility:
//!
//! - [`cli`] parses the command-line and environment configuration.
//! - [`country`] holds the upstream record shape and the normalizer that
//!   turns it into the `{nome, populacao, continente}` view.
//! - [`upstream`] defines the [`upstream::CountrySource`] seam plus the
//!   reqwest-backed REST Countries client.
//! - [`store`] persists individual votes and answers tally queries.
//! - [`service`] orchestrates fetching, sorting, and merging in vote tallies.
//! - [`routes`] wires the service into an axum [`axum::Router`].
//! - [`error`] is the closed set of failures and their HTTP mapping.
//!
//! Integration tests drive the router with stub country sources and an
//! in-memory vote store.

pub mod cli;
pub mod country;
pub mod error;
pub mod routes;
pub mod service;
pub mod store;
pub mod upstream;
