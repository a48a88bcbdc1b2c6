use std::future::Future;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    country::NormalizedCountry,
    error::ApiError,
    service::{CountryWithVotes, QueryService, VoteReceipt, VoteRequest},
};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub nome: String,
}

pub fn router(service: QueryService) -> Router {
    Router::new()
        .route("/paises/top10", get(top10_handler))
        .route("/paises/buscar", get(search_handler))
        .route("/paises/avaliar", post(vote_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Serves the router on `listener` until `shutdown` resolves.
pub async fn serve_until<F>(
    listener: TcpListener,
    service: QueryService,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("server stopped");
    Ok(())
}

async fn top10_handler(
    State(service): State<QueryService>,
) -> Result<Json<Vec<NormalizedCountry>>, ApiError> {
    Ok(Json(service.top10().await?))
}

async fn search_handler(
    State(service): State<QueryService>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<CountryWithVotes>, ApiError> {
    let Query(params) = params.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    Ok(Json(service.lookup(&params.nome).await?))
}

async fn vote_handler(
    State(service): State<QueryService>,
    payload: Result<Json<VoteRequest>, JsonRejection>,
) -> Result<Json<VoteReceipt>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    Ok(Json(service.submit_vote(request).await?))
}
