//! Exercises the REST Countries client against a local stand-in server.

use std::{net::SocketAddr, time::Duration};

use anyhow::Result;
use axum::{
    extract::{Path, RawQuery},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use country_votes::{
    error::ApiError,
    upstream::{CountryQuery, CountrySource, RestCountries},
};
use serde_json::json;
use tokio::{
    net::TcpListener,
    sync::oneshot,
    task::JoinHandle,
    time::{sleep, Instant},
};

const CLIENT_TIMEOUT: Duration = Duration::from_millis(500);

struct StubServer {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl StubServer {
    async fn start() -> Result<Self> {
        let app = Router::new()
            .route("/v3.1/all", get(all_handler))
            .route("/v3.1/name/:name", get(name_handler));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Ok(Self {
            addr,
            shutdown,
            task,
        })
    }

    fn client(&self) -> Result<RestCountries> {
        Ok(RestCountries::new(&format!("http://{}/v3.1", self.addr), CLIENT_TIMEOUT)?)
    }

    async fn stop(self) {
        let _ = self.shutdown.send(());
        let _ = self.task.await;
    }
}

async fn all_handler(RawQuery(query): RawQuery) -> impl IntoResponse {
    if query.as_deref() != Some("fields=name%2Cpopulation%2Cregion") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"status": 400, "message": "fields required"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!([
            {
                "name": {"common": "Norway", "official": "Kingdom of Norway"},
                "population": 5379475,
                "region": "Europe"
            },
            {"name": {"common": "Tuvalu"}, "region": "Oceania"},
        ])),
    )
}

async fn name_handler(Path(name): Path<String>) -> impl IntoResponse {
    match name.as_str() {
        "new zealand" => (
            StatusCode::OK,
            Json(json!([
                {"name": {"common": "New Zealand"}, "population": 5084300, "region": "Oceania"}
            ])),
        ),
        "empty" => (StatusCode::OK, Json(json!([]))),
        "slow" => {
            sleep(Duration::from_secs(5)).await;
            (StatusCode::OK, Json(json!([])))
        }
        "teapot" => (
            StatusCode::IM_A_TEAPOT,
            Json(json!({"status": 418, "message": "I'm a teapot"})),
        ),
        "garbage" => (StatusCode::OK, Json(json!("not a country list"))),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({"status": 404, "message": "Not Found"})),
        ),
    }
}

#[tokio::test]
async fn fetches_full_list_with_field_filter() -> Result<()> {
    let server = StubServer::start().await?;
    let client = server.client()?;

    let countries = client.fetch(&CountryQuery::All).await?;

    assert_eq!(countries.len(), 2);
    assert_eq!(countries[0].population, Some(5_379_475));
    assert_eq!(countries[1].population, None);
    assert_eq!(countries[1].region.as_deref(), Some("Oceania"));

    server.stop().await;
    Ok(())
}

#[tokio::test]
async fn name_lookup_encodes_spaces() -> Result<()> {
    let server = StubServer::start().await?;
    let client = server.client()?;

    let countries = client
        .fetch(&CountryQuery::Name("new zealand".into()))
        .await?;

    assert_eq!(countries.len(), 1);
    assert_eq!(
        countries[0].name.as_ref().and_then(|n| n.common.as_deref()),
        Some("New Zealand")
    );

    server.stop().await;
    Ok(())
}

#[tokio::test]
async fn status_objects_map_to_typed_errors() -> Result<()> {
    let server = StubServer::start().await?;
    let client = server.client()?;

    let missing = client.fetch(&CountryQuery::Name("atlantis".into())).await;
    assert!(matches!(missing, Err(ApiError::NotFound)));

    let teapot = client.fetch(&CountryQuery::Name("teapot".into())).await;
    assert!(matches!(teapot, Err(ApiError::Upstream(msg)) if msg.contains("418")));

    let garbage = client.fetch(&CountryQuery::Name("garbage".into())).await;
    assert!(matches!(garbage, Err(ApiError::Upstream(_))));

    let empty = client.fetch(&CountryQuery::Name("empty".into())).await?;
    assert!(empty.is_empty());

    server.stop().await;
    Ok(())
}

#[tokio::test]
async fn unreachable_upstream_is_an_upstream_error() -> Result<()> {
    // Bind and drop to get a port nothing is listening on.
    let addr = TcpListener::bind("127.0.0.1:0").await?.local_addr()?;
    let client = RestCountries::new(&format!("http://{addr}/v3.1"), CLIENT_TIMEOUT)?;

    let result = client.fetch(&CountryQuery::All).await;

    assert!(matches!(result, Err(ApiError::Upstream(_))));
    Ok(())
}

#[tokio::test]
async fn slow_upstream_times_out_as_upstream_error() -> Result<()> {
    let server = StubServer::start().await?;
    let client = server.client()?;

    let started = Instant::now();
    let result = client.fetch(&CountryQuery::Name("slow".into())).await;
    let elapsed = started.elapsed();

    assert!(matches!(result, Err(ApiError::Upstream(_))), "got {result:?}");
    assert!(elapsed >= CLIENT_TIMEOUT, "returned after {elapsed:?}");
    assert!(elapsed < Duration::from_secs(3), "returned after {elapsed:?}");

    // The stub handler is still sleeping; don't wait for graceful shutdown.
    let _ = server.shutdown.send(());
    server.task.abort();
    Ok(())
}
