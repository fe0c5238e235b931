//! Test helpers for integration tests
//!
//! Spawns the API on an ephemeral port with its own media directory, seeds
//! bookings, mints actor tokens and drives the job worker.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use anyhow::Result;
use booking_chat_api::{create_app, create_app_state};
use booking_chat_common::{AppConfig, JwtService};
use booking_chat_core::{Actor, Snowflake, SnowflakeGenerator};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use sqlx::PgPool;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Ids for seeded bookings and actors; distinct from the server's worker id
fn ids() -> &'static SnowflakeGenerator {
    static GEN: OnceLock<SnowflakeGenerator> = OnceLock::new();
    GEN.get_or_init(|| SnowflakeGenerator::new(1013))
}

/// A fresh id for test data
pub fn unique_id() -> Snowflake {
    ids().generate()
}

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub config: AppConfig,
    pool: PgPool,
    jwt: JwtService,
    _media: TempDir,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server
    pub async fn start() -> Result<Self> {
        Self::start_with(&[]).await
    }

    /// Start a test server with extra configuration overrides
    pub async fn start_with(overrides: &[(&str, &str)]) -> Result<Self> {
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;
        let media = TempDir::new()?;

        let mut vars: HashMap<String, String> = HashMap::from([
            ("MEDIA_ROOT".into(), media.path().display().to_string()),
            ("MEDIA_PUBLIC_BASE_URL".into(), format!("http://{addr}")),
            ("RATE_LIMIT_REQUESTS_PER_SECOND".into(), "1000".into()),
            ("RATE_LIMIT_BURST".into(), "1000".into()),
            ("JOB_POLL_INTERVAL_MS".into(), "50".into()),
        ]);
        if std::env::var("JWT_SECRET").is_err() {
            vars.insert("JWT_SECRET".into(), "integration-test-secret".into());
        }
        vars.extend(
            overrides
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string())),
        );
        let config = test_config(&vars)?;

        let state = create_app_state(config.clone()).await?;
        let app = create_app(state)?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let pool = PgPool::connect(&config.database.url).await?;
        let jwt = JwtService::new(&config.jwt.secret, config.jwt.access_token_expiry);
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            config,
            pool,
            jwt,
            _media: media,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url(), path)
        }
    }

    /// Insert a booking owned by a fresh client; returns (booking, client)
    pub async fn seed_booking(&self) -> Result<(Snowflake, Actor)> {
        let booking = unique_id();
        let client = Actor::client(unique_id());
        sqlx::query("INSERT INTO bookings (id, client_id) VALUES ($1, $2)")
            .bind(booking.into_inner())
            .bind(client.id.into_inner())
            .execute(&self.pool)
            .await?;
        Ok((booking, client))
    }

    /// Bearer token for an actor
    pub fn token(&self, actor: &Actor) -> Result<String> {
        Ok(self.jwt.issue_access_token(actor)?)
    }

    /// Make a GET request without auth (absolute URLs allowed)
    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    /// Make a GET request as `actor`
    pub async fn get_as(&self, path: &str, actor: &Actor) -> Result<Response> {
        Ok(self
            .client
            .get(self.url(path))
            .bearer_auth(self.token(actor)?)
            .send()
            .await?)
    }

    /// Make a POST request with no body as `actor`
    pub async fn post_as(&self, path: &str, actor: &Actor) -> Result<Response> {
        Ok(self
            .client
            .post(self.url(path))
            .bearer_auth(self.token(actor)?)
            .send()
            .await?)
    }

    /// Make a POST request with JSON body as `actor`
    pub async fn post_json_as<T: Serialize>(
        &self,
        path: &str,
        actor: &Actor,
        body: &T,
    ) -> Result<Response> {
        Ok(self
            .client
            .post(self.url(path))
            .bearer_auth(self.token(actor)?)
            .json(body)
            .send()
            .await?)
    }

    /// Make a PUT request with a raw body as `actor`
    pub async fn put_bytes_as(&self, path: &str, actor: &Actor, bytes: Vec<u8>) -> Result<Response> {
        Ok(self
            .client
            .put(self.url(path))
            .bearer_auth(self.token(actor)?)
            .header("Content-Type", "application/octet-stream")
            .body(bytes)
            .send()
            .await?)
    }

    /// Run the job worker until `done` holds or `limit` passes
    pub async fn run_worker_until<F, Fut>(&self, limit: Duration, mut done: F) -> Result<bool>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = bool>,
    {
        let runner = Arc::new(booking_chat_worker::create_runner(&self.config).await?);
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let worker = tokio::spawn(Arc::clone(&runner).run_until(async move {
            stop_rx.await.ok();
        }));

        let deadline = tokio::time::Instant::now() + limit;
        let mut finished = false;
        while tokio::time::Instant::now() < deadline {
            if done().await {
                finished = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        stop_tx.send(()).ok();
        worker.await?;
        Ok(finished)
    }
}

/// Configuration from the environment with `overrides` taking precedence
pub fn test_config(overrides: &HashMap<String, String>) -> Result<AppConfig> {
    AppConfig::from_lookup(|key| {
        overrides
            .get(key)
            .cloned()
            .or_else(|| std::env::var(key).ok())
    })
    .map_err(|e| anyhow::anyhow!("Config error: {e}"))
}

/// Helper to check if test environment is available
pub async fn check_test_env() -> bool {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("Skipping test: DATABASE_URL not set");
        return false;
    }

    if std::env::var("REDIS_URL").is_err() {
        eprintln!("Skipping test: REDIS_URL not set");
        return false;
    }

    true
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}
