#![allow(dead_code)]

use axum::extract::ConnectInfo;
use axum_test::TestServer;
use redirect_manager::application::services::hash_token;
use redirect_manager::infrastructure::cache::NullTableCache;
use redirect_manager::routes::app_router;
use redirect_manager::state::AppState;
use sqlx::PgPool;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::Layer;

pub const TEST_SECRET: &str = "test-signing-secret";
pub const ADMIN_TOKEN: &str = "admin-token";

pub fn create_test_state(pool: PgPool) -> AppState {
    AppState::new(
        Arc::new(pool),
        Arc::new(NullTableCache::new()),
        TEST_SECRET.to_string(),
        0,
    )
}

/// Full application router with a fixed peer address for the rate limiter.
pub fn test_server(state: AppState) -> TestServer {
    let app = app_router(state, false).layer(MockConnectInfoLayer);
    TestServer::new(app).unwrap()
}

/// Creates a state and server and seeds a token with `MANAGE_REDIRECTS`.
pub async fn admin_server(pool: &PgPool) -> (AppState, TestServer) {
    create_token(pool, "admin", ADMIN_TOKEN, &["MANAGE_REDIRECTS"]).await;
    let state = create_test_state(pool.clone());
    let server = test_server(state.clone());
    (state, server)
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

pub async fn create_token(pool: &PgPool, name: &str, raw_token: &str, permissions: &[&str]) -> i64 {
    let permissions: Vec<String> = permissions.iter().map(|p| p.to_string()).collect();

    sqlx::query_scalar(
        "INSERT INTO api_tokens (name, token_hash, permissions) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(name)
    .bind(hash_token(TEST_SECRET, raw_token))
    .bind(&permissions)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_node(pool: &PgPool, relative_link: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO content_nodes (relative_link) VALUES ($1) RETURNING id")
        .bind(relative_link)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn delete_node(pool: &PgPool, id: i64) {
    sqlx::query("UPDATE content_nodes SET deleted_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn move_node(pool: &PgPool, id: i64, relative_link: &str) {
    sqlx::query("UPDATE content_nodes SET relative_link = $2 WHERE id = $1")
        .bind(id)
        .bind(relative_link)
        .execute(pool)
        .await
        .unwrap();
}

/// Inserts a rule directly, bypassing validation.
pub async fn create_rule(
    pool: &PgPool,
    from_path: &str,
    from_node_id: Option<i64>,
    to_path: &str,
    to_node_id: Option<i64>,
    redirect_type: &str,
) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO redirect_rules (from_path, from_node_id, to_path, to_node_id, redirect_type)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(from_path)
    .bind(from_node_id)
    .bind(to_path)
    .bind(to_node_id)
    .bind(redirect_type)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn count_rules(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM redirect_rules")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}

