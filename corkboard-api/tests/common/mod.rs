/// Common test utilities for integration tests
///
/// Provides shared infrastructure:
/// - Test database setup (migrations run on connect)
/// - Test user creation and JWT token generation
/// - Request helpers driving the router directly
///
/// Integration tests need a running PostgreSQL instance; when
/// `DATABASE_URL` is not set, `TestContext::new()` returns `None` and the
/// test skips itself.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use corkboard_api::app::{build_router, AppState};
use corkboard_api::config::{ApiConfig, CacheConfig, Config, DatabaseConfig, JwtConfig};
use corkboard_shared::auth::jwt::{create_token, Claims, TokenType};
use corkboard_shared::models::user::{CreateUser, User};
use sqlx::PgPool;
use tower::ServiceExt as _;
use uuid::Uuid;

const TEST_JWT_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub user: User,
    pub jwt_token: String,
}

impl TestContext {
    /// Creates a new test context with a fresh user
    ///
    /// Returns `None` (and prints a notice) when `DATABASE_URL` is not set,
    /// so tests can skip gracefully on machines without a database.
    pub async fn new() -> Option<Self> {
        let database_url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                eprintln!("DATABASE_URL not set; skipping integration test");
                return None;
            }
        };

        let db = PgPool::connect(&database_url)
            .await
            .expect("Failed to connect to test database");

        // Path relative to the corkboard-api crate root
        sqlx::migrate!("../migrations")
            .run(&db)
            .await
            .expect("Failed to run migrations");

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: 5,
            },
            jwt: JwtConfig {
                secret: TEST_JWT_SECRET.to_string(),
            },
            cache: CacheConfig { ttl_seconds: 60 },
        };

        let state = AppState::new(db.clone(), config);
        let app = build_router(state);

        let user = Self::create_user(&db).await;
        let jwt_token = Self::token_for(&user);

        Some(Self {
            db,
            app,
            user,
            jwt_token,
        })
    }

    /// Creates an additional user, e.g. to test cross-owner rejection
    pub async fn create_user(db: &PgPool) -> User {
        User::create(
            db,
            CreateUser {
                email: format!("test-{}@example.com", Uuid::new_v4()),
                // Tests authenticate with minted tokens, not passwords
                password_hash: "$argon2id$unused".to_string(),
                name: Some("Test User".to_string()),
            },
        )
        .await
        .expect("Failed to create test user")
    }

    /// Mints an access token for a user
    pub fn token_for(user: &User) -> String {
        let claims = Claims::new(user.id, TokenType::Access);
        create_token(&claims, TEST_JWT_SECRET).expect("Failed to create test token")
    }

    /// Authorization header value for the context's user
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Sends a request with the given bearer token and parses the JSON body
    ///
    /// Returns the status and the body (JSON null for empty bodies).
    pub async fn request_as(
        &self,
        token: &str,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", format!("Bearer {}", token));

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Request should not fail at the transport level");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        (status, json)
    }

    /// Sends a request as the context's user
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        self.request_as(&self.jwt_token, method, uri, body).await
    }

    /// Removes the test user and, via cascade, everything the test created
    pub async fn cleanup(self) {
        let _ = User::delete(&self.db, self.user.id).await;
    }
}
