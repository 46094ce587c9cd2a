#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use auth::PasswordHasher;
use auth::WorkFactor;
use auth_service::domain::credentials::models::EmailAddress;
use auth_service::domain::credentials::models::Role;
use auth_service::domain::credentials::ports::AuthServicePort;
use auth_service::domain::credentials::ports::UserStore;
use auth_service::domain::credentials::service::AuthService;
use auth_service::domain::credentials::tokens::TokenCodec;
use auth_service::inbound::http::router::create_router;
use auth_service::inbound::http::router::RouterOptions;
use auth_service::inbound::http::server::serve;
use auth_service::outbound::repositories::memory::InMemoryUserStore;
use auth_service::outbound::revocation::InMemoryRevocationIndex;
use serde_json::json;
use serde_json::Value;
use sqlx::postgres::PgConnectOptions;
use sqlx::postgres::PgPoolOptions;
use sqlx::Connection;
use sqlx::Executor;
use sqlx::PgConnection;
use sqlx::PgPool;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const PASSWORD: &str = "Secret12";

/// Test application that spawns a real server over in-memory adapters
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub store: Arc<InMemoryUserStore>,
    pub revocations: Arc<InMemoryRevocationIndex>,
    pub api_client: reqwest::Client,
}

/// Throwaway PostgreSQL database with migrations applied
pub struct TestDb {
    pub pool: PgPool,
    pub db_name: String,
    postgres_url: String,
}

/// Tokens returned by a successful login or refresh
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        Self::spawn_with_access_ttl(chrono::Duration::minutes(15)).await
    }

    pub async fn spawn_with_access_ttl(access_ttl: chrono::Duration) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let store = Arc::new(InMemoryUserStore::new());
        let revocations = Arc::new(InMemoryRevocationIndex::new());

        // Minimal Argon2 cost keeps the suite fast
        let hasher = PasswordHasher::with_work_factor(WorkFactor {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .expect("Failed to build password hasher");

        let auth_service: Arc<dyn AuthServicePort> = Arc::new(
            AuthService::new(
                Arc::clone(&store),
                Arc::clone(&revocations),
                TokenCodec::new(JWT_SECRET, access_ttl, chrono::Duration::days(7)),
                hasher,
            )
            .expect("Failed to build auth service"),
        );

        let router = create_router(
            auth_service,
            RouterOptions {
                body_timeout: Duration::from_secs(5),
                request_timeout: Duration::from_secs(5),
                allowed_origins: vec!["*".to_string()],
            },
        );

        // Spawn server in background
        tokio::spawn(serve(
            listener,
            router,
            Duration::from_secs(60),
            std::future::pending::<()>(),
        ));

        Self {
            address,
            port,
            store,
            revocations,
            api_client: reqwest::Client::new(),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(&format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(&format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Helper to make PUT request with Bearer token
    pub fn put_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .put(&format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Register a user and return the response body
    pub async fn register(&self, email: &str, username: &str) -> Value {
        let response = self
            .post("/api/v1/auth/register")
            .json(&json!({
                "email": email,
                "username": username,
                "password": PASSWORD
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        response.json().await.expect("Failed to parse response")
    }

    /// Log in with the shared test password
    pub async fn login(&self, email: &str) -> Session {
        let response = self
            .post("/api/v1/auth/login")
            .json(&json!({ "email": email, "password": PASSWORD }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: Value = response.json().await.expect("Failed to parse response");
        Session::from_body(&body)
    }

    /// Grant a registered user the admin role directly in the store
    pub async fn promote_to_admin(&self, email: &str) {
        let email = EmailAddress::new(email.to_string()).unwrap();
        let mut user = self
            .store
            .find_user_by_email(&email)
            .await
            .unwrap()
            .expect("User not found");
        user.role = Role::Admin;
        self.store.update_user(user).await.unwrap();
    }
}

impl Session {
    pub fn from_body(body: &Value) -> Self {
        Self {
            access_token: body["data"]["access_token"]
                .as_str()
                .expect("Missing access_token")
                .to_string(),
            refresh_token: body["data"]["refresh_token"]
                .as_str()
                .expect("Missing refresh_token")
                .to_string(),
        }
    }
}

impl TestDb {
    /// Create a uniquely named database on the server at `DATABASE_URL`.
    ///
    /// Returns `None` when `DATABASE_URL` is unset so the suite still runs
    /// without a database server.
    pub async fn new() -> Option<Self> {
        let Ok(postgres_url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping PostgreSQL test");
            return None;
        };

        let db_name = format!(
            "test_auth_service_{}",
            uuid::Uuid::new_v4().to_string().replace('-', "_")
        );

        let mut conn = PgConnection::connect(&postgres_url)
            .await
            .expect("Failed to connect to Postgres");

        conn.execute(format!(r#"CREATE DATABASE "{}";"#, db_name).as_str())
            .await
            .expect("Failed to create test database");

        let options = postgres_url
            .parse::<PgConnectOptions>()
            .expect("Failed to parse DATABASE_URL")
            .database(&db_name);

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .expect("Failed to connect to test database");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        Some(Self {
            pool,
            db_name,
            postgres_url,
        })
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        // Database cleanup happens asynchronously
        let db_name = self.db_name.clone();
        let postgres_url = self.postgres_url.clone();
        tokio::spawn(async move {
            if let Ok(mut conn) = PgConnection::connect(&postgres_url).await {
                let _ = conn
                    .execute(
                        format!(
                            r#"SELECT pg_terminate_backend(pid) FROM pg_stat_activity WHERE datname = '{}';"#,
                            db_name
                        )
                        .as_str(),
                    )
                    .await;

                let _ = conn
                    .execute(format!(r#"DROP DATABASE IF EXISTS "{}";"#, db_name).as_str())
                    .await;
            }
        });
    }
}
