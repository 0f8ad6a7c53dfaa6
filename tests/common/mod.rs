use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use portfolio_api::assets::{AssetStore, StoredAsset};
use portfolio_api::auth::password;
use portfolio_api::config::Config;
use portfolio_api::db;
use portfolio_api::email::QuoteNotifier;
use portfolio_api::models::Quote;
use portfolio_api::rate_limit::{LoginRateLimiter, SubmissionRateLimiter};
use portfolio_api::state::AppState;
use portfolio_api::upload::UploadedFile;

pub const ADMIN_EMAIL: &str = "admin@test.com";
pub const ADMIN_PASSWORD: &str = "password123";

/// In-memory asset store. Files whose name contains "broken" are rejected.
#[derive(Default)]
pub struct FakeStore {
    pub uploaded: Mutex<Vec<String>>,
    pub deleted: Mutex<Vec<String>>,
}

#[async_trait]
impl AssetStore for FakeStore {
    async fn upload(&self, key: &str, file: &UploadedFile) -> Result<StoredAsset, String> {
        if file.file_name.contains("broken") {
            return Err("rejected by fake store".to_string());
        }
        let public_id = format!("test/{key}");
        self.uploaded.lock().unwrap().push(public_id.clone());
        Ok(StoredAsset {
            url: format!("https://cdn.test/{public_id}"),
            public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<(), String> {
        self.deleted.lock().unwrap().push(public_id.to_string());
        Ok(())
    }
}

/// Records every quote it is asked to announce, or fails when `fail` is set.
#[derive(Default)]
pub struct FakeNotifier {
    pub fail: bool,
    pub sent: Mutex<Vec<Uuid>>,
}

#[async_trait]
impl QuoteNotifier for FakeNotifier {
    async fn notify_quote(&self, quote: &Quote) -> Result<(), String> {
        if self.fail {
            return Err("smtp unavailable".to_string());
        }
        self.sent.lock().unwrap().push(quote.id);
        Ok(())
    }
}

/// A running test server instance with a dedicated test database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: PgPool,
    pub client: Client,
    pub db_name: String,
    pub store: Arc<FakeStore>,
    pub notifier: Arc<FakeNotifier>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Login and return the response body + status.
    pub async fn login(&self, email: &str, password: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("login request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Login as the seeded admin, return the bearer token.
    pub async fn token(&self) -> String {
        let (body, status) = self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
        assert_eq!(status, StatusCode::OK, "admin login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Create a project from JSON, return the project JSON.
    pub async fn create_project(&self, token: &str, title: &str, category: &str) -> Value {
        let (body, status) = self
            .post_auth("/api/projects", token, &project_body(title, category))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create project failed: {body}");
        body["project"].clone()
    }

    /// Make an unauthenticated GET request.
    pub async fn get(&self, path: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an unauthenticated POST request with JSON body.
    pub async fn post(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an authenticated GET request.
    pub async fn get_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an authenticated POST request with JSON body.
    pub async fn post_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an authenticated PUT request with JSON body.
    pub async fn put_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("put request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an authenticated DELETE request.
    pub async fn delete_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("delete request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Send a multipart form to a project route.
    pub async fn send_multipart(
        &self,
        method: reqwest::Method,
        path: &str,
        token: &str,
        form: Form,
    ) -> (Value, StatusCode) {
        let resp = self
            .client
            .request(method, self.url(path))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .expect("multipart request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn project_count(&self) -> i64 {
        db::projects::count(&self.pool, &Default::default())
            .await
            .unwrap()
    }
}

pub fn project_body(title: &str, category: &str) -> Value {
    json!({
        "title": title,
        "location": "Lisbon",
        "category": category,
        "description": "Bright open-plan living space with oak floors.",
        "images": ["https://images.test/a.jpg"],
    })
}

/// Project text fields as a multipart form, ready for `image` parts.
pub fn project_form(title: &str) -> Form {
    Form::new()
        .text("title", title.to_string())
        .text("location", "Porto")
        .text("category", "Residential")
        .text("description", "A calm bedroom suite finished in natural linen.")
}

pub fn image(name: &str, len: usize) -> Part {
    Part::bytes(vec![0xAB; len])
        .file_name(name.to_string())
        .mime_str("image/jpeg")
        .unwrap()
}

pub fn quote_body(email: &str) -> Value {
    json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": email,
        "phone": "+351 912 345 678",
        "location": "Lisbon",
        "projectType": "Kitchen",
        "budget": "10k-25k",
        "timeline": "3 months",
        "description": "Full kitchen remodel with a central island.",
        "hasPlans": true,
    })
}

/// Spawn a test app with a fresh temporary database.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(FakeNotifier::default()).await
}

pub async fn spawn_app_with(notifier: FakeNotifier) -> TestApp {
    let _ = dotenvy::dotenv();

    let base_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    // Create a unique test database
    let db_name = format!("portfolio_test_{}", Uuid::now_v7().to_string().replace('-', ""));

    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let pw_hash = password::hash(ADMIN_PASSWORD).unwrap();
    db::admins::create(&pool, ADMIN_EMAIL, &pw_hash, "Admin", "admin")
        .await
        .expect("Failed to seed admin");

    let config = Config {
        database_url: test_url,
        jwt_secret: "test-jwt-secret-that-is-long-enough".to_string(),
        jwt_ttl: chrono::Duration::hours(1),
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        max_body_size: 57_671_680,
        log_level: "warn".to_string(),
        upload_delay: Duration::ZERO,
        notify_email: "operator@test.com".to_string(),
        smtp: None,
        cloudinary: None,
        bootstrap_admin: None,
    };

    let store = Arc::new(FakeStore::default());
    let notifier = Arc::new(notifier);

    let state = Arc::new(AppState {
        pool: pool.clone(),
        config,
        assets: Some(store.clone() as Arc<dyn AssetStore>),
        notifier: Some(notifier.clone() as Arc<dyn QuoteNotifier>),
        submission_limiter: SubmissionRateLimiter::default(),
        login_limiter: LoginRateLimiter::new(),
    });

    let app = portfolio_api::build_app(state);

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        pool,
        client,
        db_name,
        store,
        notifier,
    }
}

/// Drop the test database after tests complete.
pub async fn cleanup(app: TestApp) {
    let db_name = app.db_name.clone();
    app.pool.close().await;

    let base_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
