#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Request, StatusCode},
};
use http_body_util::BodyExt;
use movies_api::config::AppConfig;
use movies_api::infrastructure::database::run_migrations;
use movies_api::services::storage::{FileStorageService, UploadedFile};
use movies_api::{AppState, create_app};
use sea_orm::{ConnectionTrait, Database};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;

pub const PNG_BYTES: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

/// Keeps routes in memory instead of writing files.
#[derive(Default)]
pub struct MockStorage {
    files: Mutex<HashSet<String>>,
}

impl MockStorage {
    pub fn stored(&self) -> Vec<String> {
        self.files.lock().unwrap().iter().cloned().collect()
    }

    pub fn contains(&self, route: &str) -> bool {
        self.files.lock().unwrap().contains(route)
    }
}

#[async_trait]
impl FileStorageService for MockStorage {
    async fn save_file(&self, container: &str, file: &UploadedFile) -> anyhow::Result<String> {
        let route = format!("mock://{}/{}.{}", container, Uuid::new_v4(), file.extension()?);
        self.files.lock().unwrap().insert(route.clone());
        Ok(route)
    }

    async fn delete_file(&self, file_route: Option<&str>, _container: &str) -> anyhow::Result<()> {
        if let Some(route) = file_route {
            self.files.lock().unwrap().remove(route);
        }
        Ok(())
    }
}

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub storage: Arc<MockStorage>,
}

pub async fn setup() -> TestApp {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    run_migrations(&db).await.unwrap();

    let storage = Arc::new(MockStorage::default());
    let state = AppState::new(db, storage.clone(), AppConfig::development());
    let app = create_app(state.clone());

    TestApp {
        app,
        state,
        storage,
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or_else(|e| {
            panic!(
                "invalid JSON ({}): {}",
                e,
                String::from_utf8_lossy(&self.body)
            )
        })
    }

    pub fn total_records(&self) -> u64 {
        self.headers
            .get("totalAmountOfRecords")
            .unwrap()
            .to_str()
            .unwrap()
            .parse()
            .unwrap()
    }
}

pub enum Payload {
    Empty,
    Json(Value),
    Multipart(MultipartBody),
}

impl TestApp {
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        payload: Payload,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }

        let request = match payload {
            Payload::Empty => builder.body(Body::empty()).unwrap(),
            Payload::Json(value) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(value.to_string()))
                .unwrap(),
            Payload::Multipart(form) => builder
                .header("Content-Type", form.content_type())
                .body(Body::from(form.finish()))
                .unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Runs raw SQL against the test database.
    pub async fn execute(&self, sql: &str) {
        self.state.db.execute_unprepared(sql).await.unwrap();
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send("GET", uri, token, Payload::Empty).await
    }

    pub async fn post_json(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send("POST", uri, token, Payload::Json(body)).await
    }

    /// Registers a user through the API and returns their token.
    pub async fn register(&self, email: &str) -> String {
        let response = self
            .post_json(
                "/api/accounts/create",
                None,
                serde_json::json!({ "email": email, "password": "Passw0rd!" }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.json()["token"].as_str().unwrap().to_string()
    }

    pub async fn user_id(&self, email: &str) -> String {
        self.state
            .identity
            .find_by_email(email)
            .await
            .unwrap()
            .unwrap()
            .id
    }

    /// Registers a user, grants the admin role and logs in again.
    pub async fn admin_token(&self) -> String {
        let email = "admin@movies.test";
        self.register(email).await;
        let id = self.user_id(email).await;
        assert!(self.state.identity.set_admin(&id, true).await.unwrap());

        let response = self
            .post_json(
                "/api/accounts/login",
                None,
                serde_json::json!({ "email": email, "password": "Passw0rd!" }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        response.json()["token"].as_str().unwrap().to_string()
    }

    pub async fn create_genre(&self, token: &str, name: &str) -> i64 {
        let response = self
            .post_json(
                "/api/genres",
                Some(token),
                serde_json::json!({ "name": name }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.json().as_i64().unwrap()
    }

    pub async fn create_theater(&self, token: &str, name: &str) -> i64 {
        let response = self
            .post_json(
                "/api/movietheaters",
                Some(token),
                serde_json::json!({ "name": name, "latitude": 18.47, "longitude": -69.9 }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.json().as_i64().unwrap()
    }

    pub async fn create_actor(&self, token: &str, name: &str) -> i64 {
        let form = MultipartBody::new().text("name", name);
        let response = self
            .send("POST", "/api/actors", Some(token), Payload::Multipart(form))
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.json().as_i64().unwrap()
    }

    /// Creates a movie from the given extra form fields on top of a title
    /// and release date.
    pub async fn create_movie(
        &self,
        token: &str,
        title: &str,
        release_date: &str,
        form: MultipartBody,
    ) -> i64 {
        let form = form.text("title", title).text("releaseDate", release_date);
        let response = self
            .send("POST", "/api/movies", Some(token), Payload::Multipart(form))
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "{}",
            String::from_utf8_lossy(&response.body)
        );
        response.json().as_i64().unwrap()
    }
}

const BOUNDARY: &str = "----movies-api-test-boundary";

#[derive(Default)]
pub struct MultipartBody {
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={BOUNDARY}")
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}
