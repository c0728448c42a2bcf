//! Cross-crate HTTP tests for Coach Exchange.
//!
//! The storefront and admin routers are driven in-process with
//! `tower::ServiceExt::oneshot` over shared in-memory backends, so the tests
//! need no database, object storage or network.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p coach-exchange-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use coach_exchange_admin::config::AdminConfig;
use coach_exchange_core::Email;
use coach_exchange_core::password::hash_password;
use coach_exchange_store::object::MemoryObjectStore;
use coach_exchange_store::{Backends, MemoryRecordStore, ObjectStore, RecordStore};
use coach_exchange_storefront::config::StorefrontConfig;

/// Administrator credentials used by [`Marketplace::admin_login`].
pub const ADMIN_EMAIL: &str = "owner@coaches.test";
pub const ADMIN_PASSWORD: &str = "correct horse battery";

/// Both binaries over one set of in-memory backends.
pub struct Marketplace {
    pub storefront: Router,
    pub admin: Router,
    pub records: Arc<dyn RecordStore>,
    pub objects: Arc<MemoryObjectStore>,
}

impl Marketplace {
    /// Working in-memory backends.
    pub fn new() -> Self {
        Self::with_objects(MemoryObjectStore::new())
    }

    /// Backends whose object store accepts `successes` uploads and then
    /// fails.
    pub fn with_failing_uploads(successes: usize) -> Self {
        Self::with_objects(MemoryObjectStore::failing_after(successes))
    }

    fn with_objects(objects: MemoryObjectStore) -> Self {
        let records: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
        let objects = Arc::new(objects);
        let backends = Backends {
            records: Arc::clone(&records),
            objects: Arc::clone(&objects) as Arc<dyn ObjectStore>,
            pool: None,
            local_upload_dir: None,
        };

        let storefront_config = StorefrontConfig::in_memory();
        let storefront = coach_exchange_storefront::app(
            coach_exchange_storefront::state::AppState::new(storefront_config.clone(), &backends),
            coach_exchange_storefront::middleware::create_session_layer(
                MemoryStore::default(),
                &storefront_config,
            ),
        );

        let admin_config = AdminConfig::in_memory(
            Email::parse(ADMIN_EMAIL).unwrap(),
            hash_password(ADMIN_PASSWORD).unwrap(),
        );
        let admin = coach_exchange_admin::app(
            coach_exchange_admin::state::AppState::new(admin_config.clone(), &backends),
            coach_exchange_admin::middleware::create_session_layer(
                MemoryStore::default(),
                &admin_config,
            ),
        );

        Self {
            storefront,
            admin,
            records,
            objects,
        }
    }

    /// Register a customer and return their session cookie.
    pub async fn customer_session(&self, email: &str) -> String {
        let response = send(
            &self.storefront,
            json_request(
                Method::POST,
                "/auth/register",
                &serde_json::json!({
                    "name": "Test Buyer",
                    "email": email,
                    "password": "motorcoach-2020",
                }),
                None,
            ),
        )
        .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.cookie.unwrap()
    }

    /// Log in as the configured administrator and return the session cookie.
    pub async fn admin_session(&self) -> String {
        let response = send(
            &self.admin,
            json_request(
                Method::POST,
                "/auth/login",
                &serde_json::json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
                None,
            ),
        )
        .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        response.cookie.unwrap()
    }
}

impl Default for Marketplace {
    fn default() -> Self {
        Self::new()
    }
}

/// A response with its body decoded as JSON (`Null` when empty or not
/// JSON) and the session cookie, if one was set.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub cookie: Option<String>,
}

/// Send one request through `router`.
pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(ToOwned::to_owned);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    TestResponse {
        status,
        body,
        cookie,
    }
}

/// A bodiless request, optionally carrying a session cookie.
pub fn request(method: Method, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// A JSON request, optionally carrying a session cookie.
pub fn json_request(
    method: Method,
    uri: &str,
    body: &Value,
    cookie: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Builds a `multipart/form-data` body.
#[derive(Debug, Default)]
pub struct MultipartForm {
    body: Vec<u8>,
}

impl MultipartForm {
    const BOUNDARY: &'static str = "coach-exchange-test-boundary";

    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n",
                Self::BOUNDARY
            )
            .as_bytes(),
        );
        self
    }

    #[must_use]
    pub fn file(mut self, name: &str, file_name: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: image/jpeg\r\n\r\n",
                Self::BOUNDARY
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// The standard listing fields for a 2020 Prevost H3-45.
    pub fn prevost() -> Self {
        Self::new()
            .text("year", "2020")
            .text("make", "Prevost")
            .text("model", "H3-45")
            .text("mileage", "42,000")
            .text("price", "$1,450,000")
            .text("location", "Nashville, TN")
    }

    pub fn into_request(mut self, method: Method, uri: &str, cookie: Option<&str>) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", Self::BOUNDARY).as_bytes());

        let mut builder = Request::builder().method(method).uri(uri).header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", Self::BOUNDARY),
        );
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(self.body)).unwrap()
    }
}
