#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::{json, Value};

use postal_waste_api::app::{app, AppState};
use postal_waste_api::config::{AppConfig, Environment, StoreBackend};
use postal_waste_api::database::models::PostOffice;
use postal_waste_api::database::{MemoryStore, Store};

pub const DIVISION: &str = "110000";
pub const OFFICE_A: &str = "110001";
pub const OFFICE_B: &str = "110002";
pub const PASSWORD: &str = "s3cret-pass";

/// An in-process server on an ephemeral port, backed by a fresh memory store
pub struct TestApp {
    pub base_url: String,
    pub store: Arc<MemoryStore>,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(|_| {}).await
    }

    pub async fn spawn_with(configure: impl FnOnce(&mut AppConfig)) -> Result<Self> {
        let mut config = AppConfig::for_environment(Environment::Development);
        config.database.backend = StoreBackend::Memory;
        config.api.enable_request_logging = false;
        configure(&mut config);

        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), config);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind test listener")?;
        let base_url = format!("http://{}", listener.local_addr()?);

        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        Ok(Self {
            base_url,
            store,
            client: reqwest::Client::new(),
        })
    }

    /// Division 110000 with members 110001 and 110002
    pub async fn with_hierarchy() -> Result<Self> {
        let app = Self::spawn().await?;
        app.seed_post_office(DIVISION, None).await?;
        app.seed_post_office(OFFICE_A, Some(DIVISION)).await?;
        app.seed_post_office(OFFICE_B, Some(DIVISION)).await?;
        Ok(app)
    }

    pub async fn seed_post_office(&self, pincode: &str, division: Option<&str>) -> Result<()> {
        self.store
            .insert_post_office(&PostOffice {
                pincode: pincode.to_string(),
                name: format!("PO {pincode}"),
                contact_no: "01123456789".to_string(),
                address: format!("{pincode} Main Road"),
                division_pincode: division.map(str::to_string),
            })
            .await?;
        Ok(())
    }

    pub fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self.client.request(method, format!("{}{}", self.base_url, path));
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub async fn get(&self, path: &str, token: &str) -> Result<(StatusCode, Value)> {
        send(self.request(Method::GET, path, Some(token))).await
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        send(self.request(Method::POST, path, Some(token)).json(&body)).await
    }

    pub async fn patch(&self, path: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        send(self.request(Method::PATCH, path, Some(token)).json(&body)).await
    }

    pub async fn delete(&self, path: &str, token: &str) -> Result<(StatusCode, Value)> {
        send(self.request(Method::DELETE, path, Some(token))).await
    }

    pub async fn signup_divisional(&self, username: &str, pincode: &str) -> Result<String> {
        let (status, body) = send(self.request(Method::POST, "/signup/divisional/", None).json(&json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": PASSWORD,
            "pincode": pincode,
        })))
        .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "divisional signup failed: {status} {body}");
        token_of(&body["data"])
    }

    pub async fn signup_sub_divisional(&self, username: &str, pincode: &str, division: &str) -> Result<String> {
        let (status, body) = send(self.request(Method::POST, "/signup/sub-divisional/", None).json(&json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": PASSWORD,
            "pincode": pincode,
            "division_pincode": division,
        })))
        .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "sub-divisional signup failed: {status} {body}");
        token_of(&body["data"])
    }
}

/// Send and decode; empty bodies (204) come back as `Value::Null`
pub async fn send(builder: RequestBuilder) -> Result<(StatusCode, Value)> {
    let response = builder.send().await?;
    let status = response.status();
    let bytes = response.bytes().await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).with_context(|| format!("non-JSON body with status {status}"))?
    };
    Ok((status, body))
}

fn token_of(data: &Value) -> Result<String> {
    data["token"]
        .as_str()
        .map(str::to_string)
        .context("response carries no token")
}
