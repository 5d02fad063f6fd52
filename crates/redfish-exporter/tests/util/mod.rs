/*
 * SPDX-FileCopyrightText: Copyright (c) 2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
 * SPDX-License-Identifier: Apache-2.0
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 * http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! In-process Redfish BMC and exporter wiring for integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, post};
use redfish_exporter::collector::schema::MetricSchema;
use redfish_exporter::config::Config;
use redfish_exporter::http::{AppState, router};
use redfish_exporter::metrics::ExporterMetrics;
use redfish_exporter::reload::ConfigReloader;
use redfish_exporter::{CredentialStore, HttpSessionFactory, Scraper};
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tower::ServiceExt;

const SESSIONS: &str = "/redfish/v1/SessionService/Sessions";
const TOKEN: &str = "mock-session-token";

#[derive(Default)]
pub struct MockBmcBuilder {
    resources: HashMap<String, Value>,
    failing: HashSet<String>,
    omit_token: bool,
}

impl MockBmcBuilder {
    pub fn resource(mut self, path: &str, value: Value) -> Self {
        self.resources.insert(path.to_string(), value);
        self
    }

    pub fn failing(mut self, path: &str) -> Self {
        self.failing.insert(path.to_string());
        self
    }

    /// Session creation succeeds but the response carries no `X-Auth-Token`.
    pub fn without_token(mut self) -> Self {
        self.omit_token = true;
        self
    }

    pub async fn start(self, username: &str, password: &str) -> MockBmc {
        let state = Arc::new(MockState {
            resources: self.resources,
            failing: self.failing,
            omit_token: self.omit_token,
            username: username.to_string(),
            password: password.to_string(),
            logins: AtomicUsize::new(0),
            logouts: AtomicUsize::new(0),
            session_deletes: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route(SESSIONS, post(login))
            .route("/redfish/v1/SessionService/Sessions/{id}", delete(logout))
            .fallback(resource)
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock bmc");
        let address = listener.local_addr().expect("local addr");
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock bmc serve");
        });

        MockBmc {
            address,
            state,
            server,
        }
    }
}

pub struct MockBmc {
    pub address: SocketAddr,
    state: Arc<MockState>,
    server: JoinHandle<()>,
}

impl MockBmc {
    pub fn builder() -> MockBmcBuilder {
        MockBmcBuilder::default()
    }

    pub fn target(&self) -> String {
        self.address.to_string()
    }

    pub fn logins(&self) -> usize {
        self.state.logins.load(Ordering::SeqCst)
    }

    pub fn logouts(&self) -> usize {
        self.state.logouts.load(Ordering::SeqCst)
    }

    /// Every DELETE on a session, authenticated or not.
    pub fn session_deletes(&self) -> usize {
        self.state.session_deletes.load(Ordering::SeqCst)
    }

    /// Logouts of dropped sessions run on a spawned task.
    pub async fn wait_for_logouts(&self, expected: usize) -> usize {
        for _ in 0..200 {
            if self.logouts() >= expected {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        self.logouts()
    }
}

impl Drop for MockBmc {
    fn drop(&mut self) {
        self.server.abort();
    }
}

struct MockState {
    resources: HashMap<String, Value>,
    failing: HashSet<String>,
    omit_token: bool,
    username: String,
    password: String,
    logins: AtomicUsize,
    logouts: AtomicUsize,
    session_deletes: AtomicUsize,
}

async fn login(State(state): State<Arc<MockState>>, axum::Json(body): axum::Json<Value>) -> Response {
    if body["UserName"] != state.username.as_str() || body["Password"] != state.password.as_str() {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let id = state.logins.fetch_add(1, Ordering::SeqCst) + 1;
    let location = format!("{SESSIONS}/{id}");

    if state.omit_token {
        return (
            StatusCode::CREATED,
            [("Location", location)],
            axum::Json(json!({"Id": id.to_string()})),
        )
            .into_response();
    }

    (
        StatusCode::CREATED,
        [
            ("X-Auth-Token", TOKEN.to_string()),
            ("Location", location),
        ],
        axum::Json(json!({"Id": id.to_string()})),
    )
        .into_response()
}

async fn logout(State(state): State<Arc<MockState>>, headers: HeaderMap) -> StatusCode {
    state.session_deletes.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED;
    }
    state.logouts.fetch_add(1, Ordering::SeqCst);
    StatusCode::NO_CONTENT
}

async fn resource(State(state): State<Arc<MockState>>, headers: HeaderMap, uri: Uri) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let path = uri.path();
    if state.failing.contains(path) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    match state.resources.get(path) {
        Some(value) => axum::Json(value.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("X-Auth-Token")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == TOKEN)
}

/// Exporter router over a configuration file on disk.
pub fn exporter(config_path: PathBuf, reload_token: Option<&str>) -> Router {
    let config = Config::load(&config_path).expect("valid test config");
    let metrics = ExporterMetrics::new().expect("self metrics");
    let sessions = HttpSessionFactory::new(&config.session).expect("http client");
    let store = Arc::new(CredentialStore::new(config));

    let reloader = ConfigReloader::new(store.clone(), config_path, metrics.clone());
    let scraper = Scraper::new(
        store,
        Arc::new(sessions),
        Arc::new(MetricSchema::new()),
        metrics.clone(),
    );

    router(AppState {
        scraper: Arc::new(scraper),
        reloader: Arc::new(reloader),
        metrics,
        reload_token: reload_token.map(Arc::from),
    })
}

pub async fn call(app: &Router, method: &str, uri: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("infallible");
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, String::from_utf8_lossy(&body).into_owned())
}

/// Sample lines of one metric in a text exposition.
pub fn samples(text: &str, name: &str) -> Vec<String> {
    text.lines()
        .filter(|line| {
            line.strip_prefix(name)
                .is_some_and(|rest| rest.starts_with('{') || rest.starts_with(' '))
        })
        .map(String::from)
        .collect()
}

/// Plain HTTP session settings with credentials for each `(target, username, password)`.
pub fn config_for(hosts: &[(&str, &str, &str)], extra: &str) -> String {
    let mut config = String::from("[session]\nscheme = \"http\"\ninsecure = false\n\n");
    for (target, username, password) in hosts {
        config.push_str(&format!(
            "[hosts.\"{target}\"]\nusername = \"{username}\"\npassword = \"{password}\"\n\n"
        ));
    }
    config.push_str(extra);
    config
}
