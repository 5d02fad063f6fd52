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

use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{any, get};
use serde::Deserialize;

use crate::ExporterError;
use crate::metrics::ExporterMetrics;
use crate::reload::ConfigReloader;
use crate::scrape::{ScrapeRequest, Scraper};

#[derive(Clone)]
pub struct AppState {
    pub scraper: Arc<Scraper>,
    pub reloader: Arc<ConfigReloader>,
    pub metrics: ExporterMetrics,
    pub reload_token: Option<Arc<str>>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(landing_page))
        .route("/redfish", get(scrape))
        .route("/metrics", get(exporter_metrics))
        .route("/-/reload", any(reload))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ScrapeParams {
    target: Option<String>,
    module: Option<String>,
}

async fn scrape(State(state): State<AppState>, Query(params): Query<ScrapeParams>) -> Response {
    let Some(target) = params.target.filter(|t| !t.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "'target' parameter must be specified").into_response();
    };

    let request = ScrapeRequest {
        target,
        module: params.module.filter(|m| !m.is_empty()),
    };

    match state.scraper.scrape(&request).await {
        Ok(body) => exposition(body),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

async fn exporter_metrics(State(state): State<AppState>) -> Response {
    match state.metrics.encode() {
        Ok(body) => exposition(body),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

fn exposition(body: String) -> Response {
    ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response()
}

async fn reload(State(state): State<AppState>, method: Method, headers: HeaderMap) -> Response {
    if method != Method::PUT && method != Method::POST {
        return (
            StatusCode::BAD_REQUEST,
            "This endpoint requires a PUT or POST request.",
        )
            .into_response();
    }

    if let Some(token) = &state.reload_token {
        let authorized = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|presented| presented == &**token);
        if !authorized {
            return (StatusCode::UNAUTHORIZED, "Invalid reload token").into_response();
        }
    }

    let reloader = state.reloader.clone();
    let result = match tokio::task::spawn_blocking(move || reloader.reload()).await {
        Ok(result) => result,
        Err(e) => Err(ExporterError::GenericError(format!("Reload task failed: {e}"))),
    };

    match result {
        Ok(()) => (StatusCode::OK, "Configuration reloaded successfully!").into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to reload configuration: {e}"),
        )
            .into_response(),
    }
}

async fn landing_page() -> Html<&'static str> {
    Html(
        r#"<html>
<head><title>Redfish Exporter</title></head>
<body>
<h1>Redfish Exporter</h1>
<form action="/redfish">
<label>Target:</label> <input type="text" name="target" placeholder="X.X.X.X" value="">
<label>Module:</label> <input type="text" name="module" placeholder="group" value="">
<input type="submit" value="Submit">
</form>
<p><a href="/metrics">Exporter metrics</a></p>
</body>
</html>
"#,
    )
}
