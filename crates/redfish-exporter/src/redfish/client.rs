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

use async_trait::async_trait;
use reqwest::header::{ACCEPT, LOCATION};
use serde_json::Value as JsonValue;
use url::Url;

use super::{RedfishError, SESSIONS};

const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Query/logout capability of an authenticated Redfish connection.
#[async_trait]
pub trait RedfishApi: Send + Sync {
    /// GET an absolute Redfish path (`/redfish/v1/...`) and return the JSON body.
    async fn get(&self, path: &str) -> Result<JsonValue, RedfishError>;

    /// Delete the server side session. Called once per connection.
    async fn logout(&self) -> Result<(), RedfishError>;
}

/// Redfish connection authenticated with a session token.
pub struct HttpRedfishClient {
    http: reqwest::Client,
    base: Url,
    token: String,
    session_uri: Option<Url>,
}

impl HttpRedfishClient {
    /// Creates a Redfish session on `base` (`scheme://host[:port]`).
    pub async fn connect(
        http: reqwest::Client,
        base: Url,
        username: &str,
        password: &str,
    ) -> Result<Self, RedfishError> {
        let url = join(&base, SESSIONS)?;
        let response = http
            .post(url)
            .header(ACCEPT, "application/json")
            .json(&serde_json::json!({
                "UserName": username,
                "Password": password,
            }))
            .send()
            .await
            .map_err(|source| RedfishError::Transport {
                path: SESSIONS.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(RedfishError::Status {
                path: SESSIONS.to_string(),
                status: response.status().as_u16(),
            });
        }

        // Location may be relative to the service, or absolute.
        let session_uri = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|location| base.join(location).ok());

        let Some(token) = response
            .headers()
            .get(AUTH_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
        else {
            if let Some(session_uri) = session_uri {
                // Best effort, the session is unusable without a token.
                if let Err(e) = http.delete(session_uri.clone()).send().await {
                    tracing::debug!(session = %session_uri, error = ?e, "Failed to delete session created without a token");
                }
            }
            return Err(RedfishError::MissingSessionHeader(AUTH_TOKEN_HEADER));
        };

        if session_uri.is_none() {
            tracing::debug!(base = %base, "Session response has no Location, logout will be skipped");
        }

        Ok(Self {
            http,
            base,
            token,
            session_uri,
        })
    }
}

fn join(base: &Url, path: &str) -> Result<Url, RedfishError> {
    base.join(path)
        .map_err(|_| RedfishError::InvalidUrl(format!("{base}{path}")))
}

#[async_trait]
impl RedfishApi for HttpRedfishClient {
    async fn get(&self, path: &str) -> Result<JsonValue, RedfishError> {
        let url = join(&self.base, path)?;
        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .header(AUTH_TOKEN_HEADER, &self.token)
            .send()
            .await
            .map_err(|source| RedfishError::Transport {
                path: path.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(RedfishError::Status {
                path: path.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| RedfishError::Transport {
                path: path.to_string(),
                source,
            })?;

        serde_json::from_slice(&body).map_err(|source| RedfishError::Decode {
            path: path.to_string(),
            source,
        })
    }

    async fn logout(&self) -> Result<(), RedfishError> {
        let Some(session_uri) = &self.session_uri else {
            return Ok(());
        };

        let response = self
            .http
            .delete(session_uri.clone())
            .header(AUTH_TOKEN_HEADER, &self.token)
            .send()
            .await
            .map_err(|source| RedfishError::Transport {
                path: session_uri.path().to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(RedfishError::Status {
                path: session_uri.path().to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(())
    }
}
