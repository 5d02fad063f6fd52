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

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

pub mod collector;
pub mod config;
pub mod credentials;
pub mod http;
pub mod metrics;
pub mod redfish;
pub mod reload;
pub mod scrape;
pub mod session;

pub use config::Config;
pub use credentials::{CredentialStore, Resolution, TargetCredentials};
pub use scrape::{ScrapeRequest, Scraper};
pub use session::{HttpSessionFactory, Session, SessionFactory};

use crate::collector::schema::MetricSchema;
use crate::http::AppState;
use crate::metrics::ExporterMetrics;
use crate::redfish::RedfishError;
use crate::reload::ConfigReloader;

#[derive(thiserror::Error, Debug)]
pub enum ExporterError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No credentials found for {0}")]
    CredentialsNotFound(String),

    #[error("Unable to open Redfish session to {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: RedfishError,
    },

    #[error("Redfish Error: {0}")]
    Redfish(#[from] RedfishError),

    #[error("Prometheus Error {0}")]
    PrometheusError(#[from] prometheus::Error),

    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic Error: {0}")]
    GenericError(String),
}

impl From<String> for ExporterError {
    fn from(err: String) -> Self {
        ExporterError::GenericError(err)
    }
}

/// Process level settings that are not part of the reloadable configuration.
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub config_path: PathBuf,
    pub listen_address: SocketAddr,
    pub reload_token: Option<String>,
}

pub async fn run_service(options: ServiceOptions, config: Config) -> Result<(), ExporterError> {
    let exporter_metrics = ExporterMetrics::new()?;
    let session_factory = Arc::new(HttpSessionFactory::new(&config.session)?);
    let store = Arc::new(CredentialStore::new(config));

    let reloader = Arc::new(ConfigReloader::new(
        store.clone(),
        options.config_path.clone(),
        exporter_metrics.clone(),
    ));

    let schema = Arc::new(MetricSchema::new());
    let descriptors = schema.describe()?;
    tracing::debug!(metrics = descriptors.len(), "Metric schema ready");

    let scraper = Arc::new(Scraper::new(
        store,
        session_factory,
        schema,
        exporter_metrics.clone(),
    ));

    let state = AppState {
        scraper,
        reloader: reloader.clone(),
        metrics: exporter_metrics,
        reload_token: options.reload_token.map(Arc::from),
    };

    let listener = tokio::net::TcpListener::bind(options.listen_address).await?;
    tracing::info!(address = %options.listen_address, "Listening on");

    let join_listener = tokio::spawn(async move {
        axum::serve(listener, http::router(state))
            .await
            .map_err(ExporterError::Io)
    });
    let join_hangup = tokio::spawn(reload::watch_hangup(reloader));

    tokio::select! {
        res = join_listener => {
            match res {
                Ok(Ok(_)) => {
                    tracing::info!("HTTP listener shutdown");
                }
                Ok(Err(e)) => {
                    tracing::error!(error=?e, "HTTP listener failed");
                    return Err(e);
                }
                Err(e) => {
                    tracing::error!(error=?e, "HTTP listener join error");
                }
            }
        }
        res = join_hangup => {
            match res {
                Ok(Ok(_)) => {
                    tracing::error!("Hangup watcher shutdown");
                }
                Ok(Err(e)) => {
                    tracing::error!(error=?e, "Hangup watcher ended unexpectedly");
                    return Err(e);
                }
                Err(e) => {
                    tracing::error!(error=?e, "Hangup watcher join error");
                }
            }
        }
    };

    Ok(())
}
