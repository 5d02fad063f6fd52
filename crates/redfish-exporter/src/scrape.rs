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
use std::time::Instant;

use prometheus::Registry;

use crate::ExporterError;
use crate::collector::schema::MetricSchema;
use crate::collector::{CollectorSet, ScrapeMetrics};
use crate::credentials::{CredentialStore, Resolution};
use crate::metrics::{ExporterMetrics, ScrapeOutcome, encode_registry};
use crate::session::SessionFactory;

/// One `/redfish` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeRequest {
    pub target: String,
    pub module: Option<String>,
}

/// Runs scrapes end to end: credentials, session, collectors, exposition.
pub struct Scraper {
    credentials: Arc<CredentialStore>,
    sessions: Arc<dyn SessionFactory>,
    schema: Arc<MetricSchema>,
    metrics: ExporterMetrics,
}

impl Scraper {
    pub fn new(
        credentials: Arc<CredentialStore>,
        sessions: Arc<dyn SessionFactory>,
        schema: Arc<MetricSchema>,
        metrics: ExporterMetrics,
    ) -> Self {
        Self {
            credentials,
            sessions,
            schema,
            metrics,
        }
    }

    /// Scrape one target and return the text exposition of its metrics.
    ///
    /// Fails only when no credentials match or no session can be opened.
    /// Anything that goes wrong while walking the resource tree is logged and
    /// leaves the corresponding samples out.
    pub async fn scrape(&self, request: &ScrapeRequest) -> Result<String, ExporterError> {
        let started = Instant::now();
        let result = self.run(request, started).await;

        let outcome = match &result {
            Ok(_) => ScrapeOutcome::Success,
            Err(ExporterError::CredentialsNotFound(_)) => ScrapeOutcome::CredentialsNotFound,
            Err(ExporterError::Connect { .. }) => ScrapeOutcome::ConnectFailed,
            Err(_) => ScrapeOutcome::Error,
        };
        let elapsed = started.elapsed().as_secs_f64();
        self.metrics.record_scrape(outcome, elapsed);

        match &result {
            Ok(_) => tracing::info!(bmc = %request.target, elapsed, "Scrape completed"),
            Err(e) => tracing::error!(bmc = %request.target, error = %e, "Scrape failed"),
        }
        result
    }

    async fn run(&self, request: &ScrapeRequest, started: Instant) -> Result<String, ExporterError> {
        // One snapshot for the whole request, a concurrent reload does not affect it.
        let config = self.credentials.snapshot();
        let credentials = match config.resolve(&request.target, request.module.as_deref()) {
            Resolution::Found {
                credentials,
                source,
            } => {
                tracing::debug!(bmc = %request.target, ?source, "Resolved credentials");
                credentials
            }
            Resolution::NotFound => {
                return Err(ExporterError::CredentialsNotFound(request.target.clone()));
            }
        };
        let collectors = CollectorSet::from_config(&config.collectors);

        let registry = Registry::new();
        let metrics = ScrapeMetrics::new(&self.schema, &collectors)?;
        metrics.register(&registry)?;

        let session = self.sessions.open(&credentials).await?;
        metrics.set_up();

        collectors.collect(&session, &metrics).await;
        session.close().await;

        metrics.set_scrape_duration(started.elapsed().as_secs_f64());
        encode_registry(&registry)
    }
}
