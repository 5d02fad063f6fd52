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

//! Metrics about the exporter itself, served on `/metrics`.

use prometheus::{
    Encoder, Gauge, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder,
};

use crate::ExporterError;

const PREFIX: &str = "redfish_exporter";

#[derive(Clone)]
pub struct ExporterMetrics {
    registry: Registry,
    scrapes_total: IntCounterVec,
    scrape_duration: Histogram,
    config_reloads_total: IntCounterVec,
    config_last_reload_successful: Gauge,
}

/// How a scrape request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeOutcome {
    Success,
    CredentialsNotFound,
    ConnectFailed,
    Error,
}

impl ScrapeOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            ScrapeOutcome::Success => "success",
            ScrapeOutcome::CredentialsNotFound => "credentials_not_found",
            ScrapeOutcome::ConnectFailed => "connect_failed",
            ScrapeOutcome::Error => "error",
        }
    }
}

impl ExporterMetrics {
    pub fn new() -> Result<Self, ExporterError> {
        let registry = Registry::new();

        let scrapes_total = IntCounterVec::new(
            Opts::new(
                format!("{PREFIX}_scrapes_total"),
                "Scrape requests handled, by outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(scrapes_total.clone()))?;

        let scrape_duration = Histogram::with_opts(HistogramOpts::new(
            format!("{PREFIX}_scrape_duration_seconds"),
            "Duration of scrape requests",
        ))?;
        registry.register(Box::new(scrape_duration.clone()))?;

        let config_reloads_total = IntCounterVec::new(
            Opts::new(
                format!("{PREFIX}_config_reloads_total"),
                "Configuration reload attempts, by result",
            ),
            &["result"],
        )?;
        registry.register(Box::new(config_reloads_total.clone()))?;

        let config_last_reload_successful = Gauge::with_opts(Opts::new(
            format!("{PREFIX}_config_last_reload_successful"),
            "Whether the last configuration reload succeeded",
        ))?;
        config_last_reload_successful.set(1.0);
        registry.register(Box::new(config_last_reload_successful.clone()))?;

        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        Ok(Self {
            registry,
            scrapes_total,
            scrape_duration,
            config_reloads_total,
            config_last_reload_successful,
        })
    }

    pub fn record_scrape(&self, outcome: ScrapeOutcome, seconds: f64) {
        self.scrapes_total
            .with_label_values(&[outcome.as_str()])
            .inc();
        self.scrape_duration.observe(seconds);
    }

    pub fn record_reload(&self, success: bool) {
        let result = if success { "success" } else { "failure" };
        self.config_reloads_total.with_label_values(&[result]).inc();
        self.config_last_reload_successful
            .set(if success { 1.0 } else { 0.0 });
    }

    pub fn encode(&self) -> Result<String, ExporterError> {
        encode_registry(&self.registry)
    }
}

/// Text exposition of everything gathered from `registry`.
pub fn encode_registry(registry: &Registry) -> Result<String, ExporterError> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| ExporterError::GenericError(format!("Metrics are not valid UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrape_and_reload_counters() {
        let metrics = ExporterMetrics::new().expect("self metrics");
        metrics.record_scrape(ScrapeOutcome::Success, 0.25);
        metrics.record_scrape(ScrapeOutcome::CredentialsNotFound, 0.0);
        metrics.record_reload(false);

        let text = metrics.encode().expect("encode");
        assert!(text.contains(r#"redfish_exporter_scrapes_total{outcome="success"} 1"#));
        assert!(
            text.contains(r#"redfish_exporter_scrapes_total{outcome="credentials_not_found"} 1"#)
        );
        assert!(text.contains("redfish_exporter_scrape_duration_seconds_count 2"));
        assert!(text.contains(r#"redfish_exporter_config_reloads_total{result="failure"} 1"#));
        assert!(text.contains("redfish_exporter_config_last_reload_successful 0"));
    }
}
