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

use futures::{StreamExt, stream};

use super::ScrapeMetrics;
use super::schema::{MetricKind, Subsystem};
use super::status::{Health, Severity, State, StatusFamily};
use crate::redfish::model::{LogService, ODataRef};
use crate::session::Session;

/// Walks the log services below one top-level resource.
///
/// Up to `concurrency` services are read at once; all of them finish before
/// this returns. A failing service is logged and does not affect its siblings.
pub(crate) async fn collect_log_services(
    session: &Session,
    metrics: &ScrapeMetrics,
    subsystem: Subsystem,
    parent_id: &str,
    collection: Option<&ODataRef>,
    concurrency: usize,
) {
    let services = match session.log_services(collection).await {
        Ok(services) => services,
        Err(e) => {
            tracing::warn!(
                bmc = %session.target(),
                collector = subsystem.as_str(),
                parent_id,
                operation = "list log services",
                error = ?e,
                "Failed to get log services"
            );
            return;
        }
    };

    if services.is_empty() {
        tracing::debug!(bmc = %session.target(), collector = subsystem.as_str(), parent_id, "No log services found");
        return;
    }

    let pending: Vec<_> = services
        .iter()
        .map(|service| collect_log_service(session, metrics, subsystem, parent_id, service))
        .collect();
    stream::iter(pending)
        .buffer_unordered(concurrency.max(1))
        .collect::<Vec<()>>()
        .await;
}

async fn collect_log_service(
    session: &Session,
    metrics: &ScrapeMetrics,
    subsystem: Subsystem,
    parent_id: &str,
    service: &LogService,
) {
    let enabled = service.service_enabled.unwrap_or(false).to_string();
    let overwrite_policy = service.overwrite_policy.as_deref().unwrap_or_default();
    let service_labels = [
        parent_id,
        service.name.as_str(),
        service.id.as_str(),
        enabled.as_str(),
        overwrite_policy,
    ];

    metrics.emit(
        subsystem,
        MetricKind::LogServiceState,
        State::value_of(service.status.state.as_deref()),
        &service_labels,
    );
    metrics.emit(
        subsystem,
        MetricKind::LogServiceHealthState,
        Health::value_of(service.status.health.as_deref()),
        &service_labels,
    );

    let entries = match session.log_entries(service).await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(
                bmc = %session.target(),
                collector = subsystem.as_str(),
                parent_id,
                log_service = %service.id,
                operation = "list log entries",
                error = ?e,
                "Failed to get log entries"
            );
            return;
        }
    };

    for entry in &entries {
        let sensor_number = entry
            .sensor_number
            .map(|n| n.to_string())
            .unwrap_or_default();
        let labels = [
            parent_id,
            service.name.as_str(),
            service.id.as_str(),
            entry.name.as_str(),
            entry.id.as_str(),
            entry.entry_code.as_deref().unwrap_or_default(),
            entry.entry_type.as_deref().unwrap_or_default(),
            entry.message_id.as_deref().unwrap_or_default(),
            sensor_number.as_str(),
            entry.sensor_type.as_deref().unwrap_or_default(),
        ];

        metrics.emit(
            subsystem,
            MetricKind::LogEntrySeverityState,
            Severity::value_of(entry.severity.as_deref()),
            &labels,
        );
    }
}
