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

//! Collectors walking the Redfish resource tree of one target during a scrape.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{Gauge, GaugeVec, Registry};

use crate::config::{CollectorsConfig, SubsystemCollectorConfig};
use crate::redfish::RedfishError;
use crate::redfish::model::{ODataRef, Status};
use crate::session::Session;

pub mod chassis;
pub mod log_service;
pub mod manager;
pub mod schema;
pub mod status;
pub mod system;

pub use chassis::ChassisCollector;
pub use manager::ManagerCollector;
pub use system::SystemCollector;

use schema::{MetricDescriptor, MetricKind, MetricSchema, Subsystem};
use status::{Health, PowerState, State, StatusFamily};

/// Gauges of a single scrape. Registered with the request scoped registry as
/// one collector, described by the enabled subsystem collectors.
#[derive(Clone)]
pub struct ScrapeMetrics {
    descs: Arc<Vec<Desc>>,
    gauges: Arc<HashMap<(Subsystem, MetricKind), GaugeVec>>,
    scrape_status: GaugeVec,
    up: Gauge,
    scrape_duration: Gauge,
}

impl ScrapeMetrics {
    pub fn new(schema: &MetricSchema, collectors: &CollectorSet) -> Result<Self, prometheus::Error> {
        let mut gauges = HashMap::new();
        for subsystem in collectors.subsystems() {
            for (kind, descriptor) in schema.for_subsystem(subsystem) {
                gauges.insert((subsystem, kind), gauge_vec(descriptor)?);
            }
        }

        let descs = collectors
            .describe(schema)
            .into_iter()
            .chain([&schema.up, &schema.scrape_duration])
            .map(MetricDescriptor::desc)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            descs: Arc::new(descs),
            gauges: Arc::new(gauges),
            scrape_status: gauge_vec(&schema.scrape_status)?,
            up: Gauge::with_opts(schema.up.opts())?,
            scrape_duration: Gauge::with_opts(schema.scrape_duration.opts())?,
        })
    }

    pub fn register(&self, registry: &Registry) -> Result<(), prometheus::Error> {
        registry.register(Box::new(self.clone()))
    }

    /// Records one sample. Missing values are skipped, as are label sets whose
    /// arity does not match the descriptor.
    pub fn emit(
        &self,
        subsystem: Subsystem,
        kind: MetricKind,
        value: Option<f64>,
        labels: &[&str],
    ) {
        let Some(value) = value else {
            return;
        };
        let Some(gauge) = self.gauges.get(&(subsystem, kind)) else {
            tracing::error!(collector = subsystem.as_str(), metric = ?kind, "Metric is not described for this scrape");
            return;
        };

        match gauge.get_metric_with_label_values(labels) {
            Ok(gauge) => gauge.set(value),
            Err(e) => {
                tracing::error!(collector = subsystem.as_str(), metric = ?kind, error = ?e, "Dropping sample with mismatched labels")
            }
        }
    }

    pub fn set_scrape_status(&self, subsystem: Subsystem) {
        self.scrape_status
            .with_label_values(&[subsystem.as_str()])
            .set(1.0);
    }

    pub fn set_up(&self) {
        self.up.set(1.0);
    }

    pub fn set_scrape_duration(&self, seconds: f64) {
        self.scrape_duration.set(seconds);
    }
}

fn gauge_vec(descriptor: &MetricDescriptor) -> Result<GaugeVec, prometheus::Error> {
    GaugeVec::new(descriptor.opts(), &descriptor.label_names())
}

impl Collector for ScrapeMetrics {
    fn desc(&self) -> Vec<&Desc> {
        self.descs.iter().collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let mut families: Vec<MetricFamily> = self
            .gauges
            .values()
            .flat_map(|gauge| gauge.collect())
            .collect();
        families.extend(self.scrape_status.collect());
        families.extend(self.up.collect());
        families.extend(self.scrape_duration.collect());
        families
    }
}

/// Walks one subsystem of the resource tree and records what it finds.
#[async_trait]
pub trait SubsystemCollector: Send + Sync {
    fn subsystem(&self) -> Subsystem;

    fn name(&self) -> &'static str {
        self.subsystem().as_str()
    }

    fn describe<'a>(&self, schema: &'a MetricSchema) -> Vec<&'a MetricDescriptor> {
        schema
            .for_subsystem(self.subsystem())
            .map(|(_, descriptor)| descriptor)
            .chain(std::iter::once(&schema.scrape_status))
            .collect()
    }

    async fn collect(&self, session: &Session, metrics: &ScrapeMetrics);
}

/// Top level resource (manager, chassis, system) read from the service root.
pub(crate) trait MonitoredResource: Send + Sync {
    const SUBSYSTEM: Subsystem;

    fn id(&self) -> &str;

    /// `<subsystem>_id, name, model, type`
    fn labels(&self) -> [&str; 4];

    fn status(&self) -> &Status;

    fn power_state(&self) -> Option<&str> {
        None
    }

    fn log_services(&self) -> Option<&ODataRef>;
}

/// Records every resource of a listing. The scrape status is only set when the
/// listing itself succeeded.
pub(crate) async fn collect_listing<R: MonitoredResource>(
    session: &Session,
    metrics: &ScrapeMetrics,
    settings: &SubsystemCollectorConfig,
    listing: Result<Vec<R>, RedfishError>,
) {
    let subsystem = R::SUBSYSTEM;
    let resources = match listing {
        Ok(resources) => resources,
        Err(e) => {
            tracing::error!(
                bmc = %session.target(),
                collector = subsystem.as_str(),
                operation = "list resources",
                error = ?e,
                "Failed to list resources"
            );
            return;
        }
    };

    tracing::debug!(bmc = %session.target(), collector = subsystem.as_str(), count = resources.len(), "Collector scrape started");
    for resource in &resources {
        collect_resource(session, metrics, settings, resource).await;
    }
    metrics.set_scrape_status(subsystem);
}

async fn collect_resource<R: MonitoredResource>(
    session: &Session,
    metrics: &ScrapeMetrics,
    settings: &SubsystemCollectorConfig,
    resource: &R,
) {
    let subsystem = R::SUBSYSTEM;
    let labels = resource.labels();
    let status = resource.status();

    metrics.emit(
        subsystem,
        MetricKind::HealthState,
        Health::value_of(status.health.as_deref()),
        &labels,
    );
    metrics.emit(
        subsystem,
        MetricKind::State,
        State::value_of(status.state.as_deref()),
        &labels,
    );
    metrics.emit(
        subsystem,
        MetricKind::PowerState,
        PowerState::value_of(resource.power_state()),
        &labels,
    );

    if settings.log_services {
        log_service::collect_log_services(
            session,
            metrics,
            subsystem,
            resource.id(),
            resource.log_services(),
            settings.log_service_concurrency,
        )
        .await;
    }
}

/// The enabled subsystem collectors, run concurrently for each scrape.
pub struct CollectorSet {
    collectors: Vec<Box<dyn SubsystemCollector>>,
}

impl CollectorSet {
    pub fn new(collectors: Vec<Box<dyn SubsystemCollector>>) -> Self {
        Self { collectors }
    }

    pub fn from_config(config: &CollectorsConfig) -> Self {
        let mut collectors: Vec<Box<dyn SubsystemCollector>> = Vec::new();
        if let Some(settings) = config.manager.as_option() {
            collectors.push(Box::new(ManagerCollector::new(settings.clone())));
        }
        if let Some(settings) = config.chassis.as_option() {
            collectors.push(Box::new(ChassisCollector::new(settings.clone())));
        }
        if let Some(settings) = config.system.as_option() {
            collectors.push(Box::new(SystemCollector::new(settings.clone())));
        }
        Self::new(collectors)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.collectors.iter().map(|c| c.name()).collect()
    }

    pub fn subsystems(&self) -> Vec<Subsystem> {
        self.collectors.iter().map(|c| c.subsystem()).collect()
    }

    pub fn describe<'a>(&self, schema: &'a MetricSchema) -> Vec<&'a MetricDescriptor> {
        let mut seen = HashSet::new();
        self.collectors
            .iter()
            .flat_map(|c| c.describe(schema))
            .filter(|d| seen.insert(d.fq_name.clone()))
            .collect()
    }

    pub async fn collect(&self, session: &Session, metrics: &ScrapeMetrics) {
        join_all(
            self.collectors
                .iter()
                .map(|collector| collector.collect(session, metrics)),
        )
        .await;
    }
}
