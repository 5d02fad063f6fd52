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

use std::collections::{BTreeMap, HashMap};

use prometheus::Opts;
use prometheus::core::Desc;

use super::status::{Health, Severity, State, StatusFamily};

pub const NAMESPACE: &str = "redfish";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subsystem {
    Manager,
    Chassis,
    System,
}

impl Subsystem {
    pub const ALL: [Subsystem; 3] = [Subsystem::Manager, Subsystem::Chassis, Subsystem::System];

    pub fn as_str(self) -> &'static str {
        match self {
            Subsystem::Manager => "manager",
            Subsystem::Chassis => "chassis",
            Subsystem::System => "system",
        }
    }

    fn id_label(self) -> &'static str {
        match self {
            Subsystem::Manager => "manager_id",
            Subsystem::Chassis => "chassis_id",
            Subsystem::System => "system_id",
        }
    }

    fn kinds(self) -> &'static [MetricKind] {
        use MetricKind::*;
        match self {
            Subsystem::Manager | Subsystem::System => &[
                State,
                HealthState,
                PowerState,
                LogServiceState,
                LogServiceHealthState,
                LogEntrySeverityState,
            ],
            Subsystem::Chassis => &[
                State,
                HealthState,
                LogServiceState,
                LogServiceHealthState,
                LogEntrySeverityState,
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricKind {
    State,
    HealthState,
    PowerState,
    LogServiceState,
    LogServiceHealthState,
    LogEntrySeverityState,
}

impl MetricKind {
    fn name(self) -> &'static str {
        match self {
            MetricKind::State => "state",
            MetricKind::HealthState => "health_state",
            MetricKind::PowerState => "power_state",
            MetricKind::LogServiceState => "log_service_state",
            MetricKind::LogServiceHealthState => "log_service_health_state",
            MetricKind::LogEntrySeverityState => "log_entry_severity_state",
        }
    }

    fn help(self, subsystem: Subsystem) -> String {
        let subsystem = subsystem.as_str();
        match self {
            MetricKind::State => format!("{subsystem} state,{}", State::legend()),
            MetricKind::HealthState => format!("{subsystem} health,{}", Health::legend()),
            MetricKind::PowerState => format!("{subsystem} power state"),
            MetricKind::LogServiceState => {
                format!("{subsystem} log service state,{}", State::legend())
            }
            MetricKind::LogServiceHealthState => {
                format!("{subsystem} log service health state,{}", Health::legend())
            }
            MetricKind::LogEntrySeverityState => {
                format!("{subsystem} log entry severity state,{}", Severity::legend())
            }
        }
    }

    fn labels(self, subsystem: Subsystem) -> Vec<String> {
        let rest: &[&str] = match self {
            MetricKind::State | MetricKind::HealthState | MetricKind::PowerState => {
                &["name", "model", "type"]
            }
            MetricKind::LogServiceState | MetricKind::LogServiceHealthState => &[
                "log_service",
                "log_service_id",
                "log_service_enabled",
                "log_service_overwrite_policy",
            ],
            MetricKind::LogEntrySeverityState => &[
                "log_service",
                "log_service_id",
                "log_entry",
                "log_entry_id",
                "log_entry_code",
                "log_entry_type",
                "log_entry_message_id",
                "log_entry_sensor_number",
                "log_entry_sensor_type",
            ],
        };

        std::iter::once(subsystem.id_label())
            .chain(rest.iter().copied())
            .map(String::from)
            .collect()
    }
}

/// Name, help and ordered label names of one exported metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDescriptor {
    pub fq_name: String,
    pub help: String,
    pub labels: Vec<String>,
}

impl MetricDescriptor {
    fn new(name: &str, help: impl Into<String>, labels: Vec<String>) -> Self {
        Self {
            fq_name: format!("{NAMESPACE}_{name}"),
            help: help.into(),
            labels,
        }
    }

    pub fn opts(&self) -> Opts {
        Opts::new(self.fq_name.clone(), self.help.clone())
    }

    pub fn label_names(&self) -> Vec<&str> {
        self.labels.iter().map(String::as_str).collect()
    }

    pub fn desc(&self) -> Result<Desc, prometheus::Error> {
        Desc::new(
            self.fq_name.clone(),
            self.help.clone(),
            self.labels.clone(),
            HashMap::new(),
        )
    }
}

/// Every metric the subsystem collectors can emit. Built once, read-only afterwards.
#[derive(Debug)]
pub struct MetricSchema {
    subsystem_metrics: BTreeMap<(Subsystem, MetricKind), MetricDescriptor>,
    pub scrape_status: MetricDescriptor,
    pub up: MetricDescriptor,
    pub scrape_duration: MetricDescriptor,
}

impl Default for MetricSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricSchema {
    pub fn new() -> Self {
        let mut subsystem_metrics = BTreeMap::new();
        for subsystem in Subsystem::ALL {
            for kind in subsystem.kinds() {
                subsystem_metrics.insert(
                    (subsystem, *kind),
                    MetricDescriptor::new(
                        &format!("{}_{}", subsystem.as_str(), kind.name()),
                        kind.help(subsystem),
                        kind.labels(subsystem),
                    ),
                );
            }
        }

        Self {
            subsystem_metrics,
            scrape_status: MetricDescriptor::new(
                "collector_scrape_status",
                "collector_scrape_status",
                vec!["collector".to_string()],
            ),
            up: MetricDescriptor::new("up", "redfish up", Vec::new()),
            scrape_duration: MetricDescriptor::new(
                "scrape_duration_seconds",
                "Time taken to scrape the Redfish target",
                Vec::new(),
            ),
        }
    }

    pub fn get(&self, subsystem: Subsystem, kind: MetricKind) -> Option<&MetricDescriptor> {
        self.subsystem_metrics.get(&(subsystem, kind))
    }

    pub fn for_subsystem(
        &self,
        subsystem: Subsystem,
    ) -> impl Iterator<Item = (MetricKind, &MetricDescriptor)> {
        self.subsystem_metrics
            .iter()
            .filter(move |((s, _), _)| *s == subsystem)
            .map(|((_, kind), descriptor)| (*kind, descriptor))
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricDescriptor> {
        self.subsystem_metrics
            .values()
            .chain([&self.scrape_status, &self.up, &self.scrape_duration])
    }

    /// Descriptors of every metric, independent of any scrape.
    pub fn describe(&self) -> Result<Vec<Desc>, prometheus::Error> {
        self.iter().map(MetricDescriptor::desc).collect()
    }
}
