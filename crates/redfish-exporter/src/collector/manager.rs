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

use super::schema::Subsystem;
use super::{MonitoredResource, ScrapeMetrics, SubsystemCollector, collect_listing};
use crate::config::SubsystemCollectorConfig;
use crate::redfish::model::{Manager, ODataRef, Status};
use crate::session::Session;

impl MonitoredResource for Manager {
    const SUBSYSTEM: Subsystem = Subsystem::Manager;

    fn id(&self) -> &str {
        &self.id
    }

    fn labels(&self) -> [&str; 4] {
        [
            self.id.as_str(),
            self.name.as_str(),
            self.model.as_deref().unwrap_or_default(),
            self.manager_type.as_deref().unwrap_or_default(),
        ]
    }

    fn status(&self) -> &Status {
        &self.status
    }

    fn power_state(&self) -> Option<&str> {
        self.power_state.as_deref()
    }

    fn log_services(&self) -> Option<&ODataRef> {
        self.log_services.as_ref()
    }
}

/// Exports BMC managers and their log services.
pub struct ManagerCollector {
    settings: SubsystemCollectorConfig,
}

impl ManagerCollector {
    pub fn new(settings: SubsystemCollectorConfig) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl SubsystemCollector for ManagerCollector {
    fn subsystem(&self) -> Subsystem {
        Subsystem::Manager
    }

    async fn collect(&self, session: &Session, metrics: &ScrapeMetrics) {
        collect_listing(session, metrics, &self.settings, session.managers().await).await;
    }
}
