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
use crate::redfish::model::{Chassis, ODataRef, Status};
use crate::session::Session;

impl MonitoredResource for Chassis {
    const SUBSYSTEM: Subsystem = Subsystem::Chassis;

    fn id(&self) -> &str {
        &self.id
    }

    fn labels(&self) -> [&str; 4] {
        [
            self.id.as_str(),
            self.name.as_str(),
            self.model.as_deref().unwrap_or_default(),
            self.chassis_type.as_deref().unwrap_or_default(),
        ]
    }

    fn status(&self) -> &Status {
        &self.status
    }

    fn log_services(&self) -> Option<&ODataRef> {
        self.log_services.as_ref()
    }
}

pub struct ChassisCollector {
    settings: SubsystemCollectorConfig,
}

impl ChassisCollector {
    pub fn new(settings: SubsystemCollectorConfig) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl SubsystemCollector for ChassisCollector {
    fn subsystem(&self) -> Subsystem {
        Subsystem::Chassis
    }

    async fn collect(&self, session: &Session, metrics: &ScrapeMetrics) {
        collect_listing(session, metrics, &self.settings, session.chassis().await).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::collector::testing::{render, samples, scrape_metrics};
    use crate::session::testing::StaticRedfish;

    #[tokio::test]
    async fn test_chassis_with_failing_log_service() {
        let api = StaticRedfish::default()
            .with(
                "/redfish/v1",
                json!({"Chassis": {"@odata.id": "/redfish/v1/Chassis"}}),
            )
            .with(
                "/redfish/v1/Chassis",
                json!({"Members": [
                    {"@odata.id": "/redfish/v1/Chassis/1"},
                    {"@odata.id": "/redfish/v1/Chassis/2"}
                ]}),
            )
            .with(
                "/redfish/v1/Chassis/1",
                json!({
                    "Id": "1",
                    "Name": "Computer System Chassis",
                    "ChassisType": "RackMount",
                    "PowerState": "On",
                    "Status": {"State": "Enabled", "Health": "Critical"},
                    "LogServices": {"@odata.id": "/redfish/v1/Chassis/1/LogServices"}
                }),
            )
            .failing("/redfish/v1/Chassis/1/LogServices")
            .with(
                "/redfish/v1/Chassis/2",
                json!({
                    "Id": "2",
                    "Name": "Enclosure",
                    "Status": {"State": "Absent"}
                }),
            );

        let session = Session::new("10.0.0.1".to_string(), Arc::new(api));
        let (metrics, registry) = scrape_metrics();
        ChassisCollector::new(SubsystemCollectorConfig::default())
            .collect(&session, &metrics)
            .await;
        session.close().await;
        let text = render(&registry);

        assert_eq!(
            samples(&text, "redfish_chassis_health_state"),
            vec![
                r#"redfish_chassis_health_state{chassis_id="1",model="",name="Computer System Chassis",type="RackMount"} 3"#
            ]
        );
        let mut state = samples(&text, "redfish_chassis_state");
        state.sort();
        assert_eq!(
            state,
            vec![
                r#"redfish_chassis_state{chassis_id="1",model="",name="Computer System Chassis",type="RackMount"} 1"#,
                r#"redfish_chassis_state{chassis_id="2",model="",name="Enclosure",type=""} 7"#,
            ]
        );
        assert!(!text.contains("redfish_chassis_power_state"));
        assert_eq!(
            samples(&text, "redfish_collector_scrape_status"),
            vec![r#"redfish_collector_scrape_status{collector="chassis"} 1"#]
        );
    }

    #[tokio::test]
    async fn test_missing_chassis_link() {
        let api = StaticRedfish::default().with("/redfish/v1", json!({}));
        let session = Session::new("10.0.0.1".to_string(), Arc::new(api));
        let (metrics, registry) = scrape_metrics();
        ChassisCollector::new(SubsystemCollectorConfig::default())
            .collect(&session, &metrics)
            .await;
        session.close().await;

        let text = render(&registry);
        assert!(samples(&text, "redfish_chassis_state").is_empty());
        assert_eq!(samples(&text, "redfish_collector_scrape_status").len(), 1);
    }
}
