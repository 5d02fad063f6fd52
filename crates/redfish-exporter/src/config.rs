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

use std::collections::HashMap;
use std::fmt::Debug;
use std::path::Path;
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Deserializer, Serialize};

use crate::ExporterError;

/// Host entry used when a target has no entry of its own.
pub const DEFAULT_HOST: &str = "default";

const ENV_PREFIX: &str = "REDFISH_EXPORTER__";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Credentials keyed by target address, as passed in the `target` query parameter.
    pub hosts: HashMap<String, HostConfig>,

    /// Named credential groups, selected with the `module` query parameter.
    pub groups: HashMap<String, GroupConfig>,

    pub collectors: CollectorsConfig,

    /// Redfish session settings. Only read at startup.
    pub session: SessionConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct HostConfig {
    pub username: String,
    pub password: String,
}

/// Debug structure omits credentials
impl Debug for HostConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostConfig")
            .field("username", &self.username)
            .finish()
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupConfig {
    pub username: Option<String>,
    pub password: Option<String>,

    /// Targets that use this group's credentials without naming the module.
    pub members: Vec<String>,
}

impl GroupConfig {
    pub fn credentials(&self) -> Option<HostConfig> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some(HostConfig {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }
}

impl Debug for GroupConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupConfig")
            .field("username", &self.username)
            .field("members", &self.members)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorsConfig {
    /// Manager (BMC) collector configuration (if present, manager collector is enabled)
    pub manager: Configurable<SubsystemCollectorConfig>,

    /// Chassis collector configuration (if present, chassis collector is enabled)
    pub chassis: Configurable<SubsystemCollectorConfig>,

    /// Computer system collector configuration (if present, system collector is enabled)
    pub system: Configurable<SubsystemCollectorConfig>,
}

impl Default for CollectorsConfig {
    fn default() -> Self {
        Self {
            manager: Configurable::Enabled(SubsystemCollectorConfig::default()),
            chassis: Configurable::Enabled(SubsystemCollectorConfig::default()),
            system: Configurable::Enabled(SubsystemCollectorConfig::default()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubsystemCollectorConfig {
    /// Walk log services and their entries below each resource.
    pub log_services: bool,

    /// Number of log services fetched concurrently below one resource.
    pub log_service_concurrency: usize,
}

impl Default for SubsystemCollectorConfig {
    fn default() -> Self {
        Self {
            log_services: true,
            log_service_concurrency: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// URL scheme used to reach targets, targets are always passed without one.
    pub scheme: String,

    /// Accept self-signed BMC certificates.
    pub insecure: bool,

    /// Per request timeout towards the BMC, unbounded when unset.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            insecure: true,
            request_timeout: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, with `REDFISH_EXPORTER__` environment overrides.
    ///
    /// The file is read in full on every call; a missing or unreadable file is an error.
    pub fn load(config_path: &Path) -> Result<Self, ExporterError> {
        let contents = std::fs::read_to_string(config_path).map_err(|e| {
            ExporterError::Config(format!(
                "Failed to read {}: {e}",
                config_path.display()
            ))
        })?;

        Self::extract(
            Figment::new()
                .merge(Serialized::defaults(Config::default()))
                .merge(Toml::string(&contents))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
    }

    /// Parse configuration from TOML text only.
    pub fn from_toml_str(contents: &str) -> Result<Self, ExporterError> {
        Self::extract(
            Figment::new()
                .merge(Serialized::defaults(Config::default()))
                .merge(Toml::string(contents)),
        )
    }

    fn extract(figment: Figment) -> Result<Self, ExporterError> {
        let config: Config = figment
            .extract()
            .map_err(|e| ExporterError::Config(format!("Failed to load configuration: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ExporterError> {
        for (target, host) in &self.hosts {
            if host.username.is_empty() {
                return Err(ExporterError::Config(format!(
                    "host {target} has an empty username"
                )));
            }
        }

        for (name, group) in &self.groups {
            if group.username.is_some() != group.password.is_some() {
                return Err(ExporterError::Config(format!(
                    "group {name} must set both username and password, or neither"
                )));
            }
            if group.username.as_deref() == Some("") {
                return Err(ExporterError::Config(format!(
                    "group {name} has an empty username"
                )));
            }
        }

        for (name, collector) in [
            ("manager", &self.collectors.manager),
            ("chassis", &self.collectors.chassis),
            ("system", &self.collectors.system),
        ] {
            if let Configurable::Enabled(c) = collector
                && c.log_service_concurrency == 0
            {
                return Err(ExporterError::Config(format!(
                    "collectors.{name}.log_service_concurrency must be greater than 0"
                )));
            }
        }

        if !matches!(self.session.scheme.as_str(), "http" | "https") {
            return Err(ExporterError::Config(format!(
                "unsupported session scheme {}",
                self.session.scheme
            )));
        }

        Ok(())
    }

    /// Copy of the configuration safe to print, every password replaced.
    pub fn redacted(&self) -> Config {
        const REDACTED: &str = "<secret>";

        let mut config = self.clone();
        for host in config.hosts.values_mut() {
            host.password = REDACTED.to_string();
        }
        for group in config.groups.values_mut() {
            if group.password.is_some() {
                group.password = Some(REDACTED.to_string());
            }
        }
        config
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Configurable<T> {
    Enabled(T),
    Disabled,
}

impl<T> Configurable<T> {
    pub fn as_option(&self) -> Option<&T> {
        match self {
            Self::Enabled(v) => Some(v),
            Self::Disabled => None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled(_))
    }
}

impl<'de, T> Deserialize<'de> for Configurable<T>
where
    T: Deserialize<'de> + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Helper<T> {
            #[serde(default = "default_true")]
            enabled: bool,
            #[serde(flatten)]
            config: Option<T>,
        }

        fn default_true() -> bool {
            true
        }

        let helper_opt = Option::<Helper<T>>::deserialize(deserializer)?;

        match helper_opt {
            None => Ok(Configurable::Disabled),
            Some(helper) => {
                if !helper.enabled {
                    Ok(Configurable::Disabled)
                } else if let Some(cfg) = helper.config {
                    Ok(Configurable::Enabled(cfg))
                } else {
                    Ok(Configurable::Enabled(T::default()))
                }
            }
        }
    }
}
