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

use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::ExporterError;
use crate::config::{Config, DEFAULT_HOST, HostConfig};

/// Credentials for one scrape of one target.
#[derive(Clone, PartialEq, Eq)]
pub struct TargetCredentials {
    pub address: String,
    pub username: String,
    pub password: String,
}

impl TargetCredentials {
    fn new(address: &str, host: HostConfig) -> Self {
        Self {
            address: address.to_string(),
            username: host.username,
            password: host.password,
        }
    }
}

/// Debug structure omits credentials
impl Debug for TargetCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetCredentials")
            .field("address", &self.address)
            .field("username", &self.username)
            .finish()
    }
}

/// Where credentials were found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Module(String),
    Host,
    GroupMember(String),
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found {
        credentials: TargetCredentials,
        source: CredentialSource,
    },
    NotFound,
}

impl Resolution {
    pub fn into_credentials(self) -> Option<TargetCredentials> {
        match self {
            Resolution::Found { credentials, .. } => Some(credentials),
            Resolution::NotFound => None,
        }
    }
}

impl Config {
    /// Credentials of the group named `module`, if it carries any.
    pub fn resolve_for_module(&self, address: &str, module: &str) -> Resolution {
        match self.groups.get(module).and_then(|g| g.credentials()) {
            Some(host) => Resolution::Found {
                credentials: TargetCredentials::new(address, host),
                source: CredentialSource::Module(module.to_string()),
            },
            None => Resolution::NotFound,
        }
    }

    /// Exact host entry, then a group listing the target as a member, then the default host.
    pub fn resolve_for_target(&self, address: &str) -> Resolution {
        if let Some(host) = self.hosts.get(address) {
            return Resolution::Found {
                credentials: TargetCredentials::new(address, host.clone()),
                source: CredentialSource::Host,
            };
        }

        // Sorted so a target listed in several groups always resolves the same way.
        let mut groups: Vec<_> = self
            .groups
            .iter()
            .filter(|(_, group)| group.members.iter().any(|m| m == address))
            .collect();
        groups.sort_by(|(a, _), (b, _)| a.cmp(b));
        for (name, group) in groups {
            if let Some(host) = group.credentials() {
                return Resolution::Found {
                    credentials: TargetCredentials::new(address, host),
                    source: CredentialSource::GroupMember(name.clone()),
                };
            }
        }

        match self.hosts.get(DEFAULT_HOST) {
            Some(host) => Resolution::Found {
                credentials: TargetCredentials::new(address, host.clone()),
                source: CredentialSource::Default,
            },
            None => Resolution::NotFound,
        }
    }

    /// Module first when one is given, falling back to the target itself.
    pub fn resolve(&self, address: &str, module: Option<&str>) -> Resolution {
        if let Some(module) = module.filter(|m| !m.is_empty()) {
            let resolution = self.resolve_for_module(address, module);
            if matches!(resolution, Resolution::Found { .. }) {
                return resolution;
            }
            tracing::debug!(bmc = address, module, "No credentials for module, trying target");
        }

        self.resolve_for_target(address)
    }
}

/// Holds the active configuration. Readers take a snapshot per call and never
/// observe a partially reloaded configuration.
pub struct CredentialStore {
    current: ArcSwap<Config>,
}

impl CredentialStore {
    pub fn new(config: Config) -> Self {
        Self {
            current: ArcSwap::from_pointee(config),
        }
    }

    pub fn snapshot(&self) -> Arc<Config> {
        self.current.load_full()
    }

    pub fn resolve_for_target(&self, address: &str) -> Result<TargetCredentials, ExporterError> {
        self.current
            .load()
            .resolve_for_target(address)
            .into_credentials()
            .ok_or_else(|| ExporterError::CredentialsNotFound(format!("target {address}")))
    }

    pub fn resolve_for_module(
        &self,
        address: &str,
        module: &str,
    ) -> Result<TargetCredentials, ExporterError> {
        self.current
            .load()
            .resolve_for_module(address, module)
            .into_credentials()
            .ok_or_else(|| ExporterError::CredentialsNotFound(format!("module {module}")))
    }

    /// Replace the active configuration.
    pub fn replace(&self, config: Config) {
        self.current.store(Arc::new(config));
    }

    /// Re-read `path` in full. On error the active configuration is kept.
    pub fn reload(&self, path: &Path) -> Result<(), ExporterError> {
        let config = Config::load(path)?;
        self.replace(config);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn store() -> CredentialStore {
        CredentialStore::new(
            Config::from_toml_str(
                r#"
[hosts."10.0.0.5"]
username = "direct"
password = "direct-pass"

[groups.rackA]
username = "rack"
password = "rack-pass"
members = ["10.0.1.1"]

[groups.empty]
members = ["10.0.2.1"]
"#,
            )
            .expect("valid config"),
        )
    }

    #[test]
    fn test_resolve_for_target_exact_match() {
        let creds = store()
            .resolve_for_target("10.0.0.5")
            .expect("target is configured");
        assert_eq!(creds.address, "10.0.0.5");
        assert_eq!(creds.username, "direct");
        assert_eq!(creds.password, "direct-pass");
    }

    #[test]
    fn test_resolve_for_target_group_membership() {
        let store = store();
        let resolution = store.snapshot().resolve_for_target("10.0.1.1");
        assert_eq!(
            resolution,
            Resolution::Found {
                credentials: TargetCredentials {
                    address: "10.0.1.1".to_string(),
                    username: "rack".to_string(),
                    password: "rack-pass".to_string(),
                },
                source: CredentialSource::GroupMember("rackA".to_string()),
            }
        );

        // Membership of a group without credentials resolves nothing.
        assert!(matches!(
            store.resolve_for_target("10.0.2.1"),
            Err(ExporterError::CredentialsNotFound(_))
        ));
    }

    #[test]
    fn test_resolve_for_target_default_host() {
        let mut config = store().snapshot().as_ref().clone();
        config.hosts.insert(
            DEFAULT_HOST.to_string(),
            HostConfig {
                username: "fallback".to_string(),
                password: "fallback-pass".to_string(),
            },
        );

        let resolution = config.resolve_for_target("192.168.0.1");
        let Resolution::Found {
            credentials,
            source,
        } = resolution
        else {
            panic!("default host should resolve")
        };
        assert_eq!(credentials.username, "fallback");
        assert_eq!(credentials.address, "192.168.0.1");
        assert_eq!(source, CredentialSource::Default);
    }

    #[test]
    fn test_resolve_prefers_module() {
        let config = store().snapshot();
        let Resolution::Found {
            credentials,
            source,
        } = config.resolve("10.0.0.5", Some("rackA"))
        else {
            panic!("module should resolve")
        };
        assert_eq!(credentials.username, "rack");
        assert_eq!(credentials.address, "10.0.0.5");
        assert_eq!(source, CredentialSource::Module("rackA".to_string()));
    }

    #[test]
    fn test_resolve_falls_back_to_target() {
        let config = store().snapshot();
        for module in [Some("unknown"), Some("empty"), Some(""), None] {
            let Resolution::Found {
                credentials,
                source,
            } = config.resolve("10.0.0.5", module)
            else {
                panic!("target should resolve for module {module:?}")
            };
            assert_eq!(credentials.username, "direct");
            assert_eq!(source, CredentialSource::Host);
        }
    }

    #[test]
    fn test_resolve_not_found() {
        let config = store().snapshot();
        assert_eq!(config.resolve("10.9.9.9", Some("rackB")), Resolution::NotFound);
        assert!(matches!(
            store().resolve_for_module("10.9.9.9", "rackB"),
            Err(ExporterError::CredentialsNotFound(_))
        ));
    }

    #[test]
    fn test_failed_reload_keeps_previous_config() {
        let store = store();
        let before = store.snapshot();

        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"[hosts.\"10.0.0.5\"\nusername = ")
            .expect("write config");

        assert!(store.reload(file.path()).is_err());
        let after = store.snapshot();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(
            store.resolve_for_target("10.0.0.5").expect("still configured"),
            TargetCredentials {
                address: "10.0.0.5".to_string(),
                username: "direct".to_string(),
                password: "direct-pass".to_string(),
            }
        );
    }

    #[test]
    fn test_reload_swaps_config() {
        let store = store();
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(
            br#"
[hosts."10.0.0.6"]
username = "new"
password = "new-pass"
"#,
        )
        .expect("write config");

        store.reload(file.path()).expect("reload should succeed");
        assert!(store.resolve_for_target("10.0.0.5").is_err());
        assert_eq!(
            store
                .resolve_for_target("10.0.0.6")
                .expect("new host")
                .username,
            "new"
        );
    }

    #[test]
    fn test_concurrent_reload_is_atomic() {
        fn config(generation: usize) -> Config {
            let mut config = Config::default();
            for host in ["10.0.0.1", "10.0.0.2", "10.0.0.3"] {
                config.hosts.insert(
                    host.to_string(),
                    HostConfig {
                        username: format!("user-{generation}"),
                        password: format!("pass-{generation}"),
                    },
                );
            }
            config
        }

        let store = Arc::new(CredentialStore::new(config(0)));

        let writer = {
            let store = store.clone();
            std::thread::spawn(move || {
                for generation in 1..500 {
                    store.replace(config(generation));
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        let snapshot = store.snapshot();
                        let users: Vec<_> = ["10.0.0.1", "10.0.0.2", "10.0.0.3"]
                            .iter()
                            .map(|h| {
                                snapshot
                                    .resolve_for_target(h)
                                    .into_credentials()
                                    .expect("always configured")
                            })
                            .collect();
                        // All hosts of one snapshot come from the same generation.
                        assert!(users.iter().all(|c| c.username == users[0].username));
                        let generation = users[0].username.trim_start_matches("user-");
                        assert!(users.iter().all(|c| c.password == format!("pass-{generation}")));
                    }
                })
            })
            .collect();

        writer.join().expect("writer panicked");
        for reader in readers {
            reader.join().expect("reader panicked");
        }
    }

    #[test]
    fn test_debug_hides_password() {
        let creds = store().resolve_for_target("10.0.0.5").expect("configured");
        assert!(!format!("{creds:?}").contains("direct-pass"));
    }
}
