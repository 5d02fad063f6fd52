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

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use url::Url;

use crate::ExporterError;
use crate::config::SessionConfig;
use crate::credentials::TargetCredentials;
use crate::redfish::model::{
    Chassis, Collection, ComputerSystem, LogEntry, LogService, Manager, ODataRef, ServiceRoot,
};
use crate::redfish::{HttpRedfishClient, RedfishApi, RedfishError, SERVICE_ROOT};

/// Opens one authenticated Redfish session per scrape.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open(&self, credentials: &TargetCredentials) -> Result<Session, ExporterError>;
}

pub struct HttpSessionFactory {
    client: reqwest::Client,
    scheme: String,
}

impl HttpSessionFactory {
    pub fn new(config: &SessionConfig) -> Result<Self, ExporterError> {
        let mut builder = reqwest::Client::builder().danger_accept_invalid_certs(config.insecure);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            ExporterError::GenericError(format!("Failed to create HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            scheme: config.scheme.clone(),
        })
    }
}

#[async_trait]
impl SessionFactory for HttpSessionFactory {
    async fn open(&self, credentials: &TargetCredentials) -> Result<Session, ExporterError> {
        let address = &credentials.address;
        let base = Url::parse(&format!("{}://{}", self.scheme, address)).map_err(|_| {
            ExporterError::Connect {
                target: address.clone(),
                source: RedfishError::InvalidUrl(address.clone()),
            }
        })?;

        let client = HttpRedfishClient::connect(
            self.client.clone(),
            base,
            &credentials.username,
            &credentials.password,
        )
        .await
        .map_err(|source| ExporterError::Connect {
            target: address.clone(),
            source,
        })?;

        tracing::debug!(bmc = %address, "Redfish session opened");
        Ok(Session::new(address.clone(), Arc::new(client)))
    }
}

/// Sole owner of one Redfish connection.
///
/// Logout runs exactly once: through [`Session::close`], or from `Drop` on the
/// current runtime when the owner never closed it.
pub struct Session {
    target: String,
    api: Option<Arc<dyn RedfishApi>>,
    service_root: OnceCell<ServiceRoot>,
}

impl Session {
    pub fn new(target: String, api: Arc<dyn RedfishApi>) -> Self {
        Self {
            target,
            api: Some(api),
            service_root: OnceCell::new(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, RedfishError> {
        let api = self.api.as_ref().ok_or(RedfishError::SessionClosed)?;
        let value = api.get(path).await?;
        serde_json::from_value(value).map_err(|source| RedfishError::Decode {
            path: path.to_string(),
            source,
        })
    }

    pub async fn service_root(&self) -> Result<&ServiceRoot, RedfishError> {
        self.service_root
            .get_or_try_init(|| self.get(SERVICE_ROOT))
            .await
    }

    /// Members of a collection, following `Members@odata.nextLink` pages.
    /// Members the BMC did not expand inline are fetched.
    pub async fn members<T: DeserializeOwned>(
        &self,
        collection: &ODataRef,
    ) -> Result<Vec<T>, RedfishError> {
        let mut members = Vec::new();
        let mut next = Some(collection.odata_id.clone());
        let mut visited = HashSet::new();

        while let Some(path) = next.take() {
            if !visited.insert(path.clone()) {
                tracing::warn!(bmc = %self.target, path = %path, "Collection links back to a visited page");
                break;
            }

            let page: Collection = self.get(&path).await?;
            for member in page.members {
                let member = match ODataRef::from_link_only(&member) {
                    Some(link) => self.get(&link.odata_id).await?,
                    None => serde_json::from_value(member).map_err(|source| {
                        RedfishError::Decode {
                            path: path.clone(),
                            source,
                        }
                    })?,
                };
                members.push(member);
            }
            next = page.next_link;
        }

        Ok(members)
    }

    async fn optional_members<T: DeserializeOwned>(
        &self,
        collection: Option<&ODataRef>,
    ) -> Result<Vec<T>, RedfishError> {
        match collection {
            Some(collection) => self.members(collection).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn managers(&self) -> Result<Vec<Manager>, RedfishError> {
        let root = self.service_root().await?;
        self.optional_members(root.managers.as_ref()).await
    }

    pub async fn chassis(&self) -> Result<Vec<Chassis>, RedfishError> {
        let root = self.service_root().await?;
        self.optional_members(root.chassis.as_ref()).await
    }

    pub async fn systems(&self) -> Result<Vec<ComputerSystem>, RedfishError> {
        let root = self.service_root().await?;
        self.optional_members(root.systems.as_ref()).await
    }

    pub async fn log_services(
        &self,
        collection: Option<&ODataRef>,
    ) -> Result<Vec<LogService>, RedfishError> {
        self.optional_members(collection).await
    }

    pub async fn log_entries(&self, service: &LogService) -> Result<Vec<LogEntry>, RedfishError> {
        self.optional_members(service.entries.as_ref()).await
    }

    /// Log out and release the connection.
    pub async fn close(mut self) {
        if let Some(api) = self.api.take() {
            match api.logout().await {
                Ok(()) => tracing::debug!(bmc = %self.target, "Redfish session closed"),
                Err(e) => {
                    tracing::warn!(bmc = %self.target, error = ?e, "Failed to log out of Redfish session")
                }
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let Some(api) = self.api.take() else {
            return;
        };
        let target = std::mem::take(&mut self.target);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = api.logout().await {
                        tracing::warn!(bmc = %target, error = ?e, "Failed to log out of dropped Redfish session");
                    }
                });
            }
            Err(_) => {
                tracing::warn!(bmc = %target, "Redfish session dropped outside of a runtime, logout skipped");
            }
        }
    }
}
