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

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::signal::unix::{SignalKind, signal};

use crate::ExporterError;
use crate::credentials::CredentialStore;
use crate::metrics::ExporterMetrics;

/// Re-reads the configuration file into the credential store.
///
/// Reloads from SIGHUP and from HTTP are serialized, so a slower reload never
/// stores an older file over a newer one.
pub struct ConfigReloader {
    store: Arc<CredentialStore>,
    path: PathBuf,
    metrics: ExporterMetrics,
    lock: Mutex<()>,
}

impl ConfigReloader {
    pub fn new(store: Arc<CredentialStore>, path: PathBuf, metrics: ExporterMetrics) -> Self {
        Self {
            store,
            path,
            metrics,
            lock: Mutex::new(()),
        }
    }

    /// On failure the previous configuration stays active.
    pub fn reload(&self) -> Result<(), ExporterError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let result = self.store.reload(&self.path);
        match &result {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "Configuration reloaded");
            }
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Configuration reload failed, keeping previous configuration");
            }
        }
        self.metrics.record_reload(result.is_ok());
        result
    }
}

/// Reloads the configuration on every SIGHUP until the process ends.
pub async fn watch_hangup(reloader: Arc<ConfigReloader>) -> Result<(), ExporterError> {
    let mut hup_signal = signal(SignalKind::hangup())?;

    while hup_signal.recv().await.is_some() {
        tracing::info!("Hangup received, reloading configuration");
        // Failures are logged by the reloader.
        let _ = reloader.reload();
    }

    Ok(())
}
