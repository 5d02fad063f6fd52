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

//! Minimal Redfish client: session login/logout, authenticated GETs and the
//! handful of resource models the collectors read.

pub mod client;
pub mod model;

pub use client::{HttpRedfishClient, RedfishApi};

pub const SERVICE_ROOT: &str = "/redfish/v1";
pub const SESSIONS: &str = "/redfish/v1/SessionService/Sessions";

#[derive(thiserror::Error, Debug)]
pub enum RedfishError {
    #[error("HTTP request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{path} returned status {status}")]
    Status { path: String, status: u16 },

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid Redfish URL {0}")]
    InvalidUrl(String),

    #[error("Session response is missing the {0} header")]
    MissingSessionHeader(&'static str),

    #[error("Session is already closed")]
    SessionClosed,
}
