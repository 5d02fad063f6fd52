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

use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;

/// BMCs send `null` for properties they do not populate; treat it like an absent one.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `{"@odata.id": "..."}` link to another resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ODataRef {
    #[serde(rename = "@odata.id")]
    pub odata_id: String,
}

impl ODataRef {
    pub fn new(odata_id: impl Into<String>) -> Self {
        Self {
            odata_id: odata_id.into(),
        }
    }

    /// A member entry that carries only its link, and has to be fetched.
    pub fn from_link_only(value: &JsonValue) -> Option<Self> {
        let object = value.as_object()?;
        if object.len() != 1 {
            return None;
        }
        object
            .get("@odata.id")
            .and_then(JsonValue::as_str)
            .map(ODataRef::new)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Collection {
    #[serde(deserialize_with = "null_as_default")]
    pub members: Vec<JsonValue>,
    #[serde(rename = "Members@odata.nextLink")]
    pub next_link: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ServiceRoot {
    pub managers: Option<ODataRef>,
    pub chassis: Option<ODataRef>,
    pub systems: Option<ODataRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Status {
    pub state: Option<String>,
    pub health: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Manager {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub model: Option<String>,
    pub manager_type: Option<String>,
    pub power_state: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub status: Status,
    pub log_services: Option<ODataRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Chassis {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub model: Option<String>,
    pub chassis_type: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub status: Status,
    pub log_services: Option<ODataRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ComputerSystem {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub model: Option<String>,
    pub system_type: Option<String>,
    pub power_state: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub status: Status,
    pub log_services: Option<ODataRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LogService {
    #[serde(rename = "@odata.id")]
    pub odata_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub service_enabled: Option<bool>,
    #[serde(rename = "OverWritePolicy")]
    pub overwrite_policy: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub status: Status,
    pub entries: Option<ODataRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LogEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub entry_code: Option<String>,
    pub entry_type: Option<String>,
    pub message_id: Option<String>,
    pub sensor_number: Option<i64>,
    pub sensor_type: Option<String>,
    pub severity: Option<String>,
}
