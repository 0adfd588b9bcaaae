/*
 * Copyright (C) 2025 The Streamfleet Authors
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

use super::meta::ObjectMeta;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SECRET_TYPE_OPAQUE: &str = "Opaque";
pub const SECRET_TYPE_DOCKERCFG: &str = "kubernetes.io/dockercfg";
pub const DOCKERCFG_KEY: &str = ".dockercfg";

/// Minimal Secret resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Secret {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub secret_type: Option<String>,
    /// Base64-encoded entries.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
    #[serde(
        rename = "stringData",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub string_data: BTreeMap<String, String>,
}

impl Secret {
    pub const KIND: &'static str = "Secret";
    pub const API_VERSION: &'static str = "v1";

    pub fn opaque(metadata: ObjectMeta, string_data: BTreeMap<String, String>) -> Self {
        Self {
            api_version: Self::API_VERSION.to_string(),
            kind: Self::KIND.to_string(),
            metadata,
            secret_type: Some(SECRET_TYPE_OPAQUE.to_string()),
            data: BTreeMap::new(),
            string_data,
        }
    }

    /// Registry-credential secret holding an encoded dockercfg payload.
    pub fn dockercfg(metadata: ObjectMeta, docker_config: &str) -> Self {
        let mut data = BTreeMap::new();
        data.insert(
            DOCKERCFG_KEY.to_string(),
            BASE64_STANDARD.encode(docker_config.as_bytes()),
        );
        Self {
            api_version: Self::API_VERSION.to_string(),
            kind: Self::KIND.to_string(),
            metadata,
            secret_type: Some(SECRET_TYPE_DOCKERCFG.to_string()),
            data,
            string_data: BTreeMap::new(),
        }
    }
}
