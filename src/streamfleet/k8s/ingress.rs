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

use super::meta::{LabelSelector, ObjectMeta};
use serde::{Deserialize, Serialize};

/// Ingress controller configuration bound to a cluster's public DNS suffix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngressController {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: IngressControllerSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngressControllerSpec {
    pub domain: String,
    #[serde(rename = "routeSelector", skip_serializing_if = "Option::is_none")]
    pub route_selector: Option<LabelSelector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    #[serde(rename = "nodePlacement", skip_serializing_if = "Option::is_none")]
    pub node_placement: Option<NodePlacement>,
    #[serde(
        rename = "endpointPublishingScope",
        skip_serializing_if = "Option::is_none"
    )]
    pub endpoint_publishing_scope: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodePlacement {
    #[serde(rename = "nodeSelector", skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<LabelSelector>,
}

impl IngressController {
    pub const KIND: &'static str = "IngressController";
    pub const API_VERSION: &'static str = "operator.ingress.k8s.io/v1";

    pub fn new(metadata: ObjectMeta, spec: IngressControllerSpec) -> Self {
        Self {
            api_version: Self::API_VERSION.to_string(),
            kind: Self::KIND.to_string(),
            metadata,
            spec,
        }
    }
}
