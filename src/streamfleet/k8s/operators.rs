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

//! Operator-lifecycle resources used to subscribe managed clusters to the
//! observability operator catalog.

use super::meta::ObjectMeta;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSource {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: CatalogSourceSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSourceSpec {
    #[serde(rename = "sourceType")]
    pub source_type: String,
    pub image: String,
}

impl CatalogSource {
    pub const KIND: &'static str = "CatalogSource";
    pub const API_VERSION: &'static str = "operators.coreos.com/v1alpha1";

    pub fn new(metadata: ObjectMeta, spec: CatalogSourceSpec) -> Self {
        Self {
            api_version: Self::API_VERSION.to_string(),
            kind: Self::KIND.to_string(),
            metadata,
            spec,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorGroup {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: OperatorGroupSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperatorGroupSpec {
    #[serde(rename = "targetNamespaces", default)]
    pub target_namespaces: Vec<String>,
}

impl OperatorGroup {
    pub const KIND: &'static str = "OperatorGroup";
    pub const API_VERSION: &'static str = "operators.coreos.com/v1alpha2";

    pub fn new(metadata: ObjectMeta, target_namespaces: Vec<String>) -> Self {
        Self {
            api_version: Self::API_VERSION.to_string(),
            kind: Self::KIND.to_string(),
            metadata,
            spec: OperatorGroupSpec { target_namespaces },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: SubscriptionSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionSpec {
    #[serde(rename = "catalogSource")]
    pub catalog_source: String,
    #[serde(rename = "catalogSourceNamespace")]
    pub catalog_source_namespace: String,
    pub channel: String,
    #[serde(rename = "name")]
    pub package: String,
    #[serde(rename = "startingCSV", skip_serializing_if = "Option::is_none")]
    pub starting_csv: Option<String>,
    #[serde(rename = "installPlanApproval")]
    pub install_plan_approval: String,
}

impl Subscription {
    pub const KIND: &'static str = "Subscription";
    pub const API_VERSION: &'static str = "operators.coreos.com/v1alpha1";

    pub fn new(metadata: ObjectMeta, spec: SubscriptionSpec) -> Self {
        Self {
            api_version: Self::API_VERSION.to_string(),
            kind: Self::KIND.to_string(),
            metadata,
            spec,
        }
    }
}
