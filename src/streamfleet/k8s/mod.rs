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

pub mod ingress;
pub mod meta;
pub mod namespace;
pub mod operators;
pub mod rbac;
pub mod secret;
pub mod storage;

use ingress::IngressController;
use namespace::Namespace;
use operators::{CatalogSource, OperatorGroup, Subscription};
use rbac::{ClusterRoleBinding, Group};
use secret::Secret;
use serde::Serialize;
use serde_json::Value;
use storage::StorageClass;

/// One typed resource in the desired bundle. Serializes transparently to the
/// inner resource so the wire form matches what the remote API stores.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BundleResource {
    StorageClass(StorageClass),
    IngressController(IngressController),
    Namespace(Namespace),
    Secret(Secret),
    CatalogSource(CatalogSource),
    OperatorGroup(OperatorGroup),
    Subscription(Subscription),
    Group(Group),
    ClusterRoleBinding(ClusterRoleBinding),
}

impl BundleResource {
    pub fn kind(&self) -> &str {
        match self {
            BundleResource::StorageClass(r) => &r.kind,
            BundleResource::IngressController(r) => &r.kind,
            BundleResource::Namespace(r) => &r.kind,
            BundleResource::Secret(r) => &r.kind,
            BundleResource::CatalogSource(r) => &r.kind,
            BundleResource::OperatorGroup(r) => &r.kind,
            BundleResource::Subscription(r) => &r.kind,
            BundleResource::Group(r) => &r.kind,
            BundleResource::ClusterRoleBinding(r) => &r.kind,
        }
    }

    pub fn api_version(&self) -> &str {
        match self {
            BundleResource::StorageClass(r) => &r.api_version,
            BundleResource::IngressController(r) => &r.api_version,
            BundleResource::Namespace(r) => &r.api_version,
            BundleResource::Secret(r) => &r.api_version,
            BundleResource::CatalogSource(r) => &r.api_version,
            BundleResource::OperatorGroup(r) => &r.api_version,
            BundleResource::Subscription(r) => &r.api_version,
            BundleResource::Group(r) => &r.api_version,
            BundleResource::ClusterRoleBinding(r) => &r.api_version,
        }
    }

    /// Generic wire representation of the resource.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
