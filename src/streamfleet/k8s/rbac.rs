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
use serde::{Deserialize, Serialize};

/// User group granted read-only access on managed clusters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<String>,
}

impl Group {
    pub const KIND: &'static str = "Group";
    pub const API_VERSION: &'static str = "user.k8s.io/v1";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            api_version: Self::API_VERSION.to_string(),
            kind: Self::KIND.to_string(),
            metadata: ObjectMeta::named(name),
            users: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub kind: String,
    #[serde(rename = "apiGroup", skip_serializing_if = "Option::is_none")]
    pub api_group: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleRef {
    pub kind: String,
    #[serde(rename = "apiGroup")]
    pub api_group: String,
    pub name: String,
}

/// Cluster-wide binding of the read-only group to a cluster role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterRoleBinding {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subjects: Vec<Subject>,
    #[serde(rename = "roleRef")]
    pub role_ref: RoleRef,
}

impl ClusterRoleBinding {
    pub const KIND: &'static str = "ClusterRoleBinding";
    pub const API_VERSION: &'static str = "rbac.authorization.k8s.io/v1";
    pub const RBAC_API_GROUP: &'static str = "rbac.authorization.k8s.io";

    pub fn new(metadata: ObjectMeta, subjects: Vec<Subject>, role_ref: RoleRef) -> Self {
        Self {
            api_version: Self::API_VERSION.to_string(),
            kind: Self::KIND.to_string(),
            metadata,
            subjects,
            role_ref,
        }
    }
}
