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

//! Contract required from the remote cluster-management API. Transport and
//! authentication belong to the implementation, not to this crate.

use crate::streamfleet::util::error::BoxError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt;

/// Error surfaced by the remote cluster-management API.
#[derive(Debug)]
pub enum ApiError {
    /// The addressed object does not exist on the remote side.
    NotFound(String),
    /// The object already exists or clashes with an existing one.
    Conflict(String),
    /// Transport failure or any other non-semantic error.
    Other(BoxError),
}

impl ApiError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, ApiError::Conflict(_))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "not found: {msg}"),
            ApiError::Conflict(msg) => write!(f, "conflict: {msg}"),
            ApiError::Other(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ApiError::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// State reported by the remote API for a managed cluster.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RemoteClusterState {
    Pending,
    Installing,
    Ready,
    Error,
}

/// Remote view of one managed cluster.
#[derive(Clone, Debug, Default)]
pub struct RemoteCluster {
    pub id: String,
    pub state: Option<RemoteClusterState>,
    /// Opaque ID assigned once the cluster reaches its ready precursor state.
    pub external_id: Option<String>,
}

/// Parameters for a cluster-creation request.
#[derive(Clone, Debug)]
pub struct ClusterSpec {
    pub cloud_provider: String,
    pub region: String,
    pub multi_az: bool,
}

/// Outcome of a cluster deletion request. The remote delete is asynchronous:
/// "accepted" means in flight, "gone" means the cluster no longer exists.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DeleteOutcome {
    Accepted,
    Gone,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AddonState {
    Installing,
    Ready,
    Failed,
}

/// Install/readiness state of one operator addon on one cluster.
#[derive(Clone, Debug, Default)]
pub struct AddonInstallation {
    pub id: String,
    pub state: Option<AddonState>,
}

impl AddonInstallation {
    pub fn is_ready(&self) -> bool {
        self.state == Some(AddonState::Ready)
    }
}

/// Named collection of declarative resources applied to a managed cluster.
/// Resources read back from the remote API arrive in generic form.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceBundle {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub resources: Vec<Value>,
}

/// OpenID connect settings of a cluster identity provider.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenIdProvider {
    pub client_id: String,
    pub client_secret: String,
    pub issuer: String,
}

/// Identity provider object registered on a managed cluster.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityProvider {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_id: Option<OpenIdProvider>,
}

/// Synchronous client for the remote cluster-management API.
pub trait ClusterApi: Send + Sync {
    fn create_cluster(&self, spec: &ClusterSpec) -> Result<RemoteCluster, ApiError>;

    fn get_cluster(&self, cluster_id: &str) -> Result<RemoteCluster, ApiError>;

    fn delete_cluster(&self, cluster_id: &str) -> Result<DeleteOutcome, ApiError>;

    /// Returns `None` when the addon was never requested for the cluster.
    fn get_addon(&self, cluster_id: &str, addon_id: &str)
        -> Result<Option<AddonInstallation>, ApiError>;

    fn create_addon(&self, cluster_id: &str, addon_id: &str)
        -> Result<AddonInstallation, ApiError>;

    /// Returns `None` when no bundle with this ID exists on the cluster.
    fn get_resource_bundle(
        &self,
        cluster_id: &str,
        bundle_id: &str,
    ) -> Result<Option<ResourceBundle>, ApiError>;

    fn create_resource_bundle(
        &self,
        cluster_id: &str,
        bundle: &ResourceBundle,
    ) -> Result<ResourceBundle, ApiError>;

    fn update_resource_bundle(
        &self,
        cluster_id: &str,
        bundle_id: &str,
        bundle: &ResourceBundle,
    ) -> Result<ResourceBundle, ApiError>;

    /// Application DNS suffix for the cluster.
    fn get_cluster_dns(&self, cluster_id: &str) -> Result<String, ApiError>;

    fn create_identity_provider(
        &self,
        cluster_id: &str,
        provider: &IdentityProvider,
    ) -> Result<IdentityProvider, ApiError>;

    fn list_identity_providers(&self, cluster_id: &str)
        -> Result<Vec<IdentityProvider>, ApiError>;
}
