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

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Lifecycle status of a managed cluster record. Only the reconciler mutates
/// this value; every transition is persisted after its side effect succeeds.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterStatus {
    /// Record exists but no remote cluster has been requested yet.
    #[serde(rename = "cluster_accepted")]
    Accepted,
    /// Creation was accepted by the remote API; waiting for it to come up.
    #[serde(rename = "cluster_provisioning")]
    Provisioning,
    /// Remote cluster is ready and the external opaque ID is recorded.
    #[serde(rename = "cluster_provisioned")]
    Provisioned,
    /// Addon chain installed; waiting for the fleet-shard operator to report in.
    WaitingForFleetShardOperator,
    /// Fully operational and accepting tenant streams.
    Ready,
    /// Remote deletion requested (or in flight).
    Deprovisioning,
    /// Remote cluster is gone; local teardown steps remain.
    Cleanup,
    /// Remote cluster reported a terminal error state.
    Failed,
}

impl ClusterStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            ClusterStatus::Accepted => "cluster_accepted",
            ClusterStatus::Provisioning => "cluster_provisioning",
            ClusterStatus::Provisioned => "cluster_provisioned",
            ClusterStatus::WaitingForFleetShardOperator => "waiting_for_fleet_shard_operator",
            ClusterStatus::Ready => "ready",
            ClusterStatus::Deprovisioning => "deprovisioning",
            ClusterStatus::Cleanup => "cleanup",
            ClusterStatus::Failed => "failed",
        }
    }

    /// Statuses that count toward usable or upcoming capacity in a region.
    pub const fn active_statuses() -> &'static [ClusterStatus] {
        &[
            ClusterStatus::Accepted,
            ClusterStatus::Provisioning,
            ClusterStatus::Provisioned,
            ClusterStatus::WaitingForFleetShardOperator,
            ClusterStatus::Ready,
        ]
    }
}

impl Display for ClusterStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted record for one managed cluster.
///
/// `cluster_id` is assigned when the remote API accepts the creation request;
/// `external_id` (the opaque ID) only once the remote cluster reaches its
/// ready precursor state. `cluster_dns` is written at most once.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// Internal record identifier.
    pub id: String,
    /// Identifier assigned by the remote cluster-management API.
    #[serde(default)]
    pub cluster_id: String,
    /// Opaque identifier assigned once the remote cluster is ready.
    #[serde(default)]
    pub external_id: String,
    pub cloud_provider: String,
    pub region: String,
    #[serde(default)]
    pub status: Option<ClusterStatus>,
    #[serde(default)]
    pub cluster_dns: String,
    /// Reference to the identity provider registered on the remote cluster.
    #[serde(default)]
    pub identity_provider_id: String,
    #[serde(default)]
    pub multi_az: bool,
    /// Whether new tenant streams may be placed on this cluster.
    #[serde(default)]
    pub schedulable: bool,
}

impl Cluster {
    /// Namespace that hosts this cluster's SSO client registration.
    pub fn sso_client_namespace(&self) -> String {
        format!("streamfleet-{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_string_forms_round_trip_through_serde() {
        for status in [
            ClusterStatus::Accepted,
            ClusterStatus::Provisioning,
            ClusterStatus::Provisioned,
            ClusterStatus::WaitingForFleetShardOperator,
            ClusterStatus::Ready,
            ClusterStatus::Deprovisioning,
            ClusterStatus::Cleanup,
            ClusterStatus::Failed,
        ] {
            let encoded = serde_json::to_string(&status).expect("encode");
            let decoded: ClusterStatus = serde_json::from_str(&encoded).expect("decode");
            assert_eq!(decoded, status);
        }
    }

    #[test]
    fn active_statuses_exclude_terminal_states() {
        let active = ClusterStatus::active_statuses();
        assert!(!active.contains(&ClusterStatus::Failed));
        assert!(!active.contains(&ClusterStatus::Deprovisioning));
        assert!(!active.contains(&ClusterStatus::Cleanup));
        assert!(active.contains(&ClusterStatus::Ready));
    }
}
