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

use crate::streamfleet::api::cluster::Cluster;
use crate::streamfleet::util::error::BoxError;

/// Per-cluster provisioning hooks for the fleet-shard operator addon
/// (service accounts and credentials the agent needs on the cluster).
pub trait FleetShardAddonService: Send + Sync {
    /// Ensures the addon's service account and parameters exist for the
    /// cluster. Returns `true` when work was performed, `false` when
    /// everything was already in place.
    fn provision(&self, cluster: &Cluster) -> Result<bool, BoxError>;

    /// Removes the addon's service account during cluster teardown. Safe to
    /// call repeatedly.
    fn remove_service_account(&self, cluster: &Cluster) -> Result<(), BoxError>;
}
