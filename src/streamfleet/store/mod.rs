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

//! Contract required from the persistence layer for cluster records.
//! Individual record writes are expected to be last-writer-wins.

use crate::streamfleet::api::cluster::{Cluster, ClusterStatus};
use crate::streamfleet::util::error::BoxError;

/// Search criteria for locating a single cluster record.
#[derive(Clone, Debug, Default)]
pub struct FindClusterCriteria {
    pub cloud_provider: String,
    pub region: String,
    pub multi_az: bool,
    pub status: Option<ClusterStatus>,
    /// Record to leave out of the search (used for sibling lookups).
    pub exclude_cluster_id: Option<String>,
}

/// Aggregate row from the provider/region/status grouping query.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegionCapacity {
    pub cloud_provider: String,
    pub region: String,
    pub count: u32,
}

/// Number of tenant stream instances placed on one cluster.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StreamInstanceCount {
    pub cluster_id: String,
    pub count: u32,
}

/// CRUD-plus-query access to persisted cluster records.
pub trait ClusterStore: Send + Sync {
    /// Persists a new record as a pending creation job in `accepted` status.
    fn register_cluster_job(&self, cluster: &Cluster) -> Result<(), BoxError>;

    fn find_cluster(&self, criteria: &FindClusterCriteria) -> Result<Option<Cluster>, BoxError>;

    /// Full-record update.
    fn update(&self, cluster: &Cluster) -> Result<(), BoxError>;

    fn update_status(&self, cluster: &Cluster, status: ClusterStatus) -> Result<(), BoxError>;

    /// Batched schedulable-flag update for manual capacity planning.
    fn update_schedulable(&self, cluster_ids: &[String], schedulable: bool)
        -> Result<(), BoxError>;

    fn list_by_status(&self, status: ClusterStatus) -> Result<Vec<Cluster>, BoxError>;

    /// All known cluster records (ID fields populated).
    fn list_all(&self) -> Result<Vec<Cluster>, BoxError>;

    /// Cluster counts grouped by provider and region, restricted to the given
    /// providers, regions and statuses.
    fn count_by_provider_and_region(
        &self,
        providers: &[String],
        regions: &[String],
        statuses: &[ClusterStatus],
    ) -> Result<Vec<RegionCapacity>, BoxError>;

    /// Tenant stream-instance counts for the given clusters; clusters without
    /// instances may be absent from the result.
    fn stream_instance_counts(
        &self,
        cluster_ids: &[String],
    ) -> Result<Vec<StreamInstanceCount>, BoxError>;

    /// Returns the cluster only if at least one tenant stream is placed on it.
    fn find_non_empty_cluster(&self, cluster_id: &str) -> Result<Option<Cluster>, BoxError>;

    /// Soft-deletes the record; the remote cluster must already be gone.
    fn soft_delete(&self, cluster_id: &str) -> Result<(), BoxError>;
}
