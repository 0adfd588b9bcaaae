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

//! Capacity planning for the fleet. In auto mode each supported
//! provider/region pair is kept at minimum capacity by registering creation
//! jobs; in manual mode the static cluster table drives schedulability and
//! creation.

use crate::streamfleet::api::cluster::{Cluster, ClusterStatus};
use crate::streamfleet::config::ApplicationConfig;
use crate::streamfleet::logger;
use crate::streamfleet::store::{ClusterStore, FindClusterCriteria};
use crate::streamfleet::util::error::{new_error, with_context, BoxError};
use std::collections::HashMap;
use std::sync::Arc;

const COMPONENT: &str = "capacity-planner";

pub struct CapacityPlanner {
    config: Arc<ApplicationConfig>,
    store: Arc<dyn ClusterStore>,
}

impl CapacityPlanner {
    pub fn new(config: Arc<ApplicationConfig>, store: Arc<dyn ClusterStore>) -> Self {
        Self { config, store }
    }

    /// Auto-mode pass: registers a creation job for every supported
    /// provider/region pair with no active cluster. A failed registration is
    /// logged and the pass continues with the remaining pairs.
    pub fn reconcile_regions(&self) -> Result<(), BoxError> {
        let providers: Vec<String> = self
            .config
            .providers
            .supported_providers
            .iter()
            .map(|p| p.name.clone())
            .collect();
        let regions: Vec<String> = self
            .config
            .providers
            .supported_providers
            .iter()
            .flat_map(|p| p.regions.iter().map(|r| r.name.clone()))
            .collect();
        if providers.is_empty() {
            return Ok(());
        }

        let capacities = self
            .store
            .count_by_provider_and_region(&providers, &regions, ClusterStatus::active_statuses())
            .map_err(|e| with_context(e, "count active clusters by provider and region"))?;

        let mut counts: HashMap<(String, String), u32> = HashMap::new();
        for capacity in capacities {
            counts.insert((capacity.cloud_provider, capacity.region), capacity.count);
        }

        for provider in &self.config.providers.supported_providers {
            for region in &provider.regions {
                let key = (provider.name.clone(), region.name.clone());
                if counts.get(&key).copied().unwrap_or(0) > 0 {
                    continue;
                }
                let cluster = Cluster {
                    cloud_provider: provider.name.clone(),
                    region: region.name.clone(),
                    multi_az: self.config.cluster.multi_az,
                    status: Some(ClusterStatus::Accepted),
                    ..Cluster::default()
                };
                match self.store.register_cluster_job(&cluster) {
                    Ok(()) => logger::log_info(
                        COMPONENT,
                        "cluster creation job registered",
                        &[
                            ("cloud_provider", &provider.name),
                            ("region", &region.name),
                        ],
                    ),
                    Err(err) => logger::log_error(
                        COMPONENT,
                        "failed to register cluster creation job",
                        &[
                            ("cloud_provider", &provider.name),
                            ("region", &region.name),
                            ("error", &err.to_string()),
                        ],
                    ),
                }
            }
        }
        Ok(())
    }

    /// Manual-mode pass: partitions the static cluster table by remaining
    /// stream-instance headroom and writes the schedulable flag in two
    /// batches. Unknown table entries become creation jobs. Failures are
    /// collected so one batch cannot shadow the other.
    pub fn reconcile_manual_clusters(&self) -> Result<(), BoxError> {
        let manual = &self.config.cluster.manual_clusters;
        if manual.is_empty() {
            return Ok(());
        }

        let known = self
            .store
            .list_all()
            .map_err(|e| with_context(e, "list clusters for manual capacity pass"))?;
        let known_ids: Vec<String> = known.iter().map(|c| c.cluster_id.clone()).collect();

        let manual_ids: Vec<String> = manual.iter().map(|c| c.cluster_id.clone()).collect();
        let instance_counts = self
            .store
            .stream_instance_counts(&manual_ids)
            .map_err(|e| with_context(e, "count stream instances for manual clusters"))?;
        let mut counts: HashMap<&str, u32> = HashMap::new();
        for row in &instance_counts {
            counts.insert(row.cluster_id.as_str(), row.count);
        }

        let mut schedulable = Vec::new();
        let mut unschedulable = Vec::new();
        let mut failures: Vec<String> = Vec::new();

        for entry in manual {
            if !known_ids.contains(&entry.cluster_id) {
                let cluster = Cluster {
                    cluster_id: entry.cluster_id.clone(),
                    multi_az: self.config.cluster.multi_az,
                    status: Some(ClusterStatus::Accepted),
                    schedulable: entry.schedulable,
                    ..Cluster::default()
                };
                if let Err(err) = self.store.register_cluster_job(&cluster) {
                    failures.push(format!(
                        "register manual cluster '{}': {err}",
                        entry.cluster_id
                    ));
                }
                continue;
            }

            // Clusters absent from the count query hold no instances.
            let count = counts.get(entry.cluster_id.as_str()).copied().unwrap_or(0);
            if entry.schedulable && count < entry.stream_instance_limit {
                schedulable.push(entry.cluster_id.clone());
            } else {
                unschedulable.push(entry.cluster_id.clone());
            }
        }

        if !schedulable.is_empty() {
            if let Err(err) = self.store.update_schedulable(&schedulable, true) {
                failures.push(format!("mark clusters schedulable: {err}"));
            }
        }
        if !unschedulable.is_empty() {
            if let Err(err) = self.store.update_schedulable(&unschedulable, false) {
                failures.push(format!("mark clusters unschedulable: {err}"));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(new_error(format!(
                "manual capacity pass finished with errors: {}",
                failures.join("; ")
            )))
        }
    }

    /// Auto-mode surplus check for a ready cluster. The cluster is marked
    /// for deprovisioning only when it hosts no tenant streams and its
    /// provider/region keeps at least one other active cluster.
    pub fn deprovision_if_surplus(&self, cluster: &Cluster) -> Result<bool, BoxError> {
        let non_empty = self
            .store
            .find_non_empty_cluster(&cluster.cluster_id)
            .map_err(|e| {
                with_context(
                    e,
                    format!("check tenant streams on cluster '{}'", cluster.cluster_id),
                )
            })?;
        if non_empty.is_some() {
            return Ok(false);
        }

        let capacities = self
            .store
            .count_by_provider_and_region(
                &[cluster.cloud_provider.clone()],
                &[cluster.region.clone()],
                ClusterStatus::active_statuses(),
            )
            .map_err(|e| with_context(e, "count sibling clusters for surplus check"))?;
        let siblings = capacities
            .iter()
            .find(|c| c.cloud_provider == cluster.cloud_provider && c.region == cluster.region)
            .map(|c| c.count)
            .unwrap_or(0);
        if siblings < 2 {
            return Ok(false);
        }

        self.store
            .update_status(cluster, ClusterStatus::Deprovisioning)
            .map_err(|e| {
                with_context(
                    e,
                    format!("mark cluster '{}' for deprovisioning", cluster.cluster_id),
                )
            })?;
        logger::log_info(
            COMPONENT,
            "empty cluster marked for deprovisioning",
            &[("cluster_id", &cluster.cluster_id)],
        );
        Ok(true)
    }

    /// Locates a ready sibling that can absorb tenants from the given
    /// cluster. Used as the auto-mode guard before remote deletion.
    pub fn find_ready_sibling(&self, cluster: &Cluster) -> Result<Option<Cluster>, BoxError> {
        self.store
            .find_cluster(&FindClusterCriteria {
                cloud_provider: cluster.cloud_provider.clone(),
                region: cluster.region.clone(),
                multi_az: cluster.multi_az,
                status: Some(ClusterStatus::Ready),
                exclude_cluster_id: Some(cluster.cluster_id.clone()),
            })
            .map_err(|e| with_context(e, "find ready sibling cluster"))
    }
}
