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

//! Per-tick orchestration of the cluster fleet. One pass runs capacity
//! planning and then walks every lifecycle status; a failure on one cluster
//! is recorded and never stops the rest of the pass.

use crate::streamfleet::api::cluster::{Cluster, ClusterStatus};
use crate::streamfleet::clients::fleetshard::FleetShardAddonService;
use crate::streamfleet::clients::remote::{ApiError, ClusterApi, ClusterSpec, DeleteOutcome};
use crate::streamfleet::clients::sso::SsoService;
use crate::streamfleet::config::{ApplicationConfig, ScalingMode};
use crate::streamfleet::controller::addons::AddonInstaller;
use crate::streamfleet::controller::bundle::BundleReconciler;
use crate::streamfleet::controller::identity::IdentityProviderReconciler;
use crate::streamfleet::controller::scaling::CapacityPlanner;
use crate::streamfleet::controller::state::{plan_status_transition, StatusPlan};
use crate::streamfleet::logger;
use crate::streamfleet::store::ClusterStore;
use crate::streamfleet::util::error::{with_context, BoxError};
use std::sync::Arc;

const COMPONENT: &str = "cluster-manager";

/// Errors collected over one reconcile pass, keyed by the failing scope
/// (a cluster record ID or a planning stage).
#[derive(Default)]
pub struct ReconcileSummary {
    pub errors: Vec<(String, BoxError)>,
}

impl ReconcileSummary {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    fn record(&mut self, scope: impl Into<String>, error: BoxError) {
        self.errors.push((scope.into(), error));
    }
}

pub struct ClusterManager {
    config: Arc<ApplicationConfig>,
    store: Arc<dyn ClusterStore>,
    api: Arc<dyn ClusterApi>,
    sso: Arc<dyn SsoService>,
    fleet_shard: Arc<dyn FleetShardAddonService>,
    bundle: BundleReconciler,
    identity: IdentityProviderReconciler,
    addons: AddonInstaller,
    planner: CapacityPlanner,
}

impl ClusterManager {
    pub fn new(
        config: Arc<ApplicationConfig>,
        store: Arc<dyn ClusterStore>,
        api: Arc<dyn ClusterApi>,
        sso: Arc<dyn SsoService>,
        fleet_shard: Arc<dyn FleetShardAddonService>,
    ) -> Self {
        let bundle = BundleReconciler::new(config.clone(), api.clone());
        let identity = IdentityProviderReconciler::new(api.clone(), sso.clone(), store.clone());
        let addons = AddonInstaller::new(
            config.clone(),
            api.clone(),
            fleet_shard.clone(),
            store.clone(),
        );
        let planner = CapacityPlanner::new(config.clone(), store.clone());
        Self {
            config,
            store,
            api,
            sso,
            fleet_shard,
            bundle,
            identity,
            addons,
            planner,
        }
    }

    /// Runs one full reconcile pass over the fleet.
    pub fn reconcile(&self) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();

        let planning = match self.config.cluster.scaling_mode {
            ScalingMode::Auto => self.planner.reconcile_regions(),
            ScalingMode::Manual => self.planner.reconcile_manual_clusters(),
        };
        if let Err(err) = planning {
            summary.record("capacity-planning", err);
        }

        self.reconcile_status(
            ClusterStatus::Accepted,
            &mut summary,
            |cluster| self.reconcile_accepted_cluster(cluster),
        );
        self.reconcile_status(
            ClusterStatus::Provisioning,
            &mut summary,
            |cluster| self.reconcile_cluster_status(cluster),
        );
        self.reconcile_status(
            ClusterStatus::Provisioned,
            &mut summary,
            |cluster| self.reconcile_provisioned_cluster(cluster),
        );
        self.reconcile_status(
            ClusterStatus::Ready,
            &mut summary,
            |cluster| self.reconcile_ready_cluster(cluster),
        );
        self.reconcile_status(
            ClusterStatus::Deprovisioning,
            &mut summary,
            |cluster| self.reconcile_deprovisioning_cluster(cluster),
        );
        self.reconcile_status(
            ClusterStatus::Cleanup,
            &mut summary,
            |cluster| self.reconcile_cleanup_cluster(cluster),
        );

        summary
    }

    fn reconcile_status<F>(
        &self,
        status: ClusterStatus,
        summary: &mut ReconcileSummary,
        handler: F,
    ) where
        F: Fn(&Cluster) -> Result<(), BoxError>,
    {
        let clusters = match self.store.list_by_status(status) {
            Ok(clusters) => clusters,
            Err(err) => {
                summary.record(
                    format!("list:{status}"),
                    with_context(err, format!("list clusters in status '{status}'")),
                );
                return;
            }
        };
        for cluster in &clusters {
            if let Err(err) = handler(cluster) {
                logger::log_error(
                    COMPONENT,
                    "cluster reconcile failed",
                    &[
                        ("cluster_id", &cluster.id),
                        ("status", status.as_str()),
                        ("error", &err.to_string()),
                    ],
                );
                summary.record(cluster.id.clone(), err);
            }
        }
    }

    /// Requests remote creation for an accepted record and moves it to
    /// `provisioning`, persisting the assigned remote cluster ID.
    fn reconcile_accepted_cluster(&self, cluster: &Cluster) -> Result<(), BoxError> {
        let remote = self
            .api
            .create_cluster(&ClusterSpec {
                cloud_provider: cluster.cloud_provider.clone(),
                region: cluster.region.clone(),
                multi_az: cluster.multi_az,
            })
            .map_err(|e| {
                with_context(
                    Box::new(e),
                    format!("request remote creation for cluster '{}'", cluster.id),
                )
            })?;

        let mut updated = cluster.clone();
        updated.cluster_id = remote.id;
        updated.status = Some(ClusterStatus::Provisioning);
        self.store.update(&updated).map_err(|e| {
            with_context(e, format!("persist provisioning cluster '{}'", cluster.id))
        })?;
        logger::log_info(
            COMPONENT,
            "remote cluster creation requested",
            &[("cluster_id", &updated.cluster_id)],
        );
        Ok(())
    }

    /// Polls the remote cluster state and applies the planned transition.
    /// The external opaque ID travels with the `provisioned` status in one
    /// record update.
    fn reconcile_cluster_status(&self, cluster: &Cluster) -> Result<(), BoxError> {
        let observed = self.api.get_cluster(&cluster.cluster_id).map_err(|e| {
            with_context(
                Box::new(e),
                format!("poll remote state of cluster '{}'", cluster.cluster_id),
            )
        })?;

        match plan_status_transition(cluster.status, &observed)? {
            StatusPlan::NoChange => Ok(()),
            StatusPlan::Transition {
                next,
                external_id: Some(external_id),
            } => {
                let mut updated = cluster.clone();
                updated.status = Some(next);
                updated.external_id = external_id;
                self.store.update(&updated).map_err(|e| {
                    with_context(e, format!("persist status for cluster '{}'", cluster.id))
                })?;
                logger::log_info(
                    COMPONENT,
                    "cluster status advanced",
                    &[("cluster_id", &cluster.cluster_id), ("status", next.as_str())],
                );
                Ok(())
            }
            StatusPlan::Transition {
                next,
                external_id: None,
            } => {
                self.store.update_status(cluster, next).map_err(|e| {
                    with_context(e, format!("persist status for cluster '{}'", cluster.id))
                })?;
                logger::log_info(
                    COMPONENT,
                    "cluster status advanced",
                    &[("cluster_id", &cluster.cluster_id), ("status", next.as_str())],
                );
                Ok(())
            }
        }
    }

    /// Resolves the cluster's application DNS suffix. The suffix is queried
    /// and persisted at most once.
    fn reconcile_cluster_dns(&self, cluster: &Cluster) -> Result<Cluster, BoxError> {
        if !cluster.cluster_dns.is_empty() {
            return Ok(cluster.clone());
        }
        let dns = self.api.get_cluster_dns(&cluster.cluster_id).map_err(|e| {
            with_context(
                Box::new(e),
                format!("resolve DNS for cluster '{}'", cluster.cluster_id),
            )
        })?;
        let mut updated = cluster.clone();
        updated.cluster_dns = dns;
        self.store.update(&updated).map_err(|e| {
            with_context(e, format!("persist DNS for cluster '{}'", cluster.id))
        })?;
        Ok(updated)
    }

    fn reconcile_provisioned_cluster(&self, cluster: &Cluster) -> Result<(), BoxError> {
        let cluster = self.reconcile_cluster_dns(cluster)?;
        self.bundle.reconcile(&cluster, &cluster.cluster_dns)?;
        self.identity.reconcile(&cluster, &cluster.cluster_dns)?;
        self.addons.reconcile(&cluster)
    }

    fn reconcile_ready_cluster(&self, cluster: &Cluster) -> Result<(), BoxError> {
        let cluster = self.reconcile_cluster_dns(cluster)?;
        self.bundle.reconcile(&cluster, &cluster.cluster_dns)?;
        self.identity.reconcile(&cluster, &cluster.cluster_dns)?;
        if self.config.cluster.scaling_mode == ScalingMode::Auto {
            self.planner.deprovision_if_surplus(&cluster)?;
        }
        Ok(())
    }

    /// Requests remote deletion. In auto mode the cluster is first checked
    /// for a ready sibling; without one, deprovisioning is aborted and the
    /// cluster returns to `ready` so tenants are never stranded.
    fn reconcile_deprovisioning_cluster(&self, cluster: &Cluster) -> Result<(), BoxError> {
        if self.config.cluster.scaling_mode == ScalingMode::Auto {
            let sibling = self.planner.find_ready_sibling(cluster)?;
            if sibling.is_none() {
                self.store
                    .update_status(cluster, ClusterStatus::Ready)
                    .map_err(|e| {
                        with_context(
                            e,
                            format!("restore cluster '{}' to ready", cluster.cluster_id),
                        )
                    })?;
                logger::log_warn(
                    COMPONENT,
                    "deprovisioning aborted, no ready sibling",
                    &[("cluster_id", &cluster.cluster_id)],
                );
                return Ok(());
            }
        }

        let outcome = match self.api.delete_cluster(&cluster.cluster_id) {
            Ok(outcome) => outcome,
            // An already-deleted cluster counts as terminal deletion.
            Err(ApiError::NotFound(_)) => DeleteOutcome::Gone,
            Err(err) => {
                return Err(with_context(
                    Box::new(err),
                    format!("delete remote cluster '{}'", cluster.cluster_id),
                ))
            }
        };

        match outcome {
            // The remote delete is asynchronous; wait for the next tick.
            DeleteOutcome::Accepted => Ok(()),
            DeleteOutcome::Gone => {
                self.store
                    .update_status(cluster, ClusterStatus::Cleanup)
                    .map_err(|e| {
                        with_context(
                            e,
                            format!("persist cleanup status for cluster '{}'", cluster.id),
                        )
                    })?;
                logger::log_info(
                    COMPONENT,
                    "remote cluster deleted",
                    &[("cluster_id", &cluster.cluster_id)],
                );
                Ok(())
            }
        }
    }

    /// Three-step teardown: SSO client deregistration, fleet-shard service
    /// account removal, then soft delete of the record. Any failing step
    /// aborts the sequence with status unchanged so it re-runs from the top.
    fn reconcile_cleanup_cluster(&self, cluster: &Cluster) -> Result<(), BoxError> {
        self.sso
            .deregister_client(&cluster.sso_client_namespace())
            .map_err(|e| {
                with_context(
                    e,
                    format!("deregister SSO client for cluster '{}'", cluster.id),
                )
            })?;
        self.fleet_shard.remove_service_account(cluster).map_err(|e| {
            with_context(
                e,
                format!("remove fleet-shard service account for cluster '{}'", cluster.id),
            )
        })?;
        self.store.soft_delete(&cluster.id).map_err(|e| {
            with_context(e, format!("soft delete cluster record '{}'", cluster.id))
        })?;
        logger::log_info(
            COMPONENT,
            "cluster record deleted",
            &[("cluster_id", &cluster.id)],
        );
        Ok(())
    }
}
