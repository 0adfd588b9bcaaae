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

//! Installs the operator addon chain on provisioned clusters. The base
//! streaming-platform operator must report ready before the fleet-shard
//! operator addon is requested.

use crate::streamfleet::api::cluster::{Cluster, ClusterStatus};
use crate::streamfleet::clients::fleetshard::FleetShardAddonService;
use crate::streamfleet::clients::remote::{AddonInstallation, ClusterApi};
use crate::streamfleet::config::ApplicationConfig;
use crate::streamfleet::logger;
use crate::streamfleet::store::ClusterStore;
use crate::streamfleet::util::error::{with_context, BoxError};
use std::sync::Arc;

const COMPONENT: &str = "addon-installer";

pub struct AddonInstaller {
    config: Arc<ApplicationConfig>,
    api: Arc<dyn ClusterApi>,
    fleet_shard: Arc<dyn FleetShardAddonService>,
    store: Arc<dyn ClusterStore>,
}

impl AddonInstaller {
    pub fn new(
        config: Arc<ApplicationConfig>,
        api: Arc<dyn ClusterApi>,
        fleet_shard: Arc<dyn FleetShardAddonService>,
        store: Arc<dyn ClusterStore>,
    ) -> Self {
        Self {
            config,
            api,
            fleet_shard,
            store,
        }
    }

    /// Requests the addon if it was never requested for the cluster; an
    /// existing installation is returned as-is and never re-requested.
    fn ensure_addon(
        &self,
        cluster_id: &str,
        addon_id: &str,
    ) -> Result<AddonInstallation, BoxError> {
        let existing = self.api.get_addon(cluster_id, addon_id).map_err(|e| {
            with_context(
                Box::new(e),
                format!("fetch addon '{addon_id}' on cluster '{cluster_id}'"),
            )
        })?;
        if let Some(installation) = existing {
            return Ok(installation);
        }

        let installation = self.api.create_addon(cluster_id, addon_id).map_err(|e| {
            with_context(
                Box::new(e),
                format!("request addon '{addon_id}' on cluster '{cluster_id}'"),
            )
        })?;
        logger::log_info(
            COMPONENT,
            "addon installation requested",
            &[("cluster_id", cluster_id), ("addon_id", addon_id)],
        );
        Ok(installation)
    }

    /// Drives the addon chain for one provisioned cluster. Once the base
    /// operator is ready and the fleet-shard addon is provisioned, the record
    /// advances to `waiting_for_fleet_shard_operator`.
    pub fn reconcile(&self, cluster: &Cluster) -> Result<(), BoxError> {
        let streaming =
            self.ensure_addon(&cluster.cluster_id, &self.config.addons.streaming_operator_addon_id)?;
        if !streaming.is_ready() {
            logger::log_debug(
                COMPONENT,
                "streaming operator addon not ready yet",
                &[("cluster_id", &cluster.cluster_id)],
            );
            return Ok(());
        }

        self.ensure_addon(&cluster.cluster_id, &self.config.addons.fleet_shard_addon_id)?;

        self.fleet_shard.provision(cluster).map_err(|e| {
            with_context(
                e,
                format!("provision fleet-shard addon for cluster '{}'", cluster.cluster_id),
            )
        })?;

        self.store
            .update_status(cluster, ClusterStatus::WaitingForFleetShardOperator)
            .map_err(|e| {
                with_context(
                    e,
                    format!("persist status for cluster '{}'", cluster.cluster_id),
                )
            })?;
        logger::log_info(
            COMPONENT,
            "cluster waiting for fleet-shard operator",
            &[("cluster_id", &cluster.cluster_id)],
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streamfleet::clients::remote::AddonState;
    use crate::streamfleet::controller::test_support::{StubApi, StubFleetShard, StubStore};

    fn installer(
        api: Arc<StubApi>,
        fleet_shard: Arc<StubFleetShard>,
        store: Arc<StubStore>,
    ) -> AddonInstaller {
        AddonInstaller::new(Arc::new(ApplicationConfig::default()), api, fleet_shard, store)
    }

    fn cluster() -> Cluster {
        Cluster {
            id: "record-1".to_string(),
            cluster_id: "remote-1".to_string(),
            status: Some(ClusterStatus::Provisioned),
            ..Cluster::default()
        }
    }

    fn put_addon(api: &StubApi, addon_id: &str, state: Option<AddonState>) {
        api.addons.lock().unwrap().insert(
            ("remote-1".to_string(), addon_id.to_string()),
            AddonInstallation {
                id: addon_id.to_string(),
                state,
            },
        );
    }

    #[test]
    fn missing_base_addon_is_requested_and_chain_stops() {
        let api = Arc::new(StubApi::default());
        let fleet_shard = Arc::new(StubFleetShard::default());
        let store = Arc::new(StubStore::default());
        installer(api.clone(), fleet_shard.clone(), store.clone())
            .reconcile(&cluster())
            .expect("reconcile");

        let created = api.created_addons.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].1, "streaming-platform-operator");
        assert!(fleet_shard.provisioned.lock().unwrap().is_empty());
        assert!(store.status_updates.lock().unwrap().is_empty());
    }

    #[test]
    fn installing_base_addon_is_not_rerequested() {
        let api = Arc::new(StubApi::default());
        put_addon(&api, "streaming-platform-operator", Some(AddonState::Installing));
        let fleet_shard = Arc::new(StubFleetShard::default());
        let store = Arc::new(StubStore::default());
        installer(api.clone(), fleet_shard, store.clone())
            .reconcile(&cluster())
            .expect("reconcile");

        assert!(api.created_addons.lock().unwrap().is_empty());
        assert!(store.status_updates.lock().unwrap().is_empty());
    }

    #[test]
    fn ready_base_addon_triggers_fleet_shard_chain() {
        let api = Arc::new(StubApi::default());
        put_addon(&api, "streaming-platform-operator", Some(AddonState::Ready));
        let fleet_shard = Arc::new(StubFleetShard::default());
        let store = Arc::new(StubStore::default());
        installer(api.clone(), fleet_shard.clone(), store.clone())
            .reconcile(&cluster())
            .expect("reconcile");

        let created = api.created_addons.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].1, "fleet-shard-operator");
        assert_eq!(fleet_shard.provisioned.lock().unwrap().len(), 1);

        let updates = store.status_updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].1, ClusterStatus::WaitingForFleetShardOperator);
    }

    #[test]
    fn installed_fleet_shard_addon_is_not_rerequested() {
        let api = Arc::new(StubApi::default());
        put_addon(&api, "streaming-platform-operator", Some(AddonState::Ready));
        put_addon(&api, "fleet-shard-operator", Some(AddonState::Installing));
        let fleet_shard = Arc::new(StubFleetShard::default());
        let store = Arc::new(StubStore::default());
        installer(api.clone(), fleet_shard.clone(), store.clone())
            .reconcile(&cluster())
            .expect("reconcile");

        assert!(api.created_addons.lock().unwrap().is_empty());
        assert_eq!(fleet_shard.provisioned.lock().unwrap().len(), 1);
        assert_eq!(store.status_updates.lock().unwrap().len(), 1);
    }

    #[test]
    fn provision_failure_leaves_status_untouched() {
        let api = Arc::new(StubApi::default());
        put_addon(&api, "streaming-platform-operator", Some(AddonState::Ready));
        let fleet_shard = Arc::new(StubFleetShard::default());
        *fleet_shard.fail_provision.lock().unwrap() = true;
        let store = Arc::new(StubStore::default());
        let result = installer(api, fleet_shard, store.clone()).reconcile(&cluster());

        assert!(result.is_err());
        assert!(store.status_updates.lock().unwrap().is_empty());
    }
}
