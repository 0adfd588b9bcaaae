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

//! Recording stubs for the controller seams. Every call is captured so tests
//! can assert on exactly which writes a reconcile pass issued; fail flags
//! force errors on specific operations.

use crate::streamfleet::api::cluster::{Cluster, ClusterStatus};
use crate::streamfleet::clients::fleetshard::FleetShardAddonService;
use crate::streamfleet::clients::remote::{
    AddonInstallation, AddonState, ApiError, ClusterApi, ClusterSpec, DeleteOutcome,
    IdentityProvider, RemoteCluster, RemoteClusterState, ResourceBundle,
};
use crate::streamfleet::clients::sso::{RealmConfig, SsoService};
use crate::streamfleet::store::{
    ClusterStore, FindClusterCriteria, RegionCapacity, StreamInstanceCount,
};
use crate::streamfleet::util::error::{new_error, BoxError};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct StubApi {
    pub clusters: Mutex<HashMap<String, RemoteCluster>>,
    pub created_clusters: Mutex<Vec<ClusterSpec>>,
    pub deleted: Mutex<Vec<String>>,
    pub delete_outcome: Mutex<Option<DeleteOutcome>>,
    pub fail_delete: Mutex<bool>,
    pub addons: Mutex<HashMap<(String, String), AddonInstallation>>,
    pub created_addons: Mutex<Vec<(String, String)>>,
    pub bundles: Mutex<HashMap<(String, String), ResourceBundle>>,
    pub created_bundles: Mutex<Vec<(String, ResourceBundle)>>,
    pub updated_bundles: Mutex<Vec<(String, String, ResourceBundle)>>,
    pub dns: Mutex<HashMap<String, String>>,
    pub fail_dns: Mutex<bool>,
    pub identity_providers: Mutex<HashMap<String, Vec<IdentityProvider>>>,
    pub created_identity_providers: Mutex<Vec<(String, IdentityProvider)>>,
    pub identity_provider_conflict: Mutex<bool>,
}

impl ClusterApi for StubApi {
    fn create_cluster(&self, spec: &ClusterSpec) -> Result<RemoteCluster, ApiError> {
        let mut created = self.created_clusters.lock().unwrap();
        created.push(spec.clone());
        let id = format!("remote-{}", created.len());
        let cluster = RemoteCluster {
            id: id.clone(),
            state: Some(RemoteClusterState::Pending),
            external_id: None,
        };
        self.clusters.lock().unwrap().insert(id, cluster.clone());
        Ok(cluster)
    }

    fn get_cluster(&self, cluster_id: &str) -> Result<RemoteCluster, ApiError> {
        self.clusters
            .lock()
            .unwrap()
            .get(cluster_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("cluster '{cluster_id}'")))
    }

    fn delete_cluster(&self, cluster_id: &str) -> Result<DeleteOutcome, ApiError> {
        if *self.fail_delete.lock().unwrap() {
            return Err(ApiError::Other(new_error("delete failed")));
        }
        self.deleted.lock().unwrap().push(cluster_id.to_string());
        Ok(self
            .delete_outcome
            .lock()
            .unwrap()
            .unwrap_or(DeleteOutcome::Accepted))
    }

    fn get_addon(
        &self,
        cluster_id: &str,
        addon_id: &str,
    ) -> Result<Option<AddonInstallation>, ApiError> {
        Ok(self
            .addons
            .lock()
            .unwrap()
            .get(&(cluster_id.to_string(), addon_id.to_string()))
            .cloned())
    }

    fn create_addon(
        &self,
        cluster_id: &str,
        addon_id: &str,
    ) -> Result<AddonInstallation, ApiError> {
        self.created_addons
            .lock()
            .unwrap()
            .push((cluster_id.to_string(), addon_id.to_string()));
        let installation = AddonInstallation {
            id: addon_id.to_string(),
            state: Some(AddonState::Installing),
        };
        self.addons.lock().unwrap().insert(
            (cluster_id.to_string(), addon_id.to_string()),
            installation.clone(),
        );
        Ok(installation)
    }

    fn get_resource_bundle(
        &self,
        cluster_id: &str,
        bundle_id: &str,
    ) -> Result<Option<ResourceBundle>, ApiError> {
        Ok(self
            .bundles
            .lock()
            .unwrap()
            .get(&(cluster_id.to_string(), bundle_id.to_string()))
            .cloned())
    }

    fn create_resource_bundle(
        &self,
        cluster_id: &str,
        bundle: &ResourceBundle,
    ) -> Result<ResourceBundle, ApiError> {
        self.created_bundles
            .lock()
            .unwrap()
            .push((cluster_id.to_string(), bundle.clone()));
        self.bundles.lock().unwrap().insert(
            (cluster_id.to_string(), bundle.id.clone()),
            bundle.clone(),
        );
        Ok(bundle.clone())
    }

    fn update_resource_bundle(
        &self,
        cluster_id: &str,
        bundle_id: &str,
        bundle: &ResourceBundle,
    ) -> Result<ResourceBundle, ApiError> {
        self.updated_bundles.lock().unwrap().push((
            cluster_id.to_string(),
            bundle_id.to_string(),
            bundle.clone(),
        ));
        self.bundles.lock().unwrap().insert(
            (cluster_id.to_string(), bundle_id.to_string()),
            bundle.clone(),
        );
        Ok(bundle.clone())
    }

    fn get_cluster_dns(&self, cluster_id: &str) -> Result<String, ApiError> {
        if *self.fail_dns.lock().unwrap() {
            return Err(ApiError::Other(new_error("dns lookup failed")));
        }
        Ok(self
            .dns
            .lock()
            .unwrap()
            .get(cluster_id)
            .cloned()
            .unwrap_or_else(|| "apps.example.com".to_string()))
    }

    fn create_identity_provider(
        &self,
        cluster_id: &str,
        provider: &IdentityProvider,
    ) -> Result<IdentityProvider, ApiError> {
        if *self.identity_provider_conflict.lock().unwrap() {
            return Err(ApiError::Conflict(format!(
                "identity provider '{}' exists",
                provider.name
            )));
        }
        self.created_identity_providers
            .lock()
            .unwrap()
            .push((cluster_id.to_string(), provider.clone()));
        let mut created = provider.clone();
        created.id = format!("idp-{}", self.created_identity_providers.lock().unwrap().len());
        Ok(created)
    }

    fn list_identity_providers(
        &self,
        cluster_id: &str,
    ) -> Result<Vec<IdentityProvider>, ApiError> {
        Ok(self
            .identity_providers
            .lock()
            .unwrap()
            .get(cluster_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct StubStore {
    pub clusters: Mutex<Vec<Cluster>>,
    pub registered: Mutex<Vec<Cluster>>,
    pub register_attempts: Mutex<u32>,
    pub fail_register: Mutex<bool>,
    pub updates: Mutex<Vec<Cluster>>,
    pub status_updates: Mutex<Vec<(Cluster, ClusterStatus)>>,
    pub fail_update_status: Mutex<bool>,
    pub schedulable_updates: Mutex<Vec<(Vec<String>, bool)>>,
    pub schedulable_attempts: Mutex<u32>,
    pub fail_schedulable: Mutex<bool>,
    pub region_capacities: Mutex<Vec<RegionCapacity>>,
    pub fail_counts: Mutex<bool>,
    pub instance_counts: Mutex<Vec<StreamInstanceCount>>,
    pub non_empty: Mutex<Vec<String>>,
    pub soft_deleted: Mutex<Vec<String>>,
    pub fail_soft_delete: Mutex<bool>,
    pub fail_list_all: Mutex<bool>,
}

impl ClusterStore for StubStore {
    fn register_cluster_job(&self, cluster: &Cluster) -> Result<(), BoxError> {
        *self.register_attempts.lock().unwrap() += 1;
        if *self.fail_register.lock().unwrap() {
            return Err(new_error("register failed"));
        }
        self.registered.lock().unwrap().push(cluster.clone());
        Ok(())
    }

    fn find_cluster(&self, criteria: &FindClusterCriteria) -> Result<Option<Cluster>, BoxError> {
        Ok(self
            .clusters
            .lock()
            .unwrap()
            .iter()
            .find(|c| {
                c.cloud_provider == criteria.cloud_provider
                    && c.region == criteria.region
                    && c.multi_az == criteria.multi_az
                    && criteria.status.map_or(true, |s| c.status == Some(s))
                    && criteria
                        .exclude_cluster_id
                        .as_deref()
                        .map_or(true, |id| c.cluster_id != id)
            })
            .cloned())
    }

    fn update(&self, cluster: &Cluster) -> Result<(), BoxError> {
        self.updates.lock().unwrap().push(cluster.clone());
        Ok(())
    }

    fn update_status(&self, cluster: &Cluster, status: ClusterStatus) -> Result<(), BoxError> {
        if *self.fail_update_status.lock().unwrap() {
            return Err(new_error("status update failed"));
        }
        self.status_updates
            .lock()
            .unwrap()
            .push((cluster.clone(), status));
        Ok(())
    }

    fn update_schedulable(
        &self,
        cluster_ids: &[String],
        schedulable: bool,
    ) -> Result<(), BoxError> {
        *self.schedulable_attempts.lock().unwrap() += 1;
        if *self.fail_schedulable.lock().unwrap() {
            return Err(new_error("schedulable update failed"));
        }
        self.schedulable_updates
            .lock()
            .unwrap()
            .push((cluster_ids.to_vec(), schedulable));
        Ok(())
    }

    fn list_by_status(&self, status: ClusterStatus) -> Result<Vec<Cluster>, BoxError> {
        Ok(self
            .clusters
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.status == Some(status))
            .cloned()
            .collect())
    }

    fn list_all(&self) -> Result<Vec<Cluster>, BoxError> {
        if *self.fail_list_all.lock().unwrap() {
            return Err(new_error("list failed"));
        }
        Ok(self.clusters.lock().unwrap().clone())
    }

    fn count_by_provider_and_region(
        &self,
        providers: &[String],
        regions: &[String],
        _statuses: &[ClusterStatus],
    ) -> Result<Vec<RegionCapacity>, BoxError> {
        if *self.fail_counts.lock().unwrap() {
            return Err(new_error("count query failed"));
        }
        Ok(self
            .region_capacities
            .lock()
            .unwrap()
            .iter()
            .filter(|c| {
                providers.contains(&c.cloud_provider) && regions.contains(&c.region)
            })
            .cloned()
            .collect())
    }

    fn stream_instance_counts(
        &self,
        cluster_ids: &[String],
    ) -> Result<Vec<StreamInstanceCount>, BoxError> {
        Ok(self
            .instance_counts
            .lock()
            .unwrap()
            .iter()
            .filter(|c| cluster_ids.contains(&c.cluster_id))
            .cloned()
            .collect())
    }

    fn find_non_empty_cluster(&self, cluster_id: &str) -> Result<Option<Cluster>, BoxError> {
        if !self
            .non_empty
            .lock()
            .unwrap()
            .iter()
            .any(|id| id == cluster_id)
        {
            return Ok(None);
        }
        Ok(Some(Cluster {
            cluster_id: cluster_id.to_string(),
            ..Cluster::default()
        }))
    }

    fn soft_delete(&self, cluster_id: &str) -> Result<(), BoxError> {
        if *self.fail_soft_delete.lock().unwrap() {
            return Err(new_error("soft delete failed"));
        }
        self.soft_deleted.lock().unwrap().push(cluster_id.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct StubSso {
    pub registered: Mutex<Vec<(String, String)>>,
    pub deregistered: Mutex<Vec<String>>,
    pub fail_deregister: Mutex<bool>,
}

impl SsoService for StubSso {
    fn register_cluster_client(
        &self,
        cluster_id: &str,
        callback_uri: &str,
    ) -> Result<String, BoxError> {
        self.registered
            .lock()
            .unwrap()
            .push((cluster_id.to_string(), callback_uri.to_string()));
        Ok("client-secret".to_string())
    }

    fn deregister_client(&self, namespace: &str) -> Result<(), BoxError> {
        if *self.fail_deregister.lock().unwrap() {
            return Err(new_error("deregister failed"));
        }
        self.deregistered.lock().unwrap().push(namespace.to_string());
        Ok(())
    }

    fn realm_config(&self) -> RealmConfig {
        RealmConfig {
            valid_issuer_uri: "https://sso.example.com/realms/streamfleet".to_string(),
        }
    }
}

#[derive(Default)]
pub struct StubFleetShard {
    pub provisioned: Mutex<Vec<String>>,
    pub fail_provision: Mutex<bool>,
    pub removed: Mutex<Vec<String>>,
    pub fail_remove: Mutex<bool>,
}

impl FleetShardAddonService for StubFleetShard {
    fn provision(&self, cluster: &Cluster) -> Result<bool, BoxError> {
        if *self.fail_provision.lock().unwrap() {
            return Err(new_error("provision failed"));
        }
        self.provisioned
            .lock()
            .unwrap()
            .push(cluster.cluster_id.clone());
        Ok(true)
    }

    fn remove_service_account(&self, cluster: &Cluster) -> Result<(), BoxError> {
        if *self.fail_remove.lock().unwrap() {
            return Err(new_error("remove failed"));
        }
        self.removed.lock().unwrap().push(cluster.cluster_id.clone());
        Ok(())
    }
}
