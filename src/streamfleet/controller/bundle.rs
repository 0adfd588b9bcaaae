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

//! Builds the declarative resource bundle applied to every managed cluster
//! and reconciles it against the copy stored by the remote API.

use crate::streamfleet::api::cluster::Cluster;
use crate::streamfleet::clients::remote::{ClusterApi, ResourceBundle};
use crate::streamfleet::config::ApplicationConfig;
use crate::streamfleet::controller::diff::bundle_changed;
use crate::streamfleet::k8s::ingress::{IngressController, IngressControllerSpec, NodePlacement};
use crate::streamfleet::k8s::meta::{LabelSelector, ObjectMeta};
use crate::streamfleet::k8s::namespace::Namespace;
use crate::streamfleet::k8s::operators::{
    CatalogSource, CatalogSourceSpec, OperatorGroup, Subscription, SubscriptionSpec,
};
use crate::streamfleet::k8s::rbac::{ClusterRoleBinding, Group, RoleRef, Subject};
use crate::streamfleet::k8s::secret::Secret;
use crate::streamfleet::k8s::storage::StorageClass;
use crate::streamfleet::k8s::BundleResource;
use crate::streamfleet::logger;
use crate::streamfleet::util::error::{with_context, BoxError};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Well-known ID of the managed resource bundle on every cluster.
pub const BUNDLE_ID: &str = "ext-streamfleet";

pub const STORAGE_CLASS_NAME: &str = "sf-storageclass";
pub const INGRESS_CONTROLLER_NAME: &str = "sharded-nlb";
pub const INGRESS_OPERATOR_NAMESPACE: &str = "ingress-operator";
pub const OBSERVABILITY_NAMESPACE: &str = "streamfleet-observability";
pub const OBSERVABILITY_CREDENTIALS_SECRET: &str = "observability-credentials";
pub const OBSERVABILITY_CATALOG_SOURCE: &str = "observability-operator-manifests";
pub const OBSERVABILITY_OPERATOR_GROUP: &str = "observability-operator-group";
pub const OBSERVABILITY_SUBSCRIPTION: &str = "observability-operator";
pub const READONLY_GROUP_NAME: &str = "sf-readonly-access";
pub const READERS_ROLE_NAME: &str = "dedicated-readers";
pub const READERS_ROLE_BINDING_NAME: &str = "sf-dedicated-readers";
pub const IMAGE_PULL_SECRET_NAME: &str = "sf-image-pull-secret";
pub const STREAMING_OPERATOR_NAMESPACE: &str = "streaming-platform-operator";
pub const FLEET_SHARD_OPERATOR_NAMESPACE: &str = "fleet-shard-operator";

const COMPONENT: &str = "bundle-reconciler";

fn storage_class() -> BundleResource {
    let mut storage_class = StorageClass::new(
        ObjectMeta::named(STORAGE_CLASS_NAME),
        "kubernetes.io/aws-ebs",
    );
    storage_class
        .parameters
        .insert("encrypted".to_string(), "false".to_string());
    storage_class
        .parameters
        .insert("type".to_string(), "gp2".to_string());
    storage_class.reclaim_policy = Some("Delete".to_string());
    storage_class.volume_binding_mode = Some("WaitForFirstConsumer".to_string());
    BundleResource::StorageClass(storage_class)
}

fn ingress_controller(cluster_dns: &str, replicas: u32) -> BundleResource {
    BundleResource::IngressController(IngressController::new(
        ObjectMeta::namespaced(INGRESS_CONTROLLER_NAME, INGRESS_OPERATOR_NAMESPACE),
        IngressControllerSpec {
            domain: cluster_dns.to_string(),
            route_selector: Some(LabelSelector::single("ingressType", "sharded")),
            replicas: Some(replicas as i32),
            node_placement: Some(NodePlacement {
                node_selector: Some(LabelSelector::single(
                    "node-role.kubernetes.io/worker",
                    "",
                )),
            }),
            endpoint_publishing_scope: Some("External".to_string()),
        },
    ))
}

fn observability_credentials(config: &ApplicationConfig) -> BundleResource {
    let observability = &config.observability;
    let mut string_data = BTreeMap::new();
    string_data.insert("authUrl".to_string(), observability.auth_url.clone());
    string_data.insert("authUsername".to_string(), observability.auth_username.clone());
    string_data.insert("authPassword".to_string(), observability.auth_password.clone());
    string_data.insert("authSecret".to_string(), observability.auth_secret.clone());
    string_data.insert("tenant".to_string(), observability.tenant.clone());
    string_data.insert("gateway".to_string(), observability.gateway.clone());
    string_data.insert("configRepo".to_string(), observability.config_repo.clone());
    string_data.insert("configChannel".to_string(), observability.config_channel.clone());
    string_data.insert(
        "configAccessToken".to_string(),
        observability.config_access_token.clone(),
    );
    string_data.insert("configTag".to_string(), observability.config_tag.clone());
    BundleResource::Secret(Secret::opaque(
        ObjectMeta::namespaced(OBSERVABILITY_CREDENTIALS_SECRET, OBSERVABILITY_NAMESPACE),
        string_data,
    ))
}

fn observability_operator_resources() -> Vec<BundleResource> {
    vec![
        BundleResource::CatalogSource(CatalogSource::new(
            ObjectMeta::namespaced(OBSERVABILITY_CATALOG_SOURCE, OBSERVABILITY_NAMESPACE),
            CatalogSourceSpec {
                source_type: "grpc".to_string(),
                image: "quay.io/streamfleet/observability-operator-index:latest".to_string(),
            },
        )),
        BundleResource::OperatorGroup(OperatorGroup::new(
            ObjectMeta::namespaced(OBSERVABILITY_OPERATOR_GROUP, OBSERVABILITY_NAMESPACE),
            vec![OBSERVABILITY_NAMESPACE.to_string()],
        )),
        BundleResource::Subscription(Subscription::new(
            ObjectMeta::namespaced(OBSERVABILITY_SUBSCRIPTION, OBSERVABILITY_NAMESPACE),
            SubscriptionSpec {
                catalog_source: OBSERVABILITY_CATALOG_SOURCE.to_string(),
                catalog_source_namespace: OBSERVABILITY_NAMESPACE.to_string(),
                channel: "alpha".to_string(),
                package: "observability-operator".to_string(),
                starting_csv: None,
                install_plan_approval: "Automatic".to_string(),
            },
        )),
    ]
}

fn readonly_access_resources() -> Vec<BundleResource> {
    vec![
        BundleResource::Group(Group::new(READONLY_GROUP_NAME)),
        BundleResource::ClusterRoleBinding(ClusterRoleBinding::new(
            ObjectMeta::named(READERS_ROLE_BINDING_NAME),
            vec![Subject {
                kind: Group::KIND.to_string(),
                api_group: Some(ClusterRoleBinding::RBAC_API_GROUP.to_string()),
                name: READONLY_GROUP_NAME.to_string(),
            }],
            RoleRef {
                kind: "ClusterRole".to_string(),
                api_group: ClusterRoleBinding::RBAC_API_GROUP.to_string(),
                name: READERS_ROLE_NAME.to_string(),
            },
        )),
    ]
}

fn image_pull_secrets(docker_config: &str) -> Vec<BundleResource> {
    [STREAMING_OPERATOR_NAMESPACE, FLEET_SHARD_OPERATOR_NAMESPACE]
        .into_iter()
        .map(|namespace| {
            BundleResource::Secret(Secret::dockercfg(
                ObjectMeta::namespaced(IMAGE_PULL_SECRET_NAME, namespace),
                docker_config,
            ))
        })
        .collect()
}

/// Desired bundle for one cluster. The resource order is fixed; the diff
/// engine compares positionally.
pub fn build_resources(config: &ApplicationConfig, cluster_dns: &str) -> Vec<BundleResource> {
    let mut resources = vec![
        storage_class(),
        ingress_controller(cluster_dns, config.cluster.ingress_controller_replicas),
        BundleResource::Namespace(Namespace::new(OBSERVABILITY_NAMESPACE)),
        observability_credentials(config),
    ];
    resources.extend(observability_operator_resources());
    resources.extend(readonly_access_resources());
    if !config.cluster.image_pull_docker_config.is_empty() {
        resources.extend(image_pull_secrets(&config.cluster.image_pull_docker_config));
    }
    resources
}

/// Keeps the remote copy of the managed bundle in sync with the desired one.
pub struct BundleReconciler {
    config: Arc<ApplicationConfig>,
    api: Arc<dyn ClusterApi>,
}

impl BundleReconciler {
    pub fn new(config: Arc<ApplicationConfig>, api: Arc<dyn ClusterApi>) -> Self {
        Self { config, api }
    }

    /// Applies the desired bundle to the cluster. No write is issued when
    /// the stored bundle already matches.
    pub fn reconcile(&self, cluster: &Cluster, cluster_dns: &str) -> Result<(), BoxError> {
        let desired = build_resources(&self.config, cluster_dns);
        let desired_values = desired
            .iter()
            .map(BundleResource::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| with_context(Box::new(e), "serializing desired resource bundle"))?;

        let existing = self
            .api
            .get_resource_bundle(&cluster.cluster_id, BUNDLE_ID)
            .map_err(|e| {
                with_context(
                    Box::new(e),
                    format!("fetch resource bundle for cluster '{}'", cluster.cluster_id),
                )
            })?;

        match existing {
            None => {
                let bundle = ResourceBundle {
                    id: BUNDLE_ID.to_string(),
                    resources: desired_values,
                };
                self.api
                    .create_resource_bundle(&cluster.cluster_id, &bundle)
                    .map_err(|e| {
                        with_context(
                            Box::new(e),
                            format!("create resource bundle for cluster '{}'", cluster.cluster_id),
                        )
                    })?;
                logger::log_info(
                    COMPONENT,
                    "resource bundle created",
                    &[("cluster_id", &cluster.cluster_id)],
                );
            }
            Some(stored) => {
                if !bundle_changed(&desired, &stored.resources)? {
                    return Ok(());
                }
                // The update endpoint addresses the bundle by path, so the
                // payload carries no ID.
                let bundle = ResourceBundle {
                    id: String::new(),
                    resources: desired_values,
                };
                self.api
                    .update_resource_bundle(&cluster.cluster_id, BUNDLE_ID, &bundle)
                    .map_err(|e| {
                        with_context(
                            Box::new(e),
                            format!("update resource bundle for cluster '{}'", cluster.cluster_id),
                        )
                    })?;
                logger::log_info(
                    COMPONENT,
                    "resource bundle updated",
                    &[("cluster_id", &cluster.cluster_id)],
                );
            }
        }
        Ok(())
    }
}
