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

//! Registers an OpenID identity provider on each managed cluster, backed by
//! an SSO client created for the cluster.

use crate::streamfleet::api::cluster::Cluster;
use crate::streamfleet::clients::remote::{ClusterApi, IdentityProvider, OpenIdProvider};
use crate::streamfleet::clients::sso::SsoService;
use crate::streamfleet::logger;
use crate::streamfleet::store::ClusterStore;
use crate::streamfleet::util::error::{new_error, with_context, BoxError};
use std::sync::Arc;

pub const IDENTITY_PROVIDER_NAME: &str = "streamfleet-sre";

const COMPONENT: &str = "identity-reconciler";

pub struct IdentityProviderReconciler {
    api: Arc<dyn ClusterApi>,
    sso: Arc<dyn SsoService>,
    store: Arc<dyn ClusterStore>,
}

impl IdentityProviderReconciler {
    pub fn new(
        api: Arc<dyn ClusterApi>,
        sso: Arc<dyn SsoService>,
        store: Arc<dyn ClusterStore>,
    ) -> Self {
        Self { api, sso, store }
    }

    /// Ensures the cluster carries the SRE identity provider and that the
    /// record holds its reference ID. A record with a reference is left
    /// alone.
    pub fn reconcile(&self, cluster: &Cluster, cluster_dns: &str) -> Result<(), BoxError> {
        if !cluster.identity_provider_id.is_empty() {
            return Ok(());
        }

        let callback_uri =
            format!("https://oauth.{cluster_dns}/callback/{IDENTITY_PROVIDER_NAME}");
        let client_secret = self
            .sso
            .register_cluster_client(&cluster.id, &callback_uri)
            .map_err(|e| {
                with_context(e, format!("register SSO client for cluster '{}'", cluster.id))
            })?;

        let provider = IdentityProvider {
            id: String::new(),
            name: IDENTITY_PROVIDER_NAME.to_string(),
            open_id: Some(OpenIdProvider {
                client_id: cluster.sso_client_namespace(),
                client_secret,
                issuer: self.sso.realm_config().valid_issuer_uri,
            }),
        };

        let provider_id = match self.api.create_identity_provider(&cluster.cluster_id, &provider) {
            Ok(created) => created.id,
            // Another pass already registered the provider; recover its ID
            // from the listing.
            Err(err) if err.is_conflict() => self.find_existing_provider(cluster)?,
            Err(err) => {
                return Err(with_context(
                    Box::new(err),
                    format!(
                        "create identity provider on cluster '{}'",
                        cluster.cluster_id
                    ),
                ))
            }
        };

        let mut updated = cluster.clone();
        updated.identity_provider_id = provider_id;
        self.store.update(&updated).map_err(|e| {
            with_context(
                e,
                format!("persist identity provider reference for cluster '{}'", cluster.id),
            )
        })?;
        logger::log_info(
            COMPONENT,
            "identity provider registered",
            &[("cluster_id", &cluster.cluster_id)],
        );
        Ok(())
    }

    fn find_existing_provider(&self, cluster: &Cluster) -> Result<String, BoxError> {
        let providers = self
            .api
            .list_identity_providers(&cluster.cluster_id)
            .map_err(|e| {
                with_context(
                    Box::new(e),
                    format!("list identity providers on cluster '{}'", cluster.cluster_id),
                )
            })?;
        providers
            .into_iter()
            .find(|p| p.name == IDENTITY_PROVIDER_NAME)
            .map(|p| p.id)
            .ok_or_else(|| {
                new_error(format!(
                    "identity provider conflict on cluster '{}' but '{}' not found in listing",
                    cluster.cluster_id, IDENTITY_PROVIDER_NAME
                ))
            })
    }
}
