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

use crate::streamfleet::util::error::BoxError;

/// Realm metadata exposed by the SSO backend.
#[derive(Clone, Debug, Default)]
pub struct RealmConfig {
    pub valid_issuer_uri: String,
}

/// Client for the identity/SSO provider backing cluster authentication.
pub trait SsoService: Send + Sync {
    /// Registers an OAuth client representing the cluster and returns the
    /// client secret. Registration is idempotent per cluster ID.
    fn register_cluster_client(
        &self,
        cluster_id: &str,
        callback_uri: &str,
    ) -> Result<String, BoxError>;

    /// Removes the client registered under the given namespace. Deregistering
    /// an unknown client is not an error.
    fn deregister_client(&self, namespace: &str) -> Result<(), BoxError>;

    fn realm_config(&self) -> RealmConfig;
}
