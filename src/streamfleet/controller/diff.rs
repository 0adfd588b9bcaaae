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

//! Positional comparison between the desired resource bundle and what the
//! remote API reports as currently applied.
//!
//! Resources read back arrive as generic JSON and may carry server-populated
//! fields. Each existing resource is routed through a typed converter for its
//! `(kind, apiVersion)` pair, which strips everything the typed model does not
//! carry before the comparison.

use crate::streamfleet::k8s::ingress::IngressController;
use crate::streamfleet::k8s::namespace::Namespace;
use crate::streamfleet::k8s::operators::{CatalogSource, OperatorGroup, Subscription};
use crate::streamfleet::k8s::rbac::{ClusterRoleBinding, Group};
use crate::streamfleet::k8s::secret::Secret;
use crate::streamfleet::k8s::storage::StorageClass;
use crate::streamfleet::k8s::BundleResource;
use crate::streamfleet::util::error::{with_context, BoxError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

type Normalizer = fn(&Value) -> Option<Value>;

/// Reduces a generic resource to the fields its typed model carries. Unknown
/// fields are dropped by the round trip; a resource that does not fit the
/// typed model at all yields `None`.
fn normalize_as<T: Serialize + DeserializeOwned>(existing: &Value) -> Option<Value> {
    let typed: T = serde_json::from_value(existing.clone()).ok()?;
    serde_json::to_value(&typed).ok()
}

fn normalizer_for(kind: &str, api_version: &str) -> Option<Normalizer> {
    match (kind, api_version) {
        (StorageClass::KIND, StorageClass::API_VERSION) => Some(normalize_as::<StorageClass>),
        (IngressController::KIND, IngressController::API_VERSION) => {
            Some(normalize_as::<IngressController>)
        }
        (Namespace::KIND, Namespace::API_VERSION) => Some(normalize_as::<Namespace>),
        (Secret::KIND, Secret::API_VERSION) => Some(normalize_as::<Secret>),
        (CatalogSource::KIND, CatalogSource::API_VERSION) => Some(normalize_as::<CatalogSource>),
        (OperatorGroup::KIND, OperatorGroup::API_VERSION) => Some(normalize_as::<OperatorGroup>),
        (Subscription::KIND, Subscription::API_VERSION) => Some(normalize_as::<Subscription>),
        (Group::KIND, Group::API_VERSION) => Some(normalize_as::<Group>),
        (ClusterRoleBinding::KIND, ClusterRoleBinding::API_VERSION) => {
            Some(normalize_as::<ClusterRoleBinding>)
        }
        _ => None,
    }
}

/// Returns `true` when the applied resources differ from the desired ones.
///
/// The comparison is positional: a length mismatch or a reordering counts as
/// a change. An existing resource whose kind the converter registry does not
/// know also counts as a change, so the bundle is re-applied rather than
/// silently trusted.
pub fn bundle_changed(desired: &[BundleResource], existing: &[Value]) -> Result<bool, BoxError> {
    if desired.len() != existing.len() {
        return Ok(true);
    }

    for (want, have) in desired.iter().zip(existing.iter()) {
        let want_value = want
            .to_value()
            .map_err(|e| with_context(Box::new(e), "serializing desired bundle resource"))?;

        let normalized = normalizer_for(want.kind(), want.api_version())
            .and_then(|normalize| normalize(have));

        match normalized {
            Some(have_value) if have_value == want_value => continue,
            _ => return Ok(true),
        }
    }

    Ok(false)
}
