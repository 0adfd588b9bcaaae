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

use crate::streamfleet::util::error::{with_context, BoxError};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Environment variable pointing at the JSON configuration file.
pub const CONFIG_PATH_ENV: &str = "STREAMFLEET_CONFIG";

const DEFAULT_RECONCILE_INTERVAL: &str = "30s";

/// Capacity policy for the fleet. The two modes are mutually exclusive.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingMode {
    /// Create clusters automatically whenever a supported provider/region
    /// pair has no active capacity.
    #[default]
    Auto,
    /// Capacity is driven exclusively by the static manual cluster table.
    Manual,
}

/// One manually managed cluster entry; the table is immutable for the
/// process lifetime and authoritative in manual scaling mode.
#[derive(Clone, Debug, Deserialize)]
pub struct ManualCluster {
    pub cluster_id: String,
    #[serde(default)]
    pub schedulable: bool,
    /// Maximum number of tenant stream instances placed on this cluster.
    #[serde(default)]
    pub stream_instance_limit: u32,
}

/// A cloud region supported for cluster placement.
#[derive(Clone, Debug, Deserialize)]
pub struct Region {
    pub name: String,
}

/// A supported cloud provider and its regions.
#[derive(Clone, Debug, Deserialize)]
pub struct Provider {
    pub name: String,
    #[serde(default)]
    pub regions: Vec<Region>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub supported_providers: Vec<Provider>,
}

/// Settings for the observability pipeline credentials pushed to every
/// managed cluster as part of the resource bundle.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default)]
    pub auth_url: String,
    #[serde(default)]
    pub auth_username: String,
    #[serde(default)]
    pub auth_password: String,
    #[serde(default)]
    pub auth_secret: String,
    #[serde(default)]
    pub tenant: String,
    #[serde(default)]
    pub gateway: String,
    #[serde(default)]
    pub config_repo: String,
    #[serde(default)]
    pub config_channel: String,
    #[serde(default)]
    pub config_access_token: String,
    #[serde(default)]
    pub config_tag: String,
}

/// Cluster-creation settings applied to every managed cluster.
#[derive(Clone, Debug, Deserialize)]
pub struct ClusterConfig {
    #[serde(default)]
    pub scaling_mode: ScalingMode,
    #[serde(default)]
    pub manual_clusters: Vec<ManualCluster>,
    #[serde(default)]
    pub ingress_controller_replicas: u32,
    /// Dockercfg payload for private registry pulls; when empty, the
    /// registry-credential secrets are omitted from the resource bundle.
    #[serde(default)]
    pub image_pull_docker_config: String,
    #[serde(default = "default_multi_az")]
    pub multi_az: bool,
}

fn default_multi_az() -> bool {
    true
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            scaling_mode: ScalingMode::default(),
            manual_clusters: Vec::new(),
            ingress_controller_replicas: 0,
            image_pull_docker_config: String::new(),
            multi_az: default_multi_az(),
        }
    }
}

/// Identifiers of the operator addons installed on each cluster.
#[derive(Clone, Debug, Deserialize)]
pub struct AddonConfig {
    #[serde(default = "default_streaming_addon_id")]
    pub streaming_operator_addon_id: String,
    #[serde(default = "default_fleet_shard_addon_id")]
    pub fleet_shard_addon_id: String,
}

fn default_streaming_addon_id() -> String {
    "streaming-platform-operator".to_string()
}

fn default_fleet_shard_addon_id() -> String {
    "fleet-shard-operator".to_string()
}

impl Default for AddonConfig {
    fn default() -> Self {
        Self {
            streaming_operator_addon_id: default_streaming_addon_id(),
            fleet_shard_addon_id: default_fleet_shard_addon_id(),
        }
    }
}

/// Process-wide read-only configuration, injected into each reconciler
/// component at construction and never mutated afterwards.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ApplicationConfig {
    #[serde(default)]
    pub providers: ProviderConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub cluster: ClusterConfig,
    #[serde(default)]
    pub addons: AddonConfig,
    /// Polling interval between reconcile ticks, e.g. "30s" or "2m".
    #[serde(default)]
    pub reconcile_interval: Option<String>,
}

impl ApplicationConfig {
    /// Loads configuration from the path named by `STREAMFLEET_CONFIG`,
    /// falling back to defaults when the variable is unset.
    pub fn from_env() -> Result<Self, BoxError> {
        match env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(Path::new(&path)),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, BoxError> {
        let raw = fs::read_to_string(path)
            .map_err(|e| with_context(e, format!("read config file '{}'", path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| with_context(e, format!("parse config file '{}'", path.display())))
    }

    pub fn reconcile_interval(&self) -> Result<Duration, BoxError> {
        let raw = self
            .reconcile_interval
            .as_deref()
            .unwrap_or(DEFAULT_RECONCILE_INTERVAL);
        humantime::parse_duration(raw)
            .map_err(|e| with_context(e, format!("parse reconcile interval '{raw}'")))
    }
}
