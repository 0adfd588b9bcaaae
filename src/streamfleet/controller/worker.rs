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

//! Recurring tick driver for the cluster manager. Reconcile passes are
//! synchronous and run on the blocking pool so the timer stays responsive.

use crate::streamfleet::controller::manager::ClusterManager;
use crate::streamfleet::logger;
use crate::streamfleet::util::error::{with_context, BoxError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

const COMPONENT: &str = "reconcile-worker";

pub struct ReconcileWorker {
    manager: Arc<ClusterManager>,
    tick_interval: Duration,
}

impl ReconcileWorker {
    pub fn new(manager: Arc<ClusterManager>, tick_interval: Duration) -> Self {
        Self {
            manager,
            tick_interval,
        }
    }

    /// Runs reconcile passes on the configured interval until the shutdown
    /// signal flips to `true`. Per-cluster errors are logged and never stop
    /// the loop.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        logger::log_info(
            COMPONENT,
            "reconcile loop started",
            &[("interval", &format!("{:?}", self.tick_interval))],
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(err) = self.run_once().await {
                        logger::log_error(
                            COMPONENT,
                            "reconcile pass did not run",
                            &[("error", &err.to_string())],
                        );
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        logger::log_info(COMPONENT, "reconcile loop stopped", &[]);
                        return;
                    }
                }
            }
        }
    }

    /// Executes a single pass on the blocking pool and logs its summary.
    pub async fn run_once(&self) -> Result<(), BoxError> {
        let manager = self.manager.clone();
        let summary = tokio::task::spawn_blocking(move || manager.reconcile())
            .await
            .map_err(|e| with_context(Box::new(e), "join reconcile pass"))?;

        if summary.is_clean() {
            logger::log_debug(COMPONENT, "reconcile pass clean", &[]);
        } else {
            for (scope, error) in &summary.errors {
                logger::log_error(
                    COMPONENT,
                    "reconcile error",
                    &[("scope", scope), ("error", &error.to_string())],
                );
            }
        }
        Ok(())
    }
}
