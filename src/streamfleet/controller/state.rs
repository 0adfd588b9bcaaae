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

//! Pure decision table for the provisioning leg of the cluster lifecycle.
//! Keeping the table free of I/O lets the full (status, remote state) cross
//! product be tested directly.

use crate::streamfleet::api::cluster::ClusterStatus;
use crate::streamfleet::clients::remote::{RemoteCluster, RemoteClusterState};
use crate::streamfleet::util::error::{new_error, BoxError};

/// Outcome of matching the persisted status against the observed remote
/// state. `NoChange` must not trigger a persistence write.
#[derive(Clone, Debug, PartialEq)]
pub enum StatusPlan {
    NoChange,
    Transition {
        next: ClusterStatus,
        /// Opaque external ID to persist together with the status.
        external_id: Option<String>,
    },
}

/// Decides the next lifecycle status from the observed remote cluster state.
///
/// A ready remote cluster without an external opaque ID is a logical
/// inconsistency: the attempt fails and must be retried, never coerced into
/// a forward transition.
pub fn plan_status_transition(
    current: Option<ClusterStatus>,
    observed: &RemoteCluster,
) -> Result<StatusPlan, BoxError> {
    let before_provisioned = matches!(
        current,
        None | Some(ClusterStatus::Accepted) | Some(ClusterStatus::Provisioning)
    );

    match observed.state {
        Some(RemoteClusterState::Ready) => {
            if !before_provisioned {
                return Ok(StatusPlan::NoChange);
            }
            match observed.external_id.as_deref() {
                Some(external_id) if !external_id.is_empty() => Ok(StatusPlan::Transition {
                    next: ClusterStatus::Provisioned,
                    external_id: Some(external_id.to_string()),
                }),
                _ => Err(new_error(format!(
                    "remote cluster '{}' is ready but reports no external ID",
                    observed.id
                ))),
            }
        }
        Some(RemoteClusterState::Error) => match current {
            None
            | Some(ClusterStatus::Accepted)
            | Some(ClusterStatus::Provisioning)
            | Some(ClusterStatus::Provisioned) => Ok(StatusPlan::Transition {
                next: ClusterStatus::Failed,
                external_id: None,
            }),
            _ => Ok(StatusPlan::NoChange),
        },
        Some(RemoteClusterState::Pending) | Some(RemoteClusterState::Installing) | None => {
            match current {
                // Normalize records that never recorded the creation request.
                None | Some(ClusterStatus::Accepted) => Ok(StatusPlan::Transition {
                    next: ClusterStatus::Provisioning,
                    external_id: None,
                }),
                _ => Ok(StatusPlan::NoChange),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(state: Option<RemoteClusterState>, external_id: Option<&str>) -> RemoteCluster {
        RemoteCluster {
            id: "test".to_string(),
            state,
            external_id: external_id.map(str::to_string),
        }
    }

    #[test]
    fn ready_with_external_id_advances_to_provisioned() {
        let plan = plan_status_transition(
            Some(ClusterStatus::Provisioning),
            &remote(Some(RemoteClusterState::Ready), Some("ext-1")),
        )
        .expect("plan");
        assert_eq!(
            plan,
            StatusPlan::Transition {
                next: ClusterStatus::Provisioned,
                external_id: Some("ext-1".to_string()),
            }
        );
    }

    #[test]
    fn ready_without_external_id_is_an_error() {
        for external_id in [None, Some("")] {
            let result = plan_status_transition(
                Some(ClusterStatus::Provisioning),
                &remote(Some(RemoteClusterState::Ready), external_id),
            );
            assert!(result.is_err(), "expected error for {external_id:?}");
        }
    }

    #[test]
    fn ready_after_provisioned_is_a_no_op() {
        for current in [
            ClusterStatus::Provisioned,
            ClusterStatus::WaitingForFleetShardOperator,
            ClusterStatus::Ready,
        ] {
            let plan = plan_status_transition(
                Some(current),
                &remote(Some(RemoteClusterState::Ready), Some("ext-1")),
            )
            .expect("plan");
            assert_eq!(plan, StatusPlan::NoChange, "current={current:?}");
        }
    }

    #[test]
    fn remote_error_fails_pre_ready_clusters() {
        for current in [
            None,
            Some(ClusterStatus::Accepted),
            Some(ClusterStatus::Provisioning),
            Some(ClusterStatus::Provisioned),
        ] {
            let plan = plan_status_transition(current, &remote(Some(RemoteClusterState::Error), None))
                .expect("plan");
            assert_eq!(
                plan,
                StatusPlan::Transition {
                    next: ClusterStatus::Failed,
                    external_id: None,
                },
                "current={current:?}"
            );
        }
    }

    #[test]
    fn remote_error_does_not_touch_terminal_or_teardown_states() {
        for current in [
            ClusterStatus::Ready,
            ClusterStatus::WaitingForFleetShardOperator,
            ClusterStatus::Deprovisioning,
            ClusterStatus::Cleanup,
            ClusterStatus::Failed,
        ] {
            let plan =
                plan_status_transition(Some(current), &remote(Some(RemoteClusterState::Error), None))
                    .expect("plan");
            assert_eq!(plan, StatusPlan::NoChange, "current={current:?}");
        }
    }

    #[test]
    fn in_progress_remote_states_only_normalize_unset_records() {
        for state in [
            Some(RemoteClusterState::Pending),
            Some(RemoteClusterState::Installing),
            None,
        ] {
            let plan = plan_status_transition(None, &remote(state, None)).expect("plan");
            assert_eq!(
                plan,
                StatusPlan::Transition {
                    next: ClusterStatus::Provisioning,
                    external_id: None,
                },
                "state={state:?}"
            );

            let plan =
                plan_status_transition(Some(ClusterStatus::Provisioning), &remote(state, None))
                    .expect("plan");
            assert_eq!(plan, StatusPlan::NoChange, "state={state:?}");
        }
    }
}
