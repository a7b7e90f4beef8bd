//! View change protocol handlers.
//!
//! This module implements the VSR view change protocol:
//!
//! 1. **`StartViewChange`**: Backup suspects leader is dead, broadcasts to all
//! 2. **`DoViewChange`**: After receiving quorum of `StartViewChange`, send to new leader
//! 3. **`StartView`**: New leader broadcasts with authoritative log
//!
//! # Safety Properties
//!
//! - Operations committed in previous views are preserved
//! - At most one leader per view
//! - Progress guaranteed if a majority is available

use crate::message::{DoViewChange, MessagePayload, StartView, StartViewChange};
use crate::types::{CommitNumber, ReplicaId, ReplicaStatus, ViewNumber};

use super::{ReplicaOutput, ReplicaState, msg_broadcast, msg_to};

impl ReplicaState {
    // ========================================================================
    // View Change Initiation
    // ========================================================================

    /// Initiates a view change to the next view.
    ///
    /// Called when:
    /// - Backup hasn't heard from leader (heartbeat timeout)
    /// - Backup receives `StartViewChange` for higher view
    pub(crate) fn start_view_change(mut self) -> (Self, ReplicaOutput) {
        let new_view = self.view.next();

        // Transition to new view
        self = self.transition_to_view(new_view);

        // Vote for ourselves
        self.start_view_change_votes.insert(self.replica_id);

        // Broadcast StartViewChange
        let svc = StartViewChange::new(new_view, self.replica_id);
        let msg = self.sign_message(msg_broadcast(
            self.replica_id,
            MessagePayload::StartViewChange(svc),
        ));

        (self, ReplicaOutput::with_messages(vec![msg]))
    }

    // ========================================================================
    // StartViewChange Handler
    // ========================================================================

    /// Handles a `StartViewChange` message.
    ///
    /// If we receive a quorum of `StartViewChange` messages for the same view,
    /// we send `DoViewChange` to the new leader.
    pub(crate) fn on_start_view_change(
        mut self,
        from: ReplicaId,
        svc: StartViewChange,
    ) -> (Self, ReplicaOutput) {
        // If message is for a view we've already passed, ignore
        if svc.view < self.view {
            return (self, ReplicaOutput::empty());
        }

        // Replay detection (AUDIT-2026-03 M-6)
        let msg_id = crate::replica::state::MessageId::start_view_change(from, svc.view);
        if self.message_dedup_tracker.check_and_record(msg_id).is_err() {
            tracing::warn!(
                replica = %self.replica_id,
                from = %from.as_u8(),
                view = %svc.view,
                "Replay attack detected: duplicate StartViewChange message"
            );
            crate::instrumentation::METRICS.increment_replay_attacks();

            #[cfg(feature = "sim")]
            crate::instrumentation::record_byzantine_rejection(
                "start_view_change_replay",
                from,
                0, // StartViewChange has no op_number
                self.op_number.as_u64(),
            );

            return (self, ReplicaOutput::empty());
        }

        // If message is for a higher view than we're tracking, start our own view change
        if svc.view > self.view {
            let (new_self, mut output) = self.start_view_change_to(svc.view);
            self = new_self;

            // Record their vote
            self.start_view_change_votes.insert(from);

            // Check if we have quorum
            let (final_self, quorum_output) = self.check_start_view_change_quorum();
            output.merge(quorum_output);

            return (final_self, output);
        }

        // Message is for current view
        if self.status != ReplicaStatus::ViewChange {
            // We're in Normal status at view N, receiving StartViewChange for view N.
            // This can happen if:
            // 1. We've already completed the view change to view N (stale message)
            // 2. Message duplication/reordering
            //
            // In either case, we should start a new view change to view N+1,
            // since someone thinks the current leader is dead.
            let (new_self, output) = self.start_view_change();
            self = new_self;

            // Note: we don't count their vote for view N since we're now in view N+1.
            // They'll need to send a new StartViewChange for view N+1.

            return (self, output);
        }

        // We're already in view change for this view, just record the vote
        self.start_view_change_votes.insert(from);
        self.check_start_view_change_quorum()
    }

    /// Starts a view change to a specific view.
    ///
    /// Called when we receive a message from a higher view and need to catch up.
    pub(crate) fn start_view_change_to(mut self, view: ViewNumber) -> (Self, ReplicaOutput) {
        // Transition to the new view
        self = self.transition_to_view(view);

        // Vote for ourselves
        self.start_view_change_votes.insert(self.replica_id);

        // Broadcast StartViewChange
        let svc = StartViewChange::new(view, self.replica_id);
        let msg = self.sign_message(msg_broadcast(
            self.replica_id,
            MessagePayload::StartViewChange(svc),
        ));

        (self, ReplicaOutput::with_messages(vec![msg]))
    }

    /// Checks if we have a quorum of `StartViewChange` votes.
    ///
    /// If so, sends `DoViewChange` to the new leader.
    fn check_start_view_change_quorum(self) -> (Self, ReplicaOutput) {
        let quorum = self.config.quorum_size();

        if self.start_view_change_votes.len() >= quorum {
            // We have quorum, send DoViewChange to new leader
            let new_leader = self.config.leader_for_view(self.view);

            // Include reconfiguration state in DoViewChange to preserve it across view changes
            let dvc = DoViewChange::new_with_reconfig(
                self.view,
                self.replica_id,
                self.last_normal_view,
                self.op_number,
                self.commit_number,
                self.log_tail(),
                self.reconfig_state.clone(),
            );

            let msg = self.sign_message(msg_to(
                self.replica_id,
                new_leader,
                MessagePayload::DoViewChange(dvc),
            ));

            (self, ReplicaOutput::with_messages(vec![msg]))
        } else {
            (self, ReplicaOutput::empty())
        }
    }

    // ========================================================================
    // DoViewChange Handler (New Leader)
    // ========================================================================

    /// Handles a `DoViewChange` message (as new leader).
    ///
    /// Once we receive a quorum of `DoViewChange` messages, we:
    /// 1. Select the log with the highest `last_normal_view` and `op_number`
    /// 2. Broadcast `StartView` with the authoritative log
    /// 3. Enter normal operation as leader
    pub(crate) fn on_do_view_change(
        mut self,
        from: ReplicaId,
        dvc: DoViewChange,
    ) -> (Self, ReplicaOutput) {
        // Protect against DoS via oversized log_tail
        if dvc.log_tail.len() > Self::MAX_LOG_TAIL_ENTRIES {
            tracing::error!(
                from = %from.as_u8(),
                entries = dvc.log_tail.len(),
                max = Self::MAX_LOG_TAIL_ENTRIES,
                "DoViewChange log_tail exceeds maximum size - DoS attack detected"
            );

            // Record Byzantine rejection for simulation testing
            #[cfg(feature = "sim")]
            crate::instrumentation::record_byzantine_rejection(
                "oversized_log_tail",
                from,
                dvc.log_tail.len() as u64,
                Self::MAX_LOG_TAIL_ENTRIES as u64,
            );

            return (self, ReplicaOutput::empty());
        }

        // Ignore if not for our current view
        if dvc.view != self.view {
            return (self, ReplicaOutput::empty());
        }

        // Replay detection (AUDIT-2026-03 M-6)
        let msg_id = crate::replica::state::MessageId::do_view_change(from, dvc.view);
        if self.message_dedup_tracker.check_and_record(msg_id).is_err() {
            tracing::warn!(
                replica = %self.replica_id,
                from = %from.as_u8(),
                view = %dvc.view,
                "Replay attack detected: duplicate DoViewChange message"
            );
            crate::instrumentation::METRICS.increment_replay_attacks();

            #[cfg(feature = "sim")]
            crate::instrumentation::record_byzantine_rejection(
                "do_view_change_replay",
                from,
                0, // DoViewChange has no op_number
                self.op_number.as_u64(),
            );

            return (self, ReplicaOutput::empty());
        }

        // We must be the leader for this view
        if self.config.leader_for_view(self.view) != self.replica_id {
            return (self, ReplicaOutput::empty());
        }

        // Must be in ViewChange status
        if self.status != ReplicaStatus::ViewChange {
            // If we're in Normal status for this view, the view change already completed.
            // This is a stale DoViewChange message - ignore it.
            if self.status == ReplicaStatus::Normal {
                return (self, ReplicaOutput::empty());
            }
            // Otherwise (e.g., Recovering status), we shouldn't process view changes.
            return (self, ReplicaOutput::empty());
        }

        // Record the DoViewChange message
        // If we already have one from this replica, check if the new one is better
        if let Some(existing_idx) = self
            .do_view_change_msgs
            .iter()
            .position(|m| m.replica == from)
        {
            let existing = &self.do_view_change_msgs[existing_idx];

            // Check if new message is better: higher (last_normal_view, op_number)
            let is_better = (dvc.last_normal_view, dvc.op_number)
                > (existing.last_normal_view, existing.op_number);

            if is_better {
                tracing::debug!(
                    replica = %from.as_u8(),
                    old_view = %existing.last_normal_view,
                    old_op = %existing.op_number,
                    new_view = %dvc.last_normal_view,
                    new_op = %dvc.op_number,
                    "replacing DoViewChange with better message from same replica"
                );
                self.do_view_change_msgs[existing_idx] = dvc;
            } else {
                tracing::debug!(
                    replica = %from.as_u8(),
                    "ignoring duplicate DoViewChange that is not better"
                );
            }
        } else {
            // No existing message from this replica
            self.do_view_change_msgs.push(dvc);
        }

        // Check if we have quorum
        self.check_do_view_change_quorum()
    }

    /// Checks if we have a quorum of `DoViewChange` messages.
    ///
    /// If so, becomes leader and broadcasts `StartView`.
    fn check_do_view_change_quorum(mut self) -> (Self, ReplicaOutput) {
        let quorum = self.config.quorum_size();

        if self.do_view_change_msgs.len() < quorum {
            return (self, ReplicaOutput::empty());
        }

        // We have quorum! Become the leader.

        // Find the DoViewChange with the highest (last_normal_view, op_number)
        // This ensures we pick the most up-to-date log.
        //
        // CRITICAL: When multiple messages have identical (last_normal_view, op_number),
        // we must break the tie deterministically to prevent log divergence.
        // We use the hash of the last log entry, then replica ID as final tie-breaker.
        // Extract the log tail and reconfig state we need before moving self.
        let (best_log_tail, best_reconfig_state) = {
            let best_dvc = self
                .do_view_change_msgs
                .iter()
                .max_by(|a, b| {
                    // Primary: (last_normal_view, op_number)
                    let primary_cmp =
                        (a.last_normal_view, a.op_number).cmp(&(b.last_normal_view, b.op_number));

                    if primary_cmp != std::cmp::Ordering::Equal {
                        return primary_cmp;
                    }

                    // Tie-breaker 1: Checksum of last log entry (deterministic)
                    let a_checksum = a.log_tail.last().map_or(0, |e| e.checksum);
                    let b_checksum = b.log_tail.last().map_or(0, |e| e.checksum);
                    let checksum_cmp = a_checksum.cmp(&b_checksum);

                    if checksum_cmp != std::cmp::Ordering::Equal {
                        return checksum_cmp;
                    }

                    // Tie-breaker 2: Replica ID (final, always deterministic)
                    a.replica.as_u8().cmp(&b.replica.as_u8())
                })
                .expect("at least quorum messages");

            // Validate log_tail length matches claimed op_number when commit is reasonable
            // Note: We allow commit_number > op_number because the Byzantine protection
            // happens AFTER merge_log_tail() when we check against actual op_number
            if best_dvc.commit_number.as_op_number() <= best_dvc.op_number {
                let expected_tail_len =
                    (best_dvc.op_number.as_u64() - best_dvc.commit_number.as_u64()) as usize;
                if best_dvc.log_tail.len() != expected_tail_len {
                    tracing::error!(
                        replica = %best_dvc.replica.as_u8(),
                        claimed_ops = %best_dvc.op_number,
                        commit = %best_dvc.commit_number,
                        expected_tail_len = expected_tail_len,
                        actual_tail_len = best_dvc.log_tail.len(),
                        "DoViewChange log_tail length mismatch - Byzantine attack detected"
                    );

                    // Record Byzantine rejection for simulation testing
                    #[cfg(feature = "sim")]
                    crate::instrumentation::record_byzantine_rejection(
                        "log_tail_length_mismatch",
                        best_dvc.replica,
                        best_dvc.log_tail.len() as u64,
                        expected_tail_len as u64,
                    );

                    // Reject this view change quorum - cannot safely proceed
                    return (self, ReplicaOutput::empty());
                }
            }

            (best_dvc.log_tail.clone(), best_dvc.reconfig_state.clone())
        };

        // Merge the log tail from the best DoViewChange
        // IMPORTANT: This sets op_number based on actual log entries, not claimed op_number
        self = self.merge_log_tail(best_log_tail);

        // Restore reconfiguration state from the best DoViewChange
        // This ensures reconfigurations survive leader failures
        if let Some(reconfig_state) = best_reconfig_state {
            self.reconfig_state = reconfig_state;
        }

        // Calculate max achievable commit (protects against inflated values)
        // Use self.op_number which is now set based on actual log entries
        let max_commit = self.calculate_max_achievable_commit(self.op_number);

        // Apply commits up to the max achievable commit
        let (new_self, effects) = self.apply_commits_up_to(max_commit);
        self = new_self;

        // Invariant check before entering normal status
        debug_assert!(
            self.commit_number.as_op_number() <= self.op_number,
            "view change: commit={} > op={}",
            self.commit_number.as_u64(),
            self.op_number.as_u64()
        );

        // Enter normal status as leader
        self = self.enter_normal_status();

        // Broadcast StartView with reconfiguration state
        let start_view = StartView::new_with_reconfig(
            self.view,
            self.op_number,
            self.commit_number,
            self.log_tail(),
            self.reconfig_state.clone(),
        );

        let msg = self.sign_message(msg_broadcast(
            self.replica_id,
            MessagePayload::StartView(start_view),
        ));

        (
            self,
            ReplicaOutput::with_messages_and_effects(vec![msg], effects),
        )
    }

    // ========================================================================
    // StartView Handler (Backup)
    // ========================================================================

    /// Maximum `log_tail` entries in a `StartView` message to prevent `DoS` attacks.
    ///
    /// A Byzantine leader could send millions of entries to exhaust memory.
    /// This limit allows reasonable catchup (10K uncommitted ops) while preventing `DoS`.
    const MAX_LOG_TAIL_ENTRIES: usize = 10_000;

    /// Handles a `StartView` message from the new leader.
    ///
    /// The backup:
    /// 1. Updates its log from the message
    /// 2. Applies any new commits
    /// 3. Enters normal operation
    pub(crate) fn on_start_view(mut self, from: ReplicaId, sv: StartView) -> (Self, ReplicaOutput) {
        // Must be from the leader for this view
        if from != self.config.leader_for_view(sv.view) {
            return (self, ReplicaOutput::empty());
        }

        // Replay detection (AUDIT-2026-03 M-6)
        let msg_id = crate::replica::state::MessageId::start_view(from, sv.view);
        if self.message_dedup_tracker.check_and_record(msg_id).is_err() {
            tracing::warn!(
                replica = %self.replica_id,
                from = %from.as_u8(),
                view = %sv.view,
                "Replay attack detected: duplicate StartView message"
            );
            crate::instrumentation::METRICS.increment_replay_attacks();

            #[cfg(feature = "sim")]
            crate::instrumentation::record_byzantine_rejection(
                "start_view_replay",
                from,
                0, // StartView has no op_number
                self.op_number.as_u64(),
            );

            return (self, ReplicaOutput::empty());
        }

        // Protect against DoS via oversized log_tail
        if sv.log_tail.len() > Self::MAX_LOG_TAIL_ENTRIES {
            tracing::error!(
                from = %from.as_u8(),
                entries = sv.log_tail.len(),
                max = Self::MAX_LOG_TAIL_ENTRIES,
                "StartView log_tail exceeds maximum size - DoS attack detected"
            );

            // Record Byzantine rejection for simulation testing
            #[cfg(feature = "sim")]
            crate::instrumentation::record_byzantine_rejection(
                "oversized_log_tail",
                from,
                sv.log_tail.len() as u64,
                Self::MAX_LOG_TAIL_ENTRIES as u64,
            );

            return (self, ReplicaOutput::empty());
        }

        // If we're behind, accept the new view
        if sv.view < self.view {
            tracing::warn!(
                claimed_view = %sv.view,
                actual_view = %self.view,
                "StartView has regressed view number - Byzantine attack or stale message"
            );

            // Record Byzantine rejection for simulation testing
            #[cfg(feature = "sim")]
            crate::instrumentation::record_byzantine_rejection(
                "view_regression",
                from,
                sv.view.as_u64(),
                self.view.as_u64(),
            );

            return (self, ReplicaOutput::empty());
        }

        // Update to the new view if needed
        if sv.view > self.view {
            self.view = sv.view;
        }

        // Validate log_tail length matches claimed op_number when commit is reasonable
        // Note: We allow commit_number > op_number because the Byzantine protection
        // happens AFTER merge_log_tail() when we check against actual op_number
        if sv.commit_number.as_op_number() <= sv.op_number {
            let expected_tail_len = (sv.op_number.as_u64() - sv.commit_number.as_u64()) as usize;
            if sv.log_tail.len() != expected_tail_len {
                tracing::error!(
                    claimed_op = %sv.op_number,
                    commit = %sv.commit_number,
                    expected_tail_len = expected_tail_len,
                    actual_tail_len = sv.log_tail.len(),
                    "StartView log_tail length mismatch - Byzantine attack detected"
                );

                // Record Byzantine rejection for simulation testing
                #[cfg(feature = "sim")]
                crate::instrumentation::record_byzantine_rejection(
                    "log_tail_length_mismatch",
                    from,
                    sv.log_tail.len() as u64,
                    expected_tail_len as u64,
                );

                return (self, ReplicaOutput::empty());
            }
        }

        // Extract fields before consuming sv
        let reconfig_state = sv.reconfig_state;
        let commit_number = sv.commit_number;

        // Merge the log tail
        // IMPORTANT: This sets op_number based on actual log entries, not claimed op_number
        self = self.merge_log_tail(sv.log_tail);

        // Restore reconfiguration state from the new leader
        // This ensures backups adopt the leader's reconfiguration state
        if let Some(reconfig_state_value) = reconfig_state {
            self.reconfig_state = reconfig_state_value;
        }

        // Validate commit_number doesn't exceed our actual op_number (Byzantine protection)
        let safe_commit = if commit_number.as_op_number() > self.op_number {
            tracing::warn!(
                claimed_commit = %commit_number,
                actual_op = %self.op_number,
                "StartView has inflated commit_number, capping to op_number"
            );

            // Record Byzantine rejection for simulation testing
            #[cfg(feature = "sim")]
            crate::instrumentation::record_byzantine_rejection(
                "inflated_commit_number",
                from,
                commit_number.as_u64(),
                self.op_number.as_u64(),
            );

            CommitNumber::new(self.op_number)
        } else {
            commit_number
        };

        // Apply commits
        let (new_self, effects) = self.apply_commits_up_to(safe_commit);
        self = new_self;

        // Invariant check after applying commits
        debug_assert!(
            self.commit_number.as_op_number() <= self.op_number,
            "on_start_view: commit={} > op={}",
            self.commit_number.as_u64(),
            self.op_number.as_u64()
        );

        // Enter normal status
        self = self.enter_normal_status();

        (
            self,
            ReplicaOutput::with_messages_and_effects(vec![], effects),
        )
    }

    // ========================================================================
    // View Change Timeout
    // ========================================================================

    /// Handles view change timeout (view change taking too long).
    ///
    /// Starts a new view change to an even higher view.
    pub(crate) fn on_view_change_timeout(self) -> (Self, ReplicaOutput) {
        // Only relevant if we're in ViewChange status
        if self.status != ReplicaStatus::ViewChange {
            return (self, ReplicaOutput::empty());
        }

        // Start view change to next view
        self.start_view_change()
    }
}
