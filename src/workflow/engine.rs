//! Transition rules for the sub-stage workflow.
//!
//! Everything here is a pure function of `(stage, sub_stage)`. The single
//! and bulk controllers share one rule table; the UI re-derives the legal
//! options from current data on every render, so a background refresh can
//! never leave a stale menu actionable.

use crate::types::{Stage, SubStage};

/// What a chosen transition requires before the mutation can be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    /// Mutation sent immediately, no side form
    Direct,
    /// Two-step modal: handover details, then call scheduling
    HandoverSchedule,
    /// Yes/no dialog plus a mandatory onboarding-manager selection;
    /// confirming also forces the stage to Onboarding
    ConfirmDone,
    /// Yes/no dialog; confirming also forces the stage to Drop Off
    ConfirmDropOff,
    /// Non-empty free-text reason required
    Reason,
}

/// Legal next sub-stage values from the given position, in menu order.
///
/// Outside Contracted/Onboarding the sub-stage is pinned to Inactive. Meet
/// Done and Meet Cancelled are terminal. A sub-stage the workflow does not
/// recognize (including Inactive left over from a stage move) resets to
/// Meet Pending.
pub fn legal_next_sub_stages(stage: Stage, sub_stage: &SubStage) -> Vec<SubStage> {
    if !stage.supports_sub_stage() {
        return vec![SubStage::Inactive];
    }

    match sub_stage {
        SubStage::MeetPending => vec![
            SubStage::MeetPending,
            SubStage::MeetScheduled,
            SubStage::DropOff,
        ],
        SubStage::MeetScheduled => vec![
            SubStage::MeetScheduled,
            SubStage::MeetReschedule,
            SubStage::MeetDone,
            SubStage::MeetCancelled,
            SubStage::DropOff,
        ],
        SubStage::MeetReschedule => vec![
            SubStage::MeetReschedule,
            SubStage::MeetScheduled,
            SubStage::MeetDone,
            SubStage::DropOff,
        ],
        SubStage::MeetDone => vec![SubStage::MeetDone],
        SubStage::MeetCancelled => vec![SubStage::MeetCancelled],
        SubStage::DropOff | SubStage::Inactive | SubStage::Other(_) => {
            vec![SubStage::MeetPending]
        }
    }
}

pub fn is_legal_transition(stage: Stage, current: &SubStage, target: &SubStage) -> bool {
    legal_next_sub_stages(stage, current).contains(target)
}

/// Classify a requested target into the side effect it triggers.
///
/// Only the Meet Scheduled target depends on where it is reached from: a
/// first booking out of Meet Pending collects handover details, while
/// re-confirming a schedule out of Meet Reschedule is a plain update.
pub fn classify(current: &SubStage, target: &SubStage) -> EffectKind {
    match target {
        SubStage::MeetScheduled if *current == SubStage::MeetPending => {
            EffectKind::HandoverSchedule
        }
        SubStage::MeetReschedule => EffectKind::HandoverSchedule,
        SubStage::MeetDone => EffectKind::ConfirmDone,
        SubStage::MeetCancelled => EffectKind::Reason,
        SubStage::DropOff => EffectKind::ConfirmDropOff,
        _ => EffectKind::Direct,
    }
}

/// The sub-stage actually written when a handover flow completes.
///
/// Rescheduling lands the account back in Meet Scheduled; the reschedule
/// state only exists while the new booking is being collected.
pub fn applied_sub_stage(target: &SubStage) -> SubStage {
    match target {
        SubStage::MeetReschedule => SubStage::MeetScheduled,
        other => other.clone(),
    }
}

/// Stage forced by confirming the given target, if any.
pub fn forced_stage(target: &SubStage) -> Option<Stage> {
    match target {
        SubStage::MeetDone => Some(Stage::Onboarding),
        SubStage::DropOff => Some(Stage::DropOff),
        _ => None,
    }
}
