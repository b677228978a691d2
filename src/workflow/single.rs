//! Single-item workflow state machine.
//!
//! One account's transition runs through an explicit state machine: a
//! state tag plus the form it owns. `advance` is a pure reducer taking the
//! current state and a named event and returning the next state plus, at
//! most once per flow, the mutation command for the ops layer to execute.
//! UI components render from the state and never mutate accounts
//! themselves.

use jiff::civil;

use crate::patch::AccountPatch;
use crate::remote::{HandoverDetails, PocName, SchedulePayload, SubStageUpdate};
use crate::types::{Stage, SubStage};

use super::engine::{self, EffectKind};
use super::forms::{HandoverForm, MeetDoneForm, ReasonForm, ScheduleForm};

/// Read-only context the reducer needs from the focused account.
#[derive(Debug, Clone)]
pub struct WorkflowCx<'a> {
    pub stage: Stage,
    pub sub_stage: &'a SubStage,
    pub ob_managers: &'a [PocName],
    pub today: civil::Date,
}

/// Where a single-item flow currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowState {
    Idle,
    /// First step of the handover flow
    Handover {
        target: SubStage,
        form: HandoverForm,
    },
    /// Second step; keeps the completed handover form so Back preserves it
    Schedule {
        target: SubStage,
        handover: HandoverForm,
        form: ScheduleForm,
    },
    /// Meet Done yes/no with mandatory manager pick
    ConfirmDone { form: MeetDoneForm },
    /// Drop Off yes/no
    ConfirmDropOff,
    /// Meet Cancelled reason dialog
    CancelReason { form: ReasonForm },
    /// Mutation in flight; `prev` restores the step on failure
    Submitting {
        prev: Box<WorkflowState>,
        target: SubStage,
    },
}

impl WorkflowState {
    pub fn is_open(&self) -> bool {
        !matches!(self, WorkflowState::Idle)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, WorkflowState::Submitting { .. })
    }
}

/// Named events the UI dispatches into the machine.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowEvent {
    /// Operator picked a target from the sub-stage menu
    Request { target: SubStage },
    /// Continue / Schedule / Yes / confirm button
    Continue,
    /// Back from the schedule step to the handover step
    Back,
    /// Close the modal, discarding collected input
    Cancel,
    /// Ops layer: the mutation call succeeded
    Submitted,
    /// Ops layer: the mutation call failed
    Failed,
}

/// The one mutation a completed flow produces.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowCommand {
    UpdateSubStage {
        update: SubStageUpdate,
        patch: AccountPatch,
    },
    HandoverSchedule {
        handover: HandoverDetails,
        schedule: SchedulePayload,
        patch: AccountPatch,
    },
}

impl WorkflowCommand {
    /// The optimistic patch applied after the remote call succeeds.
    pub fn patch(&self) -> &AccountPatch {
        match self {
            WorkflowCommand::UpdateSubStage { patch, .. } => patch,
            WorkflowCommand::HandoverSchedule { patch, .. } => patch,
        }
    }
}

fn submit(
    prev: WorkflowState,
    target: SubStage,
    command: WorkflowCommand,
) -> (WorkflowState, Option<WorkflowCommand>) {
    (
        WorkflowState::Submitting {
            prev: Box::new(prev),
            target,
        },
        Some(command),
    )
}

/// Pure reducer for the single-item workflow.
pub fn advance(
    state: WorkflowState,
    event: WorkflowEvent,
    cx: &WorkflowCx,
) -> (WorkflowState, Option<WorkflowCommand>) {
    match (state, event) {
        (WorkflowState::Idle, WorkflowEvent::Request { target }) => {
            if !engine::is_legal_transition(cx.stage, cx.sub_stage, &target) {
                return (WorkflowState::Idle, None);
            }
            match engine::classify(cx.sub_stage, &target) {
                EffectKind::Direct => {
                    let update = SubStageUpdate::new(target.clone());
                    let patch = AccountPatch::sub_stage(target.clone());
                    submit(
                        WorkflowState::Idle,
                        target,
                        WorkflowCommand::UpdateSubStage { update, patch },
                    )
                }
                EffectKind::HandoverSchedule => (
                    WorkflowState::Handover {
                        target,
                        form: HandoverForm::default(),
                    },
                    None,
                ),
                EffectKind::ConfirmDone => (
                    WorkflowState::ConfirmDone {
                        form: MeetDoneForm::new(cx.ob_managers),
                    },
                    None,
                ),
                EffectKind::ConfirmDropOff => (WorkflowState::ConfirmDropOff, None),
                EffectKind::Reason => (
                    WorkflowState::CancelReason {
                        form: ReasonForm::default(),
                    },
                    None,
                ),
            }
        }

        (WorkflowState::Handover { target, mut form }, WorkflowEvent::Continue) => {
            if form.validate().is_some() {
                let schedule = ScheduleForm::new(cx.today, cx.ob_managers);
                (
                    WorkflowState::Schedule {
                        target,
                        handover: form,
                        form: schedule,
                    },
                    None,
                )
            } else {
                (WorkflowState::Handover { target, form }, None)
            }
        }

        (
            WorkflowState::Schedule {
                target,
                mut handover,
                mut form,
            },
            WorkflowEvent::Continue,
        ) => {
            let for_reschedule = target == SubStage::MeetReschedule;
            let Some(schedule) = form.validate(for_reschedule) else {
                return (
                    WorkflowState::Schedule {
                        target,
                        handover,
                        form,
                    },
                    None,
                );
            };
            // The handover step was validated on the way in; a failure here
            // means its data was edited out from under us, so fall back.
            let Some(details) = handover.validate() else {
                return (WorkflowState::Handover { target, form: handover }, None);
            };
            let patch = AccountPatch::sub_stage(engine::applied_sub_stage(&target));
            let prev = WorkflowState::Schedule {
                target: target.clone(),
                handover,
                form,
            };
            submit(
                prev,
                target,
                WorkflowCommand::HandoverSchedule {
                    handover: details,
                    schedule,
                    patch,
                },
            )
        }

        (WorkflowState::Schedule { target, handover, .. }, WorkflowEvent::Back) => (
            WorkflowState::Handover {
                target,
                form: handover,
            },
            None,
        ),

        (WorkflowState::ConfirmDone { form }, WorkflowEvent::Continue) => {
            let Some(manager) = form.selected_manager().filter(|_| form.can_confirm()) else {
                return (WorkflowState::ConfirmDone { form }, None);
            };
            let manager = manager.name.clone();
            let mut update = SubStageUpdate::new(SubStage::MeetDone);
            update.stage = Some(Stage::Onboarding);
            update.onboarding_manager = Some(manager.clone());
            let patch = AccountPatch::sub_stage(SubStage::MeetDone)
                .with_stage(Stage::Onboarding)
                .with_onboarding_manager(manager);
            submit(
                WorkflowState::ConfirmDone { form },
                SubStage::MeetDone,
                WorkflowCommand::UpdateSubStage { update, patch },
            )
        }

        (WorkflowState::ConfirmDropOff, WorkflowEvent::Continue) => {
            let mut update = SubStageUpdate::new(SubStage::DropOff);
            update.stage = Some(Stage::DropOff);
            let patch =
                AccountPatch::sub_stage(SubStage::DropOff).with_stage(Stage::DropOff);
            submit(
                WorkflowState::ConfirmDropOff,
                SubStage::DropOff,
                WorkflowCommand::UpdateSubStage { update, patch },
            )
        }

        (WorkflowState::CancelReason { form }, WorkflowEvent::Continue) => {
            if !form.can_confirm() {
                return (WorkflowState::CancelReason { form }, None);
            }
            let mut update = SubStageUpdate::new(SubStage::MeetCancelled);
            update.reason = Some(form.reason.trim().to_string());
            let patch = AccountPatch::sub_stage(SubStage::MeetCancelled);
            submit(
                WorkflowState::CancelReason { form },
                SubStage::MeetCancelled,
                WorkflowCommand::UpdateSubStage { update, patch },
            )
        }

        // The mutation is already in flight; nothing to cancel locally.
        (state @ WorkflowState::Submitting { .. }, WorkflowEvent::Cancel) => (state, None),

        (_, WorkflowEvent::Cancel) => (WorkflowState::Idle, None),

        (WorkflowState::Submitting { .. }, WorkflowEvent::Submitted) => {
            (WorkflowState::Idle, None)
        }

        (WorkflowState::Submitting { prev, .. }, WorkflowEvent::Failed) => (*prev, None),

        (state, _) => (state, None),
    }
}
