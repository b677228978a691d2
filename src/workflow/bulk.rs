//! Bulk workflow state machine.
//!
//! A bulk action applies one transition to every account in a homogeneous
//! selection. The machine mirrors the single-item one but always leads
//! with a summary confirmation, collects any shared form exactly once, and
//! ends in a fan-out command that the ops layer turns into one independent
//! mutation per account.

use std::collections::HashSet;

use jiff::civil;

use crate::notify::Toast;
use crate::patch::AccountPatch;
use crate::remote::{HandoverDetails, PocName, SchedulePayload, SubStageUpdate};
use crate::types::{Account, Stage, SubStage};

use super::engine::{self, EffectKind};
use super::forms::{HandoverForm, ReasonForm, ScheduleForm};

/// A validated homogeneous selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionSummary {
    pub ids: Vec<String>,
    pub stage: Stage,
    pub sub_stage: SubStage,
    pub enterprise_name: String,
}

impl SelectionSummary {
    pub fn count(&self) -> usize {
        self.ids.len()
    }
}

/// Validate the current selection against the loaded accounts.
///
/// Returns None when the selection is empty or mixes stage, sub-stage, or
/// enterprise. Callers re-run this every render: a background refresh can
/// change the underlying rows and silently invalidate a selection that was
/// homogeneous when it was made.
pub fn summarize_selection(
    accounts: &[Account],
    selected: &HashSet<String>,
) -> Option<SelectionSummary> {
    let members: Vec<&Account> = accounts.iter().filter(|a| selected.contains(&a.id)).collect();
    let first = members.first()?;
    let homogeneous = members.iter().all(|a| {
        a.stage == first.stage
            && a.sub_stage == first.sub_stage
            && a.enterprise_name == first.enterprise_name
    });
    if !homogeneous {
        return None;
    }
    Some(SelectionSummary {
        ids: members.iter().map(|a| a.id.clone()).collect(),
        stage: first.stage,
        sub_stage: first.sub_stage.clone(),
        enterprise_name: first.enterprise_name.clone(),
    })
}

/// Legal bulk targets, derived from the shared current sub-stage. Same
/// rule table as the single-item engine.
pub fn bulk_options(summary: &SelectionSummary) -> Vec<SubStage> {
    engine::legal_next_sub_stages(summary.stage, &summary.sub_stage)
}

/// Where a bulk flow currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum BulkState {
    Idle,
    /// "N accounts → target" summary confirmation, always the first step
    Confirm {
        target: SubStage,
        summary: SelectionSummary,
    },
    Handover {
        target: SubStage,
        summary: SelectionSummary,
        form: HandoverForm,
    },
    Schedule {
        target: SubStage,
        summary: SelectionSummary,
        handover: HandoverForm,
        form: ScheduleForm,
    },
    Reason {
        target: SubStage,
        summary: SelectionSummary,
        form: ReasonForm,
    },
    Submitting {
        prev: Box<BulkState>,
        target: SubStage,
        count: usize,
    },
}

impl BulkState {
    pub fn is_open(&self) -> bool {
        !matches!(self, BulkState::Idle)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, BulkState::Submitting { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BulkEvent {
    /// Operator picked a target for the current selection
    Request {
        target: SubStage,
        summary: SelectionSummary,
    },
    Continue,
    Back,
    Cancel,
    /// Ops layer: the fan-out finished (possibly with per-item failures)
    Completed,
    /// Ops layer: the fan-out could not start at all
    Failed,
}

/// Fan-out command for the ops layer: one mutation per id, shared payload.
#[derive(Debug, Clone, PartialEq)]
pub enum BulkCommand {
    FanOutUpdate {
        ids: Vec<String>,
        update: SubStageUpdate,
        patch: AccountPatch,
    },
    FanOutHandoverSchedule {
        ids: Vec<String>,
        handover: HandoverDetails,
        schedule: SchedulePayload,
        patch: AccountPatch,
    },
}

impl BulkCommand {
    pub fn ids(&self) -> &[String] {
        match self {
            BulkCommand::FanOutUpdate { ids, .. } => ids,
            BulkCommand::FanOutHandoverSchedule { ids, .. } => ids,
        }
    }

    pub fn patch(&self) -> &AccountPatch {
        match self {
            BulkCommand::FanOutUpdate { patch, .. } => patch,
            BulkCommand::FanOutHandoverSchedule { patch, .. } => patch,
        }
    }
}

/// Outcome of a fan-out: per-item, not atomic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl BulkReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// One aggregate toast per bulk action; failures are never dropped.
    pub fn toast(&self, target: &SubStage) -> Toast {
        if self.failed.is_empty() {
            Toast::success(format!(
                "Updated {} account(s) to {}",
                self.succeeded.len(),
                target
            ))
        } else if self.succeeded.is_empty() {
            Toast::error(format!(
                "Failed to update all {} account(s): {}",
                self.failed.len(),
                self.failed[0].1
            ))
        } else {
            Toast::warning(format!(
                "{} of {} account(s) failed to update",
                self.failed.len(),
                self.total()
            ))
        }
    }
}

fn shared_update(target: &SubStage) -> (SubStageUpdate, AccountPatch) {
    let applied = engine::applied_sub_stage(target);
    let mut update = SubStageUpdate::new(applied.clone());
    let mut patch = AccountPatch::sub_stage(applied);
    if let Some(stage) = engine::forced_stage(target) {
        update.stage = Some(stage);
        patch = patch.with_stage(stage);
    }
    (update, patch)
}

fn submit(
    prev: BulkState,
    target: SubStage,
    count: usize,
    command: BulkCommand,
) -> (BulkState, Option<BulkCommand>) {
    (
        BulkState::Submitting {
            prev: Box::new(prev),
            target,
            count,
        },
        Some(command),
    )
}

/// Pure reducer for the bulk workflow.
pub fn advance_bulk(
    state: BulkState,
    event: BulkEvent,
    today: civil::Date,
    ob_managers: &[PocName],
) -> (BulkState, Option<BulkCommand>) {
    match (state, event) {
        (BulkState::Idle, BulkEvent::Request { target, summary }) => {
            if summary.ids.is_empty()
                || !engine::is_legal_transition(summary.stage, &summary.sub_stage, &target)
            {
                return (BulkState::Idle, None);
            }
            (BulkState::Confirm { target, summary }, None)
        }

        (BulkState::Confirm { target, summary }, BulkEvent::Continue) => {
            match engine::classify(&summary.sub_stage, &target) {
                EffectKind::HandoverSchedule => (
                    BulkState::Handover {
                        target,
                        summary,
                        form: HandoverForm::default(),
                    },
                    None,
                ),
                EffectKind::Reason => (
                    BulkState::Reason {
                        target,
                        summary,
                        form: ReasonForm::default(),
                    },
                    None,
                ),
                // Confirmation already happened on the summary step; done
                // and drop-off fan out immediately with their forced stage.
                EffectKind::Direct | EffectKind::ConfirmDone | EffectKind::ConfirmDropOff => {
                    let (update, patch) = shared_update(&target);
                    let count = summary.count();
                    let ids = summary.ids.clone();
                    submit(
                        BulkState::Confirm {
                            target: target.clone(),
                            summary,
                        },
                        target,
                        count,
                        BulkCommand::FanOutUpdate { ids, update, patch },
                    )
                }
            }
        }

        (
            BulkState::Handover {
                target,
                summary,
                mut form,
            },
            BulkEvent::Continue,
        ) => {
            if form.validate().is_some() {
                let schedule = ScheduleForm::new(today, ob_managers);
                (
                    BulkState::Schedule {
                        target,
                        summary,
                        handover: form,
                        form: schedule,
                    },
                    None,
                )
            } else {
                (
                    BulkState::Handover {
                        target,
                        summary,
                        form,
                    },
                    None,
                )
            }
        }

        (
            BulkState::Schedule {
                target,
                summary,
                mut handover,
                mut form,
            },
            BulkEvent::Continue,
        ) => {
            let for_reschedule = target == SubStage::MeetReschedule;
            let Some(schedule) = form.validate(for_reschedule) else {
                return (
                    BulkState::Schedule {
                        target,
                        summary,
                        handover,
                        form,
                    },
                    None,
                );
            };
            let Some(details) = handover.validate() else {
                return (
                    BulkState::Handover {
                        target,
                        summary,
                        form: handover,
                    },
                    None,
                );
            };
            let patch = AccountPatch::sub_stage(engine::applied_sub_stage(&target));
            let count = summary.count();
            let ids = summary.ids.clone();
            let prev = BulkState::Schedule {
                target: target.clone(),
                summary,
                handover,
                form,
            };
            submit(
                prev,
                target,
                count,
                BulkCommand::FanOutHandoverSchedule {
                    ids,
                    handover: details,
                    schedule,
                    patch,
                },
            )
        }

        (
            BulkState::Schedule {
                target,
                summary,
                handover,
                ..
            },
            BulkEvent::Back,
        ) => (
            BulkState::Handover {
                target,
                summary,
                form: handover,
            },
            None,
        ),

        (
            BulkState::Reason {
                target,
                summary,
                form,
            },
            BulkEvent::Continue,
        ) => {
            if !form.can_confirm() {
                return (
                    BulkState::Reason {
                        target,
                        summary,
                        form,
                    },
                    None,
                );
            }
            let mut update = SubStageUpdate::new(SubStage::MeetCancelled);
            update.reason = Some(form.reason.trim().to_string());
            let patch = AccountPatch::sub_stage(SubStage::MeetCancelled);
            let count = summary.count();
            let ids = summary.ids.clone();
            submit(
                BulkState::Reason {
                    target: target.clone(),
                    summary,
                    form,
                },
                target,
                count,
                BulkCommand::FanOutUpdate { ids, update, patch },
            )
        }

        (state @ BulkState::Submitting { .. }, BulkEvent::Cancel) => (state, None),

        (_, BulkEvent::Cancel) => (BulkState::Idle, None),

        (BulkState::Submitting { .. }, BulkEvent::Completed) => (BulkState::Idle, None),

        (BulkState::Submitting { prev, .. }, BulkEvent::Failed) => (*prev, None),

        (state, _) => (state, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Stage;

    fn account(id: &str, stage: Stage, sub_stage: SubStage, enterprise: &str) -> Account {
        Account {
            id: id.to_string(),
            enterprise_name: enterprise.to_string(),
            stage,
            sub_stage,
            ..Default::default()
        }
    }

    fn homogeneous_accounts() -> Vec<Account> {
        vec![
            account("t-1", Stage::Contracted, SubStage::MeetScheduled, "Sunrise"),
            account("t-2", Stage::Contracted, SubStage::MeetScheduled, "Sunrise"),
            account("t-3", Stage::Contracted, SubStage::MeetScheduled, "Sunrise"),
        ]
    }

    fn selected(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_summarize_empty_selection() {
        let accounts = homogeneous_accounts();
        assert!(summarize_selection(&accounts, &HashSet::new()).is_none());
    }

    #[test]
    fn test_summarize_homogeneous() {
        let accounts = homogeneous_accounts();
        let summary = summarize_selection(&accounts, &selected(&["t-1", "t-3"])).unwrap();
        assert_eq!(summary.count(), 2);
        assert_eq!(summary.sub_stage, SubStage::MeetScheduled);
        assert_eq!(summary.enterprise_name, "Sunrise");
    }

    #[test]
    fn test_summarize_rejects_mixed_sub_stage() {
        let mut accounts = homogeneous_accounts();
        accounts[1].sub_stage = SubStage::MeetPending;
        assert!(summarize_selection(&accounts, &selected(&["t-1", "t-2"])).is_none());
    }

    #[test]
    fn test_summarize_rejects_mixed_enterprise() {
        let mut accounts = homogeneous_accounts();
        accounts[2].enterprise_name = "Lakeside".to_string();
        assert!(summarize_selection(&accounts, &selected(&["t-1", "t-3"])).is_none());
    }

    #[test]
    fn test_summarize_rejects_mixed_stage() {
        let mut accounts = homogeneous_accounts();
        accounts[0].stage = Stage::Onboarding;
        assert!(summarize_selection(&accounts, &selected(&["t-1", "t-2"])).is_none());
    }

    #[test]
    fn test_bulk_always_confirms_first() {
        let accounts = homogeneous_accounts();
        let summary = summarize_selection(&accounts, &selected(&["t-1", "t-2", "t-3"])).unwrap();
        let today = civil::date(2026, 8, 7);

        let (state, command) = advance_bulk(
            BulkState::Idle,
            BulkEvent::Request {
                target: SubStage::MeetDone,
                summary,
            },
            today,
            &[],
        );
        assert!(command.is_none());
        assert!(matches!(state, BulkState::Confirm { .. }));
    }

    #[test]
    fn test_bulk_meet_done_fans_out_with_forced_stage() {
        let accounts = homogeneous_accounts();
        let summary = summarize_selection(&accounts, &selected(&["t-1", "t-2", "t-3"])).unwrap();
        let today = civil::date(2026, 8, 7);

        let (state, _) = advance_bulk(
            BulkState::Idle,
            BulkEvent::Request {
                target: SubStage::MeetDone,
                summary,
            },
            today,
            &[],
        );
        let (state, command) = advance_bulk(state, BulkEvent::Continue, today, &[]);
        assert!(state.is_submitting());
        match command.unwrap() {
            BulkCommand::FanOutUpdate { ids, update, patch } => {
                assert_eq!(ids.len(), 3);
                assert_eq!(update.sub_stage, SubStage::MeetDone);
                assert_eq!(update.stage, Some(Stage::Onboarding));
                assert_eq!(patch.stage, Some(Stage::Onboarding));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_bulk_reschedule_reverts_to_scheduled() {
        let accounts = homogeneous_accounts();
        let summary = summarize_selection(&accounts, &selected(&["t-1", "t-2"])).unwrap();
        let today = civil::date(2026, 8, 7);

        let (state, _) = advance_bulk(
            BulkState::Idle,
            BulkEvent::Request {
                target: SubStage::MeetReschedule,
                summary,
            },
            today,
            &[],
        );
        let (state, _) = advance_bulk(state, BulkEvent::Continue, today, &[]);
        assert!(matches!(state, BulkState::Handover { .. }));
        let (mut state, _) = advance_bulk(state, BulkEvent::Continue, today, &[]);
        if let BulkState::Schedule { form, .. } = &mut state {
            form.reschedule_reason = "venue change".to_string();
        }
        let (state, command) = advance_bulk(state, BulkEvent::Continue, today, &[]);
        assert!(state.is_submitting());
        match command.unwrap() {
            BulkCommand::FanOutHandoverSchedule { ids, patch, .. } => {
                assert_eq!(ids.len(), 2);
                // Displayed sub-stage reverts to Meet Scheduled
                assert_eq!(patch.sub_stage, Some(SubStage::MeetScheduled));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_bulk_reason_shared_once() {
        let accounts = homogeneous_accounts();
        let summary = summarize_selection(&accounts, &selected(&["t-1", "t-2"])).unwrap();
        let today = civil::date(2026, 8, 7);

        let (state, _) = advance_bulk(
            BulkState::Idle,
            BulkEvent::Request {
                target: SubStage::MeetCancelled,
                summary,
            },
            today,
            &[],
        );
        let (mut state, _) = advance_bulk(state, BulkEvent::Continue, today, &[]);
        assert!(matches!(state, BulkState::Reason { .. }));
        if let BulkState::Reason { form, .. } = &mut state {
            form.reason = "event cancelled".to_string();
        }
        let (_, command) = advance_bulk(state, BulkEvent::Continue, today, &[]);
        match command.unwrap() {
            BulkCommand::FanOutUpdate { ids, update, .. } => {
                assert_eq!(ids.len(), 2);
                assert_eq!(update.reason.as_deref(), Some("event cancelled"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_bulk_illegal_target_ignored() {
        let accounts = homogeneous_accounts();
        let summary = summarize_selection(&accounts, &selected(&["t-1"])).unwrap();
        let today = civil::date(2026, 8, 7);
        let (state, command) = advance_bulk(
            BulkState::Idle,
            BulkEvent::Request {
                // Meet Pending is not reachable from Meet Scheduled
                target: SubStage::MeetPending,
                summary,
            },
            today,
            &[],
        );
        assert_eq!(state, BulkState::Idle);
        assert!(command.is_none());
    }

    #[test]
    fn test_report_toasts() {
        let target = SubStage::MeetDone;
        let all_good = BulkReport {
            succeeded: vec!["t-1".to_string(), "t-2".to_string()],
            failed: vec![],
        };
        assert_eq!(all_good.toast(&target).level, crate::notify::ToastLevel::Success);

        let partial = BulkReport {
            succeeded: vec!["t-1".to_string()],
            failed: vec![("t-2".to_string(), "503".to_string())],
        };
        let toast = partial.toast(&target);
        assert_eq!(toast.level, crate::notify::ToastLevel::Warning);
        assert!(toast.message.contains("1 of 2"));

        let none = BulkReport {
            succeeded: vec![],
            failed: vec![("t-1".to_string(), "403".to_string())],
        };
        assert_eq!(none.toast(&target).level, crate::notify::ToastLevel::Error);
    }
}
