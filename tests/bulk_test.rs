//! Bulk workflow scenarios: homogeneity gating, shared forms, fan-out
//! aggregation.

mod common;

use std::sync::atomic::Ordering;

use common::{StubService, counting_hub, mock_account};
use rooftops::notify::ToastLevel;
use rooftops::tui::table::{
    Command, TableAction, TableState, compute_table_view_model, reduce_table_state,
};
use rooftops::types::{Stage, SubStage};
use rooftops::workflow::bulk::BulkState;
use rooftops::workflow::ops;

const LIST_HEIGHT: usize = 20;

fn dispatch(state: TableState, action: TableAction) -> (TableState, Vec<Command>) {
    let mut next = reduce_table_state(state, action, LIST_HEIGHT);
    let commands = next.take_commands();
    (next, commands)
}

async fn execute_bulk(
    mut state: TableState,
    commands: Vec<Command>,
    service: &StubService,
    hub: &rooftops::ToastHub,
) -> TableState {
    for command in commands {
        if let Command::RunBulk { target, command } = command {
            let patch = command.patch().clone();
            let report = ops::run_bulk(service, hub, &target, command).await;
            state = reduce_table_state(
                state,
                TableAction::BulkCompleted { report, patch },
                LIST_HEIGHT,
            );
        }
    }
    state
}

fn three_scheduled() -> TableState {
    let mut state = TableState::new(jiff::civil::date(2026, 8, 7), 50);
    state.accounts = vec![
        mock_account("t-1", Stage::Contracted, SubStage::MeetScheduled),
        mock_account("t-2", Stage::Contracted, SubStage::MeetScheduled),
        mock_account("t-3", Stage::Contracted, SubStage::MeetScheduled),
    ];
    state
}

fn select_all(state: TableState) -> TableState {
    reduce_table_state(state, TableAction::ToggleSelectAll, LIST_HEIGHT)
}

#[tokio::test]
async fn scenario_c_bulk_meet_done() {
    let service = StubService::new();
    let (hub, toast_count, toasts) = counting_hub();
    let state = select_all(three_scheduled());
    assert_eq!(state.selected_ids.len(), 3);

    let (state, _) = dispatch(state, TableAction::OpenBulkMenu);
    let menu = state.bulk_menu.as_ref().expect("bulk menu open");
    assert_eq!(menu.summary.count(), 3);

    // Options: Scheduled, Reschedule, Done, Cancelled, Drop Off
    let (state, _) = dispatch(state, TableAction::MenuDown);
    let (state, _) = dispatch(state, TableAction::MenuDown);
    let (state, commands) = dispatch(state, TableAction::MenuChoose);
    assert!(commands.is_empty());
    assert!(matches!(state.bulk, BulkState::Confirm { .. }));

    // The summary confirmation fans out immediately for Meet Done
    let (state, commands) = dispatch(state, TableAction::Confirm);
    assert_eq!(commands.len(), 1);

    let state = execute_bulk(state, commands, &service, &hub).await;

    for account in &state.accounts {
        assert_eq!(account.sub_stage, SubStage::MeetDone);
        assert_eq!(account.stage, Stage::Onboarding);
    }
    // Selection cleared afterwards, one aggregate toast
    assert!(state.selected_ids.is_empty());
    assert_eq!(state.bulk, BulkState::Idle);
    assert_eq!(toast_count.load(Ordering::SeqCst), 1);
    assert_eq!(toasts.lock()[0].level, ToastLevel::Success);

    // One independent mutation per account
    assert_eq!(service.update_calls().len(), 3);
}

#[tokio::test]
async fn bulk_partial_failure_reports_aggregate_and_skips_failed() {
    let service = StubService::new();
    service.fail_for("t-2");
    let (hub, toast_count, toasts) = counting_hub();
    let state = select_all(three_scheduled());

    let (state, _) = dispatch(state, TableAction::OpenBulkMenu);
    let (state, _) = dispatch(state, TableAction::MenuDown);
    let (state, _) = dispatch(state, TableAction::MenuDown);
    let (state, _) = dispatch(state, TableAction::MenuChoose);
    let (state, commands) = dispatch(state, TableAction::Confirm);
    let state = execute_bulk(state, commands, &service, &hub).await;

    // Succeeded siblings were applied, the failed one was not
    assert_eq!(state.accounts[0].sub_stage, SubStage::MeetDone);
    assert_eq!(state.accounts[1].sub_stage, SubStage::MeetScheduled);
    assert_eq!(state.accounts[1].stage, Stage::Contracted);
    assert_eq!(state.accounts[2].sub_stage, SubStage::MeetDone);

    // One aggregate warning toast, not one per failure
    assert_eq!(toast_count.load(Ordering::SeqCst), 1);
    let toast = &toasts.lock()[0];
    assert_eq!(toast.level, ToastLevel::Warning);
    assert!(toast.message.contains("1 of 3"));
}

#[tokio::test]
async fn bulk_cancellation_shares_one_reason() {
    let service = StubService::new();
    let (hub, _, _) = counting_hub();
    let state = select_all(three_scheduled());

    let (state, _) = dispatch(state, TableAction::OpenBulkMenu);
    // Cancelled is option index 3
    let (state, _) = dispatch(state, TableAction::MenuDown);
    let (state, _) = dispatch(state, TableAction::MenuDown);
    let (state, _) = dispatch(state, TableAction::MenuDown);
    let (state, _) = dispatch(state, TableAction::MenuChoose);
    let (mut state, _) = dispatch(state, TableAction::Confirm);
    assert!(matches!(state.bulk, BulkState::Reason { .. }));

    for c in "event cancelled".chars() {
        let (next, _) = dispatch(state, TableAction::FormChar(c));
        state = next;
    }
    let (state, commands) = dispatch(state, TableAction::Confirm);
    let state = execute_bulk(state, commands, &service, &hub).await;

    let updates = service.update_calls();
    assert_eq!(updates.len(), 3);
    for (_, update) in &updates {
        assert_eq!(update.sub_stage, SubStage::MeetCancelled);
        assert_eq!(update.reason.as_deref(), Some("event cancelled"));
    }
    for account in &state.accounts {
        assert_eq!(account.sub_stage, SubStage::MeetCancelled);
    }
}

#[tokio::test]
async fn bulk_disabled_for_mixed_selection() {
    let mut state = three_scheduled();
    state.accounts[1].sub_stage = SubStage::MeetPending;
    let state = select_all(state);

    let vm = compute_table_view_model(&state, LIST_HEIGHT);
    assert!(!vm.bulk_enabled);

    // The menu refuses to open for a heterogeneous selection
    let (state, _) = dispatch(state, TableAction::OpenBulkMenu);
    assert!(state.bulk_menu.is_none());
}

#[tokio::test]
async fn bulk_disabled_after_refresh_invalidates_selection() {
    let state = select_all(three_scheduled());
    let vm = compute_table_view_model(&state, LIST_HEIGHT);
    assert!(vm.bulk_enabled);

    // A background refresh moved one account forward; same ids, new data
    let mut state = state;
    state.accounts[0].sub_stage = SubStage::MeetDone;
    let vm = compute_table_view_model(&state, LIST_HEIGHT);
    assert!(!vm.bulk_enabled);
}

#[tokio::test]
async fn bulk_reschedule_applies_meet_scheduled() {
    let service = StubService::new();
    let (hub, _, _) = counting_hub();
    let state = select_all(three_scheduled());

    let (state, _) = dispatch(state, TableAction::OpenBulkMenu);
    // Reschedule is option index 1
    let (state, _) = dispatch(state, TableAction::MenuDown);
    let (state, _) = dispatch(state, TableAction::MenuChoose);
    let (state, _) = dispatch(state, TableAction::Confirm);
    assert!(matches!(state.bulk, BulkState::Handover { .. }));

    // Shared handover form (defaults are valid), then schedule with reason
    let (mut state, _) = dispatch(state, TableAction::Confirm);
    assert!(matches!(state.bulk, BulkState::Schedule { .. }));
    if let BulkState::Schedule { form, .. } = &mut state.bulk {
        form.reschedule_reason = "venue change".to_string();
    }
    let (state, commands) = dispatch(state, TableAction::Confirm);
    assert_eq!(commands.len(), 1);

    let state = execute_bulk(state, commands, &service, &hub).await;

    // Displayed sub-stage reverts to Meet Scheduled on every account
    for account in &state.accounts {
        assert_eq!(account.sub_stage, SubStage::MeetScheduled);
        assert_eq!(account.stage, Stage::Contracted);
    }
    // One handover + one schedule call per account
    assert_eq!(service.calls().len(), 6);
}
