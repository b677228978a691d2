//! End-to-end single-item workflow scenarios against the stub service.
//!
//! These drive the table reducer exactly as the key handlers would, then
//! execute the queued commands through the ops layer and feed the results
//! back, asserting on the resulting account list and toast cardinality.

mod common;

use std::sync::atomic::Ordering;

use common::{StubService, contracted_pending, counting_hub, mock_account};
use rooftops::notify::ToastLevel;
use rooftops::remote::SchedulePayload;
use rooftops::tui::table::{Command, TableAction, TableState, reduce_table_state};
use rooftops::types::{Stage, SubStage};
use rooftops::workflow::ops;
use rooftops::workflow::single::WorkflowState;

const LIST_HEIGHT: usize = 20;

fn dispatch(state: TableState, action: TableAction) -> (TableState, Vec<Command>) {
    let mut next = reduce_table_state(state, action, LIST_HEIGHT);
    let commands = next.take_commands();
    (next, commands)
}

/// Run queued commands the way the async handlers would.
async fn execute(
    mut state: TableState,
    commands: Vec<Command>,
    service: &StubService,
    hub: &rooftops::ToastHub,
) -> TableState {
    for command in commands {
        match command {
            Command::RunWorkflow {
                account_id,
                command,
            } => {
                let action = match ops::run_single(service, hub, &account_id, command).await {
                    Ok(patch) => TableAction::SingleCompleted { account_id, patch },
                    Err(_) => TableAction::SingleFailed,
                };
                state = reduce_table_state(state, action, LIST_HEIGHT);
            }
            Command::RunBulk { target, command } => {
                let patch = command.patch().clone();
                let report = ops::run_bulk(service, hub, &target, command).await;
                let action = TableAction::BulkCompleted { report, patch };
                state = reduce_table_state(state, action, LIST_HEIGHT);
            }
            Command::LoadObManagers => {
                let managers = ops::load_poc_names(service, hub, rooftops::PocKind::Onboarding).await;
                state = reduce_table_state(state, TableAction::ObManagersLoaded(managers), LIST_HEIGHT);
            }
            // List fetches and debounce timers are covered by the table
            // model tests
            Command::FetchPage { .. } | Command::DebounceSearch { .. } => {}
        }
    }
    state
}

fn state_with_accounts(accounts: Vec<rooftops::Account>) -> TableState {
    let mut state = TableState::new(jiff::civil::date(2026, 8, 7), 50);
    state.accounts = accounts;
    state
}

#[tokio::test]
async fn scenario_a_first_booking_happy_path() {
    let service = StubService::new();
    let (hub, toast_count, toasts) = counting_hub();
    let state = state_with_accounts(vec![contracted_pending("t-1")]);

    // Open the sub-stage menu and pick Meet Scheduled
    let (state, _) = dispatch(state, TableAction::OpenMenu);
    assert_eq!(
        state.menu.as_ref().unwrap().options,
        vec![
            SubStage::MeetPending,
            SubStage::MeetScheduled,
            SubStage::DropOff
        ]
    );
    let (state, _) = dispatch(state, TableAction::MenuDown);
    let (mut state, commands) = dispatch(state, TableAction::MenuChoose);
    assert!(commands.is_empty());

    // Fill the handover form: one platform, DMS "X", website "Y", one
    // language (defaults already carry FTP + English)
    match &mut state.workflow {
        WorkflowState::Handover { form, .. } => {
            form.input.dms = "X".to_string();
            form.input.website_provider = "Y".to_string();
        }
        other => panic!("expected handover step, got {:?}", other),
    }
    let (state, commands) = dispatch(state, TableAction::Confirm);
    assert!(commands.is_empty());
    assert!(matches!(state.workflow, WorkflowState::Schedule { .. }));

    // Keep the default schedule: first day, IST, 8:00 PM, 30 minutes
    let (state, commands) = dispatch(state, TableAction::Confirm);
    assert_eq!(commands.len(), 1);
    assert!(state.workflow.is_submitting());

    let state = execute(state, commands, &service, &hub).await;

    assert_eq!(state.accounts[0].sub_stage, SubStage::MeetScheduled);
    assert_eq!(state.accounts[0].stage, Stage::Contracted); // unchanged
    assert_eq!(state.workflow, WorkflowState::Idle);

    // Exactly one success toast
    assert_eq!(toast_count.load(Ordering::SeqCst), 1);
    assert_eq!(toasts.lock()[0].level, ToastLevel::Success);

    // One handover call and one schedule call, both for t-1
    let calls = service.calls();
    assert_eq!(calls.len(), 2);
    match &calls[1] {
        common::CallRecord::Schedule { id, payload } => {
            assert_eq!(id, "t-1");
            match payload {
                SchedulePayload::Call(call) => {
                    assert_eq!(call.duration_minutes, 30);
                    assert_eq!(call.start_time, "8:00 PM");
                    assert_eq!(call.end_time, "8:30 PM");
                }
                other => panic!("expected call payload, got {:?}", other),
            }
        }
        other => panic!("expected schedule call, got {:?}", other),
    }
}

#[tokio::test]
async fn scenario_b_cancellation_requires_reason() {
    let service = StubService::new();
    let (hub, toast_count, _) = counting_hub();
    let state = state_with_accounts(vec![mock_account(
        "t-1",
        Stage::Contracted,
        SubStage::MeetScheduled,
    )]);

    let (state, _) = dispatch(state, TableAction::OpenMenu);
    // Options: Scheduled, Reschedule, Done, Cancelled, Drop Off
    let (state, _) = dispatch(state, TableAction::MenuDown);
    let (state, _) = dispatch(state, TableAction::MenuDown);
    let (state, _) = dispatch(state, TableAction::MenuDown);
    let (state, _) = dispatch(state, TableAction::MenuChoose);
    assert!(matches!(
        state.workflow,
        WorkflowState::CancelReason { .. }
    ));

    // Confirm with an empty reason is a no-op: button disabled
    let (state, commands) = dispatch(state, TableAction::Confirm);
    assert!(commands.is_empty());
    assert!(matches!(
        state.workflow,
        WorkflowState::CancelReason { .. }
    ));

    // Type the reason and confirm
    let mut state = state;
    for c in "client unavailable".chars() {
        let (next, _) = dispatch(state, TableAction::FormChar(c));
        state = next;
    }
    let (state, commands) = dispatch(state, TableAction::Confirm);
    assert_eq!(commands.len(), 1);

    let state = execute(state, commands, &service, &hub).await;

    assert_eq!(state.accounts[0].sub_stage, SubStage::MeetCancelled);
    assert_eq!(state.workflow, WorkflowState::Idle);
    assert_eq!(toast_count.load(Ordering::SeqCst), 1);

    let updates = service.update_calls();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].1.sub_stage, SubStage::MeetCancelled);
    assert_eq!(updates[0].1.reason.as_deref(), Some("client unavailable"));
}

#[tokio::test]
async fn failed_mutation_keeps_modal_open_and_state_unchanged() {
    let service = StubService::new();
    service.fail_for("t-1");
    let (hub, toast_count, toasts) = counting_hub();
    let state = state_with_accounts(vec![mock_account(
        "t-1",
        Stage::Contracted,
        SubStage::MeetScheduled,
    )]);
    let before = state.accounts.clone();

    let (state, _) = dispatch(state, TableAction::OpenMenu);
    let (state, _) = dispatch(state, TableAction::MenuDown);
    let (state, _) = dispatch(state, TableAction::MenuDown);
    let (state, _) = dispatch(state, TableAction::MenuDown);
    let (mut state, _) = dispatch(state, TableAction::MenuChoose);
    for c in "no show".chars() {
        let (next, _) = dispatch(state, TableAction::FormChar(c));
        state = next;
    }
    let (state, commands) = dispatch(state, TableAction::Confirm);
    let state = execute(state, commands, &service, &hub).await;

    // Nothing was applied locally and the dialog is back with its input
    assert_eq!(state.accounts, before);
    match &state.workflow {
        WorkflowState::CancelReason { form } => assert_eq!(form.reason, "no show"),
        other => panic!("expected reason dialog restored, got {:?}", other),
    }
    assert_eq!(toast_count.load(Ordering::SeqCst), 1);
    assert_eq!(toasts.lock()[0].level, ToastLevel::Error);
}

#[tokio::test]
async fn reselecting_current_value_succeeds_with_one_toast() {
    let service = StubService::new();
    let (hub, toast_count, toasts) = counting_hub();
    let state = state_with_accounts(vec![contracted_pending("t-1")]);

    // Cursor 0 in the menu is the current value (Meet Pending)
    let (state, _) = dispatch(state, TableAction::OpenMenu);
    let (state, commands) = dispatch(state, TableAction::MenuChoose);
    assert_eq!(commands.len(), 1);

    let state = execute(state, commands, &service, &hub).await;

    assert_eq!(state.accounts[0].sub_stage, SubStage::MeetPending);
    assert_eq!(state.accounts[0].stage, Stage::Contracted);
    assert_eq!(state.workflow, WorkflowState::Idle);
    assert_eq!(toast_count.load(Ordering::SeqCst), 1);
    assert_eq!(toasts.lock()[0].level, ToastLevel::Success);
}

#[tokio::test]
async fn meet_done_forces_onboarding_stage() {
    let service = StubService::new();
    let (hub, _, _) = counting_hub();
    let mut state = state_with_accounts(vec![mock_account(
        "t-1",
        Stage::Contracted,
        SubStage::MeetScheduled,
    )]);
    state.ob_managers = vec![rooftops::PocName {
        id: "ob-1".to_string(),
        name: "Prakash Kumar".to_string(),
    }];

    let (state, _) = dispatch(state, TableAction::OpenMenu);
    let (state, _) = dispatch(state, TableAction::MenuDown);
    let (state, _) = dispatch(state, TableAction::MenuDown);
    let (state, _) = dispatch(state, TableAction::MenuChoose);
    assert!(matches!(state.workflow, WorkflowState::ConfirmDone { .. }));

    let (state, commands) = dispatch(state, TableAction::Confirm);
    assert_eq!(commands.len(), 1);
    let state = execute(state, commands, &service, &hub).await;

    assert_eq!(state.accounts[0].sub_stage, SubStage::MeetDone);
    assert_eq!(state.accounts[0].stage, Stage::Onboarding);
    assert_eq!(
        state.accounts[0].onboarding_manager.as_deref(),
        Some("Prakash Kumar")
    );
}

#[tokio::test]
async fn drop_off_forces_drop_off_stage() {
    let service = StubService::new();
    let (hub, _, _) = counting_hub();
    let state = state_with_accounts(vec![contracted_pending("t-1")]);

    let (state, _) = dispatch(state, TableAction::OpenMenu);
    let (state, _) = dispatch(state, TableAction::MenuDown);
    let (state, _) = dispatch(state, TableAction::MenuDown);
    let (state, _) = dispatch(state, TableAction::MenuChoose);
    assert!(matches!(state.workflow, WorkflowState::ConfirmDropOff));

    let (state, commands) = dispatch(state, TableAction::Confirm);
    let state = execute(state, commands, &service, &hub).await;

    assert_eq!(state.accounts[0].sub_stage, SubStage::DropOff);
    assert_eq!(state.accounts[0].stage, Stage::DropOff);
}
