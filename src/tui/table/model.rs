//! Table state, actions, and view models.
//!
//! This module separates state (TableState) from view (TableViewModel)
//! enabling comprehensive unit testing without the iocraft framework. The
//! reducer is the only place the account list is touched: page fetches
//! replace or append it, completed mutations patch or remove single
//! entries, and nothing else may write to it.

use std::collections::HashSet;

use iocraft::prelude::{KeyCode, KeyModifiers};
use jiff::civil;

use crate::notify::Toast;
use crate::patch::AccountPatch;
use crate::remote::{AccountFilters, AccountPage, AccountQuery, PocName};
use crate::types::{Account, SubStage, format_compact_usd, format_date};
use crate::workflow::bulk::{
    BulkCommand, BulkEvent, BulkReport, BulkState, SelectionSummary, advance_bulk, bulk_options,
    summarize_selection,
};
use crate::workflow::engine::legal_next_sub_stages;
use crate::workflow::forms::{HandoverForm, MeetDoneForm, ReasonForm, ScheduleForm};
use crate::workflow::single::{
    WorkflowCommand, WorkflowCx, WorkflowEvent, WorkflowState, advance,
};

use super::filter::{SortDirection, SortKey, SortSpec, visible_accounts};

/// Rows from the bottom of the loaded set at which the next page fetch
/// kicks in.
pub const SCROLL_FETCH_THRESHOLD: usize = 10;

// ============================================================================
// State Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Idle,
    /// First page for the current query; skeleton rows replace the table
    Initial,
    /// Appending the next page; skeleton rows below the loaded ones
    More,
}

/// The per-row sub-stage dropdown.
#[derive(Debug, Clone, PartialEq)]
pub struct SubStageMenu {
    pub account_id: String,
    pub current: SubStage,
    pub options: Vec<SubStage>,
    pub cursor: usize,
}

/// The bulk-action dropdown over the current selection.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkMenu {
    pub summary: SelectionSummary,
    pub options: Vec<SubStage>,
    pub cursor: usize,
}

/// Side effects the reducer wants executed; drained by the component after
/// each dispatch and run on the async handlers.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Fetch a page; stale generations are discarded on completion
    FetchPage {
        generation: u64,
        query: AccountQuery,
        append: bool,
    },
    /// Start the search debounce clock for this generation
    DebounceSearch { generation: u64 },
    RunWorkflow {
        account_id: String,
        command: WorkflowCommand,
    },
    RunBulk {
        target: SubStage,
        command: BulkCommand,
    },
    LoadObManagers,
}

/// Raw state that changes during user interaction
#[derive(Debug, Clone)]
pub struct TableState {
    // Data
    pub accounts: Vec<Account>,
    pub total: usize,
    pub page: u32,
    pub has_more: bool,
    pub loading: LoadPhase,
    /// Bumped whenever the query changes; in-flight fetches carrying an
    /// older generation are discarded on arrival
    pub fetch_gen: u64,

    // Query
    pub filters: AccountFilters,
    pub contracted_only: bool,
    pub per_page: u32,

    // Search
    pub search_input: String,
    pub search_focused: bool,

    // Sort
    pub sort: Option<SortSpec>,

    // Navigation & selection
    pub selected_index: usize,
    pub scroll_offset: usize,
    pub selected_ids: HashSet<String>,

    // Menus & workflows
    pub menu: Option<SubStageMenu>,
    pub bulk_menu: Option<BulkMenu>,
    pub workflow: WorkflowState,
    /// Account the open single-item flow belongs to
    pub workflow_account: Option<String>,
    pub bulk: BulkState,

    // Pickers
    pub ob_managers: Vec<PocName>,

    /// Fixed at startup so the reducer stays deterministic
    pub today: civil::Date,

    pub toast: Option<Toast>,
    pub should_exit: bool,

    pending: Vec<Command>,
}

impl TableState {
    pub fn new(today: civil::Date, per_page: u32) -> Self {
        TableState {
            accounts: Vec::new(),
            total: 0,
            page: 1,
            has_more: false,
            loading: LoadPhase::Idle,
            fetch_gen: 0,
            filters: AccountFilters::default(),
            contracted_only: false,
            per_page,
            search_input: String::new(),
            search_focused: false,
            sort: None,
            selected_index: 0,
            scroll_offset: 0,
            selected_ids: HashSet::new(),
            menu: None,
            bulk_menu: None,
            workflow: WorkflowState::Idle,
            workflow_account: None,
            bulk: BulkState::Idle,
            ob_managers: Vec::new(),
            today,
            toast: None,
            should_exit: false,
            pending: Vec::new(),
        }
    }

    /// Drain the side effects queued by the last dispatch.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.pending)
    }

    pub fn query(&self) -> AccountQuery {
        let search = self.search_input.trim();
        AccountQuery {
            page: self.page,
            per_page: self.per_page,
            filters: self.filters.clone(),
            contracted_only: self.contracted_only,
            search: if search.is_empty() {
                None
            } else {
                Some(search.to_string())
            },
        }
    }

    fn push_fetch(&mut self, append: bool) {
        self.loading = if append {
            LoadPhase::More
        } else {
            LoadPhase::Initial
        };
        let query = self.query();
        self.pending.push(Command::FetchPage {
            generation: self.fetch_gen,
            query,
            append,
        });
    }

    /// Restart from page one under a new generation; any in-flight fetch
    /// becomes stale.
    fn restart_fetch(&mut self) {
        self.fetch_gen += 1;
        self.page = 1;
        self.selected_index = 0;
        self.scroll_offset = 0;
        self.push_fetch(false);
    }

    fn modal_open(&self) -> bool {
        self.workflow.is_open() || self.bulk.is_open()
    }
}

// ============================================================================
// Action Types
// ============================================================================

/// All possible actions on the table
#[derive(Debug, Clone, PartialEq)]
pub enum TableAction {
    /// First render: fetch page one and the manager picker
    Init,

    // Navigation
    MoveUp,
    MoveDown,
    GoToTop,
    GoToBottom,
    PageUp,
    PageDown,

    // Selection
    ToggleSelection,
    /// Header checkbox: all visible selected -> clear, otherwise select all
    ToggleSelectAll,
    ClearSelection,

    // Search
    FocusSearch,
    SearchInput(char),
    SearchBackspace,
    ExitSearch,
    ClearSearchAndExit,
    /// Debounce timer fired for this generation
    SearchSettled { generation: u64 },

    // Filters & sort
    SetRegionFilter(Option<String>),
    SetTypeFilter(Option<String>),
    SetSubTypeFilter(Option<String>),
    SetAePocFilter(Option<String>),
    SetSubStageFilter(Option<String>),
    ToggleContractedOnly,
    SetSort(SortKey),
    Refresh,

    // Menus
    OpenMenu,
    OpenBulkMenu,
    MenuUp,
    MenuDown,
    MenuChoose,
    CloseMenu,

    // Workflow modal editing
    FormChar(char),
    FormBackspace,
    FormToggle,
    FormCycle(bool),
    FormFocusNext,
    FormFocusPrev,
    FormInvite,

    // Workflow step controls
    Confirm,
    Back,
    CancelModal,

    // Async completions
    PageLoaded {
        generation: u64,
        page: AccountPage,
        append: bool,
    },
    FetchFailed {
        generation: u64,
        message: String,
    },
    SingleCompleted {
        account_id: String,
        patch: AccountPatch,
    },
    SingleFailed,
    BulkCompleted {
        report: BulkReport,
        patch: AccountPatch,
    },
    ObManagersLoaded(Vec<PocName>),
    /// An account is gone from the pipeline; drop its row and selection
    AccountRemoved(String),

    ShowToast(Toast),
    DismissToast,
    Quit,
}

// ============================================================================
// Reducer
// ============================================================================

fn adjust_scroll(scroll_offset: usize, selected_index: usize, list_height: usize) -> usize {
    if list_height == 0 {
        return 0;
    }
    if selected_index < scroll_offset {
        return selected_index;
    }
    if selected_index >= scroll_offset + list_height {
        return selected_index.saturating_sub(list_height - 1);
    }
    scroll_offset
}

/// Whether the cursor position warrants fetching the next page.
pub fn should_fetch_more(state: &TableState, visible_len: usize) -> bool {
    state.has_more
        && state.loading == LoadPhase::Idle
        && state.selected_index + SCROLL_FETCH_THRESHOLD >= visible_len
}

fn move_cursor(state: &mut TableState, new_index: usize, list_height: usize) {
    let visible_len = visible_accounts(state).len();
    if visible_len == 0 {
        state.selected_index = 0;
        state.scroll_offset = 0;
        return;
    }
    state.selected_index = new_index.min(visible_len - 1);
    state.scroll_offset = adjust_scroll(state.scroll_offset, state.selected_index, list_height);

    if should_fetch_more(state, visible_len) {
        state.page += 1;
        state.push_fetch(true);
    }
}

fn cursor_account(state: &TableState) -> Option<Account> {
    visible_accounts(state)
        .get(state.selected_index)
        .map(|a| (*a).clone())
}

/// Route a step event into whichever machine is open, queuing the
/// resulting command.
fn step_workflow(state: &mut TableState, single: WorkflowEvent, bulk: BulkEvent) {
    if state.workflow.is_open() {
        let account = state
            .workflow_account
            .as_ref()
            .and_then(|id| state.accounts.iter().find(|a| &a.id == id).cloned());
        let Some(account) = account else {
            // The row vanished under the flow; drop it
            state.workflow = WorkflowState::Idle;
            state.workflow_account = None;
            return;
        };
        let cx = WorkflowCx {
            stage: account.stage,
            sub_stage: &account.sub_stage,
            ob_managers: &state.ob_managers,
            today: state.today,
        };
        let current = std::mem::replace(&mut state.workflow, WorkflowState::Idle);
        let (next, command) = advance(current, single, &cx);
        state.workflow = next;
        if let Some(command) = command {
            state.pending.push(Command::RunWorkflow {
                account_id: account.id,
                command,
            });
        }
        if !state.workflow.is_open() {
            state.workflow_account = None;
        }
    } else if state.bulk.is_open() {
        let current = std::mem::replace(&mut state.bulk, BulkState::Idle);
        let (next, command) = advance_bulk(current, bulk, state.today, &state.ob_managers);
        state.bulk = next;
        if let Some(command) = command {
            let target = match &command {
                BulkCommand::FanOutUpdate { update, .. } => update.sub_stage.clone(),
                BulkCommand::FanOutHandoverSchedule { patch, .. } => patch
                    .sub_stage
                    .clone()
                    .unwrap_or(SubStage::MeetScheduled),
            };
            state.pending.push(Command::RunBulk { target, command });
        }
    }
}

/// Hand a form-editing closure to whichever handover form is open.
fn with_handover_form(state: &mut TableState, f: impl FnOnce(&mut HandoverForm)) -> bool {
    match (&mut state.workflow, &mut state.bulk) {
        (WorkflowState::Handover { form, .. }, _) => {
            f(form);
            true
        }
        (_, BulkState::Handover { form, .. }) => {
            f(form);
            true
        }
        _ => false,
    }
}

fn with_schedule_form(state: &mut TableState, f: impl FnOnce(&mut ScheduleForm)) -> bool {
    match (&mut state.workflow, &mut state.bulk) {
        (WorkflowState::Schedule { form, .. }, _) => {
            f(form);
            true
        }
        (_, BulkState::Schedule { form, .. }) => {
            f(form);
            true
        }
        _ => false,
    }
}

fn with_reason_form(state: &mut TableState, f: impl FnOnce(&mut ReasonForm)) -> bool {
    match (&mut state.workflow, &mut state.bulk) {
        (WorkflowState::CancelReason { form }, _) => {
            f(form);
            true
        }
        (_, BulkState::Reason { form, .. }) => {
            f(form);
            true
        }
        _ => false,
    }
}

fn with_done_form(state: &mut TableState, f: impl FnOnce(&mut MeetDoneForm)) -> bool {
    if let WorkflowState::ConfirmDone { form } = &mut state.workflow {
        f(form);
        true
    } else {
        false
    }
}

/// Pure function: apply action to state (reducer pattern)
///
/// Contains only state transitions; network I/O happens in the handlers,
/// driven by the commands this queues on the state.
pub fn reduce_table_state(
    mut state: TableState,
    action: TableAction,
    list_height: usize,
) -> TableState {
    match action {
        TableAction::Init => {
            state.push_fetch(false);
            state.pending.push(Command::LoadObManagers);
        }

        // Navigation
        TableAction::MoveUp => {
            let target = state.selected_index.saturating_sub(1);
            move_cursor(&mut state, target, list_height);
        }
        TableAction::MoveDown => {
            let target = state.selected_index + 1;
            move_cursor(&mut state, target, list_height);
        }
        TableAction::GoToTop => {
            state.selected_index = 0;
            state.scroll_offset = 0;
        }
        TableAction::GoToBottom => {
            let len = visible_accounts(&state).len();
            move_cursor(&mut state, len.saturating_sub(1), list_height);
        }
        TableAction::PageUp => {
            let target = state.selected_index.saturating_sub(list_height / 2);
            move_cursor(&mut state, target, list_height);
        }
        TableAction::PageDown => {
            let target = state.selected_index + list_height / 2;
            move_cursor(&mut state, target, list_height);
        }

        // Selection
        TableAction::ToggleSelection => {
            if let Some(account) = cursor_account(&state) {
                if state.selected_ids.contains(&account.id) {
                    state.selected_ids.remove(&account.id);
                } else {
                    state.selected_ids.insert(account.id);
                }
            }
        }
        TableAction::ToggleSelectAll => {
            let visible: Vec<String> = visible_accounts(&state)
                .iter()
                .map(|a| a.id.clone())
                .collect();
            let all_selected =
                !visible.is_empty() && visible.iter().all(|id| state.selected_ids.contains(id));
            if all_selected {
                for id in &visible {
                    state.selected_ids.remove(id);
                }
            } else {
                state.selected_ids.extend(visible);
            }
        }
        TableAction::ClearSelection => {
            state.selected_ids.clear();
        }

        // Search
        TableAction::FocusSearch => {
            state.search_focused = true;
        }
        TableAction::SearchInput(c) => {
            state.search_input.push(c);
            state.fetch_gen += 1;
            state.pending.push(Command::DebounceSearch {
                generation: state.fetch_gen,
            });
        }
        TableAction::SearchBackspace => {
            if state.search_input.pop().is_some() {
                state.fetch_gen += 1;
                state.pending.push(Command::DebounceSearch {
                    generation: state.fetch_gen,
                });
            }
        }
        TableAction::ExitSearch => {
            state.search_focused = false;
        }
        TableAction::ClearSearchAndExit => {
            state.search_focused = false;
            if !state.search_input.is_empty() {
                state.search_input.clear();
                state.restart_fetch();
            }
        }
        TableAction::SearchSettled { generation } => {
            // A newer keystroke superseded this timer; drop it silently
            if generation == state.fetch_gen {
                state.page = 1;
                state.selected_index = 0;
                state.scroll_offset = 0;
                state.push_fetch(false);
            }
        }

        // Filters & sort
        TableAction::SetRegionFilter(region) => {
            state.filters.region = region;
            state.restart_fetch();
        }
        TableAction::SetTypeFilter(account_type) => {
            state.filters.account_type = account_type;
            state.restart_fetch();
        }
        TableAction::SetSubTypeFilter(sub_type) => {
            state.filters.account_sub_type = sub_type;
            state.restart_fetch();
        }
        TableAction::SetAePocFilter(ae_id) => {
            state.filters.ae_id = ae_id;
            state.restart_fetch();
        }
        TableAction::SetSubStageFilter(sub_stage) => {
            state.filters.sub_stage = sub_stage;
            state.restart_fetch();
        }
        TableAction::ToggleContractedOnly => {
            state.contracted_only = !state.contracted_only;
            state.restart_fetch();
        }
        TableAction::SetSort(key) => {
            state.sort = Some(match state.sort {
                Some(spec) if spec.key == key => SortSpec {
                    key,
                    direction: spec.direction.toggled(),
                },
                _ => SortSpec {
                    key,
                    direction: SortDirection::Ascending,
                },
            });
        }
        TableAction::Refresh => {
            state.restart_fetch();
        }

        // Menus
        TableAction::OpenMenu => {
            if !state.modal_open() {
                if let Some(account) = cursor_account(&state) {
                    let options = legal_next_sub_stages(account.stage, &account.sub_stage);
                    state.menu = Some(SubStageMenu {
                        account_id: account.id,
                        current: account.sub_stage,
                        options,
                        cursor: 0,
                    });
                }
            }
        }
        TableAction::OpenBulkMenu => {
            // Re-derived from current data; a stale selection opens nothing
            if !state.modal_open() {
                if let Some(summary) = summarize_selection(&state.accounts, &state.selected_ids) {
                    let options = bulk_options(&summary);
                    state.bulk_menu = Some(BulkMenu {
                        summary,
                        options,
                        cursor: 0,
                    });
                }
            }
        }
        TableAction::MenuUp => {
            if let Some(menu) = &mut state.menu {
                menu.cursor = menu.cursor.saturating_sub(1);
            } else if let Some(menu) = &mut state.bulk_menu {
                menu.cursor = menu.cursor.saturating_sub(1);
            }
        }
        TableAction::MenuDown => {
            if let Some(menu) = &mut state.menu {
                menu.cursor = (menu.cursor + 1).min(menu.options.len().saturating_sub(1));
            } else if let Some(menu) = &mut state.bulk_menu {
                menu.cursor = (menu.cursor + 1).min(menu.options.len().saturating_sub(1));
            }
        }
        TableAction::MenuChoose => {
            if let Some(menu) = state.menu.take() {
                if let Some(target) = menu.options.get(menu.cursor).cloned() {
                    // The menu only opens while no flow is active, so the
                    // machine is Idle here and the request starts it
                    let account = state
                        .accounts
                        .iter()
                        .find(|a| a.id == menu.account_id)
                        .cloned();
                    if let Some(account) = account {
                        state.workflow_account = Some(account.id.clone());
                        let cx = WorkflowCx {
                            stage: account.stage,
                            sub_stage: &account.sub_stage,
                            ob_managers: &state.ob_managers,
                            today: state.today,
                        };
                        let (next, command) = advance(
                            WorkflowState::Idle,
                            WorkflowEvent::Request { target },
                            &cx,
                        );
                        state.workflow = next;
                        if let Some(command) = command {
                            state.pending.push(Command::RunWorkflow {
                                account_id: account.id,
                                command,
                            });
                        } else if !state.workflow.is_open() {
                            state.workflow_account = None;
                        }
                    }
                }
            } else if let Some(menu) = state.bulk_menu.take() {
                if let Some(target) = menu.options.get(menu.cursor).cloned() {
                    let current = std::mem::replace(&mut state.bulk, BulkState::Idle);
                    let (next, _) = advance_bulk(
                        current,
                        BulkEvent::Request {
                            target,
                            summary: menu.summary,
                        },
                        state.today,
                        &state.ob_managers,
                    );
                    state.bulk = next;
                }
            }
        }
        TableAction::CloseMenu => {
            state.menu = None;
            state.bulk_menu = None;
        }

        // Workflow modal editing
        TableAction::FormChar(c) => {
            if !with_handover_form(&mut state, |f| f.handle_char(c)) {
                if !with_schedule_form(&mut state, |f| f.handle_char(c)) {
                    with_reason_form(&mut state, |f| f.insert_char(c));
                }
            }
        }
        TableAction::FormBackspace => {
            if !with_handover_form(&mut state, |f| f.backspace()) {
                if !with_schedule_form(&mut state, |f| f.backspace()) {
                    with_reason_form(&mut state, |f| f.backspace());
                }
            }
        }
        TableAction::FormToggle => {
            if !with_handover_form(&mut state, |f| f.space()) {
                if !with_schedule_form(&mut state, |f| f.space()) {
                    with_reason_form(&mut state, |f| f.insert_char(' '));
                }
            }
        }
        TableAction::FormCycle(forward) => {
            if !with_schedule_form(&mut state, |f| f.cycle(forward)) {
                with_done_form(&mut state, |f| f.cycle(forward));
            }
        }
        TableAction::FormFocusNext => {
            if !with_handover_form(&mut state, |f| f.focus_next()) {
                with_schedule_form(&mut state, |f| f.focus_next());
            }
        }
        TableAction::FormFocusPrev => {
            if !with_handover_form(&mut state, |f| f.focus_prev()) {
                with_schedule_form(&mut state, |f| f.focus_prev());
            }
        }
        TableAction::FormInvite => {
            with_schedule_form(&mut state, |f| f.invite());
        }

        // Workflow step controls
        TableAction::Confirm => {
            step_workflow(&mut state, WorkflowEvent::Continue, BulkEvent::Continue);
        }
        TableAction::Back => {
            step_workflow(&mut state, WorkflowEvent::Back, BulkEvent::Back);
        }
        TableAction::CancelModal => {
            step_workflow(&mut state, WorkflowEvent::Cancel, BulkEvent::Cancel);
        }

        // Async completions
        TableAction::PageLoaded { generation, page, append } => {
            if generation != state.fetch_gen {
                // Superseded by a newer query; discard silently
                return state;
            }
            if append {
                state.accounts.extend(page.accounts);
            } else {
                state.accounts = page.accounts;
                state.selected_index = 0;
                state.scroll_offset = 0;
            }
            state.has_more = page.has_more;
            state.total = page.total;
            state.loading = LoadPhase::Idle;
        }
        TableAction::FetchFailed { generation, message } => {
            if generation != state.fetch_gen {
                return state;
            }
            state.loading = LoadPhase::Idle;
            state.toast = Some(Toast::error(format!("Failed to load accounts: {}", message)));
        }
        TableAction::SingleCompleted { account_id, patch } => {
            if let Some(account) = state.accounts.iter_mut().find(|a| a.id == account_id) {
                patch.apply(account);
            }
            step_workflow(&mut state, WorkflowEvent::Submitted, BulkEvent::Cancel);
        }
        TableAction::SingleFailed => {
            // Local state untouched; the modal stays open for retry
            step_workflow(&mut state, WorkflowEvent::Failed, BulkEvent::Cancel);
        }
        TableAction::BulkCompleted { report, patch } => {
            for id in &report.succeeded {
                if let Some(account) = state.accounts.iter_mut().find(|a| &a.id == id) {
                    patch.apply(account);
                }
            }
            let current = std::mem::replace(&mut state.bulk, BulkState::Idle);
            let (next, _) = advance_bulk(
                current,
                BulkEvent::Completed,
                state.today,
                &state.ob_managers,
            );
            state.bulk = next;
            state.selected_ids.clear();
        }
        TableAction::ObManagersLoaded(managers) => {
            state.ob_managers = managers;
        }
        TableAction::AccountRemoved(id) => {
            state.accounts.retain(|a| a.id != id);
            state.selected_ids.remove(&id);
            let len = visible_accounts(&state).len();
            if len == 0 {
                state.selected_index = 0;
                state.scroll_offset = 0;
            } else if state.selected_index >= len {
                state.selected_index = len - 1;
            }
        }

        TableAction::ShowToast(toast) => {
            state.toast = Some(toast);
        }
        TableAction::DismissToast => {
            state.toast = None;
        }
        TableAction::Quit => {
            state.should_exit = true;
        }
    }

    state
}

// ============================================================================
// Key mapping
// ============================================================================

/// Convert a key event to a TableAction (pure function)
///
/// Modal states capture input first: open menus, then workflow modals,
/// then search, then the normal table bindings.
pub fn key_to_action(
    code: KeyCode,
    modifiers: KeyModifiers,
    state: &TableState,
) -> Option<TableAction> {
    if state.menu.is_some() || state.bulk_menu.is_some() {
        return match code {
            KeyCode::Esc => Some(TableAction::CloseMenu),
            KeyCode::Enter => Some(TableAction::MenuChoose),
            KeyCode::Char('j') | KeyCode::Down => Some(TableAction::MenuDown),
            KeyCode::Char('k') | KeyCode::Up => Some(TableAction::MenuUp),
            _ => None,
        };
    }

    if state.workflow.is_open() || state.bulk.is_open() {
        return modal_key_to_action(code, modifiers, state);
    }

    if state.search_focused {
        return search_key_to_action(code, modifiers);
    }

    normal_key_to_action(code, modifiers)
}

fn editing_form(state: &TableState) -> bool {
    matches!(
        state.workflow,
        WorkflowState::Handover { .. }
            | WorkflowState::Schedule { .. }
            | WorkflowState::CancelReason { .. }
    ) || matches!(
        state.bulk,
        BulkState::Handover { .. } | BulkState::Schedule { .. } | BulkState::Reason { .. }
    )
}

fn modal_key_to_action(
    code: KeyCode,
    modifiers: KeyModifiers,
    state: &TableState,
) -> Option<TableAction> {
    // Submitting: only a quit is accepted; the in-flight call resolves the
    // modal one way or the other
    if state.workflow.is_submitting() || state.bulk.is_submitting() {
        return match (code, modifiers) {
            (KeyCode::Char('q'), m) if m.contains(KeyModifiers::CONTROL) => {
                Some(TableAction::Quit)
            }
            _ => None,
        };
    }

    match (code, modifiers) {
        (KeyCode::Esc, _) => Some(TableAction::CancelModal),
        (KeyCode::Enter, _) => Some(TableAction::Confirm),
        (KeyCode::Tab, KeyModifiers::NONE) => Some(TableAction::FormFocusNext),
        (KeyCode::BackTab, _) => Some(TableAction::FormFocusPrev),
        (KeyCode::Left, _) => Some(TableAction::FormCycle(false)),
        (KeyCode::Right, _) => Some(TableAction::FormCycle(true)),
        (KeyCode::Char('b'), m) if m.contains(KeyModifiers::CONTROL) => Some(TableAction::Back),
        (KeyCode::Char('i'), m) if m.contains(KeyModifiers::CONTROL) => {
            Some(TableAction::FormInvite)
        }
        (KeyCode::Backspace, _) if editing_form(state) => Some(TableAction::FormBackspace),
        (KeyCode::Char(' '), KeyModifiers::NONE) if editing_form(state) => {
            // Space both toggles checkboxes and types into text fields; the
            // form routes it by focused field
            Some(TableAction::FormToggle)
        }
        (KeyCode::Char(c), m) if editing_form(state) && !m.contains(KeyModifiers::CONTROL) => {
            Some(TableAction::FormChar(c))
        }
        _ => None,
    }
}

fn search_key_to_action(code: KeyCode, modifiers: KeyModifiers) -> Option<TableAction> {
    match (code, modifiers) {
        (KeyCode::Esc, _) => Some(TableAction::ClearSearchAndExit),
        (KeyCode::Enter, _) => Some(TableAction::ExitSearch),
        (KeyCode::Backspace, _) => Some(TableAction::SearchBackspace),
        (KeyCode::Char('q'), m) if m.contains(KeyModifiers::CONTROL) => Some(TableAction::Quit),
        (KeyCode::Char(c), m) if !m.contains(KeyModifiers::CONTROL) => {
            Some(TableAction::SearchInput(c))
        }
        _ => None,
    }
}

fn normal_key_to_action(code: KeyCode, modifiers: KeyModifiers) -> Option<TableAction> {
    match (code, modifiers) {
        // Navigation
        (KeyCode::Char('j') | KeyCode::Down, KeyModifiers::NONE) => Some(TableAction::MoveDown),
        (KeyCode::Char('k') | KeyCode::Up, KeyModifiers::NONE) => Some(TableAction::MoveUp),
        (KeyCode::Char('g'), KeyModifiers::NONE) => Some(TableAction::GoToTop),
        (KeyCode::Char('G'), _) => Some(TableAction::GoToBottom),
        (KeyCode::PageUp, _) => Some(TableAction::PageUp),
        (KeyCode::PageDown, _) => Some(TableAction::PageDown),

        // Selection
        (KeyCode::Char(' '), KeyModifiers::NONE) => Some(TableAction::ToggleSelection),
        (KeyCode::Char('a'), KeyModifiers::NONE) => Some(TableAction::ToggleSelectAll),
        (KeyCode::Char('x'), KeyModifiers::NONE) => Some(TableAction::ClearSelection),

        // Search
        (KeyCode::Char('/'), KeyModifiers::NONE) => Some(TableAction::FocusSearch),

        // Workflow
        (KeyCode::Enter | KeyCode::Char('s'), KeyModifiers::NONE) => Some(TableAction::OpenMenu),
        (KeyCode::Char('B'), _) => Some(TableAction::OpenBulkMenu),

        // Filters
        (KeyCode::Char('c'), KeyModifiers::NONE) => Some(TableAction::ToggleContractedOnly),
        (KeyCode::Char('r'), KeyModifiers::NONE) => Some(TableAction::Refresh),

        (KeyCode::Char('q') | KeyCode::Esc, KeyModifiers::NONE) => Some(TableAction::Quit),
        (KeyCode::Char('q'), m) if m.contains(KeyModifiers::CONTROL) => Some(TableAction::Quit),

        _ => None,
    }
}

// ============================================================================
// View Model Types
// ============================================================================

/// Header strip: enterprise count and total contracted ARR for the loaded
/// rows.
#[derive(Debug, Clone)]
pub struct MetricsViewModel {
    pub enterprise_count: usize,
    pub total_arr: String,
    pub total_available: usize,
}

#[derive(Debug, Clone)]
pub struct RowViewModel {
    pub account: Account,
    pub is_selected: bool,
    pub is_cursor: bool,
    pub arr_display: String,
    pub contracted_date_display: String,
}

/// Header select-all checkbox state; `Some` renders indeterminate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectAllState {
    None,
    Some,
    All,
}

#[derive(Debug, Clone)]
pub struct MenuViewModel {
    pub title: String,
    pub options: Vec<(String, bool)>,
    pub cursor: usize,
}

/// Which modal to render, with everything it needs snapshot from state.
#[derive(Debug, Clone)]
pub enum ModalViewModel {
    None,
    Handover {
        form: HandoverForm,
        bulk_count: Option<usize>,
    },
    Schedule {
        form: ScheduleForm,
        for_reschedule: bool,
        bulk_count: Option<usize>,
    },
    ConfirmDone {
        form: MeetDoneForm,
        can_confirm: bool,
    },
    ConfirmDropOff,
    BulkConfirm {
        count: usize,
        target: String,
    },
    Reason {
        form: ReasonForm,
        can_confirm: bool,
        bulk_count: Option<usize>,
    },
    Submitting,
}

/// Computed view model for rendering the entire table
#[derive(Debug, Clone)]
pub struct TableViewModel {
    pub metrics: MetricsViewModel,
    pub rows: Vec<RowViewModel>,
    pub visible_count: usize,
    pub select_all: SelectAllState,
    pub selection_count: usize,
    pub bulk_enabled: bool,
    pub bulk_summary: Option<SelectionSummary>,
    pub search_query: String,
    pub search_focused: bool,
    pub sort: Option<SortSpec>,
    pub loading: LoadPhase,
    pub contracted_only: bool,
    pub menu: Option<MenuViewModel>,
    pub modal: ModalViewModel,
    pub toast: Option<Toast>,
    pub has_more: bool,
}

/// Pure function: compute view model from state
pub fn compute_table_view_model(state: &TableState, list_height: usize) -> TableViewModel {
    let visible = visible_accounts(state);
    let visible_count = visible.len();

    let rows: Vec<RowViewModel> = visible
        .iter()
        .enumerate()
        .skip(state.scroll_offset)
        .take(list_height)
        .map(|(i, account)| RowViewModel {
            account: (*account).clone(),
            is_selected: state.selected_ids.contains(&account.id),
            is_cursor: i == state.selected_index,
            arr_display: format_compact_usd(account.arr),
            contracted_date_display: format_date(account.contracted_date),
        })
        .collect();

    let selected_visible = visible
        .iter()
        .filter(|a| state.selected_ids.contains(&a.id))
        .count();
    let select_all = if visible_count == 0 || selected_visible == 0 {
        SelectAllState::None
    } else if selected_visible == visible_count {
        SelectAllState::All
    } else {
        SelectAllState::Some
    };

    let total_arr: f64 = visible.iter().map(|a| a.arr).sum();

    // Bulk availability is re-derived from current data on every render; a
    // refresh that broke homogeneity disables the controls immediately
    let bulk_summary = summarize_selection(&state.accounts, &state.selected_ids);
    let bulk_enabled = bulk_summary.is_some() && !state.bulk.is_submitting();

    let menu = state
        .menu
        .as_ref()
        .map(|m| MenuViewModel {
            title: format!("Sub Stage · {}", m.current),
            options: m
                .options
                .iter()
                .map(|o| (o.to_string(), *o == m.current))
                .collect(),
            cursor: m.cursor,
        })
        .or_else(|| {
            state.bulk_menu.as_ref().map(|m| MenuViewModel {
                title: format!(
                    "Bulk · {} account(s) at {}",
                    m.summary.count(),
                    m.summary.sub_stage
                ),
                options: m
                    .options
                    .iter()
                    .map(|o| (o.to_string(), *o == m.summary.sub_stage))
                    .collect(),
                cursor: m.cursor,
            })
        });

    let modal = compute_modal(state);

    TableViewModel {
        metrics: MetricsViewModel {
            enterprise_count: visible_count,
            total_arr: format_compact_usd(total_arr),
            total_available: state.total,
        },
        rows,
        visible_count,
        select_all,
        selection_count: state.selected_ids.len(),
        bulk_enabled,
        bulk_summary,
        search_query: state.search_input.clone(),
        search_focused: state.search_focused,
        sort: state.sort,
        loading: state.loading,
        contracted_only: state.contracted_only,
        menu,
        modal,
        toast: state.toast.clone(),
        has_more: state.has_more,
    }
}

fn compute_modal(state: &TableState) -> ModalViewModel {
    match &state.workflow {
        WorkflowState::Handover { form, .. } => {
            return ModalViewModel::Handover {
                form: form.clone(),
                bulk_count: None,
            };
        }
        WorkflowState::Schedule { target, form, .. } => {
            return ModalViewModel::Schedule {
                form: form.clone(),
                for_reschedule: *target == SubStage::MeetReschedule,
                bulk_count: None,
            };
        }
        WorkflowState::ConfirmDone { form } => {
            return ModalViewModel::ConfirmDone {
                form: form.clone(),
                can_confirm: form.can_confirm(),
            };
        }
        WorkflowState::ConfirmDropOff => return ModalViewModel::ConfirmDropOff,
        WorkflowState::CancelReason { form } => {
            return ModalViewModel::Reason {
                form: form.clone(),
                can_confirm: form.can_confirm(),
                bulk_count: None,
            };
        }
        WorkflowState::Submitting { .. } => return ModalViewModel::Submitting,
        WorkflowState::Idle => {}
    }

    match &state.bulk {
        BulkState::Confirm { target, summary } => ModalViewModel::BulkConfirm {
            count: summary.count(),
            target: target.to_string(),
        },
        BulkState::Handover { summary, form, .. } => ModalViewModel::Handover {
            form: form.clone(),
            bulk_count: Some(summary.count()),
        },
        BulkState::Schedule {
            target,
            summary,
            form,
            ..
        } => ModalViewModel::Schedule {
            form: form.clone(),
            for_reschedule: *target == SubStage::MeetReschedule,
            bulk_count: Some(summary.count()),
        },
        BulkState::Reason { summary, form, .. } => ModalViewModel::Reason {
            form: form.clone(),
            can_confirm: form.can_confirm(),
            bulk_count: Some(summary.count()),
        },
        BulkState::Submitting { .. } => ModalViewModel::Submitting,
        BulkState::Idle => ModalViewModel::None,
    }
}
