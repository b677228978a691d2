//! Async handler factories for the table.
//!
//! The reducer queues `Command`s; these handlers execute them. Fetches are
//! wrapped in the configured timeout and tagged with the generation they
//! were issued under, so a response that arrives after the query changed
//! is discarded by the reducer instead of overwriting newer results.

use std::sync::Arc;
use std::time::Duration;

use iocraft::hooks::UseAsyncHandler;
use iocraft::prelude::{Handler, Hooks, State};

use crate::error::RooftopError;
use crate::notify::ToastHub;
use crate::remote::{AccountQuery, AccountService, PocKind};
use crate::types::SubStage;
use crate::workflow::bulk::BulkCommand;
use crate::workflow::ops;
use crate::workflow::single::WorkflowCommand;

use super::model::{Command, TableAction, TableState, reduce_table_state};

/// Debounce delay for search input in milliseconds
const SEARCH_DEBOUNCE_MS: u64 = 500;

/// Completion dispatches never need navigation geometry.
const COMPLETION_LIST_HEIGHT: usize = 20;

/// Reduce an action into the shared state and return the commands it
/// queued.
pub fn apply_action(
    table: &mut State<TableState>,
    action: TableAction,
    list_height: usize,
) -> Vec<Command> {
    let current = table.read().clone();
    let mut next = reduce_table_state(current, action, list_height);
    let commands = next.take_commands();
    table.set(next);
    commands
}

/// The async side of the table, one handler per command kind.
#[derive(Clone)]
pub struct TableHandlers {
    fetch: Handler<(u64, AccountQuery, bool)>,
    debounce: Handler<u64>,
    single: Handler<(String, WorkflowCommand)>,
    bulk: Handler<(SubStage, BulkCommand)>,
    managers: Handler<()>,
}

impl TableHandlers {
    /// Execute the commands drained from a dispatch.
    pub fn run(&self, commands: Vec<Command>) {
        for command in commands {
            match command {
                Command::FetchPage { generation, query, append } => {
                    self.fetch.clone()((generation, query, append));
                }
                Command::DebounceSearch { generation } => {
                    self.debounce.clone()(generation);
                }
                Command::RunWorkflow {
                    account_id,
                    command,
                } => {
                    self.single.clone()((account_id, command));
                }
                Command::RunBulk { target, command } => {
                    self.bulk.clone()((target, command));
                }
                Command::LoadObManagers => {
                    self.managers.clone()(());
                }
            }
        }
    }
}

/// Build the handler set. Called once from the dashboard component.
pub fn create_table_handlers(
    hooks: &mut Hooks,
    table: &State<TableState>,
    service: Arc<dyn AccountService>,
    hub: &'static ToastHub,
    timeout: Duration,
) -> TableHandlers {
    let fetch = create_fetch_handler(hooks, table, Arc::clone(&service), timeout);
    let debounce = create_debounce_handler(hooks, table, &fetch);
    let single = create_single_handler(hooks, table, Arc::clone(&service), hub);
    let bulk = create_bulk_handler(hooks, table, Arc::clone(&service), hub);
    let managers = create_managers_handler(hooks, table, service, hub);

    TableHandlers {
        fetch,
        debounce,
        single,
        bulk,
        managers,
    }
}

fn create_fetch_handler(
    hooks: &mut Hooks,
    table: &State<TableState>,
    service: Arc<dyn AccountService>,
    timeout: Duration,
) -> Handler<(u64, AccountQuery, bool)> {
    let table = *table;

    hooks.use_async_handler(move |(generation, query, append): (u64, AccountQuery, bool)| {
        let mut table = table;
        let service = Arc::clone(&service);

        async move {
            let result = tokio::time::timeout(timeout, service.list_accounts(&query)).await;
            let action = match result {
                Ok(Ok(page)) => TableAction::PageLoaded { generation, page, append },
                Ok(Err(e)) => TableAction::FetchFailed {
                    generation,
                    message: e.to_string(),
                },
                Err(_) => TableAction::FetchFailed {
                    generation,
                    message: RooftopError::Timeout(timeout.as_secs()).to_string(),
                },
            };
            apply_action(&mut table, action, COMPLETION_LIST_HEIGHT);
        }
    })
}

fn create_debounce_handler(
    hooks: &mut Hooks,
    table: &State<TableState>,
    fetch: &Handler<(u64, AccountQuery, bool)>,
) -> Handler<u64> {
    let table = *table;
    let fetch = fetch.clone();

    hooks.use_async_handler(move |generation: u64| {
        let mut table = table;
        let fetch = fetch.clone();

        async move {
            // Wait for typing to settle before hitting the API
            tokio::time::sleep(tokio::time::Duration::from_millis(SEARCH_DEBOUNCE_MS)).await;

            let commands = apply_action(
                &mut table,
                TableAction::SearchSettled { generation },
                COMPLETION_LIST_HEIGHT,
            );
            for command in commands {
                if let Command::FetchPage { generation, query, append } = command {
                    fetch.clone()((generation, query, append));
                }
            }
        }
    })
}

fn create_single_handler(
    hooks: &mut Hooks,
    table: &State<TableState>,
    service: Arc<dyn AccountService>,
    hub: &'static ToastHub,
) -> Handler<(String, WorkflowCommand)> {
    let table = *table;

    hooks.use_async_handler(move |(account_id, command): (String, WorkflowCommand)| {
        let mut table = table;
        let service = Arc::clone(&service);

        async move {
            let action =
                match ops::run_single(service.as_ref(), hub, &account_id, command).await {
                    Ok(patch) => TableAction::SingleCompleted { account_id, patch },
                    Err(_) => TableAction::SingleFailed,
                };
            apply_action(&mut table, action, COMPLETION_LIST_HEIGHT);
        }
    })
}

fn create_bulk_handler(
    hooks: &mut Hooks,
    table: &State<TableState>,
    service: Arc<dyn AccountService>,
    hub: &'static ToastHub,
) -> Handler<(SubStage, BulkCommand)> {
    let table = *table;

    hooks.use_async_handler(move |(target, command): (SubStage, BulkCommand)| {
        let mut table = table;
        let service = Arc::clone(&service);

        async move {
            let patch = command.patch().clone();
            let report = ops::run_bulk(service.as_ref(), hub, &target, command).await;
            apply_action(
                &mut table,
                TableAction::BulkCompleted { report, patch },
                COMPLETION_LIST_HEIGHT,
            );
        }
    })
}

fn create_managers_handler(
    hooks: &mut Hooks,
    table: &State<TableState>,
    service: Arc<dyn AccountService>,
    hub: &'static ToastHub,
) -> Handler<()> {
    let table = *table;

    hooks.use_async_handler(move |_: ()| {
        let mut table = table;
        let service = Arc::clone(&service);

        async move {
            let managers = ops::load_poc_names(service.as_ref(), hub, PocKind::Onboarding).await;
            apply_action(
                &mut table,
                TableAction::ObManagersLoaded(managers),
                COMPLETION_LIST_HEIGHT,
            );
        }
    })
}
