//! Async execution of workflow commands.
//!
//! The state machines are pure; this layer owns the remote calls. Each
//! completed flow publishes exactly one toast through the hub, and the
//! optimistic patch is only handed back to the caller after the remote
//! call has succeeded.

use futures::stream::{self, StreamExt};
use tracing::warn;

use crate::error::Result;
use crate::notify::{Toast, ToastHub};
use crate::patch::AccountPatch;
use crate::remote::{AccountService, PocKind, PocName};
use crate::types::SubStage;

use super::bulk::{BulkCommand, BulkReport};
use super::single::WorkflowCommand;

/// Fan-out width for bulk mutations.
const BULK_CONCURRENCY: usize = 5;

/// Execute a single-item command. On success the caller receives the patch
/// to apply; on failure local state must stay untouched.
pub async fn run_single(
    service: &dyn AccountService,
    hub: &ToastHub,
    account_id: &str,
    command: WorkflowCommand,
) -> Result<AccountPatch> {
    let result = match &command {
        WorkflowCommand::UpdateSubStage { update, .. } => {
            service.update_sub_stage(account_id, update).await
        }
        WorkflowCommand::HandoverSchedule {
            handover, schedule, ..
        } => {
            service
                .update_handover_and_schedule(account_id, handover, schedule)
                .await
        }
    };

    match result {
        Ok(()) => {
            hub.publish(Toast::success("Details updated successfully"));
            Ok(command.patch().clone())
        }
        Err(e) => {
            warn!(account_id, error = %e, "sub-stage update failed");
            hub.publish(Toast::error(format!("Failed to update account: {}", e)));
            Err(e)
        }
    }
}

/// Execute a bulk fan-out. Calls are independent: a failure leaves its
/// account unpatched and does not abort siblings. One aggregate toast
/// reports the outcome.
pub async fn run_bulk(
    service: &dyn AccountService,
    hub: &ToastHub,
    target: &SubStage,
    command: BulkCommand,
) -> BulkReport {
    let results: Vec<(String, Result<()>)> = match &command {
        BulkCommand::FanOutUpdate { ids, update, .. } => {
            stream::iter(ids.clone())
                .map(|id| async move {
                    let result = service.update_sub_stage(&id, update).await;
                    (id, result)
                })
                .buffer_unordered(BULK_CONCURRENCY)
                .collect()
                .await
        }
        BulkCommand::FanOutHandoverSchedule {
            ids,
            handover,
            schedule,
            ..
        } => {
            stream::iter(ids.clone())
                .map(|id| async move {
                    let result = service
                        .update_handover_and_schedule(&id, handover, schedule)
                        .await;
                    (id, result)
                })
                .buffer_unordered(BULK_CONCURRENCY)
                .collect()
                .await
        }
    };

    let mut report = BulkReport::default();
    for (id, result) in results {
        match result {
            Ok(()) => report.succeeded.push(id),
            Err(e) => {
                warn!(account_id = %id, error = %e, "bulk update failed");
                report.failed.push((id, e.to_string()));
            }
        }
    }

    hub.publish(report.toast(target));
    report
}

/// Populate a POC picker, downgrading failures to an empty list with an
/// error toast; the pickers stay usable once a later fetch succeeds.
pub async fn load_poc_names(
    service: &dyn AccountService,
    hub: &ToastHub,
    kind: PocKind,
) -> Vec<PocName> {
    match service.list_poc_names(kind).await {
        Ok(names) => names,
        Err(e) => {
            warn!(error = %e, "failed to load POC names");
            hub.publish(Toast::error(format!("Failed to load POC list: {}", e)));
            Vec::new()
        }
    }
}
