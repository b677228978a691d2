//! Shared fixtures: an in-memory account service and account builders.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use rooftops::error::{Result, RooftopError};
use rooftops::remote::{
    AccountPage, AccountQuery, AccountService, HandoverDetails, PocKind, PocName,
    SchedulePayload, SubStageUpdate,
};
use rooftops::types::{Account, Stage, SubStage};
use rooftops::{Toast, ToastHub};

/// Everything the stub saw, for asserting call shapes and counts.
#[derive(Debug, Clone)]
pub enum CallRecord {
    List(AccountQuery),
    UpdateSubStage {
        id: String,
        update: SubStageUpdate,
    },
    Handover {
        id: String,
        details: HandoverDetails,
    },
    Schedule {
        id: String,
        payload: SchedulePayload,
    },
    ListPocs(PocKind),
}

/// In-memory account service. Mutations succeed unless the id is in
/// `fail_ids`; list calls pop pages in order.
#[derive(Default)]
pub struct StubService {
    pub pages: Mutex<Vec<AccountPage>>,
    pub calls: Mutex<Vec<CallRecord>>,
    pub fail_ids: Mutex<HashSet<String>>,
    pub pocs: Mutex<Vec<PocName>>,
}

impl StubService {
    pub fn new() -> Self {
        StubService::default()
    }

    pub fn with_pocs(names: &[&str]) -> Self {
        let service = StubService::default();
        *service.pocs.lock() = names
            .iter()
            .enumerate()
            .map(|(i, name)| PocName {
                id: format!("ob-{}", i + 1),
                name: name.to_string(),
            })
            .collect();
        service
    }

    pub fn fail_for(&self, id: &str) {
        self.fail_ids.lock().insert(id.to_string());
    }

    pub fn push_page(&self, page: AccountPage) {
        self.pages.lock().push(page);
    }

    pub fn calls(&self) -> Vec<CallRecord> {
        self.calls.lock().clone()
    }

    pub fn update_calls(&self) -> Vec<(String, SubStageUpdate)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                CallRecord::UpdateSubStage { id, update } => Some((id.clone(), update.clone())),
                _ => None,
            })
            .collect()
    }

    fn check_failure(&self, id: &str) -> Result<()> {
        if self.fail_ids.lock().contains(id) {
            return Err(RooftopError::Api(format!(
                "update-sub-stage (503 Service Unavailable): {}",
                id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl AccountService for StubService {
    async fn list_accounts(&self, query: &AccountQuery) -> Result<AccountPage> {
        self.calls.lock().push(CallRecord::List(query.clone()));
        let mut pages = self.pages.lock();
        if pages.is_empty() {
            Ok(AccountPage::default())
        } else {
            Ok(pages.remove(0))
        }
    }

    async fn update_sub_stage(&self, account_id: &str, update: &SubStageUpdate) -> Result<()> {
        self.check_failure(account_id)?;
        self.calls.lock().push(CallRecord::UpdateSubStage {
            id: account_id.to_string(),
            update: update.clone(),
        });
        Ok(())
    }

    async fn submit_handover(&self, account_id: &str, handover: &HandoverDetails) -> Result<()> {
        self.check_failure(account_id)?;
        self.calls.lock().push(CallRecord::Handover {
            id: account_id.to_string(),
            details: handover.clone(),
        });
        Ok(())
    }

    async fn schedule_call(&self, account_id: &str, schedule: &SchedulePayload) -> Result<()> {
        self.check_failure(account_id)?;
        self.calls.lock().push(CallRecord::Schedule {
            id: account_id.to_string(),
            payload: schedule.clone(),
        });
        Ok(())
    }

    async fn list_poc_names(&self, kind: PocKind) -> Result<Vec<PocName>> {
        self.calls.lock().push(CallRecord::ListPocs(kind));
        Ok(self.pocs.lock().clone())
    }
}

/// A hub with a counter attached, for asserting toast cardinality.
pub fn counting_hub() -> (ToastHub, Arc<AtomicUsize>, Arc<Mutex<Vec<Toast>>>) {
    let hub = ToastHub::new();
    let count = Arc::new(AtomicUsize::new(0));
    let seen: Arc<Mutex<Vec<Toast>>> = Arc::new(Mutex::new(Vec::new()));
    let count_clone = Arc::clone(&count);
    let seen_clone = Arc::clone(&seen);
    hub.subscribe(move |toast| {
        count_clone.fetch_add(1, Ordering::SeqCst);
        seen_clone.lock().push(toast.clone());
    });
    (hub, count, seen)
}

pub fn mock_account(id: &str, stage: Stage, sub_stage: SubStage) -> Account {
    Account {
        id: id.to_string(),
        enterprise_id: format!("ent-{}", id),
        enterprise_name: "Sunrise Group".to_string(),
        gd_name: "Sunrise Holdings".to_string(),
        name: format!("Rooftop {}", id),
        stage,
        sub_stage,
        account_type: "Group Dealer".to_string(),
        account_sub_type: "Franchise".to_string(),
        region: "AMER".to_string(),
        arr: 120_000.0,
        ae_poc: "Dana Whitfield".to_string(),
        ..Default::default()
    }
}

pub fn contracted_pending(id: &str) -> Account {
    mock_account(id, Stage::Contracted, SubStage::MeetPending)
}
