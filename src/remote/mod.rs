//! Account service contract.
//!
//! The dashboard is a pure consumer of a remote account service. This
//! module defines the query/payload types and the `AccountService` trait;
//! the HTTP implementation lives in [`http`]. Tests substitute an
//! in-memory service behind the same trait.

pub mod error;
pub mod http;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Account, Stage, SubStage};

pub use http::HttpAccountService;

/// Server-side filters for the account listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountFilters {
    pub region: Option<String>,
    pub account_type: Option<String>,
    pub account_sub_type: Option<String>,
    /// Assigned account-executive POC id
    pub ae_id: Option<String>,
    pub sub_stage: Option<String>,
}

impl AccountFilters {
    pub fn is_empty(&self) -> bool {
        self.region.is_none()
            && self.account_type.is_none()
            && self.account_sub_type.is_none()
            && self.ae_id.is_none()
            && self.sub_stage.is_none()
    }
}

/// One page worth of listing parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountQuery {
    pub page: u32,
    pub per_page: u32,
    pub filters: AccountFilters,
    pub contracted_only: bool,
    pub search: Option<String>,
}

impl AccountQuery {
    pub fn new(per_page: u32) -> Self {
        AccountQuery {
            page: 1,
            per_page,
            filters: AccountFilters::default(),
            contracted_only: false,
            search: None,
        }
    }

    pub fn for_page(&self, page: u32) -> Self {
        let mut query = self.clone();
        query.page = page;
        query
    }
}

/// A fetched page of accounts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountPage {
    pub accounts: Vec<Account>,
    pub has_more: bool,
    pub total: usize,
}

/// Which POC picker to populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PocKind {
    AccountExecutive,
    Onboarding,
}

impl PocKind {
    pub fn as_wire(&self) -> &'static str {
        match self {
            PocKind::AccountExecutive => "ae",
            PocKind::Onboarding => "ob",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PocName {
    pub id: String,
    pub name: String,
}

/// Sub-stage mutation payload. `stage` is set when the transition forces a
/// stage move (Meet Done, Drop Off); `reason` carries cancellation and
/// reschedule notes.
#[derive(Debug, Clone, PartialEq)]
pub struct SubStageUpdate {
    pub sub_stage: SubStage,
    pub stage: Option<Stage>,
    pub onboarding_manager: Option<String>,
    pub reason: Option<String>,
}

impl SubStageUpdate {
    pub fn new(sub_stage: SubStage) -> Self {
        SubStageUpdate {
            sub_stage,
            stage: None,
            onboarding_manager: None,
            reason: None,
        }
    }
}

/// Handover details collected once before scheduling a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoverDetails {
    pub input_platforms: Vec<String>,
    pub input_dms: String,
    pub input_website_provider: String,
    pub output_platforms: Vec<String>,
    pub output_dms: String,
    pub output_website_provider: String,
    pub client_languages: Vec<String>,
    pub notes: String,
}

/// A booked onboarding call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSchedule {
    /// ISO date, e.g. `2026-08-14`
    pub date: String,
    pub timezone: String,
    /// e.g. `8:00 PM`
    pub start_time: String,
    pub end_time: String,
    pub duration_minutes: i64,
    /// Participant email addresses
    pub participants: Vec<String>,
    pub reschedule_reason: Option<String>,
}

/// The reduced payload when the operator marks the onboarding call as not
/// required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObNotRequired {
    pub onboarding_manager: String,
    pub communication_modes: Vec<String>,
    pub email: String,
    pub reason: String,
}

/// Either half of the schedule step's outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulePayload {
    Call(CallSchedule),
    NotRequired(ObNotRequired),
}

/// Common interface to the remote account service.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Fetch one page of accounts.
    async fn list_accounts(&self, query: &AccountQuery) -> Result<AccountPage>;

    /// Move an account to a new sub-stage.
    async fn update_sub_stage(&self, account_id: &str, update: &SubStageUpdate) -> Result<()>;

    /// Submit handover details for an account.
    async fn submit_handover(&self, account_id: &str, handover: &HandoverDetails) -> Result<()>;

    /// Book (or waive) the onboarding call for an account.
    async fn schedule_call(&self, account_id: &str, schedule: &SchedulePayload) -> Result<()>;

    /// Populate a POC picker.
    async fn list_poc_names(&self, kind: PocKind) -> Result<Vec<PocName>>;

    /// The handover flow's single logical mutation: both requests issued
    /// together, failing on the first error.
    async fn update_handover_and_schedule(
        &self,
        account_id: &str,
        handover: &HandoverDetails,
        schedule: &SchedulePayload,
    ) -> Result<()> {
        self.submit_handover(account_id, handover).await?;
        self.schedule_call(account_id, schedule).await
    }
}
