//! HTTP implementation of the account service client.
//!
//! # Security Note - Logging
//!
//! The bearer token is protected from request logging by the
//! `RedactedHeader` wrapper type, which implements `Display` and `Debug` to
//! redact sensitive values. Even with `RUST_LOG=reqwest=debug` enabled the
//! Authorization header renders as `[REDACTED]`.

use std::fmt;

use reqwest::Client;
use reqwest::header;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Result, RooftopError};
use crate::types::{Account, Stage, SubStage, parse_wire_date};

use super::error::ApiError;
use super::{
    AccountPage, AccountQuery, AccountService, CallSchedule, HandoverDetails, ObNotRequired,
    PocKind, PocName, SchedulePayload, SubStageUpdate,
};

/// Wrapper for sensitive header values that redacts the value when
/// formatted.
struct RedactedHeader {
    value: String,
}

impl RedactedHeader {
    fn bearer(token: &SecretString) -> Self {
        Self {
            value: format!("Bearer {}", token.expose_secret()),
        }
    }

    fn as_header_value(&self) -> Result<header::HeaderValue> {
        header::HeaderValue::from_str(&self.value)
            .map_err(|_| RooftopError::Auth("token contains invalid header characters".to_string()))
    }
}

impl fmt::Display for RedactedHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Debug for RedactedHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedactedHeader")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Account service client speaking JSON over HTTPS.
pub struct HttpAccountService {
    client: Client,
    base_url: String,
    timeout_secs: u64,
}

impl HttpAccountService {
    pub fn from_config(config: &Config) -> Result<Self> {
        let token = config.token().ok_or_else(|| {
            RooftopError::Auth(format!(
                "API token not configured. Set {} or run: rooftops config set api_token <token>",
                crate::config::API_TOKEN_ENV
            ))
        })?;

        let mut headers = header::HeaderMap::new();
        let auth = RedactedHeader::bearer(&token);
        let mut auth_value = auth.as_header_value()?;
        auth_value.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth_value);

        let client = Client::builder()
            .timeout(config.request_timeout())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            timeout_secs: config.request_timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post_json<B, T>(&self, endpoint: &'static str, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: for<'de> Deserialize<'de>,
    {
        debug!(endpoint, "account service request");
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.parse_response(endpoint, response).await
    }

    async fn get_json<T>(&self, endpoint: &'static str, path: &str) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        debug!(endpoint, "account service request");
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.parse_response(endpoint, response).await
    }

    fn transport_error(&self, e: reqwest::Error) -> RooftopError {
        if e.is_timeout() {
            RooftopError::Timeout(self.timeout_secs)
        } else {
            RooftopError::Http(e)
        }
    }

    async fn parse_response<T>(
        &self,
        endpoint: &'static str,
        response: reqwest::Response,
    ) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            let text = response.text().await.unwrap_or_default();
            warn!(endpoint, %status, "account service error response");
            let mut api_error = ApiError::with_status(text, endpoint, status);
            if let Some(seconds) = retry_after {
                api_error = api_error.with_retry_after(seconds);
            }
            return Err(api_error.into());
        }
        Ok(response.json::<T>().await?)
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct ListRequest<'a> {
    page: u32,
    per_page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    filters: Option<WireFilters<'a>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    contracted_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<&'a str>,
}

#[derive(Serialize)]
struct WireFilters<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    region_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    account_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    account_sub_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ae_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub_stage: Option<&'a str>,
}

#[derive(Deserialize)]
struct ListResponse {
    data: ListData,
}

#[derive(Deserialize)]
struct ListData {
    #[serde(rename = "totalCount", default)]
    total_count: usize,
    #[serde(default)]
    teams: Vec<WireTeam>,
}

/// Fields that arrive as either a number or a string, depending on the
/// record's age.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumOrString {
    Num(f64),
    Str(String),
}

impl NumOrString {
    fn into_string(self) -> String {
        match self {
            NumOrString::Num(n) => {
                if n.fract() == 0.0 {
                    format!("{}", n as i64)
                } else {
                    format!("{}", n)
                }
            }
            NumOrString::Str(s) => s,
        }
    }
}

impl Default for NumOrString {
    fn default() -> Self {
        NumOrString::Str(String::new())
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct WireTeam {
    team_id: String,
    team_name: String,
    enterprise_id: String,
    enterprise_name: String,
    org_name: String,
    ae_name: String,
    stage: String,
    sub_stage: String,
    account_type: String,
    account_sub_type: String,
    platform: String,
    region_type: String,
    country: String,
    state: String,
    city: String,
    arr: f64,
    products: Vec<String>,
    contracted_date: String,
    contract_duration: u32,
    vins_contracted: u64,
    one_time_fees: f64,
    add_ons: Vec<String>,
    payment_frequency: NumOrString,
    lock_in_period: String,
    first_payment_date: String,
    first_payment_amount: f64,
    tax_id: String,
    finance_poc: String,
    is_terms_edited: String,
    contract_source: String,
    contract_link: String,
    plan: String,
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}

impl WireTeam {
    fn into_account(self) -> Account {
        // Plan comes straight from the API when set; older records infer a
        // Studio AI plan from their product list.
        let plan = non_empty(self.plan).or_else(|| {
            if self.products.is_empty() {
                None
            } else {
                Some("Studio AI".to_string())
            }
        });

        Account {
            id: self.team_id,
            enterprise_id: self.enterprise_id,
            enterprise_name: self.enterprise_name,
            gd_name: self.org_name,
            name: self.team_name,
            stage: Stage::from_wire(&self.stage),
            sub_stage: SubStage::from_wire(&self.sub_stage),
            onboarding_manager: None,
            account_type: self.account_type,
            account_sub_type: self.account_sub_type,
            region: self.region_type,
            country: non_empty(self.country),
            state: non_empty(self.state),
            city: non_empty(self.city),
            products: self.products,
            plan,
            platform: self.platform,
            arr: self.arr,
            vins_contracted: self.vins_contracted,
            one_time_fees: self.one_time_fees,
            add_ons: self.add_ons,
            contracted_date: parse_wire_date(&self.contracted_date),
            contract_duration: self.contract_duration,
            payment_frequency: self.payment_frequency.into_string(),
            lock_in_period: self.lock_in_period,
            first_payment_date: parse_wire_date(&self.first_payment_date),
            first_payment_amount: self.first_payment_amount,
            tax_id: self.tax_id,
            ae_poc: self.ae_name,
            finance_poc: self.finance_poc,
            terms_edited: self.is_terms_edited == "Yes",
            contract_source: self.contract_source,
            contract_link: non_empty(self.contract_link),
        }
    }
}

#[derive(Serialize)]
struct SubStageRequest<'a> {
    team_id: &'a str,
    sub_stage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    onboarding_manager: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
}

#[derive(Serialize)]
struct WireDelivery<'a> {
    platforms: &'a [String],
    dms: &'a str,
    website_provider: &'a str,
}

#[derive(Serialize)]
struct HandoverRequest<'a> {
    team_id: &'a str,
    input_delivery: WireDelivery<'a>,
    output_delivery: WireDelivery<'a>,
    client_languages: &'a [String],
    notes: &'a str,
}

#[derive(Serialize)]
struct ScheduleRequest<'a> {
    team_id: &'a str,
    ob_call_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timezone: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_time: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_time: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_minutes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    participants: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reschedule_reason: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    onboarding_manager: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    communication_modes: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
}

impl<'a> ScheduleRequest<'a> {
    fn for_call(team_id: &'a str, call: &'a CallSchedule) -> Self {
        ScheduleRequest {
            team_id,
            ob_call_required: true,
            date: Some(&call.date),
            timezone: Some(&call.timezone),
            start_time: Some(&call.start_time),
            end_time: Some(&call.end_time),
            duration_minutes: Some(call.duration_minutes),
            participants: Some(&call.participants),
            reschedule_reason: call.reschedule_reason.as_deref(),
            onboarding_manager: None,
            communication_modes: None,
            email: None,
            reason: None,
        }
    }

    fn for_not_required(team_id: &'a str, waived: &'a ObNotRequired) -> Self {
        ScheduleRequest {
            team_id,
            ob_call_required: false,
            date: None,
            timezone: None,
            start_time: None,
            end_time: None,
            duration_minutes: None,
            participants: None,
            reschedule_reason: None,
            onboarding_manager: Some(&waived.onboarding_manager),
            communication_modes: Some(&waived.communication_modes),
            email: Some(&waived.email),
            reason: Some(&waived.reason),
        }
    }
}

#[derive(Deserialize)]
struct PocResponse {
    #[serde(default)]
    data: Vec<WirePoc>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct WirePoc {
    id: String,
    name: String,
}

#[derive(Deserialize)]
struct AckResponse {
    #[serde(default)]
    #[allow(dead_code)]
    success: bool,
}

#[async_trait::async_trait]
impl AccountService for HttpAccountService {
    async fn list_accounts(&self, query: &AccountQuery) -> Result<AccountPage> {
        let filters = if query.filters.is_empty() {
            None
        } else {
            Some(WireFilters {
                region_type: query.filters.region.as_deref(),
                account_type: query.filters.account_type.as_deref(),
                account_sub_type: query.filters.account_sub_type.as_deref(),
                ae_id: query.filters.ae_id.as_deref(),
                sub_stage: query.filters.sub_stage.as_deref(),
            })
        };
        let request = ListRequest {
            page: query.page,
            per_page: query.per_page,
            filters,
            contracted_only: query.contracted_only,
            search: query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()),
        };

        let response: ListResponse = self
            .post_json(
                "get-contracted-teams",
                "enterprise/team/get-contracted-teams",
                &request,
            )
            .await?;

        let fetched = response.data.teams.len();
        let accounts: Vec<Account> = response
            .data
            .teams
            .into_iter()
            .map(WireTeam::into_account)
            .collect();

        Ok(AccountPage {
            accounts,
            // A short page means the server ran out of rows.
            has_more: fetched == query.per_page as usize,
            total: if response.data.total_count > 0 {
                response.data.total_count
            } else {
                fetched
            },
        })
    }

    async fn update_sub_stage(&self, account_id: &str, update: &SubStageUpdate) -> Result<()> {
        let request = SubStageRequest {
            team_id: account_id,
            sub_stage: update.sub_stage.to_string(),
            stage: update.stage.map(|s| s.to_string()),
            onboarding_manager: update.onboarding_manager.as_deref(),
            reason: update.reason.as_deref(),
        };
        let _: AckResponse = self
            .post_json(
                "update-sub-stage",
                "enterprise/team/update-sub-stage",
                &request,
            )
            .await?;
        Ok(())
    }

    async fn submit_handover(&self, account_id: &str, handover: &HandoverDetails) -> Result<()> {
        let request = HandoverRequest {
            team_id: account_id,
            input_delivery: WireDelivery {
                platforms: &handover.input_platforms,
                dms: &handover.input_dms,
                website_provider: &handover.input_website_provider,
            },
            output_delivery: WireDelivery {
                platforms: &handover.output_platforms,
                dms: &handover.output_dms,
                website_provider: &handover.output_website_provider,
            },
            client_languages: &handover.client_languages,
            notes: &handover.notes,
        };
        let _: AckResponse = self
            .post_json(
                "handover-details",
                "enterprise/team/handover-details",
                &request,
            )
            .await?;
        Ok(())
    }

    async fn schedule_call(&self, account_id: &str, schedule: &SchedulePayload) -> Result<()> {
        let request = match schedule {
            SchedulePayload::Call(call) => ScheduleRequest::for_call(account_id, call),
            SchedulePayload::NotRequired(waived) => {
                ScheduleRequest::for_not_required(account_id, waived)
            }
        };
        let _: AckResponse = self
            .post_json(
                "schedule-onboarding-call",
                "enterprise/team/schedule-onboarding-call",
                &request,
            )
            .await?;
        Ok(())
    }

    async fn list_poc_names(&self, kind: PocKind) -> Result<Vec<PocName>> {
        let response: PocResponse = self
            .get_json(
                "poc-names",
                &format!("enterprise/poc-names?kind={}", kind.as_wire()),
            )
            .await?;
        Ok(response
            .data
            .into_iter()
            .map(|p| PocName {
                id: p.id,
                name: p.name,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_team_maps_to_account() {
        let wire = WireTeam {
            team_id: "11024210".to_string(),
            team_name: "Sunrise Motors".to_string(),
            enterprise_id: "ent-9".to_string(),
            enterprise_name: "Sunrise Group".to_string(),
            org_name: "Sunrise Holdings".to_string(),
            ae_name: "Dana Whitfield".to_string(),
            stage: "Contracted".to_string(),
            sub_stage: "Drop-Off".to_string(),
            account_type: "Group Dealer".to_string(),
            account_sub_type: "Franchise".to_string(),
            platform: "App to API".to_string(),
            region_type: "AMER".to_string(),
            arr: 120_000.0,
            is_terms_edited: "Yes".to_string(),
            payment_frequency: NumOrString::Num(4.0),
            contracted_date: "2024-03-01T00:00:00Z".to_string(),
            products: vec!["Studio AI".to_string()],
            ..Default::default()
        };

        let account = wire.into_account();
        assert_eq!(account.id, "11024210");
        assert_eq!(account.stage, Stage::Contracted);
        assert_eq!(account.sub_stage, SubStage::DropOff);
        assert!(account.terms_edited);
        assert_eq!(account.payment_frequency, "4");
        assert_eq!(
            account.contracted_date,
            Some(jiff::civil::date(2024, 3, 1))
        );
        assert_eq!(account.plan.as_deref(), Some("Studio AI"));
        assert_eq!(account.country, None);
    }

    #[test]
    fn test_list_request_skips_empty_fields() {
        let request = ListRequest {
            page: 1,
            per_page: 50,
            filters: None,
            contracted_only: false,
            search: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"page":1,"per_page":50}"#);
    }

    #[test]
    fn test_schedule_request_for_not_required() {
        let waived = ObNotRequired {
            onboarding_manager: "Prakash Kumar".to_string(),
            communication_modes: vec!["Email".to_string()],
            email: "ops@sunrise.example".to_string(),
            reason: "client declined a call".to_string(),
        };
        let request = ScheduleRequest::for_not_required("t-1", &waived);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["ob_call_required"], false);
        assert_eq!(json["onboarding_manager"], "Prakash Kumar");
        assert!(json.get("date").is_none());
    }
}
