//! Core domain types for the rooftop pipeline.
//!
//! An `Account` is one contracted rooftop (dealership) enterprise. Its
//! position in the sales-onboarding pipeline is tracked by a coarse `Stage`
//! and, while the stage is Contracted or Onboarding, a fine-grained
//! `SubStage` that follows the onboarding-call workflow.

use std::fmt;
use std::str::FromStr;

use crate::error::RooftopError;

/// Coarse pipeline position of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    ContractInitiated,
    Contracted,
    Onboarding,
    Live,
    Churned,
    DropOff,
}

impl Stage {
    /// Sub-stages only progress while an account sits in these stages;
    /// everywhere else the sub-stage is pinned to Inactive.
    pub fn supports_sub_stage(&self) -> bool {
        matches!(self, Stage::Contracted | Stage::Onboarding)
    }

    /// Parse a wire value, tolerating the hyphenated and lowercase `Drop Off`
    /// spellings the API is known to emit. Unknown values fall back to
    /// ContractInitiated, matching how the original console displayed them.
    pub fn from_wire(s: &str) -> Stage {
        s.parse().unwrap_or(Stage::ContractInitiated)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::ContractInitiated => write!(f, "Contract Initiated"),
            Stage::Contracted => write!(f, "Contracted"),
            Stage::Onboarding => write!(f, "Onboarding"),
            Stage::Live => write!(f, "Live"),
            Stage::Churned => write!(f, "Churned"),
            Stage::DropOff => write!(f, "Drop Off"),
        }
    }
}

impl FromStr for Stage {
    type Err = RooftopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Contract Initiated" => Ok(Stage::ContractInitiated),
            "Contracted" => Ok(Stage::Contracted),
            "Onboarding" => Ok(Stage::Onboarding),
            "Live" => Ok(Stage::Live),
            "Churned" => Ok(Stage::Churned),
            "Drop Off" | "Drop-Off" | "Drop off" | "Drop-off" => Ok(Stage::DropOff),
            other => Err(RooftopError::InvalidStage(other.to_string())),
        }
    }
}

/// Fine-grained workflow position within a stage.
///
/// `Other` carries unrecognized wire values verbatim so the table can still
/// display them; the transition engine treats them as a reset point.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SubStage {
    MeetPending,
    MeetScheduled,
    MeetReschedule,
    MeetDone,
    MeetCancelled,
    DropOff,
    Inactive,
    Other(String),
}

impl Default for SubStage {
    fn default() -> Self {
        SubStage::Inactive
    }
}

impl SubStage {
    pub fn from_wire(s: &str) -> SubStage {
        match s.trim() {
            "Meet Pending" => SubStage::MeetPending,
            "Meet Scheduled" => SubStage::MeetScheduled,
            "Meet Reschedule" => SubStage::MeetReschedule,
            "Meet Done" => SubStage::MeetDone,
            "Meet Cancelled" => SubStage::MeetCancelled,
            "Drop Off" | "Drop-Off" | "Drop off" | "Drop-off" => SubStage::DropOff,
            "Inactive" => SubStage::Inactive,
            other => SubStage::Other(other.to_string()),
        }
    }
}

impl fmt::Display for SubStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubStage::MeetPending => write!(f, "Meet Pending"),
            SubStage::MeetScheduled => write!(f, "Meet Scheduled"),
            SubStage::MeetReschedule => write!(f, "Meet Reschedule"),
            SubStage::MeetDone => write!(f, "Meet Done"),
            SubStage::MeetCancelled => write!(f, "Meet Cancelled"),
            SubStage::DropOff => write!(f, "Drop Off"),
            SubStage::Inactive => write!(f, "Inactive"),
            SubStage::Other(s) => write!(f, "{}", s),
        }
    }
}

/// One contracted rooftop enterprise as rendered by the table.
///
/// Only `stage` and `sub_stage` participate in transition logic; everything
/// else is display data carried through from the account service.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Account {
    /// Team id, the unit of mutation for the account service
    pub id: String,
    pub enterprise_id: String,
    pub enterprise_name: String,
    /// Group-dealer (org) name
    pub gd_name: String,
    /// Rooftop name
    pub name: String,
    pub stage: Stage,
    pub sub_stage: SubStage,
    pub onboarding_manager: Option<String>,

    // Display attributes
    pub account_type: String,
    pub account_sub_type: String,
    pub region: String,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub products: Vec<String>,
    pub plan: Option<String>,
    pub platform: String,
    pub arr: f64,
    pub vins_contracted: u64,
    pub one_time_fees: f64,
    pub add_ons: Vec<String>,
    pub contracted_date: Option<jiff::civil::Date>,
    /// Contract duration in months
    pub contract_duration: u32,
    pub payment_frequency: String,
    pub lock_in_period: String,
    pub first_payment_date: Option<jiff::civil::Date>,
    pub first_payment_amount: f64,
    pub tax_id: String,
    pub ae_poc: String,
    pub finance_poc: String,
    pub terms_edited: bool,
    pub contract_source: String,
    pub contract_link: Option<String>,
}

/// Compact dollar rendering for table cells: $1.2M / $450K / $97.
/// Non-finite and negative inputs render as a dash, like missing data.
pub fn format_compact_usd(amount: f64) -> String {
    if !amount.is_finite() || amount < 0.0 {
        return "-".to_string();
    }
    if amount >= 1_000_000.0 {
        format!("${:.1}M", amount / 1_000_000.0)
    } else if amount >= 1_000.0 {
        format!("${:.0}K", amount / 1_000.0)
    } else {
        format!("${}", amount.round() as i64)
    }
}

const MONTH_ABBREV: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Table-cell date rendering, `Jan 5, 2024`. Missing dates render as a dash.
pub fn format_date(date: Option<jiff::civil::Date>) -> String {
    match date {
        Some(d) => format!(
            "{} {}, {}",
            MONTH_ABBREV[d.month() as usize - 1],
            d.day(),
            d.year()
        ),
        None => "-".to_string(),
    }
}

/// Parse an ISO-8601-ish date from the wire, tolerating a trailing time
/// component. Unparseable input becomes None rather than an error; the
/// table renders it as missing.
pub fn parse_wire_date(s: &str) -> Option<jiff::civil::Date> {
    if s.is_empty() {
        return None;
    }
    let date_part = s.split('T').next().unwrap_or(s);
    date_part.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_roundtrip() {
        for stage in [
            Stage::ContractInitiated,
            Stage::Contracted,
            Stage::Onboarding,
            Stage::Live,
            Stage::Churned,
            Stage::DropOff,
        ] {
            let parsed: Stage = stage.to_string().parse().unwrap();
            assert_eq!(parsed, stage);
        }
    }

    #[test]
    fn test_stage_drop_off_aliases() {
        assert_eq!("Drop-Off".parse::<Stage>().unwrap(), Stage::DropOff);
        assert_eq!("Drop off".parse::<Stage>().unwrap(), Stage::DropOff);
        assert_eq!("Drop-off".parse::<Stage>().unwrap(), Stage::DropOff);
    }

    #[test]
    fn test_stage_from_wire_fallback() {
        assert_eq!(
            Stage::from_wire("Contract User Pending Signature"),
            Stage::ContractInitiated
        );
    }

    #[test]
    fn test_sub_stage_from_wire() {
        assert_eq!(SubStage::from_wire("Meet Pending"), SubStage::MeetPending);
        assert_eq!(SubStage::from_wire("Drop-Off"), SubStage::DropOff);
        assert_eq!(
            SubStage::from_wire("SH Call Pending"),
            SubStage::Other("SH Call Pending".to_string())
        );
    }

    #[test]
    fn test_sub_stage_other_displays_verbatim() {
        let s = SubStage::Other("SH Call Done".to_string());
        assert_eq!(s.to_string(), "SH Call Done");
    }

    #[test]
    fn test_format_compact_usd() {
        assert_eq!(format_compact_usd(2_400_000.0), "$2.4M");
        assert_eq!(format_compact_usd(450_000.0), "$450K");
        assert_eq!(format_compact_usd(97.0), "$97");
        assert_eq!(format_compact_usd(f64::NAN), "-");
        assert_eq!(format_compact_usd(-5.0), "-");
    }

    #[test]
    fn test_parse_wire_date() {
        assert_eq!(
            parse_wire_date("2024-01-05"),
            Some(jiff::civil::date(2024, 1, 5))
        );
        assert_eq!(
            parse_wire_date("2024-01-05T10:30:00Z"),
            Some(jiff::civil::date(2024, 1, 5))
        );
        assert_eq!(parse_wire_date(""), None);
        assert_eq!(parse_wire_date("not a date"), None);
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(Some(jiff::civil::date(2024, 1, 5))), "Jan 5, 2024");
        assert_eq!(format_date(None), "-");
    }
}
