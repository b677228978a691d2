//! Client-side filtering and sorting for the account table.
//!
//! The server already applied the query filters; the only client-side
//! filter is the contracted toggle, layered on top of the fetched page.
//! Sorting compares rendered values as case-insensitive strings.

use unicase::UniCase;

use crate::types::{Account, Stage};

use super::model::TableState;

/// Sortable columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Enterprise,
    GdName,
    Stage,
    SubStage,
    AccountType,
    Region,
    ContractedDate,
    Arr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> SortDirection {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

fn sort_value(account: &Account, key: SortKey) -> String {
    match key {
        SortKey::Name => account.name.clone(),
        SortKey::Enterprise => account.enterprise_name.clone(),
        SortKey::GdName => account.gd_name.clone(),
        SortKey::Stage => account.stage.to_string(),
        SortKey::SubStage => account.sub_stage.to_string(),
        SortKey::AccountType => account.account_type.clone(),
        SortKey::Region => account.region.clone(),
        // ISO rendering keeps the string order chronological
        SortKey::ContractedDate => account
            .contracted_date
            .map(|d| d.to_string())
            .unwrap_or_default(),
        SortKey::Arr => account.arr.to_string(),
    }
}

/// The rows the table actually shows: contracted filter plus sort.
pub fn visible_accounts(state: &TableState) -> Vec<&Account> {
    let mut rows: Vec<&Account> = state
        .accounts
        .iter()
        .filter(|a| !state.contracted_only || a.stage == Stage::Contracted)
        .collect();

    if let Some(spec) = state.sort {
        rows.sort_by(|a, b| {
            let left = sort_value(a, spec.key);
            let right = sort_value(b, spec.key);
            let ordering = UniCase::new(left).cmp(&UniCase::new(right));
            match spec.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }

    rows
}
