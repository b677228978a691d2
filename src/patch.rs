//! Typed optimistic patches for accounts.
//!
//! The table never mutates an account ad hoc. A mutation flow produces an
//! `AccountPatch` up front, the patch travels with the remote call, and it
//! is applied to the in-memory account only after the call succeeds. Field
//! names resolve through an explicit table; unknown names are an error
//! instead of being silently dropped.

use std::str::FromStr;

use crate::error::{Result, RooftopError};
use crate::types::{Account, Stage, SubStage};

/// Fields of an account that mutation flows may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountField {
    SubStage,
    Stage,
    OnboardingManager,
}

/// Patchable field names as they appear in mutation payloads. `status` is
/// the legacy alias the original console used for the stage column.
const FIELD_TABLE: &[(&str, AccountField)] = &[
    ("sub_stage", AccountField::SubStage),
    ("stage", AccountField::Stage),
    ("status", AccountField::Stage),
    ("onboarding_manager", AccountField::OnboardingManager),
];

impl AccountField {
    pub fn from_name(name: &str) -> Result<AccountField> {
        FIELD_TABLE
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, f)| *f)
            .ok_or_else(|| RooftopError::UnknownPatchField(name.to_string()))
    }
}

/// A validated set of account field updates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountPatch {
    pub sub_stage: Option<SubStage>,
    pub stage: Option<Stage>,
    pub onboarding_manager: Option<String>,
}

impl AccountPatch {
    pub fn sub_stage(sub_stage: SubStage) -> Self {
        AccountPatch {
            sub_stage: Some(sub_stage),
            ..Default::default()
        }
    }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }

    pub fn with_onboarding_manager(mut self, manager: impl Into<String>) -> Self {
        self.onboarding_manager = Some(manager.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sub_stage.is_none() && self.stage.is_none() && self.onboarding_manager.is_none()
    }

    /// Build a patch from raw `(field, value)` pairs. Field names resolve
    /// through the mapping table; values are parsed against the account
    /// schema. Unknown fields and unparseable values are errors.
    pub fn from_fields<'a, I>(fields: I) -> Result<AccountPatch>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut patch = AccountPatch::default();
        for (name, value) in fields {
            match AccountField::from_name(name)? {
                AccountField::SubStage => {
                    patch.sub_stage = Some(SubStage::from_wire(value));
                }
                AccountField::Stage => {
                    let stage = Stage::from_str(value).map_err(|_| {
                        RooftopError::InvalidPatchValue {
                            field: name.to_string(),
                            message: format!("'{}' is not a stage", value),
                        }
                    })?;
                    patch.stage = Some(stage);
                }
                AccountField::OnboardingManager => {
                    patch.onboarding_manager = Some(value.to_string());
                }
            }
        }
        Ok(patch)
    }

    /// Apply to an account in place. Only called after the remote mutation
    /// has succeeded.
    pub fn apply(&self, account: &mut Account) {
        if let Some(sub_stage) = &self.sub_stage {
            account.sub_stage = sub_stage.clone();
        }
        if let Some(stage) = self.stage {
            account.stage = stage;
        }
        if let Some(manager) = &self.onboarding_manager {
            account.onboarding_manager = Some(manager.clone());
        }
    }
}
