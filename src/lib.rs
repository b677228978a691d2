pub mod config;
pub mod error;
pub mod notify;
pub mod patch;
pub mod remote;
pub mod tui;
pub mod types;
pub mod workflow;

pub use config::Config;
pub use error::{Result, RooftopError};
pub use notify::{Toast, ToastHub, ToastLevel, toast_hub};
pub use patch::{AccountField, AccountPatch};
pub use remote::{
    AccountFilters, AccountPage, AccountQuery, AccountService, CallSchedule, HandoverDetails,
    HttpAccountService, ObNotRequired, PocKind, PocName, SchedulePayload, SubStageUpdate,
};
pub use types::{Account, Stage, SubStage};
