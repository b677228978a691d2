//! Sub-stage workflow: transition rules, modal state machines, and the
//! async ops layer that executes their commands.

pub mod bulk;
pub mod engine;
pub mod forms;
pub mod ops;
pub mod single;

pub use bulk::{
    BulkCommand, BulkEvent, BulkReport, BulkState, SelectionSummary, bulk_options,
    summarize_selection,
};
pub use engine::{
    EffectKind, applied_sub_stage, classify, forced_stage, is_legal_transition,
    legal_next_sub_stages,
};
pub use single::{WorkflowCommand, WorkflowCx, WorkflowEvent, WorkflowState, advance};
