//! The account table: reducer-style model, async handlers, and components.

pub mod components;
pub mod filter;
pub mod handlers;
pub mod model;
pub mod view;

pub use filter::{SortDirection, SortKey, SortSpec, visible_accounts};
pub use model::{
    Command, LoadPhase, ModalViewModel, SelectAllState, TableAction, TableState,
    TableViewModel, compute_table_view_model, key_to_action, reduce_table_state,
    should_fetch_more,
};
pub use view::{Dashboard, DashboardProps};
