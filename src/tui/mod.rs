//! Terminal UI for the rooftop dashboard.

pub mod table;
pub mod theme;

use std::sync::Arc;

use crate::config::Config;
use crate::error::{Result, RooftopError};
use crate::remote::{AccountFilters, HttpAccountService};

/// Launch the dashboard.
///
/// NOTE: This function creates its own tokio runtime because it's an entry
/// point for the TUI. This is intentional and safe since it's not called
/// from within another async context.
pub fn run_dashboard(config: &Config, initial_filters: AccountFilters) -> Result<()> {
    use iocraft::prelude::*;
    use table::Dashboard;

    let service: Arc<dyn crate::remote::AccountService> =
        Arc::new(HttpAccountService::from_config(config)?);
    let page_size = config.page_size;
    let timeout_secs = config.request_timeout;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| RooftopError::Other(format!("Failed to create runtime: {}", e)))?;

    rt.block_on(async {
        element!(Dashboard(
            service: Some(service),
            page_size: page_size,
            timeout_secs: timeout_secs,
            initial_filters: Some(initial_filters),
        ))
        .fullscreen()
        .await
        .map_err(|e| RooftopError::Other(format!("TUI error: {}", e)))
    })
}
