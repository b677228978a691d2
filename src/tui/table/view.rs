//! Main dashboard view component.
//!
//! Renders purely from the computed view model; every key event maps to a
//! `TableAction`, runs through the reducer, and the queued commands are
//! handed to the async handlers.

// Allow clone on Copy types - used intentionally in async closures for clarity
#![allow(clippy::clone_on_copy)]

use std::sync::Arc;

use iocraft::prelude::*;

use crate::notify::toast_hub;
use crate::remote::{AccountFilters, AccountService};
use crate::tui::theme::theme;

use super::components::modals::{render_menu, render_modal};
use super::components::{AccountList, Footer, MetricsBar, SelectionBar, Shortcut, render_toast};
use super::handlers::{apply_action, create_table_handlers};
use super::model::{
    TableAction, TableState, compute_table_view_model, key_to_action,
};

/// Props for the Dashboard component
#[derive(Default, Props)]
pub struct DashboardProps {
    pub service: Option<Arc<dyn AccountService>>,
    pub page_size: u32,
    pub timeout_secs: u64,
    pub initial_filters: Option<AccountFilters>,
}

/// Main dashboard component
#[component]
pub fn Dashboard<'a>(props: &DashboardProps, mut hooks: Hooks) -> impl Into<AnyElement<'a>> {
    let (width, height) = hooks.use_terminal_size();
    let mut system = hooks.use_context_mut::<SystemContext>();
    let theme = theme();

    let service = props
        .service
        .clone()
        .expect("Dashboard requires an account service");
    let page_size = if props.page_size == 0 { 50 } else { props.page_size };
    let timeout = std::time::Duration::from_secs(if props.timeout_secs == 0 {
        30
    } else {
        props.timeout_secs
    });
    let initial_filters = props.initial_filters.clone().unwrap_or_default();

    let table: State<TableState> = hooks.use_state(move || {
        let mut state = TableState::new(jiff::Zoned::now().date(), page_size);
        state.filters = initial_filters;
        state
    });

    let handlers = create_table_handlers(&mut hooks, &table, service, toast_hub(), timeout);

    // Route toasts from the pub/sub hub into table state
    let mut hub_wired = hooks.use_state(|| false);
    if !hub_wired.get() {
        hub_wired.set(true);
        let toast_table = table;
        toast_hub().subscribe(move |toast| {
            let mut toast_table = toast_table;
            apply_action(&mut toast_table, TableAction::ShowToast(toast.clone()), 20);
        });
    }

    let list_height = height.saturating_sub(8) as usize;

    // Initial fetch on startup
    let mut started = hooks.use_state(|| false);
    if !started.get() {
        started.set(true);
        let mut table = table;
        let commands = apply_action(&mut table, TableAction::Init, list_height);
        handlers.run(commands);
    }

    // Keyboard events: map, reduce, execute
    let event_handlers = handlers.clone();
    hooks.use_terminal_events({
        let mut table = table;
        move |event| {
            if let TerminalEvent::Key(KeyEvent {
                code,
                kind,
                modifiers,
                ..
            }) = event
            {
                if kind == KeyEventKind::Release {
                    return;
                }
                let action = {
                    let state = table.read();
                    key_to_action(code, modifiers, &state)
                };
                if let Some(action) = action {
                    let commands = apply_action(&mut table, action, list_height);
                    event_handlers.run(commands);
                }
            }
        }
    });

    let state = table.read().clone();
    if state.should_exit {
        system.exit();
    }

    let vm = compute_table_view_model(&state, list_height);

    let mut shortcuts = vec![
        Shortcut::new("j/k", "nav"),
        Shortcut::new("Space", "select"),
        Shortcut::new("a", "select all"),
        Shortcut::new("Enter", "sub stage"),
        Shortcut::new("B", "bulk"),
        Shortcut::new("/", "search"),
        Shortcut::new("c", "contracted"),
        Shortcut::new("r", "refresh"),
        Shortcut::new("q", "quit"),
    ];
    if vm.has_more {
        shortcuts.push(Shortcut::new("↓", "more rows load as you scroll"));
    }

    let menu_overlay = vm.menu.as_ref().map(render_menu);
    let modal_overlay = render_modal(&vm.modal);
    let toast = render_toast(&vm.toast);

    element! {
        View(
            width,
            height,
            flex_direction: FlexDirection::Column,
            background_color: theme.background,
        ) {
            // Title bar
            View(
                width: 100pct,
                padding_left: 1,
                border_edges: Edges::Bottom,
                border_style: BorderStyle::Single,
                border_color: theme.border,
            ) {
                Text(content: "Contracted Rooftops", weight: Weight::Bold, color: theme.text)
            }

            MetricsBar(
                metrics: Some(vm.metrics.clone()),
                contracted_only: vm.contracted_only,
                search_query: vm.search_query.clone(),
                search_focused: vm.search_focused,
            )

            // Table body
            View(
                flex_grow: 1.0,
                width: 100pct,
                flex_direction: FlexDirection::Column,
            ) {
                AccountList(
                    view_model: Some(vm.clone()),
                    list_height: list_height,
                )
            }

            SelectionBar(
                count: vm.selection_count,
                bulk_enabled: vm.bulk_enabled,
            )

            Footer(shortcuts: shortcuts)

            // Toast notification
            #(toast)

            // Overlays
            #(menu_overlay)
            #(modal_overlay)
        }
    }
}
