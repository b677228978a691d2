//! Table chrome components: header, rows, skeletons, footer.

pub mod modals;

use iocraft::prelude::*;

use crate::notify::{Toast, ToastLevel};
use crate::tui::theme::theme;
use crate::types::format_compact_usd;

use super::model::{
    LoadPhase, MetricsViewModel, RowViewModel, SelectAllState, TableViewModel,
};

/// A keyboard shortcut hint shown in the footer
#[derive(Debug, Clone, Default)]
pub struct Shortcut {
    pub key: String,
    pub label: String,
}

impl Shortcut {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Shortcut {
            key: key.into(),
            label: label.into(),
        }
    }
}

#[derive(Default, Props)]
pub struct FooterProps {
    pub shortcuts: Vec<Shortcut>,
}

#[component]
pub fn Footer(props: &FooterProps) -> impl Into<AnyElement<'static>> {
    let theme = theme();
    let shortcuts = props.shortcuts.clone();

    element! {
        View(
            width: 100pct,
            flex_shrink: 0.0,
            padding_left: 1,
            border_edges: Edges::Top,
            border_style: BorderStyle::Single,
            border_color: theme.border,
        ) {
            #(shortcuts.iter().map(|s| {
                element! {
                    View(padding_right: 2) {
                        Text(content: s.key.clone(), color: theme.id_color)
                        Text(content: format!(" {}", s.label), color: theme.text_dimmed)
                    }
                }
            }))
        }
    }
}

#[derive(Default, Props)]
pub struct MetricsBarProps {
    pub metrics: Option<MetricsViewModel>,
    pub contracted_only: bool,
    pub search_query: String,
    pub search_focused: bool,
}

/// Metrics strip: enterprise count, total contracted ARR, active toggles,
/// and the search box.
#[component]
pub fn MetricsBar(props: &MetricsBarProps) -> impl Into<AnyElement<'static>> {
    let theme = theme();
    let (count, arr, total) = props
        .metrics
        .as_ref()
        .map(|m| (m.enterprise_count, m.total_arr.clone(), m.total_available))
        .unwrap_or((0, format_compact_usd(0.0), 0));

    let search_display = if props.search_focused {
        format!("/{}▌", props.search_query)
    } else if props.search_query.is_empty() {
        "/ to search".to_string()
    } else {
        format!("/{}", props.search_query)
    };

    element! {
        View(
            width: 100pct,
            flex_shrink: 0.0,
            padding_left: 1,
            padding_right: 1,
            border_edges: Edges::Bottom,
            border_style: BorderStyle::Single,
            border_color: theme.border,
        ) {
            View(padding_right: 3) {
                Text(content: "Enterprises: ", color: theme.text_dimmed)
                Text(content: format!("{} of {}", count, total), color: theme.highlight)
            }
            View(padding_right: 3) {
                Text(content: "Contracted ARR: ", color: theme.text_dimmed)
                Text(content: arr, color: theme.metric)
            }
            View(padding_right: 3) {
                Text(
                    content: if props.contracted_only { "[contracted only]" } else { "" },
                    color: Color::Yellow,
                )
            }
            View(flex_grow: 1.0, justify_content: JustifyContent::End) {
                Text(
                    content: search_display,
                    color: if props.search_focused { theme.text } else { theme.text_dimmed },
                )
            }
        }
    }
}

#[derive(Default, Props)]
pub struct SelectionBarProps {
    pub count: usize,
    pub bulk_enabled: bool,
}

/// Selection status bar showing "X selected" and whether bulk actions are
/// available for the selection.
#[component]
pub fn SelectionBar(props: &SelectionBarProps) -> impl Into<AnyElement<'static>> {
    let theme = theme();

    if props.count == 0 {
        return element! { View() };
    }

    let hint = if props.bulk_enabled {
        "B: bulk action".to_string()
    } else {
        "bulk disabled (selection is mixed)".to_string()
    };

    element! {
        View(
            width: 100pct,
            flex_shrink: 0.0,
            padding_left: 1,
            border_edges: Edges::Top,
            border_style: BorderStyle::Single,
            border_color: theme.border,
        ) {
            View(padding_right: 3) {
                Text(content: format!("{} selected", props.count), color: Color::Cyan)
            }
            Text(
                content: hint,
                color: if props.bulk_enabled { theme.text } else { theme.text_dimmed },
            )
        }
    }
}

/// Placeholder rows shown while a page fetch is in flight.
pub fn render_skeleton_rows(count: usize) -> Vec<AnyElement<'static>> {
    let theme = theme();
    (0..count)
        .map(|_| {
            element! {
                View(width: 100pct, height: 1, padding_left: 1) {
                    Text(
                        content: "░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░",
                        color: theme.text_dimmed,
                    )
                }
            }
            .into_any()
        })
        .collect()
}

fn select_all_marker(state: SelectAllState) -> &'static str {
    match state {
        SelectAllState::None => "[ ]",
        SelectAllState::Some => "[-]",
        SelectAllState::All => "[x]",
    }
}

fn pad(text: &str, width: usize) -> String {
    let mut out: String = text.chars().take(width).collect();
    while out.chars().count() < width {
        out.push(' ');
    }
    out
}

fn render_row(row: &RowViewModel) -> AnyElement<'static> {
    let theme = theme();
    let account = &row.account;

    let marker = if row.is_selected { "[x]" } else { "[ ]" };
    let cursor = if row.is_cursor { "›" } else { " " };

    element! {
        View(
            width: 100pct,
            height: 1,
            background_color: if row.is_cursor { Some(Color::DarkGrey) } else { None },
        ) {
            View(width: 2) {
                Text(content: cursor.to_string(), color: theme.highlight)
            }
            View(width: 4) {
                Text(content: marker.to_string(), color: Color::Cyan)
            }
            View(width: 24) {
                Text(content: pad(&account.name, 22), color: theme.text, wrap: TextWrap::NoWrap)
            }
            View(width: 18) {
                Text(content: pad(&account.enterprise_name, 16), color: theme.text_dimmed, wrap: TextWrap::NoWrap)
            }
            View(width: 20) {
                Text(
                    content: pad(&account.stage.to_string(), 18),
                    color: theme.stage_color(account.stage),
                    wrap: TextWrap::NoWrap,
                )
            }
            View(width: 18) {
                Text(
                    content: pad(&format!("{} ▾", account.sub_stage), 16),
                    color: theme.sub_stage_color(&account.sub_stage),
                    wrap: TextWrap::NoWrap,
                )
            }
            View(width: 16) {
                Text(
                    content: pad(&account.account_type, 14),
                    color: theme.account_type_color(&account.account_type),
                    wrap: TextWrap::NoWrap,
                )
            }
            View(width: 8) {
                Text(content: pad(&account.region, 6), color: theme.text_dimmed, wrap: TextWrap::NoWrap)
            }
            View(width: 9) {
                Text(content: pad(&row.arr_display, 8), color: theme.metric, wrap: TextWrap::NoWrap)
            }
            View(width: 14) {
                Text(content: pad(&row.contracted_date_display, 12), color: theme.text_dimmed, wrap: TextWrap::NoWrap)
            }
            View(width: 16) {
                Text(content: pad(&account.ae_poc, 14), color: theme.text_dimmed, wrap: TextWrap::NoWrap)
            }
        }
    }
    .into_any()
}

#[derive(Default, Props)]
pub struct AccountListProps {
    pub view_model: Option<TableViewModel>,
    pub list_height: usize,
}

/// The account table body: column header, rows, skeletons, empty states.
#[component]
pub fn AccountList(props: &AccountListProps) -> impl Into<AnyElement<'static>> {
    let theme = theme();
    let Some(vm) = props.view_model.clone() else {
        return element! { View() };
    };

    let header = element! {
        View(
            width: 100pct,
            height: 1,
            border_edges: Edges::Bottom,
            border_style: BorderStyle::Single,
            border_color: theme.border,
        ) {
            View(width: 2) { Text(content: " ") }
            View(width: 4) {
                Text(content: select_all_marker(vm.select_all).to_string(), color: Color::Cyan)
            }
            View(width: 24) { Text(content: "Rooftop", color: theme.text, weight: Weight::Bold) }
            View(width: 18) { Text(content: "Enterprise", color: theme.text, weight: Weight::Bold) }
            View(width: 20) { Text(content: "Stage", color: theme.text, weight: Weight::Bold) }
            View(width: 18) { Text(content: "Sub Stage", color: theme.text, weight: Weight::Bold) }
            View(width: 16) { Text(content: "Type", color: theme.text, weight: Weight::Bold) }
            View(width: 8) { Text(content: "Region", color: theme.text, weight: Weight::Bold) }
            View(width: 9) { Text(content: "ARR", color: theme.text, weight: Weight::Bold) }
            View(width: 14) { Text(content: "Contracted", color: theme.text, weight: Weight::Bold) }
            View(width: 16) { Text(content: "AE POC", color: theme.text, weight: Weight::Bold) }
        }
    };

    let body: Vec<AnyElement<'static>> = match vm.loading {
        LoadPhase::Initial => render_skeleton_rows(props.list_height.min(8)),
        _ => {
            let mut rows: Vec<AnyElement<'static>> =
                vm.rows.iter().map(render_row).collect();
            if vm.loading == LoadPhase::More {
                rows.extend(render_skeleton_rows(2));
            }
            if rows.is_empty() {
                let message = if vm.search_query.is_empty() && !vm.contracted_only {
                    "No rooftops data available"
                } else {
                    "No matching rooftops found"
                };
                rows.push(
                    element! {
                        View(width: 100pct, padding_left: 1) {
                            Text(content: message.to_string(), color: theme.text_dimmed)
                        }
                    }
                    .into_any(),
                );
            }
            rows
        }
    };

    element! {
        View(
            width: 100pct,
            flex_grow: 1.0,
            flex_direction: FlexDirection::Column,
        ) {
            #(std::iter::once(header.into_any()))
            #(body)
        }
    }
}

/// Render a toast notification bar, colored by level.
pub fn render_toast(toast: &Option<Toast>) -> Option<AnyElement<'static>> {
    toast.as_ref().map(|t| {
        let color = match t.level {
            ToastLevel::Info => Color::Cyan,
            ToastLevel::Success => Color::Green,
            ToastLevel::Warning => Color::Yellow,
            ToastLevel::Error => Color::Red,
        };
        element! {
            View(
                width: 100pct,
                height: 3,
                align_items: AlignItems::Center,
                justify_content: JustifyContent::Center,
                background_color: Color::Black,
                border_edges: Edges::Top,
                border_style: BorderStyle::Single,
                border_color: color,
            ) {
                Text(content: t.message.clone(), color)
            }
        }
        .into_any()
    })
}
