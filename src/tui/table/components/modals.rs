//! Modal overlays: the sub-stage menu and the workflow dialogs.
//!
//! Everything renders from view-model snapshots; key routing lives in the
//! model layer.

use iocraft::prelude::*;

use crate::tui::theme::theme;
use crate::workflow::forms::{
    COMMUNICATION_OPTIONS, DURATION_OPTIONS, FormError, HandoverForm, LANGUAGE_OPTIONS,
    MeetDoneForm, PLATFORM_OPTIONS, ParticipantKind, ReasonForm, ScheduleForm,
    TIMEZONE_OPTIONS, format_date_option, format_time_12h,
};

use super::super::model::{MenuViewModel, ModalViewModel};

fn modal_frame(
    title: String,
    footer: String,
    border_color: Color,
    body: Vec<AnyElement<'static>>,
) -> AnyElement<'static> {
    let theme = theme();
    element! {
        View(
            position: Position::Absolute,
            width: 100pct,
            height: 100pct,
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
        ) {
            View(
                width: 64,
                flex_direction: FlexDirection::Column,
                border_style: BorderStyle::Round,
                border_color: border_color,
                background_color: Color::Black,
                padding: 1,
            ) {
                View(width: 100pct, justify_content: JustifyContent::Center) {
                    Text(content: title, weight: Weight::Bold, color: theme.text)
                }
                View(height: 1) { Text(content: "") }
                #(body)
                View(height: 1) { Text(content: "") }
                View(width: 100pct, justify_content: JustifyContent::Center) {
                    Text(content: footer, color: theme.text_dimmed)
                }
            }
        }
    }
    .into_any()
}

fn field_row(label: &str, value: String, focused: bool) -> AnyElement<'static> {
    let theme = theme();
    element! {
        View(
            width: 100pct,
            background_color: if focused { Some(Color::DarkBlue) } else { None },
        ) {
            View(width: 22) {
                Text(
                    content: format!("{}:", label),
                    color: if focused { Color::Yellow } else { theme.text },
                )
            }
            Text(content: value, color: theme.id_color, wrap: TextWrap::NoWrap)
        }
    }
    .into_any()
}

fn multi_select_row(
    label: &str,
    options: &[&str],
    selected: &[String],
    focused: bool,
) -> AnyElement<'static> {
    let rendered: Vec<String> = options
        .iter()
        .enumerate()
        .map(|(i, opt)| {
            let mark = if selected.iter().any(|s| s == opt) {
                "x"
            } else {
                " "
            };
            format!("{}[{}]{}", i + 1, mark, opt)
        })
        .collect();
    field_row(label, rendered.join(" "), focused)
}

fn error_rows(errors: &[FormError]) -> Vec<AnyElement<'static>> {
    let theme = theme();
    errors
        .iter()
        .map(|e| {
            element! {
                View(width: 100pct) {
                    Text(
                        content: format!("✗ {}: {}", e.field, e.message),
                        color: theme.error,
                    )
                }
            }
            .into_any()
        })
        .collect()
}

fn handover_body(form: &HandoverForm) -> Vec<AnyElement<'static>> {
    let theme = theme();
    let mut body = vec![
        element! {
            View() { Text(content: "Input Delivery Mode", color: theme.text_dimmed) }
        }
        .into_any(),
        multi_select_row(
            "Platforms*",
            PLATFORM_OPTIONS,
            &form.input.platforms,
            form.focused_field == HandoverForm::FIELD_INPUT_PLATFORMS,
        ),
        field_row(
            "DMS/IMS*",
            form.input.dms.clone(),
            form.focused_field == HandoverForm::FIELD_INPUT_DMS,
        ),
        field_row(
            "Website Provider*",
            form.input.website_provider.clone(),
            form.focused_field == HandoverForm::FIELD_INPUT_WEBSITE,
        ),
        element! {
            View() { Text(content: "Output Delivery Mode", color: theme.text_dimmed) }
        }
        .into_any(),
        field_row(
            "Same as Input",
            if form.same_as_input { "[x]" } else { "[ ]" }.to_string(),
            form.focused_field == HandoverForm::FIELD_SAME_AS_INPUT,
        ),
        multi_select_row(
            "Platforms*",
            PLATFORM_OPTIONS,
            &form.output.platforms,
            form.focused_field == HandoverForm::FIELD_OUTPUT_PLATFORMS,
        ),
        field_row(
            "DMS/IMS*",
            form.output.dms.clone(),
            form.focused_field == HandoverForm::FIELD_OUTPUT_DMS,
        ),
        field_row(
            "Website Provider*",
            form.output.website_provider.clone(),
            form.focused_field == HandoverForm::FIELD_OUTPUT_WEBSITE,
        ),
        element! {
            View() { Text(content: "Other Details", color: theme.text_dimmed) }
        }
        .into_any(),
        multi_select_row(
            "Client Languages*",
            LANGUAGE_OPTIONS,
            &form.client_languages,
            form.focused_field == HandoverForm::FIELD_LANGUAGES,
        ),
        field_row(
            "Important Notes*",
            form.notes.clone(),
            form.focused_field == HandoverForm::FIELD_NOTES,
        ),
    ];
    body.extend(error_rows(&form.errors));
    body
}

fn schedule_body(form: &ScheduleForm, for_reschedule: bool) -> Vec<AnyElement<'static>> {
    let theme = theme();
    let mut body = vec![field_row(
        "OB call not required",
        if form.ob_call_not_required { "[x]" } else { "[ ]" }.to_string(),
        form.focused_field == ScheduleForm::FIELD_NOT_REQUIRED,
    )];

    if form.ob_call_not_required {
        let manager = form
            .not_required
            .selected_manager()
            .map(|m| m.name.clone())
            .unwrap_or_else(|| "(none available)".to_string());
        body.push(field_row(
            "Onboarding Manager*",
            format!("‹ {} ›", manager),
            form.focused_field == ScheduleForm::FIELD_NR_MANAGER,
        ));
        body.push(multi_select_row(
            "Communication*",
            COMMUNICATION_OPTIONS,
            &form.not_required.communication_modes,
            form.focused_field == ScheduleForm::FIELD_NR_MODES,
        ));
        body.push(field_row(
            "Email*",
            form.not_required.email.clone(),
            form.focused_field == ScheduleForm::FIELD_NR_EMAIL,
        ));
        body.push(field_row(
            "Reason*",
            form.not_required.reason.clone(),
            form.focused_field == ScheduleForm::FIELD_NR_REASON,
        ));
    } else {
        let date = form
            .selected_date()
            .map(format_date_option)
            .unwrap_or_else(|| "-".to_string());
        body.push(field_row(
            "Date*",
            format!("‹ {} ›", date),
            form.focused_field == ScheduleForm::FIELD_DATE,
        ));
        body.push(field_row(
            "Timezone*",
            format!(
                "‹ {} ›",
                TIMEZONE_OPTIONS
                    .get(form.timezone_index)
                    .copied()
                    .unwrap_or("-")
            ),
            form.focused_field == ScheduleForm::FIELD_TIMEZONE,
        ));
        body.push(field_row(
            "Start*",
            format!(
                "‹ {} ›  –  {}",
                format_time_12h(form.start_time()),
                format_time_12h(form.end_time())
            ),
            form.focused_field == ScheduleForm::FIELD_START,
        ));
        body.push(field_row(
            "Duration*",
            format!(
                "‹ {} ›",
                DURATION_OPTIONS
                    .get(form.duration_index)
                    .map(|(label, _)| *label)
                    .unwrap_or("-")
            ),
            form.focused_field == ScheduleForm::FIELD_DURATION,
        ));
        body.push(
            element! {
                View() { Text(content: "Participants", color: theme.text_dimmed) }
            }
            .into_any(),
        );
        for participant in &form.participants {
            let marker = match participant.kind {
                ParticipantKind::Team => "•",
                ParticipantKind::User => "·",
            };
            body.push(
                element! {
                    View(padding_left: 2) {
                        Text(
                            content: format!("{} {} <{}>", marker, participant.name, participant.email),
                            color: theme.text,
                            wrap: TextWrap::NoWrap,
                        )
                    }
                }
                .into_any(),
            );
        }
        body.push(field_row(
            "Invite (Ctrl-I)",
            form.invite_email.clone(),
            form.focused_field == ScheduleForm::FIELD_INVITE,
        ));
        if for_reschedule {
            body.push(field_row(
                "Reschedule Reason*",
                form.reschedule_reason.clone(),
                form.focused_field == ScheduleForm::FIELD_RESCHEDULE_REASON,
            ));
        }
    }

    body.extend(error_rows(&form.errors));
    body
}

fn confirm_done_body(form: &MeetDoneForm, can_confirm: bool) -> Vec<AnyElement<'static>> {
    let theme = theme();
    let manager = form
        .selected_manager()
        .map(|m| m.name.clone())
        .unwrap_or_else(|| "(none available)".to_string());
    vec![
        element! {
            View() {
                Text(
                    content: "This will move the enterprise Stage to Onboarding. Are you sure?",
                    color: theme.text,
                )
            }
        }
        .into_any(),
        field_row("Onboarding Manager*", format!("‹ {} ›", manager), true),
        element! {
            View() {
                Text(
                    content: if can_confirm { "" } else { "Select an onboarding manager to continue" },
                    color: theme.error,
                )
            }
        }
        .into_any(),
    ]
}

fn reason_body(form: &ReasonForm, can_confirm: bool) -> Vec<AnyElement<'static>> {
    let theme = theme();
    vec![
        field_row("Cancellation Reason*", form.reason.clone(), true),
        element! {
            View() {
                Text(
                    content: if can_confirm { "" } else { "This field is required" },
                    color: theme.error,
                )
            }
        }
        .into_any(),
    ]
}

/// Render whichever workflow modal is open, if any.
pub fn render_modal(modal: &ModalViewModel) -> Option<AnyElement<'static>> {
    let theme = theme();
    let footer_form = "Tab: field | 1-9: toggle | ←/→: pick | Enter: continue | Esc: cancel";
    match modal {
        ModalViewModel::None => None,
        ModalViewModel::Handover { form, bulk_count } => {
            let title = match bulk_count {
                Some(n) => format!("Handover Details · {} accounts", n),
                None => "Handover Details".to_string(),
            };
            Some(modal_frame(
                title,
                footer_form.to_string(),
                theme.border_focused,
                handover_body(form),
            ))
        }
        ModalViewModel::Schedule {
            form,
            for_reschedule,
            bulk_count,
        } => {
            let title = match bulk_count {
                Some(n) => format!("Schedule Onboarding Call · {} accounts", n),
                None => "Schedule Onboarding Call".to_string(),
            };
            Some(modal_frame(
                title,
                format!("{} | Ctrl-B: back", footer_form),
                theme.border_focused,
                schedule_body(form, *for_reschedule),
            ))
        }
        ModalViewModel::ConfirmDone { form, can_confirm } => Some(modal_frame(
            "Mark Meet as Done?".to_string(),
            "←/→: manager | Enter: yes | Esc: cancel".to_string(),
            Color::Yellow,
            confirm_done_body(form, *can_confirm),
        )),
        ModalViewModel::ConfirmDropOff => Some(modal_frame(
            "Mark as Drop Off?".to_string(),
            "Enter: yes | Esc: no".to_string(),
            Color::Yellow,
            vec![
                element! {
                    View() {
                        Text(
                            content: "This will move the enterprise Stage to Drop Off. Are you sure?",
                            color: theme.text,
                        )
                    }
                }
                .into_any(),
            ],
        )),
        ModalViewModel::BulkConfirm { count, target } => Some(modal_frame(
            "Apply Bulk Action?".to_string(),
            "Enter: yes | Esc: no".to_string(),
            Color::Yellow,
            vec![
                element! {
                    View() {
                        Text(
                            content: format!("{} account(s) → {}", count, target),
                            color: theme.text,
                        )
                    }
                }
                .into_any(),
            ],
        )),
        ModalViewModel::Reason {
            form,
            can_confirm,
            bulk_count,
        } => {
            let title = match bulk_count {
                Some(n) => format!("Meet Cancellation · {} accounts", n),
                None => "Meet Cancellation".to_string(),
            };
            Some(modal_frame(
                title,
                "type the reason | Enter: cancel meet | Esc: close".to_string(),
                Color::Red,
                reason_body(form, *can_confirm),
            ))
        }
        ModalViewModel::Submitting => Some(modal_frame(
            "Saving…".to_string(),
            "waiting for the account service".to_string(),
            theme.border,
            vec![
                element! {
                    View() { Text(content: "Submitting changes…", color: theme.text_dimmed) }
                }
                .into_any(),
            ],
        )),
    }
}

/// Render the sub-stage dropdown (single-row or bulk).
pub fn render_menu(menu: &MenuViewModel) -> AnyElement<'static> {
    let theme = theme();
    let options = menu.options.clone();
    let cursor = menu.cursor;
    element! {
        View(
            position: Position::Absolute,
            width: 100pct,
            height: 100pct,
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
        ) {
            View(
                width: 40,
                flex_direction: FlexDirection::Column,
                border_style: BorderStyle::Round,
                border_color: theme.border_focused,
                background_color: Color::Black,
                padding: 1,
            ) {
                View(width: 100pct, justify_content: JustifyContent::Center) {
                    Text(content: menu.title.clone(), weight: Weight::Bold, color: theme.text)
                }
                View(height: 1) { Text(content: "") }
                #(options.iter().enumerate().map(|(i, (label, is_current))| {
                    let focused = i == cursor;
                    element! {
                        View(
                            width: 100pct,
                            background_color: if focused { Some(Color::DarkBlue) } else { None },
                        ) {
                            Text(
                                content: format!(
                                    "{} {}",
                                    if *is_current { "●" } else { " " },
                                    label
                                ),
                                color: if focused { Color::Yellow } else { theme.text },
                            )
                        }
                    }
                }))
                View(height: 1) { Text(content: "") }
                View(width: 100pct, justify_content: JustifyContent::Center) {
                    Text(content: "j/k: move | Enter: apply | Esc: close", color: theme.text_dimmed)
                }
            }
        }
    }
    .into_any()
}
