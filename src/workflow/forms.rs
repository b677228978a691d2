//! Form state for the workflow modals.
//!
//! Each modal owns a small form struct: current values, a focused-field
//! cursor, and a `validate` that either produces the wire payload or
//! records per-field errors. Components render purely from these structs;
//! key handlers mutate them through the editing methods.

use jiff::civil;
use once_cell::sync::Lazy;

use crate::remote::{
    CallSchedule, HandoverDetails, ObNotRequired, PocName, SchedulePayload,
};

pub const PLATFORM_OPTIONS: &[&str] = &["APP", "API", "FTP", "Web", "Console"];

pub const LANGUAGE_OPTIONS: &[&str] = &[
    "English",
    "Spanish",
    "French",
    "German",
    "Portuguese",
    "Italian",
    "Dutch",
    "Chinese",
    "Japanese",
    "Korean",
];

pub const TIMEZONE_OPTIONS: &[&str] = &[
    "Asia/Kolkata (IST)",
    "America/Los_Angeles (PT)",
    "America/Denver (MT)",
    "America/Chicago (CT)",
    "America/New_York (ET)",
    "GMT",
];

pub const COMMUNICATION_OPTIONS: &[&str] = &["Email", "Phone", "Whatsapp", "Slack"];

/// (label, minutes)
pub const DURATION_OPTIONS: &[(&str, i64)] = &[("30 mins", 30), ("45 mins", 45), ("1 hour", 60)];

/// Bookable start times, 15-minute steps across the full day.
pub static TIME_SLOTS: Lazy<Vec<civil::Time>> = Lazy::new(|| {
    (0..24 * 60)
        .step_by(15)
        .map(|m| civil::time((m / 60) as i8, (m % 60) as i8, 0, 0))
        .collect()
});

/// `8:00 PM`-style rendering used by the schedule picker and wire payload.
pub fn format_time_12h(t: civil::Time) -> String {
    let h24 = t.hour();
    let suffix = if h24 >= 12 { "PM" } else { "AM" };
    let h12 = ((h24 + 11) % 12) + 1;
    format!("{}:{:02} {}", h12, t.minute(), suffix)
}

const WEEKDAY_ABBREV: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const MONTH_ABBREV: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// `Thu, 28 Aug 2025`-style rendering for the date picker.
pub fn format_date_option(d: civil::Date) -> String {
    format!(
        "{}, {:02} {} {}",
        WEEKDAY_ABBREV[d.weekday().to_monday_zero_offset() as usize],
        d.day(),
        MONTH_ABBREV[d.month() as usize - 1],
        d.year()
    )
}

/// The bookable window: today plus the next 29 days.
pub fn next_30_days(today: civil::Date) -> Vec<civil::Date> {
    (0..30)
        .filter_map(|i| today.checked_add(jiff::Span::new().days(i)).ok())
        .collect()
}

/// End of call, clamped to the end of the day.
pub fn end_time(start: civil::Time, duration_minutes: i64) -> civil::Time {
    let total = (start.hour() as i64) * 60 + start.minute() as i64 + duration_minutes;
    let clamped = total.clamp(0, 23 * 60 + 59);
    civil::time((clamped / 60) as i8, (clamped % 60) as i8, 0, 0)
}

/// A field-level validation failure, rendered inline next to the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormError {
    pub field: &'static str,
    pub message: String,
}

impl FormError {
    fn required(field: &'static str) -> Self {
        FormError {
            field,
            message: "This field is required".to_string(),
        }
    }
}

// ============================================================================
// Handover form
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryMode {
    pub platforms: Vec<String>,
    pub dms: String,
    pub website_provider: String,
}

/// Handover details form: enterprise details for the onboarding team,
/// collected before the call is booked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoverForm {
    pub input: DeliveryMode,
    pub output: DeliveryMode,
    pub same_as_input: bool,
    pub client_languages: Vec<String>,
    pub notes: String,
    pub focused_field: usize,
    pub errors: Vec<FormError>,
}

impl Default for HandoverForm {
    fn default() -> Self {
        HandoverForm {
            input: DeliveryMode {
                platforms: vec!["FTP".to_string()],
                dms: "HMN".to_string(),
                website_provider: "NA".to_string(),
            },
            output: DeliveryMode {
                platforms: vec!["FTP".to_string()],
                dms: "VAuto".to_string(),
                website_provider: "NA".to_string(),
            },
            same_as_input: false,
            client_languages: vec!["English".to_string()],
            notes: "NA".to_string(),
            focused_field: 0,
            errors: Vec::new(),
        }
    }
}

impl HandoverForm {
    pub const FIELD_INPUT_PLATFORMS: usize = 0;
    pub const FIELD_INPUT_DMS: usize = 1;
    pub const FIELD_INPUT_WEBSITE: usize = 2;
    pub const FIELD_SAME_AS_INPUT: usize = 3;
    pub const FIELD_OUTPUT_PLATFORMS: usize = 4;
    pub const FIELD_OUTPUT_DMS: usize = 5;
    pub const FIELD_OUTPUT_WEBSITE: usize = 6;
    pub const FIELD_LANGUAGES: usize = 7;
    pub const FIELD_NOTES: usize = 8;
    pub const FIELD_COUNT: usize = 9;

    pub fn focus_next(&mut self) {
        self.focused_field = (self.focused_field + 1) % Self::FIELD_COUNT;
    }

    pub fn focus_prev(&mut self) {
        self.focused_field = (self.focused_field + Self::FIELD_COUNT - 1) % Self::FIELD_COUNT;
    }

    fn focused_text_mut(&mut self) -> Option<&mut String> {
        match self.focused_field {
            Self::FIELD_INPUT_DMS => Some(&mut self.input.dms),
            Self::FIELD_INPUT_WEBSITE => Some(&mut self.input.website_provider),
            Self::FIELD_OUTPUT_DMS => Some(&mut self.output.dms),
            Self::FIELD_OUTPUT_WEBSITE => Some(&mut self.output.website_provider),
            Self::FIELD_NOTES => Some(&mut self.notes),
            _ => None,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        if let Some(text) = self.focused_text_mut() {
            text.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(text) = self.focused_text_mut() {
            text.pop();
        }
    }

    fn focused_is_multi_select(&self) -> bool {
        matches!(
            self.focused_field,
            Self::FIELD_INPUT_PLATFORMS | Self::FIELD_OUTPUT_PLATFORMS | Self::FIELD_LANGUAGES
        )
    }

    /// Typed character: digits toggle options on a focused multi-select,
    /// anything else goes into the focused text field.
    pub fn handle_char(&mut self, c: char) {
        if self.focused_is_multi_select() {
            if let Some(d) = c.to_digit(10) {
                if d >= 1 {
                    self.toggle_option((d - 1) as usize);
                }
            }
            return;
        }
        self.insert_char(c);
    }

    /// Space toggles the focused checkbox, or types into a text field.
    pub fn space(&mut self) {
        if self.focused_field == Self::FIELD_SAME_AS_INPUT {
            self.set_same_as_input(!self.same_as_input);
        } else {
            self.insert_char(' ');
        }
    }

    pub fn toggle_option(&mut self, index: usize) {
        let (options, selected) = match self.focused_field {
            Self::FIELD_INPUT_PLATFORMS => (PLATFORM_OPTIONS, &mut self.input.platforms),
            Self::FIELD_OUTPUT_PLATFORMS => (PLATFORM_OPTIONS, &mut self.output.platforms),
            Self::FIELD_LANGUAGES => (LANGUAGE_OPTIONS, &mut self.client_languages),
            _ => return,
        };
        let Some(option) = options.get(index) else {
            return;
        };
        if let Some(pos) = selected.iter().position(|s| s == option) {
            selected.remove(pos);
        } else {
            selected.push(option.to_string());
        }
        if self.focused_field == Self::FIELD_INPUT_PLATFORMS && self.same_as_input {
            self.output.platforms = self.input.platforms.clone();
        }
    }

    pub fn set_same_as_input(&mut self, checked: bool) {
        self.same_as_input = checked;
        if checked {
            self.output = self.input.clone();
        }
    }

    /// Validate and produce the wire payload. On failure the errors are
    /// retained for inline display and `None` is returned.
    pub fn validate(&mut self) -> Option<HandoverDetails> {
        let mut errors = Vec::new();
        if self.input.platforms.is_empty() {
            errors.push(FormError::required("input platforms"));
        }
        if self.input.dms.trim().is_empty() {
            errors.push(FormError::required("input DMS/IMS"));
        }
        if self.input.website_provider.trim().is_empty() {
            errors.push(FormError::required("input website provider"));
        }
        if self.output.platforms.is_empty() {
            errors.push(FormError::required("output platforms"));
        }
        if self.output.dms.trim().is_empty() {
            errors.push(FormError::required("output DMS/IMS"));
        }
        if self.output.website_provider.trim().is_empty() {
            errors.push(FormError::required("output website provider"));
        }
        if self.client_languages.is_empty() {
            errors.push(FormError::required("client languages"));
        }
        if self.notes.trim().is_empty() {
            errors.push(FormError::required("important notes"));
        }

        if !errors.is_empty() {
            self.errors = errors;
            return None;
        }
        self.errors.clear();
        Some(HandoverDetails {
            input_platforms: self.input.platforms.clone(),
            input_dms: self.input.dms.trim().to_string(),
            input_website_provider: self.input.website_provider.trim().to_string(),
            output_platforms: self.output.platforms.clone(),
            output_dms: self.output.dms.trim().to_string(),
            output_website_provider: self.output.website_provider.trim().to_string(),
            client_languages: self.client_languages.clone(),
            notes: self.notes.trim().to_string(),
        })
    }
}

// ============================================================================
// Schedule form
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantKind {
    Team,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub name: String,
    pub email: String,
    pub kind: ParticipantKind,
}

/// Onboarding-call booking form; the second step of the handover flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleForm {
    pub date_options: Vec<civil::Date>,
    pub date_index: usize,
    pub timezone_index: usize,
    pub start_index: usize,
    pub duration_index: usize,
    pub participants: Vec<Participant>,
    pub invite_email: String,
    pub reschedule_reason: String,
    pub ob_call_not_required: bool,
    pub not_required: NotRequiredForm,
    pub focused_field: usize,
    pub errors: Vec<FormError>,
}

impl ScheduleForm {
    pub const FIELD_NOT_REQUIRED: usize = 0;
    pub const FIELD_DATE: usize = 1;
    pub const FIELD_TIMEZONE: usize = 2;
    pub const FIELD_START: usize = 3;
    pub const FIELD_DURATION: usize = 4;
    pub const FIELD_INVITE: usize = 5;
    pub const FIELD_RESCHEDULE_REASON: usize = 6;
    pub const FIELD_COUNT: usize = 7;

    // With "OB call not required" checked, fields 1..=4 re-render as the
    // reduced form
    pub const FIELD_NR_MANAGER: usize = 1;
    pub const FIELD_NR_MODES: usize = 2;
    pub const FIELD_NR_EMAIL: usize = 3;
    pub const FIELD_NR_REASON: usize = 4;

    /// Defaults mirror the booking screen: first bookable day, IST,
    /// 8:00 PM, 30 minutes, onboarding team pre-invited.
    pub fn new(today: civil::Date, ob_managers: &[PocName]) -> Self {
        let start_index = TIME_SLOTS
            .iter()
            .position(|t| *t == civil::time(20, 0, 0, 0))
            .unwrap_or(0);
        ScheduleForm {
            date_options: next_30_days(today),
            date_index: 0,
            timezone_index: 0,
            start_index,
            duration_index: 0,
            participants: vec![Participant {
                name: "Onboarding Team".to_string(),
                email: "onboarding@rooftops.example".to_string(),
                kind: ParticipantKind::Team,
            }],
            invite_email: String::new(),
            reschedule_reason: String::new(),
            ob_call_not_required: false,
            not_required: NotRequiredForm::new(ob_managers),
            focused_field: Self::FIELD_DATE,
            errors: Vec::new(),
        }
    }

    pub fn focus_next(&mut self) {
        self.focused_field = (self.focused_field + 1) % Self::FIELD_COUNT;
    }

    pub fn focus_prev(&mut self) {
        self.focused_field = (self.focused_field + Self::FIELD_COUNT - 1) % Self::FIELD_COUNT;
    }

    pub fn start_time(&self) -> civil::Time {
        TIME_SLOTS
            .get(self.start_index)
            .copied()
            .unwrap_or_else(|| civil::time(20, 0, 0, 0))
    }

    pub fn duration_minutes(&self) -> i64 {
        DURATION_OPTIONS
            .get(self.duration_index)
            .map(|(_, m)| *m)
            .unwrap_or(30)
    }

    /// End time is derived, never edited.
    pub fn end_time(&self) -> civil::Time {
        end_time(self.start_time(), self.duration_minutes())
    }

    pub fn selected_date(&self) -> Option<civil::Date> {
        self.date_options.get(self.date_index).copied()
    }

    /// Left/right on a picker field cycles its options.
    pub fn cycle(&mut self, forward: bool) {
        fn step(index: usize, len: usize, forward: bool) -> usize {
            if len == 0 {
                return 0;
            }
            if forward {
                (index + 1) % len
            } else {
                (index + len - 1) % len
            }
        }
        if self.ob_call_not_required {
            if self.focused_field == Self::FIELD_NR_MANAGER {
                self.not_required.manager_index = step(
                    self.not_required.manager_index,
                    self.not_required.managers.len(),
                    forward,
                );
            }
            return;
        }
        match self.focused_field {
            Self::FIELD_DATE => {
                self.date_index = step(self.date_index, self.date_options.len(), forward);
            }
            Self::FIELD_TIMEZONE => {
                self.timezone_index = step(self.timezone_index, TIMEZONE_OPTIONS.len(), forward);
            }
            Self::FIELD_START => {
                self.start_index = step(self.start_index, TIME_SLOTS.len(), forward);
            }
            Self::FIELD_DURATION => {
                self.duration_index = step(self.duration_index, DURATION_OPTIONS.len(), forward);
            }
            _ => {}
        }
    }

    pub fn insert_char(&mut self, c: char) {
        if self.ob_call_not_required {
            match self.focused_field {
                Self::FIELD_NR_EMAIL => self.not_required.email.push(c),
                Self::FIELD_NR_REASON => self.not_required.reason.push(c),
                _ => {}
            }
            return;
        }
        match self.focused_field {
            Self::FIELD_INVITE => self.invite_email.push(c),
            Self::FIELD_RESCHEDULE_REASON => self.reschedule_reason.push(c),
            _ => {}
        }
    }

    /// Typed character: digits toggle communication modes when that field
    /// is focused, anything else goes into the focused text field.
    pub fn handle_char(&mut self, c: char) {
        if self.ob_call_not_required && self.focused_field == Self::FIELD_NR_MODES {
            if let Some(d) = c.to_digit(10) {
                if d >= 1 {
                    self.not_required.toggle_mode((d - 1) as usize);
                }
            }
            return;
        }
        self.insert_char(c);
    }

    /// Space toggles the not-required checkbox, or types into a text
    /// field.
    pub fn space(&mut self) {
        if self.focused_field == Self::FIELD_NOT_REQUIRED {
            self.ob_call_not_required = !self.ob_call_not_required;
        } else {
            self.insert_char(' ');
        }
    }

    pub fn backspace(&mut self) {
        if self.ob_call_not_required {
            match self.focused_field {
                Self::FIELD_NR_EMAIL => {
                    self.not_required.email.pop();
                }
                Self::FIELD_NR_REASON => {
                    self.not_required.reason.pop();
                }
                _ => {}
            }
            return;
        }
        match self.focused_field {
            Self::FIELD_INVITE => {
                self.invite_email.pop();
            }
            Self::FIELD_RESCHEDULE_REASON => {
                self.reschedule_reason.pop();
            }
            _ => {}
        }
    }

    /// Add the typed email to the participant list.
    pub fn invite(&mut self) {
        let email = self.invite_email.trim().to_string();
        if email.is_empty() || !email.contains('@') {
            return;
        }
        if self.participants.iter().any(|p| p.email == email) {
            self.invite_email.clear();
            return;
        }
        self.participants.push(Participant {
            name: email.clone(),
            email,
            kind: ParticipantKind::User,
        });
        self.invite_email.clear();
    }

    /// Remove an invited participant; the team entry stays.
    pub fn remove_participant(&mut self, index: usize) {
        if let Some(p) = self.participants.get(index) {
            if p.kind == ParticipantKind::User {
                self.participants.remove(index);
            }
        }
    }

    /// Validate and produce the payload. `for_reschedule` additionally
    /// requires a non-empty reschedule reason.
    pub fn validate(&mut self, for_reschedule: bool) -> Option<SchedulePayload> {
        if self.ob_call_not_required {
            return match self.not_required.validate() {
                Some(waived) => {
                    self.errors.clear();
                    Some(SchedulePayload::NotRequired(waived))
                }
                None => {
                    self.errors = self.not_required.errors.clone();
                    None
                }
            };
        }

        let mut errors = Vec::new();
        let Some(date) = self.selected_date() else {
            errors.push(FormError::required("date"));
            self.errors = errors;
            return None;
        };
        if for_reschedule && self.reschedule_reason.trim().is_empty() {
            errors.push(FormError::required("reschedule reason"));
        }
        if !errors.is_empty() {
            self.errors = errors;
            return None;
        }
        self.errors.clear();

        let timezone = TIMEZONE_OPTIONS
            .get(self.timezone_index)
            .copied()
            .unwrap_or(TIMEZONE_OPTIONS[0]);
        Some(SchedulePayload::Call(CallSchedule {
            date: date.to_string(),
            timezone: timezone.to_string(),
            start_time: format_time_12h(self.start_time()),
            end_time: format_time_12h(self.end_time()),
            duration_minutes: self.duration_minutes(),
            participants: self.participants.iter().map(|p| p.email.clone()).collect(),
            reschedule_reason: if for_reschedule {
                Some(self.reschedule_reason.trim().to_string())
            } else {
                None
            },
        }))
    }
}

/// Reduced form shown when the operator toggles "OB call not required".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotRequiredForm {
    pub managers: Vec<PocName>,
    pub manager_index: usize,
    pub communication_modes: Vec<String>,
    pub email: String,
    pub reason: String,
    pub errors: Vec<FormError>,
}

impl NotRequiredForm {
    pub fn new(managers: &[PocName]) -> Self {
        NotRequiredForm {
            managers: managers.to_vec(),
            manager_index: 0,
            communication_modes: vec!["Email".to_string()],
            email: String::new(),
            reason: String::new(),
            errors: Vec::new(),
        }
    }

    pub fn selected_manager(&self) -> Option<&PocName> {
        self.managers.get(self.manager_index)
    }

    pub fn toggle_mode(&mut self, index: usize) {
        let Some(mode) = COMMUNICATION_OPTIONS.get(index) else {
            return;
        };
        if let Some(pos) = self.communication_modes.iter().position(|m| m == mode) {
            self.communication_modes.remove(pos);
        } else {
            self.communication_modes.push(mode.to_string());
        }
    }

    pub fn validate(&mut self) -> Option<ObNotRequired> {
        let mut errors = Vec::new();
        let manager = match self.selected_manager() {
            Some(m) => m.name.clone(),
            None => {
                errors.push(FormError::required("onboarding manager"));
                String::new()
            }
        };
        if self.communication_modes.is_empty() {
            errors.push(FormError::required("mode of communication"));
        }
        if self.email.trim().is_empty() || !self.email.contains('@') {
            errors.push(FormError {
                field: "email",
                message: "A valid email is required".to_string(),
            });
        }
        if self.reason.trim().is_empty() {
            errors.push(FormError::required("reason"));
        }
        if !errors.is_empty() {
            self.errors = errors;
            return None;
        }
        self.errors.clear();
        Some(ObNotRequired {
            onboarding_manager: manager,
            communication_modes: self.communication_modes.clone(),
            email: self.email.trim().to_string(),
            reason: self.reason.trim().to_string(),
        })
    }
}

// ============================================================================
// Confirmation and reason forms
// ============================================================================

/// Meet Done confirmation: a yes/no with a mandatory manager pick.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MeetDoneForm {
    pub managers: Vec<PocName>,
    pub manager_index: usize,
}

impl MeetDoneForm {
    pub fn new(managers: &[PocName]) -> Self {
        MeetDoneForm {
            managers: managers.to_vec(),
            manager_index: 0,
        }
    }

    pub fn cycle(&mut self, forward: bool) {
        let len = self.managers.len();
        if len == 0 {
            return;
        }
        self.manager_index = if forward {
            (self.manager_index + 1) % len
        } else {
            (self.manager_index + len - 1) % len
        };
    }

    pub fn selected_manager(&self) -> Option<&PocName> {
        self.managers.get(self.manager_index)
    }

    /// Confirm stays disabled until a manager is selected.
    pub fn can_confirm(&self) -> bool {
        self.selected_manager()
            .map(|m| !m.name.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Free-text reason dialog (meet cancellation).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReasonForm {
    pub reason: String,
}

impl ReasonForm {
    pub fn insert_char(&mut self, c: char) {
        self.reason.push(c);
    }

    pub fn backspace(&mut self) {
        self.reason.pop();
    }

    /// Confirm stays disabled while the reason is empty or whitespace.
    pub fn can_confirm(&self) -> bool {
        !self.reason.trim().is_empty()
    }

    pub fn clear(&mut self) {
        self.reason.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn managers() -> Vec<PocName> {
        vec![
            PocName {
                id: "ob-1".to_string(),
                name: "Prakash Kumar".to_string(),
            },
            PocName {
                id: "ob-2".to_string(),
                name: "Ritika Agarwal".to_string(),
            },
        ]
    }

    #[test]
    fn test_handover_defaults_validate() {
        let mut form = HandoverForm::default();
        let details = form.validate().expect("defaults are complete");
        assert_eq!(details.input_platforms, vec!["FTP"]);
        assert_eq!(details.output_dms, "VAuto");
        assert_eq!(details.client_languages, vec!["English"]);
        assert!(form.errors.is_empty());
    }

    #[test]
    fn test_handover_requires_platforms_and_text() {
        let mut form = HandoverForm::default();
        form.input.platforms.clear();
        form.notes = "   ".to_string();
        assert!(form.validate().is_none());
        let fields: Vec<&str> = form.errors.iter().map(|e| e.field).collect();
        assert!(fields.contains(&"input platforms"));
        assert!(fields.contains(&"important notes"));

        // Fixing the fields clears the errors on the next validate
        form.toggle_option_for_test(HandoverForm::FIELD_INPUT_PLATFORMS, 2);
        form.notes = "NA".to_string();
        assert!(form.validate().is_some());
        assert!(form.errors.is_empty());
    }

    #[test]
    fn test_same_as_input_copies_delivery_mode() {
        let mut form = HandoverForm::default();
        form.input.dms = "CDK".to_string();
        form.input.platforms = vec!["API".to_string(), "Web".to_string()];
        form.set_same_as_input(true);
        assert_eq!(form.output.dms, "CDK");
        assert_eq!(form.output.platforms, vec!["API", "Web"]);

        // While checked, later input platform edits propagate
        form.focused_field = HandoverForm::FIELD_INPUT_PLATFORMS;
        form.toggle_option(2); // FTP
        assert!(form.output.platforms.contains(&"FTP".to_string()));
    }

    #[test]
    fn test_schedule_end_time_follows_duration() {
        let today = civil::date(2026, 8, 7);
        let mut form = ScheduleForm::new(today, &managers());
        assert_eq!(format_time_12h(form.start_time()), "8:00 PM");
        assert_eq!(format_time_12h(form.end_time()), "8:30 PM");
        form.duration_index = 2; // 1 hour
        assert_eq!(format_time_12h(form.end_time()), "9:00 PM");
    }

    #[test]
    fn test_end_time_clamps_at_midnight() {
        assert_eq!(
            end_time(civil::time(23, 45, 0, 0), 60),
            civil::time(23, 59, 0, 0)
        );
    }

    #[test]
    fn test_schedule_validates_to_call_payload() {
        let today = civil::date(2026, 8, 7);
        let mut form = ScheduleForm::new(today, &managers());
        let payload = form.validate(false).expect("defaults are bookable");
        match payload {
            SchedulePayload::Call(call) => {
                assert_eq!(call.date, "2026-08-07");
                assert_eq!(call.timezone, "Asia/Kolkata (IST)");
                assert_eq!(call.start_time, "8:00 PM");
                assert_eq!(call.end_time, "8:30 PM");
                assert_eq!(call.duration_minutes, 30);
                assert_eq!(call.reschedule_reason, None);
                assert_eq!(call.participants.len(), 1);
            }
            other => panic!("expected call payload, got {:?}", other),
        }
    }

    #[test]
    fn test_reschedule_requires_reason() {
        let today = civil::date(2026, 8, 7);
        let mut form = ScheduleForm::new(today, &managers());
        assert!(form.validate(true).is_none());
        assert_eq!(form.errors[0].field, "reschedule reason");

        form.reschedule_reason = "client asked to move the call".to_string();
        let payload = form.validate(true).unwrap();
        match payload {
            SchedulePayload::Call(call) => {
                assert_eq!(
                    call.reschedule_reason.as_deref(),
                    Some("client asked to move the call")
                );
            }
            other => panic!("expected call payload, got {:?}", other),
        }
    }

    #[test]
    fn test_not_required_branch() {
        let today = civil::date(2026, 8, 7);
        let mut form = ScheduleForm::new(today, &managers());
        form.ob_call_not_required = true;
        assert!(form.validate(false).is_none()); // email + reason missing

        form.not_required.email = "ops@sunrise.example".to_string();
        form.not_required.reason = "already onboarded elsewhere".to_string();
        let payload = form.validate(false).unwrap();
        match payload {
            SchedulePayload::NotRequired(waived) => {
                assert_eq!(waived.onboarding_manager, "Prakash Kumar");
                assert_eq!(waived.communication_modes, vec!["Email"]);
            }
            other => panic!("expected not-required payload, got {:?}", other),
        }
    }

    #[test]
    fn test_invite_dedupes_and_requires_at() {
        let today = civil::date(2026, 8, 7);
        let mut form = ScheduleForm::new(today, &managers());
        form.invite_email = "not-an-email".to_string();
        form.invite();
        assert_eq!(form.participants.len(), 1);

        form.invite_email = "dana@sunrise.example".to_string();
        form.invite();
        assert_eq!(form.participants.len(), 2);

        form.invite_email = "dana@sunrise.example".to_string();
        form.invite();
        assert_eq!(form.participants.len(), 2);

        // The team entry cannot be removed
        form.remove_participant(0);
        assert_eq!(form.participants.len(), 2);
        form.remove_participant(1);
        assert_eq!(form.participants.len(), 1);
    }

    #[test]
    fn test_meet_done_form_requires_manager() {
        let form = MeetDoneForm::new(&[]);
        assert!(!form.can_confirm());

        let mut form = MeetDoneForm::new(&managers());
        assert!(form.can_confirm());
        form.cycle(true);
        assert_eq!(form.selected_manager().unwrap().name, "Ritika Agarwal");
        form.cycle(true);
        assert_eq!(form.selected_manager().unwrap().name, "Prakash Kumar");
    }

    #[test]
    fn test_reason_form_whitespace_disabled() {
        let mut form = ReasonForm::default();
        assert!(!form.can_confirm());
        form.reason = "   ".to_string();
        assert!(!form.can_confirm());
        form.reason = "client unavailable".to_string();
        assert!(form.can_confirm());
    }

    #[test]
    fn test_time_slots_cover_day_in_quarter_hours() {
        assert_eq!(TIME_SLOTS.len(), 96);
        assert_eq!(TIME_SLOTS[0], civil::time(0, 0, 0, 0));
        assert_eq!(TIME_SLOTS[95], civil::time(23, 45, 0, 0));
    }

    #[test]
    fn test_next_30_days() {
        let days = next_30_days(civil::date(2026, 8, 7));
        assert_eq!(days.len(), 30);
        assert_eq!(days[0], civil::date(2026, 8, 7));
        assert_eq!(days[29], civil::date(2026, 9, 5));
    }

    #[test]
    fn test_format_date_option() {
        assert_eq!(format_date_option(civil::date(2025, 8, 28)), "Thu, 28 Aug 2025");
    }

    impl HandoverForm {
        fn toggle_option_for_test(&mut self, field: usize, index: usize) {
            self.focused_field = field;
            self.toggle_option(index);
        }
    }
}
