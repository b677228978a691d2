//! Theme system for TUI colors and styles
//!
//! Badge colors follow the pipeline semantics: yellow for waiting states,
//! blue for booked, green for success, red for hard stops.

use iocraft::prelude::Color;

use crate::types::{Stage, SubStage};

const GREY: Color = Color::Rgb {
    r: 120,
    g: 120,
    b: 120,
};

const ORANGE: Color = Color::Rgb {
    r: 255,
    g: 165,
    b: 0,
};

/// Theme configuration for TUI components
#[derive(Debug, Clone)]
pub struct Theme {
    pub border: Color,
    pub border_focused: Color,
    pub background: Color,
    pub text: Color,
    pub text_dimmed: Color,
    pub highlight: Color,
    pub id_color: Color,
    pub metric: Color,
    pub error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            border: GREY,
            border_focused: Color::Blue,
            background: Color::Reset,
            text: Color::White,
            text_dimmed: GREY,
            highlight: Color::Blue,
            id_color: Color::Cyan,
            metric: Color::Magenta,
            error: Color::Red,
        }
    }
}

impl Theme {
    pub fn stage_color(&self, stage: Stage) -> Color {
        match stage {
            Stage::ContractInitiated => Color::Blue,
            Stage::Contracted => Color::Yellow,
            Stage::Onboarding => ORANGE,
            Stage::Live => Color::Green,
            Stage::Churned => Color::Red,
            Stage::DropOff => Color::Red,
        }
    }

    pub fn sub_stage_color(&self, sub_stage: &SubStage) -> Color {
        match sub_stage {
            SubStage::MeetPending => Color::Yellow,
            SubStage::MeetScheduled => Color::Blue,
            SubStage::MeetDone => Color::Green,
            SubStage::MeetCancelled => Color::Red,
            SubStage::DropOff => ORANGE,
            SubStage::MeetReschedule => Color::Yellow,
            SubStage::Inactive => GREY,
            SubStage::Other(_) => GREY,
        }
    }

    pub fn account_type_color(&self, account_type: &str) -> Color {
        match account_type {
            "Group Dealer" => Color::Blue,
            "Marketplace" => Color::Green,
            "Partner" => Color::Yellow,
            "Auction Platform" => Color::Magenta,
            "Individual Dealer" => Color::Magenta,
            "Car Rental Leasing" => Color::Yellow,
            _ => GREY,
        }
    }
}

/// Global theme instance
pub static THEME: std::sync::LazyLock<Theme> = std::sync::LazyLock::new(Theme::default);

/// Get a reference to the global theme
pub fn theme() -> &'static Theme {
    &THEME
}
