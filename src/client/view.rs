use chrono::{DateTime, Utc};

use super::ClientError;
use crate::advisory::AdvisoryBand;

/// Foreground color applied once a reading is shown
pub const READING_FOREGROUND: &str = "white";

/// Everything the advisory screen displays
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub uv_panel_visible: bool,
    pub tips_panel_visible: bool,
    pub loader_visible: bool,
    pub uv_text_visible: bool,
    /// Formatted reading or an error message
    pub uv_text: String,
    pub foreground: Option<&'static str>,
    pub background: Option<&'static str>,
    pub title: Option<&'static str>,
    pub burn_time: Option<&'static str>,
    pub message: Option<&'static str>,
    pub tips: Vec<&'static str>,
    /// When the displayed reading arrived
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for View {
    fn default() -> Self {
        Self {
            uv_panel_visible: true,
            tips_panel_visible: false,
            loader_visible: false,
            uv_text_visible: true,
            uv_text: String::new(),
            foreground: None,
            background: None,
            title: None,
            burn_time: None,
            message: None,
            tips: Vec::new(),
            updated_at: None,
        }
    }
}

impl View {
    pub fn show_loading(&mut self) {
        self.loader_visible = true;
        self.uv_text_visible = false;
    }

    pub fn show_reading(&mut self, uv_index: f64, band: &AdvisoryBand, at: DateTime<Utc>) {
        self.loader_visible = false;
        self.uv_text_visible = true;
        self.uv_text = format!("{uv_index:.1}");
        self.foreground = Some(READING_FOREGROUND);
        self.background = Some(band.color);
        self.title = Some(band.title);
        self.burn_time = Some(band.burn_time);
        self.message = Some(band.message);
        self.updated_at = Some(at);
    }

    /// Replace the reading text with an error message. Band styling from an
    /// earlier reading stays in place.
    pub fn show_error(&mut self, error: ClientError) {
        self.loader_visible = false;
        self.uv_text_visible = true;
        self.uv_text = error.to_string();
    }

    /// Swap the UV panel and the tips panel. Revealing the tips panel refills
    /// the list from `tips`. Returns whether the tips panel is now shown.
    pub fn toggle_tips(&mut self, tips: &[&'static str]) -> bool {
        let showing_uv = self.uv_panel_visible;
        self.uv_panel_visible = !showing_uv;
        self.tips_panel_visible = showing_uv;

        if showing_uv {
            self.tips.clear();
            self.tips.extend_from_slice(tips);
        }

        showing_uv
    }
}

/// Presents a [`View`]. Called after every change.
pub trait Renderer {
    fn render(&mut self, view: &View);
}
