//! SearchInput — wraps tui-input for the global search field.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::theme::{C_MUTED, C_SEARCH_BG, C_SEARCH_FG};

pub enum SearchInputAction {
    Edited(String),
    /// Focus left the input (Esc or Enter); the text is kept as-is.
    Blurred,
}

pub struct SearchInput {
    input: Input,
    active: bool,
}

impl SearchInput {
    pub fn new() -> Self {
        Self {
            input: Input::default(),
            active: false,
        }
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn text(&self) -> &str {
        self.input.value()
    }

    pub fn set_value(&mut self, value: &str) {
        self.input = Input::new(value.to_string());
    }

    /// Handle a key event while the input has focus.
    ///
    /// Esc blurs without side effects (the global handler owns the
    /// clear-on-second-Esc behaviour); Enter blurs keeping the text.
    pub fn handle_key(&mut self, key: KeyEvent) -> SearchInputAction {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                self.active = false;
                SearchInputAction::Blurred
            }
            _ => {
                self.input
                    .handle_event(&ratatui::crossterm::event::Event::Key(key));
                SearchInputAction::Edited(self.input.value().to_string())
            }
        }
    }

    /// Render the search bar into `area`.
    pub fn draw(&self, frame: &mut Frame, area: Rect, searching: bool) {
        let scroll = self
            .input
            .visual_scroll(area.width.saturating_sub(4) as usize);
        let value = self.input.value();
        let display = if value.is_empty() && !self.active {
            Span::styled("/ search channels...", Style::default().fg(C_MUTED))
        } else {
            Span::styled(
                format!("/ {}", &value[scroll..]),
                Style::default().fg(C_SEARCH_FG),
            )
        };

        let mut spans = vec![display];
        if searching {
            spans.push(Span::styled(
                "  searching…",
                Style::default().fg(C_MUTED),
            ));
        }

        let paragraph =
            Paragraph::new(Line::from(spans)).style(Style::default().bg(C_SEARCH_BG));
        frame.render_widget(paragraph, area);

        if self.active {
            let cursor_x = area.x + 2 + (self.input.visual_cursor().saturating_sub(scroll)) as u16;
            frame.set_cursor_position((cursor_x.min(area.x + area.width.saturating_sub(1)), area.y));
        }
    }
}

impl Default for SearchInput {
    fn default() -> Self {
        Self::new()
    }
}
