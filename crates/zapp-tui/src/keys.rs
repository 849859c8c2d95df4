//! Keyboard dispatch — one global table mapping keys to actions.
//!
//! The search input swallows everything while it has focus (the App handles
//! that before consulting this table); Escape handling is two-stage — the
//! first press blurs the input, the next one lands here and clears the
//! query.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::action::{Action, Tab};
use crate::slots::FilterSlots;

/// Read-only context the dispatch table needs.
pub struct KeyContext<'a> {
    pub tab: Tab,
    pub slots: &'a FilterSlots,
    /// Items moved per Ctrl-u / Ctrl-d step.
    pub scroll_step: usize,
}

pub fn handle_key(key: KeyEvent, ctx: &KeyContext) -> Vec<Action> {
    // Saved-filter slots: bare digits apply, Alt+digits save, Ctrl+digits
    // delete.  A bare digit with no filter in the slot does nothing.
    if let KeyCode::Char(c) = key.code {
        if let Some(slot) = c.to_digit(10) {
            let slot = slot as u8;
            if key.modifiers == KeyModifiers::ALT {
                return vec![Action::SaveSlot(slot)];
            }
            if key.modifiers == KeyModifiers::CONTROL {
                return vec![Action::DeleteSlot(slot)];
            }
            if key.modifiers.is_empty() {
                return match ctx.slots.get(slot) {
                    Some(_) => vec![Action::ApplySlot(slot)],
                    None => vec![],
                };
            }
        }
    }

    let step = ctx.scroll_step as isize;
    let none = key.modifiers.is_empty();
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('q') if none => vec![Action::Quit],
        KeyCode::Char('c') if ctrl => vec![Action::Quit],
        KeyCode::Esc => vec![Action::ClearSearch],
        KeyCode::Tab if none => vec![Action::NextTab],

        KeyCode::Char('j') if none => vec![Action::MoveFocus(1)],
        KeyCode::Down => vec![Action::MoveFocus(1)],
        KeyCode::Char('k') if none => vec![Action::MoveFocus(-1)],
        KeyCode::Up => vec![Action::MoveFocus(-1)],
        KeyCode::Char('u') if ctrl => vec![Action::MoveFocus(-step)],
        KeyCode::PageUp => vec![Action::MoveFocus(-step)],
        KeyCode::Char('d') if ctrl => vec![Action::MoveFocus(step)],
        KeyCode::PageDown => vec![Action::MoveFocus(step)],
        KeyCode::Char('g') if none => vec![Action::PageStart],
        KeyCode::Home => vec![Action::PageStart],
        KeyCode::Char('G') => vec![Action::PageEnd],
        KeyCode::End => vec![Action::PageEnd],

        KeyCode::Char('l') if none => vec![Action::SelectFocused],
        KeyCode::Right => vec![Action::SelectFocused],
        KeyCode::Enter => vec![Action::Activate],
        KeyCode::Char('o') if none => vec![Action::Activate],

        KeyCode::Char('/') => vec![Action::FocusSearch],
        KeyCode::Char('i') if none => vec![Action::FocusSearch],
        KeyCode::Char('d') if none => vec![Action::ClearSearch],
        KeyCode::Char('D') => vec![Action::ClearAllFilters],
        KeyCode::Char('m') if none => vec![Action::ToggleDisplayMode],

        KeyCode::Char('f') if none && ctx.tab == Tab::Channels => vec![Action::ToggleFavorite],
        KeyCode::Char('y') if none && ctx.tab.shows_channels() => vec![Action::CopyUrl],

        KeyCode::Char(' ') if none && ctx.tab == Tab::Groups => vec![Action::ToggleGroupEnabled],
        KeyCode::Char('a') if none && ctx.tab == Tab::Groups => vec![Action::EnableAllGroups],
        KeyCode::Char('x') if none && ctx.tab == Tab::Groups => vec![Action::DisableAllGroups],

        _ => vec![],
    }
}
