//! Rendering — tab bar, search bar, the active list, status line, toasts.
//!
//! Everything here is a pure projection of `App` state; nothing mutates the
//! session besides the ratatui list scroll offset.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};
use zapp_proto::gateway::Gateway;
use zapp_proto::model::Channel;

use crate::action::Tab;
use crate::app::App;
use crate::groups::DisplayMode;
use crate::theme::{
    style_default, style_secondary, style_selected, style_tab_active, C_FAVORITE, C_GROUP_ON,
    C_LOADING, C_MUTED, C_SECONDARY,
};

pub fn draw<G: Gateway + 'static>(frame: &mut Frame, app: &mut App<G>) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    draw_tabs(frame, chunks[0], app);
    app.input.draw(frame, chunks[1], app.search.is_searching);
    draw_list(frame, chunks[2], app);
    draw_status(frame, chunks[3], app);
    app.toast.draw(frame, area);
}

fn draw_tabs<G: Gateway + 'static>(frame: &mut Frame, area: Rect, app: &App<G>) {
    let mut spans: Vec<Span> = vec![Span::styled(" zapp ", style_secondary())];
    for tab in Tab::RING {
        let count = match tab {
            Tab::Channels => app.visible().len(),
            Tab::Favorites => app.session.favorites.len(),
            Tab::Groups => app.session.groups.len(),
            Tab::History => app.session.history.len(),
            Tab::Settings => app.channel_lists.len(),
        };
        let label = format!(" {} ({count}) ", tab.label());
        let style = if tab == app.tab {
            style_tab_active()
        } else {
            style_secondary()
        };
        spans.push(Span::styled(label, style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_list<G: Gateway + 'static>(frame: &mut Frame, area: Rect, app: &mut App<G>) {
    if app.session.loading {
        let msg = Paragraph::new(Line::from(Span::styled(
            "  loading channel list…",
            Style::default().fg(C_LOADING),
        )));
        frame.render_widget(msg, area);
        return;
    }

    let name_width = (area.width as usize * 2 / 3).max(16);
    let items: Vec<ListItem> = match app.tab {
        Tab::Channels => app
            .visible()
            .iter()
            .map(|c| channel_item(c, app.is_favorite(c), name_width))
            .collect(),
        Tab::Favorites => app
            .session
            .favorites
            .iter()
            .map(|c| channel_item(c, true, name_width))
            .collect(),
        Tab::History => app
            .session
            .history
            .iter()
            .map(|c| channel_item(c, app.is_favorite(c), name_width))
            .collect(),
        Tab::Groups => app
            .session
            .groups
            .iter()
            .map(|g| {
                let marker = if app.session.view.is_enabled(g) {
                    Span::styled("[x] ", Style::default().fg(C_GROUP_ON))
                } else {
                    Span::styled("[ ] ", Style::default().fg(C_MUTED))
                };
                ListItem::new(Line::from(vec![
                    marker,
                    Span::styled(g.clone(), style_default()),
                ]))
            })
            .collect(),
        Tab::Settings => app
            .channel_lists
            .iter()
            .map(|l| {
                let marker = if Some(l.id) == app.session.selected_list {
                    Span::styled("● ", Style::default().fg(C_GROUP_ON))
                } else if l.is_default {
                    Span::styled("◆ ", Style::default().fg(C_SECONDARY))
                } else {
                    Span::raw("  ")
                };
                let fetched = l
                    .last_fetched
                    .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
                    .map(|dt| {
                        format!(
                            "  fetched {}",
                            dt.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
                        )
                    })
                    .unwrap_or_else(|| "  never fetched".to_string());
                ListItem::new(Line::from(vec![
                    marker,
                    Span::styled(fit(&l.name, name_width), style_default()),
                    Span::styled(format!("  {}", l.source), style_secondary()),
                    Span::styled(fetched, Style::default().fg(C_MUTED)),
                ]))
            })
            .collect(),
    };

    if items.is_empty() {
        let hint = match app.tab {
            Tab::Settings => "  no channel lists on the backend",
            _ if app.session.selected_list.is_none() => {
                "  no channel list selected — Tab to settings, Enter to select one"
            }
            _ => "  nothing here",
        };
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(hint, style_secondary()))),
            area,
        );
        return;
    }

    app.list_state.select(Some(app.focused));
    let list = List::new(items).highlight_style(style_selected());
    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn channel_item<'a>(channel: &Channel, favorite: bool, name_width: usize) -> ListItem<'a> {
    let star = if favorite {
        Span::styled("★ ", Style::default().fg(C_FAVORITE))
    } else {
        Span::raw("  ")
    };
    let mut spans = vec![
        star,
        Span::styled(fit(&channel.name, name_width), style_default()),
    ];
    if !channel.group_title.is_empty() {
        spans.push(Span::styled(
            format!("  · {}", channel.group_title),
            style_secondary(),
        ));
    }
    if !channel.resolution.is_empty() {
        spans.push(Span::styled(
            format!("  {}", channel.resolution),
            Style::default().fg(C_MUTED),
        ));
    }
    ListItem::new(Line::from(spans))
}

fn draw_status<G: Gateway + 'static>(frame: &mut Frame, area: Rect, app: &App<G>) {
    let list_name = app
        .session
        .selected_list
        .and_then(|id| app.channel_lists.iter().find(|l| l.id == id))
        .map(|l| l.name.clone())
        .unwrap_or_else(|| "no list".to_string());

    let mode = match (app.session.view.mode, app.session.view.selected.as_deref()) {
        (DisplayMode::EnabledGroups, _) => format!(
            "enabled groups ({}/{})",
            app.session.view.enabled.len(),
            app.session.groups.len()
        ),
        (DisplayMode::AllGroups, None) => "all groups".to_string(),
        (DisplayMode::AllGroups, Some(g)) => format!("group: {g}"),
    };

    let mut spans = vec![
        Span::styled(format!(" {list_name} "), style_default()),
        Span::styled("· ", Style::default().fg(C_MUTED)),
        Span::styled(mode, style_secondary()),
    ];
    if let Some(channel) = &app.selected_channel {
        spans.push(Span::styled("  ▸ ", Style::default().fg(C_MUTED)));
        spans.push(Span::styled(channel.name.clone(), style_default()));
    }
    if !app.session.slots.all().is_empty() {
        let mut occupied: Vec<u8> = app
            .session
            .slots
            .all()
            .iter()
            .map(|f| f.slot_number)
            .collect();
        occupied.sort_unstable();
        let occupied: Vec<String> = occupied.iter().map(u8::to_string).collect();
        spans.push(Span::styled(
            format!("  slots {}", occupied.join(",")),
            Style::default().fg(C_MUTED),
        ));
    }
    if app.session.loading {
        spans.push(Span::styled("  loading…", Style::default().fg(C_LOADING)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Truncate `text` to at most `max` display columns, appending an ellipsis.
fn fit(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut width = 0;
    for ch in text.chars() {
        let cw = ch.width().unwrap_or(0);
        if width + cw > max.saturating_sub(1) {
            break;
        }
        out.push(ch);
        width += cw;
    }
    out.push('…');
    out
}
