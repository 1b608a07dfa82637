use std::borrow::Cow;

use super::state::{AppState, CARD_WIDTH};
use crate::catalog::types::MediaKind;
use crate::loader::{EnrichedContentItem, VerificationStatus};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

const CARD_HEIGHT: u16 = 5;

pub fn draw(f: &mut Frame, state: &AppState, spinner_frame: u8) {
    let overlay_height = if state.debug.overlay { 4 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(CARD_HEIGHT + 2),
            Constraint::Length(1),
            Constraint::Length(overlay_height),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, state, chunks[0], spinner_frame);
    // A row with nothing to show is not drawn at all, not even its frame.
    if state.row.should_render() {
        draw_row(f, state, chunks[1], spinner_frame);
        draw_selected(f, state, chunks[2]);
    }
    if state.debug.overlay {
        draw_overlay(f, state, chunks[3]);
    }
    draw_logs(f, state, chunks[4]);
    draw_footer(f, chunks[5]);
}

fn draw_header(f: &mut Frame, state: &AppState, area: Rect, spinner_frame: u8) {
    let cursor = &state.row.cursor;
    let activity = if cursor.is_in_flight() {
        let ch = SPINNER_FRAMES[(spinner_frame as usize) % SPINNER_FRAMES.len()];
        Span::styled(format!(" {} loading", ch), Style::default().fg(Color::Cyan))
    } else if cursor.is_exhausted() {
        Span::styled(" done", Style::default().fg(Color::Green))
    } else {
        Span::styled(" idle", Style::default().fg(Color::DarkGray))
    };

    let line = Line::from(vec![
        Span::raw(format!(
            " Checked: {}/{} | Showing: {} | Up: {}",
            cursor.offset(),
            cursor.len(),
            state.row.visible.len(),
            state.uptime(),
        )),
        Span::raw(" |"),
        activity,
    ]);

    let block = Block::default()
        .title(" Trailer Row ")
        .borders(Borders::ALL);
    f.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_row(f: &mut Frame, state: &AppState, area: Rect, spinner_frame: u8) {
    let entries = state.row.visible.entries();
    let block = Block::default()
        .title(format!(" {} ", state.row.title))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let per_view = AppState::cards_per_view(inner.width as usize);
    for (slot, (idx, entry)) in entries
        .iter()
        .enumerate()
        .skip(state.first_card)
        .take(per_view)
        .enumerate()
    {
        let x = inner.x + (slot * CARD_WIDTH) as u16;
        let width = (CARD_WIDTH as u16 - 1).min(inner.right().saturating_sub(x));
        if width < 4 {
            break;
        }
        let card_area = Rect::new(x, inner.y, width, inner.height.min(CARD_HEIGHT));
        draw_card(f, entry, card_area, idx == state.selected, spinner_frame);
    }
}

fn draw_card(f: &mut Frame, entry: &EnrichedContentItem, area: Rect, selected: bool, spinner_frame: u8) {
    let text_width = area.width.saturating_sub(2) as usize;
    let kind = match entry.item.media_kind {
        MediaKind::Movie => "Movie",
        MediaKind::Series => "Series",
    };
    let status = match entry.status {
        VerificationStatus::Pending => {
            let ch = SPINNER_FRAMES[(spinner_frame as usize) % SPINNER_FRAMES.len()];
            Span::styled(format!("{} checking", ch), Style::default().fg(Color::DarkGray))
        }
        VerificationStatus::VerifiedHasTrailer => {
            Span::styled("\u{25b6} trailer", Style::default().fg(Color::Green))
        }
        // Rejected items never reach the visible list.
        VerificationStatus::RejectedNoTrailer | VerificationStatus::RejectedError => Span::raw(""),
    };

    let lines = vec![
        Line::from(Span::styled(
            truncate_with_ellipsis(&entry.item.title, text_width).into_owned(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(kind, Style::default().fg(Color::DarkGray))),
        Line::from(status),
    ];

    let border_style = if selected {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default().borders(Borders::ALL).border_style(border_style);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_selected(f: &mut Frame, state: &AppState, area: Rect) {
    let max_width = area.width as usize;
    let line = match state.row.visible.entries().get(state.selected) {
        Some(entry) => match &entry.trailer {
            Some(trailer) => Line::from(vec![
                Span::styled("  \u{25b6} ", Style::default().fg(Color::Green)),
                Span::raw(
                    truncate_with_ellipsis(&trailer.watch_url(), max_width.saturating_sub(4))
                        .into_owned(),
                ),
            ]),
            None => Line::from(Span::styled(
                "  checking for a trailer...",
                Style::default().fg(Color::DarkGray),
            )),
        },
        None => Line::from(""),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_overlay(f: &mut Frame, state: &AppState, area: Rect) {
    let cursor = &state.row.cursor;
    let stats = &state.row.stats;
    let line = Line::from(vec![
        Span::styled(" offset ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{}/{}", cursor.offset(), cursor.len())),
        Span::styled(" | batch size ", Style::default().fg(Color::DarkGray)),
        Span::raw(cursor.batch_size().to_string()),
        Span::styled(" | dispatched ", Style::default().fg(Color::DarkGray)),
        Span::raw(cursor.dispatched().to_string()),
        Span::styled(" | in flight ", Style::default().fg(Color::DarkGray)),
        Span::raw(if cursor.is_in_flight() { "yes" } else { "no" }),
        Span::styled(" | pending ", Style::default().fg(Color::DarkGray)),
        Span::raw(state.row.visible.pending_count().to_string()),
        Span::styled(" | verified ", Style::default().fg(Color::DarkGray)),
        Span::styled(stats.verified.to_string(), Style::default().fg(Color::Green)),
        Span::styled(" | no trailer ", Style::default().fg(Color::DarkGray)),
        Span::styled(stats.no_trailer.to_string(), Style::default().fg(Color::Yellow)),
        Span::styled(" | failed ", Style::default().fg(Color::DarkGray)),
        Span::styled(stats.failed.to_string(), Style::default().fg(Color::Red)),
    ]);
    let embed = state
        .row
        .visible
        .entries()
        .get(state.selected)
        .and_then(|e| e.trailer.as_ref())
        .map_or_else(|| "-".to_string(), |t| t.embed_url());
    let embed_line = Line::from(vec![
        Span::styled(" embed ", Style::default().fg(Color::DarkGray)),
        Span::raw(embed),
    ]);
    let block = Block::default().title(" Debug ").borders(Borders::ALL);
    f.render_widget(Paragraph::new(vec![line, embed_line]).block(block), area);
}

fn draw_logs(f: &mut Frame, state: &AppState, area: Rect) {
    let max_width = area.width.saturating_sub(2) as usize; // borders
    let visible_lines = area.height.saturating_sub(2) as usize;

    let lines: Vec<Line> = state
        .logs
        .iter()
        .rev()
        .take(visible_lines)
        .map(|l| {
            let color = match l.level.as_str() {
                "ERROR" => Color::Red,
                "WARN" => Color::Yellow,
                "PLAY" => Color::Cyan,
                _ => Color::DarkGray,
            };
            let prefix = format!(" {} [{}] ", l.time, l.level);
            let msg_max = max_width.saturating_sub(prefix.len());
            let msg = truncate_with_ellipsis(&l.message, msg_max);
            Line::from(vec![
                Span::styled(prefix, Style::default().fg(color)),
                Span::raw(msg.into_owned()),
            ])
        })
        .collect();

    let block = Block::default().title(" Events ").borders(Borders::ALL);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_footer(f: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled("  [q]", Style::default().fg(Color::Yellow)),
        Span::raw("uit  "),
        Span::styled("[\u{2190}/\u{2192}]", Style::default().fg(Color::Yellow)),
        Span::raw(" scroll  "),
        Span::styled("[Enter]", Style::default().fg(Color::Yellow)),
        Span::raw(" play  "),
        Span::styled("[d]", Style::default().fg(Color::Yellow)),
        Span::raw("ebug  "),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn truncate_with_ellipsis(s: &str, max_width: usize) -> Cow<'_, str> {
    let char_count = s.chars().count();
    if char_count <= max_width {
        Cow::Borrowed(s)
    } else if max_width <= 3 {
        Cow::Owned(".".repeat(max_width))
    } else {
        let end = s
            .char_indices()
            .nth(max_width - 3)
            .map(|(i, _)| i)
            .unwrap_or(s.len());
        Cow::Owned(format!("{}...", &s[..end]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::{ContentItem, ItemKey};
    use crate::loader::{RowState, TrailerRef};
    use crate::settings::DebugSettings;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_truncate() {
        assert_eq!(truncate_with_ellipsis("Inception", 20), "Inception");
        assert_eq!(truncate_with_ellipsis("The Lord of the Rings", 10), "The Lor...");
        assert_eq!(truncate_with_ellipsis("abcdef", 2), "..");
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_row_drawn_with_verified_card() {
        let mut row = RowState::new("Trending Now", 2, 2);
        row.cursor.try_begin();
        row.visible.push_pending(ContentItem::new(1, "Inception", MediaKind::Movie));
        row.visible.push_pending(ContentItem::new(2, "Dark", MediaKind::Series));
        row.visible.mark_verified(ItemKey::movie(1), TrailerRef::new("YoHD9XEInc0"));
        let state = AppState::new(row, DebugSettings::default());

        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|f| draw(f, &state, 0)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("Trending Now"));
        assert!(text.contains("Inception"));
        assert!(text.contains("checking"));
        assert!(text.contains("YoHD9XEInc0"));
    }

    #[test]
    fn test_overlay_shows_embed_url_of_selection() {
        let mut row = RowState::new("Trending Now", 1, 1);
        row.cursor.try_begin();
        row.visible.push_pending(ContentItem::new(1, "Inception", MediaKind::Movie));
        row.visible.mark_verified(ItemKey::movie(1), TrailerRef::new("YoHD9XEInc0"));
        let debug = DebugSettings { overlay: true, ..DebugSettings::default() };
        let state = AppState::new(row, debug);

        let mut terminal = Terminal::new(TestBackend::new(160, 30)).unwrap();
        terminal.draw(|f| draw(f, &state, 0)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("Debug"));
        assert!(text.contains("https://www.youtube.com/embed/YoHD9XEInc0"));
    }

    #[test]
    fn test_empty_row_not_drawn() {
        let mut row = RowState::new("Nothing Here", 6, 6);
        row.cursor.try_begin();
        row.cursor.settle();
        let state = AppState::new(row, DebugSettings::default());

        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|f| draw(f, &state, 0)).unwrap();
        assert!(!buffer_text(&terminal).contains("Nothing Here"));
    }
}
