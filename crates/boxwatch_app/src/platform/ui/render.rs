use boxwatch_core::{
    ActivityKind, AppViewModel, InspectorPhase, InspectorView, PageLink, StatusIcon, UnitView,
    VisualClass,
};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::layout::{self, Areas, GRID_CELL_WIDTH};
use super::theme::*;
use crate::platform::keys::{Prompt, UiState};

pub fn draw(frame: &mut Frame<'_>, view: &AppViewModel, ui: &UiState) {
    let screen = frame.size();
    let areas: Areas = layout::split(screen);

    draw_header(frame, areas.header, view);
    draw_grid(frame, areas.grid, view, ui);
    draw_activity(frame, areas.activity, view);
    draw_pagination(frame, areas.pagination, view);
    draw_footer(frame, areas.footer, ui.prompt.as_ref());

    if let Some(inspector) = &view.inspector {
        draw_inspector(frame, screen, inspector);
    }
}

fn draw_header(frame: &mut Frame<'_>, area: Rect, view: &AppViewModel) {
    let muted = Style::default().fg(THEME_MUTED);
    let line = Line::from(vec![
        Span::styled("Server ", muted),
        Span::styled(view.server_address.clone(), Style::default().fg(THEME_PRIMARY)),
        Span::styled("  │  ", muted),
        Span::styled("Location ", muted),
        Span::styled(view.location.clone(), Style::default().fg(THEME_TEXT)),
        Span::styled("  │  ", muted),
        Span::styled(view.page_info.clone(), Style::default().fg(THEME_TEXT)),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(THEME_PRIMARY))
        .title(" Boxwatch ");
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_grid(frame: &mut Frame<'_>, area: Rect, view: &AppViewModel, ui: &UiState) {
    let columns = layout::grid_columns(area);
    let visible_rows = layout::grid_rows(area);
    let selected = ui.selected.min(view.units.len().saturating_sub(1));
    let first_row = layout::first_visible_row(selected / columns, visible_rows);

    let lines: Vec<Line> = view
        .units
        .chunks(columns)
        .enumerate()
        .skip(first_row)
        .take(visible_rows)
        .map(|(row, units)| {
            let spans = units
                .iter()
                .enumerate()
                .map(|(col, unit)| unit_cell(unit, row * columns + col == selected))
                .collect::<Vec<_>>();
            Line::from(spans)
        })
        .collect();

    let title = if view.units.is_empty() && view.page_ready {
        " Boxes (none) ".to_string()
    } else {
        format!(" Boxes · page {} of {} ", view.current_page, view.total_pages.max(1))
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(THEME_MUTED))
        .title(title);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn unit_cell(unit: &UnitView, selected: bool) -> Span<'static> {
    let glyph = match unit.icon {
        StatusIcon::Hourglass => '◷',
        StatusIcon::Spinner => '↻',
        StatusIcon::Check => '✓',
    };
    let color = match unit.class {
        Some(VisualClass::Running) => THEME_WARNING,
        Some(VisualClass::Finished) => THEME_SUCCESS,
        None => THEME_MUTED,
    };
    let width = usize::from(GRID_CELL_WIDTH) - 1;
    let text: String = format!("{glyph} {}", unit.label).chars().take(width).collect();
    let mut style = Style::default().fg(color);
    if selected {
        style = style.add_modifier(Modifier::REVERSED);
    }
    Span::styled(format!("{text:<width$} "), style)
}

fn draw_activity(frame: &mut Frame<'_>, area: Rect, view: &AppViewModel) {
    let items: Vec<ListItem> = view
        .activity
        .iter()
        .map(|item| {
            let color = match item.kind {
                ActivityKind::Log => THEME_TEXT,
                ActivityKind::Info => THEME_PRIMARY,
                ActivityKind::Error => THEME_ERROR,
            };
            ListItem::new(Line::from(vec![
                Span::styled(item.timestamp.clone(), Style::default().fg(THEME_MUTED)),
                Span::styled(" │ ", Style::default().fg(THEME_MUTED)),
                Span::styled(item.text.clone(), Style::default().fg(color)),
            ]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(THEME_MUTED))
        .title(format!(" Activity ({}) ", view.activity.len()));
    frame.render_widget(List::new(items).block(block), area);
}

fn draw_pagination(frame: &mut Frame<'_>, area: Rect, view: &AppViewModel) {
    let enabled = Style::default().fg(THEME_PRIMARY);
    let disabled = Style::default().fg(THEME_MUTED).add_modifier(Modifier::DIM);
    let spans: Vec<Span> = view
        .pagination
        .iter()
        .flat_map(|link| {
            let span = match *link {
                PageLink::Prev { enabled: on, .. } => {
                    Span::styled("« Prev", if on { enabled } else { disabled })
                }
                PageLink::Next { enabled: on, .. } => {
                    Span::styled("Next »", if on { enabled } else { disabled })
                }
                PageLink::Page { number, active: true } => Span::styled(
                    format!("[{number}]"),
                    Style::default().fg(THEME_TEXT).add_modifier(Modifier::BOLD),
                ),
                PageLink::Page { number, .. } => Span::styled(number.to_string(), enabled),
                PageLink::Ellipsis => Span::styled("…", Style::default().fg(THEME_MUTED)),
            };
            [span, Span::raw(" ")]
        })
        .collect();
    frame.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}

fn draw_footer(frame: &mut Frame<'_>, area: Rect, prompt: Option<&Prompt>) {
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(THEME_MUTED))
        .style(Style::default().bg(THEME_SURFACE));

    let line = match prompt {
        Some(prompt) => Line::from(vec![
            Span::styled(
                format!("{}: ", prompt.label()),
                Style::default().fg(THEME_PRIMARY).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("{}▏", prompt.text()), Style::default().fg(THEME_TEXT)),
            Span::styled("   enter submit · esc cancel", Style::default().fg(THEME_MUTED)),
        ]),
        None => help_line(&[
            ("←↑↓→", "Select"),
            ("Enter", "Inspect"),
            ("[ ]", "Page"),
            ("g", "Go to"),
            ("b/f", "Back/Fwd"),
            ("r", "Refresh"),
            ("s", "Server"),
            ("q", "Quit"),
        ]),
    };
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn help_line(shortcuts: &[(&'static str, &'static str)]) -> Line<'static> {
    let spans: Vec<Span> = shortcuts
        .iter()
        .enumerate()
        .flat_map(|(i, (key, desc))| {
            let mut spans = vec![
                Span::styled(
                    *key,
                    Style::default().fg(THEME_PRIMARY).add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!(" {desc}"), Style::default().fg(THEME_MUTED)),
            ];
            if i + 1 < shortcuts.len() {
                spans.push(Span::styled("  │  ", Style::default().fg(THEME_MUTED)));
            }
            spans
        })
        .collect();
    Line::from(spans)
}

fn draw_inspector(frame: &mut Frame<'_>, area: Rect, inspector: &InspectorView) {
    let popup = layout::centered(area, 70, 70);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Thick)
        .border_style(Style::default().fg(THEME_PRIMARY))
        .style(Style::default().bg(THEME_SURFACE))
        .title(format!(" Box {} ", inspector.unit));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    frame.render_widget(
        Paragraph::new(inspector.snapshot_text.as_str())
            .style(Style::default().fg(THEME_TEXT))
            .wrap(Wrap { trim: false }),
        parts[0],
    );

    let target = inspector.target_id;
    let (text, color) = match inspector.phase {
        InspectorPhase::Viewing => ("x reset · esc close".to_string(), THEME_MUTED),
        InspectorPhase::ConfirmingReset => (
            format!("Reset box {target}? y confirm · n cancel"),
            THEME_WARNING,
        ),
        InspectorPhase::Resetting => (format!("Resetting box {target}…"), THEME_WARNING),
    };
    frame.render_widget(
        Paragraph::new(text)
            .style(Style::default().fg(color))
            .alignment(Alignment::Center),
        parts[1],
    );
}
