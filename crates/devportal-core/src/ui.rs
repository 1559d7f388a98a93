use crate::keybinds::InputMode;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

/// Render the top title bar: application name plus a right-hand hint.
pub fn render_title_bar(frame: &mut Frame, area: Rect, title: &str, hint: &str) {
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", title),
            Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        ),
        Span::raw("  "),
        Span::styled(hint, Style::default().add_modifier(Modifier::DIM)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Render the bottom status bar showing the current mode and optional info.
pub fn render_status_bar(frame: &mut Frame, area: Rect, mode: InputMode, view_name: &str, info: &str) {
    let mode_color = match mode {
        InputMode::Normal => Color::Blue,
        InputMode::Insert => Color::Green,
        InputMode::Command => Color::Yellow,
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", mode.label()),
            Style::default()
                .fg(Color::Black)
                .bg(mode_color)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(view_name, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(info, Style::default().add_modifier(Modifier::DIM)),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the command-line input at the bottom of the screen.
pub fn render_command_line(frame: &mut Frame, area: Rect, input: &str, cursor_width: usize) {
    let line = Line::from(vec![
        Span::styled(":", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(input),
    ]);

    frame.render_widget(Paragraph::new(line), area);
    frame.set_cursor_position((area.x + 1 + cursor_width as u16, area.y));
}

/// Standard layout: title bar (1 line) + main content + status bar (1 line).
/// Returns (title_area, content_area, status_area).
pub fn standard_layout(area: Rect) -> (Rect, Rect, Rect) {
    let [title_area, content_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(area);

    (title_area, content_area, status_area)
}

/// Bordered block for a panel. Focused panels get a highlighted border.
pub fn panel_block(title: &str, focused: bool) -> Block<'_> {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(border_style)
}
