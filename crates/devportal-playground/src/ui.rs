use devportal_core::{popup::centered_rect, ui::panel_block};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::inspector::{self, StatusClass};
use crate::model::{HttpMethod, RowField};
use crate::request::RequestState;
use crate::view::{EditTarget, PanelFocus, PlaygroundView, ResponseTab, RowKind, Section, TargetField};

const SELECTED_BG: Color = Color::Gray;
const HINT_STYLE: Style = Style::new().fg(Color::DarkGray);

fn method_color(method: HttpMethod) -> Color {
    match method {
        HttpMethod::Get => Color::Green,
        HttpMethod::Post => Color::Yellow,
        HttpMethod::Put => Color::Blue,
        HttpMethod::Patch => Color::Rgb(255, 165, 0),
        HttpMethod::Delete => Color::Red,
    }
}

fn tab_style(active: bool, focused: bool) -> Style {
    match (active, focused) {
        (true, true) => Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        (true, false) => Style::default().fg(Color::White).add_modifier(Modifier::UNDERLINED),
        (false, _) => Style::default().fg(Color::DarkGray),
    }
}

/// Render the request panel on top, the response panel below and the
/// credential prompt over both when it is open.
pub fn render_playground(frame: &mut Frame, area: Rect, view: &PlaygroundView) {
    let [request_area, response_area] =
        Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);

    render_request_panel(frame, request_area, view, view.focus == PanelFocus::Request);
    render_response_panel(frame, response_area, view, view.focus == PanelFocus::Response);

    if view.credential_prompt.is_some() {
        render_credential_prompt(frame, area, view);
    }
}

// ── Request panel ────────────────────────────────────────────────────

fn render_request_panel(frame: &mut Frame, area: Rect, view: &PlaygroundView, focused: bool) {
    let block = panel_block("Request", focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height < 4 || inner.width < 10 {
        return;
    }

    let [url_area, key_area, tabs_area, content_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(inner);

    render_method_url_bar(frame, url_area, view);
    render_credential_line(frame, key_area, view);
    render_section_tabs(frame, tabs_area, view, focused);

    if content_area.height == 0 {
        return;
    }
    match view.section {
        Section::Target => render_target_fields(frame, content_area, view, focused),
        Section::Params => render_kv_section(frame, content_area, view, RowKind::Params, focused),
        Section::Headers => render_kv_section(frame, content_area, view, RowKind::Headers, focused),
        Section::Body => render_body_editor(frame, content_area, view, focused),
        Section::Curl => render_curl_preview(frame, content_area, view),
    }
}

fn render_method_url_bar(frame: &mut Frame, area: Rect, view: &PlaygroundView) {
    let request = &view.playground.request;
    let method_style = Style::default()
        .fg(Color::Black)
        .bg(method_color(request.method))
        .add_modifier(Modifier::BOLD);

    let line = Line::from(vec![
        Span::styled(format!(" {} ", request.method.as_str()), method_style),
        Span::raw(" "),
        Span::styled(request.build_url(), Style::default().fg(Color::White)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_credential_line(frame: &mut Frame, area: Rect, view: &PlaygroundView) {
    let playground = &view.playground;
    let mut spans = vec![Span::styled(" X-API-Key ", HINT_STYLE)];

    match playground.vault.masked() {
        Some(masked) => {
            spans.push(Span::styled(masked, Style::default().fg(Color::Green)));
            match playground.matched_descriptor() {
                Some(d) => spans.push(Span::styled(
                    format!("  {} key {}{}", d.key_type.label(), d.id, if d.is_active { "" } else { " (revoked)" }),
                    HINT_STYLE,
                )),
                None => spans.push(Span::styled("  unknown key", HINT_STYLE)),
            }
        }
        None => {
            let style = if playground.missing_credential() {
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
            } else {
                HINT_STYLE
            };
            spans.push(Span::styled("not set (<Space>k to paste a key)", style));
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_section_tabs(frame: &mut Frame, area: Rect, view: &PlaygroundView, focused: bool) {
    let mut spans: Vec<Span> = vec![Span::raw(" ")];
    for (i, section) in Section::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" │ ", HINT_STYLE));
        }
        let label = match section {
            Section::Params => format!("Params ({})", view.playground.request.query_params.len()),
            Section::Headers => format!("Headers ({})", view.playground.request.headers.len()),
            other => other.label().to_string(),
        };
        spans.push(Span::styled(label, tab_style(view.section == *section, focused)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_target_fields(frame: &mut Frame, area: Rect, view: &PlaygroundView, focused: bool) {
    let request = &view.playground.request;
    let label_width: u16 = 10;
    let fields = [
        (TargetField::BaseUrl, EditTarget::BaseUrl, "Base URL", request.base_url.as_str()),
        (TargetField::Path, EditTarget::Path, "Path", request.path.as_str()),
    ];

    let mut lines = Vec::new();
    for (row, (field, target, label, value)) in fields.into_iter().enumerate() {
        let selected = focused && view.target_field == field;
        let editing = view.editing == Some(target);
        let value_style = if editing {
            Style::default().fg(Color::Yellow)
        } else if selected {
            Style::default().fg(Color::Black).bg(SELECTED_BG)
        } else {
            Style::default().fg(Color::White)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:<width$}", label, width = label_width as usize), HINT_STYLE),
            Span::styled(value.to_string(), value_style),
        ]));

        if editing {
            let x = area.x + label_width + view.input.cursor_width() as u16;
            if x < area.x + area.width && (row as u16) < area.height {
                frame.set_cursor_position((x, area.y + row as u16));
            }
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("i", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::styled(" edit  ", HINT_STYLE),
        Span::styled("m", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::styled(" method  ", HINT_STYLE),
        Span::styled("<Space>p", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::styled(" presets  ", HINT_STYLE),
        Span::styled("Ctrl-s", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::styled(" send", HINT_STYLE),
    ]));

    frame.render_widget(Paragraph::new(lines), area);
}

// ── Key-value rows ───────────────────────────────────────────────────

fn render_kv_section(frame: &mut Frame, area: Rect, view: &PlaygroundView, kind: RowKind, focused: bool) {
    let rows = view.rows(kind).rows();
    if rows.is_empty() {
        let hint = Paragraph::new("  No entries. Press 'a' to add.").style(HINT_STYLE);
        frame.render_widget(hint, area);
        return;
    }

    let toggle_width: u16 = 4;
    let separator_width: u16 = 3;
    let available = area.width.saturating_sub(toggle_width + separator_width);
    let key_width = available / 3;
    let value_width = available.saturating_sub(key_width);

    let selected = view.selected(kind);
    let visible_lines = area.height as usize;
    let scroll_offset = (selected + 1).saturating_sub(visible_lines);

    let mut lines = Vec::new();
    for (i, row) in rows.iter().enumerate().skip(scroll_offset).take(visible_lines) {
        let is_selected = focused && i == selected;
        let editing_field = match view.editing {
            Some(EditTarget::Row { kind: k, id, field }) if k == kind && id == row.id => Some(field),
            _ => None,
        };

        let cell_style = |field: RowField, normal: Style| {
            if editing_field == Some(field) {
                Style::default().fg(Color::Yellow).bg(Color::DarkGray)
            } else if is_selected {
                Style::default().fg(Color::Black).bg(SELECTED_BG)
            } else if !row.enabled {
                HINT_STYLE
            } else {
                normal
            }
        };

        let toggle_style = if is_selected {
            Style::default().fg(Color::Black).bg(SELECTED_BG)
        } else if row.enabled {
            Style::default().fg(Color::Green)
        } else {
            HINT_STYLE
        };
        let sep_style = if is_selected {
            Style::default().fg(Color::Black).bg(SELECTED_BG)
        } else {
            HINT_STYLE
        };

        lines.push(Line::from(vec![
            Span::styled(if row.enabled { "[x] " } else { "[ ] " }, toggle_style),
            Span::styled(
                truncate_or_pad(&row.key, key_width as usize),
                cell_style(RowField::Key, Style::default().fg(Color::Cyan)),
            ),
            Span::styled(" = ", sep_style),
            Span::styled(
                truncate_or_pad(&row.value, value_width as usize),
                cell_style(RowField::Value, Style::default().fg(Color::White)),
            ),
        ]));

        if let Some(field) = editing_field {
            let offset = match field {
                RowField::Key => toggle_width,
                RowField::Value => toggle_width + key_width + separator_width,
            };
            let x = area.x + offset + view.input.cursor_width() as u16;
            if x < area.x + area.width {
                frame.set_cursor_position((x, area.y + (i - scroll_offset) as u16));
            }
        }
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn truncate_or_pad(s: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let cw = c.width().unwrap_or(0);
        if used + cw > width {
            break;
        }
        out.push(c);
        used += cw;
    }
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

// ── Body ─────────────────────────────────────────────────────────────

/// One-line notice above the body when it will not be transmitted.
fn body_note(request: &RequestState) -> Option<(String, Style)> {
    if request.is_multipart {
        Some((
            " multipart/form-data: informational only, no body is sent; copy as curl for a real upload"
                .to_string(),
            Style::default().fg(Color::Yellow),
        ))
    } else if !request.method.allows_body() && !request.body.is_empty() {
        Some((format!(" {} requests are sent without a body", request.method), HINT_STYLE))
    } else {
        None
    }
}

fn render_body_editor(frame: &mut Frame, area: Rect, view: &PlaygroundView, focused: bool) {
    let request = &view.playground.request;
    let mut area = area;

    if let Some((text, style)) = body_note(request) {
        frame.render_widget(Paragraph::new(Span::styled(text, style)), Rect { height: 1, ..area });
        area = Rect {
            y: area.y + 1,
            height: area.height.saturating_sub(1),
            ..area
        };
    }

    if let Some(err) = &view.body_error {
        let line = Paragraph::new(Span::styled(format!(" {err}"), Style::default().fg(Color::Red)));
        frame.render_widget(line, Rect { height: 1, ..area });
        area = Rect {
            y: area.y + 1,
            height: area.height.saturating_sub(1),
            ..area
        };
    }

    if area.height == 0 {
        return;
    }

    let editing = view.editing == Some(EditTarget::Body);
    if request.body.is_empty() && !editing {
        let hint = Paragraph::new("  Empty body. Press 'i' to edit, <Space>f to format.").style(HINT_STYLE);
        frame.render_widget(hint, area);
        return;
    }

    // Cursor row and column inside the body text.
    let (cursor_row, cursor_col) = if editing {
        let before = &view.input.text()[..view.input.cursor()];
        let row = before.matches('\n').count();
        let col = before.rsplit('\n').next().map_or(0, |l| l.width());
        (row, col)
    } else {
        (0, 0)
    };

    let num_width: u16 = 4;
    let visible_lines = area.height as usize;
    let scroll_offset = (cursor_row + 1).saturating_sub(visible_lines);

    let lines: Vec<Line> = request
        .body
        .split('\n')
        .enumerate()
        .skip(scroll_offset)
        .take(visible_lines)
        .map(|(i, text)| {
            let current = editing && i == cursor_row;
            let num_style = if current { Style::default().fg(Color::Yellow) } else { HINT_STYLE };
            let text_style = if focused {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(vec![
                Span::styled(format!("{:>3} ", i + 1), num_style),
                Span::styled(text.to_string(), text_style),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);

    if editing {
        let x = area.x + num_width + cursor_col as u16;
        let y = area.y + (cursor_row - scroll_offset) as u16;
        if x < area.x + area.width && y < area.y + area.height {
            frame.set_cursor_position((x, y));
        }
    }
}

fn render_curl_preview(frame: &mut Frame, area: Rect, view: &PlaygroundView) {
    let mut lines: Vec<Line> = view
        .playground
        .curl()
        .lines()
        .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(Color::White))))
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Enter or <Space>c to copy", HINT_STYLE)));
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

// ── Response panel ───────────────────────────────────────────────────

fn render_response_panel(frame: &mut Frame, area: Rect, view: &PlaygroundView, focused: bool) {
    let block = panel_block("Response", focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let centered = Rect {
        y: inner.y + inner.height / 2,
        height: 1,
        ..inner
    };

    if view.playground.is_in_flight() {
        let text = format!("{} Sending request...", view.spinner_char());
        let widget = Paragraph::new(text)
            .style(Style::default().fg(Color::Yellow))
            .alignment(Alignment::Center);
        frame.render_widget(widget, centered);
        return;
    }

    let Some(record) = view.playground.current_response() else {
        let hint = Paragraph::new("Press Ctrl-s or <Space>s to send the request")
            .style(HINT_STYLE)
            .alignment(Alignment::Center);
        frame.render_widget(hint, centered);
        return;
    };

    let guidance = inspector::guidance(record);
    let guidance_height = u16::from(guidance.is_some());
    let [status_area, guidance_area, tabs_area, content_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(guidance_height),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(inner);

    let class = StatusClass::of(record.status);
    let status_line = Line::from(vec![
        Span::styled(
            format!(" {} ", inspector::status_line(record)),
            Style::default()
                .fg(Color::Black)
                .bg(class.color())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {} ", class.label()), Style::default().fg(class.color())),
        Span::styled(format!(" {}ms ", record.duration_ms), HINT_STYLE),
        Span::styled(format!(" {} ", record.size_formatted), HINT_STYLE),
    ]);
    frame.render_widget(Paragraph::new(status_line), status_area);

    if let Some(text) = guidance {
        let style = match class {
            StatusClass::Error | StatusClass::ServerError => Style::default().fg(Color::Red),
            _ => Style::default().fg(Color::Yellow),
        };
        frame.render_widget(Paragraph::new(Span::styled(format!(" {text}"), style)), guidance_area);
    }

    let tabs = Line::from(vec![
        Span::raw(" "),
        Span::styled("Body", tab_style(view.response_tab == ResponseTab::Body, focused)),
        Span::styled(" │ ", HINT_STYLE),
        Span::styled(
            format!("Headers ({})", record.headers.len()),
            tab_style(view.response_tab == ResponseTab::Headers, focused),
        ),
    ]);
    frame.render_widget(Paragraph::new(tabs), tabs_area);

    let lines = match view.response_tab {
        ResponseTab::Body => inspector::highlight_json(&inspector::pretty_body(record)),
        ResponseTab::Headers => inspector::header_lines(record),
    };
    let lines: Vec<Line> = lines
        .into_iter()
        .skip(view.response_scroll)
        .take(content_area.height as usize)
        .collect();
    frame.render_widget(Paragraph::new(lines), content_area);
}

// ── Credential prompt ────────────────────────────────────────────────

fn render_credential_prompt(frame: &mut Frame, area: Rect, view: &PlaygroundView) {
    let Some(buffer) = &view.credential_prompt else {
        return;
    };
    let width = 60.min(area.width.saturating_sub(4));
    let popup = centered_rect(width, 5, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .title(" API key ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let masked = "•".repeat(buffer.text().chars().count());
    let lines = vec![
        Line::from(vec![Span::raw("> "), Span::styled(masked.clone(), Style::default().fg(Color::White))]),
        Line::from(""),
        Line::from(Span::styled("Enter save  Esc cancel  Ctrl-u clear", HINT_STYLE)),
    ];
    frame.render_widget(Paragraph::new(lines), inner);

    let x = inner.x + 2 + masked.width() as u16;
    if x < inner.x + inner.width {
        frame.set_cursor_position((x, inner.y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multipart_note_says_no_body_is_sent() {
        let mut request = RequestState::new("https://api.example.com/v1");
        request.apply_preset(crate::presets::find("Upload Photo").unwrap());
        let (text, _) = body_note(&request).unwrap();
        assert!(text.contains("no body is sent"));
        assert!(!text.contains("JSON"));
        assert_eq!(request.snapshot("k").body, None);
    }

    #[test]
    fn test_body_note_for_get_with_body() {
        let mut request = RequestState::new("https://api.example.com/v1");
        assert!(body_note(&request).is_none());
        request.body = "{}".into();
        let (text, _) = body_note(&request).unwrap();
        assert_eq!(text, " GET requests are sent without a body");
        request.method = HttpMethod::Post;
        assert!(body_note(&request).is_none());
    }

    #[test]
    fn test_truncate_or_pad() {
        assert_eq!(truncate_or_pad("abc", 5), "abc  ");
        assert_eq!(truncate_or_pad("abcdef", 3), "abc");
        assert_eq!(truncate_or_pad("日本語", 5), "日本 ");
        assert_eq!(truncate_or_pad("", 2), "  ");
    }
}
