//! Centered overlays: the which-key leader menu and the help popup.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

/// Helper to create a centered rect within a given area.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([Constraint::Length(height)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Length(width)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

fn popup_block(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {} ", title))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
}

// ── Which-key ────────────────────────────────────────────────────────

/// A single entry in the leader menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhichKeyEntry {
    pub key: String,
    pub description: String,
}

impl WhichKeyEntry {
    pub fn new(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
        }
    }
}

/// Leader menu shown after `<Space>` until the next key arrives.
#[derive(Debug, Default)]
pub struct WhichKey {
    pub visible: bool,
    entries: Vec<WhichKeyEntry>,
}

impl WhichKey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, entries: Vec<WhichKeyEntry>) {
        self.visible = true;
        self.entries = entries;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.entries.clear();
    }

    pub fn entries(&self) -> &[WhichKeyEntry] {
        &self.entries
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.visible || self.entries.is_empty() {
            return;
        }

        let key_width = self.entries.iter().map(|e| e.key.len()).max().unwrap_or(1);
        let desc_width = self
            .entries
            .iter()
            .map(|e| e.description.len())
            .max()
            .unwrap_or(10);
        let width = (key_width + desc_width + 10).min(60) as u16;
        let height = (self.entries.len() as u16 + 2).min(area.height.saturating_sub(2));
        let popup_area = centered_rect(width, height, area);

        let lines: Vec<Line> = self
            .entries
            .iter()
            .map(|entry| {
                Line::from(vec![
                    Span::styled(
                        format!("  {:>width$} ", entry.key, width = key_width),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::styled("-> ", Style::default().add_modifier(Modifier::DIM)),
                    Span::raw(entry.description.clone()),
                ])
            })
            .collect();

        frame.render_widget(Clear, popup_area);
        frame.render_widget(Paragraph::new(lines).block(popup_block("Leader")), popup_area);
    }
}

// ── Help ─────────────────────────────────────────────────────────────

/// A single line of the help popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpEntry {
    pub section: &'static str,
    pub key: &'static str,
    pub description: &'static str,
}

impl HelpEntry {
    pub const fn new(section: &'static str, key: &'static str, description: &'static str) -> Self {
        Self {
            section,
            key,
            description,
        }
    }
}

/// Scrollable help popup grouping entries by section.
#[derive(Debug, Default)]
pub struct HelpPopup {
    pub visible: bool,
    entries: Vec<HelpEntry>,
    scroll: u16,
}

impl HelpPopup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, entries: Vec<HelpEntry>) {
        self.visible = true;
        self.entries = entries;
        self.scroll = 0;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.entries.clear();
        self.scroll = 0;
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.visible || self.entries.is_empty() {
            return;
        }

        let lines = self.build_lines();
        let width = area.width.saturating_sub(8).min(64);
        let height = area.height.saturating_sub(4).min(lines.len() as u16 + 2);
        let popup_area = centered_rect(width, height, area);

        let max_scroll = (lines.len() as u16).saturating_sub(height.saturating_sub(2));
        let scroll = self.scroll.min(max_scroll);

        frame.render_widget(Clear, popup_area);
        frame.render_widget(
            Paragraph::new(lines)
                .block(popup_block("Help"))
                .scroll((scroll, 0)),
            popup_area,
        );
    }

    fn build_lines(&self) -> Vec<Line<'static>> {
        let mut lines: Vec<Line<'static>> = Vec::new();
        let mut current_section = "";

        for entry in &self.entries {
            if entry.section != current_section {
                if !lines.is_empty() {
                    lines.push(Line::from(""));
                }
                lines.push(Line::from(Span::styled(
                    format!(" {}", entry.section),
                    Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                )));
                current_section = entry.section;
            }
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {:>14}   ", entry.key),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(entry.description),
            ]));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            " Esc/q/?  close    j/k  scroll",
            Style::default().add_modifier(Modifier::DIM),
        )));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_lines_group_sections() {
        let mut popup = HelpPopup::new();
        popup.show(vec![
            HelpEntry::new("Request", "m", "Next method"),
            HelpEntry::new("Request", "M", "Previous method"),
            HelpEntry::new("Response", "j/k", "Scroll"),
        ]);
        let lines = popup.build_lines();
        // 2 headers + 3 entries + 1 spacer between sections + spacer + footer
        assert_eq!(lines.len(), 8);
    }

    #[test]
    fn test_which_key_show_hide() {
        let mut wk = WhichKey::new();
        wk.show(vec![WhichKeyEntry::new("s", "Send")]);
        assert!(wk.visible);
        assert_eq!(wk.entries().len(), 1);
        wk.hide();
        assert!(!wk.visible);
        assert!(wk.entries().is_empty());
    }
}
