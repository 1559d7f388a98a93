//! Telescope-style filterable picker overlay.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::input::TextInput;
use crate::popup::centered_rect;

/// A single item that can appear in the picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerItem {
    /// Display text for the item.
    pub label: String,
    /// Secondary dimmed text.
    pub description: String,
    /// Identifier handed back on selection.
    pub id: String,
}

impl PickerItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: description.into(),
            id: id.into(),
        }
    }
}

/// Picker overlay state.
#[derive(Debug, Default)]
pub struct Picker {
    pub visible: bool,
    pub title: String,
    query: TextInput,
    items: Vec<PickerItem>,
    /// Indices into `items` matching the query.
    filtered: Vec<usize>,
    list_state: ListState,
}

impl Picker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, title: impl Into<String>, items: Vec<PickerItem>) {
        self.visible = true;
        self.title = title.into();
        self.query.clear();
        self.items = items;
        self.list_state.select(None);
        self.filter();
        if !self.filtered.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn close(&mut self) {
        self.visible = false;
        self.query.clear();
        self.items.clear();
        self.filtered.clear();
        self.list_state.select(None);
    }

    pub fn query(&self) -> &str {
        self.query.text()
    }

    pub fn insert_char(&mut self, c: char) {
        self.query.insert_char(c);
        self.filter();
    }

    pub fn backspace(&mut self) {
        self.query.backspace();
        self.filter();
    }

    /// Move selection down, wrapping.
    pub fn move_down(&mut self) {
        if self.filtered.is_empty() {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0);
        self.list_state.select(Some((current + 1) % self.filtered.len()));
    }

    /// Move selection up, wrapping.
    pub fn move_up(&mut self) {
        if self.filtered.is_empty() {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0);
        let next = if current == 0 {
            self.filtered.len() - 1
        } else {
            current - 1
        };
        self.list_state.select(Some(next));
    }

    pub fn selected_id(&self) -> Option<&str> {
        let sel = self.list_state.selected()?;
        let idx = *self.filtered.get(sel)?;
        Some(&self.items[idx].id)
    }

    pub fn visible_count(&self) -> usize {
        self.filtered.len()
    }

    /// Case-insensitive substring match on label and description.
    fn filter(&mut self) {
        let query = self.query.text().to_lowercase();
        self.filtered = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| {
                query.is_empty()
                    || item.label.to_lowercase().contains(&query)
                    || item.description.to_lowercase().contains(&query)
            })
            .map(|(i, _)| i)
            .collect();

        if self.filtered.is_empty() {
            self.list_state.select(None);
        } else {
            let sel = self.list_state.selected().unwrap_or(0);
            self.list_state.select(Some(sel.min(self.filtered.len() - 1)));
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        if !self.visible {
            return;
        }

        let width = (area.width * 70 / 100).max(40).min(area.width.saturating_sub(4));
        let height = (area.height * 60 / 100).max(10).min(area.height.saturating_sub(4));
        let popup_area = centered_rect(width, height, area);
        frame.render_widget(Clear, popup_area);

        let [input_area, results_area] =
            Layout::vertical([Constraint::Length(3), Constraint::Min(1)]).areas(popup_area);

        let input = Paragraph::new(Line::from(vec![
            Span::styled("> ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(self.query.text().to_string()),
        ]))
        .block(
            Block::default()
                .title(format!(" {} ", self.title))
                .borders(Borders::ALL),
        );
        frame.render_widget(input, input_area);
        frame.set_cursor_position((
            input_area.x + 3 + self.query.cursor_width() as u16,
            input_area.y + 1,
        ));

        let items: Vec<ListItem> = self
            .filtered
            .iter()
            .map(|&idx| {
                let item = &self.items[idx];
                let mut spans = vec![Span::styled(
                    item.label.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )];
                if !item.description.is_empty() {
                    spans.push(Span::styled(
                        format!("  {}", item.description),
                        Style::default().add_modifier(Modifier::DIM),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::LEFT | Borders::RIGHT | Borders::BOTTOM))
            .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED))
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, results_area, &mut self.list_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<PickerItem> {
        vec![
            PickerItem::new("1", "List Photos", "GET /photos"),
            PickerItem::new("2", "Upload Photo", "POST /photos"),
            PickerItem::new("3", "Usage", "GET /usage"),
        ]
    }

    #[test]
    fn test_open_selects_first() {
        let mut picker = Picker::new();
        picker.open("Presets", items());
        assert!(picker.visible);
        assert_eq!(picker.selected_id(), Some("1"));
    }

    #[test]
    fn test_filter_matches_description() {
        let mut picker = Picker::new();
        picker.open("Presets", items());
        for c in "post".chars() {
            picker.insert_char(c);
        }
        assert_eq!(picker.visible_count(), 1);
        assert_eq!(picker.selected_id(), Some("2"));

        picker.backspace();
        picker.backspace();
        picker.backspace();
        picker.backspace();
        assert_eq!(picker.visible_count(), 3);
    }

    #[test]
    fn test_navigation_wraps() {
        let mut picker = Picker::new();
        picker.open("Presets", items());
        picker.move_up();
        assert_eq!(picker.selected_id(), Some("3"));
        picker.move_down();
        assert_eq!(picker.selected_id(), Some("1"));
    }

    #[test]
    fn test_no_match_has_no_selection() {
        let mut picker = Picker::new();
        picker.open("Presets", items());
        picker.insert_char('z');
        assert_eq!(picker.selected_id(), None);
        picker.close();
        assert!(!picker.visible);
    }
}
