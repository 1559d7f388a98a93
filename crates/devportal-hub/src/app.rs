use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;

use devportal_core::{
    input::TextInput,
    keybinds::{Action, InputMode},
    popup::{HelpEntry, HelpPopup, WhichKey},
    ui,
};
use devportal_playground::PlaygroundView;

const GLOBAL_HELP: [HelpEntry; 5] = [
    HelpEntry::new("Global", "<Space>", "Leader menu"),
    HelpEntry::new("Global", "?", "This help"),
    HelpEntry::new("Global", ":q", "Quit"),
    HelpEntry::new("Global", ":reset", "New request, keep API key"),
    HelpEntry::new("Global", "Ctrl-c", "Quit immediately"),
];

/// Top-level application state: the playground plus the hub overlays.
pub struct App {
    view: PlaygroundView,
    pub should_quit: bool,
    mode: InputMode,
    which_key: WhichKey,
    help_popup: HelpPopup,
    command: TextInput,
}

impl App {
    pub fn new(view: PlaygroundView) -> Self {
        Self {
            view,
            should_quit: false,
            mode: InputMode::Normal,
            which_key: WhichKey::new(),
            help_popup: HelpPopup::new(),
            command: TextInput::new(),
        }
    }

    pub fn tick(&mut self) {
        self.view.tick();
    }

    /// Cancel outstanding work before the process exits.
    pub fn shutdown(&self) {
        self.view.shutdown();
    }

    pub fn handle_event(&mut self, event: Event) {
        let Event::Key(key) = event else {
            return;
        };

        if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
            self.should_quit = true;
            return;
        }
        if self.which_key.visible {
            self.handle_which_key_input(key);
            return;
        }
        if self.help_popup.visible {
            self.handle_help_key(key);
            return;
        }
        if self.mode == InputMode::Command {
            self.handle_command_key(key);
            return;
        }

        let action = self.view.handle_key(key);
        self.process_action(action);
    }

    fn process_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::LeaderKey => {
                self.view.reset_key_state();
                self.which_key.show(self.view.which_key_entries());
            }
            Action::SetMode(InputMode::Command) => {
                self.mode = InputMode::Command;
                self.command.clear();
            }
            Action::Help => self.show_help(),
            _ => {}
        }
    }

    fn handle_which_key_input(&mut self, key: KeyEvent) {
        self.which_key.hide();
        self.view.reset_key_state();
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.show_help(),
            KeyCode::Char(c) => {
                self.view.handle_leader_action(c);
            }
            _ => {}
        }
    }

    fn handle_help_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
                self.help_popup.hide();
                self.view.reset_key_state();
            }
            KeyCode::Char('j') | KeyCode::Down => self.help_popup.scroll_down(),
            KeyCode::Char('k') | KeyCode::Up => self.help_popup.scroll_up(),
            _ => {}
        }
    }

    fn handle_command_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.mode = InputMode::Normal;
                self.command.clear();
            }
            KeyCode::Enter => {
                let cmd = self.command.text().trim().to_string();
                self.mode = InputMode::Normal;
                self.command.clear();
                self.execute_command(&cmd);
            }
            KeyCode::Char(c) => self.command.insert_char(c),
            KeyCode::Backspace => {
                if self.command.is_empty() {
                    self.mode = InputMode::Normal;
                } else {
                    self.command.backspace();
                }
            }
            KeyCode::Left => self.command.left(),
            KeyCode::Right => self.command.right(),
            _ => {}
        }
    }

    fn execute_command(&mut self, cmd: &str) {
        match cmd {
            "q" | "quit" | "qa" | "qa!" => self.should_quit = true,
            "reset" => {
                if let Err(e) = self.view.reset() {
                    tracing::error!(error = %e, "failed to reset playground");
                }
            }
            "clear-history" => self.view.clear_history(),
            "" => {}
            other => tracing::debug!(command = other, "unknown command"),
        }
    }

    fn show_help(&mut self) {
        self.view.reset_key_state();
        let mut entries = self.view.help_entries();
        entries.extend(GLOBAL_HELP);
        self.help_popup.show(entries);
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let (title_area, content_area, status_area) = ui::standard_layout(area);

        ui::render_title_bar(frame, title_area, "devportal", "API Playground");
        self.view.render(frame, content_area);

        if self.mode == InputMode::Command {
            ui::render_command_line(frame, status_area, self.command.text(), self.command.cursor_width());
        } else {
            let info = self.view.status_info();
            ui::render_status_bar(frame, status_area, self.view.mode(), self.view.name(), &info);
        }

        self.which_key.render(frame, area);
        self.help_popup.render(frame, area);
    }
}
