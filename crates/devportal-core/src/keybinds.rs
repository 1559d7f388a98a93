use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Input modes, modeled after vim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Default mode. Navigation and actions via keybinds.
    #[default]
    Normal,
    /// Text input mode. Entered with `i`, `e`, `a`. Exited with `Esc`.
    Insert,
    /// Command-line mode. Entered with `:`.
    Command,
}

impl InputMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Insert => "INSERT",
            Self::Command => "COMMAND",
        }
    }
}

/// Actions that can result from processing a key event in Normal mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The key was consumed but nothing happens.
    None,
    Quit,
    SetMode(InputMode),
    MoveDown(usize),
    MoveUp(usize),
    GotoTop,
    GotoBottom,
    HalfPageDown,
    HalfPageUp,
    /// Confirm/select the current item.
    Confirm,
    /// Delete the current item (`dd`).
    Delete,
    /// Add a new item below the current one.
    Add,
    /// Begin editing the current item.
    Edit,
    /// Flip the enabled flag of the current item.
    Toggle,
    NextSection,
    PrevSection,
    NextMethod,
    PrevMethod,
    /// Fire the current request.
    Send,
    /// Switch focus between the request and response panels.
    SwapPanel,
    /// Leader key (Space) pressed; the leader menu should open.
    LeaderKey,
    /// A leader sequence was completed with this key.
    LeaderSequence(char),
    Help,
}

/// Pending key state for multi-key sequences like `gg`, `dd` and leader chords.
#[derive(Debug, Default, Clone)]
pub struct KeyState {
    /// Whether the leader key (Space) was just pressed.
    pub leader_active: bool,
    /// Pending first key of a two-key sequence.
    pub pending_key: Option<char>,
}

impl KeyState {
    pub fn reset(&mut self) {
        self.leader_active = false;
        self.pending_key = None;
    }
}

/// Process a key event in Normal mode, accounting for multi-key sequences.
pub fn process_normal_key(key: KeyEvent, state: &mut KeyState) -> Action {
    if state.leader_active {
        state.leader_active = false;
        return match key.code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Char(c) => Action::LeaderSequence(c),
            _ => Action::None,
        };
    }

    if let Some(pending) = state.pending_key.take() {
        return match (pending, key.code) {
            ('g', KeyCode::Char('g')) => Action::GotoTop,
            ('d', KeyCode::Char('d')) => Action::Delete,
            _ => Action::None,
        };
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('s') if ctrl => Action::Send,
        KeyCode::Char('d') if ctrl => Action::HalfPageDown,
        KeyCode::Char('u') if ctrl => Action::HalfPageUp,
        KeyCode::Char('w') if ctrl => Action::SwapPanel,
        KeyCode::Char(' ') => {
            state.leader_active = true;
            Action::LeaderKey
        }
        KeyCode::Char('j') | KeyCode::Down => Action::MoveDown(1),
        KeyCode::Char('k') | KeyCode::Up => Action::MoveUp(1),
        KeyCode::Char('G') => Action::GotoBottom,
        KeyCode::Char('g') => {
            state.pending_key = Some('g');
            Action::None
        }
        KeyCode::Char('d') => {
            state.pending_key = Some('d');
            Action::None
        }
        KeyCode::Tab => Action::NextSection,
        KeyCode::BackTab => Action::PrevSection,
        KeyCode::Char('m') => Action::NextMethod,
        KeyCode::Char('M') => Action::PrevMethod,
        KeyCode::Char('a') | KeyCode::Char('o') => Action::Add,
        KeyCode::Char('e') | KeyCode::Char('i') => Action::Edit,
        KeyCode::Char('x') => Action::Toggle,
        KeyCode::Enter => Action::Confirm,
        KeyCode::Char(':') => Action::SetMode(InputMode::Command),
        KeyCode::Char('?') => Action::Help,
        KeyCode::Char('q') => Action::Quit,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_two_key_sequences() {
        let mut state = KeyState::default();
        assert_eq!(process_normal_key(key(KeyCode::Char('g')), &mut state), Action::None);
        assert_eq!(process_normal_key(key(KeyCode::Char('g')), &mut state), Action::GotoTop);

        assert_eq!(process_normal_key(key(KeyCode::Char('d')), &mut state), Action::None);
        assert_eq!(process_normal_key(key(KeyCode::Char('d')), &mut state), Action::Delete);

        // Broken sequence is swallowed
        process_normal_key(key(KeyCode::Char('g')), &mut state);
        assert_eq!(process_normal_key(key(KeyCode::Char('x')), &mut state), Action::None);
        assert!(state.pending_key.is_none());
    }

    #[test]
    fn test_leader_sequence() {
        let mut state = KeyState::default();
        assert_eq!(process_normal_key(key(KeyCode::Char(' ')), &mut state), Action::LeaderKey);
        assert!(state.leader_active);
        assert_eq!(
            process_normal_key(key(KeyCode::Char('s')), &mut state),
            Action::LeaderSequence('s')
        );
        assert!(!state.leader_active);

        process_normal_key(key(KeyCode::Char(' ')), &mut state);
        assert_eq!(process_normal_key(key(KeyCode::Esc), &mut state), Action::None);
    }

    #[test]
    fn test_ctrl_s_sends() {
        let mut state = KeyState::default();
        let ev = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(process_normal_key(ev, &mut state), Action::Send);
    }
}
