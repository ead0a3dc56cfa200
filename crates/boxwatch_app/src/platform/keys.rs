use boxwatch_core::{AppViewModel, InspectorMsg, InspectorPhase, Msg, NavTarget};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Text prompt currently capturing keystrokes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    PageJump(String),
    ServerAddress(String),
}

impl Prompt {
    pub fn label(&self) -> &'static str {
        match self {
            Prompt::PageJump(_) => "Go to page",
            Prompt::ServerAddress(_) => "Server address",
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Prompt::PageJump(text) | Prompt::ServerAddress(text) => text,
        }
    }

    fn text_mut(&mut self) -> &mut String {
        match self {
            Prompt::PageJump(text) | Prompt::ServerAddress(text) => text,
        }
    }

    fn submit(self) -> Msg {
        match self {
            Prompt::PageJump(text) => Msg::PageJumpSubmitted(text),
            Prompt::ServerAddress(text) => Msg::ServerAddressSubmitted(text),
        }
    }
}

/// Terminal-only state the core never sees: grid selection and the open prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    pub selected: usize,
    pub grid_columns: usize,
    pub prompt: Option<Prompt>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            selected: 0,
            grid_columns: 1,
            prompt: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    None,
    /// Only terminal state changed; redraw.
    Redraw,
    Dispatch(Msg),
    Quit,
}

pub fn map_key(ui: &mut UiState, view: &AppViewModel, key: KeyEvent) -> KeyAction {
    if key.kind == KeyEventKind::Release {
        return KeyAction::None;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return KeyAction::Quit;
    }
    if ui.prompt.is_some() {
        return map_prompt_key(ui, key);
    }
    if let Some(inspector) = &view.inspector {
        return map_inspector_key(inspector.phase, key);
    }

    let unit_count = view.units.len();
    match key.code {
        KeyCode::Char('q') => KeyAction::Quit,
        KeyCode::Char('r') => KeyAction::Dispatch(Msg::RefreshAllClicked),
        KeyCode::Char(']') | KeyCode::PageDown => {
            KeyAction::Dispatch(Msg::Navigate(NavTarget::Next))
        }
        KeyCode::Char('[') | KeyCode::PageUp => {
            KeyAction::Dispatch(Msg::Navigate(NavTarget::Prev))
        }
        KeyCode::Home => KeyAction::Dispatch(Msg::Navigate(NavTarget::First)),
        KeyCode::End => KeyAction::Dispatch(Msg::Navigate(NavTarget::Last)),
        KeyCode::Left if key.modifiers.contains(KeyModifiers::ALT) => {
            KeyAction::Dispatch(Msg::HistoryBack)
        }
        KeyCode::Right if key.modifiers.contains(KeyModifiers::ALT) => {
            KeyAction::Dispatch(Msg::HistoryForward)
        }
        KeyCode::Char('b') | KeyCode::Backspace => KeyAction::Dispatch(Msg::HistoryBack),
        KeyCode::Char('f') => KeyAction::Dispatch(Msg::HistoryForward),
        KeyCode::Char('g') => {
            ui.prompt = Some(Prompt::PageJump(String::new()));
            KeyAction::Redraw
        }
        KeyCode::Char('s') => {
            ui.prompt = Some(Prompt::ServerAddress(view.server_address.clone()));
            KeyAction::Redraw
        }
        KeyCode::Left => move_selection(ui, unit_count, -1),
        KeyCode::Right => move_selection(ui, unit_count, 1),
        KeyCode::Up => move_selection(ui, unit_count, -(ui.grid_columns.max(1) as isize)),
        KeyCode::Down => move_selection(ui, unit_count, ui.grid_columns.max(1) as isize),
        KeyCode::Enter => match view.units.get(ui.selected) {
            Some(unit) => KeyAction::Dispatch(Msg::UnitSelected { unit: unit.id }),
            None => KeyAction::None,
        },
        _ => KeyAction::None,
    }
}

fn map_prompt_key(ui: &mut UiState, key: KeyEvent) -> KeyAction {
    let Some(prompt) = ui.prompt.as_mut() else {
        return KeyAction::None;
    };
    match key.code {
        KeyCode::Esc => {
            ui.prompt = None;
            KeyAction::Redraw
        }
        KeyCode::Enter => match ui.prompt.take() {
            Some(prompt) => KeyAction::Dispatch(prompt.submit()),
            None => KeyAction::None,
        },
        KeyCode::Backspace => {
            prompt.text_mut().pop();
            KeyAction::Redraw
        }
        KeyCode::Char(ch) => {
            prompt.text_mut().push(ch);
            KeyAction::Redraw
        }
        _ => KeyAction::None,
    }
}

fn map_inspector_key(phase: InspectorPhase, key: KeyEvent) -> KeyAction {
    let msg = match (phase, key.code) {
        (InspectorPhase::Viewing, KeyCode::Char('x')) => InspectorMsg::ResetPressed,
        (InspectorPhase::ConfirmingReset, KeyCode::Char('y') | KeyCode::Enter) => {
            InspectorMsg::ConfirmPressed
        }
        (InspectorPhase::ConfirmingReset, KeyCode::Char('n') | KeyCode::Esc) => {
            InspectorMsg::CancelPressed
        }
        (_, KeyCode::Esc | KeyCode::Char('c')) => InspectorMsg::ClosePressed,
        _ => return KeyAction::None,
    };
    KeyAction::Dispatch(Msg::Inspector(msg))
}

fn move_selection(ui: &mut UiState, unit_count: usize, delta: isize) -> KeyAction {
    if unit_count == 0 {
        return KeyAction::None;
    }
    let last = unit_count - 1;
    let next = ui.selected.min(last).saturating_add_signed(delta).min(last);
    if next == ui.selected {
        KeyAction::None
    } else {
        ui.selected = next;
        KeyAction::Redraw
    }
}
