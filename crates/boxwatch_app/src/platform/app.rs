use std::io::{self, Stdout};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use boxwatch_core::{update, AppState, Clock, Location, Msg};
use boxwatch_engine::{ensure_state_dir, ClientSettings};
use chrono::Local;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use sync_logging::{sync_info, sync_warn};

use super::effects::EffectRunner;
use super::keys::{map_key, KeyAction, UiState};
use super::logging;
use super::persistence::load_settings;
use super::ui;

/// How long to wait for terminal input before draining engine results again.
const INPUT_POLL: Duration = Duration::from_millis(50);

pub struct AppOptions {
    pub state_dir: PathBuf,
    pub location: Location,
}

pub fn run_app(options: AppOptions) -> anyhow::Result<()> {
    ensure_state_dir(&options.state_dir)
        .with_context(|| format!("preparing state dir {:?}", options.state_dir))?;
    logging::initialize(&options.state_dir);

    let settings = load_settings(&options.state_dir);
    sync_info!(
        "Starting dashboard for {} at {}",
        settings.server_address,
        options.location
    );

    let runner = EffectRunner::new(
        ClientSettings::default(),
        &settings.server_address,
        options.state_dir.clone(),
    );

    let mut terminal = TerminalGuard::enter().context("setting up terminal")?;
    let mut session = Session {
        state: AppState::new().with_clock(Clock::new(local_time)),
        ui: UiState::default(),
        runner,
    };
    session.dispatch(Msg::AppStarted {
        server_address: settings.server_address,
        location: options.location,
    });
    session.runner.start_polling();

    let result = session.event_loop(&mut terminal.terminal);
    drop(terminal);
    result
}

fn local_time() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

struct Session {
    state: AppState,
    ui: UiState,
    runner: EffectRunner,
}

impl Session {
    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> anyhow::Result<()> {
        let mut needs_draw = true;
        loop {
            for msg in self.runner.drain() {
                needs_draw |= self.dispatch(msg);
            }

            if needs_draw {
                let view = self.state.view();
                self.ui.selected = self.ui.selected.min(view.units.len().saturating_sub(1));
                let ui_state = &mut self.ui;
                terminal.draw(|frame| {
                    let areas = ui::layout::split(frame.size());
                    ui_state.grid_columns = ui::layout::grid_columns(areas.grid);
                    ui::render::draw(frame, &view, ui_state);
                })?;
                needs_draw = false;
            }

            if !event::poll(INPUT_POLL)? {
                continue;
            }
            match event::read()? {
                Event::Key(key) => {
                    let view = self.state.view();
                    match map_key(&mut self.ui, &view, key) {
                        KeyAction::None => {}
                        KeyAction::Redraw => needs_draw = true,
                        KeyAction::Dispatch(msg) => needs_draw |= self.dispatch(msg),
                        KeyAction::Quit => return Ok(()),
                    }
                }
                Event::Resize(_, _) => needs_draw = true,
                _ => {}
            }
        }
    }

    /// Runs one message through the core, hands its effects to the engine and
    /// reports whether the view changed.
    fn dispatch(&mut self, msg: Msg) -> bool {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.enqueue(effects);
        self.state.consume_dirty()
    }
}

struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn enter() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.clear()?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(err) = disable_raw_mode() {
            sync_warn!("Failed to leave raw mode: {}", err);
        }
        if let Err(err) = execute!(self.terminal.backend_mut(), LeaveAlternateScreen) {
            sync_warn!("Failed to leave alternate screen: {}", err);
        }
        let _ = self.terminal.show_cursor();
    }
}
