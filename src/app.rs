use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{backend::Backend, Terminal};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::error::{LocateError, ProviderError};
use crate::locate::{Coordinates, Locator};
use crate::provider::Gateway;
use crate::state::{derive_view, Command, RequestToken, ViewState};
use crate::ui;
use crate::weather::Report;

const TICK: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Input(char),
    Backspace,
    Submit,
    NextTab,
    PrevTab,
    Locate,
    ToggleUnit,
    HistoryUp,
    HistoryDown,
    OpenHistory,
    RemoveHistory,
    ClearHistory,
    AlertUp,
    AlertDown,
    ToggleAlert,
    DismissError,
    Quit,
}

pub fn action_for(key: KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let action = match key.code {
        KeyCode::Char('c') if ctrl => Action::Quit,
        KeyCode::Char('g') if ctrl => Action::Locate,
        KeyCode::Char('u') if ctrl => Action::ToggleUnit,
        KeyCode::Char('o') if ctrl => Action::OpenHistory,
        KeyCode::Char('x') if ctrl => Action::ClearHistory,
        KeyCode::Char('e') if ctrl => Action::ToggleAlert,
        KeyCode::Char(_) if ctrl => return None,
        KeyCode::Char(c) => Action::Input(c),
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Enter => Action::Submit,
        KeyCode::Tab => Action::NextTab,
        KeyCode::BackTab => Action::PrevTab,
        KeyCode::Up => Action::HistoryUp,
        KeyCode::Down => Action::HistoryDown,
        KeyCode::Delete => Action::RemoveHistory,
        KeyCode::PageUp => Action::AlertUp,
        KeyCode::PageDown => Action::AlertDown,
        KeyCode::Esc => Action::DismissError,
        _ => return None,
    };
    Some(action)
}

/// Applies one user action. Quit is handled by the caller.
pub fn dispatch(state: &mut ViewState, action: Action) -> Option<Command> {
    match action {
        Action::Input(c) => state.push_char(c),
        Action::Backspace => state.backspace(),
        Action::Submit => return state.submit(),
        Action::NextTab => state.next_tab(),
        Action::PrevTab => state.prev_tab(),
        Action::Locate => return state.request_location(),
        Action::ToggleUnit => state.toggle_unit(),
        Action::HistoryUp => state.move_history_cursor(false),
        Action::HistoryDown => state.move_history_cursor(true),
        Action::OpenHistory => return state.select_history(state.history_cursor),
        Action::RemoveHistory => {
            state.remove_history(state.history_cursor);
        }
        Action::ClearHistory => state.clear_history(),
        Action::AlertUp => state.move_alert_cursor(false),
        Action::AlertDown => state.move_alert_cursor(true),
        Action::ToggleAlert => state.toggle_alert(state.alert_cursor),
        Action::DismissError => state.dismiss_error(),
        Action::Quit => {}
    }
    None
}

#[derive(Debug)]
pub enum Outcome {
    Lookup(RequestToken, Result<Report, ProviderError>),
    Location(Result<Coordinates, LocateError>),
}

/// Runs commands on the async runtime and reports back over a channel.
#[derive(Debug, Clone)]
pub struct Services {
    gateway: Arc<Gateway>,
    locator: Arc<Locator>,
    runtime: Handle,
}

impl Services {
    pub fn new(gateway: Gateway, locator: Locator, runtime: Handle) -> Self {
        Self {
            gateway: Arc::new(gateway),
            locator: Arc::new(locator),
            runtime,
        }
    }

    pub fn execute(&self, command: Command, tx: &UnboundedSender<Outcome>) {
        let tx = tx.clone();
        match command {
            Command::Fetch {
                token,
                query,
                origin,
            } => {
                tracing::debug!(?token, ?origin, %query, "spawning lookup");
                let gateway = Arc::clone(&self.gateway);
                self.runtime.spawn(async move {
                    let result = gateway.fetch(&query).await;
                    // receiver gone means the app is shutting down
                    let _ = tx.send(Outcome::Lookup(token, result));
                });
            }
            Command::Locate => {
                let locator = Arc::clone(&self.locator);
                self.runtime.spawn(async move {
                    let result = locator.resolve().await;
                    let _ = tx.send(Outcome::Location(result));
                });
            }
        }
    }
}

fn apply_outcome(state: &mut ViewState, outcome: Outcome, now: Instant) -> Option<Command> {
    match outcome {
        Outcome::Lookup(token, result) => {
            state.apply_lookup(token, result);
            None
        }
        Outcome::Location(result) => state.apply_location(result, now),
    }
}

fn drain(
    state: &mut ViewState,
    rx: &mut UnboundedReceiver<Outcome>,
    services: &Services,
    tx: &UnboundedSender<Outcome>,
) {
    while let Ok(outcome) = rx.try_recv() {
        if let Some(command) = apply_outcome(state, outcome, Instant::now()) {
            services.execute(command, tx);
        }
    }
}

pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    state: &mut ViewState,
    services: &Services,
    initial_query: Option<String>,
) -> io::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    if let Some(command) = state.start(initial_query) {
        services.execute(command, &tx);
    }

    loop {
        drain(state, &mut rx, services, &tx);
        state.tick(Instant::now());

        let view = derive_view(state);
        terminal.draw(|f| ui::draw(f, state, &view))?;

        if !event::poll(TICK)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            match action_for(key) {
                Some(Action::Quit) => return Ok(()),
                Some(action) => {
                    if let Some(command) = dispatch(state, action) {
                        services.execute(command, &tx);
                    }
                }
                None => {}
            }
        }
    }
}
