//! Single source of truth for what the screen shows.
//!
//! Nothing in here performs I/O. Handlers mutate the [`ViewState`] and hand
//! back a [`Command`] for the runtime to execute; results come back in
//! through [`ViewState::apply_lookup`] and [`ViewState::apply_location`].

use std::time::{Duration, Instant};

use crate::error::{LocateError, Origin, ProviderError};
use crate::history::{History, HistoryEntry};
use crate::locate::Coordinates;
use crate::units::temperature::TemperatureUnit;
use crate::weather::{Alert, Report};

/// How long the "could not get your location" notice stays up.
pub const NOTICE_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Current,
    Forecast,
    Map,
    Alerts,
}

impl Tab {
    pub fn title(self) -> &'static str {
        match self {
            Self::Current => "Current",
            Self::Forecast => "Forecast",
            Self::Map => "Map",
            Self::Alerts => "Alerts",
        }
    }
}

/// Identifies one lookup. Only the newest token's result is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Fetch {
        token: RequestToken,
        query: String,
        origin: Origin,
    },
    Locate,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    token: RequestToken,
    origin: Origin,
}

#[derive(Debug)]
pub struct ViewState {
    pub query: String,
    pub report: Option<Report>,
    pub error: Option<String>,
    pub active_tab: Tab,
    pub expanded_alert: Option<usize>,
    pub alert_cursor: usize,
    pub history_cursor: usize,
    pub unit: TemperatureUnit,
    pub history: History,
    locating: bool,
    locate_after: RequestToken,
    notice: Option<(&'static str, Instant)>,
    pending: Option<Pending>,
    last_token: RequestToken,
}

impl ViewState {
    pub fn new(history: History) -> Self {
        let unit = history.store().load_unit();
        Self {
            query: String::new(),
            report: None,
            error: None,
            active_tab: Tab::Current,
            expanded_alert: None,
            alert_cursor: 0,
            history_cursor: 0,
            unit,
            history,
            locating: false,
            locate_after: RequestToken(0),
            notice: None,
            pending: None,
            last_token: RequestToken(0),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_locating(&self) -> bool {
        self.locating
    }

    pub fn location_notice(&self) -> Option<&'static str> {
        self.notice.map(|(text, _)| text)
    }

    pub fn alerts(&self) -> &[Alert] {
        self.report
            .as_ref()
            .map(|r| r.alerts.as_slice())
            .unwrap_or_default()
    }

    /// Startup: look up `query` if one was given, otherwise try the
    /// user's location.
    pub fn start(&mut self, query: Option<String>) -> Option<Command> {
        match query {
            Some(query) if !query.trim().is_empty() => {
                self.query = query;
                self.submit()
            }
            _ => self.request_location(),
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
    }

    pub fn backspace(&mut self) {
        self.query.pop();
    }

    /// Manual lookup of the text in the search box. Ignored while a lookup
    /// is loading.
    pub fn submit(&mut self) -> Option<Command> {
        if self.is_loading() {
            tracing::debug!("ignoring submit while loading");
            return None;
        }
        let query = self.query.trim().to_string();
        if query.is_empty() {
            return None;
        }
        Some(self.begin_lookup(query, Origin::Manual))
    }

    pub fn request_location(&mut self) -> Option<Command> {
        if self.locating || self.is_loading() {
            tracing::debug!("ignoring location request while busy");
            return None;
        }
        self.locating = true;
        self.locate_after = self.last_token;
        Some(Command::Locate)
    }

    pub fn apply_location(
        &mut self,
        result: Result<Coordinates, LocateError>,
        now: Instant,
    ) -> Option<Command> {
        self.locating = false;
        match result {
            Ok(coords) if self.last_token == self.locate_after => {
                Some(self.begin_lookup(coords.query(), Origin::Coordinates))
            }
            Ok(coords) => {
                tracing::debug!(?coords, "dropping location, a newer lookup was started");
                None
            }
            Err(err) => {
                tracing::warn!("location lookup failed: {err}");
                self.notice = Some((err.user_message(), now + NOTICE_DURATION));
                None
            }
        }
    }

    fn begin_lookup(&mut self, query: String, origin: Origin) -> Command {
        self.last_token = RequestToken(self.last_token.0 + 1);
        let token = self.last_token;
        self.pending = Some(Pending { token, origin });
        self.error = None;
        self.report = None;
        self.expanded_alert = None;
        self.alert_cursor = 0;
        self.settle_tab();
        tracing::info!(%query, ?origin, ?token, "lookup started");
        Command::Fetch {
            token,
            query,
            origin,
        }
    }

    /// Applies the outcome of a lookup. Results for superseded tokens are
    /// dropped.
    pub fn apply_lookup(&mut self, token: RequestToken, result: Result<Report, ProviderError>) {
        let origin = match self.pending {
            Some(pending) if pending.token == token => pending.origin,
            _ => {
                tracing::debug!(?token, "dropping stale lookup result");
                return;
            }
        };
        self.pending = None;

        match result {
            Ok(report) => {
                tracing::info!(
                    place = %report.location.query(),
                    alerts = report.alerts.len(),
                    "lookup succeeded"
                );
                if origin == Origin::Manual {
                    self.history.record(&report.location);
                    self.history_cursor = 0;
                    self.query.clear();
                }
                self.report = Some(report);
                self.active_tab = Tab::Current;
                self.expanded_alert = None;
                self.alert_cursor = 0;
            }
            Err(err) => {
                tracing::warn!("lookup failed: {err}");
                self.error = Some(err.user_message(origin).to_string());
            }
        }
        self.settle_tab();
    }

    pub fn tick(&mut self, now: Instant) {
        if self.notice.is_some_and(|(_, until)| now >= until) {
            self.notice = None;
        }
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn toggle_unit(&mut self) {
        self.unit = self.unit.toggle();
        if let Err(err) = self.history.store_mut().save_unit(self.unit) {
            tracing::warn!("failed to save temperature unit: {err}");
        }
    }

    pub fn visible_tabs(&self) -> Vec<Tab> {
        let mut tabs = vec![Tab::Current, Tab::Forecast, Tab::Map];
        if !self.alerts().is_empty() {
            tabs.push(Tab::Alerts);
        }
        tabs
    }

    /// Selecting a hidden tab is ignored.
    pub fn select_tab(&mut self, tab: Tab) {
        if self.visible_tabs().contains(&tab) {
            self.active_tab = tab;
        }
    }

    pub fn next_tab(&mut self) {
        self.step_tab(1);
    }

    pub fn prev_tab(&mut self) {
        let len = self.visible_tabs().len();
        self.step_tab(len - 1);
    }

    fn step_tab(&mut self, by: usize) {
        let tabs = self.visible_tabs();
        let at = tabs.iter().position(|t| *t == self.active_tab).unwrap_or(0);
        self.active_tab = tabs[(at + by) % tabs.len()];
    }

    fn settle_tab(&mut self) {
        if !self.visible_tabs().contains(&self.active_tab) {
            self.active_tab = Tab::Current;
        }
    }

    /// Selecting the expanded alert collapses it; any other index expands.
    pub fn toggle_alert(&mut self, index: usize) {
        if index >= self.alerts().len() {
            return;
        }
        self.expanded_alert = if self.expanded_alert == Some(index) {
            None
        } else {
            Some(index)
        };
    }

    pub fn move_alert_cursor(&mut self, down: bool) {
        self.alert_cursor = step(self.alert_cursor, self.alerts().len(), down);
    }

    pub fn move_history_cursor(&mut self, down: bool) {
        self.history_cursor = step(self.history_cursor, self.history.len(), down);
    }

    /// Re-runs a full lookup for a remembered place.
    pub fn select_history(&mut self, index: usize) -> Option<Command> {
        if self.is_loading() {
            return None;
        }
        self.query = self.history.query_for(index)?;
        self.submit()
    }

    pub fn remove_history(&mut self, index: usize) -> &[HistoryEntry] {
        self.history.remove(index);
        self.history_cursor = self
            .history_cursor
            .min(self.history.len().saturating_sub(1));
        self.history.entries()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.history_cursor = 0;
    }
}

fn step(cursor: usize, len: usize, down: bool) -> usize {
    if len == 0 {
        0
    } else if down {
        (cursor + 1).min(len - 1)
    } else {
        cursor.saturating_sub(1)
    }
}

/// What the presentation layer should draw, derived after every mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub tabs: Vec<Tab>,
    pub active_tab: Tab,
    pub spinner: bool,
    pub can_submit: bool,
    pub can_locate: bool,
    pub error: Option<String>,
    pub location_notice: Option<&'static str>,
    pub show_history: bool,
    pub show_weather: bool,
}

pub fn derive_view(state: &ViewState) -> View {
    let tabs = state.visible_tabs();
    let active_tab = if tabs.contains(&state.active_tab) {
        state.active_tab
    } else {
        Tab::Current
    };
    View {
        tabs,
        active_tab,
        spinner: state.is_loading() || state.is_locating(),
        can_submit: !state.query.trim().is_empty() && !state.is_loading(),
        can_locate: !state.is_loading() && !state.is_locating(),
        error: state.error.clone(),
        location_notice: state.location_notice(),
        show_history: !state.history.is_empty(),
        show_weather: state.report.is_some() && !state.is_loading(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MAX_ENTRIES;
    use crate::store::{PreferenceStore, HISTORY_KEY, UNIT_KEY};
    use crate::units::temperature;
    use crate::weather::{Current, Forecast, Location, Severity};
    use chrono::NaiveDate;

    fn state() -> ViewState {
        ViewState::new(History::load(PreferenceStore::in_memory()))
    }

    fn report(name: &str, country: &str, alerts: usize) -> Report {
        let day = Forecast {
            date: NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(),
            maxtemp_c: 27.0,
            mintemp_c: 15.0,
            avgtemp_c: 21.0,
            maxtemp_f: 80.6,
            mintemp_f: 59.0,
            avgtemp_f: 69.8,
            condition: "Sunny".into(),
            icon: String::new(),
            chance_of_rain: 0.0,
            avg_humidity: 50.0,
            maxwind_kph: 10.0,
        };
        let alert = Alert {
            headline: "Heat".into(),
            severity: Severity::Moderate,
            urgency: String::new(),
            areas: String::new(),
            category: String::new(),
            event: "Heat".into(),
            effective: String::new(),
            expires: String::new(),
            description: String::new(),
        };
        Report {
            location: Location {
                name: name.into(),
                region: String::new(),
                country: country.into(),
                localtime: String::new(),
                lat: 1.0,
                lon: 2.0,
            },
            current: Current {
                temp_c: 25.0,
                feelslike_c: 24.0,
                humidity: 40.0,
                wind_kph: 10.0,
                pressure_mb: 1012.0,
                uv: 5.0,
                description: "Sunny".into(),
                icon: String::new(),
            },
            forecast: vec![day.clone(), day.clone(), day],
            alerts: vec![alert; alerts],
        }
    }

    fn fetch_token(cmd: Option<Command>) -> RequestToken {
        match cmd {
            Some(Command::Fetch { token, .. }) => token,
            other => panic!("expected fetch, got {other:?}"),
        }
    }

    fn lookup(state: &mut ViewState, name: &str, country: &str, alerts: usize) {
        state.query = name.to_string();
        let token = fetch_token(state.submit());
        state.apply_lookup(token, Ok(report(name, country, alerts)));
    }

    fn names(state: &ViewState) -> Vec<String> {
        state
            .history
            .entries()
            .iter()
            .map(|e| e.name.clone())
            .collect()
    }

    #[test]
    fn test_submit_ignores_blank_query() {
        let mut state = state();
        state.query = "   ".into();
        assert_eq!(state.submit(), None);
        assert!(!state.is_loading());
    }

    #[test]
    fn test_submit_starts_loading_and_clears_previous() {
        let mut state = state();
        lookup(&mut state, "Paris", "France", 0);
        state.error = Some("old".into());

        state.query = " Rome ".into();
        let cmd = state.submit();
        assert!(matches!(
            cmd,
            Some(Command::Fetch { ref query, origin: Origin::Manual, .. }) if query == "Rome"
        ));
        assert!(state.is_loading());
        assert!(state.report.is_none());
        assert!(state.error.is_none());
        assert_eq!(names(&state), ["Paris"]);
    }

    #[test]
    fn test_manual_success_records_history_and_clears_query() {
        let mut state = state();
        lookup(&mut state, "Paris", "France", 0);

        assert!(!state.is_loading());
        assert!(state.query.is_empty());
        assert_eq!(state.active_tab, Tab::Current);
        assert_eq!(names(&state), ["Paris"]);
        assert!(state.history.store().raw(HISTORY_KEY).unwrap().contains("Paris"));
    }

    #[test]
    fn test_history_properties_over_many_lookups() {
        let mut state = state();
        for i in 0..8 {
            let before = state.history.len();
            lookup(&mut state, &format!("City{i}"), "X", 0);
            assert_eq!(names(&state)[0], format!("City{i}"));
            assert_eq!(state.history.len(), (before + 1).min(MAX_ENTRIES));
        }

        let before = state.history.len();
        lookup(&mut state, "City5", "X", 0);
        assert_eq!(state.history.len(), before);
        assert_eq!(names(&state)[0], "City5");
        assert_eq!(names(&state).iter().filter(|n| *n == "City5").count(), 1);
    }

    #[test]
    fn test_failed_lookup_clears_display_and_shows_error() {
        let mut state = state();
        lookup(&mut state, "Paris", "France", 2);

        state.query = "Nowhere".into();
        let token = fetch_token(state.submit());
        state.apply_lookup(token, Err(ProviderError::NotFound("Nowhere".into())));

        assert!(state.report.is_none());
        assert!(state.alerts().is_empty());
        assert_eq!(state.error.as_deref(), Some("City not found or API error."));
        assert!(!state.is_loading());
        assert_eq!(state.query, "Nowhere");
        let view = derive_view(&state);
        assert!(!view.show_weather);
        assert!(view.error.is_some());
    }

    #[test]
    fn test_submit_ignored_while_loading() {
        let mut state = state();
        state.query = "Paris".into();
        let first = fetch_token(state.submit());
        assert!(!derive_view(&state).can_submit);

        state.query = "Rome".into();
        assert_eq!(state.submit(), None);
        assert!(state.is_loading());
        assert_eq!(state.query, "Rome");

        state.apply_lookup(first, Ok(report("Paris", "France", 0)));
        assert_eq!(state.report.as_ref().unwrap().location.name, "Paris");
        state.query = "Rome".into();
        assert!(state.submit().is_some());
    }

    #[test]
    fn test_select_history_ignored_while_loading() {
        let mut state = state();
        lookup(&mut state, "Paris", "France", 0);
        state.query = "Rome".into();
        state.submit();

        assert_eq!(state.select_history(0), None);
        assert_eq!(state.query, "Rome");
    }

    #[test]
    fn test_stale_result_is_dropped() {
        let mut state = state();
        state.query = "Paris".into();
        let first = fetch_token(state.submit());
        state.apply_lookup(first, Ok(report("Paris", "France", 0)));
        state.query = "Rome".into();
        let second = fetch_token(state.submit());
        assert!(second > first);

        state.apply_lookup(first, Ok(report("Paris", "France", 0)));
        assert!(state.is_loading());
        assert!(state.report.is_none());

        state.apply_lookup(second, Ok(report("Rome", "Italy", 0)));
        assert_eq!(state.report.as_ref().unwrap().location.name, "Rome");
        assert_eq!(names(&state), ["Rome", "Paris"]);
    }

    #[test]
    fn test_stale_failure_does_not_overwrite() {
        let mut state = state();
        state.query = "Paris".into();
        let first = fetch_token(state.submit());
        state.apply_lookup(first, Ok(report("Paris", "France", 0)));
        state.query = "Rome".into();
        let second = fetch_token(state.submit());

        state.apply_lookup(first, Err(ProviderError::NotFound("Paris".into())));
        assert!(state.is_loading());
        assert!(state.error.is_none());
        state.apply_lookup(second, Ok(report("Rome", "Italy", 0)));
        assert!(state.report.is_some());
    }

    #[test]
    fn test_geolocation_lookup_skips_history() {
        let mut state = state();
        assert_eq!(state.start(None), Some(Command::Locate));
        assert!(state.is_locating());
        assert_eq!(state.request_location(), None);

        let coords = Coordinates { lat: 48.8, lon: 2.3 };
        let cmd = state.apply_location(Ok(coords), Instant::now());
        let Some(Command::Fetch { token, query, origin }) = cmd else {
            panic!("expected fetch");
        };
        assert_eq!(query, "48.8,2.3");
        assert_eq!(origin, Origin::Coordinates);
        assert!(!state.is_locating());

        state.query = "half typed".into();
        state.apply_lookup(token, Ok(report("Paris", "France", 0)));
        assert!(state.history.is_empty());
        assert_eq!(state.query, "half typed");
    }

    #[test]
    fn test_geolocation_failure_message() {
        let mut state = state();
        state.request_location();
        let cmd = state.apply_location(Ok(Coordinates { lat: 0.0, lon: 0.0 }), Instant::now());
        let token = fetch_token(cmd);
        state.apply_lookup(token, Err(ProviderError::NotFound("0,0".into())));
        assert_eq!(state.error.as_deref(), Some("Error fetching weather data."));
    }

    #[test]
    fn test_location_superseded_by_manual_lookup() {
        let mut state = state();
        state.request_location();
        state.query = "Rome".into();
        state.submit();

        let cmd = state.apply_location(Ok(Coordinates { lat: 1.0, lon: 1.0 }), Instant::now());
        assert_eq!(cmd, None);
        assert!(!state.is_locating());
    }

    #[test]
    fn test_location_notice_expires_after_five_seconds() {
        let mut state = state();
        let now = Instant::now();
        state.request_location();
        state.apply_location(Err(LocateError::Unavailable), now);

        assert_eq!(state.location_notice(), Some(crate::error::LOCATION_NOTICE));
        assert!(state.error.is_none());
        state.tick(now + Duration::from_secs(4));
        assert!(state.location_notice().is_some());
        state.tick(now + NOTICE_DURATION);
        assert_eq!(state.location_notice(), None);
        assert_eq!(derive_view(&state).location_notice, None);
    }

    #[test]
    fn test_locate_ignored_while_loading() {
        let mut state = state();
        state.query = "Paris".into();
        state.submit();
        assert_eq!(state.request_location(), None);
        assert!(!derive_view(&state).can_locate);
    }

    #[test]
    fn test_unit_toggle_persists_without_fetch() {
        let mut state = state();
        lookup(&mut state, "Paris", "France", 0);
        let temp_c = state.report.as_ref().unwrap().current.temp_c;
        let before = temperature::display(temp_c, state.unit);

        state.toggle_unit();
        assert_eq!(state.unit, TemperatureUnit::Fahrenheit);
        assert_eq!(temperature::display(temp_c, state.unit), "77°F");
        assert_eq!(state.history.store().raw(UNIT_KEY).as_deref(), Some("fahrenheit"));
        assert!(!state.is_loading());

        state.toggle_unit();
        assert_eq!(temperature::display(temp_c, state.unit), before);
    }

    #[test]
    fn test_unit_preference_loaded_at_startup() {
        let mut prefs = PreferenceStore::in_memory();
        prefs.save_unit(TemperatureUnit::Fahrenheit).unwrap();
        let state = ViewState::new(History::load(prefs));
        assert_eq!(state.unit, TemperatureUnit::Fahrenheit);
    }

    #[test]
    fn test_alerts_tab_only_with_alerts() {
        let mut state = state();
        lookup(&mut state, "Paris", "France", 0);
        state.select_tab(Tab::Alerts);
        assert_eq!(state.active_tab, Tab::Current);
        assert_eq!(state.visible_tabs(), [Tab::Current, Tab::Forecast, Tab::Map]);

        lookup(&mut state, "Miami", "USA", 2);
        state.select_tab(Tab::Alerts);
        assert_eq!(state.active_tab, Tab::Alerts);

        lookup(&mut state, "Oslo", "Norway", 0);
        assert_eq!(state.active_tab, Tab::Current);
        assert_eq!(derive_view(&state).active_tab, Tab::Current);
    }

    #[test]
    fn test_alerts_tab_falls_back_when_new_lookup_starts() {
        let mut state = state();
        lookup(&mut state, "Miami", "USA", 1);
        state.select_tab(Tab::Alerts);
        state.query = "Oslo".into();
        state.submit();
        assert_eq!(state.active_tab, Tab::Current);
    }

    #[test]
    fn test_tab_cycling_wraps() {
        let mut state = state();
        lookup(&mut state, "Miami", "USA", 1);
        state.select_tab(Tab::Forecast);
        state.next_tab();
        state.next_tab();
        assert_eq!(state.active_tab, Tab::Alerts);
        state.next_tab();
        assert_eq!(state.active_tab, Tab::Current);
        state.prev_tab();
        assert_eq!(state.active_tab, Tab::Alerts);
    }

    #[test]
    fn test_success_resets_tab_and_expanded_alert() {
        let mut state = state();
        lookup(&mut state, "Miami", "USA", 3);
        state.select_tab(Tab::Map);
        state.toggle_alert(1);
        lookup(&mut state, "Tampa", "USA", 3);
        assert_eq!(state.active_tab, Tab::Current);
        assert_eq!(state.expanded_alert, None);
    }

    #[test]
    fn test_toggle_alert() {
        let mut state = state();
        lookup(&mut state, "Miami", "USA", 3);
        state.toggle_alert(1);
        assert_eq!(state.expanded_alert, Some(1));
        state.toggle_alert(2);
        assert_eq!(state.expanded_alert, Some(2));
        state.toggle_alert(2);
        assert_eq!(state.expanded_alert, None);
        state.toggle_alert(7);
        assert_eq!(state.expanded_alert, None);
    }

    #[test]
    fn test_select_history_reissues_lookup() {
        let mut state = state();
        lookup(&mut state, "Paris", "France", 0);
        lookup(&mut state, "Rome", "Italy", 0);

        let cmd = state.select_history(1);
        assert!(matches!(
            cmd,
            Some(Command::Fetch { ref query, origin: Origin::Manual, .. }) if query == "Paris, France"
        ));
        assert!(state.report.is_none());
        assert_eq!(state.select_history(9), None);
    }

    #[test]
    fn test_remove_and_clear_history() {
        let mut state = state();
        for name in ["A", "B", "C", "D", "E"] {
            lookup(&mut state, name, "X", 0);
        }
        state.history_cursor = 4;
        let left: Vec<_> = state.remove_history(2).iter().map(|e| e.name.clone()).collect();
        assert_eq!(left, ["E", "D", "B", "A"]);
        assert_eq!(state.history_cursor, 3);

        state.clear_history();
        assert!(state.history.is_empty());
        assert_eq!(state.history.store().raw(HISTORY_KEY).as_deref(), Some("[]"));
        assert!(!derive_view(&state).show_history);
    }

    #[test]
    fn test_derive_view_while_loading() {
        let mut state = state();
        let view = derive_view(&state);
        assert!(!view.can_submit);
        assert!(!view.spinner);

        state.query = "Paris".into();
        assert!(derive_view(&state).can_submit);
        state.submit();
        let view = derive_view(&state);
        assert!(view.spinner);
        assert!(!view.can_submit);
        assert!(!view.show_weather);
    }

    #[test]
    fn test_cursor_steps_are_clamped() {
        assert_eq!(step(0, 0, true), 0);
        assert_eq!(step(0, 3, false), 0);
        assert_eq!(step(1, 3, true), 2);
        assert_eq!(step(2, 3, true), 2);
    }
}
