use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, Tabs, Wrap},
    Frame,
};

use crate::history::HistoryEntry;
use crate::state::{Tab, View, ViewState};
use crate::units::temperature::{self, TemperatureUnit};
use crate::weather::{
    condition_label, format_alert_time, format_localtime, Alert, Current, Forecast, Location,
    Report, Severity, TemperatureBand,
};

const MISSING: &str = "--";

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Extreme => Color::Red,
        Severity::Severe => Color::LightRed,
        Severity::Moderate => Color::Yellow,
        Severity::Minor => Color::LightBlue,
        Severity::Unknown => Color::Gray,
    }
}

fn band_color(band: Option<TemperatureBand>) -> Color {
    match band {
        Some(TemperatureBand::Hot) => Color::Red,
        Some(TemperatureBand::Warm) => Color::Yellow,
        Some(TemperatureBand::Mild) => Color::Cyan,
        Some(TemperatureBand::Cool) | None => Color::Blue,
        Some(TemperatureBand::Cold) => Color::Magenta,
    }
}

fn framed<'a>(title: &'a str, border: Color) -> Block<'a> {
    let block = Block::default()
        .borders(Borders::ALL)
        .title_alignment(Alignment::Left)
        .border_style(Style::default().fg(border))
        .border_type(BorderType::Rounded);
    if title.is_empty() {
        block
    } else {
        block.title(Span::styled(title, Style::default().fg(Color::Yellow)))
    }
}

fn label_value<'a>(label: &str, value: String) -> Line<'a> {
    Line::from(vec![
        Span::raw(format!(" {label:10}")),
        Span::styled(value, Style::default().fg(Color::Green)),
    ])
}

fn display_search<'a>(state: &'a ViewState, view: &View, border: Color) -> Paragraph<'a> {
    let mut spans = vec![Span::raw(" ")];
    if state.query.is_empty() {
        spans.push(Span::styled(
            "Enter city name",
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        spans.push(Span::raw(state.query.as_str()));
    }
    spans.push(Span::styled("▏", Style::default().fg(Color::Gray)));

    let mut title = String::from(" Search ");
    if state.is_locating() {
        title.push_str("(locating...) ");
    } else if view.spinner {
        title.push_str("(loading...) ");
    }
    let hint = match (view.can_submit, view.can_locate) {
        (true, _) => " Enter search | Ctrl-U °C/°F ",
        (false, true) => " Ctrl-G my location | Ctrl-U °C/°F ",
        (false, false) => " Ctrl-U °C/°F ",
    };

    Paragraph::new(Line::from(spans)).block(
        framed("", border)
            .title(Span::styled(title, Style::default().fg(Color::Yellow)))
            .title_bottom(Line::from(hint).right_aligned()),
    )
}

fn display_banner<'a>(text: &'a str, color: Color) -> Paragraph<'a> {
    Paragraph::new(Line::from(Span::styled(
        format!(" {text}"),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )))
    .block(framed("", color))
}

fn display_history<'a>(entries: &'a [HistoryEntry], border: Color) -> List<'a> {
    let items: Vec<ListItem> = entries
        .iter()
        .map(|entry| {
            ListItem::new(Line::from(vec![
                Span::raw(" "),
                Span::styled(entry.query(), Style::default().fg(Color::Green)),
                Span::styled(
                    format!("  {}", entry.when()),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();
    List::new(items)
        .block(framed(" Recent Searches ", border).title_bottom(
            Line::from(" Ctrl-O open | Del remove | Ctrl-X clear ").right_aligned(),
        ))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
}

fn display_tabs<'a>(view: &View, border: Color) -> Tabs<'a> {
    let titles: Vec<Line> = view.tabs.iter().map(|t| Line::from(t.title())).collect();
    let selected = view
        .tabs
        .iter()
        .position(|t| *t == view.active_tab)
        .unwrap_or(0);
    Tabs::new(titles)
        .select(selected)
        .block(framed("", border))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
}

fn display_headline(location: &Location) -> Vec<Line<'static>> {
    let place = if location.region.is_empty() {
        location.country.clone()
    } else {
        format!("{}, {}", location.region, location.country)
    };
    vec![
        Line::from(vec![
            Span::raw(" "),
            Span::styled(
                location.name.clone(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" : "),
            Span::styled(place, Style::default().fg(Color::Blue)),
        ]),
        Line::from(format!(" {}", format_localtime(&location.localtime))),
    ]
}

fn display_current_conditions<'a>(current: &Current, unit: TemperatureUnit, border: Color) -> Table<'a> {
    let mut rows = vec![Row::new(vec![Cell::from("")])];

    let entries = [
        ("Temperature", temperature::display(current.temp_c, unit)),
        ("Feels like", temperature::display(current.feelslike_c, unit)),
        ("Humidity", format!("{}%", current.humidity)),
        ("Wind", format!("{} km/h", current.wind_kph)),
        ("Pressure", format!("{} mb", current.pressure_mb)),
        ("UV Index", current.uv.to_string()),
        (
            "Conditions",
            if current.description.is_empty() {
                MISSING.to_string()
            } else {
                condition_label(&current.description, &current.icon)
            },
        ),
    ];
    for (label, value) in entries {
        rows.push(Row::new(vec![
            Cell::from(format!(" {label}")),
            Cell::from(value).style(Style::default().fg(Color::Green)),
        ]));
    }

    Table::new(rows, [Constraint::Length(13), Constraint::Min(15)])
        .block(framed(" Current Conditions ", border))
}

fn alert_summary(alert: &Alert, selected: bool, expanded: bool) -> ListItem<'static> {
    let color = severity_color(alert.severity);
    let marker = if selected { ">" } else { " " };
    let mut lines = vec![Line::from(vec![
        Span::raw(format!("{marker} ")),
        Span::styled(
            alert.event.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("[{}]", alert.severity.label()),
            Style::default().fg(color),
        ),
    ])];
    if expanded {
        lines.push(Line::from(format!("   {}", alert.headline)));
        lines.push(Line::from(Span::styled(
            format!("   {}", alert.description),
            Style::default().add_modifier(Modifier::ITALIC),
        )));
        lines.push(Line::from(Span::styled(
            format!(
                "   From: {}  Until: {}",
                format_alert_time(&alert.effective),
                format_alert_time(&alert.expires)
            ),
            Style::default().fg(Color::DarkGray),
        )));
    }
    ListItem::new(lines)
}

fn alert_card(alert: &Alert) -> ListItem<'static> {
    let color = severity_color(alert.severity);
    ListItem::new(vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("▌", Style::default().fg(color)),
            Span::styled(
                alert.event.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                format!("[{}]", alert.severity.label()),
                Style::default().fg(color),
            ),
        ]),
        label_value("Headline", alert.headline.clone()),
        label_value("Details", alert.description.clone()),
        label_value("Areas", alert.areas.clone()),
        label_value("Category", alert.category.clone()),
        label_value("Urgency", alert.urgency.clone()),
        label_value("From", format_alert_time(&alert.effective)),
        label_value("Until", format_alert_time(&alert.expires)),
    ])
}

fn display_forecast_day(day: &Forecast, index: usize, unit: TemperatureUnit) -> Vec<Line<'static>> {
    vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(" {}", day.label(index)),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(format!(" {}", condition_label(&day.condition, &day.icon))),
        Line::from(vec![
            Span::raw(" "),
            Span::styled(
                temperature::degrees(day.max(unit)),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(" / "),
            Span::styled(
                temperature::degrees(day.min(unit)),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(""),
        label_value("Average", temperature::degrees(day.avg(unit))),
        label_value("Rain", format!("{}%", day.chance_of_rain)),
        label_value("Humidity", format!("{}%", day.avg_humidity)),
        label_value("Wind", format!("{} km/h", day.maxwind_kph)),
    ]
}

fn draw_current(f: &mut Frame, state: &ViewState, report: &Report, area: Rect, border: Color) {
    let alerts = &report.alerts;
    let alert_height = if alerts.is_empty() {
        0
    } else {
        let extra = if state.expanded_alert.is_some() { 3 } else { 0 };
        (alerts.len() + extra + 2) as u16
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(alert_height),
            Constraint::Min(9),
        ])
        .split(area);

    f.render_widget(Paragraph::new(display_headline(&report.location)), chunks[0]);

    if !alerts.is_empty() {
        let items: Vec<ListItem> = alerts
            .iter()
            .enumerate()
            .map(|(i, alert)| {
                alert_summary(alert, i == state.alert_cursor, state.expanded_alert == Some(i))
            })
            .collect();
        let title = format!(" Weather Alerts ({}) ", alerts.len());
        let list = List::new(items).block(
            framed("", border)
                .title(Span::styled(title, Style::default().fg(Color::Yellow)))
                .title_bottom(Line::from(" PgUp/PgDn select | Ctrl-E details ").right_aligned()),
        );
        f.render_widget(list, chunks[1]);
    }

    f.render_widget(
        display_current_conditions(&report.current, state.unit, border),
        chunks[2],
    );
}

fn draw_forecast(f: &mut Frame, state: &ViewState, report: &Report, area: Rect, border: Color) {
    if report.forecast.is_empty() {
        f.render_widget(
            Paragraph::new(format!(" {MISSING}")).block(framed(" Forecast ", border)),
            area,
        );
        return;
    }
    let share = 100 / report.forecast.len() as u16;
    let constraints: Vec<Constraint> = report
        .forecast
        .iter()
        .map(|_| Constraint::Percentage(share))
        .collect();
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);
    for (i, day) in report.forecast.iter().enumerate() {
        let widget = Paragraph::new(display_forecast_day(day, i, state.unit))
            .block(framed("", border));
        f.render_widget(widget, columns[i]);
    }
}

fn draw_map(f: &mut Frame, report: &Report, area: Rect, border: Color) {
    let location = &report.location;
    let lines = vec![
        Line::from(""),
        label_value("Latitude", location.lat.to_string()),
        label_value("Longitude", location.lon.to_string()),
        Line::from(""),
        Line::from(format!(" {}", location.map_url())),
        Line::from(""),
        Line::from(Span::styled(
            "Powered by Windy.com ",
            Style::default().fg(Color::DarkGray),
        ))
        .right_aligned(),
    ];
    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(framed(" Weather Map ", border)),
        area,
    );
}

fn draw_alerts(f: &mut Frame, report: &Report, area: Rect, border: Color) {
    let block = framed(" Weather Alerts ", border);
    if report.alerts.is_empty() {
        f.render_widget(
            Paragraph::new("\n No weather alerts for this location").block(block),
            area,
        );
        return;
    }
    let items: Vec<ListItem> = report.alerts.iter().map(alert_card).collect();
    f.render_widget(List::new(items).block(block), area);
}

pub fn draw(f: &mut Frame, state: &ViewState, view: &View) {
    let border = band_color(state.report.as_ref().map(|r| r.current.band()));

    let banner = |shown: bool| if shown { 3 } else { 0 };
    let history_height = if view.show_history {
        state.history.len() as u16 + 2
    } else {
        0
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(banner(view.error.is_some())),
            Constraint::Length(banner(view.location_notice.is_some())),
            Constraint::Length(history_height),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(f.area());

    f.render_widget(display_search(state, view, border), chunks[0]);

    if let Some(ref error) = view.error {
        f.render_widget(display_banner(error, Color::Red), chunks[1]);
    }
    if let Some(notice) = view.location_notice {
        f.render_widget(display_banner(notice, Color::Yellow), chunks[2]);
    }
    if view.show_history {
        let mut list_state = ListState::default().with_selected(Some(state.history_cursor));
        f.render_stateful_widget(
            display_history(state.history.entries(), border),
            chunks[3],
            &mut list_state,
        );
    }

    let report = match state.report {
        Some(ref report) if view.show_weather => report,
        _ => {
            let text = if view.spinner {
                "\n Fetching weather..."
            } else {
                "\n Search for a city to see its weather."
            };
            f.render_widget(
                Paragraph::new(text).block(framed("", border)),
                chunks[4].union(chunks[5]),
            );
            return;
        }
    };

    f.render_widget(display_tabs(view, border), chunks[4]);
    match view.active_tab {
        Tab::Current => draw_current(f, state, report, chunks[5], border),
        Tab::Forecast => draw_forecast(f, state, report, chunks[5], border),
        Tab::Map => draw_map(f, report, chunks[5], border),
        Tab::Alerts => draw_alerts(f, report, chunks[5], border),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::History;
    use crate::state::derive_view;
    use crate::store::PreferenceStore;
    use crate::weather::Location;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen(state: &ViewState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        let view = derive_view(state);
        terminal.draw(|f| draw(f, state, &view)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn loaded_state() -> ViewState {
        let mut state = ViewState::new(History::load(PreferenceStore::in_memory()));
        state.report = Some(Report {
            location: Location {
                name: "Paris".into(),
                region: "Ile-de-France".into(),
                country: "France".into(),
                localtime: "2025-06-03 14:05".into(),
                lat: 48.87,
                lon: 2.33,
            },
            current: Current {
                temp_c: 25.0,
                feelslike_c: 26.0,
                humidity: 40.0,
                wind_kph: 11.2,
                pressure_mb: 1016.0,
                uv: 6.0,
                description: "Sunny".into(),
                icon: String::new(),
            },
            forecast: Vec::new(),
            alerts: Vec::new(),
        });
        state
    }

    #[test]
    fn test_renders_current_conditions_in_selected_unit() {
        let mut state = loaded_state();
        assert!(screen(&state).contains("25°C"));
        state.toggle_unit();
        let text = screen(&state);
        assert!(text.contains("77°F"));
        assert!(text.contains("Paris"));
        assert!(!text.contains("Alerts"));
    }

    #[test]
    fn test_renders_error_banner_without_weather() {
        let mut state = ViewState::new(History::load(PreferenceStore::in_memory()));
        state.error = Some("City not found or API error.".into());
        let text = screen(&state);
        assert!(text.contains("City not found or API error."));
        assert!(text.contains("Search for a city"));
    }

    #[test]
    fn test_renders_map_tab() {
        let mut state = loaded_state();
        state.select_tab(Tab::Map);
        assert!(screen(&state).contains("windy.com"));
    }
}
