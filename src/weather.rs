use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

use crate::units::temperature::TemperatureUnit;

#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub name: String,
    pub region: String,
    pub country: String,
    pub localtime: String,
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    /// The query string used to look this place up again.
    pub fn query(&self) -> String {
        format!("{}, {}", self.name, self.country)
    }

    pub fn map_url(&self) -> String {
        format!("https://www.windy.com/?rain,{},{},8", self.lat, self.lon)
    }
}

/// Current conditions in canonical units: Celsius, km/h and mb.
#[derive(Debug, Clone, PartialEq)]
pub struct Current {
    pub temp_c: f64,
    pub feelslike_c: f64,
    pub humidity: f64,
    pub wind_kph: f64,
    pub pressure_mb: f64,
    pub uv: f64,
    pub description: String,
    pub icon: String,
}

impl Current {
    pub fn band(&self) -> TemperatureBand {
        TemperatureBand::of(self.temp_c)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub date: NaiveDate,
    pub maxtemp_c: f64,
    pub mintemp_c: f64,
    pub avgtemp_c: f64,
    pub maxtemp_f: f64,
    pub mintemp_f: f64,
    pub avgtemp_f: f64,
    pub condition: String,
    pub icon: String,
    pub chance_of_rain: f64,
    pub avg_humidity: f64,
    pub maxwind_kph: f64,
}

impl Forecast {
    pub fn max(&self, unit: TemperatureUnit) -> f64 {
        match unit {
            TemperatureUnit::Celsius => self.maxtemp_c,
            TemperatureUnit::Fahrenheit => self.maxtemp_f,
        }
    }

    pub fn min(&self, unit: TemperatureUnit) -> f64 {
        match unit {
            TemperatureUnit::Celsius => self.mintemp_c,
            TemperatureUnit::Fahrenheit => self.mintemp_f,
        }
    }

    pub fn avg(&self, unit: TemperatureUnit) -> f64 {
        match unit {
            TemperatureUnit::Celsius => self.avgtemp_c,
            TemperatureUnit::Fahrenheit => self.avgtemp_f,
        }
    }

    /// "Today" for the first day, otherwise e.g. "Tuesday, Jun 3".
    pub fn label(&self, index: usize) -> String {
        if index == 0 {
            "Today".to_string()
        } else {
            self.date.format("%A, %b %-d").to_string()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Minor,
    Moderate,
    Severe,
    Extreme,
    Unknown,
}

impl Severity {
    pub fn parse(text: &str) -> Self {
        match text.trim().to_ascii_lowercase().as_str() {
            "minor" => Self::Minor,
            "moderate" => Self::Moderate,
            "severe" => Self::Severe,
            "extreme" => Self::Extreme,
            _ => Self::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Minor => "Minor",
            Self::Moderate => "Moderate",
            Self::Severe => "Severe",
            Self::Extreme => "Extreme",
            Self::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub headline: String,
    pub severity: Severity,
    pub urgency: String,
    pub areas: String,
    pub category: String,
    pub event: String,
    pub effective: String,
    pub expires: String,
    pub description: String,
}

/// Condition text, marked when the provider's icon is a night variant.
pub fn condition_label(text: &str, icon: &str) -> String {
    if icon.contains("/night/") {
        format!("{text} (night)")
    } else {
        text.to_string()
    }
}

/// Provider timestamps are RFC 3339; anything else is shown as received.
pub fn format_alert_time(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(date) => DateTime::<Local>::from(date)
            .format("%d-%m-%Y %H:%M")
            .to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Provider local time is "YYYY-MM-DD HH:MM".
pub fn format_localtime(raw: &str) -> String {
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M") {
        Ok(date) => date.format("%d-%m-%Y %H:%M").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Rough feel of the current temperature, used to tint the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureBand {
    Hot,
    Warm,
    Mild,
    Cool,
    Cold,
}

impl TemperatureBand {
    pub fn of(temp_c: f64) -> Self {
        if temp_c > 30.0 {
            Self::Hot
        } else if temp_c > 20.0 {
            Self::Warm
        } else if temp_c > 10.0 {
            Self::Mild
        } else if temp_c > 0.0 {
            Self::Cool
        } else {
            Self::Cold
        }
    }
}

/// Everything one successful lookup produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub location: Location,
    pub current: Current,
    pub forecast: Vec<Forecast>,
    pub alerts: Vec<Alert>,
}
