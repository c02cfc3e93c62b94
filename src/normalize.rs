//! Reshapes raw provider responses into the display model.
//!
//! Current conditions keep only the metric fields. Forecast days keep both
//! unit variants as supplied. Nothing is rounded here.

use crate::provider::{current, forecast};
use crate::weather::{Alert, Current, Forecast, Location, Report, Severity};

const MAX_FORECAST_DAYS: usize = 3;

pub fn report(current: current::Response, forecast: forecast::Response) -> Report {
    Report {
        location: location(current.location),
        current: conditions(current.current),
        forecast: days(forecast.forecast),
        alerts: alerts(forecast.alerts),
    }
}

fn location(raw: current::Location) -> Location {
    Location {
        name: raw.name,
        region: raw.region,
        country: raw.country,
        localtime: raw.localtime,
        lat: raw.lat,
        lon: raw.lon,
    }
}

fn conditions(raw: current::Current) -> Current {
    Current {
        temp_c: raw.temp_c,
        feelslike_c: raw.feelslike_c,
        humidity: raw.humidity,
        wind_kph: raw.wind_kph,
        pressure_mb: raw.pressure_mb,
        uv: raw.uv,
        description: raw.condition.text,
        icon: raw.condition.icon,
    }
}

fn days(raw: forecast::Forecast) -> Vec<Forecast> {
    raw.forecastday
        .into_iter()
        .take(MAX_FORECAST_DAYS)
        .map(|fc| Forecast {
            date: fc.date,
            maxtemp_c: fc.day.maxtemp_c,
            mintemp_c: fc.day.mintemp_c,
            avgtemp_c: fc.day.avgtemp_c,
            maxtemp_f: fc.day.maxtemp_f,
            mintemp_f: fc.day.mintemp_f,
            avgtemp_f: fc.day.avgtemp_f,
            condition: fc.day.condition.text,
            icon: fc.day.condition.icon,
            chance_of_rain: fc.day.daily_chance_of_rain,
            avg_humidity: fc.day.avghumidity,
            maxwind_kph: fc.day.maxwind_kph,
        })
        .collect()
}

fn alerts(raw: Option<forecast::Alerts>) -> Vec<Alert> {
    raw.unwrap_or_default()
        .alert
        .into_iter()
        .map(|a| Alert {
            headline: a.headline.unwrap_or_default(),
            severity: Severity::parse(a.severity.as_deref().unwrap_or_default()),
            urgency: a.urgency.unwrap_or_default(),
            areas: a.areas.unwrap_or_default(),
            category: a.category.unwrap_or_default(),
            event: a.event.unwrap_or_default(),
            effective: a.effective.unwrap_or_default(),
            expires: a.expires.unwrap_or_default(),
            description: a.desc.unwrap_or_default(),
        })
        .collect()
}
