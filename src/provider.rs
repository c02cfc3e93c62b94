use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ProviderError;
use crate::normalize;
use crate::weather::Report;

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";

const USER_AGENT: &str = concat!("wxlookup/", env!("CARGO_PKG_VERSION"));
const FORECAST_DAYS: &str = "3";

// weatherapi.com: "No matching location found."
const NO_MATCHING_LOCATION: i64 = 1006;

pub mod current {
    use super::*;

    #[derive(Deserialize, Debug)]
    pub struct Response {
        pub location: Location,
        pub current: Current,
    }

    #[derive(Deserialize, Debug)]
    pub struct Location {
        pub name: String,
        #[serde(default)]
        pub region: String,
        pub country: String,
        pub lat: f64,
        pub lon: f64,
        #[serde(default)]
        pub localtime: String,
    }

    #[derive(Deserialize, Debug)]
    pub struct Current {
        pub temp_c: f64,
        pub feelslike_c: f64,
        pub humidity: f64,
        pub wind_kph: f64,
        pub pressure_mb: f64,
        pub uv: f64,
        pub condition: Condition,
    }

    #[derive(Deserialize, Debug, Default)]
    pub struct Condition {
        #[serde(default)]
        pub text: String,
        #[serde(default)]
        pub icon: String,
    }
}

pub mod forecast {
    use super::*;

    pub use super::current::Condition;

    #[derive(Deserialize, Debug)]
    pub struct Response {
        pub forecast: Forecast,

        // absent when the area has no active alerts
        #[serde(default)]
        pub alerts: Option<Alerts>,
    }

    #[derive(Deserialize, Debug)]
    pub struct Forecast {
        pub forecastday: Vec<ForecastDay>,
    }

    #[derive(Deserialize, Debug)]
    pub struct ForecastDay {
        pub date: chrono::NaiveDate,
        pub day: Day,
    }

    #[derive(Deserialize, Debug)]
    pub struct Day {
        pub maxtemp_c: f64,
        pub mintemp_c: f64,
        pub avgtemp_c: f64,
        pub maxtemp_f: f64,
        pub mintemp_f: f64,
        pub avgtemp_f: f64,
        #[serde(default)]
        pub condition: Condition,
        #[serde(default)]
        pub daily_chance_of_rain: f64,
        pub maxwind_kph: f64,
        pub avghumidity: f64,
    }

    #[derive(Deserialize, Debug, Default)]
    pub struct Alerts {
        #[serde(default)]
        pub alert: Vec<Alert>,
    }

    /// Every field is optional in practice; providers send nulls freely.
    #[derive(Deserialize, Debug, Default)]
    pub struct Alert {
        pub headline: Option<String>,
        pub severity: Option<String>,
        pub urgency: Option<String>,
        pub areas: Option<String>,
        pub category: Option<String>,
        pub event: Option<String>,
        pub effective: Option<String>,
        pub expires: Option<String>,
        pub desc: Option<String>,
    }
}

#[derive(Deserialize, Debug)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize, Debug)]
struct ErrorDetail {
    code: i64,
    message: String,
}

/// Client for the two weatherapi.com endpoints a lookup needs.
#[derive(Debug, Clone)]
pub struct Gateway {
    client: Client,
    base_url: String,
    api_key: String,
}

impl Gateway {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Looks up a place name or a `"<lat>,<lon>"` pair.
    ///
    /// Current conditions and forecast are requested concurrently and both
    /// must succeed; there is no partial result.
    pub async fn fetch(&self, query: &str) -> Result<Report, ProviderError> {
        tracing::debug!(query, "requesting current conditions and forecast");
        let (current, forecast) = tokio::try_join!(
            self.get::<current::Response>("current.json", query, &[("aqi", "no")]),
            self.get::<forecast::Response>(
                "forecast.json",
                query,
                &[("days", FORECAST_DAYS), ("aqi", "no"), ("alerts", "yes")],
            ),
        )?;
        Ok(normalize::report(current, forecast))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}/{endpoint}", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("q", query)])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(status_error(status.as_u16(), &body, query));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

fn status_error(status: u16, body: &str, query: &str) -> ProviderError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { error }) if error.code == NO_MATCHING_LOCATION => {
            ProviderError::NotFound(query.to_string())
        }
        Ok(ErrorBody { error }) => ProviderError::Status {
            status,
            message: error.message,
        },
        Err(_) => ProviderError::Status {
            status,
            message: body.chars().take(200).collect(),
        },
    }
}
