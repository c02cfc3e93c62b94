//! "Use my location": resolves the user's approximate coordinates.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::error::LocateError;

pub const DEFAULT_LOCATE_URL: &str = "http://ip-api.com/json";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Query string form understood by the weather provider.
    pub fn query(&self) -> String {
        format!("{},{}", self.lat, self.lon)
    }
}

#[derive(Deserialize, Debug)]
struct IpLookup {
    status: String,
    #[serde(default)]
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

#[derive(Debug, Clone)]
pub enum Locator {
    /// Coordinates supplied up front on the command line.
    Fixed(Coordinates),
    /// Approximate position derived from the public IP address.
    Ip { client: Client, url: String },
    Disabled,
}

impl Locator {
    pub fn ip(url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::Ip {
            client,
            url: url.to_string(),
        })
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Disabled)
    }

    pub async fn resolve(&self) -> Result<Coordinates, LocateError> {
        match self {
            Self::Fixed(coords) => Ok(*coords),
            Self::Disabled => Err(LocateError::Unavailable),
            Self::Ip { client, url } => lookup_ip(client, url).await,
        }
    }
}

async fn lookup_ip(client: &Client, url: &str) -> Result<Coordinates, LocateError> {
    let response = client.get(url).send().await.map_err(request_error)?;
    if !response.status().is_success() {
        return Err(LocateError::Denied(format!(
            "status {}",
            response.status()
        )));
    }
    let body: IpLookup = response.json().await.map_err(request_error)?;

    match (body.status.as_str(), body.lat, body.lon) {
        ("success", Some(lat), Some(lon)) => {
            tracing::debug!(lat, lon, "resolved location from IP");
            Ok(Coordinates { lat, lon })
        }
        _ => Err(LocateError::Denied(
            body.message.unwrap_or_else(|| body.status.clone()),
        )),
    }
}

fn request_error(err: reqwest::Error) -> LocateError {
    if err.is_timeout() {
        LocateError::Timeout
    } else {
        LocateError::Denied(err.to_string())
    }
}
