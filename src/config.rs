use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Args;
use crate::error::ConfigError;
use crate::locate::{Coordinates, Locator};

const APP_DIR: &str = "wxlookup";
const LOG_FILE: &str = "wxlookup.log";

/// How "use my location" is satisfied.
#[derive(Debug, Clone, PartialEq)]
pub enum LocateMode {
    Fixed(Coordinates),
    Ip(String),
    Disabled,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub data_dir: PathBuf,
    pub log_file: PathBuf,
    pub locate: LocateMode,
    pub timeout: Duration,
    pub initial_query: Option<String>,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let api_key = args
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let locate = match (args.no_geolocation, args.lat, args.lon) {
            (true, _, _) => LocateMode::Disabled,
            (false, Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                    return Err(ConfigError::CoordinatesOutOfRange { lat, lon });
                }
                LocateMode::Fixed(Coordinates { lat, lon })
            }
            (false, None, None) => LocateMode::Ip(args.locate_url),
            (false, _, _) => return Err(ConfigError::HalfCoordinates),
        };

        let data_dir = match args.data_dir {
            Some(dir) => dir,
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(ConfigError::NoDataDir)?,
        };
        let log_file = args.log_file.unwrap_or_else(|| data_dir.join(LOG_FILE));

        Ok(Self {
            api_key,
            base_url: args.base_url,
            data_dir,
            log_file,
            locate,
            timeout: Duration::from_secs(args.timeout_secs.max(1)),
            initial_query: args.query.filter(|q| !q.trim().is_empty()),
        })
    }

    pub fn locator(&self) -> Result<Locator, reqwest::Error> {
        Ok(match &self.locate {
            LocateMode::Fixed(coords) => Locator::Fixed(*coords),
            LocateMode::Ip(url) => Locator::ip(url, self.timeout)?,
            LocateMode::Disabled => Locator::Disabled,
        })
    }
}
