use std::path::PathBuf;

use clap::builder::{styling::AnsiColor, Styles};
use clap::Parser;

use crate::locate::DEFAULT_LOCATE_URL;
use crate::provider::DEFAULT_BASE_URL;

const ABOUT: &str = "Weather lookup TUI";

const LONG_ABOUT: &str = "
TUI for looking up current conditions, a 3 day forecast and active alerts for any city, using
data from weatherapi.com.

Give a city on the command line to look it up right away; otherwise `wxlookup` starts by trying
your location. The last five cities you looked up and your temperature unit are saved, so they are
still there the next time you run `wxlookup`.

Keys: Enter search, Tab/Shift-Tab switch tabs, Ctrl-G my location, Ctrl-U toggle C/F,
Up/Down pick a recent search, Ctrl-O open it, Del remove it, Ctrl-X clear all,
PgUp/PgDn pick an alert, Ctrl-E expand it, Esc dismiss error, Ctrl-C quit.
";

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default())
    .usage(AnsiColor::Green.on_default())
    .literal(AnsiColor::Green.on_default())
    .placeholder(AnsiColor::Green.on_default());

#[derive(Parser, Debug)]
#[command(version, styles=STYLES, about=ABOUT, long_about = LONG_ABOUT)]
pub struct Args {
    #[arg(help = "City to look up at startup (e.g. \"London\", \"Paris, France\")")]
    pub query: Option<String>,

    #[arg(long, env = "WEATHERAPI_KEY", hide_env_values = true, help = "weatherapi.com API key")]
    pub api_key: Option<String>,

    #[arg(long, env = "WEATHERAPI_URL", default_value = DEFAULT_BASE_URL, help = "Weather API base URL")]
    pub base_url: String,

    #[arg(long, help = "Directory for saved searches, preferences and the log")]
    pub data_dir: Option<PathBuf>,

    #[arg(long, allow_hyphen_values = true, help = "Latitude used for \"my location\"")]
    pub lat: Option<f64>,

    #[arg(long, allow_hyphen_values = true, help = "Longitude used for \"my location\"")]
    pub lon: Option<f64>,

    #[arg(long, help = "Disable \"my location\" entirely")]
    pub no_geolocation: bool,

    #[arg(long, default_value = DEFAULT_LOCATE_URL, help = "IP geolocation endpoint")]
    pub locate_url: String,

    #[arg(long, default_value_t = 10, help = "HTTP timeout in seconds")]
    pub timeout_secs: u64,

    #[arg(long, help = "Log file (defaults to wxlookup.log in the data directory)")]
    pub log_file: Option<PathBuf>,
}
