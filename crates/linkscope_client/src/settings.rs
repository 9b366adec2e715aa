use std::path::PathBuf;
use std::time::Duration;

use url::Url;

/// Base URL used when neither the environment nor the command line names one.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Root of the diagnostics agent, e.g. `http://127.0.0.1:8080`.
    pub base_url: Url,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// First delay of the stream reconnect backoff.
    pub stream_backoff_base: Duration,
    /// Ceiling the reconnect backoff doubles up to.
    pub stream_backoff_cap: Duration,
    /// Directory evidence bundles are saved into.
    pub download_dir: PathBuf,
}

impl ClientSettings {
    /// Settings for the given agent, defaults everywhere else.
    pub fn with_base(base_url: Url) -> Self {
        Self {
            base_url,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            stream_backoff_base: Duration::from_secs(1),
            stream_backoff_cap: Duration::from_secs(30),
            download_dir: PathBuf::from("."),
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self::with_base(Url::parse(DEFAULT_BASE_URL).expect("static default url"))
    }
}
