use crate::widget::{InputMetrics, WidgetSettings};
use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Environment prefix for `config` overrides, e.g. `CHAT_WIDGET__SERVER__PORT`.
pub const ENV_PREFIX: &str = "CHAT_WIDGET";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Chat backend endpoint
    #[arg(long, env = "CHAT_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Ignore submits while a request is in flight (bare flag means true)
    #[arg(long, env = "SINGLE_FLIGHT", num_args = 0..=1, default_missing_value = "true")]
    pub single_flight: Option<bool>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub widget: WidgetConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// Directory served under `/static`.
    pub static_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub url: Url,
    /// Unset means requests never time out.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WidgetConfig {
    pub popup_delay_ms: u64,
    pub hover_gate_ms: u64,
    pub input_min_height_px: u32,
    pub input_max_height_px: u32,
    pub input_line_height_px: u32,
    pub single_flight: bool,
    pub fallback_message: String,
    /// Widgets with no activity and no open stream for this long are dropped.
    pub idle_timeout_ms: u64,
}

impl BackendConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

impl WidgetConfig {
    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    #[must_use]
    pub fn settings(&self) -> WidgetSettings {
        WidgetSettings {
            popup_delay: Duration::from_millis(self.popup_delay_ms),
            hover_gate: Duration::from_millis(self.hover_gate_ms),
            input: InputMetrics {
                min_height: self.input_min_height_px,
                max_height: self.input_max_height_px,
                line_height: self.input_line_height_px,
            },
            single_flight: self.single_flight,
            fallback_message: self.fallback_message.clone(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let defaults = WidgetSettings::default();
        let mut builder = Config::builder();

        // 1. Defaults
        builder = builder
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.static_dir", "static")?
            .set_default("backend.url", "http://127.0.0.1:5000/chat")?
            .set_default("widget.popup_delay_ms", 3000)?
            .set_default("widget.hover_gate_ms", 3000)?
            .set_default("widget.input_min_height_px", defaults.input.min_height)?
            .set_default("widget.input_max_height_px", defaults.input.max_height)?
            .set_default("widget.input_line_height_px", defaults.input.line_height)?
            .set_default("widget.single_flight", false)?
            .set_default("widget.fallback_message", defaults.fallback_message)?
            .set_default("widget.idle_timeout_ms", 30 * 60 * 1000)?;

        // 2. Config file: explicit path, else ./config.{yaml,toml,json} if present
        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path)),
            None => builder.add_source(File::with_name("config").required(false)),
        };

        // 3. Environment variables, e.g. CHAT_WIDGET__SERVER__PORT=8000
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        // 4. CLI flags (clap also fills these from their own env vars)
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(url) = cli.backend_url {
            builder = builder.set_override("backend.url", url)?;
        }
        if let Some(single_flight) = cli.single_flight {
            builder = builder.set_override("widget.single_flight", single_flight)?;
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }
}
