use crate::adapter::appstore::storefront::{DEFAULT_COUNTRY, parse_overrides};
use crate::adapter::appstore::{DEFAULT_HINTS_BASE_URL, DEFAULT_SEARCH_BASE_URL};
use crate::error::ConfigError;
use crate::report::ReportVariant;
use crate::scoring::{PriorityTable, UnlistedKeywordPolicy};
use crate::service::is_country_code;
use clap::{Args, Parser, Subcommand};
use reqwest::Url;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_USER_AGENT: &str =
    "AppStore/3.0 iOS/14.4 model/iPhone13,2 hwp/t8101 build/18D52 (6; dt:202)";

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Port to check when the `healthcheck` subcommand was given.
    pub fn healthcheck_port(&self) -> Option<u16> {
        match &self.command {
            Some(Command::Healthcheck { port }) => Some(port.unwrap_or(self.config.port)),
            _ => None,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run the HTTP service (default)
    Serve,
    /// Generate one report and print it or write it to a file
    Report(ReportArgs),
    /// Check GET /health of a running service; exits non-zero on failure
    Healthcheck {
        /// Port to check (defaults to the configured listen port)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ReportArgs {
    /// App Store id of the tracked app
    #[arg(long)]
    pub app_id: String,

    /// Competitor app named in the report header (repeatable)
    #[arg(long = "competitor")]
    pub competitors: Vec<String>,

    /// Keyword to check (repeatable); the priority table when omitted
    #[arg(long = "keyword")]
    pub keywords: Vec<String>,

    /// Storefront country for this run
    #[arg(long)]
    pub country: Option<String>,

    #[arg(long, value_enum, default_value_t = ReportVariant::Enriched)]
    pub variant: ReportVariant,

    #[arg(long)]
    pub title: Option<String>,

    /// Write the Markdown here (plus a `.json` sidecar) instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct Config {
    /// HTTP listen port
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// HTTP listen host
    #[arg(long, env = "BIND_HOST", default_value = "0.0.0.0")]
    pub bind_host: String,

    /// Timeout for every App Store request, in seconds
    #[arg(long, env = "APPSTORE_HTTP_TIMEOUT", default_value_t = 10)]
    pub http_timeout_secs: u64,

    /// Default storefront country
    #[arg(long, env = "APPSTORE_COUNTRY", default_value = DEFAULT_COUNTRY)]
    pub country: String,

    #[arg(long, env = "APPSTORE_HINTS_BASE_URL", default_value = DEFAULT_HINTS_BASE_URL)]
    pub hints_base_url: String,

    #[arg(long, env = "APPSTORE_SEARCH_BASE_URL", default_value = DEFAULT_SEARCH_BASE_URL)]
    pub search_base_url: String,

    #[arg(long, env = "APPSTORE_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Fixed Accept-Language; follows the country when unset
    #[arg(long, env = "APPSTORE_ACCEPT_LANGUAGE")]
    pub accept_language: Option<String>,

    /// Storefront overrides, e.g. `US=143441-1,29;CN=143465-19,29`
    #[arg(long, env = "APPSTORE_STOREFRONT_OVERRIDES", default_value = "")]
    pub storefront_overrides: String,

    /// How deep to page through search results for the app's rank
    #[arg(long, env = "APPSTORE_MAX_RANK", default_value_t = 200)]
    pub max_rank: u32,

    /// Pause between keywords of one report, in milliseconds
    #[arg(long, env = "APPSTORE_REQUEST_DELAY_MS", default_value_t = 0)]
    pub request_delay_ms: u64,

    /// JSON priority table; the built-in table when unset
    #[arg(long = "priority-table", env = "PRIORITY_TABLE_PATH")]
    pub priority_table_path: Option<PathBuf>,

    /// Handling of rank-based keywords missing from the priority table
    #[arg(long = "unlisted-policy", env = "UNLISTED_KEYWORD_POLICY", value_enum, default_value_t)]
    pub unlisted_policy: UnlistedKeywordPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_host: "0.0.0.0".to_string(),
            http_timeout_secs: 10,
            country: DEFAULT_COUNTRY.to_string(),
            hints_base_url: DEFAULT_HINTS_BASE_URL.to_string(),
            search_base_url: DEFAULT_SEARCH_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: None,
            storefront_overrides: String::new(),
            max_rank: 200,
            request_delay_ms: 0,
            priority_table_path: None,
            unlisted_policy: UnlistedKeywordPolicy::Zero,
        }
    }
}

impl Config {
    /// Validates the settings and returns an error if invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(invalid("port", "must not be 0"));
        }
        if self.bind_host.trim().is_empty() {
            return Err(invalid("bind_host", "must not be empty"));
        }
        if self.http_timeout_secs == 0 {
            return Err(invalid("http_timeout_secs", "must be greater than 0"));
        }
        if !is_country_code(self.country.trim()) {
            return Err(invalid(
                "country",
                format!("expected a two-letter code, got {:?}", self.country),
            ));
        }
        validate_http_url("hints_base_url", &self.hints_base_url)?;
        validate_http_url("search_base_url", &self.search_base_url)?;
        if self.user_agent.trim().is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }
        if self.max_rank == 0 {
            return Err(invalid("max_rank", "must be greater than 0"));
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn storefront_overrides(&self) -> HashMap<String, String> {
        parse_overrides(&self.storefront_overrides)
    }

    pub fn default_country(&self) -> String {
        self.country.trim().to_uppercase()
    }

    pub fn accept_language(&self) -> Option<String> {
        self.accept_language
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
    }

    /// Load the priority table from `priority_table_path`, or the built-in one.
    pub fn priority_table(&self) -> Result<PriorityTable, ConfigError> {
        match &self.priority_table_path {
            Some(path) => PriorityTable::from_json_file(path),
            None => Ok(PriorityTable::builtin()),
        }
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        name,
        reason: reason.into(),
    }
}

fn validate_http_url(name: &'static str, raw: &str) -> Result<(), ConfigError> {
    let url = Url::parse(raw).map_err(|e| invalid(name, format!("{raw:?}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(name, format!("unsupported scheme {other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_port() {
        let config = Config {
            port: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { name: "port", .. })
        ));
    }

    #[test]
    fn rejects_blank_host_and_zero_timeout() {
        let blank = Config {
            bind_host: "  ".into(),
            ..Config::default()
        };
        assert!(blank.validate().is_err());

        let no_timeout = Config {
            http_timeout_secs: 0,
            ..Config::default()
        };
        assert!(no_timeout.validate().is_err());
    }

    #[test]
    fn rejects_non_http_base_url() {
        let config = Config {
            search_base_url: "ftp://itunes.apple.com".into(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                name: "search_base_url",
                ..
            })
        ));

        let garbage = Config {
            hints_base_url: "not a url".into(),
            ..Config::default()
        };
        assert!(garbage.validate().is_err());
    }

    #[test]
    fn rejects_zero_max_rank_and_bad_country() {
        let config = Config {
            max_rank: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let country = Config {
            country: "USA".into(),
            ..Config::default()
        };
        assert!(country.validate().is_err());
    }

    #[test]
    fn parses_flags_and_subcommand() {
        let cli = Cli::try_parse_from([
            "aso-keywords",
            "--port",
            "9100",
            "--unlisted-policy",
            "reject",
            "report",
            "--app-id",
            "6740720452",
            "--competitor",
            "Photomath",
            "--competitor",
            "Gauthmath",
            "--variant",
            "basic",
        ])
        .unwrap();

        assert_eq!(cli.config.port, 9100);
        assert_eq!(cli.config.unlisted_policy, UnlistedKeywordPolicy::Reject);
        let Some(Command::Report(args)) = cli.command else {
            panic!("expected report subcommand");
        };
        assert_eq!(args.app_id, "6740720452");
        assert_eq!(args.competitors, vec!["Photomath", "Gauthmath"]);
        assert_eq!(args.variant, ReportVariant::Basic);
        assert!(args.keywords.is_empty());
    }

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["aso-keywords"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.healthcheck_port(), None);
    }

    #[test]
    fn healthcheck_uses_listen_port_unless_overridden() {
        let cli = Cli::try_parse_from(["aso-keywords", "--port", "9100", "healthcheck"]).unwrap();
        assert_eq!(cli.healthcheck_port(), Some(9100));

        let cli = Cli::try_parse_from(["aso-keywords", "healthcheck", "--port", "9200"]).unwrap();
        assert_eq!(cli.healthcheck_port(), Some(9200));

        let cli = Cli::try_parse_from(["aso-keywords", "report", "--app-id", "1"]).unwrap();
        assert_eq!(cli.healthcheck_port(), None);
    }

    #[test]
    fn accept_language_blank_is_unset() {
        let config = Config {
            accept_language: Some("  ".into()),
            ..Config::default()
        };
        assert_eq!(config.accept_language(), None);
    }

    #[test]
    fn priority_table_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"keyword": "Sovi AI", "priority": 90}}]"#).unwrap();

        let config = Config {
            priority_table_path: Some(file.path().to_path_buf()),
            ..Config::default()
        };
        let table = config.priority_table().unwrap();
        assert_eq!(table.get("sovi ai"), Some(90));
    }

    #[test]
    fn missing_priority_table_file_is_an_error() {
        let config = Config {
            priority_table_path: Some(PathBuf::from("/nonexistent/table.json")),
            ..Config::default()
        };
        assert!(matches!(
            config.priority_table(),
            Err(ConfigError::PriorityTable { .. })
        ));
    }
}
