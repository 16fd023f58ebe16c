//! Command line configuration.
//!
//! Every connection option can also be set from the environment.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `ELASTICO_HOST` | localhost | Elasticsearch host |
//! | `ELASTICO_PORT` | 9200 | Elasticsearch HTTP port |
//! | `ELASTICO_SCHEME` | http | `http` or `https` |
//! | `ELASTICO_CONNECT_TIMEOUT_MS` | 1000 | Connect timeout (ms) |
//! | `ELASTICO_SOCKET_TIMEOUT_MS` | 5000 | Per-request timeout (ms) |
//! | `ELASTICO_USERNAME` | | Basic auth user |
//! | `ELASTICO_PASSWORD` | | Basic auth password |
//! | `ELASTICO_LOG_LEVEL` | info | Log level |

use clap::{Args, Parser, Subcommand};
use elastico_search::{ElasticsearchAuth, ElasticsearchConfig, PageRequest};

/// Command line client for the `blog` index.
#[derive(Debug, Clone, Parser)]
#[command(name = "elastico")]
#[command(about = "Stores and searches blog paragraphs in Elasticsearch")]
pub struct CliConfig {
    /// Elasticsearch host.
    #[arg(long, env = "ELASTICO_HOST", default_value = "localhost")]
    pub host: String,

    /// Elasticsearch HTTP port.
    #[arg(short, long, env = "ELASTICO_PORT", default_value = "9200")]
    pub port: u16,

    /// URL scheme (http or https).
    #[arg(long, env = "ELASTICO_SCHEME", default_value = "http")]
    pub scheme: String,

    /// Time allowed to reach the node, in milliseconds.
    #[arg(long, env = "ELASTICO_CONNECT_TIMEOUT_MS", default_value = "1000")]
    pub connect_timeout_ms: u64,

    /// Time allowed for each request, in milliseconds.
    #[arg(long, env = "ELASTICO_SOCKET_TIMEOUT_MS", default_value = "5000")]
    pub socket_timeout_ms: u64,

    /// Basic auth user name.
    #[arg(long, env = "ELASTICO_USERNAME")]
    pub username: Option<String>,

    /// Basic auth password.
    #[arg(long, env = "ELASTICO_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "ELASTICO_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// What to do once connected.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Report cluster health.
    Ping,
    /// Create the blog index with its mapping, if missing.
    Init,
    /// Save the sample paragraphs.
    Seed,
    /// Paragraphs by a writer (all name terms must match one writer).
    FindByWriter {
        /// Writer name.
        name: String,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Paragraphs carrying a tag.
    FindByTag {
        /// Exact tag.
        tag: String,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Paragraphs by a writer carrying a tag.
    FindByWriterAndTag {
        /// Writer name.
        name: String,
        /// Exact tag.
        tag: String,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Full-text match on titles.
    Search {
        /// Text to match.
        text: String,
        /// Require every term to match.
        #[arg(long)]
        all: bool,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Tags ordered by number of paragraphs.
    TopTags {
        /// Maximum number of tags.
        #[arg(long, default_value = "10")]
        size: u32,
    },
    /// Number of stored paragraphs.
    Count,
    /// Delete every paragraph.
    Reset,
}

/// Paging options shared by the finders.
#[derive(Debug, Clone, Copy, Args)]
pub struct PageArgs {
    /// Zero-based page number.
    #[arg(long, default_value = "0")]
    pub page: u32,

    /// Page size.
    #[arg(long, default_value = "10")]
    pub size: u32,
}

impl From<PageArgs> for PageRequest {
    fn from(args: PageArgs) -> Self {
        PageRequest::of(args.page, args.size)
    }
}

impl CliConfig {
    /// Validates the configuration and returns any errors.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("Port cannot be 0".to_string());
        }

        if self.scheme != "http" && self.scheme != "https" {
            errors.push(format!("Unsupported scheme '{}'", self.scheme));
        }

        if self.connect_timeout_ms == 0 || self.socket_timeout_ms == 0 {
            errors.push("Timeouts cannot be 0".to_string());
        }

        if self.username.is_some() != self.password.is_some() {
            errors.push("Username and password must be given together".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Client configuration for these options.
    pub fn elasticsearch_config(&self) -> ElasticsearchConfig {
        let auth = match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some(ElasticsearchAuth::Basic {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        };

        ElasticsearchConfig {
            scheme: self.scheme.clone(),
            connect_timeout_ms: self.connect_timeout_ms,
            socket_timeout_ms: self.socket_timeout_ms,
            auth,
            ..ElasticsearchConfig::new(self.host.clone(), self.port)
        }
    }
}
