use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use soundcloud_api::config::Config;
use soundcloud_api::error::{AppError, Result};
use soundcloud_api::soundcloud::{Consumer, Resource, Verb};
use soundcloud_api::util::parse_pair;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// OAuth consumer key (if not provided, will use stored key)
    #[arg(long, global = true)]
    pub consumer_key: Option<String>,

    /// OAuth consumer secret (if not provided, will use stored secret)
    #[arg(long, global = true)]
    pub consumer_secret: Option<String>,

    /// Save the provided consumer key and secret for future use
    #[arg(long)]
    pub save_consumer: bool,

    /// API base URL (OAuth commands default to the stored one, then the
    /// public API; `basic` defaults to the sandbox)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the OAuth handshake and store the resulting access token
    Authorize {
        /// Callback URL registered for the application
        #[arg(long, default_value = "oob")]
        callback: String,
    },
    /// Show the authenticated user
    Me,
    /// Send a signed request and print the response body
    Request {
        /// Resource path below the API base, or an absolute URL
        path: String,

        /// HTTP method
        #[arg(short = 'X', long, default_value = "GET")]
        method: Verb,

        /// Request parameter as key=value (repeatable)
        #[arg(short, long = "param", value_parser = parse_pair)]
        params: Vec<(String, String)>,

        /// Extra header as name=value (repeatable)
        #[arg(short = 'H', long = "header", value_parser = parse_pair)]
        headers: Vec<(String, String)>,

        /// Send this file as the raw request body instead of parameters
        #[arg(long)]
        data_file: Option<PathBuf>,
    },
    /// Upload a track
    Upload {
        /// Audio file to upload
        asset: PathBuf,

        /// Artwork image
        #[arg(long)]
        artwork: Option<PathBuf>,

        /// Track title
        #[arg(long)]
        title: Option<String>,

        /// Additional track field as key=value, e.g. track[sharing]=private
        #[arg(short, long = "field", value_parser = parse_pair)]
        fields: Vec<(String, String)>,

        /// Mime type of the audio file (guessed from the extension if omitted)
        #[arg(long)]
        asset_mime: Option<String>,

        /// Mime type of the artwork (guessed from the extension if omitted)
        #[arg(long)]
        artwork_mime: Option<String>,
    },
    /// Call the sandbox API with HTTP Basic credentials
    Basic {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,

        /// Resource to address, e.g. tracks, users, me
        resource: Resource,

        /// Method below the resource; omit to address the collection itself
        method: Option<String>,

        /// Path argument as key=value, e.g. user_id=42 or track_id=7 (repeatable)
        #[arg(short, long = "arg", value_parser = parse_pair)]
        args: Vec<(String, String)>,

        /// Query parameter as key=value (repeatable)
        #[arg(short, long = "query", value_parser = parse_pair)]
        query: Vec<(String, String)>,

        /// HTTP method
        #[arg(short = 'X', long = "method", default_value = "GET")]
        verb: Verb,

        /// Form field as key=value sent with POST, PUT or DELETE (repeatable)
        #[arg(short, long = "field", value_parser = parse_pair)]
        fields: Vec<(String, String)>,
    },
    /// Forget the stored access token
    ClearToken,
}

impl Cli {
    pub fn parse() -> Self {
        Parser::parse()
    }

    pub fn resolve_consumer(&self, config: &mut Config) -> Result<Consumer> {
        let consumer = match (&self.consumer_key, &self.consumer_secret) {
            (Some(key), Some(secret)) => {
                let consumer = Consumer::new(key, secret);
                if self.save_consumer {
                    config.save_consumer(&consumer)?;
                    tracing::info!("Saved consumer credentials for future use");
                }
                consumer
            }
            (None, None) => config.consumer().ok_or_else(|| AppError::Configuration(
                "No consumer credentials provided or stored. Use --consumer-key and --consumer-secret, adding --save-consumer to store them".into()
            ))?,
            _ => {
                return Err(AppError::Configuration(
                    "--consumer-key and --consumer-secret must be given together".into(),
                ))
            }
        };

        Ok(consumer)
    }

    pub fn resolve_base_url(&self, config: &Config) -> Option<String> {
        self.base_url
            .clone()
            .or_else(|| config.base_url().map(str::to_string))
    }

    /// Only an explicit flag: the stored base URL points at the OAuth API
    pub fn basic_base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn resolve_timeout(&self, config: &Config) -> Option<Duration> {
        self.timeout.map(Duration::from_secs).or_else(|| config.timeout())
    }
}
