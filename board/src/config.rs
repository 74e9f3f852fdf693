//! Runtime configuration, read from the command line and the environment.

use crate::gemini::{DEFAULT_GEMINI_BASE, DEFAULT_MODEL};
use crate::youtube_api::DEFAULT_API_BASE;
use eyre::{Context, bail};
use std::path::PathBuf;

/// The placeholder shipped in sample configuration files.
const CLIENT_ID_PLACEHOLDER: &str = "YOUR_GOOGLE_CLIENT_ID";

/// Where the board's channels come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum DataSource {
    /// The signed-in user's real subscriptions.
    #[default]
    Live,
    /// A fictional board made up by Gemini. No Google account needed.
    Synthetic,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Config {
    /// OAuth client id of the Google Cloud project.
    #[arg(long, env = "SUBBOARD_CLIENT_ID", global = true)]
    pub client_id: Option<String>,

    /// OAuth client secret, for client types that have one.
    #[arg(long, env = "SUBBOARD_CLIENT_SECRET", global = true, hide_env_values = true)]
    pub client_secret: Option<String>,

    /// API key for Gemini. Needed for summaries and for the synthetic source.
    #[arg(long, env = "GEMINI_API_KEY", global = true, hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    #[arg(long, env = "SUBBOARD_SOURCE", value_enum, default_value_t, global = true)]
    pub source: DataSource,

    #[arg(long, env = "SUBBOARD_YOUTUBE_API", default_value = DEFAULT_API_BASE, global = true)]
    pub youtube_api: String,

    #[arg(long, env = "SUBBOARD_GEMINI_API", default_value = DEFAULT_GEMINI_BASE, global = true)]
    pub gemini_api: String,

    #[arg(long, env = "SUBBOARD_GEMINI_MODEL", default_value = DEFAULT_MODEL, global = true)]
    pub gemini_model: String,

    /// Where the access token is kept between runs.
    #[arg(long, env = "SUBBOARD_CREDENTIAL_FILE", global = true)]
    pub credential_file: Option<PathBuf>,
}

impl Config {
    /// The OAuth client id, provided it looks like a real one.
    pub fn client_id(&self) -> eyre::Result<&str> {
        match self.client_id.as_deref().map(str::trim) {
            None | Some("") => bail!("no OAuth client id configured (set SUBBOARD_CLIENT_ID)"),
            Some(id) if id.starts_with(CLIENT_ID_PLACEHOLDER) => {
                bail!("the OAuth client id is still the placeholder {CLIENT_ID_PLACEHOLDER:?}")
            }
            Some(id) => Ok(id),
        }
    }

    pub fn gemini_api_key(&self) -> eyre::Result<&str> {
        match self.gemini_api_key.as_deref().map(str::trim) {
            None | Some("") => bail!("no Gemini API key configured (set GEMINI_API_KEY)"),
            Some(key) => Ok(key),
        }
    }

    /// The configured credential file, or one in the platform's config directory.
    pub fn credential_file(&self) -> eyre::Result<PathBuf> {
        if let Some(path) = &self.credential_file {
            return Ok(path.clone());
        }
        let dirs = directories::ProjectDirs::from("", "", "subscription-board")
            .ok_or_else(|| eyre::eyre!("no home directory to keep the credential in"))
            .context("locate config directory")?;
        Ok(dirs.config_dir().join("credential.json"))
    }
}
