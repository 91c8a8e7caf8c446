//! CLI commands

use anyhow::{Context, Result};
use clap::Subcommand;
use scribe_client::ApiClient;
use scribe_core::store::FileStore;
use scribe_core::types::{
    LoginRequest, PasswordChange, RegisterRequest, TranscriptionSource, UpdateProfileRequest, User,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::CliConfig;

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account and sign in
    Register {
        /// Full name
        #[arg(long)]
        name: String,

        /// Email address
        #[arg(long)]
        email: String,

        /// Password (at least 6 characters)
        #[arg(long)]
        password: String,
    },

    /// Sign in with an existing account
    Login {
        /// Email address
        #[arg(long)]
        email: String,

        /// Password
        #[arg(long)]
        password: String,
    },

    /// Sign out and drop the persisted session
    Logout,

    /// Show the signed-in account
    Whoami,

    /// Update profile name and bio
    Profile {
        /// Full name
        #[arg(long)]
        name: String,

        /// Short bio
        #[arg(long)]
        bio: Option<String>,
    },

    /// Change the account password
    Passwd {
        /// Current password
        #[arg(long)]
        current: String,

        /// New password (at least 6 characters)
        #[arg(long)]
        new: String,
    },

    /// List transcriptions
    List,

    /// Upload an audio file for transcription
    Transcribe {
        /// Audio file to upload
        file: PathBuf,

        /// Where the audio came from (inferred from the file name by default)
        #[arg(long, value_enum)]
        source: Option<SourceArg>,
    },

    /// Delete a transcription
    Delete {
        /// Transcription id
        id: String,
    },

    /// Write the active configuration to a file
    Config {
        /// Output file path (defaults to DATA_DIR/config.json)
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum SourceArg {
    Recording,
    Upload,
}

impl From<SourceArg> for TranscriptionSource {
    fn from(source: SourceArg) -> Self {
        match source {
            SourceArg::Recording => TranscriptionSource::Recording,
            SourceArg::Upload => TranscriptionSource::Upload,
        }
    }
}

impl Commands {
    pub async fn execute(self, config: CliConfig, fresh: bool) -> Result<()> {
        if let Commands::Config { output } = &self {
            return write_config(&config, output.clone());
        }

        let client = build_client(&config).await?;
        if fresh {
            info!("Discarding persisted session");
            client.clear_session().await;
        }

        match self {
            Commands::Register {
                name,
                email,
                password,
            } => register(&client, name, email, password).await,
            Commands::Login { email, password } => login(&client, email, password).await,
            Commands::Logout => logout(&client).await,
            Commands::Whoami => whoami(&client).await,
            Commands::Profile { name, bio } => update_profile(&client, name, bio).await,
            Commands::Passwd { current, new } => change_password(&client, current, new).await,
            Commands::List => list(&client).await,
            Commands::Transcribe { file, source } => transcribe(&client, file, source).await,
            Commands::Delete { id } => delete(&client, id).await,
            Commands::Config { .. } => unreachable!("handled above"),
        }
    }
}

async fn build_client(config: &CliConfig) -> Result<ApiClient> {
    let store = FileStore::open(config.session_file())
        .await
        .context("Failed to open the session store")?;

    let client = ApiClient::builder()
        .base_url(config.api_url.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(concat!("scribe/", env!("CARGO_PKG_VERSION")))
        .store(Arc::new(store))
        .build()
        .await?;
    Ok(client)
}

async fn register(
    client: &ApiClient,
    name: String,
    email: String,
    password: String,
) -> Result<()> {
    let user = client
        .register(&RegisterRequest {
            name,
            email,
            password,
        })
        .await?;
    println!("Registered and signed in as {} <{}>", user.name, user.email);
    Ok(())
}

async fn login(client: &ApiClient, email: String, password: String) -> Result<()> {
    let user = client.login(&LoginRequest { email, password }).await?;
    println!("Signed in as {} <{}>", user.name, user.email);
    Ok(())
}

async fn logout(client: &ApiClient) -> Result<()> {
    client.logout().await;
    println!("Signed out");
    Ok(())
}

async fn whoami(client: &ApiClient) -> Result<()> {
    let user = client.current_user().await?;
    print_user(&user);
    Ok(())
}

async fn update_profile(client: &ApiClient, name: String, bio: Option<String>) -> Result<()> {
    let user = client
        .update_profile(&UpdateProfileRequest { name, bio })
        .await?;
    println!("Profile updated");
    print_user(&user);
    Ok(())
}

async fn change_password(client: &ApiClient, current: String, new: String) -> Result<()> {
    let change = PasswordChange {
        current_password: current,
        new_password: new.clone(),
        confirm_password: new,
    };
    client.change_password(&change).await?;
    println!("Password changed");
    Ok(())
}

async fn list(client: &ApiClient) -> Result<()> {
    let transcriptions = client.list_transcriptions().await?;
    if transcriptions.is_empty() {
        println!("No transcriptions yet");
        return Ok(());
    }

    for item in &transcriptions {
        let confidence = item
            .confidence
            .map_or_else(|| "-".to_string(), |c| format!("{:.0}%", c * 100.0));
        println!(
            "{}  {}  {}  {}",
            item.id,
            item.created_at.format("%Y-%m-%d %H:%M"),
            confidence,
            item.original_name
        );
        println!("    {}", item.text);
    }
    Ok(())
}

async fn transcribe(client: &ApiClient, file: PathBuf, source: Option<SourceArg>) -> Result<()> {
    let audio = tokio::fs::read(&file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let file_name = file
        .file_name()
        .and_then(|name| name.to_str())
        .context("File name is not valid UTF-8")?
        .to_string();

    let source = source.map_or_else(
        || TranscriptionSource::from_file_name(&file_name),
        TranscriptionSource::from,
    );

    info!("Uploading {} ({} bytes)", file_name, audio.len());
    let record = client
        .create_transcription(audio, &file_name, source)
        .await?;

    println!("Transcribed {}:", record.original_name);
    println!("{}", record.text);
    if let Some(confidence) = record.confidence {
        println!("(confidence {:.0}%)", confidence * 100.0);
    }
    Ok(())
}

async fn delete(client: &ApiClient, id: String) -> Result<()> {
    client.delete_transcription(&id).await?;
    println!("Deleted {id}");
    Ok(())
}

fn print_user(user: &User) {
    println!("{} <{}>", user.name, user.email);
    if let Some(bio) = user.profile.as_ref().and_then(|p| p.bio.as_deref()) {
        if !bio.is_empty() {
            println!("{bio}");
        }
    }
}

fn write_config(config: &CliConfig, output: Option<PathBuf>) -> Result<()> {
    let path = output.unwrap_or_else(|| config.data_dir.join("config.json"));
    crate::config::save_config(config, &path)?;
    println!("Wrote configuration to: {}", path.display());
    Ok(())
}
