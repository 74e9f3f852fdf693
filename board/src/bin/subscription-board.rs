use clap::{Parser, Subcommand};
use eyre::{Context, OptionExt};
use std::io::IsTerminal;
use subscription_board::render::render_board;
use subscription_board::{
    BoardState, ChannelSource, Config, Controller, DataSource, DemoIdentity, FileCredentialStore,
    GeminiClient, GoogleIdentity, IdentityProvider, LiveSource, SummaryCards, SummaryRequester,
    SyntheticSource,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// The newest video from each of your YouTube subscriptions.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Show the board, connecting first if needed (the default).
    Board {
        /// Keep the board open and accept commands on stdin.
        #[arg(long, short)]
        interactive: bool,
    },
    /// Connect a Google account.
    Login,
    /// Disconnect and forget the stored credential.
    Logout,
    /// Summarize the latest video of one of the board's channels.
    Summarize { video_id: String },
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = &cli.config;
    let http = reqwest::Client::new();

    let gemini = match config.gemini_api_key() {
        Ok(key) => Some(
            GeminiClient::new(key, http.clone())
                .with_base_url(config.gemini_api.as_str())
                .with_model(config.gemini_model.as_str()),
        ),
        Err(e) => {
            tracing::debug!(error = %e, "summaries unavailable");
            None
        }
    };
    let store = FileCredentialStore::new(config.credential_file()?);
    tracing::debug!(path = %store.path().display(), "credential file");

    match config.source {
        DataSource::Live => {
            let identity = GoogleIdentity::new(config.client_id()?, config.client_secret.clone());
            let source = LiveSource::new(http).with_base_url(config.youtube_api.as_str());
            run(&cli, Controller::new(identity, source, store), gemini).await
        }
        DataSource::Synthetic => {
            let gemini = gemini
                .ok_or_eyre("the synthetic source needs a Gemini API key (set GEMINI_API_KEY)")?;
            let source = SyntheticSource::new(gemini.clone());
            run(&cli, Controller::new(DemoIdentity, source, store), Some(gemini)).await
        }
    }
}

async fn run<I, S>(
    cli: &Cli,
    mut controller: Controller<I, S, FileCredentialStore>,
    gemini: Option<GeminiClient>,
) -> eyre::Result<()>
where
    I: IdentityProvider,
    S: ChannelSource,
{
    let mut progress = controller.subscribe();
    tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            match *progress.borrow_and_update() {
                BoardState::Authenticating => eprintln!("Waiting for Google sign-in..."),
                BoardState::Loading => eprintln!("Loading subscriptions..."),
                _ => {}
            }
        }
    });

    let summaries = gemini.map(SummaryRequester::new);
    let mut cards = SummaryCards::default();

    match cli.command.clone().unwrap_or(Command::Board { interactive: false }) {
        Command::Board { interactive } => {
            controller.start().await?;
            if !controller.is_logged_in() {
                controller.login().await?;
            }
            show(&controller, &cards);
            if interactive {
                interact(&mut controller, &mut cards, summaries.as_ref()).await?;
            }
        }
        Command::Login => {
            controller.login().await?;
            show(&controller, &cards);
        }
        Command::Logout => {
            let had_session = controller.restore().await?;
            // clears whatever is on disk even without a usable credential
            controller.logout().await?;
            eprintln!("{}", if had_session { "Disconnected." } else { "Not connected." });
        }
        Command::Summarize { video_id } => {
            let summaries = summaries
                .ok_or_eyre("summaries need a Gemini API key (set GEMINI_API_KEY)")?;
            controller.start().await?;
            let state = controller.state();
            let channel = state
                .channels()
                .iter()
                .find(|c| c.latest_video.video_id == video_id)
                .ok_or_else(|| eyre::eyre!("video {video_id} is not on the board"))?;
            let summary = summaries
                .summarize(&channel.latest_video.title, &channel.channel_name)
                .await
                .context("generate summary")?;
            println!("{summary}");
        }
    }
    Ok(())
}

fn show<I, S>(controller: &Controller<I, S, FileCredentialStore>, cards: &SummaryCards)
where
    I: IdentityProvider,
    S: ChannelSource,
{
    print!(
        "{}",
        render_board(&controller.state(), cards, jiff::Timestamp::now())
    );
}

const HELP: &str = "commands: r (reload), s <n> (toggle summary of card n), l (login), o (logout), q (quit)";

async fn interact<I, S>(
    controller: &mut Controller<I, S, FileCredentialStore>,
    cards: &mut SummaryCards,
    summaries: Option<&SummaryRequester>,
) -> eyre::Result<()>
where
    I: IdentityProvider,
    S: ChannelSource,
{
    eprintln!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("read command")? {
        let mut words = line.split_whitespace();
        match (words.next(), words.next()) {
            (Some("q"), _) => break,
            (Some("r"), _) => {
                cards.clear();
                controller.reload().await?;
            }
            (Some("l"), _) => {
                cards.clear();
                controller.login().await?;
            }
            (Some("o"), _) => {
                cards.clear();
                controller.logout().await?;
            }
            (Some("s"), Some(n)) => {
                let Some(summaries) = summaries else {
                    eprintln!("summaries need a Gemini API key (set GEMINI_API_KEY)");
                    continue;
                };
                let state = controller.state();
                let card = n
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| state.channels().get(i));
                let Some(channel) = card else {
                    eprintln!("no card {n}");
                    continue;
                };
                cards
                    .toggle(&channel.latest_video, &channel.channel_name, summaries)
                    .await;
            }
            (None, _) => continue,
            _ => {
                eprintln!("{HELP}");
                continue;
            }
        }
        show(controller, cards);
    }
    Ok(())
}
