use clap::{Parser, Subcommand};
use eyre::Context;
use jiff::tz::TimeZone;
use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::StreamExt;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tubeview::detail::{DetailScreen, VideoDetail, load_detail};
use tubeview::feed::load_home_feed;
use tubeview::search::{DEFAULT_SORT, SORT_OPTIONS, SearchScreen};
use tubeview::sim::{SimulatedBackend, TerminalOrientation};
use tubeview::youtube_api::{SearchRequest, SortOrder};
use tubeview::{Config, VideoCard, WelcomeScreen, YouTubeClient};
use tubeview_player::{OverlayInput, PlaybackSnapshot, SkipDirection, TransportState};

/// How long to give the player to apply a command before printing its state.
const SETTLE: Duration = Duration::from_millis(50);

const PROGRESS_BAR_WIDTH: usize = 30;

#[derive(Parser)]
#[command(name = "tubeview", about = "Browse and watch YouTube videos from the terminal")]
struct Cli {
    /// Defaults to the welcome screen.
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show the welcome screen; a query typed on stdin continues as guest into search.
    Welcome,
    /// Show the home screen's topic rows.
    Feed,
    /// Search for videos.
    Search {
        /// Search terms.
        #[arg(required = true)]
        query: Vec<String>,
        #[arg(long, value_enum, default_value = "view-count")]
        order: SortOrder,
        /// Fetch this many results, following pages as needed.
        #[arg(long)]
        max: Option<usize>,
    },
    /// Show a video's details.
    Detail {
        video_id: String,
        /// The uploader's channel, if known; lets the channel load alongside the video.
        #[arg(long)]
        channel: Option<String>,
    },
    /// Play a video on a simulated player, controlled from stdin.
    Play {
        video_id: String,
        #[arg(long)]
        channel: Option<String>,
        /// Length of the simulated media, in seconds.
        #[arg(long, default_value_t = 600)]
        duration: u64,
    },
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().context("read configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .parse_lossy(config.log_directive()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let tz = TimeZone::system();
    match cli.command.unwrap_or(Command::Welcome) {
        Command::Welcome => welcome(&config, &tz).await,
        Command::Feed => feed(&config, &tz).await,
        Command::Search { query, order, max } => {
            search(&config, &tz, query.join(" "), order, max).await
        }
        Command::Detail { video_id, channel } => {
            detail(&config, &tz, &video_id, channel.as_deref()).await
        }
        Command::Play {
            video_id,
            channel,
            duration,
        } => play(&config, &tz, &video_id, channel.as_deref(), duration).await,
    }
}

fn print_card(card: &VideoCard) {
    println!("  {}  {}", card.published, card.title);
    println!(
        "              {}  https://youtu.be/{}",
        card.channel_title, card.video_id
    );
    println!(
        "              tubeview detail {} --channel {}",
        card.video_id, card.channel_id
    );
}

async fn welcome(config: &Config, tz: &TimeZone) -> eyre::Result<()> {
    let welcome = WelcomeScreen::new();
    println!("{}", welcome.text());
    println!();
    println!("{}", welcome.footer());
    for link in welcome.links() {
        println!("  {}: {}", link.label, link.url);
    }
    println!();
    println!("[{}] type a search and press enter (empty line quits)", welcome.guest_entry());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let Some(query) = lines.next_line().await.context("read search")? else {
        return Ok(());
    };
    let mut screen = welcome.continue_as_guest(tz.clone());
    screen.set_input(query);
    if !screen.submit() {
        return Ok(());
    }
    let client = YouTubeClient::from_config(config)?;
    screen.refresh(&client).await;
    print_search(&screen);
    Ok(())
}

async fn feed(config: &Config, tz: &TimeZone) -> eyre::Result<()> {
    let client = YouTubeClient::from_config(config)?;
    for section in load_home_feed(&client, tz).await {
        println!("== {}", section.title);
        if section.failed {
            println!("  (could not load)");
        }
        section.cards.iter().for_each(print_card);
        println!();
    }
    Ok(())
}

async fn search(
    config: &Config,
    tz: &TimeZone,
    query: String,
    order: SortOrder,
    max: Option<usize>,
) -> eyre::Result<()> {
    let client = YouTubeClient::from_config(config)?;

    if let Some(max) = max {
        let request = SearchRequest::builder()
            .query(query)
            .order(order)
            .max_results(max.clamp(1, 50) as u32)
            .build()
            .context("build search request")?;
        let results = client.search_all(request).take(max);
        let mut results = std::pin::pin!(results);
        while let Some(result) = results.next().await {
            let result = result.context("fetch search result")?;
            if let Some(card) = VideoCard::from_result(&result, tz) {
                print_card(&card);
            }
        }
        return Ok(());
    }

    let mut screen = SearchScreen::with_query(tz.clone(), &query);
    if order != DEFAULT_SORT {
        screen.open_sort_picker();
        screen.select_sort(order);
        screen.confirm_sort();
    }
    screen.refresh(&client).await;
    print_search(&screen);
    Ok(())
}

fn print_search(screen: &SearchScreen) {
    if let Some(info) = screen.info_text() {
        println!("{info}");
    }
    let picked = SORT_OPTIONS
        .iter()
        .find(|option| option.order == screen.order())
        .map_or("", |option| option.label);
    println!("{}  ({picked})", screen.sort_bar());
    println!();
    match screen.empty_text() {
        Some(empty) => println!("  {empty}"),
        None => screen.results().iter().for_each(print_card),
    }
}

fn print_detail(detail: &VideoDetail) {
    println!("{}", detail.title);
    println!("{}", detail.channel_title);
    println!("{} | {} | {}", detail.views, detail.likes, detail.published);
    if let Some(poster) = &detail.poster_url {
        println!("poster: {poster}");
    }
    if !detail.description.is_empty() {
        println!();
        println!("{}", detail.description);
    }
}

async fn detail(
    config: &Config,
    tz: &TimeZone,
    video_id: &str,
    channel_id: Option<&str>,
) -> eyre::Result<()> {
    let client = YouTubeClient::from_config(config)?;
    let detail = load_detail(&client, video_id, channel_id, tz)
        .await?
        .ok_or_else(|| eyre::eyre!("no video with id {video_id}"))?;
    print_detail(&detail);
    Ok(())
}

/// What one line typed during playback asks for.
#[derive(Debug, PartialEq)]
enum PlayCommand {
    Inputs(Vec<OverlayInput>),
    Quit,
}

const PLAY_HELP: &str = "commands: p play/pause, m mute, f/b skip 5s, s <x> <width> tap the \
                         scrub bar, F fullscreen, i picture-in-picture, q quit";

fn parse_play_command(line: &str) -> eyre::Result<Option<PlayCommand>> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };
    let inputs = match command {
        "q" => return Ok(Some(PlayCommand::Quit)),
        "p" => vec![OverlayInput::TogglePlayPause],
        "m" => vec![OverlayInput::ToggleMute],
        "f" => vec![OverlayInput::Skip(SkipDirection::Forward)],
        "b" => vec![OverlayInput::Skip(SkipDirection::Backward)],
        "F" => vec![OverlayInput::ToggleFullScreen],
        "i" => vec![OverlayInput::PictureInPicture],
        "s" => {
            let mut number = |what: &str| -> eyre::Result<f64> {
                words
                    .next()
                    .ok_or_else(|| eyre::eyre!("usage: s <x> <width>"))?
                    .parse()
                    .with_context(|| format!("parse {what}"))
            };
            let touch_x = number("touch position")?;
            let track_width_px = number("track width")?;
            vec![
                OverlayInput::ScrubLayout { track_width_px },
                OverlayInput::ScrubTap { touch_x },
            ]
        }
        other => eyre::bail!("unknown command '{other}'; {PLAY_HELP}"),
    };
    Ok(Some(PlayCommand::Inputs(inputs)))
}

fn status_line(snapshot: &PlaybackSnapshot) -> String {
    let filled = (snapshot.progress_fraction * PROGRESS_BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(PROGRESS_BAR_WIDTH);
    let mut line = format!(
        "[{}] {} [{}{}]",
        TransportState::from_paused(snapshot.paused),
        snapshot.label,
        "#".repeat(filled),
        "-".repeat(PROGRESS_BAR_WIDTH - filled),
    );
    if snapshot.muted {
        line.push_str(" muted");
    }
    if snapshot.full_screen {
        line.push_str(" fullscreen");
    }
    line
}

async fn play(
    config: &Config,
    tz: &TimeZone,
    video_id: &str,
    channel_id: Option<&str>,
    duration: u64,
) -> eyre::Result<()> {
    let detail = match YouTubeClient::from_config(config) {
        Ok(client) => load_detail(&client, video_id, channel_id, tz)
            .await?
            .ok_or_else(|| eyre::eyre!("no video with id {video_id}"))?,
        Err(e) => {
            tracing::warn!(error = %e, "playing without video details");
            VideoDetail {
                video_id: video_id.to_string(),
                title: video_id.to_string(),
                channel_title: String::new(),
                channel_avatar: None,
                description: String::new(),
                views: String::new(),
                likes: String::new(),
                published: String::new(),
                poster_url: None,
            }
        }
    };

    let backend = Arc::new(SimulatedBackend::new(Duration::from_secs(duration)));
    let mut screen = DetailScreen::enter(detail, backend, Arc::new(TerminalOrientation::default()));
    println!("{} ({})", screen.detail().title, screen.orientation());
    let snapshot = screen
        .player_mut()
        .wait_for(|snapshot| snapshot.duration > 0.0)
        .await?;
    println!("{PLAY_HELP}");
    println!("{}", status_line(&snapshot));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("read command")? {
        match parse_play_command(&line) {
            Ok(Some(PlayCommand::Quit)) => break,
            Ok(Some(PlayCommand::Inputs(inputs))) => {
                for input in inputs {
                    screen.player().send(input)?;
                }
            }
            // a blank line just prints the current state
            Ok(None) => {}
            Err(e) => {
                eprintln!("{e:#}");
                continue;
            }
        }
        tokio::time::sleep(SETTLE).await;
        println!("{}", status_line(&screen.player().snapshot()));
    }

    screen.leave().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_play_commands() {
        assert_eq!(parse_play_command("   ").unwrap(), None);
        assert_eq!(parse_play_command("q").unwrap(), Some(PlayCommand::Quit));
        assert_eq!(
            parse_play_command("f").unwrap(),
            Some(PlayCommand::Inputs(vec![OverlayInput::Skip(
                SkipDirection::Forward
            )]))
        );
        assert_eq!(
            parse_play_command("s 50 200").unwrap(),
            Some(PlayCommand::Inputs(vec![
                OverlayInput::ScrubLayout {
                    track_width_px: 200.0
                },
                OverlayInput::ScrubTap { touch_x: 50.0 },
            ]))
        );
    }

    #[test]
    fn rejects_bad_play_commands() {
        assert!(parse_play_command("s 50").is_err());
        assert!(parse_play_command("s fifty 200").is_err());
        assert!(parse_play_command("x").is_err());
    }

    #[test]
    fn status_line_shows_progress() {
        let snapshot = PlaybackSnapshot {
            paused: false,
            muted: true,
            full_screen: false,
            scrubbing: false,
            current_time: 45.0,
            duration: 120.0,
            progress_fraction: 0.375,
            label: "0:45/2:00".to_string(),
        };
        assert_eq!(
            status_line(&snapshot),
            "[playing] 0:45/2:00 [###########-------------------] muted"
        );
    }

    #[test]
    fn cli_parses() {
        let cli = Cli::try_parse_from(["tubeview", "search", "react", "hooks", "--order", "date"])
            .unwrap();
        match cli.command {
            Some(Command::Search { query, order, max }) => {
                assert_eq!(query.join(" "), "react hooks");
                assert_eq!(order, SortOrder::Date);
                assert_eq!(max, None);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn cli_defaults_to_welcome_and_takes_a_channel() {
        let cli = Cli::try_parse_from(["tubeview"]).unwrap();
        assert!(cli.command.is_none());

        let cli =
            Cli::try_parse_from(["tubeview", "detail", "abc", "--channel", "UCchannel"]).unwrap();
        match cli.command {
            Some(Command::Detail { video_id, channel }) => {
                assert_eq!(video_id, "abc");
                assert_eq!(channel.as_deref(), Some("UCchannel"));
            }
            _ => panic!("expected detail"),
        }
    }
}
