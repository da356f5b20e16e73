use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use inquire::{Confirm, InquireError, Password, PasswordDisplayMode, Text};
use skycast_core::{
    Config, Coordinates, FixedLocation, Geolocator, IpGeolocator, SearchHistory, SearchOutcome,
    Session, StateStore, WeatherClient, WeatherError, backend_from_config,
};

use crate::{render, speech::CommandSpeaker};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "AI-powered weather in your terminal")]
pub struct Cli {
    /// Increase log verbosity (-v, -vv). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the Gemini API key and preferences.
    Configure,

    /// Show weather for a city, your location, or the last city searched.
    Show {
        /// City name; defaults to the last city looked up.
        city: Option<String>,

        #[command(flatten)]
        location: LocationArgs,

        /// Print the record as JSON instead of a report.
        #[arg(long)]
        json: bool,

        /// Read a short summary aloud with the configured speech command.
        #[arg(long)]
        speak: bool,
    },

    /// List recent searches.
    History {
        /// Forget all recent searches.
        #[arg(long)]
        clear: bool,
    },

    /// Search repeatedly in an interactive session.
    Interactive,
}

#[derive(Debug, Args)]
pub struct LocationArgs {
    /// Look up weather for the current position (approximated from IP).
    #[arg(long, conflicts_with_all = ["city", "lat"])]
    here: bool,

    /// Latitude for a coordinate lookup.
    #[arg(long, requires = "lon", allow_negative_numbers = true, conflicts_with = "city")]
    lat: Option<f64>,

    /// Longitude for a coordinate lookup.
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,
}

impl LocationArgs {
    fn geolocator(&self) -> Result<Option<Box<dyn Geolocator>>, WeatherError> {
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            return Ok(Some(Box::new(FixedLocation(Coordinates::new(lat, lon)?))));
        }
        if self.here {
            return Ok(Some(Box::new(IpGeolocator::new())));
        }
        Ok(None)
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show {
                city,
                location,
                json,
                speak,
            } => show(city, location, json, speak).await,
            Command::History { clear } => history(clear),
            Command::Interactive => interactive().await,
        }
    }
}

fn open_session(config: &Config) -> Result<Session> {
    let backend = backend_from_config(config)?;
    let client = WeatherClient::new(backend).with_timeout(config.timeout());
    Ok(Session::new(
        client,
        StateStore::new(Config::state_file_path()?),
    ))
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("Gemini API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key.trim().to_string());
    }

    let model = Text::new("Model:")
        .with_default(config.model())
        .prompt()
        .context("Failed to read model")?;
    if let Some(gemini) = config.gemini.as_mut() {
        gemini.model = Some(model.trim().to_string()).filter(|m| !m.is_empty());
    }

    let fallback = Text::new("Fallback city:")
        .with_default(config.fallback_city())
        .prompt()
        .context("Failed to read fallback city")?;
    config.fallback_city = Some(fallback.trim().to_string()).filter(|c| !c.is_empty());

    let speech = Text::new("Speech command (optional, e.g. espeak or say):")
        .with_default(config.speech_command.as_deref().unwrap_or(""))
        .prompt()
        .context("Failed to read speech command")?;
    config.speech_command = Some(speech.trim().to_string()).filter(|s| !s.is_empty());

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(city: Option<String>, location: LocationArgs, json: bool, speak: bool) -> Result<()> {
    let config = Config::load()?;
    let mut session = open_session(&config)?;

    let query = match location.geolocator()? {
        Some(geo) => geo.locate().await?.to_query(),
        None => city.unwrap_or_else(|| session.startup_city(config.fallback_city())),
    };

    if let SearchOutcome::Updated(_) = session.search(&query).await? {
        if let Some(record) = session.current() {
            if json {
                println!("{}", serde_json::to_string_pretty(record)?);
            } else {
                print!("{}", render::report(record));
            }
            if speak {
                say(&config, &record.spoken_summary());
            }
        }
    }

    Ok(())
}

fn history(clear: bool) -> Result<()> {
    let mut history = SearchHistory::load(StateStore::new(Config::state_file_path()?));
    if clear {
        history.clear();
        println!("Search history cleared.");
    } else {
        print!("{}", render::history(history.entries()));
    }
    Ok(())
}

const INTERACTIVE_HELP: &str =
    "Enter a city, or :here, :history, :clear, :speak, :quit (Esc also quits)";

async fn interactive() -> Result<()> {
    let config = Config::load()?;
    let mut session = open_session(&config)?;
    let fallback = config.fallback_city().to_string();

    let first = session.startup_city(&fallback);
    search_and_print(&mut session, &first, &fallback).await;

    loop {
        let input = match Text::new("Search for a city:")
            .with_help_message(INTERACTIVE_HELP)
            .prompt()
        {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read search input"),
        };

        match input.trim() {
            ":quit" | ":q" => break,
            ":history" => print!("{}", render::history(session.history())),
            ":clear" => {
                session.clear_history();
                println!("Search history cleared.");
            }
            ":speak" => match session.current() {
                Some(record) => say(&config, &record.spoken_summary()),
                None => println!("Nothing to read yet."),
            },
            ":here" => match IpGeolocator::new().locate().await {
                Ok(coords) => search_and_print(&mut session, &coords.to_query(), &fallback).await,
                Err(e) => eprintln!("{e}"),
            },
            query => search_and_print(&mut session, query, &fallback).await,
        }
    }

    Ok(())
}

/// Run one search, printing either the report or the error. After a failed
/// lookup the fallback city is offered once.
async fn search_and_print(session: &mut Session, query: &str, fallback: &str) {
    match session.search(query).await {
        Ok(_) => {
            if let Some(record) = session.current() {
                print!("{}", render::report(record));
            }
        }
        Err(WeatherError::EmptyQuery) => eprintln!("{}", WeatherError::EmptyQuery),
        Err(e) => {
            eprintln!("{e}");
            if query.eq_ignore_ascii_case(fallback) {
                return;
            }
            let retry = Confirm::new(&format!("Try {fallback}?"))
                .with_default(true)
                .prompt()
                .unwrap_or(false);
            if retry {
                match session.search(fallback).await {
                    Ok(_) => {
                        if let Some(record) = session.current() {
                            print!("{}", render::report(record));
                        }
                    }
                    Err(e) => eprintln!("{e}"),
                }
            }
        }
    }
}

fn say(config: &Config, text: &str) {
    let Some(command) = config.speech_command.as_deref() else {
        eprintln!("No speech command configured. Run `skycast configure` to set one.");
        return;
    };

    if let Err(e) = CommandSpeaker::parse(command).and_then(|s| s.speak(text)) {
        eprintln!("{e:#}");
    }
}
