use std::path::PathBuf;

use big_red_button_core::{
    calculate_font_size, AnimationEstimator, AppConfig, CascadeTiming, CatalogSet, Display,
    DisplayCommand, InteractionDispatcher, RecordingDisplay, TimedAudioBackend,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod script;

use script::Step;

fn main() -> big_red_button_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            catalog,
            level,
            script,
        } => run_session(
            config.as_ref(),
            catalog.as_ref(),
            level.as_deref(),
            script.as_ref(),
        ),
        Commands::Timing { config, words } => run_timing(config.as_ref(), &words),
    }
}

fn run_session(
    config: Option<&PathBuf>,
    catalog: Option<&PathBuf>,
    level: Option<&str>,
    script: Option<&PathBuf>,
) -> big_red_button_core::Result<()> {
    let config = load_config(config)?;
    let source = match script {
        Some(path) => std::fs::read_to_string(path)?,
        None => script::DEFAULT_SCRIPT.to_string(),
    };
    let steps = script::parse(&source)?;

    let mut display = RecordingDisplay::new();
    let catalogs = match catalog {
        Some(path) => match CatalogSet::load(path) {
            Ok(catalogs) => catalogs,
            Err(err) => {
                tracing::error!(%err, path = %path.display(), "cannot initialise catalog");
                display.alert(&format!("Could not load content: {err}"));
                report(&mut display);
                return Ok(());
            }
        },
        None => CatalogSet::builtin(),
    };

    let mut audio = TimedAudioBackend::default();
    let mut dispatcher = InteractionDispatcher::new(config, catalogs);
    let levels: Vec<&str> = dispatcher.catalogs().level_names().collect();
    tracing::info!(?levels, "catalog ready");
    if let Err(err) = dispatcher.start(&mut display) {
        tracing::error!(%err, "session started without working controls");
    }
    if let Some(level) = level {
        dispatcher.handle(
            big_red_button_core::InputEvent::SelectLevel(level.to_string()),
            &mut display,
            &mut audio,
        );
    }

    tracing::info!(steps = steps.len(), "replaying script");
    for step in steps {
        match step {
            Step::Input(event) => dispatcher.handle(event, &mut display, &mut audio),
            Step::Wait(delta) => {
                dispatcher.advance(delta, &mut display);
            }
            Step::Settle => {
                dispatcher.run_until_idle(&mut display);
            }
            Step::ClearSound => dispatcher.clear_playback(),
        }
        report(&mut display);
    }

    tracing::info!(
        elapsed_ms = dispatcher.now().as_millis() as u64,
        index = dispatcher.sequencer().current_index(),
        busy = dispatcher.is_busy(),
        sounds = audio.played().len(),
        "session finished"
    );
    for url in audio.played() {
        tracing::info!(url, "sound played");
    }
    Ok(())
}

fn run_timing(config: Option<&PathBuf>, words: &[String]) -> big_red_button_core::Result<()> {
    let config = load_config(config)?;
    let timing = CascadeTiming::from_config(&config.timing);

    for word in words {
        let letters = word.chars().count();
        println!(
            "{word}: {letters} letters, font {:.2}rem, animation {}ms",
            calculate_font_size(letters, &config.font),
            timing.word_duration(word).as_millis()
        );
    }
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> big_red_button_core::Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load(path),
        None => Ok(AppConfig::default()),
    }
}

fn report(display: &mut RecordingDisplay) {
    for command in display.take_commands() {
        match command {
            DisplayCommand::Background(image) => tracing::info!(%image, "background"),
            DisplayCommand::Word {
                text,
                font_size_rem,
            } => tracing::info!(%text, font_size_rem, "word"),
            DisplayCommand::Alert(message) => tracing::warn!(%message, "alert"),
            other => tracing::debug!(?other, "display"),
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Big red button for small hands", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay an input script against the engine on a virtual clock.
    Run {
        /// JSON configuration file; defaults apply when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// JSON catalog with one or more levels; the built-in animals otherwise.
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Level to switch to after start-up.
        #[arg(short, long)]
        level: Option<String>,
        /// Script file to replay; a short demo session otherwise.
        #[arg(short, long)]
        script: Option<PathBuf>,
    },
    /// Print font size and entrance length for each word.
    Timing {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Words to measure.
        #[arg(required = true)]
        words: Vec<String>,
    },
}
