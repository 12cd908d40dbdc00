use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use podshelf::suggestion::StaticEntitlement;
use podshelf::{
    EpisodeRuleEvaluator, EventReporter, FolderItem, FolderManager, FolderSuggestionApplier,
    FolderSuggestionSync, JsonSettingsStore, Library, NoopReporter, OrganizerEvent,
    OrganizerOptions, PromptEligibility, RefreshOutcome, ReqwestClient, ServerSuggestionService,
    SharedEventReporter, SmartPlaylists, SuggestionPromptPolicy, SystemClock, UuidGenerator,
    load_snapshot, save_snapshot,
};

// Emoji with fallback for terminals without Unicode support
static SHELF: Emoji<'_, '_> = Emoji("📚 ", "");
static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "[~] ");
static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "[+] ");
static FAILURE: Emoji<'_, '_> = Emoji("❌ ", "[!] ");
static FOLDER: Emoji<'_, '_> = Emoji("📁 ", "[d] ");
static PLAYLIST: Emoji<'_, '_> = Emoji("🎧 ", "[p] ");
static PODCAST: Emoji<'_, '_> = Emoji("🎙️ ", "[-] ");

const LIBRARY_FILE: &str = "library.json";
const SETTINGS_FILE: &str = "settings.json";

/// Organize a podcast library into folders and smart playlists
#[derive(Parser, Debug)]
#[command(name = "podshelf")]
#[command(about = "Organize a podcast library into folders and smart playlists")]
#[command(version)]
struct Args {
    /// Directory holding library.json and settings.json
    #[arg(short, long, default_value = ".")]
    data_dir: PathBuf,

    /// JSON file with organizer options
    #[arg(short, long)]
    options: Option<PathBuf>,

    /// Quiet mode - suppress progress output
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ask the suggestion server for folders if subscriptions changed
    Refresh,

    /// Show pending folder suggestions
    Suggestions {
        /// Treat the user as a paying subscriber
        #[arg(long)]
        paid: bool,
    },

    /// Turn suggestions into folders, all of them when no name is given
    Apply { names: Vec<String> },

    /// Record that the suggestion prompt was dismissed
    Dismiss,

    /// List the podcasts screen: folders with their podcasts, and unfiled podcasts
    Folders,

    /// List smart playlists and their current episodes
    Playlists {
        /// Episodes shown per playlist
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },
}

/// Progress reporter using an indicatif spinner for the suggestion round trip
struct SpinnerReporter {
    spinner: ProgressBar,
}

impl SpinnerReporter {
    fn new() -> Result<Self> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner().template("{spinner:.green} {wide_msg}")?,
        );
        Ok(Self { spinner })
    }
}

impl EventReporter for SpinnerReporter {
    fn report(&self, event: OrganizerEvent) {
        match event {
            OrganizerEvent::SuggestionsUnchanged { subscribed } => {
                self.spinner.finish_with_message(format!(
                    "{SUCCESS}{} podcasts unchanged, suggestions are current",
                    subscribed.to_string().cyan()
                ));
            }

            OrganizerEvent::SuggestionsRequested { subscribed } => {
                self.spinner
                    .enable_steady_tick(std::time::Duration::from_millis(100));
                self.spinner.set_message(format!(
                    "{SEARCH}Asking for folder suggestions for {} podcasts",
                    subscribed.to_string().cyan()
                ));
            }

            OrganizerEvent::SuggestionsRefreshed { folders, podcasts } => {
                self.spinner.finish_with_message(format!(
                    "{SUCCESS}{} folders suggested covering {} podcasts",
                    folders.to_string().green().bold(),
                    podcasts.to_string().cyan()
                ));
            }

            OrganizerEvent::SuggestionsFailed { error } => {
                self.spinner.abandon_with_message(format!(
                    "{FAILURE}{} {}",
                    "Suggestion refresh failed:".red(),
                    error.dimmed()
                ));
            }

            OrganizerEvent::FolderCreated { name, podcasts, .. } => {
                println!(
                    "  {FOLDER}{} ({} podcasts)",
                    name.bold(),
                    podcasts.to_string().cyan()
                );
            }

            OrganizerEvent::SuggestionsApplied { folders, podcasts } => {
                println!(
                    "\n{SUCCESS}{} {} folders, {} podcasts moved",
                    "Applied:".bold().green(),
                    folders.to_string().green().bold(),
                    podcasts.to_string().cyan()
                );
            }
        }
    }
}

fn load_library(path: &Path) -> Result<Arc<Library>> {
    if !path.exists() {
        return Ok(Arc::new(Library::new()));
    }
    let library = load_snapshot(path)
        .with_context(|| format!("Failed to load library from {}", path.display()))?;
    Ok(Arc::new(library))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if !args.quiet {
        println!("\n{}{}\n", SHELF, "podshelf".bold().magenta());
    }

    let options = match &args.options {
        Some(path) => OrganizerOptions::load(path).context("Failed to load options")?,
        None => OrganizerOptions::default(),
    };

    let library_path = args.data_dir.join(LIBRARY_FILE);
    let library = load_library(&library_path)?;
    let settings = Arc::new(JsonSettingsStore::new(args.data_dir.join(SETTINGS_FILE)));
    let clock = SystemClock::shared();
    let ids = UuidGenerator::shared();

    let reporter: SharedEventReporter = if args.quiet {
        NoopReporter::shared()
    } else {
        Arc::new(SpinnerReporter::new()?)
    };

    match args.command {
        Command::Refresh => {
            let Some(endpoint) = options.suggestion_endpoint.as_deref() else {
                bail!("No suggestion_endpoint configured in the options file");
            };
            let service = ServerSuggestionService::new(ReqwestClient::new(), endpoint)
                .context("Invalid suggestion endpoint")?;
            let sync = FolderSuggestionSync::new(service, library.clone(), settings, reporter);

            let outcome = sync.refresh().await;
            save_snapshot(&library, &library_path).context("Failed to save library")?;
            if outcome == RefreshOutcome::Failed {
                std::process::exit(1);
            }
        }

        Command::Suggestions { paid } => {
            let applier = FolderSuggestionApplier::new(
                library,
                settings.clone(),
                clock.clone(),
                ids,
                reporter,
                &options,
            );
            let policy = SuggestionPromptPolicy::new(
                settings,
                StaticEntitlement::shared(paid.then(paid_subscription)),
                clock,
                &options,
            );

            for suggestion in applier.pending()? {
                println!(
                    "{FOLDER}{} {}",
                    suggestion.name.bold(),
                    format!("({} podcasts)", suggestion.podcasts.len()).dimmed()
                );
            }
            match policy.is_eligible_for_popup()? {
                PromptEligibility::Eligible => println!("\nPrompt: {}", "eligible".green()),
                PromptEligibility::Ineligible(reason) => {
                    println!("\nPrompt: {} ({reason:?})", "ineligible".yellow())
                }
            }
        }

        Command::Apply { names } => {
            let applier = FolderSuggestionApplier::new(
                library.clone(),
                settings,
                clock,
                ids,
                reporter,
                &options,
            );
            let selection: Vec<_> = applier
                .pending()?
                .into_iter()
                .filter(|suggestion| names.is_empty() || names.contains(&suggestion.name))
                .collect();
            if selection.is_empty() {
                bail!("No matching folder suggestions");
            }

            applier.use_suggested_folders(&selection)?;
            save_snapshot(&library, &library_path).context("Failed to save library")?;
        }

        Command::Dismiss => {
            let policy = SuggestionPromptPolicy::new(
                settings,
                StaticEntitlement::shared(None),
                clock,
                &options,
            );
            policy.mark_policy_used()?;
        }

        Command::Folders => {
            let manager = FolderManager::new(library, settings, clock, ids);
            for item in manager.home_folder()? {
                match item {
                    FolderItem::Folder(folder) => {
                        println!("{FOLDER}{}", folder.name.bold());
                        for podcast in manager.folder_podcasts_sorted(&folder.id)? {
                            println!("    {}", podcast.title);
                        }
                    }
                    FolderItem::Podcast(podcast) => println!("{PODCAST}{}", podcast.title),
                }
            }
        }

        Command::Playlists { limit } => {
            let playlists = SmartPlaylists::new(library.clone(), ids, settings);
            playlists
                .setup_defaults_with(|library| Ok(save_snapshot(library, &library_path)?))
                .context("Failed to save default playlists")?;

            let evaluator = EpisodeRuleEvaluator::new(library, clock);
            for playlist in playlists.list()? {
                let episodes = evaluator.evaluate(&playlist.rules, playlist.sort_type);
                println!(
                    "{PLAYLIST}{} {}",
                    playlist.name.bold(),
                    format!("({} episodes)", episodes.len()).dimmed()
                );
                for episode in episodes.iter().take(limit) {
                    println!("    {}", episode.title);
                }
            }
        }
    }

    Ok(())
}

fn paid_subscription() -> podshelf::suggestion::Subscription {
    podshelf::suggestion::Subscription {
        tier: podshelf::suggestion::SubscriptionTier::Plus,
        platform: podshelf::suggestion::SubscriptionPlatform::Web,
        expires_at: None,
    }
}
