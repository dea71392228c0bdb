use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use hidelink::config::{HiddenLinkSettings, SettingsStore};
use hidelink::input::controller::{copy_payload, link_at_offset, CopyOutcome, Sinks};
use hidelink::model::content::Node;
use hidelink::model::document::Document;
use hidelink::services::clipboard::{Notifier, SystemClipboard};
use hidelink::session::{document_container, document_links, post_process};
use hidelink::view::static_render::Strategy;

/// Render and inspect hidden hyperlinks (`::payload|display::`)
#[derive(Debug, Parser)]
#[command(name = "hidelink", version)]
struct Cli {
    /// Settings file (defaults to <config dir>/hidelink/settings.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render a file with every hidden link collapsed
    Render {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
        #[arg(long, value_enum, default_value_t = ScanStrategy::Container)]
        strategy: ScanStrategy,
    },
    /// List every hidden link in a file
    List { file: PathBuf },
    /// Copy the payload of the hidden link at a byte offset
    Copy { file: PathBuf, offset: usize },
    /// Print the effective settings
    Config {
        /// Write the effective settings to the settings file
        #[arg(long)]
        init: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Html,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ScanStrategy {
    Container,
    PerNode,
}

impl From<ScanStrategy> for Strategy {
    fn from(strategy: ScanStrategy) -> Self {
        match strategy {
            ScanStrategy::Container => Strategy::Container,
            ScanStrategy::PerNode => Strategy::PerTextNode,
        }
    }
}

/// Prints notifications to stdout.
struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn notify(&mut self, message: &str) {
        println!("{message}");
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("HIDELINK_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Command::Render {
            file,
            format,
            strategy,
        } => render(&file, &settings, format, strategy.into()),
        Command::List { file } => list(&file, &settings.snapshot()),
        Command::Copy { file, offset } => copy(&file, offset, &settings.snapshot()),
        Command::Config { init } => show_config(&settings, init),
    }
}

fn load_settings(path: Option<&Path>) -> Result<SettingsStore> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match SettingsStore::default_path() {
            Some(path) => path,
            None => return Ok(SettingsStore::default()),
        },
    };
    SettingsStore::load(&path).with_context(|| format!("loading settings from {}", path.display()))
}

fn read(file: &Path) -> Result<String> {
    std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))
}

fn render(file: &Path, settings: &SettingsStore, format: Format, strategy: Strategy) -> Result<()> {
    let document = Document::new(read(file)?);
    let mut container = document_container(&document);

    let replaced = post_process(&mut container, settings, strategy);
    tracing::debug!("replaced {replaced} hidden links in {}", file.display());

    match format {
        Format::Html => println!("{}", container.to_html()),
        Format::Text => {
            let Node::Element(div) = &container else {
                bail!("rendered container is not an element");
            };
            for paragraph in &div.children {
                println!("{}", paragraph.text_content());
            }
        }
    }
    Ok(())
}

fn list(file: &Path, settings: &HiddenLinkSettings) -> Result<()> {
    let document = Document::new(read(file)?);
    for (line, link) in document_links(&document, settings) {
        println!(
            "{line}:{}..{}\t{}\t{}",
            link.start, link.end, link.display, link.payload
        );
    }
    Ok(())
}

fn copy(file: &Path, offset: usize, settings: &HiddenLinkSettings) -> Result<()> {
    let document = Document::new(read(file)?);
    let Some(link) = link_at_offset(&document, offset, settings) else {
        bail!("no hidden link at offset {offset}");
    };

    let mut clipboard = SystemClipboard::new().context("opening the system clipboard")?;
    let mut notifier = StdoutNotifier;
    let mut sinks = Sinks {
        clipboard: &mut clipboard,
        notifier: &mut notifier,
    };
    match copy_payload(&link.payload, settings, &mut sinks) {
        CopyOutcome::Copied => Ok(()),
        CopyOutcome::Failed => bail!("failed to copy the payload at offset {offset}"),
    }
}

fn show_config(settings: &SettingsStore, init: bool) -> Result<()> {
    if init {
        settings.save().context("writing settings")?;
        if let Some(path) = settings.path() {
            eprintln!("wrote {}", path.display());
        }
    }
    println!("{}", serde_json::to_string_pretty(settings.snapshot().as_ref())?);
    Ok(())
}
