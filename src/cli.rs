use std::path::{Path, PathBuf};

mod terminal;

use clap::ArgAction;
use dossier::{
    RunOptions, Status, docx,
    pipeline::{self, Disposition, RunSummary},
};
use indicatif::ProgressBar;
use tracing::instrument;

/// Command-line interface for dossier assembly.
#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    /// Dispatches the selected subcommand.
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);
        self.command.run()
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

/// Available subcommands.
#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Extract a document's PDF hyperlinks and assemble the dossier
    Run(Run),

    /// List the PDF hyperlinks found in a document without processing them
    Links(Links),
}

impl Command {
    fn run(self) -> anyhow::Result<()> {
        match self {
            Self::Run(command) => command.run(),
            Self::Links(command) => command.run(),
        }
    }
}

/// Output format for the run summary.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum SummaryFormat {
    /// Human-readable table.
    #[default]
    Table,
    /// Machine-readable JSON on stdout.
    Json,
}

/// Arguments of the `run` subcommand.
#[derive(Debug, clap::Parser)]
#[allow(clippy::struct_excessive_bools)]
pub struct Run {
    /// The Word document whose hyperlinks drive the run
    document: PathBuf,

    /// Flat directory searched for the referenced PDFs
    source: PathBuf,

    /// Directory receiving the PDFs, the report and a copy of the document
    dest: PathBuf,

    /// Keep original filenames instead of applying the numbered prefix
    #[arg(long)]
    no_rename: bool,

    /// Skip the generated numbered cover page
    #[arg(long)]
    no_cover: bool,

    /// Localized "Document Number" label used on covers and in filenames
    #[arg(long, default_value = RunOptions::DEFAULT_LABEL)]
    label: String,

    /// Continue without asking when some referenced PDFs are missing
    #[arg(long, short)]
    yes: bool,

    /// Reveal the destination folder when the run completes
    #[arg(long)]
    open: bool,

    /// Output format for the run summary
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    format: SummaryFormat,
}

impl Run {
    #[instrument(skip(self))]
    fn run(self) -> anyhow::Result<()> {
        use terminal::Colorize;

        anyhow::ensure!(
            self.source.is_dir(),
            "source directory {} does not exist",
            self.source.display()
        );

        let links = docx::extract_links(&self.document)?;
        if links.is_empty() {
            println!("No PDF hyperlinks found in the document.");
            return Ok(());
        }
        println!("Found {} PDF links", links.len());

        let resolution = pipeline::resolve(&links, &self.source);
        if !resolution.missing().is_empty() {
            println!(
                "{}",
                format!(
                    "⚠️  {} PDF files were not found in the source folder",
                    resolution.missing().len()
                )
                .warning()
            );
            for link in resolution.missing() {
                println!("  • {}", link.basename());
            }
            if !self.yes {
                let proceed = dialoguer::Confirm::new()
                    .with_prompt(format!(
                        "Continue with the {} available PDFs only?",
                        resolution.found().len()
                    ))
                    .default(false)
                    .interact()?;
                if !proceed {
                    println!("Cancelled");
                    std::process::exit(130);
                }
            }
        }

        let options = RunOptions {
            document: self.document,
            source_dir: self.source,
            dest_dir: self.dest,
            rename: !self.no_rename,
            cover: !self.no_cover,
            label: self.label,
        };

        let progress = ProgressBar::new(u64::try_from(resolution.found().len()).unwrap_or(0));
        let summary = pipeline::execute(&options, &links, &resolution, |outcome| {
            progress.set_message(outcome.destination.clone());
            progress.inc(1);
        })?;
        progress.finish_and_clear();

        match self.format {
            SummaryFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
            SummaryFormat::Table => print_summary(&summary),
        }

        if self.open {
            reveal(&options.dest_dir);
        }
        Ok(())
    }
}

fn print_summary(summary: &RunSummary) {
    use terminal::Colorize;

    println!();
    for outcome in &summary.outcomes {
        let verdict = match outcome.disposition {
            Disposition::Stamped => "stamped".to_string(),
            Disposition::Copied => "copied".to_string(),
            Disposition::FallbackCopied => "copied without cover".warning(),
            Disposition::Failed => "FAILED".warning(),
        };
        println!("  • {} → {} ({verdict})", outcome.basename, outcome.destination);
    }
    if summary.missing > 0 {
        println!(
            "{}",
            format!("⚠️  {} of {} links had no PDF in the source folder", summary.missing, summary.links).warning()
        );
    }
    println!(
        "{}",
        format!(
            "✅ Processing completed: {} of {} PDFs delivered. Report saved at {}",
            summary.delivered(),
            summary.found,
            summary.report.display()
        )
        .success()
    );
}

/// Best-effort reveal of the destination folder in the platform file
/// browser. Failures are ignored.
fn reveal(path: &Path) {
    #[cfg(target_os = "macos")]
    let opener = "open";
    #[cfg(target_os = "windows")]
    let opener = "explorer";
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let opener = "xdg-open";

    if let Err(error) = std::process::Command::new(opener).arg(path).status() {
        tracing::debug!("could not reveal {}: {error}", path.display());
    }
}

/// Arguments of the `links` subcommand.
#[derive(Debug, clap::Parser)]
pub struct Links {
    /// The Word document to inspect
    document: PathBuf,

    /// Source directory to reconcile against; adds a Found/Missing column
    #[arg(long, short)]
    source: Option<PathBuf>,
}

impl Links {
    #[instrument(skip(self))]
    fn run(self) -> anyhow::Result<()> {
        use terminal::Colorize;

        let links = docx::extract_links(&self.document)?;
        if links.is_empty() {
            println!("No PDF hyperlinks found in the document.");
            return Ok(());
        }

        let resolution = self
            .source
            .as_deref()
            .map(|source| pipeline::resolve(&links, source));

        println!("Found {} PDF links", links.len());
        for link in &links {
            match resolution
                .as_ref()
                .map(|resolution| resolution.status(link))
            {
                Some(Status::Found) => println!(
                    "  • {} → {} ({})",
                    link.display_text(),
                    link.basename(),
                    "Found".success()
                ),
                Some(Status::Missing) => println!(
                    "  • {} → {} ({})",
                    link.display_text(),
                    link.basename(),
                    "Missing".warning()
                ),
                None => println!("  • {} → {}", link.display_text(), link.basename()),
            }
        }
        Ok(())
    }
}
