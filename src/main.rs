use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use layout_patcher::{logging, notification, PatchOutcome, PatchReport, Patcher, ReplacePolicy};
use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "layout-patcher")]
#[command(
    about = "Replace the order notification click handler in AdminLayout.jsx",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Path to the file to patch
    #[arg(env = "LAYOUT_PATCHER_FILE")]
    file: PathBuf,

    /// Dry run - report what would change without writing the file
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Show unified diff of changes (3 lines of context)
    #[arg(short, long)]
    diff: bool,

    /// Replace only the first occurrence instead of all of them
    #[arg(long)]
    first_only: bool,

    /// Exit with failure when the pattern matches nothing
    #[arg(long)]
    strict: bool,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "✗".red(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let policy = if cli.first_only {
        ReplacePolicy::First
    } else {
        ReplacePolicy::All
    };
    let pattern = notification::click_handler_patch()
        .context("built-in click handler pattern failed to compile")?
        .with_policy(policy);
    let patcher = Patcher::new(pattern);

    let report = if cli.dry_run {
        patcher.plan(&cli.file)?
    } else {
        patcher.apply(&cli.file)?
    };

    if cli.diff && report.changed() {
        display_diff(&cli.file, &report);
    }

    let name = display_name(&cli.file);

    match &report.outcome {
        PatchOutcome::Applied { .. } => {
            let label = report.outcome.replacements_label();
            if cli.dry_run {
                println!("{} {} would be updated ({})", "✓".green(), name, label);
            } else {
                println!(
                    "{} {} updated successfully ({})",
                    "✓".green(),
                    name,
                    label
                );
            }
        }
        PatchOutcome::AlreadyApplied { .. } => {
            println!(
                "{} {} already patched, left unchanged ({})",
                "⊙".yellow(),
                name,
                report.outcome.replacements_label()
            );
        }
        PatchOutcome::NoMatch { file } => {
            eprintln!(
                "{}",
                format!(
                    "Warning: pattern matched nothing in {} ({}), file left unchanged",
                    file.display(),
                    report.outcome.replacements_label()
                )
                .yellow()
            );
            eprintln!("  Possible causes:");
            eprintln!("    - The marker comment '{}' was edited or removed", notification::MARKER);
            eprintln!("    - The handler is no longer an inline onClick arrow function");

            if cli.strict {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn display_name(file: &Path) -> String {
    file.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string())
}

/// Helper: Show unified diff between original and patched content
fn display_diff(file: &Path, report: &PatchReport) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(&report.original, &report.patched);
    let mut unified = diff.unified_diff();
    unified.context_radius(3);

    for hunk in unified.iter_hunks() {
        println!("{}", hunk.header().to_string().cyan());
        for change in hunk.iter_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => format!("-{}", change).red(),
                ChangeTag::Insert => format!("+{}", change).green(),
                ChangeTag::Equal => format!(" {}", change).normal(),
            };
            print!("{}", sign);
            if change.missing_newline() {
                println!();
            }
        }
    }
}
