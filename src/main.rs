//! parlance CLI: probabilistic utterance-to-statement matching.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use parlance::{
    Catalogue, CharGramOracle, FilledTemplate, LabeledUtterance, Matcher, StatementKind,
};

#[derive(Parser)]
#[command(name = "parlance", version, about = "Probabilistic utterance-to-statement matcher")]
struct Cli {
    /// Grammar catalogue TOML. Defaults to the bundled catalogue.
    #[arg(long, global = true)]
    grammar: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank an utterance against the full statement pool.
    ///
    /// Pairs use `label=token` syntax, e.g. `certainty=know "target=a robot"`.
    Rank {
        /// label=token pairs, in utterance order.
        pairs: Vec<String>,

        /// Number of interpretations to show.
        #[arg(long, default_value = "5")]
        top: usize,

        /// Emit JSON instead of prose.
        #[arg(long)]
        json: bool,
    },

    /// Resolve a pre-classified template label by label.
    Resolve {
        /// Statement kind ("spatial_relation" or "action").
        #[arg(long)]
        kind: String,

        /// label=token pairs.
        pairs: Vec<String>,

        /// Emit JSON instead of prose.
        #[arg(long)]
        json: bool,
    },

    /// Enumerate the statement pool.
    Enumerate {
        /// Restrict to one kind.
        #[arg(long)]
        kind: Option<String>,

        /// Stop after this many statements.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show catalogue statistics.
    Info,
}

fn parse_pairs(pairs: &[String]) -> Result<Vec<(String, String)>> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(label, token)| (label.to_string(), token.to_string()))
                .ok_or_else(|| miette::miette!("expected label=token, got \"{pair}\""))
        })
        .collect()
}

fn load_catalogue(path: &Option<PathBuf>) -> Result<Catalogue> {
    match path {
        Some(path) => Ok(Catalogue::from_path(path)?),
        None => Ok(Catalogue::builtin()?),
    }
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let catalogue = load_catalogue(&cli.grammar)?;

    match cli.command {
        Commands::Rank { pairs, top, json } => {
            let utterance = LabeledUtterance::from_pairs(parse_pairs(&pairs)?);
            let matcher = Matcher::new(&catalogue, CharGramOracle::new())?;
            let ranked = matcher.rank_top(&utterance, top)?;

            if json {
                let entries: Vec<serde_json::Value> = ranked
                    .iter()
                    .map(|r| {
                        serde_json::json!({
                            "probability": r.probability,
                            "statement": r.statement,
                            "rendered": r.statement.to_string(),
                        })
                    })
                    .collect();
                println!(
                    "{}",
                    serde_json::to_string_pretty(&entries).into_diagnostic()?
                );
            } else {
                println!("Input phrase: {utterance}");
                for entry in &ranked {
                    println!("{} ({:.4})", entry.statement, entry.probability);
                }
            }
        }

        Commands::Resolve { kind, pairs, json } => {
            let template = FilledTemplate::new(kind, parse_pairs(&pairs)?);
            let matcher = Matcher::new(&catalogue, CharGramOracle::new())?;
            let statements = matcher.resolve(&[template])?;

            for statement in &statements {
                if json {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(statement).into_diagnostic()?
                    );
                } else {
                    println!("{statement}");
                }
            }
        }

        Commands::Enumerate { kind, limit } => {
            let kinds = match kind {
                Some(raw) => vec![StatementKind::parse(&raw)?],
                None => StatementKind::all().to_vec(),
            };
            let statements = catalogue.grammar.enumerate_all(&kinds)?;
            let mut count = 0usize;
            for statement in statements {
                if limit.is_some_and(|cap| count >= cap) {
                    break;
                }
                println!("{statement}");
                count += 1;
            }
            eprintln!("({count} statements)");
        }

        Commands::Info => {
            println!("catalogue: {} (v{})", catalogue.name, catalogue.version);
            println!("levels: {}", catalogue.slots.levels().len());
            for (index, level) in catalogue.slots.levels().iter().enumerate() {
                let labels: Vec<String> = level.iter().map(|l| l.to_string()).collect();
                println!("  {index}: {}", labels.join(" | "));
            }
            let pool = catalogue.grammar.pool()?;
            println!("statement pool: {} candidates", pool.len());
            for category in catalogue.grammar.components().categories() {
                let merged = catalogue.grammar.components().merged_tokens(category)?;
                println!("  {category}: {} tokens", merged.len());
            }
        }
    }

    Ok(())
}
