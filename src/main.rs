use std::collections::BTreeMap;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{Level, debug};

use handoff_config::WorkflowDocument;
use handoff_graph::{AdjacencyMap, DependencyGraph, DependencyMaps, Direction, EventId};

/// Handoff - dependency queries over the handoffs of a workflow document
#[derive(Parser)]
#[command(name = "handoff")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Log graph construction and cache activity to stderr
  #[arg(long, short, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Print the forward and backward adjacency maps
  Maps {
    /// Path to the workflow document (JSON), or "-" for stdin
    document: PathBuf,
  },

  /// Check whether a new handoff can be added without creating a cycle
  Check {
    /// Path to the workflow document (JSON), or "-" for stdin
    document: PathBuf,

    /// Event that must complete first
    #[arg(long)]
    from: i64,

    /// Event that waits on `from`
    #[arg(long)]
    to: i64,
  },

  /// List every event that must complete before an event
  Before {
    /// Path to the workflow document (JSON), or "-" for stdin
    document: PathBuf,

    #[arg(long)]
    event: i64,
  },

  /// List every event that can only start after an event
  After {
    /// Path to the workflow document (JSON), or "-" for stdin
    document: PathBuf,

    #[arg(long)]
    event: i64,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  match cli.command {
    Some(Commands::Maps { document }) => {
      let graph = load_graph(&document)?;
      println!("{}", serde_json::to_string_pretty(&render_maps(graph.maps()))?);
    }
    Some(Commands::Check { document, from, to }) => {
      let graph = load_graph(&document)?;
      let (from, to) = (EventId(from), EventId(to));
      let verdict = graph.check_handoff(from, to);

      let output = serde_json::json!({
        "from": from,
        "to": to,
        "allowed": verdict.is_ok(),
      });
      println!("{}", serde_json::to_string_pretty(&output)?);

      verdict.context("handoff rejected")?;
    }
    Some(Commands::Before { document, event }) => {
      let graph = load_graph(&document)?;
      print_closure(&graph, Direction::Ancestors, EventId(event))?;
    }
    Some(Commands::After { document, event }) => {
      let graph = load_graph(&document)?;
      print_closure(&graph, Direction::Descendants, EventId(event))?;
    }
    None => {
      println!("handoff - use --help to see available commands");
    }
  }

  Ok(())
}

fn init_tracing(verbose: bool) {
  let level = if verbose { Level::DEBUG } else { Level::WARN };
  tracing_subscriber::fmt()
    .with_max_level(level)
    .with_target(false)
    .with_writer(io::stderr)
    .init();
}

fn load_graph(document: &Path) -> Result<DependencyGraph> {
  let rt = tokio::runtime::Runtime::new()?;
  let doc = rt.block_on(async { read_document(document).await })?;

  debug!(
    interactions = doc.interactions.len(),
    handoffs = doc.handoffs().count(),
    "loaded workflow document"
  );

  DependencyGraph::build(&doc.interactions)
    .with_context(|| format!("failed to build dependency graph: {}", document.display()))
}

async fn read_document(document: &Path) -> Result<WorkflowDocument> {
  let content = if document.as_os_str() == "-" {
    let mut input = String::new();
    io::stdin()
      .read_to_string(&mut input)
      .context("failed to read workflow document from stdin")?;
    input
  } else {
    tokio::fs::read_to_string(document)
      .await
      .with_context(|| format!("failed to read workflow document: {}", document.display()))?
  };

  serde_json::from_str(&content)
    .with_context(|| format!("failed to parse workflow document: {}", document.display()))
}

fn print_closure(graph: &DependencyGraph, direction: Direction, event: EventId) -> Result<()> {
  // `null` when the event takes no part in a handoff in this direction.
  let output = match graph.closure(direction, event) {
    Some(events) => serde_json::to_value(&*events)?,
    None => serde_json::Value::Null,
  };
  println!("{}", serde_json::to_string_pretty(&output)?);
  Ok(())
}

/// Adjacency maps with sorted keys, for stable output.
fn render_maps(maps: &DependencyMaps) -> serde_json::Value {
  fn sorted(map: &AdjacencyMap) -> BTreeMap<EventId, &[EventId]> {
    map.iter().map(|(k, v)| (*k, v.as_slice())).collect()
  }

  serde_json::json!({
    "forward": sorted(maps.forward()),
    "backward": sorted(maps.backward()),
  })
}
