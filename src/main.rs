//! timeloop CLI: a thin collaborator over the engine library, kept small
//! because spec.md scopes the interactive editor/CLI out. Commands map
//! directly onto the persisted project artifact and the engine's read
//! operations; there is no engine-internal logic here.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use timeloop_engine::consistency;
use timeloop_engine::graph::{export as graph_export, TimeBounds};
use timeloop_engine::ids::{EdgeId, EpochId, EquivalenceClassId, LoopId, NodeId};
use timeloop_engine::model::{Choice, EdgeKind, GraphEdge, GraphNode, NodeKind};
use timeloop_engine::narrative::style::{DetailLevel, Perspective};
use timeloop_engine::narrative::{render_epoch_summary, render_loop, StyleConfig, Tone, Vocabulary};
use timeloop_engine::time_slot::TimeSlot;
use timeloop_engine::workspace::Workspace;

#[derive(Parser)]
#[command(name = "timeloop", version, about = "Time-loop narrative construction engine")]
struct Cli {
    /// Project directory. The project file lives at `<dir>/project.json`.
    #[arg(long, global = true, default_value = ".")]
    project: PathBuf,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    format: String,

    /// Suppress informational output.
    #[arg(long, global = true)]
    quiet: bool,

    /// Emit debug-level tracing.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new project in the project directory.
    Init {
        name: String,
        #[arg(long, default_value = "00:00")]
        start_time: String,
        #[arg(long, default_value = "23:59")]
        end_time: String,
    },

    /// Inspect and edit the day graph.
    Graph {
        #[command(subcommand)]
        action: GraphAction,
    },

    /// List loops, epochs, or equivalence classes.
    List {
        /// One of: loops, epochs, classes.
        kind: String,
    },

    /// Show a single entity by id.
    Show {
        /// One of: loop, epoch, class, node.
        kind: String,
        id: String,
    },

    /// Render a loop as prose.
    Narrate {
        #[arg(long)]
        loop_id: String,
        #[arg(long, default_value = "clinical")]
        tone: String,
        #[arg(long, default_value = "standard")]
        detail: String,
        #[arg(long, default_value = "third")]
        perspective: String,
    },

    /// Render an epoch summary.
    Summarize {
        #[arg(long)]
        epoch_id: String,
        #[arg(long, default_value = "clinical")]
        tone: String,
    },

    /// Run the consistency checker over every completed loop.
    Validate,

    /// Print workspace-wide counts.
    Stats,

    /// Export the project artifact or a graph visualization.
    Export {
        /// One of: project, dot, mermaid.
        what: String,
        /// Output path; defaults to stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum GraphAction {
    /// List every node.
    Nodes,
    /// List every edge.
    Edges,
    /// Add a node.
    AddNode {
        #[arg(long, default_value = "event")]
        kind: String,
        #[arg(long)]
        time: String,
        #[arg(long)]
        label: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        critical: bool,
        #[arg(long)]
        time_flexible: bool,
        /// Choice labels for a decision node, comma-separated.
        #[arg(long)]
        choices: Option<String>,
    },
    /// Add an edge between two existing nodes.
    AddEdge {
        #[arg(long)]
        source: String,
        #[arg(long)]
        target: String,
        #[arg(long, default_value = "default")]
        kind: String,
        #[arg(long)]
        label: Option<String>,
    },
    /// Print a DOT or Mermaid visualization.
    Visualize {
        #[arg(long, default_value = "dot")]
        format: String,
    },
    /// Run structural validation over the graph.
    Validate,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
    Table,
}

fn parse_format(s: &str) -> Result<OutputFormat> {
    Ok(match s {
        "text" => OutputFormat::Text,
        "json" => OutputFormat::Json,
        "table" => OutputFormat::Table,
        other => return Err(miette::miette!("unknown format: {other} (expected text, json, or table)")),
    })
}

/// Prints rows either as plain lines, a fixed-width table, or a JSON array,
/// depending on the CLI's global `--format` flag.
fn print_rows<T: serde::Serialize>(format: OutputFormat, headers: &[&str], rows: &[Vec<String>], values: &[T]) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(values).into_diagnostic()?),
        OutputFormat::Table => {
            let widths: Vec<usize> = headers
                .iter()
                .enumerate()
                .map(|(i, h)| rows.iter().map(|r| r[i].len()).max().unwrap_or(0).max(h.len()))
                .collect();
            let header_line: Vec<String> = headers.iter().zip(&widths).map(|(h, w)| format!("{h:<w$}")).collect();
            println!("{}", header_line.join("  "));
            for row in rows {
                let line: Vec<String> = row.iter().zip(&widths).map(|(c, w)| format!("{c:<w$}")).collect();
                println!("{}", line.join("  "));
            }
        }
        OutputFormat::Text => {
            for row in rows {
                println!("{}", row.join(" "));
            }
        }
    }
    Ok(())
}

fn project_file(dir: &Path) -> PathBuf {
    dir.join("project.json")
}

fn load_workspace(dir: &Path) -> Result<Workspace> {
    let path = project_file(dir);
    if !path.exists() {
        return Err(miette::miette!(
            "no project found at {} (run `timeloop init <name>` first)",
            path.display()
        ));
    }
    Workspace::load_from_file(&path).into_diagnostic()
}

fn save_workspace(ws: &Workspace, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).into_diagnostic()?;
    ws.save_to_file(&project_file(dir)).into_diagnostic()
}

fn parse_node_kind(s: &str) -> Result<NodeKind> {
    Ok(match s {
        "event" => NodeKind::Event,
        "decision" => NodeKind::Decision,
        "location" => NodeKind::Location,
        "encounter" => NodeKind::Encounter,
        "discovery" => NodeKind::Discovery,
        "death" => NodeKind::Death,
        "reset" => NodeKind::Reset,
        other => return Err(miette::miette!("unknown node kind: {other}")),
    })
}

fn parse_edge_kind(s: &str) -> Result<EdgeKind> {
    Ok(match s {
        "default" => EdgeKind::Default,
        "choice" => EdgeKind::Choice,
        "conditional" => EdgeKind::Conditional,
        "timed" => EdgeKind::Timed,
        "random" => EdgeKind::Random,
        other => return Err(miette::miette!("unknown edge kind: {other}")),
    })
}

fn parse_tone(s: &str) -> Result<Tone> {
    Tone::ALL
        .into_iter()
        .find(|t| t.to_string() == s)
        .ok_or_else(|| miette::miette!("unknown tone: {s} (expected one of: {})", Tone::ALL.map(|t| t.to_string()).join(", ")))
}

fn parse_detail(s: &str) -> Result<DetailLevel> {
    Ok(match s {
        "minimal" => DetailLevel::Minimal,
        "standard" => DetailLevel::Standard,
        "detailed" => DetailLevel::Detailed,
        "verbose" => DetailLevel::Verbose,
        other => return Err(miette::miette!("unknown detail level: {other}")),
    })
}

fn parse_perspective(s: &str) -> Result<Perspective> {
    Ok(match s {
        "first" => Perspective::First,
        "second" => Perspective::Second,
        "third" => Perspective::Third,
        "third_limited" => Perspective::ThirdLimited,
        other => return Err(miette::miette!("unknown perspective: {other}")),
    })
}

fn parse_node_id(s: &str) -> Result<NodeId> {
    NodeId::parse(s).ok_or_else(|| miette::miette!("not a valid node id: {s}"))
}

fn print_validation_report(report: &timeloop_engine::model::ValidationReport) {
    for issue in &report.issues {
        let severity = match issue.severity {
            timeloop_engine::model::Severity::Error => "error",
            timeloop_engine::model::Severity::Warning => "warning",
            timeloop_engine::model::Severity::Info => "info",
        };
        let category = issue.category.map(|c| format!(" [{c}]")).unwrap_or_default();
        println!("{severity}{category}: {}", issue.message);
        for repair in &issue.repairs {
            println!("  repair: {repair}");
        }
    }
    if report.issues.is_empty() {
        println!("no issues found");
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
    .ok();

    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Init { name, start_time, end_time } => {
            let start = TimeSlot::parse(start_time).into_diagnostic()?;
            let end = TimeSlot::parse(end_time).into_diagnostic()?;
            let start_node_id = NodeId::new();
            let mut ws = Workspace::new(name.clone(), TimeBounds { start, end }, start_node_id);
            let wake = GraphNode::new(start_node_id, NodeKind::Event, start, "the day begins");
            ws.graph_mut().add_node(wake).into_diagnostic()?;
            save_workspace(&ws, &cli.project)?;
            if !cli.quiet {
                println!("initialized project \"{name}\" at {}", project_file(&cli.project).display());
            }
            Ok(())
        }

        Commands::Graph { action } => run_graph(cli, action),

        Commands::List { kind } => {
            let ws = load_workspace(&cli.project)?;
            let format = parse_format(&cli.format)?;
            match kind.as_str() {
                "loops" => {
                    let loops = ws.loops().all();
                    let rows = loops
                        .iter()
                        .map(|l| vec![l.id.to_string(), l.sequence_number.to_string(), format!("{:?}", l.status), l.epoch_id.to_string()])
                        .collect::<Vec<_>>();
                    print_rows(format, &["id", "seq", "status", "epoch"], &rows, &loops)?;
                }
                "epochs" => {
                    let epochs: Vec<_> = ws.epochs().cloned().collect();
                    let rows = epochs.iter().map(|e| vec![e.id.to_string(), e.order.to_string(), e.name.clone()]).collect::<Vec<_>>();
                    print_rows(format, &["id", "order", "name"], &rows, &epochs)?;
                }
                "classes" => {
                    let classes = ws.equivalence().all();
                    let rows = classes
                        .iter()
                        .map(|c| vec![c.id.to_string(), c.member_count.to_string(), c.outcome_summary.clone()])
                        .collect::<Vec<_>>();
                    print_rows(format, &["id", "members", "outcome"], &rows, &classes)?;
                }
                other => return Err(miette::miette!("unknown list kind: {other} (expected loops, epochs, or classes)")),
            }
            Ok(())
        }

        Commands::Show { kind, id } => {
            let ws = load_workspace(&cli.project)?;
            let as_json = parse_format(&cli.format)? == OutputFormat::Json;
            match kind.as_str() {
                "loop" => {
                    let loop_id = LoopId::parse(id).ok_or_else(|| miette::miette!("not a valid loop id: {id}"))?;
                    let l = ws.loops().get(loop_id).ok_or_else(|| miette::miette!("no loop with id {id}"))?;
                    if as_json {
                        println!("{}", serde_json::to_string_pretty(&l).into_diagnostic()?);
                    } else {
                        println!("{l:#?}");
                    }
                }
                "epoch" => {
                    let epoch_id = EpochId::parse(id).ok_or_else(|| miette::miette!("not a valid epoch id: {id}"))?;
                    let e = ws.epoch(epoch_id).ok_or_else(|| miette::miette!("no epoch with id {id}"))?;
                    if as_json {
                        println!("{}", serde_json::to_string_pretty(e).into_diagnostic()?);
                    } else {
                        println!("{e:#?}");
                    }
                }
                "class" => {
                    let class_id = EquivalenceClassId::parse(id).ok_or_else(|| miette::miette!("not a valid class id: {id}"))?;
                    let c = ws.equivalence().get(class_id).ok_or_else(|| miette::miette!("no class with id {id}"))?;
                    if as_json {
                        println!("{}", serde_json::to_string_pretty(&c).into_diagnostic()?);
                    } else {
                        println!("{c:#?}");
                    }
                }
                "node" => {
                    let node_id = parse_node_id(id)?;
                    let n = ws.graph().node(node_id).ok_or_else(|| miette::miette!("no node with id {id}"))?;
                    if as_json {
                        println!("{}", serde_json::to_string_pretty(n).into_diagnostic()?);
                    } else {
                        println!("{n:#?}");
                    }
                }
                other => return Err(miette::miette!("unknown show kind: {other} (expected loop, epoch, class, or node)")),
            }
            Ok(())
        }

        Commands::Narrate { loop_id, tone, detail, perspective } => {
            let ws = load_workspace(&cli.project)?;
            let loop_id = LoopId::parse(loop_id).ok_or_else(|| miette::miette!("not a valid loop id: {loop_id}"))?;
            let l = ws.loops().get(loop_id).ok_or_else(|| miette::miette!("no loop with id {loop_id}"))?;

            let mut style = StyleConfig::new(parse_tone(tone)?);
            style.detail = parse_detail(detail)?;
            style.perspective = parse_perspective(perspective)?;
            let vocab = Vocabulary::new();
            println!("{}", render_loop(&l, ws.graph(), &vocab, &style));
            Ok(())
        }

        Commands::Summarize { epoch_id, tone } => {
            let ws = load_workspace(&cli.project)?;
            let epoch_id = EpochId::parse(epoch_id).ok_or_else(|| miette::miette!("not a valid epoch id: {epoch_id}"))?;
            let epoch = ws.epoch(epoch_id).ok_or_else(|| miette::miette!("no epoch with id {epoch_id}"))?;
            let loops = ws.loops().by_epoch(epoch_id);
            let loop_refs: Vec<&_> = loops.iter().collect();

            let style = StyleConfig::new(parse_tone(tone)?);
            let vocab = Vocabulary::new();
            println!("{}", render_epoch_summary(epoch, &loop_refs, &vocab, &style));
            Ok(())
        }

        Commands::Validate => {
            let ws = load_workspace(&cli.project)?;
            let mut total_errors = 0usize;
            let mut total_warnings = 0usize;
            for l in ws.loops().by_status(timeloop_engine::model::LoopStatus::Completed) {
                let mut lineage = Vec::new();
                let mut cursor = Some(l.knowledge_state_start_id);
                while let Some(id) = cursor {
                    let Some(state) = ws.knowledge_states().get(id) else { break };
                    cursor = state.parent_id;
                    lineage.push(state);
                }
                lineage.reverse();

                let report = consistency::check_loop(&l, ws.graph(), &lineage);
                total_errors += report.errors().count();
                total_warnings += report.warnings().count();
                if !report.issues.is_empty() {
                    println!("loop {}:", l.id);
                    print_validation_report(&report);
                }
            }
            println!("{total_errors} error(s), {total_warnings} warning(s)");
            if total_errors > 0 {
                std::process::exit(1);
            }
            Ok(())
        }

        Commands::Stats => {
            let ws = load_workspace(&cli.project)?;
            let stats = [
                ("nodes", ws.graph().node_count()),
                ("edges", ws.graph().edge_count()),
                ("graph_version", ws.graph().version as usize),
                ("loops", ws.loops().len()),
                ("completed", ws.loops().by_status(timeloop_engine::model::LoopStatus::Completed).len()),
                ("anchors", ws.loops().anchors().len()),
                ("equivalence_classes", ws.equivalence().all().len()),
                ("knowledge_states", ws.knowledge_states().len()),
                ("epochs", ws.epochs().count()),
            ];
            if parse_format(&cli.format)? == OutputFormat::Json {
                let map: serde_json::Map<String, serde_json::Value> =
                    stats.iter().map(|(k, v)| (k.to_string(), serde_json::json!(v))).collect();
                println!("{}", serde_json::to_string_pretty(&map).into_diagnostic()?);
            } else {
                for (key, value) in stats {
                    println!("{key}: {value}");
                }
            }
            Ok(())
        }

        Commands::Export { what, out } => {
            let ws = load_workspace(&cli.project)?;
            let content = match what.as_str() {
                "project" => ws.to_artifact().to_json().into_diagnostic()?,
                "dot" => graph_export::to_dot(ws.graph()),
                "mermaid" => graph_export::to_mermaid(ws.graph()),
                other => return Err(miette::miette!("unknown export target: {other} (expected project, dot, or mermaid)")),
            };
            match out {
                Some(path) => std::fs::write(path, content).into_diagnostic()?,
                None => println!("{content}"),
            }
            Ok(())
        }
    }
}

fn run_graph(cli: &Cli, action: &GraphAction) -> Result<()> {
    match action {
        GraphAction::Nodes => {
            let ws = load_workspace(&cli.project)?;
            for n in ws.graph().nodes() {
                println!("{} [{}] {:02}:{:02} \"{}\"", n.id, n.kind, n.time_slot.hour(), n.time_slot.minute(), n.label);
            }
            Ok(())
        }

        GraphAction::Edges => {
            let ws = load_workspace(&cli.project)?;
            for e in ws.graph().edges() {
                println!("{} {} -> {} [{}]", e.id, e.source, e.target, e.kind);
            }
            Ok(())
        }

        GraphAction::AddNode { kind, time, label, description, critical, time_flexible, choices } => {
            let mut ws = load_workspace(&cli.project)?;
            let node_kind = parse_node_kind(kind)?;
            let time_slot = TimeSlot::parse(time).into_diagnostic()?;
            let mut node = GraphNode::new(NodeId::new(), node_kind, time_slot, label.clone());
            node.description = description.clone();
            node.critical = *critical;
            node.time_flexible = *time_flexible;
            if let Some(choices) = choices {
                node.choices = Some(
                    choices
                        .split(',')
                        .enumerate()
                        .map(|(index, label)| Choice { index, label: label.trim().to_string(), description: None })
                        .collect(),
                );
            }
            let id = node.id;
            ws.graph_mut().add_node(node).into_diagnostic()?;
            save_workspace(&ws, &cli.project)?;
            if !cli.quiet {
                println!("added node {id}");
            }
            Ok(())
        }

        GraphAction::AddEdge { source, target, kind, label } => {
            let mut ws = load_workspace(&cli.project)?;
            let source = parse_node_id(source)?;
            let target = parse_node_id(target)?;
            let edge_kind = parse_edge_kind(kind)?;
            let mut edge = GraphEdge::new(EdgeId::new(), source, target, edge_kind);
            edge.label = label.clone();
            let id = edge.id;
            ws.graph_mut().add_edge(edge).into_diagnostic()?;
            save_workspace(&ws, &cli.project)?;
            if !cli.quiet {
                println!("added edge {id}");
            }
            Ok(())
        }

        GraphAction::Visualize { format } => {
            let ws = load_workspace(&cli.project)?;
            let out = match format.as_str() {
                "dot" => graph_export::to_dot(ws.graph()),
                "mermaid" => graph_export::to_mermaid(ws.graph()),
                other => return Err(miette::miette!("unknown visualization format: {other} (expected dot or mermaid)")),
            };
            println!("{out}");
            Ok(())
        }

        GraphAction::Validate => {
            let ws = load_workspace(&cli.project)?;
            let report = ws.graph().validate();
            print_validation_report(&report);
            if !report.valid() {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
