//! Kanban CLI - drive the board transition engine from the terminal.

mod demo;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use kanban_board::{
    allowed_targets, BoardConfig, BoardController, BoardScope, DropOutcome, DropTarget,
    LabelLookup, Labels, NoLabels, Notice, StatusRegistry,
};
use kanban_core::{PhaseId, ProjectId, Role, StatusCode, TaskId};
use kanban_service::{BoardService, HttpBoardService};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kanban")]
#[command(about = "Kanban board transition engine", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = ".kanban/config.json")]
    config: PathBuf,

    /// Backend root URL, overriding the configuration file
    #[arg(long, global = true, env = "KANBAN_BASE_URL")]
    base_url: Option<String>,

    /// Use an in-memory backend seeded with sample data
    #[arg(long, global = true)]
    demo: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the board's status columns
    Statuses,
    /// Show the board
    Board {
        /// Project ID (defaults to the sample project with --demo)
        #[arg(long)]
        project: Option<String>,
        /// Narrow the board to one phase
        #[arg(long)]
        phase: Option<String>,
        /// Free-text search over name, description and assignee
        #[arg(long)]
        search: Option<String>,
    },
    /// Show the statuses a task can be dragged to
    Targets {
        /// Current status
        status: StatusCode,
        /// Actor role
        #[arg(long)]
        role: Role,
    },
    /// Drag a task to a status column
    Move {
        /// Task ID or name
        task: String,
        /// Destination status
        status: StatusCode,
        /// Project ID (defaults to the sample project with --demo)
        #[arg(long)]
        project: Option<String>,
        /// Actor role
        #[arg(long, default_value = "PM")]
        role: Role,
        /// Drop before the card at this position in the destination column
        #[arg(long)]
        index: Option<usize>,
        /// Accept the cancel confirmation
        #[arg(long)]
        confirm: bool,
    },
}

fn init_logging() {
    // Logs go to stderr so board output stays clean on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut config = BoardConfig::from_file(&cli.config)
        .with_context(|| format!("reading {}", cli.config.display()))?;
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    let labels = load_labels(config.labels_path.as_deref())?;

    let (service, demo_project) = if cli.demo {
        let (service, project_id) = demo::seeded();
        info!("Using demo backend, project {}", project_id);
        let service: Arc<dyn BoardService> = Arc::new(service);
        (service, Some(project_id))
    } else {
        debug!("Using backend at {}", config.base_url);
        let service: Arc<dyn BoardService> =
            Arc::new(HttpBoardService::new(config.base_url.clone(), config.call_timeout())?);
        (service, None)
    };

    match cli.command {
        Commands::Statuses => {
            let registry = StatusRegistry::load(
                service.as_ref(),
                labels.as_ref(),
                config.fallback_statuses(),
                config.call_timeout(),
            )
            .await;
            if registry.is_fallback() {
                println!("(backend unavailable, showing fallback statuses)");
            }
            for option in registry.options() {
                println!("  {:<12} {}", option.code, option.label);
            }
        }
        Commands::Board {
            project,
            phase,
            search,
        } => {
            let mut scope = BoardScope::project(project_id(project, demo_project)?);
            if let Some(phase) = phase {
                let phase_id: PhaseId = phase.parse().map_err(|_| anyhow!("Invalid phase ID"))?;
                scope = scope.with_phase(phase_id);
            }
            let mut controller = BoardController::new(service, Role::Pm, scope, &config);
            controller.load_statuses(labels.as_ref()).await;
            controller.set_search(search).await?;
            print_board(&controller);
        }
        Commands::Targets { status, role } => {
            let targets = allowed_targets(&status, role);
            println!("{} as {}:", status, role);
            for target in targets {
                println!("  {}", target);
            }
        }
        Commands::Move {
            task,
            status,
            project,
            role,
            index,
            confirm,
        } => {
            let scope = BoardScope::project(project_id(project, demo_project)?);
            let mut controller = BoardController::new(service, role, scope, &config);
            controller.load_statuses(labels.as_ref()).await;
            controller.refresh().await?;
            run_move(&mut controller, &task, status, index, confirm).await?;
            print_board(&controller);
        }
    }

    Ok(())
}

fn load_labels(path: Option<&Path>) -> Result<Box<dyn LabelLookup>> {
    let Some(path) = path else {
        return Ok(Box::new(NoLabels));
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading labels {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)?;
    let labels = Labels::from_json(&value);
    debug!("Loaded {} labels from {}", labels.len(), path.display());
    Ok(Box::new(labels))
}

fn project_id(arg: Option<String>, demo: Option<ProjectId>) -> Result<ProjectId> {
    match (arg, demo) {
        (Some(id), _) => id.parse().map_err(|_| anyhow!("Invalid project ID")),
        (None, Some(id)) => Ok(id),
        (None, None) => Err(anyhow!("--project is required")),
    }
}

fn resolve_task(controller: &BoardController, arg: &str) -> Result<TaskId> {
    if let Ok(id) = arg.parse::<TaskId>() {
        return Ok(id);
    }
    let needle = arg.trim().to_lowercase();
    controller
        .board()
        .columns()
        .iter()
        .flat_map(|c| c.tasks.iter())
        .find(|t| t.name.to_lowercase() == needle)
        .map(|t| t.id)
        .ok_or_else(|| anyhow!("No task named {:?} on the board", arg))
}

async fn run_move(
    controller: &mut BoardController,
    task: &str,
    status: StatusCode,
    index: Option<usize>,
    confirm: bool,
) -> Result<()> {
    let task_id = resolve_task(controller, task)?;
    if let Some(notice) = controller.drag_start(task_id)? {
        print_notice(&notice);
    }

    let over = index.and_then(|i| controller.board().column(&status)?.get(i).map(|t| t.id));
    let target = match over {
        Some(over) => DropTarget::Item {
            task_id: over,
            container: Some(status.clone()),
        },
        None => DropTarget::Column(status.clone()),
    };
    if controller.drag_over(Some(&target)).is_none() {
        debug!("{} is not a valid drop column for this drag", status);
    }

    match controller.end_drag(Some(target)).await {
        DropOutcome::Ignored(reason) => println!("Nothing moved ({:?})", reason),
        DropOutcome::Rejected(notice) => print_notice(&notice),
        DropOutcome::ConfirmCancel(task) => {
            if confirm {
                let outcome = controller.confirm_cancel().await?;
                println!("Canceled {} ({:?})", task.name, outcome);
            } else {
                controller.dismiss_dialog(false).await?;
                println!("Canceling {} needs confirmation; rerun with --confirm", task.name);
            }
        }
        DropOutcome::ReviewRequired(task) => {
            controller.dismiss_dialog(false).await?;
            println!(
                "{} needs review evidence or a branch before it can enter review",
                task.name
            );
        }
        DropOutcome::Moved(pending) => {
            let (from, to) = (pending.from.clone(), pending.to.clone());
            let outcome = controller.commit(pending).await;
            println!("Moved {} -> {} ({:?})", from, to, outcome);
        }
    }
    Ok(())
}

fn print_notice(notice: &Notice) {
    println!("[{:?}] {} ({})", notice.level, notice, notice.kind.message_key());
}

fn print_board(controller: &BoardController) {
    if let Some(project) = controller.project() {
        println!("{}", project.name);
    }
    if let Some(phase) = controller.phase_detail() {
        println!("Phase {} - {} ({:?})", phase.sequence, phase.name, phase.status);
    }
    for column in controller.board().columns() {
        println!(
            "{} ({})",
            controller.registry().label(&column.status),
            column.tasks.len()
        );
        for task in &column.tasks {
            let assignee = task.assignee_name.as_deref().unwrap_or("-");
            println!("  {} | {} | {}", task.id, task.name, assignee);
        }
    }
}
