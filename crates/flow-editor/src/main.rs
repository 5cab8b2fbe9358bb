mod script;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use flow_editor_config::{AppConfig, WorkflowStore};
use flow_editor_mod_history::HistoryConfig;
use flow_editor_model::{port_colors, BlockTypeCatalog, Workflow, WorkflowDocument};
use serde::Serialize;
use serde_json::Value;

/// Edit, validate and store chatbot workflows from the command line.
#[derive(Parser, Debug)]
#[command(name = "flow-editor", version, about)]
struct Cli {
    /// Config file to use instead of `flow-editor.json` next to the executable.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the workflow database.
    #[arg(long = "data-dir", global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List stored workflows.
    List,
    /// Print a workflow as JSON.
    Show { group: String, id: String },
    /// Store a workflow JSON file.
    Import {
        file: PathBuf,
        /// Group to store under. Defaults to the file's `group_id`, then the configured group.
        #[arg(long)]
        group: Option<String>,
        /// Id to store under. Defaults to the file's `workflow_id`, then the file stem.
        #[arg(long)]
        id: Option<String>,
        /// Replace an existing workflow instead of failing.
        #[arg(long)]
        replace: bool,
    },
    /// Write a stored workflow to a JSON file.
    Export {
        group: String,
        id: String,
        file: PathBuf,
    },
    /// Create an empty workflow with a generated id.
    New {
        group: Option<String>,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Delete a stored workflow.
    Delete { group: String, id: String },
    /// Check a workflow against a block type catalog.
    Validate {
        group: String,
        id: String,
        /// Block type catalog (JSON).
        #[arg(long)]
        types: PathBuf,
    },
    /// Print the port colors of every block type in a catalog.
    Ports {
        #[arg(long)]
        types: PathBuf,
    },
    /// Replay an edit script against a workflow and save the result.
    Edit {
        group: String,
        id: String,
        /// JSON array of edit commands.
        #[arg(long)]
        script: PathBuf,
        /// Block type catalog used to validate the result.
        #[arg(long)]
        types: Option<PathBuf>,
        /// Print the edited workflow instead of saving it.
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(AppConfig::config_path);
    let mut config = AppConfig::load_or_create(&config_path);
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.display().to_string();
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    tracing::info!("Starting flow-editor");

    let data_dir = config.resolve_data_dir();
    let open_store = || WorkflowStore::open(&data_dir);

    match cli.command {
        Command::List => {
            for listing in open_store()?.list()? {
                let info = &listing.info;
                println!(
                    "{}/{}\t{}\t{} blocks\t{}",
                    info.group_id,
                    info.workflow_id,
                    info.name,
                    info.block_count,
                    listing.updated_at.format("%Y-%m-%d %H:%M:%S"),
                );
            }
        }
        Command::Show { group, id } => {
            let workflow = load(&open_store()?, &group, &id)?;
            println!("{}", to_json(&workflow, config.pretty_json)?);
        }
        Command::Import {
            file,
            group,
            id,
            replace,
        } => {
            let workflow = read_workflow_file(
                &file,
                group.as_deref(),
                id.as_deref(),
                &config.default_group,
            )?;
            let store = open_store()?;
            if replace {
                store.save(&workflow)?;
            } else {
                store.create(&workflow)?;
            }
            tracing::info!(
                "Imported {} as {}/{}",
                file.display(),
                workflow.group_id,
                workflow.workflow_id
            );
        }
        Command::Export { group, id, file } => {
            let workflow = load(&open_store()?, &group, &id)?;
            std::fs::write(&file, to_json(&workflow, config.pretty_json)?)
                .with_context(|| format!("Failed to write {}", file.display()))?;
            tracing::info!("Exported {group}/{id} to {}", file.display());
        }
        Command::New {
            group,
            name,
            description,
        } => {
            let group = group.unwrap_or_else(|| config.default_group.clone());
            let document = WorkflowDocument {
                name,
                description,
                workflow_id: uuid::Uuid::new_v4().simple().to_string(),
                ..Default::default()
            };
            let workflow = Workflow::from_document(group, document);
            open_store()?.create(&workflow)?;
            println!("{}/{}", workflow.group_id, workflow.workflow_id);
        }
        Command::Delete { group, id } => {
            if !open_store()?.delete(&group, &id)? {
                bail!("Workflow {group}/{id} not found");
            }
        }
        Command::Validate { group, id, types } => {
            let workflow = load(&open_store()?, &group, &id)?;
            let catalog = BlockTypeCatalog::new(script::load_block_types(&types)?);
            let issues = catalog.validate(&workflow.to_document());
            if !issues.is_empty() {
                for issue in &issues {
                    println!("{issue}");
                }
                bail!("{group}/{id} has {} validation issue(s)", issues.len());
            }
            println!("{group}/{id} is valid");
        }
        Command::Edit {
            group,
            id,
            script: script_path,
            types,
            dry_run,
        } => {
            let commands = script::load_script(&script_path)?;
            let block_types = match &types {
                Some(path) => script::load_block_types(path)?,
                None => Vec::new(),
            };
            let outcome = script::edit_stored_workflow(
                &open_store()?,
                &group,
                &id,
                &commands,
                block_types,
                HistoryConfig::with_depth(config.max_history_depth),
                dry_run,
            )?;
            println!("{outcome}");
            if dry_run {
                println!("{}", to_json(&outcome.workflow, config.pretty_json)?);
            } else if outcome.saved {
                tracing::info!("Saved {group}/{id}");
            } else if !outcome.changed {
                tracing::info!("No changes to save for {group}/{id}");
            }
        }
        Command::Ports { types } => print_ports(&types)?,
    }

    Ok(())
}

fn load(store: &WorkflowStore, group: &str, id: &str) -> Result<Workflow> {
    store
        .get(group, id)?
        .ok_or_else(|| anyhow!("Workflow {group}/{id} not found"))
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.context("Failed to serialize JSON")
}

fn print_ports(types: &Path) -> Result<()> {
    let catalog = BlockTypeCatalog::new(script::load_block_types(types)?);
    for block_type in catalog.iter() {
        println!("{}", block_type.type_name);
        for input in &block_type.inputs {
            let colors = port_colors(&input.port_type, input.required);
            println!(
                "  in  {:<16} {:<12} on {} off {}",
                input.name,
                input.port_type,
                colors.on.to_hex(),
                colors.off.to_hex()
            );
        }
        for output in &block_type.outputs {
            let colors = port_colors(&output.port_type, true);
            println!(
                "  out {:<16} {:<12} on {} off {}",
                output.name,
                output.port_type,
                colors.on.to_hex(),
                colors.off.to_hex()
            );
        }
    }
    Ok(())
}

/// Reads a workflow file, filling in the group and id when the file does
/// not carry them.
fn read_workflow_file(
    path: &Path,
    group: Option<&str>,
    id: Option<&str>,
    default_group: &str,
) -> Result<Workflow> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut value: Value = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    let object = value
        .as_object_mut()
        .with_context(|| format!("{} does not contain a JSON object", path.display()))?;

    match group {
        Some(group) => {
            object.insert("group_id".to_string(), Value::from(group));
        }
        None if !object.contains_key("group_id") => {
            object.insert("group_id".to_string(), Value::from(default_group));
        }
        None => {}
    }
    match id {
        Some(id) => {
            object.insert("workflow_id".to_string(), Value::from(id));
        }
        None if !object.contains_key("workflow_id") => {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            object.insert("workflow_id".to_string(), Value::from(stem));
        }
        None => {}
    }

    serde_json::from_value(value)
        .with_context(|| format!("{} is not a valid workflow", path.display()))
}
