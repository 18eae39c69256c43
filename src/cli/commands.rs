//! Command dispatch

use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::NodeId;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{TerminalView, TreeView};
use crate::infrastructure::{InfraError, InfraResult};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Show { plain }) => cmd_show(cli, *plain),
        Some(Commands::Add { parent }) => cmd_add(cli, *parent),
        Some(Commands::Rename { id, name }) => cmd_rename(cli, *id, name),
        Some(Commands::Remove { id }) => cmd_remove(cli, *id),
        Some(Commands::Reset { yes }) => cmd_reset(cli, *yes),
        Some(Commands::Export {
            output,
            page_height,
        }) => cmd_export(cli, output.clone(), *page_height),
        Some(Commands::Info) => cmd_info(cli),
        Some(Commands::Config { command }) => cmd_config(cli, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => cmd_show(cli, false),
    }
}

/// Load layered settings and apply command-line overrides.
fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load()?;
    if let Some(dir) = &cli.store_dir {
        settings.store_dir = dir.clone();
    }
    if let Some(slot) = &cli.slot {
        settings.slot = slot.clone();
    }
    settings.validate()?;
    debug!("settings: {:?}", settings);
    Ok(settings)
}

fn container(cli: &Cli) -> CliResult<ServiceContainer> {
    Ok(ServiceContainer::new(load_settings(cli)?))
}

#[instrument(skip(cli))]
fn cmd_show(cli: &Cli, plain: bool) -> CliResult<()> {
    let mut view = TerminalView::stdout();
    view.set_interactive(!plain);
    let mut doc = container(cli)?.document(view);
    doc.render();
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_add(cli: &Cli, parent: NodeId) -> CliResult<()> {
    let mut doc = container(cli)?.document(TerminalView::stdout());
    let id = doc.add_child(parent)?;
    output::success(&format!("Added node {} under {}", id, parent));
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_rename(cli: &Cli, id: NodeId, name: &str) -> CliResult<()> {
    let mut doc = container(cli)?.document(TerminalView::stdout());
    if doc.rename_node(id, name)? {
        output::success(&format!("Renamed {} to '{}'", id, name));
    }
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_remove(cli: &Cli, id: NodeId) -> CliResult<()> {
    let mut doc = container(cli)?.document(TerminalView::stdout());
    doc.remove_node(id)?;
    output::success(&format!("Removed {}", id));
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_reset(cli: &Cli, yes: bool) -> CliResult<()> {
    if !yes && !confirm("Reset entire tree? [y/N]")? {
        output::info("Aborted");
        return Ok(());
    }
    let mut doc = container(cli)?.document(TerminalView::stdout());
    doc.reset()?;
    output::success(&format!("Tree reset, new root {}", doc.tree().root_id()));
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_export(cli: &Cli, target: Option<PathBuf>, page_height: Option<usize>) -> CliResult<()> {
    let mut settings = load_settings(cli)?;
    if let Some(height) = page_height {
        if height == 0 {
            return Err(CliError::InvalidArgs(
                "--page-height must be at least 1".to_string(),
            ));
        }
        settings.export.page_height = height;
    }
    let path = target.unwrap_or_else(|| PathBuf::from(&settings.export.file_name));

    let container = ServiceContainer::new(settings);
    let mut doc = container.document(TerminalView::stdout());
    let summary = doc.export(&container.export_service(), &path)?;
    output::success(&format!(
        "Exported {} lines on {} page(s) to {}",
        summary.lines,
        summary.pages,
        summary.path.display()
    ));
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_info(cli: &Cli) -> CliResult<()> {
    let container = container(cli)?;
    let doc = container.document(TerminalView::stdout());
    let tree = doc.tree();

    output::header("arbor");
    output::action("Store", &doc.persistence().location());
    output::action("Slot", doc.persistence().slot());
    output::action("Root", &format!("{} ({})", tree.root().name(), tree.root_id()));
    output::action("Nodes", &tree.node_count());
    output::action("Depth", &tree.depth());
    output::action("Leaves", &tree.leaves().len());
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => {
                    let marker = if path.exists() { "" } else { " (not created)" };
                    output::action("Global", &format!("{}{}", path.display(), marker));
                }
                None => output::warning("no config directory for this platform"),
            }
            let settings = load_settings(cli)?;
            output::action("Store", &settings.store_dir.display());
            Ok(())
        }
        ConfigCommands::Init { force } => {
            let path = global_config_path().ok_or_else(|| {
                CliError::Usage("no config directory for this platform".to_string())
            })?;
            if path.exists() && !force {
                return Err(CliError::Usage(format!(
                    "config already exists: {} (use --force to overwrite)",
                    path.display()
                )));
            }
            write_template(&path)?;
            output::success(&format!("Created {}", path.display()));
            Ok(())
        }
    }
}

fn write_template(path: &Path) -> InfraResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| InfraError::io(format!("create {}", parent.display()), e))?;
    }
    std::fs::write(path, Settings::template())
        .map_err(|e| InfraError::io(format!("write {}", path.display()), e))
}

/// Ask a yes/no question on stdin; anything but "y"/"yes" declines.
fn confirm(question: &str) -> CliResult<bool> {
    output::prompt(question);
    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(|e| InfraError::io("read confirmation", e))?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes"
    ))
}
