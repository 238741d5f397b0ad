//! CLI commands for the Blackbox dashboard.
//!
//! `bbx` opens the workspace in the data directory, runs one command against
//! the engine or template service, and flushes whatever changed. Output is a
//! plain table/text by default and JSON with `--json`.
//!
//! Exit codes: 0 on success, 1 when the engine refuses or fails, 2 on usage
//! errors.

#![forbid(unsafe_code)]

pub mod output;

use std::ffi::OsString;
use std::io::{self, Read as _, Write};
use std::path::{Path, PathBuf};

use blackbox_core::config::Config;
use blackbox_core::models::{Geometry, GeometryPatch, TabId, WidgetInstance, WidgetKind};
use blackbox_core::timestamps::format_millis;
use blackbox_engine::{GestureKind, Workspace, locks};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

use crate::output::{CliTable, Output};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] blackbox_core::Error),
    #[error("{0}")]
    Usage(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Stable code printed next to the message.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Engine(e) => e.error_type(),
            Self::Usage(_) => "USAGE",
            Self::Io(_) => "OS_ERROR",
        }
    }

    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => 2,
            Self::Engine(_) | Self::Io(_) => 1,
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;

#[derive(Parser, Debug)]
#[command(name = "bbx", version, about = "Blackbox dashboard CLI")]
pub struct Cli {
    /// Data directory (overrides `BLACKBOX_DATA_DIR`).
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
    /// Machine-readable JSON output.
    #[arg(long, global = true)]
    pub json: bool,
    /// Do not write changes back, even with autosave on.
    #[arg(long, global = true)]
    pub no_save: bool,
    /// Debug logging on stderr (`RUST_LOG` wins when set).
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List widget instances in traversal order.
    List,
    /// Add a widget with its default size below the board.
    Add { kind: String },
    /// Place a widget at an explicit geometry.
    Create {
        kind: String,
        #[arg(long, default_value_t = 0.0)]
        x: f64,
        #[arg(long, default_value_t = 0.0)]
        y: f64,
        #[arg(long)]
        w: Option<f64>,
        #[arg(long)]
        h: Option<f64>,
    },
    /// Move a widget; `--with-stack` drags its stack along.
    Move {
        id: String,
        x: f64,
        y: f64,
        #[arg(long)]
        with_stack: bool,
    },
    Resize { id: String, w: f64, h: f64 },
    /// Raise a widget above all others.
    Front { id: String },
    Enable { id: String },
    Disable { id: String },
    Delete { id: String },
    /// Merge a JSON object into a widget's config (`null` removes a key).
    #[command(name = "set-config")]
    SetConfig { id: String, config: String },
    /// Lock or unlock a stack group by key (see `groups`).
    #[command(name = "lock-group")]
    LockGroup {
        key: String,
        #[arg(long)]
        unlock: bool,
    },
    /// Lock or unlock a single widget.
    Lock {
        id: String,
        #[arg(long)]
        unlock: bool,
    },
    /// Take a widget out of its stack.
    Unlink { id: String },
    /// Let an unlinked widget stack again.
    Relink { id: String },
    /// Show derived stack groups.
    Groups,
    Undo,
    Redo,
    Status,
    /// Replace the board with the stock layout.
    Reset,
    /// Show or switch the active tab.
    Tab { tab: Option<String> },
    Template {
        #[command(subcommand)]
        action: TemplateCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum TemplateCommand {
    List,
    /// Save the current board and tab as a template.
    Create { name: String },
    Apply { id: String },
    Delete { id: String },
    Rename { id: String, name: String },
    Duplicate { id: String },
    /// Import a JSON array of templates from a file (`-` for stdin).
    Import { path: PathBuf },
    /// Export user templates as JSON.
    Export {
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// Delete every user template.
    Reset,
}

pub fn run() -> i32 {
    let stdout = io::stdout();
    let stderr = io::stderr();
    run_with(std::env::args_os(), &mut stdout.lock(), &mut stderr.lock())
}

/// Parse `args` and execute, writing results to `out` and errors to `err`.
pub fn run_with<I, T>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            let rendered = e.render().to_string();
            let _ = if e.use_stderr() {
                write!(err, "{rendered}")
            } else {
                write!(out, "{rendered}")
            };
            return e.exit_code();
        }
    };
    init_logging(cli.verbose);
    match execute(cli, out) {
        Ok(()) => 0,
        Err(e) => {
            let _ = writeln!(err, "error[{}]: {e}", e.code());
            e.exit_code()
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn execute(cli: Cli, out: &mut dyn Write) -> CliResult<()> {
    let mut config = Config::from_env();
    if let Some(dir) = cli.data_dir {
        config = config.with_data_dir(dir);
    }
    let save = config.autosave && !cli.no_save;
    let mut ws = Workspace::open(config)?;
    let mut output = Output::new(out, cli.json);

    dispatch(&mut ws, cli.command, &mut output)?;

    if save {
        let written = ws.flush()?;
        tracing::debug!(written, "workspace saved");
    } else if ws.is_dirty() {
        tracing::info!("changes discarded (saving disabled)");
    }
    Ok(())
}

fn dispatch(ws: &mut Workspace, command: Commands, out: &mut Output<'_>) -> CliResult<()> {
    match command {
        Commands::List => handle_list(ws, out),
        Commands::Add { kind } => {
            let kind: WidgetKind = kind.parse()?;
            let id = ws.engine_mut().add_widget(kind)?;
            print_instance(ws.engine().instance(id.as_str())?, out)
        }
        Commands::Create { kind, x, y, w, h } => {
            let kind: WidgetKind = kind.parse()?;
            let (default_w, default_h) = kind.default_size();
            let geometry = Geometry::new(x, y, w.unwrap_or(default_w), h.unwrap_or(default_h));
            let id = ws.engine_mut().create_instance(kind, geometry)?;
            print_instance(ws.engine().instance(id.as_str())?, out)
        }
        Commands::Move {
            id,
            x,
            y,
            with_stack,
        } => {
            let patch = GeometryPatch::position(x, y);
            if with_stack {
                let engine = ws.engine_mut();
                engine.begin_gesture(&id, GestureKind::Move)?;
                engine.gesture_move(&patch)?;
                engine.end_gesture()?;
            } else {
                ws.engine_mut().update_layout(&id, &patch)?;
            }
            print_instance(ws.engine().instance(&id)?, out)
        }
        Commands::Resize { id, w, h } => {
            ws.engine_mut().update_layout(&id, &GeometryPatch::size(w, h))?;
            print_instance(ws.engine().instance(&id)?, out)
        }
        Commands::Front { id } => {
            let z_index = ws.engine_mut().bring_to_front(&id)?;
            let data = json!({ "instanceId": id, "zIndex": z_index });
            Ok(out.json_or(&data, |o| o.line(&format!("{id} raised to z {z_index}")))?)
        }
        Commands::Enable { id } => set_enabled(ws, &id, true, out),
        Commands::Disable { id } => set_enabled(ws, &id, false, out),
        Commands::Delete { id } => {
            ws.engine_mut().delete_instance(&id)?;
            let data = json!({ "deleted": id });
            Ok(out.json_or(&data, |o| o.line(&format!("deleted {id}")))?)
        }
        Commands::SetConfig { id, config } => {
            let partial = parse_config_object(&config)?;
            ws.engine_mut().update_config(&id, partial)?;
            print_instance(ws.engine().instance(&id)?, out)
        }
        Commands::LockGroup { key, unlock } => {
            let changed = ws.engine_mut().lock_group(&key, !unlock)?;
            let data = json!({ "group": key, "locked": !unlock, "changed": changed });
            let verb = if unlock { "unlocked" } else { "locked" };
            Ok(out.json_or(&data, |o| o.line(&format!("group {key} {verb}")))?)
        }
        Commands::Lock { id, unlock } => {
            ws.engine_mut().set_instance_locked(&id, !unlock)?;
            print_instance(ws.engine().instance(&id)?, out)
        }
        Commands::Unlink { id } => {
            ws.engine_mut().unlink_from_stack(&id)?;
            print_instance(ws.engine().instance(&id)?, out)
        }
        Commands::Relink { id } => {
            ws.engine_mut().relink_to_stacks(&id)?;
            print_instance(ws.engine().instance(&id)?, out)
        }
        Commands::Groups => handle_groups(ws, out),
        Commands::Undo => {
            let undone = ws.engine_mut().undo();
            let data = json!({ "undone": undone });
            let message = if undone { "undone" } else { "nothing to undo" };
            Ok(out.json_or(&data, |o| o.line(message))?)
        }
        Commands::Redo => {
            let redone = ws.engine_mut().redo();
            let data = json!({ "redone": redone });
            let message = if redone { "redone" } else { "nothing to redo" };
            Ok(out.json_or(&data, |o| o.line(message))?)
        }
        Commands::Status => handle_status(ws, out),
        Commands::Reset => {
            ws.engine_mut().reset_to_defaults()?;
            let count = ws.engine().state().len();
            let data = json!({ "instances": count });
            Ok(out.json_or(&data, |o| {
                o.line(&format!("board reset to defaults ({count} widgets)"))
            })?)
        }
        Commands::Tab { tab } => {
            if let Some(tab) = tab {
                let tab: TabId = tab.parse()?;
                ws.navigation_mut().set_active_tab(tab);
            }
            let active = ws.navigation().active_tab();
            let data = json!({ "activeTab": active });
            Ok(out.json_or(&data, |o| o.line(active.as_str()))?)
        }
        Commands::Template { action } => handle_template(ws, action, out),
    }
}

// ── Instance commands ────────────────────────────────────────────────────

fn instance_state(instance: &WidgetInstance) -> String {
    let mut flags = vec![if instance.enabled { "shown" } else { "hidden" }];
    if instance.is_locked {
        flags.push("locked");
    }
    if instance.group_disabled {
        flags.push("unlinked");
    }
    flags.join(",")
}

fn print_instance(instance: &WidgetInstance, out: &mut Output<'_>) -> CliResult<()> {
    Ok(out.json_or(instance, |o| {
        o.line(&format!(
            "{}  {}  {}  z={}  {}",
            instance.instance_id,
            instance.kind,
            instance.layout,
            instance.z_index,
            instance_state(instance)
        ))
    })?)
}

fn set_enabled(ws: &mut Workspace, id: &str, enabled: bool, out: &mut Output<'_>) -> CliResult<()> {
    ws.engine_mut().set_enabled(id, enabled)?;
    print_instance(ws.engine().instance(id)?, out)
}

fn parse_config_object(raw: &str) -> CliResult<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(CliError::Usage("config must be a JSON object".into())),
        Err(e) => Err(CliError::Usage(format!("config is not valid JSON: {e}"))),
    }
}

fn handle_list(ws: &Workspace, out: &mut Output<'_>) -> CliResult<()> {
    let engine = ws.engine();
    let instances: Vec<&WidgetInstance> = engine
        .traversal_order()
        .iter()
        .filter_map(|id| engine.get(id.as_str()))
        .collect();
    Ok(out.json_or(&instances, |o| {
        let groups = locks::group_index(engine.state());
        let mut table = CliTable::new(&["ID", "TYPE", "TITLE", "LAYOUT", "Z", "GROUP", "STATE"]);
        for instance in &instances {
            let group = groups
                .get(&instance.instance_id)
                .map_or("-", String::as_str);
            table.add_row(vec![
                instance.instance_id.to_string(),
                instance.kind.to_string(),
                instance.display_title().to_string(),
                instance.layout.to_string(),
                instance.z_index.to_string(),
                group.to_string(),
                instance_state(instance),
            ]);
        }
        o.table(&table, "no widgets")
    })?)
}

fn handle_groups(ws: &Workspace, out: &mut Output<'_>) -> CliResult<()> {
    let groups = ws.engine().stack_groups();
    Ok(out.json_or(&groups, |o| {
        let mut table = CliTable::new(&["KEY", "MEMBERS", "LOCKED"]);
        for group in &groups {
            table.add_row(vec![
                group.key.clone(),
                group.members.len().to_string(),
                if group.locked { "yes" } else { "no" }.to_string(),
            ]);
        }
        o.table(&table, "no groups")
    })?)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusReport {
    data_dir: String,
    grid_step: f64,
    instances: usize,
    enabled: usize,
    undo_depth: usize,
    redo_depth: usize,
    history_limit: usize,
    active_tab: TabId,
    user_templates: usize,
}

fn handle_status(ws: &Workspace, out: &mut Output<'_>) -> CliResult<()> {
    let engine = ws.engine();
    let report = StatusReport {
        data_dir: ws.config().data_dir.display().to_string(),
        grid_step: engine.config().grid_step,
        instances: engine.state().len(),
        enabled: engine.render_order().len(),
        undo_depth: engine.history().undo_len(),
        redo_depth: engine.history().redo_len(),
        history_limit: engine.history().depth(),
        active_tab: ws.navigation().active_tab(),
        user_templates: ws.templates().user_templates().len(),
    };
    Ok(out.json_or(&report, |o| {
        o.kv("data dir", &report.data_dir)?;
        o.kv("grid step", report.grid_step)?;
        o.kv("widgets", format!("{} ({} shown)", report.instances, report.enabled))?;
        o.kv(
            "history",
            format!(
                "{} undo / {} redo (limit {})",
                report.undo_depth, report.redo_depth, report.history_limit
            ),
        )?;
        o.kv("active tab", report.active_tab)?;
        o.kv("templates", report.user_templates)
    })?)
}

// ── Template commands ────────────────────────────────────────────────────

fn handle_template(ws: &mut Workspace, action: TemplateCommand, out: &mut Output<'_>) -> CliResult<()> {
    match action {
        TemplateCommand::List => {
            let templates: Vec<_> = ws.templates().list().collect();
            Ok(out.json_or(&templates, |o| {
                let mut table = CliTable::new(&["ID", "NAME", "WIDGETS", "KIND", "UPDATED"]);
                for template in &templates {
                    let (kind, updated) = if template.is_default {
                        ("built-in", "-".to_string())
                    } else {
                        ("user", format_millis(template.updated_at))
                    };
                    table.add_row(vec![
                        template.id.clone(),
                        template.name.clone(),
                        template.snapshot.instances.len().to_string(),
                        kind.to_string(),
                        updated,
                    ]);
                }
                o.table(&table, "no templates")
            })?)
        }
        TemplateCommand::Create { name } => {
            let id = ws.create_template(&name)?;
            let data = json!({ "id": id });
            Ok(out.json_or(&data, |o| o.line(&format!("created template {id}")))?)
        }
        TemplateCommand::Apply { id } => {
            ws.apply_template(&id)?;
            let tab = ws.navigation().active_tab();
            let data = json!({ "applied": id, "activeTab": tab });
            Ok(out.json_or(&data, |o| o.line(&format!("applied {id} (tab {tab})")))?)
        }
        TemplateCommand::Delete { id } => {
            ws.templates_mut().delete_template(&id)?;
            let data = json!({ "deleted": id });
            Ok(out.json_or(&data, |o| o.line(&format!("deleted template {id}")))?)
        }
        TemplateCommand::Rename { id, name } => {
            ws.templates_mut().rename_template(&id, &name)?;
            let data = json!({ "renamed": id, "name": name.trim() });
            Ok(out.json_or(&data, |o| o.line(&format!("renamed {id}")))?)
        }
        TemplateCommand::Duplicate { id } => {
            let copy = ws.templates_mut().duplicate_template(&id)?;
            let data = json!({ "id": copy });
            Ok(out.json_or(&data, |o| o.line(&format!("created template {copy}")))?)
        }
        TemplateCommand::Import { path } => {
            let payload = read_input(&path)?;
            let count = ws.templates_mut().try_import_templates(&payload)?;
            let data = json!({ "imported": count });
            Ok(out.json_or(&data, |o| o.line(&format!("imported {count} templates")))?)
        }
        TemplateCommand::Export { output } => {
            let exported = ws.templates().export_templates()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &exported)?;
                    let count = ws.templates().user_templates().len();
                    let data = json!({ "exported": count, "path": path.display().to_string() });
                    Ok(out.json_or(&data, |o| {
                        o.line(&format!("exported {count} templates to {}", path.display()))
                    })?)
                }
                None => Ok(out.line(&exported)?),
            }
        }
        TemplateCommand::Reset => {
            let removed = ws.templates_mut().reset_templates();
            let data = json!({ "removed": removed });
            Ok(out.json_or(&data, |o| o.line(&format!("removed {removed} templates")))?)
        }
    }
}

fn read_input(path: &Path) -> CliResult<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["bbx", "list", "--json", "--data-dir", "/tmp/x"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        assert!(matches!(cli.command, Commands::List));
    }

    #[test]
    fn parses_template_subcommands() {
        let cli = Cli::try_parse_from(["bbx", "template", "rename", "tpl_1", "New name"]).unwrap();
        match cli.command {
            Commands::Template {
                action: TemplateCommand::Rename { id, name },
            } => {
                assert_eq!(id, "tpl_1");
                assert_eq!(name, "New name");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn config_must_be_object() {
        assert!(parse_config_object(r#"{"city": "Oslo"}"#).is_ok());
        assert_eq!(parse_config_object("[1]").unwrap_err().exit_code(), 2);
        assert_eq!(parse_config_object("{").unwrap_err().code(), "USAGE");
    }

    #[test]
    fn engine_errors_keep_their_code() {
        let err = CliError::from(blackbox_core::Error::Locked("a".into()));
        assert_eq!(err.code(), "LOCKED");
        assert_eq!(err.exit_code(), 1);
    }
}
