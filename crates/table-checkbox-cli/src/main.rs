use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use relative_path::{RelativePath, RelativePathBuf};
use std::env;
use std::path::{Path, PathBuf};
use table_checkbox_config::Settings;
use table_checkbox_engine::{
    BulkConversion, COMMAND_CONVERT_ALL, COMMANDS, CheckState, ControlElement, ControlInfo,
    ConversionPolicy, DocumentService, Edit, EditorDocument, EditorEvent, EventContext,
    FileStore, NotesDir, Outcome, Position, ToggleEvent, ToggleOutcome, WindowId,
    WindowRegistry, list_controls,
};

#[derive(Debug, Parser)]
#[command(
    name = "table-checkbox",
    version,
    about = "Convert markdown table checkboxes into interactive controls"
)]
struct Cli {
    /// Notes directory that document paths are relative to
    #[arg(long, global = true)]
    notes: Option<PathBuf>,

    /// Settings file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert every checkbox in a document to a rendered control
    Convert {
        file: PathBuf,
        /// Also convert checkboxes that are not inside a table
        #[arg(long)]
        outside_tables: bool,
    },
    /// Set the state of a rendered control
    Toggle {
        file: PathBuf,
        id: String,
        #[arg(value_enum)]
        state: StateArg,
    },
    /// List rendered controls and their states
    List { file: PathBuf },
    /// Type `]` at a caret position, converting the checkbox it completes
    Type {
        file: PathBuf,
        /// Zero-based line index
        #[arg(long)]
        line: usize,
        /// Zero-based byte offset within the line
        #[arg(long)]
        ch: usize,
    },
    /// List the palette commands the engine provides
    Commands,
    /// Persist whether bulk conversion also touches checkboxes outside tables
    SetOutsideTables {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StateArg {
    Checked,
    Unchecked,
}

impl From<StateArg> for CheckState {
    fn from(state: StateArg) -> Self {
        match state {
            StateArg::Checked => CheckState::Checked,
            StateArg::Unchecked => CheckState::Unchecked,
        }
    }
}

/// One command-line session acting as a single-window host
struct App {
    store: NotesDir,
    policy: ConversionPolicy,
    registry: WindowRegistry,
    window: WindowId,
}

impl App {
    fn new(notes_path: PathBuf, policy: ConversionPolicy) -> Result<Self> {
        let store = NotesDir::open(&notes_path)
            .with_context(|| format!("Notes path '{}' is invalid", notes_path.display()))?;
        let mut registry = WindowRegistry::new();
        let window = WindowId(1);
        registry.open(window);

        Ok(Self {
            store,
            policy,
            registry,
            window,
        })
    }

    fn open_document(&self, file: &RelativePath) -> Result<EditorDocument> {
        let content = self
            .store
            .read(file)
            .with_context(|| format!("Failed to read {file}"))?;
        Ok(EditorDocument::from_text(&content))
    }

    fn dispatch(
        &mut self,
        file: &RelativePath,
        document: Option<&mut EditorDocument>,
        event: &EditorEvent,
    ) -> Result<Outcome> {
        let mut ctx = EventContext {
            document,
            store: &mut self.store,
            active_path: Some(file),
            policy: self.policy,
        };
        Ok(self.registry.dispatch(self.window, event, &mut ctx)?)
    }

    fn convert(&mut self, file: &RelativePath) -> Result<BulkConversion> {
        let mut doc = self.open_document(file)?;
        let event = EditorEvent::Command(COMMAND_CONVERT_ALL.to_string());

        match self.dispatch(file, Some(&mut doc), &event)? {
            Outcome::Bulk(result) => {
                if !result.is_noop() {
                    self.store.write(file, &doc.text())?;
                }
                Ok(result)
            }
            other => anyhow::bail!("unexpected outcome for bulk conversion: {other:?}"),
        }
    }

    fn toggle(&mut self, file: &RelativePath, id: &str, state: CheckState) -> Result<ToggleOutcome> {
        let event = EditorEvent::ControlToggled(ToggleEvent {
            target: ControlElement::checkbox(id),
            checked: state.is_checked(),
        });

        match self.dispatch(file, None, &event)? {
            Outcome::Toggled(outcome) => Ok(outcome),
            other => anyhow::bail!("unexpected outcome for toggle: {other:?}"),
        }
    }

    fn list(&self, file: &RelativePath) -> Result<Vec<ControlInfo>> {
        let content = self
            .store
            .read(file)
            .with_context(|| format!("Failed to read {file}"))?;
        Ok(list_controls(&content))
    }

    /// Behaves like an editor receiving `]`: convert when a checkbox is
    /// completed, otherwise insert the bracket as typed.
    fn type_bracket(&mut self, file: &RelativePath, caret: Position) -> Result<Option<Edit>> {
        let mut doc = self.open_document(file)?;
        doc.set_cursor(caret)
            .with_context(|| format!("Caret {}:{} is outside {file}", caret.line, caret.ch))?;

        let event = EditorEvent::KeyInput { ch: ']' };
        let edit = match self.dispatch(file, Some(&mut doc), &event)? {
            Outcome::Converted(edit) => Some(edit),
            _ => {
                doc.replace_selection("]")?;
                None
            }
        };

        self.store.write(file, &doc.text())?;
        Ok(edit)
    }
}

fn command_listing() -> Vec<String> {
    COMMANDS
        .iter()
        .map(|command| format!("{}\t{}", command.id, command.name))
        .collect()
}

fn relative(file: &Path) -> Result<RelativePathBuf> {
    RelativePathBuf::from_path(file)
        .with_context(|| format!("'{}' must be relative to the notes directory", file.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(Settings::config_path);
    log::debug!("Config path: {}", config_path.display());

    let mut settings = Settings::load_or_default_from_path(&config_path)?;

    let notes_path = match cli.notes.clone().or_else(|| settings.notes_path.clone()) {
        Some(path) => path,
        None => env::current_dir()?,
    };
    log::debug!("Notes path: {}", notes_path.display());
    let policy = settings.policy;

    match cli.command {
        Command::Convert {
            file,
            outside_tables,
        } => {
            let policy = if outside_tables {
                ConversionPolicy::everywhere()
            } else {
                policy
            };
            let mut app = App::new(notes_path, policy)?;
            let file = relative(&file)?;
            let result = app.convert(&file)?;
            println!("Converted {} checkbox(es) in {file}", result.converted());
        }
        Command::Toggle { file, id, state } => {
            let mut app = App::new(notes_path, policy)?;
            let file = relative(&file)?;
            match app.toggle(&file, &id, state.into())? {
                ToggleOutcome::Written { id, state } => println!("{id}: {state}"),
                ToggleOutcome::Unchanged { id, state } => println!("{id}: already {state}"),
                ToggleOutcome::NotFound { id } => eprintln!("No checkbox with id {id} in {file}"),
                ToggleOutcome::Ignored => {}
            }
        }
        Command::List { file } => {
            let app = App::new(notes_path, policy)?;
            let file = relative(&file)?;
            for control in app.list(&file)? {
                println!("{}\t{}", control.id, control.state);
            }
        }
        Command::Type { file, line, ch } => {
            let mut app = App::new(notes_path, policy)?;
            let file = relative(&file)?;
            match app.type_bracket(&file, Position::new(line, ch))? {
                Some(edit) => println!("Converted checkbox at {}:{}", line, edit.span.from.ch),
                None => println!("Inserted ']' at {line}:{ch}"),
            }
        }
        Command::Commands => {
            for line in command_listing() {
                println!("{line}");
            }
        }
        Command::SetOutsideTables { enabled } => {
            let changed = settings.update_at_path(&config_path, |s| {
                s.policy.convert_checkboxes_outside_tables = enabled
            })?;
            if changed {
                println!("Saved settings to {}", config_path.display());
            } else {
                println!("Settings unchanged");
            }
        }
    }

    Ok(())
}
