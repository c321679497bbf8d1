//! wshlnk - read and write Windows shortcuts from the command line.
//!
//! A thin front end over `wshlnk::read` and `wshlnk::write`.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::{debug, error, Level};
use tracing_subscriber::FmtSubscriber;
use wshlnk::{LnkError, Shortcut, ShortcutField, WindowStyle};

#[derive(Parser, Debug)]
#[command(name = "wshlnk")]
#[command(about = "Read and write Windows shortcut (.lnk) files")]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the properties of a shortcut
    Read {
        /// Shortcut file to read
        path: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create or overwrite a shortcut
    Write {
        /// Shortcut file to write
        path: PathBuf,

        #[command(flatten)]
        fields: FieldArgs,
    },
}

#[derive(ClapArgs, Debug)]
struct FieldArgs {
    /// Start from the properties in this JSON file
    #[arg(long, value_name = "FILE")]
    from_json: Option<PathBuf>,

    /// File path or URL the shortcut points to
    #[arg(long)]
    target: Option<String>,

    /// Arguments passed to the target
    #[arg(long, allow_hyphen_values = true)]
    arguments: Option<String>,

    #[arg(long)]
    description: Option<String>,

    /// Key combination, e.g. CTRL+ALT+F
    #[arg(long)]
    hotkey: Option<String>,

    /// Icon path with optional ",index"
    #[arg(long)]
    icon: Option<String>,

    /// normal, maximized, minimized (or 1, 3, 7)
    #[arg(long)]
    window_style: Option<WindowStyle>,

    #[arg(long)]
    working_dir: Option<String>,
}

impl FieldArgs {
    fn into_shortcut(self) -> Result<Shortcut> {
        let mut shortcut = match &self.from_json {
            Some(file) => {
                let content = std::fs::read_to_string(file)
                    .with_context(|| format!("reading {}", file.display()))?;
                serde_json::from_str(&content)
                    .with_context(|| format!("parsing {}", file.display()))?
            }
            None => Shortcut::default(),
        };

        let overrides = [
            (ShortcutField::TargetPath, self.target),
            (ShortcutField::Arguments, self.arguments),
            (ShortcutField::Description, self.description),
            (ShortcutField::Hotkey, self.hotkey),
            (ShortcutField::IconLocation, self.icon),
            (
                ShortcutField::WindowStyle,
                self.window_style.map(|s| s.as_str().to_string()),
            ),
            (ShortcutField::WorkingDirectory, self.working_dir),
        ];
        for (field, value) in overrides {
            if let Some(value) = value {
                shortcut.set(field, value);
            }
        }
        Ok(shortcut)
    }
}

fn print_shortcut(shortcut: &Shortcut, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(shortcut)?);
    } else {
        for (field, value) in shortcut.iter() {
            println!("{:<17} {}", format!("{field}:"), value);
        }
    }
    Ok(())
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Read { path, json } => {
            let shortcut = wshlnk::read(&path)?;
            print_shortcut(&shortcut, json)
        }
        Command::Write { path, fields } => {
            let shortcut = fields.into_shortcut()?;
            debug!("Writing {:?}", shortcut);
            wshlnk::write(&path, &shortcut)?;
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            let code = err
                .downcast_ref::<LnkError>()
                .map(LnkError::to_exit_code)
                .unwrap_or(1);
            ExitCode::from(code as u8)
        }
    }
}
