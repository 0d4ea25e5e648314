//! The tgsh binary: an interactive shell over the Take-Grant model.

use anyhow::Context;
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use tgsh_app::{App, AppError, Command};
use tgsh_types::ErrorCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// A teaching shell for the Take-Grant protection model.
///
/// Users, files and directories live in one rights graph; every file
/// operation is checked against it, and the take/grant rewrites let
/// rights move exactly as the model allows.
#[derive(Debug, Parser)]
#[command(name = "tgsh", version, about)]
struct Args {
    /// Directory for the user and audit files.
    #[arg(long, default_value = "tgsh-data")]
    data_dir: PathBuf,

    /// Log debug-level detail (overridden by TGSH_LOG).
    #[arg(long)]
    debug: bool,

    /// Run one command and exit instead of starting the REPL.
    #[arg(trailing_var_arg = true)]
    command: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.debug);

    let mut app = App::load(&args.data_dir);

    if !args.command.is_empty() {
        let line = args.command.join(" ");
        let result = run_line(&mut app, &line);
        app.save(&args.data_dir)
            .with_context(|| format!("saving state to {}", args.data_dir.display()))?;
        return result;
    }

    repl(&mut app)?;
    app.save(&args.data_dir)
        .with_context(|| format!("saving state to {}", args.data_dir.display()))?;
    Ok(())
}

fn init_tracing(debug: bool) {
    let default = if debug { "tgsh=debug" } else { "tgsh=info" };
    let filter = EnvFilter::try_from_env("TGSH_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// One-shot mode: errors become the process exit status.
fn run_line(app: &mut App, line: &str) -> anyhow::Result<()> {
    match app.execute_line(line) {
        Ok(output) => {
            println!("{output}");
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!("{} ({})", e, e.code())),
    }
}

fn repl(app: &mut App) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new().context("initializing line editor")?;
    println!("tgsh: take-grant protection shell (try 'help')");

    loop {
        match editor.readline(&app.prompt()) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line);
                // Peek for exit so the loop can end after the app has
                // recorded the logout.
                let leaving = matches!(Command::parse(line), Ok(Command::Exit));
                match app.execute_line(line) {
                    Ok(output) => println!("{output}"),
                    Err(e) => report(&e),
                }
                if leaving {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C clears the line, it does not kill the shell.
                println!("(interrupt, type 'exit' to leave)");
            }
            Err(ReadlineError::Eof) => {
                debug!("eof, leaving");
                break;
            }
            Err(e) => return Err(e).context("reading input"),
        }
    }
    Ok(())
}

fn report(error: &AppError) {
    eprintln!("error: {error} [{}]", error.code());
}
