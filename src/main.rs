use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::Level;

use omnishell::config::Config;
use omnishell::drivers::console::ConsoleDriver;
use omnishell::error::ShellError;
use omnishell::event_loop::{ControlFlow, EventLoop};
use omnishell::shell::Shell;
use omnishell::{apps, debug_log};

#[derive(Debug, Parser)]
#[command(name = "omnishell", about = "A desktop-style workspace shell for the terminal.")]
struct Cli {
    /// Path to an omnishell.toml configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to the app catalog JSON file (overrides the config file).
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Disable mouse capture (keyboard-only mode).
    #[arg(long)]
    no_mouse: bool,

    /// Log at debug level into the in-app debug overlay (F12).
    #[arg(long)]
    verbose: bool,
}

fn main() -> Result<(), ShellError> {
    let cli = Cli::parse();
    debug_log::install_global();
    debug_log::init_tracing(if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    });

    let config = Config::load_or_default(cli.config.as_deref());
    let catalog_path = cli.catalog.as_deref().or(config.catalog_path.as_deref());
    let catalog = apps::load_or_builtin(catalog_path);
    let mut shell = Shell::new(&config, &catalog);

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    terminal::enable_raw_mode()?;
    if !cli.no_mouse {
        execute!(io::stdout(), EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    let mut event_loop = EventLoop::new(ConsoleDriver::new(), Duration::from_millis(16));
    let result = event_loop.run(|_, event| {
        let now = Instant::now();
        match event {
            Some(event) => shell.handle_event(&event, now),
            None => shell.tick(now),
        }
        if shell.should_quit() {
            return Ok(ControlFlow::Quit);
        }
        terminal
            .draw(|frame| shell.render(frame))
            .map(|_| ())
            .map_err(|err| io::Error::other(err.to_string()))?;
        Ok(ControlFlow::Continue)
    });

    terminal::disable_raw_mode()?;
    execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result?;
    Ok(())
}
