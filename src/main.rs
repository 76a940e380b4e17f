//! A console-style menu for a project player.
//!
//! Run the binary to browse the projects folder, remap a project's
//! controls, or fetch a project's metadata by numeric ID.  Choosing Play
//! prints the project path and its controls on stdout for a launcher.
//! Run with `--init-bash` to print a launcher function for your `.bashrc`.

mod app;
mod config;
mod core;
mod screens;
mod shell;
#[cfg(test)]
mod testing;
mod ui;

use std::io::stderr;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::app::{
    event::TerminalInput,
    input::InputTable,
    screen::{run_shell, ShellOutcome},
    services::{QuitFlag, Services},
};
use crate::config::ShellConfig;
use crate::core::{binding::BindingStore, fetch::HttpFetcher, project::FsProjectStore};
use crate::screens::MainMenu;
use crate::shell::integration;
use crate::ui::{terminal::TerminalRenderer, text::CellMeasure};

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Console menu shell for a project player")]
struct Cli {
    /// Folder scanned for `*.sb3` projects (overrides the config file).
    #[arg(long)]
    projects: Option<PathBuf>,

    /// Number of display surfaces, 1 or 2.
    #[arg(long)]
    surfaces: Option<usize>,

    /// Config file to read instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective configuration and exit.
    #[arg(long = "write-config")]
    write_config: bool,

    /// Print the bash launcher function and exit.
    #[arg(long = "init-bash")]
    init_bash: bool,

    /// Print the zsh launcher function and exit.
    #[arg(long = "init-zsh")]
    init_zsh: bool,
}

impl Cli {
    /// Layer command-line overrides on top of the loaded config.
    fn apply(&self, config: &mut ShellConfig) {
        if let Some(dir) = &self.projects {
            // bindings follow the projects folder unless configured apart
            if config.bindings_dir == config.projects_dir {
                config.bindings_dir = dir.clone();
            }
            config.projects_dir = dir.clone();
        }
        if let Some(n) = self.surfaces {
            config.surfaces = n.clamp(1, 2);
        }
    }
}

// ───────────────────────────────────────── entry ─────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr) // stdout carries the launch payload
        .init();

    let cli = Cli::parse();

    if cli.init_bash {
        print!("{}", integration::bash_function());
        return Ok(());
    }
    if cli.init_zsh {
        print!("{}", integration::zsh_function());
        return Ok(());
    }

    let mut config = ShellConfig::load(cli.config.as_deref());
    cli.apply(&mut config);

    if cli.write_config {
        let path = config.save(cli.config.as_deref())?;
        eprintln!("wrote {}", path.display());
        return Ok(());
    }

    if let Err(e) = std::fs::create_dir_all(&config.projects_dir) {
        tracing::warn!(dir = %config.projects_dir.display(), error = %e, "cannot create projects folder");
    }
    let fetcher = HttpFetcher::new(config.fetch_timeout())?;

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    let mut stderr_handle = stderr();
    execute!(stderr_handle, EnterAlternateScreen, EnableMouseCapture)?;
    let reports_release = matches!(supports_keyboard_enhancement(), Ok(true));
    if reports_release {
        execute!(
            stderr_handle,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    tracing::debug!(reports_release, surfaces = config.surfaces, "terminal ready");

    let outcome = run_menu(&config, &fetcher, reports_release);

    // ── teardown (always, even when the menu failed) ──────────
    if reports_release {
        let _ = execute!(stderr_handle, PopKeyboardEnhancementFlags);
    }
    let _ = execute!(stderr_handle, LeaveAlternateScreen, DisableMouseCapture);
    let _ = disable_raw_mode();

    match outcome? {
        ShellOutcome::Play { project, controls } => {
            tracing::info!(project = %project.display(), "launching");
            integration::print_play_payload(&project, &controls);
        }
        ShellOutcome::Exit => tracing::info!("exit"),
    }
    Ok(())
}

/// Wire the real services together and drive the screen stack.
fn run_menu(config: &ShellConfig, fetcher: &HttpFetcher, reports_release: bool) -> Result<ShellOutcome> {
    let terminal = Terminal::new(CrosstermBackend::new(stderr()))?;
    let mut render = TerminalRenderer::new(terminal, config.surfaces)?;
    let signal = QuitFlag::default();
    let mut input = TerminalInput::new(config, signal.clone(), reports_release);
    let projects = FsProjectStore::new(config.projects_dir.clone());

    let mut services = Services {
        input: &mut input,
        render: &mut render,
        text: &CellMeasure,
        projects: &projects,
        fetcher,
        signal: &signal,
        config,
        table: InputTable::default(),
        bindings: BindingStore::new(config.bindings_dir.clone()),
    };
    run_shell(Box::new(MainMenu::new()), &mut services)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_move_bindings_with_projects() {
        let cli = Cli::parse_from(["player-shell", "--projects", "/games", "--surfaces", "5"]);
        let mut config = ShellConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.projects_dir, PathBuf::from("/games"));
        assert_eq!(config.bindings_dir, PathBuf::from("/games"));
        assert_eq!(config.surfaces, 2);
    }

    #[test]
    fn separate_bindings_dir_is_kept() {
        let cli = Cli::parse_from(["player-shell", "--projects", "/games"]);
        let mut config = ShellConfig {
            bindings_dir: PathBuf::from("/keys"),
            ..ShellConfig::default()
        };
        cli.apply(&mut config);
        assert_eq!(config.bindings_dir, PathBuf::from("/keys"));
    }
}
