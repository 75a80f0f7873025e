use std::io::{stdout, Stdout};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{backend::CrosstermBackend, Terminal};

use arcade::ArcadeConfig;

mod ui;

use ui::{Launcher, LauncherAction, Screen, Session, Transition, IDLE_POLL};

fn main() -> Result<()> {
    let mut session = Session::new(ArcadeConfig::from_env());

    // Setup terminal
    enable_raw_mode().context("failed to enable raw mode")?;
    stdout()
        .execute(EnterAlternateScreen)
        .context("failed to enter the alternate screen")?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend).context("failed to create the terminal")?;

    let result = run(&mut terminal, &mut session);

    // Restore terminal
    disable_raw_mode().context("failed to disable raw mode")?;
    stdout()
        .execute(LeaveAlternateScreen)
        .context("failed to leave the alternate screen")?;

    for line in session.take_diagnostics() {
        eprintln!("[arcade] {line}");
    }

    result
}

// ============================================================================
// Main Loop
// ============================================================================

fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, session: &mut Session) -> Result<()> {
    let mut launcher = Launcher::new();
    let mut active: Option<Box<dyn Screen>> = None;

    loop {
        terminal.draw(|frame| match &active {
            Some(screen) => screen.render(frame, session),
            None => launcher.render(frame, session),
        })?;

        let timeout = active.as_ref().map_or(IDLE_POLL, |s| s.poll_timeout());

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match active.as_mut() {
                        Some(screen) => {
                            if screen.handle_key(key.code, session) == Transition::Leave {
                                active = None;
                            }
                        }
                        None => match launcher.handle_key(key.code) {
                            LauncherAction::Quit => break,
                            LauncherAction::Open(game) => active = Some(ui::open(game, session)),
                            LauncherAction::None => {}
                        },
                    }
                }
            }
        }

        if let Some(screen) = active.as_mut() {
            screen.update(session);
        }
    }

    Ok(())
}
