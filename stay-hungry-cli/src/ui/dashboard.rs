use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableFocusChange, EnableFocusChange, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

use super::app::{Action, App};
use super::widgets;
use crate::context::AppContext;

/// Dashboard manages the TUI lifecycle
pub struct Dashboard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    app: App,
}

impl Dashboard {
    pub fn new(app: App) -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableFocusChange)
            .context("Failed to setup terminal")?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend).context("Failed to create terminal")?;

        Ok(Self { terminal, app })
    }

    /// Run the event loop. Focus changes feed the usage tracker; the loop
    /// ends on quit or when the session goes away.
    pub async fn run(&mut self, ctx: &mut AppContext) -> Result<()> {
        loop {
            let app = &self.app;
            self.terminal.draw(|f| ui(f, app))?;

            let next = tokio::task::block_in_place(|| -> io::Result<Option<Event>> {
                if event::poll(Duration::from_millis(100))? {
                    event::read().map(Some)
                } else {
                    Ok(None)
                }
            })?;

            match next {
                Some(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    match self.app.handle_key(key.code) {
                        Action::None => {}
                        Action::Open(route) => tracing::debug!("Selected {}", route),
                        Action::Refresh => match super::load(ctx).await {
                            Ok(data) => {
                                self.app.reload(data.user, data.counts);
                                self.app.status = "Actualizado".to_string();
                            }
                            Err(e) => {
                                tracing::warn!("Dashboard refresh failed: {:#}", e);
                                self.app.status = format!("Error: {}", e);
                            }
                        },
                    }
                }
                Some(Event::FocusGained) => {
                    if let Some(tracker) = ctx.tracker() {
                        tracker.focus().await;
                    }
                }
                Some(Event::FocusLost) => {
                    if let Some(tracker) = ctx.tracker() {
                        tracker.blur().await;
                    }
                }
                _ => {}
            }

            if self.app.should_quit || !ctx.session.is_authenticated() {
                break;
            }
        }

        Ok(())
    }

    pub fn cleanup(&mut self) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableFocusChange
        )
        .context("Failed to restore terminal")?;
        self.terminal.show_cursor().context("Failed to show cursor")?;

        Ok(())
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

fn ui(f: &mut Frame, app: &App) {
    let size = f.area();

    // Welcome banner, body, status bar
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(size);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    let right = if app.counts.is_some() {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(columns[1])
    } else {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(100)])
            .split(columns[1])
    };

    widgets::render_welcome(rows[0], f.buffer_mut(), app.greeting, &app.user);
    widgets::render_menu(columns[0], f.buffer_mut(), &app.menu, app.selected_index);
    widgets::render_profile(right[0], f.buffer_mut(), &app.user, app.bmi());

    if let Some(counts) = &app.counts {
        widgets::render_role_counts(right[1], f.buffer_mut(), Some(counts.as_slice()));
    }

    widgets::render_status_bar(rows[2], f.buffer_mut(), &app.status, app.selected_route());

    if app.show_help {
        let help_area = centered_rect(60, 60, size);
        widgets::render_help_overlay(help_area, f.buffer_mut());
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
