//! Full-screen error display for problems found before the animation starts.

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Paragraph, Wrap},
};
use std::io::{self, Stdout};
use std::time::Duration;

const ERROR_BACKGROUND: Color = Color::Rgb(255, 0, 0);
const ERROR_FOREGROUND: Color = Color::Rgb(255, 255, 255);

/// Red full-screen message, dismissed with any key.
pub struct ErrorScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    restored: bool,
}

impl ErrorScreen {
    /// Creates a new error screen and enters alternate screen mode.
    ///
    /// # Errors
    /// - If terminal cannot be initialized
    /// - If raw mode cannot be enabled
    /// - If alternate screen cannot be entered
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(ErrorScreen {
            terminal,
            restored: false,
        })
    }

    /// Shows `error_message` centred on a red screen until a key is pressed.
    ///
    /// The message wraps to 80% of the screen width.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn show_error(&mut self, error_message: &str) -> anyhow::Result<()> {
        let style = Style::default().fg(ERROR_FOREGROUND).bg(ERROR_BACKGROUND);
        let mut lines: Vec<Line> = error_message.lines().map(Line::raw).collect();
        lines.push(Line::raw(""));
        lines.push(Line::styled("Press any key to exit", style.add_modifier(Modifier::DIM)));

        loop {
            self.terminal.draw(|frame| {
                let area = frame.area();
                frame.buffer_mut().set_style(area, style);

                let text_width = area.width * 8 / 10;
                let top = area.height.saturating_sub(lines.len() as u16) / 2;
                let centered_area = Rect {
                    x: area.x + (area.width - text_width) / 2,
                    y: area.y + top,
                    width: text_width,
                    height: area.height - top,
                };

                let paragraph = Paragraph::new(lines.clone())
                    .style(style)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true });
                frame.render_widget(paragraph, centered_area);
            })?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(_) = event::read()? {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    /// - If cursor cannot be shown
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for ErrorScreen {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
