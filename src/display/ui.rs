//! Terminal user interface hosting the animated wave graph.
//!
//! Owns the terminal, measures the drawing area, turns mouse activity into pointer
//! updates and paints each frame with a status footer.

use crossterm::{
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyCode, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    layout::Position,
    prelude::*,
    style::{Color, Style},
    symbols::Marker,
    widgets::{canvas::Canvas, Paragraph},
};
use std::io::{stdout, Stdout};
use std::time::Duration;

use crate::config::RenderConfig;
use crate::display::painter::{paint_scene, to_color};
use crate::wave::{Pointer, Scene, ViewportSize, WaveGraph};

/// Braille cells hold 2x4 dots; one dot is one viewport pixel.
const DOTS_PER_COLUMN: f64 = 2.0;
const DOTS_PER_ROW: f64 = 4.0;

const FOOTER_HEIGHT: u16 = 1;

/// User input command while the graph is animating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchCommand {
    /// Keep animating (no key pressed, or only pointer activity)
    Continue,
    /// Leave the app (Escape, 'q' or Ctrl+C)
    Quit,
    /// Stop or restart the animation (Space key)
    TogglePause,
    /// Drop every line and start over ('r' key)
    Clear,
}

/// Values shown in the footer.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusLine {
    pub running: bool,
    pub ticks: u64,
    pub lines: usize,
    pub pointer_sample: Option<usize>,
}

/// Terminal UI that draws the wave scene onto a braille canvas.
pub struct WaveTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    canvas_area: Rect,
    restored: bool,
}

impl WaveTui {
    /// Creates a new TUI instance and enters alternate screen mode with mouse reporting.
    ///
    /// # Errors
    /// - If terminal cannot be initialized
    /// - If raw mode cannot be enabled
    /// - If alternate screen cannot be entered
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableFocusChange
        )?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;

        let size = terminal.size()?;
        let canvas_area = canvas_area(Rect::new(0, 0, size.width, size.height));
        tracing::debug!("Terminal initialized: {}x{} cells", size.width, size.height);

        Ok(WaveTui {
            terminal,
            canvas_area,
            restored: false,
        })
    }

    /// Re-measures the drawing area and returns its size in viewport pixels.
    ///
    /// # Errors
    /// - If the terminal size cannot be queried
    pub fn measure(&mut self) -> anyhow::Result<ViewportSize> {
        let size = self.terminal.size()?;
        self.canvas_area = canvas_area(Rect::new(0, 0, size.width, size.height));
        Ok(viewport_for(self.canvas_area))
    }

    /// Renders the scene and the status footer.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn draw(
        &mut self,
        scene: &Scene,
        style: &RenderConfig,
        status: StatusLine,
    ) -> anyhow::Result<()> {
        let canvas_area = self.canvas_area;
        let viewport = viewport_for(canvas_area);
        let background = to_color(style.background);

        self.terminal.draw(|frame| {
            let area = frame.area();

            let canvas = Canvas::default()
                .marker(Marker::Braille)
                .background_color(background)
                .x_bounds([0.0, viewport.width])
                .y_bounds([0.0, viewport.height])
                .paint(|ctx| paint_scene(ctx, scene, style));
            frame.render_widget(canvas, canvas_area);

            let footer_area = Rect {
                x: area.x,
                y: area.y + area.height.saturating_sub(FOOTER_HEIGHT),
                width: area.width,
                height: FOOTER_HEIGHT.min(area.height),
            };
            frame.render_widget(footer(status, style), footer_area);
        })?;

        Ok(())
    }

    /// Waits up to `timeout` for input, applying pointer events to `graph`.
    ///
    /// Drains every queued event so pointer state is current before the next frame.
    /// Pointer motion inside the canvas sets the pointer; leaving the canvas, releasing the
    /// button or losing terminal focus clears it.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_input(
        &mut self,
        timeout: Duration,
        graph: &mut WaveGraph,
    ) -> anyhow::Result<WatchCommand> {
        let mut command = WatchCommand::Continue;
        let mut wait = timeout;

        while event::poll(wait)? {
            wait = Duration::ZERO;
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    let next = match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => {
                            tracing::debug!("Escape or 'q' pressed: quitting");
                            WatchCommand::Quit
                        }
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            tracing::debug!("Ctrl+C pressed: quitting");
                            WatchCommand::Quit
                        }
                        KeyCode::Char(' ') => {
                            tracing::debug!("Space pressed: toggling animation");
                            WatchCommand::TogglePause
                        }
                        KeyCode::Char('r') => {
                            tracing::debug!("'r' pressed: clearing waves");
                            WatchCommand::Clear
                        }
                        _ => WatchCommand::Continue,
                    };
                    if next != WatchCommand::Continue {
                        command = next;
                        break;
                    }
                }
                Event::Mouse(mouse) => self.apply_mouse(mouse, graph),
                Event::FocusLost => graph.clear_pointer(),
                _ => {}
            }
        }

        Ok(command)
    }

    fn apply_mouse(&self, mouse: MouseEvent, graph: &mut WaveGraph) {
        match mouse.kind {
            MouseEventKind::Up(_) => graph.clear_pointer(),
            MouseEventKind::Moved | MouseEventKind::Drag(_) | MouseEventKind::Down(_) => {
                match pointer_in(self.canvas_area, mouse.column, mouse.row) {
                    Some(pointer) => graph.set_pointer(pointer),
                    None => graph.clear_pointer(),
                }
            }
            _ => {}
        }
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
        execute!(
            self.terminal.backend_mut(),
            DisableFocusChange,
            DisableMouseCapture,
            LeaveAlternateScreen
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for WaveTui {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

fn canvas_area(area: Rect) -> Rect {
    Rect {
        x: area.x,
        y: area.y,
        width: area.width,
        height: area.height.saturating_sub(FOOTER_HEIGHT),
    }
}

fn viewport_for(area: Rect) -> ViewportSize {
    ViewportSize::new(
        area.width as f64 * DOTS_PER_COLUMN,
        area.height as f64 * DOTS_PER_ROW,
    )
}

/// Maps a terminal cell to the centre of its dot block, or `None` outside `area`.
fn pointer_in(area: Rect, column: u16, row: u16) -> Option<Pointer> {
    if !area.contains(Position::new(column, row)) {
        return None;
    }
    let x = (column - area.x) as f64 * DOTS_PER_COLUMN + DOTS_PER_COLUMN / 2.0;
    let y = (row - area.y) as f64 * DOTS_PER_ROW + DOTS_PER_ROW / 2.0;
    Some(Pointer::new(x, y))
}

fn footer(status: StatusLine, style: &RenderConfig) -> Paragraph<'static> {
    let indicator = if status.running {
        Span::styled("● ", Style::default().fg(to_color(style.fill)))
    } else {
        Span::styled("⏸ ", Style::default().fg(Color::Yellow))
    };
    let pointer = match status.pointer_sample {
        Some(index) => format!("sample {index}"),
        None => "-".to_string(),
    };

    let text = Line::from(vec![
        indicator,
        Span::raw(format!("tick {}", status.ticks)),
        Span::raw(" / "),
        Span::raw(format!("{} lines", status.lines)),
        Span::raw(" / "),
        Span::raw(format!("pointer {pointer}")),
        Span::styled(
            "   space pause · r clear · q quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    Paragraph::new(text).style(
        Style::default()
            .fg(to_color(style.stroke))
            .bg(to_color(style.background)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_leaves_room_for_footer() {
        let area = canvas_area(Rect::new(0, 0, 80, 24));
        assert_eq!(area, Rect::new(0, 0, 80, 23));
        assert_eq!(canvas_area(Rect::new(0, 0, 80, 0)).height, 0);
    }

    #[test]
    fn test_viewport_counts_braille_dots() {
        let viewport = viewport_for(Rect::new(0, 0, 80, 23));
        assert_eq!(viewport, ViewportSize::new(160.0, 92.0));
    }

    #[test]
    fn test_pointer_maps_to_dot_centre() {
        let area = Rect::new(0, 0, 80, 23);
        assert_eq!(pointer_in(area, 40, 0), Some(Pointer::new(81.0, 2.0)));
        assert_eq!(pointer_in(area, 40, 23), None);
        assert_eq!(pointer_in(area, 80, 5), None);
    }
}
