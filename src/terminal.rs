// SPDX-License-Identifier: GPL-3.0-only

//! Terminal camera preview
//!
//! Renders the open camera view's live frames with Unicode half-block
//! characters, two vertical pixels per cell, until the user captures or
//! closes.

use crate::app::{Message, Runtime};
use crate::backends::camera::CameraState;
use crate::media::RasterImage;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};
use std::io::{self, stdout};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const STATUS: &str = "space capture | q close";

/// How the preview ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewExit {
    /// A frame was captured and handed to the decoder
    Captured,
    /// The camera view was closed or went away
    Closed,
}

/// Show the live preview of the open camera view
///
/// Must be called from within a tokio runtime, like [`Runtime::dispatch`].
pub fn run_preview(runtime: &mut Runtime) -> Result<PreviewExit, Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = preview_loop(&mut terminal, runtime);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn preview_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    runtime: &mut Runtime,
) -> Result<PreviewExit, Box<dyn std::error::Error>> {
    let mut frame_widget = FrameWidget::default();
    let mut status = STATUS.to_string();

    loop {
        let Some(view) = runtime.model().camera.view.as_ref() else {
            return Ok(PreviewExit::Closed);
        };
        if view.state() != CameraState::Streaming {
            debug!(state = ?view.state(), "Camera view left streaming, ending preview");
            return Ok(PreviewExit::Closed);
        }
        if let Some(frame) = view.preview()
            && frame_widget.shown_at != Some(frame.captured_at)
        {
            match RasterImage::from_camera_frame(&frame) {
                Ok(raster) => frame_widget.update(raster, frame.captured_at),
                Err(e) => warn!(error = %e, "Skipping preview frame"),
            }
        }

        terminal.draw(|f| {
            let area = f.area();

            // Bottom line is the status bar
            let camera_area = Rect {
                height: area.height.saturating_sub(1),
                ..area
            };
            f.render_widget(&frame_widget, camera_area);

            let status_area = Rect {
                x: area.x,
                y: area.height.saturating_sub(1),
                width: area.width,
                height: 1,
            };
            f.render_widget(StatusBar { message: &status }, status_area);
        })?;

        if event::poll(Duration::from_millis(16))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            let ctrl_c =
                key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
            match key.code {
                _ if ctrl_c => {
                    runtime.dispatch(Message::CloseCamera);
                    return Ok(PreviewExit::Closed);
                }
                KeyCode::Char('q') | KeyCode::Esc => {
                    runtime.dispatch(Message::CloseCamera);
                    return Ok(PreviewExit::Closed);
                }
                KeyCode::Char(' ') | KeyCode::Char('p') | KeyCode::Enter => {
                    runtime.dispatch(Message::CaptureFrame);
                    if runtime.model().camera.view.is_none() {
                        return Ok(PreviewExit::Captured);
                    }
                    status = format!("No frame yet | {}", STATUS);
                }
                _ => {}
            }
        }
    }
}

/// Widget that renders a raster using half-block characters
#[derive(Default)]
struct FrameWidget {
    frame: Option<RasterImage>,
    shown_at: Option<Instant>,
}

impl FrameWidget {
    fn update(&mut self, frame: RasterImage, captured_at: Instant) {
        self.frame = Some(frame);
        self.shown_at = Some(captured_at);
    }
}

impl Widget for &FrameWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(frame) = &self.frame else {
            let msg = "Waiting for camera...";
            let x = area.x + (area.width.saturating_sub(msg.len() as u16)) / 2;
            let y = area.y + area.height / 2;
            if y < area.y + area.height && x < area.x + area.width {
                buf.set_string(x, y, msg, Style::default());
            }
            return;
        };
        if area.width == 0 || area.height == 0 {
            return;
        }

        // Fit to the area keeping the aspect ratio; a cell is two pixels tall
        let frame_aspect = frame.width() as f64 / frame.height() as f64;
        let term_width = area.width as f64;
        let term_height = (area.height * 2) as f64;

        let (display_width, display_height) = if term_width / term_height > frame_aspect {
            let h = term_height;
            ((h * frame_aspect) as u16, (h / 2.0) as u16)
        } else {
            let w = term_width;
            (w as u16, (w / frame_aspect / 2.0) as u16)
        };
        let display_width = display_width.max(1);
        let display_height = display_height.max(1);

        let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
        let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;

        let x_scale = frame.width() as f64 / display_width as f64;
        let y_scale = frame.height() as f64 / (display_height * 2) as f64;

        for ty in 0..display_height {
            for tx in 0..display_width {
                let term_x = x_offset + tx;
                let term_y = y_offset + ty;
                if term_x >= area.x + area.width || term_y >= area.y + area.height {
                    continue;
                }

                let src_x = (tx as f64 * x_scale) as u32;
                let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
                let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

                if let Some(cell) = buf.cell_mut((term_x, term_y)) {
                    cell.set_char('▀');
                    cell.set_fg(sample_pixel(frame, src_x, src_y_top));
                    cell.set_bg(sample_pixel(frame, src_x, src_y_bottom));
                }
            }
        }
    }
}

fn sample_pixel(frame: &RasterImage, x: u32, y: u32) -> Color {
    let x = x.min(frame.width() - 1);
    let y = y.min(frame.height() - 1);
    let idx = ((y * frame.width() + x) * 4) as usize;
    match frame.pixels().get(idx..idx + 3) {
        Some(&[r, g, b]) => Color::Rgb(r, g, b),
        _ => Color::Black,
    }
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = Style::default().bg(Color::DarkGray).fg(Color::White);
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_style(style);
            }
        }
        buf.set_string(area.x + 1, area.y, self.message, style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> RasterImage {
        let pixels = (0..width * height)
            .flat_map(|_| [rgb[0], rgb[1], rgb[2], 255])
            .collect();
        RasterImage::new(width, height, pixels).unwrap()
    }

    #[test]
    fn test_placeholder_without_frame() {
        let area = Rect::new(0, 0, 30, 5);
        let mut buf = Buffer::empty(area);
        (&FrameWidget::default()).render(area, &mut buf);

        let row: String = (0..area.width)
            .map(|x| buf[(x, 2)].symbol().to_string())
            .collect();
        assert!(row.contains("Waiting for camera..."));
    }

    #[test]
    fn test_frame_rendered_as_half_blocks() {
        let mut widget = FrameWidget::default();
        widget.update(solid(8, 8, [200, 10, 30]), Instant::now());

        let area = Rect::new(0, 0, 8, 4);
        let mut buf = Buffer::empty(area);
        (&widget).render(area, &mut buf);

        let cell = &buf[(3, 1)];
        assert_eq!(cell.symbol(), "▀");
        assert_eq!(cell.fg, Color::Rgb(200, 10, 30));
        assert_eq!(cell.bg, Color::Rgb(200, 10, 30));
    }

    #[test]
    fn test_frame_keeps_aspect_ratio() {
        let mut widget = FrameWidget::default();
        // Square frame in a wide area: 4 rows hold 8 pixels, so 8 columns
        widget.update(solid(16, 16, [0, 255, 0]), Instant::now());

        let area = Rect::new(0, 0, 20, 4);
        let mut buf = Buffer::empty(area);
        (&widget).render(area, &mut buf);

        let drawn = (0..area.width)
            .filter(|&x| buf[(x, 0)].symbol() == "▀")
            .count();
        assert_eq!(drawn, 8);
        assert_eq!(buf[(0, 0)].symbol(), " ");
    }

    #[test]
    fn test_status_bar() {
        let area = Rect::new(0, 0, 30, 1);
        let mut buf = Buffer::empty(area);
        StatusBar { message: STATUS }.render(area, &mut buf);

        assert_eq!(buf[(1, 0)].symbol(), "s");
        assert_eq!(buf[(29, 0)].bg, Color::DarkGray);
    }
}
