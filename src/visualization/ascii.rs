//! Plain-text flock renderer for terminals
//!
//! `AsciiRenderer` projects the flock onto a character grid: the x
//! coordinate picks the row and y picks the column, both scaled from the
//! spatial scale to the grid size and floored. z is ignored. Boids outside
//! the grid are not drawn; the simulation itself never clamps them.
//!
//! `TerminalLoop` drives a `StepEngine` through the `FrameObserver`
//! boundary. Each frame it sizes the grid from the live terminal (unless
//! overridden), draws, then waits up to `delay` for a key: `q` or Esc is
//! the stop signal. An optional frame cap stops it as well.
//! `TerminalSession` owns raw mode and the alternate screen for the run.

use std::io::{self, Write};
use std::time::Duration;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{
    self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use tracing::error;

use crate::simulation::engine::{Control, FrameObserver};
use crate::simulation::states::FlockState;

const BOID_GLYPH: char = 'o';
const EMPTY_GLYPH: char = ' ';

/// Grid used when the terminal cannot be queried and no override is set
pub const FALLBACK_SIZE: (usize, usize) = (80, 24);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AsciiRenderer {
    pub width: usize, // columns
    pub height: usize, // rows
    pub scale: f64, // simulation units mapped onto the full grid
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize, scale: f64) -> Self {
        Self { width, height, scale }
    }

    /// Grid cell `(row, col)` for a boid at `(x, y)`, or `None` if off-grid
    pub fn cell(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let row = (x * self.height as f64 / self.scale).floor();
        let col = (y * self.width as f64 / self.scale).floor();
        let in_rows = row >= 0.0 && row < self.height as f64;
        let in_cols = col >= 0.0 && col < self.width as f64;
        (in_rows && in_cols).then_some((row as usize, col as usize))
    }

    /// One frame, `height` lines of `width` characters each
    pub fn render(&self, flock: &FlockState) -> String {
        let mut grid = vec![vec![EMPTY_GLYPH; self.width]; self.height];
        for b in flock.boids() {
            if let Some((row, col)) = self.cell(b.x.x, b.x.y) {
                grid[row][col] = BOID_GLYPH;
            }
        }

        let mut out = String::with_capacity(self.height * (self.width + 1));
        for line in grid {
            out.extend(line);
            out.push('\n');
        }
        out
    }
}

/// Stop on `q`, `Q`, Esc or Ctrl-C; every other key keeps the loop going
pub fn key_control(key: &KeyEvent) -> Control {
    if key.kind != KeyEventKind::Press {
        return Control::Continue;
    }
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) | (KeyCode::Char('q'), _) | (KeyCode::Char('Q'), _) => Control::Stop,
        (KeyCode::Char('c'), m) if m.contains(KeyModifiers::CONTROL) => Control::Stop,
        _ => Control::Continue,
    }
}

/// Raw mode + alternate screen, restored on drop (including unwinding)
pub struct TerminalSession {
    _entered: (),
}

impl TerminalSession {
    pub fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            return Err(e);
        }
        Ok(Self { _entered: () })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if let Err(err) = execute!(io::stdout(), Show, LeaveAlternateScreen) {
            error!(?err, "failed to leave alternate screen");
        }
        if let Err(err) = disable_raw_mode() {
            error!(?err, "failed to disable raw mode");
        }
    }
}

pub struct TerminalLoop<W: Write> {
    scale: f64,
    width: Option<usize>, // fixed columns, live terminal width when None
    height: Option<usize>, // fixed rows, live terminal height when None
    sink: W,
    delay: Duration,
    frames_left: Option<u64>, // no cap when None
    interactive: bool, // query the terminal and read keys
    error: Option<io::Error>,
}

impl<W: Write> TerminalLoop<W> {
    /// Detached loop: fixed grid, no keyboard, no frame cap
    pub fn new(sink: W, scale: f64, delay: Duration) -> Self {
        Self {
            scale,
            width: None,
            height: None,
            sink,
            delay,
            frames_left: None,
            interactive: false,
            error: None,
        }
    }

    /// Fix either grid dimension instead of following the terminal
    pub fn with_size(mut self, width: Option<usize>, height: Option<usize>) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_frame_cap(mut self, frames: Option<u64>) -> Self {
        self.frames_left = frames;
        self
    }

    /// Follow the live terminal size and wait for keys between frames.
    /// Pair with a [`TerminalSession`].
    pub fn interactive(mut self) -> Self {
        self.interactive = true;
        self
    }

    /// Write or input error that ended the loop early, if any
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    /// Renderer for the current frame
    pub fn renderer(&self) -> io::Result<AsciiRenderer> {
        let (cols, rows) = match (self.width, self.height) {
            (Some(w), Some(h)) => (w, h),
            _ if self.interactive => {
                let (c, r) = terminal::size()?;
                (c as usize, r as usize)
            }
            _ => FALLBACK_SIZE,
        };
        Ok(AsciiRenderer::new(
            self.width.unwrap_or(cols),
            self.height.unwrap_or(rows),
            self.scale,
        ))
    }

    fn draw(&mut self, flock: &FlockState) -> io::Result<()> {
        let frame = self.renderer()?.render(flock);
        queue!(self.sink, Clear(ClearType::All))?;
        for (row, line) in frame.lines().enumerate() {
            let Ok(row) = u16::try_from(row) else { break };
            queue!(self.sink, MoveTo(0, row), Print(line))?;
        }
        self.sink.flush()
    }

    /// Wait out the frame delay, returning early with `Stop` on a quit key
    fn wait(&self) -> io::Result<Control> {
        if event::poll(self.delay)? {
            if let Event::Key(key) = event::read()? {
                return Ok(key_control(&key));
            }
        }
        Ok(Control::Continue)
    }
}

impl<W: Write> FrameObserver for TerminalLoop<W> {
    fn observe(&mut self, flock: &FlockState) -> Control {
        if self.frames_left == Some(0) {
            return Control::Stop;
        }
        if let Err(e) = self.draw(flock) {
            self.error = Some(e);
            return Control::Stop;
        }
        if let Some(n) = self.frames_left.as_mut() {
            *n -= 1;
        }
        if !self.interactive {
            return Control::Continue;
        }
        match self.wait() {
            Ok(control) => control,
            Err(e) => {
                self.error = Some(e);
                Control::Stop
            }
        }
    }
}
