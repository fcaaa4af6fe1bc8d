/// Output context: render width, stage timing, error reporting.
use std::io::Write;
use std::sync::OnceLock;

use super::render::Renderer;
use crate::catalog::COICOP;

/// Width used when neither `COLUMNS` nor the terminal reports one.
const FALLBACK_WIDTH: usize = 80;

/// Output context passed to all commands.
#[derive(Debug, Clone, Copy)]
pub struct OutputCtx {
    /// Columns available for rendered text.
    pub width: usize,
}

impl OutputCtx {
    /// Construct from CLI args. A `--width` override skips terminal detection.
    #[must_use]
    pub fn new(width: Option<usize>) -> Self {
        Self {
            width: width.filter(|&w| w > 0).unwrap_or_else(terminal_width),
        }
    }

    /// A category renderer at this context's width.
    #[must_use]
    pub fn renderer(&self) -> Renderer {
        Renderer::new(self.width, COICOP)
    }

    /// Start a named stage timer. Logs elapsed time at debug level on drop.
    #[must_use]
    pub fn timer(&self, label: &'static str) -> StageTimer {
        StageTimer::new(label)
    }
}

/// Terminal width, detected once per process: `COLUMNS`, then the size of
/// the controlling terminal, then [`FALLBACK_WIDTH`].
#[must_use]
pub fn terminal_width() -> usize {
    static WIDTH: OnceLock<usize> = OnceLock::new();
    *WIDTH.get_or_init(|| {
        let width = std::env::var("COLUMNS")
            .ok()
            .and_then(|c| c.trim().parse::<usize>().ok())
            .filter(|&c| c > 0)
            .or_else(|| {
                crossterm::terminal::size()
                    .ok()
                    .map(|(cols, _)| usize::from(cols))
                    .filter(|&c| c > 0)
            })
            .unwrap_or(FALLBACK_WIDTH);
        tracing::debug!(width, "Detected terminal width");
        width
    })
}

// --- Error output ---

/// Write an error to stderr as `Error: <message>`.
pub fn write_error(err: &anyhow::Error) {
    let stderr = std::io::stderr();
    let mut out = stderr.lock();
    let _ = writeln!(out, "Error: {err:#}");
}

// --- Stage timer ---

/// A RAII timer that logs elapsed milliseconds on drop.
///
/// Created via [`OutputCtx::timer`].
pub struct StageTimer {
    label: &'static str,
    start: std::time::Instant,
}

impl StageTimer {
    #[must_use]
    fn new(label: &'static str) -> Self {
        Self {
            label,
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for StageTimer {
    fn drop(&mut self) {
        let ms = self.start.elapsed().as_secs_f64() * 1000.0;
        tracing::debug!(stage = self.label, "{ms:.2}ms");
    }
}
