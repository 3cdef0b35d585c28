//! Transfer progress rendering.
//!
//! On a terminal an indicatif bar is drawn per file. Otherwise a plain line
//! is rewritten in place (`\r`) at most every 250 ms, plus once at the end.

use std::io::{self, IsTerminal, Write};
use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use driveloader_core::download::{DownloadError, TransferOutcome};
use driveloader_core::utils::{format_hms, format_size, format_speed};
use driveloader_download::{ProgressReporter, ProgressThrottle, TransferProgress};

/// `ProgressReporter` for the terminal.
pub struct CliProgress {
    inner: Mutex<ProgressRender>,
}

enum ProgressRender {
    Fancy(Option<ProgressBar>),
    Plain(PlainProgress),
}

impl CliProgress {
    /// Create a reporter, auto-detecting terminal capability.
    pub fn new() -> Self {
        let render = if io::stdout().is_terminal() {
            ProgressRender::Fancy(None)
        } else {
            ProgressRender::Plain(PlainProgress::default())
        };
        Self {
            inner: Mutex::new(render),
        }
    }

    fn with_render(&self, f: impl FnOnce(&mut ProgressRender)) {
        // Progress is cosmetic; a poisoned lock still holds usable state.
        let mut guard = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut guard);
    }
}

impl Default for CliProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for CliProgress {
    fn on_start(&self, name: &str, total: Option<u64>) {
        self.with_render(|render| match render {
            ProgressRender::Fancy(bar) => {
                let pb = match total {
                    Some(t) if t > 0 => download_bar(t),
                    _ => spinner(),
                };
                pb.set_message(name.to_string());
                *bar = Some(pb);
            }
            ProgressRender::Plain(plain) => plain.start(name),
        });
    }

    fn on_progress(&self, progress: &TransferProgress) {
        self.with_render(|render| match render {
            ProgressRender::Fancy(Some(pb)) => {
                if let Some(total) = progress.total {
                    pb.set_length(total);
                }
                pb.set_position(progress.downloaded);
            }
            ProgressRender::Fancy(None) => {}
            ProgressRender::Plain(plain) => plain.update(progress),
        });
    }

    fn on_finish(&self, _name: &str, result: Result<&TransferOutcome, &DownloadError>) {
        self.with_render(|render| match render {
            ProgressRender::Fancy(bar) => {
                if let Some(pb) = bar.take() {
                    pb.finish_and_clear();
                }
                if let Ok(outcome) = result {
                    println!(
                        "Saved {} ({})",
                        outcome.final_path.display(),
                        format_size(outcome.bytes_written)
                    );
                }
            }
            ProgressRender::Plain(plain) => plain.finish(),
        });
    }
}

fn download_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::stdout());
    if let Ok(style) = ProgressStyle::with_template(
        "{msg:30!} [{bar:32.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, ETA {eta_precise})",
    ) {
        pb.set_style(style.progress_chars("█▓░"));
    }
    pb
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::with_draw_target(None, ProgressDrawTarget::stdout());
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg} {bytes}") {
        pb.set_style(style);
    }
    pb
}

#[derive(Default)]
struct PlainProgress {
    throttle: ProgressThrottle,
    last_line_len: usize,
    printed: bool,
}

impl PlainProgress {
    fn start(&mut self, name: &str) {
        self.throttle.reset();
        println!("Downloading {name}");
    }

    fn update(&mut self, progress: &TransferProgress) {
        if !self.throttle.should_emit(progress) {
            return;
        }
        let line = progress_line(progress);
        let pad = self.last_line_len.saturating_sub(line.len());
        print!("\r{line}{}", " ".repeat(pad));
        io::stdout().flush().ok();
        self.last_line_len = line.len();
        self.printed = true;
    }

    fn finish(&mut self) {
        if self.printed {
            println!();
        }
        self.printed = false;
        self.last_line_len = 0;
    }
}

/// `Downloaded 4.00 MB / 10.00 MB (40.0%), Remaining 6.00 MB, ETA 00:00:03, 2.00 MB/s`
pub fn progress_line(progress: &TransferProgress) -> String {
    let speed = progress.speed.map_or_else(|| format_speed(0.0), format_speed);
    let eta = progress
        .eta
        .map_or_else(|| "--:--:--".to_string(), format_hms);

    match (progress.total, progress.percent(), progress.remaining()) {
        (Some(total), Some(pct), Some(remaining)) => format!(
            "Downloaded {} / {} ({pct:.1}%), Remaining {}, ETA {eta}, {speed}",
            format_size(progress.downloaded),
            format_size(total),
            format_size(remaining),
        ),
        _ => format!(
            "Downloaded {}, ETA {eta}, {speed}",
            format_size(progress.downloaded)
        ),
    }
}
