//! Progress reporting for the batch commands
//!
//! Provides a simple API for displaying pipeline state:
//! - Current phase (Wrangling, Clearing, Loading..., Committing)
//! - Progress (current/total rows of the table being loaded)
//! - Activity log lines printed above the bars

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;
use tracing_subscriber::fmt::MakeWriter;

/// Pipeline phases shown in the status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Wrangling,
    Clearing,
    LoadingPrimary,
    ExtractingIds,
    LoadingDependents,
    LoadingEdges,
    Committing,
    Complete,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Wrangling => write!(f, "Wrangling source files"),
            Phase::Clearing => write!(f, "Clearing old data"),
            Phase::LoadingPrimary => write!(f, "Loading pokemon"),
            Phase::ExtractingIds => write!(f, "Collecting valid ids"),
            Phase::LoadingDependents => write!(f, "Loading dependent tables"),
            Phase::LoadingEdges => write!(f, "Loading evolutions"),
            Phase::Committing => write!(f, "Committing"),
            Phase::Complete => write!(f, "Complete"),
        }
    }
}

/// Trait for UI implementations - allows both progress bars and silent/test modes
pub trait Ui {
    fn set_phase(&mut self, phase: Phase);
    fn set_info(&mut self, info: impl Into<String>);
    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>);
    fn clear_progress(&mut self);
    fn log(&mut self, message: impl Into<String>);
}

/// Terminal progress bars on stderr
pub struct ProgressUi {
    multi: MultiProgress,
    status: ProgressBar,
    bar: Option<ProgressBar>,
    bar_style: ProgressStyle,
}

impl ProgressUi {
    pub fn new() -> Self {
        let multi = MultiProgress::new();

        let status = multi.add(ProgressBar::new_spinner());
        status.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        status.enable_steady_tick(Duration::from_millis(100));

        let bar_style = ProgressStyle::with_template("{msg:30} [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");

        Self {
            multi,
            status,
            bar: None,
            bar_style,
        }
    }

    /// Log sink that clears the bars while a line is printed
    pub fn log_writer(&self) -> LogWriter {
        LogWriter::new(self.multi.clone())
    }

    /// Stop the spinner and leave a final line behind
    pub fn finish(self, summary: &str) {
        self.clear_bar();
        self.status.set_prefix(Phase::Complete.to_string());
        self.status.finish_with_message(summary.to_string());
    }

    fn clear_bar(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

impl Default for ProgressUi {
    fn default() -> Self {
        Self::new()
    }
}

impl Ui for ProgressUi {
    fn set_phase(&mut self, phase: Phase) {
        self.status.set_prefix(phase.to_string());
        self.status.set_message("");
    }

    fn set_info(&mut self, info: impl Into<String>) {
        self.status.set_message(info.into());
    }

    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>) {
        if self.bar.is_none() {
            let bar = self.multi.add(ProgressBar::new(total));
            bar.set_style(self.bar_style.clone());
            self.bar = Some(bar);
        }
        if let Some(bar) = &self.bar {
            bar.set_length(total);
            bar.set_position(current);
            bar.set_message(label.into());
        }
    }

    fn clear_progress(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
            self.multi.remove(&bar);
        }
    }

    fn log(&mut self, message: impl Into<String>) {
        self.multi.println(message.into()).ok();
    }
}

/// `MakeWriter` for the log subscriber that keeps log lines from tearing
/// through the progress bars
#[derive(Clone)]
pub struct LogWriter {
    multi: MultiProgress,
}

impl LogWriter {
    pub fn new(multi: MultiProgress) -> Self {
        Self { multi }
    }
}

impl<'a> MakeWriter<'a> for LogWriter {
    type Writer = LogLine;

    fn make_writer(&'a self) -> Self::Writer {
        LogLine {
            multi: self.multi.clone(),
            buf: Vec::new(),
        }
    }
}

/// One formatted event, written to stderr with the bars suspended on drop
pub struct LogLine {
    multi: MultiProgress,
    buf: Vec<u8>,
}

impl LogLine {
    fn emit(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let buf = std::mem::take(&mut self.buf);
        self.multi.suspend(|| {
            let mut stderr = io::stderr().lock();
            stderr.write_all(&buf)?;
            stderr.flush()
        })
    }
}

impl Write for LogLine {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit()
    }
}

impl Drop for LogLine {
    fn drop(&mut self) {
        self.emit().ok();
    }
}

/// Silent UI implementation for testing and non-interactive use
#[derive(Default)]
pub struct SilentUi;

impl SilentUi {
    pub fn new() -> Self {
        Self
    }
}

impl Ui for SilentUi {
    fn set_phase(&mut self, _phase: Phase) {}
    fn set_info(&mut self, _info: impl Into<String>) {}
    fn set_progress(&mut self, _current: u64, _total: u64, _label: impl Into<String>) {}
    fn clear_progress(&mut self) {}
    fn log(&mut self, _message: impl Into<String>) {}
}

/// Records every call, for asserting the phase sequence in tests
#[derive(Debug, Default)]
pub struct RecordingUi {
    pub phases: Vec<Phase>,
    pub messages: Vec<String>,
}

impl Ui for RecordingUi {
    fn set_phase(&mut self, phase: Phase) {
        self.phases.push(phase);
    }
    fn set_info(&mut self, _info: impl Into<String>) {}
    fn set_progress(&mut self, _current: u64, _total: u64, _label: impl Into<String>) {}
    fn clear_progress(&mut self) {}
    fn log(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }
}
