//! Throttled human-readable price tap.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::warn;
use tsy_common::{format_px, Price};

use crate::bus::Listener;
use crate::error::PipelineError;

/// Throttle knobs for the GUI file.
#[derive(Debug, Clone)]
pub struct GuiConfig {
    pub path: PathBuf,
    /// Hard cap on lines written per run.
    pub max_lines: u32,
    /// Minimum spacing between written lines.
    pub min_interval: Duration,
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("gui.txt"),
            max_lines: 100,
            min_interval: Duration::from_millis(300),
        }
    }
}

/// Rate-limited price view: a price event is written only while under the
/// line cap and at least the configured interval after the previous write;
/// everything else is dropped silently with no backlog. Prices render in
/// fractional notation.
pub struct GuiThrottle {
    file: Option<File>,
    max_lines: u32,
    min_interval: Duration,
    lines_written: u32,
    last_write: Option<Instant>,
}

impl GuiThrottle {
    /// Open the output file; on failure the tap is disabled for the run.
    pub fn new(config: GuiConfig) -> Self {
        let file = match File::create(&config.path) {
            Ok(f) => Some(f),
            Err(err) => {
                warn!(path = %config.path.display(), %err, "gui output disabled");
                None
            }
        };
        Self {
            file,
            max_lines: config.max_lines,
            min_interval: config.min_interval,
            lines_written: 0,
            last_write: None,
        }
    }

    pub fn lines_written(&self) -> u32 {
        self.lines_written
    }

    fn record(&mut self, price: &Price) {
        if self.lines_written >= self.max_lines {
            return;
        }
        if let Some(last) = self.last_write {
            if last.elapsed() < self.min_interval {
                return;
            }
        }
        let Some(file) = self.file.as_mut() else { return };

        let stamp = chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f");
        let line = format!(
            "{} {} {} {}",
            stamp,
            price.product_id,
            format_px(price.mid),
            format_px(price.spread)
        );
        if let Err(err) = writeln!(file, "{}", line) {
            warn!(%err, "gui write failed, disabling output");
            self.file = None;
            return;
        }
        self.lines_written += 1;
        self.last_write = Some(Instant::now());
    }
}

impl Listener<Price> for GuiThrottle {
    fn process_add(&mut self, record: &Price) -> Result<(), PipelineError> {
        self.record(record);
        Ok(())
    }

    fn process_update(&mut self, record: &Price) -> Result<(), PipelineError> {
        self.record(record);
        Ok(())
    }

    fn process_remove(&mut self, _record: &Price) -> Result<(), PipelineError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn config(dir: &tempfile::TempDir, max_lines: u32, interval: Duration) -> GuiConfig {
        GuiConfig {
            path: dir.path().join("gui.txt"),
            max_lines,
            min_interval: interval,
        }
    }

    #[test]
    fn first_event_writes_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(&dir, 100, Duration::from_secs(3600));
        let mut gui = GuiThrottle::new(cfg.clone());

        gui.process_add(&Price::new("T2Y", dec!(99.515625), dec!(0.00390625)))
            .unwrap();
        // The second event lands inside the interval and is dropped.
        gui.process_update(&Price::new("T2Y", dec!(99.5), dec!(0.00390625)))
            .unwrap();

        let text = std::fs::read_to_string(&cfg.path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("T2Y 99-16+ 0-001"), "line was {:?}", lines[0]);
    }

    #[test]
    fn line_cap_stops_output() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(&dir, 3, Duration::ZERO);
        let mut gui = GuiThrottle::new(cfg.clone());

        for _ in 0..10 {
            gui.process_update(&Price::new("T2Y", dec!(99.5), dec!(0.03125)))
                .unwrap();
        }

        let text = std::fs::read_to_string(&cfg.path).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert_eq!(gui.lines_written(), 3);
    }

    #[test]
    fn unopenable_path_disables_quietly() {
        let cfg = GuiConfig {
            path: PathBuf::from("/nonexistent-dir/gui.txt"),
            max_lines: 100,
            min_interval: Duration::ZERO,
        };
        let mut gui = GuiThrottle::new(cfg);
        gui.process_add(&Price::new("T2Y", dec!(99.5), dec!(0.03125)))
            .unwrap();
        assert_eq!(gui.lines_written(), 0);
    }
}
