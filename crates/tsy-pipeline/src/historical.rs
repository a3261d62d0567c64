//! Append-only historical record sinks, one per domain type.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use tracing::warn;
use tsy_common::{Inquiry, Position, PriceStream, Pv01, Trade};

use crate::bus::Listener;
use crate::error::PipelineError;

/// Timestamp-prefixed append-only text file. Every line of a record gets the
/// same local-time prefix. An unopenable or failing file disables the
/// recorder for the rest of the run; the pipeline keeps going.
pub struct FileRecorder {
    path: PathBuf,
    file: Option<File>,
}

impl FileRecorder {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file = match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(f) => Some(f),
            Err(err) => {
                warn!(path = %path.display(), %err, "historical sink disabled");
                None
            }
        };
        Self { path, file }
    }

    /// Append one record; multi-line records share a single timestamp.
    fn append(&mut self, record: &str) {
        let Some(file) = self.file.as_mut() else { return };
        let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        for line in record.lines() {
            if let Err(err) = writeln!(file, "{} {}", stamp, line) {
                warn!(path = %self.path.display(), %err, "historical sink write failed, disabling");
                self.file = None;
                return;
            }
        }
    }
}

/// `positions.txt`: per-book lines followed by the aggregate line.
pub struct PositionHistory {
    recorder: FileRecorder,
}

impl PositionHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { recorder: FileRecorder::open(path) }
    }

    fn persist(&mut self, position: &Position) {
        let mut record = String::new();
        for (book, quantity) in &position.books {
            record.push_str(&format!(
                "Product: {}, Book: {}, Quantity: {}\n",
                position.product_id, book, quantity
            ));
        }
        record.push_str(&format!(
            "Product: {}, Aggregate Position: {}\n",
            position.product_id,
            position.aggregate()
        ));
        self.recorder.append(&record);
    }
}

impl Listener<Position> for PositionHistory {
    fn process_add(&mut self, record: &Position) -> Result<(), PipelineError> {
        self.persist(record);
        Ok(())
    }

    fn process_update(&mut self, record: &Position) -> Result<(), PipelineError> {
        self.persist(record);
        Ok(())
    }

    fn process_remove(&mut self, _record: &Position) -> Result<(), PipelineError> {
        Ok(())
    }
}

/// `risk.txt`: per-product PV01 records and bucketed sector roll-ups.
pub struct RiskHistory {
    recorder: FileRecorder,
}

impl RiskHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { recorder: FileRecorder::open(path) }
    }

    fn persist(&mut self, risk: &Pv01) {
        self.recorder.append(&format!(
            "Product: {}, PV01: {}, Quantity: {}",
            risk.product_id, risk.pv01, risk.quantity
        ));
    }

    /// Record a sector roll-up produced by the risk service.
    pub fn persist_bucketed(&mut self, bucket: &Pv01) {
        self.recorder.append(&format!(
            "Bucket Sector: {}, Total PV01: {}, Total Quantity: {}",
            bucket.product_id, bucket.pv01, bucket.quantity
        ));
    }
}

impl Listener<Pv01> for RiskHistory {
    fn process_add(&mut self, record: &Pv01) -> Result<(), PipelineError> {
        self.persist(record);
        Ok(())
    }

    fn process_update(&mut self, record: &Pv01) -> Result<(), PipelineError> {
        self.persist(record);
        Ok(())
    }

    fn process_remove(&mut self, _record: &Pv01) -> Result<(), PipelineError> {
        Ok(())
    }
}

/// `streaming.txt`: the two-way stream per product.
pub struct StreamingHistory {
    recorder: FileRecorder,
}

impl StreamingHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { recorder: FileRecorder::open(path) }
    }

    fn persist(&mut self, stream: &PriceStream) {
        self.recorder.append(&format!(
            "Product: {}, Bid Price: {}, Bid Visible: {}, Bid Hidden: {}, \
             Offer Price: {}, Offer Visible: {}, Offer Hidden: {}",
            stream.product_id,
            stream.bid.price,
            stream.bid.visible_qty,
            stream.bid.hidden_qty,
            stream.offer.price,
            stream.offer.visible_qty,
            stream.offer.hidden_qty
        ));
    }
}

impl Listener<PriceStream> for StreamingHistory {
    fn process_add(&mut self, record: &PriceStream) -> Result<(), PipelineError> {
        self.persist(record);
        Ok(())
    }

    fn process_update(&mut self, record: &PriceStream) -> Result<(), PipelineError> {
        self.persist(record);
        Ok(())
    }

    fn process_remove(&mut self, _record: &PriceStream) -> Result<(), PipelineError> {
        Ok(())
    }
}

/// `allinquiries.txt`: every inquiry state observed.
pub struct InquiryHistory {
    recorder: FileRecorder,
}

impl InquiryHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { recorder: FileRecorder::open(path) }
    }

    fn persist(&mut self, inquiry: &Inquiry) {
        self.recorder.append(&format!(
            "Inquiry: {}, Product: {}, Side: {}, Quantity: {}, Price: {}, State: {}",
            inquiry.inquiry_id,
            inquiry.product_id,
            inquiry.side,
            inquiry.quantity,
            inquiry.price,
            inquiry.state
        ));
    }
}

impl Listener<Inquiry> for InquiryHistory {
    fn process_add(&mut self, record: &Inquiry) -> Result<(), PipelineError> {
        self.persist(record);
        Ok(())
    }

    fn process_update(&mut self, record: &Inquiry) -> Result<(), PipelineError> {
        self.persist(record);
        Ok(())
    }

    fn process_remove(&mut self, _record: &Inquiry) -> Result<(), PipelineError> {
        Ok(())
    }
}

/// `executions.txt`: trades emitted by the execution service.
pub struct ExecutionHistory {
    recorder: FileRecorder,
}

impl ExecutionHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { recorder: FileRecorder::open(path) }
    }

    fn persist(&mut self, trade: &Trade) {
        self.recorder.append(&format!(
            "Product: {}, Trade ID: {}, Quantity: {}, Book: {}, Price: {}, Side: {}",
            trade.product_id, trade.trade_id, trade.quantity, trade.book, trade.price, trade.side
        ));
    }
}

impl Listener<Trade> for ExecutionHistory {
    fn process_add(&mut self, record: &Trade) -> Result<(), PipelineError> {
        self.persist(record);
        Ok(())
    }

    fn process_update(&mut self, record: &Trade) -> Result<(), PipelineError> {
        self.persist(record);
        Ok(())
    }

    fn process_remove(&mut self, _record: &Trade) -> Result<(), PipelineError> {
        Ok(())
    }
}
