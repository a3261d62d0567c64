//! File-driven ingress for the four input feeds.
//!
//! Malformed lines and unknown products are logged and skipped; the feed
//! keeps going. A missing input file disables that feed for the run.
//! Structural failures raised downstream propagate out of the ingest call.

use std::cell::RefCell;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rust_decimal::Decimal;
use tracing::{info, warn};
use tsy_common::{
    parse_px, DepthOrder, Inquiry, InquiryState, OrderBook, Price, ProductCatalog, QuoteSide,
    Side, Trade,
};
use tsy_pipeline::{
    InquiryService, MarketDataService, PipelineError, PricingService, TradeBookingService,
};

/// Levels per side in the market-data file.
const DEPTH_LEVELS: usize = 5;

/// Accepted/skipped counts for one feed.
#[derive(Debug, Default, Clone, Copy)]
pub struct FeedStats {
    pub accepted: usize,
    pub skipped: usize,
}

impl fmt::Display for FeedStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} accepted, {} skipped", self.accepted, self.skipped)
    }
}

fn parse_side(text: &str) -> Option<Side> {
    match text {
        "BUY" => Some(Side::Buy),
        "SELL" => Some(Side::Sell),
        _ => None,
    }
}

/// `prices.txt`: whitespace-separated `productId midFrac spreadFrac [ts]`.
pub fn ingest_prices(
    path: &Path,
    catalog: &ProductCatalog,
    pricing: &RefCell<PricingService>,
) -> Result<FeedStats, PipelineError> {
    let mut stats = FeedStats::default();
    let Some(reader) = open_feed(path) else {
        return Ok(stats);
    };

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 {
            warn!(%line, "malformed price line, skipping");
            stats.skipped += 1;
            continue;
        }
        let product_id = fields[0];
        if let Err(err) = catalog.get(product_id) {
            warn!(%err, "dropping price record");
            stats.skipped += 1;
            continue;
        }
        let (mid, spread) = match (parse_px(fields[1]), parse_px(fields[2])) {
            (Ok(mid), Ok(spread)) => (mid, spread),
            (Err(err), _) | (_, Err(err)) => {
                warn!(%line, %err, "unparseable price line, skipping");
                stats.skipped += 1;
                continue;
            }
        };
        pricing
            .borrow_mut()
            .on_message(Price::new(product_id, mid, spread))?;
        stats.accepted += 1;
    }

    info!(path = %path.display(), %stats, "price feed done");
    Ok(stats)
}

/// `inquiries.txt`: whitespace-separated `inquiryId productId side quantity`.
pub fn ingest_inquiries(
    path: &Path,
    catalog: &ProductCatalog,
    inquiries: &RefCell<InquiryService>,
) -> Result<FeedStats, PipelineError> {
    let mut stats = FeedStats::default();
    let Some(reader) = open_feed(path) else {
        return Ok(stats);
    };

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        let parsed = match fields.as_slice() {
            [inquiry_id, product_id, side, quantity] => {
                match (parse_side(side), quantity.parse::<i64>()) {
                    (Some(side), Ok(quantity)) if quantity > 0 => {
                        Some((*inquiry_id, *product_id, side, quantity))
                    }
                    _ => None,
                }
            }
            _ => None,
        };
        let Some((inquiry_id, product_id, side, quantity)) = parsed else {
            warn!(%line, "malformed inquiry line, skipping");
            stats.skipped += 1;
            continue;
        };
        if let Err(err) = catalog.get(product_id) {
            warn!(%err, "dropping inquiry record");
            stats.skipped += 1;
            continue;
        }
        inquiries.borrow_mut().on_message(Inquiry {
            inquiry_id: inquiry_id.to_string(),
            product_id: product_id.to_string(),
            side,
            quantity,
            price: Decimal::ZERO,
            state: InquiryState::Received,
        })?;
        stats.accepted += 1;
    }

    info!(path = %path.display(), %stats, "inquiry feed done");
    Ok(stats)
}

/// `trades.txt`: comma-separated
/// `productId, tradeId, price, book, quantity, side`.
pub fn ingest_trades(
    path: &Path,
    catalog: &ProductCatalog,
    booking: &RefCell<TradeBookingService>,
) -> Result<FeedStats, PipelineError> {
    let mut stats = FeedStats::default();
    let mut reader = match csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_path(path)
    {
        Ok(reader) => reader,
        Err(err) => {
            warn!(path = %path.display(), %err, "trade file unreadable, feed disabled");
            return Ok(stats);
        }
    };

    for record in reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(err) => {
                warn!(%err, "bad trade row, skipping");
                stats.skipped += 1;
                continue;
            }
        };
        let parsed = (|| {
            if record.len() != 6 {
                return None;
            }
            let price = parse_px(&record[2]).ok()?;
            let quantity: i64 = record[4].parse().ok()?;
            let side = parse_side(&record[5])?;
            if quantity <= 0 {
                return None;
            }
            Some(Trade {
                trade_id: record[1].to_string(),
                product_id: record[0].to_string(),
                price,
                book: record[3].to_string(),
                quantity,
                side,
            })
        })();
        let Some(trade) = parsed else {
            warn!(row = ?record, "malformed trade row, skipping");
            stats.skipped += 1;
            continue;
        };
        if let Err(err) = catalog.get(&trade.product_id) {
            warn!(%err, "dropping trade record");
            stats.skipped += 1;
            continue;
        }
        booking.borrow_mut().book_trade(trade)?;
        stats.accepted += 1;
    }

    info!(path = %path.display(), %stats, "trade feed done");
    Ok(stats)
}

/// `marketdata.txt`: comma-separated product id followed by five bid
/// price/quantity pairs and five offer price/quantity pairs.
pub fn ingest_market_data(
    path: &Path,
    catalog: &ProductCatalog,
    market_data: &RefCell<MarketDataService>,
) -> Result<FeedStats, PipelineError> {
    let mut stats = FeedStats::default();
    let mut reader = match csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_path(path)
    {
        Ok(reader) => reader,
        Err(err) => {
            warn!(path = %path.display(), %err, "market data file unreadable, feed disabled");
            return Ok(stats);
        }
    };

    for record in reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(err) => {
                warn!(%err, "bad market data row, skipping");
                stats.skipped += 1;
                continue;
            }
        };
        let Some(book) = parse_book(&record) else {
            warn!(row = ?record, "malformed market data row, skipping");
            stats.skipped += 1;
            continue;
        };
        if let Err(err) = catalog.get(&book.product_id) {
            warn!(%err, "dropping market data record");
            stats.skipped += 1;
            continue;
        }
        market_data.borrow_mut().on_message(book)?;
        stats.accepted += 1;
    }

    info!(path = %path.display(), %stats, "market data feed done");
    Ok(stats)
}

fn parse_book(record: &csv::StringRecord) -> Option<OrderBook> {
    if record.len() != 1 + 4 * DEPTH_LEVELS {
        return None;
    }
    let product_id = record[0].to_string();

    let mut side_levels = |offset: usize, side: QuoteSide| -> Option<Vec<DepthOrder>> {
        let mut levels = Vec::with_capacity(DEPTH_LEVELS);
        for i in 0..DEPTH_LEVELS {
            let price = parse_px(&record[offset + 2 * i]).ok()?;
            let quantity: i64 = record[offset + 2 * i + 1].parse().ok()?;
            if quantity <= 0 {
                return None;
            }
            levels.push(DepthOrder::new(price, quantity, side));
        }
        Some(levels)
    };

    let bids = side_levels(1, QuoteSide::Bid)?;
    let offers = side_levels(1 + 2 * DEPTH_LEVELS, QuoteSide::Offer)?;
    Some(OrderBook::new(product_id, bids, offers))
}

fn open_feed(path: &Path) -> Option<BufReader<File>> {
    match File::open(path) {
        Ok(file) => Some(BufReader::new(file)),
        Err(err) => {
            warn!(path = %path.display(), %err, "input file missing, feed disabled");
            None
        }
    }
}
