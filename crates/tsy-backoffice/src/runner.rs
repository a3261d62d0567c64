//! Service construction, topology wiring, and the ingest run.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Context, Result};
use tracing::info;
use tsy_common::ProductCatalog;
use tsy_pipeline::{
    AlgoExecutionService, AlgoStreamingService, ExecutionHistory, ExecutionService, GuiConfig,
    GuiThrottle, InquiryHistory, InquiryService, MarketDataService, PositionHistory,
    PositionService, PricingService, RiskHistory, RiskService, StreamingHistory,
    StreamingService, TradeBookingService,
};

use crate::config::BackofficeConfig;
use crate::feed;

/// Run the whole back office once over the configured input files.
///
/// Wiring (leaves first):
/// pricing feeds algo streaming and the GUI tap; algo streaming feeds the
/// streaming republisher and its history; market data feeds algo execution,
/// which feeds execution; executed trades flow into trade booking alongside
/// the external trade file; booked trades build positions, positions drive
/// risk; inquiries walk their own state machine. One history sink hangs off
/// each published type.
pub fn run_pipeline(config: &BackofficeConfig) -> Result<()> {
    std::fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("failed to create out dir {:?}", config.out_dir))?;
    let out = |name: &str| config.out_dir.join(name);

    let catalog = Rc::new(ProductCatalog::treasuries());

    // Services.
    let pricing = Rc::new(RefCell::new(PricingService::new()));
    let algo_streaming = Rc::new(RefCell::new(AlgoStreamingService::new()));
    let streaming = Rc::new(RefCell::new(StreamingService::new()));
    let market_data = Rc::new(RefCell::new(MarketDataService::new()));
    let algo_execution = Rc::new(RefCell::new(AlgoExecutionService::new()));
    let execution = Rc::new(RefCell::new(ExecutionService::new()));
    let trade_booking = Rc::new(RefCell::new(TradeBookingService::new()));
    let positions = Rc::new(RefCell::new(PositionService::new()));
    let risk = Rc::new(RefCell::new(RiskService::new(pricing.clone(), catalog.clone())));
    let inquiries = Rc::new(RefCell::new(InquiryService::new()));

    // Taps and sinks.
    let gui = Rc::new(RefCell::new(GuiThrottle::new(GuiConfig {
        path: out("gui.txt"),
        max_lines: config.gui.max_lines,
        min_interval: config.gui.min_interval(),
    })));
    let streaming_history =
        Rc::new(RefCell::new(StreamingHistory::new(out("streaming.txt"))));
    let inquiry_history =
        Rc::new(RefCell::new(InquiryHistory::new(out("allinquiries.txt"))));
    let position_history =
        Rc::new(RefCell::new(PositionHistory::new(out("positions.txt"))));
    let risk_history = Rc::new(RefCell::new(RiskHistory::new(out("risk.txt"))));
    let execution_history =
        Rc::new(RefCell::new(ExecutionHistory::new(out("executions.txt"))));

    // Topology.
    pricing.borrow_mut().add_listener(algo_streaming.clone());
    pricing.borrow_mut().add_listener(gui.clone());
    algo_streaming.borrow_mut().add_listener(streaming.clone());
    streaming.borrow_mut().add_listener(streaming_history.clone());
    inquiries.borrow_mut().add_listener(inquiry_history.clone());
    trade_booking.borrow_mut().add_listener(positions.clone());
    positions.borrow_mut().add_listener(risk.clone());
    positions.borrow_mut().add_listener(position_history.clone());
    risk.borrow_mut().add_listener(risk_history.clone());
    market_data.borrow_mut().add_listener(algo_execution.clone());
    algo_execution.borrow_mut().add_listener(execution.clone());
    execution.borrow_mut().add_listener(execution_history.clone());
    execution.borrow_mut().add_listener(trade_booking.clone());

    // Ingest. Prices go first so risk always finds a mid.
    let data = |name: &str| config.data_dir.join(name);
    feed::ingest_prices(&data("prices.txt"), &catalog, &pricing)
        .context("price ingest failed")?;
    feed::ingest_inquiries(&data("inquiries.txt"), &catalog, &inquiries)
        .context("inquiry ingest failed")?;
    feed::ingest_trades(&data("trades.txt"), &catalog, &trade_booking)
        .context("trade ingest failed")?;
    feed::ingest_market_data(&data("marketdata.txt"), &catalog, &market_data)
        .context("market data ingest failed")?;

    // Sector roll-ups close out the risk file.
    for sector in &config.sectors {
        let bucket = risk.borrow().bucketed_risk(&sector.to_sector());
        risk_history.borrow_mut().persist_bucketed(&bucket);
    }

    info!(out_dir = %config.out_dir.display(), "run complete");
    Ok(())
}
