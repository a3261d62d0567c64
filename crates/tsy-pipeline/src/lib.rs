//! Event-driven service pipeline for the treasury back office.
//!
//! The pipeline is a directed acyclic graph of services. Each service owns a
//! keyed store of one record type and fans Add/Update/Remove notifications
//! out to registered listeners; a listener may itself be a service, so
//! outputs chain. The whole graph is single-threaded and synchronous: one
//! ingress quiesces its entire downstream before the next is processed.
//!
//! ## Modules
//!
//! - `bus`, `store`, `error`: the service framework
//! - `pricing`, `algo_streaming`, `streaming`: quote flow
//! - `market_data`, `algo_execution`, `execution`: depth and execution flow
//! - `trade_booking`, `position`, `risk`: booking and risk flow
//! - `inquiry`: customer inquiry state machine
//! - `gui`, `historical`: file taps and audit sinks

pub mod algo_execution;
pub mod algo_streaming;
pub mod bus;
pub mod error;
pub mod execution;
pub mod gui;
pub mod historical;
pub mod inquiry;
pub mod market_data;
pub mod position;
pub mod pricing;
pub mod risk;
pub mod store;
pub mod streaming;
pub mod trade_booking;

pub use algo_execution::AlgoExecutionService;
pub use algo_streaming::AlgoStreamingService;
pub use bus::{Listener, ListenerHandle, ListenerSet};
pub use error::PipelineError;
pub use execution::ExecutionService;
pub use gui::{GuiConfig, GuiThrottle};
pub use historical::{
    ExecutionHistory, InquiryHistory, PositionHistory, RiskHistory, StreamingHistory,
};
pub use inquiry::InquiryService;
pub use market_data::MarketDataService;
pub use position::PositionService;
pub use pricing::PricingService;
pub use risk::RiskService;
pub use store::{KeyedStore, Mutation};
pub use streaming::{StreamPublisher, StreamingService};
pub use trade_booking::TradeBookingService;
