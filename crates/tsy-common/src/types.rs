//! Domain records shared across the pipeline.
//!
//! All prices use `rust_decimal::Decimal` — treasury quotes live on a 1/256
//! grid which Decimal represents exactly, so never use f64 for price math.
//! Quantities are signed `i64` because book positions net across buys and
//! sells.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Trade side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// +1 for buys, -1 for sells.
    pub fn sign(&self) -> i64 {
        match self {
            Side::Buy => 1,
            Side::Sell => -1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Side of a two-way quote or depth level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QuoteSide {
    Bid,
    Offer,
}

impl QuoteSide {
    /// The trade side that results from aggressing this quote side.
    pub fn aggressor_trade_side(&self) -> Side {
        match self {
            QuoteSide::Bid => Side::Buy,
            QuoteSide::Offer => Side::Sell,
        }
    }
}

impl fmt::Display for QuoteSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuoteSide::Bid => write!(f, "BID"),
            QuoteSide::Offer => write!(f, "OFFER"),
        }
    }
}

/// Order type for execution routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    /// Fill-or-kill.
    Fok,
    /// Immediate-or-cancel.
    Ioc,
    /// Fill at best available.
    Market,
    /// Limit at a specified price.
    Limit,
    /// Stop order.
    Stop,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Fok => write!(f, "FOK"),
            OrderType::Ioc => write!(f, "IOC"),
            OrderType::Market => write!(f, "MARKET"),
            OrderType::Limit => write!(f, "LIMIT"),
            OrderType::Stop => write!(f, "STOP"),
        }
    }
}

/// Execution venues, tried in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Venue {
    Brokertec,
    Espeed,
    Cme,
}

/// The routing ladder: every order walks the venues in this order.
pub const VENUES: [Venue; 3] = [Venue::Brokertec, Venue::Espeed, Venue::Cme];

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Venue::Brokertec => write!(f, "BROKERTEC"),
            Venue::Espeed => write!(f, "ESPEED"),
            Venue::Cme => write!(f, "CME"),
        }
    }
}

/// Internal accounting books that executed trades rotate across.
pub const TRADE_BOOKS: [&str; 3] = ["TRSY1", "TRSY2", "TRSY3"];

/// A treasury bond's static terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bond {
    /// Product identifier (tenor label, e.g. "T10Y").
    pub product_id: String,
    /// CUSIP identifier.
    pub cusip: String,
    /// Ticker symbol.
    pub ticker: String,
    /// Annual coupon rate (e.g. 0.035 for 3.5%).
    pub coupon: Decimal,
    /// Maturity date.
    pub maturity: chrono::NaiveDate,
}

/// A mid/spread quote for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub product_id: String,
    /// Mid price.
    pub mid: Decimal,
    /// Full bid-offer width around the mid.
    pub spread: Decimal,
}

impl Price {
    pub fn new(product_id: impl Into<String>, mid: Decimal, spread: Decimal) -> Self {
        Self { product_id: product_id.into(), mid, spread }
    }

    /// Bid price implied by the mid and spread.
    pub fn bid(&self) -> Decimal {
        self.mid - self.spread / Decimal::TWO
    }

    /// Offer price implied by the mid and spread.
    pub fn offer(&self) -> Decimal {
        self.mid + self.spread / Decimal::TWO
    }
}

/// One side of a streamed two-way quote.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceStreamOrder {
    pub price: Decimal,
    pub visible_qty: i64,
    /// Always twice the visible quantity.
    pub hidden_qty: i64,
    pub side: QuoteSide,
}

impl PriceStreamOrder {
    pub fn new(price: Decimal, visible_qty: i64, side: QuoteSide) -> Self {
        Self { price, visible_qty, hidden_qty: visible_qty * 2, side }
    }
}

/// A two-sided streaming quote for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceStream {
    pub product_id: String,
    pub bid: PriceStreamOrder,
    pub offer: PriceStreamOrder,
}

/// A single depth level in an order book.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthOrder {
    pub price: Decimal,
    pub quantity: i64,
    pub side: QuoteSide,
}

impl DepthOrder {
    pub fn new(price: Decimal, quantity: i64, side: QuoteSide) -> Self {
        Self { price, quantity, side }
    }
}

/// An order book: bid stack sorted descending, offer stack ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBook {
    pub product_id: String,
    pub bids: Vec<DepthOrder>,
    pub offers: Vec<DepthOrder>,
}

impl OrderBook {
    pub fn new(product_id: impl Into<String>, bids: Vec<DepthOrder>, offers: Vec<DepthOrder>) -> Self {
        Self { product_id: product_id.into(), bids, offers }
    }

    /// Top of the bid stack, if any.
    pub fn best_bid(&self) -> Option<&DepthOrder> {
        self.bids.first()
    }

    /// Top of the offer stack, if any.
    pub fn best_offer(&self) -> Option<&DepthOrder> {
        self.offers.first()
    }
}

/// Best bid and best offer for one product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BidOffer {
    pub bid: DepthOrder,
    pub offer: DepthOrder,
}

/// An order routed to the execution venues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionOrder {
    pub order_id: String,
    pub product_id: String,
    /// Which quote side the order aggresses.
    pub side: QuoteSide,
    pub order_type: OrderType,
    pub price: Decimal,
    pub visible_qty: i64,
    pub hidden_qty: i64,
    /// Must reference a live parent when `is_child` is set.
    pub parent_order_id: Option<String>,
    pub is_child: bool,
}

impl ExecutionOrder {
    /// The quantity a venue sees: visible if any, otherwise hidden.
    pub fn effective_qty(&self) -> i64 {
        if self.visible_qty > 0 {
            self.visible_qty
        } else {
            self.hidden_qty
        }
    }
}

/// A booked trade against an internal accounting book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: String,
    pub product_id: String,
    pub price: Decimal,
    pub book: String,
    /// Always positive; direction comes from `side`.
    pub quantity: i64,
    pub side: Side,
}

impl Trade {
    /// Quantity signed by side: buys add, sells subtract.
    pub fn signed_quantity(&self) -> i64 {
        self.side.sign() * self.quantity
    }
}

/// Per-book signed holdings for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub product_id: String,
    /// Book name to signed quantity. BTreeMap keeps report output ordered.
    pub books: BTreeMap<String, i64>,
}

impl Position {
    pub fn new(product_id: impl Into<String>) -> Self {
        Self { product_id: product_id.into(), books: BTreeMap::new() }
    }

    /// Add a signed quantity to one book.
    pub fn apply(&mut self, book: &str, signed_qty: i64) {
        *self.books.entry(book.to_string()).or_insert(0) += signed_qty;
    }

    /// Net position across all books.
    pub fn aggregate(&self) -> i64 {
        self.books.values().sum()
    }
}

/// PV01 risk for a product or a bucketed sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pv01 {
    /// Product id, or sector name for bucketed records.
    pub product_id: String,
    /// Risk contribution for the current aggregate quantity.
    pub pv01: Decimal,
    pub quantity: i64,
}

/// A named group of products aggregated for risk roll-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketedSector {
    pub name: String,
    pub products: Vec<String>,
}

impl BucketedSector {
    pub fn new(name: impl Into<String>, products: Vec<String>) -> Self {
        Self { name: name.into(), products }
    }
}

/// Lifecycle states of a customer inquiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InquiryState {
    Received,
    Quoted,
    Done,
    Rejected,
    CustomerRejected,
}

impl fmt::Display for InquiryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InquiryState::Received => write!(f, "RECEIVED"),
            InquiryState::Quoted => write!(f, "QUOTED"),
            InquiryState::Done => write!(f, "DONE"),
            InquiryState::Rejected => write!(f, "REJECTED"),
            InquiryState::CustomerRejected => write!(f, "CUSTOMER_REJECTED"),
        }
    }
}

/// A customer inquiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inquiry {
    pub inquiry_id: String,
    pub product_id: String,
    pub side: Side,
    pub quantity: i64,
    /// The price we have responded with; zero until quoted.
    pub price: Decimal,
    pub state: InquiryState,
}
