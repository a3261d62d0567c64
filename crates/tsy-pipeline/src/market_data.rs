//! Order-book depth store and aggregation.

use std::collections::{BTreeMap, HashMap};

use tsy_common::{BidOffer, DepthOrder, OrderBook, QuoteSide};

use crate::bus::{ListenerHandle, ListenerSet};
use crate::error::PipelineError;
use crate::store::KeyedStore;

/// Stores per-product depth. Incoming stacks are sorted (bids descending,
/// offers ascending) before storing; a parallel map holds the aggregated
/// view with same-priced levels collapsed. Publication carries the sorted
/// raw book.
pub struct MarketDataService {
    books: KeyedStore<OrderBook>,
    aggregated: HashMap<String, OrderBook>,
    listeners: ListenerSet<OrderBook>,
}

impl Default for MarketDataService {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketDataService {
    pub fn new() -> Self {
        Self {
            books: KeyedStore::new("market-data"),
            aggregated: HashMap::new(),
            listeners: ListenerSet::new(),
        }
    }

    pub fn get_data(&self, product_id: &str) -> Result<OrderBook, PipelineError> {
        self.books.get(product_id)
    }

    pub fn add_listener(&mut self, listener: ListenerHandle<OrderBook>) {
        self.listeners.add(listener);
    }

    pub fn listeners(&self) -> &ListenerSet<OrderBook> {
        &self.listeners
    }

    pub fn on_message(&mut self, book: OrderBook) -> Result<(), PipelineError> {
        let mut sorted = book;
        sorted.bids.sort_by(|a, b| b.price.cmp(&a.price));
        sorted.offers.sort_by(|a, b| a.price.cmp(&b.price));

        let mutation = self.books.upsert(&sorted.product_id, sorted.clone());
        self.aggregated
            .insert(sorted.product_id.clone(), aggregate(&sorted));

        self.listeners.notify_upsert(mutation, &sorted)
    }

    /// Front of each sorted stack.
    pub fn best_bid_offer(&self, product_id: &str) -> Result<BidOffer, PipelineError> {
        let book = self.books.get(product_id)?;
        match (book.best_bid(), book.best_offer()) {
            (Some(bid), Some(offer)) => Ok(BidOffer { bid: *bid, offer: *offer }),
            _ => Err(PipelineError::EmptyBook(product_id.to_string())),
        }
    }

    /// The depth view with duplicate price levels collapsed.
    pub fn aggregate_depth(&self, product_id: &str) -> Result<OrderBook, PipelineError> {
        self.aggregated
            .get(product_id)
            .cloned()
            .ok_or(PipelineError::KeyNotFound {
                service: "market-data",
                key: product_id.to_string(),
            })
    }
}

/// Collapse same-priced levels on each side, summing quantities.
fn aggregate(book: &OrderBook) -> OrderBook {
    let mut bids: BTreeMap<rust_decimal::Decimal, i64> = BTreeMap::new();
    for level in &book.bids {
        *bids.entry(level.price).or_insert(0) += level.quantity;
    }
    let mut offers: BTreeMap<rust_decimal::Decimal, i64> = BTreeMap::new();
    for level in &book.offers {
        *offers.entry(level.price).or_insert(0) += level.quantity;
    }

    OrderBook::new(
        book.product_id.clone(),
        bids.into_iter()
            .rev()
            .map(|(price, qty)| DepthOrder::new(price, qty, QuoteSide::Bid))
            .collect(),
        offers
            .into_iter()
            .map(|(price, qty)| DepthOrder::new(price, qty, QuoteSide::Offer))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::testing::{kinds, EventKind, Recorder};
    use rust_decimal_macros::dec;

    fn level(price: rust_decimal::Decimal, qty: i64, side: QuoteSide) -> DepthOrder {
        DepthOrder::new(price, qty, side)
    }

    fn five_level_book() -> OrderBook {
        // Deliberately unsorted with duplicate prices on both sides.
        OrderBook::new(
            "T3Y",
            vec![
                level(dec!(99.96875), 20, QuoteSide::Bid),
                level(dec!(100), 10, QuoteSide::Bid),
                level(dec!(99.96875), 30, QuoteSide::Bid),
                level(dec!(99.9375), 40, QuoteSide::Bid),
                level(dec!(100), 15, QuoteSide::Bid),
            ],
            vec![
                level(dec!(100.0625), 25, QuoteSide::Offer),
                level(dec!(100.03125), 12, QuoteSide::Offer),
                level(dec!(100.03125), 18, QuoteSide::Offer),
                level(dec!(100.09375), 50, QuoteSide::Offer),
                level(dec!(100.0625), 5, QuoteSide::Offer),
            ],
        )
    }

    #[test]
    fn stores_sorted_stacks() {
        let mut svc = MarketDataService::new();
        svc.on_message(five_level_book()).unwrap();

        let book = svc.get_data("T3Y").unwrap();
        let bid_prices: Vec<_> = book.bids.iter().map(|o| o.price).collect();
        let offer_prices: Vec<_> = book.offers.iter().map(|o| o.price).collect();
        assert!(bid_prices.windows(2).all(|w| w[0] >= w[1]));
        assert!(offer_prices.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn aggregation_collapses_duplicate_prices() {
        let mut svc = MarketDataService::new();
        svc.on_message(five_level_book()).unwrap();

        let agg = svc.aggregate_depth("T3Y").unwrap();

        // No duplicate prices, strictly monotone stacks.
        let bid_prices: Vec<_> = agg.bids.iter().map(|o| o.price).collect();
        let offer_prices: Vec<_> = agg.offers.iter().map(|o| o.price).collect();
        assert!(bid_prices.windows(2).all(|w| w[0] > w[1]));
        assert!(offer_prices.windows(2).all(|w| w[0] < w[1]));

        // Quantities sum to the raw totals.
        assert_eq!(agg.bids.iter().map(|o| o.quantity).sum::<i64>(), 115);
        assert_eq!(agg.offers.iter().map(|o| o.quantity).sum::<i64>(), 110);

        // Spot-check a collapsed level.
        let top_bid = agg.best_bid().unwrap();
        assert_eq!(top_bid.price, dec!(100));
        assert_eq!(top_bid.quantity, 25);
    }

    #[test]
    fn best_bid_offer_reads_the_front() {
        let mut svc = MarketDataService::new();
        svc.on_message(five_level_book()).unwrap();

        let bbo = svc.best_bid_offer("T3Y").unwrap();
        assert_eq!(bbo.bid.price, dec!(100));
        assert_eq!(bbo.offer.price, dec!(100.03125));
    }

    #[test]
    fn empty_side_reports_empty_book() {
        let mut svc = MarketDataService::new();
        svc.on_message(OrderBook::new(
            "T3Y",
            vec![level(dec!(100), 10, QuoteSide::Bid)],
            vec![],
        ))
        .unwrap();
        assert!(matches!(
            svc.best_bid_offer("T3Y"),
            Err(PipelineError::EmptyBook(_))
        ));
    }

    #[test]
    fn add_versus_update_per_product() {
        let mut svc = MarketDataService::new();
        let recorder = Recorder::handle();
        svc.add_listener(recorder.clone());

        svc.on_message(five_level_book()).unwrap();
        svc.on_message(five_level_book()).unwrap();

        assert_eq!(kinds(&recorder.borrow()), vec![EventKind::Add, EventKind::Update]);
    }
}
