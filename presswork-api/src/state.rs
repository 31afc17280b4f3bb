use std::time::Duration;

use presswork_core::QuoteService;

#[derive(Clone)]
pub struct AppState {
    pub quotes: QuoteService,
    /// Debounce window storefront clients apply before requesting a quote.
    pub quote_debounce: Duration,
}

impl AppState {
    pub fn new(quotes: QuoteService, quote_debounce: Duration) -> Self {
        Self { quotes, quote_debounce }
    }
}
