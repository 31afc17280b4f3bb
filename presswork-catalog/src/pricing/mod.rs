//! Quote computation.
//!
//! ```text
//! QuoteRequest ─► QuoteEngine ─┬─► tier::resolve_*      (base rate)
//!                              ├─► area::scale          (custom rectangles)
//!                              └─► surcharge::compose   (addons, finishings, fees)
//!                                        │
//!                                        ▼
//!                                      Quote
//! FromPriceCalculator ─► QuoteEngine at the cheapest candidates
//! ```

pub mod area;
pub mod engine;
pub mod from_price;
pub mod surcharge;
pub mod tier;

pub use engine::{BreakdownLine, Quote, QuoteEngine, QuoteMeta, QuoteRequest, Selections, Sides};
pub use from_price::FromPriceCalculator;
