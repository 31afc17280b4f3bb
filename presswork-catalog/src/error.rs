use serde::{Deserialize, Serialize};

/// Top-level error kinds a caller can observe.
///
/// Every kind is surfaced verbatim; nothing inside the engine catches one of
/// these and substitutes a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ValidationError,
    ConfigError,
    NotFoundError,
    ComputationError,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Product not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Computation(#[from] ComputationError),
}

impl PricingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PricingError::Validation(_) => ErrorKind::ValidationError,
            PricingError::Config(_) => ErrorKind::ConfigError,
            PricingError::NotFound(_) => ErrorKind::NotFoundError,
            PricingError::Computation(_) => ErrorKind::ComputationError,
        }
    }

    /// Machine-readable sub-reason, e.g. `quantity_below_minimum`.
    pub fn reason(&self) -> &'static str {
        match self {
            PricingError::Validation(e) => e.reason(),
            PricingError::Config(_) => "invalid_config",
            PricingError::NotFound(_) => "unknown_product",
            PricingError::Computation(e) => e.reason(),
        }
    }
}

/// Malformed or out-of-range request input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("quantity must be between {min} and {max}, got {requested}")]
    QuantityOutOfRange { min: u32, max: u32, requested: u32 },

    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("unknown material: {0}")]
    UnknownMaterial(String),

    #[error("unknown {group} option: {id}")]
    UnknownOption { group: &'static str, id: String },

    #[error("unknown size option: {0}")]
    UnknownSize(String),

    #[error("double-sided printing is not offered for this product")]
    UnsupportedSides,

    #[error("option selected more than once: {0}")]
    DuplicateSelection(String),
}

impl ValidationError {
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::QuantityOutOfRange { .. } => "quantity_out_of_range",
            ValidationError::InvalidDimensions(_) => "invalid_dimensions",
            ValidationError::UnknownMaterial(_) => "unknown_material",
            ValidationError::UnknownOption { .. } => "unknown_option",
            ValidationError::UnknownSize(_) => "unknown_size",
            ValidationError::UnsupportedSides => "unsupported_sides",
            ValidationError::DuplicateSelection(_) => "duplicate_selection",
        }
    }
}

/// The stored pricing configuration is internally inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("tier list is empty")]
    EmptyTiers,

    #[error("breakpoints must be strictly ascending: {0}")]
    UnsortedBreakpoints(String),

    #[error("area tiers must end with an unbounded tier")]
    MissingUnboundedTier,

    #[error("only the last area tier may be unbounded")]
    MisplacedUnboundedTier,

    #[error("unknown pricing model: {0}")]
    UnknownModel(String),

    #[error("malformed pricing config: {0}")]
    Malformed(String),

    #[error("invalid field {field}: {message}")]
    InvalidField { field: String, message: String },

    #[error("product must declare exactly one default material, found {0}")]
    DefaultMaterial(usize),

    #[error("duplicate option id: {0}")]
    DuplicateOption(String),
}

/// A well-formed request that nonetheless has no defined price.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComputationError {
    #[error("quantity {requested} is below the smallest priced quantity {minimum}")]
    QuantityBelowMinimum { requested: u32, minimum: u32 },

    #[error("no tier matches {0}")]
    NoMatchingTier(String),

    #[error("arithmetic overflow computing {0}")]
    Overflow(String),
}

impl ComputationError {
    pub fn reason(&self) -> &'static str {
        match self {
            ComputationError::QuantityBelowMinimum { .. } => "quantity_below_minimum",
            ComputationError::NoMatchingTier(_) => "no_matching_tier",
            ComputationError::Overflow(_) => "overflow",
        }
    }
}

pub type PricingResult<T> = Result<T, PricingError>;
