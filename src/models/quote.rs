use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bid price as served to clients. Kept as text so no precision is lost.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub bid: String,
}

/// Payload of the upstream exchange API. Only the bid is consumed.
#[derive(Debug, Deserialize)]
pub struct ExchangeResponse {
    #[serde(rename = "USDBRL")]
    pub usd_brl: PairQuote,
}

#[derive(Debug, Deserialize)]
pub struct PairQuote {
    pub bid: String,
}

/// A persisted row of the `cotacao` table.
#[derive(Debug, PartialEq, Clone)]
pub struct QuoteRecord {
    pub created_at: DateTime<Utc>,
    pub bid: String,
}
