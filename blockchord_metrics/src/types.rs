// Wire types for the explorer API plus the captured metrics snapshot.
//
// The JSON shapes mirror the explorer's responses field-for-field; only the
// fields we actually read are declared, everything else is ignored during
// deserialization. `BlockMetrics` is the immutable record handed to the
// sequencer, captured once per detected height change.

use serde::{Deserialize, Serialize};

/// Sentinel for an integer metric whose fetch failed.
pub const UNAVAILABLE: i64 = -1;
/// Sentinel for the market price when its fetch failed.
pub const UNAVAILABLE_PRICE: f64 = -1.0;

/// Response shape of `GET {base}/latestblock`.
#[derive(Clone, Debug, Deserialize)]
pub struct LatestBlock {
    pub height: i64,
}

/// Response shape of `GET {base}/block-height/{height}?format=json`.
#[derive(Clone, Debug, Deserialize)]
pub struct BlockList {
    pub blocks: Vec<BlockSummary>,
}

/// One block entry inside a `BlockList`. Only the transaction count is read.
#[derive(Clone, Debug, Deserialize)]
pub struct BlockSummary {
    pub n_tx: i64,
}

/// Response shape of `GET {base}/ticker`. Only the USD entry is read.
#[derive(Clone, Debug, Deserialize)]
pub struct Ticker {
    #[serde(rename = "USD")]
    pub usd: TickerEntry,
}

/// A single currency entry in the ticker.
#[derive(Clone, Debug, Deserialize)]
pub struct TickerEntry {
    pub last: f64,
}

/// One snapshot of the chain metrics that drive a sequencer invocation.
///
/// Captured when a new block height is observed and never mutated
/// afterwards. Any field may carry its sentinel if the source query failed;
/// the sequencer consumes sentinels as-is and they become degenerate
/// negative scaling factors rather than errors.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockMetrics {
    pub height: i64,
    pub transaction_count: i64,
    pub hash_rate: i64,
    pub market_price: f64,
}

impl BlockMetrics {
    /// True if any of the secondary queries failed for this snapshot.
    pub fn any_unavailable(&self) -> bool {
        self.transaction_count == UNAVAILABLE
            || self.hash_rate == UNAVAILABLE
            || self.market_price == UNAVAILABLE_PRICE
    }
}
