// Blockchain-explorer metric fetcher.
//
// Thin blocking client for a blockchain.info-style explorer API. Four
// independent read-only queries supply the scalar metrics that drive MIDI
// generation: chain tip height, per-block transaction count, network hash
// rate, and USD market price.
//
// Failure contract: every query degrades to a sentinel reading (-1 / -1.0)
// on any transport error, non-success status, or malformed body. Callers
// always receive a usable numeric value; there are no retries and no
// backoff.
//
// - client.rs: the HTTP client and the four query operations
// - types.rs: serde wire types and the captured `BlockMetrics` snapshot

pub mod client;
pub mod types;

pub use client::BlockchainClient;
pub use types::BlockMetrics;
