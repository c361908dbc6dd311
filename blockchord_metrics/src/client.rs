// HTTP client for the explorer API.
//
// One blocking GET per query against a fixed base URL. The client never
// retries and never raises for HTTP failures: any transport error,
// non-success status, or unparseable body yields the sentinel reading. A
// fixed request timeout keeps a stalled endpoint from wedging the polling
// loop indefinitely.

use std::time::Duration;

use crate::types::{BlockList, BlockMetrics, LatestBlock, Ticker, UNAVAILABLE, UNAVAILABLE_PRICE};

/// Default public explorer endpoint.
pub const DEFAULT_BASE_URL: &str = "https://blockchain.info";

/// Per-request timeout applied to every query.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Blocking client for the four explorer queries.
pub struct BlockchainClient {
    agent: ureq::Agent,
    base_url: String,
}

impl BlockchainClient {
    /// Create a client for the given base URL (trailing slash optional).
    pub fn new(base_url: &str) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        BlockchainClient {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// GET a path and return the response body, or None on any failure.
    fn get_text(&self, path: &str) -> Option<String> {
        let url = format!("{}/{}", self.base_url, path);
        self.agent.get(&url).call().ok()?.into_string().ok()
    }

    /// Height of the chain tip, or the sentinel.
    pub fn latest_block_height(&self) -> i64 {
        self.get_text("latestblock")
            .and_then(|body| serde_json::from_str::<LatestBlock>(&body).ok())
            .map_or(UNAVAILABLE, |block| block.height)
    }

    /// Number of transactions in the block at `height`, or the sentinel.
    pub fn transactions_in_block(&self, height: i64) -> i64 {
        self.get_text(&format!("block-height/{height}?format=json"))
            .and_then(|body| serde_json::from_str::<BlockList>(&body).ok())
            .and_then(|list| list.blocks.first().map(|block| block.n_tx))
            .unwrap_or(UNAVAILABLE)
    }

    /// Estimated network hash rate. The endpoint answers in plain text.
    pub fn network_hash_rate(&self) -> i64 {
        self.get_text("q/hashrate")
            .and_then(|body| body.trim().parse::<i64>().ok())
            .unwrap_or(UNAVAILABLE)
    }

    /// Latest USD market price, or the sentinel.
    pub fn market_price_usd(&self) -> f64 {
        self.get_text("ticker")
            .and_then(|body| serde_json::from_str::<Ticker>(&body).ok())
            .map_or(UNAVAILABLE_PRICE, |ticker| ticker.usd.last)
    }

    /// Capture a full metrics snapshot for a newly observed block height.
    /// The height itself comes from the caller's `latest_block_height` read;
    /// the three secondary queries run here, each degrading independently.
    pub fn fetch_metrics(&self, height: i64) -> BlockMetrics {
        BlockMetrics {
            height,
            transaction_count: self.transactions_in_block(height),
            hash_rate: self.network_hash_rate(),
            market_price: self.market_price_usd(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Spawn a listener that answers exactly one request with the given
    /// response, then shuts down. Returns the base URL to query.
    fn serve_once(
        status_line: &'static str,
        content_type: &'static str,
        body: &'static str,
    ) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 4096];
                let mut request = Vec::new();
                loop {
                    match stream.read(&mut buf) {
                        Ok(0) => break,
                        Ok(n) => {
                            request.extend_from_slice(&buf[..n]);
                            if request.windows(4).any(|w| w == b"\r\n\r\n") {
                                break;
                            }
                        }
                        Err(_) => break,
                    }
                }
                let response = format!(
                    "{status_line}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{addr}")
    }

    #[test]
    fn test_latest_block_height() {
        let base = serve_once("HTTP/1.1 200 OK", "application/json", r#"{"height": 800000}"#);
        let client = BlockchainClient::new(&base);
        assert_eq!(client.latest_block_height(), 800000);
    }

    #[test]
    fn test_height_sentinel_on_server_error() {
        let base = serve_once("HTTP/1.1 500 Internal Server Error", "text/plain", "oops");
        let client = BlockchainClient::new(&base);
        assert_eq!(client.latest_block_height(), UNAVAILABLE);
    }

    #[test]
    fn test_height_sentinel_on_malformed_body() {
        let base = serve_once("HTTP/1.1 200 OK", "application/json", "not json");
        let client = BlockchainClient::new(&base);
        assert_eq!(client.latest_block_height(), UNAVAILABLE);
    }

    #[test]
    fn test_transactions_in_block() {
        let base = serve_once("HTTP/1.1 200 OK", "application/json", r#"{"blocks": [{"n_tx": 3}]}"#);
        let client = BlockchainClient::new(&base);
        assert_eq!(client.transactions_in_block(800000), 3);
    }

    #[test]
    fn test_transactions_sentinel_on_empty_block_list() {
        let base = serve_once("HTTP/1.1 200 OK", "application/json", r#"{"blocks": []}"#);
        let client = BlockchainClient::new(&base);
        assert_eq!(client.transactions_in_block(800000), UNAVAILABLE);
    }

    #[test]
    fn test_network_hash_rate_parses_plain_text() {
        let base = serve_once("HTTP/1.1 200 OK", "text/plain", "4000000000\n");
        let client = BlockchainClient::new(&base);
        assert_eq!(client.network_hash_rate(), 4_000_000_000);
    }

    #[test]
    fn test_market_price_usd() {
        let base = serve_once(
            "HTTP/1.1 200 OK",
            "application/json",
            r#"{"USD": {"last": 10000.5}}"#,
        );
        let client = BlockchainClient::new(&base);
        assert_eq!(client.market_price_usd(), 10000.5);
    }

    #[test]
    fn test_market_price_sentinel_on_not_found() {
        let base = serve_once("HTTP/1.1 404 Not Found", "text/plain", "");
        let client = BlockchainClient::new(&base);
        assert_eq!(client.market_price_usd(), UNAVAILABLE_PRICE);
    }
}
