// Scaling-factor derivation: one normalized factor per element, plus the
// chord voicing selected by market price.
//
// Factors are plain divisions with no guarding: a sentinel metric (-1)
// produces a small negative factor, which flows through generation as-is.
// That mirrors the fetcher's failure contract: a failed query degrades
// the music rather than aborting the cycle.

use blockchord_metrics::BlockMetrics;

use crate::config::{ElementConfig, MetricSource, SequencerConfig};

/// Per-invocation scaling factors. Lives for exactly one `generate` call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScalingFactors {
    pub rhythm: f64,
    pub polyphony: f64,
    pub dynamics: f64,
    pub microtonality: f64,
    pub mempool: f64,
    pub volume: f64,
    pub tempo: f64,
    /// Chord voicing selected by the harmony comparison.
    pub chord: [u8; 3],
}

impl ScalingFactors {
    /// Derive all factors for one metrics snapshot.
    pub fn derive(metrics: &BlockMetrics, config: &SequencerConfig) -> ScalingFactors {
        let factor =
            |element: &ElementConfig| metric_value(metrics, element.metric) / element.divisor;

        // Price below half the harmony divisor picks the first voicing.
        // A sentinel price (-1.0) always lands below the threshold.
        let chord = if metrics.market_price < config.harmony.threshold() {
            config.harmony.voicings[0]
        } else {
            config.harmony.voicings[1]
        };

        ScalingFactors {
            rhythm: factor(&config.rhythm),
            polyphony: factor(&config.polyphony),
            dynamics: factor(&config.dynamics),
            microtonality: factor(&config.microtonality),
            mempool: factor(&config.mempool),
            volume: factor(&config.volume),
            tempo: factor(&config.tempo),
            chord,
        }
    }
}

/// Read the metric an element is paired with.
fn metric_value(metrics: &BlockMetrics, source: MetricSource) -> f64 {
    match source {
        MetricSource::TransactionCount => metrics.transaction_count as f64,
        MetricSource::HashRate => metrics.hash_rate as f64,
        MetricSource::MarketPrice => metrics.market_price,
    }
}
