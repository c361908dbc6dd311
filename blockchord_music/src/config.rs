// The immutable element table: which metric each musical element scales,
// and by what divisor, plus the fixed MIDI file settings.
//
// These are constants of the mapping, not runtime state. They are passed
// into the sequencer explicitly so a generation run depends only on its
// inputs. Divisor magnitudes come from the upstream explorer's value
// ranges: hash rate in the billions, prices and transaction counts in the
// low thousands.

use serde::{Deserialize, Serialize};

/// Which captured metric an element normalizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricSource {
    TransactionCount,
    HashRate,
    MarketPrice,
}

/// One scaling element: `factor = metric / divisor`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementConfig {
    pub metric: MetricSource,
    pub divisor: f64,
}

/// Harmony is the one element that selects discrete material instead of
/// scaling: market price against `divisor / 2` picks one of two voicings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HarmonyConfig {
    pub divisor: f64,
    /// Chord voicings as MIDI note numbers: [below-threshold, at-or-above].
    pub voicings: [[u8; 3]; 2],
}

impl HarmonyConfig {
    /// The price threshold between the two voicings.
    pub fn threshold(&self) -> f64 {
        self.divisor / 2.0
    }
}

/// The four message kinds emitted per transaction index, in emission order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    NoteOn,
    NoteOff,
    ControlChange,
    PitchWheel,
}

impl MessageKind {
    pub const ALL: [MessageKind; 4] = [
        MessageKind::NoteOn,
        MessageKind::NoteOff,
        MessageKind::ControlChange,
        MessageKind::PitchWheel,
    ];

    /// Per-kind spacing multiplier applied on top of the rhythm factor.
    /// All kinds share unit spacing.
    pub fn time_factor(self) -> f64 {
        1.0
    }
}

/// Track roles, in file order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackRole {
    Notes,
    Control,
}

impl TrackRole {
    pub const ALL: [TrackRole; 2] = [TrackRole::Notes, TrackRole::Control];
}

/// Complete sequencer configuration: the element table plus the fixed MIDI
/// file settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SequencerConfig {
    pub rhythm: ElementConfig,
    pub polyphony: ElementConfig,
    pub dynamics: ElementConfig,
    pub microtonality: ElementConfig,
    pub mempool: ElementConfig,
    pub volume: ElementConfig,
    pub tempo: ElementConfig,
    pub harmony: HarmonyConfig,

    /// MIDI channel shared by both tracks.
    pub channel: u8,
    /// Controller number carried by emitted control_change events.
    pub control_number: u8,
    /// Pitch bend scale: bend = range × (microtonality factor − 0.5).
    pub pitchwheel_range: f64,
    /// SMF timing resolution, ticks per quarter note.
    pub ticks_per_beat: u16,
    /// Tempo meta event value, microseconds per quarter note.
    pub tempo_us_per_beat: u32,
    /// Program (instrument) selected at the start of the notes track.
    pub program: u8,
    /// Time signature numerator / denominator for the meta event.
    pub time_signature: (u8, u8),
}

impl Default for SequencerConfig {
    fn default() -> Self {
        SequencerConfig {
            rhythm: ElementConfig {
                metric: MetricSource::TransactionCount,
                divisor: 1000.0,
            },
            polyphony: ElementConfig {
                metric: MetricSource::HashRate,
                divisor: 1_000_000_000.0,
            },
            dynamics: ElementConfig {
                metric: MetricSource::MarketPrice,
                divisor: 1000.0,
            },
            microtonality: ElementConfig {
                metric: MetricSource::MarketPrice,
                divisor: 1.0,
            },
            mempool: ElementConfig {
                metric: MetricSource::TransactionCount,
                divisor: 1000.0,
            },
            volume: ElementConfig {
                metric: MetricSource::MarketPrice,
                divisor: 1.0,
            },
            tempo: ElementConfig {
                metric: MetricSource::HashRate,
                divisor: 1.0,
            },
            harmony: HarmonyConfig {
                divisor: 1000.0,
                voicings: [[60, 64, 67], [63, 67, 70]], // C major / Eb major
            },
            channel: 0,
            control_number: 0,
            pitchwheel_range: 4096.0,
            ticks_per_beat: 480,
            tempo_us_per_beat: 500_000,
            program: 0,
            time_signature: (4, 4),
        }
    }
}
