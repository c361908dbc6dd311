// Event generation: the metric-to-music mapping.
//
// For each of the two tracks, and for each message kind in fixed order
// (note_on, note_off, control_change, pitchwheel), one event is emitted per
// block transaction. Derived fields come from the scaling factors:
//
// - note_on:        note cycles through the chord; velocity = 127 × dynamics
// - control_change: value = 16 × polyphony (controller 0)
// - pitchwheel:     bend = 4096 × (microtonality − 0.5)
// - spacing:        the running time counter grows by rhythm × 1000 per event
//
// Derived values are stored unclamped; only the encoders (smf.rs,
// playback.rs) saturate them into wire-format field widths. Each event's
// `time` is the counter value at emission and is written out as the event's
// delta time, so spacing widens as a track progresses.
//
// Generation is pure and deterministic: same snapshot, same config, same
// events. A sentinel transaction count (-1) yields empty tracks, the
// behavior of iterating an empty range.

use blockchord_metrics::BlockMetrics;
use serde::{Deserialize, Serialize};

use crate::config::{MessageKind, SequencerConfig, TrackRole};
use crate::factors::ScalingFactors;

/// Scale from the polyphony factor to a controller value.
const CONTROL_VALUE_SCALE: f64 = 16.0;
/// Scale from the dynamics factor to the 7-bit velocity range.
const VELOCITY_SCALE: f64 = 127.0;
/// Ticks multiplier for the per-event spacing increment.
const SPACING_SCALE: f64 = 1000.0;

/// Payload of one timed MIDI event. Derived numeric fields are unclamped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    NoteOn { note: u8, velocity: i64 },
    NoteOff { note: u8, velocity: u8 },
    ControlChange { control: u8, value: i64 },
    PitchWheel { pitch: i64 },
}

/// One timed MIDI event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MidiEvent {
    /// Delta ticks preceding this event (the running counter at emission).
    pub time: i64,
    pub kind: EventKind,
}

/// Ordered events for one role. Both tracks share the configured channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub role: TrackRole,
    pub channel: u8,
    pub events: Vec<MidiEvent>,
}

/// The generated piece: two tracks in fixed file order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    pub tracks: [Track; 2],
}

impl Sequence {
    pub fn notes(&self) -> &Track {
        &self.tracks[0]
    }

    pub fn control(&self) -> &Track {
        &self.tracks[1]
    }
}

/// Map one metrics snapshot to a two-track sequence.
pub fn generate(metrics: &BlockMetrics, config: &SequencerConfig) -> Sequence {
    let factors = ScalingFactors::derive(metrics, config);
    let events_per_kind = metrics.transaction_count.max(0) as usize;
    let tracks = TrackRole::ALL.map(|role| Track {
        role,
        channel: config.channel,
        events: generate_track(events_per_kind, &factors, config),
    });
    Sequence { tracks }
}

/// Emit the events for one track: kind-major, transaction-index-minor. The
/// time counter runs across the whole track and resets per track.
fn generate_track(
    events_per_kind: usize,
    factors: &ScalingFactors,
    config: &SequencerConfig,
) -> Vec<MidiEvent> {
    let chord = factors.chord;
    let mut events = Vec::with_capacity(events_per_kind * MessageKind::ALL.len());
    let mut time_counter: i64 = 0;

    for kind in MessageKind::ALL {
        for i in 0..events_per_kind {
            let event_kind = match kind {
                MessageKind::NoteOn => EventKind::NoteOn {
                    note: chord[i % chord.len()],
                    velocity: scale_round(VELOCITY_SCALE, factors.dynamics),
                },
                MessageKind::NoteOff => EventKind::NoteOff {
                    note: 0,
                    velocity: 0,
                },
                MessageKind::ControlChange => EventKind::ControlChange {
                    control: config.control_number,
                    value: control_value(config.control_number, factors.polyphony),
                },
                MessageKind::PitchWheel => EventKind::PitchWheel {
                    pitch: (config.pitchwheel_range * (factors.microtonality - 0.5)).round() as i64,
                },
            };
            events.push(MidiEvent {
                time: time_counter,
                kind: event_kind,
            });
            time_counter += (factors.rhythm * kind.time_factor() * SPACING_SCALE).round() as i64;
        }
    }
    events
}

/// Controller 0 carries the scaled polyphony factor; every other controller
/// (including bank select LSB, 32) carries zero.
fn control_value(control: u8, polyphony_factor: f64) -> i64 {
    match control {
        0 => scale_round(CONTROL_VALUE_SCALE, polyphony_factor),
        _ => 0,
    }
}

fn scale_round(scale: f64, factor: f64) -> i64 {
    (scale * factor).round() as i64
}

/// Saturate a derived value into the 7-bit data-byte range.
pub fn clamp_data_byte(value: i64) -> u8 {
    value.clamp(0, 127) as u8
}

/// Saturate a signed pitch bend into the raw 14-bit wire value (8192 is
/// center).
pub fn pitch_to_raw(pitch: i64) -> u16 {
    (pitch.clamp(-8192, 8191) + 8192) as u16
}
