// Standard MIDI File serialization.
//
// Builds an SMF (format 1, 480 ticks per beat) from a generated sequence:
// notes track then control track, with the fixed tempo / time-signature /
// program header at the start of the notes track. Event payloads are
// saturated into their field widths here; the file format cannot carry
// the unclamped values generation produces from degenerate factors.
//
// Uses the `midly` crate. Each event's `time` is written directly as its
// delta, preserving the cumulative-counter spacing of the mapping.

use std::path::Path;

use midly::num::{u4, u7, u14, u15, u24, u28};
use midly::{
    Format, Header, MetaMessage, MidiMessage, PitchBend, Smf, Timing, TrackEvent, TrackEventKind,
};

use crate::config::SequencerConfig;
use crate::sequence::{EventKind, Sequence, Track, clamp_data_byte, pitch_to_raw};

/// File name for a block's emitted MIDI: `block_{height}.mid`.
pub fn output_filename(height: i64) -> String {
    format!("block_{height}.mid")
}

/// Serialize a sequence and write it to `path`.
pub fn write_midi(
    sequence: &Sequence,
    config: &SequencerConfig,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let smf = sequence_to_smf(sequence, config);
    let mut buf = Vec::new();
    smf.write(&mut buf)?;
    std::fs::write(path, &buf)?;
    Ok(())
}

/// Build the in-memory SMF: two parallel tracks in fixed order.
pub fn sequence_to_smf(sequence: &Sequence, config: &SequencerConfig) -> Smf<'static> {
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(config.ticks_per_beat)),
    ));
    for (index, track) in sequence.tracks.iter().enumerate() {
        smf.tracks.push(encode_track(track, config, index == 0));
    }
    smf
}

/// Encode one track. The first track carries the fixed file header events.
fn encode_track(
    track: &Track,
    config: &SequencerConfig,
    with_header: bool,
) -> Vec<TrackEvent<'static>> {
    let channel = u4::new(track.channel);
    let mut events = Vec::with_capacity(track.events.len() + 4);

    if with_header {
        events.push(meta(MetaMessage::Tempo(u24::new(config.tempo_us_per_beat))));
        let (numerator, denominator) = config.time_signature;
        events.push(meta(MetaMessage::TimeSignature(
            numerator,
            denominator.trailing_zeros() as u8,
            24,
            8,
        )));
        events.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::ProgramChange {
                    program: u7::new(config.program),
                },
            },
        });
    }

    for event in &track.events {
        events.push(TrackEvent {
            delta: clamp_delta(event.time),
            kind: TrackEventKind::Midi {
                channel,
                message: encode_message(&event.kind),
            },
        });
    }

    events.push(meta(MetaMessage::EndOfTrack));
    events
}

fn meta(message: MetaMessage<'static>) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(message),
    }
}

fn encode_message(kind: &EventKind) -> MidiMessage {
    match *kind {
        EventKind::NoteOn { note, velocity } => MidiMessage::NoteOn {
            key: u7::new(note & 0x7F),
            vel: u7::new(clamp_data_byte(velocity)),
        },
        EventKind::NoteOff { note, velocity } => MidiMessage::NoteOff {
            key: u7::new(note & 0x7F),
            vel: u7::new(velocity & 0x7F),
        },
        EventKind::ControlChange { control, value } => MidiMessage::Controller {
            controller: u7::new(control & 0x7F),
            value: u7::new(clamp_data_byte(value)),
        },
        EventKind::PitchWheel { pitch } => MidiMessage::PitchBend {
            bend: PitchBend(u14::new(pitch_to_raw(pitch))),
        },
    }
}

/// Saturate a delta into the SMF variable-length range. Negative counters
/// (possible under sentinel inputs) floor at zero.
fn clamp_delta(time: i64) -> u28 {
    u28::new(time.clamp(0, 0x0FFF_FFFF) as u32)
}
