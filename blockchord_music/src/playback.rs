// Real-time playback to a MIDI output port.
//
// Mirrors the file contents: both tracks are merged chronologically and
// streamed as raw 3-byte channel messages, sleeping out each delta at the
// configured tempo. Playback is best-effort: when no output port exists
// the sequence is skipped with a notice. The written file is the durable
// artifact.
//
// Uses the `midir` crate for port enumeration and sending.

use std::thread;
use std::time::Duration;

use midir::MidiOutput;

use crate::config::SequencerConfig;
use crate::sequence::{EventKind, Sequence, clamp_data_byte, pitch_to_raw};

/// Client name the connection shows up under in port listings.
const CLIENT_NAME: &str = "blockchord";

/// A scheduled message: the wait after the previous send, and the raw
/// bytes to send.
pub type ScheduledMessage = (Duration, [u8; 3]);

/// Stream a sequence to the first available output port in real time.
pub fn play(
    sequence: &Sequence,
    config: &SequencerConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let midi_out = MidiOutput::new(CLIENT_NAME)?;
    let ports = midi_out.ports();
    let Some(port) = ports.first() else {
        println!("No MIDI output port available; skipping playback.");
        return Ok(());
    };

    let port_name = midi_out.port_name(port)?;
    println!("Playing on MIDI output port: {port_name}");

    let mut conn = midi_out.connect(port, "blockchord-out")?;
    for (wait, bytes) in schedule(sequence, config) {
        thread::sleep(wait);
        conn.send(&bytes)?;
    }
    Ok(())
}

/// Merge both tracks into one chronological message list with inter-send
/// waits. Stable on ties: the notes track comes first, matching file order.
pub fn schedule(sequence: &Sequence, config: &SequencerConfig) -> Vec<ScheduledMessage> {
    let tick = tick_duration(config);

    let mut timed: Vec<(i64, usize, [u8; 3])> = Vec::new();
    for (track_index, track) in sequence.tracks.iter().enumerate() {
        let mut absolute: i64 = 0;
        for event in &track.events {
            // Deltas floor at zero, matching the file encoder.
            absolute += event.time.max(0);
            timed.push((absolute, track_index, message_bytes(track.channel, &event.kind)));
        }
    }
    timed.sort_by_key(|&(at, track_index, _)| (at, track_index));

    let mut scheduled = Vec::with_capacity(timed.len());
    let mut previous: i64 = 0;
    for (at, _, bytes) in timed {
        let wait_ticks = (at - previous).max(0) as u32;
        scheduled.push((tick * wait_ticks, bytes));
        previous = at;
    }
    scheduled
}

/// Wall-clock duration of one MIDI tick at the configured tempo.
fn tick_duration(config: &SequencerConfig) -> Duration {
    let nanos = u64::from(config.tempo_us_per_beat) * 1000 / u64::from(config.ticks_per_beat);
    Duration::from_nanos(nanos)
}

/// Raw channel-message bytes for one event, saturated to wire ranges.
fn message_bytes(channel: u8, kind: &EventKind) -> [u8; 3] {
    let ch = channel & 0x0F;
    match *kind {
        EventKind::NoteOn { note, velocity } => {
            [0x90 | ch, note & 0x7F, clamp_data_byte(velocity)]
        }
        EventKind::NoteOff { note, velocity } => [0x80 | ch, note & 0x7F, velocity & 0x7F],
        EventKind::ControlChange { control, value } => {
            [0xB0 | ch, control & 0x7F, clamp_data_byte(value)]
        }
        EventKind::PitchWheel { pitch } => {
            let raw = pitch_to_raw(pitch);
            [0xE0 | ch, (raw & 0x7F) as u8, (raw >> 7) as u8]
        }
    }
}
