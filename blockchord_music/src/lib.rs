// Blockchord adaptive MIDI sequencer.
//
// Maps one snapshot of blockchain metrics onto a short two-track MIDI
// sequence. The mapping is fixed and deterministic: each musical element
// (rhythm, polyphony, dynamics, microtonality, ...) normalizes one metric
// by a configured divisor, and the resulting factors shape note velocities,
// control values, pitch bends, and event spacing. Market price selects
// between two chord voicings.
//
// - config.rs: the immutable element table (divisors, metric pairing, voicings)
// - factors.rs: per-invocation scaling factors derived from a metrics snapshot
// - sequence.rs: event generation (the core mapping)
// - smf.rs: Standard MIDI File serialization via `midly`
// - playback.rs: real-time streaming to a MIDI output port via `midir`
//
// The generated sequence is the source of truth: the file on disk and the
// port stream are both derived from it, never the other way around.

pub mod config;
pub mod factors;
pub mod playback;
pub mod sequence;
pub mod smf;
