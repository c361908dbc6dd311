// The polling loop and its lifecycle handle.
//
// Modeled as a background thread plus an atomic keep-running flag: `stop`
// flips the flag and joins. The interval sleep is sliced so a stop request
// takes effect within ~100ms rather than a full polling period.
//
// Change detection is a plain inequality against the last observed height.
// That includes transitions to and from the fetch sentinel (-1): a failed
// height read followed by a successful one counts as a change, and vice
// versa. Metrics fetched for a cycle may themselves carry sentinels; they
// flow into generation unguarded.
//
// A failed file write ends the loop; a missing MIDI output port only skips
// playback.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use blockchord_metrics::BlockchainClient;
use blockchord_metrics::client::DEFAULT_BASE_URL;
use blockchord_music::config::SequencerConfig;
use blockchord_music::playback::play;
use blockchord_music::sequence::generate;
use blockchord_music::smf::{output_filename, write_midi};

/// Configuration for a polling run.
#[derive(Clone, Debug)]
pub struct PollerConfig {
    /// Explorer API base URL.
    pub base_url: String,
    /// Pause between height checks.
    pub interval: Duration,
    /// Directory the `block_{height}.mid` files are written into.
    pub output_dir: PathBuf,
    /// Stream each generated sequence to a MIDI output port.
    pub playback: bool,
}

impl Default for PollerConfig {
    fn default() -> Self {
        PollerConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            interval: Duration::from_secs(60),
            output_dir: PathBuf::from("."),
            playback: true,
        }
    }
}

/// Handle returned by `start_poller` to control the running loop.
pub struct PollerHandle {
    keep_running: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl PollerHandle {
    /// Signal the loop to stop and wait for it to finish.
    pub fn stop(mut self) {
        self.keep_running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }

    /// Wait for the loop to end on its own. It only does so on a fatal
    /// write error, so for the binary this is effectively "run forever".
    pub fn join(mut self) {
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

/// Start the polling loop on a background thread.
pub fn start_poller(config: PollerConfig) -> PollerHandle {
    let keep_running = Arc::new(AtomicBool::new(true));
    let keep_running_loop = keep_running.clone();
    let thread = thread::spawn(move || {
        run_poller(config, keep_running_loop);
    });
    PollerHandle {
        keep_running,
        thread: Some(thread),
    }
}

/// The loop body. Runs until stopped or until a write fails.
fn run_poller(config: PollerConfig, keep_running: Arc<AtomicBool>) {
    let client = BlockchainClient::new(&config.base_url);
    let sequencer_config = SequencerConfig::default();

    // The height at startup is the baseline: only changes from it emit.
    let mut last_height = client.latest_block_height();

    while keep_running.load(Ordering::SeqCst) {
        let height = client.latest_block_height();
        if height != last_height {
            last_height = height;
            println!("New block detected: {height}");
            if let Err(e) = emit_block(&client, &config, &sequencer_config, height) {
                eprintln!("Failed to emit MIDI for block {height}: {e}");
                break;
            }
        }
        sleep_while_running(&keep_running, config.interval);
    }
}

/// Fetch, generate, write, and (optionally) play one block's sequence.
fn emit_block(
    client: &BlockchainClient,
    config: &PollerConfig,
    sequencer_config: &SequencerConfig,
    height: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    let metrics = client.fetch_metrics(height);
    if metrics.any_unavailable() {
        println!("Some metrics unavailable for block {height}; continuing with sentinels.");
    }

    let sequence = generate(&metrics, sequencer_config);
    let path = config.output_dir.join(output_filename(height));
    write_midi(&sequence, sequencer_config, &path)?;
    println!("Wrote {}", path.display());

    if config.playback {
        play(&sequence, sequencer_config)?;
    }
    Ok(())
}

/// Sleep for `interval` in short slices, returning early once stopped.
fn sleep_while_running(keep_running: &AtomicBool, interval: Duration) {
    const SLICE: Duration = Duration::from_millis(100);
    let mut remaining = interval;
    while keep_running.load(Ordering::SeqCst) && !remaining.is_zero() {
        let step = remaining.min(SLICE);
        thread::sleep(step);
        remaining -= step;
    }
}
