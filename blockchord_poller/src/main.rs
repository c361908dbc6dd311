// blockchord: turns blockchain activity into MIDI.
//
// Polls the public explorer API once a minute and, whenever the chain tip
// height changes, maps the block's metrics onto a short two-track MIDI
// sequence, writes it to `block_{height}.mid` in the current directory,
// and plays it on the first available MIDI output port.
//
// There is no configuration surface: the endpoint, the interval, and the
// musical element table are fixed constants. Stop with Ctrl+C.

use blockchord_poller::poller::{PollerConfig, start_poller};

fn main() {
    let config = PollerConfig::default();
    println!("blockchord: adaptive MIDI from {}", config.base_url);
    println!(
        "Polling every {}s; writing block_<height>.mid to {}. Ctrl+C to stop.",
        config.interval.as_secs(),
        config.output_dir.display()
    );

    let handle = start_poller(config);
    handle.join();
}
