// End-to-end smoke test for the polling loop.
//
// Stands up a loopback HTTP stub that mimics the four explorer endpoints,
// points a poller at it with a short interval, and waits for the height
// change to produce a `block_<height>.mid`. The file is then parsed back
// with `midly` and checked against the expected mapping: a high market
// price selects the Eb voicing, and out-of-range velocities saturate at
// the file-encoding boundary.

use std::fs;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use blockchord_poller::poller::{PollerConfig, start_poller};
use midly::{MidiMessage, Smf, Timing, TrackEventKind};

const BASELINE_HEIGHT: i64 = 800000;

/// Serve the stubbed explorer API until `running` goes false. The first
/// `latestblock` answer is the baseline height; later answers are one
/// higher, which is what triggers emission.
fn spawn_stub_api(running: Arc<AtomicBool>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    listener.set_nonblocking(true).unwrap();

    let height_calls = AtomicU64::new(0);
    thread::spawn(move || {
        while running.load(Ordering::SeqCst) {
            match listener.accept() {
                Ok((mut stream, _)) => {
                    stream.set_nonblocking(false).unwrap();
                    let path = read_request_path(&mut stream);
                    let (content_type, body) = respond_to(&path, &height_calls);
                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = stream.write_all(response.as_bytes());
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(10));
                }
                Err(_) => break,
            }
        }
    });

    format!("http://{addr}")
}

/// Read one HTTP request and return its path.
fn read_request_path(stream: &mut TcpStream) -> String {
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
    let request = String::from_utf8_lossy(&request);
    request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string()
}

fn respond_to(path: &str, height_calls: &AtomicU64) -> (&'static str, String) {
    if path.starts_with("/latestblock") {
        let calls = height_calls.fetch_add(1, Ordering::SeqCst);
        let height = if calls == 0 {
            BASELINE_HEIGHT
        } else {
            BASELINE_HEIGHT + 1
        };
        ("application/json", format!(r#"{{"height": {height}}}"#))
    } else if path.starts_with("/block-height/") {
        ("application/json", r#"{"blocks": [{"n_tx": 3}]}"#.to_string())
    } else if path.starts_with("/q/hashrate") {
        ("text/plain", "4000000000".to_string())
    } else if path.starts_with("/ticker") {
        ("application/json", r#"{"USD": {"last": 10000.0}}"#.to_string())
    } else {
        ("text/plain", "unknown".to_string())
    }
}

#[test]
fn poller_emits_midi_on_height_change() {
    let running = Arc::new(AtomicBool::new(true));
    let base_url = spawn_stub_api(running.clone());

    let output_dir = std::env::temp_dir().join(format!("blockchord-smoke-{}", std::process::id()));
    fs::create_dir_all(&output_dir).unwrap();

    let handle = start_poller(PollerConfig {
        base_url,
        interval: Duration::from_millis(50),
        output_dir: output_dir.clone(),
        playback: false,
    });

    // The baseline read returns 800000 and the next check 800001; the
    // change triggers one emission.
    let expected = output_dir.join("block_800001.mid");
    let deadline = Instant::now() + Duration::from_secs(5);
    while !expected.exists() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(20));
    }

    handle.stop();
    running.store(false, Ordering::SeqCst);

    assert!(expected.exists(), "no MIDI file was written");
    let bytes = fs::read(&expected).unwrap();
    let smf = Smf::parse(&bytes).unwrap();

    // Two tracks, metrical timing at 480 ticks per beat.
    assert_eq!(smf.tracks.len(), 2);
    match smf.header.timing {
        Timing::Metrical(ticks) => assert_eq!(ticks.as_int(), 480),
        other => panic!("expected metrical timing, got {other:?}"),
    }

    // Price 10000 is over the harmony threshold: the Eb voicing, cycling
    // per transaction. The dynamics factor of 10.0 saturates velocity at
    // the encoder.
    let note_ons: Vec<(u8, u8)> = smf.tracks[0]
        .iter()
        .filter_map(|event| match event.kind {
            TrackEventKind::Midi {
                message: MidiMessage::NoteOn { key, vel },
                ..
            } => Some((key.as_int(), vel.as_int())),
            _ => None,
        })
        .collect();
    assert_eq!(note_ons, vec![(63, 127), (67, 127), (70, 127)]);

    fs::remove_dir_all(&output_dir).ok();
}

#[test]
fn stop_terminates_promptly_without_network() {
    // Nothing listens on this port: every fetch degrades to the sentinel
    // and the loop just idles between checks.
    let handle = start_poller(PollerConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        interval: Duration::from_secs(60),
        output_dir: std::env::temp_dir(),
        playback: false,
    });

    thread::sleep(Duration::from_millis(200));
    let start = Instant::now();
    handle.stop();
    assert!(start.elapsed() < Duration::from_secs(2));
}
