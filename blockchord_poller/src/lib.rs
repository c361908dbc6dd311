// Block-change polling loop.
//
// One long-lived loop: read the chain tip height, compare against the last
// observed height, and on any change capture a metrics snapshot, generate
// the adaptive sequence, write `block_{height}.mid`, and play it. The loop
// runs on a background thread behind a start/stop handle so embedders and
// tests can shut it down cleanly; the `blockchord` binary simply starts it
// and waits.

pub mod poller;
