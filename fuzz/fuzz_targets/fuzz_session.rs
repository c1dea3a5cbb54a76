#![no_main]

use avif_stream::{DecodeRequest, ImageRsDecoder, ProgressiveSession, SessionState};
use libfuzzer_sys::fuzz_target;

// feeds growing prefixes, then the whole input, through one session
fuzz_target!(|data: &[u8]| {
    let mut session = ProgressiveSession::new(
        ImageRsDecoder::new(),
        DecodeRequest::new().with_max_content_size(256),
    );
    let step = (data.len() / 8).max(1);
    let mut end = step;
    while end < data.len() {
        if session.feed_partial(&data[..end]).is_err() {
            assert_eq!(session.state(), SessionState::Failed);
            return;
        }
        end += step;
    }
    let _ = session.finish(data);
});
