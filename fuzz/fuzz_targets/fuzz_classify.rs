#![no_main]

use avif_stream::{ContainerKind, classify, is_avif};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let kind = classify(data);
    assert_eq!(is_avif(data), kind == ContainerKind::Avif);
    // a matched prefix keeps its kind when more bytes follow
    if kind != ContainerKind::Unknown {
        let mut longer = data.to_vec();
        longer.push(0);
        assert_eq!(classify(&longer), kind);
    }
});
