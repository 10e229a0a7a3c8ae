#![no_main]

use libfuzzer_sys::fuzz_target;

use hark::{Config, Parser, Variant};

fuzz_target!(|data: &[u8]| {
    for variant in [Variant::Request, Variant::Response] {
        let mut p = Parser::with_config(Config {
            variant,
            ..Config::default()
        });

        // First byte picks the fragment size so the corpus also explores
        // resumption points.
        let step = data.first().map(|b| *b as usize + 1).unwrap_or(1);
        let mut input = data;

        while !input.is_empty() {
            let region = p.prepare();
            let n = region.len().min(step).min(input.len());
            region[..n].copy_from_slice(&input[..n]);
            if p.commit(n).is_err() {
                return;
            }
            input = &input[n..];

            if p.parse_header().is_err() {
                break;
            }
            if p.parse_body().is_err() {
                break;
            }
        }

        let _ = p.body();
        let _ = p.headers().map(|h| h.as_bytes().len());
        let _ = p.is_keep_alive();
        let _ = p.is_upgrade();
    }
});
