#![no_main]

use libfuzzer_sys::fuzz_target;
use yaml_token_reader::{ReaderOptions, YamlReader};

fuzz_target!(|data: &[u8]| fuzz_target(data));

fn fuzz_target(data: &[u8]) {
    let options = ReaderOptions {
        max_alias_tokens: 10_000,
        ..ReaderOptions::default()
    };
    let mut depth = 0usize;
    for token in YamlReader::from_read(data).with_options(options) {
        let Ok(token) = token else {
            break;
        };
        if token.is_start() {
            depth += 1;
        } else if token.is_end() {
            depth = depth.checked_sub(1).expect("unbalanced token stream");
        }
    }
}
