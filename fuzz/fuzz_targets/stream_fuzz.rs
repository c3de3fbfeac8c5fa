//! Stream fuzz target: feed arbitrary bytes to the record stream in both render modes.
//! Walking must not panic and every line must stay within its width.
//! Build with: cargo fuzz run stream_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    use vldadump::{Decoder, Options, RecordStream};

    let plain = Decoder::new(&Options::default());
    for event in RecordStream::new(data, &plain) {
        if let vldadump::StreamEvent::Record(r) = &event {
            for line in &r.lines {
                assert!(line.len() <= plain.capacity());
            }
        }
    }
    if let Ok(options) = Options::new(120, Some(16)) {
        let dumped = Decoder::new(&options);
        for event in RecordStream::new(data, &dumped) {
            let _ = event.to_string();
        }
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run stream_fuzz");
}
