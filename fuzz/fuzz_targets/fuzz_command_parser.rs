//! Fuzz target: console / dashboard command parser
//!
//! Feeds arbitrary UTF-8 into `parse_command` and the command queue and
//! verifies:
//! - No panics under arbitrary input
//! - Dashboard `Vn=0` lines always release to automatic
//! - The queue never holds more than its depth
//!
//! cargo fuzz run fuzz_command_parser

#![no_main]

use libfuzzer_sys::fuzz_target;
use firewatch::adapters::console::{CommandQueue, COMMAND_QUEUE_DEPTH};
use firewatch::app::commands::{parse_command, AppCommand};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };

    let queue = CommandQueue::new();
    for line in text.lines() {
        if let Ok(AppCommand::Override(o)) = parse_command(line) {
            if line.trim().ends_with("=0") {
                assert_eq!(o.value, None, "button release must hand back control");
            }
        }
        let _ = queue.submit_line(line);
        assert!(queue.pending() <= COMMAND_QUEUE_DEPTH);
    }
    let drained = queue.drain(|_| {});
    assert!(drained <= COMMAND_QUEUE_DEPTH);
});
