#![no_main]

use gcplog_formatter::GcpLogFormatter;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let formatter = GcpLogFormatter::builder().build();
    let _ = formatter.format_push(data);
});
