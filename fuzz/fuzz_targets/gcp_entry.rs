#![no_main]

use gcplog_formatter::GcpLogFormatter;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // 첫 바이트로 두 정책 플래그 조합을 고름
    let Some((flags, raw)) = data.split_first() else {
        return;
    };

    let formatter = GcpLogFormatter::builder()
        .use_incoming_timestamp(flags & 0b01 != 0)
        .use_full_line(flags & 0b10 != 0)
        .build();

    if let Ok(Some(record)) = formatter.format(raw) {
        // 결과 레이블은 항상 내부 레이블이 없어야 함
        assert!(record.labels.iter().all(|(name, _)| !name.starts_with("__")));
    }
});
