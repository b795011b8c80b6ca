#![no_main]

use gcplog_core::relabel::{RelabelConfig, RelabelRules};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // YAML 파서는 &str을 받으므로 UTF-8 변환 필요
    if let Ok(yaml_str) = std::str::from_utf8(data) {
        if let Ok(configs) = serde_yaml::from_str::<Vec<RelabelConfig>>(yaml_str) {
            // 컴파일 실패는 허용, 패닉은 불가
            let _ = RelabelRules::compile(&configs);
        }
    }
});
