#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use gcplog_core::labels::LabelSet;
use gcplog_core::relabel::{RelabelAction, RelabelConfig, RelabelRules, Relabeler};

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    /// 규칙 목록 (최대 8개로 제한)
    rules: Vec<FuzzRule>,
    /// 입력 레이블
    labels: Vec<(String, String)>,
}

#[derive(Arbitrary, Debug)]
struct FuzzRule {
    source_labels: Vec<String>,
    separator: String,
    regex: String,
    modulus: u64,
    target_label: String,
    replacement: String,
    action: u8,
}

const ACTIONS: [RelabelAction; 11] = [
    RelabelAction::Replace,
    RelabelAction::Keep,
    RelabelAction::Drop,
    RelabelAction::KeepEqual,
    RelabelAction::DropEqual,
    RelabelAction::HashMod,
    RelabelAction::LabelMap,
    RelabelAction::LabelDrop,
    RelabelAction::LabelKeep,
    RelabelAction::Lowercase,
    RelabelAction::Uppercase,
];

fuzz_target!(|input: FuzzInput| {
    let configs: Vec<RelabelConfig> = input
        .rules
        .into_iter()
        .take(8)
        .map(|r| RelabelConfig {
            source_labels: r.source_labels,
            separator: r.separator,
            regex: r.regex,
            modulus: r.modulus,
            target_label: r.target_label,
            replacement: r.replacement,
            action: ACTIONS[r.action as usize % ACTIONS.len()],
        })
        .collect();

    // 컴파일 실패해도 크래시는 안 됨
    let Ok(rules) = RelabelRules::compile(&configs) else {
        return;
    };

    let mut labels = LabelSet::new();
    for (name, value) in input.labels.into_iter().take(16) {
        labels.set(name, value);
    }

    let _ = rules.relabel(labels);
});
