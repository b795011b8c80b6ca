//! 통합 테스트 -- 원시 LogEntry에서 정규화 레코드까지 전체 흐름 검증

use std::collections::BTreeMap;
use std::sync::Arc;

use base64::Engine as _;
use chrono::{TimeZone, Utc};
use gcplog_core::labels::{LabelSet, RecordLabels};
use gcplog_core::relabel::{RelabelConfig, RelabelRules, Relabeler};
use gcplog_formatter::{FormatError, GcpLogFormatter};

/// relabel 엔진 스텁: 입력을 그대로 통과
struct Identity;

impl Relabeler for Identity {
    fn relabel(&self, labels: LabelSet) -> Option<LabelSet> {
        Some(labels)
    }
}

/// relabel 엔진 스텁: 모든 레코드를 버림
struct AlwaysDrop;

impl Relabeler for AlwaysDrop {
    fn relabel(&self, _labels: LabelSet) -> Option<LabelSet> {
        None
    }
}

/// relabel 엔진 스텁: 내부 레이블을 접두어만 떼어 그대로 노출
struct Unprefix;

impl Relabeler for Unprefix {
    fn relabel(&self, labels: LabelSet) -> Option<LabelSet> {
        let mut out = labels.clone();
        for (name, value) in labels.iter() {
            if let Some(stripped) = name.strip_prefix("__") {
                out.set(stripped, value);
            }
        }
        Some(out)
    }
}

const GCE_ENTRY: &str = r#"{
  "insertId": "1a2b3c",
  "logName": "projects/demo/logs/syslog",
  "resource": {
    "type": "gce_instance",
    "labels": {"zone/a": "us-1", "instance_id": "4572"}
  },
  "timestamp": "",
  "receiveTimestamp": "2024-01-01T00:00:00Z",
  "severity": "WARNING",
  "labels": {"compute.googleapis.com/resource_name": "web-01"},
  "textPayload": "hello"
}"#;

fn static_labels(pairs: &[(&str, &str)]) -> RecordLabels {
    let mut labels = RecordLabels::new();
    for (name, value) in pairs {
        labels.insert(*name, *value).expect("valid static label");
    }
    labels
}

fn yaml_rules(yaml: &str) -> RelabelRules {
    let configs: Vec<RelabelConfig> = serde_yaml::from_str(yaml).expect("valid yaml");
    RelabelRules::compile(&configs).expect("rules compile")
}

// =============================================================================
// 레이블
// =============================================================================

#[test]
fn internal_labels_never_reach_output_without_rules() {
    let formatter = GcpLogFormatter::builder().relabeler(Identity).build();
    let record = formatter.format(GCE_ENTRY.as_bytes()).unwrap().unwrap();

    assert!(record.labels.is_empty());
}

#[test]
fn resource_label_is_promotable_by_replace_rule() {
    let rules = yaml_rules(
        r#"
- source_labels: [__gcp_resource_labels_zone_a]
  target_label: zone
"#,
    );
    let formatter = GcpLogFormatter::builder().relabeler(rules).build();
    let record = formatter.format(GCE_ENTRY.as_bytes()).unwrap().unwrap();

    assert_eq!(record.labels.get("zone"), Some("us-1"));
    assert_eq!(record.labels.len(), 1);
}

#[test]
fn labelmap_promotes_every_entry_label() {
    let rules = yaml_rules(
        r#"
- regex: __gcp_(resource_labels|labels)_(.+)
  replacement: $2
  action: labelmap
"#,
    );
    let formatter = GcpLogFormatter::builder().relabeler(rules).build();
    let record = formatter.format(GCE_ENTRY.as_bytes()).unwrap().unwrap();

    assert_eq!(record.labels.get("zone_a"), Some("us-1"));
    assert_eq!(record.labels.get("instance_id"), Some("4572"));
    assert_eq!(
        record.labels.get("compute_googleapis_com_resource_name"),
        Some("web-01")
    );
}

#[test]
fn static_labels_win_over_pipeline_labels() {
    let formatter = GcpLogFormatter::builder()
        .relabeler(Unprefix)
        .static_labels(static_labels(&[("gcp_severity", "OVERRIDE"), ("job", "gcplog")]))
        .build();
    let record = formatter.format(GCE_ENTRY.as_bytes()).unwrap().unwrap();

    assert_eq!(record.labels.get("gcp_severity"), Some("OVERRIDE"));
    assert_eq!(record.labels.get("job"), Some("gcplog"));
    assert_eq!(record.labels.get("gcp_resource_type"), Some("gce_instance"));
}

#[test]
fn invalid_relabel_output_is_silently_discarded() {
    struct Garbage;
    impl Relabeler for Garbage {
        fn relabel(&self, mut labels: LabelSet) -> Option<LabelSet> {
            labels.set("0starts_with_digit", "x");
            labels.set("has space", "y");
            labels.set("fine", "z");
            Some(labels)
        }
    }

    let formatter = GcpLogFormatter::builder().relabeler(Garbage).build();
    let record = formatter.format(GCE_ENTRY.as_bytes()).unwrap().unwrap();

    assert_eq!(record.labels.len(), 1);
    assert_eq!(record.labels.get("fine"), Some("z"));
}

// =============================================================================
// 드롭
// =============================================================================

#[test]
fn always_drop_relabeler_yields_no_record() {
    let formatter = GcpLogFormatter::builder()
        .relabeler(AlwaysDrop)
        .use_incoming_timestamp(true)
        .build();

    for raw in [GCE_ENTRY, "{}", r#"{"textPayload":"x"}"#] {
        let result = formatter.format(raw.as_bytes());
        assert!(matches!(result, Ok(None)), "input: {raw}");
    }
}

#[test]
fn drop_rule_filters_by_severity() {
    let rules = yaml_rules(
        r#"
- source_labels: [__gcp_severity]
  regex: DEBUG|INFO
  action: drop
"#,
    );
    let formatter = GcpLogFormatter::builder().relabeler(rules).build();

    assert!(formatter.format(GCE_ENTRY.as_bytes()).unwrap().is_some());
    assert!(
        formatter
            .format(br#"{"severity":"DEBUG"}"#)
            .unwrap()
            .is_none()
    );
}

// =============================================================================
// 타임스탬프
// =============================================================================

#[test]
fn wall_clock_used_when_not_adopting() {
    let formatter = GcpLogFormatter::builder().build();

    let before = Utc::now();
    let record = formatter.format(GCE_ENTRY.as_bytes()).unwrap().unwrap();
    let after = Utc::now();

    assert!(before <= record.timestamp && record.timestamp <= after);
}

#[test]
fn receive_timestamp_used_when_timestamp_empty() {
    let formatter = GcpLogFormatter::builder()
        .use_incoming_timestamp(true)
        .build();
    let record = formatter.format(GCE_ENTRY.as_bytes()).unwrap().unwrap();

    assert_eq!(
        record.timestamp,
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    );
}

#[test]
fn missing_timestamps_fail_when_adopting() {
    let formatter = GcpLogFormatter::builder()
        .use_incoming_timestamp(true)
        .build();
    let err = formatter
        .format(br#"{"textPayload":"x"}"#)
        .unwrap_err();

    assert!(matches!(err, FormatError::MissingTimestamp));
    assert_eq!(err.kind(), "missing_timestamp");
}

#[test]
fn malformed_timestamp_fails_when_adopting() {
    let formatter = GcpLogFormatter::builder()
        .use_incoming_timestamp(true)
        .build();
    let err = formatter
        .format(br#"{"timestamp":"Jan 1 2024"}"#)
        .unwrap_err();

    assert!(matches!(err, FormatError::TimestampParse { .. }));
}

#[test]
fn lenient_rfc3339_variants_fail_when_adopting() {
    // Given: 타임스탬프를 채택하는 포매터
    let formatter = GcpLogFormatter::builder()
        .use_incoming_timestamp(true)
        .build();

    // When/Then: 공백 구분자, 소문자 t/z, 윤초는 모두 거부됨
    for ts in [
        "2024-01-01 00:00:00Z",
        "2024-01-01t00:00:00z",
        "2024-01-01T00:00:60Z",
    ] {
        let raw = format!(r#"{{"timestamp":"{ts}"}}"#);
        let err = formatter.format(raw.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), "timestamp_parse", "timestamp: {ts}");
    }
}

// =============================================================================
// 라인
// =============================================================================

#[test]
fn text_payload_becomes_line() {
    let formatter = GcpLogFormatter::builder().build();
    let record = formatter.format(GCE_ENTRY.as_bytes()).unwrap().unwrap();
    assert_eq!(record.line, "hello");
}

#[test]
fn blank_text_payload_falls_back_to_raw_input() {
    let formatter = GcpLogFormatter::builder().build();
    for raw in [
        r#"{"severity":"INFO"}"#,
        r#"{"textPayload":""}"#,
        r#"{"textPayload":"   "}"#,
    ] {
        let record = formatter.format(raw.as_bytes()).unwrap().unwrap();
        assert_eq!(record.line, raw);
    }
}

#[test]
fn full_line_uses_raw_input_verbatim() {
    let formatter = GcpLogFormatter::builder().use_full_line(true).build();
    let record = formatter.format(GCE_ENTRY.as_bytes()).unwrap().unwrap();
    assert_eq!(record.line, GCE_ENTRY);
}

// =============================================================================
// 디코딩
// =============================================================================

#[test]
fn malformed_input_is_decode_error() {
    let formatter = GcpLogFormatter::builder().build();
    for raw in ["", "{", "[]", r#"{"resource":{"labels":["a"]}}"#] {
        let err = formatter.format(raw.as_bytes()).unwrap_err();
        assert!(matches!(err, FormatError::Decode { .. }), "input: {raw}");
    }
}

#[test]
fn top_level_null_formats_as_empty_entry() {
    // Given: 최상위 값이 null인 입력
    let formatter = GcpLogFormatter::builder()
        .relabeler(Unprefix)
        .build();

    // When: 포매팅하면
    let record = formatter.format(b"null").unwrap().unwrap();

    // Then: 빈 엔트리로 처리되어 라인은 원본 입력, 레이블 값은 모두 비어 있음
    assert_eq!(record.line, "null");
    assert!(record.labels.iter().all(|(_, value)| value.is_empty()));
}

#[test]
fn errors_do_not_affect_subsequent_records() {
    let formatter = GcpLogFormatter::builder().build();
    assert!(formatter.format(b"garbage").is_err());
    assert!(formatter.format(GCE_ENTRY.as_bytes()).unwrap().is_some());
}

// =============================================================================
// push 메시지
// =============================================================================

fn push_body(entry: &str) -> String {
    let data = base64::engine::general_purpose::STANDARD.encode(entry);
    format!(
        r#"{{"message":{{"attributes":{{"source":"gce"}},"data":"{data}","messageId":"m-9","publishTime":"2024-01-01T00:00:00Z"}},"subscription":"projects/demo/subscriptions/logs"}}"#
    )
}

#[test]
fn push_message_exposes_envelope_labels_to_rules() {
    let rules = yaml_rules(
        r#"
- source_labels: [__gcp_subscription_name]
  regex: projects/.+/subscriptions/(.+)
  target_label: subscription
- source_labels: [__gcp_attributes_source]
  target_label: source
"#,
    );
    let formatter = GcpLogFormatter::builder().relabeler(rules).build();
    let record = formatter
        .format_push(push_body(GCE_ENTRY).as_bytes())
        .unwrap()
        .unwrap();

    assert_eq!(record.labels.get("subscription"), Some("logs"));
    assert_eq!(record.labels.get("source"), Some("gce"));
    assert_eq!(record.line, "hello");
}

#[test]
fn push_full_line_is_decoded_entry() {
    let formatter = GcpLogFormatter::builder().use_full_line(true).build();
    let record = formatter
        .format_push(push_body(GCE_ENTRY).as_bytes())
        .unwrap()
        .unwrap();
    assert_eq!(record.line, GCE_ENTRY);
}

#[test]
fn push_envelope_errors_are_typed() {
    let formatter = GcpLogFormatter::builder().build();

    let err = formatter
        .format_push(br#"{"message":{"messageId":"1"}}"#)
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_push_message");

    let err = formatter
        .format_push(br#"{"message":{"messageId":"1","data":"%%%"}}"#)
        .unwrap_err();
    assert_eq!(err.kind(), "push_data_decode");
}

// =============================================================================
// 동시성
// =============================================================================

#[test]
fn formatter_is_shareable_across_threads() {
    let formatter = Arc::new(
        GcpLogFormatter::builder()
            .static_labels(static_labels(&[("job", "gcplog")]))
            .build(),
    );

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let formatter = Arc::clone(&formatter);
            std::thread::spawn(move || {
                (0..50)
                    .filter(|_| matches!(formatter.format(GCE_ENTRY.as_bytes()), Ok(Some(_))))
                    .count()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 50);
    }
}

// =============================================================================
// property 테스트
// =============================================================================

mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn entry_json(
        resource_labels: &BTreeMap<String, String>,
        entry_labels: &BTreeMap<String, String>,
    ) -> String {
        serde_json::json!({
            "logName": "projects/p/logs/l",
            "resource": {"type": "global", "labels": resource_labels},
            "severity": "INFO",
            "labels": entry_labels,
        })
        .to_string()
    }

    proptest! {
        #[test]
        fn output_labels_are_never_internal(
            resource_labels in proptest::collection::btree_map(".{0,12}", ".{0,12}", 0..6),
            entry_labels in proptest::collection::btree_map(".{0,12}", ".{0,12}", 0..6),
        ) {
            let raw = entry_json(&resource_labels, &entry_labels);
            for formatter in [
                GcpLogFormatter::builder().relabeler(Identity).build(),
                GcpLogFormatter::builder().relabeler(Unprefix).build(),
            ] {
                let record = formatter.format(raw.as_bytes()).unwrap().unwrap();
                for (name, _) in record.labels.iter() {
                    prop_assert!(!name.starts_with("__"), "internal label leaked: {}", name);
                    prop_assert!(gcplog_core::labels::is_valid_label_name(name));
                }
            }
        }

        #[test]
        fn static_labels_always_win(
            value in "[a-z]{1,8}",
            severity in "[A-Z]{1,8}",
        ) {
            let formatter = GcpLogFormatter::builder()
                .relabeler(Unprefix)
                .static_labels(static_labels(&[("gcp_severity", value.as_str())]))
                .build();
            let raw = serde_json::json!({"severity": severity}).to_string();
            let record = formatter.format(raw.as_bytes()).unwrap().unwrap();
            prop_assert_eq!(record.labels.get("gcp_severity"), Some(value.as_str()));
        }

        #[test]
        fn always_drop_never_errors_on_valid_objects(
            payload in ".{0,32}",
            severity in "[A-Z]{0,8}",
        ) {
            let formatter = GcpLogFormatter::builder().relabeler(AlwaysDrop).build();
            let raw = serde_json::json!({"severity": severity, "textPayload": payload}).to_string();
            prop_assert!(matches!(formatter.format(raw.as_bytes()), Ok(None)));
        }
    }
}
