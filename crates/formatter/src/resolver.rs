//! 타임스탬프와 로그 라인 결정
//!
//! 두 정책 플래그가 각각 독립적으로 타임스탬프와 라인을 결정합니다.
//! 레이블 단계와는 데이터 의존성이 없습니다.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::entry::GcpLogEntry;
use crate::error::FormatError;

/// `0001-01-01T00:00:00Z`의 Unix 초
const ZERO_INSTANT_SECS: i64 = -62_135_596_800;

/// 레코드 타임스탬프를 결정합니다.
///
/// `use_incoming_timestamp`가 꺼져 있으면 현재 시각을 반환합니다.
/// 켜져 있으면 `timestamp`(비어 있으면 `receiveTimestamp`)를 RFC3339로 파싱합니다.
/// 구분자 `T`와 `Z`는 대문자만 허용하며 윤초(`:60`)는 거부합니다.
/// 두 필드가 모두 비었거나 zero instant이면 [`FormatError::MissingTimestamp`]입니다.
pub fn resolve_timestamp(
    entry: &GcpLogEntry,
    use_incoming_timestamp: bool,
) -> Result<DateTime<Utc>, FormatError> {
    if !use_incoming_timestamp {
        return Ok(Utc::now());
    }

    let raw = if entry.timestamp.is_empty() {
        entry.receive_timestamp.as_str()
    } else {
        entry.timestamp.as_str()
    };
    if raw.is_empty() {
        return Err(FormatError::MissingTimestamp);
    }

    let ts = parse_rfc3339(raw).map_err(|reason| FormatError::TimestampParse {
        value: raw.to_owned(),
        reason: reason.to_owned(),
    })?;

    if is_zero_instant(&ts) {
        return Err(FormatError::MissingTimestamp);
    }
    Ok(ts)
}

/// 로그 라인을 결정합니다.
///
/// `use_full_line`이 꺼져 있고 공백을 제거한 `textPayload`가 비어 있지 않으면
/// `textPayload`를 그대로 사용합니다. 그 밖에는 원본 입력 전체를 사용합니다.
pub fn resolve_line(entry: &GcpLogEntry, raw: &[u8], use_full_line: bool) -> String {
    if !use_full_line && !entry.text_payload.trim().is_empty() {
        return entry.text_payload.clone();
    }
    // 디코딩을 통과한 입력이므로 항상 UTF-8
    String::from_utf8_lossy(raw).into_owned()
}

/// `YYYY-MM-DDTHH:MM:SS[.frac](Z|±HH:MM)` 레이아웃만 받아들이는 엄격한 파서
///
/// 소수 초 구분자는 `.`과 `,`를 모두 허용하고 9자리를 넘는 자릿수는 버립니다.
fn parse_rfc3339(raw: &str) -> Result<DateTime<Utc>, &'static str> {
    let b = raw.as_bytes();
    if b.len() < 20 {
        return Err("too short for RFC3339 layout");
    }
    for (pos, sep) in [(4, b'-'), (7, b'-'), (10, b'T'), (13, b':'), (16, b':')] {
        if b[pos] != sep {
            return Err("unexpected separator in RFC3339 layout");
        }
    }

    let year = number(&b[0..4])?;
    let month = number(&b[5..7])?;
    let day = number(&b[8..10])?;
    let hour = number(&b[11..13])?;
    let minute = number(&b[14..16])?;
    let second = number(&b[17..19])?;
    if hour > 23 || minute > 59 || second > 59 {
        return Err("time of day out of range");
    }

    let mut i = 19;
    let mut nanos = 0u32;
    if matches!(b[i], b'.' | b',') {
        i += 1;
        let start = i;
        while i < b.len() && b[i].is_ascii_digit() {
            if i - start < 9 {
                nanos = nanos * 10 + u32::from(b[i] - b'0');
            }
            i += 1;
        }
        let digits = i - start;
        if digits == 0 {
            return Err("missing fractional second digits");
        }
        if digits < 9 {
            nanos *= 10u32.pow((9 - digits) as u32);
        }
    }

    let offset_secs = match &b[i..] {
        b"Z" => 0,
        [sign @ (b'+' | b'-'), hh @ .., b':', m1, m2] if hh.len() == 2 => {
            let h = number(hh)?;
            let m = number(&[*m1, *m2])?;
            if h > 23 || m > 59 {
                return Err("time zone offset out of range");
            }
            let secs = (h * 3600 + m * 60) as i32;
            if *sign == b'-' { -secs } else { secs }
        }
        _ => return Err("expected 'Z' or a numeric time zone offset"),
    };

    let date = NaiveDate::from_ymd_opt(year as i32, month, day).ok_or("date out of range")?;
    let time =
        NaiveTime::from_hms_nano_opt(hour, minute, second, nanos).ok_or("time out of range")?;
    let offset = FixedOffset::east_opt(offset_secs).ok_or("time zone offset out of range")?;
    offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .map(|ts| ts.with_timezone(&Utc))
        .ok_or("timestamp out of range")
}

fn number(digits: &[u8]) -> Result<u32, &'static str> {
    digits.iter().try_fold(0u32, |acc, &d| {
        if d.is_ascii_digit() {
            Ok(acc * 10 + u32::from(d - b'0'))
        } else {
            Err("expected digit in RFC3339 layout")
        }
    })
}

fn is_zero_instant(ts: &DateTime<Utc>) -> bool {
    ts.timestamp() == ZERO_INSTANT_SECS && ts.timestamp_subsec_nanos() == 0
}
