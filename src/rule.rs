//! Recurrence rule string codec.
//!
//! Encodes structured rules into the store's semicolon-delimited grammar
//! and decodes stored rule strings back into structured form. The decoder
//! is a key-prefix scanner, so the encode-only keys (`BYDAY`, `BYSETPOS`,
//! `WKST`) can be recovered in the future without breaking existing
//! callers; today they are intentionally not recovered.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use calbridge_core::datetime::{self, RULE_UNTIL_FORMAT};
use calbridge_core::error::{CalBridgeError, CalBridgeResult};
use calbridge_core::recurrence::{Frequency, RecurrenceRule, RecurrenceRuleDraft, Weekday};

/// Encode a structured rule into the store's rule grammar.
///
/// Field order is fixed since store parsers may be order-sensitive:
/// `FREQ`, `BYDAY` (weekly), `BYSETPOS`+`BYDAY` (monthly), `WKST`,
/// `INTERVAL`, then `UNTIL` or `COUNT`.
pub fn encode(rule: &RecurrenceRule) -> String {
    let mut out = format!("FREQ={}", rule.frequency.rule_token());

    if rule.frequency == Frequency::Weekly && !rule.days_of_week.is_empty() {
        out.push_str(&format!(";BYDAY={}", join_days(&rule.days_of_week)));
    }

    if rule.frequency == Frequency::Monthly && !rule.days_of_week.is_empty() {
        if let Some(position) = rule.week_position_in_month {
            out.push_str(&format!(";BYSETPOS={position}"));
            out.push_str(&format!(";BYDAY={}", join_days(&rule.days_of_week)));
        }
    }

    if let Some(week_start) = rule.week_start {
        out.push_str(&format!(";WKST={week_start}"));
    }

    if let Some(interval) = rule.interval {
        out.push_str(&format!(";INTERVAL={interval}"));
    }

    if let Some(end_date) = rule.end_date {
        out.push_str(&format!(";UNTIL={}", format_until(&end_date)));
    } else if let Some(count) = rule.occurrence_count {
        out.push_str(&format!(";COUNT={count}"));
    }

    out
}

/// Decode a stored rule string.
///
/// Returns `Ok(None)` when the string carries no recognizable frequency;
/// the record is then treated as non-recurring rather than unreadable.
/// `BYDAY`/`BYSETPOS`/`WKST` are not recovered (encode-only today); other
/// unknown keys are ignored so the grammar can grow.
pub fn decode(raw: &str) -> CalBridgeResult<Option<RecurrenceRule>> {
    let mut tokens = raw.split(';');

    let Some(first) = tokens.next() else {
        return Ok(None);
    };
    let Some(freq_value) = first.strip_prefix("FREQ=") else {
        return Ok(None);
    };
    let Ok(frequency) = freq_value.to_lowercase().parse::<Frequency>() else {
        tracing::warn!(token = freq_value, "unrecognized frequency in stored rule");
        return Ok(None);
    };

    let mut decoded = RecurrenceRule::new(frequency);

    for token in tokens {
        let Some((key, value)) = token.split_once('=') else {
            continue;
        };
        match key {
            "INTERVAL" => {
                decoded.interval = Some(value.parse().map_err(|e| {
                    CalBridgeError::Malformed("INTERVAL", format!("{value:?}: {e}"))
                })?);
            }
            "COUNT" => {
                decoded.occurrence_count = Some(
                    value
                        .parse()
                        .map_err(|e| CalBridgeError::Malformed("COUNT", format!("{value:?}: {e}")))?,
                );
            }
            "UNTIL" => decoded.end_date = Some(parse_until(value)?),
            _ => {}
        }
    }

    Ok(Some(decoded))
}

/// Build a structured rule from a caller-supplied draft.
///
/// Returns `None` when the frequency token is unrecognized; the save then
/// proceeds without recurrence. String end dates are interpreted per the
/// caller's UTC-normalization choice.
pub fn from_draft(draft: &RecurrenceRuleDraft, utc: bool) -> CalBridgeResult<Option<RecurrenceRule>> {
    let Some(freq_token) = draft.frequency.as_deref() else {
        return Ok(None);
    };
    let Ok(frequency) = freq_token.parse::<Frequency>() else {
        tracing::warn!(token = freq_token, "unrecognized frequency in draft rule");
        return Ok(None);
    };

    if draft.end_date.is_some() && draft.occurrence.is_some() {
        return Err(CalBridgeError::Malformed(
            "recurrenceRule",
            "endDate and occurrence are mutually exclusive".to_string(),
        ));
    }

    let mut rule = RecurrenceRule::new(frequency);
    rule.interval = draft.interval;
    rule.occurrence_count = draft.occurrence;
    rule.week_position_in_month = draft.week_position_in_month;
    rule.duration = draft.duration.clone();

    if let Some(end) = &draft.end_date {
        let ms = end.to_millis("recurrenceRule.endDate", utc)?;
        rule.end_date = Some(datetime::utc_from_millis(ms).ok_or_else(|| {
            CalBridgeError::Malformed("recurrenceRule.endDate", format!("{ms} is out of range"))
        })?);
    }

    if let Some(days) = &draft.days_of_week {
        rule.days_of_week = days
            .iter()
            .map(|token| {
                token.parse::<Weekday>().map_err(|_| {
                    CalBridgeError::Malformed(
                        "recurrenceRule.daysOfWeek",
                        format!("unknown weekday token {token:?}"),
                    )
                })
            })
            .collect::<CalBridgeResult<_>>()?;
    }

    if let Some(token) = &draft.week_start {
        rule.week_start = Some(token.parse::<Weekday>().map_err(|_| {
            CalBridgeError::Malformed(
                "recurrenceRule.weekStart",
                format!("unknown weekday token {token:?}"),
            )
        })?);
    }

    Ok(Some(rule))
}

/// Build a rule from the legacy single-token frequency field. Unknown
/// tokens yield no rule.
pub fn from_legacy_token(token: &str) -> Option<RecurrenceRule> {
    token.parse::<Frequency>().ok().map(RecurrenceRule::new)
}

fn join_days(days: &[Weekday]) -> String {
    days.iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_until(value: &str) -> CalBridgeResult<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(value, RULE_UNTIL_FORMAT).map_err(|e| {
        CalBridgeError::Malformed("UNTIL", format!("unparsable rule end date {value:?}: {e}"))
    })?;
    Ok(Utc.from_utc_datetime(&naive))
}

fn format_until(instant: &DateTime<Utc>) -> String {
    instant.format(RULE_UNTIL_FORMAT).to_string()
}
