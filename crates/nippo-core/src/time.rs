//! Worked-time arithmetic for the report worker table.

use crate::models::tenant::LunchBreakPolicy;

/// Net worked duration between two `HH:MM` clock strings.
///
/// Returns `None` for missing or unparsable input and for `end < start`
/// (overnight shifts are unsupported, a documented limitation of the table).
/// When the policy deducts lunch and the row does not opt out, the lunch
/// minutes are subtracted and the result floored at zero.
///
/// The output keeps the legacy formatting exactly: no leading zero on hours,
/// always two digits on minutes (`7:05`, `8:00`).
pub fn worked_duration(
    start: &str,
    end: &str,
    no_lunch_break: bool,
    policy: &LunchBreakPolicy,
) -> Option<String> {
    let start = parse_clock(start)?;
    let end = parse_clock(end)?;

    let mut minutes = end - start;
    if minutes < 0 {
        return None;
    }

    if policy.deduct_lunch_break && !no_lunch_break {
        minutes = (minutes - policy.lunch_break_minutes).max(0);
    }

    Some(format!("{}:{:02}", minutes / 60, minutes % 60))
}

/// `HH:MM` to minutes since midnight.
fn parse_clock(value: &str) -> Option<i64> {
    let (hours, minutes) = value.split_once(':')?;
    let hours: i64 = hours.trim().parse().ok()?;
    let minutes: i64 = minutes.trim().parse().ok()?;
    Some(hours * 60 + minutes)
}
