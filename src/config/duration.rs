// src/config/duration.rs

use std::time::Duration;

/// Parse a duration string like `"3s"`, `"250ms"`, `"1m30s"`, `"2h"`.
///
/// A string is one or more `<integer><unit>` groups; units are `ms`, `s`,
/// `m` and `h`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let mut total = Duration::ZERO;
    let mut rest = s;

    while !rest.is_empty() {
        // Find the boundary between digits and suffix.
        let idx = rest
            .chars()
            .position(|c| !c.is_ascii_digit())
            .ok_or_else(|| format!("duration '{}' missing unit suffix", s))?;
        if idx == 0 {
            return Err(format!("duration '{}' has a unit without a number", s));
        }

        let (num_part, tail) = rest.split_at(idx);
        let value: u64 = num_part
            .parse()
            .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;

        let unit_len = tail
            .chars()
            .position(|c| c.is_ascii_digit())
            .unwrap_or(tail.len());
        let (unit_part, next) = tail.split_at(unit_len);

        let secs_per_unit = match unit_part.trim().to_lowercase().as_str() {
            "ms" => None,
            "s" => Some(1),
            "m" => Some(60),
            "h" => Some(60 * 60),
            unit => {
                return Err(format!(
                    "unsupported duration unit '{}'; expected ms, s, m, or h",
                    unit
                ));
            }
        };
        let part = match secs_per_unit {
            None => Some(Duration::from_millis(value)),
            Some(factor) => value.checked_mul(factor).map(Duration::from_secs),
        };

        total = part
            .and_then(|p| total.checked_add(p))
            .ok_or_else(|| format!("duration '{}' is too large", s))?;
        rest = next;
    }

    Ok(total)
}
