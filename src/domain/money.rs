use thiserror::Error;

/// Amounts are stored as integer cents: 1250 is 12.50 in any two-decimal currency.
pub type Cents = i64;

/// Render cents with two decimals, e.g. `-1234` -> `"-12.34"`.
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Render cents prefixed by the contact currency when one is known.
pub fn format_money(cents: Cents, currency_code: Option<&str>) -> String {
    match currency_code {
        Some(code) if !code.is_empty() => format!("{} {}", code, format_cents(cents)),
        _ => format_cents(cents),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseMoneyError {
    #[error("empty amount")]
    Empty,
    #[error("invalid amount: {0}")]
    Invalid(String),
}

/// Parse a user supplied decimal amount ("120", "120.5", "-3.07") into cents.
/// Digits past the second decimal place are truncated.
pub fn parse_cents(input: &str) -> Result<Cents, ParseMoneyError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseMoneyError::Empty);
    }

    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let (units, fraction) = digits.split_once('.').unwrap_or((digits, ""));
    let invalid = || ParseMoneyError::Invalid(input.to_string());

    if units.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !units.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }

    let units: i64 = if units.is_empty() {
        0
    } else {
        units.parse().map_err(|_| invalid())?
    };
    let fraction: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => fraction[..2].parse().map_err(|_| invalid())?,
    };

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(fraction))
        .ok_or_else(invalid)?;
    Ok(if negative { -cents } else { cents })
}
