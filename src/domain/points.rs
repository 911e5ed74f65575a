use std::fmt;

/// Points are whole, signed integers. Balances are never negative; ledger
/// entry deltas are positive for credits and negative for debits.
pub type Points = i64;

/// Format points with thousands separators.
/// Example: 12450 -> "12,450", -220 -> "-220"
pub fn format_points(points: Points) -> String {
    let digits = points.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if points < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Parse a whole number of points, accepting thousands separators.
/// Example: "12,450" -> 12450, "40" -> 40
pub fn parse_points(input: &str) -> Result<Points, ParsePointsError> {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    if cleaned.is_empty() {
        return Err(ParsePointsError::Empty);
    }
    cleaned
        .parse::<Points>()
        .map_err(|_| ParsePointsError::InvalidFormat)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsePointsError {
    Empty,
    InvalidFormat,
}

impl fmt::Display for ParsePointsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsePointsError::Empty => write!(f, "empty points value"),
            ParsePointsError::InvalidFormat => write!(f, "points must be a whole number"),
        }
    }
}

impl std::error::Error for ParsePointsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_points() {
        assert_eq!(format_points(0), "0");
        assert_eq!(format_points(40), "40");
        assert_eq!(format_points(999), "999");
        assert_eq!(format_points(1000), "1,000");
        assert_eq!(format_points(12450), "12,450");
        assert_eq!(format_points(1234567), "1,234,567");
        assert_eq!(format_points(-220), "-220");
        assert_eq!(format_points(-12270), "-12,270");
    }

    #[test]
    fn test_format_points_extremes() {
        assert_eq!(format_points(i64::MIN), "-9,223,372,036,854,775,808");
        assert_eq!(format_points(i64::MAX), "9,223,372,036,854,775,807");
    }

    #[test]
    fn test_parse_points() {
        assert_eq!(parse_points("40"), Ok(40));
        assert_eq!(parse_points(" 12,450 "), Ok(12450));
        assert_eq!(parse_points("1_000"), Ok(1000));
        assert_eq!(parse_points("-5"), Ok(-5));
    }

    #[test]
    fn test_parse_points_invalid() {
        assert_eq!(parse_points(""), Err(ParsePointsError::Empty));
        assert_eq!(parse_points("12.5"), Err(ParsePointsError::InvalidFormat));
        assert_eq!(parse_points("abc"), Err(ParsePointsError::InvalidFormat));
    }
}
