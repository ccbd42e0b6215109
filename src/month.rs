use crate::error::EngineError;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

// Modulo-12 arithmetic yields 0 for December, so 0 and 12 resolve to the same name.
pub fn month_name(index: u32) -> Option<&'static str> {
    match index {
        0 | 12 => Some("December"),
        1..=11 => Some(MONTH_NAMES[(index - 1) as usize]),
        _ => None,
    }
}

pub fn month_index(name: &str) -> Option<u32> {
    MONTH_NAMES
        .iter()
        .position(|candidate| *candidate == name)
        .map(|position| position as u32 + 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthCursor {
    year: i32,
    month: u32,
}

impl MonthCursor {
    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    // The year increments only on the December -> January rollover; the
    // starting month is never skipped.
    pub fn advance(&mut self) {
        self.month = (self.month % 12) + 1;
        if self.month == 1 {
            self.year += 1;
        }
    }

    pub fn label(&self) -> String {
        let name = month_name(self.month).unwrap_or("December");
        format!("{name}-{}", self.year)
    }
}

pub fn parse_sequence(token: &str) -> Result<MonthCursor, EngineError> {
    let malformed = || EngineError::MalformedSequence {
        token: token.to_string(),
    };

    let (year, month) = token.split_once('-').ok_or_else(malformed)?;
    if year.len() != 4 || month.len() != 2 {
        return Err(malformed());
    }
    if !year.chars().all(|c| c.is_ascii_digit()) || !month.chars().all(|c| c.is_ascii_digit()) {
        return Err(malformed());
    }

    let year: i32 = year.parse().map_err(|_| malformed())?;
    let month: u32 = month.parse().map_err(|_| malformed())?;
    if !(1..=12).contains(&month) {
        return Err(malformed());
    }

    Ok(MonthCursor { year, month })
}

pub fn parse_month_key(token: &str) -> Option<(u32, i32)> {
    let (name, year) = token.split_once('-')?;
    let index = month_index(name)?;
    let year: i32 = year.parse().ok()?;
    Some((index, year))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_zero_padded_tokens() {
        let cursor = parse_sequence("2021-09").expect("valid token");
        assert_eq!(cursor.year(), 2021);
        assert_eq!(cursor.month(), 9);
    }

    #[test]
    fn rejects_unpadded_and_garbage_tokens() {
        for token in ["2021-9", "21-09", "2021/09", "2021-00", "2021-13", "year-mm", ""] {
            let err = parse_sequence(token).expect_err("token should be rejected");
            assert!(matches!(err, EngineError::MalformedSequence { .. }));
        }
    }

    #[test]
    fn zero_and_twelve_both_mean_december() {
        assert_eq!(month_name(0), Some("December"));
        assert_eq!(month_name(12), Some("December"));
        assert_eq!(month_name(1), Some("January"));
        assert_eq!(month_name(13), None);
    }

    #[test]
    fn cursor_rolls_over_the_year_boundary() {
        let mut cursor = parse_sequence("2021-11").expect("valid token");
        assert_eq!(cursor.label(), "November-2021");
        cursor.advance();
        assert_eq!(cursor.label(), "December-2021");
        cursor.advance();
        assert_eq!(cursor.label(), "January-2022");
        assert_eq!(cursor.year(), 2022);
    }

    #[test]
    fn january_start_keeps_its_own_year() {
        let cursor = parse_sequence("2022-01").expect("valid token");
        assert_eq!(cursor.label(), "January-2022");
    }

    #[test]
    fn month_keys_parse_by_name() {
        assert_eq!(parse_month_key("September-2021"), Some((9, 2021)));
        assert_eq!(parse_month_key("Smarch-2021"), None);
        assert_eq!(parse_month_key("September"), None);
    }
}
