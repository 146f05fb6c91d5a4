use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::error::DateParseError;

/// Russian month names in genitive case, as rendered in listing dates.
pub const MONTHS: &[(&str, u32)] = &[
    ("января", 1),
    ("февраля", 2),
    ("марта", 3),
    ("апреля", 4),
    ("мая", 5),
    ("июня", 6),
    ("июля", 7),
    ("августа", 8),
    ("сентября", 9),
    ("октября", 10),
    ("ноября", 11),
    ("декабря", 12),
];

/// Turns a publication-date phrase ("сегодня", "5 минут назад",
/// "28 декабря") into a calendar date relative to the fetch instant.
///
/// The month vocabulary is closed: a phrase matching none of the
/// recognized shapes is an error, never a silent default.
#[derive(Debug, Clone)]
pub struct DateNormalizer {
    months: &'static [(&'static str, u32)],
}

impl DateNormalizer {
    pub fn new() -> Self {
        Self::with_months(MONTHS)
    }

    pub fn with_months(months: &'static [(&'static str, u32)]) -> Self {
        Self { months }
    }

    pub fn normalize(
        &self,
        phrase: &str,
        reference: NaiveDateTime,
    ) -> Result<NaiveDate, DateParseError> {
        let phrase = phrase.trim();

        if phrase.contains("сегод") {
            return Ok(reference.date());
        }

        if phrase.contains("минут") {
            // Listings sometimes render "минуту назад" without a number.
            let delta = leading_number(phrase).unwrap_or(1);
            return Ok((reference - Duration::minutes(delta)).date());
        }

        if phrase.contains("час") {
            let delta = leading_number(phrase)
                .ok_or_else(|| DateParseError::UnrecognizedPhrase(phrase.to_string()))?;
            return Ok((reference - Duration::hours(delta)).date());
        }

        self.absolute_date(phrase, reference)
    }

    /// "{day} {month-name}" with no year suffix. A December listing seen
    /// in January belongs to the previous year.
    fn absolute_date(
        &self,
        phrase: &str,
        reference: NaiveDateTime,
    ) -> Result<NaiveDate, DateParseError> {
        let mut parts = phrase.split(' ');
        let (day, month_name) = match (parts.next(), parts.next()) {
            (Some(day), Some(month)) => (day, month),
            _ => return Err(DateParseError::UnrecognizedPhrase(phrase.to_string())),
        };

        let day: u32 = day
            .parse()
            .map_err(|_| DateParseError::UnrecognizedPhrase(phrase.to_string()))?;
        let month = self
            .months
            .iter()
            .find(|(name, _)| *name == month_name)
            .map(|(_, number)| *number)
            .ok_or_else(|| DateParseError::UnknownMonth(month_name.to_string()))?;

        let year = if reference.month() == 1 && month == 12 {
            reference.year() - 1
        } else {
            reference.year()
        };

        NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| DateParseError::InvalidDate(phrase.to_string()))
    }
}

impl Default for DateNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn leading_number(phrase: &str) -> Option<i64> {
    phrase.split(' ').next().and_then(|n| n.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn today_marker_uses_reference_date() {
        let normalizer = DateNormalizer::new();
        let result = normalizer.normalize("сегодня в 14:32", at(2024, 3, 15, 18, 0));
        assert_eq!(result, Ok(date(2024, 3, 15)));
    }

    #[test]
    fn minutes_delta_can_cross_midnight() {
        let normalizer = DateNormalizer::new();
        let result = normalizer.normalize("5 минут назад", at(2024, 3, 15, 0, 3));
        assert_eq!(result, Ok(date(2024, 3, 14)));
    }

    #[test]
    fn unparsable_minutes_count_defaults_to_one() {
        let normalizer = DateNormalizer::new();
        let result = normalizer.normalize("минуту назад", at(2024, 3, 15, 0, 0));
        assert_eq!(result, Ok(date(2024, 3, 14)));
    }

    #[test]
    fn hours_delta_subtracts_from_reference() {
        let normalizer = DateNormalizer::new();
        let result = normalizer.normalize("3 часа назад", at(2024, 3, 15, 1, 0));
        assert_eq!(result, Ok(date(2024, 3, 14)));
    }

    #[test]
    fn hours_without_a_count_is_an_error() {
        let normalizer = DateNormalizer::new();
        let result = normalizer.normalize("час назад", at(2024, 3, 15, 12, 0));
        assert_eq!(
            result,
            Err(DateParseError::UnrecognizedPhrase("час назад".into()))
        );
    }

    #[test]
    fn december_seen_in_january_rolls_back_a_year() {
        let normalizer = DateNormalizer::new();
        let result = normalizer.normalize("28 декабря", at(2024, 1, 10, 12, 0));
        assert_eq!(result, Ok(date(2023, 12, 28)));
    }

    #[test]
    fn absolute_date_in_the_current_year() {
        let normalizer = DateNormalizer::new();
        let result = normalizer.normalize("15 марта", at(2024, 3, 20, 12, 0));
        assert_eq!(result, Ok(date(2024, 3, 15)));
    }

    #[test]
    fn absolute_date_is_stable_across_calls() {
        let normalizer = DateNormalizer::new();
        let reference = at(2024, 6, 1, 9, 30);
        let first = normalizer.normalize("7 мая", reference);
        let second = normalizer.normalize("7 мая", reference);
        assert_eq!(first, second);
        assert_eq!(first, Ok(date(2024, 5, 7)));
    }

    #[test]
    fn unknown_phrase_is_an_error() {
        let normalizer = DateNormalizer::new();
        let result = normalizer.normalize("вчера", at(2024, 3, 15, 12, 0));
        assert_eq!(
            result,
            Err(DateParseError::UnrecognizedPhrase("вчера".into()))
        );
    }

    #[test]
    fn unknown_month_is_an_error() {
        let normalizer = DateNormalizer::new();
        let result = normalizer.normalize("15 термидора", at(2024, 3, 15, 12, 0));
        assert_eq!(
            result,
            Err(DateParseError::UnknownMonth("термидора".into()))
        );
    }
}
