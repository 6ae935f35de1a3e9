//! Due-date inference from title phrases
//!
//! Recognizes `today`, `tomorrow`, `in N day(s)`, `in N week(s)` and
//! `next <weekday>`, relative to a caller-supplied reference date. The
//! first rule that matches (in that order) wins.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;

static TODAY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(^|\s)today(\s|$)").expect("valid regex"));
static TOMORROW_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|\s)tomorrow(\s|$)").expect("valid regex"));
static IN_DAYS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bin\s+(\d+)\s+days?\b").expect("valid regex"));
static IN_WEEKS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bin\s+(\d+)\s+weeks?\b").expect("valid regex"));
static NEXT_WEEKDAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bnext\s+(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b")
        .expect("valid regex")
});

fn weekday(name: &str) -> Option<Weekday> {
    name.parse().ok()
}

fn number(re: &Regex, text: &str) -> Option<u64> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

/// Days from `reference` until the phrase in `title`, if any
#[must_use]
pub fn days_until(title: &str, reference: NaiveDate) -> Option<u64> {
    let text = title.to_lowercase();
    if TODAY_RE.is_match(&text) {
        return Some(0);
    }
    if TOMORROW_RE.is_match(&text) {
        return Some(1);
    }
    if let Some(days) = number(&IN_DAYS_RE, &text) {
        return Some(days);
    }
    if let Some(weeks) = number(&IN_WEEKS_RE, &text) {
        return weeks.checked_mul(7);
    }
    let caps = NEXT_WEEKDAY_RE.captures(&text)?;
    let target = weekday(caps.get(1)?.as_str())?;
    let today = reference.weekday().num_days_from_sunday();
    let wanted = target.num_days_from_sunday();
    let days = (wanted + 7 - today) % 7;
    Some(if days == 0 { 7 } else { u64::from(days) })
}

/// Midnight UTC of the day the phrase in `title` points at
#[must_use]
pub fn infer_due(title: &str, reference: NaiveDate) -> Option<DateTime<Utc>> {
    let days = days_until(title, reference)?;
    let date = reference.checked_add_days(Days::new(days))?;
    Some(date.and_time(NaiveTime::MIN).and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 2025-08-13 is a Wednesday
    const REF: (i32, u32, u32) = (2025, 8, 13);

    fn infer(title: &str) -> Option<NaiveDate> {
        infer_due(title, date(REF.0, REF.1, REF.2)).map(|d| d.date_naive())
    }

    #[test]
    fn today_and_tomorrow() {
        assert_eq!(infer("Pay bill today"), Some(date(2025, 8, 13)));
        assert_eq!(infer("Tomorrow call dentist"), Some(date(2025, 8, 14)));
        assert_eq!(infer("todayish"), None);
    }

    #[test]
    fn in_days_and_weeks() {
        assert_eq!(infer("Follow up in 3 days"), Some(date(2025, 8, 16)));
        assert_eq!(infer("Follow up in 1 day"), Some(date(2025, 8, 14)));
        assert_eq!(infer("Review in 2 weeks"), Some(date(2025, 8, 27)));
    }

    #[test]
    fn next_weekday() {
        assert_eq!(infer("Standup next Friday"), Some(date(2025, 8, 15)));
        assert_eq!(infer("Retro next wednesday"), Some(date(2025, 8, 20)));
        assert_eq!(infer("Plan next monday"), Some(date(2025, 8, 18)));
    }

    #[test]
    fn no_phrase() {
        assert_eq!(infer("Write report"), None);
    }

    #[test]
    fn midnight_utc() {
        let due = infer_due("today", date(2025, 8, 13)).unwrap();
        assert_eq!(due.to_rfc3339(), "2025-08-13T00:00:00+00:00");
    }
}
