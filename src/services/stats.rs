//! Dashboard statistics — head counts, monthly lesson hours, exam pass rate.
//!
//! Each aggregate is fetched independently; a failed fetch is logged and
//! reported as zero so one broken table does not blank the whole dashboard.

use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Date, Month, Time};

use super::data::{self, DataConfig, FilterOp, SelectQuery};

/// Exam result value counted as a pass.
pub const PASS_RESULT: &str = "Réussite";

/// Aggregates shown on the dashboard landing page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_eleves: i64,
    pub total_moniteurs: i64,
    /// Lesson hours booked inside the current calendar month, one decimal.
    pub total_heures_mois: f64,
    /// Percentage of exam results equal to [`PASS_RESULT`], rounded.
    pub taux_reussite: u32,
}

#[derive(Debug, Deserialize)]
struct LessonSlot {
    heure_debut: String,
    heure_fin: String,
}

#[derive(Debug, Deserialize)]
struct ExamResult {
    resultat: Option<String>,
}

/// First and last day of the month containing `date`.
#[must_use]
pub fn month_bounds(date: Date) -> (Date, Date) {
    let first = Date::from_calendar_date(date.year(), date.month(), 1)
        .unwrap_or(date);

    let (next_year, next_month) = match date.month() {
        Month::December => (date.year() + 1, Month::January),
        month => (date.year(), month.next()),
    };
    let last = Date::from_calendar_date(next_year, next_month, 1)
        .map(|d| d.previous_day().unwrap_or(d))
        .unwrap_or(date);

    (first, last)
}

fn iso_date(date: Date) -> String {
    let format = format_description!("[year]-[month]-[day]");
    date.format(format).unwrap_or_default()
}

fn parse_lesson_time(raw: &str) -> Option<Time> {
    let hms = format_description!("[hour]:[minute]:[second]");
    let hm = format_description!("[hour]:[minute]");
    Time::parse(raw, hms).or_else(|_| Time::parse(raw, hm)).ok()
}

/// Duration of one lesson in fractional hours. `None` if either bound is not
/// a parseable time of day.
#[must_use]
pub fn lesson_hours(start: &str, end: &str) -> Option<f64> {
    let start = parse_lesson_time(start)?;
    let end = parse_lesson_time(end)?;
    Some((end - start).as_seconds_f64() / 3600.0)
}

/// Sum lesson durations, rounded to one decimal. Unparseable slots are
/// skipped.
#[must_use]
pub fn sum_lesson_hours<'a, I>(slots: I) -> f64
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let total: f64 = slots
        .into_iter()
        .filter_map(|(start, end)| lesson_hours(start, end))
        .sum();
    (total * 10.0).round() / 10.0
}

/// Percentage of passing results, rounded to the nearest integer. Zero when
/// there are no results at all.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn pass_rate(results: &[Option<String>]) -> u32 {
    if results.is_empty() {
        return 0;
    }
    let passes = results
        .iter()
        .filter(|r| r.as_deref() == Some(PASS_RESULT))
        .count();
    ((passes as f64 / results.len() as f64) * 100.0).round() as u32
}

async fn count_or_zero(config: &DataConfig, table: &str) -> i64 {
    match data::count_rows(config, table).await {
        Ok(count) => count,
        Err(e) => {
            tracing::error!(table, error = %e, "count fetch failed");
            0
        }
    }
}

async fn monthly_hours(config: &DataConfig, today: Date) -> f64 {
    let (first, last) = month_bounds(today);
    let query = SelectQuery::new("planning")
        .columns("heure_debut,heure_fin")
        .filter("date", FilterOp::Gte, &iso_date(first))
        .filter("date", FilterOp::Lte, &iso_date(last));

    match data::fetch_rows(config, &query).await {
        Ok(rows) => {
            let slots: Vec<LessonSlot> = data::decode_rows(rows);
            sum_lesson_hours(
                slots
                    .iter()
                    .map(|s| (s.heure_debut.as_str(), s.heure_fin.as_str())),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "planning fetch failed");
            0.0
        }
    }
}

async fn exam_pass_rate(config: &DataConfig) -> u32 {
    let query = SelectQuery::new("examen_resultats").columns("resultat");
    match data::fetch_rows(config, &query).await {
        Ok(rows) => {
            let results: Vec<ExamResult> = data::decode_rows(rows);
            let values: Vec<Option<String>> = results.into_iter().map(|r| r.resultat).collect();
            pass_rate(&values)
        }
        Err(e) => {
            tracing::error!(error = %e, "exam results fetch failed");
            0
        }
    }
}

/// Assemble the dashboard aggregates for the month containing `today`.
pub async fn fetch_dashboard_stats(config: &DataConfig, today: Date) -> DashboardStats {
    DashboardStats {
        total_eleves: count_or_zero(config, "eleves").await,
        total_moniteurs: count_or_zero(config, "enseignants").await,
        total_heures_mois: monthly_hours(config, today).await,
        taux_reussite: exam_pass_rate(config).await,
    }
}

#[cfg(test)]
#[path = "stats_test.rs"]
mod tests;
