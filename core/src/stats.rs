//! Pure completion/aggregation math over already-fetched rows.
//!
//! Nothing in this module touches the database: callers hand in plain
//! dates and food rows, so every function here is unit-testable in
//! isolation and safe to call from any view code.

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate};

use crate::models::{Food, MacroProgress, NutritionGoals, NutritionSummary};

/// Current consecutive-day streak ending at the latest completion date.
///
/// Input order does not matter, and duplicate dates neither extend nor
/// break the run. The run is anchored at the most recent completion even
/// when that date is in the past.
#[must_use]
pub fn compute_streak(dates: &[NaiveDate]) -> i64 {
    let mut sorted = dates.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted.dedup();

    let Some(&latest) = sorted.first() else {
        return 0;
    };

    let mut streak = 1;
    let mut anchor = latest;
    for &candidate in &sorted[1..] {
        if candidate == anchor - Duration::days(1) {
            streak += 1;
            anchor = candidate;
        } else {
            break;
        }
    }
    streak
}

/// Parse raw `YYYY-MM-DD` completion dates, rejecting malformed values.
/// A silently skipped bad date would corrupt the streak count, so any
/// unparseable entry fails the whole batch.
pub fn parse_completion_dates(raw: &[String]) -> Result<Vec<NaiveDate>> {
    raw.iter()
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .with_context(|| format!("Invalid completion date '{s}'. Must be YYYY-MM-DD"))
        })
        .collect()
}

/// Share of habits completed today, as a whole percentage. 0 when there
/// are no habits.
#[must_use]
pub fn compute_daily_rate(total_habits: i64, completed_today: i64) -> i64 {
    percentage(completed_today as f64, total_habits as f64)
}

/// Month-to-date consistency: completions achieved out of
/// `habits × days in month` possible. 0 when the denominator is 0.
#[must_use]
pub fn compute_monthly_consistency(
    habit_count: i64,
    total_completions: i64,
    days_in_month: i64,
) -> i64 {
    percentage(
        total_completions as f64,
        (habit_count * days_in_month) as f64,
    )
}

/// Day-of-month numbers (1-based) with a completion inside the given
/// month, ascending and deduped. Drives calendar heat views.
#[must_use]
pub fn completed_days_in_month(dates: &[NaiveDate], year: i32, month: u32) -> Vec<u32> {
    let mut days: Vec<u32> = dates
        .iter()
        .filter(|d| d.year() == year && d.month() == month)
        .map(Datelike::day)
        .collect();
    days.sort_unstable();
    days.dedup();
    days
}

/// Number of days in a calendar month (28-31), per the actual calendar.
/// Returns 0 for a month outside 1-12.
#[must_use]
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match (first, next) {
        (Some(first), Some(next)) => (next - first).num_days() as u32,
        _ => 0,
    }
}

/// Sum a day's foods and express each macro as progress toward its goal.
#[must_use]
pub fn nutrition_summary(foods: &[Food], goals: &NutritionGoals) -> NutritionSummary {
    let calories: f64 = foods.iter().map(|f| f.calories).sum();
    let protein: f64 = foods.iter().map(|f| f.protein).sum();
    let carbs: f64 = foods.iter().map(|f| f.carbs).sum();
    let fat: f64 = foods.iter().map(|f| f.fat).sum();

    NutritionSummary {
        calories: macro_progress(calories, goals.calories),
        protein: macro_progress(protein, goals.protein),
        carbs: macro_progress(carbs, goals.carbs),
        fat: macro_progress(fat, goals.fat),
    }
}

fn macro_progress(current: f64, goal: f64) -> MacroProgress {
    MacroProgress {
        current,
        goal,
        percentage: percentage(current, goal),
    }
}

// Rounded whole percentage with a zero-denominator guard: rate math must
// never produce NaN or infinity, it short-circuits to 0 instead.
#[allow(clippy::cast_possible_truncation)]
fn percentage(numerator: f64, denominator: f64) -> i64 {
    if denominator <= 0.0 {
        return 0;
    }
    (numerator / denominator * 100.0).round() as i64
}
