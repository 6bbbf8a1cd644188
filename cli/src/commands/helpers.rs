use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use serde::Serialize;

use strive_core::models::{NewExercise, NewExerciseSet, NewFood};

pub(crate) fn parse_date(date_str: Option<String>) -> Result<NaiveDate> {
    match date_str {
        None => Ok(Local::now().date_naive()),
        Some(s) => match s.as_str() {
            "today" => Ok(Local::now().date_naive()),
            "yesterday" => Ok(Local::now().date_naive() - chrono::Duration::days(1)),
            "tomorrow" => Ok(Local::now().date_naive() + chrono::Duration::days(1)),
            _ => NaiveDate::parse_from_str(&s, "%Y-%m-%d").with_context(|| {
                format!("Invalid date '{s}'. Use YYYY-MM-DD or today/yesterday/tomorrow")
            }),
        },
    }
}

/// Parse a food argument: "name:portion:calories:protein:carbs:fat".
/// Trailing macros may be omitted and default to 0, but name, portion,
/// and calories are required.
pub(crate) fn parse_food_spec(s: &str) -> Result<NewFood> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() < 3 || parts.len() > 6 {
        bail!(
            "Invalid food '{s}'. Use 'name:portion:calories[:protein[:carbs[:fat]]]' \
             (e.g. 'Oatmeal:1 bowl:300:10:54:5')"
        );
    }

    let macro_at = |idx: usize, label: &str| -> Result<f64> {
        match parts.get(idx) {
            None => Ok(0.0),
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid {label} '{}' in food '{s}'", raw.trim())),
        }
    };

    Ok(NewFood {
        name: parts[0].trim().to_string(),
        portion: parts[1].trim().to_string(),
        calories: macro_at(2, "calories")?,
        protein: macro_at(3, "protein")?,
        carbs: macro_at(4, "carbs")?,
        fat: macro_at(5, "fat")?,
    })
}

/// Parse an exercise argument: "name:reps@weight,reps@weight,...".
/// Each comma-separated part is one set; the weight is optional
/// (e.g. "Pull-ups:10,8,6" for bodyweight work).
pub(crate) fn parse_exercise_spec(s: &str) -> Result<NewExercise> {
    let Some((name, sets_part)) = s.split_once(':') else {
        bail!(
            "Invalid exercise '{s}'. Use 'name:reps@weight,...' \
             (e.g. 'Bench Press:8@100,6@105')"
        );
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("Exercise name must not be empty in '{s}'");
    }

    let mut sets = Vec::new();
    for part in sets_part.split(',') {
        let part = part.trim();
        if part.is_empty() {
            bail!("Empty set in exercise '{s}'");
        }
        let (reps, weight) = match part.split_once('@') {
            Some((reps, weight)) => (reps.trim(), weight.trim()),
            None => (part, ""),
        };
        if reps.is_empty() {
            bail!("Missing reps in set '{part}' of exercise '{s}'");
        }
        sets.push(NewExerciseSet {
            reps: reps.to_string(),
            weight: weight.to_string(),
        });
    }

    Ok(NewExercise {
        name: name.to_string(),
        sets,
    })
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_none() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(None).unwrap(), today);
    }

    #[test]
    fn test_parse_date_keywords() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(Some("today".to_string())).unwrap(), today);
        assert_eq!(
            parse_date(Some("yesterday".to_string())).unwrap(),
            today - chrono::Duration::days(1)
        );
        assert_eq!(
            parse_date(Some("tomorrow".to_string())).unwrap(),
            today + chrono::Duration::days(1)
        );
    }

    #[test]
    fn test_parse_date_iso() {
        let date = parse_date(Some("2024-01-15".to_string())).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date(Some("nope".to_string())).is_err());
    }

    #[test]
    fn test_parse_food_spec_full() {
        let food = parse_food_spec("Oatmeal:1 bowl:300:10:54:5").unwrap();
        assert_eq!(food.name, "Oatmeal");
        assert_eq!(food.portion, "1 bowl");
        assert!((food.calories - 300.0).abs() < f64::EPSILON);
        assert!((food.protein - 10.0).abs() < f64::EPSILON);
        assert!((food.carbs - 54.0).abs() < f64::EPSILON);
        assert!((food.fat - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_food_spec_macros_default_to_zero() {
        let food = parse_food_spec("Apple:1 medium:95").unwrap();
        assert!((food.protein - 0.0).abs() < f64::EPSILON);
        assert!((food.fat - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_food_spec_invalid() {
        assert!(parse_food_spec("Apple").is_err());
        assert!(parse_food_spec("Apple:1 medium").is_err());
        assert!(parse_food_spec("Apple:1 medium:lots").is_err());
        assert!(parse_food_spec("a:b:1:2:3:4:5").is_err());
    }

    #[test]
    fn test_parse_exercise_spec_with_weights() {
        let exercise = parse_exercise_spec("Bench Press:8@100,6@105").unwrap();
        assert_eq!(exercise.name, "Bench Press");
        assert_eq!(exercise.sets.len(), 2);
        assert_eq!(exercise.sets[0].reps, "8");
        assert_eq!(exercise.sets[0].weight, "100");
        assert_eq!(exercise.sets[1].weight, "105");
    }

    #[test]
    fn test_parse_exercise_spec_bodyweight() {
        let exercise = parse_exercise_spec("Pull-ups:10,8,6").unwrap();
        assert_eq!(exercise.sets.len(), 3);
        assert!(exercise.sets.iter().all(|s| s.weight.is_empty()));
    }

    #[test]
    fn test_parse_exercise_spec_invalid() {
        assert!(parse_exercise_spec("nocolon").is_err());
        assert!(parse_exercise_spec(":8@100").is_err());
        assert!(parse_exercise_spec("Bench:8@100,,6@105").is_err());
        assert!(parse_exercise_spec("Bench:@100").is_err());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world this is long", 10), "hello w...");
    }

    #[test]
    fn test_truncate_utf8() {
        // Should not panic on multi-byte characters
        assert_eq!(truncate("Crème fraîche", 10), "Crème f...");
        assert_eq!(truncate("Müsli", 10), "Müsli");
    }
}
