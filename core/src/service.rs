use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};

use crate::db::Database;
use crate::models::{
    ExerciseProgressPoint, Habit, HabitStats, HabitStatus, MealDetail, NewHabit, NewMeal,
    NewWorkout, NutritionGoals, NutritionSummary, WorkoutDetail, validate_food_data,
    validate_habit_data, validate_meal_type, validate_nutrition_goals, validate_workout_data,
};
use crate::stats;

const GOAL_KEYS: [&str; 4] = ["goal_calories", "goal_protein", "goal_carbs", "goal_fat"];

/// High-level tracker operations over a [`Database`]. All methods take the
/// owning profile explicitly; rows belonging to other profiles behave as if
/// they do not exist.
pub struct StriveService {
    db: Database,
}

impl StriveService {
    pub fn new(db_path: &Path) -> Result<Self> {
        let db = Database::open(db_path)?;
        Ok(StriveService { db })
    }

    pub fn new_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(StriveService { db })
    }

    // --- Habits ---

    pub fn add_habit(&self, user_id: &str, habit: &NewHabit) -> Result<Habit> {
        validate_habit_data(habit)?;
        self.db.insert_habit(user_id, habit)
    }

    pub fn get_habit(&self, user_id: &str, id: i64) -> Result<Option<Habit>> {
        self.db.get_habit(user_id, id)
    }

    pub fn update_habit(&self, user_id: &str, id: i64, habit: &NewHabit) -> Result<bool> {
        validate_habit_data(habit)?;
        self.db.update_habit(user_id, id, habit)
    }

    pub fn delete_habit(&self, user_id: &str, id: i64) -> Result<bool> {
        self.db.delete_habit(user_id, id)
    }

    /// Every habit with its completion status, streak, and the completed
    /// days of `today`'s month. One row per habit, in creation order.
    pub fn list_habits_with_status(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<Vec<HabitStatus>> {
        let habits = self.db.list_habits(user_id)?;
        let mut statuses = Vec::with_capacity(habits.len());
        for habit in habits {
            statuses.push(self.habit_status(habit, today)?);
        }
        Ok(statuses)
    }

    pub fn habit_status_by_id(
        &self,
        user_id: &str,
        id: i64,
        today: NaiveDate,
    ) -> Result<Option<HabitStatus>> {
        match self.db.get_habit(user_id, id)? {
            Some(habit) => Ok(Some(self.habit_status(habit, today)?)),
            None => Ok(None),
        }
    }

    fn habit_status(&self, habit: Habit, today: NaiveDate) -> Result<HabitStatus> {
        let raw = self.db.completion_dates(habit.id)?;
        let dates = stats::parse_completion_dates(&raw)?;
        let completed = self.db.completed_on(habit.id, today)?;
        let streak = stats::compute_streak(&dates);
        let completed_days = stats::completed_days_in_month(&dates, today.year(), today.month());
        Ok(HabitStatus {
            habit,
            completed,
            streak,
            completed_days,
        })
    }

    /// Set the completion flag for a habit on one day. Returns false when
    /// the habit does not exist or belongs to another profile.
    pub fn toggle_habit(
        &self,
        user_id: &str,
        id: i64,
        date: NaiveDate,
        completed: bool,
    ) -> Result<bool> {
        if self.db.get_habit(user_id, id)?.is_none() {
            return Ok(false);
        }
        self.db.toggle_completion(id, date, completed)?;
        Ok(true)
    }

    /// Aggregate habit stats for a day: today's completion rate plus
    /// month-to-date consistency across all habits.
    pub fn habit_stats(&self, user_id: &str, today: NaiveDate) -> Result<HabitStats> {
        let total_habits = self.db.count_habits(user_id)?;
        let completed_today = self.db.count_completions_on(user_id, today)?;

        let month_days = stats::days_in_month(today.year(), today.month());
        let month_start = NaiveDate::from_ymd_opt(today.year(), today.month(), 1)
            .context("Invalid month start")?;
        let month_end = NaiveDate::from_ymd_opt(today.year(), today.month(), month_days)
            .context("Invalid month end")?;
        let month_completions =
            self.db
                .count_completions_in_range(user_id, month_start, month_end)?;

        Ok(HabitStats {
            total_habits,
            completed_today,
            completion_rate: stats::compute_daily_rate(total_habits, completed_today),
            monthly_completion_rate: stats::compute_monthly_consistency(
                total_habits,
                month_completions,
                i64::from(month_days),
            ),
        })
    }

    // --- Meals ---

    pub fn log_meal(&self, user_id: &str, meal: &NewMeal) -> Result<MealDetail> {
        let mut validated = meal.clone();
        validated.meal_type = validate_meal_type(&meal.meal_type)?;
        for food in &validated.foods {
            validate_food_data(food)?;
        }
        self.db.insert_meal(user_id, &validated)
    }

    pub fn get_meal(&self, user_id: &str, id: i64) -> Result<Option<MealDetail>> {
        self.db.get_meal(user_id, id)
    }

    pub fn list_meals(&self, user_id: &str) -> Result<Vec<MealDetail>> {
        self.db.list_meals(user_id)
    }

    pub fn meals_for_date(&self, user_id: &str, date: NaiveDate) -> Result<Vec<MealDetail>> {
        self.db.meals_for_date(user_id, date)
    }

    pub fn update_meal(&self, user_id: &str, id: i64, meal: &NewMeal) -> Result<bool> {
        let mut validated = meal.clone();
        validated.meal_type = validate_meal_type(&meal.meal_type)?;
        for food in &validated.foods {
            validate_food_data(food)?;
        }
        self.db.update_meal(user_id, id, &validated)
    }

    pub fn delete_meal(&self, user_id: &str, id: i64) -> Result<bool> {
        self.db.delete_meal(user_id, id)
    }

    // --- Nutrition ---

    /// Macro totals for a day against the profile's goals.
    pub fn nutrition_summary(&self, user_id: &str, date: NaiveDate) -> Result<NutritionSummary> {
        let foods = self.db.foods_for_date(user_id, date)?;
        let goals = self.get_nutrition_goals(user_id)?;
        Ok(stats::nutrition_summary(&foods, &goals))
    }

    /// Stored goals for a profile, falling back to the defaults for any
    /// key never set.
    pub fn get_nutrition_goals(&self, user_id: &str) -> Result<NutritionGoals> {
        let mut goals = NutritionGoals::default();
        for key in GOAL_KEYS {
            let Some(raw) = self.db.get_setting(user_id, key)? else {
                continue;
            };
            let value: f64 = raw
                .parse()
                .with_context(|| format!("Stored goal '{key}' is not a number: '{raw}'"))?;
            match key {
                "goal_calories" => goals.calories = value,
                "goal_protein" => goals.protein = value,
                "goal_carbs" => goals.carbs = value,
                _ => goals.fat = value,
            }
        }
        Ok(goals)
    }

    pub fn set_nutrition_goals(&self, user_id: &str, goals: &NutritionGoals) -> Result<()> {
        validate_nutrition_goals(goals)?;
        for (key, value) in [
            ("goal_calories", goals.calories),
            ("goal_protein", goals.protein),
            ("goal_carbs", goals.carbs),
            ("goal_fat", goals.fat),
        ] {
            self.db.set_setting(user_id, key, &value.to_string())?;
        }
        Ok(())
    }

    // --- Workouts ---

    pub fn add_workout(&self, user_id: &str, workout: &NewWorkout) -> Result<WorkoutDetail> {
        validate_workout_data(workout)?;
        self.db.insert_workout(user_id, workout)
    }

    pub fn get_workout(&self, user_id: &str, id: i64) -> Result<Option<WorkoutDetail>> {
        self.db.get_workout(user_id, id)
    }

    pub fn list_workouts(&self, user_id: &str, limit: Option<i64>) -> Result<Vec<WorkoutDetail>> {
        self.db.list_workouts(user_id, limit)
    }

    pub fn update_workout(&self, user_id: &str, id: i64, workout: &NewWorkout) -> Result<bool> {
        validate_workout_data(workout)?;
        self.db.update_workout(user_id, id, workout)
    }

    pub fn delete_workout(&self, user_id: &str, id: i64) -> Result<bool> {
        self.db.delete_workout(user_id, id)
    }

    /// Per-date series of the heaviest parseable set weight for one
    /// exercise, ascending by date. Case-insensitive name match; set
    /// weights that do not parse as numbers are skipped.
    pub fn exercise_progress(
        &self,
        user_id: &str,
        exercise_name: &str,
    ) -> Result<Vec<ExerciseProgressPoint>> {
        let workouts = self.db.list_workouts(user_id, None)?;
        let needle = exercise_name.to_lowercase();

        let mut points = Vec::new();
        for detail in workouts {
            let mut max_weight: Option<f64> = None;
            for exercise in &detail.exercises {
                if exercise.name.to_lowercase() != needle {
                    continue;
                }
                for set in &exercise.sets {
                    if let Ok(weight) = set.weight.trim().parse::<f64>() {
                        max_weight = Some(max_weight.map_or(weight, |m| m.max(weight)));
                    }
                }
            }
            if let Some(max_weight) = max_weight {
                points.push(ExerciseProgressPoint {
                    date: detail.workout.date.clone(),
                    max_weight,
                });
            }
        }
        // list_workouts returns newest first; progress reads oldest first.
        points.reverse();
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewExercise, NewExerciseSet, NewFood};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn service() -> StriveService {
        StriveService::new_in_memory().unwrap()
    }

    fn habit(name: &str) -> NewHabit {
        NewHabit {
            name: name.to_string(),
            target: "daily".to_string(),
            category: "health".to_string(),
            reminder_time: None,
        }
    }

    fn meal_on(date: &str, calories: f64) -> NewMeal {
        NewMeal {
            meal_type: "lunch".to_string(),
            time: "12:00".to_string(),
            date: d(date),
            foods: vec![NewFood {
                name: "Bowl".to_string(),
                portion: "1".to_string(),
                calories,
                protein: 30.0,
                carbs: 40.0,
                fat: 10.0,
            }],
        }
    }

    fn workout_on(date: &str, exercise: &str, weights: &[&str]) -> NewWorkout {
        NewWorkout {
            name: "Session".to_string(),
            date: d(date),
            duration: "45 min".to_string(),
            notes: String::new(),
            exercises: vec![NewExercise {
                name: exercise.to_string(),
                sets: weights
                    .iter()
                    .map(|w| NewExerciseSet {
                        reps: "8".to_string(),
                        weight: (*w).to_string(),
                    })
                    .collect(),
            }],
        }
    }

    #[test]
    fn test_add_habit_validates() {
        let svc = service();
        assert!(svc.add_habit("alice", &habit("Read")).is_ok());
        assert!(svc.add_habit("alice", &habit("  ")).is_err());
    }

    #[test]
    fn test_list_habits_with_status() {
        let svc = service();
        let h = svc.add_habit("alice", &habit("Read")).unwrap();
        svc.add_habit("alice", &habit("Run")).unwrap();

        let today = d("2024-05-05");
        svc.toggle_habit("alice", h.id, today, true).unwrap();
        svc.toggle_habit("alice", h.id, d("2024-05-04"), true).unwrap();

        let statuses = svc.list_habits_with_status("alice", today).unwrap();
        assert_eq!(statuses.len(), 2);

        let read = statuses.iter().find(|s| s.habit.name == "Read").unwrap();
        assert!(read.completed);
        assert_eq!(read.streak, 2);
        assert_eq!(read.completed_days, vec![4, 5]);

        let run = statuses.iter().find(|s| s.habit.name == "Run").unwrap();
        assert!(!run.completed);
        assert_eq!(run.streak, 0);
        assert!(run.completed_days.is_empty());
    }

    #[test]
    fn test_toggle_habit_unknown_or_foreign() {
        let svc = service();
        let h = svc.add_habit("alice", &habit("Read")).unwrap();

        assert!(!svc.toggle_habit("alice", 999, d("2024-05-05"), true).unwrap());
        assert!(!svc.toggle_habit("bob", h.id, d("2024-05-05"), true).unwrap());
    }

    #[test]
    fn test_habit_stats() {
        let svc = service();
        let h1 = svc.add_habit("alice", &habit("Read")).unwrap();
        let h2 = svc.add_habit("alice", &habit("Run")).unwrap();

        let today = d("2024-06-15");
        svc.toggle_habit("alice", h1.id, today, true).unwrap();
        svc.toggle_habit("alice", h1.id, d("2024-06-14"), true).unwrap();
        svc.toggle_habit("alice", h2.id, d("2024-06-14"), true).unwrap();
        // Outside the month, must not count toward monthly consistency.
        svc.toggle_habit("alice", h1.id, d("2024-05-31"), true).unwrap();

        let stats = svc.habit_stats("alice", today).unwrap();
        assert_eq!(stats.total_habits, 2);
        assert_eq!(stats.completed_today, 1);
        assert_eq!(stats.completion_rate, 50);
        // 3 completions / (2 habits x 30 days) = 5%
        assert_eq!(stats.monthly_completion_rate, 5);
    }

    #[test]
    fn test_habit_stats_empty_profile() {
        let svc = service();
        let stats = svc.habit_stats("alice", d("2024-06-15")).unwrap();
        assert_eq!(stats.total_habits, 0);
        assert_eq!(stats.completion_rate, 0);
        assert_eq!(stats.monthly_completion_rate, 0);
    }

    #[test]
    fn test_log_meal_normalizes_type() {
        let svc = service();
        let mut meal = meal_on("2024-05-05", 500.0);
        meal.meal_type = "Lunch".to_string();
        let logged = svc.log_meal("alice", &meal).unwrap();
        assert_eq!(logged.meal.meal_type, "lunch");

        meal.meal_type = "brunch".to_string();
        assert!(svc.log_meal("alice", &meal).is_err());
    }

    #[test]
    fn test_nutrition_summary_defaults_and_custom_goals() {
        let svc = service();
        let date = d("2024-05-05");
        svc.log_meal("alice", &meal_on("2024-05-05", 600.0)).unwrap();
        svc.log_meal("alice", &meal_on("2024-05-05", 600.0)).unwrap();

        let summary = svc.nutrition_summary("alice", date).unwrap();
        assert!((summary.calories.current - 1200.0).abs() < 0.01);
        assert_eq!(summary.calories.percentage, 50); // of the default 2400

        svc.set_nutrition_goals(
            "alice",
            &NutritionGoals {
                calories: 1200.0,
                ..NutritionGoals::default()
            },
        )
        .unwrap();
        let summary = svc.nutrition_summary("alice", date).unwrap();
        assert_eq!(summary.calories.percentage, 100);

        // Goals are per profile.
        let goals = svc.get_nutrition_goals("bob").unwrap();
        assert!((goals.calories - 2400.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_set_nutrition_goals_rejects_zero() {
        let svc = service();
        let bad = NutritionGoals {
            protein: 0.0,
            ..NutritionGoals::default()
        };
        assert!(svc.set_nutrition_goals("alice", &bad).is_err());
    }

    #[test]
    fn test_exercise_progress_series() {
        let svc = service();
        svc.add_workout("alice", &workout_on("2024-05-03", "Bench Press", &["100", "105"]))
            .unwrap();
        svc.add_workout("alice", &workout_on("2024-05-01", "Bench Press", &["95"]))
            .unwrap();
        svc.add_workout("alice", &workout_on("2024-05-02", "Squat", &["140"]))
            .unwrap();
        // Bodyweight set with no parseable weight is skipped.
        svc.add_workout("alice", &workout_on("2024-05-05", "Bench Press", &["bodyweight"]))
            .unwrap();

        let points = svc.exercise_progress("alice", "bench press").unwrap();
        let series: Vec<(&str, f64)> = points
            .iter()
            .map(|p| (p.date.as_str(), p.max_weight))
            .collect();
        assert_eq!(series, vec![("2024-05-01", 95.0), ("2024-05-03", 105.0)]);
    }

    #[test]
    fn test_exercise_progress_scoped_to_profile() {
        let svc = service();
        svc.add_workout("bob", &workout_on("2024-05-01", "Bench Press", &["95"]))
            .unwrap();
        assert!(svc.exercise_progress("alice", "Bench Press").unwrap().is_empty());
    }

    #[test]
    fn test_update_and_delete_scoping() {
        let svc = service();
        let h = svc.add_habit("alice", &habit("Read")).unwrap();
        assert!(!svc.update_habit("bob", h.id, &habit("Write")).unwrap());
        assert!(!svc.delete_habit("bob", h.id).unwrap());
        assert!(svc.delete_habit("alice", h.id).unwrap());
    }
}
