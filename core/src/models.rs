use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::Serialize;

// --- Habits ---

#[derive(Debug, Clone, Serialize)]
pub struct Habit {
    pub id: i64,
    pub uuid: String,
    pub user_id: String,
    pub name: String,
    pub target: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_time: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewHabit {
    pub name: String,
    pub target: String,
    pub category: String,
    pub reminder_time: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HabitCompletion {
    pub id: i64,
    pub habit_id: i64,
    pub date: String,
    pub completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// A habit enriched with its computed status for one calendar day:
/// whether it was completed that day, the current streak, and the
/// days of that month with a completion (for calendar views).
#[derive(Debug, Clone, Serialize)]
pub struct HabitStatus {
    pub habit: Habit,
    pub completed: bool,
    pub streak: i64,
    pub completed_days: Vec<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HabitStats {
    pub total_habits: i64,
    pub completed_today: i64,
    pub completion_rate: i64,
    pub monthly_completion_rate: i64,
}

// --- Meals ---

#[derive(Debug, Clone, Serialize)]
pub struct Meal {
    pub id: i64,
    pub uuid: String,
    pub user_id: String,
    pub meal_type: String,
    pub time: String,
    pub date: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Food {
    pub id: i64,
    pub meal_id: i64,
    pub name: String,
    pub portion: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

#[derive(Debug, Clone)]
pub struct NewMeal {
    pub meal_type: String,
    pub time: String,
    pub date: NaiveDate,
    pub foods: Vec<NewFood>,
}

#[derive(Debug, Clone)]
pub struct NewFood {
    pub name: String,
    pub portion: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// A meal with its foods attached and the per-meal calorie total computed.
#[derive(Debug, Clone, Serialize)]
pub struct MealDetail {
    pub meal: Meal,
    pub foods: Vec<Food>,
    pub total_calories: f64,
}

// --- Nutrition ---

#[derive(Debug, Clone, Copy, Serialize)]
pub struct NutritionGoals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl Default for NutritionGoals {
    fn default() -> Self {
        Self {
            calories: 2400.0,
            protein: 150.0,
            carbs: 250.0,
            fat: 80.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MacroProgress {
    pub current: f64,
    pub goal: f64,
    pub percentage: i64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct NutritionSummary {
    pub calories: MacroProgress,
    pub protein: MacroProgress,
    pub carbs: MacroProgress,
    pub fat: MacroProgress,
}

// --- Workouts ---

#[derive(Debug, Clone, Serialize)]
pub struct Workout {
    pub id: i64,
    pub uuid: String,
    pub user_id: String,
    pub name: String,
    pub date: String,
    pub duration: String,
    pub notes: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExerciseSet {
    pub id: i64,
    pub set_number: i64,
    pub reps: String,
    pub weight: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Exercise {
    pub id: i64,
    pub workout_id: i64,
    pub name: String,
    pub sets: Vec<ExerciseSet>,
}

#[derive(Debug, Clone)]
pub struct NewWorkout {
    pub name: String,
    pub date: NaiveDate,
    pub duration: String,
    pub notes: String,
    pub exercises: Vec<NewExercise>,
}

#[derive(Debug, Clone)]
pub struct NewExercise {
    pub name: String,
    pub sets: Vec<NewExerciseSet>,
}

#[derive(Debug, Clone)]
pub struct NewExerciseSet {
    pub reps: String,
    pub weight: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkoutDetail {
    pub workout: Workout,
    pub exercises: Vec<Exercise>,
}

/// One data point for an exercise progress series: the heaviest
/// parseable set weight logged on a given workout date.
#[derive(Debug, Clone, Serialize)]
pub struct ExerciseProgressPoint {
    pub date: String,
    pub max_weight: f64,
}

// --- Validation ---

pub const MEAL_TYPES: &[&str] = &["breakfast", "lunch", "dinner", "snack"];

pub fn validate_meal_type(meal: &str) -> Result<String> {
    let lower = meal.to_lowercase();
    if MEAL_TYPES.contains(&lower.as_str()) {
        Ok(lower)
    } else {
        bail!(
            "Invalid meal type '{meal}'. Must be one of: {}",
            MEAL_TYPES.join(", ")
        )
    }
}

/// Validate habit input: name, target, and category must not be empty,
/// and a reminder time (when given) must be HH:MM.
pub fn validate_habit_data(habit: &NewHabit) -> Result<()> {
    if habit.name.trim().is_empty() {
        bail!("Habit name must not be empty");
    }
    if habit.target.trim().is_empty() {
        bail!("Habit target must not be empty");
    }
    if habit.category.trim().is_empty() {
        bail!("Habit category must not be empty");
    }
    if let Some(time) = &habit.reminder_time {
        chrono::NaiveTime::parse_from_str(time, "%H:%M")
            .map_err(|_| anyhow::anyhow!("Invalid reminder time '{time}'. Must be HH:MM"))?;
    }
    Ok(())
}

/// Validate food input: name must not be empty, macros must not be negative.
pub fn validate_food_data(food: &NewFood) -> Result<()> {
    if food.name.trim().is_empty() {
        bail!("Food name must not be empty");
    }
    for (label, value) in [
        ("calories", food.calories),
        ("protein", food.protein),
        ("carbs", food.carbs),
        ("fat", food.fat),
    ] {
        if value < 0.0 {
            bail!("Food {label} must not be negative");
        }
    }
    Ok(())
}

/// Validate workout input: name must not be empty, every exercise needs a
/// name and at least one set.
pub fn validate_workout_data(workout: &NewWorkout) -> Result<()> {
    if workout.name.trim().is_empty() {
        bail!("Workout name must not be empty");
    }
    for exercise in &workout.exercises {
        if exercise.name.trim().is_empty() {
            bail!("Exercise name must not be empty");
        }
        if exercise.sets.is_empty() {
            bail!("Exercise '{}' must have at least one set", exercise.name);
        }
    }
    Ok(())
}

pub fn validate_nutrition_goals(goals: &NutritionGoals) -> Result<()> {
    for (label, value) in [
        ("calories", goals.calories),
        ("protein", goals.protein),
        ("carbs", goals.carbs),
        ("fat", goals.fat),
    ] {
        if value <= 0.0 {
            bail!("Goal {label} must be greater than 0");
        }
    }
    Ok(())
}
