use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

use crate::models::{
    Exercise, ExerciseSet, Food, Habit, HabitCompletion, Meal, MealDetail, NewFood, NewHabit,
    NewMeal, NewWorkout, Workout, WorkoutDetail,
};

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        // Child rows are removed through ON DELETE CASCADE, which SQLite
        // only honors with this pragma set.
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS habits (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    uuid TEXT NOT NULL UNIQUE,
                    user_id TEXT NOT NULL,
                    name TEXT NOT NULL,
                    target TEXT NOT NULL,
                    category TEXT NOT NULL,
                    reminder_time TEXT,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS habit_completions (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    habit_id INTEGER NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
                    date TEXT NOT NULL,
                    completed INTEGER NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    UNIQUE(habit_id, date)
                );

                CREATE TABLE IF NOT EXISTS meals (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    uuid TEXT NOT NULL UNIQUE,
                    user_id TEXT NOT NULL,
                    meal_type TEXT NOT NULL,
                    time TEXT NOT NULL,
                    date TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS foods (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    meal_id INTEGER NOT NULL REFERENCES meals(id) ON DELETE CASCADE,
                    name TEXT NOT NULL,
                    portion TEXT NOT NULL,
                    calories REAL NOT NULL,
                    protein REAL NOT NULL,
                    carbs REAL NOT NULL,
                    fat REAL NOT NULL
                );

                CREATE TABLE IF NOT EXISTS workouts (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    uuid TEXT NOT NULL UNIQUE,
                    user_id TEXT NOT NULL,
                    name TEXT NOT NULL,
                    date TEXT NOT NULL,
                    duration TEXT NOT NULL DEFAULT '',
                    notes TEXT NOT NULL DEFAULT '',
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS exercises (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    workout_id INTEGER NOT NULL REFERENCES workouts(id) ON DELETE CASCADE,
                    name TEXT NOT NULL,
                    sets INTEGER NOT NULL DEFAULT 0,
                    reps TEXT NOT NULL DEFAULT '',
                    weight TEXT NOT NULL DEFAULT ''
                );

                CREATE INDEX IF NOT EXISTS idx_habits_user ON habits(user_id);
                CREATE INDEX IF NOT EXISTS idx_completions_habit ON habit_completions(habit_id);
                CREATE INDEX IF NOT EXISTS idx_meals_user_date ON meals(user_id, date);
                CREATE INDEX IF NOT EXISTS idx_foods_meal ON foods(meal_id);
                CREATE INDEX IF NOT EXISTS idx_workouts_user_date ON workouts(user_id, date);
                CREATE INDEX IF NOT EXISTS idx_exercises_workout ON exercises(workout_id);

                PRAGMA user_version = 1;",
            )?;
        }

        if version < 2 {
            // Normalized per-set rows. Exercises written before this table
            // existed keep their scalar sets/reps/weight columns; the read
            // path synthesizes set rows from them.
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS exercise_sets (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    exercise_id INTEGER NOT NULL REFERENCES exercises(id) ON DELETE CASCADE,
                    set_number INTEGER NOT NULL,
                    reps TEXT NOT NULL,
                    weight TEXT NOT NULL DEFAULT ''
                );

                CREATE INDEX IF NOT EXISTS idx_sets_exercise ON exercise_sets(exercise_id);

                PRAGMA user_version = 2;",
            )?;
        }

        if version < 3 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS profile_settings (
                    user_id TEXT NOT NULL,
                    key TEXT NOT NULL,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    UNIQUE(user_id, key)
                );

                PRAGMA user_version = 3;",
            )?;
        }

        Ok(())
    }

    // --- Row mapping helpers ---

    fn habit_from_row(row: &rusqlite::Row) -> rusqlite::Result<Habit> {
        Ok(Habit {
            id: row.get(0)?,
            uuid: row.get(1)?,
            user_id: row.get(2)?,
            name: row.get(3)?,
            target: row.get(4)?,
            category: row.get(5)?,
            reminder_time: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    fn meal_from_row(row: &rusqlite::Row) -> rusqlite::Result<Meal> {
        Ok(Meal {
            id: row.get(0)?,
            uuid: row.get(1)?,
            user_id: row.get(2)?,
            meal_type: row.get(3)?,
            time: row.get(4)?,
            date: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    fn food_from_row(row: &rusqlite::Row) -> rusqlite::Result<Food> {
        Ok(Food {
            id: row.get(0)?,
            meal_id: row.get(1)?,
            name: row.get(2)?,
            portion: row.get(3)?,
            calories: row.get(4)?,
            protein: row.get(5)?,
            carbs: row.get(6)?,
            fat: row.get(7)?,
        })
    }

    fn workout_from_row(row: &rusqlite::Row) -> rusqlite::Result<Workout> {
        Ok(Workout {
            id: row.get(0)?,
            uuid: row.get(1)?,
            user_id: row.get(2)?,
            name: row.get(3)?,
            date: row.get(4)?,
            duration: row.get(5)?,
            notes: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    // --- Habits ---

    pub fn insert_habit(&self, user_id: &str, habit: &NewHabit) -> Result<Habit> {
        let now = Local::now().to_rfc3339();
        let uuid = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO habits (uuid, user_id, name, target, category, reminder_time, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                uuid,
                user_id,
                habit.name,
                habit.target,
                habit.category,
                habit.reminder_time,
                now,
                now,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_habit(user_id, id)?
            .context("Habit not found after insert")
    }

    /// A habit scoped to its owner. A habit owned by someone else reads
    /// the same as one that does not exist.
    pub fn get_habit(&self, user_id: &str, id: i64) -> Result<Option<Habit>> {
        self.conn
            .query_row(
                "SELECT id, uuid, user_id, name, target, category, reminder_time, created_at, updated_at
                 FROM habits WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
                Self::habit_from_row,
            )
            .optional()
            .context("Failed to load habit")
    }

    pub fn list_habits(&self, user_id: &str) -> Result<Vec<Habit>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, uuid, user_id, name, target, category, reminder_time, created_at, updated_at
             FROM habits WHERE user_id = ?1 ORDER BY id",
        )?;
        let habits = stmt
            .query_map(params![user_id], Self::habit_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(habits)
    }

    pub fn update_habit(&self, user_id: &str, id: i64, habit: &NewHabit) -> Result<bool> {
        let now = Local::now().to_rfc3339();
        let rows = self.conn.execute(
            "UPDATE habits SET name = ?1, target = ?2, category = ?3, reminder_time = ?4, updated_at = ?5
             WHERE id = ?6 AND user_id = ?7",
            params![
                habit.name,
                habit.target,
                habit.category,
                habit.reminder_time,
                now,
                id,
                user_id,
            ],
        )?;
        Ok(rows > 0)
    }

    pub fn delete_habit(&self, user_id: &str, id: i64) -> Result<bool> {
        let rows = self.conn.execute(
            "DELETE FROM habits WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(rows > 0)
    }

    /// Upsert the completion record for (habit, date). At most one row per
    /// day exists; toggling twice updates in place rather than inserting.
    pub fn toggle_completion(
        &self,
        habit_id: i64,
        date: NaiveDate,
        completed: bool,
    ) -> Result<HabitCompletion> {
        let now = Local::now().to_rfc3339();
        let date_str = date.format("%Y-%m-%d").to_string();
        self.conn.execute(
            "INSERT INTO habit_completions (habit_id, date, completed, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             ON CONFLICT(habit_id, date)
             DO UPDATE SET completed = excluded.completed, updated_at = excluded.updated_at",
            params![habit_id, date_str, completed, now],
        )?;
        self.conn
            .query_row(
                "SELECT id, habit_id, date, completed, created_at, updated_at
                 FROM habit_completions WHERE habit_id = ?1 AND date = ?2",
                params![habit_id, date_str],
                |row| {
                    Ok(HabitCompletion {
                        id: row.get(0)?,
                        habit_id: row.get(1)?,
                        date: row.get(2)?,
                        completed: row.get(3)?,
                        created_at: row.get(4)?,
                        updated_at: row.get(5)?,
                    })
                },
            )
            .context("Completion not found after upsert")
    }

    /// All dates with a true completion for one habit, newest first, as
    /// raw strings. Parsing and streak math happen in the stats layer.
    pub fn completion_dates(&self, habit_id: i64) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT date FROM habit_completions
             WHERE habit_id = ?1 AND completed = 1
             ORDER BY date DESC",
        )?;
        let dates = stmt
            .query_map(params![habit_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(dates)
    }

    pub fn completed_on(&self, habit_id: i64, date: NaiveDate) -> Result<bool> {
        let date_str = date.format("%Y-%m-%d").to_string();
        let completed: Option<bool> = self
            .conn
            .query_row(
                "SELECT completed FROM habit_completions WHERE habit_id = ?1 AND date = ?2",
                params![habit_id, date_str],
                |row| row.get(0),
            )
            .optional()?;
        Ok(completed.unwrap_or(false))
    }

    /// Count of true completions across all of a user's habits for one day.
    pub fn count_completions_on(&self, user_id: &str, date: NaiveDate) -> Result<i64> {
        let date_str = date.format("%Y-%m-%d").to_string();
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM habit_completions hc
             JOIN habits h ON hc.habit_id = h.id
             WHERE h.user_id = ?1 AND hc.date = ?2 AND hc.completed = 1",
            params![user_id, date_str],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Count of true completions across all of a user's habits inside an
    /// inclusive date range.
    pub fn count_completions_in_range(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<i64> {
        let start_str = start.format("%Y-%m-%d").to_string();
        let end_str = end.format("%Y-%m-%d").to_string();
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM habit_completions hc
             JOIN habits h ON hc.habit_id = h.id
             WHERE h.user_id = ?1 AND hc.date >= ?2 AND hc.date <= ?3 AND hc.completed = 1",
            params![user_id, start_str, end_str],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn count_habits(&self, user_id: &str) -> Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM habits WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // --- Meals ---

    pub fn insert_meal(&self, user_id: &str, meal: &NewMeal) -> Result<MealDetail> {
        let now = Local::now().to_rfc3339();
        let uuid = Uuid::new_v4().to_string();
        let date_str = meal.date.format("%Y-%m-%d").to_string();
        self.conn.execute(
            "INSERT INTO meals (uuid, user_id, meal_type, time, date, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![uuid, user_id, meal.meal_type, meal.time, date_str, now, now],
        )?;
        let id = self.conn.last_insert_rowid();
        self.insert_foods(id, &meal.foods)?;
        self.get_meal(user_id, id)?
            .context("Meal not found after insert")
    }

    fn insert_foods(&self, meal_id: i64, foods: &[NewFood]) -> Result<()> {
        let mut stmt = self.conn.prepare(
            "INSERT INTO foods (meal_id, name, portion, calories, protein, carbs, fat)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for food in foods {
            stmt.execute(params![
                meal_id,
                food.name,
                food.portion,
                food.calories,
                food.protein,
                food.carbs,
                food.fat,
            ])?;
        }
        Ok(())
    }

    fn foods_for_meal(&self, meal_id: i64) -> Result<Vec<Food>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, meal_id, name, portion, calories, protein, carbs, fat
             FROM foods WHERE meal_id = ?1 ORDER BY id",
        )?;
        let foods = stmt
            .query_map(params![meal_id], Self::food_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(foods)
    }

    fn meal_detail(&self, meal: Meal) -> Result<MealDetail> {
        let foods = self.foods_for_meal(meal.id)?;
        let total_calories = foods.iter().map(|f| f.calories).sum();
        Ok(MealDetail {
            meal,
            foods,
            total_calories,
        })
    }

    pub fn get_meal(&self, user_id: &str, id: i64) -> Result<Option<MealDetail>> {
        let meal = self
            .conn
            .query_row(
                "SELECT id, uuid, user_id, meal_type, time, date, created_at, updated_at
                 FROM meals WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
                Self::meal_from_row,
            )
            .optional()
            .context("Failed to load meal")?;
        match meal {
            Some(meal) => Ok(Some(self.meal_detail(meal)?)),
            None => Ok(None),
        }
    }

    pub fn list_meals(&self, user_id: &str) -> Result<Vec<MealDetail>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, uuid, user_id, meal_type, time, date, created_at, updated_at
             FROM meals WHERE user_id = ?1 ORDER BY date DESC, id DESC",
        )?;
        let meals = stmt
            .query_map(params![user_id], Self::meal_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        meals.into_iter().map(|m| self.meal_detail(m)).collect()
    }

    /// Replace a meal's scalar fields and its full food list. Children are
    /// deleted and recreated, not diffed.
    pub fn update_meal(&self, user_id: &str, id: i64, meal: &NewMeal) -> Result<bool> {
        let now = Local::now().to_rfc3339();
        let date_str = meal.date.format("%Y-%m-%d").to_string();
        let rows = self.conn.execute(
            "UPDATE meals SET meal_type = ?1, time = ?2, date = ?3, updated_at = ?4
             WHERE id = ?5 AND user_id = ?6",
            params![meal.meal_type, meal.time, date_str, now, id, user_id],
        )?;
        if rows == 0 {
            return Ok(false);
        }
        self.conn
            .execute("DELETE FROM foods WHERE meal_id = ?1", params![id])?;
        self.insert_foods(id, &meal.foods)?;
        Ok(true)
    }

    pub fn delete_meal(&self, user_id: &str, id: i64) -> Result<bool> {
        let rows = self.conn.execute(
            "DELETE FROM meals WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(rows > 0)
    }

    /// All foods across a user's meals for one date, for daily rollups.
    pub fn foods_for_date(&self, user_id: &str, date: NaiveDate) -> Result<Vec<Food>> {
        let date_str = date.format("%Y-%m-%d").to_string();
        let mut stmt = self.conn.prepare(
            "SELECT f.id, f.meal_id, f.name, f.portion, f.calories, f.protein, f.carbs, f.fat
             FROM foods f
             JOIN meals m ON f.meal_id = m.id
             WHERE m.user_id = ?1 AND m.date = ?2
             ORDER BY f.id",
        )?;
        let foods = stmt
            .query_map(params![user_id, date_str], Self::food_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(foods)
    }

    pub fn meals_for_date(&self, user_id: &str, date: NaiveDate) -> Result<Vec<MealDetail>> {
        let date_str = date.format("%Y-%m-%d").to_string();
        let mut stmt = self.conn.prepare(
            "SELECT id, uuid, user_id, meal_type, time, date, created_at, updated_at
             FROM meals WHERE user_id = ?1 AND date = ?2 ORDER BY time, id",
        )?;
        let meals = stmt
            .query_map(params![user_id, date_str], Self::meal_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        meals.into_iter().map(|m| self.meal_detail(m)).collect()
    }

    // --- Workouts ---

    pub fn insert_workout(&self, user_id: &str, workout: &NewWorkout) -> Result<WorkoutDetail> {
        let now = Local::now().to_rfc3339();
        let uuid = Uuid::new_v4().to_string();
        let date_str = workout.date.format("%Y-%m-%d").to_string();
        self.conn.execute(
            "INSERT INTO workouts (uuid, user_id, name, date, duration, notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                uuid,
                user_id,
                workout.name,
                date_str,
                workout.duration,
                workout.notes,
                now,
                now,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.insert_exercises(id, workout)?;
        self.get_workout(user_id, id)?
            .context("Workout not found after insert")
    }

    fn insert_exercises(&self, workout_id: i64, workout: &NewWorkout) -> Result<()> {
        for exercise in &workout.exercises {
            self.conn.execute(
                "INSERT INTO exercises (workout_id, name, sets) VALUES (?1, ?2, ?3)",
                params![workout_id, exercise.name, exercise.sets.len() as i64],
            )?;
            let exercise_id = self.conn.last_insert_rowid();
            let mut stmt = self.conn.prepare(
                "INSERT INTO exercise_sets (exercise_id, set_number, reps, weight)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (index, set) in exercise.sets.iter().enumerate() {
                stmt.execute(params![
                    exercise_id,
                    index as i64 + 1,
                    set.reps,
                    set.weight,
                ])?;
            }
        }
        Ok(())
    }

    fn exercises_for_workout(&self, workout_id: i64) -> Result<Vec<Exercise>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, workout_id, name, sets, reps, weight
             FROM exercises WHERE workout_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![workout_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut exercises = Vec::with_capacity(rows.len());
        for (id, workout_id, name, legacy_sets, legacy_reps, legacy_weight) in rows {
            let mut sets = self.sets_for_exercise(id)?;
            if sets.is_empty() && legacy_sets > 0 {
                // Row predates the exercise_sets table: synthesize the set
                // list from the scalar columns here, so nothing above the
                // gateway ever sees the legacy shape.
                sets = (1..=legacy_sets)
                    .map(|n| ExerciseSet {
                        id: 0,
                        set_number: n,
                        reps: legacy_reps.clone(),
                        weight: legacy_weight.clone(),
                    })
                    .collect();
            }
            exercises.push(Exercise {
                id,
                workout_id,
                name,
                sets,
            });
        }
        Ok(exercises)
    }

    fn sets_for_exercise(&self, exercise_id: i64) -> Result<Vec<ExerciseSet>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, set_number, reps, weight
             FROM exercise_sets WHERE exercise_id = ?1 ORDER BY set_number",
        )?;
        let sets = stmt
            .query_map(params![exercise_id], |row| {
                Ok(ExerciseSet {
                    id: row.get(0)?,
                    set_number: row.get(1)?,
                    reps: row.get(2)?,
                    weight: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sets)
    }

    fn workout_detail(&self, workout: Workout) -> Result<WorkoutDetail> {
        let exercises = self.exercises_for_workout(workout.id)?;
        Ok(WorkoutDetail { workout, exercises })
    }

    pub fn get_workout(&self, user_id: &str, id: i64) -> Result<Option<WorkoutDetail>> {
        let workout = self
            .conn
            .query_row(
                "SELECT id, uuid, user_id, name, date, duration, notes, created_at, updated_at
                 FROM workouts WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
                Self::workout_from_row,
            )
            .optional()
            .context("Failed to load workout")?;
        match workout {
            Some(workout) => Ok(Some(self.workout_detail(workout)?)),
            None => Ok(None),
        }
    }

    pub fn list_workouts(&self, user_id: &str, limit: Option<i64>) -> Result<Vec<WorkoutDetail>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, uuid, user_id, name, date, duration, notes, created_at, updated_at
             FROM workouts WHERE user_id = ?1 ORDER BY date DESC, id DESC LIMIT ?2",
        )?;
        let workouts = stmt
            .query_map(params![user_id, limit.unwrap_or(-1)], Self::workout_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        workouts
            .into_iter()
            .map(|w| self.workout_detail(w))
            .collect()
    }

    /// Replace a workout's scalar fields and its full exercise tree.
    /// Exercises and their sets are deleted and recreated, not diffed.
    pub fn update_workout(&self, user_id: &str, id: i64, workout: &NewWorkout) -> Result<bool> {
        let now = Local::now().to_rfc3339();
        let date_str = workout.date.format("%Y-%m-%d").to_string();
        let rows = self.conn.execute(
            "UPDATE workouts SET name = ?1, date = ?2, duration = ?3, notes = ?4, updated_at = ?5
             WHERE id = ?6 AND user_id = ?7",
            params![
                workout.name,
                date_str,
                workout.duration,
                workout.notes,
                now,
                id,
                user_id,
            ],
        )?;
        if rows == 0 {
            return Ok(false);
        }
        // Cascade removes the exercise_sets rows with their exercises.
        self.conn
            .execute("DELETE FROM exercises WHERE workout_id = ?1", params![id])?;
        self.insert_exercises(id, workout)?;
        Ok(true)
    }

    pub fn delete_workout(&self, user_id: &str, id: i64) -> Result<bool> {
        let rows = self.conn.execute(
            "DELETE FROM workouts WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(rows > 0)
    }

    // --- Profile settings ---

    pub fn set_setting(&self, user_id: &str, key: &str, value: &str) -> Result<()> {
        let now = Local::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO profile_settings (user_id, key, value, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![user_id, key, value, now],
        )?;
        Ok(())
    }

    pub fn get_setting(&self, user_id: &str, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM profile_settings WHERE user_id = ?1 AND key = ?2",
                params![user_id, key],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to load setting")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewExercise, NewExerciseSet};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample_habit() -> NewHabit {
        NewHabit {
            name: "Meditate".to_string(),
            target: "10 minutes".to_string(),
            category: "mindfulness".to_string(),
            reminder_time: Some("07:00".to_string()),
        }
    }

    fn sample_meal() -> NewMeal {
        NewMeal {
            meal_type: "lunch".to_string(),
            time: "12:30".to_string(),
            date: d("2024-05-05"),
            foods: vec![
                NewFood {
                    name: "Chicken Wrap".to_string(),
                    portion: "1 wrap".to_string(),
                    calories: 500.0,
                    protein: 30.0,
                    carbs: 40.0,
                    fat: 10.0,
                },
                NewFood {
                    name: "Apple".to_string(),
                    portion: "1 medium".to_string(),
                    calories: 95.0,
                    protein: 0.5,
                    carbs: 25.0,
                    fat: 0.3,
                },
            ],
        }
    }

    fn sample_workout() -> NewWorkout {
        NewWorkout {
            name: "Push Day".to_string(),
            date: d("2024-05-05"),
            duration: "60 min".to_string(),
            notes: "Felt strong".to_string(),
            exercises: vec![NewExercise {
                name: "Bench Press".to_string(),
                sets: vec![
                    NewExerciseSet {
                        reps: "8".to_string(),
                        weight: "100".to_string(),
                    },
                    NewExerciseSet {
                        reps: "6-8".to_string(),
                        weight: "105".to_string(),
                    },
                ],
            }],
        }
    }

    #[test]
    fn test_insert_and_get_habit() {
        let db = Database::open_in_memory().unwrap();
        let habit = db.insert_habit("alice", &sample_habit()).unwrap();

        assert_eq!(habit.name, "Meditate");
        assert_eq!(habit.user_id, "alice");
        assert_eq!(habit.reminder_time.as_deref(), Some("07:00"));
        assert!(!habit.uuid.is_empty());

        let fetched = db.get_habit("alice", habit.id).unwrap().unwrap();
        assert_eq!(fetched.id, habit.id);
    }

    #[test]
    fn test_get_habit_wrong_owner_is_none() {
        let db = Database::open_in_memory().unwrap();
        let habit = db.insert_habit("alice", &sample_habit()).unwrap();

        // Same id, different owner: reads as absent, not as an auth error.
        assert!(db.get_habit("bob", habit.id).unwrap().is_none());
    }

    #[test]
    fn test_list_habits_scoped_to_owner() {
        let db = Database::open_in_memory().unwrap();
        db.insert_habit("alice", &sample_habit()).unwrap();
        db.insert_habit("alice", &sample_habit()).unwrap();
        db.insert_habit("bob", &sample_habit()).unwrap();

        assert_eq!(db.list_habits("alice").unwrap().len(), 2);
        assert_eq!(db.list_habits("bob").unwrap().len(), 1);
        assert!(db.list_habits("carol").unwrap().is_empty());
    }

    #[test]
    fn test_update_habit() {
        let db = Database::open_in_memory().unwrap();
        let habit = db.insert_habit("alice", &sample_habit()).unwrap();

        let mut updated = sample_habit();
        updated.name = "Meditate Daily".to_string();
        updated.reminder_time = None;
        assert!(db.update_habit("alice", habit.id, &updated).unwrap());

        let fetched = db.get_habit("alice", habit.id).unwrap().unwrap();
        assert_eq!(fetched.name, "Meditate Daily");
        assert!(fetched.reminder_time.is_none());

        // Wrong owner updates nothing
        assert!(!db.update_habit("bob", habit.id, &updated).unwrap());
    }

    #[test]
    fn test_delete_habit_cascades_completions() {
        let db = Database::open_in_memory().unwrap();
        let habit = db.insert_habit("alice", &sample_habit()).unwrap();
        db.toggle_completion(habit.id, d("2024-05-05"), true)
            .unwrap();

        assert!(db.delete_habit("alice", habit.id).unwrap());
        assert!(db.get_habit("alice", habit.id).unwrap().is_none());
        assert!(db.completion_dates(habit.id).unwrap().is_empty());
    }

    #[test]
    fn test_toggle_completion_upserts() {
        let db = Database::open_in_memory().unwrap();
        let habit = db.insert_habit("alice", &sample_habit()).unwrap();
        let date = d("2024-05-05");

        let first = db.toggle_completion(habit.id, date, true).unwrap();
        let second = db.toggle_completion(habit.id, date, true).unwrap();

        // Same row both times, and exactly one completed date recorded.
        assert_eq!(first.id, second.id);
        assert_eq!(db.completion_dates(habit.id).unwrap(), vec!["2024-05-05"]);
    }

    #[test]
    fn test_toggle_completion_off() {
        let db = Database::open_in_memory().unwrap();
        let habit = db.insert_habit("alice", &sample_habit()).unwrap();
        let date = d("2024-05-05");

        db.toggle_completion(habit.id, date, true).unwrap();
        assert!(db.completed_on(habit.id, date).unwrap());

        db.toggle_completion(habit.id, date, false).unwrap();
        assert!(!db.completed_on(habit.id, date).unwrap());
        assert!(db.completion_dates(habit.id).unwrap().is_empty());
    }

    #[test]
    fn test_completion_counts() {
        let db = Database::open_in_memory().unwrap();
        let h1 = db.insert_habit("alice", &sample_habit()).unwrap();
        let h2 = db.insert_habit("alice", &sample_habit()).unwrap();
        let other = db.insert_habit("bob", &sample_habit()).unwrap();

        db.toggle_completion(h1.id, d("2024-05-05"), true).unwrap();
        db.toggle_completion(h2.id, d("2024-05-05"), true).unwrap();
        db.toggle_completion(h1.id, d("2024-05-10"), true).unwrap();
        db.toggle_completion(other.id, d("2024-05-05"), true)
            .unwrap();

        assert_eq!(db.count_completions_on("alice", d("2024-05-05")).unwrap(), 2);
        assert_eq!(
            db.count_completions_in_range("alice", d("2024-05-01"), d("2024-05-31"))
                .unwrap(),
            3
        );
        assert_eq!(db.count_habits("alice").unwrap(), 2);
    }

    #[test]
    fn test_insert_and_get_meal() {
        let db = Database::open_in_memory().unwrap();
        let meal = db.insert_meal("alice", &sample_meal()).unwrap();

        assert_eq!(meal.meal.meal_type, "lunch");
        assert_eq!(meal.foods.len(), 2);
        assert!((meal.total_calories - 595.0).abs() < 0.01);

        let fetched = db.get_meal("alice", meal.meal.id).unwrap().unwrap();
        assert_eq!(fetched.foods.len(), 2);
        assert!(db.get_meal("bob", meal.meal.id).unwrap().is_none());
    }

    #[test]
    fn test_update_meal_replaces_foods() {
        let db = Database::open_in_memory().unwrap();
        let meal = db.insert_meal("alice", &sample_meal()).unwrap();

        let mut updated = sample_meal();
        updated.meal_type = "dinner".to_string();
        updated.foods = vec![NewFood {
            name: "Salmon".to_string(),
            portion: "200g".to_string(),
            calories: 400.0,
            protein: 40.0,
            carbs: 0.0,
            fat: 25.0,
        }];
        assert!(db.update_meal("alice", meal.meal.id, &updated).unwrap());

        let fetched = db.get_meal("alice", meal.meal.id).unwrap().unwrap();
        assert_eq!(fetched.meal.meal_type, "dinner");
        assert_eq!(fetched.foods.len(), 1);
        assert_eq!(fetched.foods[0].name, "Salmon");
        assert!((fetched.total_calories - 400.0).abs() < 0.01);
    }

    #[test]
    fn test_update_meal_wrong_owner_leaves_foods() {
        let db = Database::open_in_memory().unwrap();
        let meal = db.insert_meal("alice", &sample_meal()).unwrap();

        let updated = NewMeal {
            foods: vec![],
            ..sample_meal()
        };
        assert!(!db.update_meal("bob", meal.meal.id, &updated).unwrap());

        let fetched = db.get_meal("alice", meal.meal.id).unwrap().unwrap();
        assert_eq!(fetched.foods.len(), 2);
    }

    #[test]
    fn test_delete_meal_cascades_foods() {
        let db = Database::open_in_memory().unwrap();
        let meal = db.insert_meal("alice", &sample_meal()).unwrap();

        assert!(db.delete_meal("alice", meal.meal.id).unwrap());
        assert!(db.get_meal("alice", meal.meal.id).unwrap().is_none());
        assert!(db.foods_for_date("alice", d("2024-05-05")).unwrap().is_empty());
    }

    #[test]
    fn test_foods_for_date_spans_meals() {
        let db = Database::open_in_memory().unwrap();
        db.insert_meal("alice", &sample_meal()).unwrap();
        let mut breakfast = sample_meal();
        breakfast.meal_type = "breakfast".to_string();
        breakfast.foods.truncate(1);
        db.insert_meal("alice", &breakfast).unwrap();

        let mut other_day = sample_meal();
        other_day.date = d("2024-05-06");
        db.insert_meal("alice", &other_day).unwrap();

        assert_eq!(db.foods_for_date("alice", d("2024-05-05")).unwrap().len(), 3);
        assert_eq!(db.meals_for_date("alice", d("2024-05-05")).unwrap().len(), 2);
    }

    #[test]
    fn test_insert_and_get_workout() {
        let db = Database::open_in_memory().unwrap();
        let workout = db.insert_workout("alice", &sample_workout()).unwrap();

        assert_eq!(workout.workout.name, "Push Day");
        assert_eq!(workout.exercises.len(), 1);
        let sets = &workout.exercises[0].sets;
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].set_number, 1);
        assert_eq!(sets[0].reps, "8");
        assert_eq!(sets[1].set_number, 2);
        assert_eq!(sets[1].weight, "105");

        assert!(db.get_workout("bob", workout.workout.id).unwrap().is_none());
    }

    #[test]
    fn test_list_workouts_newest_first_with_limit() {
        let db = Database::open_in_memory().unwrap();
        for day in ["2024-05-01", "2024-05-03", "2024-05-02"] {
            let mut w = sample_workout();
            w.date = d(day);
            db.insert_workout("alice", &w).unwrap();
        }

        let all = db.list_workouts("alice", None).unwrap();
        let dates: Vec<&str> = all.iter().map(|w| w.workout.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-05-03", "2024-05-02", "2024-05-01"]);

        assert_eq!(db.list_workouts("alice", Some(2)).unwrap().len(), 2);
    }

    #[test]
    fn test_update_workout_replaces_exercise_tree() {
        let db = Database::open_in_memory().unwrap();
        let workout = db.insert_workout("alice", &sample_workout()).unwrap();

        let mut updated = sample_workout();
        updated.exercises = vec![NewExercise {
            name: "Squat".to_string(),
            sets: vec![NewExerciseSet {
                reps: "5".to_string(),
                weight: "140".to_string(),
            }],
        }];
        assert!(db.update_workout("alice", workout.workout.id, &updated).unwrap());

        let fetched = db.get_workout("alice", workout.workout.id).unwrap().unwrap();
        assert_eq!(fetched.exercises.len(), 1);
        assert_eq!(fetched.exercises[0].name, "Squat");
        assert_eq!(fetched.exercises[0].sets.len(), 1);
    }

    #[test]
    fn test_delete_workout_cascades() {
        let db = Database::open_in_memory().unwrap();
        let workout = db.insert_workout("alice", &sample_workout()).unwrap();

        assert!(db.delete_workout("alice", workout.workout.id).unwrap());
        assert!(db.get_workout("alice", workout.workout.id).unwrap().is_none());

        let orphan_sets: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM exercise_sets", [], |row| row.get(0))
            .unwrap();
        assert_eq!(orphan_sets, 0);
    }

    #[test]
    fn test_legacy_exercise_rows_synthesize_sets() {
        let db = Database::open_in_memory().unwrap();
        let workout = db.insert_workout("alice", &sample_workout()).unwrap();

        // Simulate a row written before exercise_sets existed.
        db.conn
            .execute(
                "INSERT INTO exercises (workout_id, name, sets, reps, weight)
                 VALUES (?1, 'Curl', 3, '12', '20')",
                params![workout.workout.id],
            )
            .unwrap();

        let fetched = db.get_workout("alice", workout.workout.id).unwrap().unwrap();
        let legacy = fetched
            .exercises
            .iter()
            .find(|e| e.name == "Curl")
            .unwrap();
        assert_eq!(legacy.sets.len(), 3);
        assert_eq!(legacy.sets[0].set_number, 1);
        assert_eq!(legacy.sets[2].set_number, 3);
        assert!(legacy.sets.iter().all(|s| s.reps == "12" && s.weight == "20"));
    }

    #[test]
    fn test_settings_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_setting("alice", "goal_calories").unwrap().is_none());

        db.set_setting("alice", "goal_calories", "2200").unwrap();
        assert_eq!(
            db.get_setting("alice", "goal_calories").unwrap().as_deref(),
            Some("2200")
        );

        db.set_setting("alice", "goal_calories", "2000").unwrap();
        assert_eq!(
            db.get_setting("alice", "goal_calories").unwrap().as_deref(),
            Some("2000")
        );

        // Scoped per profile
        assert!(db.get_setting("bob", "goal_calories").unwrap().is_none());
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strive.db");
        {
            let db = Database::open(&path).unwrap();
            db.insert_habit("alice", &sample_habit()).unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert_eq!(db.list_habits("alice").unwrap().len(), 1);
    }
}
