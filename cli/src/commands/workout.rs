use std::process;

use anyhow::{Result, bail};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use strive_core::models::NewWorkout;
use strive_core::service::StriveService;

use super::helpers::{json_error, parse_date, parse_exercise_spec, truncate};

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_workout_add(
    svc: &StriveService,
    user: &str,
    name: &str,
    date: Option<String>,
    duration: Option<String>,
    notes: Option<String>,
    exercises: &[String],
    json: bool,
) -> Result<()> {
    if exercises.is_empty() {
        bail!("A workout needs at least one --exercise entry");
    }
    let workout = NewWorkout {
        name: name.to_string(),
        date: parse_date(date)?,
        duration: duration.unwrap_or_default(),
        notes: notes.unwrap_or_default(),
        exercises: exercises
            .iter()
            .map(|s| parse_exercise_spec(s))
            .collect::<Result<Vec<_>>>()?,
    };
    let added = svc.add_workout(user, &workout)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&added)?);
    } else {
        println!(
            "Added workout {} '{}' for {} ({} exercise(s))",
            added.workout.id,
            added.workout.name,
            added.workout.date,
            added.exercises.len()
        );
    }

    Ok(())
}

pub(crate) fn cmd_workout_list(
    svc: &StriveService,
    user: &str,
    limit: Option<i64>,
    json: bool,
) -> Result<()> {
    let workouts = svc.list_workouts(user, limit)?;

    if workouts.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No workouts found. Use `strive workout add` to record one.");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&workouts)?);
    } else {
        #[derive(Tabled)]
        struct WorkoutRow {
            #[tabled(rename = "ID")]
            id: i64,
            #[tabled(rename = "Date")]
            date: String,
            #[tabled(rename = "Workout")]
            name: String,
            #[tabled(rename = "Duration")]
            duration: String,
            #[tabled(rename = "Exercises")]
            exercises: usize,
        }

        let rows: Vec<WorkoutRow> = workouts
            .iter()
            .map(|w| WorkoutRow {
                id: w.workout.id,
                date: w.workout.date.clone(),
                name: truncate(&w.workout.name, 30),
                duration: w.workout.duration.clone(),
                exercises: w.exercises.len(),
            })
            .collect();

        let table = Table::new(&rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(4..5)).with(Alignment::right()))
            .to_string();
        println!("{table}");
    }

    Ok(())
}

pub(crate) fn cmd_workout_show(svc: &StriveService, user: &str, id: i64, json: bool) -> Result<()> {
    let Some(detail) = svc.get_workout(user, id)? else {
        if json {
            println!("{}", json_error(&format!("Workout {id} not found")));
        } else {
            eprintln!("Workout {id} not found");
        }
        process::exit(2);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
    } else {
        let w = &detail.workout;
        println!("Workout {}: {} on {}", w.id, w.name, w.date);
        if !w.duration.is_empty() {
            println!("  Duration: {}", w.duration);
        }
        if !w.notes.is_empty() {
            println!("  Notes: {}", w.notes);
        }
        for exercise in &detail.exercises {
            println!("  {}", exercise.name);
            for set in &exercise.sets {
                if set.weight.is_empty() {
                    println!("    Set {}: {} reps", set.set_number, set.reps);
                } else {
                    println!("    Set {}: {} reps @ {}", set.set_number, set.reps, set.weight);
                }
            }
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_workout_update(
    svc: &StriveService,
    user: &str,
    id: i64,
    name: Option<String>,
    date: Option<String>,
    duration: Option<String>,
    notes: Option<String>,
    exercises: &[String],
    json: bool,
) -> Result<()> {
    let Some(existing) = svc.get_workout(user, id)? else {
        if json {
            println!("{}", json_error(&format!("Workout {id} not found")));
        } else {
            eprintln!("Workout {id} not found");
        }
        process::exit(2);
    };

    // Omitted fields keep their stored values; passing any --exercise
    // replaces the whole exercise list.
    let new_exercises = if exercises.is_empty() {
        existing
            .exercises
            .iter()
            .map(|e| strive_core::models::NewExercise {
                name: e.name.clone(),
                sets: e
                    .sets
                    .iter()
                    .map(|s| strive_core::models::NewExerciseSet {
                        reps: s.reps.clone(),
                        weight: s.weight.clone(),
                    })
                    .collect(),
            })
            .collect()
    } else {
        exercises
            .iter()
            .map(|s| parse_exercise_spec(s))
            .collect::<Result<Vec<_>>>()?
    };

    let updated = NewWorkout {
        name: name.unwrap_or(existing.workout.name),
        date: match date {
            Some(_) => parse_date(date)?,
            None => parse_date(Some(existing.workout.date))?,
        },
        duration: duration.unwrap_or(existing.workout.duration),
        notes: notes.unwrap_or(existing.workout.notes),
        exercises: new_exercises,
    };
    svc.update_workout(user, id, &updated)?;

    let detail = svc
        .get_workout(user, id)?
        .ok_or_else(|| anyhow::anyhow!("Workout {id} disappeared during update"))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
    } else {
        println!(
            "Updated workout {} '{}' ({} exercise(s))",
            detail.workout.id,
            detail.workout.name,
            detail.exercises.len()
        );
    }

    Ok(())
}

pub(crate) fn cmd_workout_delete(
    svc: &StriveService,
    user: &str,
    id: i64,
    json: bool,
) -> Result<()> {
    if !svc.delete_workout(user, id)? {
        if json {
            println!("{}", json_error(&format!("Workout {id} not found")));
        } else {
            eprintln!("Workout {id} not found");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        println!("Deleted workout {id}");
    }

    Ok(())
}

pub(crate) fn cmd_workout_progress(
    svc: &StriveService,
    user: &str,
    exercise: &str,
    json: bool,
) -> Result<()> {
    let points = svc.exercise_progress(user, exercise)?;

    if points.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No logged sets with weights found for '{exercise}'");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&points)?);
    } else {
        #[derive(Tabled)]
        struct ProgressRow {
            #[tabled(rename = "Date")]
            date: String,
            #[tabled(rename = "Max weight")]
            max_weight: String,
        }

        let rows: Vec<ProgressRow> = points
            .iter()
            .map(|p| ProgressRow {
                date: p.date.clone(),
                max_weight: format!("{:.1}", p.max_weight),
            })
            .collect();

        println!("=== {exercise} progress ===");
        let table = Table::new(&rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(1..2)).with(Alignment::right()))
            .to_string();
        println!("{table}");
    }

    Ok(())
}
