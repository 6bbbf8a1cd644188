mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process;

use crate::commands::{
    cmd_goals_set, cmd_goals_show, cmd_habit_add, cmd_habit_calendar, cmd_habit_delete,
    cmd_habit_list, cmd_habit_show, cmd_habit_stats, cmd_habit_toggle, cmd_habit_update,
    cmd_meal_delete, cmd_meal_list, cmd_meal_log, cmd_meal_show, cmd_meal_update, cmd_nutrition,
    cmd_workout_add, cmd_workout_delete, cmd_workout_list, cmd_workout_progress, cmd_workout_show,
    cmd_workout_update,
};
use crate::config::Config;
use strive_core::service::StriveService;

#[derive(Parser)]
#[command(
    name = "strive",
    version,
    about = "A simple self-improvement tracker CLI",
    long_about = "\n\n  ███████╗████████╗██████╗ ██╗██╗   ██╗███████╗
  ██╔════╝╚══██╔══╝██╔══██╗██║██║   ██║██╔════╝
  ███████╗   ██║   ██████╔╝██║██║   ██║█████╗
  ╚════██║   ██║   ██╔══██╗██║╚██╗ ██╔╝██╔══╝
  ███████║   ██║   ██║  ██║██║ ╚████╔╝ ███████╗
  ╚══════╝   ╚═╝   ╚═╝  ╚═╝╚═╝  ╚═══╝  ╚══════╝
      habits, meals, workouts. every day.
"
)]
struct Cli {
    /// Profile to track under (separate people share one database)
    #[arg(long, global = true, default_value = "default")]
    profile: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Track daily habits and streaks
    Habit {
        #[command(subcommand)]
        command: HabitCommands,
    },
    /// Log meals and the foods in them
    Meal {
        #[command(subcommand)]
        command: MealCommands,
    },
    /// Show daily macro totals against goals (defaults to today)
    Nutrition {
        /// Date to show (YYYY-MM-DD or today/yesterday, default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record workouts and exercise progress
    Workout {
        #[command(subcommand)]
        command: WorkoutCommands,
    },
    /// Manage daily nutrition goals
    Goals {
        #[command(subcommand)]
        command: GoalsCommands,
    },
}

#[derive(Subcommand)]
enum HabitCommands {
    /// Add a new habit
    Add {
        /// Habit name
        name: String,
        /// Target (e.g. "30 minutes", "daily")
        #[arg(short, long)]
        target: String,
        /// Category (e.g. "health", "learning")
        #[arg(short, long)]
        category: String,
        /// Reminder time (HH:MM)
        #[arg(long)]
        reminder: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List habits with today's status and streaks
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one habit in detail
    Show {
        /// Habit ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update a habit (only the given fields change)
    Update {
        /// Habit ID
        id: i64,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New target
        #[arg(long)]
        target: Option<String>,
        /// New category
        #[arg(long)]
        category: Option<String>,
        /// New reminder time (HH:MM)
        #[arg(long)]
        reminder: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a habit and its completion history
    Delete {
        /// Habit ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark a habit done for a day (default: today)
    Done {
        /// Habit ID
        id: i64,
        /// Date (YYYY-MM-DD or today/yesterday, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark a habit not done for a day (default: today)
    Undo {
        /// Habit ID
        id: i64,
        /// Date (YYYY-MM-DD or today/yesterday, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a month calendar of completions for a habit
    Calendar {
        /// Habit ID
        id: i64,
        /// Month to show (YYYY-MM, default: current month)
        #[arg(long)]
        month: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show aggregate habit stats for today and this month
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum MealCommands {
    /// Log a meal with its foods
    Log {
        /// Meal type: breakfast, lunch, dinner, snack
        meal_type: String,
        /// Time of the meal (HH:MM)
        #[arg(short, long)]
        time: String,
        /// Date (YYYY-MM-DD or today/yesterday, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Food as 'name:portion:calories[:protein[:carbs[:fat]]]' (repeatable)
        #[arg(long = "food", value_name = "FOOD")]
        foods: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List meals (all, or one date with --date)
    List {
        /// Date to filter on (YYYY-MM-DD or today/yesterday)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one meal with its foods
    Show {
        /// Meal ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update a meal; any --food given replaces the whole food list
    Update {
        /// Meal ID
        id: i64,
        /// New meal type: breakfast, lunch, dinner, snack
        #[arg(long)]
        meal_type: Option<String>,
        /// New time (HH:MM)
        #[arg(long)]
        time: Option<String>,
        /// New date (YYYY-MM-DD or today/yesterday)
        #[arg(long)]
        date: Option<String>,
        /// Replacement food entries (repeatable)
        #[arg(long = "food", value_name = "FOOD")]
        foods: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a meal and its foods
    Delete {
        /// Meal ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum WorkoutCommands {
    /// Record a workout with its exercises
    Add {
        /// Workout name (e.g. "Push Day")
        name: String,
        /// Date (YYYY-MM-DD or today/yesterday, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Duration (e.g. "60 min")
        #[arg(long)]
        duration: Option<String>,
        /// Notes
        #[arg(long)]
        notes: Option<String>,
        /// Exercise as 'name:reps@weight,reps@weight,...' (repeatable)
        #[arg(long = "exercise", value_name = "EXERCISE")]
        exercises: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List workouts, newest first
    List {
        /// Show only the N most recent workouts
        #[arg(short, long)]
        limit: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one workout with its exercises and sets
    Show {
        /// Workout ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update a workout; any --exercise given replaces the whole list
    Update {
        /// Workout ID
        id: i64,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New date (YYYY-MM-DD or today/yesterday)
        #[arg(long)]
        date: Option<String>,
        /// New duration
        #[arg(long)]
        duration: Option<String>,
        /// New notes
        #[arg(long)]
        notes: Option<String>,
        /// Replacement exercise entries (repeatable)
        #[arg(long = "exercise", value_name = "EXERCISE")]
        exercises: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a workout and its exercises
    Delete {
        /// Workout ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show max-weight progress over time for one exercise
    Progress {
        /// Exercise name (case-insensitive)
        exercise: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum GoalsCommands {
    /// Set daily nutrition goals (only the given fields change)
    Set {
        /// Daily calorie goal (kcal)
        #[arg(long)]
        calories: Option<f64>,
        /// Daily protein goal (g)
        #[arg(long)]
        protein: Option<f64>,
        /// Daily carbs goal (g)
        #[arg(long)]
        carbs: Option<f64>,
        /// Daily fat goal (g)
        #[arg(long)]
        fat: Option<f64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show current nutrition goals
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

#[allow(clippy::too_many_lines)]
fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let svc = StriveService::new(&config.db_path)?;
    let user = cli.profile.as_str();

    match cli.command {
        Commands::Habit { command } => match command {
            HabitCommands::Add {
                name,
                target,
                category,
                reminder,
                json,
            } => cmd_habit_add(&svc, user, &name, &target, &category, reminder, json),
            HabitCommands::List { json } => cmd_habit_list(&svc, user, json),
            HabitCommands::Show { id, json } => cmd_habit_show(&svc, user, id, json),
            HabitCommands::Update {
                id,
                name,
                target,
                category,
                reminder,
                json,
            } => cmd_habit_update(&svc, user, id, name, target, category, reminder, json),
            HabitCommands::Delete { id, json } => cmd_habit_delete(&svc, user, id, json),
            HabitCommands::Done { id, date, json } => {
                cmd_habit_toggle(&svc, user, id, date, true, json)
            }
            HabitCommands::Undo { id, date, json } => {
                cmd_habit_toggle(&svc, user, id, date, false, json)
            }
            HabitCommands::Calendar { id, month, json } => {
                cmd_habit_calendar(&svc, user, id, month, json)
            }
            HabitCommands::Stats { json } => cmd_habit_stats(&svc, user, json),
        },
        Commands::Meal { command } => match command {
            MealCommands::Log {
                meal_type,
                time,
                date,
                foods,
                json,
            } => cmd_meal_log(&svc, user, &meal_type, &time, date, &foods, json),
            MealCommands::List { date, json } => cmd_meal_list(&svc, user, date, json),
            MealCommands::Show { id, json } => cmd_meal_show(&svc, user, id, json),
            MealCommands::Update {
                id,
                meal_type,
                time,
                date,
                foods,
                json,
            } => cmd_meal_update(&svc, user, id, meal_type, time, date, &foods, json),
            MealCommands::Delete { id, json } => cmd_meal_delete(&svc, user, id, json),
        },
        Commands::Nutrition { date, json } => cmd_nutrition(&svc, user, date, json),
        Commands::Workout { command } => match command {
            WorkoutCommands::Add {
                name,
                date,
                duration,
                notes,
                exercises,
                json,
            } => cmd_workout_add(&svc, user, &name, date, duration, notes, &exercises, json),
            WorkoutCommands::List { limit, json } => cmd_workout_list(&svc, user, limit, json),
            WorkoutCommands::Show { id, json } => cmd_workout_show(&svc, user, id, json),
            WorkoutCommands::Update {
                id,
                name,
                date,
                duration,
                notes,
                exercises,
                json,
            } => cmd_workout_update(&svc, user, id, name, date, duration, notes, &exercises, json),
            WorkoutCommands::Delete { id, json } => cmd_workout_delete(&svc, user, id, json),
            WorkoutCommands::Progress { exercise, json } => {
                cmd_workout_progress(&svc, user, &exercise, json)
            }
        },
        Commands::Goals { command } => match command {
            GoalsCommands::Set {
                calories,
                protein,
                carbs,
                fat,
                json,
            } => cmd_goals_set(&svc, user, calories, protein, carbs, fat, json),
            GoalsCommands::Show { json } => cmd_goals_show(&svc, user, json),
        },
    }
}
