mod habit;
mod helpers;
mod meal;
mod nutrition;
mod workout;

pub(crate) use habit::{
    cmd_habit_add, cmd_habit_calendar, cmd_habit_delete, cmd_habit_list, cmd_habit_show,
    cmd_habit_stats, cmd_habit_toggle, cmd_habit_update,
};
pub(crate) use meal::{cmd_meal_delete, cmd_meal_list, cmd_meal_log, cmd_meal_show, cmd_meal_update};
pub(crate) use nutrition::{cmd_goals_set, cmd_goals_show, cmd_nutrition};
pub(crate) use workout::{
    cmd_workout_add, cmd_workout_delete, cmd_workout_list, cmd_workout_progress, cmd_workout_show,
    cmd_workout_update,
};
