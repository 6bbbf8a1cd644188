use std::process;

use anyhow::Result;
use chrono::Datelike;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use strive_core::models::NewHabit;
use strive_core::service::StriveService;
use strive_core::stats::days_in_month;

use super::helpers::{json_error, parse_date, truncate};

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_habit_add(
    svc: &StriveService,
    user: &str,
    name: &str,
    target: &str,
    category: &str,
    reminder: Option<String>,
    json: bool,
) -> Result<()> {
    let habit = NewHabit {
        name: name.to_string(),
        target: target.to_string(),
        category: category.to_string(),
        reminder_time: reminder,
    };
    let created = svc.add_habit(user, &habit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&created)?);
    } else {
        println!("Added habit {} '{}'", created.id, created.name);
        println!("  Target: {} ({})", created.target, created.category);
        if let Some(ref time) = created.reminder_time {
            println!("  Reminder: {time}");
        }
    }

    Ok(())
}

pub(crate) fn cmd_habit_list(svc: &StriveService, user: &str, json: bool) -> Result<()> {
    let today = parse_date(None)?;
    let statuses = svc.list_habits_with_status(user, today)?;

    if statuses.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No habits found. Use `strive habit add` to create one.");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
    } else {
        #[derive(Tabled)]
        struct HabitRow {
            #[tabled(rename = "ID")]
            id: i64,
            #[tabled(rename = "Habit")]
            name: String,
            #[tabled(rename = "Target")]
            target: String,
            #[tabled(rename = "Category")]
            category: String,
            #[tabled(rename = "Today")]
            today: String,
            #[tabled(rename = "Streak")]
            streak: String,
        }

        let rows: Vec<HabitRow> = statuses
            .iter()
            .map(|s| HabitRow {
                id: s.habit.id,
                name: truncate(&s.habit.name, 30),
                target: truncate(&s.habit.target, 20),
                category: s.habit.category.clone(),
                today: if s.completed { "done" } else { "-" }.to_string(),
                streak: if s.streak > 0 {
                    format!("{}d", s.streak)
                } else {
                    "-".to_string()
                },
            })
            .collect();

        let table = Table::new(&rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(4..6)).with(Alignment::right()))
            .to_string();
        println!("{table}");
    }

    Ok(())
}

pub(crate) fn cmd_habit_show(svc: &StriveService, user: &str, id: i64, json: bool) -> Result<()> {
    let today = parse_date(None)?;
    let Some(status) = svc.habit_status_by_id(user, id, today)? else {
        if json {
            println!("{}", json_error(&format!("Habit {id} not found")));
        } else {
            eprintln!("Habit {id} not found");
        }
        process::exit(2);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        let h = &status.habit;
        println!("Habit {}: {}", h.id, h.name);
        println!("  Target: {} ({})", h.target, h.category);
        if let Some(ref time) = h.reminder_time {
            println!("  Reminder: {time}");
        }
        println!("  Today: {}", if status.completed { "done" } else { "not done" });
        println!("  Streak: {} day(s)", status.streak);
        println!(
            "  This month: {} day(s) completed",
            status.completed_days.len()
        );
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_habit_update(
    svc: &StriveService,
    user: &str,
    id: i64,
    name: Option<String>,
    target: Option<String>,
    category: Option<String>,
    reminder: Option<String>,
    json: bool,
) -> Result<()> {
    let Some(existing) = svc.get_habit(user, id)? else {
        if json {
            println!("{}", json_error(&format!("Habit {id} not found")));
        } else {
            eprintln!("Habit {id} not found");
        }
        process::exit(2);
    };

    let updated = NewHabit {
        name: name.unwrap_or(existing.name),
        target: target.unwrap_or(existing.target),
        category: category.unwrap_or(existing.category),
        reminder_time: reminder.or(existing.reminder_time),
    };
    svc.update_habit(user, id, &updated)?;

    let habit = svc
        .get_habit(user, id)?
        .ok_or_else(|| anyhow::anyhow!("Habit {id} disappeared during update"))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&habit)?);
    } else {
        println!("Updated habit {} '{}'", habit.id, habit.name);
    }

    Ok(())
}

pub(crate) fn cmd_habit_delete(svc: &StriveService, user: &str, id: i64, json: bool) -> Result<()> {
    if !svc.delete_habit(user, id)? {
        if json {
            println!("{}", json_error(&format!("Habit {id} not found")));
        } else {
            eprintln!("Habit {id} not found");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        println!("Deleted habit {id}");
    }

    Ok(())
}

pub(crate) fn cmd_habit_toggle(
    svc: &StriveService,
    user: &str,
    id: i64,
    date: Option<String>,
    completed: bool,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    if !svc.toggle_habit(user, id, date, completed)? {
        if json {
            println!("{}", json_error(&format!("Habit {id} not found")));
        } else {
            eprintln!("Habit {id} not found");
        }
        process::exit(2);
    }

    let status = svc
        .habit_status_by_id(user, id, date)?
        .ok_or_else(|| anyhow::anyhow!("Habit {id} disappeared during toggle"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        let date_str = date.format("%Y-%m-%d");
        if completed {
            println!(
                "Marked '{}' done for {date_str} (streak: {} day(s))",
                status.habit.name, status.streak
            );
        } else {
            println!("Marked '{}' not done for {date_str}", status.habit.name);
        }
    }

    Ok(())
}

pub(crate) fn cmd_habit_calendar(
    svc: &StriveService,
    user: &str,
    id: i64,
    month: Option<String>,
    json: bool,
) -> Result<()> {
    // `month` accepts YYYY-MM; defaults to the current month.
    let today = parse_date(None)?;
    let (year, month_num) = match month {
        None => (today.year(), today.month()),
        Some(ref s) => {
            let date = parse_date(Some(format!("{s}-01")))?;
            (date.year(), date.month())
        }
    };
    let anchor = chrono::NaiveDate::from_ymd_opt(year, month_num, 1)
        .ok_or_else(|| anyhow::anyhow!("Invalid month"))?;

    let Some(status) = svc.habit_status_by_id(user, id, anchor)? else {
        if json {
            println!("{}", json_error(&format!("Habit {id} not found")));
        } else {
            eprintln!("Habit {id} not found");
        }
        process::exit(2);
    };

    if json {
        println!(
            "{}",
            serde_json::json!({
                "habit_id": id,
                "year": year,
                "month": month_num,
                "completed_days": status.completed_days,
            })
        );
    } else {
        println!("{} — {year}-{month_num:02}", status.habit.name);
        let total = days_in_month(year, month_num);
        let marks: Vec<String> = (1..=total)
            .map(|day| {
                if status.completed_days.contains(&day) {
                    format!("[{day:2}]")
                } else {
                    format!(" {day:2} ")
                }
            })
            .collect();
        for week in marks.chunks(7) {
            println!("  {}", week.join(" "));
        }
        println!(
            "  {} of {total} day(s) completed",
            status.completed_days.len()
        );
    }

    Ok(())
}

pub(crate) fn cmd_habit_stats(svc: &StriveService, user: &str, json: bool) -> Result<()> {
    let today = parse_date(None)?;
    let stats = svc.habit_stats(user, today)?;

    if stats.total_habits == 0 {
        if json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            eprintln!("No habits found. Use `strive habit add` to create one.");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("=== Habit stats for {} ===", today.format("%Y-%m-%d"));
        println!("  Habits:        {}", stats.total_habits);
        println!(
            "  Done today:    {} ({}%)",
            stats.completed_today, stats.completion_rate
        );
        println!("  This month:    {}%", stats.monthly_completion_rate);
    }

    Ok(())
}
