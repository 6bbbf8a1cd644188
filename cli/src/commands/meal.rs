use std::process;

use anyhow::{Result, bail};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use strive_core::models::{MealDetail, NewMeal};
use strive_core::service::StriveService;

use super::helpers::{json_error, parse_date, parse_food_spec, truncate};

pub(crate) fn cmd_meal_log(
    svc: &StriveService,
    user: &str,
    meal_type: &str,
    time: &str,
    date: Option<String>,
    foods: &[String],
    json: bool,
) -> Result<()> {
    if foods.is_empty() {
        bail!("A meal needs at least one --food entry");
    }
    let meal = NewMeal {
        meal_type: meal_type.to_string(),
        time: time.to_string(),
        date: parse_date(date)?,
        foods: foods
            .iter()
            .map(|s| parse_food_spec(s))
            .collect::<Result<Vec<_>>>()?,
    };
    let logged = svc.log_meal(user, &meal)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&logged)?);
    } else {
        println!(
            "Logged {} {} for {} ({:.0} kcal, {} item(s))",
            logged.meal.meal_type,
            logged.meal.id,
            logged.meal.date,
            logged.total_calories,
            logged.foods.len()
        );
    }

    Ok(())
}

fn print_meal_table(meals: &[MealDetail]) {
    #[derive(Tabled)]
    struct MealRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Time")]
        time: String,
        #[tabled(rename = "Meal")]
        meal_type: String,
        #[tabled(rename = "Items")]
        items: usize,
        #[tabled(rename = "Calories")]
        calories: String,
    }

    let rows: Vec<MealRow> = meals
        .iter()
        .map(|m| MealRow {
            id: m.meal.id,
            date: m.meal.date.clone(),
            time: m.meal.time.clone(),
            meal_type: m.meal.meal_type.clone(),
            items: m.foods.len(),
            calories: format!("{:.0}", m.total_calories),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(4..6)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn cmd_meal_list(
    svc: &StriveService,
    user: &str,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let meals = match date {
        Some(_) => svc.meals_for_date(user, parse_date(date)?)?,
        None => svc.list_meals(user)?,
    };

    if meals.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No meals found. Use `strive meal log` to record one.");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&meals)?);
    } else {
        print_meal_table(&meals);
    }

    Ok(())
}

pub(crate) fn cmd_meal_show(svc: &StriveService, user: &str, id: i64, json: bool) -> Result<()> {
    let Some(detail) = svc.get_meal(user, id)? else {
        if json {
            println!("{}", json_error(&format!("Meal {id} not found")));
        } else {
            eprintln!("Meal {id} not found");
        }
        process::exit(2);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
    } else {
        println!(
            "Meal {}: {} at {} on {}",
            detail.meal.id, detail.meal.meal_type, detail.meal.time, detail.meal.date
        );

        #[derive(Tabled)]
        struct FoodRow {
            #[tabled(rename = "Food")]
            name: String,
            #[tabled(rename = "Portion")]
            portion: String,
            #[tabled(rename = "Cal")]
            calories: String,
            #[tabled(rename = "P")]
            protein: String,
            #[tabled(rename = "C")]
            carbs: String,
            #[tabled(rename = "F")]
            fat: String,
        }

        let rows: Vec<FoodRow> = detail
            .foods
            .iter()
            .map(|f| FoodRow {
                name: truncate(&f.name, 30),
                portion: truncate(&f.portion, 15),
                calories: format!("{:.0}", f.calories),
                protein: format!("{:.1}", f.protein),
                carbs: format!("{:.1}", f.carbs),
                fat: format!("{:.1}", f.fat),
            })
            .collect();

        let table = Table::new(&rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(2..6)).with(Alignment::right()))
            .to_string();
        println!("{table}");
        println!("Total: {:.0} kcal", detail.total_calories);
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_meal_update(
    svc: &StriveService,
    user: &str,
    id: i64,
    meal_type: Option<String>,
    time: Option<String>,
    date: Option<String>,
    foods: &[String],
    json: bool,
) -> Result<()> {
    let Some(existing) = svc.get_meal(user, id)? else {
        if json {
            println!("{}", json_error(&format!("Meal {id} not found")));
        } else {
            eprintln!("Meal {id} not found");
        }
        process::exit(2);
    };

    // Omitted fields keep their stored values; passing any --food
    // replaces the whole food list.
    let new_foods = if foods.is_empty() {
        existing
            .foods
            .iter()
            .map(|f| strive_core::models::NewFood {
                name: f.name.clone(),
                portion: f.portion.clone(),
                calories: f.calories,
                protein: f.protein,
                carbs: f.carbs,
                fat: f.fat,
            })
            .collect()
    } else {
        foods
            .iter()
            .map(|s| parse_food_spec(s))
            .collect::<Result<Vec<_>>>()?
    };

    let updated = NewMeal {
        meal_type: meal_type.unwrap_or(existing.meal.meal_type),
        time: time.unwrap_or(existing.meal.time),
        date: match date {
            Some(_) => parse_date(date)?,
            None => parse_date(Some(existing.meal.date))?,
        },
        foods: new_foods,
    };
    svc.update_meal(user, id, &updated)?;

    let detail = svc
        .get_meal(user, id)?
        .ok_or_else(|| anyhow::anyhow!("Meal {id} disappeared during update"))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
    } else {
        println!(
            "Updated meal {} ({:.0} kcal, {} item(s))",
            detail.meal.id,
            detail.total_calories,
            detail.foods.len()
        );
    }

    Ok(())
}

pub(crate) fn cmd_meal_delete(svc: &StriveService, user: &str, id: i64, json: bool) -> Result<()> {
    if !svc.delete_meal(user, id)? {
        if json {
            println!("{}", json_error(&format!("Meal {id} not found")));
        } else {
            eprintln!("Meal {id} not found");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        println!("Deleted meal {id}");
    }

    Ok(())
}
