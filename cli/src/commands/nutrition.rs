use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use strive_core::models::{MacroProgress, NutritionGoals};
use strive_core::service::StriveService;

use super::helpers::parse_date;

pub(crate) fn cmd_nutrition(
    svc: &StriveService,
    user: &str,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let summary = svc.nutrition_summary(user, date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("=== Nutrition for {} ===", date.format("%Y-%m-%d"));

        #[derive(Tabled)]
        struct MacroRow {
            #[tabled(rename = "Macro")]
            name: String,
            #[tabled(rename = "Current")]
            current: String,
            #[tabled(rename = "Goal")]
            goal: String,
            #[tabled(rename = "Progress")]
            progress: String,
        }

        let row = |name: &str, p: &MacroProgress, unit: &str| MacroRow {
            name: name.to_string(),
            current: format!("{:.0}{unit}", p.current),
            goal: format!("{:.0}{unit}", p.goal),
            progress: format!("{}%", p.percentage),
        };

        let rows = vec![
            row("Calories", &summary.calories, " kcal"),
            row("Protein", &summary.protein, "g"),
            row("Carbs", &summary.carbs, "g"),
            row("Fat", &summary.fat, "g"),
        ];

        let table = Table::new(&rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(1..4)).with(Alignment::right()))
            .to_string();
        println!("{table}");
    }

    Ok(())
}

pub(crate) fn cmd_goals_set(
    svc: &StriveService,
    user: &str,
    calories: Option<f64>,
    protein: Option<f64>,
    carbs: Option<f64>,
    fat: Option<f64>,
    json: bool,
) -> Result<()> {
    let current = svc.get_nutrition_goals(user)?;
    let goals = NutritionGoals {
        calories: calories.unwrap_or(current.calories),
        protein: protein.unwrap_or(current.protein),
        carbs: carbs.unwrap_or(current.carbs),
        fat: fat.unwrap_or(current.fat),
    };
    svc.set_nutrition_goals(user, &goals)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&goals)?);
    } else {
        println!(
            "Goals set: {:.0} kcal, {:.0}g protein, {:.0}g carbs, {:.0}g fat",
            goals.calories, goals.protein, goals.carbs, goals.fat
        );
    }

    Ok(())
}

pub(crate) fn cmd_goals_show(svc: &StriveService, user: &str, json: bool) -> Result<()> {
    let goals = svc.get_nutrition_goals(user)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&goals)?);
    } else {
        println!("Daily nutrition goals:");
        println!("  Calories: {:.0} kcal", goals.calories);
        println!("  Protein:  {:.0}g", goals.protein);
        println!("  Carbs:    {:.0}g", goals.carbs);
        println!("  Fat:      {:.0}g", goals.fat);
    }

    Ok(())
}
