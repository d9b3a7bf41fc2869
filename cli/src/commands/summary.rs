use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use mealprint_core::catalog::Catalog;
use mealprint_core::engine;

use super::helpers::{no_neg_zero, parse_selection};

#[derive(Tabled)]
struct NutrientRow {
    #[tabled(rename = "Nutrient")]
    nutrient: &'static str,
    #[tabled(rename = "Amount (g)")]
    amount: String,
    #[tabled(rename = "Calories")]
    calories: String,
    #[tabled(rename = "% of Total")]
    share: String,
}

#[derive(Tabled)]
struct EmissionRow {
    #[tabled(rename = "Category")]
    category: &'static str,
    #[tabled(rename = "CO₂e (kg)")]
    amount: String,
}

fn nutrient_row(nutrient: &'static str, grams: f64, calories: f64, share_pct: i64) -> NutrientRow {
    NutrientRow {
        nutrient,
        amount: format!("{grams:.1}"),
        calories: format!("{calories:.1}"),
        share: format!("{share_pct}%"),
    }
}

pub(crate) fn cmd_summary(catalog: &Catalog, foods: &[String], json: bool) -> Result<()> {
    let selection = parse_selection(foods)?;
    let totals = engine::aggregate(catalog, &selection)?;
    let shares = totals.calorie_shares();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "selection": selection,
                "totals": totals,
                "calories": totals.calories(),
                "total_emissions": totals.total_emissions(),
                "calorie_shares": shares,
            }))?
        );
        return Ok(());
    }

    let count = selection.len();
    let total_oz = selection.total_oz();
    println!("=== {count} food(s), {total_oz:.1} oz ===\n");

    let (carbs_cal, protein_cal, fat_cal) = totals.macro_calories();
    let total_cal = totals.calories();
    let total_share = if total_cal > 0.0 { 100 } else { 0 };
    let nutrient_rows = vec![
        nutrient_row("Carbohydrates", totals.carbs_g, carbs_cal, shares.carbs_pct),
        nutrient_row("Proteins", totals.protein_g, protein_cal, shares.protein_pct),
        nutrient_row("Fats", totals.fat_g, fat_cal, shares.fat_pct),
        nutrient_row(
            "Total",
            totals.carbs_g + totals.protein_g + totals.fat_g,
            total_cal,
            total_share,
        ),
    ];

    let table = Table::new(&nutrient_rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{table}\n");

    let mut emission_rows: Vec<EmissionRow> = totals
        .emissions
        .categories()
        .iter()
        .map(|&(category, amount)| {
            let amount = no_neg_zero(amount);
            EmissionRow {
                category,
                amount: format!("{amount:.3}"),
            }
        })
        .collect();
    let total_emissions = no_neg_zero(totals.total_emissions());
    emission_rows.push(EmissionRow {
        category: "Total",
        amount: format!("{total_emissions:.3}"),
    });

    let table = Table::new(&emission_rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{table}\n");

    let p = totals.protein_g;
    let c = totals.carbs_g;
    let f = totals.fat_g;
    println!(
        "  TOTAL: {total_cal:.0} kcal | P:{p:.1}g C:{c:.1}g F:{f:.1}g | {total_emissions:.3} kg CO₂e"
    );

    Ok(())
}
