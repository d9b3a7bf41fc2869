use anyhow::Result;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use mealprint_core::catalog::Catalog;
use mealprint_core::models::FoodRecord;

use super::helpers::{json_error, truncate};

pub(crate) fn cmd_foods(catalog: &Catalog, search: Option<&str>, json: bool) -> Result<()> {
    let mut foods: Vec<&FoodRecord> = match search {
        Some(q) => catalog.search(q),
        None => catalog.foods().iter().collect(),
    };
    foods.sort_by(|a, b| a.name.cmp(&b.name));

    if foods.is_empty() {
        let q = search.unwrap_or_default();
        let message = format!("No foods match '{q}'");
        if json {
            println!("{}", json_error(&message));
        } else {
            eprintln!("{message}");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&foods)?);
        return Ok(());
    }

    #[derive(Tabled)]
    struct FoodRow {
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Carbs g/kg")]
        carbs: String,
        #[tabled(rename = "Protein g/kg")]
        protein: String,
        #[tabled(rename = "Fat g/kg")]
        fat: String,
        #[tabled(rename = "kcal/kg")]
        calories: String,
        #[tabled(rename = "CO₂e kg/kg")]
        emissions: String,
    }

    let rows: Vec<FoodRow> = foods
        .iter()
        .map(|f| {
            let carbs = f.carbs_g_per_kg;
            let protein = f.protein_g_per_kg;
            let fat = f.fat_g_per_kg;
            let calories = f.calories_per_kg();
            let emissions = f.emissions.total();
            FoodRow {
                name: truncate(&f.name, 35),
                carbs: format!("{carbs:.1}"),
                protein: format!("{protein:.1}"),
                fat: format!("{fat:.1}"),
                calories: format!("{calories:.0}"),
                emissions: format!("{emissions:.2}"),
            }
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}
