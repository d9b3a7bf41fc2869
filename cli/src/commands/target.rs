use anyhow::{Result, bail};

use mealprint_core::catalog::Catalog;
use mealprint_core::engine;
use mealprint_core::models::TargetBand;

use super::helpers::parse_selection;

const BAR_WIDTH: usize = 40;

/// Targets below 100 kcal are rejected here; the engine itself only
/// rejects non-positive values.
const MIN_TARGET_CALORIES: i64 = 100;

#[allow(clippy::cast_precision_loss, clippy::cast_sign_loss)]
fn render_bar(percentage: f64) -> String {
    let filled = ((percentage / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

pub(crate) fn cmd_target(
    catalog: &Catalog,
    calories: i64,
    foods: &[String],
    json: bool,
) -> Result<()> {
    if calories < MIN_TARGET_CALORIES {
        bail!("Calorie target must be at least {MIN_TARGET_CALORIES}");
    }

    let selection = parse_selection(foods)?;
    let totals = engine::aggregate(catalog, &selection)?;
    let progress = engine::target_progress(totals.calories(), calories)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "selection": selection,
                "totals": totals,
                "calories": totals.calories(),
                "total_emissions": totals.total_emissions(),
                "calorie_shares": totals.calorie_shares(),
                "progress": progress,
            }))?
        );
        return Ok(());
    }

    let bar = render_bar(progress.percentage);
    let pct = progress.percentage;
    let total = progress.total_calories;
    let target = progress.target_calories;
    let delta = progress.delta_calories;

    println!("{bar} {pct:.0}%");
    println!("Total: {total:.0} / {target} kcal");
    match progress.band {
        TargetBand::OnTarget => println!("On target (within 50 kcal)"),
        TargetBand::OverTarget => println!("{delta:.0} kcal over target"),
        TargetBand::UnderTarget => println!("{delta:.0} kcal under target"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_bar_empty() {
        let bar = render_bar(0.0);
        assert_eq!(bar, format!("[{}]", "-".repeat(BAR_WIDTH)));
    }

    #[test]
    fn test_render_bar_full() {
        let bar = render_bar(100.0);
        assert_eq!(bar, format!("[{}]", "#".repeat(BAR_WIDTH)));
    }

    #[test]
    fn test_render_bar_half() {
        let bar = render_bar(50.0);
        assert_eq!(bar, format!("[{}{}]", "#".repeat(20), "-".repeat(20)));
    }

    #[test]
    fn test_render_bar_never_overflows() {
        // Percentage is capped upstream, but the bar clamps anyway
        let bar = render_bar(250.0);
        assert_eq!(bar.chars().filter(|&c| c == '#').count(), BAR_WIDTH);
    }
}
