use anyhow::{Result, bail};

use crate::catalog::Catalog;
use crate::models::{
    AggregateTotals, Selection, TARGET_TOLERANCE_CALORIES, TargetBand, TargetProgress, oz_to_kg,
};

/// Sum nutrition and emissions over a selection.
///
/// Each food's per-kg coefficients are weighted by the selected mass. The
/// result is order-independent, and fail-fast: the first unknown food
/// aborts the whole aggregation with no partial totals. An empty selection
/// yields all-zero totals.
pub fn aggregate(catalog: &Catalog, selection: &Selection) -> Result<AggregateTotals> {
    let mut totals = AggregateTotals::default();

    for (name, quantity_oz) in selection.iter() {
        let food = catalog.get(name)?;
        let quantity_kg = oz_to_kg(quantity_oz);
        totals.carbs_g += food.carbs_g_per_kg * quantity_kg;
        totals.protein_g += food.protein_g_per_kg * quantity_kg;
        totals.fat_g += food.fat_g_per_kg * quantity_kg;
        totals.emissions.add_scaled(&food.emissions, quantity_kg);
    }

    Ok(totals)
}

/// Compare total calories against a target.
///
/// Percentage is capped at 100. Within 50 kcal of the target (inclusive)
/// counts as on target; beyond that the band reports how far over or
/// under. Callers constrain the target to at least 100 kcal; the engine
/// only rejects non-positive values.
pub fn target_progress(total_calories: f64, target_calories: i64) -> Result<TargetProgress> {
    if target_calories <= 0 {
        bail!("Calorie target must be greater than 0");
    }

    #[allow(clippy::cast_precision_loss)]
    let target = target_calories as f64;
    let percentage = (100.0 * total_calories / target).min(100.0);
    let delta = total_calories - target;

    let band = if delta.abs() <= TARGET_TOLERANCE_CALORIES {
        TargetBand::OnTarget
    } else if delta > 0.0 {
        TargetBand::OverTarget
    } else {
        TargetBand::UnderTarget
    };

    Ok(TargetProgress {
        target_calories,
        total_calories,
        percentage,
        band,
        delta_calories: delta.abs(),
    })
}
