use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// 1 oz = 0.0283495 kg.
pub const KG_PER_OZ: f64 = 0.028_349_5;
/// 1 kg = 35.274 oz.
pub const OZ_PER_KG: f64 = 35.274;

pub const CALORIES_PER_G_CARBS: f64 = 4.0;
pub const CALORIES_PER_G_PROTEIN: f64 = 4.0;
pub const CALORIES_PER_G_FAT: f64 = 9.0;

/// Convert ounces to kilograms. Defined for any real input; callers that
/// need a positive quantity validate before converting.
#[must_use]
pub fn oz_to_kg(oz: f64) -> f64 {
    oz * KG_PER_OZ
}

/// Convert kilograms to ounces.
#[must_use]
pub fn kg_to_oz(kg: f64) -> f64 {
    kg * OZ_PER_KG
}

/// Per-kilogram lifecycle emissions of a food, in kg CO₂-equivalent.
/// Components may be negative (land-use sequestration).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EmissionsProfile {
    pub land_use: f64,
    pub farm: f64,
    pub animal_feed: f64,
    pub processing: f64,
    pub transport: f64,
    pub retail: f64,
    pub packaging: f64,
    pub losses: f64,
}

impl EmissionsProfile {
    /// Total footprint: the plain sum of the eight components.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.land_use
            + self.farm
            + self.animal_feed
            + self.processing
            + self.transport
            + self.retail
            + self.packaging
            + self.losses
    }

    /// Add `other * factor` into this profile, component-wise.
    pub fn add_scaled(&mut self, other: &EmissionsProfile, factor: f64) {
        self.land_use += other.land_use * factor;
        self.farm += other.farm * factor;
        self.animal_feed += other.animal_feed * factor;
        self.processing += other.processing * factor;
        self.transport += other.transport * factor;
        self.retail += other.retail * factor;
        self.packaging += other.packaging * factor;
        self.losses += other.losses * factor;
    }

    /// Component values paired with display labels, in lifecycle order.
    #[must_use]
    pub fn categories(&self) -> [(&'static str, f64); 8] {
        [
            ("Land Use", self.land_use),
            ("Farm", self.farm),
            ("Animal Feed", self.animal_feed),
            ("Processing", self.processing),
            ("Transport", self.transport),
            ("Retail", self.retail),
            ("Packaging", self.packaging),
            ("Losses", self.losses),
        ]
    }
}

/// One catalog entry. Macronutrients are grams per kilogram of the food;
/// emissions are per kilogram as well. Calories are always derived, never
/// stored, so the 4/4/9 invariant cannot drift.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodRecord {
    pub name: String,
    pub carbs_g_per_kg: f64,
    pub protein_g_per_kg: f64,
    pub fat_g_per_kg: f64,
    pub emissions: EmissionsProfile,
}

impl FoodRecord {
    #[must_use]
    pub fn calories_per_kg(&self) -> f64 {
        self.carbs_g_per_kg * CALORIES_PER_G_CARBS
            + self.protein_g_per_kg * CALORIES_PER_G_PROTEIN
            + self.fat_g_per_kg * CALORIES_PER_G_FAT
    }
}

/// Validate a catalog entry: name must not be empty, macronutrients must
/// not be negative. Emissions components may be negative.
pub fn validate_food_record(record: &FoodRecord) -> Result<()> {
    if record.name.trim().is_empty() {
        bail!("Food name must not be empty");
    }
    if record.carbs_g_per_kg < 0.0 {
        bail!("carbs_g_per_kg must not be negative for '{}'", record.name);
    }
    if record.protein_g_per_kg < 0.0 {
        bail!("protein_g_per_kg must not be negative for '{}'", record.name);
    }
    if record.fat_g_per_kg < 0.0 {
        bail!("fat_g_per_kg must not be negative for '{}'", record.name);
    }
    Ok(())
}

/// A user's chosen foods and ounce quantities for one computation.
///
/// An explicit value object owned by the interaction building it, not
/// ambient keyed state. Adding the same food twice accumulates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    items: Vec<(String, f64)>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &str, quantity_oz: f64) {
        if let Some(item) = self.items.iter_mut().find(|(n, _)| n == name) {
            item.1 += quantity_oz;
        } else {
            self.items.push((name.to_string(), quantity_oz));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.items.iter().map(|(n, q)| (n.as_str(), *q))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total selected quantity in ounces.
    #[must_use]
    pub fn total_oz(&self) -> f64 {
        self.items.iter().map(|(_, q)| q).sum()
    }
}

/// Summed nutrition and emissions for one selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateTotals {
    pub carbs_g: f64,
    pub protein_g: f64,
    pub fat_g: f64,
    pub emissions: EmissionsProfile,
}

impl AggregateTotals {
    /// Derived from the summed macros (4 kcal/g carbs and protein,
    /// 9 kcal/g fat), never stored independently.
    #[must_use]
    pub fn calories(&self) -> f64 {
        self.carbs_g * CALORIES_PER_G_CARBS
            + self.protein_g * CALORIES_PER_G_PROTEIN
            + self.fat_g * CALORIES_PER_G_FAT
    }

    #[must_use]
    pub fn total_emissions(&self) -> f64 {
        self.emissions.total()
    }

    /// Calories contributed by each macronutrient: (carbs, protein, fat).
    #[must_use]
    pub fn macro_calories(&self) -> (f64, f64, f64) {
        (
            self.carbs_g * CALORIES_PER_G_CARBS,
            self.protein_g * CALORIES_PER_G_PROTEIN,
            self.fat_g * CALORIES_PER_G_FAT,
        )
    }

    /// Each macronutrient's share of total calories, rounded to whole
    /// percent. All zero when total calories is zero.
    #[must_use]
    pub fn calorie_shares(&self) -> MacroShares {
        let total = self.calories();
        if total <= 0.0 {
            return MacroShares::default();
        }
        let (carbs_cal, protein_cal, fat_cal) = self.macro_calories();
        let pct = |cal: f64| (100.0 * cal / total).round() as i64;
        MacroShares {
            carbs_pct: pct(carbs_cal),
            protein_pct: pct(protein_cal),
            fat_pct: pct(fat_cal),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MacroShares {
    pub carbs_pct: i64,
    pub protein_pct: i64,
    pub fat_pct: i64,
}

/// Band around the calorie target. "On target" is inclusive: a delta of
/// exactly [`TARGET_TOLERANCE_CALORIES`] still counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetBand {
    OnTarget,
    OverTarget,
    UnderTarget,
}

pub const TARGET_TOLERANCE_CALORIES: f64 = 50.0;

#[derive(Debug, Clone, Serialize)]
pub struct TargetProgress {
    pub target_calories: i64,
    pub total_calories: f64,
    /// Share of the target reached, capped at 100.
    pub percentage: f64,
    pub band: TargetBand,
    /// How far from the target, in calories (always non-negative).
    pub delta_calories: f64,
}
