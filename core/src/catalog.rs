use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::models::{EmissionsProfile, FoodRecord, validate_food_record};

const COL_ENTITY: &str = "Entity";
const COL_CARBS: &str = "Carbohydrates (g)";
const COL_PROTEIN: &str = "Proteins (g)";
const COL_FAT: &str = "Fats (g)";

/// Emissions columns in the order of [`EmissionsProfile`]'s fields.
const EMISSIONS_COLUMNS: [&str; 8] = [
    "food_emissions_land_use",
    "food_emissions_farm",
    "food_emissions_animal_feed",
    "food_emissions_processing",
    "food_emissions_transport",
    "food_emissions_retail",
    "food_emissions_packaging",
    "food_emissions_losses",
];

/// The immutable set of food records for one process lifetime.
///
/// Loaded once at startup; lookups resolve against a name index. Names are
/// the unique key, matched exactly.
#[derive(Debug)]
pub struct Catalog {
    foods: Vec<FoodRecord>,
    by_name: HashMap<String, usize>,
}

impl Catalog {
    /// Parse a catalog CSV from any reader.
    ///
    /// Expected header: `Entity`, `Carbohydrates (g)`, `Proteins (g)`,
    /// `Fats (g)`, then the eight `food_emissions_*` columns. Header names
    /// are matched case-insensitively. Rows with a blank `Entity` are
    /// skipped; any other malformed row fails the whole load.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers().context("Failed to read CSV headers")?.clone();

        let col = |name: &str| -> Option<usize> {
            headers.iter().position(|h| h.eq_ignore_ascii_case(name))
        };

        let idx_entity = col(COL_ENTITY)
            .with_context(|| format!("Missing required column: {COL_ENTITY}"))?;
        let idx_carbs =
            col(COL_CARBS).with_context(|| format!("Missing required column: {COL_CARBS}"))?;
        let idx_protein =
            col(COL_PROTEIN).with_context(|| format!("Missing required column: {COL_PROTEIN}"))?;
        let idx_fat = col(COL_FAT).with_context(|| format!("Missing required column: {COL_FAT}"))?;

        let mut idx_emissions = [0usize; 8];
        for (slot, name) in idx_emissions.iter_mut().zip(EMISSIONS_COLUMNS) {
            *slot = col(name).with_context(|| format!("Missing required column: {name}"))?;
        }

        let mut foods: Vec<FoodRecord> = Vec::new();
        let mut by_name: HashMap<String, usize> = HashMap::new();

        for (line_num, result) in rdr.records().enumerate() {
            let row = line_num + 2; // 1-based, after the header
            let record = result.with_context(|| format!("Failed to parse CSV row {row}"))?;

            let name = record.get(idx_entity).unwrap_or("").trim();
            if name.is_empty() {
                continue; // skip blank rows
            }

            let cell = |idx: usize, column: &str| -> Result<f64> {
                let raw = record.get(idx).unwrap_or("").trim();
                raw.parse::<f64>().map_err(|_| {
                    anyhow::anyhow!("Row {row}: invalid number '{raw}' in column '{column}'")
                })
            };

            let mut components = [0.0_f64; 8];
            for (slot, (idx, column)) in components
                .iter_mut()
                .zip(idx_emissions.into_iter().zip(EMISSIONS_COLUMNS))
            {
                *slot = cell(idx, column)?;
            }

            let food = FoodRecord {
                name: name.to_string(),
                carbs_g_per_kg: cell(idx_carbs, COL_CARBS)?,
                protein_g_per_kg: cell(idx_protein, COL_PROTEIN)?,
                fat_g_per_kg: cell(idx_fat, COL_FAT)?,
                emissions: EmissionsProfile {
                    land_use: components[0],
                    farm: components[1],
                    animal_feed: components[2],
                    processing: components[3],
                    transport: components[4],
                    retail: components[5],
                    packaging: components[6],
                    losses: components[7],
                },
            };

            validate_food_record(&food).with_context(|| format!("Row {row}"))?;

            if by_name.insert(food.name.clone(), foods.len()).is_some() {
                bail!("Duplicate food '{}' in catalog", food.name);
            }
            foods.push(food);
        }

        Ok(Catalog { foods, by_name })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open catalog: {}", path.display()))?;
        Self::from_reader(file)
            .with_context(|| format!("Failed to load catalog: {}", path.display()))
    }

    #[must_use]
    pub fn foods(&self) -> &[FoodRecord] {
        &self.foods
    }

    /// Resolve a food name to its record. Absence is a recoverable error
    /// naming the missing food; the caller decides whether to surface it
    /// or abort.
    pub fn get(&self, name: &str) -> Result<&FoodRecord> {
        self.by_name
            .get(name)
            .map(|&i| &self.foods[i])
            .with_context(|| format!("No food named '{name}' in the catalog"))
    }

    /// Case-insensitive substring search over food names, for display.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&FoodRecord> {
        let query = query.to_lowercase();
        self.foods
            .iter()
            .filter(|f| f.name.to_lowercase().contains(&query))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.foods.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CSV: &str = "\
Entity,Carbohydrates (g),Proteins (g),Fats (g),food_emissions_land_use,food_emissions_farm,food_emissions_animal_feed,food_emissions_processing,food_emissions_transport,food_emissions_retail,food_emissions_packaging,food_emissions_losses
Rice,28,2.7,0.3,-0.02,3.6,0,0.1,0.1,0.06,0.08,0.61
Apples,14,0.3,0.2,0.03,0.23,0,0,0.1,0.02,0.04,0.01
Beef,0,26,15,16.3,39.4,1.9,1.3,0.3,0.2,0.3,14.5
";

    #[test]
    fn test_parse_catalog_basic() {
        let catalog = Catalog::from_reader(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 3);

        let rice = catalog.get("Rice").unwrap();
        assert!((rice.carbs_g_per_kg - 28.0).abs() < f64::EPSILON);
        assert!((rice.protein_g_per_kg - 2.7).abs() < f64::EPSILON);
        assert!((rice.fat_g_per_kg - 0.3).abs() < f64::EPSILON);
        assert!((rice.emissions.land_use - (-0.02)).abs() < f64::EPSILON);
        assert!((rice.emissions.farm - 3.6).abs() < f64::EPSILON);
        assert!((rice.emissions.losses - 0.61).abs() < f64::EPSILON);

        let beef = catalog.get("Beef").unwrap();
        assert!((beef.emissions.animal_feed - 1.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_catalog_headers_case_insensitive() {
        let csv = SAMPLE_CSV.replacen("Entity", "entity", 1).replacen(
            "food_emissions_farm",
            "FOOD_EMISSIONS_FARM",
            1,
        );
        let catalog = Catalog::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 3);
        assert!((catalog.get("Rice").unwrap().emissions.farm - 3.6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_catalog_missing_column() {
        let csv = "Entity,Carbohydrates (g),Proteins (g)\nRice,28,2.7\n";
        let result = Catalog::from_reader(csv.as_bytes());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Fats (g)"));
    }

    #[test]
    fn test_parse_catalog_missing_emissions_column() {
        let csv = SAMPLE_CSV.replace("food_emissions_retail", "retail");
        let result = Catalog::from_reader(csv.as_bytes());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("food_emissions_retail")
        );
    }

    #[test]
    fn test_parse_catalog_invalid_number() {
        let csv = SAMPLE_CSV.replace("3.6", "lots");
        let err = Catalog::from_reader(csv.as_bytes()).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("lots"));
        assert!(msg.contains("food_emissions_farm"));
    }

    #[test]
    fn test_parse_catalog_duplicate_name() {
        let csv = format!("{SAMPLE_CSV}Rice,28,2.7,0.3,0,0,0,0,0,0,0,0\n");
        let err = Catalog::from_reader(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Duplicate food 'Rice'"));
    }

    #[test]
    fn test_parse_catalog_negative_macro_rejected() {
        let csv = SAMPLE_CSV.replacen("28,2.7", "-28,2.7", 1);
        assert!(Catalog::from_reader(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_parse_catalog_negative_emissions_allowed() {
        // Rice's land_use is -0.02 in the sample: sequestration loads fine
        let catalog = Catalog::from_reader(SAMPLE_CSV.as_bytes()).unwrap();
        assert!(catalog.get("Rice").unwrap().emissions.land_use < 0.0);
    }

    #[test]
    fn test_parse_catalog_skips_blank_rows() {
        let csv = format!("{SAMPLE_CSV},,,,,,,,,,,\n");
        let catalog = Catalog::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_get_unknown_food() {
        let catalog = Catalog::from_reader(SAMPLE_CSV.as_bytes()).unwrap();
        let err = catalog.get("Dragonfruit").unwrap_err();
        assert!(err.to_string().contains("Dragonfruit"));
    }

    #[test]
    fn test_get_is_exact_match() {
        let catalog = Catalog::from_reader(SAMPLE_CSV.as_bytes()).unwrap();
        assert!(catalog.get("rice").is_err());
        assert!(catalog.get("Rice").is_ok());
    }

    #[test]
    fn test_search_case_insensitive_substring() {
        let catalog = Catalog::from_reader(SAMPLE_CSV.as_bytes()).unwrap();
        let hits = catalog.search("RIC");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Rice");
        assert!(catalog.search("zzz").is_empty());
    }

    #[test]
    fn test_from_path() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE_CSV.as_bytes()).unwrap();
        let catalog = Catalog::from_path(file.path()).unwrap();
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = Catalog::from_path(Path::new("/no/such/catalog.csv")).unwrap_err();
        assert!(format!("{err:#}").contains("catalog.csv"));
    }

    #[test]
    fn test_empty_catalog() {
        let csv = "Entity,Carbohydrates (g),Proteins (g),Fats (g),food_emissions_land_use,food_emissions_farm,food_emissions_animal_feed,food_emissions_processing,food_emissions_transport,food_emissions_retail,food_emissions_packaging,food_emissions_losses\n";
        let catalog = Catalog::from_reader(csv.as_bytes()).unwrap();
        assert!(catalog.is_empty());
    }
}
