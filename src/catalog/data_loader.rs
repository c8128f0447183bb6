use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;
use std::path::Path;

use super::{normalize_allergen, normalize_tag, Catalog, FoodRecord};
use crate::error::{CatalogLoadError, ParseError};
use crate::nutrients::{Nutrients, CALORIES, CARBOHYDRATE, FAT, PROTEIN};
use crate::quantity::{resolve, Quantity};

// Required column headers (matched after header normalization)
const NAME_COL: &str = "name";
const REFERENCE_UNIT_COL: &str = "reference_unit";
const CALORIES_COL: &str = CALORIES;
const PROTEIN_COL: &str = PROTEIN;
const CARB_COL: &str = CARBOHYDRATE;
const FAT_COL: &str = FAT;
const ALLERGENS_COL: &str = "allergens";
const CUISINE_COL: &str = "cuisine";
const REGION_COL: &str = "region";

// Optional descriptive columns; every other column is an extra nutrient
const CATEGORY_COL: &str = "category";
const MEAL_COL: &str = "meal";
const UNIT_WEIGHT_COL: &str = "unit_weight";

/// Cell values meaning "no tags"
const EMPTY_TAGS: [&str; 3] = ["none", "nil", "na"];

struct Columns {
    name: usize,
    reference_unit: usize,
    calories: usize,
    protein: usize,
    carbohydrate: usize,
    fat: usize,
    allergens: usize,
    cuisine: usize,
    region: usize,
    category: Option<usize>,
    meal: Option<usize>,
    unit_weight: Option<usize>,
    extra: Vec<(usize, String)>,
}

impl Columns {
    fn locate(headers: &[String]) -> Result<Self, CatalogLoadError> {
        let required = |column: &'static str| {
            headers
                .iter()
                .position(|h| h == column)
                .ok_or(CatalogLoadError::MissingColumn(column))
        };
        let optional = |column: &str| headers.iter().position(|h| h == column);

        let known = [
            NAME_COL,
            REFERENCE_UNIT_COL,
            CALORIES_COL,
            PROTEIN_COL,
            CARB_COL,
            FAT_COL,
            ALLERGENS_COL,
            CUISINE_COL,
            REGION_COL,
            CATEGORY_COL,
            MEAL_COL,
            UNIT_WEIGHT_COL,
        ];
        let extra = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !h.is_empty() && !known.contains(&h.as_str()))
            .map(|(idx, h)| (idx, h.clone()))
            .collect();

        Ok(Self {
            name: required(NAME_COL)?,
            reference_unit: required(REFERENCE_UNIT_COL)?,
            calories: required(CALORIES_COL)?,
            protein: required(PROTEIN_COL)?,
            carbohydrate: required(CARB_COL)?,
            fat: required(FAT_COL)?,
            allergens: required(ALLERGENS_COL)?,
            cuisine: required(CUISINE_COL)?,
            region: required(REGION_COL)?,
            category: optional(CATEGORY_COL),
            meal: optional(MEAL_COL),
            unit_weight: optional(UNIT_WEIGHT_COL),
            extra,
        })
    }
}

fn normalize_header(header: &str) -> String {
    normalize_tag(header)
}

fn cell(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or("").trim()
}

fn parse_number(row: usize, column: &str, value: &str) -> Result<f64, CatalogLoadError> {
    let parsed = value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CatalogLoadError::InvalidNumber {
            row,
            column: column.to_string(),
            value: value.to_string(),
        })?;
    if parsed < 0.0 {
        return Err(CatalogLoadError::NegativeNutrient {
            row,
            column: column.to_string(),
            value: parsed,
        });
    }
    Ok(parsed)
}

fn parse_optional_number(
    row: usize,
    column: &str,
    value: &str,
) -> Result<Option<f64>, CatalogLoadError> {
    if value.is_empty() {
        return Ok(None);
    }
    parse_number(row, column, value).map(Some)
}

fn parse_tags(value: &str, normalize: fn(&str) -> String) -> Vec<String> {
    value
        .split(|c| c == ';' || c == '|' || c == ',')
        .map(normalize)
        .filter(|t| !t.is_empty() && !EMPTY_TAGS.contains(&t.as_str()))
        .collect()
}

/// Accepts "100g", "100 ml", "per 100 g", "1 piece" and bare units like "g".
fn parse_reference_unit(row: usize, value: &str) -> Result<Quantity, CatalogLoadError> {
    let invalid = || CatalogLoadError::InvalidReferenceUnit {
        row,
        value: value.to_string(),
    };
    let lowered = value.trim().to_lowercase();
    let stripped = lowered.strip_prefix("per ").unwrap_or(&lowered).trim();

    let quantity = match resolve(stripped) {
        Ok(q) => q,
        Err(ParseError::NoAmount(_)) => resolve(&format!("1 {}", stripped)).map_err(|_| invalid())?,
        Err(_) => return Err(invalid()),
    };
    if !quantity.unit_recognized || quantity.amount <= 0.0 {
        return Err(invalid());
    }
    Ok(quantity)
}

/// Load the food table from a CSV file
pub fn load_catalog(csv_path: &Path) -> Result<Catalog, CatalogLoadError> {
    if !csv_path.exists() {
        return Err(CatalogLoadError::NotFound(csv_path.to_path_buf()));
    }

    let file = std::fs::File::open(csv_path)?;
    let catalog = read_catalog(file)?;
    tracing::info!("Loaded {} food records from {:?}", catalog.len(), csv_path);
    Ok(catalog)
}

/// Parse the food table from any CSV reader
pub fn read_catalog<R: Read>(reader: R) -> Result<Catalog, CatalogLoadError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(normalize_header).collect();
    let columns = Columns::locate(&headers)?;

    let mut records = Vec::new();
    for (row_index, result) in rdr.records().enumerate() {
        let row = row_index + 1;
        let record = result?;

        let name = cell(&record, columns.name);
        if name.is_empty() {
            tracing::warn!("Skipping row {} with an empty name", row);
            continue;
        }

        let mut nutrients = Nutrients::macros(
            parse_number(row, CALORIES_COL, cell(&record, columns.calories))?,
            parse_number(row, PROTEIN_COL, cell(&record, columns.protein))?,
            parse_number(row, CARB_COL, cell(&record, columns.carbohydrate))?,
            parse_number(row, FAT_COL, cell(&record, columns.fat))?,
        );
        for (idx, column) in &columns.extra {
            if let Some(value) = parse_optional_number(row, column, cell(&record, *idx))? {
                nutrients.set(column.clone(), value);
            }
        }

        let unit_weight = match columns.unit_weight {
            Some(idx) => parse_optional_number(row, UNIT_WEIGHT_COL, cell(&record, idx))?
                .filter(|w| *w > 0.0),
            None => None,
        };

        records.push(FoodRecord {
            name: name.to_string(),
            categories: columns
                .category
                .map(|idx| parse_tags(cell(&record, idx), normalize_tag))
                .unwrap_or_default(),
            cuisine: normalize_tag(cell(&record, columns.cuisine)),
            region: normalize_tag(cell(&record, columns.region)),
            allergens: parse_tags(cell(&record, columns.allergens), normalize_allergen),
            meals: columns
                .meal
                .map(|idx| parse_tags(cell(&record, idx), normalize_tag))
                .unwrap_or_default(),
            reference: parse_reference_unit(row, cell(&record, columns.reference_unit))?,
            unit_weight,
            nutrients,
        });
    }

    Catalog::from_records(records)
}
