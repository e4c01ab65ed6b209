use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// One catalog entry / logged consumption unit.
///
/// Identity is (drink_name, brand_name) only: nutritional fields are excluded
/// from equality and hashing so records from different catalog fetches still
/// land on the same session entry. Gram fields arrive as decorated strings
/// ("13g") exactly as the catalog stores them; use the `_g` accessors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrinkRecord {
    pub drink_name: String,
    pub brand_name: String,
    #[serde(default)]
    pub drink_type: String,
    #[serde(default)]
    pub abv: f64,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub carbohydrates: String,
    #[serde(default)]
    pub sugars: String,
    #[serde(default)]
    pub proteins: String,
    #[serde(default)]
    pub fats: String,
    #[serde(default)]
    pub serving_size: String,
    #[serde(default)]
    pub alcohol_units: f64,
}

impl DrinkRecord {
    pub fn carbohydrates_g(&self) -> f64 {
        parse_grams(&self.carbohydrates)
    }

    pub fn proteins_g(&self) -> f64 {
        parse_grams(&self.proteins)
    }

    pub fn fats_g(&self) -> f64 {
        parse_grams(&self.fats)
    }
}

impl PartialEq for DrinkRecord {
    fn eq(&self, other: &Self) -> bool {
        self.drink_name == other.drink_name && self.brand_name == other.brand_name
    }
}

impl Eq for DrinkRecord {}

impl Hash for DrinkRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.drink_name.hash(state);
        self.brand_name.hash(state);
    }
}

/// Parse a numeric string that may carry a unit suffix ("12g" -> 12.0).
///
/// Total: any parse failure yields 0.0. Catalog rows are untrusted input, so
/// this is the single normalization point for gram-valued text fields.
pub fn parse_grams(raw: &str) -> f64 {
    let trimmed = raw.trim();
    let numeric = trimmed.trim_end_matches(|c: char| c.is_alphabetic());
    numeric.trim().parse::<f64>().unwrap_or(0.0)
}

/// Non-finite doubles from the catalog count as zero.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lager() -> DrinkRecord {
        DrinkRecord {
            drink_name: "Lager".into(),
            brand_name: "BrandX".into(),
            drink_type: "Beer".into(),
            abv: 4.0,
            calories: 150.0,
            carbohydrates: "13g".into(),
            sugars: "0g".into(),
            proteins: "1g".into(),
            fats: "0g".into(),
            serving_size: "440ml".into(),
            alcohol_units: 1.7,
        }
    }

    #[test]
    fn parse_grams_strips_unit_suffix() {
        assert_eq!(parse_grams("12g"), 12.0);
        assert_eq!(parse_grams("7"), 7.0);
        assert_eq!(parse_grams("0.5g"), 0.5);
        assert_eq!(parse_grams(" 13 g "), 13.0);
    }

    #[test]
    fn parse_grams_defaults_to_zero_on_garbage() {
        assert_eq!(parse_grams("abc"), 0.0);
        assert_eq!(parse_grams(""), 0.0);
        assert_eq!(parse_grams("g"), 0.0);
    }

    #[test]
    fn gram_accessors_use_parser() {
        let drink = lager();
        assert_eq!(drink.carbohydrates_g(), 13.0);
        assert_eq!(drink.proteins_g(), 1.0);
        assert_eq!(drink.fats_g(), 0.0);
    }

    #[test]
    fn finite_or_zero_rejects_nan_and_infinity() {
        assert_eq!(finite_or_zero(150.0), 150.0);
        assert_eq!(finite_or_zero(f64::NAN), 0.0);
        assert_eq!(finite_or_zero(f64::INFINITY), 0.0);
    }

    #[test]
    fn identity_ignores_nutritional_fields() {
        let a = lager();
        let mut b = lager();
        b.calories = 999.0;
        b.carbohydrates = "50g".into();
        assert_eq!(a, b);

        let mut counts: HashMap<DrinkRecord, u32> = HashMap::new();
        counts.insert(a, 1);
        *counts.entry(b).or_insert(0) += 1;
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.values().copied().next(), Some(2));
    }

    #[test]
    fn identity_is_distinct_per_name_and_brand() {
        let a = lager();
        let mut other_name = lager();
        other_name.drink_name = "Stout".into();
        let mut other_brand = lager();
        other_brand.brand_name = "BrandY".into();
        assert_ne!(a, other_name);
        assert_ne!(a, other_brand);
    }

    #[test]
    fn identity_is_case_sensitive() {
        let a = lager();
        let mut b = lager();
        b.drink_name = "lager".into();
        assert_ne!(a, b);
    }
}
