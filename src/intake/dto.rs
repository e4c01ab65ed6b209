use serde::Serialize;

use super::aggregate::AggregateState;
use crate::ledger::WeekDrink;

#[derive(Debug, Serialize)]
pub struct DrinkCount {
    pub drink_name: String,
    pub brand_name: String,
    pub count: u32,
}

#[derive(Debug, Serialize)]
pub struct TotalsResponse {
    pub drinks: Vec<DrinkCount>,
    pub calories: f64,
    pub fat: f64,
    pub carbohydrates: f64,
    pub protein: f64,
    pub alcohol_units: f64,
}

impl TotalsResponse {
    pub fn from_snapshot(state: &AggregateState) -> Self {
        let mut drinks: Vec<DrinkCount> = state
            .counts()
            .iter()
            .map(|(drink, &count)| DrinkCount {
                drink_name: drink.drink_name.clone(),
                brand_name: drink.brand_name.clone(),
                count,
            })
            .collect();
        drinks.sort_by(|a, b| {
            (a.brand_name.as_str(), a.drink_name.as_str())
                .cmp(&(b.brand_name.as_str(), b.drink_name.as_str()))
        });
        Self {
            drinks,
            calories: state.calories,
            fat: state.fat,
            carbohydrates: state.carbohydrates,
            protein: state.protein,
            alcohol_units: state.alcohol_units,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WeekResponse {
    pub week_id: String,
    pub drinks: Vec<WeekDrink>,
}
