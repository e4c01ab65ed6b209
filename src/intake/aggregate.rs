use std::collections::HashMap;

use crate::catalog::model::{finite_or_zero, DrinkRecord};

/// Session-local consumption state: a multiset of drinks plus five running
/// totals. Totals always equal the sum of each drink's contribution times its
/// count; the per-total `max(0.0)` floors are a safety net against
/// floating-point drift and must not trigger under correct sequencing.
#[derive(Debug, Clone, Default)]
pub struct AggregateState {
    counts: HashMap<DrinkRecord, u32>,
    pub calories: f64,
    pub fat: f64,
    pub carbohydrates: f64,
    pub protein: f64,
    pub alcohol_units: f64,
}

impl AggregateState {
    pub fn counts(&self) -> &HashMap<DrinkRecord, u32> {
        &self.counts
    }

    pub fn count_of(&self, drink: &DrinkRecord) -> u32 {
        self.counts.get(drink).copied().unwrap_or(0)
    }

    pub(crate) fn add(&mut self, drink: &DrinkRecord) {
        *self.counts.entry(drink.clone()).or_insert(0) += 1;
        self.calories = (self.calories + finite_or_zero(drink.calories)).max(0.0);
        self.fat = (self.fat + drink.fats_g()).max(0.0);
        self.carbohydrates = (self.carbohydrates + drink.carbohydrates_g()).max(0.0);
        self.protein = (self.protein + drink.proteins_g()).max(0.0);
        self.alcohol_units = (self.alcohol_units + finite_or_zero(drink.alcohol_units)).max(0.0);
    }

    /// Returns false (and changes nothing) when the drink is not present.
    /// A count that reaches zero is removed outright, never stored.
    pub(crate) fn remove(&mut self, drink: &DrinkRecord) -> bool {
        let Some(&count) = self.counts.get(drink) else {
            return false;
        };
        if count > 1 {
            self.counts.insert(drink.clone(), count - 1);
        } else {
            self.counts.remove(drink);
        }
        // Floors apply per total; one hitting zero does not affect the rest.
        self.calories = (self.calories - finite_or_zero(drink.calories)).max(0.0);
        self.fat = (self.fat - drink.fats_g()).max(0.0);
        self.carbohydrates = (self.carbohydrates - drink.carbohydrates_g()).max(0.0);
        self.protein = (self.protein - drink.proteins_g()).max(0.0);
        self.alcohol_units = (self.alcohol_units - finite_or_zero(drink.alcohol_units)).max(0.0);
        true
    }
}
