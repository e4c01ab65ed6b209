use sqlx::{FromRow, PgPool};

use super::model::{finite_or_zero, DrinkRecord};

/// Raw catalog row. Nutritional columns are nullable and untrusted;
/// normalization into `DrinkRecord` happens here and nowhere else.
#[derive(Debug, Clone, FromRow)]
struct DrinkRow {
    drink_name: String,
    brand_name: String,
    drink_type: Option<String>,
    abv: Option<f64>,
    calories: Option<f64>,
    carbohydrates: Option<String>,
    sugars: Option<String>,
    proteins: Option<String>,
    fats: Option<String>,
    serving_size: Option<String>,
    alcohol_units: Option<f64>,
}

impl From<DrinkRow> for DrinkRecord {
    fn from(row: DrinkRow) -> Self {
        DrinkRecord {
            drink_name: row.drink_name,
            brand_name: row.brand_name,
            drink_type: row.drink_type.unwrap_or_default(),
            abv: finite_or_zero(row.abv.unwrap_or(0.0)).max(0.0),
            calories: finite_or_zero(row.calories.unwrap_or(0.0)),
            carbohydrates: row.carbohydrates.unwrap_or_default(),
            sugars: row.sugars.unwrap_or_default(),
            proteins: row.proteins.unwrap_or_default(),
            fats: row.fats.unwrap_or_default(),
            serving_size: row.serving_size.unwrap_or_default(),
            alcohol_units: finite_or_zero(row.alcohol_units.unwrap_or(0.0)).max(0.0),
        }
    }
}

pub async fn search(
    db: &PgPool,
    query: &str,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<DrinkRecord>> {
    let rows = sqlx::query_as::<_, DrinkRow>(
        r#"
        SELECT drink_name, brand_name, drink_type, abv, calories,
               carbohydrates, sugars, proteins, fats, serving_size, alcohol_units
        FROM drinks
        WHERE drink_name ILIKE $1 OR brand_name ILIKE $1
        ORDER BY brand_name, drink_name
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(format!("%{}%", query))
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().map(DrinkRecord::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_normalization_defaults_missing_fields() {
        let row = DrinkRow {
            drink_name: "Lager".into(),
            brand_name: "BrandX".into(),
            drink_type: None,
            abv: Some(f64::NAN),
            calories: None,
            carbohydrates: Some("13g".into()),
            sugars: None,
            proteins: None,
            fats: None,
            serving_size: None,
            alcohol_units: Some(-1.0),
        };
        let drink = DrinkRecord::from(row);

        assert_eq!(drink.abv, 0.0);
        assert_eq!(drink.calories, 0.0);
        assert_eq!(drink.alcohol_units, 0.0);
        assert_eq!(drink.carbohydrates_g(), 13.0);
        assert_eq!(drink.proteins_g(), 0.0);
    }
}
