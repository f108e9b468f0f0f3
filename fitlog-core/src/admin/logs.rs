//! Admin for per-user logged entries.

use sqlx::SqlitePool;

use crate::admin::forms::{
    CleanedData, FieldKind, FieldSpec, FormData, format_bool, format_date,
};
use crate::admin::registry::Entity;
use crate::admin::{AdminModel, ChangeListRow, InlineData};
use crate::db::choices::{Choice, ServingType, WeightUnit};
use crate::db::models::{
    DisplayableExercisePerformed, DisplayableFoodEaten, DisplayableUserWeight,
    NewExercisePerformed, NewFoodEaten, NewUserWeight,
};
use crate::db::operations::{
    add_exercise_performed, add_food_eaten, add_user_weight, delete_exercise_performed,
    delete_food_eaten, delete_user_weight, get_all_exercise_performed, get_all_food_eaten,
    get_all_user_weights, get_exercise, get_exercise_performed, get_food, get_food_eaten,
    get_user, get_user_weight, update_exercise_performed, update_food_eaten, update_user_weight,
};
use crate::errors::Result;

pub const USER_WEIGHT_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("user", "User", FieldKind::ForeignKey(Entity::User)),
    FieldSpec::new("date", "Date", FieldKind::Date),
    FieldSpec::new("weight", "Weight", FieldKind::Float),
    FieldSpec::new("unit", "Unit", FieldKind::Choice(WeightUnit::choices)).default("KG"),
];

pub const FOOD_EATEN_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("user", "User", FieldKind::ForeignKey(Entity::User)),
    FieldSpec::new("food", "Food", FieldKind::ForeignKey(Entity::Food)),
    FieldSpec::new("date", "Date", FieldKind::Date),
    FieldSpec::new("serving_type", "Serving type", FieldKind::Choice(ServingType::choices)),
    FieldSpec::new("serving_qty", "Serving qty", FieldKind::Float),
];

pub const EXERCISE_PERFORMED_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("user", "User", FieldKind::ForeignKey(Entity::User)),
    FieldSpec::new("exercise", "Exercise", FieldKind::ForeignKey(Entity::Exercise)),
    FieldSpec::new("date", "Date", FieldKind::Date),
    FieldSpec::new("minutes", "Minutes", FieldKind::Integer).default("0"),
    FieldSpec::new("repetitions", "Repetitions", FieldKind::PositiveInteger).default("0"),
    FieldSpec::new("weight", "Weight", FieldKind::PositiveInteger).default("0"),
    FieldSpec::new("unit", "Unit", FieldKind::Choice(WeightUnit::choices)).default("KG"),
    FieldSpec::new("bodyweight", "Bodyweight", FieldKind::Boolean),
];

fn label_row(id: i64, label: String) -> ChangeListRow {
    ChangeListRow {
        id,
        cells: vec![label.clone()],
        label,
    }
}

pub(crate) struct UserWeightAdmin;

fn new_user_weight(data: &CleanedData) -> Result<NewUserWeight> {
    Ok(NewUserWeight {
        user_id: data.require_reference("user")?,
        date: data.require_date("date")?,
        weight: data.require_float("weight")?,
        unit: data.choice("unit").unwrap_or_default(),
    })
}

impl AdminModel for UserWeightAdmin {
    fn fields() -> &'static [FieldSpec] {
        USER_WEIGHT_FIELDS
    }

    async fn rows(pool: &SqlitePool, search: Option<&str>) -> Result<Vec<ChangeListRow>> {
        let entries = get_all_user_weights(pool, search).await?;
        Ok(entries
            .into_iter()
            .map(|e| label_row(e.entry.id, e.to_string()))
            .collect())
    }

    async fn label(pool: &SqlitePool, id: i64) -> Result<String> {
        let entry = get_user_weight(pool, id).await?;
        let username = get_user(pool, entry.user_id).await?.username;
        Ok(DisplayableUserWeight { entry, username }.to_string())
    }

    async fn initial(pool: &SqlitePool, id: i64) -> Result<FormData> {
        let entry = get_user_weight(pool, id).await?;
        Ok(FormData::from([
            ("user".to_string(), entry.user_id.to_string()),
            ("date".to_string(), format_date(entry.date)),
            ("weight".to_string(), entry.weight.to_string()),
            ("unit".to_string(), entry.unit.value().to_string()),
        ]))
    }

    async fn create(pool: &SqlitePool, data: &CleanedData) -> Result<i64> {
        Ok(add_user_weight(pool, &new_user_weight(data)?).await?.id)
    }

    async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &CleanedData,
        _inlines: &InlineData,
    ) -> Result<()> {
        update_user_weight(pool, id, &new_user_weight(data)?).await?;
        Ok(())
    }

    async fn delete(pool: &SqlitePool, id: i64) -> Result<u64> {
        delete_user_weight(pool, id).await
    }
}

pub(crate) struct FoodEatenAdmin;

fn new_food_eaten(data: &CleanedData) -> Result<NewFoodEaten> {
    Ok(NewFoodEaten {
        user_id: data.require_reference("user")?,
        food_id: data.require_reference("food")?,
        date: data.require_date("date")?,
        serving_type: data.require_choice("serving_type")?,
        serving_qty: data.require_float("serving_qty")?,
    })
}

impl AdminModel for FoodEatenAdmin {
    fn fields() -> &'static [FieldSpec] {
        FOOD_EATEN_FIELDS
    }

    async fn rows(pool: &SqlitePool, search: Option<&str>) -> Result<Vec<ChangeListRow>> {
        let entries = get_all_food_eaten(pool, search).await?;
        Ok(entries
            .into_iter()
            .map(|e| label_row(e.entry.id, e.to_string()))
            .collect())
    }

    async fn label(pool: &SqlitePool, id: i64) -> Result<String> {
        let entry = get_food_eaten(pool, id).await?;
        let username = get_user(pool, entry.user_id).await?.username;
        let food_name = get_food(pool, entry.food_id).await?.name;
        Ok(DisplayableFoodEaten {
            entry,
            username,
            food_name,
        }
        .to_string())
    }

    async fn initial(pool: &SqlitePool, id: i64) -> Result<FormData> {
        let entry = get_food_eaten(pool, id).await?;
        Ok(FormData::from([
            ("user".to_string(), entry.user_id.to_string()),
            ("food".to_string(), entry.food_id.to_string()),
            ("date".to_string(), format_date(entry.date)),
            ("serving_type".to_string(), entry.serving_type.value().to_string()),
            ("serving_qty".to_string(), entry.serving_qty.to_string()),
        ]))
    }

    async fn create(pool: &SqlitePool, data: &CleanedData) -> Result<i64> {
        Ok(add_food_eaten(pool, &new_food_eaten(data)?).await?.id)
    }

    async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &CleanedData,
        _inlines: &InlineData,
    ) -> Result<()> {
        update_food_eaten(pool, id, &new_food_eaten(data)?).await?;
        Ok(())
    }

    async fn delete(pool: &SqlitePool, id: i64) -> Result<u64> {
        delete_food_eaten(pool, id).await
    }
}

pub(crate) struct ExercisePerformedAdmin;

fn new_exercise_performed(data: &CleanedData) -> Result<NewExercisePerformed> {
    Ok(NewExercisePerformed {
        user_id: data.require_reference("user")?,
        exercise_id: data.require_reference("exercise")?,
        date: data.require_date("date")?,
        minutes: data.int("minutes").unwrap_or(0),
        repetitions: data.int("repetitions").unwrap_or(0),
        weight: data.int("weight").unwrap_or(0),
        unit: data.choice("unit").unwrap_or_default(),
        bodyweight: data.boolean("bodyweight"),
    })
}

impl AdminModel for ExercisePerformedAdmin {
    fn fields() -> &'static [FieldSpec] {
        EXERCISE_PERFORMED_FIELDS
    }

    async fn rows(pool: &SqlitePool, search: Option<&str>) -> Result<Vec<ChangeListRow>> {
        let entries = get_all_exercise_performed(pool, search).await?;
        Ok(entries
            .into_iter()
            .map(|e| label_row(e.entry.id, e.to_string()))
            .collect())
    }

    async fn label(pool: &SqlitePool, id: i64) -> Result<String> {
        let entry = get_exercise_performed(pool, id).await?;
        let username = get_user(pool, entry.user_id).await?.username;
        let exercise_name = get_exercise(pool, entry.exercise_id).await?.name;
        Ok(DisplayableExercisePerformed {
            entry,
            username,
            exercise_name,
        }
        .to_string())
    }

    async fn initial(pool: &SqlitePool, id: i64) -> Result<FormData> {
        let entry = get_exercise_performed(pool, id).await?;
        Ok(FormData::from([
            ("user".to_string(), entry.user_id.to_string()),
            ("exercise".to_string(), entry.exercise_id.to_string()),
            ("date".to_string(), format_date(entry.date)),
            ("minutes".to_string(), entry.minutes.to_string()),
            ("repetitions".to_string(), entry.repetitions.to_string()),
            ("weight".to_string(), entry.weight.to_string()),
            ("unit".to_string(), entry.unit.value().to_string()),
            ("bodyweight".to_string(), format_bool(entry.bodyweight)),
        ]))
    }

    async fn create(pool: &SqlitePool, data: &CleanedData) -> Result<i64> {
        Ok(add_exercise_performed(pool, &new_exercise_performed(data)?)
            .await?
            .id)
    }

    async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &CleanedData,
        _inlines: &InlineData,
    ) -> Result<()> {
        update_exercise_performed(pool, id, &new_exercise_performed(data)?).await?;
        Ok(())
    }

    async fn delete(pool: &SqlitePool, id: i64) -> Result<u64> {
        delete_exercise_performed(pool, id).await
    }
}
