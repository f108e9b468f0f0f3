use sqlx::SqlitePool;

use crate::admin::forms::{
    CleanedData, FieldKind, FieldSpec, FormData, format_bool, format_refs,
};
use crate::admin::registry::Entity;
use crate::admin::{AdminModel, ChangeListRow, InlineData, RelatedCount, count_related};
use crate::db::choices::{Choice, ServingType};
use crate::db::models::{NewExercise, NewFood};
use crate::db::operations::{
    create_exercise, create_food, create_muscle, delete_exercise, delete_food, delete_muscle,
    get_all_exercises, get_all_foods, get_all_muscles, get_exercise, get_food, get_muscle,
    get_muscles_for_exercise, update_exercise, update_food, update_muscle,
};
use crate::errors::Result;

pub const FOOD_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("name", "Name", FieldKind::Char { max_length: 50 }),
    FieldSpec::new(
        "default_serving_type",
        "Default serving type",
        FieldKind::Choice(ServingType::choices),
    ),
    FieldSpec::new("serving_type_qty", "Serving type qty", FieldKind::Float),
    FieldSpec::new("calories", "Calories", FieldKind::Integer),
    FieldSpec::new("fat", "Fat", FieldKind::Float),
    FieldSpec::new("saturated_fat", "Saturated fat", FieldKind::Float),
    FieldSpec::new("carbs", "Carbs", FieldKind::Float),
    FieldSpec::new("fiber", "Fiber", FieldKind::Float),
    FieldSpec::new("sugar", "Sugar", FieldKind::Float),
    FieldSpec::new("protein", "Protein", FieldKind::Float),
    FieldSpec::new("sodium", "Sodium", FieldKind::Float),
];

pub const MUSCLE_FIELDS: &[FieldSpec] = &[FieldSpec::new(
    "name",
    "Name",
    FieldKind::Char { max_length: 250 },
)];

pub const EXERCISE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("name", "Name", FieldKind::Char { max_length: 250 }),
    FieldSpec::new(
        "muscle_group",
        "Muscle group",
        FieldKind::ManyToMany(Entity::Muscle),
    ),
    FieldSpec::new("description", "Description", FieldKind::Text).optional(),
    FieldSpec::new("upper_body", "Upper body", FieldKind::Boolean)
        .help("ex: Bench Press, Shoulder Press, Shrugs"),
    FieldSpec::new("lower_body", "Lower body", FieldKind::Boolean)
        .help("ex: Squats, Lunges, Deadlifts"),
    FieldSpec::new("is_explosive", "Is explosive", FieldKind::Boolean)
        .help("ex: Hang Cleans, Box Jumps, Hang Snatch"),
    FieldSpec::new("is_cardio", "Is cardio", FieldKind::Boolean)
        .help("ex: Jogging, Cycling, 110s"),
];

fn label_row(id: i64, label: String) -> ChangeListRow {
    ChangeListRow {
        id,
        cells: vec![label.clone()],
        label,
    }
}

pub(crate) struct FoodAdmin;

fn new_food(data: &CleanedData) -> Result<NewFood> {
    Ok(NewFood {
        name: data.text("name"),
        default_serving_type: data.require_choice("default_serving_type")?,
        serving_type_qty: data.require_float("serving_type_qty")?,
        calories: data.require_int("calories")?,
        fat: data.require_float("fat")?,
        saturated_fat: data.require_float("saturated_fat")?,
        carbs: data.require_float("carbs")?,
        fiber: data.require_float("fiber")?,
        sugar: data.require_float("sugar")?,
        protein: data.require_float("protein")?,
        sodium: data.require_float("sodium")?,
    })
}

impl AdminModel for FoodAdmin {
    fn fields() -> &'static [FieldSpec] {
        FOOD_FIELDS
    }

    async fn rows(pool: &SqlitePool, search: Option<&str>) -> Result<Vec<ChangeListRow>> {
        let foods = get_all_foods(pool, search).await?;
        Ok(foods
            .into_iter()
            .map(|f| label_row(f.id, f.to_string()))
            .collect())
    }

    async fn label(pool: &SqlitePool, id: i64) -> Result<String> {
        Ok(get_food(pool, id).await?.to_string())
    }

    async fn initial(pool: &SqlitePool, id: i64) -> Result<FormData> {
        let food = get_food(pool, id).await?;
        Ok(FormData::from([
            ("name".to_string(), food.name.clone()),
            (
                "default_serving_type".to_string(),
                food.default_serving_type.value().to_string(),
            ),
            ("serving_type_qty".to_string(), food.serving_type_qty.to_string()),
            ("calories".to_string(), food.calories.to_string()),
            ("fat".to_string(), food.fat.to_string()),
            ("saturated_fat".to_string(), food.saturated_fat.to_string()),
            ("carbs".to_string(), food.carbs.to_string()),
            ("fiber".to_string(), food.fiber.to_string()),
            ("sugar".to_string(), food.sugar.to_string()),
            ("protein".to_string(), food.protein.to_string()),
            ("sodium".to_string(), food.sodium.to_string()),
        ]))
    }

    async fn create(pool: &SqlitePool, data: &CleanedData) -> Result<i64> {
        Ok(create_food(pool, &new_food(data)?).await?.id)
    }

    async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &CleanedData,
        _inlines: &InlineData,
    ) -> Result<()> {
        update_food(pool, id, &new_food(data)?).await?;
        Ok(())
    }

    async fn related(pool: &SqlitePool, id: i64) -> Result<Vec<RelatedCount>> {
        Ok(vec![
            count_related(pool, "food eaten", "food_eaten", "food_id", id).await?,
        ])
    }

    async fn delete(pool: &SqlitePool, id: i64) -> Result<u64> {
        delete_food(pool, id).await
    }
}

pub(crate) struct MuscleAdmin;

impl AdminModel for MuscleAdmin {
    fn fields() -> &'static [FieldSpec] {
        MUSCLE_FIELDS
    }

    async fn rows(pool: &SqlitePool, search: Option<&str>) -> Result<Vec<ChangeListRow>> {
        let muscles = get_all_muscles(pool, search).await?;
        Ok(muscles
            .into_iter()
            .map(|m| label_row(m.id, m.name))
            .collect())
    }

    async fn label(pool: &SqlitePool, id: i64) -> Result<String> {
        Ok(get_muscle(pool, id).await?.name)
    }

    async fn initial(pool: &SqlitePool, id: i64) -> Result<FormData> {
        let muscle = get_muscle(pool, id).await?;
        Ok(FormData::from([("name".to_string(), muscle.name)]))
    }

    async fn create(pool: &SqlitePool, data: &CleanedData) -> Result<i64> {
        Ok(create_muscle(pool, &data.text("name")).await?.id)
    }

    async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &CleanedData,
        _inlines: &InlineData,
    ) -> Result<()> {
        update_muscle(pool, id, &data.text("name")).await?;
        Ok(())
    }

    async fn related(pool: &SqlitePool, id: i64) -> Result<Vec<RelatedCount>> {
        Ok(vec![
            count_related(
                pool,
                "exercise-muscle relationship",
                "exercise_muscle_groups",
                "muscle_id",
                id,
            )
            .await?,
        ])
    }

    async fn delete(pool: &SqlitePool, id: i64) -> Result<u64> {
        delete_muscle(pool, id).await
    }
}

pub(crate) struct ExerciseAdmin;

fn new_exercise(data: &CleanedData) -> NewExercise {
    NewExercise {
        name: data.text("name"),
        description: data.text("description"),
        upper_body: data.boolean("upper_body"),
        lower_body: data.boolean("lower_body"),
        is_explosive: data.boolean("is_explosive"),
        is_cardio: data.boolean("is_cardio"),
        muscle_group: data.references("muscle_group"),
    }
}

impl AdminModel for ExerciseAdmin {
    fn fields() -> &'static [FieldSpec] {
        EXERCISE_FIELDS
    }

    async fn rows(pool: &SqlitePool, search: Option<&str>) -> Result<Vec<ChangeListRow>> {
        let exercises = get_all_exercises(pool, search).await?;
        Ok(exercises
            .into_iter()
            .map(|e| label_row(e.id, e.name))
            .collect())
    }

    async fn label(pool: &SqlitePool, id: i64) -> Result<String> {
        Ok(get_exercise(pool, id).await?.name)
    }

    async fn initial(pool: &SqlitePool, id: i64) -> Result<FormData> {
        let exercise = get_exercise(pool, id).await?;
        let muscle_ids: Vec<i64> = get_muscles_for_exercise(pool, id)
            .await?
            .iter()
            .map(|m| m.id)
            .collect();
        Ok(FormData::from([
            ("name".to_string(), exercise.name),
            ("muscle_group".to_string(), format_refs(&muscle_ids)),
            ("description".to_string(), exercise.description),
            ("upper_body".to_string(), format_bool(exercise.upper_body)),
            ("lower_body".to_string(), format_bool(exercise.lower_body)),
            ("is_explosive".to_string(), format_bool(exercise.is_explosive)),
            ("is_cardio".to_string(), format_bool(exercise.is_cardio)),
        ]))
    }

    async fn create(pool: &SqlitePool, data: &CleanedData) -> Result<i64> {
        Ok(create_exercise(pool, &new_exercise(data)).await?.id)
    }

    async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &CleanedData,
        _inlines: &InlineData,
    ) -> Result<()> {
        update_exercise(pool, id, &new_exercise(data)).await?;
        Ok(())
    }

    async fn related(pool: &SqlitePool, id: i64) -> Result<Vec<RelatedCount>> {
        Ok(vec![
            count_related(
                pool,
                "exercise performed",
                "exercise_performed",
                "exercise_id",
                id,
            )
            .await?,
            count_related(
                pool,
                "exercise-muscle relationship",
                "exercise_muscle_groups",
                "exercise_id",
                id,
            )
            .await?,
        ])
    }

    async fn delete(pool: &SqlitePool, id: i64) -> Result<u64> {
        delete_exercise(pool, id).await
    }
}
