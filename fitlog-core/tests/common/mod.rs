#![allow(dead_code)]

use chrono::NaiveDate;
use sqlx::SqlitePool;

use fitlog::db::choices::ServingType;
use fitlog::db::connect;
use fitlog::db::models::{Exercise, Food, Muscle, NewExercise, NewFood, NewUser, User};
use fitlog::db::operations::{create_exercise, create_food, create_muscle, create_user};

pub async fn pool() -> SqlitePool {
    connect("sqlite::memory:").await.unwrap()
}

pub fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub async fn user(pool: &SqlitePool, username: &str) -> User {
    create_user(pool, &NewUser::new(username)).await.unwrap()
}

pub async fn staff(pool: &SqlitePool, username: &str) -> User {
    let new_user = NewUser {
        is_staff: true,
        ..NewUser::new(username)
    };
    create_user(pool, &new_user).await.unwrap()
}

pub fn new_food(name: &str) -> NewFood {
    NewFood {
        name: name.to_string(),
        default_serving_type: ServingType::Cup,
        serving_type_qty: 0.5,
        calories: 150,
        fat: 2.5,
        saturated_fat: 0.5,
        carbs: 27.0,
        fiber: 4.0,
        sugar: 1.0,
        protein: 5.0,
        sodium: 0.0,
    }
}

pub async fn food(pool: &SqlitePool, name: &str) -> Food {
    create_food(pool, &new_food(name)).await.unwrap()
}

pub async fn muscle(pool: &SqlitePool, name: &str) -> Muscle {
    create_muscle(pool, name).await.unwrap()
}

pub async fn exercise(pool: &SqlitePool, name: &str, muscles: &[i64]) -> Exercise {
    let new_exercise = NewExercise {
        muscle_group: muscles.to_vec(),
        ..NewExercise::new(name)
    };
    create_exercise(pool, &new_exercise).await.unwrap()
}
