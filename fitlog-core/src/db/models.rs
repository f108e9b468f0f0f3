use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::FromRow;

use crate::db::choices::{Gender, ServingType, WeightUnit};

const DATE_FORMAT: &str = "%Y-%m-%d";

// User accounts
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub is_active: bool,
    pub is_superuser: bool,
    pub date_joined: NaiveDateTime,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Only active staff accounts may use the admin surface.
    pub fn can_use_admin(&self) -> bool {
        self.is_active && self.is_staff
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.username)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub is_active: bool,
    pub is_superuser: bool,
}

impl NewUser {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            is_staff: false,
            is_active: true,
            is_superuser: false,
        }
    }
}

impl From<&User> for NewUser {
    fn from(u: &User) -> Self {
        Self {
            username: u.username.clone(),
            email: u.email.clone(),
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            is_staff: u.is_staff,
            is_active: u.is_active,
            is_superuser: u.is_superuser,
        }
    }
}

/// Account row joined with its profile goal, for the account changelist.
#[derive(Debug, Clone, FromRow)]
pub struct UserWithGoal {
    #[sqlx(flatten)]
    pub user: User,
    pub goal: Option<String>,
}

// Profiles
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct UserProfile {
    pub id: i64,
    pub user_id: i64,
    pub gender: Option<Gender>,
    pub birthdate: Option<NaiveDate>,
    pub height_in_meters: Option<f64>,
    pub favorite_fitness_hobby: String,
    pub profile_image: Option<String>,
    pub goal: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateProfile {
    pub gender: Option<Gender>,
    pub birthdate: Option<NaiveDate>,
    pub height_in_meters: Option<f64>,
    pub favorite_fitness_hobby: String,
    pub profile_image: Option<String>,
    pub goal: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DisplayableProfile {
    #[sqlx(flatten)]
    pub profile: UserProfile,
    pub username: String,
}

impl fmt::Display for DisplayableProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.username)
    }
}

// Body weight
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct UserWeight {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub weight: f64,
    pub unit: WeightUnit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUserWeight {
    pub user_id: i64,
    pub date: NaiveDate,
    pub weight: f64,
    pub unit: WeightUnit,
}

#[derive(Debug, Clone, FromRow)]
pub struct DisplayableUserWeight {
    #[sqlx(flatten)]
    pub entry: UserWeight,
    pub username: String,
}

impl fmt::Display for DisplayableUserWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {} {}",
            self.username,
            self.entry.date.format(DATE_FORMAT),
            self.entry.weight,
            self.entry.unit
        )
    }
}

// Foods
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Food {
    pub id: i64,
    pub name: String,
    pub default_serving_type: ServingType,
    pub serving_type_qty: f64,
    pub calories: i64,
    pub fat: f64,
    pub saturated_fat: f64,
    pub carbs: f64,
    pub fiber: f64,
    pub sugar: f64,
    pub protein: f64,
    pub sodium: f64,
}

impl fmt::Display for Food {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} {}",
            self.name, self.serving_type_qty, self.default_serving_type
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewFood {
    pub name: String,
    pub default_serving_type: ServingType,
    pub serving_type_qty: f64,
    pub calories: i64,
    pub fat: f64,
    pub saturated_fat: f64,
    pub carbs: f64,
    pub fiber: f64,
    pub sugar: f64,
    pub protein: f64,
    pub sodium: f64,
}

// Food eaten
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct FoodEaten {
    pub id: i64,
    pub user_id: i64,
    pub food_id: i64,
    pub date: NaiveDate,
    pub serving_type: ServingType,
    pub serving_qty: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewFoodEaten {
    pub user_id: i64,
    pub food_id: i64,
    pub date: NaiveDate,
    pub serving_type: ServingType,
    pub serving_qty: f64,
}

#[derive(Debug, Clone, FromRow)]
pub struct DisplayableFoodEaten {
    #[sqlx(flatten)]
    pub entry: FoodEaten,
    pub username: String,
    pub food_name: String,
}

impl fmt::Display for DisplayableFoodEaten {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {} - {} {} {}",
            self.username,
            self.entry.date.format(DATE_FORMAT),
            self.food_name,
            self.entry.serving_qty,
            self.entry.serving_type
        )
    }
}

// Muscles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Muscle {
    pub id: i64,
    pub name: String,
}

impl fmt::Display for Muscle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// Exercises
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub upper_body: bool,
    pub lower_body: bool,
    pub is_explosive: bool,
    pub is_cardio: bool,
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewExercise {
    pub name: String,
    pub description: String,
    pub upper_body: bool,
    pub lower_body: bool,
    pub is_explosive: bool,
    pub is_cardio: bool,
    /// Muscle ids linked through the muscle-group set.
    pub muscle_group: Vec<i64>,
}

impl NewExercise {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

// Exercise performed
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct ExercisePerformed {
    pub id: i64,
    pub user_id: i64,
    pub exercise_id: i64,
    pub date: NaiveDate,
    pub minutes: i64,
    pub repetitions: i64,
    pub weight: i64,
    pub unit: WeightUnit,
    pub bodyweight: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExercisePerformed {
    pub user_id: i64,
    pub exercise_id: i64,
    pub date: NaiveDate,
    pub minutes: i64,
    pub repetitions: i64,
    pub weight: i64,
    pub unit: WeightUnit,
    pub bodyweight: bool,
}

impl NewExercisePerformed {
    pub fn new(user_id: i64, exercise_id: i64, date: NaiveDate) -> Self {
        Self {
            user_id,
            exercise_id,
            date,
            minutes: 0,
            repetitions: 0,
            weight: 0,
            unit: WeightUnit::default(),
            bodyweight: false,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DisplayableExercisePerformed {
    #[sqlx(flatten)]
    pub entry: ExercisePerformed,
    pub username: String,
    pub exercise_name: String,
}

impl fmt::Display for DisplayableExercisePerformed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {} - {}",
            self.username,
            self.entry.date.format(DATE_FORMAT),
            self.exercise_name
        )
    }
}
