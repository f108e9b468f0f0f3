use chrono::Utc;
use log::{debug, info};
use sqlx::{SqliteConnection, SqlitePool};

use crate::db::models::{
    DisplayableExercisePerformed, DisplayableFoodEaten, DisplayableProfile,
    DisplayableUserWeight, Exercise, ExercisePerformed, Food, FoodEaten, Muscle, NewExercise,
    NewExercisePerformed, NewFood, NewFoodEaten, NewUser, NewUserWeight, UpdateProfile, User,
    UserProfile, UserWeight, UserWithGoal,
};
use crate::errors::{FitnessError, Result};

/// Substring pattern for `LIKE ?1 ESCAPE '\'`; wildcards in the search match literally.
fn like_pattern(search: Option<&str>) -> Option<String> {
    search.map(str::trim).filter(|s| !s.is_empty()).map(|s| {
        let escaped = s
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        format!("%{}%", escaped)
    })
}

pub(crate) async fn record_exists(pool: &SqlitePool, table: &str, id: i64) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table} WHERE id = ?1"))
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

// Users

/// Create an account together with its profile in one transaction.
pub async fn create_user(pool: &SqlitePool, new_user: &NewUser) -> Result<User> {
    let mut tx = pool.begin().await?;
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (username, email, first_name, last_name, is_staff, is_active, is_superuser, date_joined)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         RETURNING *",
    )
    .bind(&new_user.username)
    .bind(&new_user.email)
    .bind(&new_user.first_name)
    .bind(&new_user.last_name)
    .bind(new_user.is_staff)
    .bind(new_user.is_active)
    .bind(new_user.is_superuser)
    .bind(Utc::now().naive_utc())
    .fetch_one(&mut *tx)
    .await?;

    sync_profile(&mut tx, &user, true).await?;
    tx.commit().await?;
    info!("Created user {} ({})", user.username, user.id);
    Ok(user)
}

/// Save an existing account and make sure its profile exists afterwards.
pub async fn save_user(pool: &SqlitePool, user_id: i64, fields: &NewUser) -> Result<User> {
    save_user_with_profile(pool, user_id, fields, None).await
}

/// Save an account and, when given, its profile fields in one transaction.
pub async fn save_user_with_profile(
    pool: &SqlitePool,
    user_id: i64,
    fields: &NewUser,
    profile: Option<&UpdateProfile>,
) -> Result<User> {
    let mut tx = pool.begin().await?;
    let user = sqlx::query_as::<_, User>(
        "UPDATE users
         SET username = ?1, email = ?2, first_name = ?3, last_name = ?4,
             is_staff = ?5, is_active = ?6, is_superuser = ?7
         WHERE id = ?8
         RETURNING *",
    )
    .bind(&fields.username)
    .bind(&fields.email)
    .bind(&fields.first_name)
    .bind(&fields.last_name)
    .bind(fields.is_staff)
    .bind(fields.is_active)
    .bind(fields.is_superuser)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| FitnessError::not_found("User", user_id))?;

    sync_profile(&mut tx, &user, false).await?;
    if let Some(profile) = profile {
        write_profile(&mut tx, user.id, profile).await?;
    }
    tx.commit().await?;
    info!("Saved user {} ({})", user.username, user.id);
    Ok(user)
}

/// Profile half of every account save. A freshly created account always gets
/// a new profile; older accounts get one on their first save.
async fn sync_profile(conn: &mut SqliteConnection, user: &User, created: bool) -> Result<UserProfile> {
    if created {
        sqlx::query("INSERT INTO user_profiles (user_id) VALUES (?1)")
            .bind(user.id)
            .execute(&mut *conn)
            .await?;
    } else {
        let inserted = sqlx::query(
            "INSERT INTO user_profiles (user_id) VALUES (?1) ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user.id)
        .execute(&mut *conn)
        .await?
        .rows_affected();
        if inserted > 0 {
            info!("Created missing profile for user {}", user.username);
        }
    }

    let profile = sqlx::query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE user_id = ?1")
        .bind(user.id)
        .fetch_one(&mut *conn)
        .await?;
    debug!("Profile {} synchronized for user {}", profile.id, user.username);
    Ok(profile)
}

pub async fn get_user(pool: &SqlitePool, user_id: i64) -> Result<User> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| FitnessError::not_found("User", user_id))
}

pub async fn get_user_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?1")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Accounts ordered by username, each with its profile goal.
pub async fn get_all_users(pool: &SqlitePool, search: Option<&str>) -> Result<Vec<UserWithGoal>> {
    let users = sqlx::query_as::<_, UserWithGoal>(
        "SELECT u.*, p.goal AS goal
         FROM users u
         LEFT JOIN user_profiles p ON p.user_id = u.id
         WHERE ?1 IS NULL
            OR u.username LIKE ?1 ESCAPE '\\' OR u.first_name LIKE ?1 ESCAPE '\\'
            OR u.last_name LIKE ?1 ESCAPE '\\' OR u.email LIKE ?1 ESCAPE '\\'
         ORDER BY u.username",
    )
    .bind(like_pattern(search))
    .fetch_all(pool)
    .await?;
    Ok(users)
}

pub async fn delete_user(pool: &SqlitePool, user_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?1")
        .bind(user_id)
        .execute(pool)
        .await?;
    info!("Deleted user {}", user_id);
    Ok(result.rows_affected())
}

// Profiles

pub async fn get_profile_for_user(pool: &SqlitePool, user_id: i64) -> Result<UserProfile> {
    sqlx::query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE user_id = ?1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| FitnessError::not_found("User profile", user_id))
}

pub async fn count_profiles_for_user(pool: &SqlitePool, user_id: i64) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM user_profiles WHERE user_id = ?1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn update_profile(
    pool: &SqlitePool,
    user_id: i64,
    fields: &UpdateProfile,
) -> Result<UserProfile> {
    let mut conn = pool.acquire().await?;
    write_profile(&mut conn, user_id, fields).await
}

async fn write_profile(
    conn: &mut SqliteConnection,
    user_id: i64,
    fields: &UpdateProfile,
) -> Result<UserProfile> {
    let profile = sqlx::query_as::<_, UserProfile>(
        "UPDATE user_profiles
         SET gender = ?1, birthdate = ?2, height_in_meters = ?3,
             favorite_fitness_hobby = ?4, profile_image = ?5, goal = ?6
         WHERE user_id = ?7
         RETURNING *",
    )
    .bind(fields.gender)
    .bind(fields.birthdate)
    .bind(fields.height_in_meters)
    .bind(&fields.favorite_fitness_hobby)
    .bind(&fields.profile_image)
    .bind(&fields.goal)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| FitnessError::not_found("User profile", user_id))?;
    info!("Updated profile for user {}", user_id);
    Ok(profile)
}

pub async fn get_all_profiles(pool: &SqlitePool) -> Result<Vec<DisplayableProfile>> {
    let profiles = sqlx::query_as::<_, DisplayableProfile>(
        "SELECT p.*, u.username AS username
         FROM user_profiles p
         JOIN users u ON u.id = p.user_id
         ORDER BY p.id",
    )
    .fetch_all(pool)
    .await?;
    Ok(profiles)
}

// Body weight

pub async fn add_user_weight(pool: &SqlitePool, new_weight: &NewUserWeight) -> Result<UserWeight> {
    let entry = sqlx::query_as::<_, UserWeight>(
        "INSERT INTO user_weights (user_id, date, weight, unit)
         VALUES (?1, ?2, ?3, ?4)
         RETURNING *",
    )
    .bind(new_weight.user_id)
    .bind(new_weight.date)
    .bind(new_weight.weight)
    .bind(new_weight.unit)
    .fetch_one(pool)
    .await?;
    info!("Logged weight {} for user {}", entry.id, entry.user_id);
    Ok(entry)
}

pub async fn update_user_weight(
    pool: &SqlitePool,
    weight_id: i64,
    fields: &NewUserWeight,
) -> Result<UserWeight> {
    sqlx::query_as::<_, UserWeight>(
        "UPDATE user_weights SET user_id = ?1, date = ?2, weight = ?3, unit = ?4
         WHERE id = ?5
         RETURNING *",
    )
    .bind(fields.user_id)
    .bind(fields.date)
    .bind(fields.weight)
    .bind(fields.unit)
    .bind(weight_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| FitnessError::not_found("User weight", weight_id))
}

pub async fn get_user_weight(pool: &SqlitePool, weight_id: i64) -> Result<UserWeight> {
    sqlx::query_as::<_, UserWeight>("SELECT * FROM user_weights WHERE id = ?1")
        .bind(weight_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| FitnessError::not_found("User weight", weight_id))
}

/// One user's weights, newest first.
pub async fn get_weights_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<UserWeight>> {
    let entries = sqlx::query_as::<_, UserWeight>(
        "SELECT * FROM user_weights WHERE user_id = ?1 ORDER BY date DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(entries)
}

pub async fn get_all_user_weights(
    pool: &SqlitePool,
    search: Option<&str>,
) -> Result<Vec<DisplayableUserWeight>> {
    let entries = sqlx::query_as::<_, DisplayableUserWeight>(
        "SELECT w.*, u.username AS username
         FROM user_weights w
         JOIN users u ON u.id = w.user_id
         WHERE ?1 IS NULL OR u.username LIKE ?1 ESCAPE '\\'
         ORDER BY w.user_id, w.date DESC",
    )
    .bind(like_pattern(search))
    .fetch_all(pool)
    .await?;
    Ok(entries)
}

pub async fn delete_user_weight(pool: &SqlitePool, weight_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM user_weights WHERE id = ?1")
        .bind(weight_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

// Foods

pub async fn create_food(pool: &SqlitePool, new_food: &NewFood) -> Result<Food> {
    let food = sqlx::query_as::<_, Food>(
        "INSERT INTO foods (name, default_serving_type, serving_type_qty, calories, fat,
                            saturated_fat, carbs, fiber, sugar, protein, sodium)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
         RETURNING *",
    )
    .bind(&new_food.name)
    .bind(new_food.default_serving_type)
    .bind(new_food.serving_type_qty)
    .bind(new_food.calories)
    .bind(new_food.fat)
    .bind(new_food.saturated_fat)
    .bind(new_food.carbs)
    .bind(new_food.fiber)
    .bind(new_food.sugar)
    .bind(new_food.protein)
    .bind(new_food.sodium)
    .fetch_one(pool)
    .await?;
    info!("Created food {} ({})", food.name, food.id);
    Ok(food)
}

pub async fn update_food(pool: &SqlitePool, food_id: i64, fields: &NewFood) -> Result<Food> {
    sqlx::query_as::<_, Food>(
        "UPDATE foods
         SET name = ?1, default_serving_type = ?2, serving_type_qty = ?3, calories = ?4,
             fat = ?5, saturated_fat = ?6, carbs = ?7, fiber = ?8, sugar = ?9,
             protein = ?10, sodium = ?11
         WHERE id = ?12
         RETURNING *",
    )
    .bind(&fields.name)
    .bind(fields.default_serving_type)
    .bind(fields.serving_type_qty)
    .bind(fields.calories)
    .bind(fields.fat)
    .bind(fields.saturated_fat)
    .bind(fields.carbs)
    .bind(fields.fiber)
    .bind(fields.sugar)
    .bind(fields.protein)
    .bind(fields.sodium)
    .bind(food_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| FitnessError::not_found("Food", food_id))
}

pub async fn get_food(pool: &SqlitePool, food_id: i64) -> Result<Food> {
    sqlx::query_as::<_, Food>("SELECT * FROM foods WHERE id = ?1")
        .bind(food_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| FitnessError::not_found("Food", food_id))
}

/// Food catalog ordered by name.
pub async fn get_all_foods(pool: &SqlitePool, search: Option<&str>) -> Result<Vec<Food>> {
    let foods = sqlx::query_as::<_, Food>(
        "SELECT * FROM foods WHERE ?1 IS NULL OR name LIKE ?1 ESCAPE '\\' ORDER BY name",
    )
    .bind(like_pattern(search))
    .fetch_all(pool)
    .await?;
    Ok(foods)
}

pub async fn delete_food(pool: &SqlitePool, food_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM foods WHERE id = ?1")
        .bind(food_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

// Food eaten

pub async fn add_food_eaten(pool: &SqlitePool, new_entry: &NewFoodEaten) -> Result<FoodEaten> {
    let entry = sqlx::query_as::<_, FoodEaten>(
        "INSERT INTO food_eaten (user_id, food_id, date, serving_type, serving_qty)
         VALUES (?1, ?2, ?3, ?4, ?5)
         RETURNING *",
    )
    .bind(new_entry.user_id)
    .bind(new_entry.food_id)
    .bind(new_entry.date)
    .bind(new_entry.serving_type)
    .bind(new_entry.serving_qty)
    .fetch_one(pool)
    .await?;
    info!("Logged food {} for user {}", entry.food_id, entry.user_id);
    Ok(entry)
}

pub async fn update_food_eaten(
    pool: &SqlitePool,
    entry_id: i64,
    fields: &NewFoodEaten,
) -> Result<FoodEaten> {
    sqlx::query_as::<_, FoodEaten>(
        "UPDATE food_eaten
         SET user_id = ?1, food_id = ?2, date = ?3, serving_type = ?4, serving_qty = ?5
         WHERE id = ?6
         RETURNING *",
    )
    .bind(fields.user_id)
    .bind(fields.food_id)
    .bind(fields.date)
    .bind(fields.serving_type)
    .bind(fields.serving_qty)
    .bind(entry_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| FitnessError::not_found("Food eaten", entry_id))
}

pub async fn get_food_eaten(pool: &SqlitePool, entry_id: i64) -> Result<FoodEaten> {
    sqlx::query_as::<_, FoodEaten>("SELECT * FROM food_eaten WHERE id = ?1")
        .bind(entry_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| FitnessError::not_found("Food eaten", entry_id))
}

pub async fn get_food_eaten_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<FoodEaten>> {
    let entries = sqlx::query_as::<_, FoodEaten>(
        "SELECT * FROM food_eaten WHERE user_id = ?1 ORDER BY date DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(entries)
}

pub async fn get_all_food_eaten(
    pool: &SqlitePool,
    search: Option<&str>,
) -> Result<Vec<DisplayableFoodEaten>> {
    let entries = sqlx::query_as::<_, DisplayableFoodEaten>(
        "SELECT e.*, u.username AS username, f.name AS food_name
         FROM food_eaten e
         JOIN users u ON u.id = e.user_id
         JOIN foods f ON f.id = e.food_id
         WHERE ?1 IS NULL OR u.username LIKE ?1 ESCAPE '\\' OR f.name LIKE ?1 ESCAPE '\\'
         ORDER BY e.user_id, e.date DESC",
    )
    .bind(like_pattern(search))
    .fetch_all(pool)
    .await?;
    Ok(entries)
}

pub async fn delete_food_eaten(pool: &SqlitePool, entry_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM food_eaten WHERE id = ?1")
        .bind(entry_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

// Muscles

pub async fn create_muscle(pool: &SqlitePool, name: &str) -> Result<Muscle> {
    let muscle = sqlx::query_as::<_, Muscle>("INSERT INTO muscles (name) VALUES (?1) RETURNING *")
        .bind(name)
        .fetch_one(pool)
        .await?;
    info!("Created muscle {} ({})", muscle.name, muscle.id);
    Ok(muscle)
}

pub async fn update_muscle(pool: &SqlitePool, muscle_id: i64, name: &str) -> Result<Muscle> {
    sqlx::query_as::<_, Muscle>("UPDATE muscles SET name = ?1 WHERE id = ?2 RETURNING *")
        .bind(name)
        .bind(muscle_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| FitnessError::not_found("Muscle", muscle_id))
}

pub async fn get_muscle(pool: &SqlitePool, muscle_id: i64) -> Result<Muscle> {
    sqlx::query_as::<_, Muscle>("SELECT * FROM muscles WHERE id = ?1")
        .bind(muscle_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| FitnessError::not_found("Muscle", muscle_id))
}

pub async fn get_all_muscles(pool: &SqlitePool, search: Option<&str>) -> Result<Vec<Muscle>> {
    let muscles = sqlx::query_as::<_, Muscle>(
        "SELECT * FROM muscles WHERE ?1 IS NULL OR name LIKE ?1 ESCAPE '\\' ORDER BY name",
    )
    .bind(like_pattern(search))
    .fetch_all(pool)
    .await?;
    Ok(muscles)
}

/// Deleting a muscle drops its exercise links; the exercises stay.
pub async fn delete_muscle(pool: &SqlitePool, muscle_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM muscles WHERE id = ?1")
        .bind(muscle_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

// Exercises

pub async fn create_exercise(pool: &SqlitePool, new_exercise: &NewExercise) -> Result<Exercise> {
    let mut tx = pool.begin().await?;
    let exercise = sqlx::query_as::<_, Exercise>(
        "INSERT INTO exercises (name, description, upper_body, lower_body, is_explosive, is_cardio)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         RETURNING *",
    )
    .bind(&new_exercise.name)
    .bind(&new_exercise.description)
    .bind(new_exercise.upper_body)
    .bind(new_exercise.lower_body)
    .bind(new_exercise.is_explosive)
    .bind(new_exercise.is_cardio)
    .fetch_one(&mut *tx)
    .await?;
    write_exercise_muscles(&mut tx, exercise.id, &new_exercise.muscle_group).await?;
    tx.commit().await?;
    info!("Created exercise {} ({})", exercise.name, exercise.id);
    Ok(exercise)
}

pub async fn update_exercise(
    pool: &SqlitePool,
    exercise_id: i64,
    fields: &NewExercise,
) -> Result<Exercise> {
    let mut tx = pool.begin().await?;
    let exercise = sqlx::query_as::<_, Exercise>(
        "UPDATE exercises
         SET name = ?1, description = ?2, upper_body = ?3, lower_body = ?4,
             is_explosive = ?5, is_cardio = ?6
         WHERE id = ?7
         RETURNING *",
    )
    .bind(&fields.name)
    .bind(&fields.description)
    .bind(fields.upper_body)
    .bind(fields.lower_body)
    .bind(fields.is_explosive)
    .bind(fields.is_cardio)
    .bind(exercise_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| FitnessError::not_found("Exercise", exercise_id))?;
    write_exercise_muscles(&mut tx, exercise.id, &fields.muscle_group).await?;
    tx.commit().await?;
    Ok(exercise)
}

pub async fn set_exercise_muscles(
    pool: &SqlitePool,
    exercise_id: i64,
    muscle_ids: &[i64],
) -> Result<()> {
    let mut tx = pool.begin().await?;
    write_exercise_muscles(&mut tx, exercise_id, muscle_ids).await?;
    tx.commit().await?;
    Ok(())
}

async fn write_exercise_muscles(
    conn: &mut SqliteConnection,
    exercise_id: i64,
    muscle_ids: &[i64],
) -> Result<()> {
    sqlx::query("DELETE FROM exercise_muscle_groups WHERE exercise_id = ?1")
        .bind(exercise_id)
        .execute(&mut *conn)
        .await?;
    for &muscle_id in muscle_ids {
        sqlx::query(
            "INSERT INTO exercise_muscle_groups (exercise_id, muscle_id) VALUES (?1, ?2)
             ON CONFLICT DO NOTHING",
        )
        .bind(exercise_id)
        .bind(muscle_id)
        .execute(&mut *conn)
        .await?;
    }
    debug!(
        "Exercise {} linked to {} muscle(s)",
        exercise_id,
        muscle_ids.len()
    );
    Ok(())
}

pub async fn get_exercise(pool: &SqlitePool, exercise_id: i64) -> Result<Exercise> {
    sqlx::query_as::<_, Exercise>("SELECT * FROM exercises WHERE id = ?1")
        .bind(exercise_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| FitnessError::not_found("Exercise", exercise_id))
}

/// Exercise catalog ordered by name.
pub async fn get_all_exercises(pool: &SqlitePool, search: Option<&str>) -> Result<Vec<Exercise>> {
    let exercises = sqlx::query_as::<_, Exercise>(
        "SELECT * FROM exercises WHERE ?1 IS NULL OR name LIKE ?1 ESCAPE '\\' ORDER BY name",
    )
    .bind(like_pattern(search))
    .fetch_all(pool)
    .await?;
    Ok(exercises)
}

pub async fn get_muscles_for_exercise(pool: &SqlitePool, exercise_id: i64) -> Result<Vec<Muscle>> {
    let muscles = sqlx::query_as::<_, Muscle>(
        "SELECT m.* FROM muscles m
         JOIN exercise_muscle_groups g ON g.muscle_id = m.id
         WHERE g.exercise_id = ?1
         ORDER BY m.name",
    )
    .bind(exercise_id)
    .fetch_all(pool)
    .await?;
    Ok(muscles)
}

pub async fn delete_exercise(pool: &SqlitePool, exercise_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM exercises WHERE id = ?1")
        .bind(exercise_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

// Exercise performed

pub async fn add_exercise_performed(
    pool: &SqlitePool,
    new_entry: &NewExercisePerformed,
) -> Result<ExercisePerformed> {
    let entry = sqlx::query_as::<_, ExercisePerformed>(
        "INSERT INTO exercise_performed
             (user_id, exercise_id, date, minutes, repetitions, weight, unit, bodyweight)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         RETURNING *",
    )
    .bind(new_entry.user_id)
    .bind(new_entry.exercise_id)
    .bind(new_entry.date)
    .bind(new_entry.minutes)
    .bind(new_entry.repetitions)
    .bind(new_entry.weight)
    .bind(new_entry.unit)
    .bind(new_entry.bodyweight)
    .fetch_one(pool)
    .await?;
    info!(
        "Logged exercise {} for user {}",
        entry.exercise_id, entry.user_id
    );
    Ok(entry)
}

pub async fn update_exercise_performed(
    pool: &SqlitePool,
    entry_id: i64,
    fields: &NewExercisePerformed,
) -> Result<ExercisePerformed> {
    sqlx::query_as::<_, ExercisePerformed>(
        "UPDATE exercise_performed
         SET user_id = ?1, exercise_id = ?2, date = ?3, minutes = ?4, repetitions = ?5,
             weight = ?6, unit = ?7, bodyweight = ?8
         WHERE id = ?9
         RETURNING *",
    )
    .bind(fields.user_id)
    .bind(fields.exercise_id)
    .bind(fields.date)
    .bind(fields.minutes)
    .bind(fields.repetitions)
    .bind(fields.weight)
    .bind(fields.unit)
    .bind(fields.bodyweight)
    .bind(entry_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| FitnessError::not_found("Exercise performed", entry_id))
}

pub async fn get_exercise_performed(pool: &SqlitePool, entry_id: i64) -> Result<ExercisePerformed> {
    sqlx::query_as::<_, ExercisePerformed>("SELECT * FROM exercise_performed WHERE id = ?1")
        .bind(entry_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| FitnessError::not_found("Exercise performed", entry_id))
}

pub async fn get_exercise_performed_for_user(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<ExercisePerformed>> {
    let entries = sqlx::query_as::<_, ExercisePerformed>(
        "SELECT * FROM exercise_performed WHERE user_id = ?1 ORDER BY date DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(entries)
}

pub async fn get_all_exercise_performed(
    pool: &SqlitePool,
    search: Option<&str>,
) -> Result<Vec<DisplayableExercisePerformed>> {
    let entries = sqlx::query_as::<_, DisplayableExercisePerformed>(
        "SELECT e.*, u.username AS username, x.name AS exercise_name
         FROM exercise_performed e
         JOIN users u ON u.id = e.user_id
         JOIN exercises x ON x.id = e.exercise_id
         WHERE ?1 IS NULL OR u.username LIKE ?1 ESCAPE '\\' OR x.name LIKE ?1 ESCAPE '\\'
         ORDER BY e.user_id, e.date DESC",
    )
    .bind(like_pattern(search))
    .fetch_all(pool)
    .await?;
    Ok(entries)
}

pub async fn delete_exercise_performed(pool: &SqlitePool, entry_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM exercise_performed WHERE id = ?1")
        .bind(entry_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_search_matches_everything() {
        assert_eq!(like_pattern(None), None);
        assert_eq!(like_pattern(Some("  ")), None);
        assert_eq!(like_pattern(Some(" squat ")), Some("%squat%".to_string()));
    }

    #[test]
    fn search_wildcards_are_escaped() {
        assert_eq!(like_pattern(Some("_")), Some(r"%\_%".to_string()));
        assert_eq!(like_pattern(Some("50%")), Some(r"%50\%%".to_string()));
        assert_eq!(like_pattern(Some(r"a\b")), Some(r"%a\\b%".to_string()));
    }

    #[tokio::test]
    async fn save_recreates_a_missing_profile() {
        let pool = crate::db::connect("sqlite::memory:").await.unwrap();
        let user = create_user(&pool, &NewUser::new("legacy")).await.unwrap();

        // Simulate an account that predates profile synchronization.
        sqlx::query("DELETE FROM user_profiles WHERE user_id = ?1")
            .bind(user.id)
            .execute(&pool)
            .await
            .unwrap();
        assert_eq!(count_profiles_for_user(&pool, user.id).await.unwrap(), 0);

        save_user(&pool, user.id, &NewUser::from(&user)).await.unwrap();
        assert_eq!(count_profiles_for_user(&pool, user.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn saving_a_missing_user_is_not_found() {
        let pool = crate::db::connect("sqlite::memory:").await.unwrap();
        let err = save_user(&pool, 42, &NewUser::new("ghost")).await.unwrap_err();
        assert!(matches!(err, FitnessError::NotFound { entity: "User", id: 42 }));
    }
}
