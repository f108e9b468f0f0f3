//! Account admin: custom columns, the derived goal column and the profile inline.

use sqlx::SqlitePool;

use crate::admin::forms::{
    CleanedData, FieldKind, FieldSpec, FormData, defaults, format_bool, format_date, format_opt,
};
use crate::admin::{AdminModel, ChangeListRow, InlineData, RelatedCount, count_related};
use crate::db::choices::{Choice, Gender};
use crate::db::models::{NewUser, UpdateProfile, UserProfile};
use crate::db::operations::{
    create_user, delete_user, get_all_users, get_profile_for_user, get_user,
    save_user_with_profile,
};
use crate::errors::{FitnessError, Result};

pub const USER_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("username", "Username", FieldKind::Username)
        .help("Required. 150 characters or fewer. Letters, digits and @/./+/-/_ only."),
    FieldSpec::new("first_name", "First name", FieldKind::Char { max_length: 150 }).optional(),
    FieldSpec::new("last_name", "Last name", FieldKind::Char { max_length: 150 }).optional(),
    FieldSpec::new("email", "Email address", FieldKind::Email).optional(),
    FieldSpec::new("is_active", "Active", FieldKind::Boolean)
        .default("true")
        .help("Designates whether this user should be treated as active."),
    FieldSpec::new("is_staff", "Staff status", FieldKind::Boolean)
        .help("Designates whether the user can log into this admin site."),
    FieldSpec::new("is_superuser", "Superuser status", FieldKind::Boolean)
        .help("Designates that this user has all permissions without explicitly assigning them."),
];

pub const PROFILE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("gender", "Gender", FieldKind::Choice(Gender::choices)),
    FieldSpec::new("birthdate", "Birthdate", FieldKind::Date).optional(),
    FieldSpec::new("height_in_meters", "Height in meters", FieldKind::Float).optional(),
    FieldSpec::new(
        "favorite_fitness_hobby",
        "Favorite fitness hobby",
        FieldKind::Char { max_length: 50 },
    )
    .optional()
    .help("Basketball, Yoga, Dancing"),
    FieldSpec::new("profile_image", "Profile image", FieldKind::Image).optional(),
    FieldSpec::new("goal", "Goal", FieldKind::Char { max_length: 30 })
        .optional()
        .help("ex: Increase Lean Muscle, Lower Bodyfat, Improve Strength"),
];

const PROFILE_PREFIX: &str = "profile";

pub(crate) struct UserAdmin;

fn new_user(data: &CleanedData) -> NewUser {
    NewUser {
        username: data.text("username"),
        email: data.text("email"),
        first_name: data.text("first_name"),
        last_name: data.text("last_name"),
        is_staff: data.boolean("is_staff"),
        is_active: data.boolean("is_active"),
        is_superuser: data.boolean("is_superuser"),
    }
}

fn update_profile(data: &CleanedData) -> UpdateProfile {
    UpdateProfile {
        gender: data.choice::<Gender>("gender"),
        birthdate: data.date("birthdate"),
        height_in_meters: data.float("height_in_meters"),
        favorite_fitness_hobby: data.text("favorite_fitness_hobby"),
        profile_image: data.opt_text("profile_image"),
        goal: data.opt_text("goal"),
    }
}

fn profile_initial(profile: &UserProfile) -> FormData {
    let key = |name: &str| format!("{}-{}", PROFILE_PREFIX, name);
    FormData::from([
        (key("gender"), format_opt(profile.gender)),
        (key("birthdate"), format_opt(profile.birthdate.map(format_date))),
        (key("height_in_meters"), format_opt(profile.height_in_meters)),
        (
            key("favorite_fitness_hobby"),
            profile.favorite_fitness_hobby.clone(),
        ),
        (key("profile_image"), format_opt(profile.profile_image.as_ref())),
        (key("goal"), format_opt(profile.goal.as_ref())),
    ])
}

impl AdminModel for UserAdmin {
    fn fields() -> &'static [FieldSpec] {
        USER_FIELDS
    }

    async fn rows(pool: &SqlitePool, search: Option<&str>) -> Result<Vec<ChangeListRow>> {
        let users = get_all_users(pool, search).await?;
        Ok(users
            .into_iter()
            .map(|row| ChangeListRow {
                id: row.user.id,
                label: row.user.to_string(),
                cells: vec![
                    row.user.username.clone(),
                    row.user.email.clone(),
                    row.user.first_name.clone(),
                    row.user.last_name.clone(),
                    format_bool(row.user.is_staff),
                    row.goal.unwrap_or_default(),
                ],
            })
            .collect())
    }

    async fn label(pool: &SqlitePool, id: i64) -> Result<String> {
        Ok(get_user(pool, id).await?.to_string())
    }

    async fn initial(pool: &SqlitePool, id: i64) -> Result<FormData> {
        let user = get_user(pool, id).await?;
        let mut data = FormData::from([
            ("username".to_string(), user.username.clone()),
            ("first_name".to_string(), user.first_name.clone()),
            ("last_name".to_string(), user.last_name.clone()),
            ("email".to_string(), user.email.clone()),
            ("is_active".to_string(), format_bool(user.is_active)),
            ("is_staff".to_string(), format_bool(user.is_staff)),
            ("is_superuser".to_string(), format_bool(user.is_superuser)),
        ]);
        match get_profile_for_user(pool, id).await {
            Ok(profile) => data.extend(profile_initial(&profile)),
            Err(FitnessError::NotFound { .. }) => {
                data.extend(defaults(PROFILE_FIELDS, Some(PROFILE_PREFIX)))
            }
            Err(e) => return Err(e),
        }
        Ok(data)
    }

    async fn create(pool: &SqlitePool, data: &CleanedData) -> Result<i64> {
        Ok(create_user(pool, &new_user(data)).await?.id)
    }

    async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &CleanedData,
        inlines: &InlineData,
    ) -> Result<()> {
        let profile = inlines.get(PROFILE_PREFIX).map(update_profile);
        save_user_with_profile(pool, id, &new_user(data), profile.as_ref()).await?;
        Ok(())
    }

    async fn related(pool: &SqlitePool, id: i64) -> Result<Vec<RelatedCount>> {
        Ok(vec![
            count_related(pool, "user profile", "user_profiles", "user_id", id).await?,
            count_related(pool, "user weight", "user_weights", "user_id", id).await?,
            count_related(pool, "food eaten", "food_eaten", "user_id", id).await?,
            count_related(pool, "exercise performed", "exercise_performed", "user_id", id)
                .await?,
        ])
    }

    async fn delete(pool: &SqlitePool, id: i64) -> Result<u64> {
        delete_user(pool, id).await
    }
}
