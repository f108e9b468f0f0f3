mod common;

use common::{day, exercise, food, muscle, pool, staff, user};
use fitlog::FitnessError;
use fitlog::admin::forms::FormData;
use fitlog::admin::registry::Entity;
use fitlog::admin::{AdminSite, Widget};
use fitlog::db::choices::Gender;
use fitlog::db::models::{NewExercisePerformed, UpdateProfile};
use fitlog::db::operations::{
    add_exercise_performed, count_profiles_for_user, get_all_user_weights, get_exercise,
    get_muscles_for_exercise, get_profile_for_user, get_user, get_user_by_username,
    update_profile,
};

fn form(pairs: &[(&str, &str)]) -> FormData {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

async fn site() -> (AdminSite, fitlog::db::models::User) {
    let pool = pool().await;
    let admin = staff(&pool, "admin").await;
    (AdminSite::new(pool), admin)
}

#[tokio::test]
async fn goal_column_is_blank_until_set() {
    let (site, admin) = site().await;
    let ann = user(site.pool(), "ann").await;
    let goal = UpdateProfile {
        goal: Some("Lower Bodyfat".to_string()),
        ..Default::default()
    };
    update_profile(site.pool(), ann.id, &goal).await.unwrap();

    let list = site.changelist(&admin, Entity::User, None).await.unwrap();
    assert_eq!(
        list.headers,
        ["Username", "Email address", "First name", "Last name", "Staff status", "Goal"]
    );
    assert_eq!(list.column("Username").unwrap(), ["admin", "ann"]);
    assert_eq!(list.column("Goal").unwrap(), ["", "Lower Bodyfat"]);
    assert_eq!(list.column("Staff status").unwrap(), ["true", "false"]);
}

#[tokio::test]
async fn user_search_covers_names_and_email() {
    let (site, admin) = site().await;
    site.add(
        &admin,
        Entity::User,
        &form(&[("username", "jdoe"), ("first_name", "Jane"), ("email", "jane@example.com")]),
    )
    .await
    .unwrap();

    for term in ["jdo", "Jane", "example.com"] {
        let list = site.changelist(&admin, Entity::User, Some(term)).await.unwrap();
        assert_eq!(list.total, 1, "search {:?}", term);
        assert_eq!(list.rows[0].label, "jdoe");
    }
    let list = site.changelist(&admin, Entity::User, Some("  ")).await.unwrap();
    assert_eq!(list.total, 2);
    assert_eq!(list.search, None);
}

#[tokio::test]
async fn add_form_for_user_has_no_inline() {
    let (site, admin) = site().await;
    let add = site.change_form(&admin, Entity::User, None).await.unwrap();
    assert!(add.inlines.is_empty());
    assert_eq!(add.title, "Add user");
    assert_eq!(add.field("is_active").unwrap().value, "true");

    let change = site
        .change_form(&admin, Entity::User, Some(admin.id))
        .await
        .unwrap();
    assert_eq!(change.inlines.len(), 1);
    let inline = &change.inlines[0];
    assert_eq!(inline.verbose_name_plural, "Profile");
    assert!(!inline.can_delete);
    let names: Vec<&str> = inline.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "profile-gender",
            "profile-birthdate",
            "profile-height_in_meters",
            "profile-favorite_fitness_hobby",
            "profile-profile_image",
            "profile-goal",
        ]
    );
}

#[tokio::test]
async fn adding_a_user_creates_its_profile() {
    let (site, admin) = site().await;
    let id = site
        .add(&admin, Entity::User, &form(&[("username", "new.user+1")]))
        .await
        .unwrap();
    assert_eq!(count_profiles_for_user(site.pool(), id).await.unwrap(), 1);

    // inline keys are ignored on add
    let id = site
        .add(
            &admin,
            Entity::User,
            &form(&[("username", "other"), ("profile-goal", "Run")]),
        )
        .await
        .unwrap();
    assert_eq!(get_profile_for_user(site.pool(), id).await.unwrap().goal, None);
}

#[tokio::test]
async fn editing_a_user_saves_the_profile_inline() {
    let (site, admin) = site().await;
    let ann = user(site.pool(), "ann").await;

    site.change(
        &admin,
        Entity::User,
        ann.id,
        &form(&[
            ("last_name", "Smith"),
            ("profile-gender", "female"),
            ("profile-birthdate", "1992-07-01"),
            ("profile-goal", "Improve Strength"),
        ]),
    )
    .await
    .unwrap();

    let saved = get_user(site.pool(), ann.id).await.unwrap();
    assert_eq!(saved.username, "ann");
    assert_eq!(saved.last_name, "Smith");
    let profile = get_profile_for_user(site.pool(), ann.id).await.unwrap();
    assert_eq!(profile.gender, Some(Gender::Female));
    assert_eq!(profile.birthdate, Some(day(1992, 7, 1)));
    assert_eq!(profile.goal.as_deref(), Some("Improve Strength"));
    assert_eq!(count_profiles_for_user(site.pool(), ann.id).await.unwrap(), 1);
}

#[tokio::test]
async fn profile_inline_requires_gender() {
    let (site, admin) = site().await;
    let ann = user(site.pool(), "ann").await;

    let err = site
        .change(&admin, Entity::User, ann.id, &form(&[("profile-goal", "Run")]))
        .await
        .unwrap_err();
    let errors = err.validation_errors().unwrap();
    assert_eq!(errors.get("profile-gender"), ["This field is required.".to_string()]);
    assert_eq!(get_profile_for_user(site.pool(), ann.id).await.unwrap().goal, None);
}

#[tokio::test]
async fn raw_id_widget_for_performed_exercise() {
    let (site, admin) = site().await;
    let ann = user(site.pool(), "ann").await;
    let squat = exercise(site.pool(), "Squat", &[]).await;
    exercise(site.pool(), "Bench Press", &[]).await;
    let entry = add_exercise_performed(
        site.pool(),
        &NewExercisePerformed::new(ann.id, squat.id, day(2024, 3, 3)),
    )
    .await
    .unwrap();

    let form = site
        .change_form(&admin, Entity::ExercisePerformed, Some(entry.id))
        .await
        .unwrap();
    let field = form.field("exercise").unwrap();
    assert_eq!(field.value, squat.id.to_string());
    assert_eq!(
        field.widget,
        Widget::ForeignKeyRawId {
            label: Some("Squat".to_string())
        }
    );
    match &form.field("user").unwrap().widget {
        Widget::Select { options } => assert_eq!(options.len(), 2),
        other => panic!("expected a select, got {:?}", other),
    }

    let add = site
        .change_form(&admin, Entity::ExercisePerformed, None)
        .await
        .unwrap();
    assert_eq!(
        add.field("exercise").unwrap().widget,
        Widget::ForeignKeyRawId { label: None }
    );
    assert_eq!(add.field("unit").unwrap().value, "KG");
    assert_eq!(add.field("repetitions").unwrap().value, "0");
}

#[tokio::test]
async fn non_staff_actors_are_refused() {
    let (site, _) = site().await;
    let ann = user(site.pool(), "ann").await;

    assert!(matches!(
        site.changelist(&ann, Entity::Food, None).await,
        Err(FitnessError::PermissionDenied(_))
    ));
    assert!(matches!(
        site.add(&ann, Entity::Muscle, &form(&[("name", "Calves")])).await,
        Err(FitnessError::PermissionDenied(_))
    ));
    assert!(matches!(
        site.actor("ann").await,
        Err(FitnessError::PermissionDenied(_))
    ));
    assert!(matches!(
        site.actor("nobody").await,
        Err(FitnessError::PermissionDenied(_))
    ));
    assert_eq!(site.actor("admin").await.unwrap().username, "admin");
}

#[tokio::test]
async fn inactive_staff_are_refused() {
    let (site, admin) = site().await;
    site.change(&admin, Entity::User, admin.id, &form(&[("is_active", "false")]))
        .await
        .unwrap();
    let admin = get_user_by_username(site.pool(), "admin").await.unwrap().unwrap();
    assert!(!AdminSite::has_permission(&admin));
    assert!(site.changelist(&admin, Entity::Food, None).await.is_err());
}

#[tokio::test]
async fn missing_fields_are_reported_without_a_write() {
    let (site, admin) = site().await;
    let ann = user(site.pool(), "ann").await;

    let err = site
        .add(
            &admin,
            Entity::UserWeight,
            &form(&[("user", &ann.id.to_string()), ("weight", "")]),
        )
        .await
        .unwrap_err();
    let errors = err.validation_errors().unwrap();
    assert_eq!(errors.fields().collect::<Vec<_>>(), ["date", "weight"]);
    assert_eq!(errors.get("date"), ["This field is required.".to_string()]);
    assert!(get_all_user_weights(site.pool(), None).await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_references_are_rejected() {
    let (site, admin) = site().await;
    let err = site
        .add(
            &admin,
            Entity::UserWeight,
            &form(&[("user", "404"), ("date", "2024-03-01"), ("weight", "80")]),
        )
        .await
        .unwrap_err();
    assert!(err.validation_errors().unwrap().contains("user"));

    let err = site
        .add(
            &admin,
            Entity::Exercise,
            &form(&[("name", "Row"), ("muscle_group", "7")]),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err.validation_errors().unwrap().get("muscle_group"),
        ["Select a valid choice. 7 is not one of the available choices.".to_string()]
    );
}

#[tokio::test]
async fn duplicate_weight_through_the_admin() {
    let (site, admin) = site().await;
    let ann = user(site.pool(), "ann").await;
    let data = form(&[
        ("user", &ann.id.to_string()),
        ("date", "2024-03-01"),
        ("weight", "81.5"),
    ]);
    let id = site.add(&admin, Entity::UserWeight, &data).await.unwrap();
    let list = site.changelist(&admin, Entity::UserWeight, None).await.unwrap();
    assert_eq!(list.rows[0].id, id);
    assert_eq!(list.rows[0].label, "ann, 2024-03-01, 81.5 KG");

    let err = site.add(&admin, Entity::UserWeight, &data).await.unwrap_err();
    let errors = err.validation_errors().unwrap();
    assert!(errors.contains("user"));
    assert!(errors.contains("date"));
}

#[tokio::test]
async fn exercise_muscle_group_is_edited_by_id() {
    let (site, admin) = site().await;
    let chest = muscle(site.pool(), "Chest").await;
    let triceps = muscle(site.pool(), "Triceps").await;

    let id = site
        .add(
            &admin,
            Entity::Exercise,
            &form(&[
                ("name", "Bench Press"),
                ("muscle_group", &format!("{},{}", chest.id, triceps.id)),
                ("upper_body", "on"),
            ]),
        )
        .await
        .unwrap();
    assert!(get_exercise(site.pool(), id).await.unwrap().upper_body);
    assert_eq!(get_muscles_for_exercise(site.pool(), id).await.unwrap().len(), 2);

    site.change(
        &admin,
        Entity::Exercise,
        id,
        &form(&[("muscle_group", &triceps.id.to_string())]),
    )
    .await
    .unwrap();
    assert_eq!(
        get_muscles_for_exercise(site.pool(), id).await.unwrap(),
        [triceps.clone()]
    );
    // unchanged fields keep their stored values
    assert!(get_exercise(site.pool(), id).await.unwrap().upper_body);

    let form = site.change_form(&admin, Entity::Exercise, Some(id)).await.unwrap();
    let field = form.field("muscle_group").unwrap();
    assert_eq!(field.value, triceps.id.to_string());
    match &field.widget {
        Widget::SelectMultiple { options } => {
            let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
            assert_eq!(labels, ["Chest", "Triceps"]);
        }
        other => panic!("expected a multi-select, got {:?}", other),
    }
}

#[tokio::test]
async fn deleting_a_muscle_through_the_admin() {
    let (site, admin) = site().await;
    let legs = muscle(site.pool(), "Legs").await;
    let squat = exercise(site.pool(), "Squat", &[legs.id]).await;

    let summary = site.delete(&admin, Entity::Muscle, legs.id).await.unwrap();
    assert_eq!(summary.label, "Legs");
    assert_eq!(summary.related[0].count, 1);
    assert!(get_muscles_for_exercise(site.pool(), squat.id).await.unwrap().is_empty());
    assert_eq!(
        site.changelist(&admin, Entity::Exercise, None).await.unwrap().total,
        1
    );
    assert!(matches!(
        site.delete(&admin, Entity::Muscle, legs.id).await,
        Err(FitnessError::NotFound { .. })
    ));
}

#[tokio::test]
async fn deleting_a_user_reports_cascaded_records() {
    let (site, admin) = site().await;
    let ann = user(site.pool(), "ann").await;
    let oats = food(site.pool(), "Oats").await;
    site.add(
        &admin,
        Entity::FoodEaten,
        &form(&[
            ("user", &ann.id.to_string()),
            ("food", &oats.id.to_string()),
            ("date", "2024-03-02"),
            ("serving_type", "cup"),
            ("serving_qty", "1.5"),
        ]),
    )
    .await
    .unwrap();

    let preview = site.delete_preview(&admin, Entity::User, ann.id).await.unwrap();
    let counts: Vec<(&str, i64)> = preview.related.iter().map(|r| (r.label, r.count)).collect();
    assert_eq!(
        counts,
        [
            ("user profile", 1),
            ("user weight", 0),
            ("food eaten", 1),
            ("exercise performed", 0),
        ]
    );

    site.delete(&admin, Entity::User, ann.id).await.unwrap();
    assert!(site.changelist(&admin, Entity::FoodEaten, None).await.unwrap().rows.is_empty());
    assert_eq!(site.changelist(&admin, Entity::Food, None).await.unwrap().total, 1);
}

#[tokio::test]
async fn registry_lists_entities_in_registration_order() {
    let (site, _) = site().await;
    let names: Vec<&str> = site.registry().iter().map(|a| a.verbose_name_plural).collect();
    assert_eq!(
        names,
        [
            "users",
            "user weights",
            "foods",
            "foods eaten",
            "exercises",
            "exercises performed",
            "muscles",
        ]
    );
    assert_eq!(site.model_admin(Entity::Food).search_fields, ["name"]);
}
