mod common;

use common::{day, exercise, food, muscle, new_food, pool, user};
use fitlog::FitnessError;
use fitlog::db::choices::{ServingType, WeightUnit};
use fitlog::db::models::{NewExercisePerformed, NewFoodEaten, NewUserWeight};
use fitlog::db::operations::{
    add_exercise_performed, add_food_eaten, add_user_weight, create_food, delete_exercise,
    delete_muscle, get_all_exercise_performed, get_all_exercises, get_all_food_eaten,
    get_all_foods, get_all_muscles, get_all_user_weights, get_all_users, get_exercise,
    get_exercise_performed_for_user, get_food_eaten_for_user, get_muscles_for_exercise,
    get_weights_for_user, set_exercise_muscles, update_user_weight,
};

fn weight(user_id: i64, date: chrono::NaiveDate, kg: f64) -> NewUserWeight {
    NewUserWeight {
        user_id,
        date,
        weight: kg,
        unit: WeightUnit::Kg,
    }
}

fn eaten(user_id: i64, food_id: i64, date: chrono::NaiveDate) -> NewFoodEaten {
    NewFoodEaten {
        user_id,
        food_id,
        date,
        serving_type: ServingType::Custom,
        serving_qty: 2.0,
    }
}

#[tokio::test]
async fn one_weight_per_user_and_day() {
    let pool = pool().await;
    let ann = user(&pool, "ann").await;
    add_user_weight(&pool, &weight(ann.id, day(2024, 3, 1), 81.5))
        .await
        .unwrap();

    let err = add_user_weight(&pool, &weight(ann.id, day(2024, 3, 1), 80.0))
        .await
        .unwrap_err();
    let errors = err.validation_errors().unwrap();
    let message = "User weight with this User and Date already exists.".to_string();
    assert_eq!(errors.get("user"), [message.clone()]);
    assert_eq!(errors.get("date"), [message]);

    add_user_weight(&pool, &weight(ann.id, day(2024, 3, 2), 80.0))
        .await
        .unwrap();
    assert_eq!(get_weights_for_user(&pool, ann.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn moving_a_weight_onto_a_taken_day_fails() {
    let pool = pool().await;
    let ann = user(&pool, "ann").await;
    add_user_weight(&pool, &weight(ann.id, day(2024, 3, 1), 81.5))
        .await
        .unwrap();
    let second = add_user_weight(&pool, &weight(ann.id, day(2024, 3, 2), 81.0))
        .await
        .unwrap();

    let err = update_user_weight(&pool, second.id, &weight(ann.id, day(2024, 3, 1), 81.0))
        .await
        .unwrap_err();
    assert!(err.validation_errors().unwrap().contains("date"));
}

#[tokio::test]
async fn one_food_entry_per_user_food_and_day() {
    let pool = pool().await;
    let ann = user(&pool, "ann").await;
    let bob = user(&pool, "bob").await;
    let oats = food(&pool, "Oats").await;
    let eggs = food(&pool, "Eggs").await;
    add_food_eaten(&pool, &eaten(ann.id, oats.id, day(2024, 3, 2)))
        .await
        .unwrap();

    let err = add_food_eaten(&pool, &eaten(ann.id, oats.id, day(2024, 3, 2)))
        .await
        .unwrap_err();
    let errors = err.validation_errors().unwrap();
    assert_eq!(
        errors.get("food"),
        ["Food eaten with this User, Food and Date already exists.".to_string()]
    );

    add_food_eaten(&pool, &eaten(bob.id, oats.id, day(2024, 3, 2)))
        .await
        .unwrap();
    add_food_eaten(&pool, &eaten(ann.id, eggs.id, day(2024, 3, 2)))
        .await
        .unwrap();
    add_food_eaten(&pool, &eaten(ann.id, oats.id, day(2024, 3, 3)))
        .await
        .unwrap();
    assert_eq!(get_food_eaten_for_user(&pool, ann.id).await.unwrap().len(), 3);
}

#[tokio::test]
async fn weights_list_newest_first() {
    let pool = pool().await;
    let ann = user(&pool, "ann").await;
    for date in [day(2024, 3, 2), day(2024, 1, 15), day(2024, 3, 10)] {
        add_user_weight(&pool, &weight(ann.id, date, 80.0)).await.unwrap();
    }

    let dates: Vec<_> = get_weights_for_user(&pool, ann.id)
        .await
        .unwrap()
        .iter()
        .map(|w| w.date)
        .collect();
    assert_eq!(dates, [day(2024, 3, 10), day(2024, 3, 2), day(2024, 1, 15)]);
}

#[tokio::test]
async fn logged_entries_group_by_user_then_newest_date() {
    let pool = pool().await;
    let ann = user(&pool, "ann").await;
    let bob = user(&pool, "bob").await;
    add_user_weight(&pool, &weight(bob.id, day(2024, 3, 5), 90.0)).await.unwrap();
    add_user_weight(&pool, &weight(ann.id, day(2024, 3, 1), 81.5)).await.unwrap();
    add_user_weight(&pool, &weight(ann.id, day(2024, 3, 4), 81.0)).await.unwrap();

    let labels: Vec<String> = get_all_user_weights(&pool, None)
        .await
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        labels,
        [
            "ann, 2024-03-04, 81 KG",
            "ann, 2024-03-01, 81.5 KG",
            "bob, 2024-03-05, 90 KG",
        ]
    );

    let bobs = get_all_user_weights(&pool, Some("bo")).await.unwrap();
    assert_eq!(bobs.len(), 1);
    assert_eq!(bobs[0].username, "bob");
}

#[tokio::test]
async fn catalogs_list_alphabetically() {
    let pool = pool().await;
    for name in ["Rice", "Eggs", "Oats"] {
        food(&pool, name).await;
    }
    for name in ["Squat", "Bench Press", "Deadlift"] {
        exercise(&pool, name, &[]).await;
    }

    let foods: Vec<String> = get_all_foods(&pool, None)
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(foods, ["Eggs", "Oats", "Rice"]);

    let exercises: Vec<String> = get_all_exercises(&pool, None)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(exercises, ["Bench Press", "Deadlift", "Squat"]);

    let matched = get_all_foods(&pool, Some("at")).await.unwrap();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].to_string(), "Oats - 0.5 cup");
}

#[tokio::test]
async fn food_names_are_unique() {
    let pool = pool().await;
    food(&pool, "Oats").await;
    let err = create_food(&pool, &new_food("Oats")).await.unwrap_err();
    assert_eq!(
        err.validation_errors().unwrap().get("name"),
        ["Food with this Name already exists.".to_string()]
    );
}

#[tokio::test]
async fn deleting_a_muscle_keeps_its_exercises() {
    let pool = pool().await;
    let quads = muscle(&pool, "Quadriceps").await;
    let glutes = muscle(&pool, "Glutes").await;
    let squat = exercise(&pool, "Squat", &[quads.id, glutes.id]).await;
    let lunge = exercise(&pool, "Lunge", &[quads.id]).await;

    delete_muscle(&pool, quads.id).await.unwrap();

    assert_eq!(get_all_exercises(&pool, None).await.unwrap().len(), 2);
    let squat_muscles = get_muscles_for_exercise(&pool, squat.id).await.unwrap();
    assert_eq!(squat_muscles, [glutes]);
    assert!(get_muscles_for_exercise(&pool, lunge.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn muscle_sets_can_be_replaced() {
    let pool = pool().await;
    let chest = muscle(&pool, "Chest").await;
    let triceps = muscle(&pool, "Triceps").await;
    let bench = exercise(&pool, "Bench Press", &[chest.id]).await;

    set_exercise_muscles(&pool, bench.id, &[triceps.id, chest.id])
        .await
        .unwrap();
    let names: Vec<String> = get_muscles_for_exercise(&pool, bench.id)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.name)
        .collect();
    assert_eq!(names, ["Chest", "Triceps"]);

    let err = set_exercise_muscles(&pool, bench.id, &[999]).await.unwrap_err();
    assert!(matches!(err, FitnessError::Integrity(_)));
    // failed replacement leaves the previous set intact
    assert_eq!(get_muscles_for_exercise(&pool, bench.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn deleting_an_exercise_cascades_to_its_log() {
    let pool = pool().await;
    let ann = user(&pool, "ann").await;
    let legs = muscle(&pool, "Legs").await;
    let squat = exercise(&pool, "Squat", &[legs.id]).await;
    let mut entry = NewExercisePerformed::new(ann.id, squat.id, day(2024, 3, 3));
    entry.repetitions = 5;
    entry.weight = 100;
    add_exercise_performed(&pool, &entry).await.unwrap();

    let labels: Vec<String> = get_all_exercise_performed(&pool, None)
        .await
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(labels, ["ann, 2024-03-03 - Squat"]);

    assert_eq!(delete_exercise(&pool, squat.id).await.unwrap(), 1);
    assert!(get_exercise_performed_for_user(&pool, ann.id).await.unwrap().is_empty());
    assert_eq!(get_all_muscles(&pool, None).await.unwrap(), [legs]);
    assert!(matches!(
        get_exercise(&pool, squat.id).await,
        Err(FitnessError::NotFound { .. })
    ));
}

#[tokio::test]
async fn food_eaten_labels_join_user_and_food() {
    let pool = pool().await;
    let bob = user(&pool, "bob").await;
    let eggs = food(&pool, "Eggs").await;
    add_food_eaten(&pool, &eaten(bob.id, eggs.id, day(2024, 3, 2)))
        .await
        .unwrap();

    let entries = get_all_food_eaten(&pool, Some("egg")).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].to_string(), "bob, 2024-03-02 - Eggs 2 CUSTOM");
}

#[tokio::test]
async fn one_exercise_entry_per_user_exercise_and_day() {
    let pool = pool().await;
    let ann = user(&pool, "ann").await;
    let bob = user(&pool, "bob").await;
    let legs = muscle(&pool, "Legs").await;
    let squat = exercise(&pool, "Squat", &[legs.id]).await;
    let lunge = exercise(&pool, "Lunge", &[legs.id]).await;
    add_exercise_performed(&pool, &NewExercisePerformed::new(ann.id, squat.id, day(2024, 3, 3)))
        .await
        .unwrap();

    let err = add_exercise_performed(
        &pool,
        &NewExercisePerformed::new(ann.id, squat.id, day(2024, 3, 3)),
    )
    .await
    .unwrap_err();
    let errors = err.validation_errors().unwrap();
    let message = "Exercise performed with this User, Exercise and Date already exists.".to_string();
    assert_eq!(errors.get("user"), [message.clone()]);
    assert_eq!(errors.get("exercise"), [message.clone()]);
    assert_eq!(errors.get("date"), [message]);

    for entry in [
        NewExercisePerformed::new(bob.id, squat.id, day(2024, 3, 3)),
        NewExercisePerformed::new(ann.id, lunge.id, day(2024, 3, 3)),
        NewExercisePerformed::new(ann.id, squat.id, day(2024, 3, 4)),
    ] {
        add_exercise_performed(&pool, &entry).await.unwrap();
    }
    assert_eq!(
        get_exercise_performed_for_user(&pool, ann.id).await.unwrap().len(),
        3
    );
}

#[tokio::test]
async fn food_and_exercise_logs_list_newest_first() {
    let pool = pool().await;
    let ann = user(&pool, "ann").await;
    let oats = food(&pool, "Oats").await;
    let squat = exercise(&pool, "Squat", &[]).await;
    let dates = [day(2024, 3, 2), day(2024, 1, 15), day(2024, 3, 10)];
    for date in dates {
        add_food_eaten(&pool, &eaten(ann.id, oats.id, date)).await.unwrap();
        add_exercise_performed(&pool, &NewExercisePerformed::new(ann.id, squat.id, date))
            .await
            .unwrap();
    }

    let newest_first = [day(2024, 3, 10), day(2024, 3, 2), day(2024, 1, 15)];
    let food_dates: Vec<_> = get_food_eaten_for_user(&pool, ann.id)
        .await
        .unwrap()
        .iter()
        .map(|e| e.date)
        .collect();
    assert_eq!(food_dates, newest_first);
    let exercise_dates: Vec<_> = get_exercise_performed_for_user(&pool, ann.id)
        .await
        .unwrap()
        .iter()
        .map(|e| e.date)
        .collect();
    assert_eq!(exercise_dates, newest_first);
}

#[tokio::test]
async fn search_treats_wildcards_literally() {
    let pool = pool().await;
    user(&pool, "ann").await;
    user(&pool, "bob").await;
    food(&pool, "Oats").await;
    food(&pool, "Rice").await;

    assert!(get_all_foods(&pool, Some("_")).await.unwrap().is_empty());
    assert!(get_all_users(&pool, Some("%")).await.unwrap().is_empty());

    food(&pool, "Rice_cake").await;
    let names: Vec<String> = get_all_foods(&pool, Some("_"))
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(names, ["Rice_cake"]);
}
