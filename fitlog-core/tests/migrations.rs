mod common;

use fitlog::db::{applied_migrations, clear_all_tables, connect};
use fitlog::db::operations::{get_all_users, get_user_by_username};

#[tokio::test]
async fn file_database_is_migrated_once_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("fitlog.db").display());

    {
        let pool = connect(&url).await.unwrap();
        common::user(&pool, "ann").await;
        pool.close().await;
    }

    let pool = connect(&url).await.unwrap();
    assert_eq!(applied_migrations(&pool).await.unwrap().len(), 1);
    assert!(get_user_by_username(&pool, "ann").await.unwrap().is_some());

    let mode: String = sqlx::query_scalar("PRAGMA journal_mode")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(mode, "wal");
}

#[tokio::test]
async fn clearing_tables_keeps_the_schema() {
    let pool = common::pool().await;
    common::user(&pool, "ann").await;
    common::food(&pool, "Oats").await;

    clear_all_tables(&pool).await.unwrap();
    assert!(get_all_users(&pool, None).await.unwrap().is_empty());
    common::user(&pool, "ann").await;
}
