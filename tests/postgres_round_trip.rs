mod common;

use ducat_sim::SimTimestamp;
use ducat_sim::db::{archive_world, migrate};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use testcontainers::ContainerAsync;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::postgres::Postgres;

async fn setup() -> (PgPool, ContainerAsync<Postgres>) {
    let container = Postgres::default().start().await.unwrap();
    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(5432).await.unwrap();
    let pool = PgPoolOptions::new()
        .connect(&format!(
            "postgres://postgres:postgres@{}:{}/postgres",
            host, port
        ))
        .await
        .unwrap();
    (pool, container)
}

#[tokio::test]
#[ignore]
async fn archive_populates_all_tables() {
    let (pool, _container) = setup().await;
    let world = common::build_test_world();

    migrate(&pool).await.unwrap();
    archive_world(&pool, &world).await.unwrap();

    let citizen_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM citizens")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(citizen_count, 2);

    let building_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM buildings")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(building_count, 3);

    let stack_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM resource_stacks")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stack_count, 2);

    let activity_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM activities")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(activity_count, 3);

    let contract_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contracts")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(contract_count, 1);

    let stratagem_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stratagems")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stratagem_count, 1);
}

#[tokio::test]
#[ignore]
async fn archived_data_matches_source_values() {
    let (pool, _container) = setup().await;
    let world = common::build_test_world();

    migrate(&pool).await.unwrap();
    archive_world(&pool, &world).await.unwrap();

    // --- Citizens ---
    let rows = sqlx::query("SELECT id, name, ducats, district FROM citizens ORDER BY id")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get::<String, _>("name"), "Marco");
    assert_eq!(rows[0].get::<f64, _>("ducats"), 1000.0);
    assert_eq!(rows[1].get::<String, _>("name"), "Piera");

    // --- Buildings ---
    let galley_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM buildings WHERE is_galley = TRUE")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(galley_count, 1);

    // --- Contracts ---
    let row = sqlx::query("SELECT kind, resource, price_per_unit, status, created_at FROM contracts")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(row.get::<String, _>("kind"), "import");
    assert_eq!(row.get::<Option<String>, _>("resource"), Some("grain".to_string()));
    assert_eq!(row.get::<f64, _>("price_per_unit"), 2.0);
    assert_eq!(row.get::<String, _>("status"), "active");
    assert_eq!(
        row.get::<i64, _>("created_at"),
        SimTimestamp::from_day(1).as_u32() as i64
    );

    // --- Activities ---
    let rows = sqlx::query("SELECT kind, status, start_at FROM activities ORDER BY id")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(rows.len(), 3);
    let kind: serde_json::Value = rows[1].get("kind");
    assert_eq!(kind["type"], "pickup_from_galley");
    assert_eq!(kind["resource"], "grain");
    assert_eq!(rows[0].get::<String, _>("status"), "created");
    assert_eq!(
        rows[0].get::<i64, _>("start_at"),
        SimTimestamp::from_day(2).as_u32() as i64
    );

    // --- Stacks ---
    let row = sqlx::query(
        "SELECT resource, count, holder_kind FROM resource_stacks WHERE resource = 'grain'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(row.get::<f64, _>("count"), 80.0);
    assert_eq!(row.get::<String, _>("holder_kind"), "building");

    // --- Stratagems ---
    let row = sqlx::query("SELECT kind, variant, status, daily_cost, progress FROM stratagems")
        .fetch_one(&pool)
        .await
        .unwrap();
    let kind: serde_json::Value = row.get("kind");
    assert_eq!(kind["type"], "monopoly_pricing");
    assert_eq!(kind["price_multiplier"], 2.0);
    assert_eq!(row.get::<String, _>("variant"), "standard");
    assert_eq!(row.get::<String, _>("status"), "active");
    assert_eq!(row.get::<f64, _>("daily_cost"), 25.0);
    let progress: serde_json::Value = row.get("progress");
    assert_eq!(progress["events_fired"], 0);
}
