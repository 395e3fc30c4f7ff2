//! Runs against a live Postgres. Enable with
//! `--features pg-tests` and point `CATALOG_TEST_DATABASE_URL` at a
//! database the test may create a schema in.
#![cfg(feature = "pg-tests")]

use catalog_core::{ProductFields, ProductStatement, StoreConnector, StoreRole};
use catalog_server::config::StoreSettings;
use catalog_server::storage::PgConnector;

const SCHEMA: &str = "catalog_narrow_columns";

fn database_url() -> String {
    std::env::var("CATALOG_TEST_DATABASE_URL")
        .expect("CATALOG_TEST_DATABASE_URL must be set for pg-tests")
}

/// Connection URL whose sessions resolve `products` inside `SCHEMA`.
fn scoped_url(base: &str) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}options=-c%20search_path%3D{SCHEMA}")
}

async fn create_narrow_table(base: &str) {
    let pool = sqlx::PgPool::connect(base).await.unwrap();
    for statement in [
        format!("DROP SCHEMA IF EXISTS {SCHEMA} CASCADE"),
        format!("CREATE SCHEMA {SCHEMA}"),
        format!(
            "CREATE TABLE {SCHEMA}.products (
                id SERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                price_cents INTEGER NOT NULL,
                updated_at TIMESTAMP NOT NULL DEFAULT NOW()
            )"
        ),
        format!("INSERT INTO {SCHEMA}.products (name, price_cents) VALUES ('Widget', 500)"),
    ] {
        sqlx::query(&statement).execute(&pool).await.unwrap();
    }
    pool.close().await;
}

#[tokio::test]
async fn reads_and_writes_integer_timestamp_table() {
    let base = database_url();
    create_narrow_table(&base).await;

    let settings = StoreSettings {
        url: scoped_url(&base),
        max_connections: 2,
        acquire_timeout_secs: 5,
    };
    let primary = PgConnector::connect_lazy(StoreRole::Primary, &settings).unwrap();
    primary.run_migrations().await.unwrap();

    let rows = primary
        .query(&ProductStatement::SelectById { id: 1 })
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Widget");
    assert_eq!(rows[0].price_cents, 500);

    let created = primary
        .execute(&ProductStatement::Insert {
            fields: ProductFields::new("New", 100),
        })
        .await
        .unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].id, 2);
    assert_eq!(created[0].price_cents, 100);

    let updated = primary
        .execute(&ProductStatement::Update {
            id: 1,
            fields: ProductFields::new("Widget2", 600),
        })
        .await
        .unwrap();
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].name, "Widget2");
    assert_eq!(updated[0].price_cents, 600);
    assert!(updated[0].updated_at >= rows[0].updated_at);

    let missing = primary
        .execute(&ProductStatement::Update {
            id: 999,
            fields: ProductFields::new("Ghost", 1),
        })
        .await
        .unwrap();
    assert!(missing.is_empty());
}
