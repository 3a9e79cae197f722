//! PostgreSQL customer store tests
//!
//! Require Docker. Run with:
//!
//! ```bash
//! cargo test --test pg_customer_store_tests -- --ignored --nocapture
//! ```

mod common;

use common::{init_test_tracing, TestPostgres};
use fleamarket_server::import::{
    sample_customer, Customer, CustomerStore, ImportPipeline, InputRecord, PgCustomerStore,
    PipelineError, RecordError, StoreError,
};
use serial_test::serial;
use std::num::NonZeroUsize;
use std::sync::Arc;

fn customer(id: usize) -> Customer {
    let record = InputRecord::new(id, sample_customer(id).to_vec());
    Customer::try_from(&record).unwrap()
}

async fn customer_count(pg: &TestPostgres) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM customers")
        .fetch_one(pg.pool())
        .await
        .unwrap()
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker"]
async fn test_persist_inserts_row() {
    init_test_tracing();
    let pg = TestPostgres::start().await.unwrap();
    let store = PgCustomerStore::new(pg.pool_clone());

    store.persist(customer(1)).await.unwrap();

    let (first_name, zip_code): (String, String) =
        sqlx::query_as("SELECT first_name, zip_code FROM customers WHERE email = $1")
            .bind("user1@example.com")
            .fetch_one(pg.pool())
            .await
            .unwrap();
    assert_eq!(first_name, "FirstName1");
    assert_eq!(zip_code, "90001");
    assert_eq!(store.backend(), "postgres");
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker"]
async fn test_duplicate_email_maps_to_duplicate() {
    init_test_tracing();
    let pg = TestPostgres::start().await.unwrap();
    let store = PgCustomerStore::new(pg.pool_clone());

    store.persist(customer(2)).await.unwrap();
    let err = store.persist(customer(2)).await.unwrap_err();

    assert!(matches!(err, StoreError::Duplicate(ref email) if email == "user2@example.com"));
    assert_eq!(customer_count(&pg).await, 1);
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker"]
async fn test_blank_name_is_stored() {
    init_test_tracing();
    let pg = TestPostgres::start().await.unwrap();
    let store = PgCustomerStore::new(pg.pool_clone());

    let mut nameless = customer(3);
    nameless.last_name = String::new();
    store.persist(nameless).await.unwrap();

    let last_name: String =
        sqlx::query_scalar("SELECT last_name FROM customers WHERE email = $1")
            .bind("user3@example.com")
            .fetch_one(pg.pool())
            .await
            .unwrap();
    assert_eq!(last_name, "");
    assert_eq!(customer_count(&pg).await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
#[ignore = "requires Docker"]
async fn test_pipeline_imports_into_postgres() {
    init_test_tracing();
    let pg = TestPostgres::start().await.unwrap();
    let store = Arc::new(PgCustomerStore::new(pg.pool_clone()));
    let pipeline = ImportPipeline::new(store, NonZeroUsize::new(30).unwrap());

    let records: Vec<InputRecord> = (1..=300)
        .map(|id| InputRecord::new(id, sample_customer(id).to_vec()))
        .collect();

    let result = pipeline.run(records.clone()).await;
    assert!(result.is_success(), "first import failed: {:?}", result);
    assert_eq!(customer_count(&pg).await, 300);

    let again = pipeline.run(records).await;
    assert!(matches!(
        again.error(),
        Some(PipelineError::Record(RecordError::Store {
            source: StoreError::Duplicate(_),
            ..
        }))
    ));
    assert_eq!(customer_count(&pg).await, 300);
}
