//! Customer storage backends
//!
//! The import pipeline only ever calls [`CustomerStore::persist`], once per
//! record and concurrently from every worker. Implementations handle their
//! own synchronization.

use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

use super::types::Customer;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("customer with email '{0}' already exists")]
    Duplicate(String),

    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persists one customer at a time
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Durably record `customer`; success means it is stored when this returns
    async fn persist(&self, customer: Customer) -> Result<(), StoreError>;

    /// Short backend name for health reporting
    fn backend(&self) -> &'static str;
}

/// PostgreSQL-backed store writing to the `customers` table
#[derive(Clone)]
pub struct PgCustomerStore {
    pool: PgPool,
}

impl PgCustomerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CustomerStore for PgCustomerStore {
    async fn persist(&self, customer: Customer) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO customers (
                first_name, last_name, email, phone_number,
                address, city, state, zip_code, country
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(&customer.email)
        .bind(&customer.phone_number)
        .bind(&customer.address)
        .bind(&customer.city)
        .bind(&customer.state)
        .bind(&customer.zip_code)
        .bind(&customer.country)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_unique_violation() {
                    return StoreError::Duplicate(customer.email.clone());
                }
                if db_err.is_check_violation() {
                    return StoreError::Constraint(db_err.message().to_string());
                }
            }
            StoreError::Database(e)
        })?;

        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

/// In-process store used outside production and in tests
///
/// Applies the same rule as the `customers` table: email is unique. Blank
/// columns are stored as given.
#[derive(Default)]
pub struct MemoryCustomerStore {
    customers: RwLock<HashMap<String, Customer>>,
}

impl MemoryCustomerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.customers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.customers.read().await.is_empty()
    }

    pub async fn get(&self, email: &str) -> Option<Customer> {
        self.customers.read().await.get(email).cloned()
    }

    pub async fn emails(&self) -> Vec<String> {
        self.customers.read().await.keys().cloned().collect()
    }
}

#[async_trait]
impl CustomerStore for MemoryCustomerStore {
    async fn persist(&self, customer: Customer) -> Result<(), StoreError> {
        let mut customers = self.customers.write().await;
        if customers.contains_key(&customer.email) {
            return Err(StoreError::Duplicate(customer.email));
        }
        customers.insert(customer.email.clone(), customer);

        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
