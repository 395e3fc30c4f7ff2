//! Durable store connector

use crate::error::StoreResult;
use async_trait::async_trait;
use catalog_types::{Product, ProductFields};

/// Projection normalized to INT8/TIMESTAMPTZ whatever the column widths are
/// (`SERIAL`/`INTEGER`/`TIMESTAMP` tables decode the same as `BIGINT` ones).
const PRODUCT_COLUMNS: &str = "id::BIGINT AS id, name, price_cents::BIGINT AS price_cents, \
                               updated_at::TIMESTAMPTZ AS updated_at";

/// Which instance of the store a connector talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreRole {
    Primary,
    Replica,
}

impl std::fmt::Display for StoreRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreRole::Primary => write!(f, "primary"),
            StoreRole::Replica => write!(f, "replica"),
        }
    }
}

/// A bound statement parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Int(i64),
    Text(String),
}

/// The parameterized statements the repository issues against `products`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductStatement {
    SelectById { id: i64 },
    Insert { fields: ProductFields },
    Update { id: i64, fields: ProductFields },
}

impl ProductStatement {
    /// SQL text with positional placeholders
    pub fn sql(&self) -> String {
        match self {
            ProductStatement::SelectById { .. } => {
                format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1")
            }
            ProductStatement::Insert { .. } => format!(
                "INSERT INTO products (name, price_cents) VALUES ($1, $2) RETURNING {PRODUCT_COLUMNS}"
            ),
            ProductStatement::Update { .. } => format!(
                "UPDATE products SET name = $1, price_cents = $2, updated_at = NOW() \
                 WHERE id = $3 RETURNING {PRODUCT_COLUMNS}"
            ),
        }
    }

    /// Parameters in placeholder order
    pub fn params(&self) -> Vec<Param> {
        match self {
            ProductStatement::SelectById { id } => vec![Param::Int(*id)],
            ProductStatement::Insert { fields } => vec![
                Param::Text(fields.name.clone()),
                Param::Int(fields.price_cents),
            ],
            ProductStatement::Update { id, fields } => vec![
                Param::Text(fields.name.clone()),
                Param::Int(fields.price_cents),
                Param::Int(*id),
            ],
        }
    }

    pub fn is_write(&self) -> bool {
        !matches!(self, ProductStatement::SelectById { .. })
    }
}

/// Pooled connection to one instance of the product store.
///
/// Unlike the cache, connectors never swallow errors.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    fn role(&self) -> StoreRole;

    /// Run a read statement and return the matching rows in order.
    async fn query(&self, statement: &ProductStatement) -> StoreResult<Vec<Product>>;

    /// Run a write statement and return the rows it touched.
    async fn execute(&self, statement: &ProductStatement) -> StoreResult<Vec<Product>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_binds_id_last() {
        let statement = ProductStatement::Update {
            id: 42,
            fields: ProductFields::new("Widget2", 600),
        };

        assert!(statement.sql().contains("WHERE id = $3"));
        assert_eq!(
            statement.params(),
            vec![
                Param::Text("Widget2".to_string()),
                Param::Int(600),
                Param::Int(42)
            ]
        );
        assert!(statement.is_write());
    }

    #[test]
    fn test_projection_casts_to_decoded_types() {
        let statements = [
            ProductStatement::SelectById { id: 1 },
            ProductStatement::Insert {
                fields: ProductFields::new("New", 100),
            },
            ProductStatement::Update {
                id: 1,
                fields: ProductFields::new("New", 100),
            },
        ];

        for statement in statements {
            let sql = statement.sql();
            assert!(sql.contains("id::BIGINT AS id"), "{sql}");
            assert!(sql.contains("price_cents::BIGINT AS price_cents"), "{sql}");
            assert!(sql.contains("updated_at::TIMESTAMPTZ AS updated_at"), "{sql}");
        }
    }

    #[test]
    fn test_select_is_read_only() {
        let statement = ProductStatement::SelectById { id: 1 };
        assert!(!statement.is_write());
        assert_eq!(statement.params(), vec![Param::Int(1)]);
    }
}
