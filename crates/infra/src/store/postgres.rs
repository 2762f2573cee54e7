//! Postgres-backed catalog store implementation.
//!
//! The conditional stock write is a single guarded `UPDATE`: the row changes
//! only if `stock` still equals the observed value, which gives the same
//! atomicity guarantee across any number of server processes sharing the
//! pool. A `CHECK (stock >= 0)` constraint in the schema backs the invariant
//! at the database level as well.

use std::sync::Arc;

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;

use gearshop_cart::CartLine;
use gearshop_catalog::{Product, ProductFilter, ProductPatch, SortOrder};
use gearshop_core::{CartId, ProductId};

use super::r#trait::{CartStore, CatalogStore, StockWrite, StoreError};

const PRODUCT_COLUMNS: &str =
    "id, name, category, price_cents, stock, description, images, created_at, updated_at";

fn row_to_product(row: &PgRow) -> Result<Product, StoreError> {
    Ok(Product {
        id: ProductId::from_uuid(row.try_get("id")?),
        name: row.try_get("name")?,
        category: row.try_get("category")?,
        price_cents: row.try_get("price_cents")?,
        stock: row.try_get("stock")?,
        description: row.try_get("description")?,
        images: row.try_get("images")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_cart_line(row: &PgRow) -> Result<CartLine, StoreError> {
    Ok(CartLine {
        product_id: ProductId::from_uuid(row.try_get("product_id")?),
        name: row.try_get("name")?,
        price_cents: row.try_get("price_cents")?,
        quantity: row.try_get("quantity")?,
    })
}

/// Postgres-backed product catalog.
#[derive(Debug, Clone)]
pub struct PostgresCatalogStore {
    pool: Arc<PgPool>,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl CatalogStore for PostgresCatalogStore {
    async fn insert_product(&self, product: Product) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, category, price_cents, stock, description, images, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                category = EXCLUDED.category,
                price_cents = EXCLUDED.price_cents,
                stock = EXCLUDED.stock,
                description = EXCLUDED.description,
                images = EXCLUDED.images,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(&product.description)
        .bind(&product.images)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&*self.pool)
        .await?;

        Ok(())
    }

    async fn fetch_product(&self, product_id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(product_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await?;

        row.as_ref().map(row_to_product).transpose()
    }

    #[instrument(skip(self, filter))]
    async fn find_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE TRUE"
        ));

        if let Some(search) = &filter.search {
            qb.push(" AND name ILIKE ");
            qb.push_bind(format!("%{search}%"));
        }
        if let Some(categories) = &filter.categories {
            qb.push(" AND category = ANY(");
            qb.push_bind(categories.clone());
            qb.push(")");
        }
        if let Some(min) = filter.min_price_cents {
            qb.push(" AND price_cents >= ");
            qb.push_bind(min);
        }
        if let Some(max) = filter.max_price_cents {
            qb.push(" AND price_cents <= ");
            qb.push_bind(max);
        }

        // `seq` is the insertion sequence: natural storage order, and the
        // stable tie-break for price sorts.
        match filter.sort {
            SortOrder::None => qb.push(" ORDER BY seq"),
            SortOrder::PriceAscending => qb.push(" ORDER BY price_cents ASC, seq"),
            SortOrder::PriceDescending => qb.push(" ORDER BY price_cents DESC, seq"),
        };

        let rows = qb.build().fetch_all(&*self.pool).await?;
        rows.iter().map(row_to_product).collect()
    }

    async fn patch_product(
        &self,
        product_id: ProductId,
        patch: &ProductPatch,
    ) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE products SET
                name = COALESCE($2, name),
                category = COALESCE($3, category),
                price_cents = COALESCE($4, price_cents),
                stock = COALESCE($5, stock),
                description = COALESCE($6, description),
                images = COALESCE($7, images),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(product_id.as_uuid())
        .bind(&patch.name)
        .bind(&patch.category)
        .bind(patch.price_cents)
        .bind(patch.stock)
        .bind(&patch.description)
        .bind(&patch.images)
        .fetch_optional(&*self.pool)
        .await?;

        row.as_ref().map(row_to_product).transpose()
    }

    async fn delete_product(
        &self,
        product_id: ProductId,
    ) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(&format!(
            "DELETE FROM products WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(product_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await?;

        row.as_ref().map(row_to_product).transpose()
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn compare_and_swap_stock(
        &self,
        product_id: ProductId,
        observed: i64,
        new: i64,
    ) -> Result<StockWrite, StoreError> {
        let result = sqlx::query(
            "UPDATE products SET stock = $3, updated_at = NOW() WHERE id = $1 AND stock = $2",
        )
        .bind(product_id.as_uuid())
        .bind(observed)
        .bind(new)
        .execute(&*self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(StockWrite::Applied);
        }

        // Guard failed: distinguish a lost race from a missing row.
        let exists = sqlx::query("SELECT 1 FROM products WHERE id = $1")
            .bind(product_id.as_uuid())
            .fetch_optional(&*self.pool)
            .await?;

        Ok(if exists.is_some() {
            StockWrite::Rejected
        } else {
            StockWrite::Missing
        })
    }
}

/// Postgres-backed persisted carts.
///
/// The merge law lives in the upsert itself: `ON CONFLICT` sums the quantity
/// and refreshes the snapshot, so concurrent adds to one cart serialize at
/// the row level.
#[derive(Debug, Clone)]
pub struct PostgresCartStore {
    pool: Arc<PgPool>,
}

impl PostgresCartStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl CartStore for PostgresCartStore {
    async fn merge_line(&self, cart_id: CartId, line: CartLine) -> Result<CartLine, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO cart_lines (cart_id, product_id, name, price_cents, quantity)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (cart_id, product_id) DO UPDATE SET
                name = EXCLUDED.name,
                price_cents = EXCLUDED.price_cents,
                quantity = cart_lines.quantity + EXCLUDED.quantity
            RETURNING product_id, name, price_cents, quantity
            "#,
        )
        .bind(cart_id.as_uuid())
        .bind(line.product_id.as_uuid())
        .bind(&line.name)
        .bind(line.price_cents)
        .bind(line.quantity)
        .fetch_one(&*self.pool)
        .await?;

        row_to_cart_line(&row)
    }

    async fn cart_lines(&self, cart_id: CartId) -> Result<Vec<CartLine>, StoreError> {
        let rows = sqlx::query(
            "SELECT product_id, name, price_cents, quantity FROM cart_lines WHERE cart_id = $1 ORDER BY seq",
        )
        .bind(cart_id.as_uuid())
        .fetch_all(&*self.pool)
        .await?;

        rows.iter().map(row_to_cart_line).collect()
    }

    async fn clear_cart(&self, cart_id: CartId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM cart_lines WHERE cart_id = $1")
            .bind(cart_id.as_uuid())
            .execute(&*self.pool)
            .await?;

        Ok(())
    }
}
