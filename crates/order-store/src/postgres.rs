use async_trait::async_trait;
use common::{FeedbackId, OrderId, Version};
use domain::{Aggregate, Feedback, Order};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{
    OrderQuery, OrderSort, Result, StoreError,
    store::{FeedbackRepository, OrderRepository},
};

/// PostgreSQL-backed store implementation.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` and returns a store.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let document: serde_json::Value = row.try_get("document")?;
        let mut order: Order = serde_json::from_value(document)?;
        order.set_version(Version::new(row.try_get("version")?));
        Ok(order)
    }

    fn row_to_feedback(row: PgRow) -> Result<Feedback> {
        let document: serde_json::Value = row.try_get("document")?;
        Ok(serde_json::from_value(document)?)
    }

    fn is_constraint(err: &sqlx::Error, name: &str) -> bool {
        matches!(err, sqlx::Error::Database(db_err) if db_err.constraint() == Some(name))
    }
}

#[async_trait]
impl OrderRepository for PostgresStore {
    #[tracing::instrument(skip(self, order), fields(order_id = %order.id()))]
    async fn create(&self, mut order: Order) -> Result<Order> {
        order.set_version(Version::first());
        let document = serde_json::to_value(&order)?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, requester_id, collector_id, status, pickup_date, estimated_amount, created_at, updated_at, version, document)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(order.id().as_uuid())
        .bind(order.requester_id().as_uuid())
        .bind(order.collector_id().map(|c| c.as_uuid()))
        .bind(order.status().as_str())
        .bind(order.pickup_date())
        .bind(order.estimated_amount().minor())
        .bind(order.created_at())
        .bind(order.updated_at())
        .bind(order.version().as_i64())
        .bind(document)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if Self::is_constraint(&e, "orders_pkey") {
                return StoreError::DuplicateOrder(order.id());
            }
            StoreError::Database(e)
        })?;

        Ok(order)
    }

    async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>> {
        let row: Option<PgRow> = sqlx::query("SELECT version, document FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn find(&self, query: OrderQuery) -> Result<Vec<Order>> {
        let mut sql = String::from("SELECT version, document FROM orders WHERE 1=1");
        let mut param_count = 0;

        // Build dynamic query
        if query.requester_id.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND requester_id = ${param_count}"));
        }
        if query.collector_id.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND collector_id = ${param_count}"));
        }
        if query.statuses.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND status = ANY(${param_count})"));
        }
        if query.unassigned_only {
            sql.push_str(" AND collector_id IS NULL");
        }
        if query.pickup_date_from.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND pickup_date >= ${param_count}"));
        }
        if query.pickup_date_to.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND pickup_date <= ${param_count}"));
        }
        if query.created_from.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND created_at >= ${param_count}"));
        }
        if query.created_to.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND created_at < ${param_count}"));
        }
        if query.updated_from.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND updated_at >= ${param_count}"));
        }
        if query.updated_to.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND updated_at < ${param_count}"));
        }
        if query.min_estimated_amount.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND estimated_amount >= ${param_count}"));
        }

        sql.push_str(match query.sort {
            OrderSort::Natural => " ORDER BY seq ASC",
            OrderSort::NewestFirst => " ORDER BY created_at DESC, seq ASC",
            OrderSort::PickupDate => " ORDER BY pickup_date ASC, seq ASC",
            OrderSort::EstimatedAmountDesc => " ORDER BY estimated_amount DESC, seq ASC",
        });

        if query.limit.is_some() {
            param_count += 1;
            sql.push_str(&format!(" LIMIT ${param_count}"));
        }
        if query.offset.is_some() {
            param_count += 1;
            sql.push_str(&format!(" OFFSET ${param_count}"));
        }

        // Build and execute query with parameters
        let mut sqlx_query = sqlx::query(&sql);

        if let Some(id) = query.requester_id {
            sqlx_query = sqlx_query.bind(id.as_uuid());
        }
        if let Some(id) = query.collector_id {
            sqlx_query = sqlx_query.bind(id.as_uuid());
        }
        if let Some(statuses) = query.statuses {
            let names: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();
            sqlx_query = sqlx_query.bind(names);
        }
        if let Some(from) = query.pickup_date_from {
            sqlx_query = sqlx_query.bind(from);
        }
        if let Some(to) = query.pickup_date_to {
            sqlx_query = sqlx_query.bind(to);
        }
        if let Some(from) = query.created_from {
            sqlx_query = sqlx_query.bind(from);
        }
        if let Some(to) = query.created_to {
            sqlx_query = sqlx_query.bind(to);
        }
        if let Some(from) = query.updated_from {
            sqlx_query = sqlx_query.bind(from);
        }
        if let Some(to) = query.updated_to {
            sqlx_query = sqlx_query.bind(to);
        }
        if let Some(min) = query.min_estimated_amount {
            sqlx_query = sqlx_query.bind(min.minor());
        }
        if let Some(limit) = query.limit {
            sqlx_query = sqlx_query.bind(limit as i64);
        }
        if let Some(offset) = query.offset {
            sqlx_query = sqlx_query.bind(offset as i64);
        }

        let rows = sqlx_query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_order).collect()
    }

    #[tracing::instrument(skip(self, order), fields(order_id = %order.id(), expected = %expected_version))]
    async fn save(&self, mut order: Order, expected_version: Version) -> Result<Order> {
        order.set_version(expected_version.next());
        let document = serde_json::to_value(&order)?;

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET collector_id = $3, status = $4, pickup_date = $5, updated_at = $6, version = $7, document = $8
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(order.id().as_uuid())
        .bind(expected_version.as_i64())
        .bind(order.collector_id().map(|c| c.as_uuid()))
        .bind(order.status().as_str())
        .bind(order.pickup_date())
        .bind(order.updated_at())
        .bind(order.version().as_i64())
        .bind(document)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM orders WHERE id = $1)")
                    .bind(order.id().as_uuid())
                    .fetch_one(&self.pool)
                    .await?;

            if !exists {
                return Err(StoreError::OrderNotFound(order.id()));
            }
            tracing::debug!("conditional write lost the race");
            return Err(StoreError::ConcurrencyConflict {
                order_id: order.id(),
                expected: expected_version,
            });
        }

        Ok(order)
    }
}

#[async_trait]
impl FeedbackRepository for PostgresStore {
    async fn upsert(&self, feedback: Feedback) -> Result<Feedback> {
        let document = serde_json::to_value(&feedback)?;

        let result = sqlx::query(
            r#"
            INSERT INTO feedback (id, order_id, created_at, updated_at, document)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                updated_at = EXCLUDED.updated_at,
                document = EXCLUDED.document
            "#,
        )
        .bind(feedback.id.as_uuid())
        .bind(feedback.order_id.as_uuid())
        .bind(feedback.created_at)
        .bind(feedback.updated_at)
        .bind(document)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(feedback),
            Err(e) if Self::is_constraint(&e, "unique_feedback_order") => {
                let existing = self
                    .get_by_order(feedback.order_id)
                    .await?
                    .map(|f| f.id)
                    .unwrap_or(feedback.id);
                Err(StoreError::DuplicateFeedback {
                    order_id: feedback.order_id,
                    existing,
                })
            }
            Err(e) => Err(StoreError::Database(e)),
        }
    }

    async fn get(&self, id: FeedbackId) -> Result<Option<Feedback>> {
        let row: Option<PgRow> = sqlx::query("SELECT document FROM feedback WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_feedback).transpose()
    }

    async fn get_by_order(&self, order_id: OrderId) -> Result<Option<Feedback>> {
        let row: Option<PgRow> = sqlx::query("SELECT document FROM feedback WHERE order_id = $1")
            .bind(order_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_feedback).transpose()
    }

    async fn list(&self) -> Result<Vec<Feedback>> {
        let rows = sqlx::query("SELECT document FROM feedback ORDER BY seq ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_feedback).collect()
    }

    async fn delete(&self, id: FeedbackId) -> Result<Option<Feedback>> {
        let row: Option<PgRow> = sqlx::query("DELETE FROM feedback WHERE id = $1 RETURNING document")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_feedback).transpose()
    }
}
