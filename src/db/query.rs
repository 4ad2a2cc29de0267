use futures::stream::{BoxStream, Stream, StreamExt};
use sqlx::mysql::{MySqlArguments, MySqlPool, MySqlRow};
use sqlx::query::Query;
use sqlx::{Error as SqlxError, MySql};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;
use tracing::info;

/// Forward-only rows of one query.
///
/// Dropping the cursor releases the underlying connection and logs how long the
/// query ran, whether it was drained, failed, or abandoned part way.
pub struct RowCursor<'c, R = MySqlRow> {
    rows: BoxStream<'c, Result<R, SqlxError>>,
    operation: &'static str,
    started: Instant,
}

impl<'c, R> RowCursor<'c, R> {
    pub fn new(rows: BoxStream<'c, Result<R, SqlxError>>, operation: &'static str) -> Self {
        Self {
            rows,
            operation,
            started: Instant::now(),
        }
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }
}

impl<R> Stream for RowCursor<'_, R> {
    type Item = Result<R, SqlxError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rows.poll_next_unpin(cx)
    }
}

impl<R> Drop for RowCursor<'_, R> {
    fn drop(&mut self) {
        info!(
            operation = self.operation,
            elapsed = ?self.started.elapsed(),
            "query finished"
        );
    }
}

/// Issues queries against the shared pool.
#[derive(Clone)]
pub struct QueryRunner {
    pool: MySqlPool,
}

impl QueryRunner {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Start `query` and return a cursor over its rows. Nothing is retried.
    pub fn run<'e, 'q: 'e>(
        &'e self,
        query: Query<'q, MySql, MySqlArguments>,
        operation: &'static str,
    ) -> RowCursor<'e> {
        RowCursor::new(query.fetch(&self.pool), operation)
    }
}
