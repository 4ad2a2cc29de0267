use crate::db::mapper::map_rows;
use crate::db::models::Personality;
use crate::db::query::QueryRunner;
use crate::error::Result;
use async_trait::async_trait;
use sqlx::mysql::MySqlPool;

/// Read access to personality records.
#[async_trait]
pub trait PersonalityStore: Send + Sync {
    /// Rows whose id equals `id`: zero or one in practice.
    async fn find_by_id(&self, id: i64) -> Result<Vec<Personality>>;

    /// Every row, in whatever order the database returns them.
    async fn list_all(&self) -> Result<Vec<Personality>>;
}

const SELECT_BY_ID: &str = "SELECT id, name, mail, created, modified FROM t_speaker WHERE id = ?";
const SELECT_ALL: &str = "SELECT id, name, mail, created, modified FROM t_speaker";

#[derive(Clone)]
pub struct MySqlPersonalityStore {
    runner: QueryRunner,
}

impl MySqlPersonalityStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self {
            runner: QueryRunner::new(pool),
        }
    }

    /// Close every pooled connection, waiting for checked-out ones to come back.
    pub async fn close(&self) {
        self.runner.pool().close().await;
    }
}

#[async_trait]
impl PersonalityStore for MySqlPersonalityStore {
    async fn find_by_id(&self, id: i64) -> Result<Vec<Personality>> {
        let query = sqlx::query(SELECT_BY_ID).bind(id);
        map_rows(self.runner.run(query, "getPersonalityByID")).await
    }

    async fn list_all(&self) -> Result<Vec<Personality>> {
        map_rows(self.runner.run(sqlx::query(SELECT_ALL), "getAllPersonalities")).await
    }
}
