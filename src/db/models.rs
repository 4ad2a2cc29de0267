use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::mysql::MySqlRow;

/// One row of `t_speaker`, as served over HTTP.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Personality {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "CreatedAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "UpdatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// A result row that can be decoded into a [`Personality`].
pub trait PersonalityRow {
    fn decode(&self) -> Result<Personality, sqlx::Error>;
}

/// `t_speaker` columns, in select order.
pub const COL_ID: &str = "id";
pub const COL_NAME: &str = "name";
pub const COL_MAIL: &str = "mail";
pub const COL_CREATED: &str = "created";
pub const COL_MODIFIED: &str = "modified";

pub const PERSONALITY_COLUMNS: [&str; 5] = [COL_ID, COL_NAME, COL_MAIL, COL_CREATED, COL_MODIFIED];

impl PersonalityRow for MySqlRow {
    fn decode(&self) -> Result<Personality, sqlx::Error> {
        Ok(Personality {
            id: decode_id(self)?,
            name: self.try_get(COL_NAME)?,
            email: self.try_get(COL_MAIL)?,
            created_at: self.try_get(COL_CREATED)?,
            updated_at: self.try_get(COL_MODIFIED)?,
        })
    }
}

// AUTO_INCREMENT ids are often UNSIGNED, which sqlx will not read as i64.
fn decode_id(row: &MySqlRow) -> Result<i64, sqlx::Error> {
    match row.try_get::<i64, _>(COL_ID) {
        Ok(id) => Ok(id),
        Err(signed @ sqlx::Error::ColumnDecode { .. }) => {
            let id: u64 = row.try_get(COL_ID).map_err(|_| signed)?;
            id_from_unsigned(id)
        }
        Err(e) => Err(e),
    }
}

fn id_from_unsigned(id: u64) -> Result<i64, sqlx::Error> {
    i64::try_from(id).map_err(|e| sqlx::Error::ColumnDecode {
        index: format!("{COL_ID:?}"),
        source: Box::new(e),
    })
}
