use crate::db::models::{Personality, PersonalityRow};
use crate::db::query::RowCursor;
use crate::error::{PersonalityError, Result};
use futures::TryStreamExt;

/// Drain `cursor` into personalities, keeping database row order.
///
/// The cursor is consumed: it is released on success and on the first error.
pub async fn map_rows<R>(mut cursor: RowCursor<'_, R>) -> Result<Vec<Personality>>
where
    R: PersonalityRow,
{
    let mut personalities = Vec::new();
    while let Some(row) = cursor.try_next().await.map_err(PersonalityError::Query)? {
        personalities.push(row.decode().map_err(PersonalityError::Mapping)?);
    }
    Ok(personalities)
}
