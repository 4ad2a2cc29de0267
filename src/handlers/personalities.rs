use crate::db::Personality;
use crate::{PersonalityError, router::AppState};
use axum::{
    Json,
    extract::{Path, State},
};

/// GET / -> fixed greeting, no I/O.
pub async fn hello() -> &'static str {
    "Hello k8s!"
}

/// GET /personalities/{id} -> the matching rows; an unknown id yields `[]`.
pub async fn get_personality_by_id(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<Vec<Personality>>, PersonalityError> {
    let id = parse_id(&raw)?;
    let personalities = state.store.find_by_id(id).await?;
    Ok(Json(personalities))
}

/// GET /personalities -> every row.
pub async fn list_personalities(
    State(state): State<AppState>,
) -> Result<Json<Vec<Personality>>, PersonalityError> {
    let personalities = state.store.list_all().await?;
    Ok(Json(personalities))
}

fn parse_id(raw: &str) -> Result<i64, PersonalityError> {
    raw.parse::<i64>().map_err(|source| PersonalityError::Parse {
        raw: raw.to_string(),
        source,
    })
}
