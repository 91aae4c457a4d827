use crate::error::ServerResult;
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use matcher::Category;

/// Categories response body
#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<CategoryOutput>,
}

#[derive(Debug, Serialize)]
pub struct CategoryOutput {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl From<Category> for CategoryOutput {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            color: category.color,
        }
    }
}

/// List the categories currently covered by the registered matchers.
///
/// This is the set a check with no category filter would dispatch to.
pub async fn list_categories(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<impl IntoResponse> {
    let mut categories: Vec<CategoryOutput> = state
        .pool
        .current_categories()
        .into_iter()
        .map(CategoryOutput::from)
        .collect();
    categories.sort_by(|a, b| a.id.cmp(&b.id));

    Ok(Json(CategoriesResponse { categories }))
}
