use crate::core::catalog::BeanCatalog;
use crate::domain::model::{AddBeanResponse, Bean, BeansResponse};
use crate::utils::error::{CatalogError, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderValue},
    routing::get,
    Json, Router,
};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

/// Routes for the bean catalog. Every response is tagged `application/json`.
pub fn build_router(catalog: BeanCatalog) -> Router {
    Router::new()
        .route("/beans", get(get_beans).post(add_bean))
        .layer(SetResponseHeaderLayer::overriding(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(catalog)
}

/// GET /beans
async fn get_beans(State(catalog): State<BeanCatalog>) -> Result<Json<BeansResponse>> {
    let beans = catalog.list_beans().await?;
    Ok(Json(BeansResponse { beans }))
}

/// POST /beans
///
/// The body is decoded by hand so that every decode failure is a 400.
async fn add_bean(State(catalog): State<BeanCatalog>, body: Bytes) -> Result<Json<AddBeanResponse>> {
    let bean: Bean =
        serde_json::from_slice(&body).map_err(|e| CatalogError::malformed(e.to_string()))?;

    let id = catalog.add_bean(bean).await?;
    Ok(Json(AddBeanResponse { id }))
}
