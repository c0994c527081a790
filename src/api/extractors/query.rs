//! Query string extractor with the API's error body.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::errors::AppError;

/// Like [`axum::extract::Query`], but a missing or malformed parameter is
/// reported as an [`AppError::BadRequest`].
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?;
        Ok(QueryParams(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct IdQuery {
        id: i64,
    }

    async fn extract(uri: &str) -> Result<QueryParams<IdQuery>, AppError> {
        let (mut parts, _) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        QueryParams::<IdQuery>::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_parses_query() {
        let QueryParams(query) = extract("/api/products?id=12").await.unwrap();
        assert_eq!(query.id, 12);
    }

    #[tokio::test]
    async fn test_missing_or_bad_param_is_bad_request() {
        assert!(matches!(extract("/api/products").await, Err(AppError::BadRequest(_))));
        assert!(matches!(
            extract("/api/products?id=abc").await,
            Err(AppError::BadRequest(_))
        ));
    }
}
