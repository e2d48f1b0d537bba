use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::api::models::AnalyzeRequest;
use crate::api::response;

/// Page URL taken from the request body, already checked to be an absolute
/// `http`/`https` URL. Rejects with `400 Invalid argument(s).` otherwise.
#[derive(Debug, Clone)]
pub struct ValidatedUrl(pub String);

#[async_trait]
impl<S> FromRequest<S> for ValidatedUrl
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let headers = req.headers().clone();
        let body = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match AnalyzeRequest::from_body(&headers, &body).validate() {
            Ok(url) => Ok(ValidatedUrl(url)),
            Err(errors) => {
                warn!(?errors, "rejected analyze request");
                Err(response::invalid_arguments(errors).into_response())
            }
        }
    }
}
