//! The generated OpenAPI document and the pages that serve it.
//!
//! Every route declares its own success and error responses; this module adds
//! what is common to all of them: the `jwt` bearer scheme the `Authorization`
//! header is checked against, and the [`ErrorBody`] every failure carries.

use crate::error::ApiError;
use aide::{
    axum::{ApiRouter, IntoApiResponse, routing::get},
    openapi::{OpenApi, SecurityScheme, Tag},
    transform::TransformOpenApi,
};
use axum::{
    Extension, Json,
    response::{Html, IntoResponse},
};
use std::sync::Arc;

/// The name routes use in `security_requirement`.
pub(crate) const BEARER: &str = "jwt";

const RAPIDOC: &str = r#"<!doctype html>
<html>
  <head>
    <meta charset="utf-8">
    <script src="https://cdnjs.cloudflare.com/ajax/libs/rapidoc/9.3.8/rapidoc-min.js" integrity="sha512-0ES6eX4K9J1PrIEjIizv79dTlN5HwI2GW9Ku6ymb8dijMHF5CIplkS8N0iFJ/wl3GybCSqBJu8HDhiFkZRAf0g==" crossorigin="anonymous" referrerpolicy="no-referrer"></script>
  </head>
  <body>
    <rapi-doc spec-url="/docs/api.json"
        show-method-in-nav-bar="as-colored-text"
        use-path-in-nav-bar="true"
        allow-authentication="true"
    ></rapi-doc>
  </body>
</html>"#;

/// An interactive browser for the API, rendered by RapiDoc.
async fn rapidoc() -> impl IntoApiResponse {
    Html(RAPIDOC).into_response()
}

/// The OpenAPI document as JSON.
async fn api_json(Extension(api): Extension<Arc<OpenApi>>) -> impl IntoApiResponse {
    Json(api).into_response()
}

/// `/` renders the browser and `/api.json` the document it reads.
pub(crate) fn docs_routes() -> ApiRouter {
    ApiRouter::new()
        .route("/", get(rapidoc))
        .route("/api.json", get(api_json))
}

fn tag(name: &str, description: &str) -> Tag {
    Tag {
        name: name.into(),
        description: Some(description.into()),
        ..Default::default()
    }
}

/// Document-level metadata, security and error responses.
pub(crate) fn api_docs(api: TransformOpenApi) -> TransformOpenApi {
    api.title("Reverse Auction API")
        .summary("Run reverse auctions and bid in them.")
        .description(
            "Managers create, publish and archive auctions; suppliers submit bids and \
             follow their standing, live over server-sent events. Every failure carries \
             an error body whose `kind` names what went wrong.",
        )
        .version(env!("CARGO_PKG_VERSION"))
        .security_scheme(
            BEARER,
            SecurityScheme::Http {
                scheme: "bearer".into(),
                bearer_format: Some("JWT".into()),
                description: Some(
                    "`sub` names the user. A `supplier_id` claim lets the holder bid; \
                     `manager: true` lets the holder administer auctions."
                        .into(),
                ),
                extensions: Default::default(),
            },
        )
        .default_response_with::<ApiError, _>(|res| {
            res.description("The request failed; `kind` names the failure")
        })
        .tag(tag("auction", "Creating, editing, publishing and archiving auctions"))
        .tag(tag("bid", "Submitting bids and following one's own standing"))
        .tag(tag("history", "The append-only record of submitted bids"))
        .tag(tag("manager", "Operations that need auction management rights"))
}
