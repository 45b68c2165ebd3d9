use crate::dto;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(info(
    title = "Todo Tracker",
    description = "Personal todo lists with per-user accounts. Forms are posted urlencoded and pages are rendered as JSON view models."
))]
struct TodoTrackerApi;

/// Constructs the route on the API that renders the swagger UI and returns the OpenAPI schema.
/// Merges in OpenAPI definitions from other locations in the app, such as the [dto] package
/// and submodules of [api][crate::api]
pub fn build_documentation() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi_document())
}

fn openapi_document() -> utoipa::openapi::OpenApi {
    let mut api_docs = TodoTrackerApi::openapi();
    api_docs.merge(dto::OpenApiSchemas::openapi());
    api_docs.merge(super::account::AccountApi::openapi());
    api_docs.merge(super::todo::TodoApi::openapi());

    api_docs
}
