use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

/// Registers the JWT bearer scheme referenced by `security(("bearer_auth" = []))`.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            let mut scheme = Http::new(HttpAuthScheme::Bearer);
            scheme.bearer_format = Some("JWT".to_string());
            components.add_security_scheme("bearer_auth", SecurityScheme::Http(scheme));
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Gudang API",
        version = "1.0.0",
        description = r#"
# Gudang Material ULP Tabing

Backend for the warehouse of returned PLN distribution materials: staff submit
poles, kWh meters, cables and general materials; verifiers approve or reject
them; administrators manage accounts, the material catalog and broadcasts.

## Authentication

Obtain a token from `POST /auth/login` and send it on every request:

```
Authorization: Bearer <your-jwt-token>
```

## Errors

Failures return a JSON body with a stable `code`, an Indonesian `message`
for display and, for client errors, English `details`.

## Pagination

`GET /api/v1/items` accepts `page` (default 1) and `limit` (default 20, max 100).
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Login and current user"),
        (name = "items", description = "Item submission and verification"),
        (name = "materials", description = "Material catalog"),
        (name = "users", description = "Account administration"),
        (name = "notifications", description = "Broadcast notices"),
        (name = "reports", description = "Dashboard and exports")
    ),
    paths(
        // Auth
        crate::auth::login_handler,
        crate::auth::me_handler,

        // Items
        crate::handlers::items::list_items,
        crate::handlers::items::create_item,
        crate::handlers::items::get_item,
        crate::handlers::items::update_item,
        crate::handlers::items::approve_item,
        crate::handlers::items::reject_item,
        crate::handlers::items::delete_item,
        crate::handlers::items::stream_items,

        // Materials
        crate::handlers::materials::list_materials,
        crate::handlers::materials::list_categories,
        crate::handlers::materials::add_material,

        // Users
        crate::handlers::users::list_users,
        crate::handlers::users::create_user,
        crate::handlers::users::update_user,
        crate::handlers::users::set_user_status,
        crate::handlers::users::reset_password,

        // Notifications
        crate::handlers::notifications::list_notifications,
        crate::handlers::notifications::send_notification,
        crate::handlers::notifications::mark_read,
        crate::handlers::notifications::mark_all_read,

        // Reports
        crate::handlers::reports::summary,
        crate::handlers::reports::export,
    ),
    components(
        schemas(
            crate::models::InventoryItem,
            crate::models::ItemDetails,
            crate::models::ItemStatus,
            crate::models::ItemKind,
            crate::models::Condition,
            crate::models::MaterialCatalogEntry,
            crate::models::TargetRole,
            crate::models::UserRole,
            crate::services::inventory::NewItem,
            crate::services::inventory::ItemPatch,
            crate::handlers::items::RejectRequest,
            crate::events::ItemChange,
            crate::services::reports::ReportSummary,
            crate::services::reports::ExportReport,
            crate::auth::LoginCredentials,
            crate::auth::TokenResponse,
            crate::auth::UserProfile,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
