use utoipa::OpenApi;

use crate::api::handlers::{NewUser, User};
use crate::errors::{ErrorResponse, ValidationError};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Common Error Demo",
        version = "0.1.0",
        description = "Demo service showing the structured error responses produced by the common-error layer.",
    ),
    paths(
        crate::api::handlers::health,
        crate::api::handlers::create_user,
        crate::api::handlers::get_user,
        crate::api::handlers::fail,
        crate::api::handlers::panic_handler,
    ),
    components(
        schemas(
            ErrorResponse,
            ValidationError,
            NewUser,
            User,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "Validated user endpoints"),
        (name = "demo", description = "Endpoints that always fail"),
    )
)]
pub struct ApiDoc;
