use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::errors::{ApiError, BindErrors};

/// JSON body that is validated after deserialization.
///
/// Unreadable bodies fail with [`ApiError::BodyRejected`], bodies breaking
/// their `validate` rules with [`ApiError::InvalidBody`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;

        value
            .validate()
            .map_err(|errors| BindErrors::from_validation(object_name::<T>(), &errors))?;

        Ok(Self(value))
    }
}

/// Unqualified type name, e.g. `NewUser` for `my_app::api::NewUser`
fn object_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Signup {
        #[validate(length(min = 1, message = "must not be blank"))]
        name: String,
        #[validate(email(message = "must be a well-formed email address"))]
        email: String,
    }

    fn json_request(body: &'static str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[test]
    fn test_object_name() {
        assert_eq!(object_name::<Signup>(), "Signup");
        assert_eq!(object_name::<Vec<Signup>>(), "Vec");
    }

    #[test]
    fn test_valid_body() {
        let req = json_request(r#"{"name": "Ada", "email": "ada@example.com"}"#);
        let ValidatedJson(signup) =
            tokio_test::block_on(ValidatedJson::<Signup>::from_request(req, &())).unwrap();
        assert_eq!(signup.name, "Ada");
    }

    #[test]
    fn test_invalid_fields() {
        let req = json_request(r#"{"name": "", "email": "nope"}"#);
        let err = tokio_test::block_on(ValidatedJson::<Signup>::from_request(req, &())).unwrap_err();

        let bind = match err {
            ApiError::InvalidBody(bind) => bind,
            other => panic!("expected InvalidBody, got {:?}", other),
        };
        assert_eq!(bind.object_name(), "Signup");
        let fields: Vec<_> = bind.field_errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["email", "name"]);
    }

    #[test]
    fn test_malformed_body() {
        let req = json_request(r#"{"name": "#);
        let err = tokio_test::block_on(ValidatedJson::<Signup>::from_request(req, &())).unwrap_err();
        assert!(matches!(err, ApiError::BodyRejected(_)));
    }
}
