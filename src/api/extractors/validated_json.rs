//! JSON body extractor that runs `validator` rules before the handler.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::errors::AppError;

/// Deserialized and validated request body.
///
/// ```rust,ignore
/// async fn create_task(ValidatedJson(body): ValidatedJson<CreateTaskRequest>) { .. }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        value
            .validate()
            .map_err(|e| AppError::validation(describe(&e)))?;

        Ok(ValidatedJson(value))
    }
}

/// Join every field message, nested structs included, in field order.
fn describe(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    collect(errors, &mut messages);
    messages.sort();
    messages.join(", ")
}

fn collect(errors: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(errs) => out.extend(errs.iter().map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })),
            ValidationErrorsKind::Struct(inner) => collect(inner, out),
            ValidationErrorsKind::List(items) => {
                for inner in items.values() {
                    collect(inner, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Inner {
        #[validate(length(min = 1, message = "Task subject is required"))]
        subject: String,
    }

    #[derive(Debug, Deserialize, Validate)]
    struct Outer {
        #[validate(length(min = 1, message = "Project code is required"))]
        code: String,
        #[validate(nested)]
        inner: Inner,
    }

    #[test]
    fn test_nested_messages_are_reported() {
        let body = Outer {
            code: String::new(),
            inner: Inner {
                subject: String::new(),
            },
        };

        let errors = body.validate().unwrap_err();

        assert_eq!(
            describe(&errors),
            "Project code is required, Task subject is required"
        );
    }

    #[test]
    fn test_unnamed_rule_falls_back_to_field_name() {
        #[derive(Debug, Validate)]
        struct Phone {
            #[validate(length(equal = 10))]
            phone: String,
        }

        let errors = Phone {
            phone: "123".to_string(),
        }
        .validate()
        .unwrap_err();

        assert_eq!(describe(&errors), "phone is invalid");
    }
}
