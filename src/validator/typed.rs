//! Typed body validation.

use std::fmt;
use std::marker::PhantomData;

use futures_util::future::{self, BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::interceptors::{Interception, Interceptor, InterceptorResult};
use crate::message::{ApiError, Message, RequestScope};

/// Semantic checks run after a body decodes into `Self`.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

/// Decodes the request body into `T` and runs [`Validate::validate`].
///
/// Any failure, decoding included, is reported as a 500 with the reason.
pub struct BodyValidator<T> {
    _target: PhantomData<fn() -> T>,
}

impl<T> BodyValidator<T>
where
    T: DeserializeOwned + Validate,
{
    pub fn new() -> Self {
        Self {
            _target: PhantomData,
        }
    }

    pub fn check(&self, request: &Message) -> Result<T, ApiError> {
        let body = Value::Object(request.body.clone().unwrap_or_default());
        let value: T = serde_json::from_value(body).map_err(failed)?;
        value.validate().map_err(failed)?;
        Ok(value)
    }
}

impl<T> Default for BodyValidator<T>
where
    T: DeserializeOwned + Validate,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for BodyValidator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyValidator")
            .field("target", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> Interceptor for BodyValidator<T>
where
    T: DeserializeOwned + Validate,
{
    fn intercept(
        &self,
        _scope: RequestScope,
        request: Message,
        _response: Message,
    ) -> BoxFuture<'_, InterceptorResult> {
        let result = self.check(&request).map(|_| Interception::pass());
        future::ready(result).boxed()
    }
}

fn failed(reason: impl fmt::Display) -> ApiError {
    ApiError::internal(format!("Variable validation failed. Reason: {reason}"))
}
