//! Field presence checks.

use std::collections::BTreeMap;

use futures_util::future::{self, BoxFuture, FutureExt};
use serde_json::{Map, Value};

use crate::interceptors::{Interception, Interceptor, InterceptorResult};
use crate::message::{ApiError, Message, RequestScope};

/// Field name → whether the body must (`true`) or must not (`false`) contain it.
pub type FieldRules = BTreeMap<String, bool>;

/// Check `data` against `rules`, reporting the first violated rule.
pub fn validate_input_fields(
    rules: &FieldRules,
    data: &Map<String, Value>,
) -> Result<(), ApiError> {
    for (key, &required) in rules {
        if data.contains_key(key) != required {
            let message = if required {
                format!("Input must contain '{key}' field.")
            } else {
                format!("Input cannot contain '{key}' field.")
            };
            return Err(ApiError::bad_request(message));
        }
    }
    Ok(())
}

/// Like [`validate_input_fields`], and additionally rejects fields no rule names.
pub fn validate_exact_input_fields(
    rules: &FieldRules,
    data: &Map<String, Value>,
) -> Result<(), ApiError> {
    validate_input_fields(rules, data)?;

    match data.keys().find(|key| !rules.contains_key(*key)) {
        Some(key) => Err(ApiError::bad_request(format!("Unexpected field '{key}'."))),
        None => Ok(()),
    }
}

/// Interceptor form of the field checks. A missing body counts as empty.
#[derive(Debug, Clone)]
pub struct InputFieldValidator {
    rules: FieldRules,
    exact: bool,
}

impl InputFieldValidator {
    pub fn new<I, K>(rules: I) -> Self
    where
        I: IntoIterator<Item = (K, bool)>,
        K: Into<String>,
    {
        Self {
            rules: rules.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            exact: false,
        }
    }

    /// Also reject fields the rules do not mention.
    pub fn exact(mut self) -> Self {
        self.exact = true;
        self
    }

    pub fn check(&self, request: &Message) -> Result<(), ApiError> {
        let empty = Map::new();
        let body = request.body.as_ref().unwrap_or(&empty);
        if self.exact {
            validate_exact_input_fields(&self.rules, body)
        } else {
            validate_input_fields(&self.rules, body)
        }
    }
}

impl Interceptor for InputFieldValidator {
    fn intercept(
        &self,
        _scope: RequestScope,
        request: Message,
        _response: Message,
    ) -> BoxFuture<'_, InterceptorResult> {
        let result = self.check(&request).map(|()| Interception::pass());
        future::ready(result).boxed()
    }
}
