use std::collections::HashMap;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::error::WebError;

const DEFAULT_OWNER: &str = "owner";

/// Identity of the key holder, inserted into request extensions by [`require_auth`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner(pub String);

pub async fn require_auth(
    State(api_keys): State<ApiKeys>,
    mut request: Request,
    next: Next,
) -> Result<Response, WebError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);

    let Some(owner) = token.and_then(|t| api_keys.owner_of(t)) else {
        tracing::warn!("Invalid API key attempt");
        return Err(WebError::Unauthorized);
    };

    request.extensions_mut().insert(Owner(owner.to_string()));
    Ok(next.run(request).await)
}

#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    keys: HashMap<String, String>,
}

impl ApiKeys {
    pub fn from_comma_separated(keys_str: &str) -> Self {
        let keys = keys_str
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|entry| match entry.split_once(':') {
                Some((owner, key)) => (key.trim().to_string(), owner.trim().to_string()),
                None => (entry.to_string(), DEFAULT_OWNER.to_string()),
            })
            .filter(|(key, owner)| !key.is_empty() && !owner.is_empty())
            .collect();

        Self { keys }
    }

    pub fn owner_of(&self, key: &str) -> Option<&str> {
        self.keys.get(key).map(String::as_str)
    }
}
