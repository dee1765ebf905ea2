use actix_web::{dev::Payload, web, Error, FromRequest, HttpRequest};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use utoipa::ToSchema;

use crate::routes::AppState;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Moderator,
    Admin,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::Moderator => "Moderator",
            Role::Admin => "Admin",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub roles: Vec<Role>,
}

/// Validate a JWT and return its claims.
fn decode_jwt(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

/// Create a JWT for a moderator account.
pub fn create_jwt(
    user_id: &str,
    name: &str,
    roles: Vec<Role>,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let expiration = (chrono::Utc::now() + chrono::Duration::hours(24)).timestamp() as usize;
    let claims = Claims {
        sub: format!("{user_id}:{name}"),
        exp: expiration,
        roles,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// The moderator on whose behalf a request acts.
///
/// Requests without an `Authorization` header act as the configured demo
/// moderator (an admin). A bearer token, when present, must verify.
#[derive(Debug, Clone)]
pub struct Actor {
    pub name: String,
    pub roles: Vec<Role>,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| matches!(r, Role::Admin))
    }

    fn from_claims(claims: Claims) -> Self {
        // subject shape: "<id>:<display name>"
        let name = claims
            .sub
            .split_once(':')
            .map(|(_, name)| name.to_string())
            .unwrap_or(claims.sub);
        Self { name, roles: claims.roles }
    }
}

impl FromRequest for Actor {
    type Error = Error;
    type Future = Ready<Result<Self, Error>>;

    fn from_request(req: &HttpRequest, pl: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            return ready(Err(actix_web::error::ErrorInternalServerError("app state missing")));
        };
        if req.headers().contains_key(actix_web::http::header::AUTHORIZATION) {
            let Ok(bearer) = BearerAuth::from_request(req, pl).into_inner() else {
                return ready(Err(actix_web::error::ErrorUnauthorized("Malformed authorization header")));
            };
            let Some(secret) = state.config.jwt_secret.as_deref() else {
                return ready(Err(actix_web::error::ErrorUnauthorized("Token auth not configured")));
            };
            return match decode_jwt(bearer.token(), secret) {
                Ok(claims) => ready(Ok(Actor::from_claims(claims))),
                Err(_) => ready(Err(actix_web::error::ErrorUnauthorized("Invalid JWT"))),
            };
        }
        ready(Ok(Actor {
            name: state.config.demo_moderator.clone(),
            roles: vec![Role::Admin],
        }))
    }
}
