use crate::auth::jwt::{TokenType, generate_access_token, generate_refresh_token, verify_token};
use crate::config::Config;
use crate::engine::registry;
use crate::state::SharedState;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument};
use utoipa::ToSchema;

/// Identity claim handed over by the external provider after a successful
/// sign-in. The portal never sees credentials, only the resulting claim.
#[derive(Deserialize, ToSchema)]
pub struct IdentityClaim {
    #[schema(example = "mark.torres@btgi.com.au", format = "email")]
    pub email: String,
    #[schema(example = "Mark Torres")]
    pub display_name: String,
}

#[derive(Serialize, ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Exchange an external identity claim for a token pair, auto-provisioning
/// unknown users.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = IdentityClaim,
    responses(
        (status = 200, description = "Authenticated", body = TokenPair),
        (status = 400, description = "Bad identity claim"),
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_login", skip(state, config, claim), fields(email = %claim.email))]
pub async fn login(
    claim: web::Json<IdentityClaim>,
    state: web::Data<SharedState>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let email = claim.email.trim().to_lowercase();
    let display_name = claim.display_name.trim();
    if email.is_empty() || display_name.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "email and display_name are required"
        })));
    }

    let user = {
        let mut state = state.write().expect("state lock poisoned");
        registry::provision(&mut state, &email, display_name, &config.admin_email)?
    };

    info!(role = %user.role, "login successful");

    let access_token = generate_access_token(
        &user.email,
        &user.name,
        user.role,
        &config.jwt_secret,
        config.access_token_ttl,
    );
    let refresh_token = generate_refresh_token(
        &user.email,
        &user.name,
        user.role,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    Ok(HttpResponse::Ok().json(TokenPair {
        access_token,
        refresh_token,
    }))
}

/// Rotate a refresh token into a fresh token pair.
#[utoipa::path(
    post,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "New token pair", body = TokenPair),
        (status = 401, description = "Invalid or non-refresh token"),
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn refresh_token(req: HttpRequest, config: web::Data<Config>) -> impl Responder {
    let header = match req.headers().get("Authorization") {
        Some(h) => h.to_str().unwrap_or(""),
        None => return HttpResponse::Unauthorized().body("No token"),
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return HttpResponse::Unauthorized().body("Invalid token"),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::Unauthorized().finish(),
    };

    if claims.token_type != TokenType::Refresh {
        return HttpResponse::Unauthorized().finish();
    }

    let access_token = generate_access_token(
        &claims.sub,
        &claims.name,
        claims.role,
        &config.jwt_secret,
        config.access_token_ttl,
    );
    let new_refresh_token = generate_refresh_token(
        &claims.sub,
        &claims.name,
        claims.role,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    HttpResponse::Ok().json(json!({
        "access_token": access_token,
        "refresh_token": new_refresh_token
    }))
}

/// Stateless logout: always succeeds, the client drops its tokens.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 204, description = "Logged out")),
    tag = "Auth"
)]
pub async fn logout() -> impl Responder {
    HttpResponse::NoContent().finish()
}
