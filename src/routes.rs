use crate::{
    api::{dashboard, leave_request, user},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter config
    fn build_limiter(requests_per_min: u32) -> GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware> {
        let burst = requests_per_min.max(1);
        GovernorConfigBuilder::default()
            .per_millisecond(60_000 / burst as u64)
            .burst_size(burst)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap()
    }

    let login_limiter = build_limiter(config.rate_login_per_min);
    let protected_limiter = build_limiter(config.rate_protected_per_min);

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(Governor::new(&login_limiter))
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(Governor::new(&login_limiter))
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(Governor::new(&login_limiter))
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            .wrap(Governor::new(&protected_limiter)) // rate limiting
            .service(
                web::scope("/leave")
                    // /leave
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    // /leave/mine
                    .service(
                        web::resource("/mine").route(web::get().to(leave_request::my_leaves)),
                    )
                    // /leave/{id}
                    .service(web::resource("/{id}").route(web::get().to(leave_request::get_leave)))
                    // /leave/{id}/approve
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(leave_request::approve_leave)),
                    )
                    // /leave/{id}/reject
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(leave_request::reject_leave)),
                    ),
            )
            .service(
                web::scope("/users")
                    // /users
                    .service(
                        web::resource("")
                            .route(web::get().to(user::list_users))
                            .route(web::post().to(user::create_user)),
                    )
                    // /users/me must register before the {email} matcher
                    .service(web::resource("/me").route(web::put().to(user::update_profile)))
                    // /users/{email}/balance
                    .service(
                        web::resource("/{email}/balance")
                            .route(web::get().to(user::user_balance)),
                    )
                    // /users/{email}
                    .service(
                        web::resource("/{email}")
                            .route(web::put().to(user::update_user))
                            .route(web::delete().to(user::delete_user)),
                    ),
            )
            .service(web::resource("/balance").route(web::get().to(user::my_balance)))
            .service(
                web::scope("/dashboard")
                    .service(web::resource("/years").route(web::get().to(dashboard::years)))
                    .service(web::resource("/overview").route(web::get().to(dashboard::overview)))
                    .service(web::resource("/monthly").route(web::get().to(dashboard::monthly)))
                    .service(web::resource("/on-leave").route(web::get().to(dashboard::on_leave)))
                    .service(
                        web::resource("/departments")
                            .route(web::get().to(dashboard::departments)),
                    )
                    .service(
                        web::resource("/employees").route(web::get().to(dashboard::employees)),
                    ),
            ),
    );
}

// LOGIN (external identity claim)
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)

// API REQUEST
//  └─ Authorization: Bearer access_token

// ACCESS EXPIRED
//  └─ POST /refresh with refresh_token
//       └─ returns new access_token
