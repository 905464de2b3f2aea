use crate::{
    api::{leave, project, team},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    governor::middleware::NoOpMiddleware, Governor, GovernorConfigBuilder, PeerIpKeyExtractor,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(handlers::protected)
            .service(
                web::scope("/leaves")
                    // /leaves/apply
                    .service(
                        web::resource("/apply").route(web::post().to(leave::apply_leave)),
                    )
                    // /leaves/preview
                    .service(
                        web::resource("/preview").route(web::post().to(leave::preview_impact)),
                    )
                    // /leaves/my
                    .service(web::resource("/my").route(web::get().to(leave::my_leaves)))
                    // /leaves/{id}/status
                    .service(
                        web::resource("/{id}/status")
                            .route(web::patch().to(leave::update_leave_status)),
                    ),
            )
            .service(
                web::scope("/team")
                    .service(web::resource("/my-team").route(web::get().to(team::my_team)))
                    .service(web::resource("/members").route(web::get().to(team::team_members)))
                    .service(web::resource("/info").route(web::get().to(team::team_info))),
            )
            .service(
                web::scope("/projects")
                    .service(
                        web::resource("/my-projects").route(web::get().to(project::my_projects)),
                    )
                    .service(
                        web::resource("/deadlines").route(web::get().to(project::deadlines)),
                    )
                    // /projects/{id}
                    .service(web::resource("/{id}").route(web::get().to(project::get_project))),
            ),
    );
}
