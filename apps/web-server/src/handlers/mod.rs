//! HTTP handlers and route configuration.

mod api;
mod health;
mod posts;
mod users;
pub mod views;

use actix_web::{HttpRequest, HttpResponse, web};

use crate::middleware::error::{AppError, AppResult};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .route("/auth/token", web::post().to(api::issue_token))
            .service(
                web::resource("/groups")
                    .route(web::get().to(api::list_groups))
                    .route(web::post().to(api::create_group)),
            ),
    )
    .service(
        web::scope("/auth")
            .service(
                web::resource("/login/")
                    .route(web::get().to(users::login_form))
                    .route(web::post().to(users::login)),
            )
            .service(
                web::resource("/logout/")
                    .route(web::get().to(users::logout))
                    .route(web::post().to(users::logout)),
            )
            .service(
                web::resource("/signup/")
                    .route(web::get().to(users::signup_form))
                    .route(web::post().to(users::signup)),
            ),
    )
    .route("/", web::get().to(posts::index))
    .route("/group/{slug}/", web::get().to(posts::group_posts))
    .route("/profile/{username}/", web::get().to(posts::profile))
    .service(
        web::resource("/create/")
            .route(web::get().to(posts::post_create_form))
            .route(web::post().to(posts::post_create)),
    )
    .route("/posts/{post_id}/", web::get().to(posts::post_detail))
    .service(
        web::resource("/posts/{post_id}/edit/")
            .route(web::get().to(posts::post_edit_form))
            .route(web::post().to(posts::post_edit)),
    )
    .default_service(web::to(not_found));
}

async fn not_found(req: HttpRequest) -> AppResult<HttpResponse> {
    Err(AppError::NotFound(format!("No route for {}", req.path())))
}
