//! Shared fixtures for HTTP tests: an in-memory site with two authors,
//! two groups and one post.

#![allow(dead_code)]

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::header;

use web_server::config::SiteConfig;
use web_server::state::AppState;
use yatube_core::domain::{Group, NewGroup, NewPost, NewUser, PostDraft, Post, User};
use yatube_core::ports::{GroupRepository, PostRepository, TokenService, UserRepository};
use yatube_infra::JwtConfig;

pub struct Fixture {
    pub state: AppState,
    pub author: User,
    pub other: User,
    pub group: Group,
    pub other_group: Group,
    pub post: Post,
}

impl Fixture {
    pub async fn new() -> Self {
        let jwt = JwtConfig {
            secret: "test-secret-key".to_string(),
            ..JwtConfig::default()
        };
        let state = AppState::in_memory(SiteConfig::default(), jwt).unwrap();

        let author = state
            .users
            .create(NewUser::new("UserTest", "unused-hash"))
            .await
            .unwrap();
        let other = state
            .users
            .create(NewUser::new("Stranger", "unused-hash"))
            .await
            .unwrap();
        let group = state
            .groups
            .create(NewGroup::new("Тестовая группа", "test-slug", "Тестовое описание"))
            .await
            .unwrap();
        let other_group = state
            .groups
            .create(NewGroup::new("Вторая группа", "second-slug", "Ещё одно описание"))
            .await
            .unwrap();
        let post = state
            .posts
            .create(NewPost::new(
                author.id,
                PostDraft::new("Тестовый пост для проверки", Some(group.id)),
            ))
            .await
            .unwrap();

        Self {
            state,
            author,
            other,
            group,
            other_group,
            post,
        }
    }

    pub fn token_for(&self, user: &User) -> String {
        self.state.tokens.issue(user).unwrap()
    }

    /// Session cookie logging `user` in.
    pub fn cookie_for(&self, user: &User) -> Cookie<'static> {
        Cookie::new(self.state.site.session_cookie.clone(), self.token_for(user))
    }
}

pub fn location<B>(res: &ServiceResponse<B>) -> &str {
    res.headers()
        .get(header::LOCATION)
        .expect("redirect without Location")
        .to_str()
        .unwrap()
}
