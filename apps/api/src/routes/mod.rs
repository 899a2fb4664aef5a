pub mod health;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::resume::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Session
        .route(
            "/api/v1/session/current",
            get(handlers::handle_get_current).put(handlers::handle_set_current),
        )
        .route("/api/v1/session", delete(handlers::handle_clear_session))
        .route("/api/v1/session/save", post(handlers::handle_save_now))
        // Resumes
        .route(
            "/api/v1/resumes",
            get(handlers::handle_list_resumes).post(handlers::handle_create_resume),
        )
        .route(
            "/api/v1/resumes/:id",
            get(handlers::handle_get_resume)
                .patch(handlers::handle_update_resume)
                .delete(handlers::handle_delete_resume),
        )
        .route("/api/v1/resumes/:id/undo", post(handlers::handle_undo))
        // Sections
        .route(
            "/api/v1/resumes/:id/contact",
            put(handlers::handle_update_contact),
        )
        .route(
            "/api/v1/resumes/:id/summary",
            put(handlers::handle_update_summary),
        )
        .route(
            "/api/v1/resumes/:id/section-order",
            put(handlers::handle_update_section_order),
        )
        .route(
            "/api/v1/resumes/:id/experiences",
            post(handlers::handle_add_experience),
        )
        .route(
            "/api/v1/resumes/:id/experiences/:entry_id",
            patch(handlers::handle_update_experience).delete(handlers::handle_delete_experience),
        )
        .route(
            "/api/v1/resumes/:id/education",
            post(handlers::handle_add_education),
        )
        .route(
            "/api/v1/resumes/:id/education/:entry_id",
            patch(handlers::handle_update_education).delete(handlers::handle_delete_education),
        )
        .route("/api/v1/resumes/:id/skills", post(handlers::handle_add_skill))
        .route(
            "/api/v1/resumes/:id/skills/:entry_id",
            patch(handlers::handle_update_skill).delete(handlers::handle_delete_skill),
        )
        // Derived views
        .route("/api/v1/resumes/:id/score", get(handlers::handle_score))
        .route("/api/v1/resumes/:id/preview", get(handlers::handle_preview))
        .route(
            "/api/v1/resumes/:id/suggestions",
            get(handlers::handle_suggestions),
        )
        .route(
            "/api/v1/skills/suggestions",
            get(handlers::handle_skill_suggestions),
        )
        .with_state(state)
}
