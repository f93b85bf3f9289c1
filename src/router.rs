use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{
    create_membership_handler, create_powerplay_handler, create_user_handler,
    delete_membership_handler, delete_powerplays_handler, delete_user_handler,
    get_membership_handler, get_powerplays_handler, get_user_handler, gpt_delete_handler,
    gpt_get_handler, gpt_post_handler, health_handler, method_not_allowed, metrics_handler,
    update_membership_handler, update_powerplay_handler, update_user_handler,
};
use crate::state::AppState;

// creating the router with routes
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route(
            "/gpt",
            get(gpt_get_handler)
                .post(gpt_post_handler)
                .delete(gpt_delete_handler)
                .fallback(method_not_allowed),
        )
        .route(
            "/users",
            get(get_user_handler)
                .post(create_user_handler)
                .put(update_user_handler)
                .patch(update_user_handler)
                .delete(delete_user_handler)
                .fallback(method_not_allowed),
        )
        .route(
            "/memberships",
            get(get_membership_handler)
                .post(create_membership_handler)
                .put(update_membership_handler)
                .patch(update_membership_handler)
                .delete(delete_membership_handler)
                .fallback(method_not_allowed),
        )
        .route(
            "/powerplays",
            get(get_powerplays_handler)
                .post(create_powerplay_handler)
                .put(update_powerplay_handler)
                .patch(update_powerplay_handler)
                .delete(delete_powerplays_handler)
                .fallback(method_not_allowed),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
