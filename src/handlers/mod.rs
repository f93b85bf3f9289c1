mod gpt;
mod health;
mod memberships;
mod metrics;
mod powerplays;
mod users;

pub use gpt::{gpt_delete_handler, gpt_get_handler, gpt_post_handler};
pub use health::health_handler;
pub use memberships::{
    create_membership_handler, delete_membership_handler, get_membership_handler,
    update_membership_handler,
};
pub use metrics::metrics_handler;
pub use powerplays::{
    create_powerplay_handler, delete_powerplays_handler, get_powerplays_handler,
    update_powerplay_handler,
};
pub use users::{create_user_handler, delete_user_handler, get_user_handler, update_user_handler};

use axum::http::Method;

use crate::error::GatewayError;

// Answers any method a route does not register
pub async fn method_not_allowed(method: Method) -> GatewayError {
    GatewayError::MethodNotAllowed {
        method: method.to_string(),
    }
}
