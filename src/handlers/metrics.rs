use crate::error::GatewayError;
use crate::metrics::render;

pub async fn metrics_handler() -> Result<String, GatewayError> {
    render().map_err(GatewayError::internal)
}
