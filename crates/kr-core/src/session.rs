use kr_api::KismetClient;
use tracing::info;

use crate::error::CoreError;

/// Startup gate: fail fast unless the server accepts the session.
pub async fn require_session(client: &KismetClient) -> Result<(), CoreError> {
    if client.check_session().await {
        info!(server = %client.base_url(), "logged in");
        Ok(())
    } else {
        Err(CoreError::InvalidLogin)
    }
}
