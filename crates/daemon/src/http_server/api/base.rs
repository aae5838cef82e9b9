use axum::extract::State;
use serde::{Deserialize, Serialize};

use super::{Envelope, RequireSession};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseResponse {
    pub title: String,
    pub is_upload: bool,
    pub is_delete: bool,
    pub is_mkdir: bool,
    pub show_hidden: bool,
}

pub async fn handler(
    _session: RequireSession,
    State(state): State<ServiceState>,
) -> Envelope<BaseResponse> {
    let settings = state.settings();
    Envelope::ok(BaseResponse {
        title: settings.title.clone(),
        is_upload: settings.allow_upload,
        is_delete: settings.allow_delete,
        is_mkdir: settings.allow_mkdir,
        show_hidden: settings.show_hidden,
    })
}
