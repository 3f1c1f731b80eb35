//! Interaction Handler
//!
//! 平台交互回调：PING 直接应答，命令进入分发队列。分发器在期限内回复则
//! 同步返回消息，否则先返回延迟确认，回复到达后再编辑原始响应。

use axum::extract::State;
use axum::Json;
use std::sync::Arc;

use crate::application::ports::InteractionReply;
use crate::infrastructure::http::dto::{interaction_type, InteractionPayload, InteractionResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;
use crate::infrastructure::worker::DispatchRequest;

/// POST /interactions
pub async fn interactions(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<InteractionPayload>,
) -> Result<Json<InteractionResponse>, ApiError> {
    match payload.kind {
        interaction_type::PING => return Ok(Json(InteractionResponse::pong())),
        interaction_type::APPLICATION_COMMAND => {}
        other => {
            return Err(ApiError::BadRequest(format!(
                "Unsupported interaction type: {}",
                other
            )))
        }
    }

    let interaction = payload.into_interaction().map_err(ApiError::BadRequest)?;
    let interaction_id = interaction.id.clone();
    let token = interaction.token.clone();

    let (reply, mut reply_rx) = InteractionReply::new();
    state
        .dispatch_queue
        .send(DispatchRequest::new(interaction, reply))
        .await
        .map_err(|_| ApiError::ServiceUnavailable("Dispatcher is not running".to_string()))?;

    match tokio::time::timeout(state.reply_deadline, &mut reply_rx).await {
        Ok(Ok(content)) => Ok(Json(InteractionResponse::message(content))),
        Ok(Err(_)) => Err(ApiError::Internal(
            "Interaction finished without a reply".to_string(),
        )),
        Err(_) => {
            tracing::debug!(
                interaction_id = %interaction_id,
                deadline = ?state.reply_deadline,
                "Reply not ready, deferring"
            );

            let followup = state.followup.clone();
            tokio::spawn(async move {
                match reply_rx.await {
                    Ok(content) => {
                        if let Err(e) = followup.edit_original_response(&token, &content).await {
                            tracing::error!(
                                interaction_id = %interaction_id,
                                error = %e,
                                "Failed to deliver deferred reply"
                            );
                        }
                    }
                    Err(_) => tracing::warn!(
                        interaction_id = %interaction_id,
                        "Deferred interaction finished without a reply"
                    ),
                }
            });

            Ok(Json(InteractionResponse::deferred()))
        }
    }
}
