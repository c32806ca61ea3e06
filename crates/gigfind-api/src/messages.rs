use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::debug;
use validator::Validate;

use gigfind_core::Conversation;
use gigfind_db::models::MessageWithParticipants;
use gigfind_types::api::{
    ApiResponse, ConversationResponse, GigRef, MessageResponse, SendMessageRequest, UserRef,
};

use crate::auth::AppState;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::AuthUser;
use crate::with_market;

fn message_response(row: MessageWithParticipants) -> MessageResponse {
    let msg = row.message;
    MessageResponse {
        id: msg.id,
        gig: GigRef {
            id: msg.gig_id,
            title: row.gig_title,
        },
        sender: UserRef {
            id: msg.sender_id,
            name: row.sender_name,
            email: row.sender_email,
        },
        receiver: UserRef {
            id: msg.receiver_id,
            name: row.receiver_name,
            email: row.receiver_email,
        },
        body: msg.body,
        conversation_id: msg.conversation_id,
        created_at: msg.created_at,
    }
}

fn conversation_response(conversation: Conversation) -> ConversationResponse {
    ConversationResponse {
        conversation_id: conversation.id,
        gig: GigRef {
            id: conversation.gig_id,
            title: conversation.gig_title,
        },
        messages: conversation.messages.into_iter().map(message_response).collect(),
    }
}

/// The caller's conversations, most recently active first.
pub async fn inbox(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<ConversationResponse>>>> {
    let conversations = with_market(&state, move |market| Ok(market.inbox(auth.id)?)).await?;

    Ok(Json(ApiResponse::ok(
        conversations.into_iter().map(conversation_response).collect(),
    )))
}

/// One thread, oldest first. Empty unless the caller is a participant.
pub async fn conversation(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(conversation_id): ApiPath<String>,
) -> ApiResult<Json<ApiResponse<Vec<MessageResponse>>>> {
    let messages = with_market(&state, move |market| {
        Ok(market.conversation(&conversation_id, auth.id)?)
    })
    .await?;

    Ok(Json(ApiResponse::ok(
        messages.into_iter().map(message_response).collect(),
    )))
}

pub async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<SendMessageRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let message = with_market(&state, move |market| {
        Ok(market.send_message(auth.id, req.gig_id, req.receiver_id, &req.body)?)
    })
    .await?;
    debug!("Message {} delivered", message.message.id);

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(message_response(message)))))
}
