//! Chat turns and voice replies with a companion.
//!
//! A turn is answered as a server-sent event stream:
//!
//! - `chunk`  `{ "text": ... }` for every piece of the reply, in order
//! - `upsell` an [`UpsellOffer`] when the message matched locked content
//! - `done`   the stored companion [`ChatMessage`]
//! - `error`  `{ "code", "error" }` when the model failed mid-reply
//!
//! The history is written once, after the reply finished or failed.

use std::collections::BTreeSet;
use std::convert::Infallible;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, KeepAliveStream, Sse};
use axum::Json;
use base64::Engine;
use chrono::{NaiveTime, Utc};
use companion_core::chat::{
    context_window, count_user_messages_since, validate_user_turn, ChatMessage, ImageAttachment,
    Sender, CONTEXT_MESSAGES,
};
use companion_core::credits::{check_unlock, VOICE_REPLY_COST};
use companion_core::error::CoreError;
use companion_core::profile::build_system_prompt;
use companion_core::tier::{check_message_allowance, Tier};
use companion_core::types::{Credits, DbId};
use companion_core::upsell::find_upsell;
use companion_db::models::account::Account;
use companion_db::models::companion::Companion;
use companion_db::repositories::{AccountRepo, ChatHistoryRepo};
use companion_db::DbPool;
use companion_events::{names, PlatformEvent};
use companion_genai::TextStream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use super::{load_account, load_published_companion};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireApproved;
use crate::response::DataResponse;
use crate::state::AppState;

/// Prebuilt voice used when a companion has none configured.
const DEFAULT_VOICE: &str = "Kore";

/// Buffered SSE events per open stream.
const EVENT_BUFFER: usize = 32;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub text: String,
    pub image: Option<ImageAttachment>,
}

#[derive(Debug, Deserialize)]
pub struct SpeechRequest {
    pub message_id: String,
}

#[derive(Debug, Serialize)]
pub struct SpeechResponse {
    pub message_id: String,
    pub mime_type: String,
    /// Base64 audio.
    pub audio: String,
    pub balance: Credits,
}

type EventStream = ReceiverStream<Result<Event, Infallible>>;

/// POST /api/v1/companions/{id}/chat
pub async fn send_message(
    State(state): State<AppState>,
    RequireApproved(account): RequireApproved,
    Path(id): Path<DbId>,
    Json(input): Json<ChatRequest>,
) -> AppResult<Sse<KeepAliveStream<EventStream>>> {
    validate_user_turn(&input.text, input.image.as_ref())?;
    if let Some(image) = &input.image {
        base64::engine::general_purpose::STANDARD
            .decode(&image.data)
            .map_err(|_| AppError::BadRequest("Image attachment is not valid base64".into()))?;
    }

    let companion = load_published_companion(&state.pool, id).await?;
    if !account.is_admin() {
        let tier: Tier = account.tier.parse()?;
        check_message_allowance(tier, sent_today(&state.pool, account.id).await?)?;
    }

    let mut history = ChatHistoryRepo::get(&state.pool, account.id, companion.id).await?;
    history.push(ChatMessage::from_user(input.text.trim(), input.image));

    let system_prompt = build_system_prompt(
        &companion.name,
        companion.age,
        &companion.persona_prompt,
        account.display_name.as_deref(),
    );
    // Opened before the response starts so an upstream failure is a plain 502.
    let reply = state
        .genai
        .stream_chat(&system_prompt, context_window(&history, CONTEXT_MESSAGES))
        .await?;

    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    tokio::spawn(relay_reply(
        state.pool.clone(),
        account,
        companion,
        history,
        reply,
        tx,
    ));

    Ok(Sse::new(ReceiverStream::new(rx)).keep_alive(KeepAlive::default()))
}

/// Messages the account sent since the start of the current UTC day.
async fn sent_today(pool: &DbPool, account_id: DbId) -> AppResult<u32> {
    let since = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();
    let histories = ChatHistoryRepo::list_for_account(pool, account_id).await?;
    Ok(count_user_messages_since(
        histories.iter().map(|h| h.messages.0.as_slice()),
        since,
    ))
}

fn json_event<T: Serialize>(name: &str, value: &T) -> Option<Event> {
    Event::default().event(name).json_data(value).ok()
}

async fn emit(tx: &mpsc::Sender<Result<Event, Infallible>>, event: Option<Event>) {
    if let Some(event) = event {
        // A closed channel means the client went away; the reply is still stored.
        let _ = tx.send(Ok(event)).await;
    }
}

/// Forward the model reply to the client, then store the turn.
async fn relay_reply(
    pool: DbPool,
    account: Account,
    companion: Companion,
    mut history: Vec<ChatMessage>,
    mut reply: TextStream,
    tx: mpsc::Sender<Result<Event, Infallible>>,
) {
    let mut text = String::new();
    let mut failure = None;
    while let Some(chunk) = reply.next().await {
        match chunk {
            Ok(piece) => {
                emit(&tx, json_event("chunk", &serde_json::json!({ "text": piece }))).await;
                text.push_str(&piece);
            }
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }

    let user_text = history
        .last()
        .map(|m| m.text.clone())
        .unwrap_or_default();
    let completed = failure.is_none() && !text.trim().is_empty();
    let companion_message = (!text.is_empty()).then(|| ChatMessage::from_companion(text));
    if let Some(message) = &companion_message {
        history.push(message.clone());
    }

    if let Err(e) = ChatHistoryRepo::put(&pool, account.id, companion.id, &history).await {
        tracing::error!(
            account_id = account.id,
            companion_id = companion.id,
            error = %e,
            "Failed to store chat history"
        );
    }

    if !completed {
        match &failure {
            Some(e) => tracing::warn!(
                account_id = account.id,
                companion_id = companion.id,
                error = %e,
                "Chat reply failed mid-stream"
            ),
            None => tracing::warn!(companion_id = companion.id, "Model returned an empty reply"),
        }
        emit(
            &tx,
            json_event(
                "error",
                &serde_json::json!({
                    "code": "UPSTREAM_ERROR",
                    "error": "The reply was interrupted. Please try again.",
                }),
            ),
        )
        .await;
        return;
    }

    let unlocked: BTreeSet<String> = account.unlocked_content.iter().cloned().collect();
    if let Some(offer) = find_upsell(&user_text, companion.id, &companion.gallery.0, &unlocked) {
        emit(&tx, json_event("upsell", &offer)).await;
    }
    if let Some(message) = &companion_message {
        emit(&tx, json_event("done", message)).await;
    }
}

/// POST /api/v1/companions/{id}/speech
///
/// Reads a stored companion message aloud for [`VOICE_REPLY_COST`] credits.
/// Credits are only taken once the audio exists.
pub async fn synthesize_reply(
    State(state): State<AppState>,
    RequireApproved(account): RequireApproved,
    Path(id): Path<DbId>,
    Json(input): Json<SpeechRequest>,
) -> AppResult<Json<DataResponse<SpeechResponse>>> {
    let companion = load_published_companion(&state.pool, id).await?;
    let mut history = ChatHistoryRepo::get(&state.pool, account.id, companion.id).await?;
    let index = history
        .iter()
        .position(|m| m.id == input.message_id && m.sender == Sender::Companion)
        .ok_or_else(|| {
            AppError::NotFound(format!("Companion message '{}' not found", input.message_id))
        })?;

    check_unlock(account.credits, VOICE_REPLY_COST)?;

    let voice = companion.voice_name.as_deref().unwrap_or(DEFAULT_VOICE);
    let audio = state
        .genai
        .synthesize_speech(&history[index].text, voice)
        .await?;

    let updated = match AccountRepo::debit_credits(&state.pool, account.id, VOICE_REPLY_COST).await? {
        Some(updated) => updated,
        None => {
            let current = load_account(&state.pool, account.id).await?;
            return Err(CoreError::InsufficientCredits {
                required: VOICE_REPLY_COST,
                available: current.credits,
            }
            .into());
        }
    };

    history[index].audio = Some(audio.data.clone());
    ChatHistoryRepo::put(&state.pool, account.id, companion.id, &history).await?;

    state.event_bus.publish(
        PlatformEvent::new(names::VOICE_REPLY_PURCHASED)
            .with_source("companion", companion.id)
            .with_actor(account.id)
            .with_payload(serde_json::json!({
                "message_id": input.message_id,
                "cost": VOICE_REPLY_COST,
                "balance": updated.credits,
            })),
    );

    Ok(Json(DataResponse {
        data: SpeechResponse {
            message_id: input.message_id,
            mime_type: audio.mime_type,
            audio: audio.data,
            balance: updated.credits,
        },
    }))
}
