use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::gateway::{GatewayHandle, ImageAttachment, ModelGateway, Prompt};
use crate::models::{
    Difficulty, GrammarRequest, GrammarResult, ImageOcrRequest, InfoResponse, MediaType,
    OcrResponse, OcrResult, QuizRequest, QuizResult, MIN_QUIZ_TEXT_CHARS,
};
use crate::prompt;

const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
const UPLOAD_FIELD: &str = "file";

#[derive(Clone)]
pub struct AppState {
    pub gateway: GatewayHandle,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/ocr", post(ocr))
        .route("/generate-quiz", post(generate_quiz))
        .route("/grammar-check", post(grammar_check))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<InfoResponse> {
    Json(InfoResponse {
        mesaj: "Serverul OCR rulează. Folosește endpoint-ul /ocr pentru a trimite o imagine.",
    })
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let gateway = if state.gateway.is_available() {
        "available"
    } else {
        "unavailable"
    };
    Json(json!({"status": "ok", "gateway": gateway}))
}

fn require_gateway(state: &AppState) -> Result<&std::sync::Arc<dyn ModelGateway>, ApiError> {
    state.gateway.get().map_err(|_| ApiError::ServiceUnavailable)
}

// ── OCR ──────────────────────────────────────────────────────────────────────

struct Upload {
    file_name: Option<String>,
    content_type: String,
    bytes: Vec<u8>,
}

async fn read_upload(multipart: &mut Multipart) -> Result<Upload, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Nu am putut citi formularul: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Nu am putut citi fișierul: {e}")))?;
        return Ok(Upload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }
    Err(ApiError::BadRequest(format!(
        "Lipsește câmpul '{UPLOAD_FIELD}' cu imaginea."
    )))
}

fn validate_upload(upload: Upload) -> Result<ImageOcrRequest, ApiError> {
    let media_type = MediaType::from_mime(&upload.content_type).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Tip de fișier neacceptat: {}. Trimite JPG, PNG, GIF, sau WebP.",
            upload.content_type
        ))
    })?;
    Ok(ImageOcrRequest {
        file_name: upload.file_name,
        media_type,
        bytes: upload.bytes,
    })
}

async fn ocr(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<OcrResponse>, ApiError> {
    let gateway = require_gateway(&state)?;
    let request = validate_upload(read_upload(&mut multipart).await?)?;

    tracing::info!(
        file_name = request.file_name.as_deref().unwrap_or(""),
        content_type = request.media_type.as_mime(),
        size = request.bytes.len(),
        "received image for OCR"
    );

    let prompt = Prompt::with_image(
        prompt::ocr_instructions(),
        ImageAttachment {
            media_type: request.media_type,
            bytes: request.bytes,
        },
    );
    let completion = gateway
        .complete(prompt)
        .await
        .map_err(|e| ApiError::processing("Eroare la procesarea OCR", e))?;

    let result = OcrResult::from_completion(&completion.text());
    Ok(Json(OcrResponse {
        file_name: request.file_name,
        content_type: request.media_type.as_mime().to_string(),
        text_extras: result.single_line_text(),
        summary: result.summary,
    }))
}

// ── Quiz ─────────────────────────────────────────────────────────────────────

async fn generate_quiz(
    State(state): State<AppState>,
    Json(request): Json<QuizRequest>,
) -> Result<Json<QuizResult>, ApiError> {
    let gateway = require_gateway(&state)?;
    if !request.has_enough_text() {
        return Err(ApiError::BadRequest(format!(
            "Textul este prea scurt. Te rog furnizează cel puțin {MIN_QUIZ_TEXT_CHARS} de caractere pentru a genera un quiz."
        )));
    }

    let difficulty = Difficulty::from_label(&request.difficulty);
    tracing::info!(
        requested = %request.difficulty,
        ?difficulty,
        num_questions = request.num_questions,
        "generating quiz"
    );

    let prompt = Prompt::text(prompt::quiz_instructions(
        &request.text,
        difficulty,
        request.num_questions,
    ));
    let completion = gateway
        .complete(prompt)
        .await
        .map_err(|e| ApiError::processing("Eroare la generarea quiz-ului", e))?;

    let quiz = QuizResult::from_completion(&completion.text())?;
    tracing::info!(questions = quiz.questions().len(), "quiz generated");
    Ok(Json(quiz))
}

// ── Grammar check ────────────────────────────────────────────────────────────

async fn grammar_check(
    State(state): State<AppState>,
    Json(request): Json<GrammarRequest>,
) -> Result<Json<GrammarResult>, ApiError> {
    let gateway = require_gateway(&state)?;
    if request.text.trim().is_empty() {
        return Err(ApiError::BadRequest("Textul pentru verificare este gol.".to_string()));
    }

    tracing::info!(chars = request.text.chars().count(), "checking grammar");
    let completion = gateway
        .complete(Prompt::text(prompt::grammar_instructions(&request.text)))
        .await
        .map_err(|e| ApiError::processing("Eroare la verificarea gramaticală", e))?;

    Ok(Json(GrammarResult::from_completion(&completion.text())))
}
