//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs ids, sizes and basic result info.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{info, instrument};

use crate::domain::{MapRegion, RegionSheet, ReliefTourStep, TerrainRegion};
use crate::error::ApiError;
use crate::game::check_answer;
use crate::logic::*;
use crate::progress::ClientProgress;
use crate::protocol::*;
use crate::seeds;
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, ApiError>;

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> Json<HealthOut> {
    Json(HealthOut { ok: true, ai_enabled: state.gemini.is_some() })
}

//
// AI endpoints
//

#[instrument(level = "info", skip(state, body))]
pub async fn http_generate_quiz(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GenerateQuizIn>,
) -> ApiResult<GenerateQuizOut> {
    let questions = generate_quiz(&state, &body).await?;
    Ok(Json(GenerateQuizOut { questions }))
}

#[instrument(level = "info", skip(state, body), fields(message_len = body.message.len()))]
pub async fn http_chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatIn>,
) -> ApiResult<ChatOut> {
    let response = chat(&state, &body).await?;
    info!(target: "assistant", reply_len = response.len(), "HTTP chat answered");
    Ok(Json(ChatOut { response }))
}

#[instrument(level = "info", skip(state, body), fields(query_len = body.query.len()))]
pub async fn http_virtual_assistant(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AssistantIn>,
) -> ApiResult<ChatOut> {
    let response = virtual_assistant(&state, &body).await?;
    Ok(Json(ChatOut { response }))
}

#[instrument(level = "info", skip(state, body), fields(region1 = %body.region1, region2 = %body.region2))]
pub async fn http_evaluate_comparison(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ComparisonIn>,
) -> ApiResult<ComparisonOut> {
    Ok(Json(evaluate_comparison(&state, &body).await?))
}

#[instrument(level = "info", skip(state, body), fields(count = ?body.count))]
pub async fn http_generate_geo_items(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GeoItemsIn>,
) -> ApiResult<GeoItemsOut> {
    let items = generate_geo_items(&state, &body).await?;
    Ok(Json(GeoItemsOut { items }))
}

//
// Reference data
//

pub async fn http_regions() -> Json<Vec<RegionSheet>> {
    Json(seeds::region_sheets())
}

#[instrument(level = "info")]
pub async fn http_region(Path(name): Path<String>) -> Json<RegionSheet> {
    Json(seeds::region_sheet(&name))
}

pub async fn http_map_regions() -> Json<Vec<MapRegion>> {
    Json(seeds::map_regions())
}

#[instrument(level = "info")]
pub async fn http_map_region(Path(id): Path<String>) -> ApiResult<MapRegion> {
    seeds::map_region(&id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Regiune necunoscută: {id}")))
}

pub async fn http_terrain_regions() -> Json<Vec<TerrainRegion>> {
    Json(seeds::terrain_regions())
}

#[instrument(level = "info")]
pub async fn http_terrain_region(Path(id): Path<String>) -> ApiResult<TerrainRegion> {
    seeds::terrain_region(&id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Regiune necunoscută: {id}")))
}

#[instrument(level = "info")]
pub async fn http_relief_tour(Path(id): Path<String>) -> ApiResult<Vec<ReliefTourStep>> {
    seeds::relief_tour(&id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Tur necunoscut: {id}")))
}

//
// Game
//

#[instrument(level = "info", skip(body), fields(label = %body.item.label, answer = %body.country_iso2))]
pub async fn http_game_check(Json(body): Json<CheckAnswerIn>) -> Json<CheckAnswerOut> {
    let verdict = check_answer(&body.item, &body.country_iso2);
    info!(target: "game", correct = verdict.correct, "HTTP game answer checked");
    Json(CheckAnswerOut { correct: verdict.correct, message: verdict.message })
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_game_start(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GeoItemsIn>,
) -> ApiResult<GameOut> {
    Ok(Json(start_game(&state, &body).await?))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_game_answer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<GameAnswerIn>,
) -> ApiResult<GameOut> {
    Ok(Json(answer_game(&state, &id, &body.country_iso2).await?))
}

//
// Progress
//

/// Apply `f` to the client's progress and render the result.
async fn mutate_progress<F>(state: &AppState, client: &str, f: F) -> ApiResult<ProgressOut>
where
    F: FnOnce(&mut ClientProgress) -> Option<crate::domain::HistoryItem>,
{
    let client = validate_client_id(client)?;
    let (completed, progress) = state.progress.update(client, f).await?;
    if let Some(item) = &completed {
        info!(target: "progress", %client, score = item.score, total = item.total_questions, "Quiz recorded in history");
    }
    Ok(Json(ProgressOut::from_progress(&progress, completed)))
}

#[instrument(level = "info", skip(state))]
pub async fn http_progress_get(
    State(state): State<Arc<AppState>>,
    Path(client): Path<String>,
) -> ApiResult<ProgressOut> {
    let client = validate_client_id(&client)?;
    let progress = state.progress.get(client).await;
    Ok(Json(ProgressOut::from_progress(&progress, None)))
}

#[instrument(level = "info", skip(state, body), fields(region = %body.region, subject = %body.subject, questions = body.questions.len()))]
pub async fn http_progress_start(
    State(state): State<Arc<AppState>>,
    Path(client): Path<String>,
    Json(body): Json<StartQuizIn>,
) -> ApiResult<ProgressOut> {
    if body.region.trim().is_empty() || body.subject.trim().is_empty() {
        return Err(ApiError::BadRequest("Este necesară specificarea regiunii și subiectului".into()));
    }
    if body.questions.is_empty() || !body.questions.iter().all(|q| q.is_well_formed()) {
        return Err(ApiError::BadRequest("Întrebările testului nu sunt valide".into()));
    }
    let StartQuizIn { region, subject, questions } = body;
    mutate_progress(&state, &client, move |p| {
        p.start_quiz(region, subject, questions);
        None
    })
    .await
}

#[instrument(level = "info", skip(state, body), fields(index = body.question_index))]
pub async fn http_progress_answer(
    State(state): State<Arc<AppState>>,
    Path(client): Path<String>,
    Json(body): Json<SelectAnswerIn>,
) -> ApiResult<ProgressOut> {
    let SelectAnswerIn { question_index, answer } = body;
    mutate_progress(&state, &client, move |p| p.select_answer(question_index, answer)).await
}

#[instrument(level = "info", skip(state))]
pub async fn http_progress_next(
    State(state): State<Arc<AppState>>,
    Path(client): Path<String>,
) -> ApiResult<ProgressOut> {
    mutate_progress(&state, &client, |p| {
        p.next_question();
        None
    })
    .await
}

#[instrument(level = "info", skip(state))]
pub async fn http_progress_previous(
    State(state): State<Arc<AppState>>,
    Path(client): Path<String>,
) -> ApiResult<ProgressOut> {
    mutate_progress(&state, &client, |p| {
        p.previous_question();
        None
    })
    .await
}

#[instrument(level = "info", skip(state))]
pub async fn http_progress_complete(
    State(state): State<Arc<AppState>>,
    Path(client): Path<String>,
) -> ApiResult<ProgressOut> {
    mutate_progress(&state, &client, |p| p.complete_quiz()).await
}

#[instrument(level = "info", skip(state))]
pub async fn http_progress_reset(
    State(state): State<Arc<AppState>>,
    Path(client): Path<String>,
) -> ApiResult<ProgressOut> {
    mutate_progress(&state, &client, |p| {
        p.reset_quiz();
        None
    })
    .await
}

#[instrument(level = "info", skip(state))]
pub async fn http_progress_clear_history(
    State(state): State<Arc<AppState>>,
    Path(client): Path<String>,
) -> ApiResult<ProgressOut> {
    mutate_progress(&state, &client, |p| {
        p.clear_history();
        None
    })
    .await
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::{Prompts, Settings};
    use crate::gemini::testing::{settings_for, spawn_fake, spawn_fake_raw, text_reply};
    use crate::gemini::Gemini;
    use crate::progress::ProgressStore;
    use crate::routes::build_router;
    use crate::state::AppState;

    use std::sync::Arc;

    const QUIZ_TEXT: &str = "Q1. Care este cel mai înalt vârf din Carpații Meridionali?
A) Omu
B) Moldoveanu
C) Negoiu
D) Parângu Mare
Correct: B
Explanation: Vârful Moldoveanu are 2544 m.

Q2. Ce fluviu formează granița de sud a României?
A) Mureș
B) Olt
C) Dunărea
D) Prut
Correct: C
Explanation: Dunărea separă România de Bulgaria.";

    fn offline_app() -> Router {
        let state = AppState::from_parts(Settings::default(), Prompts::default(), None, ProgressStore::in_memory());
        build_router(Arc::new(state))
    }

    async fn app_with_fake(status: StatusCode, body: Value) -> Router {
        let settings = settings_for(spawn_fake(status, body).await);
        let gemini = Gemini::from_settings(&settings);
        let state = AppState::from_parts(settings, Prompts::default(), gemini, ProgressStore::in_memory());
        build_router(Arc::new(state))
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let req = Request::builder().method(method).uri(uri).header("content-type", "application/json");
        let req = match body {
            Some(b) => req.body(Body::from(b.to_string())).unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn health_reports_ai_status() {
        let (status, body) = call(&offline_app(), Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true, "ai_enabled": false}));
    }

    #[tokio::test]
    async fn generate_quiz_returns_parsed_questions() {
        let app = app_with_fake(StatusCode::OK, text_reply(QUIZ_TEXT)).await;
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/generate-quiz",
            Some(json!({"county": "Argeș", "subject": "Geografie"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let questions = body["questions"].as_array().unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0]["correctAnswer"], "B");
        assert_eq!(questions[1]["options"][2], "Dunărea");
    }

    #[tokio::test]
    async fn generate_quiz_error_statuses() {
        let app = offline_app();
        let (status, body) = call(&app, Method::POST, "/api/generate-quiz", Some(json!({"subject": "Istorie"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Este necesară specificarea regiunii și subiectului");

        let req = json!({"region": "Banat", "subject": "Istorie"});
        let (status, body) = call(&app, Method::POST, "/api/generate-quiz", Some(req.clone())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Configurare API incompletă");

        let app = app_with_fake(StatusCode::OK, text_reply("Nu pot genera întrebări acum.")).await;
        let (status, body) = call(&app, Method::POST, "/api/generate-quiz", Some(req.clone())).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["details"], "Nu pot genera întrebări acum.");

        let app = app_with_fake(StatusCode::TOO_MANY_REQUESTS, json!({"error": {"message": "quota"}})).await;
        let (status, body) = call(&app, Method::POST, "/api/generate-quiz", Some(req)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["details"].as_str().unwrap().contains("quota"));
    }

    #[tokio::test]
    async fn quiz_with_garbled_upstream_body_is_invalid_response() {
        let settings = settings_for(spawn_fake_raw(StatusCode::OK, "not json at all").await);
        let gemini = Gemini::from_settings(&settings);
        let app = build_router(Arc::new(AppState::from_parts(
            settings,
            Prompts::default(),
            gemini,
            ProgressStore::in_memory(),
        )));
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/generate-quiz",
            Some(json!({"region": "Banat", "subject": "Geografie"})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Răspuns invalid de la serviciul AI");
    }

    #[tokio::test]
    async fn chat_upstream_failure_is_a_server_error() {
        let app = app_with_fake(StatusCode::INTERNAL_SERVER_ERROR, json!({"error": {"message": "boom"}})).await;
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/chat",
            Some(json!({"message": "De ce?", "context": {"question": "Q", "correctAnswer": "B"}})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["error"],
            "Nu am putut procesa întrebarea ta în acest moment. Te rog încearcă din nou."
        );
    }

    #[tokio::test]
    async fn chat_requires_a_message() {
        let (status, body) = call(&offline_app(), Method::POST, "/api/chat", Some(json!({"message": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Este necesară specificarea mesajului");
    }

    #[tokio::test]
    async fn assistant_and_comparison_need_an_api_key() {
        let app = offline_app();
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/virtual-assistant",
            Some(json!({"question": "Q", "context": "a\nb\nc", "query": "de ce?"})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Cheia API Google AI nu este configurată pe server");

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/evaluate-comparison",
            Some(json!({"region1": "Banat", "region1Notes": "câmpie", "region2": "Dobrogea", "region2Notes": "podiș"})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Cheia API Google AI nu este configurată pe server");
    }

    #[tokio::test]
    async fn geo_items_upstream_error_is_unavailable() {
        let app = app_with_fake(StatusCode::INTERNAL_SERVER_ERROR, json!({"error": {"message": "overloaded"}})).await;
        let (status, body) = call(&app, Method::POST, "/api/generate-geo-items", Some(json!({}))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "Serviciul de generare elemente nu este disponibil momentan");
        assert!(body["details"].as_str().unwrap().contains("overloaded"));
    }

    #[tokio::test]
    async fn geo_items_without_valid_entries_is_unprocessable() {
        let items = r#"[{"label": "Alpi", "country_iso2": "CH", "category": "MOUNTAIN", "explanation": "x"}]"#;
        let app = app_with_fake(StatusCode::OK, text_reply(items)).await;
        let (status, body) = call(&app, Method::POST, "/api/generate-geo-items", Some(json!({"count": 2}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "Nu s-au putut genera elemente valide");
    }

    #[tokio::test]
    async fn geo_items_without_candidate_text_is_invalid_response() {
        let app = app_with_fake(StatusCode::OK, json!({"candidates": []})).await;
        let (status, body) = call(&app, Method::POST, "/api/generate-geo-items", Some(json!({}))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Răspuns invalid de la serviciul AI");
    }

    #[tokio::test]
    async fn chat_without_key_is_a_server_error() {
        let (status, body) = call(
            &offline_app(),
            Method::POST,
            "/api/chat",
            Some(json!({"message": "De ce?", "context": {"question": "Q", "correctAnswer": "A"}})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Cheia API Google AI nu este configurată pe server");
    }

    #[tokio::test]
    async fn chat_relays_model_reply() {
        let app = app_with_fake(StatusCode::OK, text_reply("Pentru că este cel mai înalt.")).await;
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/chat",
            Some(json!({"message": "De ce?", "context": {"question": "Q", "correctAnswer": "B"}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], "Pentru că este cel mai înalt.");
    }

    #[tokio::test]
    async fn assistant_falls_back_when_upstream_fails() {
        let app = app_with_fake(StatusCode::INTERNAL_SERVER_ERROR, json!({"error": {"message": "boom"}})).await;
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/virtual-assistant",
            Some(json!({
                "question": "Unde e Delta?",
                "context": "Întrebare\nRăspuns\nExplicație: Delta e în Dobrogea.",
                "query": "unde anume?",
                "history": [{"role": "user", "content": "salut"}]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["response"],
            "Din punct de vedere geografic, această regiune/acest fenomen se situează Delta e în Dobrogea."
        );
    }

    #[tokio::test]
    async fn assistant_requires_all_fields() {
        let (status, _) = call(
            &offline_app(),
            Method::POST,
            "/api/virtual-assistant",
            Some(json!({"question": "Q", "query": "de ce?"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn comparison_success_and_fallback() {
        let req = json!({
            "region1": "Banat", "region1Data": {"relief": "câmpie"}, "region1Notes": "câmpie în vest",
            "region2": "Dobrogea", "region2Data": {}, "region2Notes": "podiș"
        });

        let app = app_with_fake(StatusCode::OK, text_reply("Comparație bună.")).await;
        let (status, body) = call(&app, Method::POST, "/api/evaluate-comparison", Some(req.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isCorrect"], true);
        assert_eq!(body["feedback"], "Comparație bună.");

        let app = app_with_fake(StatusCode::BAD_GATEWAY, json!({})).await;
        let (status, body) = call(&app, Method::POST, "/api/evaluate-comparison", Some(req)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isCorrect"], false);
        assert_eq!(body["corrections"][0]["field"], "general");

        let (status, _) = call(
            &offline_app(),
            Method::POST,
            "/api/evaluate-comparison",
            Some(json!({"region1": "Banat"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn geo_items_rejects_prose() {
        let app = app_with_fake(StatusCode::OK, text_reply("Iată câteva elemente!")).await;
        let (status, body) = call(&app, Method::POST, "/api/generate-geo-items", Some(json!({"count": 3}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "Formatul răspunsului AI nu este valid JSON");
    }

    #[tokio::test]
    async fn game_session_via_http() {
        let items = r#"```json
[{"label": "Viena", "country_iso2": "at", "category": "CAPITAL", "explanation": "Viena este capitala Austriei."}]
```"#;
        let app = app_with_fake(StatusCode::OK, text_reply(items)).await;
        let (status, started) = call(&app, Method::POST, "/api/game/sessions", Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(started["totalItems"], 1);
        assert_eq!(started["currentItem"]["country_iso2"], "AT");
        let id = started["sessionId"].as_str().unwrap().to_string();

        let uri = format!("/api/game/sessions/{id}/answer");
        let (_, body) = call(&app, Method::POST, &uri, Some(json!({"countryIso2": "DE"}))).await;
        assert_eq!(body["correct"], false);
        assert_eq!(body["feedback"], "❌ Greșit! Viena este capitala Austriei.");

        let (_, body) = call(&app, Method::POST, &uri, Some(json!({"countryIso2": "AT"}))).await;
        assert_eq!(body["finished"], true);
        assert_eq!(body["summary"], "🎉 Felicitări! Ai terminat jocul cu scorul 1/1!");

        let (status, _) = call(&app, Method::POST, &uri, Some(json!({"countryIso2": "AT"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn game_check_is_stateless() {
        let (status, body) = call(
            &offline_app(),
            Method::POST,
            "/api/game/check",
            Some(json!({
                "item": {"label": "Dunărea", "country_iso2": "RO", "category": "RIVER", "explanation": "Se varsă în Marea Neagră."},
                "countryIso2": "ro"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"correct": true, "message": "✅ Corect! Se varsă în Marea Neagră."}));
    }

    #[tokio::test]
    async fn reference_data_routes() {
        let app = offline_app();
        let (status, body) = call(&app, Method::GET, "/api/regions", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 7);

        let (status, _) = call(&app, Method::GET, "/api/map-regions/transilvania", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = call(&app, Method::GET, "/api/map-regions/atlantida", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = call(&app, Method::GET, "/api/terrain-regions", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);
        let (_, body) = call(&app, Method::GET, "/api/terrain-regions/dobrogea", None).await;
        assert_eq!(body["climate"], "Mediteranean temperat");
        let (status, _) = call(&app, Method::GET, "/api/terrain-regions/atlantida", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = call(&app, Method::GET, "/api/relief-tour/carpatii-meridionali", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 6);
        let (status, _) = call(&app, Method::GET, "/api/relief-tour/necunoscut", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn progress_flow_records_history_once() {
        let app = offline_app();
        let base = "/api/progress/elev-1";

        let (status, body) = call(&app, Method::GET, base, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["quiz"].is_null());

        let questions = json!([
            {"question": "Q1", "options": ["a", "b", "c", "d"], "correctAnswer": "B", "explanation": "e1"},
            {"question": "Q2", "options": ["a", "b", "c", "d"], "correctAnswer": "A", "explanation": "e2"}
        ]);
        let (status, body) = call(
            &app,
            Method::PUT,
            &format!("{base}/quiz"),
            Some(json!({"region": "Banat", "subject": "Geografie", "questions": questions})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["quiz"]["userAnswers"], json!([null, null]));

        let (_, body) = call(&app, Method::POST, &format!("{base}/next"), None).await;
        assert_eq!(body["quiz"]["currentQuestion"], 1);
        let (_, body) = call(&app, Method::POST, &format!("{base}/next"), None).await;
        assert_eq!(body["quiz"]["currentQuestion"], 1);

        let answer = format!("{base}/answer");
        let (_, body) = call(&app, Method::POST, &answer, Some(json!({"questionIndex": 0, "answer": "b"}))).await;
        assert!(body.get("completed").is_none());
        let (_, body) = call(&app, Method::POST, &answer, Some(json!({"questionIndex": 1, "answer": "c"}))).await;
        assert_eq!(body["completed"]["score"], 1);
        assert_eq!(body["history"].as_array().unwrap().len(), 1);

        let (_, body) = call(&app, Method::POST, &answer, Some(json!({"questionIndex": 1, "answer": "a"}))).await;
        assert!(body.get("completed").is_none());
        assert_eq!(body["score"], 2);
        assert_eq!(body["history"].as_array().unwrap().len(), 1);

        let (_, body) = call(&app, Method::DELETE, &format!("{base}/history"), None).await;
        assert!(body["history"].as_array().unwrap().is_empty());
        let (_, body) = call(&app, Method::DELETE, &format!("{base}/quiz"), None).await;
        assert!(body["quiz"].is_null());
    }

    #[tokio::test]
    async fn progress_rejects_odd_client_ids() {
        let (status, _) = call(&offline_app(), Method::GET, "/api/progress/a%20b", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn progress_rejects_malformed_questions() {
        let (status, body) = call(
            &offline_app(),
            Method::PUT,
            "/api/progress/elev-2/quiz",
            Some(json!({
                "region": "Banat",
                "subject": "Istorie",
                "questions": [{"question": "Q", "options": ["a", "b"], "correctAnswer": "A", "explanation": "e"}]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Întrebările testului nu sunt valide");
    }
}
