use crate::api::models::temples::TempleInfoResponse;
use crate::classifier::ClassificationRequest;
use crate::errors::{Error, Result};
use crate::AppState;
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};

const IMAGE_FIELD: &str = "image";
const USE_PREDEFINED_FIELD: &str = "usePredefined";
const DEFAULT_FILENAME: &str = "upload";

fn multipart_error(e: MultipartError) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge { message: e.body_text() }
    } else {
        Error::BadRequest {
            message: format!("Failed to parse multipart data: {}", e.body_text()),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/temple-info",
    tag = "temples",
    summary = "Identify temple",
    description = "Classify a temple photograph. The `image` part is required; `usePredefined=true` asks the \
                   classifier to use its predefined captions. Classifier failures answer with a fixed fallback \
                   description plus `error` and optional `details`. Also served at `/api/temple-info`.",
    request_body(content_type = "multipart/form-data", description = "`image` file part and optional `usePredefined` text part"),
    responses(
        (status = 200, description = "Classification, or fallback when the output could not be parsed", body = serde_json::Value),
        (status = 400, description = "No image provided"),
        (status = 413, description = "Image exceeds the configured size limit"),
        (status = 500, description = "Fallback after the classifier could not be run or failed", body = serde_json::Value),
        (status = 502, description = "Fallback for unparseable output when strict parsing is enabled", body = serde_json::Value)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn temple_info(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<TempleInfoResponse>)> {
    let max_image_size = state.classifier.config().max_image_size;
    let mut request = ClassificationRequest::default();
    let mut filename = None;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            IMAGE_FIELD => {
                filename = field.file_name().map(str::to_string);
                let mut image = Vec::new();
                while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
                    if (image.len() + chunk.len()) as u64 > max_image_size {
                        return Err(Error::PayloadTooLarge {
                            message: format!("Image exceeds the maximum size of {max_image_size} bytes"),
                        });
                    }
                    image.extend_from_slice(&chunk);
                }
                request.image = image;
            }
            USE_PREDEFINED_FIELD => {
                let value = field.text().await.map_err(multipart_error)?;
                request.use_predefined = value.trim() == "true";
            }
            _ => {
                tracing::debug!(field = %field_name, "Ignoring unknown multipart field");
            }
        }
    }

    request.original_filename = filename.filter(|f| !f.is_empty()).unwrap_or_else(|| DEFAULT_FILENAME.to_string());

    let outcome = state.classifier.classify(request).await?;
    let status = outcome.status_code(state.classifier.config().strict_parsing);

    Ok((status, Json(TempleInfoResponse::from(outcome))))
}

#[cfg(all(test, unix))]
mod tests {
    use crate::classifier::FALLBACK_CAPTION_SOURCE;
    use crate::test_utils::*;
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use tempfile::TempDir;

    const CLASSIFIED: &str = r#"echo '{"location":"Hampi","dynasty":"Vijayanagara","style":"Dravidian","era":"14th century CE","caption":"Stone chariot at Vittala Temple","caption_source":"model"}'"#;

    fn server_with_script(dir: &TempDir, script: &str, strict: bool) -> TestServer {
        let mut config = create_test_config();
        config.classifier = create_test_classifier_config(dir.path(), script);
        config.classifier.strict_parsing = strict;
        create_test_server(config)
    }

    fn image_form() -> MultipartForm {
        MultipartForm::new().add_part(
            "image",
            Part::bytes(b"\xFF\xD8\xFF\xE0 fake jpeg".as_slice())
                .file_name("vittala.jpg")
                .mime_type("image/jpeg"),
        )
    }

    fn scratch_is_empty(dir: &TempDir) -> bool {
        match std::fs::read_dir(dir.path().join("scratch")) {
            Ok(mut entries) => entries.next().is_none(),
            Err(_) => true,
        }
    }

    #[tokio::test]
    async fn test_missing_image() {
        let dir = TempDir::new().unwrap();
        let server = server_with_script(&dir, CLASSIFIED, false);

        let response = server
            .post("/api/v1/temple-info")
            .multipart(MultipartForm::new().add_text("usePredefined", "true"))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&serde_json::json!({"error": "No image provided"}));
    }

    #[tokio::test]
    async fn test_classified() {
        let dir = TempDir::new().unwrap();
        let server = server_with_script(&dir, CLASSIFIED, false);

        let response = server.post("/api/v1/temple-info").multipart(image_form()).await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["outcome"], "classified");
        assert_eq!(body["location"], "Hampi");
        assert_eq!(body["caption_source"], "model");
        assert!(body.get("error").is_none());
        assert!(scratch_is_empty(&dir));
    }

    #[tokio::test]
    async fn test_classified_body_has_only_emitted_keys() {
        let dir = TempDir::new().unwrap();
        let script = r#"echo 'loading model...'; echo '{"location":"Beluru","dynasty":"Hoysala","style":"Hoysala architecture","era":1117,"caption":"Chennakeshava temple"}'"#;
        let server = server_with_script(&dir, script, false);

        let response = server.post("/api/v1/temple-info").multipart(image_form()).await;

        response.assert_status_ok();
        response.assert_json(&serde_json::json!({
            "location": "Beluru",
            "dynasty": "Hoysala",
            "style": "Hoysala architecture",
            "era": 1117,
            "caption": "Chennakeshava temple",
            "outcome": "classified"
        }));
    }

    #[tokio::test]
    async fn test_legacy_path_and_flags() {
        let dir = TempDir::new().unwrap();
        // Echo the arguments back so the test can see what the classifier received
        let script = r#"printf '{"caption":"%s %s"}' "$3" "$6""#;
        let server = server_with_script(&dir, script, false);

        let form = image_form().add_text("usePredefined", "true");
        let response = server.post("/api/temple-info").multipart(form).await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["caption"], "vittala.jpg --use_predefined");
    }

    #[tokio::test]
    async fn test_unparseable_output_falls_back() {
        let dir = TempDir::new().unwrap();
        let server = server_with_script(&dir, "echo 'ERROR: model failed'", false);

        let response = server.post("/api/v1/temple-info").multipart(image_form()).await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["outcome"], "fallback");
        assert_eq!(body["caption_source"], FALLBACK_CAPTION_SOURCE);
        assert_eq!(body["location"], "Beluru");
        assert_eq!(body["error"], "Failed to parse classifier output");
        assert!(body["details"].is_string());
        assert!(scratch_is_empty(&dir));
    }

    #[tokio::test]
    async fn test_strict_parsing_answers_bad_gateway() {
        let dir = TempDir::new().unwrap();
        let server = server_with_script(&dir, "echo 'not json'", true);

        let response = server.post("/api/v1/temple-info").multipart(image_form()).await;

        response.assert_status(StatusCode::BAD_GATEWAY);
        let body: serde_json::Value = response.json();
        assert_eq!(body["outcome"], "fallback");
    }

    #[tokio::test]
    async fn test_failed_process_returns_fallback_with_details() {
        let dir = TempDir::new().unwrap();
        let server = server_with_script(&dir, "echo 'CUDA out of memory' >&2; exit 3", false);

        let response = server.post("/api/v1/temple-info").multipart(image_form()).await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = response.json();
        assert_eq!(body["outcome"], "fallback");
        assert_eq!(body["caption_source"], FALLBACK_CAPTION_SOURCE);
        assert!(body["error"].as_str().unwrap().contains("classifier failed"));
        assert_eq!(body["details"], "CUDA out of memory");
        assert!(scratch_is_empty(&dir));
    }

    #[tokio::test]
    async fn test_oversized_image_rejected() {
        let dir = TempDir::new().unwrap();
        let mut config = create_test_config();
        config.classifier = create_test_classifier_config(dir.path(), CLASSIFIED);
        config.classifier.max_image_size = 16;
        let server = create_test_server(config);

        let form = MultipartForm::new().add_part("image", Part::bytes(vec![0u8; 64]).file_name("big.jpg"));
        let response = server.post("/api/v1/temple-info").multipart(form).await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        assert!(scratch_is_empty(&dir));
    }
}
