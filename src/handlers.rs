use actix_multipart::Multipart;
use actix_web::http::StatusCode;
use actix_web::{web, Error, HttpResponse, Result};
use futures_util::StreamExt;
use log::{info, warn};
use uuid::Uuid;

use crate::backend::BackendClient;
use crate::models::Upload;
use crate::pipeline;
use crate::render::{render_page, PageParams, Scores};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Read-only state shared by every worker.
pub struct AppState {
    pub backend: BackendClient,
    pub num_results: usize,
    pub max_upload_bytes: usize,
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/healthy", web::get().to(healthy))
        .route("/", web::get().to(index))
        .service(web::resource("/classify").route(web::post().to(classify)));
}

pub async fn healthy() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}

pub async fn index() -> HttpResponse {
    page(StatusCode::OK, &PageParams::empty())
}

pub async fn classify(
    state: web::Data<AppState>,
    mut payload: Multipart,
) -> Result<HttpResponse, Error> {
    let request_id = Uuid::new_v4();

    let upload = match read_upload(&mut payload, state.max_upload_bytes).await? {
        Some(upload) => upload,
        None => {
            warn!("[{}] form had no image field", request_id);
            let params = PageParams {
                scores: Scores::Failed("no image was uploaded".to_string()),
                ..PageParams::empty()
            };
            return Ok(page(StatusCode::BAD_REQUEST, &params));
        }
    };

    info!(
        "[{}] classifying {} bytes of {}",
        request_id,
        upload.bytes.len(),
        upload.content_type
    );

    let classification =
        pipeline::run(&state.backend, &upload.bytes, state.num_results, request_id).await;

    let (status, scores) = match classification.outcome {
        Ok(ranked) => {
            info!("[{}] returning {} labels", request_id, ranked.len());
            (StatusCode::OK, Scores::Ranked(ranked))
        }
        Err(e) => (StatusCode::BAD_GATEWAY, Scores::Failed(e.to_string())),
    };

    let params = PageParams {
        image_b64: Some(classification.image_b64),
        image_type: upload.content_type,
        scores,
    };
    Ok(page(status, &params))
}

/// Pull the `image` field out of the form. Other fields are drained and
/// ignored.
async fn read_upload(payload: &mut Multipart, limit: usize) -> Result<Option<Upload>, Error> {
    while let Some(item) = payload.next().await {
        let mut field = item?;

        if field.content_disposition().get_name() != Some("image") {
            while let Some(chunk) = field.next().await {
                chunk?;
            }
            continue;
        }

        let content_type = field
            .content_type()
            .map(|mime| mime.to_string())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let data = chunk?;
            if bytes.len() + data.len() > limit {
                warn!("upload exceeds {} bytes, rejecting", limit);
                return Err(actix_web::error::ErrorPayloadTooLarge("Upload too large"));
            }
            bytes.extend_from_slice(&data);
        }

        return Ok(Some(Upload {
            bytes,
            content_type,
        }));
    }

    Ok(None)
}

fn page(status: StatusCode, params: &PageParams) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(render_page(params))
}

#[cfg(test)]
mod tests {
    use actix_web::http::header::CONTENT_TYPE;
    use actix_web::{test, App};

    use super::*;
    use crate::backend::mock;

    const BOUNDARY: &str = "----classifyboundary";

    fn state(address: String) -> web::Data<AppState> {
        web::Data::new(AppState {
            backend: BackendClient::new(address, None).unwrap(),
            num_results: 1,
            max_upload_bytes: 1024,
        })
    }

    fn form(field: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"upload.png\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(body: Vec<u8>) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/classify")
            .insert_header((
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(body)
    }

    async fn body_text(resp: actix_web::dev::ServiceResponse) -> String {
        String::from_utf8(test::read_body(resp).await.to_vec()).unwrap()
    }

    #[actix_web::test]
    async fn health_and_index() {
        let app = test::init_service(
            App::new()
                .app_data(state(mock::unreachable()))
                .configure(routes),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/healthy").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_text(resp).await, "ok");

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_text(resp).await.contains("<form"));
    }

    #[actix_web::test]
    async fn classify_rejects_get() {
        let app = test::init_service(
            App::new()
                .app_data(state(mock::unreachable()))
                .configure(routes),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/classify").to_request()).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[actix_web::test]
    async fn upload_renders_top_label() {
        let address = mock::serve(200, r#"{"results":[[["cat",0.9],["dog",0.1]]], "error":""}"#).await;
        let app = test::init_service(App::new().app_data(state(address)).configure(routes)).await;

        let req = upload_request(form("image", "image/png", &[0x01, 0x02])).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let html = body_text(resp).await;
        assert!(html.contains("data:image/png;base64,AQI="));
        assert!(html.contains("<td>cat</td>"));
        assert!(!html.contains("<td>dog</td>"));
    }

    #[actix_web::test]
    async fn backend_failure_renders_without_scores() {
        let address = mock::serve(200, r#"{"results":[], "error":"model unavailable"}"#).await;
        let app = test::init_service(App::new().app_data(state(address)).configure(routes)).await;

        let req = upload_request(form("image", "image/jpeg", b"jpeg")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let html = body_text(resp).await;
        assert!(html.contains("data:image/jpeg;base64,"));
        assert!(html.contains("model unavailable"));
        assert!(!html.contains("<table>"));
    }

    #[actix_web::test]
    async fn missing_image_field_is_a_bad_request() {
        let app = test::init_service(
            App::new()
                .app_data(state(mock::unreachable()))
                .configure(routes),
        )
        .await;

        let req = upload_request(form("photo", "image/png", b"png")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(resp).await.contains("no image was uploaded"));
    }

    #[actix_web::test]
    async fn untyped_upload_passes_through_as_octet_stream() {
        let address = mock::serve(200, r#"{"results":[[["cat",0.9]]]}"#).await;
        let app = test::init_service(App::new().app_data(state(address)).configure(routes)).await;

        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"upload\"\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(&[0x01, 0x02]);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let resp = test::call_service(&app, upload_request(body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let html = body_text(resp).await;
        assert!(html.contains("data:application/octet-stream;base64,AQI="));
        assert!(html.contains("<td>cat</td>"));
    }

    #[actix_web::test]
    async fn oversized_upload_is_rejected() {
        let app = test::init_service(
            App::new()
                .app_data(state(mock::unreachable()))
                .configure(routes),
        )
        .await;

        let req = upload_request(form("image", "image/png", &[0u8; 4096])).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
