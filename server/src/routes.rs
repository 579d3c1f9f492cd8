use rocket::form::{Errors, Form};
use rocket::fs::TempFile;
use rocket::serde::json::Json;
use rocket::{get, post, FromForm, State};
use serde::Serialize;
use serde_json::Value;
use tokio::io::AsyncReadExt;

use greencart::storage::{location_uris, Ingestor};
use greencart::{IngestError, RawUpload};

use crate::auth::{Authenticated, UploadAuthorization};
use crate::error::ApiError;

#[derive(FromForm)]
pub struct UploadForm<'r> {
    images: Vec<TempFile<'r>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub image_urls: Vec<String>,
}

async fn read_part(file: &TempFile<'_>) -> Result<RawUpload, ApiError> {
    let file_name = file
        .raw_name()
        .map(|name| name.dangerous_unsafe_unsanitized_raw().as_str().to_string())
        .unwrap_or_default();
    let mime_type = file.content_type().map(|ct| ct.to_string()).unwrap_or_default();

    let mut data = Vec::with_capacity(usize::try_from(file.len()).unwrap_or_default());
    let reader = file.open().await?;
    tokio::pin!(reader);
    reader.read_to_end(&mut data).await?;

    Ok(RawUpload::new(file_name, mime_type, data))
}

// Browsers submit an empty, unnamed part when no file was picked.
fn is_placeholder(file: &TempFile<'_>) -> bool {
    file.len() == 0 && file.raw_name().map_or(true, |name| name.dangerous_unsafe_unsanitized_raw().is_empty())
}

#[post("/upload", data = "<form>")]
pub async fn upload(
    _auth: UploadAuthorization,
    ingestor: &State<Ingestor>,
    form: Result<Form<UploadForm<'_>>, Errors<'_>>,
) -> Result<Json<UploadResponse>, ApiError> {
    let form = form.map_err(|errors| ApiError::from_form_errors(errors, ingestor.policy()))?;

    let mut uploads = Vec::with_capacity(form.images.len());
    for file in form.images.iter().filter(|file| !is_placeholder(file)) {
        uploads.push(read_part(file).await?);
    }

    let assets = ingestor.ingest(&uploads).await?;
    Ok(Json(UploadResponse { image_urls: location_uris(&assets) }))
}

/// Catches upload requests whose body is not a form at all.
#[post("/upload", rank = 2)]
pub fn upload_without_form(_auth: UploadAuthorization) -> ApiError {
    IngestError::NoFilesProvided.into()
}

#[get("/auth/session")]
pub fn session(auth: Authenticated<Value>) -> Json<Value> {
    Json(auth.0)
}
