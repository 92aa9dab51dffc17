//! Multipart form parsing and content-addressed storage of uploads.
//!
//! Text parts become a flat `name -> value` map for the form cleaners. File
//! parts are streamed to a temporary file under `<media_root>/tmp` while
//! their MD5 is computed, and only moved to their final
//! `<subdir>/<md5><ext>` name once the surrounding form is accepted.

use crate::services::ServiceError;
use actix_multipart::Multipart;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::{web, HttpRequest};
use futures_util::StreamExt;
use md5::Context;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const TMP_DIR: &str = "tmp";

/// Largest urlencoded body accepted by [`read_submission`].
const URLENCODED_LIMIT: usize = 256 * 1024;

/// Caps on what a multipart form may carry.
#[derive(Debug, Clone, Copy)]
pub struct FormLimits {
    /// Text and file parts together.
    pub parts: usize,
    /// Each text part.
    pub field_bytes: usize,
    /// Each file part.
    pub file_bytes: u64,
}

impl Default for FormLimits {
    fn default() -> Self {
        Self {
            parts: 64,
            field_bytes: 64 * 1024,
            file_bytes: 25 * 1024 * 1024,
        }
    }
}

/// A file part that has been received but not yet filed away.
#[derive(Debug)]
pub struct UploadedFile {
    pub original_name: String,
    pub size: u64,
    digest: String,
    temp_path: PathBuf,
}

impl UploadedFile {
    /// Lowercased extension of the submitted file name, with its dot.
    fn extension(&self) -> String {
        Path::new(&self.original_name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|e| format!(".{}", e.to_ascii_lowercase()))
            .unwrap_or_default()
    }

    /// Moves the upload to `<media_root>/<subdir>/<md5><ext>` and returns that
    /// path relative to the media root.
    pub fn persist(self, media_root: &Path, subdir: &str) -> std::io::Result<String> {
        let relative = format!("{}/{}{}", subdir, self.digest, self.extension());
        let target = media_root.join(&relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        if target.exists() {
            // Same content already stored.
            fs::remove_file(&self.temp_path)?;
        } else {
            fs::rename(&self.temp_path, &target)?;
        }
        Ok(relative)
    }
}

impl Drop for UploadedFile {
    fn drop(&mut self) {
        // Gone already when persisted.
        let _ = fs::remove_file(&self.temp_path);
    }
}

/// Everything a multipart form carried.
#[derive(Debug, Default)]
pub struct FormParts {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, UploadedFile>,
}

impl FormParts {
    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }
}

/// Drains `payload` into text fields and temporary files.
///
/// File inputs left empty by the browser arrive as zero-byte parts and are
/// dropped.
pub async fn read_form(payload: Multipart, media_root: &Path) -> Result<FormParts, ServiceError> {
    read_form_with(payload, media_root, &FormLimits::default()).await
}

/// [`read_form`] with explicit caps. Going over any of them is a bad request,
/// and a partly written file is removed.
pub async fn read_form_with(
    mut payload: Multipart,
    media_root: &Path,
    limits: &FormLimits,
) -> Result<FormParts, ServiceError> {
    let mut parts = FormParts::default();
    let mut count = 0usize;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| ServiceError::BadRequest(e.to_string()))?;
        count += 1;
        if count > limits.parts {
            return Err(ServiceError::BadRequest(format!(
                "form has more than {} parts",
                limits.parts
            )));
        }
        let (name, filename) = match field.content_disposition() {
            Some(cd) => (
                cd.get_name().map(|n| n.to_string()),
                cd.get_filename().map(|f| f.to_string()),
            ),
            None => (None, None),
        };
        let Some(name) = name else { continue };

        match filename {
            Some(filename) => {
                let tmp_dir = media_root.join(TMP_DIR);
                fs::create_dir_all(&tmp_dir)?;
                let temp_path = tmp_dir.join(format!("{}.part", uuid::Uuid::new_v4()));
                let mut writer = BufWriter::new(File::create(&temp_path)?);
                let mut hasher = Context::new();
                let mut size = 0u64;

                while let Some(chunk) = field.next().await {
                    let failure = match chunk {
                        Err(e) => Some(e.to_string()),
                        Ok(chunk) if size + chunk.len() as u64 > limits.file_bytes => Some(format!(
                            "file '{}' is larger than {} bytes",
                            name, limits.file_bytes
                        )),
                        Ok(chunk) => {
                            hasher.consume(&chunk);
                            size += chunk.len() as u64;
                            writer.write_all(&chunk)?;
                            None
                        }
                    };
                    if let Some(reason) = failure {
                        drop(writer);
                        let _ = fs::remove_file(&temp_path);
                        return Err(ServiceError::BadRequest(reason));
                    }
                }
                writer.flush()?;
                drop(writer);

                let file = UploadedFile {
                    original_name: filename,
                    size,
                    digest: format!("{:x}", hasher.finalize()),
                    temp_path,
                };
                if file.size > 0 {
                    parts.files.insert(name, file);
                }
            }
            None => {
                let mut bytes = Vec::new();
                while let Some(chunk) = field.next().await {
                    let chunk = chunk.map_err(|e| ServiceError::BadRequest(e.to_string()))?;
                    if bytes.len() + chunk.len() > limits.field_bytes {
                        return Err(ServiceError::BadRequest(format!(
                            "field '{}' is longer than {} bytes",
                            name, limits.field_bytes
                        )));
                    }
                    bytes.extend_from_slice(&chunk);
                }
                let value = String::from_utf8(bytes)
                    .map_err(|_| ServiceError::BadRequest(format!("field '{}' is not UTF-8", name)))?;
                parts.fields.insert(name, value);
            }
        }
    }

    Ok(parts)
}

/// Reads an HTML form post, multipart or urlencoded.
///
/// Repeated urlencoded keys keep their last value, as multipart fields do.
pub async fn read_submission(
    req: &HttpRequest,
    mut payload: web::Payload,
    media_root: &Path,
) -> Result<FormParts, ServiceError> {
    let multipart = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));
    if multipart {
        return read_form(Multipart::new(req.headers(), payload), media_root).await;
    }

    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| ServiceError::BadRequest(e.to_string()))?;
        if body.len() + chunk.len() > URLENCODED_LIMIT {
            return Err(ServiceError::BadRequest("form body too large".to_string()));
        }
        body.extend_from_slice(&chunk);
    }
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(&body)
        .map_err(|e| ServiceError::BadRequest(e.to_string()))?;
    Ok(FormParts {
        fields: pairs.into_iter().collect(),
        files: HashMap::new(),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn digest(contents: &[u8]) -> String {
        let mut hasher = Context::new();
        hasher.consume(contents);
        format!("{:x}", hasher.finalize())
    }

    pub(crate) fn staged(dir: &Path, name: &str, contents: &[u8]) -> UploadedFile {
        let tmp = dir.join(TMP_DIR);
        fs::create_dir_all(&tmp).unwrap();
        let temp_path = tmp.join(format!("{}.part", uuid::Uuid::new_v4()));
        fs::write(&temp_path, contents).unwrap();
        UploadedFile {
            original_name: name.to_string(),
            size: contents.len() as u64,
            digest: digest(contents),
            temp_path,
        }
    }

    #[test]
    fn persisted_files_are_named_by_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = staged(dir.path(), "Spec Sheet.PDF", b"brochure")
            .persist(dir.path(), "requests")
            .unwrap();
        assert_eq!(path, format!("requests/{}.pdf", digest(b"brochure")));
        assert!(dir.path().join(&path).exists());

        let again = staged(dir.path(), "copy.pdf", b"brochure")
            .persist(dir.path(), "requests")
            .unwrap();
        assert_eq!(again, path);
        assert_eq!(fs::read_dir(dir.path().join(TMP_DIR)).unwrap().count(), 0);
    }

    #[test]
    fn unpersisted_uploads_leave_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let file = staged(dir.path(), "drawing.dwg", b"lines");
        drop(file);
        assert_eq!(fs::read_dir(dir.path().join(TMP_DIR)).unwrap().count(), 0);
    }

    #[test]
    fn odd_extensions_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = staged(dir.path(), "archive.tar gz", b"x")
            .persist(dir.path(), "requests")
            .unwrap();
        assert!(!path.contains(' '));
        assert!(!path.ends_with(".tar gz"));
    }

    const BOUNDARY: &str = "titan-form-boundary";

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a str, &'a [u8]),
    }

    fn multipart(parts: &[Part]) -> Multipart {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                    );
                    body.extend_from_slice(value.as_bytes());
                }
                Part::File(name, filename, contents) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                             Content-Type: application/octet-stream\r\n\r\n",
                            name, filename
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(contents);
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        let mut headers = actix_web::http::header::HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY).parse().unwrap(),
        );
        let stream = futures_util::stream::once(async move {
            Ok::<_, actix_web::error::PayloadError>(web::Bytes::from(body))
        });
        Multipart::new(&headers, stream)
    }

    fn small() -> FormLimits {
        FormLimits {
            parts: 3,
            field_bytes: 16,
            file_bytes: 32,
        }
    }

    fn leftovers(dir: &Path) -> usize {
        fs::read_dir(dir.join(TMP_DIR)).map(|d| d.count()).unwrap_or(0)
    }

    #[actix_web::test]
    async fn forms_within_limits_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let form = multipart(&[
            Part::Text("name", "Ada"),
            Part::File("attachment", "plan.pdf", b"drawing"),
            Part::File("empty", "", b""),
        ]);
        let parts = read_form_with(form, dir.path(), &small()).await.unwrap();
        assert_eq!(parts.fields.get("name").map(String::as_str), Some("Ada"));
        let file = parts.files.get("attachment").unwrap();
        assert_eq!(file.size, 7);
        assert_eq!(file.digest, digest(b"drawing"));
        assert!(!parts.files.contains_key("empty"));
    }

    #[actix_web::test]
    async fn long_text_fields_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let form = multipart(&[Part::Text("description", &"x".repeat(17))]);
        let err = read_form_with(form, dir.path(), &small()).await.unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
    }

    #[actix_web::test]
    async fn oversized_files_are_rejected_and_removed() {
        let dir = tempfile::tempdir().unwrap();
        let form = multipart(&[Part::File("attachment", "big.bin", &[7u8; 33])]);
        let err = read_form_with(form, dir.path(), &small()).await.unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
        assert_eq!(leftovers(dir.path()), 0);
    }

    #[actix_web::test]
    async fn too_many_parts_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let form = multipart(&[
            Part::Text("a", "1"),
            Part::Text("b", "2"),
            Part::Text("c", "3"),
            Part::Text("d", "4"),
        ]);
        let err = read_form_with(form, dir.path(), &small()).await.unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
    }
}
