//! Request body encoding: plain JSON, or `multipart/form-data` when files
//! are attached.
//!
//! Attachments are read fully into memory while the body is assembled and
//! dropped with it. Large uploads are not streamed.

use std::path::{Path, PathBuf};

use rand::{distributions::Alphanumeric, Rng};
use serde_json::{json, Value};

use crate::{ClientError, Result};

/// Fixed prefix of every multipart boundary, as sent by the desktop client.
pub static BOUNDARY_PREFIX: &'static str = "----WebKitFormBoundary";
pub const BOUNDARY_RANDOM_LEN: usize = 16;

pub static JSON_CONTENT_TYPE: &'static str = "application/json";
static PAYLOAD_FIELD: &'static str = "payload_json";
static FALLBACK_FILENAME: &'static str = "file";

#[derive(Debug, Clone)]
pub enum AttachmentSource {
    Path(PathBuf),
    Bytes { filename: String, data: Vec<u8> },
}

/// A file sent as one multipart part alongside the JSON payload.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub source: AttachmentSource,
    pub description: Option<String>,
    pub content_type: Option<String>,
}

impl Attachment {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            source: AttachmentSource::Path(path.as_ref().to_path_buf()),
            description: None,
            content_type: None,
        }
    }

    pub fn from_bytes<S: Into<String>>(filename: S, data: Vec<u8>) -> Self {
        Self {
            source: AttachmentSource::Bytes {
                filename: filename.into(),
                data,
            },
            description: None,
            content_type: None,
        }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_content_type<S: Into<String>>(mut self, content_type: S) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn filename(&self) -> String {
        match &self.source {
            AttachmentSource::Path(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| FALLBACK_FILENAME.to_string()),
            AttachmentSource::Bytes { filename, .. } if !filename.is_empty() => filename.clone(),
            AttachmentSource::Bytes { .. } => FALLBACK_FILENAME.to_string(),
        }
    }

    fn part_content_type(&self, filename: &str) -> String {
        match &self.content_type {
            Some(content_type) => content_type.clone(),
            None => mime_guess::from_path(filename)
                .first_raw()
                .unwrap_or("application/octet-stream")
                .to_string(),
        }
    }

    async fn read(&self) -> Result<Vec<u8>> {
        match &self.source {
            AttachmentSource::Path(path) => tokio::fs::read(path).await.map_err(|err| {
                ClientError::BodyEncodingFailure(format!(
                    "cannot read attachment {}: {}",
                    path.display(),
                    err
                ))
            }),
            AttachmentSource::Bytes { data, .. } => Ok(data.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// A fresh `----WebKitFormBoundary` token. Never reused across requests.
pub fn generate_boundary() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(BOUNDARY_RANDOM_LEN)
        .map(char::from)
        .collect();
    format!("{}{}", BOUNDARY_PREFIX, suffix)
}

/// Turn an already JSON-encoded payload and the attachments into the body to
/// send. Returns `None` when there is nothing to send.
pub async fn encode_body(
    payload: Option<&[u8]>,
    attachments: &[Attachment],
) -> Result<Option<EncodedBody>> {
    if attachments.is_empty() {
        return Ok(payload.map(|bytes| EncodedBody {
            bytes: bytes.to_vec(),
            content_type: JSON_CONTENT_TYPE.to_string(),
        }));
    }

    let boundary = generate_boundary();
    let mut bytes = Vec::new();

    for (index, attachment) in attachments.iter().enumerate() {
        let data = attachment.read().await?;
        let filename = attachment.filename();
        let disposition = format!(
            "form-data; name=\"files[{}]\"; filename=\"{}\"",
            index,
            escape_quoted(&filename)
        );
        let content_type = attachment.part_content_type(&filename);
        write_part(&mut bytes, &boundary, &disposition, &content_type, &data);
    }

    if let Some(json) = merge_descriptions(payload, attachments)? {
        let disposition = format!("form-data; name=\"{}\"", PAYLOAD_FIELD);
        write_part(&mut bytes, &boundary, &disposition, JSON_CONTENT_TYPE, &json);
    }

    bytes.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

    Ok(Some(EncodedBody {
        bytes,
        content_type: format!("multipart/form-data; boundary={}", boundary),
    }))
}

fn write_part(
    buf: &mut Vec<u8>,
    boundary: &str,
    disposition: &str,
    content_type: &str,
    data: &[u8],
) {
    buf.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    buf.extend_from_slice(format!("Content-Disposition: {}\r\n", disposition).as_bytes());
    buf.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    buf.extend_from_slice(data);
    buf.extend_from_slice(b"\r\n");
}

fn escape_quoted(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Attach `attachments[].description` metadata to the payload when any file
/// carries one. Payloads that already declare `attachments`, or are not JSON
/// objects, are sent untouched.
fn merge_descriptions(
    payload: Option<&[u8]>,
    attachments: &[Attachment],
) -> Result<Option<Vec<u8>>> {
    if attachments.iter().all(|a| a.description.is_none()) {
        return Ok(payload.map(<[u8]>::to_vec));
    }

    let mut object = match payload {
        None => serde_json::Map::new(),
        Some(bytes) => match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(map)) if !map.contains_key("attachments") => map,
            _ => return Ok(Some(bytes.to_vec())),
        },
    };

    let metadata: Vec<Value> = attachments
        .iter()
        .enumerate()
        .map(|(index, attachment)| {
            let mut entry = json!({ "id": index, "filename": attachment.filename() });
            if let Some(description) = &attachment.description {
                entry["description"] = Value::String(description.clone());
            }
            entry
        })
        .collect();
    object.insert("attachments".to_string(), Value::Array(metadata));

    serde_json::to_vec(&Value::Object(object))
        .map(Some)
        .map_err(|err| ClientError::BodyEncodingFailure(format!("attachment metadata: {}", err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_text(body: &EncodedBody) -> String {
        String::from_utf8_lossy(&body.bytes).into_owned()
    }

    #[test]
    fn test_boundary_format() {
        let boundary = generate_boundary();
        let suffix = boundary.strip_prefix(BOUNDARY_PREFIX).unwrap();
        assert_eq!(suffix.len(), BOUNDARY_RANDOM_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_boundary_is_fresh() {
        assert_ne!(generate_boundary(), generate_boundary());
    }

    #[tokio::test]
    async fn test_no_payload_no_attachments() {
        assert_eq!(encode_body(None, &[]).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_payload_only_is_json() {
        let body = encode_body(Some(br#"{"content":"hi"}"#), &[])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(body.content_type, "application/json");
        assert_eq!(body.bytes, br#"{"content":"hi"}"#.to_vec());
    }

    #[tokio::test]
    async fn test_multipart_framing() {
        let attachments = vec![Attachment::from_bytes("cat.png", vec![1, 2, 3])];
        let body = encode_body(Some(br#"{"content":"hi"}"#), &attachments)
            .await
            .unwrap()
            .unwrap();

        let boundary = body
            .content_type
            .strip_prefix("multipart/form-data; boundary=")
            .unwrap()
            .to_string();
        assert!(boundary.starts_with(BOUNDARY_PREFIX));

        let text = body_text(&body);
        assert!(text.starts_with(&format!("--{}\r\n", boundary)));
        assert!(text.ends_with(&format!("--{}--\r\n", boundary)));
        assert_eq!(text.matches(&format!("--{}\r\n", boundary)).count(), 2);
        assert!(text.contains("name=\"files[0]\"; filename=\"cat.png\""));
        assert!(text.contains("Content-Type: image/png"));
        assert!(text.contains(
            "name=\"payload_json\"\r\nContent-Type: application/json\r\n\r\n\
             {\"content\":\"hi\"}\r\n"
        ));

        // files come before the payload part
        let file_at = text.find("files[0]").unwrap();
        let payload_at = text.find("payload_json").unwrap();
        assert!(file_at < payload_at);
    }

    #[tokio::test]
    async fn test_attachments_without_payload() {
        let attachments = vec![
            Attachment::from_bytes("a.txt", b"alpha".to_vec()),
            Attachment::from_bytes("", b"beta".to_vec()).with_content_type("text/x-custom"),
        ];
        let body = encode_body(None, &attachments).await.unwrap().unwrap();
        let text = body_text(&body);
        assert!(!text.contains("payload_json"));
        assert!(text.contains("name=\"files[1]\"; filename=\"file\""));
        assert!(text.contains("Content-Type: text/x-custom\r\n\r\nbeta\r\n"));
    }

    #[tokio::test]
    async fn test_missing_file_is_body_encoding_failure() {
        let attachments = vec![Attachment::from_path("/definitely/not/here.bin")];
        let err = encode_body(None, &attachments).await.unwrap_err();
        assert!(matches!(err, ClientError::BodyEncodingFailure(_)));
    }

    #[tokio::test]
    async fn test_descriptions_are_merged() {
        let attachments =
            vec![Attachment::from_bytes("a.txt", b"a".to_vec()).with_description("alt text")];
        let body = encode_body(Some(br#"{"content":"hi"}"#), &attachments)
            .await
            .unwrap()
            .unwrap();
        let text = body_text(&body);
        assert!(text.contains(
            r#""attachments":[{"description":"alt text","filename":"a.txt","id":0}]"#
        ));
        assert!(text.contains(r#""content":"hi""#));
    }

    #[tokio::test]
    async fn test_explicit_attachments_key_is_kept() {
        let payload = br#"{"attachments":[]}"#;
        let attachments =
            vec![Attachment::from_bytes("a.txt", b"a".to_vec()).with_description("x")];
        let body = encode_body(Some(payload), &attachments).await.unwrap().unwrap();
        assert!(body_text(&body).contains("\r\n\r\n{\"attachments\":[]}\r\n"));
    }

    #[test]
    fn test_merge_descriptions_results() {
        let plain = vec![Attachment::from_bytes("a.txt", b"a".to_vec())];
        assert_eq!(merge_descriptions(None, &plain).unwrap(), None);
        assert_eq!(
            merge_descriptions(Some(b"[1]".as_slice()), &plain).unwrap(),
            Some(b"[1]".to_vec())
        );

        let described = vec![Attachment::from_bytes("a.txt", b"a".to_vec()).with_description("d")];
        let merged = merge_descriptions(None, &described).unwrap().unwrap();
        let value: Value = serde_json::from_slice(&merged).unwrap();
        assert_eq!(value["attachments"][0]["description"], "d");
        assert_eq!(value["attachments"][0]["filename"], "a.txt");
    }

    #[test]
    fn test_filename_from_path() {
        let attachment = Attachment::from_path("/tmp/some dir/report.pdf");
        assert_eq!(attachment.filename(), "report.pdf");
        assert_eq!(attachment.part_content_type("report.pdf"), "application/pdf");
    }

    #[test]
    fn test_quoted_filename_is_escaped() {
        assert_eq!(escape_quoted("a\"b\r\n.txt"), "a%22b%0D%0A.txt");
    }
}
