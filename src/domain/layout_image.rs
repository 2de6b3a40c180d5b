// Layout image stored inline as a data URI
use super::error::DomainError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

const DEFAULT_MIME_TYPE: &str = "image/png";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LayoutImage {
    mime_type: String,
    data: Bytes,
}

impl LayoutImage {
    pub fn new(mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Builds an image from raw file bytes, guessing the mime type from the
    /// file extension.
    pub fn from_file_bytes(file_name: &str, data: impl Into<Bytes>) -> Self {
        Self::new(mime_type_for(file_name), data)
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn base64_payload(&self) -> String {
        STANDARD.encode(&self.data)
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64_payload())
    }

    /// Parses `data:<mime>;base64,<payload>`. A bare payload is accepted as PNG.
    pub fn parse_data_uri(uri: &str) -> Result<Self, DomainError> {
        let (mime_type, payload) = match uri.strip_prefix("data:") {
            Some(rest) => {
                let (header, payload) = rest
                    .split_once(',')
                    .ok_or_else(|| DomainError::InvalidDataUri("missing ',' separator".into()))?;
                let mime_type = header
                    .strip_suffix(";base64")
                    .ok_or_else(|| DomainError::InvalidDataUri("payload is not base64".into()))?;
                let mime_type = if mime_type.is_empty() {
                    DEFAULT_MIME_TYPE
                } else {
                    mime_type
                };
                (mime_type, payload)
            }
            None => (DEFAULT_MIME_TYPE, uri),
        };

        let data = STANDARD
            .decode(payload.trim())
            .map_err(|e| DomainError::InvalidDataUri(e.to_string()))?;

        Ok(Self::new(mime_type, data))
    }
}

impl TryFrom<String> for LayoutImage {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_data_uri(&value)
    }
}

impl From<LayoutImage> for String {
    fn from(image: LayoutImage) -> Self {
        image.to_data_uri()
    }
}

fn mime_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        _ => DEFAULT_MIME_TYPE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri_round_trip() {
        let image = LayoutImage::from_file_bytes("site-plan.JPG", vec![0xff, 0xd8, 0xff]);
        assert_eq!(image.mime_type(), "image/jpeg");

        let uri = image.to_data_uri();
        assert_eq!(uri, "data:image/jpeg;base64,/9j/");
        assert_eq!(LayoutImage::parse_data_uri(&uri).unwrap(), image);
    }

    #[test]
    fn test_bare_payload_defaults_to_png() {
        let image = LayoutImage::parse_data_uri("iVBORw==").unwrap();
        assert_eq!(image.mime_type(), "image/png");
        assert_eq!(image.data().as_ref(), &[0x89, 0x50, 0x4e, 0x47]);
    }

    #[test]
    fn test_rejects_malformed_uri() {
        assert!(matches!(
            LayoutImage::parse_data_uri("data:image/png;base64"),
            Err(DomainError::InvalidDataUri(_))
        ));
        assert!(matches!(
            LayoutImage::parse_data_uri("data:text/plain,hello"),
            Err(DomainError::InvalidDataUri(_))
        ));
        assert!(LayoutImage::parse_data_uri("data:image/png;base64,@@@").is_err());
    }
}
