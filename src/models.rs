use serde::{Deserialize, Deserializer, Serialize};

/// A persisted caption/image pair.
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MemeRecord {
    pub id: i64,
    pub text: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

/// Body of `POST /storeapi`.
#[derive(Deserialize, Debug, Clone)]
pub struct NewMeme {
    pub text: String,
    pub image_url: String,
}

/// Fractional caption position; each axis is a share of the source image size.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TextPosition {
    pub x: f64,
    pub y: f64,
}

/// Body of `POST /process_image`.
#[derive(Deserialize, Debug, Clone)]
pub struct RenderRequest {
    #[serde(rename = "image")]
    pub image_url: String,
    pub text: String,
    #[serde(deserialize_with = "lenient_int")]
    pub font_size: i64,
    pub font_color: String,
    pub text_position: TextPosition,
    #[serde(default)]
    pub is_bold: bool,
    #[serde(default)]
    pub is_italic: bool,
    #[serde(default)]
    pub overlay_enabled: bool,
    #[serde(default)]
    pub overlay_intensity: f64,
    #[serde(default)]
    pub background_enabled: bool,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub padding_x: i64,
    #[serde(default, deserialize_with = "lenient_int")]
    pub padding_y: i64,
}

/// A rendered image in the scratch directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    pub filename: String,
}

impl RenderedArtifact {
    /// Download path relative to the service root.
    pub fn cdn_path(&self) -> String {
        format!("/cdn/{}", self.filename)
    }
}

// --- Response bodies ---

#[derive(Serialize, Debug)]
pub struct ProcessImageResponse {
    pub status: &'static str,
    pub img: String,
}

#[derive(Serialize, Debug)]
pub struct DataResponse<T> {
    pub status: &'static str,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success",
            data,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct MessageResponse {
    pub status: &'static str,
    pub message: &'static str,
}

// Form-driven clients send numbers as strings ("12") or floats ("12.0").
fn lenient_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Int(i64),
        Float(f64),
        Text(String),
    }

    match Lenient::deserialize(deserializer)? {
        Lenient::Int(value) => Ok(value),
        Lenient::Float(value) if value.is_finite() => Ok(value.trunc() as i64),
        Lenient::Float(value) => Err(serde::de::Error::custom(format!(
            "expected a finite number, got {value}"
        ))),
        Lenient::Text(raw) => {
            let raw = raw.trim();
            raw.parse::<i64>()
                .or_else(|_| raw.parse::<f64>().map(|v| v.trunc() as i64))
                .map_err(|_| serde::de::Error::custom(format!("expected an integer, got '{raw}'")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_serializes_image_url_in_camel_case() {
        let record = MemeRecord {
            id: 3,
            text: "lol".into(),
            image_url: "http://x/y.png".into(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value, json!({"id": 3, "text": "lol", "imageUrl": "http://x/y.png"}));
    }

    #[test]
    fn render_request_styling_defaults_off() {
        let request: RenderRequest = serde_json::from_value(json!({
            "image": "http://x/y.png",
            "text": "hi",
            "font_size": 20,
            "font_color": "#ffffff",
            "text_position": {"x": 0.5, "y": 0.25}
        }))
        .unwrap();

        assert_eq!(request.image_url, "http://x/y.png");
        assert!(!request.is_bold && !request.is_italic);
        assert!(!request.overlay_enabled && !request.background_enabled);
        assert_eq!((request.padding_x, request.padding_y), (0, 0));
        assert!(request.background_color.is_none());
    }

    #[test]
    fn numeric_strings_are_accepted_for_sizes_and_padding() {
        let request: RenderRequest = serde_json::from_value(json!({
            "image": "http://x/y.png",
            "text": "hi",
            "font_size": "24",
            "font_color": "red",
            "text_position": {"x": 0, "y": 1},
            "padding_x": "5",
            "padding_y": 7.9
        }))
        .unwrap();

        assert_eq!(request.font_size, 24);
        assert_eq!((request.padding_x, request.padding_y), (5, 7));
    }

    #[test]
    fn non_numeric_padding_is_rejected() {
        let result = serde_json::from_value::<RenderRequest>(json!({
            "image": "http://x/y.png",
            "text": "hi",
            "font_size": 20,
            "font_color": "red",
            "text_position": {"x": 0, "y": 0},
            "padding_x": "wide"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn cdn_path_prefixes_filename() {
        let artifact = RenderedArtifact {
            filename: "ABCDE12345.jpg".into(),
        };
        assert_eq!(artifact.cdn_path(), "/cdn/ABCDE12345.jpg");
    }
}
