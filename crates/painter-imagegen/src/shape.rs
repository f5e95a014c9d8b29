//! Extraction of an image from provider response bodies
//!
//! Providers place the image under different keys depending on the API
//! version. Each known layout is a typed schema; matchers are tried in a
//! fixed order and the first one that yields an image wins. Supporting a new
//! layout means adding a schema and an entry to [`SHAPES`].

use painter_core::ImageRef;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::{ImageGenError, Result};

/// A named attempt at reading one response layout
struct ShapeMatcher {
    name: &'static str,
    extract: fn(&Value) -> Option<ImageRef>,
}

/// Known layouts in priority order
const SHAPES: &[ShapeMatcher] = &[
    ShapeMatcher {
        name: "direct_url",
        extract: direct_url,
    },
    ShapeMatcher {
        name: "data_list",
        extract: data_list,
    },
    ShapeMatcher {
        name: "output_list",
        extract: output_list,
    },
    ShapeMatcher {
        name: "nested_base64",
        extract: nested_base64,
    },
    ShapeMatcher {
        name: "task_status",
        extract: task_status,
    },
];

/// `{"url": "..."}`
#[derive(Deserialize)]
struct DirectUrl {
    url: String,
}

/// `{"data": [{"url": ...} | {"b64_json": ...}]}`
#[derive(Deserialize)]
struct DataList {
    data: Vec<ImageItem>,
}

/// `{"output": [{"url": ...} | {"base64": ...}]}`
#[derive(Deserialize)]
struct OutputList {
    output: Vec<ImageItem>,
}

/// `{"image": {"base64": ..., "mime_type": ...}}`
#[derive(Deserialize)]
struct NestedImage {
    image: EncodedImage,
}

#[derive(Deserialize)]
struct EncodedImage {
    #[serde(alias = "b64_json")]
    base64: String,
    #[serde(default, alias = "content_type")]
    mime_type: Option<String>,
}

/// `{"status": [{"response": {"output": [...]}}]}`
#[derive(Deserialize)]
struct TaskStatus {
    status: Vec<TaskEntry>,
}

#[derive(Deserialize)]
struct TaskEntry {
    response: OutputList,
}

/// One entry of an output list, shaped either as a URL or a payload
#[derive(Deserialize)]
struct ImageItem {
    #[serde(default)]
    url: Option<String>,
    #[serde(default, alias = "base64")]
    b64_json: Option<String>,
    #[serde(default, alias = "content_type")]
    mime_type: Option<String>,
}

impl ImageItem {
    fn into_image_ref(self) -> Option<ImageRef> {
        if let Some(url) = self.url
            && let Ok(image) = ImageRef::url(url)
        {
            return Some(image);
        }

        let data = self.b64_json?;
        ImageRef::from_base64(&data, self.mime_type.as_deref()).ok()
    }
}

fn parse<T: DeserializeOwned>(value: &Value) -> Option<T> {
    T::deserialize(value).ok()
}

fn first_image(items: Vec<ImageItem>) -> Option<ImageRef> {
    items.into_iter().find_map(ImageItem::into_image_ref)
}

fn direct_url(value: &Value) -> Option<ImageRef> {
    parse::<DirectUrl>(value).and_then(|shape| ImageRef::url(shape.url).ok())
}

fn data_list(value: &Value) -> Option<ImageRef> {
    parse::<DataList>(value).and_then(|shape| first_image(shape.data))
}

fn output_list(value: &Value) -> Option<ImageRef> {
    parse::<OutputList>(value).and_then(|shape| first_image(shape.output))
}

fn nested_base64(value: &Value) -> Option<ImageRef> {
    parse::<NestedImage>(value)
        .and_then(|shape| ImageRef::from_base64(&shape.image.base64, shape.image.mime_type.as_deref()).ok())
}

fn task_status(value: &Value) -> Option<ImageRef> {
    parse::<TaskStatus>(value).and_then(|shape| {
        shape
            .status
            .into_iter()
            .find_map(|entry| first_image(entry.response.output))
    })
}

/// Extract the image from a successful provider response body
pub(crate) fn extract(body: &str) -> Result<ImageRef> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ImageGenError::MalformedResponse(format!("response body is not valid JSON: {e}")))?;

    extract_value(&value)
}

pub(crate) fn extract_value(value: &Value) -> Result<ImageRef> {
    SHAPES
        .iter()
        .find_map(|shape| {
            let image = (shape.extract)(value)?;
            tracing::debug!(shape = shape.name, "matched provider response shape");
            Some(image)
        })
        .ok_or_else(|| ImageGenError::MalformedResponse("no image found in provider response".to_string()))
}
