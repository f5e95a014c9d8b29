use serde_with::{DeserializeFromStr, SerializeDisplay};

/// Image generation models that can be requested by tag
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::EnumString,
    strum::Display,
    strum::IntoStaticStr,
    strum::VariantArray,
    SerializeDisplay,
    DeserializeFromStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Model {
    #[strum(serialize = "flux-schnell")]
    FluxSchnell,
    #[strum(serialize = "flux-schnell-enhanced")]
    FluxSchnellEnhanced,
    #[strum(serialize = "sdxl-enhanced")]
    SdxlEnhanced,
    #[strum(serialize = "sdxl")]
    Sdxl,
    #[strum(serialize = "dall-e-3")]
    DallE3,
    #[strum(serialize = "dall-e-2")]
    DallE2,
}

/// How a model is reached upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Route {
    /// Hive v3 model endpoint (`/api/v3/{path}`), bearer auth
    HiveV3 { path: &'static str, steps: u32 },
    /// Hive v2 synchronous task endpoint, token auth
    HiveV2Task,
    /// `OpenAI` images API
    OpenAiImages,
}

impl Model {
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    pub(crate) const fn route(self) -> Route {
        match self {
            Self::FluxSchnell => Route::HiveV3 {
                path: "black-forest-labs/flux-schnell",
                steps: 4,
            },
            Self::FluxSchnellEnhanced => Route::HiveV3 {
                path: "hive/flux-schnell-enhanced",
                steps: 4,
            },
            Self::SdxlEnhanced => Route::HiveV3 {
                path: "hive/sdxl-enhanced",
                steps: 15,
            },
            Self::Sdxl => Route::HiveV2Task,
            Self::DallE3 | Self::DallE2 => Route::OpenAiImages,
        }
    }

    /// Parse a caller-supplied tag, `None` when it names no known model
    pub fn parse(tag: &str) -> Option<Self> {
        tag.trim().parse().ok()
    }
}
