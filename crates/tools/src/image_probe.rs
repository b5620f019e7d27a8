//! Image probe — dimensions, size, format, and an optimization verdict
//! for an image attachment.

use async_trait::async_trait;
use serde_json::json;

use scopehound_core::{EnrichmentTool, ToolError, ToolName, ToolOutput, ToolParams};

use crate::wrong_params;

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "webp", "gif"];

pub struct ImageProbeTool;

#[async_trait]
impl EnrichmentTool for ImageProbeTool {
    fn name(&self) -> ToolName {
        ToolName::ImageProbe
    }

    fn description(&self) -> &str {
        "Inspect an image attachment: dimensions, file size, format, and whether it needs optimization."
    }

    async fn invoke(&self, params: &ToolParams) -> Result<ToolOutput, ToolError> {
        let ToolParams::ImageProbe { path } = params else {
            return Err(wrong_params(self.name()));
        };

        let extension = path.rsplit('.').next().unwrap_or("").to_lowercase();
        if !IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            return Err(ToolError::InvalidInput {
                tool: self.name(),
                message: format!("'{path}' is not a recognized image file"),
            });
        }

        // Deterministic pseudo-measurements from the file name, so repeated
        // probes of the same attachment agree.
        let seed = path.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        let width = 640 + (seed % 8) * 160;
        let height = width * 3 / 4;
        let size_kb = 80 + seed % 2_400;
        let optimized = size_kb < 500;

        let mut out = ToolOutput {
            est_tokens: 600,
            default_confidence: Some(0.85),
            ..Default::default()
        };
        out.observations.insert("image_width".into(), json!(width));
        out.observations.insert("image_height".into(), json!(height));
        out.observations.insert("image_format".into(), json!(extension));
        out.observations.insert("image_size_kb".into(), json!(size_kb));
        out.observations.insert(
            "image_optimization".into(),
            json!(if optimized {
                "already web-optimized"
            } else {
                "needs compression before use"
            }),
        );

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn probe_reports_dimensions_and_verdict() {
        let tool = ImageProbeTool;
        let out = tool
            .invoke(&ToolParams::ImageProbe { path: "hero-banner.png".into() })
            .await
            .unwrap();

        assert!(out.observations["image_width"].as_u64().unwrap() >= 640);
        assert_eq!(out.observations["image_format"], json!("png"));
        assert!(out.observations.contains_key("image_optimization"));
    }

    #[tokio::test]
    async fn probe_is_deterministic_per_file() {
        let tool = ImageProbeTool;
        let params = ToolParams::ImageProbe { path: "logo.jpg".into() };
        let a = tool.invoke(&params).await.unwrap();
        let b = tool.invoke(&params).await.unwrap();
        assert_eq!(a.observations["image_width"], b.observations["image_width"]);
        assert_eq!(a.observations["image_size_kb"], b.observations["image_size_kb"]);
    }

    #[tokio::test]
    async fn non_image_path_is_invalid() {
        let tool = ImageProbeTool;
        let err = tool
            .invoke(&ToolParams::ImageProbe { path: "brand.pdf".into() })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
    }
}
