//! Built-in tool implementations for Scopehound.
//!
//! Tools give the engine the ability to fill information gaps without
//! going back to the client: fetch and summarize pages, enumerate forms,
//! pull brand colours out of PDFs, look businesses up on a places index.
//!
//! Every tool here is a deterministic stub: it returns plausible
//! observations derived from its inputs so the enrichment loop can be
//! exercised end-to-end without network access. Production deployments
//! swap individual tools for live implementations behind the same trait.
//! A stub that legitimately finds nothing returns an empty observation
//! map, never an error — that distinction feeds no-progress detection.

pub mod fetch_page;
pub mod form_detect;
pub mod image_probe;
pub mod maps_lookup;
pub mod pdf_extract;
pub mod reviews_lookup;
pub mod seo_audit;
pub mod social_find;
pub mod web_search;

use std::time::Duration;

use scopehound_core::ToolRegistry;

/// Create a registry with all nine built-in tools and the given deadline.
pub fn default_registry(timeout: Duration) -> ToolRegistry {
    let mut registry = ToolRegistry::new(timeout);
    registry.register(Box::new(fetch_page::FetchPageTool));
    registry.register(Box::new(web_search::WebSearchTool));
    registry.register(Box::new(image_probe::ImageProbeTool));
    registry.register(Box::new(pdf_extract::PdfExtractTool));
    registry.register(Box::new(form_detect::FormDetectTool));
    registry.register(Box::new(social_find::SocialFindTool));
    registry.register(Box::new(seo_audit::SeoAuditTool));
    registry.register(Box::new(maps_lookup::MapsLookupTool));
    registry.register(Box::new(reviews_lookup::ReviewsLookupTool));
    registry
}

/// Shared parameter guard: URL-taking tools accept http(s) URLs only.
pub(crate) fn require_http_url(
    tool: scopehound_core::ToolName,
    url: &str,
) -> Result<(), scopehound_core::ToolError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(scopehound_core::ToolError::InvalidInput {
            tool,
            message: "URL must start with http:// or https://".into(),
        })
    }
}

/// Shared parameter guard: the variant handed to a tool must be its own.
pub(crate) fn wrong_params(
    tool: scopehound_core::ToolName,
) -> scopehound_core::ToolError {
    scopehound_core::ToolError::InvalidInput {
        tool,
        message: "parameter variant does not match tool".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scopehound_core::ToolName;

    #[test]
    fn default_registry_has_all_nine_tools() {
        let registry = default_registry(Duration::from_secs(30));
        let available = registry.available_tools();
        assert_eq!(available.len(), 9);
        for name in ToolName::ALL {
            assert!(available.iter().any(|t| t.name == name), "missing {name}");
        }
    }

    #[test]
    fn availability_carries_default_budgets() {
        let registry = default_registry(Duration::from_secs(30));
        let fetch = registry
            .available_tools()
            .into_iter()
            .find(|t| t.name == ToolName::FetchPage)
            .unwrap();
        assert_eq!(fetch.max_calls, 5);
        assert_eq!(fetch.remaining_calls, 5);
    }
}
