//! Request classification categories.
//!
//! The Validator classifies every incoming request into exactly one primary
//! category. `Unclear` on the initial pass is a terminal signal: no amount
//! of tool-driven enrichment will repair a request the classifier cannot
//! place, so the Router escalates immediately.

use serde::{Deserialize, Serialize};

/// The fixed set of request categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestCategory {
    BlogPost,
    SeoOptimization,
    BugFix,
    ContentUpdate,
    BusinessInfoUpdate,
    NewPage,
    FormChanges,
    DesignChanges,
    FeatureRequest,
    Unclear,
}

impl RequestCategory {
    /// All valid categories, in declaration order.
    pub const ALL: [RequestCategory; 10] = [
        Self::BlogPost,
        Self::SeoOptimization,
        Self::BugFix,
        Self::ContentUpdate,
        Self::BusinessInfoUpdate,
        Self::NewPage,
        Self::FormChanges,
        Self::DesignChanges,
        Self::FeatureRequest,
        Self::Unclear,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BlogPost => "blog_post",
            Self::SeoOptimization => "seo_optimization",
            Self::BugFix => "bug_fix",
            Self::ContentUpdate => "content_update",
            Self::BusinessInfoUpdate => "business_info_update",
            Self::NewPage => "new_page",
            Self::FormChanges => "form_changes",
            Self::DesignChanges => "design_changes",
            Self::FeatureRequest => "feature_request",
            Self::Unclear => "unclear",
        }
    }

    /// Parse a category label, normalizing anything unrecognized to
    /// [`RequestCategory::Unclear`]. LLM output is untrusted; an invented
    /// category must not crash classification.
    pub fn parse_lenient(s: &str) -> Self {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .unwrap_or(Self::Unclear)
    }
}

impl std::fmt::Display for RequestCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_categories() {
        assert_eq!(RequestCategory::parse_lenient("form_changes"), RequestCategory::FormChanges);
        assert_eq!(RequestCategory::parse_lenient("  SEO_OPTIMIZATION "), RequestCategory::SeoOptimization);
    }

    #[test]
    fn unknown_category_normalizes_to_unclear() {
        assert_eq!(RequestCategory::parse_lenient("website_magic"), RequestCategory::Unclear);
        assert_eq!(RequestCategory::parse_lenient(""), RequestCategory::Unclear);
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&RequestCategory::BusinessInfoUpdate).unwrap();
        assert_eq!(json, "\"business_info_update\"");
        let parsed: RequestCategory = serde_json::from_str("\"blog_post\"").unwrap();
        assert_eq!(parsed, RequestCategory::BlogPost);
    }

    #[test]
    fn all_covers_every_label_once() {
        let labels: std::collections::BTreeSet<_> =
            RequestCategory::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(labels.len(), 10);
    }
}
