//! Feature Catalogue
//!
//! The closed set of analysis capabilities MarketLens offers. Each feature is
//! either prompt-driven (answered by an LLM provider as plain text) or
//! backend-driven (answered by the analytics service as structured JSON).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One analysis capability with its own prompt or response schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Feature {
    Compliance,
    Icp,
    Competitor,
    Sentiment,
    MarketTrends,
    Swot,
    GapAnalysis,
    JourneyMapping,
    FeaturePriority,
    MarketSize,
    RiskAssessment,
}

/// Where a feature's result comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureSource {
    /// Built from a prompt and answered by the AI client adapter.
    Prompt,
    /// Answered by the analytics backend at `endpoint` (path under the base URL).
    Backend { endpoint: &'static str },
}

impl Feature {
    /// Every feature, in catalogue order.
    pub const ALL: [Feature; 11] = [
        Feature::Compliance,
        Feature::Icp,
        Feature::Competitor,
        Feature::Sentiment,
        Feature::MarketTrends,
        Feature::Swot,
        Feature::GapAnalysis,
        Feature::JourneyMapping,
        Feature::FeaturePriority,
        Feature::MarketSize,
        Feature::RiskAssessment,
    ];

    /// URL/CLI identifier, e.g. `market-trends`.
    pub fn slug(&self) -> &'static str {
        match self {
            Feature::Compliance => "compliance",
            Feature::Icp => "icp",
            Feature::Competitor => "competitor",
            Feature::Sentiment => "sentiment",
            Feature::MarketTrends => "market-trends",
            Feature::Swot => "swot",
            Feature::GapAnalysis => "gap-analysis",
            Feature::JourneyMapping => "journey-mapping",
            Feature::FeaturePriority => "feature-priority",
            Feature::MarketSize => "market-size",
            Feature::RiskAssessment => "risk-assessment",
        }
    }

    /// Name used when composing persisted cache keys.
    ///
    /// These names are part of the on-disk layout; changing one orphans every
    /// cached result for that feature.
    pub fn storage_name(&self) -> &'static str {
        match self {
            Feature::Compliance => "compliance",
            Feature::Icp => "icp",
            Feature::Competitor => "competitor",
            Feature::Sentiment => "feedback",
            Feature::MarketTrends => "marketTrends",
            Feature::Swot => "swot",
            Feature::GapAnalysis => "gap",
            Feature::JourneyMapping => "journeyMapping",
            Feature::FeaturePriority => "featurePriority",
            Feature::MarketSize => "marketSize",
            Feature::RiskAssessment => "riskAssessment",
        }
    }

    /// Key of the feature's saved-report history.
    ///
    /// Features that already kept a history use their established key; the
    /// rest derive one from [`Feature::storage_name`].
    pub fn reports_key(&self) -> String {
        match self {
            Feature::MarketTrends => "marketTrendReports".to_string(),
            Feature::GapAnalysis => "gapAnalysisReports".to_string(),
            Feature::Competitor => "competitorTrackingReports".to_string(),
            Feature::JourneyMapping => "journeyMappingReports".to_string(),
            Feature::MarketSize => "marketAssessmentReports".to_string(),
            other => format!("{}Reports", other.storage_name()),
        }
    }

    /// Human-readable title.
    pub fn title(&self) -> &'static str {
        match self {
            Feature::Compliance => "Compliance Check",
            Feature::Icp => "Ideal Customer Profile",
            Feature::Competitor => "Competitor Tracking",
            Feature::Sentiment => "Customer Sentiment",
            Feature::MarketTrends => "Market Trends",
            Feature::Swot => "SWOT Analysis",
            Feature::GapAnalysis => "Gap Analysis",
            Feature::JourneyMapping => "Journey Mapping",
            Feature::FeaturePriority => "Feature Priority",
            Feature::MarketSize => "Market Size Analysis",
            Feature::RiskAssessment => "Risk Assessment",
        }
    }

    pub fn source(&self) -> FeatureSource {
        match self {
            Feature::Icp => FeatureSource::Backend {
                endpoint: "/api/icp-analysis",
            },
            Feature::Competitor => FeatureSource::Backend {
                endpoint: "/api/competitor-analysis",
            },
            Feature::MarketTrends => FeatureSource::Backend {
                endpoint: "/api/market-trends",
            },
            Feature::Sentiment => FeatureSource::Backend {
                endpoint: "/api/feedback-analysis",
            },
            _ => FeatureSource::Prompt,
        }
    }

    pub fn is_prompt_driven(&self) -> bool {
        matches!(self.source(), FeatureSource::Prompt)
    }

    /// Fields a backend response is expected to carry. Empty for prompt features.
    pub fn expected_fields(&self) -> &'static [&'static str] {
        match self {
            Feature::Icp => &[
                "demographics",
                "psychographics",
                "professional",
                "pain_points",
                "additional_insights",
                "sources",
            ],
            Feature::Competitor => &[
                "main_competitors",
                "competitor_strengths",
                "key_findings",
                "sources",
            ],
            Feature::MarketTrends => &[
                "market_size_growth",
                "competitive_landscape",
                "consumer_analysis",
                "technology_innovation",
                "regulatory_environment",
                "future_outlook",
                "strategic_recommendations",
                "sources",
            ],
            Feature::Sentiment => &[
                "satisfaction_metrics",
                "product_feedback",
                "service_feedback",
                "recommendations",
                "sources",
            ],
            _ => &[],
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Feature {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        Feature::ALL
            .into_iter()
            .find(|f| f.slug() == wanted)
            .ok_or_else(|| CoreError::not_found(format!("unknown feature: {}", s)))
    }
}
