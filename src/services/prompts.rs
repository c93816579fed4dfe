//! Analysis Prompts
//!
//! System and user prompts for the prompt-driven features. Backend features
//! have no prompt; [`build_messages`] returns `None` for them.

use marketlens_core::Feature;
use marketlens_llm::Message;

const PLAIN_TEXT_RULE: &str =
    "Format your response without using any markdown formatting like bold (**) or italics (*).";

const COMPLIANCE_SYSTEM: &str = "You are a compliance analysis expert. Create a detailed \
compliance analysis that covers all key regulatory and operational requirements. Focus on \
providing specific, actionable insights about compliance needs and risk management.";

const COMPLIANCE_SECTIONS: &str = "Please provide:
1. Regulatory Framework
   - Industry regulations
   - Legal requirements
   - Licensing needs
   - Reporting obligations
2. Data Protection & Privacy
   - Privacy requirements
   - Data handling standards
   - Security protocols
   - User rights management
3. Operational Compliance
   - Standard operating procedures
   - Quality control measures
   - Documentation requirements
   - Audit protocols
4. Risk Management
   - Compliance risks
   - Mitigation strategies
   - Monitoring systems
   - Incident response plans

Format the response in a clear, structured manner with specific details for each component. \
Do not use any markdown formatting like bold (**) or italics (*).";

/// Role shared by the catalogue features
const ANALYST_SYSTEM: &str = "You are a senior market analyst advising startups and small \
businesses. Give specific, actionable findings organised under the numbered headings requested.";

/// Lead-in sentence and numbered checklist for each catalogue feature.
fn catalogue_prompt(feature: Feature) -> Option<(&'static str, &'static [&'static str])> {
    let prompt: (&'static str, &'static [&'static str]) = match feature {
        Feature::Swot => (
            "Perform a detailed SWOT analysis for this business/startup:",
            &[
                "Strengths (internal advantages)",
                "Weaknesses (internal limitations)",
                "Opportunities (external possibilities)",
                "Threats (external challenges)",
                "Strategic implications",
            ],
        ),
        Feature::GapAnalysis => (
            "Identify and analyze market gaps for this business/startup:",
            &[
                "Current market gaps",
                "Unmet customer needs",
                "Service/product gaps",
                "Market opportunity size",
                "Potential solutions",
            ],
        ),
        Feature::JourneyMapping => (
            "Create a comprehensive customer journey map for this business/startup:",
            &[
                "Awareness stage",
                "Consideration stage",
                "Decision stage",
                "Purchase process",
                "Post-purchase experience",
                "Key touchpoints and interactions",
            ],
        ),
        Feature::FeaturePriority => (
            "Create a feature prioritization framework for:",
            &[
                "Core features ranking",
                "Development priorities",
                "User impact assessment",
                "Resource requirements",
                "Implementation timeline",
            ],
        ),
        Feature::MarketSize => (
            "Analyze the market size and potential for:",
            &[
                "Total addressable market (TAM)",
                "Serviceable addressable market (SAM)",
                "Serviceable obtainable market (SOM)",
                "Market growth projections",
                "Market segments analysis",
            ],
        ),
        Feature::RiskAssessment => (
            "Perform a detailed risk assessment for:",
            &[
                "Business risks",
                "Market risks",
                "Operational risks",
                "Financial risks",
                "Mitigation strategies",
            ],
        ),
        _ => return None,
    };
    Some(prompt)
}

/// Ordered system + user prompt for `feature` over `input`.
pub fn build_messages(feature: Feature, input: &str) -> Option<Vec<Message>> {
    if feature == Feature::Compliance {
        return Some(vec![
            Message::system(format!("{} {}", COMPLIANCE_SYSTEM, PLAIN_TEXT_RULE)),
            Message::user(format!(
                "Analyze compliance requirements for this business: {}.\n{}",
                input, COMPLIANCE_SECTIONS
            )),
        ]);
    }

    let (lead, items) = catalogue_prompt(feature)?;
    let checklist = items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n");

    Some(vec![
        Message::system(format!("{} {}", ANALYST_SYSTEM, PLAIN_TEXT_RULE)),
        Message::user(format!(
            "{} {}.\nPlease cover:\n{}",
            lead, input, checklist
        )),
    ])
}
