// ABOUTME: Business description analyzer that drafts assistant settings from free text
// ABOUTME: Uses a JSON-mode chat completion and falls back to keyword extraction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use crate::constants::limits;
use crate::errors::{AppError, AppResult};
use crate::openai::{AssistantsApi, ChatCompletionRequest, ChatMessage};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::LazyLock;
use tracing::{debug, warn};

const ANALYSIS_PROMPT: &str = "Analyze the business description and reply with a JSON object with keys \
business_name (string), industry (string), tone (\"formal\" or \"friendly\"), target_audience (string), \
key_services (array of strings) and suggested_instructions (system instructions for a customer-support \
assistant of this business). Reply with JSON only.";

const MAX_KEY_SERVICES: usize = 10;

/// Industry keyword table, first match with the most hits wins
const INDUSTRY_KEYWORDS: &[(&str, &[&str])] = &[
    ("restaurant", &["restaurant", "cafe", "café", "menu", "food", "pizza", "coffee", "bakery", "кафе", "ресторан"]),
    ("beauty", &["salon", "beauty", "spa", "cosmetic", "manicure", "hair", "салон", "красот"]),
    ("healthcare", &["clinic", "medical", "doctor", "health", "dental", "patient", "клиник", "врач"]),
    ("education", &["school", "course", "education", "training", "lesson", "tutor", "обучен", "курс"]),
    ("real_estate", &["real estate", "property", "apartment", "rent", "недвижимост", "квартир"]),
    ("fitness", &["gym", "fitness", "yoga", "workout", "trainer", "фитнес"]),
    ("travel", &["travel", "tour", "hotel", "booking", "flight", "туризм", "отель"]),
    ("finance", &["bank", "finance", "insurance", "accounting", "loan", "invest", "финанс"]),
    ("technology", &["software", "saas", "app", "platform", "development", "it services", "программ"]),
    ("retail", &["shop", "store", "retail", "delivery", "order", "product", "магазин", "доставк"]),
];

const FORMAL_MARKERS: &[&str] = &[
    "dear", "sincerely", "regards", "hereby", "esteemed", "pursuant", "уважаем", "с уважением",
];

static NAME_AFTER_MARKER: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r#"(?:(?i:company|business|we are|welcome to|called))\s+["«“]?(\p{Lu}[\w&'’-]*(?:\s+\p{Lu}[\w&'’-]*){0,4})"#,
    )
    .ok()
});

static QUOTED_NAME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"["«“]([^"»”\n]{2,60})["»”]"#).ok());

static LIST_ITEM: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*•–]|\d+[.)])\s+(.+)$").ok());

static SERVICES_SENTENCE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:services|we offer|we provide|offering|products)\s*(?:include|are|:)?\s*:?\s*([^.\n]+)")
        .ok()
});

/// Where an analysis came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSource {
    /// Produced by the model
    Ai,
    /// Produced by keyword extraction
    Basic,
}

/// Suggested assistant settings for a business
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessAnalysis {
    /// Business name
    pub business_name: String,
    /// Industry keyword
    pub industry: String,
    /// `formal` or `friendly`
    pub tone: String,
    /// Who the business serves
    pub target_audience: String,
    /// Main products or services
    pub key_services: Vec<String>,
    /// Draft system instructions
    pub suggested_instructions: String,
    /// Producer of the analysis
    pub source: AnalysisSource,
}

#[derive(Debug, Deserialize)]
struct ModelAnalysis {
    business_name: String,
    #[serde(default)]
    industry: String,
    #[serde(default)]
    tone: String,
    #[serde(default)]
    target_audience: String,
    #[serde(default)]
    key_services: Vec<String>,
    suggested_instructions: String,
}

/// Analyze a business description
///
/// # Errors
///
/// Returns `INVALID_INPUT` for blank text. Model failures fall back to
/// [`basic_analysis`] and are not returned.
pub async fn analyze(
    api: &dyn AssistantsApi,
    model: &str,
    text: &str,
) -> AppResult<BusinessAnalysis> {
    if text.trim().is_empty() {
        return Err(AppError::invalid_input("Text to analyze is required"));
    }
    let input: String = text.chars().take(limits::MAX_SUMMARY_INPUT_CHARS).collect();

    let request = ChatCompletionRequest {
        model: model.to_owned(),
        messages: vec![ChatMessage::system(ANALYSIS_PROMPT), ChatMessage::user(input)],
        temperature: Some(0.2),
        max_tokens: None,
        response_format: Some(json!({ "type": "json_object" })),
    };

    match api.chat_completion(&request).await {
        Ok(reply) => match serde_json::from_str::<ModelAnalysis>(strip_code_fence(&reply)) {
            Ok(parsed) if !parsed.business_name.trim().is_empty() => {
                return Ok(BusinessAnalysis {
                    business_name: parsed.business_name.trim().to_owned(),
                    industry: non_empty_or(parsed.industry, "general"),
                    tone: non_empty_or(parsed.tone, "friendly"),
                    target_audience: non_empty_or(parsed.target_audience, "general customers"),
                    key_services: parsed.key_services,
                    suggested_instructions: parsed.suggested_instructions,
                    source: AnalysisSource::Ai,
                });
            }
            Ok(_) => debug!("Model analysis lacked a business name"),
            Err(e) => warn!("Model analysis was not valid JSON: {e}"),
        },
        Err(e) => warn!("Model analysis failed: {e}"),
    }
    Ok(basic_analysis(text))
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_owned()
    } else {
        value
    }
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map_or(trimmed, str::trim)
}

/// Keyword and pattern based analysis
#[must_use]
pub fn basic_analysis(text: &str) -> BusinessAnalysis {
    let lower = text.to_lowercase();
    let business_name = extract_business_name(text);
    let industry = detect_industry(&lower);
    let tone = if FORMAL_MARKERS.iter().any(|m| lower.contains(m)) {
        "formal"
    } else {
        "friendly"
    };
    let target_audience = detect_audience(&lower);
    let key_services = extract_services(text);

    let suggested_instructions = format!(
        "You are the customer support assistant of {business_name}, a business in the {} industry. \
         Answer questions from {target_audience} in a {tone} tone.{} \
         Use the knowledge base for facts about prices, schedules and policies, and say so honestly \
         when you do not know an answer.",
        industry.replace('_', " "),
        if key_services.is_empty() {
            String::new()
        } else {
            format!(" The main offerings are: {}.", key_services.join(", "))
        },
    );

    BusinessAnalysis {
        business_name,
        industry: industry.to_owned(),
        tone: tone.to_owned(),
        target_audience: target_audience.to_owned(),
        key_services,
        suggested_instructions,
        source: AnalysisSource::Basic,
    }
}

fn extract_business_name(text: &str) -> String {
    let from_marker = NAME_AFTER_MARKER
        .as_ref()
        .and_then(|re| re.captures(text))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_owned());
    let quoted = || {
        QUOTED_NAME
            .as_ref()
            .and_then(|re| re.captures(text))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_owned())
    };
    let first_line = || {
        text.lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(|l| l.chars().take(60).collect::<String>())
    };

    from_marker
        .or_else(quoted)
        .or_else(first_line)
        .unwrap_or_else(|| "Our business".to_owned())
}

fn detect_industry(lower: &str) -> &'static str {
    let mut best = ("general", 0usize);
    for (industry, keywords) in INDUSTRY_KEYWORDS {
        let hits = keywords.iter().filter(|k| lower.contains(*k)).count();
        if hits > best.1 {
            best = (industry, hits);
        }
    }
    best.0
}

fn detect_audience(lower: &str) -> &'static str {
    if ["b2b", "companies", "businesses", "enterprise", "corporate"]
        .iter()
        .any(|k| lower.contains(k))
    {
        "businesses"
    } else if ["student", "pupil", "learner"].iter().any(|k| lower.contains(k)) {
        "students"
    } else if ["famil", "kids", "children", "parent"].iter().any(|k| lower.contains(k)) {
        "families"
    } else {
        "general customers"
    }
}

fn extract_services(text: &str) -> Vec<String> {
    let mut services: Vec<String> = LIST_ITEM.as_ref().map_or_else(Vec::new, |re| {
        text.lines()
            .filter_map(|line| re.captures(line))
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().trim().trim_end_matches(['.', ';', ',']).to_owned())
            .filter(|s| !s.is_empty())
            .collect()
    });

    if services.is_empty() {
        if let Some(list) = SERVICES_SENTENCE
            .as_ref()
            .and_then(|re| re.captures(text))
            .and_then(|c| c.get(1))
        {
            services = list
                .as_str()
                .split([',', ';'])
                .flat_map(|part| part.split(" and "))
                .map(|s| s.trim().to_owned())
                .filter(|s| !s.is_empty())
                .collect();
        }
    }
    services.truncate(MAX_KEY_SERVICES);
    services
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence(" {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn test_detect_industry_prefers_most_hits() {
        assert_eq!(detect_industry("our cafe menu has coffee and pizza"), "restaurant");
        assert_eq!(detect_industry("nothing relevant here"), "general");
    }
}
