//! Search plans produced by the planning oracle

use crate::error::PlanError;
use scalpel_model::EditType;
use serde::{Deserialize, Serialize};

/// Secondary search run when the primary one finds nothing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackSearch {
    /// Case-insensitive literal terms
    #[serde(default)]
    pub terms: Vec<String>,
    /// Case-insensitive regex patterns
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl FallbackSearch {
    /// Fallback with literal terms only
    #[must_use]
    pub fn terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            terms: terms.into_iter().map(Into::into).collect(),
            patterns: Vec::new(),
        }
    }

    /// Check if the fallback can match anything
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.patterns.is_empty()
    }
}

/// Structured search plan
///
/// ```json
/// {
///   "editType": "UPDATE_STYLE",
///   "reasoning": "hero background colour",
///   "searchTerms": ["bg-gray-900"],
///   "regexPatterns": ["className=.*bg-"],
///   "fileTypesToSearch": [".jsx", ".tsx"],
///   "fallbackSearch": { "terms": ["hero"] }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPlan {
    /// Edit type hint
    pub edit_type: EditType,
    /// Planner's explanation, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    /// Ordered case-insensitive literal terms
    #[serde(default)]
    pub search_terms: Vec<String>,
    /// Regex patterns tried when no term matches a line
    #[serde(default)]
    pub regex_patterns: Vec<String>,
    /// Extension filter; empty means the executor default
    #[serde(default)]
    pub file_types_to_search: Vec<String>,
    /// Number of matches the planner expects, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_matches: Option<usize>,
    /// Secondary search
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_search: Option<FallbackSearch>,
}

impl SearchPlan {
    /// Create empty plan for an edit type
    #[inline]
    #[must_use]
    pub fn new(edit_type: EditType) -> Self {
        Self {
            edit_type,
            reasoning: None,
            search_terms: Vec::new(),
            regex_patterns: Vec::new(),
            file_types_to_search: Vec::new(),
            expected_matches: None,
            fallback_search: None,
        }
    }

    /// With search terms
    #[must_use]
    pub fn with_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_terms = terms.into_iter().map(Into::into).collect();
        self
    }

    /// With regex patterns
    #[must_use]
    pub fn with_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regex_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// With extension filter (`".jsx"` and `"jsx"` are equivalent)
    #[must_use]
    pub fn with_file_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.file_types_to_search = types.into_iter().map(Into::into).collect();
        self
    }

    /// With fallback search
    #[inline]
    #[must_use]
    pub fn with_fallback(mut self, fallback: FallbackSearch) -> Self {
        self.fallback_search = Some(fallback);
        self
    }

    /// Decode a planning response
    ///
    /// Accepts bare JSON, a fenced code block, or JSON surrounded by prose.
    pub fn from_json(response: &str) -> Result<Self, PlanError> {
        let body = strip_fence(response.trim());
        let start = body.find('{').ok_or(PlanError::NoJson)?;
        let end = body.rfind('}').ok_or(PlanError::NoJson)?;
        if end < start {
            return Err(PlanError::NoJson);
        }

        let plan: Self = serde_json::from_str(&body[start..=end])?;
        plan.validate()?;
        Ok(plan)
    }

    /// Reject plans that cannot match anything
    ///
    /// A plan with only a fallback is valid: the primary search finds nothing
    /// and the fallback runs.
    pub fn validate(&self) -> Result<(), PlanError> {
        let has_primary = any_non_blank(&self.search_terms) || any_non_blank(&self.regex_patterns);
        let has_fallback = self
            .fallback_search
            .as_ref()
            .is_some_and(|f| any_non_blank(&f.terms) || any_non_blank(&f.patterns));
        if has_primary || has_fallback {
            Ok(())
        } else {
            Err(PlanError::Empty)
        }
    }

    /// Normalised extension filter (lowercase, no leading dot)
    #[must_use]
    pub fn extensions(&self) -> Vec<String> {
        self.file_types_to_search
            .iter()
            .map(|t| t.trim().trim_start_matches('.').to_lowercase())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

fn any_non_blank(values: &[String]) -> bool {
    values.iter().any(|v| !v.trim().is_empty())
}

fn strip_fence(text: &str) -> &str {
    let Some(open) = text.find("```") else {
        return text;
    };
    let after_open = &text[open + 3..];
    // skip the info string (```json)
    let body_start = after_open.find('\n').map_or(0, |idx| idx + 1);
    let body = &after_open[body_start..];
    match body.rfind("```") {
        Some(close) => &body[..close],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decode_camel_case_plan() {
        let plan = SearchPlan::from_json(
            r#"{"editType":"UPDATE_STYLE","searchTerms":["bg-gray-900"],"fileTypesToSearch":[".JSX"],"fallbackSearch":{"terms":["hero"]}}"#,
        )
        .unwrap();
        assert_eq!(plan.edit_type, EditType::UpdateStyle);
        assert_eq!(plan.search_terms, vec!["bg-gray-900"]);
        assert_eq!(plan.extensions(), vec!["jsx"]);
        assert_eq!(plan.fallback_search, Some(FallbackSearch::terms(["hero"])));
    }

    #[test]
    fn decode_fenced_plan() {
        let response = "Here is the plan:\n```json\n{\"editType\":\"FIX_ISSUE\",\"regexPatterns\":[\"onClick\"]}\n```\n";
        let plan = SearchPlan::from_json(response).unwrap();
        assert_eq!(plan.edit_type, EditType::FixIssue);
        assert_eq!(plan.regex_patterns, vec!["onClick"]);
    }

    #[test]
    fn empty_plan_is_rejected() {
        let err = SearchPlan::from_json(r#"{"editType":"REFACTOR","searchTerms":["  "]}"#).unwrap_err();
        assert!(matches!(err, PlanError::Empty));
    }

    #[test]
    fn fallback_only_plan_is_accepted() {
        let plan = SearchPlan::from_json(
            r#"{"editType":"UPDATE_COMPONENT","searchTerms":[],"fallbackSearch":{"terms":["pricing"]}}"#,
        )
        .unwrap();
        assert!(plan.search_terms.is_empty());
        assert_eq!(plan.fallback_search, Some(FallbackSearch::terms(["pricing"])));

        let blank = SearchPlan::from_json(r#"{"editType":"REFACTOR","fallbackSearch":{"terms":[" "]}}"#);
        assert!(matches!(blank, Err(PlanError::Empty)));
    }

    #[test]
    fn missing_json_is_reported() {
        assert!(matches!(SearchPlan::from_json("no plan"), Err(PlanError::NoJson)));
        assert!(matches!(
            SearchPlan::from_json(r#"{"editType":"NOPE","searchTerms":["x"]}"#),
            Err(PlanError::Json(_))
        ));
    }

    #[test]
    fn serialized_plan_round_trips_through_decoder() {
        let plan = SearchPlan::new(EditType::UpdateComponent).with_terms(["Sign Up"]);
        let json = serde_json::to_string(&plan).unwrap();
        assert!(json.contains("\"editType\":\"UPDATE_COMPONENT\""));
        assert_eq!(SearchPlan::from_json(&json).unwrap(), plan);
    }
}
