//! End-to-end search and targeting

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use scalpel_model::{EditAction, EditType, FileContents};
use scalpel_search::{
    FallbackSearch, MatchConfidence, SearchPlan, SearchPlanExecutor, TargetSelector,
    TargetingConfig,
};

fn contents(entries: &[(&str, &str)]) -> FileContents {
    entries
        .iter()
        .map(|(p, c)| ((*p).to_string(), (*c).to_string()))
        .collect()
}

#[test]
fn style_term_targets_hero() {
    let files = contents(&[
        (
            "Hero.jsx",
            "export default function Hero() {\n  return (\n    <div className=\"min-h-screen bg-gray-900\">\n      <h1>Ship faster</h1>\n    </div>\n  )\n}",
        ),
        ("Footer.jsx", "export default function Footer() {\n  return <footer />\n}"),
    ]);
    let plan = SearchPlan::from_json(r#"{"editType": "UPDATE_STYLE", "searchTerms": ["bg-gray-900"]}"#).unwrap();

    let outcome = SearchPlanExecutor::new().execute(&plan, &files);
    assert!(outcome.success);
    assert_eq!(outcome.files_searched, 2);
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].file_path, "Hero.jsx");
    assert_eq!(outcome.results[0].confidence, MatchConfidence::High);

    let target = TargetSelector::new()
        .select(&outcome.results, plan.edit_type, &EditAction::Modify)
        .unwrap();
    assert_eq!(target.file_path, "Hero.jsx");
    assert_eq!(target.line_number, 3);
    assert!((target.intent_confidence(&TargetingConfig::default()) - 0.95).abs() < 1e-9);
}

#[test]
fn fallback_results_are_not_merged() {
    let files = contents(&[
        ("Header.jsx", "export default function Header() {\n  return <nav>Acme</nav>\n}"),
        ("Footer.jsx", "export default function Footer() {\n  return <footer>nav links</footer>\n}"),
    ]);
    let plan = SearchPlan::new(EditType::UpdateComponent)
        .with_terms(["pricing table"])
        .with_patterns(["data-pricing"])
        .with_fallback(FallbackSearch::terms(["nav"]));

    let outcome = SearchPlanExecutor::new().execute(&plan, &files);
    assert!(outcome.used_fallback);
    assert!(outcome.success);
    assert!(outcome.results.iter().all(|r| r.matched.text() == "nav"));
    let files_hit: Vec<_> = outcome.results.iter().map(|r| r.file_path.as_str()).collect();
    assert_eq!(files_hit, vec!["Header.jsx", "Footer.jsx"]);
}

#[test]
fn primary_hit_skips_fallback() {
    let files = contents(&[("Header.jsx", "<nav>Acme</nav>")]);
    let plan = SearchPlan::new(EditType::UpdateComponent)
        .with_terms(["Acme"])
        .with_fallback(FallbackSearch::terms(["nav"]));
    let outcome = SearchPlanExecutor::new().execute(&plan, &files);
    assert!(!outcome.used_fallback);
    assert_eq!(outcome.results[0].matched.text(), "Acme");
}

#[test]
fn results_are_ranked_by_confidence() {
    let files = contents(&[
        ("a.jsx", "// cta copy\nconst label = 'CTA'"),
        ("b.jsx", "export const Cta = () => <a>cta</a>"),
    ]);
    let plan = SearchPlan::new(EditType::UpdateComponent).with_terms(["cta"]);
    let outcome = SearchPlanExecutor::new().execute(&plan, &files);

    let ranked: Vec<_> = outcome
        .results
        .iter()
        .map(|r| (r.file_path.as_str(), r.line_number, r.confidence))
        .collect();
    assert_eq!(
        ranked,
        vec![
            ("b.jsx", 1, MatchConfidence::High),
            ("a.jsx", 1, MatchConfidence::Medium),
            ("a.jsx", 2, MatchConfidence::Medium),
        ]
    );
}

fn file_strategy() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(
        (
            "[a-z]{1,6}\\.(jsx|tsx|js|css)",
            prop::collection::vec("[ a-zA-Z<>/=\"{}-]{0,30}", 0..12).prop_map(|lines| lines.join("\n")),
        ),
        0..8,
    )
}

proptest! {
    #[test]
    fn execution_is_deterministic(
        files in file_strategy(),
        terms in prop::collection::vec("[a-z]{1,4}", 1..4),
        pattern in prop::sample::select(vec!["<[a-z]+", "class", "(broken", "\"[^\"]*\""]),
    ) {
        let contents: FileContents = files.into_iter().collect();
        let plan = SearchPlan::new(EditType::UpdateComponent)
            .with_terms(terms)
            .with_patterns([pattern])
            .with_fallback(FallbackSearch::terms(["div"]));
        let executor = SearchPlanExecutor::new();

        let first = executor.execute(&plan, &contents);
        let second = executor.execute(&plan, &contents);
        prop_assert_eq!(&first.results, &second.results);
        prop_assert_eq!(first.used_fallback, second.used_fallback);

        let sorted = first
            .results
            .windows(2)
            .all(|w| w[0].confidence >= w[1].confidence);
        prop_assert!(sorted);
    }
}
