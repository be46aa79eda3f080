//! Full edit cycles against scripted oracles.
//!
//! - Surgical edits restrict generation to the selected file.
//! - Truncated files get one recovery attempt each.
//! - Oracle failures surface on the outcome with partial results intact.

use pretty_assertions::assert_eq;
use scalpel_core::{
    GenerationPurpose, OracleError, PipelineError, RecoveryStatus, ResolutionPath, SessionHandle,
};
use scalpel_model::EditType;
use scalpel_stream::TruncationReason;
use scalpel_test_utils::{
    create_landing_page_manifest, file_block, setup_planning_pipeline, setup_test_pipeline,
    split_every, ScriptedOracle, ScriptedReply, HERO_SOURCE,
};

const DARK_HEADER: &str = "export default function Header() {
  return (
    <header className=\"bg-black text-white\">
      <nav>Acme</nav>
    </header>
  )
}";

#[tokio::test]
async fn surgical_edit_targets_evidence_line() {
    let oracle = ScriptedOracle::new();
    oracle.push_plan(Ok(r#"```json
{"editType": "UPDATE_STYLE", "reasoning": "header colour", "searchTerms": ["bg-gray-900"]}
```"#
        .to_string()));
    oracle.push_reply(ScriptedReply::Chunks(split_every(
        &file_block("src/components/Header.jsx", DARK_HEADER),
        16,
    )));

    let pipeline = setup_planning_pipeline(oracle.clone());
    let session = SessionHandle::new().with_sandbox("sbx-1");
    let outcome = pipeline
        .run(&session, "make the header background black", &create_landing_page_manifest())
        .await;

    assert_eq!(outcome.resolution, ResolutionPath::Surgical);
    assert_eq!(outcome.intent.edit_type, EditType::UpdateStyle);
    let target = outcome.target.as_ref().unwrap();
    assert_eq!(target.file_path, "src/components/Header.jsx");
    assert_eq!(target.line_number, 3);
    assert!(outcome.is_clean());
    assert_eq!(outcome.file("src/components/Header.jsx").unwrap().content, DARK_HEADER);

    let planning = oracle.planning_requests();
    assert_eq!(planning.len(), 1);
    assert_eq!(planning[0].session.sandbox_id.as_deref(), Some("sbx-1"));
    assert!(planning[0].file_summary.contains("src/components/Header.jsx"));

    let generation = oracle.generation_requests();
    assert_eq!(generation.len(), 1);
    assert_eq!(generation[0].purpose, GenerationPurpose::SurgicalEdit);
    assert_eq!(generation[0].required_files, vec!["src/components/Header.jsx"]);
    assert!(generation[0].user.contains("bg-gray-900"));
}

#[tokio::test]
async fn removal_prefers_rendered_line() {
    let oracle = ScriptedOracle::new();
    oracle.push_plan(Ok(
        r#"{"editType": "UPDATE_COMPONENT", "searchTerms": ["Get Started"]}"#.to_string(),
    ));
    oracle.push_reply(ScriptedReply::text(file_block(
        "src/components/Hero.jsx",
        &HERO_SOURCE.replace("      <button>Get Started</button>\n", ""),
    )));

    let outcome = setup_planning_pipeline(oracle)
        .run(
            &SessionHandle::new(),
            "remove the \"Get Started\" button",
            &create_landing_page_manifest(),
        )
        .await;

    let target = outcome.target.as_ref().unwrap();
    assert_eq!(target.file_path, "src/components/Hero.jsx");
    assert_eq!(target.line_number, 5);
    assert!(!outcome.file("src/components/Hero.jsx").unwrap().content.contains("Get Started"));
}

#[tokio::test]
async fn truncated_file_recovered_and_others_kept() {
    let truncated = format!(
        "I updated both components.\n{}\n<file path=\"src/components/Header.jsx\">\nexport default function Header() {{\n  return (\n    <header className=\"bg-black",
        file_block("src/components/Footer.jsx", "export default function Footer() {\n  return <footer>2026 Acme</footer>\n}"),
    );
    let oracle = ScriptedOracle::with_replies(vec![
        ScriptedReply::Chunks(split_every(&truncated, 7)),
        ScriptedReply::text(format!(
            "```jsx\n{DARK_HEADER}\n```"
        )),
    ]);

    let outcome = setup_test_pipeline(oracle.clone())
        .run(&SessionHandle::new(), "make the header background black", &create_landing_page_manifest())
        .await;

    assert_eq!(outcome.recoveries.len(), 1);
    assert_eq!(outcome.recoveries[0].path, "src/components/Header.jsx");
    assert!(matches!(
        outcome.recoveries[0].trigger,
        TruncationReason::UnclosedBlock { opened: 2, closed: 1 }
    ));
    assert_eq!(outcome.recoveries[0].status, RecoveryStatus::Recovered);
    assert!(outcome.warnings.is_empty());
    assert_eq!(outcome.file("src/components/Header.jsx").unwrap().content, DARK_HEADER);
    assert!(outcome.file("src/components/Footer.jsx").unwrap().complete);
    assert_eq!(outcome.extraction.commentary, "I updated both components.");

    let requests = oracle.generation_requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[1].user.contains("bg-black"));
}

#[tokio::test]
async fn each_truncated_file_recovered_at_most_once() {
    let cut = "<file path=\"src/components/Hero.jsx\">\nexport default function Hero() {\n  return <section";
    let oracle = ScriptedOracle::with_replies(vec![
        ScriptedReply::text(cut),
        ScriptedReply::text(cut),
        ScriptedReply::text(file_block("src/components/Hero.jsx", HERO_SOURCE)),
    ]);

    let outcome = setup_test_pipeline(oracle.clone())
        .run(&SessionHandle::new(), "change the hero title", &create_landing_page_manifest())
        .await;

    assert_eq!(oracle.generation_requests().len(), 2);
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].reason, TruncationReason::RecoveryIncomplete);
    assert!(!outcome.file("src/components/Hero.jsx").unwrap().complete);
}

#[tokio::test]
async fn interrupted_stream_keeps_closed_files_and_recovers_open_one() {
    let oracle = ScriptedOracle::with_replies(vec![
        ScriptedReply::Interrupted(
            vec![
                file_block("src/components/Footer.jsx", "export default function Footer() {\n  return <footer>Acme</footer>\n}"),
                "<file path=\"src/components/Header.jsx\">\nexport default function Header() {".to_string(),
            ],
            OracleError::Transport("connection reset".into()),
        ),
        ScriptedReply::Refused(OracleError::Timeout {
            operation: "generation",
            secs: 30,
        }),
    ]);

    let outcome = setup_test_pipeline(oracle)
        .run(&SessionHandle::new(), "make the header background black", &create_landing_page_manifest())
        .await;

    assert!(outcome.file("src/components/Footer.jsx").unwrap().complete);
    assert!(!outcome.file("src/components/Header.jsx").unwrap().complete);
    assert_eq!(outcome.errors.len(), 2);
    assert!(matches!(outcome.errors[0], PipelineError::Stream { chunks: 2, .. }));
    assert!(matches!(outcome.errors[1], PipelineError::Recovery { .. }));
    assert!(outcome.errors.iter().all(PipelineError::is_retryable));
    assert!(matches!(
        outcome.recoveries[0].status,
        RecoveryStatus::Failed { .. }
    ));
}

#[tokio::test]
async fn unusable_plan_falls_back_to_classifier() {
    let oracle = ScriptedOracle::new();
    oracle.push_plan(Ok("I could not find anything relevant.".to_string()));
    oracle.push_reply(ScriptedReply::text(file_block(
        "src/components/Header.jsx",
        DARK_HEADER,
    )));

    let outcome = setup_planning_pipeline(oracle.clone())
        .run(&SessionHandle::new(), "make the header background black", &create_landing_page_manifest())
        .await;

    assert_eq!(outcome.resolution, ResolutionPath::Classifier);
    assert!(matches!(outcome.error(), Some(PipelineError::InvalidPlan(_))));
    assert_eq!(outcome.intent.target_files, vec!["src/components/Header.jsx"]);
    assert_eq!(
        oracle.generation_requests()[0].purpose,
        GenerationPurpose::IntentEdit
    );
}

#[tokio::test]
async fn new_packages_collected_from_final_files() {
    let response = format!(
        "<package>framer-motion</package>\n{}\n<command>npm run lint</command>\n<explanation>Animated the hero.</explanation>",
        file_block(
            "src/components/Hero.jsx",
            "import { motion } from 'framer-motion'\nimport { ArrowRight } from \"@heroicons/react/24/solid\"\nimport Button from './Button'\nexport default function Hero() {\n  return <motion.section><ArrowRight /></motion.section>\n}",
        )
    );
    let oracle = ScriptedOracle::with_replies(vec![ScriptedReply::Chunks(split_every(&response, 5))]);

    let outcome = setup_test_pipeline(oracle)
        .run(&SessionHandle::new(), "animate the hero section", &create_landing_page_manifest())
        .await;

    assert_eq!(outcome.packages, vec!["framer-motion", "@heroicons/react"]);
    assert_eq!(outcome.extraction.commands, vec!["npm run lint"]);
    assert_eq!(outcome.extraction.explanation.as_deref(), Some("Animated the hero."));
}
