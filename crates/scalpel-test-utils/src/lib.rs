//! Testing utilities for Scalpel workspace
//!
//! Shared fixtures, scripted oracles and chunking helpers.

#![allow(missing_docs)]

use async_trait::async_trait;
use futures::{stream, StreamExt};
use scalpel_core::{
    ChunkStream, EditConfig, EditPipeline, GenerationOracle, GenerationRequest, OracleError,
    PlanningOracle, PlanningRequest,
};
use scalpel_model::{ComponentInfo, FileInfo, FileKind, FileManifest};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const HEADER_SOURCE: &str = "export default function Header() {
  return (
    <header className=\"bg-gray-900 text-white\">
      <nav>Acme</nav>
    </header>
  )
}";

pub const HERO_SOURCE: &str = "export default function Hero() {
  return (
    <section className=\"hero\">
      <h1>Build faster</h1>
      <button>Get Started</button>
    </section>
  )
}";

pub const FOOTER_SOURCE: &str = "export default function Footer() {
  return <footer>Copyright Acme</footer>
}";

pub const APP_SOURCE: &str = "import Header from './components/Header'
import Hero from './components/Hero'
import Footer from './components/Footer'

export default function App() {
  return (
    <>
      <Header />
      <Hero />
      <Footer />
    </>
  )
}";

pub fn component_file(name: &str, source: &str) -> FileInfo {
    FileInfo::new(source, FileKind::Component).with_component(ComponentInfo::new(name))
}

/// Small landing page: App renders Header, Hero and Footer
pub fn create_landing_page_manifest() -> FileManifest {
    FileManifest::new()
        .with_file(
            "src/App.jsx",
            FileInfo::new(APP_SOURCE, FileKind::Component).with_component(
                ComponentInfo::new("App").with_children(vec![
                    "Header".into(),
                    "Hero".into(),
                    "Footer".into(),
                ]),
            ),
        )
        .with_file("src/components/Header.jsx", component_file("Header", HEADER_SOURCE))
        .with_file("src/components/Hero.jsx", component_file("Hero", HERO_SOURCE))
        .with_file("src/components/Footer.jsx", component_file("Footer", FOOTER_SOURCE))
        .with_file(
            "src/index.css",
            FileInfo::new("body { margin: 0; }", FileKind::Style),
        )
        .with_file(
            "package.json",
            FileInfo::new("{\"dependencies\":{\"react\":\"^18.2.0\"}}", FileKind::Config),
        )
        .with_entry_point("src/App.jsx")
}

/// Wrap `path` and `content` in a file block
pub fn file_block(path: &str, content: &str) -> String {
    format!("<file path=\"{path}\">\n{content}\n</file>")
}

/// Split `text` at byte offsets, moving each offset back to a char boundary
pub fn split_at_offsets(text: &str, offsets: &[usize]) -> Vec<String> {
    let mut cuts: Vec<usize> = offsets
        .iter()
        .map(|&offset| {
            let mut cut = offset.min(text.len());
            while !text.is_char_boundary(cut) {
                cut -= 1;
            }
            cut
        })
        .collect();
    cuts.sort_unstable();
    cuts.dedup();

    let mut chunks = Vec::new();
    let mut start = 0;
    for cut in cuts {
        if cut > start {
            chunks.push(text[start..cut].to_string());
            start = cut;
        }
    }
    chunks.push(text[start..].to_string());
    chunks
}

/// Split `text` into chunks of about `size` bytes
pub fn split_every(text: &str, size: usize) -> Vec<String> {
    let offsets: Vec<usize> = (1..=text.len() / size.max(1))
        .map(|i| i * size.max(1))
        .collect();
    split_at_offsets(text, &offsets)
}

/// One scripted generation reply
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Stream these chunks, then end
    Chunks(Vec<String>),
    /// Stream these chunks, then fail
    Interrupted(Vec<String>, OracleError),
    /// Refuse to start
    Refused(OracleError),
}

impl ScriptedReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Chunks(vec![text.into()])
    }
}

/// Oracle replaying queued replies and recording every request
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    plans: Mutex<VecDeque<Result<String, OracleError>>>,
    replies: Mutex<VecDeque<ScriptedReply>>,
    planning_requests: Mutex<Vec<PlanningRequest>>,
    generation_requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedOracle {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_replies(replies: Vec<ScriptedReply>) -> Arc<Self> {
        let oracle = Self::default();
        oracle.replies.lock().unwrap().extend(replies);
        Arc::new(oracle)
    }

    pub fn push_plan(&self, plan: Result<String, OracleError>) {
        self.plans.lock().unwrap().push_back(plan);
    }

    pub fn push_reply(&self, reply: ScriptedReply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn planning_requests(&self) -> Vec<PlanningRequest> {
        self.planning_requests.lock().unwrap().clone()
    }

    pub fn generation_requests(&self) -> Vec<GenerationRequest> {
        self.generation_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlanningOracle for ScriptedOracle {
    async fn plan(&self, request: &PlanningRequest) -> Result<String, OracleError> {
        self.planning_requests.lock().unwrap().push(request.clone());
        self.plans
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(OracleError::Unavailable("no scripted plan".into())))
    }
}

#[async_trait]
impl GenerationOracle for ScriptedOracle {
    async fn generate(&self, request: &GenerationRequest) -> Result<ChunkStream, OracleError> {
        self.generation_requests.lock().unwrap().push(request.clone());
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(ScriptedReply::Chunks(chunks)) => {
                Ok(stream::iter(chunks.into_iter().map(Ok)).boxed())
            }
            Some(ScriptedReply::Interrupted(chunks, error)) => Ok(stream::iter(
                chunks
                    .into_iter()
                    .map(Ok)
                    .chain(std::iter::once(Err(error))),
            )
            .boxed()),
            Some(ScriptedReply::Refused(error)) => Err(error),
            None => Err(OracleError::Unavailable("no scripted reply".into())),
        }
    }
}

/// Pipeline generating with `oracle` and no planner
pub fn setup_test_pipeline(oracle: Arc<ScriptedOracle>) -> EditPipeline {
    EditPipeline::new(oracle, EditConfig::new()).unwrap()
}

/// Pipeline planning and generating with `oracle`
pub fn setup_planning_pipeline(oracle: Arc<ScriptedOracle>) -> EditPipeline {
    let planner: Arc<dyn PlanningOracle> = oracle.clone();
    setup_test_pipeline(oracle).with_planner(planner)
}
