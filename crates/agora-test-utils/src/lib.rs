//! Testing utilities for the Agora workspace
//!
//! Event builders, instrumented loaders and misbehaving renderers shared by
//! the integration tests.

#![allow(missing_docs)]

use agora_render::{Event, LoadError, RenderError, Renderer, RendererLoader, View};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

pub const SCOPED_SYNTHESIS: &str = r#"{
  "recommended_actions": [
    {"action": "Migrate billing", "rationale": "Required for sub-problem 2", "priority": "high", "timeline": "Q3"},
    {"action": "Hire an SRE", "rationale": "Helps every area", "priority": "medium"}
  ],
  "executive_summary": "Proceed in two phases."
}

---"#;

pub const TAGGED_SYNTHESIS: &str = "<executive_summary>Ship it.</executive_summary>\n<rationale>Demand is proven.</rationale>";

pub const HEADING_SYNTHESIS: &str = "## Recommendation\n\nAdopt the plan.\n\n## Risks and Mitigations\n\nVendor lock-in.";

pub fn event(event_type: &str, data: Value) -> Event {
    Event::new(event_type)
        .with_data(data)
        .with_timestamp("2025-01-15T10:20:30Z")
        .with_session("test-session")
}

pub fn synthesis_event(text: &str, scope: Option<u64>) -> Event {
    let mut data = json!({ "synthesis": text });
    if let (Some(scope), Some(map)) = (scope, data.as_object_mut()) {
        map.insert("sub_problem_index".to_string(), json!(scope));
    }
    event("synthesis_complete", data)
}

pub fn contribution_event(persona: &str, content: &str, round: u64) -> Event {
    event(
        "persona_contribution",
        json!({ "persona_name": persona, "content": content, "round": round }),
    )
}

/// Renderer whose views carry a fixed title
#[derive(Debug, Clone)]
pub struct StaticRenderer {
    pub name: String,
}

impl StaticRenderer {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Renderer for StaticRenderer {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, _event: &Event) -> Result<View, RenderError> {
        Ok(View::new(self.name.clone(), self.name.clone()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FailingRenderer;

impl Renderer for FailingRenderer {
    fn name(&self) -> &str {
        "failing"
    }

    fn render(&self, _event: &Event) -> Result<View, RenderError> {
        Err(RenderError::invalid_field("data", "always fails"))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PanickingRenderer;

impl Renderer for PanickingRenderer {
    fn name(&self) -> &str {
        "panicking"
    }

    fn render(&self, _event: &Event) -> Result<View, RenderError> {
        panic!("render exploded")
    }
}

/// Counts invocations, yielding once before producing a [`StaticRenderer`]
#[derive(Debug, Clone)]
pub struct CountingLoader {
    name: String,
    calls: Arc<AtomicUsize>,
}

impl CountingLoader {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RendererLoader for CountingLoader {
    async fn load(&self) -> Result<Arc<dyn Renderer>, LoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        Ok(Arc::new(StaticRenderer::new(self.name.clone())))
    }
}

/// Fails the first `failures` calls, then behaves like [`CountingLoader`]
#[derive(Debug, Clone)]
pub struct FlakyLoader {
    name: String,
    failures: usize,
    calls: Arc<AtomicUsize>,
}

impl FlakyLoader {
    pub fn new(name: impl Into<String>, failures: usize) -> Self {
        Self {
            name: name.into(),
            failures,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RendererLoader for FlakyLoader {
    async fn load(&self) -> Result<Arc<dyn Renderer>, LoadError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if call < self.failures {
            return Err(LoadError::Unavailable(format!("{} attempt {}", self.name, call + 1)));
        }
        Ok(Arc::new(StaticRenderer::new(self.name.clone())))
    }
}

/// Blocks every load until [`GatedLoader::open`] is called
#[derive(Debug, Clone)]
pub struct GatedLoader {
    name: String,
    opened: Arc<AtomicBool>,
    gate: Arc<Notify>,
    calls: Arc<AtomicUsize>,
}

impl GatedLoader {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            opened: Arc::new(AtomicBool::new(false)),
            gate: Arc::new(Notify::new()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn open(&self) {
        self.opened.store(true, Ordering::SeqCst);
        self.gate.notify_waiters();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RendererLoader for GatedLoader {
    async fn load(&self) -> Result<Arc<dyn Renderer>, LoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        loop {
            let notified = self.gate.notified();
            if self.opened.load(Ordering::SeqCst) {
                break;
            }
            notified.await;
        }
        Ok(Arc::new(StaticRenderer::new(self.name.clone())))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PanickingLoader;

#[async_trait]
impl RendererLoader for PanickingLoader {
    async fn load(&self) -> Result<Arc<dyn Renderer>, LoadError> {
        panic!("loader exploded")
    }
}
