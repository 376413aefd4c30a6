//! Deliberation progress renderer
//!
//! Round, sub-problem, phase and convergence updates are short status lines.
//! Missing payload fields degrade the line rather than failing the render.

use crate::error::RenderError;
use crate::event::Event;
use crate::renderer::{humanize_event_type, Renderer};
use crate::renderers::time_label;
use crate::view::{Block, View};
use serde_json::Value;

/// Renders progress and lifecycle events
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressRenderer;

impl ProgressRenderer {
    /// Renderer name
    pub const NAME: &'static str = "progress";
}

fn number_label(event: &Event, fields: &[&str]) -> Option<u64> {
    fields.iter().find_map(|field| event.u64_field(field))
}

fn render_round(event: &Event) -> (String, Vec<Block>) {
    let title = match number_label(event, &["round", "round_number"]) {
        Some(round) => format!("Round {round} started"),
        None => "Round started".to_string(),
    };
    (title, Vec::new())
}

fn render_subproblem(event: &Event) -> (String, Vec<Block>) {
    let title = match number_label(event, &["sub_problem_index", "index"]) {
        Some(index) => format!("Sub-problem {}", index.saturating_add(1)),
        None => "Sub-problem started".to_string(),
    };
    let blocks = event
        .str_field("goal")
        .map(|goal| vec![Block::text(goal)])
        .unwrap_or_default();
    (title, blocks)
}

fn render_phase(event: &Event) -> (String, Vec<Block>) {
    let title = match event.str_field("phase") {
        Some(phase) => format!("Phase: {}", humanize_event_type(phase)),
        None => "Phase changed".to_string(),
    };
    (title, Vec::new())
}

fn render_convergence(event: &Event) -> (String, Vec<Block>) {
    let mut fields = Vec::new();
    if let Some(score) = event.data.get("score").and_then(Value::as_f64) {
        fields.push(("Score".to_string(), format!("{score:.2}")));
    }
    if let Some(stop) = event.data.get("should_stop").and_then(Value::as_bool) {
        let label = if stop { "converged" } else { "continuing" };
        fields.push(("Status".to_string(), label.to_string()));
    }
    let blocks = if fields.is_empty() {
        Vec::new()
    } else {
        vec![Block::Fields { fields }]
    };
    ("Convergence check".to_string(), blocks)
}

fn render_complete(event: &Event) -> (String, Vec<Block>) {
    let mut fields = Vec::new();
    if let Some(rounds) = number_label(event, &["total_rounds", "rounds"]) {
        fields.push(("Rounds".to_string(), rounds.to_string()));
    }
    if let Some(reason) = event.str_field("stop_reason") {
        fields.push(("Stopped".to_string(), humanize_event_type(reason)));
    }
    if let Some(cost) = event.data.get("total_cost").and_then(Value::as_f64) {
        fields.push(("Cost".to_string(), format!("${cost:.4}")));
    }
    let blocks = if fields.is_empty() {
        Vec::new()
    } else {
        vec![Block::Fields { fields }]
    };
    ("Deliberation complete".to_string(), blocks)
}

impl Renderer for ProgressRenderer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn render(&self, event: &Event) -> Result<View, RenderError> {
        let (title, blocks) = match event.event_type.as_str() {
            "round_started" => render_round(event),
            "subproblem_started" => render_subproblem(event),
            "phase_changed" => render_phase(event),
            "convergence_checked" => render_convergence(event),
            "deliberation_complete" => render_complete(event),
            other => (humanize_event_type(other), Vec::new()),
        };

        let mut view = View::new(Self::NAME, title);
        view.subtitle = time_label(event);
        view.blocks = blocks;
        Ok(view)
    }
}
