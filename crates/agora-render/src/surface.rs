//! Event rendering surface
//!
//! Holds the retained window of events in arrival order. Each pushed event
//! gets a slot immediately; its renderer resolution runs concurrently with
//! every other slot's and fills the slot in place when it settles.
//!
//! # Slot lifecycle
//!
//! ```text
//! Idle ──push──► Resolving ─┬─ Loaded, render ok      → Rendered
//!                           ├─ Loaded, render err     → FallbackShown(RenderFailed)
//!                           └─ Fallback(cause)        → FallbackShown(cause)
//! ```
//!
//! Terminal states never change. A slot dropped from the window discards its
//! resolution when it eventually settles.

use crate::config::FeedConfig;
use crate::error::{ConfigError, RenderError};
use crate::event::Event;
use crate::registry::RendererRegistry;
use crate::renderer::{humanize_event_type, FallbackRenderer, Renderer};
use crate::resolver::{FallbackCause, RendererResolver, Resolution};
use crate::view::View;
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use std::any::Any;
use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Renderer name recorded on placeholder views
pub const PLACEHOLDER: &str = "placeholder";

/// Identifier of a slot, increasing in arrival order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SlotId(u64);

impl SlotId {
    /// Raw sequence number
    #[inline]
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Why a slot shows the fallback view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum FallbackReason {
    /// No renderer registered for the event type
    UnknownType,
    /// The renderer failed to load
    LoadFailed,
    /// The renderer returned an error or panicked
    RenderFailed(String),
}

impl From<FallbackCause> for FallbackReason {
    fn from(cause: FallbackCause) -> Self {
        match cause {
            FallbackCause::UnknownType => FallbackReason::UnknownType,
            FallbackCause::LoadFailed => FallbackReason::LoadFailed,
        }
    }
}

/// Per-event render state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderState {
    /// Slot reserved, resolution not started
    Idle,
    /// Waiting for the renderer
    Resolving,
    /// Rendered by a type-specific renderer
    Rendered(View),
    /// Rendered by the fallback renderer
    FallbackShown {
        /// Fallback view
        view: View,
        /// What sent the event to the fallback
        reason: FallbackReason,
    },
}

impl RenderState {
    /// True for `Rendered` and `FallbackShown`
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, RenderState::Rendered(_) | RenderState::FallbackShown { .. })
    }

    /// Short state label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            RenderState::Idle => "idle",
            RenderState::Resolving => "resolving",
            RenderState::Rendered(_) => "rendered",
            RenderState::FallbackShown { .. } => "fallback",
        }
    }
}

/// One retained event as handed to the display layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotView {
    /// Slot identifier
    pub slot: SlotId,
    /// Event type tag
    pub event_type: String,
    /// State label, see [`RenderState::label`]
    pub state: &'static str,
    /// Fallback cause, for fallback slots
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FallbackReason>,
    /// Placeholder or rendered view
    pub view: View,
}

struct Slot {
    id: SlotId,
    event: Event,
    state: RenderState,
}

type PendingResolution = BoxFuture<'static, (SlotId, Resolution)>;

/// Ordered, windowed event feed
pub struct RenderingSurface {
    resolver: RendererResolver,
    fallback: FallbackRenderer,
    slots: VecDeque<Slot>,
    pending: FuturesUnordered<PendingResolution>,
    next_id: u64,
    retain_window: usize,
}

impl fmt::Debug for RenderingSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderingSurface")
            .field("slots", &self.slots.len())
            .field("pending", &self.pending.len())
            .field("retain_window", &self.retain_window)
            .field("resolver", &self.resolver)
            .finish()
    }
}

impl RenderingSurface {
    /// Create surface retaining at most `retain_window` events (minimum 1)
    #[must_use]
    pub fn new(resolver: RendererResolver, retain_window: usize) -> Self {
        Self {
            resolver,
            fallback: FallbackRenderer,
            slots: VecDeque::new(),
            pending: FuturesUnordered::new(),
            next_id: 0,
            retain_window: retain_window.max(1),
        }
    }

    /// Create surface and resolver from configuration
    ///
    /// # Errors
    /// - `ConfigError::InvalidValue` if the configuration does not validate
    pub fn from_config(registry: RendererRegistry, config: &FeedConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let resolver = RendererResolver::from_config(registry, config)?;
        Ok(Self::new(resolver, config.retain_window))
    }

    /// Append an event and start resolving its renderer
    ///
    /// Cached renderers render before this returns.
    pub fn push(&mut self, event: Event) -> SlotId {
        let id = SlotId(self.next_id);
        self.next_id += 1;

        let mut resolution = self.resolver.resolve(&event.event_type);
        self.slots.push_back(Slot {
            id,
            event,
            state: RenderState::Idle,
        });
        self.trim_window();

        if let Some(slot) = self.slot_mut(id) {
            slot.state = RenderState::Resolving;
        }
        match (&mut resolution).now_or_never() {
            Some(resolved) => {
                self.apply(id, resolved);
            }
            None => self.pending.push(resolution.map(move |resolved| (id, resolved)).boxed()),
        }
        id
    }

    /// Push several events in order
    pub fn extend<I: IntoIterator<Item = Event>>(&mut self, events: I) -> Vec<SlotId> {
        events.into_iter().map(|event| self.push(event)).collect()
    }

    /// Wait for the next resolution that lands in a retained slot
    ///
    /// Returns `None` once nothing is pending.
    pub async fn next_settled(&mut self) -> Option<SlotId> {
        while let Some((id, resolution)) = self.pending.next().await {
            if self.apply(id, resolution) {
                return Some(id);
            }
        }
        None
    }

    /// Apply every resolution that is already complete, without waiting
    pub fn drain_ready(&mut self) -> Vec<SlotId> {
        let mut settled = Vec::new();
        while let Some(Some((id, resolution))) = self.pending.next().now_or_never() {
            if self.apply(id, resolution) {
                settled.push(id);
            }
        }
        settled
    }

    /// Drive every pending resolution to completion
    ///
    /// A load that never completes keeps this from returning; use
    /// [`RenderingSurface::drain_ready`] when that matters.
    pub async fn settle_all(&mut self) -> usize {
        let mut settled = 0;
        while self.next_settled().await.is_some() {
            settled += 1;
        }
        settled
    }

    /// Retained events in arrival order
    #[must_use]
    pub fn views(&self) -> Vec<SlotView> {
        self.slots
            .iter()
            .map(|slot| {
                let (view, fallback) = match &slot.state {
                    RenderState::Idle | RenderState::Resolving => (placeholder(&slot.event), None),
                    RenderState::Rendered(view) => (view.clone(), None),
                    RenderState::FallbackShown { view, reason } => (view.clone(), Some(reason.clone())),
                };
                SlotView {
                    slot: slot.id,
                    event_type: slot.event.event_type.clone(),
                    state: slot.state.label(),
                    fallback,
                    view,
                }
            })
            .collect()
    }

    /// State of a retained slot
    #[must_use]
    pub fn state(&self, id: SlotId) -> Option<&RenderState> {
        self.slot(id).map(|slot| &slot.state)
    }

    /// Event held by a retained slot
    #[must_use]
    pub fn event(&self, id: SlotId) -> Option<&Event> {
        self.slot(id).map(|slot| &slot.event)
    }

    /// Number of retained slots
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if no slots are retained
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Resolutions not yet applied, including those of dropped slots
    #[inline]
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// The resolver shared by this surface
    #[must_use]
    pub fn resolver(&self) -> &RendererResolver {
        &self.resolver
    }

    fn slot(&self, id: SlotId) -> Option<&Slot> {
        let front = self.slots.front()?.id.0;
        let index = usize::try_from(id.0.checked_sub(front)?).ok()?;
        self.slots.get(index)
    }

    fn slot_mut(&mut self, id: SlotId) -> Option<&mut Slot> {
        let front = self.slots.front()?.id.0;
        let index = usize::try_from(id.0.checked_sub(front)?).ok()?;
        self.slots.get_mut(index)
    }

    fn trim_window(&mut self) {
        while self.slots.len() > self.retain_window {
            if let Some(dropped) = self.slots.pop_front() {
                tracing::debug!(slot = %dropped.id, state = dropped.state.label(), "slot left retained window");
            }
        }
    }

    /// Fill a slot from its resolution; false if the slot is gone
    fn apply(&mut self, id: SlotId, resolution: Resolution) -> bool {
        let fallback = self.fallback;
        let Some(slot) = self.slot_mut(id) else {
            tracing::debug!(slot = %id, "discarding resolution for dropped slot");
            return false;
        };
        if slot.state.is_terminal() {
            return false;
        }

        slot.state = match resolution {
            Resolution::Loaded(renderer) => match render_guarded(&renderer, &slot.event) {
                Ok(view) => RenderState::Rendered(view),
                Err(error) => {
                    tracing::warn!(
                        slot = %id,
                        event_type = %slot.event.event_type,
                        renderer = renderer.name(),
                        %error,
                        "render failed, showing fallback"
                    );
                    RenderState::FallbackShown {
                        view: fallback.render_event(&slot.event),
                        reason: FallbackReason::RenderFailed(error.to_string()),
                    }
                }
            },
            Resolution::Fallback(cause) => {
                if cause == FallbackCause::LoadFailed {
                    tracing::warn!(slot = %id, event_type = %slot.event.event_type, "renderer unavailable, showing fallback");
                }
                RenderState::FallbackShown {
                    view: fallback.render_event(&slot.event),
                    reason: cause.into(),
                }
            }
        };
        true
    }
}

fn placeholder(event: &Event) -> View {
    View::new(PLACEHOLDER, humanize_event_type(&event.event_type)).with_subtitle("Loading…")
}

fn render_guarded(renderer: &Arc<dyn Renderer>, event: &Event) -> Result<View, RenderError> {
    panic::catch_unwind(AssertUnwindSafe(|| renderer.render(event)))
        .unwrap_or_else(|payload| Err(RenderError::Panicked(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
