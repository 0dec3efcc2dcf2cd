//! A single spine item shown through an embedded document renderer.
//!
//! The view turns bridge messages into navigation intents, tracks the
//! fractional scroll progression of its document, seeks to its initial
//! position once the document has loaded, and decides what happens to link
//! taps. Script evaluations are asynchronous: every request carries a
//! [`ScriptTicket`], and results arriving after [`ContentView::detach`] are
//! ignored.

use smallvec::SmallVec;

use crate::bridge::{
    BridgeMessage, DocumentRenderer, ScriptCall, ScriptError, ScriptRequest, ScriptTicket,
    ScriptValue, ViewId, BRIDGE_MESSAGE_NAMES,
};
use crate::link::{BaseUrl, LinkTarget};
use crate::location::Location;

/// Position to seek a view to.
#[derive(Clone, Debug, PartialEq)]
pub enum SeekTarget {
    /// Element id inside the document. An empty id means the beginning.
    Anchor(String),
    /// Fractional progression in `[0, 1]`.
    Fraction(f64),
    /// Leading or trailing edge.
    Edge(Location),
}

/// Intent raised by a content view for its owner.
#[derive(Clone, Debug, PartialEq)]
pub enum ContentEvent {
    /// Left tap at the leading edge of the document.
    PreviousDocument,
    /// Right tap at the trailing edge of the document.
    NextDocument,
    /// Tap in the middle zone.
    CenterTap,
    /// New progression reported by the renderer, already validated.
    ProgressionChanged(f64),
    /// Internal link tap: href relative to the publication base URL.
    JumpToHref(String),
    /// External web link tap.
    OpenExternal(String),
}

/// Origin of a navigation attempt inside the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigationKind {
    /// The user activated a link.
    LinkActivated,
    /// Loads issued by the host or the renderer itself.
    Other,
}

/// Navigation attempt to vet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationRequest {
    pub url: String,
    pub kind: NavigationKind,
}

impl NavigationRequest {
    pub fn link(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: NavigationKind::LinkActivated,
        }
    }

    pub fn other(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: NavigationKind::Other,
        }
    }
}

/// Verdict for a navigation attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigationPolicy {
    Allow,
    Cancel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PendingScript {
    TapBackward,
    TapForward,
    ScrollWidth,
}

/// Content view wrapping one renderer.
#[derive(Debug)]
pub struct ContentView<R> {
    id: ViewId,
    spine_index: usize,
    url: String,
    base_url: BaseUrl,
    renderer: R,
    page_width: f64,
    initial_location: Location,
    initial_position_override: Option<f64>,
    initial_anchor_id: Option<String>,
    document_loaded: bool,
    progression: f64,
    total_screens: usize,
    attached: bool,
    next_seq: u64,
    pending: SmallVec<[(u64, PendingScript); 4]>,
}

impl<R: DocumentRenderer> ContentView<R> {
    /// Create a view for the spine item at `spine_index`, shown at
    /// `initial_location` once loaded. Call [`ContentView::load`] to start
    /// rendering.
    pub fn new(
        id: ViewId,
        spine_index: usize,
        url: impl Into<String>,
        base_url: BaseUrl,
        initial_location: Location,
        renderer: R,
        page_width: f64,
    ) -> Self {
        Self {
            id,
            spine_index,
            url: url.into(),
            base_url,
            renderer,
            page_width,
            initial_location,
            initial_position_override: None,
            initial_anchor_id: None,
            document_loaded: false,
            progression: 0.0,
            total_screens: 0,
            attached: false,
            next_seq: 0,
            pending: SmallVec::new(),
        }
    }

    /// Ask the renderer to load the document.
    pub fn load(&mut self) {
        log::debug!("{} loading spine item {}: {}", self.id, self.spine_index, self.url);
        self.renderer.load(&self.url);
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn spine_index(&self) -> usize {
        self.spine_index
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn initial_location(&self) -> Location {
        self.initial_location
    }

    pub fn initial_position_override(&self) -> Option<f64> {
        self.initial_position_override
    }

    pub fn initial_anchor_id(&self) -> Option<&str> {
        self.initial_anchor_id.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.document_loaded
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Last progression reported by the renderer, in `[0, 1]`.
    pub fn progression(&self) -> f64 {
        self.progression
    }

    /// Screens needed to show the whole document, `0` until measured.
    pub fn total_screens(&self) -> usize {
        self.total_screens
    }

    /// Number of script evaluations still awaiting a result.
    pub fn pending_scripts(&self) -> usize {
        self.pending.len()
    }

    /// Fractional position to seek to on load, overriding the location.
    pub fn set_initial_position_override(&mut self, progression: f64) {
        self.initial_position_override = Some(progression);
    }

    /// Anchor to seek to on load, overriding everything else.
    pub fn set_initial_anchor_id(&mut self, id: impl Into<String>) {
        self.initial_anchor_id = Some(id.into());
    }

    /// Start receiving bridge messages.
    pub fn attach(&mut self) {
        if self.attached {
            return;
        }
        self.renderer.register_bridge(&BRIDGE_MESSAGE_NAMES);
        self.attached = true;
    }

    /// Stop receiving bridge messages and forget in-flight evaluations.
    pub fn detach(&mut self) {
        if !self.attached {
            return;
        }
        self.renderer.unregister_bridge(&BRIDGE_MESSAGE_NAMES);
        self.attached = false;
        self.pending.clear();
    }

    /// Only evaluations with a `purpose` await a result; seeks pass `None`.
    fn evaluate(&mut self, call: ScriptCall, purpose: Option<PendingScript>) {
        let ticket = ScriptTicket {
            view: self.id,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        if let Some(purpose) = purpose {
            self.pending.push((ticket.seq, purpose));
        }
        log::trace!("{} evaluating {}", self.id, call.script());
        self.renderer.evaluate(ScriptRequest { ticket, call });
    }

    /// Handle a bridge message from the renderer.
    pub fn handle_message(&mut self, message: BridgeMessage) -> Option<ContentEvent> {
        if !self.attached {
            log::debug!("{} dropped {:?} while detached", self.id, message);
            return None;
        }
        match message {
            BridgeMessage::LeftTap => {
                self.evaluate(ScriptCall::ScrollLeft, Some(PendingScript::TapBackward));
                None
            }
            BridgeMessage::RightTap => {
                self.evaluate(ScriptCall::ScrollRight, Some(PendingScript::TapForward));
                None
            }
            BridgeMessage::CenterTap => Some(ContentEvent::CenterTap),
            BridgeMessage::DidLoad => {
                self.document_loaded = true;
                self.evaluate(ScriptCall::ScrollWidth, Some(PendingScript::ScrollWidth));
                self.scroll_to_initial_position();
                None
            }
            BridgeMessage::UpdateProgression(body) => self.update_progression(&body),
        }
    }

    fn update_progression(&mut self, body: &str) -> Option<ContentEvent> {
        let Ok(progression) = body.trim().parse::<f64>() else {
            log::debug!("{} dropped malformed progression {:?}", self.id, body);
            return None;
        };
        if !(0.0..=1.0).contains(&progression) {
            log::debug!("{} dropped out-of-range progression {}", self.id, progression);
            return None;
        }
        self.progression = progression;
        Some(ContentEvent::ProgressionChanged(progression))
    }

    /// Anchor first, then a positive override fraction, then the location.
    fn scroll_to_initial_position(&mut self) {
        if let Some(anchor) = self.initial_anchor_id.clone() {
            self.evaluate(ScriptCall::ScrollToId(anchor), None);
            return;
        }
        if let Some(progression) = self.initial_position_override.filter(|p| *p > 0.0) {
            self.evaluate(ScriptCall::ScrollToPosition(progression), None);
            return;
        }
        let progression = self.initial_location.progression();
        self.evaluate(ScriptCall::ScrollToPosition(progression), None);
    }

    /// Handle the completion of an earlier script evaluation.
    pub fn handle_script_result(
        &mut self,
        ticket: ScriptTicket,
        result: Result<ScriptValue, ScriptError>,
    ) -> Option<ContentEvent> {
        if ticket.view != self.id || !self.attached {
            log::debug!("{} ignored stale script result {:?}", self.id, ticket);
            return None;
        }
        let slot = self.pending.iter().position(|(seq, _)| *seq == ticket.seq)?;
        let (_, purpose) = self.pending.remove(slot);
        let value = match result {
            Ok(value) => value,
            Err(err) => {
                log::warn!("{} {:?}: {}", self.id, purpose, err);
                return None;
            }
        };
        match (purpose, value) {
            (PendingScript::TapBackward, ScriptValue::Edge) => Some(ContentEvent::PreviousDocument),
            (PendingScript::TapForward, ScriptValue::Edge) => Some(ContentEvent::NextDocument),
            (PendingScript::ScrollWidth, ScriptValue::Number(width)) => {
                if self.page_width > 0.0 && width.is_finite() && width >= 0.0 {
                    self.total_screens = (width / self.page_width).ceil() as usize;
                }
                None
            }
            _ => None,
        }
    }

    /// Show the leading or trailing edge, used for the outgoing view of a
    /// page turn.
    pub fn settle_at(&mut self, location: Location) {
        self.seek(SeekTarget::Edge(location));
    }

    /// Seek now when loaded, otherwise remember the target for load time.
    pub fn seek(&mut self, target: SeekTarget) {
        if self.document_loaded {
            let call = match target {
                SeekTarget::Anchor(id) if id.is_empty() => ScriptCall::ScrollToPosition(0.0),
                SeekTarget::Anchor(id) => ScriptCall::ScrollToId(id),
                SeekTarget::Fraction(progression) => match valid_fraction(progression) {
                    Some(progression) => ScriptCall::ScrollToPosition(progression),
                    None => return,
                },
                SeekTarget::Edge(location) => ScriptCall::ScrollToPosition(location.progression()),
            };
            self.evaluate(call, None);
            return;
        }
        match target {
            SeekTarget::Anchor(id) if id.is_empty() => {
                self.initial_location = Location::Beginning;
                self.initial_position_override = None;
                self.initial_anchor_id = None;
            }
            SeekTarget::Anchor(id) => self.initial_anchor_id = Some(id),
            SeekTarget::Fraction(progression) => {
                if let Some(progression) = valid_fraction(progression) {
                    self.initial_position_override = Some(progression);
                    self.initial_anchor_id = None;
                }
            }
            SeekTarget::Edge(location) => {
                self.initial_location = location;
                self.initial_position_override = None;
                self.initial_anchor_id = None;
            }
        }
    }

    /// Decide whether the renderer may follow a navigation attempt.
    ///
    /// Host and renderer loads pass through. Link taps never navigate the
    /// renderer: same-host links become [`ContentEvent::JumpToHref`], web
    /// links become [`ContentEvent::OpenExternal`], anything else is dropped.
    pub fn decide_policy(
        &self,
        request: &NavigationRequest,
    ) -> (NavigationPolicy, Option<ContentEvent>) {
        if request.kind == NavigationKind::Other {
            return (NavigationPolicy::Allow, None);
        }
        let event = match self.base_url.classify(&request.url) {
            LinkTarget::Internal(href) => Some(ContentEvent::JumpToHref(href)),
            LinkTarget::External(url) => Some(ContentEvent::OpenExternal(url)),
            LinkTarget::Unhandled => None,
        };
        (NavigationPolicy::Cancel, event)
    }
}

fn valid_fraction(progression: f64) -> Option<f64> {
    (0.0..=1.0).contains(&progression).then_some(progression)
}
