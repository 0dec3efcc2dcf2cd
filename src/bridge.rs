//! Message and script contract between a content view and its embedded renderer.
//!
//! The renderer posts named messages (`leftTap`, `centerTap`, `rightTap`,
//! `didLoad`, `updateProgression`) and exposes script functions the host
//! calls (`scrollLeft()`, `scrollRight()`, `scrollToPosition(p)`,
//! `scrollToId(id)`). Script results arrive later, tagged with the
//! [`ScriptTicket`] issued for the request.

use core::fmt;

/// Message names the renderer bridge posts.
pub const BRIDGE_MESSAGE_NAMES: [&str; 5] = [
    "leftTap",
    "centerTap",
    "rightTap",
    "didLoad",
    "updateProgression",
];

/// Identity of one materialized content view.
///
/// Ids are never reused, so results addressed to a torn-down view cannot
/// reach its replacement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewId(pub u64);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

/// Handle for one in-flight script evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScriptTicket {
    /// View that issued the evaluation.
    pub view: ViewId,
    /// Per-view sequence number.
    pub seq: u64,
}

/// Script functions exposed by the renderer.
#[derive(Clone, Debug, PartialEq)]
pub enum ScriptCall {
    /// Scroll one screen towards the leading edge; resolves to `"edge"` when
    /// already there.
    ScrollLeft,
    /// Scroll one screen towards the trailing edge; resolves to `"edge"` when
    /// already there.
    ScrollRight,
    /// Seek to a fractional progression in `[0, 1]`.
    ScrollToPosition(f64),
    /// Seek to the element with the given id.
    ScrollToId(String),
    /// Total scrollable width of the document.
    ScrollWidth,
}

impl ScriptCall {
    /// Script source to evaluate in the renderer.
    pub fn script(&self) -> String {
        match self {
            ScriptCall::ScrollLeft => "scrollLeft()".into(),
            ScriptCall::ScrollRight => "scrollRight()".into(),
            ScriptCall::ScrollToPosition(position) => format!("scrollToPosition({})", position),
            ScriptCall::ScrollToId(id) => format!("scrollToId(\"{}\")", escape_script_string(id)),
            ScriptCall::ScrollWidth => "document.body.scrollWidth".into(),
        }
    }
}

fn escape_script_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out
}

/// One script evaluation handed to the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct ScriptRequest {
    pub ticket: ScriptTicket,
    pub call: ScriptCall,
}

/// Successful script result.
#[derive(Clone, Debug, PartialEq)]
pub enum ScriptValue {
    /// Completed without a value.
    Done,
    /// The scroll attempt hit the document edge.
    Edge,
    Number(f64),
    Text(String),
}

impl ScriptValue {
    /// Interpret a stringified script result.
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return ScriptValue::Done;
        }
        if trimmed == "edge" {
            return ScriptValue::Edge;
        }
        match trimmed.parse::<f64>() {
            Ok(number) => ScriptValue::Number(number),
            Err(_) => ScriptValue::Text(trimmed.into()),
        }
    }
}

/// Script evaluation failure reported by the renderer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptError {
    pub message: String,
}

impl ScriptError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "script evaluation failed: {}", self.message)
    }
}

impl std::error::Error for ScriptError {}

/// Message posted by the renderer bridge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BridgeMessage {
    LeftTap,
    CenterTap,
    RightTap,
    DidLoad,
    /// Raw progression payload, expected to be a stringified `f64`.
    UpdateProgression(String),
}

impl BridgeMessage {
    /// Decode a named bridge message; unknown names yield `None`.
    pub fn parse(name: &str, body: &str) -> Option<Self> {
        match name {
            "leftTap" => Some(BridgeMessage::LeftTap),
            "centerTap" => Some(BridgeMessage::CenterTap),
            "rightTap" => Some(BridgeMessage::RightTap),
            "didLoad" => Some(BridgeMessage::DidLoad),
            "updateProgression" => Some(BridgeMessage::UpdateProgression(body.into())),
            _ => None,
        }
    }
}

/// Embedded document renderer backing one content view.
pub trait DocumentRenderer {
    /// Start loading the document at `url`.
    fn load(&mut self, url: &str);

    /// Start delivering the named bridge messages.
    fn register_bridge(&mut self, names: &[&str]);

    /// Stop delivering the named bridge messages.
    fn unregister_bridge(&mut self, names: &[&str]);

    /// Queue a script evaluation. The result is delivered later through
    /// [`crate::ContentView::handle_script_result`] with the same ticket.
    fn evaluate(&mut self, request: ScriptRequest);
}

/// Creates a fresh renderer for each materialized content view.
pub trait RendererFactory {
    type Renderer: DocumentRenderer;

    fn create_renderer(&mut self) -> Self::Renderer;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_message_parse() {
        assert_eq!(BridgeMessage::parse("leftTap", ""), Some(BridgeMessage::LeftTap));
        assert_eq!(
            BridgeMessage::parse("updateProgression", "0.25"),
            Some(BridgeMessage::UpdateProgression("0.25".into()))
        );
        assert_eq!(BridgeMessage::parse("pinch", ""), None);
        assert!(BRIDGE_MESSAGE_NAMES.contains(&"didLoad"));
    }

    #[test]
    fn test_script_source() {
        assert_eq!(ScriptCall::ScrollToPosition(0.5).script(), "scrollToPosition(0.5)");
        assert_eq!(
            ScriptCall::ScrollToId("a\"b".into()).script(),
            "scrollToId(\"a\\\"b\")"
        );
        assert_eq!(ScriptCall::ScrollLeft.script(), "scrollLeft()");
    }

    #[test]
    fn test_script_value_from_text() {
        assert_eq!(ScriptValue::from_text("edge"), ScriptValue::Edge);
        assert_eq!(ScriptValue::from_text("1280"), ScriptValue::Number(1280.0));
        assert_eq!(ScriptValue::from_text(""), ScriptValue::Done);
        assert_eq!(ScriptValue::from_text("ok"), ScriptValue::Text("ok".into()));
    }
}
