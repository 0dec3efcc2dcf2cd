//! Three-pane spine navigation for web-rendered EPUB readers.
//!
//! The crate is headless: the scroll container, the embedded document
//! renderer, the key-value store and the hosting UI are traits that the host
//! implements. [`TriptychView`] keeps a sliding previous/current/next window of
//! [`ContentView`]s, [`ContentView`] bridges taps, scroll progression and link
//! taps from the renderer, and [`NavigatorController`] ties both to a
//! [`Publication`] and persists the reading position.
//!
//! # Usage
//!
//! ```rust,no_run
//! use epub_triptych::{MemoryStore, NavigatorController, NavigatorOptions, Publication};
//! # use epub_triptych::{DocumentRenderer, RendererFactory, ScriptRequest, ScrollContainer};
//! # struct Renderer;
//! # impl DocumentRenderer for Renderer {
//! #     fn load(&mut self, _url: &str) {}
//! #     fn register_bridge(&mut self, _names: &[&str]) {}
//! #     fn unregister_bridge(&mut self, _names: &[&str]) {}
//! #     fn evaluate(&mut self, _request: ScriptRequest) {}
//! # }
//! # struct Renderers;
//! # impl RendererFactory for Renderers {
//! #     type Renderer = Renderer;
//! #     fn create_renderer(&mut self) -> Renderer { Renderer }
//! # }
//! # struct Pager;
//! # impl ScrollContainer for Pager {
//! #     fn page_width(&self) -> f64 { 320.0 }
//! #     fn content_offset(&self) -> f64 { 0.0 }
//! #     fn set_content_offset(&mut self, _x: f64, _animated: bool) {}
//! #     fn set_page_count(&mut self, _pages: usize) {}
//! # }
//!
//! # fn example() -> Result<(), epub_triptych::NavigatorError> {
//! let publication = Publication::new(
//!     "urn:isbn:9780000000000",
//!     "http://localhost:8080/book/",
//!     ["ch1.xhtml", "ch2.xhtml", "ch3.xhtml"],
//! )?;
//! let mut navigator = NavigatorController::new(
//!     publication,
//!     Renderers,
//!     Pager,
//!     MemoryStore::new(),
//!     NavigatorOptions::default(),
//! )?;
//! navigator.layout();
//! navigator.display_next_spine_item();
//! # Ok(())
//! # }
//! ```

#![cfg_attr(
    not(test),
    deny(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

pub mod bridge;
pub mod content_view;
pub mod disjunction;
pub mod error;
pub mod link;
pub mod location;
pub mod navigator;
pub mod publication;
pub mod scroll;
pub mod slots;
pub mod store;
pub mod toc;
pub mod triptych;

pub use bridge::{
    BridgeMessage, DocumentRenderer, RendererFactory, ScriptCall, ScriptError, ScriptRequest,
    ScriptTicket, ScriptValue, ViewId, BRIDGE_MESSAGE_NAMES,
};
pub use content_view::{
    ContentEvent, ContentView, NavigationKind, NavigationPolicy, NavigationRequest, SeekTarget,
};
pub use disjunction::Disjunction;
pub use error::NavigatorError;
pub use link::{BaseUrl, LinkTarget};
pub use location::Location;
pub use navigator::{
    NavigatorController, NavigatorDelegate, NavigatorOptions, SpineViewFactory, Viewport,
};
pub use publication::{Publication, SpineItem};
pub use scroll::{Clamping, ScrollContainer};
pub use slots::{ViewSlots, Window};
pub use store::{
    document_progression_key, last_document_key, MemoryStore, ProgressStore, StoredValue,
};
pub use toc::{parse_nav_xhtml, parse_nav_xhtml_with_limits, NavPoint, TocLimits};
pub use triptych::{ContentFactory, SlotView, TriptychOptions, TriptychView};
