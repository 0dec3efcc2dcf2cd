use std::cell::{Cell, RefCell};
use std::rc::Rc;

use epub_triptych::{
    DocumentRenderer, NavigatorController, NavigatorDelegate, ProgressStore, Publication,
    RendererFactory, ScriptCall, ScriptRequest, ScrollContainer, ViewId,
};

pub const PAGE_WIDTH: f64 = 320.0;
pub const BASE_URL: &str = "http://127.0.0.1:8080/pub/";

/// Renderer that records what the view asked of it.
#[derive(Debug, Default)]
pub struct MockRenderer {
    pub loaded: Vec<String>,
    pub requests: Vec<ScriptRequest>,
    live_bridges: Rc<Cell<usize>>,
    registered: bool,
}

impl DocumentRenderer for MockRenderer {
    fn load(&mut self, url: &str) {
        self.loaded.push(url.into());
    }

    fn register_bridge(&mut self, _names: &[&str]) {
        if !self.registered {
            self.registered = true;
            self.live_bridges.set(self.live_bridges.get() + 1);
        }
    }

    fn unregister_bridge(&mut self, _names: &[&str]) {
        if self.registered {
            self.registered = false;
            self.live_bridges.set(self.live_bridges.get() - 1);
        }
    }

    fn evaluate(&mut self, request: ScriptRequest) {
        self.requests.push(request);
    }
}

#[derive(Debug, Default)]
pub struct MockRenderers {
    pub live_bridges: Rc<Cell<usize>>,
    pub created: Rc<Cell<usize>>,
}

impl RendererFactory for MockRenderers {
    type Renderer = MockRenderer;

    fn create_renderer(&mut self) -> MockRenderer {
        self.created.set(self.created.get() + 1);
        MockRenderer {
            live_bridges: Rc::clone(&self.live_bridges),
            ..MockRenderer::default()
        }
    }
}

/// Paging container with a settable offset.
#[derive(Debug)]
pub struct MockPager {
    pub width: f64,
    pub offset: f64,
    pub pages: usize,
    pub writes: Vec<(f64, bool)>,
}

impl Default for MockPager {
    fn default() -> Self {
        Self {
            width: PAGE_WIDTH,
            offset: 0.0,
            pages: 0,
            writes: Vec::new(),
        }
    }
}

impl ScrollContainer for MockPager {
    fn page_width(&self) -> f64 {
        self.width
    }

    fn content_offset(&self) -> f64 {
        self.offset
    }

    fn set_content_offset(&mut self, x: f64, animated: bool) {
        self.offset = x;
        self.writes.push((x, animated));
    }

    fn set_page_count(&mut self, pages: usize) {
        self.pages = pages;
    }
}

#[derive(Debug, Default)]
pub struct DelegateLog {
    pub middle_taps: usize,
    pub external: Vec<String>,
    pub indices: Vec<usize>,
}

pub struct RecordingDelegate(pub Rc<RefCell<DelegateLog>>);

impl NavigatorDelegate for RecordingDelegate {
    fn middle_tap(&mut self) {
        self.0.borrow_mut().middle_taps += 1;
    }

    fn open_external(&mut self, url: &str) {
        self.0.borrow_mut().external.push(url.into());
    }

    fn index_changed(&mut self, index: usize) {
        self.0.borrow_mut().indices.push(index);
    }
}

pub type TestNavigator<P> = NavigatorController<MockRenderers, MockPager, P>;

pub fn publication(chapters: usize) -> Publication {
    Publication::new(
        "urn:uuid:test-book",
        BASE_URL,
        (1..=chapters).map(|n| format!("text/ch{}.xhtml", n)),
    )
    .unwrap()
}

pub fn current_id<P: ProgressStore>(navigator: &TestNavigator<P>) -> ViewId {
    navigator.triptych().current_view().unwrap().id()
}

pub fn view_id_for<P: ProgressStore>(navigator: &TestNavigator<P>, spine_index: usize) -> ViewId {
    navigator
        .triptych()
        .views()
        .unwrap()
        .ordered()
        .into_iter()
        .find(|view| view.spine_index() == spine_index)
        .unwrap()
        .id()
}

pub fn calls_for<P: ProgressStore>(navigator: &TestNavigator<P>, id: ViewId) -> Vec<ScriptCall> {
    navigator
        .triptych()
        .views()
        .unwrap()
        .ordered()
        .into_iter()
        .find(|view| view.id() == id)
        .unwrap()
        .renderer()
        .requests
        .iter()
        .map(|request| request.call.clone())
        .collect()
}

pub fn last_request<P: ProgressStore>(navigator: &TestNavigator<P>, id: ViewId) -> ScriptRequest {
    navigator
        .triptych()
        .views()
        .unwrap()
        .ordered()
        .into_iter()
        .find(|view| view.id() == id)
        .unwrap()
        .renderer()
        .requests
        .last()
        .cloned()
        .unwrap()
}
