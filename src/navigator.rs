//! Top-level navigator: publication + viewport + reading position.
//!
//! [`NavigatorController`] owns the [`Publication`], a [`TriptychView`] of
//! [`ContentView`]s and a [`ProgressStore`]. The host forwards container
//! scroll callbacks, bridge messages, script results and navigation policy
//! requests; the controller turns the resulting [`ContentEvent`]s into index
//! changes, persisted progression and [`NavigatorDelegate`] callbacks.

use core::fmt;

use crate::bridge::{
    BridgeMessage, RendererFactory, ScriptError, ScriptTicket, ScriptValue, ViewId,
};
use crate::content_view::{
    ContentEvent, ContentView, NavigationPolicy, NavigationRequest, SeekTarget,
};
use crate::error::NavigatorError;
use crate::link::BaseUrl;
use crate::location::Location;
use crate::publication::{Publication, SpineItem};
use crate::scroll::ScrollContainer;
use crate::store::{
    document_progression_key, last_document_key, ProgressStore, StoredValue,
};
use crate::toc::NavPoint;
use crate::triptych::{ContentFactory, TriptychOptions, TriptychView};

/// Callbacks into the hosting presentation layer.
pub trait NavigatorDelegate {
    /// Tap in the middle zone of the current document.
    fn middle_tap(&mut self) {}

    /// A web link was tapped and should open outside the reader.
    fn open_external(&mut self, _url: &str) {}

    /// The current spine index changed.
    fn index_changed(&mut self, _index: usize) {}
}

/// Navigator configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NavigatorOptions {
    /// Start at this spine index instead of the persisted one.
    pub initial_index: Option<usize>,
    /// Read the last index and progression from the store at construction.
    pub restore_position: bool,
    /// Viewport tuning.
    pub triptych: TriptychOptions,
}

impl Default for NavigatorOptions {
    fn default() -> Self {
        Self {
            initial_index: None,
            restore_position: true,
            triptych: TriptychOptions::default(),
        }
    }
}

/// Builds a [`ContentView`] for a spine index and starts loading it.
#[derive(Debug)]
pub struct SpineViewFactory<RF> {
    renderers: RF,
    urls: Vec<String>,
    base_url: BaseUrl,
    page_width: f64,
    next_id: u64,
}

impl<RF: RendererFactory> SpineViewFactory<RF> {
    pub fn new(publication: &Publication, renderers: RF, page_width: f64) -> Self {
        let urls = (0..publication.len())
            .filter_map(|index| publication.url_for(index))
            .collect();
        Self {
            renderers,
            urls,
            base_url: publication.base_url().clone(),
            page_width,
            next_id: 0,
        }
    }

    pub fn set_page_width(&mut self, page_width: f64) {
        self.page_width = page_width;
    }

    pub fn renderers(&self) -> &RF {
        &self.renderers
    }

    /// Number of views built so far.
    pub fn views_created(&self) -> u64 {
        self.next_id
    }
}

impl<RF: RendererFactory> ContentFactory for SpineViewFactory<RF> {
    type View = ContentView<RF::Renderer>;

    fn make_view(&mut self, index: usize, location: Location) -> Self::View {
        let id = ViewId(self.next_id);
        self.next_id += 1;
        let url = self.urls.get(index).cloned().unwrap_or_default();
        let mut view = ContentView::new(
            id,
            index,
            url,
            self.base_url.clone(),
            location,
            self.renderers.create_renderer(),
            self.page_width,
        );
        view.load();
        view
    }
}

/// Viewport type driven by a [`NavigatorController`].
pub type Viewport<RF, S> = TriptychView<SpineViewFactory<RF>, S>;

/// Reader navigation controller.
pub struct NavigatorController<RF, S, P>
where
    RF: RendererFactory,
    S: ScrollContainer,
    P: ProgressStore,
{
    publication: Publication,
    triptych: Viewport<RF, S>,
    store: P,
    delegate: Option<Box<dyn NavigatorDelegate>>,
    pending_progression: Option<f64>,
}

impl<RF, S, P> fmt::Debug for NavigatorController<RF, S, P>
where
    RF: RendererFactory,
    S: ScrollContainer,
    P: ProgressStore,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigatorController")
            .field("publication", &self.publication.identifier())
            .field("triptych", &self.triptych)
            .field("pending_progression", &self.pending_progression)
            .finish()
    }
}

impl<RF, S, P> NavigatorController<RF, S, P>
where
    RF: RendererFactory,
    S: ScrollContainer,
    P: ProgressStore,
{
    /// Build a navigator, restoring the last position from `store` unless
    /// `options.initial_index` is set.
    ///
    /// # Errors
    ///
    /// Fails when `options.initial_index` is outside the spine.
    pub fn new(
        publication: Publication,
        renderers: RF,
        container: S,
        store: P,
        options: NavigatorOptions,
    ) -> Result<Self, NavigatorError> {
        let count = publication.len();
        let id = publication.identifier().to_owned();

        let restored_index = if options.restore_position {
            store
                .get(&last_document_key(&id))
                .and_then(StoredValue::as_int)
                .and_then(|index| usize::try_from(index).ok())
                .filter(|index| *index < count)
        } else {
            None
        };
        let (initial_index, pending_progression) = match options.initial_index {
            Some(index) => (index, None),
            None => {
                let progression = if options.restore_position && restored_index.is_some() {
                    store
                        .get(&document_progression_key(&id))
                        .and_then(StoredValue::as_double)
                        .filter(|p| (0.0..=1.0).contains(p))
                } else {
                    None
                };
                (restored_index.unwrap_or(0), progression)
            }
        };

        let factory = SpineViewFactory::new(&publication, renderers, container.page_width());
        let triptych = TriptychView::new(count, initial_index, factory, container, options.triptych)?;
        log::debug!(
            "navigator for {} at index {} (restored progression {:?})",
            id,
            initial_index,
            pending_progression
        );

        Ok(Self {
            publication,
            triptych,
            store,
            delegate: None,
            pending_progression,
        })
    }

    pub fn set_delegate(&mut self, delegate: Box<dyn NavigatorDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn publication(&self) -> &Publication {
        &self.publication
    }

    pub fn triptych(&self) -> &Viewport<RF, S> {
        &self.triptych
    }

    pub fn triptych_mut(&mut self) -> &mut Viewport<RF, S> {
        &mut self.triptych
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    pub fn current_index(&self) -> usize {
        self.triptych.index()
    }

    pub fn get_spine(&self) -> &[SpineItem] {
        self.publication.spine()
    }

    pub fn get_table_of_contents(&self) -> &[NavPoint] {
        self.publication.table_of_contents()
    }

    /// Lay out the viewport, building the initial window on first call.
    pub fn layout(&mut self) {
        let width = self.triptych.container().page_width();
        self.triptych.factory_mut().set_page_width(width);
        self.triptych.layout();
        if let Some(progression) = self.pending_progression.take() {
            if let Some(view) = self.triptych.current_view_mut() {
                view.set_initial_position_override(progression);
            }
        }
    }

    fn move_to(&mut self, index: usize, target: Option<SeekTarget>) {
        let before = self.triptych.index();
        self.triptych.move_to(index, target);
        if self.triptych.index() != before && self.pending_progression.take().is_some() {
            log::debug!("left restored index {}, dropping saved progression", before);
        }
        self.notify_index_change(before);
    }

    fn notify_index_change(&mut self, before: usize) {
        let after = self.triptych.index();
        if after != before {
            if let Some(delegate) = self.delegate.as_mut() {
                delegate.index_changed(after);
            }
        }
    }

    /// Show the spine item at `index`; out-of-range indices are ignored.
    pub fn display_spine_item(&mut self, index: usize) {
        if index >= self.publication.len() {
            return;
        }
        self.move_to(index, None);
    }

    /// Show the spine item matching `href`, seeking to its `#fragment` if
    /// any, otherwise to its beginning. Unknown hrefs are ignored.
    pub fn display_spine_item_with_href(&mut self, href: &str) {
        let Some((index, fragment)) = self.publication.resolve_href(href) else {
            log::debug!("no spine item matches href {:?}", href);
            return;
        };
        let target = match fragment {
            Some(fragment) => SeekTarget::Anchor(fragment.to_owned()),
            None => SeekTarget::Edge(Location::Beginning),
        };
        self.move_to(index, Some(target));
    }

    /// Turn to the beginning of the next spine item.
    pub fn display_next_spine_item(&mut self) {
        let index = self.triptych.index();
        if index + 1 < self.publication.len() {
            self.move_to(index + 1, Some(SeekTarget::Edge(Location::Beginning)));
        }
    }

    /// Turn back to the end of the previous spine item.
    pub fn display_previous_spine_item(&mut self) {
        let index = self.triptych.index();
        if index > 0 {
            self.move_to(index - 1, Some(SeekTarget::Edge(Location::End)));
        }
    }

    /// Forward a container scroll sample.
    pub fn did_scroll(&mut self) {
        self.triptych.did_scroll();
    }

    /// Forward the end of a drag deceleration.
    pub fn did_end_decelerating(&mut self) {
        let before = self.triptych.index();
        self.triptych.did_end_decelerating();
        self.notify_index_change(before);
    }

    fn view_mut(&mut self, id: ViewId) -> Option<&mut ContentView<RF::Renderer>> {
        self.triptych
            .views_mut()
            .into_iter()
            .find(|view| view.id() == id)
    }

    /// Route a bridge message posted by the renderer of view `id`.
    ///
    /// Messages for views outside the window or with unknown names are
    /// dropped.
    pub fn handle_bridge_message(&mut self, id: ViewId, name: &str, body: &str) {
        let Some(message) = BridgeMessage::parse(name, body) else {
            log::debug!("{} posted unknown bridge message {:?}", id, name);
            return;
        };
        let Some(view) = self.view_mut(id) else {
            log::debug!("{} is gone, dropping {:?}", id, message);
            return;
        };
        let spine_index = view.spine_index();
        if let Some(event) = view.handle_message(message) {
            self.handle_content_event(spine_index, event);
        }
    }

    /// Route an asynchronous script result.
    pub fn handle_script_result(
        &mut self,
        ticket: ScriptTicket,
        result: Result<ScriptValue, ScriptError>,
    ) {
        let Some(view) = self.view_mut(ticket.view) else {
            log::debug!("{} is gone, dropping script result", ticket.view);
            return;
        };
        let spine_index = view.spine_index();
        if let Some(event) = view.handle_script_result(ticket, result) {
            self.handle_content_event(spine_index, event);
        }
    }

    /// Vet a navigation attempt inside the renderer of view `id`.
    pub fn decide_navigation_policy(
        &mut self,
        id: ViewId,
        request: &NavigationRequest,
    ) -> NavigationPolicy {
        let Some(view) = self.view_mut(id) else {
            return NavigationPolicy::Cancel;
        };
        let spine_index = view.spine_index();
        let (policy, event) = view.decide_policy(request);
        if let Some(event) = event {
            self.handle_content_event(spine_index, event);
        }
        policy
    }

    fn store_progression(&mut self, progression: f64) {
        let key = document_progression_key(self.publication.identifier());
        self.store.set(&key, StoredValue::Double(progression));
    }

    fn handle_content_event(&mut self, spine_index: usize, event: ContentEvent) {
        let is_current = spine_index == self.triptych.index();
        match event {
            ContentEvent::PreviousDocument if is_current => {
                if spine_index > 0 {
                    self.display_previous_spine_item();
                    self.store_progression(Location::End.progression());
                }
            }
            ContentEvent::NextDocument if is_current => {
                if spine_index + 1 < self.publication.len() {
                    self.display_next_spine_item();
                    self.store_progression(Location::Beginning.progression());
                }
            }
            ContentEvent::CenterTap => {
                if let Some(delegate) = self.delegate.as_mut() {
                    delegate.middle_tap();
                }
            }
            ContentEvent::ProgressionChanged(progression) if is_current => {
                self.store_progression(progression);
            }
            ContentEvent::JumpToHref(href) => self.display_spine_item_with_href(&href),
            ContentEvent::OpenExternal(url) => {
                if let Some(delegate) = self.delegate.as_mut() {
                    delegate.open_external(&url);
                }
            }
            other => {
                log::trace!("ignoring {:?} from neighbor spine index {}", other, spine_index);
            }
        }
    }

    /// Persist the current spine index.
    pub fn save_position(&mut self) {
        let key = last_document_key(self.publication.identifier());
        let index = i64::try_from(self.triptych.index()).unwrap_or(i64::MAX);
        self.store.set(&key, StoredValue::Int(index));
    }
}

impl<RF, S, P> Drop for NavigatorController<RF, S, P>
where
    RF: RendererFactory,
    S: ScrollContainer,
    P: ProgressStore,
{
    fn drop(&mut self) {
        self.save_position();
    }
}
