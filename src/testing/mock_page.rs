//! Scripted host page
//!
//! Records every element, event, alert and stream binding. File selections
//! and overlay button presses are queued ahead of time (or pushed while a
//! strategy is waiting) and handed out in order.

use crate::media::MediaStream;
use crate::page::{
    ActivationEvent, Element, ElementId, EventSupport, FileInputSpec, OverlayAction, OverlaySpec,
    Page, SelectedFile,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Default)]
struct PageState {
    elements: Vec<(ElementId, Element)>,
    removed: Vec<ElementId>,
    dispatched: Vec<(ElementId, ActivationEvent)>,
    attached: Vec<(ElementId, Arc<dyn MediaStream>)>,
    alerts: Vec<String>,
    selections: VecDeque<Vec<SelectedFile>>,
    actions: VecDeque<OverlayAction>,
}

pub struct MockPage {
    support: EventSupport,
    state: Mutex<PageState>,
    changed: Notify,
}

impl Default for MockPage {
    fn default() -> Self {
        Self::new(EventSupport::Native)
    }
}

impl MockPage {
    pub fn new(support: EventSupport) -> Self {
        Self {
            support,
            state: Mutex::new(PageState::default()),
            changed: Notify::new(),
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut PageState) -> T) -> T {
        let mut state = self.state.lock().expect("page state poisoned");
        f(&mut state)
    }

    /// Queue the files the next file dialog returns (empty = dismissed)
    pub fn select_files(&self, files: Vec<SelectedFile>) {
        self.with_state(|s| s.selections.push_back(files));
        self.changed.notify_waiters();
    }

    /// Queue a button press for the next overlay, even before it exists
    pub fn queue_action(&self, action: OverlayAction) {
        self.with_state(|s| s.actions.push_back(action));
        self.changed.notify_waiters();
    }

    /// Press a button on the overlay currently in the page. Returns false
    /// when there is no overlay to press.
    pub fn activate(&self, action: OverlayAction) -> bool {
        let present = !self.overlays().is_empty();
        if present {
            self.queue_action(action);
        }
        present
    }

    pub fn elements(&self) -> Vec<(ElementId, Element)> {
        self.with_state(|s| s.elements.clone())
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.with_state(|s| s.elements.iter().any(|(e, _)| *e == id))
    }

    pub fn file_inputs(&self) -> Vec<FileInputSpec> {
        self.elements()
            .into_iter()
            .filter_map(|(_, e)| match e {
                Element::FileInput(spec) => Some(spec),
                _ => None,
            })
            .collect()
    }

    pub fn overlays(&self) -> Vec<OverlaySpec> {
        self.elements()
            .into_iter()
            .filter_map(|(_, e)| match e {
                Element::CaptureOverlay(spec) => Some(spec),
                _ => None,
            })
            .collect()
    }

    pub fn removed(&self) -> Vec<ElementId> {
        self.with_state(|s| s.removed.clone())
    }

    pub fn dispatched(&self) -> Vec<(ElementId, ActivationEvent)> {
        self.with_state(|s| s.dispatched.clone())
    }

    pub fn attached_streams(&self) -> Vec<Arc<dyn MediaStream>> {
        self.with_state(|s| s.attached.iter().map(|(_, st)| st.clone()).collect())
    }

    pub fn alerts(&self) -> Vec<String> {
        self.with_state(|s| s.alerts.clone())
    }
}

#[async_trait]
impl Page for MockPage {
    fn event_support(&self) -> EventSupport {
        self.support
    }

    fn append(&self, element: Element) -> ElementId {
        let id = ElementId::new();
        self.with_state(|s| s.elements.push((id, element)));
        self.changed.notify_waiters();
        id
    }

    fn remove(&self, id: ElementId) -> bool {
        let removed = self.with_state(|s| {
            let before = s.elements.len();
            s.elements.retain(|(e, _)| *e != id);
            let removed = s.elements.len() != before;
            if removed {
                s.removed.push(id);
            }
            removed
        });
        self.changed.notify_waiters();
        removed
    }

    fn dispatch(&self, id: ElementId, event: ActivationEvent) {
        self.with_state(|s| s.dispatched.push((id, event)));
    }

    fn attach_stream(&self, id: ElementId, stream: Arc<dyn MediaStream>) {
        self.with_state(|s| s.attached.push((id, stream)));
    }

    fn alert(&self, message: &str) {
        self.with_state(|s| s.alerts.push(message.to_string()));
    }

    async fn file_selection(&self, _id: ElementId) -> Vec<SelectedFile> {
        loop {
            let notified = self.changed.notified();
            if let Some(files) = self.with_state(|s| s.selections.pop_front()) {
                return files;
            }
            notified.await;
        }
    }

    async fn overlay_action(&self, _id: ElementId) -> OverlayAction {
        loop {
            let notified = self.changed.notified();
            if let Some(action) = self.with_state(|s| s.actions.pop_front()) {
                return action;
            }
            notified.await;
        }
    }
}
