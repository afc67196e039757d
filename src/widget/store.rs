//! Registry of live widgets, one per page load.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::task::JoinHandle;
use uuid::Uuid;

use super::clock::MonotonicClock;
use super::controller::ChatWidgetController;
use super::state::WidgetSettings;
use crate::backend::ChatBackend;

/// Thread-safe store of widget controllers keyed by id.
#[derive(Debug, Clone)]
pub struct WidgetStore {
    inner: Arc<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    widgets: RwLock<HashMap<String, Arc<ChatWidgetController>>>,
    settings: WidgetSettings,
    backend: Arc<dyn ChatBackend>,
}

impl WidgetStore {
    #[must_use]
    pub fn new(settings: WidgetSettings, backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                widgets: RwLock::new(HashMap::new()),
                settings,
                backend,
            }),
        }
    }

    /// Create and initialize a widget; its load clock starts now.
    pub fn create(&self) -> Arc<ChatWidgetController> {
        let id = Uuid::new_v4().to_string();
        let widget = ChatWidgetController::new(
            id.clone(),
            self.inner.settings.clone(),
            Arc::clone(&self.inner.backend),
            Arc::new(MonotonicClock::start()),
        );
        widget.initialize();

        self.inner
            .widgets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), Arc::clone(&widget));

        tracing::info!(name: "widget.created", widget_id = %id, "Widget created");
        widget
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<ChatWidgetController>> {
        self.inner
            .widgets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Drop a widget. Requests already in flight still complete.
    pub fn remove(&self, id: &str) -> Option<Arc<ChatWidgetController>> {
        let removed = self
            .inner
            .widgets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
        if removed.is_some() {
            tracing::info!(name: "widget.removed", widget_id = %id, "Widget removed");
        }
        removed
    }

    /// Drop every widget that [`ChatWidgetController::is_idle`] reports idle.
    /// Returns how many were removed.
    pub fn evict_idle(&self, idle_after: Duration) -> usize {
        let mut widgets = self
            .inner
            .widgets
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = widgets.len();
        widgets.retain(|id, widget| {
            let idle = widget.is_idle(idle_after);
            if idle {
                tracing::info!(name: "widget.evicted", widget_id = %id, "Idle widget evicted");
            }
            !idle
        });
        before - widgets.len()
    }

    /// Run [`Self::evict_idle`] periodically for the life of the process.
    pub fn spawn_idle_sweeper(&self, idle_after: Duration) -> JoinHandle<()> {
        let store = self.clone();
        let period = idle_after.min(Duration::from_secs(60)).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let evicted = store.evict_idle(idle_after);
                if evicted > 0 {
                    tracing::debug!(evicted, remaining = store.len(), "Idle sweep finished");
                }
            }
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .widgets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn list_ids(&self) -> Vec<String> {
        self.inner
            .widgets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}
