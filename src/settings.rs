//! Runtime debug settings shared between the loader and the TUI.
//!
//! One `SettingsHub` is created at startup and handed to whoever needs it;
//! changes are broadcast over a watch channel so every subscriber sees the
//! latest value without polling shared globals.

use crate::config::DebugConfig;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DebugSettings {
    /// Show per-item status and batch counters under the row.
    pub overlay: bool,
    /// Log every per-item verdict at info instead of debug.
    pub trace_lookups: bool,
}

impl From<&DebugConfig> for DebugSettings {
    fn from(c: &DebugConfig) -> Self {
        Self {
            overlay: c.overlay,
            trace_lookups: c.trace_lookups,
        }
    }
}

#[derive(Clone)]
pub struct SettingsHub {
    tx: watch::Sender<DebugSettings>,
}

impl SettingsHub {
    pub fn new(initial: DebugSettings) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn current(&self) -> DebugSettings {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<DebugSettings> {
        self.tx.subscribe()
    }

    /// Apply `f` and notify subscribers only if something actually changed.
    pub fn update(&self, f: impl FnOnce(&mut DebugSettings)) {
        self.tx.send_if_modified(|s| {
            let before = *s;
            f(s);
            before != *s
        });
    }

    pub fn toggle_overlay(&self) {
        self.update(|s| s.overlay = !s.overlay);
    }
}

impl Default for SettingsHub {
    fn default() -> Self {
        Self::new(DebugSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_toggle_notifies_subscribers() {
        let hub = SettingsHub::default();
        let mut rx = hub.subscribe();
        hub.toggle_overlay();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().overlay);
        assert!(hub.current().overlay);
    }

    #[test]
    fn test_noop_update_does_not_notify() {
        let hub = SettingsHub::default();
        let rx = hub.subscribe();
        hub.update(|s| s.trace_lookups = false);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_from_config() {
        let s = DebugSettings::from(&DebugConfig { overlay: true, trace_lookups: false });
        assert!(s.overlay);
        assert!(!s.trace_lookups);
    }
}
