//! Point-of-sale (PDV) keyboard shortcuts.
//!
//! [`route`] is the whole mapping: a pure function from a key press to a
//! [`PosAction`]. Which modal is open, whether a sale is running and so on
//! belong to the host screen. [`install`] hooks the router into a
//! [`KeyboardHub`] and hands back a guard that unhooks it when dropped.

use std::{
    collections::BTreeMap,
    fmt,
    str::FromStr,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard, PoisonError, Weak,
    },
};

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
    Escape,
    /// F1..F12.
    Function(u8),
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub key: Key,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyEvent {
    pub fn bare(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            shift: false,
            alt: false,
            meta: false,
        }
    }

    pub fn ctrl(key: Key) -> Self {
        Self {
            ctrl: true,
            ..Self::bare(key)
        }
    }

    fn has_modifiers(&self) -> bool {
        self.ctrl || self.shift || self.alt || self.meta
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enter => f.write_str("Enter"),
            Self::Escape => f.write_str("Escape"),
            Self::Function(n) => write!(f, "F{n}"),
            Self::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
        }
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (on, name) in [
            (self.ctrl, "Ctrl"),
            (self.alt, "Alt"),
            (self.shift, "Shift"),
            (self.meta, "Meta"),
        ] {
            if on {
                write!(f, "{name}+")?;
            }
        }
        write!(f, "{}", self.key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized key chord '{0}'")]
pub struct ParseKeyError(pub String);

impl FromStr for KeyEvent {
    type Err = ParseKeyError;

    /// Parses chords such as `ctrl+enter`, `F9` or `Esc`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseKeyError(raw.to_string());
        let mut parts: Vec<String> = raw
            .split('+')
            .map(|part| part.trim().to_ascii_lowercase())
            .collect();
        let key_name = parts.pop().filter(|name| !name.is_empty()).ok_or_else(invalid)?;

        let key = match key_name.as_str() {
            "enter" | "return" => Key::Enter,
            "esc" | "escape" => Key::Escape,
            name => match name.strip_prefix('f').map(str::parse::<u8>) {
                Some(Ok(n)) if (1..=12).contains(&n) => Key::Function(n),
                _ => {
                    let mut chars = name.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => Key::Char(c),
                        _ => return Err(invalid()),
                    }
                }
            },
        };

        let mut event = KeyEvent::bare(key);
        for modifier in parts {
            match modifier.as_str() {
                "ctrl" | "control" => event.ctrl = true,
                "shift" => event.shift = true,
                "alt" => event.alt = true,
                "meta" | "cmd" | "super" => event.meta = true,
                _ => return Err(invalid()),
            }
        }
        Ok(event)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PosAction {
    /// Open the cash register if needed and move the sale forward.
    OpenRegisterAndProceed,
    /// Close the active modal and cancel the sale in progress.
    CancelActive,
    FocusProductSearch,
    FocusCustomer,
    FocusSeller,
    SaveForLater,
}

impl PosAction {
    pub fn description(self) -> &'static str {
        match self {
            Self::OpenRegisterAndProceed => "open register and proceed",
            Self::CancelActive => "cancel active modal and sale",
            Self::FocusProductSearch => "focus product search",
            Self::FocusCustomer => "focus customer field",
            Self::FocusSeller => "focus seller field",
            Self::SaveForLater => "save sale for later",
        }
    }
}

/// Maps a key press to its PDV action. Modifiers must match exactly.
pub fn route(event: &KeyEvent) -> Option<PosAction> {
    if event.ctrl && !(event.shift || event.alt || event.meta) {
        return match event.key {
            Key::Enter => Some(PosAction::OpenRegisterAndProceed),
            _ => None,
        };
    }
    if event.has_modifiers() {
        return None;
    }
    match event.key {
        Key::Escape => Some(PosAction::CancelActive),
        Key::Function(2) => Some(PosAction::FocusProductSearch),
        Key::Function(8) => Some(PosAction::FocusCustomer),
        Key::Function(9) => Some(PosAction::FocusSeller),
        Key::Function(10) => Some(PosAction::SaveForLater),
        _ => None,
    }
}

/// Every bound chord with its action, in display order.
pub fn bindings() -> Vec<(KeyEvent, PosAction)> {
    [
        KeyEvent::ctrl(Key::Enter),
        KeyEvent::bare(Key::Escape),
        KeyEvent::bare(Key::Function(2)),
        KeyEvent::bare(Key::Function(8)),
        KeyEvent::bare(Key::Function(9)),
        KeyEvent::bare(Key::Function(10)),
    ]
    .into_iter()
    .filter_map(|event| route(&event).map(|action| (event, action)))
    .collect()
}

type Listener = Arc<dyn Fn(&KeyEvent) -> bool + Send + Sync>;

#[derive(Default)]
struct HubInner {
    next_id: AtomicU64,
    listeners: Mutex<BTreeMap<u64, Listener>>,
}

impl HubInner {
    fn listeners(&self) -> MutexGuard<'_, BTreeMap<u64, Listener>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Application-wide key event source that screens attach listeners to.
#[derive(Clone, Default)]
pub struct KeyboardHub {
    inner: Arc<HubInner>,
}

impl KeyboardHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` until the returned guard is dropped. The handler
    /// returns true when it consumed the event.
    pub fn listen<F>(&self, handler: F) -> ListenerGuard
    where
        F: Fn(&KeyEvent) -> bool + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners().insert(id, Arc::new(handler));
        ListenerGuard {
            hub: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Delivers `event` to every listener; true if any consumed it.
    pub fn emit(&self, event: &KeyEvent) -> bool {
        let listeners: Vec<Listener> = self.inner.listeners().values().cloned().collect();
        listeners
            .iter()
            .fold(false, |consumed, listener| listener(event) || consumed)
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners().len()
    }
}

#[must_use = "the listener is removed as soon as the guard is dropped"]
pub struct ListenerGuard {
    hub: Weak<HubInner>,
    id: u64,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.listeners().remove(&self.id);
        }
    }
}

/// Keeps the PDV shortcuts active while alive.
#[must_use = "shortcuts are uninstalled as soon as the guard is dropped"]
pub struct ShortcutGuard {
    _listener: ListenerGuard,
}

/// Installs the PDV router on `hub`, forwarding each recognized chord to
/// `sink`.
pub fn install<F>(hub: &KeyboardHub, sink: F) -> ShortcutGuard
where
    F: Fn(PosAction) + Send + Sync + 'static,
{
    let listener = hub.listen(move |event| match route(event) {
        Some(action) => {
            debug!(key = %event, ?action, "shortcuts: dispatch");
            sink(action);
            true
        }
        None => false,
    });
    ShortcutGuard {
        _listener: listener,
    }
}

/// Like [`install`], delivering actions through a channel for an async
/// screen loop.
pub fn install_channel(hub: &KeyboardHub) -> (ShortcutGuard, mpsc::UnboundedReceiver<PosAction>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let guard = install(hub, move |action| {
        if tx.send(action).is_err() {
            debug!(?action, "shortcuts: receiver closed, action dropped");
        }
    });
    (guard, rx)
}

#[cfg(test)]
#[path = "tests/shortcuts_tests.rs"]
mod tests;
