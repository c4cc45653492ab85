use std::collections::HashSet;
use std::sync::Mutex;

/// Keys of requests currently being processed. Holding the ticket returned by
/// `try_begin` marks the key busy; dropping it frees the key again.
#[derive(Debug, Default)]
pub struct InFlight {
    keys: Mutex<HashSet<String>>,
}

#[derive(Debug)]
pub struct InFlightTicket<'a> {
    registry: &'a InFlight,
    key: String,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_begin(&self, key: impl Into<String>) -> Option<InFlightTicket<'_>> {
        let key = key.into();
        let mut keys = self.keys.lock().unwrap_or_else(|e| e.into_inner());
        if !keys.insert(key.clone()) {
            return None;
        }
        Some(InFlightTicket {
            registry: self,
            key,
        })
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.keys
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(key)
    }
}

impl Drop for InFlightTicket<'_> {
    fn drop(&mut self) {
        let mut keys = self.registry.keys.lock().unwrap_or_else(|e| e.into_inner());
        keys.remove(&self.key);
    }
}
