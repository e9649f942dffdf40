//! Native event subscriptions with explicit handles.
//!
//! The bridge registers one listener per native event class at setup and keeps
//! the handles, so teardown releases exactly what setup acquired.

use dom::{HostSurface, ListenerHandle, NativeEventClass};

#[derive(Debug, Default)]
pub struct NativeSubscriptions {
    handles: Vec<(NativeEventClass, ListenerHandle)>,
}

impl NativeSubscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes every class not already subscribed.
    pub fn subscribe_all<S: HostSurface + ?Sized>(&mut self, surface: &mut S) {
        for class in NativeEventClass::ALL {
            if self.is_subscribed(class) {
                continue;
            }
            let handle = surface.listen(class, class.listen_target(), class.phase());
            log::trace!(target: "bridge.subscriptions", "listening for {class:?} as {handle:?}");
            self.handles.push((class, handle));
        }
    }

    pub fn unsubscribe_all<S: HostSurface + ?Sized>(&mut self, surface: &mut S) {
        for (class, handle) in self.handles.drain(..) {
            log::trace!(target: "bridge.subscriptions", "releasing {class:?} ({handle:?})");
            surface.unlisten(handle);
        }
    }

    pub fn is_subscribed(&self, class: NativeEventClass) -> bool {
        self.handles.iter().any(|(c, _)| *c == class)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::{ListenTarget, MemorySurface, Phase};

    #[test]
    fn subscribe_registers_each_class_once() {
        let mut surface = MemorySurface::new();
        let mut subs = NativeSubscriptions::new();
        subs.subscribe_all(&mut surface);
        subs.subscribe_all(&mut surface);
        assert_eq!(subs.len(), NativeEventClass::ALL.len());
        assert_eq!(surface.listener_count(), NativeEventClass::ALL.len());
    }

    #[test]
    fn registrations_use_class_target_and_phase() {
        let mut surface = MemorySurface::new();
        let mut subs = NativeSubscriptions::new();
        subs.subscribe_all(&mut surface);
        assert_eq!(
            surface.registration(NativeEventClass::Focus),
            Some((ListenTarget::Window, Phase::Capture))
        );
        assert_eq!(
            surface.registration(NativeEventClass::MouseEnter),
            Some((ListenTarget::Body, Phase::Capture))
        );
        assert_eq!(
            surface.registration(NativeEventClass::Click),
            Some((ListenTarget::Window, Phase::Bubble))
        );
    }

    #[test]
    fn unsubscribe_releases_everything() {
        let mut surface = MemorySurface::new();
        let mut subs = NativeSubscriptions::new();
        subs.subscribe_all(&mut surface);
        subs.unsubscribe_all(&mut surface);
        assert!(subs.is_empty());
        assert_eq!(surface.listener_count(), 0);
    }
}
