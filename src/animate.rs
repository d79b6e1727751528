use std::time::Duration;

use smallvec::SmallVec;

use crate::dom::{Document, EventKind, ListenerTarget, NodeId};
use crate::timer::{TimerId, Timers};

/// Handle to an animation started by [`Animator::start`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnimationId(u64);

struct PendingAnimation<T> {
    id: AnimationId,
    element: NodeId,
    class: String,
    on_ready: Option<T>,
    timer: Option<TimerId>,
}

/// Tracks CSS animations waiting for an `animationend` event or a timeout.
///
/// Each started animation delivers its completion at most once, to whichever
/// of the two triggers comes first. The animation class is added on start and
/// left in place; removing it is the caller's job.
pub struct Animator<T> {
    owner: NodeId,
    next_id: u64,
    pending: Vec<PendingAnimation<T>>,
}

impl<T> Animator<T> {
    /// Creates an animator whose listeners are registered under `owner`.
    pub const fn new(owner: NodeId) -> Self {
        Self {
            owner,
            next_id: 0,
            pending: Vec::new(),
        }
    }

    /// Adds `class` to `element` and waits for the animation to finish.
    ///
    /// Without `on_ready` no timer is scheduled. `max_wait` of `None` or zero
    /// means only the animation-end event can complete it.
    #[allow(clippy::too_many_arguments)]
    pub fn start<P>(
        &mut self,
        doc: &mut Document,
        timers: &mut Timers<P>,
        element: NodeId,
        class: &str,
        on_ready: Option<T>,
        max_wait: Option<Duration>,
        timeout_payload: impl FnOnce(AnimationId) -> P,
    ) -> AnimationId {
        let id = AnimationId(self.next_id);
        self.next_id += 1;

        doc.add_class(element, class);
        doc.add_listener(ListenerTarget::Node(element), EventKind::AnimationEnd, self.owner);

        let timer = match max_wait {
            Some(wait) if on_ready.is_some() && !wait.is_zero() => {
                Some(timers.schedule(wait, timeout_payload(id)))
            }
            _ => None,
        };
        self.pending.push(PendingAnimation {
            id,
            element,
            class: class.to_owned(),
            on_ready,
            timer,
        });
        id
    }

    /// Handles an `animationend` event dispatched at `target`.
    ///
    /// The event bubbles, so animations on `target` or any of its ancestors
    /// finish. Returns their completions in start order.
    pub fn animation_end<P>(
        &mut self,
        doc: &mut Document,
        timers: &mut Timers<P>,
        target: NodeId,
    ) -> SmallVec<[T; 2]> {
        let mut done = SmallVec::new();
        let mut finished: SmallVec<[NodeId; 2]> = SmallVec::new();
        let mut idx = 0;
        while idx < self.pending.len() {
            if doc.contains(self.pending[idx].element, target) {
                let entry = self.pending.remove(idx);
                if let Some(timer) = entry.timer {
                    timers.cancel(timer);
                }
                if !finished.contains(&entry.element) {
                    finished.push(entry.element);
                }
                done.extend(entry.on_ready);
            } else {
                idx += 1;
            }
        }
        for element in finished {
            self.release_listener(doc, element);
        }
        done
    }

    /// Handles the fallback timer of animation `id`.
    ///
    /// Returns `None` if the animation already completed.
    pub fn timed_out(&mut self, doc: &mut Document, id: AnimationId) -> Option<T> {
        let idx = self.pending.iter().position(|p| p.id == id)?;
        let entry = self.pending.remove(idx);
        self.release_listener(doc, entry.element);
        entry.on_ready
    }

    /// Drops pending animations of `element` with `class` without completing them.
    pub fn cancel<P>(
        &mut self,
        doc: &mut Document,
        timers: &mut Timers<P>,
        element: NodeId,
        class: &str,
    ) -> usize {
        let before = self.pending.len();
        self.pending.retain(|p| {
            let hit = p.element == element && p.class == class;
            if hit {
                if let Some(timer) = p.timer {
                    timers.cancel(timer);
                }
            }
            !hit
        });
        let cancelled = before - self.pending.len();
        if cancelled > 0 {
            self.release_listener(doc, element);
        }
        cancelled
    }

    /// Returns `true` if `element` has a pending animation with `class`.
    pub fn is_pending(&self, element: NodeId, class: &str) -> bool {
        self.pending
            .iter()
            .any(|p| p.element == element && p.class == class)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn release_listener(&self, doc: &mut Document, element: NodeId) {
        if !self.pending.iter().any(|p| p.element == element) {
            doc.remove_listener(
                ListenerTarget::Node(element),
                EventKind::AnimationEnd,
                self.owner,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    enum Tick {
        Timeout(AnimationId),
    }

    fn setup() -> (Document, NodeId, NodeId) {
        let doc = Document::parse(r#"<ul id="u"><li id="l">x</li></ul>"#).unwrap();
        let ul = doc.element_by_id("u").unwrap();
        let li = doc.element_by_id("l").unwrap();
        (doc, ul, li)
    }

    fn fire_timers(
        animator: &mut Animator<&'static str>,
        doc: &mut Document,
        timers: &mut Timers<Tick>,
        by: Duration,
    ) -> Vec<&'static str> {
        let deadline = timers.now() + by;
        let mut done = Vec::new();
        while let Some((_, Tick::Timeout(id))) = timers.pop_due(deadline) {
            done.extend(animator.timed_out(doc, id));
        }
        timers.set_now(deadline);
        done
    }

    #[test]
    fn adds_class_and_completes_on_animation_end() {
        let (mut doc, ul, _) = setup();
        let mut timers = Timers::new();
        let mut animator = Animator::new(ul);

        animator.start(&mut doc, &mut timers, ul, "animate-open", Some("ready"), Some(Duration::from_millis(250)), Tick::Timeout);
        assert!(doc.has_class(ul, "animate-open"));
        assert!(doc.has_listener(ListenerTarget::Node(ul), EventKind::AnimationEnd, ul));

        let done = animator.animation_end(&mut doc, &mut timers, ul);
        assert_eq!(done.as_slice(), &["ready"]);
        assert!(timers.is_empty());
        assert!(!doc.has_listener(ListenerTarget::Node(ul), EventKind::AnimationEnd, ul));
        // Class removal belongs to the caller.
        assert!(doc.has_class(ul, "animate-open"));
    }

    #[test]
    fn timeout_wins_and_later_event_is_suppressed() {
        let (mut doc, ul, _) = setup();
        let mut timers = Timers::new();
        let mut animator = Animator::new(ul);

        animator.start(&mut doc, &mut timers, ul, "animate-close", Some("ready"), Some(Duration::from_millis(250)), Tick::Timeout);
        assert!(fire_timers(&mut animator, &mut doc, &mut timers, Duration::from_millis(249)).is_empty());
        assert_eq!(fire_timers(&mut animator, &mut doc, &mut timers, Duration::from_millis(1)), vec!["ready"]);
        assert!(animator.animation_end(&mut doc, &mut timers, ul).is_empty());
    }

    #[test]
    fn bubbling_event_from_descendant_completes() {
        let (mut doc, ul, li) = setup();
        let mut timers = Timers::new();
        let mut animator = Animator::new(ul);

        animator.start(&mut doc, &mut timers, ul, "a", Some("ready"), None, Tick::Timeout);
        assert!(timers.is_empty());
        assert_eq!(animator.animation_end(&mut doc, &mut timers, li).as_slice(), &["ready"]);
    }

    #[test]
    fn without_callback_nothing_is_scheduled() {
        let (mut doc, ul, _) = setup();
        let mut timers = Timers::new();
        let mut animator: Animator<&'static str> = Animator::new(ul);

        animator.start(&mut doc, &mut timers, ul, "a", None, Some(Duration::from_millis(10)), Tick::Timeout);
        assert!(timers.is_empty());
        assert!(doc.has_class(ul, "a"));
        assert!(animator.animation_end(&mut doc, &mut timers, ul).is_empty());
        assert_eq!(animator.pending_len(), 0);
    }

    #[test]
    fn cancel_drops_completion_and_timer() {
        let (mut doc, ul, _) = setup();
        let mut timers = Timers::new();
        let mut animator = Animator::new(ul);

        animator.start(&mut doc, &mut timers, ul, "animate-close", Some("ready"), Some(Duration::from_millis(5)), Tick::Timeout);
        assert!(animator.is_pending(ul, "animate-close"));
        assert_eq!(animator.cancel(&mut doc, &mut timers, ul, "animate-close"), 1);
        assert!(timers.is_empty());
        assert!(fire_timers(&mut animator, &mut doc, &mut timers, Duration::from_millis(10)).is_empty());
    }
}
