//! Multicast change notifications
//!
//! A [`Signal`] delivers each emitted value to every current observer, in
//! subscription order. There is no replay: observers only see values emitted
//! after they subscribed. Delivery works on a snapshot of the observer list,
//! so observers may subscribe or unsubscribe (themselves or others) while a
//! value is being delivered; an observer removed mid-delivery is skipped.
//!
//! Once completed a signal drops its observers and ignores further emissions
//! and subscriptions.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Observer<T> = Rc<dyn Fn(&T)>;

struct SignalState<T> {
    next_id: u64,
    observers: Vec<(u64, Observer<T>)>,
    completed: bool,
}

impl<T> SignalState<T> {
    fn is_subscribed(&self, id: u64) -> bool {
        self.observers.iter().any(|(observer_id, _)| *observer_id == id)
    }
}

pub struct Signal<T> {
    state: Rc<RefCell<SignalState<T>>>,
}

impl<T: 'static> Signal<T> {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(SignalState {
                next_id: 0,
                observers: Vec::new(),
                completed: false,
            })),
        }
    }

    /// Attach an observer. Subscribing to a completed signal returns an
    /// inactive subscription and the observer is never called.
    pub fn subscribe(&self, observer: impl Fn(&T) + 'static) -> Subscription {
        let mut state = self.state.borrow_mut();
        if state.completed {
            return Subscription::inactive();
        }

        let id = state.next_id;
        state.next_id += 1;
        let observer: Observer<T> = Rc::new(observer);
        state.observers.push((id, observer));

        let weak: Weak<RefCell<SignalState<T>>> = Rc::downgrade(&self.state);
        Subscription::new(move || {
            if let Some(state) = weak.upgrade() {
                state
                    .borrow_mut()
                    .observers
                    .retain(|(observer_id, _)| *observer_id != id);
            }
        })
    }

    /// Deliver `value` to all observers. Returns `false` if the signal is completed.
    pub fn emit(&self, value: &T) -> bool {
        let snapshot: Vec<(u64, Observer<T>)> = {
            let state = self.state.borrow();
            if state.completed {
                return false;
            }
            state.observers.clone()
        };

        for (id, observer) in snapshot {
            if !self.state.borrow().is_subscribed(id) {
                continue;
            }
            observer(value);
        }
        true
    }

    /// Complete the signal: drop all observers and refuse further emissions
    pub fn complete(&self) {
        let observers = {
            let mut state = self.state.borrow_mut();
            state.completed = true;
            std::mem::take(&mut state.observers)
        };
        // Observers are dropped outside the borrow in case their captures own signals
        drop(observers);
    }

    pub fn is_completed(&self) -> bool {
        self.state.borrow().completed
    }

    pub fn observer_count(&self) -> usize {
        self.state.borrow().observers.len()
    }
}

impl<T: 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Signal")
            .field("observers", &state.observers.len())
            .field("completed", &state.completed)
            .finish()
    }
}

/// Handle to an observer registration.
///
/// Unsubscribing is explicit and idempotent. Dropping the handle does not
/// unsubscribe.
pub struct Subscription {
    unsubscribe: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl Subscription {
    pub(crate) fn new(unsubscribe: impl FnOnce() + 'static) -> Self {
        Self {
            unsubscribe: RefCell::new(Some(Box::new(unsubscribe))),
        }
    }

    pub(crate) fn inactive() -> Self {
        Self {
            unsubscribe: RefCell::new(None),
        }
    }

    pub fn unsubscribe(&self) {
        let unsubscribe = self.unsubscribe.borrow_mut().take();
        if let Some(unsubscribe) = unsubscribe {
            unsubscribe();
        }
    }

    /// Whether `unsubscribe` has yet to be called
    pub fn is_active(&self) -> bool {
        self.unsubscribe.borrow().is_some()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn recorder<T: Clone + 'static>() -> (Rc<RefCell<Vec<T>>>, impl Fn(&T) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, move |value: &T| sink.borrow_mut().push(value.clone()))
    }

    #[test]
    fn test_multicast_in_subscription_order() {
        let signal = Signal::<String>::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&order);
        let _a = signal.subscribe(move |v: &String| first.borrow_mut().push(format!("a:{v}")));
        let second = Rc::clone(&order);
        let _b = signal.subscribe(move |v: &String| second.borrow_mut().push(format!("b:{v}")));

        assert!(signal.emit(&"x".to_string()));
        assert_eq!(*order.borrow(), vec!["a:x", "b:x"]);
    }

    #[test]
    fn test_no_replay_for_late_subscribers() {
        let signal = Signal::<u32>::new();
        signal.emit(&1);

        let (seen, observer) = recorder::<u32>();
        let _sub = signal.subscribe(observer);
        signal.emit(&2);

        assert_eq!(*seen.borrow(), vec![2]);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let signal = Signal::<u32>::new();
        let (seen, observer) = recorder::<u32>();
        let sub = signal.subscribe(observer);

        signal.emit(&1);
        sub.unsubscribe();
        assert!(!sub.is_active());
        sub.unsubscribe();
        signal.emit(&2);

        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(signal.observer_count(), 0);
    }

    #[test]
    fn test_unsubscribe_during_delivery() {
        let signal = Rc::new(Signal::<u32>::new());
        let calls = Rc::new(Cell::new(0));

        // The first observer removes the second before it is reached
        let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let victim_handle = Rc::clone(&victim);
        let _killer = signal.subscribe(move |_| {
            if let Some(sub) = victim_handle.borrow().as_ref() {
                sub.unsubscribe();
            }
        });
        let counter = Rc::clone(&calls);
        *victim.borrow_mut() = Some(signal.subscribe(move |_| counter.set(counter.get() + 1)));

        signal.emit(&1);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_subscribe_during_delivery_takes_effect_next_time() {
        let signal = Rc::new(Signal::<u32>::new());
        let (seen, observer) = recorder::<u32>();
        let observer = Rc::new(observer);
        let late: Rc<RefCell<Vec<Subscription>>> = Rc::new(RefCell::new(Vec::new()));

        let inner_signal = Rc::downgrade(&signal);
        let late_subs = Rc::clone(&late);
        let _sub = signal.subscribe(move |_| {
            if let Some(signal) = inner_signal.upgrade() {
                if late_subs.borrow().is_empty() {
                    let observer = Rc::clone(&observer);
                    late_subs
                        .borrow_mut()
                        .push(signal.subscribe(move |v: &u32| observer(v)));
                }
            }
        });

        signal.emit(&1);
        assert!(seen.borrow().is_empty());
        signal.emit(&2);
        assert_eq!(*seen.borrow(), vec![2]);
    }

    #[test]
    fn test_complete_stops_delivery() {
        let signal = Signal::<u32>::new();
        let (seen, observer) = recorder::<u32>();
        let sub = signal.subscribe(observer);

        signal.complete();
        assert!(signal.is_completed());
        assert!(!signal.emit(&1));
        assert!(seen.borrow().is_empty());

        // Unsubscribing after completion is harmless
        sub.unsubscribe();

        let late = signal.subscribe(|_| panic!("completed signals never deliver"));
        assert!(!late.is_active());
        signal.emit(&2);
    }
}
