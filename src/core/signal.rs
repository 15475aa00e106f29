//! Observable values with explicit subscribe/unsubscribe.
//!
//! Everything in the engine is single-threaded and event-driven, so signals
//! are `Rc`-based.  Publishing is synchronous: `set` calls every subscriber
//! before returning, with no implicit scheduling.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type Subscriber<T> = Rc<dyn Fn(&T)>;

struct SignalInner<T> {
    value: RefCell<T>,
    subscribers: RefCell<Vec<(u64, Subscriber<T>)>>,
    next_id: Cell<u64>,
}

impl<T> SignalInner<T> {
    fn is_subscribed(&self, id: u64) -> bool {
        self.subscribers.borrow().iter().any(|(sid, _)| *sid == id)
    }

    fn remove(&self, id: u64) {
        self.subscribers.borrow_mut().retain(|(sid, _)| *sid != id);
    }
}

/// A shared, observable value.
///
/// Cloning a `Signal` clones the handle, not the value.
pub struct Signal<T> {
    inner: Rc<SignalInner<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("value", &self.inner.value.borrow())
            .field("subscribers", &self.inner.subscribers.borrow().len())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Signal<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(SignalInner {
                value: RefCell::new(value),
                subscribers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Replace the value and notify subscribers.  Setting an equal value is a
    /// no-op.
    pub fn set(&self, value: T) {
        {
            let mut current = self.inner.value.borrow_mut();
            if *current == value {
                return;
            }
            *current = value.clone();
        }
        self.notify(&value);
    }

    /// Register `subscriber`; it runs on every change until the returned
    /// [`Subscription`] is dropped or unsubscribed.
    pub fn subscribe(&self, subscriber: impl Fn(&T) + 'static) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .subscribers
            .borrow_mut()
            .push((id, Rc::new(subscriber)));

        let weak: Weak<SignalInner<T>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.remove(id);
            }
        })
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    fn notify(&self, value: &T) {
        // Snapshot so subscribers may (un)subscribe while we dispatch.
        let snapshot: Vec<(u64, Subscriber<T>)> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .map(|(id, f)| (*id, Rc::clone(f)))
            .collect();
        for (id, subscriber) in snapshot {
            if self.inner.is_subscribed(id) {
                subscriber(value);
            }
        }
    }
}

// ───────────────────────────────────────── subscription ──────

/// Handle returned by [`Signal::subscribe`].  Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

// ───────────────────────────────────────── latest callback ───

/// Single-slot holder for the most recent callback.
///
/// Dispatch code reads the slot at call time, so replacing the callback never
/// requires tearing down the subscriptions that invoke it.  A callback may
/// replace itself; the new one takes over once the running call returns.
pub struct Latest<F: ?Sized> {
    slot: RefCell<Box<F>>,
    pending: RefCell<Option<Box<F>>>,
}

impl<F: ?Sized> Latest<F> {
    pub fn new(callback: Box<F>) -> Self {
        Self {
            slot: RefCell::new(callback),
            pending: RefCell::new(None),
        }
    }

    pub fn replace(&self, callback: Box<F>) {
        match self.slot.try_borrow_mut() {
            Ok(mut slot) => *slot = callback,
            Err(_) => *self.pending.borrow_mut() = Some(callback),
        }
    }

    /// Run `call` against the current callback.  Returns `None` without
    /// calling anything when the callback is already running further up the
    /// stack.
    pub fn try_with<R>(&self, call: impl FnOnce(&mut F) -> R) -> Option<R> {
        let result = {
            let mut slot = self.slot.try_borrow_mut().ok()?;
            call(&mut **slot)
        };
        if let Some(next) = self.pending.borrow_mut().take() {
            *self.slot.borrow_mut() = next;
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifies_only_on_change() {
        let signal = Signal::new(1);
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let _sub = signal.subscribe(move |_| seen.set(seen.get() + 1));

        signal.set(1);
        assert_eq!(calls.get(), 0);
        signal.set(2);
        signal.set(3);
        assert_eq!(calls.get(), 2);
        assert_eq!(signal.get(), 3);
    }

    #[test]
    fn dropping_subscription_stops_delivery() {
        let signal = Signal::new(0.0_f64);
        let last = Rc::new(Cell::new(0.0));
        let sink = Rc::clone(&last);
        let sub = signal.subscribe(move |v| sink.set(*v));

        signal.set(5.0);
        assert_eq!(last.get(), 5.0);

        sub.unsubscribe();
        signal.set(9.0);
        assert_eq!(last.get(), 5.0);
        assert_eq!(signal.subscriber_count(), 0);
    }

    #[test]
    fn subscriber_removed_mid_dispatch_is_skipped() {
        let signal = Signal::new(0);
        let second_calls = Rc::new(Cell::new(0));
        let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let victim_slot = Rc::clone(&victim);
        let _first = signal.subscribe(move |_| {
            victim_slot.borrow_mut().take();
        });
        let counter = Rc::clone(&second_calls);
        *victim.borrow_mut() = Some(signal.subscribe(move |_| counter.set(counter.get() + 1)));

        signal.set(1);
        assert_eq!(second_calls.get(), 0);
    }

    #[test]
    fn latest_reads_current_callback() {
        let latest: Latest<dyn FnMut(i32) -> i32> = Latest::new(Box::new(|v: i32| v + 1));
        assert_eq!(latest.try_with(|f| f(1)), Some(2));
        latest.replace(Box::new(|v: i32| v * 10));
        assert_eq!(latest.try_with(|f| f(1)), Some(10));
    }

    #[test]
    fn latest_is_not_reentered() {
        let latest: Rc<Latest<dyn FnMut() -> Option<i32>>> = Rc::new(Latest::new(Box::new(|| None)));
        let inner = Rc::clone(&latest);
        latest.replace(Box::new(move || inner.try_with(|f| f()).flatten()));
        assert_eq!(latest.try_with(|f| f()), Some(None));
    }

    #[test]
    fn latest_replaced_during_a_call_takes_over_afterwards() {
        let latest: Rc<Latest<dyn FnMut() -> i32>> = Rc::new(Latest::new(Box::new(|| 1)));
        let slot = Rc::clone(&latest);
        latest.replace(Box::new(move || {
            slot.replace(Box::new(|| 2));
            1
        }));
        assert_eq!(latest.try_with(|f| f()), Some(1));
        assert_eq!(latest.try_with(|f| f()), Some(2));
    }
}
