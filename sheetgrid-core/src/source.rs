//! Push-style stream of full document content
//!
//! A [`ContentSource`] stands in for the host's document model: every
//! [`publish`](ContentSource::publish) carries the complete current content,
//! never a diff. Handlers run synchronously and in subscription order; the
//! first handler error stops delivery and is returned to the publisher so the
//! host can report it.

use crate::error::Result;
use crate::reader::Content;
use crate::signal::Subscription;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Handler = Rc<dyn Fn(&Content) -> Result<()>>;

#[derive(Default)]
struct SourceState {
    next_id: u64,
    handlers: Vec<(u64, Handler)>,
}

#[derive(Clone, Default)]
pub struct ContentSource {
    state: Rc<RefCell<SourceState>>,
}

impl ContentSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, handler: impl Fn(&Content) -> Result<()> + 'static) -> Subscription {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        let handler: Handler = Rc::new(handler);
        state.handlers.push((id, handler));

        let weak: Weak<RefCell<SourceState>> = Rc::downgrade(&self.state);
        Subscription::new(move || {
            if let Some(state) = weak.upgrade() {
                state
                    .borrow_mut()
                    .handlers
                    .retain(|(handler_id, _)| *handler_id != id);
            }
        })
    }

    /// Deliver new content to every subscriber, stopping at the first error
    pub fn publish(&self, content: Content) -> Result<()> {
        let handlers: Vec<(u64, Handler)> = self.state.borrow().handlers.clone();
        for (id, handler) in handlers {
            let subscribed = self
                .state
                .borrow()
                .handlers
                .iter()
                .any(|(handler_id, _)| *handler_id == id);
            if subscribed {
                handler(&content)?;
            }
        }
        Ok(())
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.borrow().handlers.len()
    }
}

impl fmt::Debug for ContentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentSource")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;

    #[test]
    fn test_publish_reaches_subscribers_in_order() {
        let source = ContentSource::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&seen);
        let _a = source.subscribe(move |content| {
            first.borrow_mut().push(("a", content.clone()));
            Ok(())
        });
        let second = Rc::clone(&seen);
        let _b = source.subscribe(move |content| {
            second.borrow_mut().push(("b", content.clone()));
            Ok(())
        });

        source.publish(Content::text("x")).unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![("a", Content::text("x")), ("b", Content::text("x"))]
        );
    }

    #[test]
    fn test_publish_propagates_first_error() {
        let source = ContentSource::new();
        let reached = Rc::new(RefCell::new(false));

        let _failing = source.subscribe(|_| Err(ModelError::parse("bad content")));
        let flag = Rc::clone(&reached);
        let _after = source.subscribe(move |_| {
            *flag.borrow_mut() = true;
            Ok(())
        });

        let result = source.publish(Content::text("x"));
        assert!(matches!(result, Err(ModelError::Parse(_))));
        assert!(!*reached.borrow());
    }

    #[test]
    fn test_unsubscribed_handler_is_not_called() {
        let source = ContentSource::new();
        let sub = source.subscribe(|_| Err(ModelError::parse("should not run")));
        sub.unsubscribe();
        sub.unsubscribe();

        assert_eq!(source.subscriber_count(), 0);
        assert!(source.publish(Content::text("x")).is_ok());
    }
}
