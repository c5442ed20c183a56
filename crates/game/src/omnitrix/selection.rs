//! Pending-form selection and the channel UI code uses to ask for a form.

use std::sync::mpsc::{self, Receiver, Sender};

use super::error::TransformError;
use super::form::FormId;

/// Which form the next transform press will pick.
#[derive(Debug, Clone)]
pub struct Selection {
    pending: FormId,
    count: usize,
}

impl Selection {
    /// Starts on the first alien when there is one.
    pub fn new(count: usize) -> Self {
        let pending = if count > 1 { FormId(1) } else { FormId::BASE };
        Self { pending, count: count.max(1) }
    }

    pub fn pending(&self) -> FormId {
        self.pending
    }

    /// Advance to the next registered form, wrapping to the base form.
    pub fn select_next(&mut self) -> FormId {
        self.pending = FormId((self.pending.index() + 1) % self.count);
        self.pending
    }

    pub fn select(&mut self, index: usize) -> Result<FormId, TransformError> {
        if index >= self.count {
            return Err(TransformError::InvalidFormIndex { index, count: self.count });
        }
        self.pending = FormId(index);
        Ok(self.pending)
    }
}

/// A request from a selection UI. Asking for the base form means "revert".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionEvent {
    pub form: FormId,
}

impl SelectionEvent {
    pub fn form(form: FormId) -> Self {
        Self { form }
    }

    pub fn revert() -> Self {
        Self { form: FormId::BASE }
    }
}

/// Sending half, handed to wheels, menus and scripts. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SelectionSender(Sender<SelectionEvent>);

impl SelectionSender {
    /// False when the coordinator has gone away.
    pub fn send(&self, event: SelectionEvent) -> bool {
        match self.0.send(event) {
            Ok(()) => true,
            Err(_) => {
                log::warn!("Selection {:?} dropped: nobody is listening", event.form);
                false
            }
        }
    }
}

/// Receiving half, drained by the coordinator once per tick.
#[derive(Debug)]
pub struct SelectionInbox(Receiver<SelectionEvent>);

impl SelectionInbox {
    pub fn drain(&self) -> Vec<SelectionEvent> {
        self.0.try_iter().collect()
    }
}

pub fn selection_channel() -> (SelectionSender, SelectionInbox) {
    let (tx, rx) = mpsc::channel();
    (SelectionSender(tx), SelectionInbox(rx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_next_wraps_through_every_form() {
        let mut selection = Selection::new(3);
        assert_eq!(selection.pending(), FormId(1));
        assert_eq!(selection.select_next(), FormId(2));
        assert_eq!(selection.select_next(), FormId(0));
        assert_eq!(selection.select_next(), FormId(1));
    }

    #[test]
    fn base_only_roster_stays_on_base() {
        let mut selection = Selection::new(1);
        assert_eq!(selection.pending(), FormId::BASE);
        assert_eq!(selection.select_next(), FormId::BASE);
    }

    #[test]
    fn out_of_range_select_leaves_pending_alone() {
        let mut selection = Selection::new(3);
        assert_eq!(selection.select(2), Ok(FormId(2)));
        assert_eq!(
            selection.select(3),
            Err(TransformError::InvalidFormIndex { index: 3, count: 3 })
        );
        assert_eq!(selection.pending(), FormId(2));
    }

    #[test]
    fn channel_delivers_in_order_and_detects_hangup() {
        let (tx, inbox) = selection_channel();
        let other = tx.clone();
        assert!(tx.send(SelectionEvent::form(FormId(2))));
        assert!(other.send(SelectionEvent::revert()));
        assert_eq!(
            inbox.drain(),
            vec![SelectionEvent::form(FormId(2)), SelectionEvent::revert()]
        );
        assert!(inbox.drain().is_empty());
        drop(inbox);
        assert!(!tx.send(SelectionEvent::revert()));
    }
}
