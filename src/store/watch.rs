use super::model::PlayerState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&PlayerState)>;

/// Selector-scoped listeners, notified in subscription order.
#[derive(Default)]
pub(super) struct Watchers {
    next_id: u64,
    entries: Vec<(SubscriptionId, Listener)>,
}

impl Watchers {
    pub fn add<T, S, F>(&mut self, current: &PlayerState, selector: S, mut on_change: F) -> SubscriptionId
    where
        T: PartialEq + 'static,
        S: Fn(&PlayerState) -> T + 'static,
        F: FnMut(&T, &PlayerState) + 'static,
    {
        let mut last = selector(current);
        let listener: Listener = Box::new(move |state: &PlayerState| {
            let next = selector(state);
            if next != last {
                on_change(&next, state);
                last = next;
            }
        });

        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub fn notify(&mut self, state: &PlayerState) {
        for (_, listener) in &mut self.entries {
            listener(state);
        }
    }
}
