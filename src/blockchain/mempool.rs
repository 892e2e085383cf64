use std::mem;

use crate::transaction::Message;

/// The two message queues plus the consumed-id watermark.
///
/// Messages land in `current`; each accepted block moves them to `previous`,
/// where miners pick them up for the next candidate. Not synchronised on its
/// own: the ledger holds it under its state lock, so a rotation never
/// interleaves with a push.
#[derive(Debug, Default)]
pub struct MessagePool {
    current: Vec<Message>,
    previous: Vec<Message>,
    max_message_id_previous_block: u64,
}

impl MessagePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.current.push(message);
    }

    /// Ids at or below this value were already offered to an accepted block.
    pub fn max_message_id_previous_block(&self) -> u64 {
        self.max_message_id_previous_block
    }

    pub fn current(&self) -> &[Message] {
        &self.current
    }

    pub fn previous(&self) -> &[Message] {
        &self.previous
    }

    /// Copy of the previous queue in id order, ready for a candidate block.
    pub fn previous_snapshot(&self) -> Vec<Message> {
        let mut messages = self.previous.clone();
        messages.sort_by_key(|m| m.id);
        messages
    }

    /// Advance the watermark past the outgoing previous queue, promote the
    /// current queue, and drop anything the watermark now covers.
    pub fn rotate(&mut self) {
        let outgoing_max = self.previous.iter().map(|m| m.id).max().unwrap_or(0);
        self.max_message_id_previous_block = self.max_message_id_previous_block.max(outgoing_max);

        self.previous = mem::take(&mut self.current);
        let watermark = self.max_message_id_previous_block;
        self.previous.retain(|m| m.id > watermark);
    }

    #[cfg(test)]
    pub(crate) fn set_max_message_id_previous_block(&mut self, watermark: u64) {
        self.max_message_id_previous_block = watermark;
    }
}

#[cfg(test)]
mod tests {
    use super::MessagePool;
    use crate::transaction::Message;

    fn msg(id: u64) -> Message {
        Message::new(id, "pk")
    }

    fn ids(messages: &[Message]) -> Vec<u64> {
        messages.iter().map(|m| m.id).collect()
    }

    #[test]
    fn message_survives_one_extra_round_then_is_dropped() {
        let mut pool = MessagePool::new();

        // round R
        pool.push(msg(5));
        pool.rotate();
        assert_eq!(ids(pool.previous()), vec![5]);
        assert_eq!(pool.max_message_id_previous_block(), 0);

        // round R+1: a candidate built now carries id 5
        assert_eq!(ids(&pool.previous_snapshot()), vec![5]);
        pool.rotate();
        assert_eq!(pool.max_message_id_previous_block(), 5);
        assert!(pool.previous().is_empty());

        // round R+2
        pool.rotate();
        assert!(pool.previous_snapshot().iter().all(|m| m.id != 5));
    }

    #[test]
    fn watermark_never_regresses() {
        let mut pool = MessagePool::new();
        pool.set_max_message_id_previous_block(10);
        pool.push(msg(11));
        pool.rotate();
        pool.rotate();
        assert_eq!(pool.max_message_id_previous_block(), 11);
        pool.rotate();
        assert_eq!(pool.max_message_id_previous_block(), 11);
    }

    #[test]
    fn rotation_prunes_covered_ids() {
        let mut pool = MessagePool::new();
        pool.push(msg(3));
        pool.rotate();
        // a late message with an id below the next watermark
        pool.push(msg(2));
        pool.push(msg(4));
        pool.rotate();
        assert_eq!(pool.max_message_id_previous_block(), 3);
        assert_eq!(ids(pool.previous()), vec![4]);
    }

    #[test]
    fn snapshot_is_sorted_by_id() {
        let mut pool = MessagePool::new();
        pool.push(msg(8));
        pool.push(msg(7));
        pool.rotate();
        assert_eq!(ids(&pool.previous_snapshot()), vec![7, 8]);
        assert_eq!(ids(pool.current()), Vec::<u64>::new());
    }
}
