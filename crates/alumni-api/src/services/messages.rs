use std::sync::Arc;

use uuid::Uuid;

use alumni_db::Database;
use alumni_types::models::Message;

/// Append-only direct messages. Nothing here checks that a recipient exists,
/// that sender and recipient differ, or that the caller owns a message it
/// marks as read.
pub struct MessageService {
    db: Arc<Database>,
}

impl MessageService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn send(&self, sender: Uuid, recipient: Uuid, content: &str) -> anyhow::Result<Message> {
        let id = Uuid::new_v4().to_string();
        let row = self
            .db
            .insert_message(&id, &sender.to_string(), &recipient.to_string(), content)?;
        Ok(Message::from(row))
    }

    /// Received by `user`, newest first.
    pub fn inbox(&self, user: Uuid) -> anyhow::Result<Vec<Message>> {
        Ok(self.db.get_inbox(&user.to_string())?.into_iter().map(Message::from).collect())
    }

    /// Sent by `user`, newest first.
    pub fn sent(&self, user: Uuid) -> anyhow::Result<Vec<Message>> {
        Ok(self.db.get_sent(&user.to_string())?.into_iter().map(Message::from).collect())
    }

    pub fn conversation(&self, a: Uuid, b: Uuid) -> anyhow::Result<Vec<Message>> {
        Ok(self
            .db
            .get_conversation(&a.to_string(), &b.to_string())?
            .into_iter()
            .map(Message::from)
            .collect())
    }

    pub fn mark_read(&self, id: Uuid) -> anyhow::Result<Option<Message>> {
        Ok(self.db.mark_message_read(&id.to_string())?.map(Message::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_message_shows_up_in_every_view() {
        let service = MessageService::new(Arc::new(Database::open_in_memory().unwrap()));
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

        let sent = service.send(alice, bob, "hello").unwrap();
        assert!(!sent.read);
        assert_eq!(sent.sender.id, alice);
        assert_eq!(sent.recipient.id, bob);

        let only = |list: Vec<Message>| list.into_iter().map(|m| m.id).collect::<Vec<_>>();
        assert_eq!(only(service.inbox(bob).unwrap()), vec![sent.id]);
        assert_eq!(only(service.sent(alice).unwrap()), vec![sent.id]);
        assert!(service.inbox(alice).unwrap().is_empty());
        assert_eq!(only(service.conversation(alice, bob).unwrap()), vec![sent.id]);
        assert_eq!(only(service.conversation(bob, alice).unwrap()), vec![sent.id]);

        let read = service.mark_read(sent.id).unwrap().unwrap();
        assert!(read.read);
        assert!(service.inbox(bob).unwrap()[0].read);
    }

    #[test]
    fn self_addressed_messages_are_accepted() {
        let service = MessageService::new(Arc::new(Database::open_in_memory().unwrap()));
        let me = Uuid::new_v4();
        let note = service.send(me, me, "reminder").unwrap();
        assert_eq!(note.sender, note.recipient);
        assert!(service.mark_read(Uuid::new_v4()).unwrap().is_none());
    }
}
