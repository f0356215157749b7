use super::IReminderRepo;
use crate::repos::shared::inmemory_repo::*;
use nudge_domain::Reminder;

pub struct InMemoryReminderRepo {
    reminders: std::sync::Mutex<Vec<Reminder>>,
}

impl InMemoryReminderRepo {
    pub fn new() -> Self {
        Self {
            reminders: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl IReminderRepo for InMemoryReminderRepo {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()> {
        insert(reminder, &self.reminders);
        Ok(())
    }

    async fn find(&self, reminder_id: &str) -> anyhow::Result<Option<Reminder>> {
        Ok(find(&reminder_id.to_string(), &self.reminders))
    }

    async fn find_by_receiver(&self, receiver_id: i64) -> anyhow::Result<Vec<Reminder>> {
        let mut reminders = find_by(&self.reminders, |r| r.receiver_id == receiver_id);
        reminders.sort_by_key(|r| r.remind_at);
        Ok(reminders)
    }

    async fn update_remind_at(
        &self,
        reminder_id: &str,
        remind_at: i64,
    ) -> anyhow::Result<Option<Reminder>> {
        Ok(update_one(
            &reminder_id.to_string(),
            &self.reminders,
            |reminder| reminder.remind_at = remind_at,
        ))
    }

    async fn delete(&self, reminder_id: &str) -> anyhow::Result<Option<Reminder>> {
        Ok(delete(&reminder_id.to_string(), &self.reminders))
    }
}
