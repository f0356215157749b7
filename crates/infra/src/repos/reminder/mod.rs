mod inmemory;
mod postgres;

pub use inmemory::InMemoryReminderRepo;
use nudge_domain::Reminder;
pub use postgres::PostgresReminderRepo;

/// The Reminder Registry
#[async_trait::async_trait]
pub trait IReminderRepo: Send + Sync {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()>;
    async fn find(&self, reminder_id: &str) -> anyhow::Result<Option<Reminder>>;
    /// Every reminder of the receiver, ordered by when they fire
    async fn find_by_receiver(&self, receiver_id: i64) -> anyhow::Result<Vec<Reminder>>;
    async fn update_remind_at(
        &self,
        reminder_id: &str,
        remind_at: i64,
    ) -> anyhow::Result<Option<Reminder>>;
    async fn delete(&self, reminder_id: &str) -> anyhow::Result<Option<Reminder>>;
}

#[cfg(test)]
mod tests {
    use crate::repos::tests::create_repos;
    use nudge_domain::{Reminder, ReminderType, ID};

    fn reminder_factory(receiver_id: i64, reminder_type: ReminderType, remind_at: i64) -> Reminder {
        let created_at = 1_613_862_000_000;
        Reminder {
            id: Reminder::derive_id(reminder_type, receiver_id, created_at),
            job_id: ID::default(),
            receiver_id,
            reminder_type,
            remind_at,
            created_at,
        }
    }

    // Receiver ids are random so that runs against a shared database do not collide
    fn receiver_id() -> i64 {
        ID::default().inner().as_u128() as i64 & 0x7fff_ffff_ffff
    }

    #[tokio::test]
    async fn crud() {
        for repos in create_repos().await {
            let receiver_id = receiver_id();
            let reminder = reminder_factory(receiver_id, ReminderType::Minor, 1_621_638_000_000);
            repos
                .reminders
                .insert(&reminder)
                .await
                .expect("To insert reminder");

            let found = repos
                .reminders
                .find(&reminder.id)
                .await
                .unwrap()
                .expect("To find reminder");
            assert_eq!(found, reminder);

            let updated = repos
                .reminders
                .update_remind_at(&reminder.id, 1_622_638_000_500)
                .await
                .unwrap()
                .expect("To update reminder");
            assert_eq!(updated.remind_at, 1_622_638_000_500);
            assert_eq!(updated.created_at, reminder.created_at);

            let deleted = repos.reminders.delete(&reminder.id).await.unwrap();
            assert!(deleted.is_some());
            assert!(repos.reminders.find(&reminder.id).await.unwrap().is_none());
            assert!(repos.reminders.delete(&reminder.id).await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn finds_reminders_of_receiver_in_firing_order() {
        for repos in create_repos().await {
            let receiver_id = receiver_id();
            let major = reminder_factory(receiver_id, ReminderType::Major, 2_000_000_000_000);
            let minor = reminder_factory(receiver_id, ReminderType::Minor, 1_000_000_000_000);
            let other = reminder_factory(receiver_id + 1, ReminderType::Minor, 1_000_000_000_000);
            for reminder in [&major, &minor, &other].iter() {
                repos.reminders.insert(reminder).await.unwrap();
            }

            let reminders = repos.reminders.find_by_receiver(receiver_id).await.unwrap();
            assert_eq!(reminders, vec![minor.clone(), major.clone()]);

            for reminder in [&major, &minor, &other].iter() {
                repos.reminders.delete(&reminder.id).await.unwrap();
            }
            assert!(repos
                .reminders
                .find_by_receiver(receiver_id)
                .await
                .unwrap()
                .is_empty());
        }
    }
}
