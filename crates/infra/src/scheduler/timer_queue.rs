use nudge_domain::ID;
use std::collections::{BTreeSet, HashMap};

/// In-memory index of when each armed job is due. At most one timer per job.
#[derive(Debug, Default)]
pub struct TimerQueue {
    due: BTreeSet<(i64, ID)>,
    armed: HashMap<ID, i64>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Default::default()
    }

    /// Arms the job to be due at `run_at` millis, replacing any earlier timer of the job
    pub fn arm(&mut self, job_id: ID, run_at: i64) {
        if let Some(previous) = self.armed.insert(job_id.clone(), run_at) {
            self.due.remove(&(previous, job_id.clone()));
        }
        self.due.insert((run_at, job_id));
    }

    pub fn disarm(&mut self, job_id: &ID) -> bool {
        match self.armed.remove(job_id) {
            Some(run_at) => {
                self.due.remove(&(run_at, job_id.clone()));
                true
            }
            None => false,
        }
    }

    /// Removes and returns every job due at or before `now`, earliest first
    pub fn pop_due(&mut self, now: i64) -> Vec<ID> {
        let mut due = Vec::new();
        while self.next_run_at().map(|run_at| run_at <= now) == Some(true) {
            if let Some((_, job_id)) = self.due.pop_first() {
                self.armed.remove(&job_id);
                due.push(job_id);
            }
        }
        due
    }

    pub fn next_run_at(&self) -> Option<i64> {
        self.due.iter().next().map(|(run_at, _)| *run_at)
    }

    pub fn len(&self) -> usize {
        self.armed.len()
    }

    pub fn clear(&mut self) {
        self.due.clear();
        self.armed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_due_jobs_in_order() {
        let mut queue = TimerQueue::new();
        let (a, b, c) = (ID::default(), ID::default(), ID::default());
        queue.arm(c.clone(), 300);
        queue.arm(a.clone(), 100);
        queue.arm(b.clone(), 200);
        assert_eq!(queue.next_run_at(), Some(100));

        assert!(queue.pop_due(50).is_empty());
        assert_eq!(queue.pop_due(200), vec![a, b]);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.next_run_at(), Some(300));
        assert_eq!(queue.pop_due(1000), vec![c]);
        assert_eq!(queue.next_run_at(), None);
    }

    #[test]
    fn arming_twice_keeps_one_timer() {
        let mut queue = TimerQueue::new();
        let job_id = ID::default();
        queue.arm(job_id.clone(), 100);
        queue.arm(job_id.clone(), 500);
        assert_eq!(queue.len(), 1);
        assert!(queue.pop_due(499).is_empty());
        assert_eq!(queue.pop_due(500), vec![job_id]);
    }

    #[test]
    fn disarmed_jobs_never_become_due() {
        let mut queue = TimerQueue::new();
        let job_id = ID::default();
        queue.arm(job_id.clone(), 100);
        assert!(queue.disarm(&job_id));
        assert!(!queue.disarm(&job_id));
        assert!(queue.pop_due(1000).is_empty());
    }
}
