//! In-memory roster view over the fetched member list.
//!
//! Filtering and statistics run locally; a successful check-in is
//! applied in place so the counters stay consistent without a re-fetch.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domains::member::models::Member;

#[derive(Debug, Clone, Default)]
pub struct Roster {
    members: Vec<Member>,
}

/// Summary counters displayed on the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterStats {
    pub total: usize,
    pub checked_in: usize,
    pub pending: usize,
    /// Percentage rounded to the nearest integer; 0 for an empty roster.
    pub check_in_rate: u32,
}

impl Roster {
    pub fn new(members: Vec<Member>) -> Self {
        Self { members }
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Replace the view with a fresh fetch result.
    pub fn refresh(&mut self, members: Vec<Member>) {
        self.members = members;
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Case-insensitive substring filter over name, email, and id.
    /// An empty query matches everything, in stored order.
    pub fn filter(&self, query: &str) -> Vec<&Member> {
        let query = query.to_lowercase();
        self.members
            .iter()
            .filter(|member| {
                member.name.to_lowercase().contains(&query)
                    || member.email.to_lowercase().contains(&query)
                    || member.id.to_lowercase().contains(&query)
            })
            .collect()
    }

    pub fn stats(&self) -> RosterStats {
        let total = self.members.len();
        let checked_in = self.members.iter().filter(|m| m.checked_in).count();
        let pending = total - checked_in;
        let check_in_rate = if total > 0 {
            ((checked_in as f64 / total as f64) * 100.0).round() as u32
        } else {
            0
        };

        RosterStats {
            total,
            checked_in,
            pending,
            check_in_rate,
        }
    }

    /// Mark a row checked in after a successful store write. Returns
    /// false when the id is not in the view.
    pub fn apply_check_in(&mut self, member_id: &str, at: DateTime<Utc>) -> bool {
        match self.members.iter_mut().find(|m| m.id == member_id) {
            Some(member) => {
                member.checked_in = true;
                member.checked_in_at = Some(at);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::member::models::Role;

    fn member(id: &str, name: &str, email: &str, checked_in: bool) -> Member {
        Member {
            id: id.to_string(),
            uid: Some(id.to_string()),
            email: email.to_string(),
            name: name.to_string(),
            avatar_url: String::new(),
            role: Role::User,
            created_at: None,
            last_login_at: None,
            checked_in,
            checked_in_at: None,
            is_pre_registered: false,
            updated_at: None,
        }
    }

    fn sample_roster() -> Roster {
        Roster::new(vec![
            member("uid1", "Ada Lovelace", "ada@x.com", true),
            member("uid2", "Grace Hopper", "grace@x.com", false),
            member("uid3", "Alan Turing", "alan@y.org", false),
            member("uid4", "Edsger Dijkstra", "edsger@y.org", false),
        ])
    }

    #[test]
    fn test_empty_query_returns_all_in_order() {
        let roster = sample_roster();
        let all = roster.filter("");
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].id, "uid1");
        assert_eq!(all[3].id, "uid4");
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let roster = sample_roster();
        assert_eq!(roster.filter("GRACE").len(), 1);
        assert_eq!(roster.filter("y.org").len(), 2);
        assert_eq!(roster.filter("UID1").len(), 1);
    }

    #[test]
    fn test_filter_no_match() {
        let roster = sample_roster();
        assert!(roster.filter("nobody").is_empty());
    }

    #[test]
    fn test_stats_rounding() {
        // 1 of 4 checked in -> 25%
        let stats = sample_roster().stats();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.checked_in, 1);
        assert_eq!(stats.pending, 3);
        assert_eq!(stats.check_in_rate, 25);
    }

    #[test]
    fn test_stats_rounds_to_nearest() {
        // 1 of 3 checked in -> 33%, 2 of 3 -> 67%
        let roster = Roster::new(vec![
            member("a", "A", "a@x.com", true),
            member("b", "B", "b@x.com", false),
            member("c", "C", "c@x.com", false),
        ]);
        assert_eq!(roster.stats().check_in_rate, 33);

        let roster = Roster::new(vec![
            member("a", "A", "a@x.com", true),
            member("b", "B", "b@x.com", true),
            member("c", "C", "c@x.com", false),
        ]);
        assert_eq!(roster.stats().check_in_rate, 67);
    }

    #[test]
    fn test_stats_empty_roster_has_zero_rate() {
        let stats = Roster::new(Vec::new()).stats();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.check_in_rate, 0);
    }

    #[test]
    fn test_apply_check_in_updates_stats() {
        let mut roster = sample_roster();
        let at = Utc::now();

        assert!(roster.apply_check_in("uid2", at));
        let stats = roster.stats();
        assert_eq!(stats.checked_in, 2);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.check_in_rate, 50);

        let updated = roster.filter("uid2")[0];
        assert!(updated.checked_in);
        assert_eq!(updated.checked_in_at, Some(at));
    }

    #[test]
    fn test_apply_check_in_unknown_id() {
        let mut roster = sample_roster();
        assert!(!roster.apply_check_in("uid99", Utc::now()));
    }
}
