use std::sync::Arc;

use loyalty_state::KeyValueState;
use loyalty_types::{JournalKind, PointTransaction, Role};

use crate::error::LedgerResult;
use crate::keys::{EARN_JOURNAL_KEY, SPEND_JOURNAL_KEY};
use crate::view::StateView;

/// The earn and spend journals.
///
/// Each journal is a JSON array under its sentinel key. Entries are only ever
/// appended; an append rewrites the whole array.
pub struct TransactionJournal;

impl TransactionJournal {
    /// Sentinel key holding the journal of `kind`.
    pub fn key(kind: JournalKind) -> &'static str {
        match kind {
            JournalKind::Earn => EARN_JOURNAL_KEY,
            JournalKind::Spend => SPEND_JOURNAL_KEY,
        }
    }

    /// All entries of `kind`, in commit order.
    pub fn load<S: KeyValueState + ?Sized>(
        view: &mut StateView<'_, S>,
        kind: JournalKind,
    ) -> LedgerResult<Vec<PointTransaction>> {
        view.get_list(Self::key(kind))
    }

    pub fn append<S: KeyValueState + ?Sized>(
        view: &mut StateView<'_, S>,
        kind: JournalKind,
        tx: &PointTransaction,
    ) -> LedgerResult<()> {
        let mut entries = Self::load(view, kind)?;
        entries.push(tx.clone());
        view.put_json(Self::key(kind), &entries)
    }

    /// Entries of `kind` belonging to `id` under `role`, in commit order.
    pub fn filter<S: KeyValueState + ?Sized>(
        view: &mut StateView<'_, S>,
        kind: JournalKind,
        role: Role,
        id: &str,
    ) -> LedgerResult<JournalFilter> {
        let entries = Self::load(view, kind)?;
        Ok(JournalFilter::new(entries.into(), role, id))
    }

    /// Returns `true` if either journal already holds `transaction_id`.
    pub fn contains<S: KeyValueState + ?Sized>(
        view: &mut StateView<'_, S>,
        transaction_id: &str,
    ) -> LedgerResult<bool> {
        for kind in JournalKind::ALL {
            if Self::load(view, kind)?
                .iter()
                .any(|tx| tx.transaction_id == transaction_id)
            {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Lazy iterator over the journal entries matching one role and id.
///
/// Cloning yields an independent cursor over the same snapshot, so a filter
/// can be restarted by cloning it before iterating.
#[derive(Clone, Debug)]
pub struct JournalFilter {
    entries: Arc<[PointTransaction]>,
    role: Role,
    id: String,
    position: usize,
}

impl JournalFilter {
    fn new(entries: Arc<[PointTransaction]>, role: Role, id: &str) -> Self {
        Self {
            entries,
            role,
            id: id.to_string(),
            position: 0,
        }
    }

    /// A fresh cursor positioned at the start of the snapshot.
    pub fn restart(&self) -> Self {
        Self {
            position: 0,
            ..self.clone()
        }
    }
}

impl Iterator for JournalFilter {
    type Item = PointTransaction;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(tx) = self.entries.get(self.position) {
            self.position += 1;
            if self.role.matches(tx, &self.id) {
                return Some(tx.clone());
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.entries.len().saturating_sub(self.position)))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use loyalty_state::InMemoryState;

    use super::*;

    fn tx(id: &str, member: &str, partner: &str, points: i64) -> PointTransaction {
        PointTransaction {
            transaction_id: id.into(),
            member: member.into(),
            partner: partner.into(),
            points,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    fn ids(filter: JournalFilter) -> Vec<String> {
        filter.map(|t| t.transaction_id).collect()
    }

    #[test]
    fn filter_preserves_order_under_interleaving() {
        let state = InMemoryState::new();
        let mut view = StateView::new(&state);
        let entries = [
            tx("t1", "A1", "P1", 5),
            tx("t2", "B2", "P1", 7),
            tx("t3", "A1", "P2", 9),
            tx("t4", "B2", "P2", 1),
            tx("t5", "A1", "P1", 3),
        ];
        for e in &entries {
            TransactionJournal::append(&mut view, JournalKind::Earn, e).unwrap();
        }

        let by_member =
            TransactionJournal::filter(&mut view, JournalKind::Earn, Role::Member, "A1").unwrap();
        assert_eq!(ids(by_member), ["t1", "t3", "t5"]);

        let by_partner =
            TransactionJournal::filter(&mut view, JournalKind::Earn, Role::Partner, "P2").unwrap();
        assert_eq!(ids(by_partner), ["t3", "t4"]);
    }

    #[test]
    fn filter_does_not_mix_journals() {
        let state = InMemoryState::new();
        let mut view = StateView::new(&state);
        TransactionJournal::append(&mut view, JournalKind::Earn, &tx("e", "A1", "P1", 1)).unwrap();
        TransactionJournal::append(&mut view, JournalKind::Spend, &tx("s", "A1", "P1", 1))
            .unwrap();

        let spent =
            TransactionJournal::filter(&mut view, JournalKind::Spend, Role::Member, "A1").unwrap();
        assert_eq!(ids(spent), ["s"]);
    }

    #[test]
    fn filter_is_restartable() {
        let state = InMemoryState::new();
        let mut view = StateView::new(&state);
        TransactionJournal::append(&mut view, JournalKind::Earn, &tx("t1", "A1", "P1", 1)).unwrap();
        TransactionJournal::append(&mut view, JournalKind::Earn, &tx("t2", "A1", "P1", 1)).unwrap();

        let mut filter =
            TransactionJournal::filter(&mut view, JournalKind::Earn, Role::Member, "A1").unwrap();
        assert!(filter.next().is_some());
        let rest: Vec<_> = filter.clone().collect();
        assert_eq!(rest.len(), 1);
        assert_eq!(ids(filter.restart()), ["t1", "t2"]);
    }

    #[test]
    fn contains_checks_both_journals() {
        let state = InMemoryState::new();
        let mut view = StateView::new(&state);
        TransactionJournal::append(&mut view, JournalKind::Spend, &tx("s1", "A1", "P1", 1))
            .unwrap();
        assert!(TransactionJournal::contains(&mut view, "s1").unwrap());
        assert!(!TransactionJournal::contains(&mut view, "e1").unwrap());
    }

    #[test]
    fn absent_journal_filters_to_nothing() {
        let state = InMemoryState::new();
        let mut view = StateView::new(&state);
        let filter =
            TransactionJournal::filter(&mut view, JournalKind::Earn, Role::Member, "A1").unwrap();
        assert_eq!(filter.count(), 0);
    }
}
