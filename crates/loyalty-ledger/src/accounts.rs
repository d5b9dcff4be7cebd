use loyalty_state::KeyValueState;
use loyalty_types::{validate_member, validate_partner, Member, Partner};
use tracing::debug;

use crate::error::{LedgerError, LedgerResult};
use crate::keys;
use crate::registry::PartnerRegistry;
use crate::view::StateView;

/// Member and partner records, each stored under its own identifier.
///
/// Members and partners share one key space: an account number may not
/// reuse a partner id and vice versa.
pub struct AccountStore;

impl AccountStore {
    /// Validate and stage a new member record.
    pub fn create_member<S: KeyValueState + ?Sized>(
        view: &mut StateView<'_, S>,
        profile: &Member,
        strict: bool,
    ) -> LedgerResult<Member> {
        validate_member(profile, strict)?;
        Self::claim_key(view, &profile.account_number)?;
        view.put_json(&profile.account_number, profile)?;
        debug!(account = %profile.account_number, "staged new member");
        Ok(profile.clone())
    }

    /// Validate and stage a new partner record, appending it to the registry
    /// in the same write set.
    pub fn create_partner<S: KeyValueState + ?Sized>(
        view: &mut StateView<'_, S>,
        profile: &Partner,
        strict: bool,
    ) -> LedgerResult<Partner> {
        validate_partner(profile, strict)?;
        Self::claim_key(view, &profile.id)?;
        view.put_json(&profile.id, profile)?;
        PartnerRegistry::append(view, profile)?;
        debug!(partner = %profile.id, "staged new partner");
        Ok(profile.clone())
    }

    /// Load a member. A key holding anything other than a member record
    /// (a partner, a sentinel aggregate) is reported as not found.
    pub fn get_member<S: KeyValueState + ?Sized>(
        view: &mut StateView<'_, S>,
        account_number: &str,
    ) -> LedgerResult<Member> {
        let not_found = || LedgerError::AccountNotFound(account_number.to_string());
        if keys::is_reserved(account_number) {
            return Err(not_found());
        }
        let raw = view.get(account_number)?.ok_or_else(not_found)?;
        Member::from_record(&raw)
            .map_err(|e| LedgerError::read_failure(account_number, format!("decode member: {e}")))?
            .ok_or_else(not_found)
    }

    pub fn get_partner<S: KeyValueState + ?Sized>(
        view: &mut StateView<'_, S>,
        partner_id: &str,
    ) -> LedgerResult<Partner> {
        let not_found = || LedgerError::PartnerNotFound(partner_id.to_string());
        if keys::is_reserved(partner_id) {
            return Err(not_found());
        }
        let raw = view.get(partner_id)?.ok_or_else(not_found)?;
        Partner::from_record(&raw)
            .map_err(|e| LedgerError::read_failure(partner_id, format!("decode partner: {e}")))?
            .ok_or_else(not_found)
    }

    /// Overwrite a member record after a balance change.
    pub fn save_member<S: KeyValueState + ?Sized>(
        view: &mut StateView<'_, S>,
        member: &Member,
    ) -> LedgerResult<()> {
        view.put_json(&member.account_number, member)
    }

    fn claim_key<S: KeyValueState + ?Sized>(
        view: &mut StateView<'_, S>,
        key: &str,
    ) -> LedgerResult<()> {
        if keys::is_reserved(key) {
            return Err(LedgerError::InvalidInput(format!("{key} is a reserved key")));
        }
        if view.exists(key)? {
            return Err(LedgerError::DuplicateAccount(key.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use loyalty_state::{InMemoryState, KeyValueState};

    use super::*;
    use crate::ErrorKind;

    fn member(account: &str) -> Member {
        Member {
            first_name: "Alan".into(),
            last_name: "Turing".into(),
            email: "alan@example.com".into(),
            phone_number: "555 0199".into(),
            account_number: account.into(),
            card_id: "card-1".into(),
            points: 0,
        }
    }

    fn partner(id: &str) -> Partner {
        Partner {
            name: "Bakery".into(),
            id: id.into(),
            card_id: "pc-1".into(),
        }
    }

    #[test]
    fn create_then_get_member() {
        let state = InMemoryState::new();
        let mut view = StateView::new(&state);
        AccountStore::create_member(&mut view, &member("A1"), true).unwrap();
        assert_eq!(AccountStore::get_member(&mut view, "A1").unwrap(), member("A1"));
    }

    #[test]
    fn duplicate_member_rejected() {
        let state = InMemoryState::new();
        let mut view = StateView::new(&state);
        AccountStore::create_member(&mut view, &member("A1"), true).unwrap();
        let err = AccountStore::create_member(&mut view, &member("A1"), true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateAccount);
    }

    #[test]
    fn member_cannot_take_partner_key() {
        let state = InMemoryState::new();
        let mut view = StateView::new(&state);
        AccountStore::create_partner(&mut view, &partner("X"), true).unwrap();
        let err = AccountStore::create_member(&mut view, &member("X"), true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateAccount);
    }

    #[test]
    fn reserved_key_rejected() {
        let state = InMemoryState::new();
        let mut view = StateView::new(&state);
        let err =
            AccountStore::create_member(&mut view, &member(keys::ALL_PARTNERS_KEY), true)
                .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn missing_records_are_not_found() {
        let state = InMemoryState::new();
        let mut view = StateView::new(&state);
        assert_eq!(
            AccountStore::get_member(&mut view, "nope").unwrap_err().kind(),
            ErrorKind::AccountNotFound
        );
        assert_eq!(
            AccountStore::get_partner(&mut view, "nope").unwrap_err().kind(),
            ErrorKind::PartnerNotFound
        );
    }

    #[test]
    fn other_record_kinds_are_not_found() {
        let state = InMemoryState::new();
        let mut view = StateView::new(&state);
        AccountStore::create_partner(&mut view, &partner("P1"), true).unwrap();
        AccountStore::create_member(&mut view, &member("A1"), true).unwrap();
        assert_eq!(
            AccountStore::get_member(&mut view, "P1").unwrap_err().kind(),
            ErrorKind::AccountNotFound
        );
        assert_eq!(
            AccountStore::get_partner(&mut view, "A1").unwrap_err().kind(),
            ErrorKind::PartnerNotFound
        );
    }

    #[test]
    fn sentinel_keys_are_not_accounts() {
        let state = InMemoryState::new();
        state.put(keys::INIT_KEY, keys::INIT_MARKER).unwrap();
        state.put(keys::EARN_JOURNAL_KEY, b"[]").unwrap();
        let mut view = StateView::new(&state);
        for key in keys::RESERVED_KEYS {
            assert_eq!(
                AccountStore::get_member(&mut view, key).unwrap_err().kind(),
                ErrorKind::AccountNotFound,
                "{key}"
            );
            assert_eq!(
                AccountStore::get_partner(&mut view, key).unwrap_err().kind(),
                ErrorKind::PartnerNotFound,
                "{key}"
            );
        }
    }

    #[test]
    fn corrupt_member_record_is_read_failure() {
        let state = InMemoryState::new();
        state.put("A1", br#"{"accountNumber":"A1","points":"lots"}"#).unwrap();
        state.put("B2", b"\xff not json").unwrap();
        let mut view = StateView::new(&state);
        for key in ["A1", "B2"] {
            assert_eq!(
                AccountStore::get_member(&mut view, key).unwrap_err().kind(),
                ErrorKind::StateReadFailure
            );
        }
    }

    #[test]
    fn create_partner_appends_to_registry() {
        let state = InMemoryState::new();
        let mut view = StateView::new(&state);
        AccountStore::create_partner(&mut view, &partner("P1"), true).unwrap();
        AccountStore::create_partner(&mut view, &partner("P2"), true).unwrap();
        let all = PartnerRegistry::all(&mut view).unwrap();
        assert_eq!(all.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(), ["P1", "P2"]);
    }
}
