use loyalty_state::KeyValueState;
use loyalty_types::Partner;

use crate::error::LedgerResult;
use crate::keys::ALL_PARTNERS_KEY;
use crate::view::StateView;

/// Every partner ever created, in creation order, under one sentinel key.
///
/// Each append rewrites the whole list.
pub struct PartnerRegistry;

impl PartnerRegistry {
    pub fn append<S: KeyValueState + ?Sized>(
        view: &mut StateView<'_, S>,
        partner: &Partner,
    ) -> LedgerResult<()> {
        let mut partners: Vec<Partner> = view.get_list(ALL_PARTNERS_KEY)?;
        partners.push(partner.clone());
        view.put_json(ALL_PARTNERS_KEY, &partners)
    }

    pub fn all<S: KeyValueState + ?Sized>(
        view: &mut StateView<'_, S>,
    ) -> LedgerResult<Vec<Partner>> {
        view.get_list(ALL_PARTNERS_KEY)
    }
}
