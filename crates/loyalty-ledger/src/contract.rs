use loyalty_state::KeyValueState;
use loyalty_types::{
    validate_request, JournalKind, Member, Partner, PointTransaction, PointsRequest, Role,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::accounts::AccountStore;
use crate::audit::BalanceAudit;
use crate::config::LedgerConfig;
use crate::context::InvocationContext;
use crate::error::{ErrorKind, LedgerError, LedgerResult};
use crate::journal::{JournalFilter, TransactionJournal};
use crate::keys::{ALL_PARTNERS_KEY, INIT_KEY, INIT_MARKER};
use crate::registry::PartnerRegistry;
use crate::view::StateView;

/// Result of [`LedgerContract::init`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitOutcome {
    /// The marker was absent and has now been written.
    Initialized,
    /// The marker was already present; nothing was written.
    AlreadyInitialized,
}

/// The loyalty-point contract.
///
/// Every mutating operation runs as one invocation: it opens a
/// [`StateView`], validates, stages its writes, and hands the resulting
/// batch to [`KeyValueState::apply`] only if every step succeeded. A failed
/// operation leaves the state exactly as it was.
///
/// The contract holds no state of its own besides its configuration; given
/// the same state, configuration, inputs, and invocation context, every
/// replica computes the same batch.
pub struct LedgerContract<S> {
    state: S,
    config: LedgerConfig,
}

impl<S: KeyValueState> LedgerContract<S> {
    pub fn new(state: S) -> Self {
        Self::with_config(state, LedgerConfig::default())
    }

    pub fn with_config(state: S, config: LedgerConfig) -> Self {
        Self { state, config }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn into_state(self) -> S {
        self.state
    }

    // ---- Mutating operations ----

    /// Write the init marker and empty aggregates.
    ///
    /// Aggregates that already exist are left alone, so running `init` on a
    /// ledger that has seen traffic never discards data.
    pub fn init(&self) -> LedgerResult<InitOutcome> {
        self.execute("initialize ledger", |view| {
            if view.exists(INIT_KEY)? {
                debug!("ledger already initialized");
                return Ok(InitOutcome::AlreadyInitialized);
            }
            view.put(INIT_KEY, INIT_MARKER.to_vec());
            let empty: [(); 0] = [];
            for key in [
                ALL_PARTNERS_KEY,
                TransactionJournal::key(JournalKind::Earn),
                TransactionJournal::key(JournalKind::Spend),
            ] {
                if !view.exists(key)? {
                    view.put_json(key, &empty)?;
                }
            }
            Ok(InitOutcome::Initialized)
        })
    }

    pub fn create_member(&self, profile: &Member) -> LedgerResult<Member> {
        let member = self.execute("create member", |view| {
            self.ensure_initialized(view)?;
            AccountStore::create_member(view, profile, self.config.validate_profiles)
        })?;
        info!(account = %member.account_number, "member created");
        Ok(member)
    }

    pub fn create_partner(&self, profile: &Partner) -> LedgerResult<Partner> {
        let partner = self.execute("create partner", |view| {
            self.ensure_initialized(view)?;
            AccountStore::create_partner(view, profile, self.config.validate_profiles)
        })?;
        info!(partner = %partner.id, "partner created");
        Ok(partner)
    }

    /// Credit points to a member and record the earn transaction.
    pub fn earn_points<C: InvocationContext + ?Sized>(
        &self,
        ctx: &C,
        request: &PointsRequest,
    ) -> LedgerResult<PointTransaction> {
        self.move_points("earn points", JournalKind::Earn, ctx, request)
    }

    /// Debit points from a member and record the spend transaction.
    ///
    /// Fails with `InsufficientBalance` if the member holds fewer points than
    /// requested; nothing is written in that case.
    pub fn use_points<C: InvocationContext + ?Sized>(
        &self,
        ctx: &C,
        request: &PointsRequest,
    ) -> LedgerResult<PointTransaction> {
        self.move_points("use points", JournalKind::Spend, ctx, request)
    }

    fn move_points<C: InvocationContext + ?Sized>(
        &self,
        operation: &'static str,
        kind: JournalKind,
        ctx: &C,
        request: &PointsRequest,
    ) -> LedgerResult<PointTransaction> {
        let tx = self.execute(operation, |view| {
            self.ensure_initialized(view)?;
            validate_request(request)?;
            if request.points > self.config.max_points_per_transaction {
                return Err(LedgerError::InvalidInput(format!(
                    "points {} exceed the per-transaction limit of {}",
                    request.points, self.config.max_points_per_transaction
                )));
            }

            let transaction_id = ctx.transaction_id();
            if transaction_id.trim().is_empty() {
                return Err(LedgerError::InvalidInput(
                    "invocation context supplied a blank transaction id".into(),
                ));
            }
            if TransactionJournal::contains(view, &transaction_id)? {
                return Err(LedgerError::DuplicateTransaction(transaction_id));
            }
            let tx =
                PointTransaction::from_request(request, transaction_id, ctx.transaction_timestamp());

            let mut member = AccountStore::get_member(view, &request.member)?;
            member.points = match kind {
                JournalKind::Earn => member.points.checked_add(request.points).ok_or_else(|| {
                    LedgerError::InvalidInput(format!(
                        "balance of {} would overflow",
                        member.account_number
                    ))
                })?,
                JournalKind::Spend => {
                    if member.points < request.points {
                        return Err(LedgerError::InsufficientBalance {
                            account: member.account_number.clone(),
                            balance: member.points,
                            requested: request.points,
                        });
                    }
                    member.points - request.points
                }
            };
            AccountStore::save_member(view, &member)?;
            TransactionJournal::append(view, kind, &tx)?;
            Ok(tx)
        })?;

        info!(
            journal = %kind,
            member = %tx.member,
            partner = %tx.partner,
            points = tx.points,
            transaction_id = %tx.transaction_id,
            "points recorded"
        );
        Ok(tx)
    }

    // ---- Queries ----

    /// Earn transactions for `id` under `role`, in commit order.
    pub fn earn_transactions_for(&self, role: Role, id: &str) -> LedgerResult<JournalFilter> {
        self.query("list earn transactions", |view| {
            TransactionJournal::filter(view, JournalKind::Earn, role, id)
        })
    }

    /// Spend transactions for `id` under `role`, in commit order.
    pub fn use_transactions_for(&self, role: Role, id: &str) -> LedgerResult<JournalFilter> {
        self.query("list use transactions", |view| {
            TransactionJournal::filter(view, JournalKind::Spend, role, id)
        })
    }

    /// Raw bytes stored under `key`; empty if the key is absent.
    pub fn read_raw(&self, key: &str) -> LedgerResult<Vec<u8>> {
        self.query("read state", |view| Ok(view.get(key)?.unwrap_or_default()))
    }

    pub fn get_member(&self, account_number: &str) -> LedgerResult<Member> {
        self.query("get member", |view| AccountStore::get_member(view, account_number))
    }

    pub fn get_partner(&self, partner_id: &str) -> LedgerResult<Partner> {
        self.query("get partner", |view| AccountStore::get_partner(view, partner_id))
    }

    /// Every partner, in creation order.
    pub fn all_partners(&self) -> LedgerResult<Vec<Partner>> {
        self.query("list partners", |view| PartnerRegistry::all(view))
    }

    /// Reconcile one member's stored balance against the journals.
    pub fn audit_member(&self, account_number: &str) -> LedgerResult<BalanceAudit> {
        self.query("audit member", |view| {
            let member = AccountStore::get_member(view, account_number)?;
            audit_in(view, account_number, Some(member.points))
        })
    }

    /// Reconcile every member that appears in either journal, in order of
    /// first appearance.
    pub fn audit_all(&self) -> LedgerResult<Vec<BalanceAudit>> {
        self.query("audit ledger", |view| {
            let mut accounts: Vec<String> = Vec::new();
            for kind in JournalKind::ALL {
                for tx in TransactionJournal::load(view, kind)? {
                    if !accounts.contains(&tx.member) {
                        accounts.push(tx.member);
                    }
                }
            }

            let mut audits = Vec::with_capacity(accounts.len());
            for account in accounts {
                let stored = match AccountStore::get_member(view, &account) {
                    Ok(member) => Some(member.points),
                    Err(e) if e.kind() == ErrorKind::AccountNotFound => None,
                    Err(e) => return Err(e),
                };
                audits.push(audit_in(view, &account, stored)?);
            }
            Ok(audits)
        })
    }

    // ---- Invocation plumbing ----

    fn ensure_initialized(&self, view: &mut StateView<'_, S>) -> LedgerResult<()> {
        if self.config.require_init && !view.exists(INIT_KEY)? {
            return Err(LedgerError::NotInitialized);
        }
        Ok(())
    }

    fn execute<T>(
        &self,
        operation: &'static str,
        body: impl FnOnce(&mut StateView<'_, S>) -> LedgerResult<T>,
    ) -> LedgerResult<T> {
        let mut view = StateView::new(&self.state);
        let value = match body(&mut view) {
            Ok(value) => value,
            Err(e) => {
                warn!(operation, error = %e, "operation rejected");
                return Err(e.during(operation));
            }
        };

        let batch = view.into_batch();
        if batch.is_empty() {
            return Ok(value);
        }
        if let Err(e) = self.state.apply(&batch) {
            warn!(operation, error = %e, "write set not applied");
            return Err(LedgerError::StateWriteFailure(e).during(operation));
        }
        info!(
            operation,
            writes = batch.len(),
            digest = %batch.digest_hex(),
            "committed"
        );
        Ok(value)
    }

    fn query<T>(
        &self,
        operation: &'static str,
        body: impl FnOnce(&mut StateView<'_, S>) -> LedgerResult<T>,
    ) -> LedgerResult<T> {
        let mut view = StateView::new(&self.state);
        body(&mut view).map_err(|e| e.during(operation))
    }
}

fn audit_in<S: KeyValueState + ?Sized>(
    view: &mut StateView<'_, S>,
    account: &str,
    stored_balance: Option<i64>,
) -> LedgerResult<BalanceAudit> {
    let mut earned = 0i128;
    let mut earn_entries = 0;
    for tx in TransactionJournal::filter(view, JournalKind::Earn, Role::Member, account)? {
        earned += i128::from(tx.points);
        earn_entries += 1;
    }
    let mut spent = 0i128;
    let mut spend_entries = 0;
    for tx in TransactionJournal::filter(view, JournalKind::Spend, Role::Member, account)? {
        spent += i128::from(tx.points);
        spend_entries += 1;
    }
    Ok(BalanceAudit {
        account: account.to_string(),
        stored_balance,
        earned,
        spent,
        earn_entries,
        spend_entries,
    })
}
