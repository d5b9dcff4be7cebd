use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use colored::Colorize;
use loyalty_ledger::{
    dispatch, BalanceAudit, FixedContext, InitOutcome, LedgerConfig, LedgerContract,
};
use loyalty_state::FileState;
use loyalty_types::{Member, Partner, PointTransaction, PointsRequest};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::cli::*;

type Ledger = LedgerContract<FileState>;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let state = FileState::open(&cli.state)
        .with_context(|| format!("cannot open state file {}", cli.state.display()))?;
    debug!(path = %cli.state.display(), keys = state.len(), "state file opened");
    let ledger = LedgerContract::with_config(state, config);
    let format = cli.format;

    match cli.command {
        Command::Init => cmd_init(&ledger, format),
        Command::CreateMember(args) => cmd_create_member(&ledger, format, args),
        Command::CreatePartner(args) => cmd_create_partner(&ledger, format, args),
        Command::Earn(args) => cmd_points(&ledger, format, args, true),
        Command::Use(args) => cmd_points(&ledger, format, args, false),
        Command::EarnHistory(args) => {
            let found: Vec<_> = ledger.earn_transactions_for(args.role, &args.id)?.collect();
            print_history(format, "earned", &found)
        }
        Command::UseHistory(args) => {
            let found: Vec<_> = ledger.use_transactions_for(args.role, &args.id)?.collect();
            print_history(format, "used", &found)
        }
        Command::Member(args) => {
            let member = ledger.get_member(&args.id)?;
            emit(format, &member, || print_member(&member))
        }
        Command::Partner(args) => {
            let partner = ledger.get_partner(&args.id)?;
            emit(format, &partner, || print_partner(&partner))
        }
        Command::Partners => {
            let partners = ledger.all_partners()?;
            emit(format, &partners, || {
                if partners.is_empty() {
                    println!("No partners.");
                }
                for p in &partners {
                    print_partner(p);
                }
            })
        }
        Command::Audit(args) => cmd_audit(&ledger, format, args),
        Command::Get(args) => {
            let raw = ledger.read_raw(&args.key)?;
            let entry = RawEntry::new(&args.key, &raw);
            emit(format, &entry, || println!("{}", entry.value))
        }
        Command::Invoke(args) => {
            let ctx = host_context(&args.tx);
            let out = dispatch::invoke(&ledger, &ctx, &args.function, &args.args)?;
            println!("{out}");
            Ok(())
        }
    }
}

/// A stored value as printed by `get`. Absent keys read as empty.
#[derive(Debug, Serialize)]
struct RawEntry<'a> {
    key: &'a str,
    value: String,
}

impl<'a> RawEntry<'a> {
    fn new(key: &'a str, raw: &[u8]) -> Self {
        Self {
            key,
            value: String::from_utf8_lossy(raw).into_owned(),
        }
    }
}

/// Read ledger settings from a TOML file, or use the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<LedgerConfig> {
    let Some(path) = path else {
        return Ok(LedgerConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

/// The invocation context for one CLI run.
pub fn host_context(tx: &TxArgs) -> FixedContext {
    FixedContext::new(
        tx.tx_id
            .clone()
            .unwrap_or_else(|| Uuid::now_v7().to_string()),
        tx.timestamp.unwrap_or_else(Utc::now),
    )
}

fn cmd_init(ledger: &Ledger, format: OutputFormat) -> anyhow::Result<()> {
    let outcome = ledger.init()?;
    emit(format, &outcome, || match outcome {
        InitOutcome::Initialized => println!(
            "{} Initialized ledger in {}",
            "✓".green().bold(),
            ledger.state().path().display().to_string().bold()
        ),
        InitOutcome::AlreadyInitialized => {
            println!("Ledger already initialized.")
        }
    })
}

fn cmd_create_member(
    ledger: &Ledger,
    format: OutputFormat,
    args: CreateMemberArgs,
) -> anyhow::Result<()> {
    let profile = Member {
        first_name: args.first_name,
        last_name: args.last_name,
        email: args.email,
        phone_number: args.phone,
        account_number: args.account_number,
        card_id: args.card_id,
        points: 0,
    };
    let member = ledger.create_member(&profile)?;
    emit(format, &member, || {
        println!(
            "{} Created member {}",
            "✓".green().bold(),
            member.account_number.yellow()
        )
    })
}

fn cmd_create_partner(
    ledger: &Ledger,
    format: OutputFormat,
    args: CreatePartnerArgs,
) -> anyhow::Result<()> {
    let profile = Partner {
        name: args.name,
        id: args.id,
        card_id: args.card_id,
    };
    let partner = ledger.create_partner(&profile)?;
    emit(format, &partner, || {
        println!(
            "{} Created partner {} ({})",
            "✓".green().bold(),
            partner.id.yellow(),
            partner.name
        )
    })
}

fn cmd_points(
    ledger: &Ledger,
    format: OutputFormat,
    args: PointsArgs,
    earn: bool,
) -> anyhow::Result<()> {
    let ctx = host_context(&args.tx);
    let request = PointsRequest::new(args.member, args.partner, args.points);
    let tx = if earn {
        ledger.earn_points(&ctx, &request)?
    } else {
        ledger.use_points(&ctx, &request)?
    };
    let balance = ledger.get_member(&tx.member)?.points;
    emit(format, &tx, || {
        let verb = if earn { "Earned" } else { "Used" };
        println!(
            "{} {} {} points at {}",
            "✓".green().bold(),
            verb,
            tx.points.to_string().bold(),
            tx.partner.yellow()
        );
        println!("  Transaction: {}", tx.transaction_id.cyan());
        println!("  Balance: {}", balance.to_string().bold());
    })
}

fn cmd_audit(ledger: &Ledger, format: OutputFormat, args: AuditArgs) -> anyhow::Result<()> {
    let audits = match args.member {
        Some(member) => vec![ledger.audit_member(&member)?],
        None => ledger.audit_all()?,
    };
    emit(format, &audits, || {
        if audits.is_empty() {
            println!("No journal entries.");
        }
        for audit in &audits {
            print_audit(audit);
        }
    })?;
    if audits.iter().all(BalanceAudit::is_consistent) {
        Ok(())
    } else {
        anyhow::bail!("balances disagree with the journals")
    }
}

fn print_history(
    format: OutputFormat,
    verb: &str,
    found: &[PointTransaction],
) -> anyhow::Result<()> {
    emit(format, found, || {
        if found.is_empty() {
            println!("No transactions.");
        }
        for tx in found {
            println!(
                "{}  {}  {} {} {} points at {}",
                tx.transaction_id.cyan(),
                tx.timestamp.to_rfc3339().dimmed(),
                tx.member.yellow(),
                verb,
                tx.points.to_string().bold(),
                tx.partner,
            );
        }
    })
}

fn print_member(member: &Member) {
    println!("{}  {}", member.account_number.yellow().bold(), member.display_name());
    println!("  Email: {}", member.email);
    println!("  Phone: {}", member.phone_number);
    println!("  Card: {}", member.card_id);
    println!("  Points: {}", member.points.to_string().bold());
}

fn print_partner(partner: &Partner) {
    println!("{}  {} (card {})", partner.id.yellow().bold(), partner.name, partner.card_id);
}

fn print_audit(audit: &BalanceAudit) {
    let status = if audit.is_consistent() {
        "✓ consistent".green()
    } else {
        "✗ inconsistent".red().bold()
    };
    let stored = audit
        .stored_balance
        .map(|b| b.to_string())
        .unwrap_or_else(|| "no record".into());
    println!("{}  {}", audit.account.yellow().bold(), status);
    println!(
        "  Earned {} over {} entries, used {} over {} entries",
        audit.earned, audit.earn_entries, audit.spent, audit.spend_entries
    );
    println!("  Expected {}, stored {}", audit.expected(), stored);
}

/// Print `value` as JSON, or run `text` for the human format.
fn emit<T: Serialize + ?Sized>(
    format: OutputFormat,
    value: &T,
    text: impl FnOnce(),
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => text(),
    }
    Ok(())
}
