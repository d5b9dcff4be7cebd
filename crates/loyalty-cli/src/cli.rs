use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use loyalty_types::Role;

#[derive(Parser)]
#[command(
    name = "loyalty",
    about = "Loyalty-point ledger over a local state file",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// State file to operate on; created on first write
    #[arg(long, global = true, default_value = "loyalty-state.json")]
    pub state: PathBuf,

    /// TOML file with ledger settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write the init marker and empty journals
    Init,
    /// Register a new member with a zero balance
    CreateMember(CreateMemberArgs),
    /// Register a new partner
    CreatePartner(CreatePartnerArgs),
    /// Credit points to a member
    Earn(PointsArgs),
    /// Debit points from a member
    Use(PointsArgs),
    /// List earn transactions for a member or partner
    EarnHistory(HistoryArgs),
    /// List use transactions for a member or partner
    UseHistory(HistoryArgs),
    /// Show a member record
    Member(LookupArgs),
    /// Show a partner record
    Partner(LookupArgs),
    /// List every partner in creation order
    Partners,
    /// Reconcile balances against the journals
    Audit(AuditArgs),
    /// Print the raw value stored under a key
    Get(GetArgs),
    /// Call a ledger function by name with string arguments
    Invoke(InvokeArgs),
}

#[derive(Args)]
pub struct CreateMemberArgs {
    pub account_number: String,
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub phone: String,
    #[arg(long)]
    pub card_id: String,
}

#[derive(Args)]
pub struct CreatePartnerArgs {
    pub id: String,
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub card_id: String,
}

/// Transaction identity supplied by the host. Both default to fresh values.
#[derive(Args, Clone, Debug, Default)]
pub struct TxArgs {
    /// Transaction id (default: a new UUID v7)
    #[arg(long)]
    pub tx_id: Option<String>,
    /// Transaction timestamp, RFC 3339 (default: now)
    #[arg(long)]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Args)]
pub struct PointsArgs {
    pub member: String,
    pub partner: String,
    #[arg(allow_hyphen_values = true)]
    pub points: i64,
    #[command(flatten)]
    pub tx: TxArgs,
}

#[derive(Args)]
pub struct HistoryArgs {
    /// `member` or `partner`
    pub role: Role,
    pub id: String,
}

#[derive(Args)]
pub struct LookupArgs {
    pub id: String,
}

#[derive(Args)]
pub struct AuditArgs {
    /// Audit one member instead of every member in the journals
    pub member: Option<String>,
}

#[derive(Args)]
pub struct GetArgs {
    pub key: String,
}

#[derive(Args)]
pub struct InvokeArgs {
    pub function: String,
    pub args: Vec<String>,
    #[command(flatten)]
    pub tx: TxArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_init() {
        let cli = Cli::try_parse_from(["loyalty", "init"]).unwrap();
        assert!(matches!(cli.command, Command::Init));
        assert_eq!(cli.state, PathBuf::from("loyalty-state.json"));
    }

    #[test]
    fn parse_create_member() {
        let cli = Cli::try_parse_from([
            "loyalty",
            "create-member",
            "A1",
            "--first-name",
            "Ada",
            "--last-name",
            "Lovelace",
            "--email",
            "ada@example.com",
            "--phone",
            "555-0101",
            "--card-id",
            "c1",
        ])
        .unwrap();
        if let Command::CreateMember(args) = cli.command {
            assert_eq!(args.account_number, "A1");
            assert_eq!(args.phone, "555-0101");
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_earn_with_context() {
        let cli = Cli::try_parse_from([
            "loyalty",
            "earn",
            "A1",
            "P1",
            "100",
            "--tx-id",
            "t-1",
            "--timestamp",
            "2024-05-01T12:00:00Z",
        ])
        .unwrap();
        if let Command::Earn(args) = cli.command {
            assert_eq!(args.points, 100);
            assert_eq!(args.tx.tx_id.as_deref(), Some("t-1"));
            assert_eq!(
                args.tx.timestamp.map(|t| t.to_rfc3339()),
                Some("2024-05-01T12:00:00+00:00".to_string())
            );
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_use_accepts_negative_points() {
        // Rejected by the ledger, not by the parser.
        let cli = Cli::try_parse_from(["loyalty", "use", "A1", "P1", "-5"]).unwrap();
        if let Command::Use(args) = cli.command {
            assert_eq!(args.points, -5);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_history_role() {
        let cli = Cli::try_parse_from(["loyalty", "earn-history", "partner", "P1"]).unwrap();
        if let Command::EarnHistory(args) = cli.command {
            assert_eq!(args.role, Role::Partner);
        } else { panic!("wrong command"); }
        assert!(Cli::try_parse_from(["loyalty", "use-history", "admin", "P1"]).is_err());
    }

    #[test]
    fn parse_invoke() {
        let cli = Cli::try_parse_from(["loyalty", "invoke", "GetState", "A1"]).unwrap();
        if let Command::Invoke(args) = cli.command {
            assert_eq!(args.function, "GetState");
            assert_eq!(args.args, vec!["A1".to_string()]);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_global_options() {
        let cli = Cli::try_parse_from([
            "loyalty",
            "--verbose",
            "--format",
            "json",
            "--state",
            "/tmp/ledger.json",
            "partners",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.format, OutputFormat::Json));
        assert_eq!(cli.state, PathBuf::from("/tmp/ledger.json"));
    }
}
