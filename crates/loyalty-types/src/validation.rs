//! Field validation for caller-supplied records.
//!
//! These checks are purely syntactic. Existence and duplicate checks need
//! ledger state and live in `loyalty-ledger`.

use crate::account::{Member, Partner};
use crate::error::TypeError;
use crate::transaction::PointsRequest;

/// Validate a member profile submitted for creation.
///
/// With `strict == false` only the key and the balance are checked.
pub fn validate_member(member: &Member, strict: bool) -> Result<(), TypeError> {
    require("accountNumber", &member.account_number)?;
    if member.points != 0 {
        return Err(TypeError::InvalidField {
            field: "points",
            reason: format!("new members start at 0 points, got {}", member.points),
        });
    }
    if !strict {
        return Ok(());
    }

    require("firstName", &member.first_name)?;
    require("lastName", &member.last_name)?;
    require("cardId", &member.card_id)?;
    require("email", &member.email)?;
    if !is_email(&member.email) {
        return Err(TypeError::InvalidField {
            field: "email",
            reason: format!("not an email address: {}", member.email),
        });
    }
    require("phoneNumber", &member.phone_number)?;
    if !is_phone_number(&member.phone_number) {
        return Err(TypeError::InvalidField {
            field: "phoneNumber",
            reason: format!("unexpected characters in {}", member.phone_number),
        });
    }
    Ok(())
}

/// Validate a partner profile submitted for creation.
pub fn validate_partner(partner: &Partner, strict: bool) -> Result<(), TypeError> {
    require("partnerId", &partner.id)?;
    if strict {
        require("name", &partner.name)?;
        require("cardId", &partner.card_id)?;
    }
    Ok(())
}

/// Validate an earn/use request. Points must be strictly positive.
pub fn validate_request(request: &PointsRequest) -> Result<(), TypeError> {
    require("member", &request.member)?;
    require("partner", &request.partner)?;
    if request.points <= 0 {
        return Err(TypeError::InvalidField {
            field: "points",
            reason: format!("must be positive, got {}", request.points),
        });
    }
    Ok(())
}

fn require(field: &'static str, value: &str) -> Result<(), TypeError> {
    if value.trim().is_empty() {
        return Err(TypeError::MissingField(field));
    }
    Ok(())
}

fn is_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        }
        None => false,
    }
}

fn is_phone_number(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_digit())
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' '))
}
