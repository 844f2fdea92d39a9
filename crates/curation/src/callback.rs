//! Parses the admin callback payload `<action>_<id>` (spec §6 "Admin
//! callback contract").

use crate::error::{CurationError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callback {
    Approve(i64),
    Deny(i64),
    ActivityAdd(String),
    ActivityDeny(String),
    ReportExclude(i64),
    ReportKeep(i64),
    EditApprove(i64),
    EditDeny(i64),
    DeleteApprove(i64),
    DeleteDeny(i64),
}

pub fn parse(payload: &str) -> Result<Callback> {
    let (action, id) = payload
        .split_once('_')
        .ok_or_else(|| CurationError::MalformedPayload(payload.to_string()))?;

    let spot_id = || -> Result<i64> {
        id.parse::<i64>().map_err(|_| CurationError::MalformedPayload(payload.to_string()))
    };

    match action {
        "approve" => Ok(Callback::Approve(spot_id()?)),
        "deny" => Ok(Callback::Deny(spot_id()?)),
        "actadd" => Ok(Callback::ActivityAdd(id.to_string())),
        "actdeny" => Ok(Callback::ActivityDeny(id.to_string())),
        "rptexcl" => Ok(Callback::ReportExclude(spot_id()?)),
        "rptkeep" => Ok(Callback::ReportKeep(spot_id()?)),
        "edtappr" => Ok(Callback::EditApprove(spot_id()?)),
        "edtdeny" => Ok(Callback::EditDeny(spot_id()?)),
        "delappr" => Ok(Callback::DeleteApprove(spot_id()?)),
        "deldeny" => Ok(Callback::DeleteDeny(spot_id()?)),
        other => Err(CurationError::UnknownAction(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_spot_id_actions() {
        assert_eq!(parse("approve_42").unwrap(), Callback::Approve(42));
        assert_eq!(parse("deny_7").unwrap(), Callback::Deny(7));
        assert_eq!(parse("delappr_3").unwrap(), Callback::DeleteApprove(3));
    }

    #[test]
    fn parses_activity_name_actions() {
        assert_eq!(parse("actadd_trivia_night").unwrap(), Callback::ActivityAdd("trivia_night".to_string()));
    }

    #[test]
    fn rejects_unknown_action() {
        assert!(matches!(parse("bogus_1"), Err(CurationError::UnknownAction(_))));
    }

    #[test]
    fn rejects_malformed_payload() {
        assert!(matches!(parse("noseparator"), Err(CurationError::MalformedPayload(_))));
        assert!(matches!(parse("approve_notanumber"), Err(CurationError::MalformedPayload(_))));
    }
}
