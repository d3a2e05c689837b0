//! Text codec for endpoints that sit behind a text transport.
//!
//! A call is described by its depot distance (`"12.5"` or
//! `"distance=12.5"`) and answered with an ETA formatted to two decimals or
//! a reason code. A commit is sent as `"commit=<stop id>"` and answered with
//! `"agree"` or a reason code. [`TextEndpoint`](crate::TextEndpoint) uses
//! the coordinator side of this codec; [`answer_call`] and
//! [`parse_commit_content`] serve the endpoint side.

use thiserror::Error;

use crate::messages::{CallForProposal, Commit, CommitReply, ProposalReply, RefusalReason};

/// Reason code for [`RefusalReason::Overloaded`].
pub const OVERLOADED: &str = "overloaded";

/// Reason code for [`RefusalReason::InvalidRequest`].
pub const INVALID_REQUEST: &str = "invalid-request";

/// Answer agreeing to a commit.
pub const AGREE: &str = "agree";

const DISTANCE_KEY: &str = "distance=";
const COMMIT_KEY: &str = "commit=";

/// A bid that is not a usable ETA.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("bid {content:?} is not a finite, non-negative ETA")]
pub struct MalformedBid {
    /// Offending content.
    pub content: String,
}

/// A call-for-proposal payload that carries no usable distance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("call-for-proposal {content:?} does not carry a distance")]
pub struct MalformedRequest {
    /// Offending content.
    pub content: String,
}

/// Extract the distance from a call-for-proposal payload.
///
/// # Examples
/// ```
/// use courier_negotiation::wire::parse_cfp_content;
///
/// assert_eq!(parse_cfp_content("12.5"), Ok(12.5));
/// assert_eq!(parse_cfp_content("distance=12.5"), Ok(12.5));
/// assert!(parse_cfp_content("distance=").is_err());
/// ```
pub fn parse_cfp_content(content: &str) -> Result<f64, MalformedRequest> {
    let trimmed = content.trim();
    let value = trimmed.strip_prefix(DISTANCE_KEY).unwrap_or(trimmed);
    value.trim().parse::<f64>().map_err(|_| MalformedRequest {
        content: content.to_owned(),
    })
}

/// Encode a call as its depot distance.
#[must_use]
pub fn encode_call(call: &CallForProposal) -> String {
    format!("{DISTANCE_KEY}{}", call.distance_km)
}

/// Answer a call-for-proposal payload.
///
/// `bid` sees the parsed distance; payloads without one are answered with
/// the invalid-request code.
///
/// # Examples
/// ```
/// use courier_negotiation::ProposalReply;
/// use courier_negotiation::wire::answer_call;
///
/// let bid = |distance_km| ProposalReply::Bid { eta_minutes: distance_km };
/// assert_eq!(answer_call("distance=4", bid), "4.00");
/// assert_eq!(answer_call("nowhere", bid), "invalid-request");
/// ```
pub fn answer_call(content: &str, bid: impl FnOnce(f64) -> ProposalReply) -> String {
    match parse_cfp_content(content) {
        Ok(distance_km) => encode_reply(&bid(distance_km)),
        Err(err) => {
            log::debug!("wire: {err}");
            INVALID_REQUEST.to_owned()
        }
    }
}

/// Encode a commit as the stop identifier.
#[must_use]
pub fn encode_commit(commit: &Commit) -> String {
    format!("{COMMIT_KEY}{}", commit.stop.id)
}

/// Stop identifier of a commit payload, or `None` for any other payload.
#[must_use]
pub fn parse_commit_content(content: &str) -> Option<&str> {
    content
        .trim()
        .strip_prefix(COMMIT_KEY)
        .map(str::trim)
        .filter(|id| !id.is_empty())
}

/// Encode a commit reply as `"agree"` or a reason code.
#[must_use]
pub fn encode_commit_reply(reply: CommitReply) -> String {
    match reply {
        CommitReply::Agree => AGREE.to_owned(),
        CommitReply::Refuse(reason) => reason.code().to_owned(),
    }
}

/// Decode a commit reply; unknown answers yield `None`.
#[must_use]
pub fn decode_commit_reply(content: &str) -> Option<CommitReply> {
    if content.trim() == AGREE {
        return Some(CommitReply::Agree);
    }
    RefusalReason::from_code(content).map(CommitReply::Refuse)
}

/// Format an ETA with two decimals.
#[must_use]
pub fn format_eta(minutes: f64) -> String {
    format!("{minutes:.2}")
}

/// Parse an ETA and check it is usable.
pub fn parse_eta(content: &str) -> Result<f64, MalformedBid> {
    content
        .trim()
        .parse::<f64>()
        .map_err(|_| MalformedBid {
            content: content.to_owned(),
        })
        .and_then(validate_eta)
}

/// Accept only finite, non-negative ETAs.
pub fn validate_eta(minutes: f64) -> Result<f64, MalformedBid> {
    if minutes.is_finite() && minutes >= 0.0 {
        Ok(minutes)
    } else {
        Err(MalformedBid {
            content: minutes.to_string(),
        })
    }
}

/// Encode a proposal reply as an ETA or a reason code.
#[must_use]
pub fn encode_reply(reply: &ProposalReply) -> String {
    match reply {
        ProposalReply::Bid { eta_minutes } => format_eta(*eta_minutes),
        ProposalReply::Refuse(reason) => reason.code().to_owned(),
    }
}

/// Decode a proposal reply; anything that is not a reason code must be an
/// ETA.
///
/// # Examples
/// ```
/// use courier_negotiation::wire::decode_reply;
/// use courier_negotiation::{ProposalReply, RefusalReason};
///
/// assert_eq!(
///     decode_reply("overloaded"),
///     Ok(ProposalReply::Refuse(RefusalReason::Overloaded))
/// );
/// assert_eq!(decode_reply("3.25"), Ok(ProposalReply::Bid { eta_minutes: 3.25 }));
/// assert!(decode_reply("soon").is_err());
/// ```
pub fn decode_reply(content: &str) -> Result<ProposalReply, MalformedBid> {
    if let Some(reason) = RefusalReason::from_code(content) {
        return Ok(ProposalReply::Refuse(reason));
    }
    parse_eta(content).map(|eta_minutes| ProposalReply::Bid { eta_minutes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("7", 7.0)]
    #[case(" distance=7.25 ", 7.25)]
    #[case("distance= 3", 3.0)]
    fn cfp_content_accepts_both_forms(#[case] content: &str, #[case] expected: f64) {
        assert_eq!(parse_cfp_content(content), Ok(expected));
    }

    #[rstest]
    #[case("")]
    #[case("far")]
    #[case("dist=4")]
    fn cfp_content_rejects_garbage(#[case] content: &str) {
        assert!(parse_cfp_content(content).is_err());
    }

    #[rstest]
    fn calls_are_sent_as_depot_distance() {
        let call = CallForProposal::for_stop(&courier_core::Stop::new("a", 3.0, 4.0));
        assert_eq!(encode_call(&call), "distance=5");
        assert_eq!(parse_cfp_content(&encode_call(&call)), Ok(5.0));
    }

    #[rstest]
    fn unreadable_calls_are_answered_as_invalid() {
        let answer = answer_call("dist=4", |_| ProposalReply::Bid { eta_minutes: 1.0 });
        assert_eq!(answer, INVALID_REQUEST);
    }

    #[rstest]
    fn commits_carry_the_stop_id() {
        let commit = Commit::for_stop(&courier_core::Stop::new("b-7", 1.0, 0.0));
        assert_eq!(encode_commit(&commit), "commit=b-7");
        assert_eq!(parse_commit_content(" commit=b-7 "), Some("b-7"));
        assert_eq!(parse_commit_content("commit="), None);
        assert_eq!(parse_commit_content("distance=3"), None);
    }

    #[rstest]
    #[case("agree", Some(CommitReply::Agree))]
    #[case(" overloaded ", Some(CommitReply::Refuse(RefusalReason::Overloaded)))]
    #[case("invalid-request", Some(CommitReply::Refuse(RefusalReason::InvalidRequest)))]
    #[case("maybe", None)]
    fn commit_replies_decode(#[case] content: &str, #[case] expected: Option<CommitReply>) {
        assert_eq!(decode_commit_reply(content), expected);
        if let Some(reply) = expected {
            assert_eq!(decode_commit_reply(&encode_commit_reply(reply)), Some(reply));
        }
    }

    #[rstest]
    #[case(5.0, "5.00")]
    #[case(3.14159, "3.14")]
    #[case(0.006, "0.01")]
    fn eta_has_two_decimals(#[case] minutes: f64, #[case] expected: &str) {
        assert_eq!(format_eta(minutes), expected);
    }

    #[rstest]
    #[case("NaN")]
    #[case("inf")]
    #[case("-1.0")]
    #[case("five")]
    fn unusable_etas_are_malformed(#[case] content: &str) {
        assert!(parse_eta(content).is_err());
    }

    #[rstest]
    #[case(ProposalReply::Bid { eta_minutes: 12.5 })]
    #[case(ProposalReply::Refuse(RefusalReason::Overloaded))]
    #[case(ProposalReply::Refuse(RefusalReason::InvalidRequest))]
    fn replies_survive_the_wire(#[case] reply: ProposalReply) {
        assert_eq!(decode_reply(&encode_reply(&reply)), Ok(reply));
    }
}
