// contracts/crowdfunding/src/voting.rs
//
// Threshold voting engine.
//
// Session lifecycle of one threshold:
//
//   Pending --(boundary reached)--> InSession --(deliberate)--> Approved
//                                       ^                  \
//                                       |                   --> Rejected
//                                       +---(boundary still reached, cooldown over)---+
//
// Sessions open strictly in index order: only `current_threshold` can be in
// session, and it only advances on approval.

use soroban_sdk::{Address, Env};

use crate::{
    storage,
    types::{ProjectConfig, ProjectState, VoteSession, VoteTally},
    Error, BASIS_POINTS,
};

/// Deliberation rule.
///
/// A tie never passes. Otherwise the positive share must reach
/// `required` basis points, with exact equality approving.
pub fn is_approved(positive: u32, negative: u32, required: u32) -> bool {
    if positive == negative {
        return false;
    }
    let total = positive as u64 + negative as u64;
    (positive as u64) * (BASIS_POINTS as u64) >= (required as u64) * total
}

/// Cumulative budget of thresholds `0..=index`.
pub fn funding_boundary(env: &Env, project_id: u64, index: u32) -> Result<i128, Error> {
    let mut boundary: i128 = 0;
    for i in 0..=index {
        let threshold = storage::load_threshold(env, project_id, i)?;
        boundary = boundary
            .checked_add(threshold.budget)
            .ok_or(Error::Overflow)?;
    }
    Ok(boundary)
}

fn cooldown_elapsed(env: &Env, state: &ProjectState) -> bool {
    if state.last_deliberation == 0 {
        return true;
    }
    match state.last_deliberation.checked_add(state.vote_cooldown) {
        Some(ready_at) => env.ledger().timestamp() >= ready_at,
        None => false,
    }
}

/// Open the current threshold's session if its funding boundary is reached.
///
/// Returns the index of the threshold that was opened, if any. A rejected
/// threshold reopens with its earlier tally so past voters stay counted.
pub fn open_session_if_funded(
    env: &Env,
    config: &ProjectConfig,
    state: &ProjectState,
) -> Result<Option<u32>, Error> {
    let index = state.current_threshold;
    if index >= config.nb_of_thresholds {
        return Ok(None);
    }

    let mut threshold = storage::load_threshold(env, config.id, index)?;
    let now = env.ledger().timestamp();
    let reopened = match threshold.session {
        VoteSession::Pending => VoteTally {
            positive: 0,
            negative: 0,
            opened_at: now,
        },
        VoteSession::Rejected(ref tally) => VoteTally {
            opened_at: now,
            ..tally.clone()
        },
        VoteSession::InSession(_) | VoteSession::Approved(_) => return Ok(None),
    };

    if !cooldown_elapsed(env, state) {
        return Ok(None);
    }
    if state.current_amount < funding_boundary(env, config.id, index)? {
        return Ok(None);
    }

    threshold.session = VoteSession::InSession(reopened);
    storage::save_threshold(env, config.id, index, &threshold);
    Ok(Some(index))
}

/// Record `voter`'s ballot on the current threshold.
pub fn cast_ballot(
    env: &Env,
    project_id: u64,
    state: &ProjectState,
    voter: &Address,
    approve: bool,
) -> Result<u32, Error> {
    let index = state.current_threshold;
    let mut threshold =
        storage::load_threshold(env, project_id, index).map_err(|_| Error::NotInVotingSession)?;

    let VoteSession::InSession(mut tally) = threshold.session else {
        return Err(Error::NotInVotingSession);
    };
    if storage::has_ballot(env, project_id, index, voter) {
        return Err(Error::CanOnlyVoteOnce);
    }

    if approve {
        tally.positive = tally.positive.checked_add(1).ok_or(Error::Overflow)?;
    } else {
        tally.negative = tally.negative.checked_add(1).ok_or(Error::Overflow)?;
    }
    threshold.session = VoteSession::InSession(tally);

    storage::save_threshold(env, project_id, index, &threshold);
    storage::record_ballot(env, project_id, index, voter, approve);
    Ok(index)
}

/// Outcome of closing a session.
pub struct Deliberation {
    pub threshold: u32,
    pub approved: bool,
    pub budget: i128,
    pub positive: u32,
    pub negative: u32,
}

/// Close the current threshold's session and apply the deliberation rule.
///
/// Writes the threshold only; the caller owns the project state changes.
pub fn deliberate(
    env: &Env,
    config: &ProjectConfig,
    state: &ProjectState,
) -> Result<Deliberation, Error> {
    let index = state.current_threshold;
    let mut threshold =
        storage::load_threshold(env, config.id, index).map_err(|_| Error::NotInVotingSession)?;

    let VoteSession::InSession(tally) = threshold.session else {
        return Err(Error::NotInVotingSession);
    };
    if tally.total() == 0 {
        return Err(Error::CantDeliberateWithoutVotes);
    }

    let approved = is_approved(tally.positive, tally.negative, config.required_vote_percentage);
    let outcome = Deliberation {
        threshold: index,
        approved,
        budget: threshold.budget,
        positive: tally.positive,
        negative: tally.negative,
    };

    threshold.session = if approved {
        VoteSession::Approved(tally)
    } else {
        VoteSession::Rejected(tally)
    };
    storage::save_threshold(env, config.id, index, &threshold);
    Ok(outcome)
}
