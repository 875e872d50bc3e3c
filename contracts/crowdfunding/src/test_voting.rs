extern crate std;

use crate::{
    test_utils::{TestContext, DEFAULT_COOLDOWN},
    Error, VoteSession,
};

#[test]
fn test_vote_positive_and_negative() {
    let ctx = TestContext::new();
    let id = ctx.create_default_project();
    let yes = ctx.donate(id, 30_000);
    let no = ctx.donate(id, 20_000);

    ctx.client.vote_for_threshold(&yes, &id, &true);
    ctx.client.vote_for_threshold(&no, &id, &false);

    let threshold = ctx.client.get_project_thresholds(&id, &0);
    assert!(threshold.session.is_voting_in_session());
    assert_eq!(threshold.session.positive_votes(), 1);
    assert_eq!(threshold.session.negative_votes(), 1);
    assert!(ctx.client.get_threshold_vote_from_address(&yes, &id, &0));
    assert!(ctx.client.get_threshold_vote_from_address(&no, &id, &0));
}

#[test]
fn test_vote_guards() {
    let ctx = TestContext::new();
    let id = ctx.create_default_project();
    let donor = ctx.donate(id, 20_000);
    let stranger = ctx.generate_address();

    assert_eq!(
        ctx.client.try_vote_for_threshold(&donor, &5_000, &true),
        Err(Ok(Error::InvalidProjectId))
    );
    assert_eq!(
        ctx.client.try_vote_for_threshold(&stranger, &id, &true),
        Err(Ok(Error::NotADonator))
    );
    // 20_000 is below the first boundary
    assert_eq!(
        ctx.client.try_vote_for_threshold(&donor, &id, &true),
        Err(Ok(Error::NotInVotingSession))
    );
}

#[test]
fn test_can_only_vote_once() {
    let ctx = TestContext::new();
    let id = ctx.create_default_project();
    let donor = ctx.donate(id, 50_000);

    ctx.client.vote_for_threshold(&donor, &id, &true);
    assert_eq!(
        ctx.client.try_vote_for_threshold(&donor, &id, &false),
        Err(Ok(Error::CanOnlyVoteOnce))
    );
    assert_eq!(
        ctx.client.get_project_thresholds(&id, &0).session.positive_votes(),
        1
    );
}

#[test]
fn test_vote_lookup_guards() {
    let ctx = TestContext::new();
    let id = ctx.create_default_project();
    let voter = ctx.generate_address();

    assert!(!ctx.client.get_threshold_vote_from_address(&voter, &id, &2));
    assert_eq!(
        ctx.client.try_get_threshold_vote_from_address(&voter, &7, &0),
        Err(Ok(Error::InvalidProjectId))
    );
    assert_eq!(
        ctx.client.try_get_threshold_vote_from_address(&voter, &id, &3),
        Err(Ok(Error::InvalidThresholdId))
    );
}

#[test]
fn test_end_voting_guards() {
    let ctx = TestContext::new();
    let id = ctx.create_default_project();
    let stranger = ctx.generate_address();

    assert_eq!(
        ctx.client.try_end_threshold_voting(&ctx.admin, &5_000),
        Err(Ok(Error::InvalidProjectId))
    );
    assert_eq!(
        ctx.client.try_end_threshold_voting(&stranger, &id),
        Err(Ok(Error::MissingRole))
    );
    assert_eq!(
        ctx.client.try_end_threshold_voting(&ctx.admin, &id),
        Err(Ok(Error::NotInVotingSession))
    );

    ctx.donate(id, 50_000);
    assert_eq!(
        ctx.client.try_end_threshold_voting(&ctx.admin, &id),
        Err(Ok(Error::CantDeliberateWithoutVotes))
    );
}

#[test]
fn test_deliberate_positive_releases_budget() {
    let ctx = TestContext::new();
    let id = ctx.create_default_project();
    let donor = ctx.donate(id, 50_000);
    ctx.client.vote_for_threshold(&donor, &id, &true);

    assert!(ctx.client.end_threshold_voting(&ctx.admin, &id));

    let project = ctx.client.get_project(&id);
    assert_eq!(project.available_to_withdraw, 50_000);
    assert_eq!(project.current_threshold, 1);
    assert_eq!(project.last_deliberation, ctx.env.ledger().timestamp());

    let threshold = ctx.client.get_project_thresholds(&id, &0);
    assert!(matches!(threshold.session, VoteSession::Approved(_)));
    assert!(!threshold.session.is_voting_in_session());
}

#[test]
fn test_deliberate_negative_keeps_threshold() {
    let ctx = TestContext::new();
    let id = ctx.create_default_project();
    let donor = ctx.donate(id, 50_000);
    ctx.client.vote_for_threshold(&donor, &id, &false);

    assert!(!ctx.client.end_threshold_voting(&ctx.admin, &id));

    let project = ctx.client.get_project(&id);
    assert_eq!(project.available_to_withdraw, 0);
    assert_eq!(project.current_threshold, 0);

    let threshold = ctx.client.get_project_thresholds(&id, &0);
    assert!(matches!(threshold.session, VoteSession::Rejected(_)));
    assert_eq!(threshold.session.negative_votes(), 1);
}

#[test]
fn test_tie_at_half_rejects() {
    let ctx = TestContext::new();
    let id = ctx.create_default_project();
    let yes = ctx.donate(id, 25_000);
    let no = ctx.donate(id, 25_000);
    ctx.client.vote_for_threshold(&yes, &id, &true);
    ctx.client.vote_for_threshold(&no, &id, &false);

    assert!(!ctx.client.end_threshold_voting(&ctx.admin, &id));
    assert_eq!(ctx.client.get_project(&id).current_threshold, 0);
}

#[test]
fn test_vote_after_deliberation_fails() {
    let ctx = TestContext::new();
    let id = ctx.create_default_project();
    let first = ctx.donate(id, 40_000);
    let late = ctx.donate(id, 10_000);
    ctx.client.vote_for_threshold(&first, &id, &true);
    ctx.client.end_threshold_voting(&ctx.admin, &id);

    // threshold 1 is not funded yet
    assert_eq!(
        ctx.client.try_vote_for_threshold(&late, &id, &true),
        Err(Ok(Error::NotInVotingSession))
    );
}

#[test]
fn test_rejected_threshold_reopens_after_cooldown() {
    let ctx = TestContext::new();
    let id = ctx.create_default_project();
    let first = ctx.donate(id, 50_000);
    ctx.client.vote_for_threshold(&first, &id, &false);
    ctx.client.end_threshold_voting(&ctx.admin, &id);

    // cooldown still running: the session stays closed
    ctx.donate(id, 10_000);
    assert!(!ctx.client.get_project_thresholds(&id, &0).session.is_voting_in_session());

    ctx.jump_time(DEFAULT_COOLDOWN);
    let newcomer = ctx.donate(id, 10_000);
    let threshold = ctx.client.get_project_thresholds(&id, &0);
    assert!(threshold.session.is_voting_in_session());
    // earlier ballots carry over
    assert_eq!(threshold.session.negative_votes(), 1);
    assert_eq!(
        ctx.client.try_vote_for_threshold(&first, &id, &true),
        Err(Ok(Error::CanOnlyVoteOnce))
    );

    let second = ctx.donate(id, 10_000);
    ctx.client.vote_for_threshold(&newcomer, &id, &true);
    ctx.client.vote_for_threshold(&second, &id, &true);
    assert!(ctx.client.end_threshold_voting(&ctx.admin, &id));
    assert_eq!(ctx.client.get_project(&id).available_to_withdraw, 50_000);
}

#[test]
fn test_thresholds_advance_in_order() {
    let ctx = TestContext::new();
    let id = ctx.create_default_project();

    // one donation covers the first two boundaries but only opens the first
    let whale = ctx.donate(id, 150_000);
    assert!(ctx.client.get_project_thresholds(&id, &0).session.is_voting_in_session());
    assert!(!ctx.client.get_project_thresholds(&id, &1).session.is_voting_in_session());

    ctx.client.vote_for_threshold(&whale, &id, &true);
    ctx.client.end_threshold_voting(&ctx.admin, &id);

    ctx.jump_time(DEFAULT_COOLDOWN);
    ctx.donate(id, 10_000);
    assert!(ctx.client.get_project_thresholds(&id, &1).session.is_voting_in_session());

    ctx.client.vote_for_threshold(&whale, &id, &true);
    ctx.client.end_threshold_voting(&ctx.admin, &id);

    let project = ctx.client.get_project(&id);
    assert_eq!(project.current_threshold, 2);
    assert_eq!(project.available_to_withdraw, 150_000);
}

#[test]
fn test_all_thresholds_resolved() {
    let ctx = TestContext::new();
    let id = ctx.create_default_project();
    let whale = ctx.funded_donor(400_000);

    for index in 0..3u32 {
        ctx.client.donate_to_project(&whale, &id, &100_000);
        assert!(ctx.client.get_project_thresholds(&id, &index).session.is_voting_in_session());
        ctx.client.vote_for_threshold(&whale, &id, &true);
        ctx.client.end_threshold_voting(&ctx.admin, &id);
        ctx.jump_time(DEFAULT_COOLDOWN);
    }

    let project = ctx.client.get_project(&id);
    assert_eq!(project.current_threshold, project.nb_of_thresholds);
    assert_eq!(project.available_to_withdraw, 300_000);

    // further donations are accepted but no session opens
    ctx.client.donate_to_project(&whale, &id, &100_000);
    assert_eq!(
        ctx.client.try_vote_for_threshold(&whale, &id, &true),
        Err(Ok(Error::NotInVotingSession))
    );
    assert_eq!(
        ctx.client.try_end_threshold_voting(&ctx.admin, &id),
        Err(Ok(Error::NotInVotingSession))
    );
}

#[test]
fn test_boundary_reached_during_cooldown_opens_on_vote() {
    let ctx = TestContext::new();
    let id = ctx.create_default_project();
    let whale = ctx.donate(id, 50_000);
    ctx.client.vote_for_threshold(&whale, &id, &true);
    ctx.client.end_threshold_voting(&ctx.admin, &id);

    // reaches threshold 1's boundary while the cooldown is still running
    ctx.fund(&whale, 100_000);
    ctx.client.donate_to_project(&whale, &id, &100_000);
    assert_eq!(ctx.client.get_project(&id).current_amount, 150_000);
    assert!(!ctx.client.get_project_thresholds(&id, &1).session.is_voting_in_session());

    ctx.jump_time(DEFAULT_COOLDOWN * 10);
    ctx.client.vote_for_threshold(&whale, &id, &true);

    let threshold = ctx.client.get_project_thresholds(&id, &1);
    assert!(threshold.session.is_voting_in_session());
    assert_eq!(threshold.session.positive_votes(), 1);

    assert!(ctx.client.end_threshold_voting(&ctx.admin, &id));
    assert_eq!(ctx.client.get_project(&id).available_to_withdraw, 150_000);
}

#[test]
fn test_vote_inside_cooldown_does_not_open() {
    let ctx = TestContext::new();
    let id = ctx.create_default_project();
    let whale = ctx.donate(id, 150_000);
    ctx.client.vote_for_threshold(&whale, &id, &true);
    ctx.client.end_threshold_voting(&ctx.admin, &id);

    ctx.jump_time(DEFAULT_COOLDOWN - 1);
    assert_eq!(
        ctx.client.try_vote_for_threshold(&whale, &id, &true),
        Err(Ok(Error::NotInVotingSession))
    );
    assert!(!ctx.client.get_project_thresholds(&id, &1).session.is_voting_in_session());
}

#[test]
fn test_updater_opens_funded_threshold() {
    let ctx = TestContext::new();
    let id = ctx.create_default_project();
    let stranger = ctx.generate_address();

    assert_eq!(
        ctx.client.try_open_threshold_voting(&stranger, &id),
        Err(Ok(Error::MissingRole))
    );
    assert_eq!(
        ctx.client.try_open_threshold_voting(&ctx.admin, &9),
        Err(Ok(Error::InvalidProjectId))
    );
    // not funded yet
    assert!(!ctx.client.open_threshold_voting(&ctx.admin, &id));

    let first = ctx.donate(id, 50_000);
    ctx.client.vote_for_threshold(&first, &id, &false);
    ctx.client.end_threshold_voting(&ctx.admin, &id);

    // the only donor already voted on this threshold, so a ballot cannot reopen it
    assert!(!ctx.client.open_threshold_voting(&ctx.admin, &id));
    ctx.jump_time(DEFAULT_COOLDOWN);
    assert_eq!(
        ctx.client.try_vote_for_threshold(&first, &id, &true),
        Err(Ok(Error::CanOnlyVoteOnce))
    );

    assert!(ctx.client.open_threshold_voting(&ctx.admin, &id));
    let threshold = ctx.client.get_project_thresholds(&id, &0);
    assert!(threshold.session.is_voting_in_session());
    assert_eq!(threshold.session.negative_votes(), 1);

    // already open
    assert!(!ctx.client.open_threshold_voting(&ctx.admin, &id));
}
