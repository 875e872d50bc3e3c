extern crate std;

use soroban_sdk::{symbol_short, testutils::Events, vec, Address, IntoVal, TryIntoVal};

use crate::events::{
    DonatedToProject, FundsMoved, ProjectCreated, ThresholdDeliberated, ThresholdVoted,
    VotingStarted, WithdrewFees, WithdrewFunds,
};
use crate::test_utils::TestContext;
use crate::Role;

#[test]
fn test_project_created_event() {
    let ctx = TestContext::new();
    let id = ctx.create_default_project();

    let all_events = ctx.env.events().all();
    let last_event = all_events.last().expect("No events found");

    assert_eq!(last_event.0, ctx.client.address);
    let expected_topics = vec![
        &ctx.env,
        symbol_short!("created").into_val(&ctx.env),
        id.into_val(&ctx.env),
    ];
    assert_eq!(last_event.1, expected_topics);

    let event_data: ProjectCreated = last_event.2.try_into_val(&ctx.env).unwrap();
    assert_eq!(
        event_data,
        ProjectCreated {
            project_id: id,
            owner: ctx.owner.clone(),
            token: ctx.token.address.clone(),
            required_amount: 300_000,
            nb_of_thresholds: 3,
        }
    );
}

#[test]
fn test_donated_event_carries_gross_amount() {
    let ctx = TestContext::new();
    let id = ctx.create_project_with_fee(1_000);
    let donor = ctx.donate(id, 20_000);

    let (topics, data) = ctx.find_event("donated").expect("no donated event");
    assert_eq!(
        topics,
        vec![
            &ctx.env,
            symbol_short!("donated").into_val(&ctx.env),
            id.into_val(&ctx.env),
        ]
    );
    let event_data: DonatedToProject = data.try_into_val(&ctx.env).unwrap();
    assert_eq!(
        event_data,
        DonatedToProject {
            donor,
            project_id: id,
            amount: 20_000,
        }
    );
    assert!(ctx.find_event("vote_open").is_none());
}

#[test]
fn test_voting_started_event() {
    let ctx = TestContext::new();
    let id = ctx.create_default_project();
    ctx.donate(id, 50_000);

    let (_, data) = ctx.find_event("vote_open").expect("no vote_open event");
    let event_data: VotingStarted = data.try_into_val(&ctx.env).unwrap();
    assert_eq!(
        event_data,
        VotingStarted {
            project_id: id,
            threshold: 0,
        }
    );
}

#[test]
fn test_late_session_open_is_announced_by_the_vote() {
    let ctx = TestContext::new();
    let id = ctx.create_default_project();
    let whale = ctx.donate(id, 150_000);
    ctx.client.vote_for_threshold(&whale, &id, &true);
    ctx.client.end_threshold_voting(&ctx.admin, &id);

    ctx.jump_time(crate::test_utils::DEFAULT_COOLDOWN);
    ctx.client.vote_for_threshold(&whale, &id, &false);

    let (_, data) = ctx.find_event("vote_open").expect("no vote_open event");
    let started: VotingStarted = data.try_into_val(&ctx.env).unwrap();
    assert_eq!(
        started,
        VotingStarted {
            project_id: id,
            threshold: 1,
        }
    );
    assert!(ctx.find_event("voted").is_some());
}

#[test]
fn test_voted_and_deliberated_events() {
    let ctx = TestContext::new();
    let id = ctx.create_default_project();
    let donor = ctx.donate(id, 50_000);

    ctx.client.vote_for_threshold(&donor, &id, &true);
    let (_, data) = ctx.find_event("voted").expect("no voted event");
    let voted: ThresholdVoted = data.try_into_val(&ctx.env).unwrap();
    assert_eq!(
        voted,
        ThresholdVoted {
            project_id: id,
            threshold: 0,
            voter: donor.clone(),
            approve: true,
        }
    );

    ctx.client.end_threshold_voting(&ctx.admin, &id);
    let (_, data) = ctx.find_event("decided").expect("no decided event");
    let decided: ThresholdDeliberated = data.try_into_val(&ctx.env).unwrap();
    assert_eq!(
        decided,
        ThresholdDeliberated {
            project_id: id,
            threshold: 0,
            approved: true,
            positive: 1,
            negative: 0,
        }
    );
}

#[test]
fn test_withdrawal_events() {
    let ctx = TestContext::new();
    let id = ctx.create_project_with_fee(1_000);
    let donor = ctx.donate(id, 60_000);
    ctx.client.vote_for_threshold(&donor, &id, &true);
    ctx.client.end_threshold_voting(&ctx.admin, &id);

    ctx.client.withdraw_funds(&ctx.owner, &id);
    let (_, data) = ctx.find_event("withdrawn").expect("no withdrawn event");
    let funds: WithdrewFunds = data.try_into_val(&ctx.env).unwrap();
    assert_eq!(
        funds,
        WithdrewFunds {
            owner: ctx.owner.clone(),
            project_id: id,
            token: ctx.token.address.clone(),
            amount: 50_000,
        }
    );

    ctx.client.withdraw_fees(&ctx.admin, &ctx.token.address);
    let (topics, data) = ctx.find_event("fees_out").expect("no fees_out event");
    assert_eq!(
        topics,
        vec![
            &ctx.env,
            symbol_short!("fees_out").into_val(&ctx.env),
            ctx.token.address.into_val(&ctx.env),
        ]
    );
    let fees: WithdrewFees = data.try_into_val(&ctx.env).unwrap();
    assert_eq!(
        fees,
        WithdrewFees {
            caller: ctx.admin.clone(),
            token: ctx.token.address.clone(),
            amount: 6_000,
        }
    );
}

#[test]
fn test_funds_moved_event() {
    let ctx = TestContext::new();
    let from = ctx.create_default_project();
    let to = ctx.create_default_project();
    ctx.donate(from, 10_000);

    ctx.client
        .withdraw_funds_to_other_project(&ctx.admin, &from, &to);
    let (topics, data) = ctx.find_event("moved").expect("no moved event");
    assert_eq!(
        topics,
        vec![
            &ctx.env,
            symbol_short!("moved").into_val(&ctx.env),
            from.into_val(&ctx.env),
            to.into_val(&ctx.env),
        ]
    );
    let moved: FundsMoved = data.try_into_val(&ctx.env).unwrap();
    assert_eq!(
        moved,
        FundsMoved {
            from_project: from,
            to_project: to,
            amount: 10_000,
        }
    );
}

#[test]
fn test_admin_events() {
    let ctx = TestContext::new();

    ctx.client.pause(&ctx.admin);
    let (topics, _) = ctx.find_event("paused").expect("no paused event");
    assert_eq!(
        topics,
        vec![
            &ctx.env,
            symbol_short!("paused").into_val(&ctx.env),
            ctx.admin.into_val(&ctx.env),
        ]
    );

    ctx.client.unpause(&ctx.admin);
    assert!(ctx.find_event("unpaused").is_some());

    let account = ctx.generate_address();
    ctx.client.grant_role(&ctx.admin, &account, &Role::Pauser);
    let (topics, data) = ctx.find_event("granted").expect("no granted event");
    let who: Address = topics.get(1).unwrap().try_into_val(&ctx.env).unwrap();
    assert_eq!(who, account);
    let role: Role = data.try_into_val(&ctx.env).unwrap();
    assert_eq!(role, Role::Pauser);

    ctx.client.set_donation_fee(&ctx.admin, &ctx.create_default_project(), &42);
    assert!(ctx.find_event("fee_upd").is_some());
}
