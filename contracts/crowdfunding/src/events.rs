use soroban_sdk::{contracttype, symbol_short, Address, BytesN, Env};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectCreated {
    pub project_id: u64,
    pub owner: Address,
    pub token: Address,
    pub required_amount: i128,
    pub nb_of_thresholds: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DonatedToProject {
    pub donor: Address,
    pub project_id: u64,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VotingStarted {
    pub project_id: u64,
    pub threshold: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ThresholdVoted {
    pub project_id: u64,
    pub threshold: u32,
    pub voter: Address,
    pub approve: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ThresholdDeliberated {
    pub project_id: u64,
    pub threshold: u32,
    pub approved: bool,
    pub positive: u32,
    pub negative: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrewFunds {
    pub owner: Address,
    pub project_id: u64,
    pub token: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrewFees {
    pub caller: Address,
    pub token: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DonationFeeUpdated {
    pub project_id: u64,
    pub new_fee: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectStatusUpdated {
    pub project_id: u64,
    pub is_active: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VoteCooldownUpdated {
    pub project_id: u64,
    pub vote_cooldown: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundsMoved {
    pub from_project: u64,
    pub to_project: u64,
    pub amount: i128,
}

pub fn emit_project_created(
    env: &Env,
    project_id: u64,
    owner: Address,
    token: Address,
    required_amount: i128,
    nb_of_thresholds: u32,
) {
    let topics = (symbol_short!("created"), project_id);
    let data = ProjectCreated {
        project_id,
        owner,
        token,
        required_amount,
        nb_of_thresholds,
    };
    env.events().publish(topics, data);
}

pub fn emit_donated(env: &Env, project_id: u64, donor: Address, amount: i128) {
    let topics = (symbol_short!("donated"), project_id);
    let data = DonatedToProject {
        donor,
        project_id,
        amount,
    };
    env.events().publish(topics, data);
}

pub fn emit_voting_started(env: &Env, project_id: u64, threshold: u32) {
    let topics = (symbol_short!("vote_open"), project_id);
    let data = VotingStarted {
        project_id,
        threshold,
    };
    env.events().publish(topics, data);
}

pub fn emit_voted(env: &Env, project_id: u64, threshold: u32, voter: Address, approve: bool) {
    let topics = (symbol_short!("voted"), project_id);
    let data = ThresholdVoted {
        project_id,
        threshold,
        voter,
        approve,
    };
    env.events().publish(topics, data);
}

pub fn emit_deliberated(
    env: &Env,
    project_id: u64,
    threshold: u32,
    approved: bool,
    positive: u32,
    negative: u32,
) {
    let topics = (symbol_short!("decided"), project_id);
    let data = ThresholdDeliberated {
        project_id,
        threshold,
        approved,
        positive,
        negative,
    };
    env.events().publish(topics, data);
}

pub fn emit_withdrew_funds(env: &Env, project_id: u64, owner: Address, token: Address, amount: i128) {
    let topics = (symbol_short!("withdrawn"), project_id);
    let data = WithdrewFunds {
        owner,
        project_id,
        token,
        amount,
    };
    env.events().publish(topics, data);
}

pub fn emit_withdrew_fees(env: &Env, caller: Address, token: Address, amount: i128) {
    let topics = (symbol_short!("fees_out"), token.clone());
    let data = WithdrewFees {
        caller,
        token,
        amount,
    };
    env.events().publish(topics, data);
}

pub fn emit_donation_fee_updated(env: &Env, project_id: u64, new_fee: u32) {
    let topics = (symbol_short!("fee_upd"), project_id);
    env.events()
        .publish(topics, DonationFeeUpdated { project_id, new_fee });
}

pub fn emit_status_updated(env: &Env, project_id: u64, is_active: bool) {
    let topics = (symbol_short!("status"), project_id);
    env.events().publish(
        topics,
        ProjectStatusUpdated {
            project_id,
            is_active,
        },
    );
}

pub fn emit_vote_cooldown_updated(env: &Env, project_id: u64, vote_cooldown: u64) {
    let topics = (symbol_short!("cooldown"), project_id);
    env.events().publish(
        topics,
        VoteCooldownUpdated {
            project_id,
            vote_cooldown,
        },
    );
}

/// Topics carry both projects so either side can filter on it.
pub fn emit_funds_moved(env: &Env, from_project: u64, to_project: u64, amount: i128) {
    let topics = (symbol_short!("moved"), from_project, to_project);
    let data = FundsMoved {
        from_project,
        to_project,
        amount,
    };
    env.events().publish(topics, data);
}

pub fn emit_token_added(env: &Env, token: Address) {
    env.events().publish((symbol_short!("token_add"), token), ());
}

pub fn emit_protocol_paused(env: &Env, caller: Address) {
    env.events().publish((symbol_short!("paused"), caller), ());
}

pub fn emit_protocol_unpaused(env: &Env, caller: Address) {
    env.events().publish((symbol_short!("unpaused"), caller), ());
}

pub fn emit_upgraded(env: &Env, new_wasm_hash: BytesN<32>) {
    env.events().publish((symbol_short!("upgraded"),), new_wasm_hash);
}
