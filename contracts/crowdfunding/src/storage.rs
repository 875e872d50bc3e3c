// contracts/crowdfunding/src/storage.rs
//
// Storage helpers for Crowdfunding.
//
// Instance storage holds contract-wide scalars (schema version, pause flag,
// project counter). Everything keyed by project, token or account lives in
// persistent storage and has its TTL extended whenever it is read or written.

use soroban_sdk::{contracttype, Address, Env};

use crate::{
    rbac::Role,
    types::{ProjectConfig, ProjectState, Threshold},
    Error,
};

const DAY_IN_LEDGERS: u32 = 17_280;

pub const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
pub const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;

pub const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
pub const PERSISTENT_LIFETIME_THRESHOLD: u32 = PERSISTENT_BUMP_AMOUNT - DAY_IN_LEDGERS;

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Version,                      // instance   -> u32
    Paused,                       // instance   -> bool
    ProjectCount,                 // instance   -> u64
    RoleMember(Role, Address),    // persistent -> bool
    SupportedToken(Address),      // persistent -> bool
    Fees(Address),                // persistent -> i128
    ProjectConfig(u64),           // persistent -> ProjectConfig
    ProjectState(u64),            // persistent -> ProjectState
    Threshold(u64, u32),          // persistent -> Threshold
    Donation(u64, Address),       // persistent -> i128
    Ballot(u64, u32, Address),    // persistent -> bool
}

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

fn set_persistent<V>(env: &Env, key: &DataKey, value: &V)
where
    V: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
{
    env.storage().persistent().set(key, value);
    bump_persistent(env, key);
}

fn get_persistent<V>(env: &Env, key: &DataKey) -> Option<V>
where
    V: soroban_sdk::TryFromVal<Env, soroban_sdk::Val>,
{
    let value = env.storage().persistent().get(key);
    if value.is_some() {
        bump_persistent(env, key);
    }
    value
}

// ─────────────────────────────────────────────────────────
// Instance scalars
// ─────────────────────────────────────────────────────────

/// Stored schema version; `0` means the contract was never initialised.
pub fn get_version(env: &Env) -> u32 {
    env.storage()
        .instance()
        .get(&DataKey::Version)
        .unwrap_or(0)
}

pub fn set_version(env: &Env, version: u32) {
    env.storage().instance().set(&DataKey::Version, &version);
    bump_instance(env);
}

pub fn is_paused(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&DataKey::Paused)
        .unwrap_or(false)
}

pub fn set_paused(env: &Env, paused: bool) {
    env.storage().instance().set(&DataKey::Paused, &paused);
    bump_instance(env);
}

/// Number of projects created so far; also the next project id.
pub fn project_count(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::ProjectCount)
        .unwrap_or(0)
}

/// Read and increment the project counter.
/// Returns the ID that should be used for the next project.
pub fn get_and_increment_project_id(env: &Env) -> Result<u64, Error> {
    let id = project_count(env);
    let next = id.checked_add(1).ok_or(Error::Overflow)?;
    env.storage().instance().set(&DataKey::ProjectCount, &next);
    bump_instance(env);
    Ok(id)
}

// ─────────────────────────────────────────────────────────
// Roles
// ─────────────────────────────────────────────────────────

pub fn has_role(env: &Env, role: Role, account: &Address) -> bool {
    get_persistent(env, &DataKey::RoleMember(role, account.clone())).unwrap_or(false)
}

pub fn set_role(env: &Env, role: Role, account: &Address) {
    set_persistent(env, &DataKey::RoleMember(role, account.clone()), &true);
}

pub fn remove_role(env: &Env, role: Role, account: &Address) {
    env.storage()
        .persistent()
        .remove(&DataKey::RoleMember(role, account.clone()));
}

// ─────────────────────────────────────────────────────────
// Supported tokens and fee ledger
// ─────────────────────────────────────────────────────────

pub fn is_token_supported(env: &Env, token: &Address) -> bool {
    get_persistent(env, &DataKey::SupportedToken(token.clone())).unwrap_or(false)
}

pub fn add_supported_token(env: &Env, token: &Address) {
    set_persistent(env, &DataKey::SupportedToken(token.clone()), &true);
}

/// Protocol fees accumulated for `token`; 0 if none were ever collected.
pub fn get_fees(env: &Env, token: &Address) -> i128 {
    get_persistent(env, &DataKey::Fees(token.clone())).unwrap_or(0)
}

pub fn add_fees(env: &Env, token: &Address, amount: i128) -> Result<i128, Error> {
    let total = get_fees(env, token)
        .checked_add(amount)
        .ok_or(Error::Overflow)?;
    set_persistent(env, &DataKey::Fees(token.clone()), &total);
    Ok(total)
}

/// Zero the fee balance of `token` and return what it was.
pub fn drain_fees(env: &Env, token: &Address) -> i128 {
    let fees = get_fees(env, token);
    if fees > 0 {
        set_persistent(env, &DataKey::Fees(token.clone()), &0i128);
    }
    fees
}

// ─────────────────────────────────────────────────────────
// Projects
// ─────────────────────────────────────────────────────────

pub fn save_project_config(env: &Env, config: &ProjectConfig) {
    set_persistent(env, &DataKey::ProjectConfig(config.id), config);
}

pub fn save_project_state(env: &Env, id: u64, state: &ProjectState) {
    set_persistent(env, &DataKey::ProjectState(id), state);
}

pub fn load_project_config(env: &Env, id: u64) -> Result<ProjectConfig, Error> {
    get_persistent(env, &DataKey::ProjectConfig(id)).ok_or(Error::InvalidProjectId)
}

pub fn load_project_state(env: &Env, id: u64) -> Result<ProjectState, Error> {
    get_persistent(env, &DataKey::ProjectState(id)).ok_or(Error::InvalidProjectId)
}

/// Load both halves of a project, failing with `InvalidProjectId` if either is missing.
pub fn load_project_pair(env: &Env, id: u64) -> Result<(ProjectConfig, ProjectState), Error> {
    Ok((load_project_config(env, id)?, load_project_state(env, id)?))
}

pub fn save_threshold(env: &Env, project_id: u64, index: u32, threshold: &Threshold) {
    set_persistent(env, &DataKey::Threshold(project_id, index), threshold);
}

pub fn load_threshold(env: &Env, project_id: u64, index: u32) -> Result<Threshold, Error> {
    get_persistent(env, &DataKey::Threshold(project_id, index)).ok_or(Error::InvalidThresholdId)
}

// ─────────────────────────────────────────────────────────
// Donations and ballots
// ─────────────────────────────────────────────────────────

/// Cumulative net amount credited to `donor` on `project_id`.
pub fn get_donation(env: &Env, project_id: u64, donor: &Address) -> i128 {
    get_persistent(env, &DataKey::Donation(project_id, donor.clone())).unwrap_or(0)
}

pub fn set_donation(env: &Env, project_id: u64, donor: &Address, amount: i128) {
    set_persistent(env, &DataKey::Donation(project_id, donor.clone()), &amount);
}

pub fn has_ballot(env: &Env, project_id: u64, threshold: u32, voter: &Address) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::Ballot(project_id, threshold, voter.clone()))
}

pub fn record_ballot(env: &Env, project_id: u64, threshold: u32, voter: &Address, approve: bool) {
    set_persistent(
        env,
        &DataKey::Ballot(project_id, threshold, voter.clone()),
        &approve,
    );
}
