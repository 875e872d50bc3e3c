//! # Crowdfunding Contract
//!
//! A single upgradeable Soroban contract. Administrators register projects
//! that accept donations in one supported token. Each project's budget is cut
//! into ordered thresholds, and donors vote to release each one to the owner.
//! A basis-point fee is skimmed from every donation into a protocol pool.
//!
//! | Phase        | Entry Point(s)                                                          |
//! |--------------|-------------------------------------------------------------------------|
//! | Bootstrap    | [`Crowdfunding::initialize`], `migrate`, `upgrade`, `version`           |
//! | Role admin   | `grant_role`, `revoke_role`, `renounce_role`, `has_role`                |
//! | Emergency    | `pause`, `unpause`, `is_paused`                                         |
//! | Registry     | `add_supported_token`, `is_token_supported`                             |
//! | Projects     | [`Crowdfunding::create_project`], `update_project_status`, `set_donation_fee`, `update_project_vote_cooldown` |
//! | Donations    | [`Crowdfunding::donate_to_project`], `is_donator`, `get_user_donations` |
//! | Voting       | `vote_for_threshold`, `open_threshold_voting`, `end_threshold_voting`, `get_threshold_vote_from_address` |
//! | Withdrawals  | `withdraw_funds`, `withdraw_fees`, `withdraw_funds_to_other_project`    |
//!
//! ## Architecture
//!
//! Authorization lives in [`rbac`], storage access in [`storage`] and the
//! session state machine in [`voting`]. Entry points follow the same order:
//! pause guard, authentication, role guard, validation, effects, token
//! transfer, event.

#![no_std]

#[cfg(test)]
extern crate std;

use soroban_sdk::{
    contract, contracterror, contractimpl, token, Address, BytesN, Env, String, Vec,
};

pub mod events;
pub mod rbac;
mod storage;
mod types;
pub mod voting;

#[cfg(test)]
mod test_voting;
#[cfg(test)]
mod test_events;

pub use rbac::Role;
use storage::{
    get_and_increment_project_id, load_project_config, load_project_pair, load_project_state,
    save_project_config, save_project_state,
};
pub use types::{
    Project, ProjectConfig, ProjectData, ProjectState, Threshold, VoteSession, VoteTally,
};

/// Denominator of every basis-point value.
pub const BASIS_POINTS: u32 = 10_000;

/// Schema version written by `initialize` and checked by `migrate`.
pub const STORAGE_VERSION: u32 = 1;

/// Strkey of the all-zero ed25519 account, used as the null address.
pub const ZERO_ADDRESS: &str = "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF";

pub fn zero_address(env: &Env) -> Address {
    Address::from_string(&String::from_str(env, ZERO_ADDRESS))
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    MissingRole = 3,
    ProtocolPaused = 4,
    NotPaused = 5,
    TokenNotSupported = 6,
    ZeroThresholds = 7,
    ZeroRequiredAmount = 8,
    CantGoAbove10000 = 9,
    ZeroAddress = 10,
    ZeroVoteCooldown = 11,
    ZeroRequiredVotePercentage = 12,
    InvalidProjectId = 13,
    InvalidThresholdId = 14,
    ZeroAmount = 15,
    ProjectNotActive = 16,
    AmountTooSmall = 17,
    AllowanceNotApproved = 18,
    NotADonator = 19,
    NotInVotingSession = 20,
    CanOnlyVoteOnce = 21,
    CantDeliberateWithoutVotes = 22,
    NoFundsToWithdraw = 23,
    NotProjectOwner = 24,
    NoFeesToWithdraw = 25,
    CantWithdrawToSameProject = 26,
    DifferentExchangeToken = 27,
    Overflow = 28,
    AlreadyMigrated = 29,
}

#[contract]
pub struct Crowdfunding;

#[contractimpl]
impl Crowdfunding {
    // ─────────────────────────────────────────────────────────
    // Initialisation and upgrades
    // ─────────────────────────────────────────────────────────

    /// Initialise the contract and grant every role to `admin`.
    ///
    /// Must be called exactly once after deployment; later calls fail with
    /// `AlreadyInitialized`.
    pub fn initialize(env: Env, admin: Address) -> Result<(), Error> {
        admin.require_auth();
        if storage::get_version(&env) != 0 {
            return Err(Error::AlreadyInitialized);
        }
        rbac::init_admin(&env, &admin);
        storage::set_version(&env, STORAGE_VERSION);
        Ok(())
    }

    /// Replace the contract code, keeping storage. `caller` needs `DefaultAdmin`.
    pub fn upgrade(env: Env, caller: Address, new_wasm_hash: BytesN<32>) -> Result<(), Error> {
        caller.require_auth();
        rbac::require_role(&env, &caller, Role::DefaultAdmin)?;
        env.deployer()
            .update_current_contract_wasm(new_wasm_hash.clone());
        events::emit_upgraded(&env, new_wasm_hash);
        Ok(())
    }

    /// Schema migration hook, run once after an `upgrade` that bumps
    /// `STORAGE_VERSION`.
    pub fn migrate(env: Env, caller: Address) -> Result<u32, Error> {
        caller.require_auth();
        let stored = storage::get_version(&env);
        if stored == 0 {
            return Err(Error::NotInitialized);
        }
        rbac::require_role(&env, &caller, Role::DefaultAdmin)?;
        if stored >= STORAGE_VERSION {
            return Err(Error::AlreadyMigrated);
        }
        storage::set_version(&env, STORAGE_VERSION);
        Ok(STORAGE_VERSION)
    }

    /// Stored schema version, `0` before `initialize`.
    pub fn version(env: Env) -> u32 {
        storage::get_version(&env)
    }

    // ─────────────────────────────────────────────────────────
    // Role management
    // ─────────────────────────────────────────────────────────

    pub fn grant_role(env: Env, caller: Address, account: Address, role: Role) -> Result<(), Error> {
        caller.require_auth();
        rbac::grant_role(&env, &caller, &account, role)
    }

    pub fn revoke_role(
        env: Env,
        caller: Address,
        account: Address,
        role: Role,
    ) -> Result<(), Error> {
        caller.require_auth();
        rbac::revoke_role(&env, &caller, &account, role)
    }

    /// Drop one of the caller's own roles.
    pub fn renounce_role(env: Env, caller: Address, role: Role) {
        caller.require_auth();
        rbac::renounce_role(&env, &caller, role);
    }

    pub fn has_role(env: Env, account: Address, role: Role) -> bool {
        rbac::has_role(&env, &account, role)
    }

    // ─────────────────────────────────────────────────────────
    // Emergency control
    // ─────────────────────────────────────────────────────────

    /// Halt every mutating project, donation, vote and withdrawal entry point.
    pub fn pause(env: Env, caller: Address) -> Result<(), Error> {
        caller.require_auth();
        rbac::require_role(&env, &caller, Role::Pauser)?;
        if storage::is_paused(&env) {
            return Err(Error::ProtocolPaused);
        }
        storage::set_paused(&env, true);
        events::emit_protocol_paused(&env, caller);
        Ok(())
    }

    pub fn unpause(env: Env, caller: Address) -> Result<(), Error> {
        caller.require_auth();
        rbac::require_role(&env, &caller, Role::Pauser)?;
        if !storage::is_paused(&env) {
            return Err(Error::NotPaused);
        }
        storage::set_paused(&env, false);
        events::emit_protocol_unpaused(&env, caller);
        Ok(())
    }

    pub fn is_paused(env: Env) -> bool {
        storage::is_paused(&env)
    }

    // ─────────────────────────────────────────────────────────
    // Registry
    // ─────────────────────────────────────────────────────────

    /// Allow `token` as a project exchange token. Adding it twice is a no-op.
    pub fn add_supported_token(env: Env, caller: Address, token: Address) -> Result<(), Error> {
        Self::require_not_paused(&env)?;
        caller.require_auth();
        rbac::require_role(&env, &caller, Role::Updater)?;

        if token == zero_address(&env) {
            return Err(Error::ZeroAddress);
        }
        if !storage::is_token_supported(&env, &token) {
            storage::add_supported_token(&env, &token);
            events::emit_token_added(&env, token);
        }
        Ok(())
    }

    pub fn is_token_supported(env: Env, token: Address) -> bool {
        storage::is_token_supported(&env, &token)
    }

    // ─────────────────────────────────────────────────────────
    // Project store
    // ─────────────────────────────────────────────────────────

    /// Register a project and its thresholds. Returns the new project id.
    ///
    /// `thresholds` holds one budget per milestone, in release order. Every
    /// threshold starts `Pending`.
    pub fn create_project(
        env: Env,
        caller: Address,
        project: ProjectData,
        thresholds: Vec<i128>,
    ) -> Result<u64, Error> {
        Self::require_not_paused(&env)?;
        caller.require_auth();
        rbac::require_role(&env, &caller, Role::Updater)?;

        if !storage::is_token_supported(&env, &project.exchange_token) {
            return Err(Error::TokenNotSupported);
        }
        if thresholds.is_empty() {
            return Err(Error::ZeroThresholds);
        }
        if project.required_amount <= 0 {
            return Err(Error::ZeroRequiredAmount);
        }
        if project.required_vote_percentage > BASIS_POINTS || project.donation_fee > BASIS_POINTS {
            return Err(Error::CantGoAbove10000);
        }
        if project.owner == zero_address(&env) {
            return Err(Error::ZeroAddress);
        }
        if project.vote_cooldown == 0 {
            return Err(Error::ZeroVoteCooldown);
        }
        if project.required_vote_percentage == 0 {
            return Err(Error::ZeroRequiredVotePercentage);
        }

        let mut total: i128 = 0;
        for budget in thresholds.iter() {
            if budget <= 0 {
                return Err(Error::ZeroRequiredAmount);
            }
            total = total.checked_add(budget).ok_or(Error::Overflow)?;
        }

        let id = get_and_increment_project_id(&env)?;
        let config = ProjectConfig {
            id,
            owner: project.owner,
            exchange_token: project.exchange_token,
            name: project.name,
            asso_name: project.asso_name,
            description: project.description,
            team_members: project.team_members,
            required_amount: project.required_amount,
            required_vote_percentage: project.required_vote_percentage,
            nb_of_thresholds: thresholds.len(),
        };
        save_project_config(&env, &config);
        save_project_state(
            &env,
            id,
            &ProjectState::new(project.vote_cooldown, project.donation_fee),
        );
        for (index, budget) in thresholds.iter().enumerate() {
            storage::save_threshold(&env, id, index as u32, &Threshold::new(budget));
        }

        events::emit_project_created(
            &env,
            id,
            config.owner,
            config.exchange_token,
            config.required_amount,
            config.nb_of_thresholds,
        );
        Ok(id)
    }

    pub fn get_project(env: Env, id: u64) -> Result<Project, Error> {
        let (config, state) = load_project_pair(&env, id)?;
        Ok(Project::from_parts(config, state))
    }

    pub fn get_project_thresholds(env: Env, id: u64, threshold_id: u32) -> Result<Threshold, Error> {
        let config = load_project_config(&env, id)?;
        if threshold_id >= config.nb_of_thresholds {
            return Err(Error::InvalidThresholdId);
        }
        storage::load_threshold(&env, id, threshold_id)
    }

    pub fn get_project_count(env: Env) -> u64 {
        storage::project_count(&env)
    }

    /// Open or close a project to donations.
    pub fn update_project_status(
        env: Env,
        caller: Address,
        id: u64,
        is_active: bool,
    ) -> Result<(), Error> {
        Self::require_not_paused(&env)?;
        caller.require_auth();
        rbac::require_role(&env, &caller, Role::Updater)?;

        let mut state = load_project_state(&env, id)?;
        state.is_active = is_active;
        save_project_state(&env, id, &state);

        events::emit_status_updated(&env, id, is_active);
        Ok(())
    }

    pub fn update_project_vote_cooldown(
        env: Env,
        caller: Address,
        id: u64,
        vote_cooldown: u64,
    ) -> Result<(), Error> {
        Self::require_not_paused(&env)?;
        caller.require_auth();
        rbac::require_role(&env, &caller, Role::Updater)?;

        let mut state = load_project_state(&env, id)?;
        if vote_cooldown == 0 {
            return Err(Error::ZeroVoteCooldown);
        }
        state.vote_cooldown = vote_cooldown;
        save_project_state(&env, id, &state);

        events::emit_vote_cooldown_updated(&env, id, vote_cooldown);
        Ok(())
    }

    /// Change the fee skimmed from future donations, in basis points.
    pub fn set_donation_fee(env: Env, caller: Address, id: u64, new_fee: u32) -> Result<(), Error> {
        Self::require_not_paused(&env)?;
        caller.require_auth();
        rbac::require_role(&env, &caller, Role::Updater)?;

        let mut state = load_project_state(&env, id)?;
        if new_fee > BASIS_POINTS {
            return Err(Error::CantGoAbove10000);
        }
        state.donation_fee = new_fee;
        save_project_state(&env, id, &state);

        events::emit_donation_fee_updated(&env, id, new_fee);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Donation ledger
    // ─────────────────────────────────────────────────────────

    /// Donate `amount` of the project's exchange token.
    ///
    /// The donor must have approved the contract for at least `amount`
    /// beforehand. The fee is skimmed first; the project and the donor record
    /// are credited with the net amount. Reaching the current threshold's
    /// funding boundary opens its voting session.
    pub fn donate_to_project(env: Env, donor: Address, id: u64, amount: i128) -> Result<(), Error> {
        Self::require_not_paused(&env)?;
        donor.require_auth();

        let (config, mut state) = load_project_pair(&env, id)?;
        if amount <= 0 {
            return Err(Error::ZeroAmount);
        }
        if !state.is_active {
            return Err(Error::ProjectNotActive);
        }

        let contract = env.current_contract_address();
        let token_client = token::Client::new(&env, &config.exchange_token);
        if token_client.balance(&donor) < amount {
            return Err(Error::AmountTooSmall);
        }
        if token_client.allowance(&donor, &contract) < amount {
            return Err(Error::AllowanceNotApproved);
        }

        let fee = amount
            .checked_mul(state.donation_fee as i128)
            .ok_or(Error::Overflow)?
            / BASIS_POINTS as i128;
        let net = amount - fee;

        state.current_amount = state
            .current_amount
            .checked_add(net)
            .ok_or(Error::Overflow)?;

        let previous = storage::get_donation(&env, id, &donor);
        if previous == 0 && net > 0 {
            state.donor_count = state.donor_count.checked_add(1).ok_or(Error::Overflow)?;
        }
        let total = previous.checked_add(net).ok_or(Error::Overflow)?;
        storage::set_donation(&env, id, &donor, total);

        if fee > 0 {
            storage::add_fees(&env, &config.exchange_token, fee)?;
        }

        let opened = voting::open_session_if_funded(&env, &config, &state)?;
        save_project_state(&env, id, &state);

        // Pull the gross amount only after every write.
        token_client.transfer_from(&contract, &donor, &contract, &amount);

        events::emit_donated(&env, id, donor, amount);
        if let Some(threshold) = opened {
            events::emit_voting_started(&env, id, threshold);
        }
        Ok(())
    }

    pub fn is_donator(env: Env, donor: Address, id: u64) -> Result<bool, Error> {
        load_project_config(&env, id)?;
        Ok(storage::get_donation(&env, id, &donor) > 0)
    }

    /// Cumulative net amount `donor` has given to project `id`.
    pub fn get_user_donations(env: Env, donor: Address, id: u64) -> Result<i128, Error> {
        load_project_config(&env, id)?;
        Ok(storage::get_donation(&env, id, &donor))
    }

    // ─────────────────────────────────────────────────────────
    // Threshold voting
    // ─────────────────────────────────────────────────────────

    /// Cast one ballot on the project's current threshold.
    ///
    /// A threshold whose boundary was reached while the cooldown was still
    /// running opens here, before the ballot is counted.
    pub fn vote_for_threshold(env: Env, voter: Address, id: u64, approve: bool) -> Result<(), Error> {
        Self::require_not_paused(&env)?;
        voter.require_auth();

        let (config, state) = load_project_pair(&env, id)?;
        if storage::get_donation(&env, id, &voter) <= 0 {
            return Err(Error::NotADonator);
        }

        if let Some(opened) = voting::open_session_if_funded(&env, &config, &state)? {
            events::emit_voting_started(&env, id, opened);
        }
        let threshold = voting::cast_ballot(&env, id, &state, &voter, approve)?;
        events::emit_voted(&env, id, threshold, voter, approve);
        Ok(())
    }

    /// Whether `voter` cast a ballot on `threshold_id` of project `id`.
    pub fn get_threshold_vote_from_address(
        env: Env,
        voter: Address,
        id: u64,
        threshold_id: u32,
    ) -> Result<bool, Error> {
        let config = load_project_config(&env, id)?;
        if threshold_id >= config.nb_of_thresholds {
            return Err(Error::InvalidThresholdId);
        }
        Ok(storage::has_ballot(&env, id, threshold_id, &voter))
    }

    /// Open the current threshold's session if its boundary is reached and
    /// the cooldown is over. Returns whether a session was opened.
    pub fn open_threshold_voting(env: Env, caller: Address, id: u64) -> Result<bool, Error> {
        Self::require_not_paused(&env)?;
        caller.require_auth();
        rbac::require_role(&env, &caller, Role::Updater)?;

        let (config, state) = load_project_pair(&env, id)?;
        match voting::open_session_if_funded(&env, &config, &state)? {
            Some(opened) => {
                events::emit_voting_started(&env, id, opened);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Close the current session and apply the deliberation rule.
    ///
    /// Returns `true` when the threshold was approved, in which case its
    /// budget becomes withdrawable and the project moves to the next one.
    pub fn end_threshold_voting(env: Env, caller: Address, id: u64) -> Result<bool, Error> {
        Self::require_not_paused(&env)?;
        caller.require_auth();
        rbac::require_role(&env, &caller, Role::Updater)?;

        let (config, mut state) = load_project_pair(&env, id)?;
        let outcome = voting::deliberate(&env, &config, &state)?;

        if outcome.approved {
            state.available_to_withdraw = state
                .available_to_withdraw
                .checked_add(outcome.budget)
                .ok_or(Error::Overflow)?;
            state.current_threshold += 1;
        }
        state.last_deliberation = env.ledger().timestamp();
        save_project_state(&env, id, &state);

        events::emit_deliberated(
            &env,
            id,
            outcome.threshold,
            outcome.approved,
            outcome.positive,
            outcome.negative,
        );
        Ok(outcome.approved)
    }

    // ─────────────────────────────────────────────────────────
    // Fees and withdrawals
    // ─────────────────────────────────────────────────────────

    pub fn get_fees_available_to_withdraw(env: Env, token: Address) -> i128 {
        storage::get_fees(&env, &token)
    }

    /// Send the whole fee pool of `token` to `caller`.
    pub fn withdraw_fees(env: Env, caller: Address, token: Address) -> Result<i128, Error> {
        Self::require_not_paused(&env)?;
        caller.require_auth();
        rbac::require_role(&env, &caller, Role::Withdrawer)?;

        if token == zero_address(&env) {
            return Err(Error::ZeroAddress);
        }
        let amount = storage::drain_fees(&env, &token);
        if amount == 0 {
            return Err(Error::NoFeesToWithdraw);
        }

        token::Client::new(&env, &token).transfer(&env.current_contract_address(), &caller, &amount);

        events::emit_withdrew_fees(&env, caller, token, amount);
        Ok(amount)
    }

    /// Send the project's released funds to its owner.
    pub fn withdraw_funds(env: Env, caller: Address, id: u64) -> Result<i128, Error> {
        Self::require_not_paused(&env)?;
        caller.require_auth();

        let (config, mut state) = load_project_pair(&env, id)?;
        if caller != config.owner {
            return Err(Error::NotProjectOwner);
        }
        let amount = state.available_to_withdraw;
        if amount == 0 {
            return Err(Error::NoFundsToWithdraw);
        }
        state.available_to_withdraw = 0;
        save_project_state(&env, id, &state);

        token::Client::new(&env, &config.exchange_token).transfer(
            &env.current_contract_address(),
            &config.owner,
            &amount,
        );

        events::emit_withdrew_funds(&env, id, config.owner, config.exchange_token, amount);
        Ok(amount)
    }

    /// Move the whole `current_amount` of `from_id` onto `to_id`.
    ///
    /// Bookkeeping only: both projects hold the same token in this contract.
    /// The source may be inactive; the destination may not.
    pub fn withdraw_funds_to_other_project(
        env: Env,
        caller: Address,
        from_id: u64,
        to_id: u64,
    ) -> Result<i128, Error> {
        Self::require_not_paused(&env)?;
        caller.require_auth();
        rbac::require_role(&env, &caller, Role::Updater)?;

        let (from_config, mut from_state) = load_project_pair(&env, from_id)?;
        let (to_config, mut to_state) = load_project_pair(&env, to_id)?;
        if from_id == to_id {
            return Err(Error::CantWithdrawToSameProject);
        }
        if from_config.exchange_token != to_config.exchange_token {
            return Err(Error::DifferentExchangeToken);
        }
        let amount = from_state.current_amount;
        if amount == 0 {
            return Err(Error::NoFundsToWithdraw);
        }
        if !to_state.is_active {
            return Err(Error::ProjectNotActive);
        }

        to_state.current_amount = to_state
            .current_amount
            .checked_add(amount)
            .ok_or(Error::Overflow)?;
        from_state.current_amount = 0;
        save_project_state(&env, from_id, &from_state);
        save_project_state(&env, to_id, &to_state);

        events::emit_funds_moved(&env, from_id, to_id, amount);
        Ok(amount)
    }

    // ─────────────────────────────────────────────────────────
    // Internal helpers
    // ─────────────────────────────────────────────────────────

    fn require_not_paused(env: &Env) -> Result<(), Error> {
        if storage::is_paused(env) {
            return Err(Error::ProtocolPaused);
        }
        Ok(())
    }
}
