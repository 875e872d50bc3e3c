// contracts/crowdfunding/src/types.rs
//
// A project is persisted as two entries:
//   - ProjectConfig: written once by `create_project`, never mutated.
//   - ProjectState:  the counters touched by donations, votes and withdrawals.
//
// Thresholds live under their own keys (project_id, index) so a donation or a
// ballot only rewrites the single threshold it touches.

use soroban_sdk::{contracttype, Address, String, Vec};

/// Caller-supplied description of a new project.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectData {
    /// Receives released funds. Must not be the zero address.
    pub owner: Address,
    /// The single SEP-41 token this project accepts. Must be a supported token.
    pub exchange_token: Address,
    pub name: String,
    pub asso_name: String,
    pub description: String,
    pub team_members: Vec<String>,
    /// Total funding target, > 0.
    pub required_amount: i128,
    /// Approval ratio in basis points, in (0, 10000].
    pub required_vote_percentage: u32,
    /// Seconds that must elapse after a deliberation before a new session opens.
    pub vote_cooldown: u64,
    /// Basis points skimmed from every donation, <= 10000.
    pub donation_fee: u32,
}

/// Immutable part of a project.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectConfig {
    pub id: u64,
    pub owner: Address,
    pub exchange_token: Address,
    pub name: String,
    pub asso_name: String,
    pub description: String,
    pub team_members: Vec<String>,
    pub required_amount: i128,
    pub required_vote_percentage: u32,
    pub nb_of_thresholds: u32,
}

/// Mutable part of a project.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectState {
    pub vote_cooldown: u64,
    pub donation_fee: u32,
    /// Net donations held for the project.
    pub current_amount: i128,
    /// Index of the threshold currently being funded or voted on.
    pub current_threshold: u32,
    /// Released by approved thresholds, owed to the owner.
    pub available_to_withdraw: i128,
    pub is_active: bool,
    /// Distinct donors with a non-zero record.
    pub donor_count: u32,
    /// Ledger timestamp of the latest deliberation, 0 if none.
    pub last_deliberation: u64,
}

impl ProjectState {
    pub fn new(vote_cooldown: u64, donation_fee: u32) -> Self {
        Self {
            vote_cooldown,
            donation_fee,
            current_amount: 0,
            current_threshold: 0,
            available_to_withdraw: 0,
            is_active: true,
            donor_count: 0,
            last_deliberation: 0,
        }
    }
}

/// Read model returned by `get_project`: config and state merged.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Project {
    pub id: u64,
    pub owner: Address,
    pub exchange_token: Address,
    pub name: String,
    pub asso_name: String,
    pub description: String,
    pub team_members: Vec<String>,
    pub required_amount: i128,
    pub required_vote_percentage: u32,
    pub nb_of_thresholds: u32,
    pub vote_cooldown: u64,
    pub donation_fee: u32,
    pub current_amount: i128,
    pub current_threshold: u32,
    pub available_to_withdraw: i128,
    pub is_active: bool,
    pub donor_count: u32,
    pub last_deliberation: u64,
}

impl Project {
    pub fn from_parts(config: ProjectConfig, state: ProjectState) -> Self {
        Self {
            id: config.id,
            owner: config.owner,
            exchange_token: config.exchange_token,
            name: config.name,
            asso_name: config.asso_name,
            description: config.description,
            team_members: config.team_members,
            required_amount: config.required_amount,
            required_vote_percentage: config.required_vote_percentage,
            nb_of_thresholds: config.nb_of_thresholds,
            vote_cooldown: state.vote_cooldown,
            donation_fee: state.donation_fee,
            current_amount: state.current_amount,
            current_threshold: state.current_threshold,
            available_to_withdraw: state.available_to_withdraw,
            is_active: state.is_active,
            donor_count: state.donor_count,
            last_deliberation: state.last_deliberation,
        }
    }
}

/// Ballot counts of one threshold.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VoteTally {
    pub positive: u32,
    pub negative: u32,
    /// Ledger timestamp at which the session was (re)opened.
    pub opened_at: u64,
}

impl VoteTally {
    pub fn total(&self) -> u32 {
        self.positive.saturating_add(self.negative)
    }
}

/// Voting state of a threshold.
///
/// A tally only exists once the funding boundary has been reached, so a
/// `Pending` threshold cannot carry ballots.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum VoteSession {
    /// Funding boundary not reached yet.
    Pending,
    /// Donors may cast one ballot each.
    InSession(VoteTally),
    /// Deliberated and released. Terminal.
    Approved(VoteTally),
    /// Deliberated and not released. Reopens on a later qualifying donation.
    Rejected(VoteTally),
}

impl VoteSession {
    pub fn is_voting_in_session(&self) -> bool {
        matches!(self, VoteSession::InSession(_))
    }

    pub fn tally(&self) -> Option<&VoteTally> {
        match self {
            VoteSession::Pending => None,
            VoteSession::InSession(t) | VoteSession::Approved(t) | VoteSession::Rejected(t) => {
                Some(t)
            }
        }
    }

    pub fn positive_votes(&self) -> u32 {
        self.tally().map(|t| t.positive).unwrap_or(0)
    }

    pub fn negative_votes(&self) -> u32 {
        self.tally().map(|t| t.negative).unwrap_or(0)
    }
}

/// A funding milestone of a project, addressed by its 0-based position.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Threshold {
    /// Released to the owner when the threshold's vote passes.
    pub budget: i128,
    pub session: VoteSession,
}

impl Threshold {
    pub fn new(budget: i128) -> Self {
        Self {
            budget,
            session: VoteSession::Pending,
        }
    }
}
