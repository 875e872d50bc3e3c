//! # Role-Based Access Control
//!
//! Four independent roles gate the mutating entry points:
//!
//! | Role           | Can do                                                               |
//! |----------------|----------------------------------------------------------------------|
//! | `DefaultAdmin` | grant/revoke roles, `upgrade`, `migrate`                              |
//! | `Pauser`       | `pause`, `unpause`                                                    |
//! | `Updater`      | tokens, projects, fees, cooldowns, deliberations, cross-project moves |
//! | `Withdrawer`   | drain accumulated protocol fees                                       |
//!
//! An address may hold any combination of roles. Membership is a persistent
//! `RoleMember(role, address) -> true` entry; absence means "not a member".

use soroban_sdk::{contracttype, symbol_short, Address, Env};

use crate::{storage, Error};

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    DefaultAdmin,
    Pauser,
    Updater,
    Withdrawer,
}

const ALL_ROLES: [Role; 4] = [
    Role::DefaultAdmin,
    Role::Pauser,
    Role::Updater,
    Role::Withdrawer,
];

pub fn has_role(env: &Env, account: &Address, role: Role) -> bool {
    storage::has_role(env, role, account)
}

/// Fails with `MissingRole` unless `account` holds `role`.
pub fn require_role(env: &Env, account: &Address, role: Role) -> Result<(), Error> {
    if has_role(env, account, role) {
        Ok(())
    } else {
        Err(Error::MissingRole)
    }
}

/// Grant every role to the first administrator.
pub fn init_admin(env: &Env, admin: &Address) {
    for role in ALL_ROLES {
        grant(env, admin, role);
    }
}

/// `caller` must hold `DefaultAdmin`. Granting a role already held is a no-op.
pub fn grant_role(env: &Env, caller: &Address, account: &Address, role: Role) -> Result<(), Error> {
    require_role(env, caller, Role::DefaultAdmin)?;
    grant(env, account, role);
    Ok(())
}

/// `caller` must hold `DefaultAdmin`. Revoking a role not held is a no-op.
pub fn revoke_role(
    env: &Env,
    caller: &Address,
    account: &Address,
    role: Role,
) -> Result<(), Error> {
    require_role(env, caller, Role::DefaultAdmin)?;
    revoke(env, account, role);
    Ok(())
}

pub fn renounce_role(env: &Env, caller: &Address, role: Role) {
    revoke(env, caller, role);
}

fn grant(env: &Env, account: &Address, role: Role) {
    if storage::has_role(env, role, account) {
        return;
    }
    storage::set_role(env, role, account);
    env.events()
        .publish((symbol_short!("granted"), account.clone()), role);
}

fn revoke(env: &Env, account: &Address, role: Role) {
    if !storage::has_role(env, role, account) {
        return;
    }
    storage::remove_role(env, role, account);
    env.events()
        .publish((symbol_short!("revoked"), account.clone()), role);
}
