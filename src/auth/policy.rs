// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Signalboard

//! Attribute-based access control.
//!
//! Rules are derived fresh from the actor's role on every check — nothing
//! here is persisted and nothing does I/O. Authorization decisions depend
//! on attributes of the resource (ownership), not just the role, which is
//! what lets a regular user edit their own posts but nobody else's.
//!
//! Resources carry an explicit [`ResourceKind`] tag; rules are keyed by
//! that enum, never by type names.

use serde::Serialize;
use utoipa::ToSchema;

use super::error::AuthError;
use super::extractor::AuthenticatedUser;
use super::roles::Role;

/// Actions a rule can grant.
///
/// `Manage` is the administrator escalation: it implies every other action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    Manage,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Create => write!(f, "create"),
            Action::Read => write!(f, "read"),
            Action::Update => write!(f, "update"),
            Action::Delete => write!(f, "delete"),
            Action::Manage => write!(f, "manage"),
        }
    }
}

/// Explicit type tag for every authorizable resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum ResourceKind {
    Feedback,
    User,
    #[serde(rename = "all")]
    All,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Feedback => write!(f, "Feedback"),
            ResourceKind::User => write!(f, "User"),
            ResourceKind::All => write!(f, "all"),
        }
    }
}

/// Something the policy engine can evaluate a rule condition against.
pub trait Resource {
    /// The resource's type tag.
    fn kind(&self) -> ResourceKind;
    /// The resource's own id.
    fn resource_id(&self) -> i64;
    /// The owning user's id (a user owns itself).
    fn owner_id(&self) -> i64;
}

/// Instance condition attached to a rule.
///
/// Serialized for the client-side rules endpoint in the same shape the
/// frontend's ability cache expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum RuleConditions {
    /// Matches resources authored by this user.
    Author {
        #[serde(rename = "authorId")]
        author_id: i64,
    },
    /// Matches the resource whose own id is this value.
    Id { id: i64 },
}

impl RuleConditions {
    fn matches(&self, resource: &dyn Resource) -> bool {
        match self {
            RuleConditions::Author { author_id } => resource.owner_id() == *author_id,
            RuleConditions::Id { id } => resource.resource_id() == *id,
        }
    }
}

/// One granted capability: an action on a subject, optionally restricted
/// to matching instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Rule {
    pub action: Action,
    pub subject: ResourceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<RuleConditions>,
}

impl Rule {
    const fn grant(action: Action, subject: ResourceKind) -> Self {
        Self {
            action,
            subject,
            conditions: None,
        }
    }

    const fn grant_if(action: Action, subject: ResourceKind, conditions: RuleConditions) -> Self {
        Self {
            action,
            subject,
            conditions: Some(conditions),
        }
    }

    /// Whether this rule grants `action` on the given kind/instance.
    ///
    /// A condition-bearing rule never matches a bare kind: without an
    /// instance there is nothing to test the condition against.
    fn allows(&self, action: Action, kind: ResourceKind, instance: Option<&dyn Resource>) -> bool {
        let action_ok = self.action == Action::Manage || self.action == action;
        let subject_ok = self.subject == ResourceKind::All || self.subject == kind;
        let condition_ok = match self.conditions {
            None => true,
            Some(cond) => instance.is_some_and(|r| cond.matches(r)),
        };
        action_ok && subject_ok && condition_ok
    }
}

/// Derive the rule set for an actor from their role.
///
/// Admins get the single `manage all` rule, which short-circuits every
/// check. Regular users read everything, create feedback, and update or
/// delete only feedback they authored and their own user record.
pub fn rules_for(actor: &AuthenticatedUser) -> Vec<Rule> {
    match actor.role {
        Role::Admin => vec![Rule::grant(Action::Manage, ResourceKind::All)],
        Role::User => vec![
            Rule::grant(Action::Read, ResourceKind::All),
            Rule::grant(Action::Create, ResourceKind::Feedback),
            Rule::grant(Action::Read, ResourceKind::Feedback),
            Rule::grant_if(
                Action::Update,
                ResourceKind::Feedback,
                RuleConditions::Author {
                    author_id: actor.id,
                },
            ),
            Rule::grant_if(
                Action::Delete,
                ResourceKind::Feedback,
                RuleConditions::Author {
                    author_id: actor.id,
                },
            ),
            Rule::grant_if(
                Action::Update,
                ResourceKind::User,
                RuleConditions::Id { id: actor.id },
            ),
            Rule::grant_if(
                Action::Delete,
                ResourceKind::User,
                RuleConditions::Id { id: actor.id },
            ),
        ],
    }
}

/// Authorize an action against a resource instance.
///
/// # Errors
/// [`AuthError::PermissionDenied`] carrying the attempted action and the
/// resolved subject kind when no rule matches.
pub fn authorize(
    actor: &AuthenticatedUser,
    action: Action,
    resource: &dyn Resource,
) -> Result<(), AuthError> {
    evaluate(actor, action, resource.kind(), Some(resource))
}

/// Authorize an action against a resource kind with no instance yet
/// (e.g. creating new feedback).
pub fn authorize_kind(
    actor: &AuthenticatedUser,
    action: Action,
    kind: ResourceKind,
) -> Result<(), AuthError> {
    evaluate(actor, action, kind, None)
}

fn evaluate(
    actor: &AuthenticatedUser,
    action: Action,
    kind: ResourceKind,
    instance: Option<&dyn Resource>,
) -> Result<(), AuthError> {
    if rules_for(actor)
        .iter()
        .any(|rule| rule.allows(action, kind, instance))
    {
        Ok(())
    } else {
        Err(AuthError::PermissionDenied {
            action,
            subject: kind,
        })
    }
}
