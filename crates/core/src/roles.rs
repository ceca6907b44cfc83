//! Role resolution and authorization rules.
//!
//! An account may hold any number of role assignments, each optionally
//! scoped to a tenant (school). The "primary role", the one that decides
//! the default landing page, is the highest-priority role the account
//! holds. Authorization checks combine role membership with tenant scope:
//! `global-admin` and `admin` act across tenants, everything else only
//! within the tenant its assignment names.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AuthError;

/// Fixed role set, ordered by priority (highest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    GlobalAdmin,
    Admin,
    TenantAdmin,
    TenantStaff,
    Teacher,
    Student,
}

/// Priority order used by [`resolve_primary_role`].
pub const ROLE_PRIORITY: [Role; 6] = [
    Role::GlobalAdmin,
    Role::Admin,
    Role::TenantAdmin,
    Role::TenantStaff,
    Role::Teacher,
    Role::Student,
];

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::GlobalAdmin => "global-admin",
            Role::Admin => "admin",
            Role::TenantAdmin => "tenant-admin",
            Role::TenantStaff => "tenant-staff",
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "global-admin" => Some(Role::GlobalAdmin),
            "admin" => Some(Role::Admin),
            "tenant-admin" => Some(Role::TenantAdmin),
            "tenant-staff" => Some(Role::TenantStaff),
            "teacher" => Some(Role::Teacher),
            "student" => Some(Role::Student),
            _ => None,
        }
    }

    /// Roles whose authority is not bound to a tenant.
    pub fn is_global(&self) -> bool {
        matches!(self, Role::GlobalAdmin | Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A role held by an account, optionally scoped to a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub role: Role,
    pub tenant_id: Option<Uuid>,
}

/// The role an account acts under by default, with its tenant scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryRole {
    pub role: Role,
    pub tenant_id: Option<Uuid>,
}

/// Picks the highest-priority role from `assignments`.
///
/// The tenant scope comes from the matched assignment, falling back to the
/// account's home tenant when the assignment is unscoped. An account with
/// no assignments at all resolves to `student` at its home tenant; legacy
/// rows rely on this fallback.
pub fn resolve_primary_role(
    assignments: &[RoleAssignment],
    home_tenant: Option<Uuid>,
) -> PrimaryRole {
    for role in ROLE_PRIORITY {
        if let Some(assignment) = assignments.iter().find(|a| a.role == role) {
            return PrimaryRole {
                role,
                tenant_id: assignment.tenant_id.or(home_tenant),
            };
        }
    }

    PrimaryRole {
        role: Role::Student,
        tenant_id: home_tenant,
    }
}

/// Returns true if any assignment grants one of `required` for `tenant`.
///
/// A `None` tenant means the check is unscoped: role membership alone is
/// enough. With a tenant given, globally-scoped roles pass regardless of
/// the assignment's own scope; everything else must match the tenant.
pub fn authorize(
    assignments: &[RoleAssignment],
    required: &[Role],
    tenant: Option<Uuid>,
) -> bool {
    assignments.iter().any(|assignment| {
        if !required.contains(&assignment.role) {
            return false;
        }
        match tenant {
            None => true,
            Some(tenant_id) => {
                assignment.role.is_global() || assignment.tenant_id == Some(tenant_id)
            }
        }
    })
}

/// Roles allowed to perform administrative account operations
/// (admin-initiated resets, deletions, listings).
pub const ADMIN_ROLES: [Role; 3] = [Role::GlobalAdmin, Role::Admin, Role::TenantAdmin];

/// Checks the hard rules around account deletion.
///
/// Self-deletion is never allowed through this path, and an account that
/// holds `global-admin` may only be deleted by another global admin.
pub fn check_deletion_allowed(
    caller_id: Uuid,
    caller_assignments: &[RoleAssignment],
    target_id: Uuid,
    target_assignments: &[RoleAssignment],
) -> Result<(), AuthError> {
    if caller_id == target_id {
        return Err(AuthError::Authorization(
            "You cannot delete your own account".to_string(),
        ));
    }

    let target_is_global_admin = target_assignments
        .iter()
        .any(|a| a.role == Role::GlobalAdmin);
    let caller_is_global_admin = caller_assignments
        .iter()
        .any(|a| a.role == Role::GlobalAdmin);

    if target_is_global_admin && !caller_is_global_admin {
        return Err(AuthError::Authorization(
            "Only a global administrator can delete this account".to_string(),
        ));
    }

    Ok(())
}
