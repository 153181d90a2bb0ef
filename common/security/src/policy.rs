use common_auth::{Claims, Role};
use tracing::warn;

use crate::SecurityError;

/// One entry per protected operation. The mapping below is a total match,
/// so an operation without a deliberate policy entry cannot exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    UserCreate,
    UserUpdate,
    UserDelete,
    UserList,
}

// Simple mapping: which roles are allowed each capability.
fn allowed_roles(cap: Capability) -> &'static [Role] {
    use Capability::*;
    use Role::*;
    match cap {
        UserCreate => &[Admin],
        UserUpdate => &[Admin],
        UserDelete => &[Admin],
        UserList => &[Admin, Manager, Editor],
    }
}

/// Pure allow/deny decision against verified claims. Callers must only
/// reach this after token verification succeeded.
pub fn ensure_capability(claims: &Claims, cap: Capability) -> Result<(), SecurityError> {
    let allowed = allowed_roles(cap);
    if allowed.iter().any(|role| *role == claims.role) {
        return Ok(());
    }
    warn!(subject = %claims.subject, role = %claims.role, ?cap, "role_check_failed");
    Err(SecurityError::Forbidden)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use common_auth::UserId;

    fn mk_claims(role: Role) -> Claims {
        let now = Utc::now();
        Claims {
            subject: UserId::generate(),
            email: "someone@example.com".to_string(),
            role,
            expires_at: now + Duration::seconds(60),
            issued_at: Some(now),
        }
    }

    #[test]
    fn admin_has_every_capability() {
        let claims = mk_claims(Role::Admin);
        for cap in [
            Capability::UserCreate,
            Capability::UserUpdate,
            Capability::UserDelete,
            Capability::UserList,
        ] {
            assert!(
                ensure_capability(&claims, cap).is_ok(),
                "Admin missing {cap:?}"
            );
        }
    }

    #[test]
    fn editor_can_list_but_not_mutate() {
        let claims = mk_claims(Role::Editor);
        assert!(ensure_capability(&claims, Capability::UserList).is_ok());
        assert!(ensure_capability(&claims, Capability::UserCreate).is_err());
        assert!(ensure_capability(&claims, Capability::UserUpdate).is_err());
        assert!(ensure_capability(&claims, Capability::UserDelete).is_err());
    }

    #[test]
    fn manager_can_list_but_not_mutate() {
        let claims = mk_claims(Role::Manager);
        assert!(ensure_capability(&claims, Capability::UserList).is_ok());
        assert!(ensure_capability(&claims, Capability::UserDelete).is_err());
    }
}
