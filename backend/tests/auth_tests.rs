//! Authentication and authorization tests
//!
//! Property-based and unit tests for:
//! - Role permission hierarchy
//! - Account and catalogue input validation

use proptest::prelude::*;
use shared::models::{permission_key, role_permissions, Action, Resource, UserRole};
use shared::validation::{
    normalize_sku, validate_email, validate_password, validate_sku, PASSWORD_MIN_LEN,
};

// ============================================================================
// Property Test Strategies
// ============================================================================

fn role_strategy() -> impl Strategy<Value = UserRole> {
    prop_oneof![
        Just(UserRole::User),
        Just(UserRole::Manager),
        Just(UserRole::Admin),
    ]
}

/// Generate valid email addresses
fn email_strategy() -> impl Strategy<Value = String> {
    "[a-z]{3,10}@[a-z]{3,8}\\.(com|org|net|io)"
}

/// Generate valid passwords (8+ chars)
fn password_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9!@#$%]{8,20}"
}

fn sku_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9][A-Za-z0-9._-]{0,31}"
}

fn rank(role: UserRole) -> u8 {
    match role {
        UserRole::User => 0,
        UserRole::Manager => 1,
        UserRole::Admin => 2,
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Higher roles hold every permission of lower roles
    #[test]
    fn prop_permissions_are_monotonic(a in role_strategy(), b in role_strategy()) {
        let (low, high) = if rank(a) <= rank(b) { (a, b) } else { (b, a) };
        let high_perms = high.permissions();
        for p in low.permissions() {
            prop_assert!(high_perms.contains(&p), "{} missing {}", high, p);
        }
    }

    /// Every role can read everything
    #[test]
    fn prop_every_role_can_view(role in role_strategy()) {
        let perms = role.permissions();
        for resource in [
            Resource::Product,
            Resource::Warehouse,
            Resource::Stock,
            Resource::Receipt,
            Resource::Delivery,
            Resource::Transfer,
            Resource::Ledger,
            Resource::Dashboard,
        ] {
            let key = permission_key(&resource, &Action::View);
            prop_assert!(perms.contains(&key));
        }
    }

    #[test]
    fn prop_valid_emails_accepted(email in email_strategy()) {
        prop_assert!(validate_email(&email).is_ok());
    }

    #[test]
    fn prop_valid_passwords_accepted(password in password_strategy()) {
        prop_assert!(validate_password(&password).is_ok());
    }

    #[test]
    fn prop_short_passwords_rejected(password in "[a-z]{0,7}") {
        prop_assert!(password.len() < PASSWORD_MIN_LEN);
        prop_assert!(validate_password(&password).is_err());
    }

    /// Normalized SKUs stay valid and normalizing twice changes nothing
    #[test]
    fn prop_sku_normalization_idempotent(sku in sku_strategy()) {
        prop_assert!(validate_sku(&sku).is_ok());
        let normalized = normalize_sku(&sku);
        prop_assert!(validate_sku(&normalized).is_ok());
        prop_assert_eq!(normalize_sku(&normalized), normalized.clone());
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!(UserRole::parse("admin"), Some(UserRole::Admin));
        assert_eq!(UserRole::parse("MANAGER"), Some(UserRole::Manager));
        assert_eq!(UserRole::parse("owner"), None);
        assert_eq!(UserRole::default(), UserRole::User);
    }

    #[test]
    fn test_user_documents_but_not_catalogue() {
        let perms = UserRole::User.permissions();
        assert!(perms.contains(&"receipt:validate".to_string()));
        assert!(perms.contains(&"delivery:create".to_string()));
        assert!(perms.contains(&"transfer:create".to_string()));
        assert!(!perms.contains(&"product:create".to_string()));
        assert!(!perms.contains(&"warehouse:edit".to_string()));
        assert!(!perms.contains(&"stock:edit".to_string()));
    }

    #[test]
    fn test_only_admin_purges() {
        let purge = permission_key(&Resource::Product, &Action::Purge);
        assert!(!UserRole::User.permissions().contains(&purge));
        assert!(!UserRole::Manager.permissions().contains(&purge));
        assert!(UserRole::Admin.permissions().contains(&purge));
    }

    #[test]
    fn test_permission_groups_non_empty() {
        for role in [UserRole::User, UserRole::Manager, UserRole::Admin] {
            assert!(role_permissions(role).iter().all(|p| !p.actions.is_empty()));
        }
    }

    #[test]
    fn test_role_serializes_screaming_case() {
        assert_eq!(
            serde_json::to_string(&UserRole::Manager).unwrap(),
            "\"MANAGER\""
        );
    }
}
