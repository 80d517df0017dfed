//! User and role models

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user account (the password hash never leaves the backend)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub warehouse_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Role assigned to a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "VARCHAR", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Manager,
    #[default]
    User,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Manager => "MANAGER",
            UserRole::User => "USER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ADMIN" => Some(UserRole::Admin),
            "MANAGER" => Some(UserRole::Manager),
            "USER" => Some(UserRole::User),
            _ => None,
        }
    }

    /// Permission keys (`resource:action`) granted to this role
    pub fn permissions(&self) -> Vec<String> {
        role_permissions(*self)
            .into_iter()
            .flat_map(|p| {
                p.actions
                    .into_iter()
                    .map(move |a| permission_key(&p.resource, &a))
            })
            .collect()
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A permission granting access to a resource
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Permission {
    pub resource: Resource,
    pub actions: Vec<Action>,
}

/// Resources that can be accessed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Product,
    Warehouse,
    Stock,
    Receipt,
    Delivery,
    Transfer,
    Ledger,
    Dashboard,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Product => "product",
            Resource::Warehouse => "warehouse",
            Resource::Stock => "stock",
            Resource::Receipt => "receipt",
            Resource::Delivery => "delivery",
            Resource::Transfer => "transfer",
            Resource::Ledger => "ledger",
            Resource::Dashboard => "dashboard",
        }
    }
}

/// Actions that can be performed on resources
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
    Validate,
    Adjust,
    Purge,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
            Action::Validate => "validate",
            Action::Adjust => "adjust",
            Action::Purge => "purge",
        }
    }
}

pub fn permission_key(resource: &Resource, action: &Action) -> String {
    format!("{}:{}", resource.as_str(), action.as_str())
}

/// Permissions granted to each role. Higher roles include everything below.
pub fn role_permissions(role: UserRole) -> Vec<Permission> {
    use Action::*;
    use Resource::*;

    let mut permissions = vec![
        Permission { resource: Product, actions: vec![View] },
        Permission { resource: Warehouse, actions: vec![View] },
        Permission { resource: Stock, actions: vec![View] },
        Permission { resource: Receipt, actions: vec![View, Create, Validate, Delete] },
        Permission { resource: Delivery, actions: vec![View, Create, Validate, Delete] },
        Permission { resource: Transfer, actions: vec![View, Create, Validate, Delete] },
        Permission { resource: Ledger, actions: vec![View] },
        Permission { resource: Dashboard, actions: vec![View] },
    ];

    if matches!(role, UserRole::Manager | UserRole::Admin) {
        permissions.extend([
            Permission { resource: Product, actions: vec![Create, Edit, Delete] },
            Permission { resource: Warehouse, actions: vec![Create, Edit, Delete] },
            Permission { resource: Stock, actions: vec![Edit, Adjust] },
        ]);
    }

    if role == UserRole::Admin {
        permissions.push(Permission { resource: Product, actions: vec![Purge] });
    }

    permissions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_cannot_adjust_stock() {
        let perms = UserRole::User.permissions();
        assert!(perms.contains(&"stock:view".to_string()));
        assert!(perms.contains(&"transfer:validate".to_string()));
        assert!(!perms.contains(&"stock:adjust".to_string()));
    }

    #[test]
    fn test_manager_manages_catalogue_but_cannot_purge() {
        let perms = UserRole::Manager.permissions();
        assert!(perms.contains(&"product:create".to_string()));
        assert!(perms.contains(&"stock:adjust".to_string()));
        assert!(!perms.contains(&"product:purge".to_string()));
    }

    #[test]
    fn test_admin_has_every_manager_permission() {
        let admin = UserRole::Admin.permissions();
        for p in UserRole::Manager.permissions() {
            assert!(admin.contains(&p), "admin missing {}", p);
        }
        assert!(admin.contains(&"product:purge".to_string()));
    }
}
