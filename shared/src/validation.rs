//! Validation utilities for the Depot inventory platform

use std::borrow::Cow;

use uuid::Uuid;
use validator::ValidationError;

use crate::models::DocumentItemInput;

// ============================================================================
// Catalogue Validations
// ============================================================================

pub const SKU_MAX_LEN: usize = 32;

/// Validate SKU format (1-32 chars of letters, digits, '-', '_' or '.')
pub fn validate_sku(sku: &str) -> Result<(), &'static str> {
    let sku = sku.trim();
    if sku.is_empty() {
        return Err("SKU is required");
    }
    if sku.len() > SKU_MAX_LEN {
        return Err("SKU must be at most 32 characters");
    }
    if !sku
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err("SKU may only contain letters, digits, '-', '_' and '.'");
    }
    Ok(())
}

/// `validator` adapter for [`validate_sku`]
pub fn validate_sku_format(sku: &str) -> Result<(), ValidationError> {
    validate_sku(sku).map_err(|msg| {
        let mut err = ValidationError::new("sku");
        err.message = Some(Cow::Borrowed(msg));
        err
    })
}

/// SKUs are stored trimmed and upper-cased so uniqueness is case-insensitive
pub fn normalize_sku(sku: &str) -> String {
    sku.trim().to_ascii_uppercase()
}

// ============================================================================
// Stock Movement Validations
// ============================================================================

/// Validate that a transfer moves stock between two different warehouses
pub fn validate_transfer_route(from: Uuid, to: Uuid) -> Result<(), &'static str> {
    if from == to {
        return Err("Source and destination warehouses must differ");
    }
    Ok(())
}

/// Validate the item list of a receipt or delivery
pub fn validate_document_items(items: &[DocumentItemInput]) -> Result<(), &'static str> {
    if items.is_empty() {
        return Err("At least one item is required");
    }
    if items.iter().any(|i| i.quantity < 1) {
        return Err("Item quantity must be at least 1");
    }
    if items
        .iter()
        .filter_map(|i| i.unit_price)
        .any(|p| p.is_sign_negative())
    {
        return Err("Unit price must not be negative");
    }
    Ok(())
}

// ============================================================================
// Account Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err("Invalid email format");
    };
    if local.is_empty() || !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.')
    {
        return Err("Invalid email format");
    }
    Ok(())
}

pub const PASSWORD_MIN_LEN: usize = 8;

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}
