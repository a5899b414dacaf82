//! Permission Definitions
//!
//! Reads are open to any authenticated user; writes are grouped by module.

/// Register and edit customers, adjust and redeem points
pub const CUSTOMERS_MANAGE: &str = "customers:manage";
/// Reward catalog and reward stock
pub const REWARDS_MANAGE: &str = "rewards:manage";
/// Presentations and their stock
pub const INVENTORY_MANAGE: &str = "inventory:manage";
/// Customer categories (discount tiers)
pub const SETTINGS_MANAGE: &str = "settings:manage";

/// Configurable permissions
pub const ALL_PERMISSIONS: &[&str] = &[
    CUSTOMERS_MANAGE,
    REWARDS_MANAGE,
    INVENTORY_MANAGE,
    SETTINGS_MANAGE,
];

pub const DEFAULT_ADMIN_PERMISSIONS: &[&str] = &["all"];

pub const DEFAULT_MANAGER_PERMISSIONS: &[&str] = ALL_PERMISSIONS;

/// Cashiers register customers and redeem points at the counter
pub const DEFAULT_CASHIER_PERMISSIONS: &[&str] = &[CUSTOMERS_MANAGE];

/// Get permissions for a role name
pub fn get_default_permissions(role_name: &str) -> Vec<String> {
    let permissions = match role_name {
        "admin" => DEFAULT_ADMIN_PERMISSIONS,
        "manager" => DEFAULT_MANAGER_PERMISSIONS,
        "cashier" => DEFAULT_CASHIER_PERMISSIONS,
        _ => &[],
    };
    permissions.iter().map(|s| s.to_string()).collect()
}
