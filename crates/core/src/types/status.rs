//! Role and status enums for marketplace entities.

use serde::{Deserialize, Serialize};

/// Account role stored on the user profile document.
///
/// Role-derived flags must never be read without an authenticated user;
/// consumers default them to `Customer`-equivalent behaviour when the
/// profile is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Browses, carts, and places orders.
    #[default]
    Customer,
    /// Lists products and fulfils orders.
    Vendor,
    /// Manages vendor verification and the homepage slideshow.
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Vendor => write!(f, "vendor"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "vendor" => Ok(Self::Vendor),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// Vendor verification status, set by an admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VendorStatus {
    /// Registered but awaiting admin review.
    #[default]
    Pending,
    /// Verified and allowed to sell.
    Verified,
}

/// Order lifecycle status.
///
/// Orders are relayed to vendors over WhatsApp; this status mirrors the
/// order document the vendor updates as the order progresses. The variants
/// form the tracking strip shown to the customer, in order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed by the customer, not yet acknowledged.
    #[default]
    Pending,
    /// Being prepared by the vendor.
    Processing,
    /// On its way to the customer.
    Shipped,
    /// Handed to the customer.
    Delivered,
}

impl OrderStatus {
    /// Zero-based position on the Placed / Processing / Shipped /
    /// Delivered tracking strip.
    #[must_use]
    pub const fn progress(&self) -> usize {
        match self {
            Self::Pending => 0,
            Self::Processing => 1,
            Self::Shipped => 2,
            Self::Delivered => 3,
        }
    }

    /// Customer-facing label for the tracking strip.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Order Placed",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
            Self::Shipped => write!(f, "shipped"),
            Self::Delivered => write!(f, "delivered"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_str() {
        assert_eq!("vendor".parse::<Role>(), Ok(Role::Vendor));
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_snake_case() {
        let json = serde_json::to_string(&Role::Vendor).expect("serialize");
        assert_eq!(json, "\"vendor\"");
    }

    #[test]
    fn test_order_status_default() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_order_status_serde_snake_case() {
        let json = serde_json::to_string(&OrderStatus::Processing).expect("serialize");
        assert_eq!(json, "\"processing\"");
        let parsed: OrderStatus = serde_json::from_str("\"shipped\"").expect("deserialize");
        assert_eq!(parsed, OrderStatus::Shipped);
    }

    #[test]
    fn test_order_status_progress_is_monotonic() {
        let strip = [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ];
        for pair in strip.windows(2) {
            assert!(pair[0].progress() < pair[1].progress());
        }
        assert_eq!(OrderStatus::Delivered.progress(), 3);
        assert_eq!(OrderStatus::Pending.label(), "Order Placed");
    }
}
