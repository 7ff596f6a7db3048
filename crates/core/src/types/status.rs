//! Status and role enums.
//!
//! These are persisted as `TEXT` columns, so each one round-trips through
//! `Display` / `FromStr` using the same snake/upper-case spelling as its
//! serde representation.

use serde::{Deserialize, Serialize};

/// Error returned when a stored or submitted enum value is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! text_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// The stored text form of this value.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(UnknownVariant { kind: $kind, value: s.to_owned() }),
                }
            }
        }
    };
}

/// Fulfillment state of an order. New orders start as `Processing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

text_enum!(OrderStatus, "order status", {
    Processing => "processing",
    Shipped => "shipped",
    Delivered => "delivered",
    Cancelled => "cancelled",
});

impl OrderStatus {
    /// Delivered and cancelled orders are final.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether an admin may move an order from `self` to `next`. Setting
    /// the current status again is always allowed.
    #[must_use]
    pub fn can_become(self, next: Self) -> bool {
        self == next || !self.is_final()
    }
}

/// How the shopper pays. Payment is simulated, no gateway is contacted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    /// Cash on delivery.
    Cod,
    Card,
    Upi,
}

text_enum!(PaymentMethod, "payment method", {
    Cod => "COD",
    Card => "CARD",
    Upi => "UPI",
});

impl PaymentMethod {
    /// Simulated payment outcome: cash on delivery stays pending until the
    /// parcel is paid for, everything else is captured immediately.
    #[must_use]
    pub const fn initial_status(self) -> PaymentStatus {
        match self {
            Self::Cod => PaymentStatus::Pending,
            Self::Card | Self::Upi => PaymentStatus::Completed,
        }
    }
}

/// Payment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
}

text_enum!(PaymentStatus, "payment status", {
    Pending => "pending",
    Completed => "completed",
});

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Customer,
    /// May read any order and use the back office.
    Admin,
}

text_enum!(UserRole, "user role", {
    Customer => "customer",
    Admin => "admin",
});

/// Triage state of a contact form message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContactStatus {
    #[default]
    New,
    Read,
    Replied,
}

text_enum!(ContactStatus, "contact status", {
    New => "new",
    Read => "read",
    Replied => "replied",
});

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_text_round_trip_matches_serde() {
        for method in [PaymentMethod::Cod, PaymentMethod::Card, PaymentMethod::Upi] {
            let json = serde_json::to_string(&method).unwrap();
            assert_eq!(json, format!("\"{method}\""));
            assert_eq!(method.as_str().parse::<PaymentMethod>().unwrap(), method);
        }
        assert_eq!("shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
    }

    #[test]
    fn test_unknown_variant() {
        let err = "wire".parse::<PaymentMethod>().unwrap_err();
        assert_eq!(err.to_string(), "invalid payment method: wire");
    }

    #[test]
    fn test_simulated_payment_status() {
        assert_eq!(PaymentMethod::Cod.initial_status(), PaymentStatus::Pending);
        assert_eq!(PaymentMethod::Card.initial_status(), PaymentStatus::Completed);
    }

    #[test]
    fn test_final_order_states() {
        assert!(OrderStatus::Processing.can_become(OrderStatus::Shipped));
        assert!(OrderStatus::Shipped.can_become(OrderStatus::Delivered));
        assert!(OrderStatus::Shipped.can_become(OrderStatus::Cancelled));
        assert!(OrderStatus::Delivered.can_become(OrderStatus::Delivered));
        assert!(!OrderStatus::Delivered.can_become(OrderStatus::Processing));
        assert!(!OrderStatus::Cancelled.can_become(OrderStatus::Shipped));
    }

    #[test]
    fn test_contact_status_text() {
        assert_eq!("replied".parse::<ContactStatus>().unwrap(), ContactStatus::Replied);
        assert_eq!(ContactStatus::default().as_str(), "new");
        assert!("archived".parse::<ContactStatus>().is_err());
    }
}
