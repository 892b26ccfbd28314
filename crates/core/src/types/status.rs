//! Enums shared between the storefront engine and its persisted data.

use serde::{Deserialize, Serialize};

/// Payment method chosen at checkout.
///
/// Wire names match the values stored in the order log (`"card-visa"`,
/// `"cod"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "card-visa")]
    CardVisa,
    #[serde(rename = "card-mastercard")]
    CardMastercard,
    #[serde(rename = "card-mir")]
    CardMir,
    #[serde(rename = "paypal")]
    Paypal,
    #[serde(rename = "qiwi")]
    Qiwi,
    /// Cash on delivery: the only method that needs no payment details.
    #[serde(rename = "cod")]
    CashOnDelivery,
}

impl PaymentMethod {
    /// Whether the checkout form must collect payment details for this method.
    #[must_use]
    pub const fn requires_details(self) -> bool {
        !matches!(self, Self::CashOnDelivery)
    }

    /// Placeholder shown in the payment-details input.
    #[must_use]
    pub const fn details_hint(self) -> &'static str {
        match self {
            Self::CardVisa | Self::CardMastercard | Self::CardMir => "Card number",
            Self::Paypal => "PAYPAL account",
            Self::Qiwi => "QIWI account",
            Self::CashOnDelivery => "Not required",
        }
    }

    /// Wire name of the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CardVisa => "card-visa",
            Self::CardMastercard => "card-mastercard",
            Self::CardMir => "card-mir",
            Self::Paypal => "paypal",
            Self::Qiwi => "qiwi",
            Self::CashOnDelivery => "cod",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card-visa" => Ok(Self::CardVisa),
            "card-mastercard" => Ok(Self::CardMastercard),
            "card-mir" => Ok(Self::CardMir),
            "paypal" => Ok(Self::Paypal),
            "qiwi" => Ok(Self::Qiwi),
            "cod" => Ok(Self::CashOnDelivery),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

/// Publication status of a listing on the catalog API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    #[default]
    Active,
    Inactive,
    Sold,
}

/// Author of a support chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatAuthor {
    /// The shopper.
    User,
    /// The (simulated) support agent.
    #[serde(alias = "bot")]
    Support,
}
