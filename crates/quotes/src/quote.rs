use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use servicebay_core::{
    AggregateRoot, CustomerId, DomainError, DomainResult, LineItemId, QuoteId, VehicleId,
};

/// Quote status lifecycle.
///
/// Any status may follow any other; transitions are not validated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    #[default]
    Draft,
    Sent,
    Accepted,
    Declined,
    Converted,
}

impl QuoteStatus {
    pub const ALL: [QuoteStatus; 5] = [
        QuoteStatus::Draft,
        QuoteStatus::Sent,
        QuoteStatus::Accepted,
        QuoteStatus::Declined,
        QuoteStatus::Converted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Sent => "sent",
            QuoteStatus::Accepted => "accepted",
            QuoteStatus::Declined => "declined",
            QuoteStatus::Converted => "converted",
        }
    }
}

impl core::fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for QuoteStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuoteStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown quote status '{s}'")))
    }
}

/// Line item owned by exactly one quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    /// Back-reference to the owning quote.
    pub quote_id: QuoteId,
    pub description: String,
    pub quantity: u32,
    /// Price in smallest currency unit (e.g., cents).
    pub unit_price: i64,
    pub labor_hours: f64,
    /// Position in the owning quote; rewritten by the store on every save.
    pub sort_order: u32,
}

impl LineItem {
    /// `quantity × unit_price`, or `None` on overflow.
    pub fn line_total(&self) -> Option<i64> {
        i64::from(self.quantity).checked_mul(self.unit_price)
    }
}

/// Aggregate root: Quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,
    pub customer_id: CustomerId,
    pub vehicle_id: VehicleId,
    pub status: QuoteStatus,
    /// Frozen at creation; smallest currency unit.
    pub total_amount: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub line_items: Vec<LineItem>,
}

impl Quote {
    /// A new, unsaved draft quote with no line items.
    pub fn draft(customer_id: CustomerId, vehicle_id: VehicleId) -> Self {
        Self {
            id: QuoteId::unassigned(),
            customer_id,
            vehicle_id,
            status: QuoteStatus::Draft,
            total_amount: 0,
            created_at: DateTime::<Utc>::default(),
            updated_at: DateTime::<Utc>::default(),
            line_items: Vec::new(),
        }
    }

    /// Exact Σ(quantity × unit_price) over the current line items.
    ///
    /// Reports overflow instead of wrapping. Not kept in sync with
    /// `total_amount`; the service freezes it once at creation.
    pub fn line_items_total(&self) -> DomainResult<i64> {
        self.line_items.iter().try_fold(0i64, |acc, item| {
            item.line_total()
                .and_then(|line| acc.checked_add(line))
                .ok_or_else(|| DomainError::invariant("quote total overflow"))
        })
    }
}

impl AggregateRoot for Quote {
    type Id = QuoteId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn is_new(&self) -> bool {
        self.id.is_unassigned()
    }
}

/// Input for creating a quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateInput {
    pub customer_id: CustomerId,
    pub vehicle_id: VehicleId,
    #[serde(default)]
    pub line_items: Vec<CreateLineItem>,
}

/// Line item as supplied when creating a quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateLineItem {
    pub description: String,
    pub quantity: u32,
    pub unit_price: i64,
    #[serde(default)]
    pub labor_hours: f64,
}
