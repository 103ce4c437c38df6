//! # Domain Types
//!
//! Wire types exchanged with the storefront backend.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Pharmacy     │   │    Medicine     │   │      Cart       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  pharmacy_id    │   │  pharmacy_id    │       │
//! │  │  minimum_order  │   │  price, mrp     │◄──│  items[]        │       │
//! │  │  location       │   │  stock_quantity │   │  total_amount   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Address      │   │     Order       │   │  OrderStatus    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  is_default     │   │  items (frozen) │   │  Placed ...     │       │
//! │  │  pincode        │   │  payment_method │   │  Delivered      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Server Ownership
//! Carts and orders are owned by the server. The client holds point-in-time
//! copies that are replaced wholesale on every reload, never patched.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Pharmacy
// =============================================================================

/// A pharmacy that sells medicines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Pharmacy {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub image: String,
    #[serde(default = "default_true")]
    pub is_open: bool,
    #[serde(default)]
    pub delivery_time: String,
    /// Smallest cart subtotal the pharmacy accepts an order for.
    #[serde(default)]
    #[ts(type = "number")]
    pub minimum_order: Money,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Distance (km) from the searched location; only set on nearby searches.
    #[serde(default)]
    pub distance: Option<f64>,
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Medicine
// =============================================================================

/// A medicine listed by a pharmacy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Medicine {
    pub id: String,
    pub pharmacy_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,

    /// Current selling price.
    #[ts(type = "number")]
    pub price: Money,

    /// Maximum retail price, the pre-discount reference.
    #[ts(type = "number")]
    pub mrp: Money,

    /// Display value supplied by the server; never recomputed here.
    #[serde(default)]
    pub discount_percentage: f64,

    /// Upper bound for the quantity a cart line may hold.
    #[ts(type = "number")]
    pub stock_quantity: i64,

    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub prescription_required: bool,
}

impl Medicine {
    /// Creates a medicine with the fields pricing and quantity logic read.
    pub fn new(
        id: impl Into<String>,
        pharmacy_id: impl Into<String>,
        name: impl Into<String>,
        price: Money,
        mrp: Money,
        stock_quantity: i64,
    ) -> Self {
        Medicine {
            id: id.into(),
            pharmacy_id: pharmacy_id.into(),
            name: name.into(),
            description: String::new(),
            price,
            mrp,
            discount_percentage: 0.0,
            stock_quantity,
            category: String::new(),
            image: String::new(),
            prescription_required: false,
        }
    }

    /// Whether the MRP is shown struck through next to the selling price.
    #[inline]
    pub fn is_marked_down(&self) -> bool {
        self.mrp > self.price
    }

    /// Checks if `quantity` units can be held in a cart.
    pub fn can_hold(&self, quantity: i64) -> bool {
        quantity <= self.stock_quantity
    }
}

// =============================================================================
// Cart
// =============================================================================

/// One medicine's entry within a cart.
///
/// ## Price Capture
/// `price` is frozen by the server when the item is added. It may diverge
/// from the medicine's live price later on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartItem {
    pub medicine_id: String,
    #[ts(type = "number")]
    pub quantity: i64,
    /// Unit price captured at add-time.
    #[ts(type = "number")]
    pub price: Money,
}

impl CartItem {
    /// Captured unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }
}

/// The user's server-held cart, scoped to one pharmacy.
///
/// ## Invariants (server-enforced)
/// - Items are unique by `medicine_id`
/// - All items belong to `pharmacy_id`
/// - `total_amount` is the server-computed subtotal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub pharmacy_id: String,
    /// Items in server insertion order.
    #[serde(default)]
    pub items: Vec<CartItem>,
    /// Server-authoritative subtotal.
    #[serde(default)]
    #[ts(type = "number")]
    pub total_amount: Money,
}

impl Cart {
    /// Total quantity across all lines.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Quantity held for `medicine_id`, or 0 if it has no line.
    pub fn quantity_of(&self, medicine_id: &str) -> i64 {
        self.items
            .iter()
            .find(|i| i.medicine_id == medicine_id)
            .map(|i| i.quantity)
            .unwrap_or(0)
    }

    /// Returns the line for `medicine_id`, if any.
    pub fn item(&self, medicine_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.medicine_id == medicine_id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether this cart's items may be shown against `pharmacy_id`.
    ///
    /// A cart without a pharmacy is treated as matching anything.
    pub fn is_for_pharmacy(&self, pharmacy_id: &str) -> bool {
        self.pharmacy_id.is_empty() || pharmacy_id.is_empty() || self.pharmacy_id == pharmacy_id
    }
}

/// Total quantity in a possibly-absent cart (0 when absent).
pub fn cart_item_count(cart: Option<&Cart>) -> i64 {
    cart.map(Cart::item_count).unwrap_or(0)
}

/// Quantity of `medicine_id` in a possibly-absent cart (0 when absent).
pub fn cart_quantity_of(cart: Option<&Cart>, medicine_id: &str) -> i64 {
    cart.map(|c| c.quantity_of(medicine_id)).unwrap_or(0)
}

/// A cart can be checked out only if it exists and has at least one line.
pub fn is_checkoutable(cart: Option<&Cart>) -> bool {
    cart.map(|c| !c.is_empty()).unwrap_or(false)
}

// =============================================================================
// Address
// =============================================================================

/// A saved delivery address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    pub label: String,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub phone: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Address {
    /// Single-line form submitted as an order's delivery address.
    ///
    /// ## Example
    /// `"12 MG Road, Flat 4, Bengaluru, Karnataka - 560001"`
    pub fn one_line(&self) -> String {
        let mut line = self.address_line1.clone();
        if let Some(extra) = self.address_line2.as_deref().filter(|s| !s.trim().is_empty()) {
            line.push_str(", ");
            line.push_str(extra);
        }
        format!("{}, {}, {} - {}", line, self.city, self.state, self.pincode)
    }
}

/// Request body for creating an address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAddress {
    pub label: String,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub phone: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

// =============================================================================
// Profile & Auth
// =============================================================================

/// The signed-in user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
}

/// Body returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    pub user: Profile,
}

// =============================================================================
// Reviews
// =============================================================================

/// A customer review of a medicine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub medicine_id: String,
    pub user_id: String,
    pub rating: f64,
    #[serde(default)]
    pub comment: String,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub user_name: Option<String>,
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer pays for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash on delivery. The server clears the cart when the order is placed.
    #[default]
    Cod,
    /// Paid through the online gateway; the cart is cleared after payment.
    Online,
}

impl PaymentMethod {
    /// Query-string value sent to the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cod => "cod",
            PaymentMethod::Online => "online",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cod" | "cash" => Ok(PaymentMethod::Cod),
            "online" | "upi" | "card" => Ok(PaymentMethod::Online),
            other => Err(format!(
                "Unknown payment method: '{}'. Valid options: cod, online",
                other
            )),
        }
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle status of an order.
///
/// Unknown strings from the server are preserved in `Other` so a new
/// backend status never breaks order listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Placed,
    Confirmed,
    Preparing,
    OutForDelivery,
    Delivered,
    Cancelled,
    Other(String),
}

impl OrderStatus {
    /// Human-readable label.
    pub fn label(&self) -> &str {
        match self {
            OrderStatus::Placed => "Placed",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::OutForDelivery => "Out for Delivery",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Other(raw) => raw,
        }
    }

    /// Whether the order can still change status.
    pub fn is_active(&self) -> bool {
        !matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl From<String> for OrderStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "placed" => OrderStatus::Placed,
            "confirmed" => OrderStatus::Confirmed,
            "preparing" => OrderStatus::Preparing,
            "out_for_delivery" => OrderStatus::OutForDelivery,
            "delivered" => OrderStatus::Delivered,
            "cancelled" => OrderStatus::Cancelled,
            _ => OrderStatus::Other(raw),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Placed => "placed".into(),
            OrderStatus::Confirmed => "confirmed".into(),
            OrderStatus::Preparing => "preparing".into(),
            OrderStatus::OutForDelivery => "out_for_delivery".into(),
            OrderStatus::Delivered => "delivered".into(),
            OrderStatus::Cancelled => "cancelled".into(),
            OrderStatus::Other(raw) => raw,
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// A placed order. Items are the cart lines frozen at order time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub pharmacy_id: String,
    pub items: Vec<CartItem>,
    pub total_amount: Money,
    pub delivery_address: String,
    pub phone: String,
    pub status: OrderStatus,
    pub payment_method: String,
    #[serde(default)]
    pub payment_status: String,
    pub created_at: NaiveDateTime,
}

/// Parameters for placing an order from the current cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub delivery_address: String,
    pub phone: String,
    pub payment_method: PaymentMethod,
}

// =============================================================================
// Account Forms
// =============================================================================

/// Request body for creating an account. The server answers with an
/// [`AuthToken`], so a new user is signed in straight away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub phone: String,
    pub password: String,
}

/// Editable profile fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub email: String,
    pub phone: String,
}

// =============================================================================
// Appointments (Lab Tests & Consultations)
// =============================================================================

/// Lifecycle of a lab test or doctor consultation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
    Other(String),
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Other(raw) => raw,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            AppointmentStatus::Scheduled => "Scheduled",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Cancelled => "Cancelled",
            AppointmentStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for AppointmentStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "scheduled" => AppointmentStatus::Scheduled,
            "completed" => AppointmentStatus::Completed,
            "cancelled" => AppointmentStatus::Cancelled,
            _ => AppointmentStatus::Other(raw),
        }
    }
}

impl From<AppointmentStatus> for String {
    fn from(status: AppointmentStatus) -> Self {
        match status {
            AppointmentStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A booked diagnostic test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabTest {
    pub id: String,
    pub user_id: String,
    pub test_name: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    pub lab_name: String,
    pub test_type: String,
    #[serde(default)]
    pub status: AppointmentStatus,
    pub scheduled_date: NaiveDateTime,
    #[serde(default)]
    pub results_url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Parameters for booking a lab test.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLabTest {
    pub test_name: String,
    pub description: String,
    pub price: Money,
    pub lab_name: String,
    pub test_type: String,
    pub scheduled_date: NaiveDateTime,
    pub notes: Option<String>,
}

/// A booked doctor consultation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consultation {
    pub id: String,
    pub user_id: String,
    pub doctor_name: String,
    pub specialization: String,
    pub consultation_type: String,
    pub price: Money,
    #[serde(default)]
    pub status: AppointmentStatus,
    pub scheduled_date: NaiveDateTime,
    #[serde(default = "default_duration")]
    pub duration_minutes: i64,
    #[serde(default)]
    pub symptoms: Option<String>,
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub prescription_url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

fn default_duration() -> i64 {
    DEFAULT_CONSULTATION_MINUTES
}

/// Consultation length when none is given.
pub const DEFAULT_CONSULTATION_MINUTES: i64 = 30;

/// Parameters for booking a consultation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewConsultation {
    pub doctor_name: String,
    pub specialization: String,
    pub consultation_type: String,
    pub price: Money,
    pub scheduled_date: NaiveDateTime,
    pub duration_minutes: Option<i64>,
    pub symptoms: Option<String>,
    pub notes: Option<String>,
}

impl NewConsultation {
    pub fn duration(&self) -> i64 {
        self.duration_minutes.unwrap_or(DEFAULT_CONSULTATION_MINUTES)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
