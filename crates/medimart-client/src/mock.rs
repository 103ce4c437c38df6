//! In-memory storefront backend for tests.
//!
//! Mirrors the server's cart rules: stock checks on add, one pharmacy per
//! cart, quantity 0 on update removes the line, negative updates are
//! rejected, and an emptied cart reads back as `None`.

use async_trait::async_trait;
use chrono::NaiveDate;
use medimart_core::validation::validate_rating;
use medimart_core::{
    Address, AppointmentStatus, AuthToken, Cart, CartItem, Consultation,
    LabTest, Medicine, Money, NewAddress, NewConsultation, NewLabTest, Order, OrderRequest,
    OrderStatus, PaymentMethod, Pharmacy, Profile, ProfileUpdate, Registration, Review,
};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::api::{GeoQuery, StorefrontApi};
use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone, Copy)]
enum Failure {
    Always,
    OnCall(usize),
}

#[derive(Debug, Default)]
struct MockState {
    medicines: Vec<Medicine>,
    pharmacies: Vec<Pharmacy>,
    addresses: Vec<Address>,
    reviews: HashMap<String, Vec<Review>>,
    profile: Option<Profile>,
    cart: Option<Cart>,
    orders: Vec<Order>,
    lab_tests: Vec<LabTest>,
    consultations: Vec<Consultation>,
    calls: HashMap<&'static str, usize>,
    failures: HashMap<&'static str, Failure>,
    last_update: Option<(String, i64)>,
}

#[derive(Debug, Default)]
pub struct MockApi {
    state: Mutex<MockState>,
}

fn http(status: u16, detail: &str) -> ClientError {
    ClientError::Http {
        status,
        detail: detail.to_string(),
    }
}

fn recompute(cart: &mut Cart) {
    cart.total_amount = cart.items.iter().map(CartItem::line_total).sum();
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("Mock mutex poisoned")
    }

    /// Counts the call and applies any injected failure.
    fn enter(&self, op: &'static str) -> ClientResult<MutexGuard<'_, MockState>> {
        let mut state = self.lock();
        let n = {
            let count = state.calls.entry(op).or_insert(0);
            *count += 1;
            *count
        };
        match state.failures.get(op).copied() {
            Some(Failure::Always) => Err(http(500, &format!("injected failure: {}", op))),
            Some(Failure::OnCall(k)) if k == n => {
                Err(http(500, &format!("injected failure: {} call {}", op, n)))
            }
            _ => Ok(state),
        }
    }

    // =========================================================================
    // Seeding
    // =========================================================================

    pub fn add_medicine(&self, id: &str, pharmacy_id: &str, price: Money, mrp: Money, stock: i64) {
        self.lock()
            .medicines
            .push(Medicine::new(id, pharmacy_id, id, price, mrp, stock));
    }

    pub fn add_pharmacy(&self, id: &str, minimum_order: Money) {
        self.lock().pharmacies.push(Pharmacy {
            id: id.to_string(),
            name: format!("Pharmacy {}", id),
            description: String::new(),
            address: "MG Road".to_string(),
            phone: "9876543210".to_string(),
            rating: 4.5,
            image: String::new(),
            is_open: true,
            delivery_time: "30 mins".to_string(),
            minimum_order,
            latitude: None,
            longitude: None,
            distance: None,
        });
    }

    pub fn add_address(&self, id: &str, is_default: bool) {
        self.lock().addresses.push(Address {
            id: id.to_string(),
            user_id: "u1".to_string(),
            label: format!("Address {}", id),
            address_line1: format!("{} Park Street", id),
            address_line2: None,
            city: "Kolkata".to_string(),
            state: "West Bengal".to_string(),
            pincode: "700016".to_string(),
            phone: "9876543210".to_string(),
            is_default,
            latitude: None,
            longitude: None,
        });
    }

    pub fn seed_review(&self, medicine_id: &str, rating: f64) {
        let mut state = self.lock();
        let reviews = state.reviews.entry(medicine_id.to_string()).or_default();
        let id = format!("r{}", reviews.len() + 1);
        reviews.push(Review {
            id,
            medicine_id: medicine_id.to_string(),
            user_id: "u2".to_string(),
            rating,
            comment: "Works well".to_string(),
            created_at: created_at(),
            user_name: Some("Asha".to_string()),
        });
    }

    pub fn set_profile(&self, phone: &str) {
        self.lock().profile = Some(Profile {
            id: "u1".to_string(),
            username: "asha".to_string(),
            email: "asha@example.com".to_string(),
            full_name: "Asha Rao".to_string(),
            phone: phone.to_string(),
        });
    }

    pub fn set_stock(&self, medicine_id: &str, stock: i64) {
        if let Some(m) = self.lock().medicines.iter_mut().find(|m| m.id == medicine_id) {
            m.stock_quantity = stock;
        }
    }

    // =========================================================================
    // Failure Injection & Inspection
    // =========================================================================

    /// Every call to `op` fails with HTTP 500.
    pub fn fail_on(&self, op: &'static str) {
        self.lock().failures.insert(op, Failure::Always);
    }

    /// Only the `n`th call (1-based, counting from the start) to `op` fails.
    pub fn fail_on_call(&self, op: &'static str, n: usize) {
        self.lock().failures.insert(op, Failure::OnCall(n));
    }

    pub fn recover(&self, op: &'static str) {
        self.lock().failures.remove(op);
    }

    pub fn calls(&self, op: &str) -> usize {
        self.lock().calls.get(op).copied().unwrap_or(0)
    }

    pub fn last_update(&self) -> Option<(String, i64)> {
        self.lock().last_update.clone()
    }

    pub fn cart(&self) -> Option<Cart> {
        self.lock().cart.clone()
    }

    pub fn orders(&self) -> Vec<Order> {
        self.lock().orders.clone()
    }

    pub fn addresses(&self) -> Vec<Address> {
        self.lock().addresses.clone()
    }

    pub fn profile(&self) -> Option<Profile> {
        self.lock().profile.clone()
    }
}

/// Status values the appointment endpoints accept.
fn check_appointment_status(status: &AppointmentStatus) -> ClientResult<()> {
    match status {
        AppointmentStatus::Other(_) => Err(http(400, "Invalid status")),
        _ => Ok(()),
    }
}

fn created_at() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .and_then(|d| d.and_hms_opt(10, 30, 0))
        .expect("valid fixed timestamp")
}

#[async_trait]
impl StorefrontApi for MockApi {
    async fn login(&self, username: &str, password: &str) -> ClientResult<AuthToken> {
        let state = self.enter("login")?;
        if password != "secret" {
            return Err(http(401, "Incorrect username or password"));
        }
        let user = state.profile.clone().unwrap_or(Profile {
            id: "u1".to_string(),
            username: username.to_string(),
            email: String::new(),
            full_name: String::new(),
            phone: String::new(),
        });
        Ok(AuthToken {
            access_token: format!("token-{}", username),
            token_type: "bearer".to_string(),
            user,
        })
    }

    async fn register(&self, registration: &Registration) -> ClientResult<AuthToken> {
        let mut state = self.enter("register")?;
        if state
            .profile
            .as_ref()
            .is_some_and(|p| p.username == registration.username)
        {
            return Err(http(400, "Username already registered"));
        }
        let user = Profile {
            id: "u1".to_string(),
            username: registration.username.clone(),
            email: registration.email.clone(),
            full_name: registration.full_name.clone(),
            phone: registration.phone.clone(),
        };
        state.profile = Some(user.clone());
        Ok(AuthToken {
            access_token: format!("token-{}", registration.username),
            token_type: "bearer".to_string(),
            user,
        })
    }

    async fn get_cart(&self) -> ClientResult<Option<Cart>> {
        let state = self.enter("get_cart")?;
        Ok(state.cart.clone().filter(|c| !c.items.is_empty()))
    }

    async fn add_to_cart(&self, medicine_id: &str, quantity: i64) -> ClientResult<()> {
        let mut state = self.enter("add_to_cart")?;
        let medicine = state
            .medicines
            .iter()
            .find(|m| m.id == medicine_id)
            .cloned()
            .ok_or_else(|| http(404, "Medicine not found"))?;
        if medicine.stock_quantity < quantity {
            return Err(http(400, "Insufficient stock"));
        }

        let cart = state.cart.get_or_insert_with(|| Cart {
            id: "c1".to_string(),
            user_id: "u1".to_string(),
            pharmacy_id: medicine.pharmacy_id.clone(),
            items: Vec::new(),
            total_amount: Money::zero(),
        });
        if cart.items.is_empty() {
            cart.pharmacy_id = medicine.pharmacy_id.clone();
        } else if cart.pharmacy_id != medicine.pharmacy_id {
            return Err(http(400, "Can only order from one pharmacy at a time"));
        }

        match cart.items.iter_mut().find(|i| i.medicine_id == medicine_id) {
            Some(item) => item.quantity += quantity,
            None => cart.items.push(CartItem {
                medicine_id: medicine_id.to_string(),
                quantity,
                price: medicine.price,
            }),
        }
        recompute(cart);
        Ok(())
    }

    async fn update_cart_item(&self, medicine_id: &str, quantity: i64) -> ClientResult<()> {
        let mut state = self.enter("update_cart_item")?;
        state.last_update = Some((medicine_id.to_string(), quantity));

        if quantity < 0 {
            return Err(http(400, "Quantity cannot be negative"));
        }
        let stock = state
            .medicines
            .iter()
            .find(|m| m.id == medicine_id)
            .map(|m| m.stock_quantity)
            .ok_or_else(|| http(404, "Medicine not found"))?;
        if stock < quantity {
            return Err(http(400, "Insufficient stock"));
        }

        let cart = state.cart.as_mut().ok_or_else(|| http(404, "Cart not found"))?;
        if quantity == 0 {
            cart.items.retain(|i| i.medicine_id != medicine_id);
        } else {
            let item = cart
                .items
                .iter_mut()
                .find(|i| i.medicine_id == medicine_id)
                .ok_or_else(|| http(404, "Item not found in cart"))?;
            item.quantity = quantity;
        }
        recompute(cart);
        if cart.items.is_empty() {
            state.cart = None;
        }
        Ok(())
    }

    async fn remove_from_cart(&self, medicine_id: &str) -> ClientResult<()> {
        let mut state = self.enter("remove_from_cart")?;
        let cart = state.cart.as_mut().ok_or_else(|| http(404, "Cart not found"))?;
        cart.items.retain(|i| i.medicine_id != medicine_id);
        recompute(cart);
        if cart.items.is_empty() {
            state.cart = None;
        }
        Ok(())
    }

    async fn clear_cart(&self) -> ClientResult<()> {
        let mut state = self.enter("clear_cart")?;
        state.cart = None;
        Ok(())
    }

    async fn get_medicine(&self, medicine_id: &str) -> ClientResult<Medicine> {
        let state = self.enter("get_medicine")?;
        state
            .medicines
            .iter()
            .find(|m| m.id == medicine_id)
            .cloned()
            .ok_or_else(|| http(404, "Medicine not found"))
    }

    async fn get_reviews(&self, medicine_id: &str) -> ClientResult<Vec<Review>> {
        let state = self.enter("get_reviews")?;
        Ok(state.reviews.get(medicine_id).cloned().unwrap_or_default())
    }

    async fn add_review(&self, medicine_id: &str, rating: f64, comment: &str) -> ClientResult<Review> {
        let mut state = self.enter("add_review")?;
        if !state.medicines.iter().any(|m| m.id == medicine_id) {
            return Err(http(404, "Medicine not found"));
        }
        validate_rating(rating).map_err(|e| http(400, &e.to_string()))?;
        let reviews = state.reviews.entry(medicine_id.to_string()).or_default();
        if reviews.iter().any(|r| r.user_id == "u1") {
            return Err(http(400, "You have already reviewed this medicine"));
        }
        let review = Review {
            id: format!("r{}", reviews.len() + 1),
            medicine_id: medicine_id.to_string(),
            user_id: "u1".to_string(),
            rating,
            comment: comment.to_string(),
            created_at: created_at(),
            user_name: None,
        };
        reviews.push(review.clone());
        Ok(review)
    }

    async fn get_alternatives(&self, medicine_id: &str) -> ClientResult<Vec<Medicine>> {
        let state = self.enter("get_alternatives")?;
        let medicine = state
            .medicines
            .iter()
            .find(|m| m.id == medicine_id)
            .ok_or_else(|| http(404, "Medicine not found"))?;
        Ok(state
            .medicines
            .iter()
            .filter(|m| m.category == medicine.category && m.id != medicine_id)
            .take(10)
            .cloned()
            .collect())
    }

    async fn list_pharmacies(&self, _near: Option<GeoQuery>) -> ClientResult<Vec<Pharmacy>> {
        let state = self.enter("list_pharmacies")?;
        Ok(state.pharmacies.clone())
    }

    async fn get_pharmacy(&self, pharmacy_id: &str) -> ClientResult<Pharmacy> {
        let state = self.enter("get_pharmacy")?;
        state
            .pharmacies
            .iter()
            .find(|p| p.id == pharmacy_id)
            .cloned()
            .ok_or_else(|| http(404, "Pharmacy not found"))
    }

    async fn list_pharmacy_medicines(&self, pharmacy_id: &str) -> ClientResult<Vec<Medicine>> {
        let state = self.enter("list_pharmacy_medicines")?;
        Ok(state
            .medicines
            .iter()
            .filter(|m| m.pharmacy_id == pharmacy_id)
            .cloned()
            .collect())
    }

    async fn list_addresses(&self) -> ClientResult<Vec<Address>> {
        let state = self.enter("list_addresses")?;
        Ok(state.addresses.clone())
    }

    async fn create_address(&self, address: &NewAddress) -> ClientResult<Address> {
        let mut state = self.enter("create_address")?;
        if address.is_default {
            for a in state.addresses.iter_mut() {
                a.is_default = false;
            }
        }
        let created = Address {
            id: format!("a{}", state.addresses.len() + 1),
            user_id: "u1".to_string(),
            label: address.label.clone(),
            address_line1: address.address_line1.clone(),
            address_line2: address.address_line2.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            pincode: address.pincode.clone(),
            phone: address.phone.clone(),
            is_default: address.is_default,
            latitude: address.latitude,
            longitude: address.longitude,
        };
        state.addresses.push(created.clone());
        Ok(created)
    }

    async fn update_address(&self, address_id: &str, address: &NewAddress) -> ClientResult<()> {
        let mut state = self.enter("update_address")?;
        if !state.addresses.iter().any(|a| a.id == address_id) {
            return Err(http(404, "Address not found"));
        }
        for a in state.addresses.iter_mut() {
            if a.id == address_id {
                a.label = address.label.clone();
                a.address_line1 = address.address_line1.clone();
                a.address_line2 = address.address_line2.clone();
                a.city = address.city.clone();
                a.state = address.state.clone();
                a.pincode = address.pincode.clone();
                a.phone = address.phone.clone();
                a.is_default = address.is_default;
                a.latitude = address.latitude;
                a.longitude = address.longitude;
            } else if address.is_default {
                a.is_default = false;
            }
        }
        Ok(())
    }

    async fn delete_address(&self, address_id: &str) -> ClientResult<()> {
        let mut state = self.enter("delete_address")?;
        let before = state.addresses.len();
        state.addresses.retain(|a| a.id != address_id);
        if state.addresses.len() == before {
            return Err(http(404, "Address not found"));
        }
        Ok(())
    }

    async fn get_profile(&self) -> ClientResult<Profile> {
        let state = self.enter("get_profile")?;
        state.profile.clone().ok_or_else(|| http(404, "User not found"))
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<()> {
        let mut state = self.enter("update_profile")?;
        let profile = state
            .profile
            .as_mut()
            .ok_or_else(|| http(404, "User not found"))?;
        profile.full_name = update.full_name.clone();
        profile.email = update.email.clone();
        profile.phone = update.phone.clone();
        Ok(())
    }

    async fn create_order(&self, request: &OrderRequest) -> ClientResult<Order> {
        let mut state = self.enter("create_order")?;
        let cart = state
            .cart
            .clone()
            .filter(|c| !c.items.is_empty())
            .ok_or_else(|| http(404, "Cart is empty"))?;
        let minimum = state
            .pharmacies
            .iter()
            .find(|p| p.id == cart.pharmacy_id)
            .map(|p| p.minimum_order)
            .unwrap_or_else(Money::zero);
        if cart.total_amount < minimum {
            return Err(http(400, &format!("Minimum order amount is ₹{}", minimum.rupees())));
        }

        let order = Order {
            id: format!("o{}", state.orders.len() + 1),
            user_id: cart.user_id.clone(),
            pharmacy_id: cart.pharmacy_id.clone(),
            items: cart.items.clone(),
            total_amount: cart.total_amount,
            delivery_address: request.delivery_address.clone(),
            phone: request.phone.clone(),
            status: OrderStatus::Placed,
            payment_method: request.payment_method.as_str().to_string(),
            payment_status: match request.payment_method {
                PaymentMethod::Cod => "completed".to_string(),
                PaymentMethod::Online => "pending".to_string(),
            },
            created_at: created_at(),
        };
        state.orders.push(order.clone());
        if request.payment_method == PaymentMethod::Cod {
            state.cart = None;
        }
        Ok(order)
    }

    async fn list_orders(&self) -> ClientResult<Vec<Order>> {
        let state = self.enter("list_orders")?;
        Ok(state.orders.iter().rev().cloned().collect())
    }

    async fn get_order(&self, order_id: &str) -> ClientResult<Order> {
        let state = self.enter("get_order")?;
        state
            .orders
            .iter()
            .find(|o| o.id == order_id)
            .cloned()
            .ok_or_else(|| http(404, "Order not found"))
    }

    async fn update_order_status(&self, order_id: &str, status: &OrderStatus) -> ClientResult<()> {
        let mut state = self.enter("update_order_status")?;
        if matches!(status, OrderStatus::Other(_)) {
            return Err(http(400, "Invalid status"));
        }
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| http(404, "Order not found"))?;
        order.status = status.clone();
        Ok(())
    }

    async fn list_lab_tests(&self) -> ClientResult<Vec<LabTest>> {
        let state = self.enter("list_lab_tests")?;
        Ok(state.lab_tests.iter().rev().cloned().collect())
    }

    async fn get_lab_test(&self, test_id: &str) -> ClientResult<LabTest> {
        let state = self.enter("get_lab_test")?;
        state
            .lab_tests
            .iter()
            .find(|t| t.id == test_id)
            .cloned()
            .ok_or_else(|| http(404, "Lab test not found"))
    }

    async fn create_lab_test(&self, test: &NewLabTest) -> ClientResult<LabTest> {
        let mut state = self.enter("create_lab_test")?;
        let created = LabTest {
            id: format!("l{}", state.lab_tests.len() + 1),
            user_id: "u1".to_string(),
            test_name: test.test_name.clone(),
            description: test.description.clone(),
            price: test.price,
            lab_name: test.lab_name.clone(),
            test_type: test.test_type.clone(),
            status: AppointmentStatus::Scheduled,
            scheduled_date: test.scheduled_date,
            results_url: None,
            notes: test.notes.clone(),
            created_at: created_at(),
        };
        state.lab_tests.push(created.clone());
        Ok(created)
    }

    async fn update_lab_test_status(
        &self,
        test_id: &str,
        status: &AppointmentStatus,
        results_url: Option<&str>,
    ) -> ClientResult<()> {
        let mut state = self.enter("update_lab_test_status")?;
        check_appointment_status(status)?;
        let test = state
            .lab_tests
            .iter_mut()
            .find(|t| t.id == test_id)
            .ok_or_else(|| http(404, "Lab test not found"))?;
        test.status = status.clone();
        if let Some(url) = results_url {
            test.results_url = Some(url.to_string());
        }
        Ok(())
    }

    async fn delete_lab_test(&self, test_id: &str) -> ClientResult<()> {
        let mut state = self.enter("delete_lab_test")?;
        let before = state.lab_tests.len();
        state.lab_tests.retain(|t| t.id != test_id);
        if state.lab_tests.len() == before {
            return Err(http(404, "Lab test not found"));
        }
        Ok(())
    }

    async fn list_consultations(&self) -> ClientResult<Vec<Consultation>> {
        let state = self.enter("list_consultations")?;
        Ok(state.consultations.iter().rev().cloned().collect())
    }

    async fn get_consultation(&self, consultation_id: &str) -> ClientResult<Consultation> {
        let state = self.enter("get_consultation")?;
        state
            .consultations
            .iter()
            .find(|c| c.id == consultation_id)
            .cloned()
            .ok_or_else(|| http(404, "Consultation not found"))
    }

    async fn create_consultation(&self, consultation: &NewConsultation) -> ClientResult<Consultation> {
        let mut state = self.enter("create_consultation")?;
        let created = Consultation {
            id: format!("d{}", state.consultations.len() + 1),
            user_id: "u1".to_string(),
            doctor_name: consultation.doctor_name.clone(),
            specialization: consultation.specialization.clone(),
            consultation_type: consultation.consultation_type.clone(),
            price: consultation.price,
            status: AppointmentStatus::Scheduled,
            scheduled_date: consultation.scheduled_date,
            duration_minutes: consultation.duration(),
            symptoms: consultation.symptoms.clone(),
            diagnosis: None,
            prescription_url: None,
            notes: consultation.notes.clone(),
            created_at: created_at(),
        };
        state.consultations.push(created.clone());
        Ok(created)
    }

    async fn update_consultation_status(
        &self,
        consultation_id: &str,
        status: &AppointmentStatus,
        diagnosis: Option<&str>,
        prescription_url: Option<&str>,
    ) -> ClientResult<()> {
        let mut state = self.enter("update_consultation_status")?;
        check_appointment_status(status)?;
        let consultation = state
            .consultations
            .iter_mut()
            .find(|c| c.id == consultation_id)
            .ok_or_else(|| http(404, "Consultation not found"))?;
        consultation.status = status.clone();
        if let Some(diagnosis) = diagnosis {
            consultation.diagnosis = Some(diagnosis.to_string());
        }
        if let Some(url) = prescription_url {
            consultation.prescription_url = Some(url.to_string());
        }
        Ok(())
    }

    async fn delete_consultation(&self, consultation_id: &str) -> ClientResult<()> {
        let mut state = self.enter("delete_consultation")?;
        let before = state.consultations.len();
        state.consultations.retain(|c| c.id != consultation_id);
        if state.consultations.len() == before {
            return Err(http(404, "Consultation not found"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduled() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|d| d.and_hms_opt(8, 0, 0))
            .unwrap()
    }

    #[tokio::test]
    async fn test_review_rules() {
        let api = MockApi::new();
        api.add_medicine("m1", "p1", Money::from_rupees(10), Money::from_rupees(12), 5);

        let err = api.add_review("m1", 6.0, "too good").await.unwrap_err();
        assert!(matches!(err, ClientError::Http { status: 400, .. }));

        let review = api.add_review("m1", 4.0, "Works").await.unwrap();
        assert_eq!(review.rating, 4.0);
        assert_eq!(api.get_reviews("m1").await.unwrap(), vec![review]);

        let err = api.add_review("m1", 5.0, "again").await.unwrap_err();
        assert_eq!(err.detail(), Some("You have already reviewed this medicine"));
        assert!(matches!(
            api.add_review("missing", 4.0, "").await,
            Err(ClientError::Http { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_address_and_profile_updates() {
        let api = MockApi::new();
        api.add_address("a1", true);
        api.add_address("a2", false);
        api.set_profile("9876543210");

        let edit = NewAddress {
            label: "Office".into(),
            address_line1: "1 Camac Street".into(),
            address_line2: None,
            city: "Kolkata".into(),
            state: "West Bengal".into(),
            pincode: "700017".into(),
            phone: "9876543210".into(),
            is_default: true,
            latitude: None,
            longitude: None,
        };
        api.update_address("a2", &edit).await.unwrap();
        let addresses = api.addresses();
        assert!(!addresses[0].is_default);
        assert_eq!(addresses[1].label, "Office");
        assert!(addresses[1].is_default);
        assert!(api.update_address("a9", &edit).await.is_err());

        api.update_profile(&ProfileUpdate {
            full_name: "Asha R".into(),
            email: "asha.r@example.com".into(),
            phone: "9123456780".into(),
        })
        .await
        .unwrap();
        assert_eq!(api.profile().unwrap().phone, "9123456780");
    }

    #[tokio::test]
    async fn test_appointment_lifecycle() {
        let api = MockApi::new();
        let test = api
            .create_lab_test(&NewLabTest {
                test_name: "CBC".into(),
                description: "Complete blood count".into(),
                price: Money::from_rupees(499),
                lab_name: "City Labs".into(),
                test_type: "blood".into(),
                scheduled_date: scheduled(),
                notes: None,
            })
            .await
            .unwrap();
        assert_eq!(test.status, AppointmentStatus::Scheduled);

        let err = api
            .update_lab_test_status(&test.id, &AppointmentStatus::from("done".to_string()), None)
            .await
            .unwrap_err();
        assert_eq!(err.detail(), Some("Invalid status"));

        api.update_lab_test_status(&test.id, &AppointmentStatus::Completed, Some("https://labs/r1.pdf"))
            .await
            .unwrap();
        let done = api.get_lab_test(&test.id).await.unwrap();
        assert_eq!(done.status, AppointmentStatus::Completed);
        assert_eq!(done.results_url.as_deref(), Some("https://labs/r1.pdf"));

        let consultation = api
            .create_consultation(&NewConsultation {
                doctor_name: "Dr. Sen".into(),
                specialization: "General".into(),
                consultation_type: "video".into(),
                price: Money::from_rupees(300),
                scheduled_date: scheduled(),
                duration_minutes: None,
                symptoms: Some("fever".into()),
                notes: None,
            })
            .await
            .unwrap();
        assert_eq!(consultation.duration_minutes, 30);
        api.update_consultation_status(&consultation.id, &AppointmentStatus::Cancelled, None, None)
            .await
            .unwrap();
        assert_eq!(
            api.list_consultations().await.unwrap()[0].status,
            AppointmentStatus::Cancelled
        );

        api.delete_lab_test(&test.id).await.unwrap();
        api.delete_consultation(&consultation.id).await.unwrap();
        assert!(api.list_lab_tests().await.unwrap().is_empty());
        assert!(matches!(
            api.get_consultation(&consultation.id).await,
            Err(ClientError::Http { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_order_status_updates() {
        let api = MockApi::new();
        api.add_pharmacy("p1", Money::zero());
        api.add_medicine("m1", "p1", Money::from_rupees(100), Money::from_rupees(120), 5);
        api.add_to_cart("m1", 1).await.unwrap();
        let order = api
            .create_order(&OrderRequest {
                delivery_address: "Park Street".into(),
                phone: "9876543210".into(),
                payment_method: PaymentMethod::Cod,
            })
            .await
            .unwrap();

        api.update_order_status(&order.id, &OrderStatus::OutForDelivery).await.unwrap();
        assert_eq!(api.get_order(&order.id).await.unwrap().status, OrderStatus::OutForDelivery);
        let err = api
            .update_order_status(&order.id, &OrderStatus::from("lost".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Http { status: 400, .. }));
    }
}
