use crate::core::rates::RateTable;
use crate::domain::model::{Address, OrderDraft, PaymentMethod};
use crate::utils::validation::{
    is_blank, is_plausible_email, is_plausible_phone, is_valid_card_number, is_valid_cvc,
    is_valid_expiry, is_valid_zip,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const MAX_PROPERTY_SIZE: u32 = 10_000;
pub const MAX_INSTRUCTIONS_CHARS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepId {
    PersonalInfo,
    PropertyDetails,
    Services,
    Schedule,
    Preferences,
    Payment,
}

impl StepId {
    pub const ALL: [StepId; 6] = [
        StepId::PersonalInfo,
        StepId::PropertyDetails,
        StepId::Services,
        StepId::Schedule,
        StepId::Preferences,
        StepId::Payment,
    ];

    pub const FIRST: StepId = StepId::PersonalInfo;
    pub const LAST: StepId = StepId::Payment;

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<StepId> {
        Self::ALL.get(index).copied()
    }

    pub fn next(self) -> Option<StepId> {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(self) -> Option<StepId> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    pub fn title(self) -> &'static str {
        match self {
            StepId::PersonalInfo => "Personal Info",
            StepId::PropertyDetails => "Property Details",
            StepId::Services => "Services",
            StepId::Schedule => "Schedule",
            StepId::Preferences => "Preferences",
            StepId::Payment => "Payment",
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Field path (`email`, `address.zip`, ...) to message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn into_result(self) -> ValidationResult {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
        f.write_str(&parts.join("; "))
    }
}

pub type ValidationResult = std::result::Result<(), FieldErrors>;

/// Checks the fields owned by `step`. Pure predicate over the draft.
pub fn validate(step: StepId, draft: &OrderDraft, rates: &RateTable) -> ValidationResult {
    let mut errors = FieldErrors::new();
    match step {
        StepId::PersonalInfo => check_personal_info(draft, &mut errors),
        StepId::PropertyDetails => check_property(draft, &mut errors),
        StepId::Services => check_services(draft, rates, &mut errors),
        StepId::Schedule => check_schedule(draft, &mut errors),
        StepId::Preferences => check_preferences(draft, &mut errors),
        StepId::Payment => check_payment(draft, &mut errors),
    }
    errors.into_result()
}

/// Validates every step in order and reports the first one that fails.
pub fn validate_all(
    draft: &OrderDraft,
    rates: &RateTable,
) -> std::result::Result<(), (StepId, FieldErrors)> {
    for step in StepId::ALL {
        validate(step, draft, rates).map_err(|errors| (step, errors))?;
    }
    Ok(())
}

fn check_personal_info(draft: &OrderDraft, errors: &mut FieldErrors) {
    let contact = &draft.contact;
    if is_blank(&contact.name) {
        errors.add("name", "Name is required");
    }
    if is_blank(&contact.email) {
        errors.add("email", "Email is required");
    } else if !is_plausible_email(&contact.email) {
        errors.add("email", "Enter a valid email address");
    }
    if is_blank(&contact.phone) {
        errors.add("phone", "Phone number is required");
    } else if !is_plausible_phone(&contact.phone) {
        errors.add("phone", "Enter a valid phone number");
    }
}

fn check_address(prefix: &str, address: &Address, errors: &mut FieldErrors) {
    let required = [
        ("street", &address.street, "Street address is required"),
        ("city", &address.city, "City is required"),
        ("state", &address.state, "State is required"),
    ];
    for (field, value, message) in required {
        if is_blank(value) {
            errors.add(format!("{}.{}", prefix, field), message);
        }
    }

    let zip_field = format!("{}.zip", prefix);
    if is_blank(&address.zip) {
        errors.add(zip_field, "ZIP code is required");
    } else if !is_valid_zip(&address.zip) {
        errors.add(zip_field, "Enter a 5-digit ZIP code");
    }
}

fn check_property(draft: &OrderDraft, errors: &mut FieldErrors) {
    check_address("address", &draft.address, errors);
    if draft.property_size > MAX_PROPERTY_SIZE {
        errors.add(
            "propertySize",
            format!("Property size must be at most {} sq ft", MAX_PROPERTY_SIZE),
        );
    }
}

fn check_services(draft: &OrderDraft, rates: &RateTable, errors: &mut FieldErrors) {
    if draft.services.is_empty() {
        errors.add("services", "Select at least one service");
        return;
    }
    let unknown: Vec<&str> = draft
        .services
        .iter()
        .filter(|id| !rates.contains(id))
        .map(|id| id.as_str())
        .collect();
    if !unknown.is_empty() {
        errors.add("services", format!("Unknown service(s): {}", unknown.join(", ")));
    }
}

fn check_schedule(draft: &OrderDraft, errors: &mut FieldErrors) {
    if draft.time_slots.is_empty() {
        errors.add("timeSlots", "Pick at least one time slot");
        return;
    }
    if draft.time_slots.iter().any(|slot| is_blank(slot)) {
        errors.add("timeSlots", "Time slots cannot be blank");
    }
    let mut seen = std::collections::HashSet::new();
    if !draft.time_slots.iter().all(|slot| seen.insert(slot.trim())) {
        errors.add("timeSlots", "Time slots must be unique");
    }
}

fn check_preferences(draft: &OrderDraft, errors: &mut FieldErrors) {
    let preferences = &draft.preferences;
    if preferences.notifications.is_empty() {
        errors.add("notifications", "Choose how we should contact you");
    }
    if preferences.special_instructions.chars().count() > MAX_INSTRUCTIONS_CHARS {
        errors.add(
            "specialInstructions",
            format!("Keep instructions under {} characters", MAX_INSTRUCTIONS_CHARS),
        );
    }
}

fn check_payment(draft: &OrderDraft, errors: &mut FieldErrors) {
    let billing = &draft.billing;
    if billing.payment_method == PaymentMethod::CreditCard {
        let card = &billing.card;
        if is_blank(&card.holder_name) {
            errors.add("billing.cardHolder", "Name on card is required");
        }
        if !is_valid_card_number(&card.number) {
            errors.add("billing.cardNumber", "Enter a valid card number");
        }
        if !is_valid_expiry(&card.expiry) {
            errors.add("billing.expiry", "Use MM/YY");
        }
        if !is_valid_cvc(&card.cvc) {
            errors.add("billing.cvc", "Enter the 3 or 4 digit code");
        }
    }
    if !billing.same_as_service {
        check_address("billing.address", &billing.billing_address, errors);
    }
}
