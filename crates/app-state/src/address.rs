//! Address book
//!
//! The address book owns the delivery addresses and the checkout
//! selection. It maintains one invariant at all times: at most one address
//! carries `is_default = true`. A book can hold zero defaults, since
//! demoting the sole default is a legal update.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Address book errors
#[derive(Debug, Error)]
pub enum AddressError {
    /// No address with the given id exists
    #[error("Address not found: {0}")]
    NotFound(String),
}

/// Result type for address book operations
pub type Result<T> = std::result::Result<T, AddressError>;

/// Kind of location an address points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AddressKind {
    /// Home address
    #[default]
    Home,
    /// Office address
    Office,
    /// Hostel address
    Hostel,
}

/// A saved delivery address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Unique address id
    pub id: String,

    /// Kind of location
    #[serde(rename = "type", default)]
    pub kind: AddressKind,

    /// Recipient name
    pub name: String,

    /// Recipient phone number
    pub phone: String,

    /// First address line
    pub address_line1: String,

    /// Second address line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,

    /// Nearby landmark
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landmark: Option<String>,

    /// City
    pub city: String,

    /// Postal code
    pub pincode: String,

    /// Whether this is the default delivery address
    #[serde(default)]
    pub is_default: bool,
}

/// Fields for a new address
///
/// Field validation (required name, phone, line 1, city, pincode) happens
/// at the UI boundary; the book accepts any well-formed record.
#[derive(Debug, Clone, Default)]
pub struct NewAddress {
    /// Kind of location
    pub kind: AddressKind,
    /// Recipient name
    pub name: String,
    /// Recipient phone number
    pub phone: String,
    /// First address line
    pub address_line1: String,
    /// Second address line
    pub address_line2: Option<String>,
    /// Nearby landmark
    pub landmark: Option<String>,
    /// City
    pub city: String,
    /// Postal code
    pub pincode: String,
}

/// Partial update merged into an existing address
///
/// `None` fields are left untouched. Setting `is_default` to `Some(true)`
/// clears the flag on every other address first.
#[derive(Debug, Clone, Default)]
pub struct AddressPatch {
    /// New kind, if changing
    pub kind: Option<AddressKind>,
    /// New recipient name, if changing
    pub name: Option<String>,
    /// New phone number, if changing
    pub phone: Option<String>,
    /// New first line, if changing
    pub address_line1: Option<String>,
    /// New second line, if changing (`Some(None)` clears it)
    pub address_line2: Option<Option<String>>,
    /// New landmark, if changing (`Some(None)` clears it)
    pub landmark: Option<Option<String>>,
    /// New city, if changing
    pub city: Option<String>,
    /// New pincode, if changing
    pub pincode: Option<String>,
    /// New default flag, if changing
    pub is_default: Option<bool>,
}

impl AddressPatch {
    /// Patch that only changes the default flag
    pub fn default_flag(is_default: bool) -> Self {
        Self { is_default: Some(is_default), ..Default::default() }
    }
}

/// The address collection plus the checkout selection
///
/// The selection is session-local and never persisted; only the address
/// list itself is written to storage.
#[derive(Debug, Clone, Default)]
pub struct AddressBook {
    addresses: Vec<Address>,
    selected_id: Option<String>,
}

impl AddressBook {
    /// Create an empty book
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a book from a persisted address list
    pub fn from_addresses(addresses: Vec<Address>) -> Self {
        Self { addresses, selected_id: None }
    }

    /// All saved addresses
    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    /// Check if the book has no addresses
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// The address currently selected for checkout
    pub fn selected(&self) -> Option<&Address> {
        let id = self.selected_id.as_deref()?;
        self.addresses.iter().find(|a| a.id == id)
    }

    /// The default delivery address
    pub fn default_address(&self) -> Option<&Address> {
        self.addresses.iter().find(|a| a.is_default)
    }

    /// The address to deliver to: the selection, or the default absent one
    pub fn delivery_address(&self) -> Option<&Address> {
        self.selected().or_else(|| self.default_address())
    }

    /// Add a new address
    ///
    /// The first address in an empty book becomes the default.
    pub fn add(&mut self, id: String, fields: NewAddress) -> Address {
        let address = Address {
            id,
            kind: fields.kind,
            name: fields.name,
            phone: fields.phone,
            address_line1: fields.address_line1,
            address_line2: fields.address_line2,
            landmark: fields.landmark,
            city: fields.city,
            pincode: fields.pincode,
            is_default: self.addresses.is_empty(),
        };
        self.addresses.push(address.clone());
        address
    }

    /// Merge a patch into the address with the given id
    pub fn update(&mut self, id: &str, patch: AddressPatch) -> Result<()> {
        if !self.addresses.iter().any(|a| a.id == id) {
            return Err(AddressError::NotFound(id.to_string()));
        }

        // Promoting a new default demotes every other address first
        if patch.is_default == Some(true) {
            for address in &mut self.addresses {
                if address.id != id {
                    address.is_default = false;
                }
            }
        }

        let address = self
            .addresses
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| AddressError::NotFound(id.to_string()))?;

        if let Some(kind) = patch.kind {
            address.kind = kind;
        }
        if let Some(name) = patch.name {
            address.name = name;
        }
        if let Some(phone) = patch.phone {
            address.phone = phone;
        }
        if let Some(line1) = patch.address_line1 {
            address.address_line1 = line1;
        }
        if let Some(line2) = patch.address_line2 {
            address.address_line2 = line2;
        }
        if let Some(landmark) = patch.landmark {
            address.landmark = landmark;
        }
        if let Some(city) = patch.city {
            address.city = city;
        }
        if let Some(pincode) = patch.pincode {
            address.pincode = pincode;
        }
        if let Some(is_default) = patch.is_default {
            address.is_default = is_default;
        }

        Ok(())
    }

    /// Remove the address with the given id
    ///
    /// If the removed address was the default, the first remaining address
    /// becomes the default. If it was selected, the selection falls back to
    /// the default, else the first remaining address, else nothing.
    pub fn remove(&mut self, id: &str) -> Result<Address> {
        let index = self
            .addresses
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| AddressError::NotFound(id.to_string()))?;

        let removed = self.addresses.remove(index);

        if removed.is_default {
            if let Some(first) = self.addresses.first_mut() {
                first.is_default = true;
            }
        }

        if self.selected_id.as_deref() == Some(id) {
            self.selected_id = self
                .default_address()
                .or_else(|| self.addresses.first())
                .map(|a| a.id.clone());
        }

        Ok(removed)
    }

    /// Select the address to use for checkout
    ///
    /// Does not touch the default flag.
    pub fn select(&mut self, id: &str) -> Result<()> {
        if !self.addresses.iter().any(|a| a.id == id) {
            return Err(AddressError::NotFound(id.to_string()));
        }
        self.selected_id = Some(id.to_string());
        Ok(())
    }

    /// Number of addresses flagged as default
    pub fn default_count(&self) -> usize {
        self.addresses.iter().filter(|a| a.is_default).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(name: &str) -> NewAddress {
        NewAddress {
            kind: AddressKind::Home,
            name: name.to_string(),
            phone: "9876543210".to_string(),
            address_line1: "12 MG Road".to_string(),
            address_line2: None,
            landmark: Some("Near the park".to_string()),
            city: "Pune".to_string(),
            pincode: "411001".to_string(),
        }
    }

    #[test]
    fn test_first_address_becomes_default() {
        let mut book = AddressBook::new();

        let a = book.add("A".to_string(), fields("Asha"));
        let b = book.add("B".to_string(), fields("Bina"));

        assert!(a.is_default);
        assert!(!b.is_default);
        assert_eq!(book.default_count(), 1);
    }

    #[test]
    fn test_promoting_default_demotes_others() {
        let mut book = AddressBook::new();
        book.add("A".to_string(), fields("Asha"));
        book.add("B".to_string(), fields("Bina"));

        book.update("A", AddressPatch::default_flag(false)).unwrap();
        book.update("B", AddressPatch::default_flag(true)).unwrap();

        assert!(!book.addresses()[0].is_default);
        assert!(book.addresses()[1].is_default);
        assert_eq!(book.default_count(), 1);

        // Promoting without an explicit demote still leaves one default
        book.update("A", AddressPatch::default_flag(true)).unwrap();
        assert_eq!(book.default_count(), 1);
        assert!(book.addresses()[0].is_default);
    }

    #[test]
    fn test_demoting_sole_default_leaves_zero_defaults() {
        let mut book = AddressBook::new();
        book.add("A".to_string(), fields("Asha"));

        book.update("A", AddressPatch::default_flag(false)).unwrap();

        assert_eq!(book.default_count(), 0);
        assert!(!book.addresses()[0].is_default);
    }

    #[test]
    fn test_update_merges_only_given_fields() {
        let mut book = AddressBook::new();
        book.add("A".to_string(), fields("Asha"));

        let patch = AddressPatch {
            city: Some("Mumbai".to_string()),
            landmark: Some(None),
            ..Default::default()
        };
        book.update("A", patch).unwrap();

        let addr = &book.addresses()[0];
        assert_eq!(addr.city, "Mumbai");
        assert_eq!(addr.landmark, None);
        // Untouched fields survive
        assert_eq!(addr.name, "Asha");
        assert_eq!(addr.pincode, "411001");
        assert!(addr.is_default);
    }

    #[test]
    fn test_update_missing_id_is_reported() {
        let mut book = AddressBook::new();
        book.add("A".to_string(), fields("Asha"));

        let err = book.update("missing", AddressPatch::default()).unwrap_err();
        assert!(matches!(err, AddressError::NotFound(_)));
    }

    #[test]
    fn test_remove_default_promotes_first_remaining() {
        let mut book = AddressBook::new();
        book.add("A".to_string(), fields("Asha"));
        book.add("B".to_string(), fields("Bina"));
        book.add("C".to_string(), fields("Charu"));

        book.remove("A").unwrap();

        assert_eq!(book.addresses().len(), 2);
        assert!(book.addresses()[0].is_default);
        assert_eq!(book.default_count(), 1);
    }

    #[test]
    fn test_remove_selected_falls_back_to_default() {
        let mut book = AddressBook::new();
        book.add("A".to_string(), fields("Asha"));
        book.add("B".to_string(), fields("Bina"));
        book.select("B").unwrap();

        book.remove("B").unwrap();

        // A is the default, so the selection falls back to it
        assert_eq!(book.selected().map(|a| a.id.as_str()), Some("A"));
    }

    #[test]
    fn test_remove_last_address_clears_selection() {
        let mut book = AddressBook::new();
        book.add("A".to_string(), fields("Asha"));
        book.select("A").unwrap();

        book.remove("A").unwrap();

        assert!(book.is_empty());
        assert!(book.selected().is_none());
        assert!(book.default_address().is_none());
    }

    #[test]
    fn test_select_does_not_touch_default_flag() {
        let mut book = AddressBook::new();
        book.add("A".to_string(), fields("Asha"));
        book.add("B".to_string(), fields("Bina"));

        book.select("B").unwrap();

        assert_eq!(book.selected().map(|a| a.id.as_str()), Some("B"));
        assert!(book.addresses()[0].is_default);
        assert!(!book.addresses()[1].is_default);
    }

    #[test]
    fn test_delivery_address_prefers_selection() {
        let mut book = AddressBook::new();
        book.add("A".to_string(), fields("Asha"));
        book.add("B".to_string(), fields("Bina"));

        assert_eq!(book.delivery_address().map(|a| a.id.as_str()), Some("A"));

        book.select("B").unwrap();
        assert_eq!(book.delivery_address().map(|a| a.id.as_str()), Some("B"));
    }

    #[test]
    fn test_address_serialization_round_trip() {
        let mut book = AddressBook::new();
        let addr = book.add("A".to_string(), fields("Asha"));

        let json = serde_json::to_value(&addr).unwrap();
        assert_eq!(json["type"], "Home");
        assert_eq!(json["addressLine1"], "12 MG Road");
        assert_eq!(json["isDefault"], true);
        assert!(json.get("addressLine2").is_none());

        let parsed: Address = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, addr);
    }
}
