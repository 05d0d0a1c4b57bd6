//! Farmer and buyer registration.
//!
//! Lightweight 1:1 profiles extending the identity store, specific to the
//! agricultural exchange. Phone and email are unique within each module;
//! farmers carry a soft-delete flag.

use crate::error::MarketError;
use crate::store::Market;
use agromart_auth::{require_verified_email, User};
use agromart_commerce::error::CommerceError;
use agromart_commerce::ids::{BuyerId, FarmerId, UserId};
use serde::{Deserialize, Serialize};

/// A registered farmer profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Farmer {
    /// Unique profile identifier.
    pub id: FarmerId,
    /// Owning user (one profile per user).
    pub user_id: UserId,
    /// First name.
    pub first_name: String,
    /// Surname.
    pub surname: String,
    /// Contact email (unique among farmers).
    pub email: String,
    /// Contact phone (unique among farmers).
    pub phone: String,
    /// Local government area.
    pub lga: Option<String>,
    /// Farm name.
    pub farm_name: Option<String>,
    /// Unix timestamp of registration.
    pub reg_date: i64,
    /// Soft-delete flag.
    pub is_active: bool,
}

/// A registered buyer profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Buyer {
    /// Unique profile identifier.
    pub id: BuyerId,
    /// Owning user (one profile per user).
    pub user_id: UserId,
    /// First name.
    pub first_name: String,
    /// Surname.
    pub surname: String,
    /// Contact phone (unique among buyers).
    pub phone: String,
    /// Contact email (unique among buyers).
    pub email: String,
    /// Local government area.
    pub lga: String,
    /// Delivery location description.
    pub location: String,
    /// Unix timestamp of registration.
    pub reg_date: i64,
}

/// Input for farmer registration.
#[derive(Debug, Clone)]
pub struct FarmerRegistration {
    pub first_name: String,
    pub surname: String,
    pub email: String,
    pub phone: String,
    pub lga: Option<String>,
    pub farm_name: Option<String>,
}

/// Input for buyer registration.
#[derive(Debug, Clone)]
pub struct BuyerRegistration {
    pub first_name: String,
    pub surname: String,
    pub phone: String,
    pub email: String,
    pub lga: String,
    pub location: String,
}

impl Market {
    /// Register a farmer profile for the acting user.
    pub fn register_farmer(
        &self,
        user: &User,
        registration: FarmerRegistration,
    ) -> Result<Farmer, MarketError> {
        let user_id = require_verified_email(user)?.clone();
        let mut tables = self.write();
        if tables.farmers.values().any(|f| f.user_id == user_id) {
            return Err(CommerceError::ProfileExists {
                user: user_id.to_string(),
            }
            .into());
        }
        if tables.farmers.values().any(|f| f.phone == registration.phone) {
            return Err(CommerceError::PhoneTaken {
                phone: registration.phone,
            }
            .into());
        }
        if tables.farmers.values().any(|f| f.email == registration.email) {
            return Err(CommerceError::EmailTaken {
                email: registration.email,
            }
            .into());
        }
        let farmer = Farmer {
            id: FarmerId::generate(),
            user_id,
            first_name: registration.first_name,
            surname: registration.surname,
            email: registration.email,
            phone: registration.phone,
            lga: registration.lga,
            farm_name: registration.farm_name,
            reg_date: current_timestamp(),
            is_active: true,
        };
        tables.farmers.insert(farmer.id.clone(), farmer.clone());
        tracing::info!(farmer = %farmer.id, "farmer registered");
        Ok(farmer)
    }

    /// Register a buyer profile for the acting user.
    pub fn register_buyer(
        &self,
        user: &User,
        registration: BuyerRegistration,
    ) -> Result<Buyer, MarketError> {
        let user_id = require_verified_email(user)?.clone();
        let mut tables = self.write();
        if tables.buyers.values().any(|b| b.user_id == user_id) {
            return Err(CommerceError::ProfileExists {
                user: user_id.to_string(),
            }
            .into());
        }
        if tables.buyers.values().any(|b| b.phone == registration.phone) {
            return Err(CommerceError::PhoneTaken {
                phone: registration.phone,
            }
            .into());
        }
        if tables.buyers.values().any(|b| b.email == registration.email) {
            return Err(CommerceError::EmailTaken {
                email: registration.email,
            }
            .into());
        }
        let buyer = Buyer {
            id: BuyerId::generate(),
            user_id,
            first_name: registration.first_name,
            surname: registration.surname,
            phone: registration.phone,
            email: registration.email,
            lga: registration.lga,
            location: registration.location,
            reg_date: current_timestamp(),
        };
        tables.buyers.insert(buyer.id.clone(), buyer.clone());
        tracing::info!(buyer = %buyer.id, "buyer registered");
        Ok(buyer)
    }

    /// Soft-delete a farmer profile.
    pub fn deactivate_farmer(&self, farmer_id: &FarmerId) -> Result<Farmer, MarketError> {
        let mut tables = self.write();
        let farmer = tables
            .farmers
            .get_mut(farmer_id)
            .ok_or_else(|| CommerceError::ProfileNotFound(farmer_id.to_string()))?;
        farmer.is_active = false;
        Ok(farmer.clone())
    }

    /// Look up a user's farmer profile.
    pub fn farmer_for(&self, user_id: &UserId) -> Option<Farmer> {
        self.read()
            .farmers
            .values()
            .find(|f| &f.user_id == user_id)
            .cloned()
    }

    /// Look up a user's buyer profile.
    pub fn buyer_for(&self, user_id: &UserId) -> Option<Buyer> {
        self.read()
            .buyers
            .values()
            .find(|b| &b.user_id == user_id)
            .cloned()
    }
}

/// Get current Unix timestamp in seconds.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(email: &str, phone: &str) -> FarmerRegistration {
        FarmerRegistration {
            first_name: "Ada".into(),
            surname: "Obi".into(),
            email: email.into(),
            phone: phone.into(),
            lga: Some("Umuahia North".into()),
            farm_name: Some("Obi Farms".into()),
        }
    }

    #[test]
    fn test_register_farmer() {
        let market = Market::default();
        let user = User::verified(UserId::new("u1"), "ada@example.com");
        let farmer = market
            .register_farmer(&user, registration("ada@example.com", "08011111111"))
            .unwrap();
        assert!(farmer.is_active);
        assert_eq!(market.farmer_for(&UserId::new("u1")), Some(farmer));
    }

    #[test]
    fn test_one_profile_per_user() {
        let market = Market::default();
        let user = User::verified(UserId::new("u1"), "ada@example.com");
        market
            .register_farmer(&user, registration("ada@example.com", "08011111111"))
            .unwrap();
        let err = market
            .register_farmer(&user, registration("other@example.com", "08022222222"))
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_phone_and_email_unique() {
        let market = Market::default();
        let user = User::verified(UserId::new("u1"), "ada@example.com");
        market
            .register_farmer(&user, registration("ada@example.com", "08011111111"))
            .unwrap();

        let other = User::verified(UserId::new("u2"), "ba@example.com");
        let err = market
            .register_farmer(&other, registration("ba@example.com", "08011111111"))
            .unwrap_err();
        assert!(matches!(
            err,
            MarketError::Commerce(CommerceError::PhoneTaken { .. })
        ));

        let err = market
            .register_farmer(&other, registration("ada@example.com", "08033333333"))
            .unwrap_err();
        assert!(matches!(
            err,
            MarketError::Commerce(CommerceError::EmailTaken { .. })
        ));
    }

    #[test]
    fn test_soft_delete() {
        let market = Market::default();
        let user = User::verified(UserId::new("u1"), "ada@example.com");
        let farmer = market
            .register_farmer(&user, registration("ada@example.com", "08011111111"))
            .unwrap();
        let deactivated = market.deactivate_farmer(&farmer.id).unwrap();
        assert!(!deactivated.is_active);
        // The profile still exists.
        assert!(market.farmer_for(&UserId::new("u1")).is_some());
    }

    #[test]
    fn test_register_buyer_requires_verification() {
        let market = Market::default();
        let user = User::authenticated(UserId::new("u1"), "ada@example.com");
        let err = market
            .register_buyer(
                &user,
                BuyerRegistration {
                    first_name: "Ada".into(),
                    surname: "Obi".into(),
                    phone: "08011111111".into(),
                    email: "ada@example.com".into(),
                    lga: "Umuahia North".into(),
                    location: "12 Market Road".into(),
                },
            )
            .unwrap_err();
        assert!(err.is_auth());
    }
}
