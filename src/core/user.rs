//! User business logic - Creating and reading accounts, updating contact details.
//!
//! Credentials arrive already hashed. Account removal lives in [`crate::core::account`].

use crate::{
    entities::{User, UserAddress, user, user_address},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Postal address supplied with a new user
#[derive(Debug, Clone, Deserialize)]
pub struct NewUserAddress {
    /// Street and house number
    pub street: String,
    /// City
    pub city: String,
    /// Country
    pub country: String,
}

/// Input for creating a user
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    /// Login email
    pub email: String,
    /// Display name
    pub name: String,
    /// Already hashed credential
    pub password_hash: String,
    /// Optional phone number
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Optional postal address
    #[serde(default)]
    pub address: Option<NewUserAddress>,
}

/// A user together with their address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    /// The account
    #[serde(flatten)]
    pub user: user::Model,
    /// Postal address, if any
    pub address: Option<user_address::Model>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Creates a user, and their address when one is supplied, in one transaction.
///
/// The email is trimmed and lowercased before it is stored.
///
/// # Errors
/// * [`Error::Validation`] when the email or name is blank
/// * [`Error::UniqueConstraint`] when the email is already registered
pub async fn create_user(db: &DatabaseConnection, new_user: NewUser) -> Result<user::Model> {
    let email = normalize_email(&new_user.email);
    if email.is_empty() || !email.contains('@') {
        return Err(Error::Validation {
            message: format!("Invalid email address: {}", new_user.email),
        });
    }
    let name = new_user.name.trim().to_string();
    if name.is_empty() {
        return Err(Error::Validation {
            message: "User name cannot be empty".to_string(),
        });
    }

    let txn = db.begin().await?;

    let address_id = match new_user.address {
        Some(address) => {
            let created = user_address::ActiveModel {
                street: Set(address.street),
                city: Set(address.city),
                country: Set(address.country),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            Some(created.id)
        }
        None => None,
    };

    let now = Utc::now();
    let created = user::ActiveModel {
        email: Set(email),
        name: Set(name),
        password_hash: Set(new_user.password_hash),
        phone_number: Set(new_user.phone_number),
        address_id: Set(address_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    info!(user_id = created.id, "User created");
    Ok(created)
}

/// Retrieves a user by id.
///
/// # Errors
/// Returns [`Error::NotFound`] when no such user exists.
pub async fn get_user_by_id(db: &DatabaseConnection, user_id: i64) -> Result<user::Model> {
    User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("User", user_id))
}

/// Retrieves a user by email, ignoring case and surrounding whitespace.
///
/// # Errors
/// Returns [`Error::NotFound`] when no such user exists.
pub async fn get_user_by_email(db: &DatabaseConnection, email: &str) -> Result<user::Model> {
    let email = normalize_email(email);
    User::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "User",
            id: email,
        })
}

/// Retrieves a user with their address.
///
/// # Errors
/// Returns [`Error::NotFound`] when no such user exists.
pub async fn get_user_profile(db: &DatabaseConnection, user_id: i64) -> Result<UserProfile> {
    let (user, address) = User::find_by_id(user_id)
        .find_also_related(UserAddress)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("User", user_id))?;
    Ok(UserProfile { user, address })
}

/// Sets the user's phone number.
///
/// # Errors
/// * [`Error::Validation`] when the number is blank
/// * [`Error::NotFound`] when no such user exists
pub async fn update_phone_number(
    db: &DatabaseConnection,
    user_id: i64,
    phone_number: &str,
) -> Result<user::Model> {
    let phone_number = phone_number.trim();
    if phone_number.is_empty() {
        return Err(Error::Validation {
            message: "Phone number cannot be empty".to_string(),
        });
    }

    let user = get_user_by_id(db, user_id).await?;

    let mut active_model: user::ActiveModel = user.into();
    active_model.phone_number = Set(Some(phone_number.to_string()));
    active_model.updated_at = Set(Utc::now());

    let result = active_model.update(db).await?;
    info!(user_id, "Phone number updated");
    Ok(result)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn input(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            name: "Ada".to_string(),
            password_hash: "hash".to_string(),
            phone_number: None,
            address: None,
        }
    }

    #[tokio::test]
    async fn test_create_user_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_user(&db, input("   ")).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let mut nameless = input("ada@example.com");
        nameless.name = " ".to_string();
        let result = create_user(&db, nameless).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_user_with_address() -> Result<()> {
        let db = setup_test_db().await?;
        let mut new_user = input("  Ada@Example.com ");
        new_user.address = Some(NewUserAddress {
            street: "Main 1".to_string(),
            city: "Krakow".to_string(),
            country: "PL".to_string(),
        });

        let created = create_user(&db, new_user).await?;
        assert_eq!(created.email, "ada@example.com");
        assert!(created.address_id.is_some());

        let profile = get_user_profile(&db, created.id).await?;
        assert_eq!(profile.address.unwrap().city, "Krakow");

        let by_email = get_user_by_email(&db, "ADA@example.com").await?;
        assert_eq!(by_email.id, created.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() -> Result<()> {
        let db = setup_test_db().await?;
        create_user(&db, input("ada@example.com")).await?;

        let result = create_user(&db, input("ADA@example.com")).await;
        assert!(matches!(result, Err(Error::UniqueConstraint { .. })));
        assert_eq!(
            result.unwrap_err().kind(),
            crate::errors::ErrorKind::Conflict
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_get_user_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(matches!(
            get_user_by_id(&db, 5).await,
            Err(Error::NotFound { entity: "User", .. })
        ));
        assert!(matches!(
            get_user_by_email(&db, "nobody@example.com").await,
            Err(Error::NotFound { entity: "User", .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_phone_number() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "ada@example.com").await?;

        let updated = update_phone_number(&db, user.id, " +48 123 456 789 ").await?;
        assert_eq!(updated.phone_number.as_deref(), Some("+48 123 456 789"));

        let blank = update_phone_number(&db, user.id, "  ").await;
        assert!(matches!(blank, Err(Error::Validation { .. })));

        let missing = update_phone_number(&db, 999, "123").await;
        assert!(matches!(missing, Err(Error::NotFound { .. })));
        Ok(())
    }
}
