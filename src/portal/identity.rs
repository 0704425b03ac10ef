//! Registration and the "current user" session slot.
//!
//! The session is a convenience cache of the signed-in user record. There are no credentials:
//! login succeeds for any registered email.

use std::sync::{Arc, Mutex};

use tracing::info;

use super::domain::{NewUser, User, UserRole, MAX_CGPA};
use super::persistence::{PersistenceBackend, SESSION_KEY};
use super::store::{EntityStore, StoreError};

/// Sign-up form fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub cgpa: Option<f32>,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("an account with email {0} already exists")]
    DuplicateEmail(String),
    #[error("no account registered for {0}")]
    UnknownEmail(String),
    #[error("CGPA must be between 0 and {max}, got {value}", max = MAX_CGPA)]
    InvalidCgpa { value: f32 },
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct IdentityService<B> {
    store: Arc<EntityStore<B>>,
    registration_lock: Mutex<()>,
}

impl<B> IdentityService<B>
where
    B: PersistenceBackend,
{
    pub fn new(store: Arc<EntityStore<B>>) -> Self {
        Self {
            store,
            registration_lock: Mutex::new(()),
        }
    }

    /// Create an account and sign it in. Emails are unique ignoring case; faculty accounts
    /// never keep a CGPA.
    pub fn register(&self, registration: Registration) -> Result<User, IdentityError> {
        let _guard = self
            .registration_lock
            .lock()
            .map_err(|_| IdentityError::Store(StoreError::Poisoned))?;

        let email = registration.email.trim().to_string();
        if self.find_by_email(&email)?.is_some() {
            return Err(IdentityError::DuplicateEmail(email));
        }

        let cgpa = match registration.role {
            UserRole::Student => registration.cgpa,
            UserRole::Faculty => None,
        };
        if let Some(value) = cgpa {
            if !value.is_finite() || !(0.0..=MAX_CGPA).contains(&value) {
                return Err(IdentityError::InvalidCgpa { value });
            }
        }

        let user: User = self.store.create(NewUser {
            name: registration.name.trim().to_string(),
            email,
            role: registration.role,
            cgpa,
        })?;
        self.write_session(Some(&user))?;

        info!(user_id = %user.id, role = user.role.label(), "user registered");
        Ok(user)
    }

    pub fn login(&self, email: &str) -> Result<User, IdentityError> {
        let email = email.trim();
        let user = self
            .find_by_email(email)?
            .ok_or_else(|| IdentityError::UnknownEmail(email.to_string()))?;
        self.write_session(Some(&user))?;

        info!(user_id = %user.id, "user signed in");
        Ok(user)
    }

    pub fn logout(&self) -> Result<(), IdentityError> {
        self.write_session(None)
    }

    pub fn current_user(&self) -> Result<Option<User>, IdentityError> {
        let Some(value) = self.store.backend().load_session().map_err(StoreError::from)? else {
            return Ok(None);
        };
        let user = serde_json::from_value(value).map_err(|source| StoreError::Decode {
            collection: SESSION_KEY,
            source,
        })?;
        Ok(Some(user))
    }

    pub fn find_by_email(&self, email: &str) -> Result<Option<User>, IdentityError> {
        let email = email.trim();
        Ok(self
            .store
            .find::<User, _>(|user| user.email.eq_ignore_ascii_case(email))?
            .into_iter()
            .next())
    }

    fn write_session(&self, user: Option<&User>) -> Result<(), IdentityError> {
        let value = user
            .map(serde_json::to_value)
            .transpose()
            .map_err(|source| StoreError::Encode {
                collection: SESSION_KEY,
                source,
            })?;
        self.store
            .backend()
            .store_session(value)
            .map_err(StoreError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portal::persistence::MemoryBackend;

    fn service() -> IdentityService<MemoryBackend> {
        IdentityService::new(Arc::new(EntityStore::new(Arc::new(MemoryBackend::new()))))
    }

    fn registration(email: &str, role: UserRole, cgpa: Option<f32>) -> Registration {
        Registration {
            name: "Alex Taylor".to_string(),
            email: email.to_string(),
            role,
            cgpa,
        }
    }

    #[test]
    fn second_registration_with_same_email_is_refused() {
        let service = service();
        let first = service
            .register(registration("a@b.edu", UserRole::Student, Some(8.1)))
            .expect("first registration");

        let err = service
            .register(registration("A@B.edu", UserRole::Faculty, None))
            .expect_err("duplicate email");
        assert!(matches!(err, IdentityError::DuplicateEmail(_)));

        let stored = service
            .find_by_email("a@b.edu")
            .expect("lookup")
            .expect("present");
        assert_eq!(stored, first);
    }

    #[test]
    fn registration_signs_the_user_in() {
        let service = service();
        assert!(service.current_user().expect("session read").is_none());

        let user = service
            .register(registration("sarah@university.edu", UserRole::Faculty, Some(9.0)))
            .expect("registered");
        assert_eq!(user.cgpa, None, "faculty never carry a CGPA");
        assert_eq!(service.current_user().expect("session read"), Some(user));
    }

    #[test]
    fn out_of_range_cgpa_is_refused() {
        let service = service();
        let err = service
            .register(registration("c@d.edu", UserRole::Student, Some(11.0)))
            .expect_err("above scale");
        assert!(matches!(err, IdentityError::InvalidCgpa { .. }));
        assert!(service
            .register(registration("e@f.edu", UserRole::Student, Some(f32::NAN)))
            .is_err());
    }

    #[test]
    fn login_requires_a_known_email_and_logout_clears_session() {
        let service = service();
        let user = service
            .register(registration("alex@university.edu", UserRole::Student, Some(8.5)))
            .expect("registered");
        service.logout().expect("logout");
        assert!(service.current_user().expect("session read").is_none());

        assert!(matches!(
            service.login("nobody@university.edu"),
            Err(IdentityError::UnknownEmail(_))
        ));

        let signed_in = service.login(" alex@university.edu ").expect("login");
        assert_eq!(signed_in, user);
        assert_eq!(service.current_user().expect("session read"), Some(user));
    }
}
