//! Resolves where an officer sits in the postal hierarchy and which
//! pincodes they may act on.

use thiserror::Error;

use crate::database::models::{DivisionalOffice, Role, SubDivisionalOffice};
use crate::database::store::{PostOfficeFilter, Store};
use crate::database::DatabaseError;
use crate::middleware::AuthUser;

#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("User does not have access to this data")]
    NoRole,

    #[error("User is not associated with a {} office.", office_label(.0))]
    MissingOffice(Role),

    /// Caller lacks the role an operation needs; carries the client message
    #[error("{0}")]
    RoleRequired(&'static str),

    #[error("Invalid pincode for this {} office", office_label(.role))]
    PincodeOutOfScope { role: Role, pincode: String },

    #[error(transparent)]
    Store(#[from] DatabaseError),
}

fn office_label(role: &Role) -> &'static str {
    match role {
        Role::Divisional => "divisional",
        Role::SubDivisional => "sub-divisional",
    }
}

/// An authenticated officer together with their hierarchy record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Officer {
    Divisional(DivisionalOffice),
    SubDivisional(SubDivisionalOffice),
}

impl Officer {
    pub fn role(&self) -> Role {
        match self {
            Officer::Divisional(_) => Role::Divisional,
            Officer::SubDivisional(_) => Role::SubDivisional,
        }
    }

    /// Pincode events are filed under: the division for both roles
    pub fn event_pincode(&self) -> &str {
        match self {
            Officer::Divisional(office) => &office.pincode,
            Officer::SubDivisional(office) => &office.division_pincode,
        }
    }

    /// The officer's own post office
    pub fn own_pincode(&self) -> &str {
        match self {
            Officer::Divisional(office) => &office.pincode,
            Officer::SubDivisional(office) => &office.pincode,
        }
    }

    /// Post offices whose records this officer may read and modify
    pub async fn visible_post_offices(&self, store: &dyn Store) -> Result<Vec<String>, ScopeError> {
        let filter = match self {
            Officer::Divisional(office) => PostOfficeFilter::Division(office.pincode.clone()),
            Officer::SubDivisional(office) => PostOfficeFilter::Pincode(office.pincode.clone()),
        };
        let offices = store.list_post_offices(filter).await?;
        Ok(offices.into_iter().map(|po| po.pincode).collect())
    }

    pub async fn ensure_visible(&self, store: &dyn Store, pincode: &str) -> Result<(), ScopeError> {
        let visible = self.visible_post_offices(store).await?;
        if visible.iter().any(|p| p == pincode) {
            Ok(())
        } else {
            tracing::warn!(role = %self.role(), pincode, "Pincode outside officer scope");
            Err(ScopeError::PincodeOutOfScope {
                role: self.role(),
                pincode: pincode.to_string(),
            })
        }
    }
}

/// Look up the hierarchy record matching the user's role
pub async fn resolve(store: &dyn Store, user: &AuthUser) -> Result<Officer, ScopeError> {
    match user.role {
        Some(Role::Divisional) => store
            .divisional_office(user.user_id)
            .await?
            .map(Officer::Divisional)
            .ok_or(ScopeError::MissingOffice(Role::Divisional)),
        Some(Role::SubDivisional) => store
            .sub_divisional_office(user.user_id)
            .await?
            .map(Officer::SubDivisional)
            .ok_or(ScopeError::MissingOffice(Role::SubDivisional)),
        None => Err(ScopeError::NoRole),
    }
}

/// Resolve, then insist on `role`
pub async fn resolve_as(
    store: &dyn Store,
    user: &AuthUser,
    role: Role,
    denied: &'static str,
) -> Result<Officer, ScopeError> {
    if user.role != Some(role) {
        tracing::warn!(user = %user.username, required = %role, "Role check failed");
        return Err(ScopeError::RoleRequired(denied));
    }
    resolve(store, user).await
}
