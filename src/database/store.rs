use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{
    CleaningStaff, DivisionalOffice, Event, EventReport, NewUser, OfficeAssignment, PostOffice,
    Session, SubDivisionalOffice, User, WasteEntry, WasteKind,
};

/// Which post offices to list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostOfficeFilter {
    All,
    /// Members of a division (by the division's pincode)
    Division(String),
    /// The single post office with this pincode
    Pincode(String),
}

/// Which event reports to list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportFilter {
    Pincode(String),
    Event(Uuid),
}

/// Persistence boundary for every record the API touches.
///
/// `update_*` calls replace the stored row with the given value and fail with
/// `DatabaseError::NotFound` when it no longer exists. `delete_*` calls report
/// whether a row was removed.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    async fn health_check(&self) -> Result<(), DatabaseError>;

    // Identity

    /// Create a user, and when given, its office record, atomically
    async fn create_user(
        &self,
        user: NewUser,
        office: Option<OfficeAssignment>,
    ) -> Result<User, DatabaseError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;
    async fn divisional_office(&self, user_id: Uuid) -> Result<Option<DivisionalOffice>, DatabaseError>;
    async fn sub_divisional_office(
        &self,
        user_id: Uuid,
    ) -> Result<Option<SubDivisionalOffice>, DatabaseError>;

    // Sessions

    /// Stores the session and drops every session already expired at its issue time
    async fn create_session(&self, session: &Session) -> Result<(), DatabaseError>;
    async fn session_active(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, DatabaseError>;
    async fn revoke_session(&self, id: Uuid) -> Result<bool, DatabaseError>;

    // Post offices

    async fn insert_post_office(&self, office: &PostOffice) -> Result<(), DatabaseError>;
    async fn get_post_office(&self, pincode: &str) -> Result<Option<PostOffice>, DatabaseError>;
    async fn list_post_offices(&self, filter: PostOfficeFilter) -> Result<Vec<PostOffice>, DatabaseError>;
    async fn update_post_office(&self, office: &PostOffice) -> Result<(), DatabaseError>;
    async fn delete_post_office(&self, pincode: &str) -> Result<bool, DatabaseError>;

    // Events

    async fn insert_event(&self, event: &Event) -> Result<(), DatabaseError>;
    async fn get_event(&self, id: Uuid) -> Result<Option<Event>, DatabaseError>;
    async fn list_events(&self, pincode: &str) -> Result<Vec<Event>, DatabaseError>;
    async fn update_event(&self, event: &Event) -> Result<(), DatabaseError>;
    async fn delete_event(&self, id: Uuid) -> Result<bool, DatabaseError>;

    // Event reports

    async fn insert_report(&self, report: &EventReport) -> Result<(), DatabaseError>;
    async fn get_report(&self, id: Uuid) -> Result<Option<EventReport>, DatabaseError>;
    async fn list_reports(&self, filter: ReportFilter) -> Result<Vec<EventReport>, DatabaseError>;
    async fn update_report(&self, report: &EventReport) -> Result<(), DatabaseError>;
    async fn delete_report(&self, id: Uuid) -> Result<bool, DatabaseError>;

    // Waste ledgers

    async fn insert_waste(&self, entry: &WasteEntry) -> Result<(), DatabaseError>;
    async fn get_waste(&self, kind: WasteKind, id: Uuid) -> Result<Option<WasteEntry>, DatabaseError>;
    /// Entries of `kind` recorded against any of `pincodes`
    async fn list_waste(&self, kind: WasteKind, pincodes: &[String]) -> Result<Vec<WasteEntry>, DatabaseError>;
    async fn delete_waste(&self, kind: WasteKind, id: Uuid) -> Result<bool, DatabaseError>;

    // Cleaning staff

    async fn insert_staff(&self, staff: &CleaningStaff) -> Result<(), DatabaseError>;
    async fn get_staff(&self, id: Uuid) -> Result<Option<CleaningStaff>, DatabaseError>;
    async fn list_staff(&self) -> Result<Vec<CleaningStaff>, DatabaseError>;
    async fn update_staff(&self, staff: &CleaningStaff) -> Result<(), DatabaseError>;
    async fn delete_staff(&self, id: Uuid) -> Result<bool, DatabaseError>;
}

pub type SharedStore = Arc<dyn Store>;
