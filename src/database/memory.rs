use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{
    CleaningStaff, DivisionalOffice, Event, EventReport, NewUser, OfficeAssignment, PostOffice,
    Session, SubDivisionalOffice, User, WasteEntry, WasteKind,
};
use super::store::{PostOfficeFilter, ReportFilter, Store};

/// Process-local `Store` for development runs and tests.
///
/// Mirrors the relational constraints of the SQL schema: unique usernames and
/// pincodes, foreign keys on insert, and the same ON DELETE behaviour.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    divisional: HashMap<Uuid, DivisionalOffice>,
    sub_divisional: HashMap<Uuid, SubDivisionalOffice>,
    sessions: HashMap<Uuid, Session>,
    post_offices: HashMap<String, PostOffice>,
    events: HashMap<Uuid, Event>,
    reports: HashMap<Uuid, EventReport>,
    waste: HashMap<WasteKind, HashMap<Uuid, WasteEntry>>,
    staff: HashMap<Uuid, CleaningStaff>,
}

impl Tables {
    fn require_post_office(&self, pincode: &str) -> Result<(), DatabaseError> {
        if self.post_offices.contains_key(pincode) {
            Ok(())
        } else {
            Err(DatabaseError::InvalidReference(format!("post office {pincode}")))
        }
    }

    fn require_optional_post_office(&self, pincode: Option<&str>) -> Result<(), DatabaseError> {
        match pincode {
            Some(p) => self.require_post_office(p),
            None => Ok(()),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn create_user(
        &self,
        user: NewUser,
        office: Option<OfficeAssignment>,
    ) -> Result<User, DatabaseError> {
        let mut t = self.inner.write().await;

        if t.users.values().any(|u| u.username == user.username) {
            return Err(DatabaseError::Conflict("users_username_key".to_string()));
        }
        match &office {
            Some(OfficeAssignment::Divisional { pincode }) => t.require_post_office(pincode)?,
            Some(OfficeAssignment::SubDivisional { pincode, division_pincode }) => {
                t.require_post_office(pincode)?;
                t.require_post_office(division_pincode)?;
            }
            None => {}
        }

        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: office.as_ref().map(|o| o.role()),
            created_at: Utc::now(),
        };

        match office {
            Some(OfficeAssignment::Divisional { pincode }) => {
                t.divisional
                    .insert(created.id, DivisionalOffice { user_id: created.id, pincode });
            }
            Some(OfficeAssignment::SubDivisional { pincode, division_pincode }) => {
                t.sub_divisional.insert(
                    created.id,
                    SubDivisionalOffice { user_id: created.id, pincode, division_pincode },
                );
            }
            None => {}
        }
        t.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let t = self.inner.read().await;
        Ok(t.users.values().find(|u| u.username == username).cloned())
    }

    async fn divisional_office(&self, user_id: Uuid) -> Result<Option<DivisionalOffice>, DatabaseError> {
        Ok(self.inner.read().await.divisional.get(&user_id).cloned())
    }

    async fn sub_divisional_office(
        &self,
        user_id: Uuid,
    ) -> Result<Option<SubDivisionalOffice>, DatabaseError> {
        Ok(self.inner.read().await.sub_divisional.get(&user_id).cloned())
    }

    async fn create_session(&self, session: &Session) -> Result<(), DatabaseError> {
        let mut t = self.inner.write().await;
        if !t.users.contains_key(&session.user_id) {
            return Err(DatabaseError::InvalidReference(format!("user {}", session.user_id)));
        }
        t.sessions.retain(|_, s| s.expires_at > session.issued_at);
        t.sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn session_active(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, DatabaseError> {
        let t = self.inner.read().await;
        Ok(t.sessions.get(&id).is_some_and(|s| s.expires_at > now))
    }

    async fn revoke_session(&self, id: Uuid) -> Result<bool, DatabaseError> {
        Ok(self.inner.write().await.sessions.remove(&id).is_some())
    }

    async fn insert_post_office(&self, office: &PostOffice) -> Result<(), DatabaseError> {
        let mut t = self.inner.write().await;
        if t.post_offices.contains_key(&office.pincode) {
            return Err(DatabaseError::Conflict("post_offices_pkey".to_string()));
        }
        // a division head may name itself as its division
        if office.division_pincode.as_deref() != Some(office.pincode.as_str()) {
            t.require_optional_post_office(office.division_pincode.as_deref())?;
        }
        t.post_offices.insert(office.pincode.clone(), office.clone());
        Ok(())
    }

    async fn get_post_office(&self, pincode: &str) -> Result<Option<PostOffice>, DatabaseError> {
        Ok(self.inner.read().await.post_offices.get(pincode).cloned())
    }

    async fn list_post_offices(&self, filter: PostOfficeFilter) -> Result<Vec<PostOffice>, DatabaseError> {
        let t = self.inner.read().await;
        let mut offices: Vec<PostOffice> = t
            .post_offices
            .values()
            .filter(|po| match &filter {
                PostOfficeFilter::All => true,
                PostOfficeFilter::Division(d) => po.division_pincode.as_ref() == Some(d),
                PostOfficeFilter::Pincode(p) => &po.pincode == p,
            })
            .cloned()
            .collect();
        offices.sort_by(|a, b| a.pincode.cmp(&b.pincode));
        Ok(offices)
    }

    async fn update_post_office(&self, office: &PostOffice) -> Result<(), DatabaseError> {
        let mut t = self.inner.write().await;
        if !t.post_offices.contains_key(&office.pincode) {
            return Err(DatabaseError::NotFound("post office".to_string()));
        }
        t.require_optional_post_office(office.division_pincode.as_deref())?;
        t.post_offices.insert(office.pincode.clone(), office.clone());
        Ok(())
    }

    async fn delete_post_office(&self, pincode: &str) -> Result<bool, DatabaseError> {
        let mut t = self.inner.write().await;
        if !t.post_offices.contains_key(pincode) {
            return Ok(false);
        }

        // office records reference post offices without ON DELETE
        let referenced = t.divisional.values().any(|d| d.pincode == pincode)
            || t.sub_divisional
                .values()
                .any(|s| s.pincode == pincode || s.division_pincode == pincode);
        if referenced {
            return Err(DatabaseError::InvalidReference(format!(
                "post office {pincode} is assigned to an officer"
            )));
        }
        t.post_offices.remove(pincode);

        let matches = |p: &Option<String>| p.as_deref() == Some(pincode);
        for po in t.post_offices.values_mut().filter(|po| matches(&po.division_pincode)) {
            po.division_pincode = None;
        }
        for event in t.events.values_mut().filter(|e| matches(&e.pincode)) {
            event.pincode = None;
        }
        for report in t.reports.values_mut().filter(|r| matches(&r.pincode)) {
            report.pincode = None;
        }
        for entries in t.waste.values_mut() {
            entries.retain(|_, e| e.pincode != pincode);
        }
        Ok(true)
    }

    async fn insert_event(&self, event: &Event) -> Result<(), DatabaseError> {
        let mut t = self.inner.write().await;
        t.require_optional_post_office(event.pincode.as_deref())?;
        t.events.insert(event.id, event.clone());
        Ok(())
    }

    async fn get_event(&self, id: Uuid) -> Result<Option<Event>, DatabaseError> {
        Ok(self.inner.read().await.events.get(&id).cloned())
    }

    async fn list_events(&self, pincode: &str) -> Result<Vec<Event>, DatabaseError> {
        let t = self.inner.read().await;
        let mut events: Vec<Event> = t.events.values().filter(|e| e.belongs_to(pincode)).cloned().collect();
        events.sort_by(|a, b| (a.event_date, a.created_at).cmp(&(b.event_date, b.created_at)));
        Ok(events)
    }

    async fn update_event(&self, event: &Event) -> Result<(), DatabaseError> {
        let mut t = self.inner.write().await;
        if !t.events.contains_key(&event.id) {
            return Err(DatabaseError::NotFound("event".to_string()));
        }
        t.require_optional_post_office(event.pincode.as_deref())?;
        t.events.insert(event.id, event.clone());
        Ok(())
    }

    async fn delete_event(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut t = self.inner.write().await;
        let removed = t.events.remove(&id).is_some();
        if removed {
            t.reports.retain(|_, r| r.event_id != id);
        }
        Ok(removed)
    }

    async fn insert_report(&self, report: &EventReport) -> Result<(), DatabaseError> {
        let mut t = self.inner.write().await;
        if !t.events.contains_key(&report.event_id) {
            return Err(DatabaseError::InvalidReference(format!("event {}", report.event_id)));
        }
        t.require_optional_post_office(report.pincode.as_deref())?;
        t.reports.insert(report.id, report.clone());
        Ok(())
    }

    async fn get_report(&self, id: Uuid) -> Result<Option<EventReport>, DatabaseError> {
        Ok(self.inner.read().await.reports.get(&id).cloned())
    }

    async fn list_reports(&self, filter: ReportFilter) -> Result<Vec<EventReport>, DatabaseError> {
        let t = self.inner.read().await;
        let mut reports: Vec<EventReport> = t
            .reports
            .values()
            .filter(|r| match &filter {
                ReportFilter::Pincode(p) => r.belongs_to(p),
                ReportFilter::Event(id) => &r.event_id == id,
            })
            .cloned()
            .collect();
        reports.sort_by_key(|r| r.date_time);
        Ok(reports)
    }

    async fn update_report(&self, report: &EventReport) -> Result<(), DatabaseError> {
        let mut t = self.inner.write().await;
        match t.reports.get_mut(&report.id) {
            Some(existing) => {
                // event and pincode are fixed at creation
                existing.name = report.name.clone();
                existing.report_description = report.report_description.clone();
                existing.at_location = report.at_location;
                existing.attached_report = report.attached_report.clone();
                existing.date_time = report.date_time;
                Ok(())
            }
            None => Err(DatabaseError::NotFound("event report".to_string())),
        }
    }

    async fn delete_report(&self, id: Uuid) -> Result<bool, DatabaseError> {
        Ok(self.inner.write().await.reports.remove(&id).is_some())
    }

    async fn insert_waste(&self, entry: &WasteEntry) -> Result<(), DatabaseError> {
        let mut t = self.inner.write().await;
        t.require_post_office(&entry.pincode)?;
        t.waste.entry(entry.kind()).or_default().insert(entry.id, entry.clone());
        Ok(())
    }

    async fn get_waste(&self, kind: WasteKind, id: Uuid) -> Result<Option<WasteEntry>, DatabaseError> {
        let t = self.inner.read().await;
        Ok(t.waste.get(&kind).and_then(|entries| entries.get(&id)).cloned())
    }

    async fn list_waste(&self, kind: WasteKind, pincodes: &[String]) -> Result<Vec<WasteEntry>, DatabaseError> {
        let t = self.inner.read().await;
        let mut entries: Vec<WasteEntry> = t
            .waste
            .get(&kind)
            .map(|entries| {
                entries
                    .values()
                    .filter(|e| pincodes.contains(&e.pincode))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        entries.sort_by(|a, b| (a.date, a.id).cmp(&(b.date, b.id)));
        Ok(entries)
    }

    async fn delete_waste(&self, kind: WasteKind, id: Uuid) -> Result<bool, DatabaseError> {
        let mut t = self.inner.write().await;
        Ok(t.waste.get_mut(&kind).is_some_and(|entries| entries.remove(&id).is_some()))
    }

    async fn insert_staff(&self, staff: &CleaningStaff) -> Result<(), DatabaseError> {
        self.inner.write().await.staff.insert(staff.id, staff.clone());
        Ok(())
    }

    async fn get_staff(&self, id: Uuid) -> Result<Option<CleaningStaff>, DatabaseError> {
        Ok(self.inner.read().await.staff.get(&id).cloned())
    }

    async fn list_staff(&self) -> Result<Vec<CleaningStaff>, DatabaseError> {
        let t = self.inner.read().await;
        let mut staff: Vec<CleaningStaff> = t.staff.values().cloned().collect();
        staff.sort_by(|a, b| (&a.name, a.id).cmp(&(&b.name, b.id)));
        Ok(staff)
    }

    async fn update_staff(&self, staff: &CleaningStaff) -> Result<(), DatabaseError> {
        let mut t = self.inner.write().await;
        if !t.staff.contains_key(&staff.id) {
            return Err(DatabaseError::NotFound("cleaning staff".to_string()));
        }
        t.staff.insert(staff.id, staff.clone());
        Ok(())
    }

    async fn delete_staff(&self, id: Uuid) -> Result<bool, DatabaseError> {
        Ok(self.inner.write().await.staff.remove(&id).is_some())
    }
}
