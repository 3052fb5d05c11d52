use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, FromRow, PgPool, Row};
use uuid::Uuid;

use super::manager::{DatabaseError, DatabaseManager};
use super::models::{
    CleaningStaff, DivisionalOffice, Event, EventReport, NewUser, OfficeAssignment, PostOffice, Role,
    Session, SubDivisionalOffice, User, WasteEntry, WasteKind, WasteMeasure,
};
use super::store::{PostOfficeFilter, ReportFilter, Store};

/// `Store` backed by PostgreSQL through a sqlx pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    role: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DatabaseError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .map(|r| r.parse::<Role>())
            .transpose()
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        Ok(User {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
        })
    }
}

const USER_COLUMNS: &str = "id, username, email, password_hash, role, created_at";

fn waste_from_row(kind: WasteKind, row: &PgRow) -> Result<WasteEntry, DatabaseError> {
    let measure = match kind {
        WasteKind::Ewaste => WasteMeasure::Units {
            no_of_units: row.try_get("no_of_units")?,
            description: row.try_get("description")?,
        },
        WasteKind::PaperWaste => WasteMeasure::Weight {
            weight: row.try_get("weight")?,
        },
        WasteKind::SelledPaperWaste => WasteMeasure::Sale {
            total_weight: row.try_get("total_weight")?,
            total_price: row.try_get("total_price")?,
        },
    };

    Ok(WasteEntry {
        id: row.try_get("id")?,
        pincode: row.try_get("pincode")?,
        date: row.try_get("date")?,
        measure,
    })
}

fn expect_affected(rows: u64, what: &str) -> Result<(), DatabaseError> {
    if rows == 0 {
        return Err(DatabaseError::NotFound(what.to_string()));
    }
    Ok(())
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }

    async fn create_user(
        &self,
        user: NewUser,
        office: Option<OfficeAssignment>,
    ) -> Result<User, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO users (id, username, email, password_hash, role) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        );
        let row: UserRow = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(office.as_ref().map(|o| o.role().as_str()))
            .fetch_one(&mut *tx)
            .await?;

        match &office {
            Some(OfficeAssignment::Divisional { pincode }) => {
                sqlx::query("INSERT INTO divisional_offices (user_id, pincode) VALUES ($1, $2)")
                    .bind(row.id)
                    .bind(pincode)
                    .execute(&mut *tx)
                    .await?;
            }
            Some(OfficeAssignment::SubDivisional { pincode, division_pincode }) => {
                sqlx::query(
                    "INSERT INTO sub_divisional_offices (user_id, pincode, division_pincode) \
                     VALUES ($1, $2, $3)",
                )
                .bind(row.id)
                .bind(pincode)
                .bind(division_pincode)
                .execute(&mut *tx)
                .await?;
            }
            None => {}
        }

        tx.commit().await?;
        row.try_into()
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row: Option<UserRow> = sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(User::try_from).transpose()
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn divisional_office(&self, user_id: Uuid) -> Result<Option<DivisionalOffice>, DatabaseError> {
        let office = sqlx::query_as::<_, DivisionalOffice>(
            "SELECT user_id, pincode FROM divisional_offices WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(office)
    }

    async fn sub_divisional_office(
        &self,
        user_id: Uuid,
    ) -> Result<Option<SubDivisionalOffice>, DatabaseError> {
        let office = sqlx::query_as::<_, SubDivisionalOffice>(
            "SELECT user_id, pincode, division_pincode FROM sub_divisional_offices WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(office)
    }

    async fn create_session(&self, session: &Session) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let purged = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(session.issued_at)
            .execute(&mut *tx)
            .await?;
        if purged.rows_affected() > 0 {
            tracing::debug!(purged = purged.rows_affected(), "Expired sessions removed");
        }

        sqlx::query("INSERT INTO sessions (id, user_id, issued_at, expires_at) VALUES ($1, $2, $3, $4)")
            .bind(session.id)
            .bind(session.user_id)
            .bind(session.issued_at)
            .bind(session.expires_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn session_active(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, DatabaseError> {
        let active = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM sessions WHERE id = $1 AND expires_at > $2)",
        )
        .bind(id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(active)
    }

    async fn revoke_session(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_post_office(&self, office: &PostOffice) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO post_offices (pincode, name, contact_no, address, division_pincode) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&office.pincode)
        .bind(&office.name)
        .bind(&office.contact_no)
        .bind(&office.address)
        .bind(&office.division_pincode)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_post_office(&self, pincode: &str) -> Result<Option<PostOffice>, DatabaseError> {
        let office = sqlx::query_as::<_, PostOffice>("SELECT * FROM post_offices WHERE pincode = $1")
            .bind(pincode)
            .fetch_optional(&self.pool)
            .await?;
        Ok(office)
    }

    async fn list_post_offices(&self, filter: PostOfficeFilter) -> Result<Vec<PostOffice>, DatabaseError> {
        let offices = match filter {
            PostOfficeFilter::All => {
                sqlx::query_as::<_, PostOffice>("SELECT * FROM post_offices ORDER BY pincode")
                    .fetch_all(&self.pool)
                    .await?
            }
            PostOfficeFilter::Division(division) => {
                sqlx::query_as::<_, PostOffice>(
                    "SELECT * FROM post_offices WHERE division_pincode = $1 ORDER BY pincode",
                )
                .bind(division)
                .fetch_all(&self.pool)
                .await?
            }
            PostOfficeFilter::Pincode(pincode) => {
                sqlx::query_as::<_, PostOffice>("SELECT * FROM post_offices WHERE pincode = $1")
                    .bind(pincode)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(offices)
    }

    async fn update_post_office(&self, office: &PostOffice) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE post_offices SET name = $2, contact_no = $3, address = $4, division_pincode = $5 \
             WHERE pincode = $1",
        )
        .bind(&office.pincode)
        .bind(&office.name)
        .bind(&office.contact_no)
        .bind(&office.address)
        .bind(&office.division_pincode)
        .execute(&self.pool)
        .await?;
        expect_affected(result.rows_affected(), "post office")
    }

    async fn delete_post_office(&self, pincode: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM post_offices WHERE pincode = $1")
            .bind(pincode)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_event(&self, event: &Event) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO events (id, pincode, title, description, location, event_date, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(event.id)
        .bind(&event.pincode)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(event.event_date)
        .bind(event.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_event(&self, id: Uuid) -> Result<Option<Event>, DatabaseError> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    async fn list_events(&self, pincode: &str) -> Result<Vec<Event>, DatabaseError> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE pincode = $1 ORDER BY event_date, created_at",
        )
        .bind(pincode)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    async fn update_event(&self, event: &Event) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE events SET pincode = $2, title = $3, description = $4, location = $5, event_date = $6 \
             WHERE id = $1",
        )
        .bind(event.id)
        .bind(&event.pincode)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(event.event_date)
        .execute(&self.pool)
        .await?;
        expect_affected(result.rows_affected(), "event")
    }

    async fn delete_event(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_report(&self, report: &EventReport) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO event_reports \
             (id, event_id, pincode, name, report_description, at_location, attached_report, date_time) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(report.id)
        .bind(report.event_id)
        .bind(&report.pincode)
        .bind(&report.name)
        .bind(&report.report_description)
        .bind(report.at_location)
        .bind(&report.attached_report)
        .bind(report.date_time)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_report(&self, id: Uuid) -> Result<Option<EventReport>, DatabaseError> {
        let report = sqlx::query_as::<_, EventReport>("SELECT * FROM event_reports WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(report)
    }

    async fn list_reports(&self, filter: ReportFilter) -> Result<Vec<EventReport>, DatabaseError> {
        let reports = match filter {
            ReportFilter::Pincode(pincode) => {
                sqlx::query_as::<_, EventReport>(
                    "SELECT * FROM event_reports WHERE pincode = $1 ORDER BY date_time",
                )
                .bind(pincode)
                .fetch_all(&self.pool)
                .await?
            }
            ReportFilter::Event(event_id) => {
                sqlx::query_as::<_, EventReport>(
                    "SELECT * FROM event_reports WHERE event_id = $1 ORDER BY date_time",
                )
                .bind(event_id)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(reports)
    }

    async fn update_report(&self, report: &EventReport) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE event_reports SET name = $2, report_description = $3, at_location = $4, \
             attached_report = $5, date_time = $6 WHERE id = $1",
        )
        .bind(report.id)
        .bind(&report.name)
        .bind(&report.report_description)
        .bind(report.at_location)
        .bind(&report.attached_report)
        .bind(report.date_time)
        .execute(&self.pool)
        .await?;
        expect_affected(result.rows_affected(), "event report")
    }

    async fn delete_report(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM event_reports WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_waste(&self, entry: &WasteEntry) -> Result<(), DatabaseError> {
        let query = match &entry.measure {
            WasteMeasure::Units { no_of_units, description } => sqlx::query(
                "INSERT INTO ewaste (id, pincode, date, no_of_units, description) VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(entry.id)
            .bind(&entry.pincode)
            .bind(entry.date)
            .bind(*no_of_units)
            .bind(description.clone()),
            WasteMeasure::Weight { weight } => sqlx::query(
                "INSERT INTO paper_waste (id, pincode, date, weight) VALUES ($1, $2, $3, $4)",
            )
            .bind(entry.id)
            .bind(&entry.pincode)
            .bind(entry.date)
            .bind(*weight),
            WasteMeasure::Sale { total_weight, total_price } => sqlx::query(
                "INSERT INTO selled_paper_waste (id, pincode, date, total_weight, total_price) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(entry.id)
            .bind(&entry.pincode)
            .bind(entry.date)
            .bind(*total_weight)
            .bind(*total_price),
        };
        query.execute(&self.pool).await?;
        Ok(())
    }

    async fn get_waste(&self, kind: WasteKind, id: Uuid) -> Result<Option<WasteEntry>, DatabaseError> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", kind.table());
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(|r| waste_from_row(kind, &r)).transpose()
    }

    async fn list_waste(&self, kind: WasteKind, pincodes: &[String]) -> Result<Vec<WasteEntry>, DatabaseError> {
        if pincodes.is_empty() {
            return Ok(vec![]);
        }
        let sql = format!(
            "SELECT * FROM {} WHERE pincode = ANY($1) ORDER BY date, id",
            kind.table()
        );
        let rows = sqlx::query(&sql)
            .bind(pincodes.to_vec())
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(|r| waste_from_row(kind, r)).collect()
    }

    async fn delete_waste(&self, kind: WasteKind, id: Uuid) -> Result<bool, DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", kind.table());
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_staff(&self, staff: &CleaningStaff) -> Result<(), DatabaseError> {
        sqlx::query("INSERT INTO cleaning_staff (id, name, pincode, contact) VALUES ($1, $2, $3, $4)")
            .bind(staff.id)
            .bind(&staff.name)
            .bind(&staff.pincode)
            .bind(&staff.contact)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_staff(&self, id: Uuid) -> Result<Option<CleaningStaff>, DatabaseError> {
        let staff = sqlx::query_as::<_, CleaningStaff>("SELECT * FROM cleaning_staff WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(staff)
    }

    async fn list_staff(&self) -> Result<Vec<CleaningStaff>, DatabaseError> {
        let staff = sqlx::query_as::<_, CleaningStaff>("SELECT * FROM cleaning_staff ORDER BY name, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(staff)
    }

    async fn update_staff(&self, staff: &CleaningStaff) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE cleaning_staff SET name = $2, pincode = $3, contact = $4 WHERE id = $1")
            .bind(staff.id)
            .bind(&staff.name)
            .bind(&staff.pincode)
            .bind(&staff.contact)
            .execute(&self.pool)
            .await?;
        expect_affected(result.rows_affected(), "cleaning staff")
    }

    async fn delete_staff(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM cleaning_staff WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
