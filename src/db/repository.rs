//! Database repository for CRUD operations.
//!
//! Uses prepared statements and conditional updates for data integrity.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::bootstrap::FounderDecision;
use crate::errors::AppError;
use crate::models::{
    CreateMemberRequest, Datastore, FamilyMember, FamilyTitle, RegisterRequest, RevisionInfo,
    UpdateMemberRequest,
};

const PROFILE_COLUMNS: &str = "id, first_name, last_name, title, father_id, mother_id, email, \
     birth_date, birth_place, current_location, phone, country, photo_url, situation, \
     profession, is_admin, is_patriarch, created_at, updated_at, version";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the current revision ID.
    pub async fn get_revision_id(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("revision_id"))
    }

    /// Get revision info.
    pub async fn get_revision_info(&self) -> Result<RevisionInfo, AppError> {
        let row = sqlx::query("SELECT revision_id, generated_at FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(RevisionInfo {
            revision_id: row.get("revision_id"),
            generated_at: row.get("generated_at"),
        })
    }

    /// Increment the revision ID and return the new value.
    pub async fn increment_revision(&self) -> Result<i64, AppError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
            .bind(&now)
            .execute(&self.pool)
            .await?;
        self.get_revision_id().await
    }

    /// Get the full datastore.
    pub async fn get_datastore(&self) -> Result<Datastore, AppError> {
        let meta =
            sqlx::query("SELECT schema_version, revision_id, generated_at FROM meta WHERE id = 1")
                .fetch_one(&self.pool)
                .await?;

        let members = self.list_members().await?;

        Ok(Datastore {
            schema_version: meta.get("schema_version"),
            revision_id: meta.get("revision_id"),
            generated_at: meta.get("generated_at"),
            members,
        })
    }

    // ==================== MEMBER OPERATIONS ====================

    /// Whether at least one member exists. Single existence probe, not a list
    /// fetch; the registration flow depends on this distinction between
    /// "empty roster" and "could not determine".
    pub async fn has_members(&self) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM profiles) AS present")
            .fetch_one(&self.pool)
            .await?;
        let present: i32 = row.get("present");
        Ok(present != 0)
    }

    /// List all members in insertion order.
    ///
    /// Insertion order is the tie-break the tree builder uses for root
    /// selection and child ordering, so it must be stable across calls.
    pub async fn list_members(&self) -> Result<Vec<FamilyMember>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY created_at, rowid"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| member_from_row(&row)).collect())
    }

    /// Get a member by ID.
    pub async fn get_member(&self, id: &str) -> Result<Option<FamilyMember>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(member_from_row))
    }

    /// Create a member via the add-member action. Never grants privileges.
    pub async fn create_member(
        &self,
        request: &CreateMemberRequest,
    ) -> Result<FamilyMember, AppError> {
        let now = Utc::now().to_rfc3339();
        let member = FamilyMember {
            id: uuid::Uuid::new_v4().to_string(),
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            title: request.title,
            father_id: request.father_id.clone(),
            mother_id: request.mother_id.clone(),
            email: request.email.clone(),
            birth_date: request.birth_date.clone(),
            birth_place: request.birth_place.clone(),
            current_location: request.current_location.clone(),
            phone: request.phone.clone(),
            country: request.country.clone(),
            photo_url: request.photo_url.clone(),
            situation: request.situation.clone(),
            profession: request.profession.clone(),
            is_admin: false,
            is_patriarch: false,
            created_at: now.clone(),
            updated_at: now,
            version: 1,
        };

        self.insert_profile(&member).await?;
        self.increment_revision().await?;

        Ok(member)
    }

    /// Create the member record for a new registrant, applying the founder
    /// election outcome. The partial unique index on `is_patriarch` makes the
    /// final claim: if two first registrations race, the second insert fails
    /// and surfaces as a conflict.
    pub async fn create_registrant(
        &self,
        request: &RegisterRequest,
        decision: &FounderDecision,
    ) -> Result<FamilyMember, AppError> {
        let now = Utc::now().to_rfc3339();
        let member = FamilyMember {
            id: uuid::Uuid::new_v4().to_string(),
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            title: decision.title,
            father_id: request.father_id.clone(),
            mother_id: request.mother_id.clone(),
            email: request.email.clone(),
            birth_date: request.birth_date.clone(),
            birth_place: request.birth_place.clone(),
            current_location: request.current_location.clone(),
            phone: request.phone.clone(),
            country: request.country.clone(),
            photo_url: request.photo_url.clone(),
            situation: request.situation.clone(),
            profession: request.profession.clone(),
            is_admin: false,
            is_patriarch: decision.is_patriarch,
            created_at: now.clone(),
            updated_at: now,
            version: 1,
        };

        self.insert_profile(&member).await?;
        self.increment_revision().await?;

        Ok(member)
    }

    async fn insert_profile(&self, member: &FamilyMember) -> Result<(), AppError> {
        sqlx::query(&format!(
            "INSERT INTO profiles ({PROFILE_COLUMNS}) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(&member.id)
        .bind(&member.first_name)
        .bind(&member.last_name)
        .bind(member.title.as_str())
        .bind(&member.father_id)
        .bind(&member.mother_id)
        .bind(&member.email)
        .bind(&member.birth_date)
        .bind(&member.birth_place)
        .bind(&member.current_location)
        .bind(&member.phone)
        .bind(&member.country)
        .bind(&member.photo_url)
        .bind(&member.situation)
        .bind(&member.profession)
        .bind(member.is_admin as i32)
        .bind(member.is_patriarch as i32)
        .bind(&member.created_at)
        .bind(&member.updated_at)
        .bind(member.version)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(())
    }

    /// Update a member with optimistic concurrency control.
    pub async fn update_member(
        &self,
        id: &str,
        request: &UpdateMemberRequest,
    ) -> Result<FamilyMember, AppError> {
        let existing = self
            .get_member(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member {} not found", id)))?;

        // Check version for optimistic concurrency
        if let Some(expected) = request.expected_version {
            if existing.version != expected {
                return Err(AppError::Conflict {
                    message: format!(
                        "Version mismatch: expected {}, current {}",
                        expected, existing.version
                    ),
                    current_version: existing.version,
                });
            }
        }

        let now = Utc::now().to_rfc3339();
        let new_version = existing.version + 1;

        let first_name = request.first_name.as_ref().unwrap_or(&existing.first_name);
        let last_name = request.last_name.as_ref().unwrap_or(&existing.last_name);
        let title = request.title.unwrap_or(existing.title);
        let father_id = request.father_id.clone().or(existing.father_id.clone());
        let mother_id = request.mother_id.clone().or(existing.mother_id.clone());
        let birth_date = request.birth_date.clone().or(existing.birth_date.clone());
        let birth_place = request.birth_place.clone().or(existing.birth_place.clone());
        let current_location = request
            .current_location
            .clone()
            .or(existing.current_location.clone());
        let phone = request.phone.clone().or(existing.phone.clone());
        let country = request.country.clone().or(existing.country.clone());
        let photo_url = request.photo_url.clone().or(existing.photo_url.clone());
        let situation = request.situation.clone().or(existing.situation.clone());
        let profession = request.profession.clone().or(existing.profession.clone());

        // Use conditional UPDATE with version check to prevent race conditions
        let result = sqlx::query(
            "UPDATE profiles SET first_name = ?, last_name = ?, title = ?, father_id = ?, \
             mother_id = ?, birth_date = ?, birth_place = ?, current_location = ?, phone = ?, \
             country = ?, photo_url = ?, situation = ?, profession = ?, updated_at = ?, \
             version = ? WHERE id = ? AND version = ?",
        )
        .bind(first_name)
        .bind(last_name)
        .bind(title.as_str())
        .bind(&father_id)
        .bind(&mother_id)
        .bind(&birth_date)
        .bind(&birth_place)
        .bind(&current_location)
        .bind(&phone)
        .bind(&country)
        .bind(&photo_url)
        .bind(&situation)
        .bind(&profession)
        .bind(&now)
        .bind(new_version)
        .bind(id)
        .bind(existing.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Race condition - version changed between read and write
            let current = self.get_member(id).await?;
            return Err(AppError::Conflict {
                message: "Concurrent modification detected".to_string(),
                current_version: current.map(|m| m.version).unwrap_or(0),
            });
        }

        self.increment_revision().await?;

        Ok(FamilyMember {
            id: id.to_string(),
            first_name: first_name.clone(),
            last_name: last_name.clone(),
            title,
            father_id,
            mother_id,
            email: existing.email,
            birth_date,
            birth_place,
            current_location,
            phone,
            country,
            photo_url,
            situation,
            profession,
            is_admin: existing.is_admin,
            is_patriarch: existing.is_patriarch,
            created_at: existing.created_at,
            updated_at: now,
            version: new_version,
        })
    }
}

/// Map a unique-index violation onto a conflict the caller can report;
/// everything else stays a database error.
fn map_unique_violation(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let message = if db_err.message().contains("profiles.email") {
                "A member with this email already exists".to_string()
            } else if db_err.message().contains("is_patriarch") {
                "The family already has a patriarch".to_string()
            } else {
                "Duplicate record".to_string()
            };
            return AppError::Conflict {
                message,
                current_version: 0,
            };
        }
    }
    err.into()
}

// Helper functions for row conversion

fn member_from_row(row: &sqlx::sqlite::SqliteRow) -> FamilyMember {
    let title: String = row.get("title");
    let is_admin: i32 = row.get("is_admin");
    let is_patriarch: i32 = row.get("is_patriarch");
    FamilyMember {
        id: row.get("id"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        // Stored titles may predate the current enumeration; degrade to the
        // default rather than failing the whole read.
        title: FamilyTitle::from_str_lossy(&title),
        father_id: row.get("father_id"),
        mother_id: row.get("mother_id"),
        email: row.get("email"),
        birth_date: row.get("birth_date"),
        birth_place: row.get("birth_place"),
        current_location: row.get("current_location"),
        phone: row.get("phone"),
        country: row.get("country"),
        photo_url: row.get("photo_url"),
        situation: row.get("situation"),
        profession: row.get("profession"),
        is_admin: is_admin != 0,
        is_patriarch: is_patriarch != 0,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        version: row.get("version"),
    }
}
