use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::auth_dto::{MeResponse, RegisterPayload};
use crate::error::{Error, Result};
use crate::middleware::auth::Role;
use crate::models::user::{CandidateProfile, Company, Recruiter, RecruiterSummary, User};

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_sub(&self, identity_sub: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE identity_sub = $1")
            .bind(identity_sub)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Creates the local user for a verified identity plus its role profile.
    pub async fn register(
        &self,
        identity_sub: &str,
        role: Role,
        payload: RegisterPayload,
    ) -> Result<MeResponse> {
        if role == Role::Recruiter && payload.company_name.is_none() {
            return Err(Error::BadRequest(
                "company_name is required for recruiters".into(),
            ));
        }
        if self.find_by_sub(identity_sub).await?.is_some() {
            return Err(Error::Conflict("User is already registered".into()));
        }

        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (identity_sub, full_name, email, phone_number, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(identity_sub)
        .bind(payload.full_name.trim())
        .bind(payload.email.trim().to_lowercase())
        .bind(payload.phone_number.as_deref())
        .bind(role.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match Error::from(e) {
            Error::Conflict(_) => Error::Conflict("Email or identity is already registered".into()),
            other => other,
        })?;

        let mut me = MeResponse {
            user,
            candidate_id: None,
            recruiter_id: None,
        };

        match role {
            Role::Candidate => {
                let profile = sqlx::query_as::<_, CandidateProfile>(
                    "INSERT INTO candidate_profiles (user_id, headline) VALUES ($1, $2) RETURNING *",
                )
                .bind(me.user.id)
                .bind(payload.headline.as_deref())
                .fetch_one(&mut *tx)
                .await?;
                me.candidate_id = Some(profile.id);
            }
            Role::Recruiter => {
                let company = sqlx::query_as::<_, Company>(
                    r#"
                    INSERT INTO companies (name, website, location)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (name) DO UPDATE
                        SET website = COALESCE(companies.website, EXCLUDED.website),
                            location = COALESCE(companies.location, EXCLUDED.location)
                    RETURNING *
                    "#,
                )
                .bind(payload.company_name.as_deref().map(str::trim))
                .bind(payload.company_website.as_deref())
                .bind(payload.company_location.as_deref())
                .fetch_one(&mut *tx)
                .await?;

                let recruiter = sqlx::query_as::<_, Recruiter>(
                    r#"
                    INSERT INTO recruiters (user_id, company_id, designation)
                    VALUES ($1, $2, $3)
                    RETURNING *
                    "#,
                )
                .bind(me.user.id)
                .bind(company.id)
                .bind(payload.designation.as_deref())
                .fetch_one(&mut *tx)
                .await?;
                me.recruiter_id = Some(recruiter.id);
            }
            Role::Admin => {}
        }

        tx.commit().await?;
        tracing::info!(user_id = %me.user.id, role = role.as_str(), "user registered");
        Ok(me)
    }

    pub async fn me(&self, user: User) -> Result<MeResponse> {
        let candidate_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM candidate_profiles WHERE user_id = $1",
        )
        .bind(user.id)
        .fetch_optional(&self.pool)
        .await?;
        let recruiter_id =
            sqlx::query_scalar::<_, Uuid>("SELECT id FROM recruiters WHERE user_id = $1")
                .bind(user.id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(MeResponse {
            user,
            candidate_id,
            recruiter_id,
        })
    }

    /// Candidate profile for the user, created on first use.
    pub async fn ensure_candidate_profile(&self, user_id: Uuid) -> Result<CandidateProfile> {
        let profile = sqlx::query_as::<_, CandidateProfile>(
            r#"
            INSERT INTO candidate_profiles (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING *
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(profile)
    }

    pub async fn recruiter_for_user(&self, user_id: Uuid) -> Result<Option<Recruiter>> {
        let recruiter =
            sqlx::query_as::<_, Recruiter>("SELECT * FROM recruiters WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(recruiter)
    }

    pub async fn list_recruiters(&self) -> Result<Vec<RecruiterSummary>> {
        let rows = sqlx::query_as::<_, RecruiterSummary>(
            r#"
            SELECT r.id, r.user_id, u.full_name, u.email, c.name AS company_name, r.designation
            FROM recruiters r
            JOIN users u ON u.id = r.user_id
            JOIN companies c ON c.id = r.company_id
            ORDER BY u.full_name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn user_id_for_recruiter(&self, recruiter_id: Uuid) -> Result<Option<Uuid>> {
        let id = sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM recruiters WHERE id = $1")
            .bind(recruiter_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }

    pub async fn user_id_for_candidate(&self, candidate_id: Uuid) -> Result<Option<Uuid>> {
        let id =
            sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM candidate_profiles WHERE id = $1")
                .bind(candidate_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(id)
    }
}
