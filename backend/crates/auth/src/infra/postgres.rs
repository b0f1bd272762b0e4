//! PostgreSQL Repository Implementations

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{session::SessionRecord, user::{Profile, User}};
use crate::domain::repository::{
    CodeConsumption, SessionRepository, UserRepository,
};
use crate::domain::value_object::{
    email::Email, email_code::EmailChallenge, second_factor::SecondFactorKind,
};
use crate::error::{AuthError, AuthResult};
use kernel::id::UserId;
use platform::password::HashedPassword;

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Clean up session rows whose long-lived token has expired
    pub async fn cleanup_expired_sessions(&self) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM sessions WHERE session_expires_at < now()")
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(sessions_deleted = deleted, "Cleaned up expired sessions");

        Ok(deleted)
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                email,
                password_hash,
                first_name,
                last_name,
                phone,
                date_of_birth,
                address,
                city,
                state,
                zip_code,
                country,
                ssn_last4,
                employment_status,
                annual_income,
                net_worth,
                investment_experience,
                risk_tolerance,
                account_type,
                is_verified,
                two_factor_enabled,
                two_factor_type,
                totp_secret,
                email_2fa_code,
                email_2fa_expires_at,
                created_at,
                updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27
            )
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(user.email.as_str())
        .bind(user.password_hash.as_str())
        .bind(&user.profile.first_name)
        .bind(&user.profile.last_name)
        .bind(&user.profile.phone)
        .bind(user.profile.date_of_birth)
        .bind(&user.profile.address)
        .bind(&user.profile.city)
        .bind(&user.profile.state)
        .bind(&user.profile.zip_code)
        .bind(&user.profile.country)
        .bind(&user.profile.ssn_last4)
        .bind(&user.profile.employment_status)
        .bind(&user.profile.annual_income)
        .bind(&user.profile.net_worth)
        .bind(&user.profile.investment_experience)
        .bind(&user.profile.risk_tolerance)
        .bind(&user.profile.account_type)
        .bind(user.email_verified)
        .bind(user.two_factor_enabled)
        .bind(user.two_factor_kind.as_str())
        .bind(&user.totp_secret)
        .bind(user.email_challenge.as_ref().map(|c| c.code().to_string()))
        .bind(user.email_challenge.as_ref().map(|c| c.expires_at()))
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            // Concurrent signups race to the unique index, not a pre-check
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AuthError::EmailTaken)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            &format!("{USER_SELECT} WHERE email = $1"),
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_by_id(&self, id: UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            &format!("{USER_SELECT} WHERE user_id = $1"),
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE users SET
                is_verified = $2,
                two_factor_enabled = $3,
                two_factor_type = $4,
                totp_secret = $5,
                email_2fa_code = $6,
                email_2fa_expires_at = $7,
                updated_at = $8
            WHERE user_id = $1
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(user.email_verified)
        .bind(user.two_factor_enabled)
        .bind(user.two_factor_kind.as_str())
        .bind(&user.totp_secret)
        .bind(user.email_challenge.as_ref().map(|c| c.code().to_string()))
        .bind(user.email_challenge.as_ref().map(|c| c.expires_at()))
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn consume_email_code(&self, id: UserId, code: &str) -> AuthResult<CodeConsumption> {
        // Check and clear in one statement so a concurrent submission of
        // the same code cannot pass twice. RETURNING reads the expiry from
        // the locked pre-update row, since the updated row has it nulled.
        let row: Option<(Option<DateTime<Utc>>,)> = sqlx::query_as(
            r#"
            WITH pending AS (
                SELECT user_id, email_2fa_expires_at
                FROM users
                WHERE user_id = $1 AND email_2fa_code = $2
                FOR UPDATE
            )
            UPDATE users u
            SET email_2fa_code = NULL,
                email_2fa_expires_at = NULL,
                updated_at = now()
            FROM pending p
            WHERE u.user_id = p.user_id
            RETURNING p.email_2fa_expires_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match row {
            None => CodeConsumption::NoMatch,
            Some((expires_at,)) => {
                let valid = expires_at.is_some_and(|t| Utc::now() <= t);
                if valid {
                    CodeConsumption::Accepted
                } else {
                    CodeConsumption::Expired
                }
            }
        })
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for PgAuthRepository {
    async fn create(&self, record: &SessionRecord) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (
                session_id,
                user_id,
                session_token,
                trading_token,
                session_expires_at,
                trading_expires_at,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.user_id.as_uuid())
        .bind(&record.session_token)
        .bind(&record.trading_token)
        .bind(record.session_expires_at)
        .bind(record.trading_expires_at)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Row Mapping
// ============================================================================

const USER_SELECT: &str = r#"
    SELECT
        user_id,
        email,
        password_hash,
        first_name,
        last_name,
        phone,
        date_of_birth,
        address,
        city,
        state,
        zip_code,
        country,
        ssn_last4,
        employment_status,
        annual_income,
        net_worth,
        investment_experience,
        risk_tolerance,
        account_type,
        is_verified,
        two_factor_enabled,
        two_factor_type,
        totp_secret,
        email_2fa_code,
        email_2fa_expires_at,
        created_at,
        updated_at
    FROM users
"#;

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    email: String,
    password_hash: String,
    first_name: Option<String>,
    last_name: Option<String>,
    phone: Option<String>,
    date_of_birth: Option<NaiveDate>,
    address: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip_code: Option<String>,
    country: Option<String>,
    ssn_last4: Option<String>,
    employment_status: Option<String>,
    annual_income: Option<String>,
    net_worth: Option<String>,
    investment_experience: Option<String>,
    risk_tolerance: Option<String>,
    account_type: Option<String>,
    is_verified: bool,
    two_factor_enabled: bool,
    two_factor_type: String,
    totp_secret: Option<String>,
    email_2fa_code: Option<String>,
    email_2fa_expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let two_factor_kind = SecondFactorKind::from_db(&self.two_factor_type)?;

        let email_challenge = match (self.email_2fa_code, self.email_2fa_expires_at) {
            (Some(code), Some(expires_at)) => Some(EmailChallenge::from_db(code, expires_at)),
            _ => None,
        };

        Ok(User {
            id: UserId::from_uuid(self.user_id),
            email: Email::from_db(self.email),
            password_hash: HashedPassword::from_digest(self.password_hash),
            profile: Profile {
                first_name: self.first_name,
                last_name: self.last_name,
                phone: self.phone,
                date_of_birth: self.date_of_birth,
                address: self.address,
                city: self.city,
                state: self.state,
                zip_code: self.zip_code,
                country: self.country,
                ssn_last4: self.ssn_last4,
                employment_status: self.employment_status,
                annual_income: self.annual_income,
                net_worth: self.net_worth,
                investment_experience: self.investment_experience,
                risk_tolerance: self.risk_tolerance,
                account_type: self.account_type,
            },
            email_verified: self.is_verified,
            two_factor_kind,
            two_factor_enabled: self.two_factor_enabled,
            totp_secret: self.totp_secret,
            email_challenge,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
