use anyhow::Result;
use chrono::NaiveDate;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::Config;
use crate::models::{Payment, PaymentStatus, Project, User};

/// Database connection pool
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new Database instance with a connection pool
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(config.database_url())
            .await?;

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }

    // Project operations

    pub async fn load_projects(&self) -> Result<Vec<Project>> {
        let projects = sqlx::query_as::<_, Project>(
            "SELECT * FROM projects ORDER BY created_at DESC",
        )
        .fetch_all(self.get_pool())
        .await?;

        Ok(projects)
    }

    pub async fn get_project(&self, id: i32) -> Result<Project> {
        let project = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_one(self.get_pool())
            .await?;

        Ok(project)
    }

    /// Insert a project and return the stored row, so callers reconcile
    /// against what the backend actually persisted.
    pub async fn create_project(&self, project: &Project) -> Result<Project> {
        let created = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, description, status, start_date, end_date, budget)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.status)
        .bind(project.start_date)
        .bind(project.end_date)
        .bind(project.budget)
        .fetch_one(self.get_pool())
        .await?;

        tracing::debug!(id = created.id, "project created");
        Ok(created)
    }

    pub async fn update_project(&self, project: &Project) -> Result<Project> {
        let updated = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET name = $1, description = $2, status = $3,
                start_date = $4, end_date = $5, budget = $6
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.status)
        .bind(project.start_date)
        .bind(project.end_date)
        .bind(project.budget)
        .bind(project.id)
        .fetch_one(self.get_pool())
        .await?;

        Ok(updated)
    }

    pub async fn delete_project(&self, id: i32) -> Result<()> {
        // Payments reference projects with ON DELETE CASCADE
        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        tracing::debug!(id, "project deleted");
        Ok(())
    }

    // Payment operations

    pub async fn load_payments(&self) -> Result<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT p.*, pr.name AS project_name
            FROM payments p
            JOIN projects pr ON pr.id = p.project_id
            ORDER BY p.due_date ASC, p.id ASC
            "#,
        )
        .fetch_all(self.get_pool())
        .await?;

        Ok(payments)
    }

    pub async fn get_payment(&self, id: i32) -> Result<Payment> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            SELECT p.*, pr.name AS project_name
            FROM payments p
            JOIN projects pr ON pr.id = p.project_id
            WHERE p.id = $1
            "#,
        )
        .bind(id)
        .fetch_one(self.get_pool())
        .await?;

        Ok(payment)
    }

    pub async fn create_payment(&self, payment: &Payment) -> Result<Payment> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO payments (project_id, amount, installment_number, total_installments,
                                  due_date, paid_date, status, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(payment.project_id)
        .bind(payment.amount)
        .bind(payment.installment_number)
        .bind(payment.total_installments)
        .bind(payment.due_date)
        .bind(payment.paid_date)
        .bind(payment.status)
        .bind(&payment.description)
        .fetch_one(self.get_pool())
        .await?;

        tracing::debug!(id, "payment created");
        // Re-read through the join so the project name is filled in
        self.get_payment(id).await
    }

    pub async fn update_payment(&self, payment: &Payment) -> Result<Payment> {
        sqlx::query(
            r#"
            UPDATE payments
            SET project_id = $1, amount = $2, installment_number = $3, total_installments = $4,
                due_date = $5, paid_date = $6, status = $7, description = $8
            WHERE id = $9
            "#,
        )
        .bind(payment.project_id)
        .bind(payment.amount)
        .bind(payment.installment_number)
        .bind(payment.total_installments)
        .bind(payment.due_date)
        .bind(payment.paid_date)
        .bind(payment.status)
        .bind(&payment.description)
        .bind(payment.id)
        .execute(self.get_pool())
        .await?;

        self.get_payment(payment.id).await
    }

    pub async fn mark_payment_paid(&self, id: i32, paid_date: NaiveDate) -> Result<Payment> {
        sqlx::query("UPDATE payments SET status = $1, paid_date = $2 WHERE id = $3")
            .bind(PaymentStatus::Paid)
            .bind(paid_date)
            .bind(id)
            .execute(self.get_pool())
            .await?;

        tracing::debug!(id, "payment marked paid");
        self.get_payment(id).await
    }

    pub async fn delete_payment(&self, id: i32) -> Result<()> {
        sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        tracing::debug!(id, "payment deleted");
        Ok(())
    }

    // User operations

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(self.get_pool())
            .await?;

        Ok(user)
    }

    pub async fn create_user(&self, email: &str, hash: &str, salt: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, password_salt)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(hash)
        .bind(salt)
        .fetch_one(self.get_pool())
        .await?;

        Ok(user)
    }
}

/// Initialize the database connection pool and bring the schema up to date
pub async fn init(config: &Config) -> Result<Database> {
    let db = Database::new(config).await?;

    sqlx::migrate!().run(db.get_pool()).await?;

    Ok(db)
}
