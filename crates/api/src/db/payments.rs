//! Payment repository.

use sqlx::PgPool;

use ferremas_core::{PaymentId, Rut};

use super::RepositoryError;
use crate::models::payment::{NewPayment, PaymentListing, PaymentType, UserPayment};

/// Repository for payment database operations.
pub struct PaymentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PaymentRepository<'a> {
    /// Create a new payment repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every payment with payer name and type description, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<PaymentListing>, RepositoryError> {
        let payments = sqlx::query_as::<_, PaymentListing>(
            r"
            SELECT p.id_pago, p.rut_usuario, u.nombre, u.apellido,
                   p.id_tipo_pago, tp.descripcion AS tipo_pago, p.monto, p.fecha_pago
            FROM ferremas.pago p
            JOIN ferremas.usuario u ON u.rut = p.rut_usuario
            JOIN ferremas.tipo_pago tp ON tp.id_tipo_pago = p.id_tipo_pago
            ORDER BY p.fecha_pago DESC, p.id_pago DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(payments)
    }

    /// List a user's payments, newest first.
    ///
    /// An empty result means the user has no payments (or doesn't exist).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_user(&self, rut: &Rut) -> Result<Vec<UserPayment>, RepositoryError> {
        let payments = sqlx::query_as::<_, UserPayment>(
            r"
            SELECT p.id_pago, p.id_tipo_pago, tp.descripcion AS tipo_pago, p.monto, p.fecha_pago
            FROM ferremas.pago p
            JOIN ferremas.tipo_pago tp ON tp.id_tipo_pago = p.id_tipo_pago
            WHERE p.rut_usuario = $1
            ORDER BY p.fecha_pago DESC, p.id_pago DESC
            ",
        )
        .bind(rut)
        .fetch_all(self.pool)
        .await?;

        Ok(payments)
    }

    /// Insert a payment after checking the payer and payment type exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the user or the payment
    /// type does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, payment: &NewPayment) -> Result<PaymentId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let user_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM ferremas.usuario WHERE rut = $1)",
        )
        .bind(&payment.rut_usuario)
        .fetch_one(&mut *tx)
        .await?;
        if !user_exists {
            return Err(RepositoryError::InvalidReference(
                "Usuario no encontrado".to_owned(),
            ));
        }

        let type_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM ferremas.tipo_pago WHERE id_tipo_pago = $1)",
        )
        .bind(payment.id_tipo_pago)
        .fetch_one(&mut *tx)
        .await?;
        if !type_exists {
            return Err(RepositoryError::InvalidReference(
                "Tipo de pago no válido".to_owned(),
            ));
        }

        let id = sqlx::query_scalar::<_, PaymentId>(
            r"
            INSERT INTO ferremas.pago (rut_usuario, id_tipo_pago, monto)
            VALUES ($1, $2, $3)
            RETURNING id_pago
            ",
        )
        .bind(&payment.rut_usuario)
        .bind(payment.id_tipo_pago)
        .bind(payment.monto.value())
        .fetch_one(&mut *tx)
        .await
        .map_err(RepositoryError::from_write)?;

        tx.commit().await?;

        Ok(id)
    }

    /// Delete a payment by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the payment doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: PaymentId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM ferremas.pago WHERE id_pago = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// List the payment types.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_types(&self) -> Result<Vec<PaymentType>, RepositoryError> {
        let types = sqlx::query_as::<_, PaymentType>(
            "SELECT id_tipo_pago, descripcion FROM ferremas.tipo_pago ORDER BY id_tipo_pago",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(types)
    }
}
