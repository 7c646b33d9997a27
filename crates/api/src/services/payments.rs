//! Payment service.

use rust_decimal::Decimal;
use sqlx::PgPool;

use ferremas_core::{Amount, PaymentId, PaymentTypeId, Rut};

use crate::db::RepositoryError;
use crate::db::payments::PaymentRepository;
use crate::models::payment::NewPayment;

/// Message for a payment type outside the fixed range.
pub const INVALID_PAYMENT_TYPE: &str = "ID de tipo de pago inválido";

/// Payment registration service.
pub struct PaymentService<'a> {
    payments: PaymentRepository<'a>,
}

impl<'a> PaymentService<'a> {
    /// Create a new payment service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            payments: PaymentRepository::new(pool),
        }
    }

    /// Register a payment.
    ///
    /// Amount and payment type range are checked before the database is
    /// touched; payer and type existence are checked in the insert's
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for a non-positive amount or a
    /// payment type outside 1 to 3.
    /// Returns `RepositoryError::InvalidReference` if the user or payment type
    /// does not exist.
    pub async fn register(
        &self,
        rut_usuario: Rut,
        id_tipo_pago: PaymentTypeId,
        monto: Decimal,
    ) -> Result<PaymentId, RepositoryError> {
        let payment = validate_payment(rut_usuario, id_tipo_pago, monto)?;

        let id = self.payments.create(&payment).await?;
        tracing::info!(
            payment_id = %id,
            rut = %payment.rut_usuario,
            monto = %payment.monto,
            "Payment registered"
        );
        Ok(id)
    }
}

fn validate_payment(
    rut_usuario: Rut,
    id_tipo_pago: PaymentTypeId,
    monto: Decimal,
) -> Result<NewPayment, RepositoryError> {
    let monto = Amount::new(monto).map_err(|e| RepositoryError::Validation(e.to_string()))?;

    if !id_tipo_pago.is_known() {
        return Err(RepositoryError::Validation(INVALID_PAYMENT_TYPE.to_owned()));
    }

    Ok(NewPayment {
        rut_usuario,
        id_tipo_pago,
        monto,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rut() -> Rut {
        Rut::parse("11111111-1").unwrap()
    }

    #[test]
    fn test_amount_must_be_positive() {
        for monto in [Decimal::ZERO, Decimal::new(-500, 0)] {
            let err = validate_payment(rut(), PaymentTypeId::new(1), monto).unwrap_err();
            assert!(
                matches!(err, RepositoryError::Validation(ref msg) if msg == "El monto debe ser mayor a cero")
            );
        }
    }

    #[test]
    fn test_payment_type_range() {
        for id in [0, 4, -1] {
            let err = validate_payment(rut(), PaymentTypeId::new(id), Decimal::new(1000, 0))
                .unwrap_err();
            assert!(matches!(err, RepositoryError::Validation(ref msg) if msg == INVALID_PAYMENT_TYPE));
        }

        let ok = validate_payment(rut(), PaymentTypeId::new(3), Decimal::new(1999, 2)).unwrap();
        assert_eq!(ok.monto.value(), Decimal::new(1999, 2));
    }

    #[test]
    fn test_amount_beyond_column_precision() {
        let err = validate_payment(rut(), PaymentTypeId::new(1), Decimal::new(9_999_999_999_999, 2))
            .unwrap_err();
        assert!(
            matches!(err, RepositoryError::Validation(ref msg) if msg == "El monto debe ser menor a 10000000000")
        );
    }

    #[test]
    fn test_amount_checked_before_type() {
        let err = validate_payment(rut(), PaymentTypeId::new(9), Decimal::ZERO).unwrap_err();
        assert!(
            matches!(err, RepositoryError::Validation(ref msg) if msg == "El monto debe ser mayor a cero")
        );
    }
}
