use serde::{Deserialize, Serialize};

use super::stay::StayRange;
use crate::error::{Error, Result};
use crate::models::{Payment, Renting};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RentingStatus {
    Active,
    Completed,
    Cancelled,
}

impl RentingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RentingStatus::Active => "Active",
            RentingStatus::Completed => "Completed",
            RentingStatus::Cancelled => "Cancelled",
        }
    }

    /// Only an active renting holds its room; a completed or cancelled
    /// stay frees it.
    pub fn blocks_room(self) -> bool {
        matches!(self, RentingStatus::Active)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    CreditCard,
    DebitCard,
}

impl Renting {
    pub fn stay(&self) -> StayRange {
        StayRange {
            check_in: self.check_in_date,
            check_out: self.check_out_date,
        }
    }

    /// Settle the stay. Zero is a valid amount (comped stay); anything
    /// negative is rejected before any state changes.
    pub fn close(&mut self, amount: f64, method: PaymentMethod) -> Result<Payment> {
        if self.status != RentingStatus::Active {
            return Err(Error::InvalidTransition {
                entity: "renting",
                from: self.status.as_str(),
                to: RentingStatus::Completed.as_str(),
            });
        }
        if amount < 0.0 {
            return Err(Error::Validation(format!(
                "payment amount cannot be negative: {amount}"
            )));
        }
        self.status = RentingStatus::Completed;
        Ok(Payment {
            renting_id: self.renting_id,
            amount,
            method,
        })
    }

    pub fn cancel(&mut self) -> Result<()> {
        if self.status != RentingStatus::Active {
            return Err(Error::InvalidTransition {
                entity: "renting",
                from: self.status.as_str(),
                to: RentingStatus::Cancelled.as_str(),
            });
        }
        self.status = RentingStatus::Cancelled;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{PaymentMethod, RentingStatus};
    use crate::error::Error;
    use crate::models::Renting;

    fn renting(status: RentingStatus) -> Renting {
        Renting {
            renting_id: 9,
            customer_id: 1,
            room_id: 2833,
            employee_id: 4,
            check_in_date: NaiveDate::from_ymd_opt(2025, 5, 10).unwrap(),
            check_out_date: NaiveDate::from_ymd_opt(2025, 5, 12).unwrap(),
            status,
            source_booking: None,
        }
    }

    #[test]
    fn close_rejects_negative_amount() {
        let mut active = renting(RentingStatus::Active);
        let error = active.close(-5.0, PaymentMethod::Cash).unwrap_err();
        assert!(matches!(error, Error::Validation(_)));
        // Guard fires before any state change.
        assert_eq!(active.status, RentingStatus::Active);
    }

    #[test]
    fn comped_stay_closes_at_zero() {
        let mut active = renting(RentingStatus::Active);
        let payment = active.close(0.0, PaymentMethod::CreditCard).unwrap();
        assert_eq!(active.status, RentingStatus::Completed);
        assert_eq!(payment.amount, 0.0);
        assert_eq!(payment.renting_id, 9);
    }

    #[test]
    fn completed_renting_cannot_be_cancelled() {
        let mut completed = renting(RentingStatus::Completed);
        assert!(matches!(
            completed.cancel(),
            Err(Error::InvalidTransition {
                entity: "renting",
                from: "Completed",
                to: "Cancelled",
            })
        ));
    }

    #[test]
    fn double_close_is_invalid() {
        let mut active = renting(RentingStatus::Active);
        active.close(120.0, PaymentMethod::DebitCard).unwrap();
        assert!(matches!(
            active.close(120.0, PaymentMethod::DebitCard),
            Err(Error::InvalidTransition { .. })
        ));
    }
}
