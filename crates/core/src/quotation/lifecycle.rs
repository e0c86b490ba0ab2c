//! Quotation state machine.
//!
//! Transitions apply to a single row:
//!
//! ```text
//! Draft --send--> Sent --lock--> Confirmed(locked)
//! Draft --lock--> Confirmed(locked)
//! Sent  --revise--> [new row: Revised]
//! any unlocked --update--> same status, recomputed totals
//! locked --update/revise--> Locked error
//! ```

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::error::QuotationError;
use super::types::{Quotation, QuotationItems, QuotationStatus, QuotationTotals};

/// Stateless quotation transition rules.
pub struct QuotationLifecycle;

impl QuotationLifecycle {
    /// Reject any mutation of a locked row.
    ///
    /// # Errors
    ///
    /// Returns `Locked` if the row is locked.
    pub fn ensure_mutable(quotation: &Quotation) -> Result<(), QuotationError> {
        if quotation.locked {
            return Err(QuotationError::Locked(quotation.id));
        }
        Ok(())
    }

    /// Mark a quotation as sent.
    ///
    /// No status guard: re-sending is allowed and restamps `sent_at`. A
    /// locked row only records the delivery and stays `Confirmed`.
    pub fn send(quotation: &mut Quotation, sent_to: String, now: DateTime<Utc>) {
        if !quotation.locked {
            quotation.status = QuotationStatus::Sent;
        }
        quotation.sent_to = Some(sent_to);
        quotation.sent_at = Some(now);
        quotation.updated_at = now;
    }

    /// Lock a quotation from any status.
    ///
    /// Returns false if the row was already locked; it is left untouched.
    pub fn lock(quotation: &mut Quotation, now: DateTime<Utc>) -> bool {
        if quotation.locked {
            return false;
        }
        quotation.status = QuotationStatus::Confirmed;
        quotation.locked = true;
        quotation.locked_at = Some(now);
        quotation.updated_at = now;
        true
    }

    /// Replace the content of an unlocked row in place.
    ///
    /// Version and status are unchanged. `remarks: None` keeps the prior remarks.
    ///
    /// # Errors
    ///
    /// Returns `Locked` if the row is locked.
    pub fn update(
        quotation: &mut Quotation,
        items: QuotationItems,
        totals: QuotationTotals,
        remarks: Option<String>,
        updated_by: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<(), QuotationError> {
        Self::ensure_mutable(quotation)?;

        quotation.items = items;
        quotation.totals = totals;
        if remarks.is_some() {
            quotation.remarks = remarks;
        }
        quotation.updated_by = updated_by;
        quotation.updated_at = now;
        Ok(())
    }

    /// Build the next row of a lineage from an unlocked prior version.
    ///
    /// Project, estimate version, creator, and document reference carry
    /// forward. The new row starts unlocked with status `Revised`.
    pub fn revision(
        prior: &Quotation,
        version: i32,
        items: QuotationItems,
        totals: QuotationTotals,
        remarks: Option<String>,
        updated_by: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<Quotation, QuotationError> {
        Self::ensure_mutable(prior)?;

        Ok(Quotation {
            id: Uuid::now_v7(),
            project_id: prior.project_id,
            estimate_version: prior.estimate_version,
            version,
            status: QuotationStatus::Revised,
            locked: false,
            remarks: remarks.or_else(|| prior.remarks.clone()),
            items,
            totals,
            artifact_url: prior.artifact_url.clone(),
            sent_to: None,
            sent_at: None,
            locked_at: None,
            created_by: prior.created_by,
            updated_by,
            created_at: now,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn draft() -> Quotation {
        let now = Utc::now();
        Quotation {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            estimate_version: 1,
            version: 1,
            status: QuotationStatus::Draft,
            locked: false,
            remarks: Some("initial".to_string()),
            items: QuotationItems::default(),
            totals: QuotationTotals::default(),
            artifact_url: Some("https://files.test/q1.txt".to_string()),
            sent_to: None,
            sent_at: None,
            locked_at: None,
            created_by: Some(Uuid::new_v4()),
            updated_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_lock_from_draft_confirms() {
        let mut q = draft();
        assert!(QuotationLifecycle::lock(&mut q, Utc::now()));
        assert_eq!(q.status, QuotationStatus::Confirmed);
        assert!(q.locked);
        assert!(q.locked_at.is_some());
    }

    #[test]
    fn test_relock_is_noop() {
        let mut q = draft();
        QuotationLifecycle::lock(&mut q, Utc::now());
        let snapshot = q.clone();

        assert!(!QuotationLifecycle::lock(&mut q, Utc::now()));
        assert_eq!(q, snapshot);
    }

    #[test]
    fn test_send_twice_restamps() {
        let mut q = draft();
        let first = Utc::now();
        QuotationLifecycle::send(&mut q, "client@acme.test".to_string(), first);
        let second = first + chrono::Duration::seconds(5);
        QuotationLifecycle::send(&mut q, "client@acme.test".to_string(), second);

        assert_eq!(q.status, QuotationStatus::Sent);
        assert_eq!(q.sent_at, Some(second));
    }

    #[test]
    fn test_send_on_locked_keeps_confirmed() {
        let mut q = draft();
        QuotationLifecycle::lock(&mut q, Utc::now());
        QuotationLifecycle::send(&mut q, "ops@acme.test".to_string(), Utc::now());

        assert_eq!(q.status, QuotationStatus::Confirmed);
        assert!(q.locked);
        assert_eq!(q.sent_to.as_deref(), Some("ops@acme.test"));
    }

    #[test]
    fn test_update_locked_fails() {
        let mut q = draft();
        QuotationLifecycle::lock(&mut q, Utc::now());
        let snapshot = q.clone();

        let result = QuotationLifecycle::update(
            &mut q,
            QuotationItems::default(),
            QuotationTotals {
                subtotal: dec!(1),
                total_contingency: dec!(0),
                total_tax: dec!(0),
                grand_total: dec!(1),
            },
            None,
            None,
            Utc::now(),
        );

        assert!(matches!(result, Err(QuotationError::Locked(_))));
        assert_eq!(q, snapshot);
    }

    #[test]
    fn test_update_keeps_remarks_when_omitted() {
        let mut q = draft();
        QuotationLifecycle::update(
            &mut q,
            QuotationItems::default(),
            QuotationTotals::default(),
            None,
            None,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(q.remarks.as_deref(), Some("initial"));
        assert_eq!(q.status, QuotationStatus::Draft);
        assert_eq!(q.version, 1);
    }

    #[test]
    fn test_revision_carries_lineage() {
        let mut prior = draft();
        QuotationLifecycle::send(&mut prior, "client@acme.test".to_string(), Utc::now());
        let editor = Uuid::new_v4();

        let next = QuotationLifecycle::revision(
            &prior,
            2,
            QuotationItems::default(),
            QuotationTotals::default(),
            Some("v2".to_string()),
            Some(editor),
            Utc::now(),
        )
        .unwrap();

        assert_ne!(next.id, prior.id);
        assert_eq!(next.project_id, prior.project_id);
        assert_eq!(next.estimate_version, prior.estimate_version);
        assert_eq!(next.created_by, prior.created_by);
        assert_eq!(next.artifact_url, prior.artifact_url);
        assert_eq!(next.version, 2);
        assert_eq!(next.status, QuotationStatus::Revised);
        assert!(!next.locked);
        assert!(next.sent_at.is_none());
        assert_eq!(next.updated_by, Some(editor));
    }

    #[test]
    fn test_revision_of_locked_fails() {
        let mut prior = draft();
        QuotationLifecycle::lock(&mut prior, Utc::now());

        let result = QuotationLifecycle::revision(
            &prior,
            2,
            QuotationItems::default(),
            QuotationTotals::default(),
            None,
            None,
            Utc::now(),
        );
        assert!(matches!(result, Err(QuotationError::Locked(_))));
    }
}
