//! Property-based tests for the quotation engine.
//!
//! - `grand_total == subtotal + total_contingency + total_tax` after every write
//! - Locked rows refuse update and revise and stay unchanged
//! - Versions within a lineage are `1..=n` with no duplicates

use std::sync::Arc;

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use super::error::QuotationError;
use super::service::QuotationService;
use super::types::{
    ContingencyItem, CreateQuotationInput, LaborItem, MaterialItem, Quotation,
    QuotationContentInput, QuotationItems, ServiceItem, TaxItem,
};
use crate::testing::{
    MemoryLedger, StubArtifacts, StubCatalog, block_on, seed_estimation, seed_project,
};

type Service =
    QuotationService<MemoryLedger, MemoryLedger, MemoryLedger, StubArtifacts, StubCatalog>;

fn money() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn quantity() -> impl Strategy<Value = Decimal> {
    (0i64..100_000i64).prop_map(|v| Decimal::new(v, 1))
}

fn items() -> impl Strategy<Value = QuotationItems> {
    (
        prop::collection::vec((quantity(), money()), 0..4),
        prop::collection::vec((quantity(), money()), 0..4),
        prop::collection::vec(money(), 0..3),
        prop::collection::vec(money(), 0..3),
        prop::collection::vec((prop::option::of(0i64..2500i64), money()), 0..3),
    )
        .prop_map(|(labor, material, service, contingency, tax)| QuotationItems {
            labor_items: labor
                .into_iter()
                .map(|(hours, rate)| LaborItem {
                    task: "Task".to_string(),
                    hours,
                    rate,
                    total: Decimal::ZERO,
                })
                .collect(),
            material_items: material
                .into_iter()
                .map(|(quantity, unit_price)| MaterialItem {
                    material_id: None,
                    description: "Material".to_string(),
                    quantity,
                    unit_price,
                    total: Decimal::ZERO,
                })
                .collect(),
            service_items: service
                .into_iter()
                .map(|cost| ServiceItem {
                    service: "Service".to_string(),
                    cost,
                })
                .collect(),
            contingency_items: contingency
                .into_iter()
                .map(|amount| ContingencyItem {
                    description: "Buffer".to_string(),
                    amount,
                })
                .collect(),
            tax_items: tax
                .into_iter()
                .map(|(pct, amount)| TaxItem {
                    description: "Tax".to_string(),
                    percentage: pct.map(|p| Decimal::new(p, 2)),
                    amount,
                })
                .collect(),
        })
}

fn setup() -> (Arc<MemoryLedger>, Service) {
    let ledger = Arc::new(MemoryLedger::new());
    let project = seed_project(&ledger, "PRJ-QP");
    seed_estimation(&ledger, project.id, 1, dec!(1000));
    let service = QuotationService::new(
        ledger.clone(),
        ledger.clone(),
        ledger.clone(),
        Arc::new(StubArtifacts::ok()),
        Arc::new(StubCatalog::default()),
    );
    (ledger, service)
}

fn create(service: &Service, items: QuotationItems) -> Quotation {
    block_on(service.create_quotation(CreateQuotationInput {
        project_ref: "PRJ-QP".to_string(),
        estimate_version: None,
        items,
        remarks: None,
        created_by: Some(Uuid::nil()),
    }))
    .unwrap()
}

fn assert_balanced(q: &Quotation) -> Result<(), TestCaseError> {
    prop_assert_eq!(
        q.totals.grand_total,
        q.totals.subtotal + q.totals.total_contingency + q.totals.total_tax
    );
    let lines: Decimal = q.items.labor_items.iter().map(|i| i.total).sum::<Decimal>()
        + q.items.material_items.iter().map(|i| i.total).sum::<Decimal>()
        + q.items.service_items.iter().map(|i| i.cost).sum::<Decimal>();
    prop_assert_eq!(q.totals.subtotal, lines);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// *For any* items, create, update, and revise all leave the totals balanced.
    #[test]
    fn prop_grand_total_balances(first in items(), second in items(), third in items()) {
        let (_ledger, service) = setup();

        let created = create(&service, first);
        assert_balanced(&created)?;

        let updated = block_on(service.update_quotation(
            created.id,
            QuotationContentInput { items: second, ..QuotationContentInput::default() },
        ))
        .unwrap();
        assert_balanced(&updated)?;

        let revised = block_on(service.revise_quotation(
            created.id,
            QuotationContentInput { items: third, ..QuotationContentInput::default() },
        ))
        .unwrap();
        assert_balanced(&revised)?;
    }

    /// *For any* locked quotation, update and revise fail with `Locked`
    /// and the stored row is unchanged.
    #[test]
    fn prop_locked_is_immutable(first in items(), edit in items()) {
        let (_ledger, service) = setup();
        let created = create(&service, first);
        let locked = block_on(service.lock_quotation(created.id)).unwrap();

        let update = block_on(service.update_quotation(
            created.id,
            QuotationContentInput { items: edit.clone(), ..QuotationContentInput::default() },
        ));
        let revise = block_on(service.revise_quotation(
            created.id,
            QuotationContentInput { items: edit, ..QuotationContentInput::default() },
        ));

        prop_assert!(matches!(update, Err(QuotationError::Locked(_))));
        prop_assert!(matches!(revise, Err(QuotationError::Locked(_))));
        prop_assert_eq!(block_on(service.get_quotation(created.id)).unwrap(), locked);
    }

    /// *For any* mix of creates and revisions of the latest row, versions
    /// are `1..=n` and revision of N yields N+1 with identical lineage fields.
    #[test]
    fn prop_versions_contiguous(ops in prop::collection::vec(any::<bool>(), 1..10)) {
        let (_ledger, service) = setup();
        let mut latest = create(&service, QuotationItems::default());

        for revise in ops {
            let next = if revise {
                block_on(service.revise_quotation(latest.id, QuotationContentInput::default()))
                    .unwrap()
            } else {
                create(&service, QuotationItems::default())
            };
            prop_assert_eq!(next.version, latest.version + 1);
            if revise {
                prop_assert_eq!(next.project_id, latest.project_id);
                prop_assert_eq!(next.estimate_version, latest.estimate_version);
                prop_assert_eq!(next.created_by, latest.created_by);
                let prior = block_on(service.get_quotation(latest.id)).unwrap();
                prop_assert_eq!(prior, latest);
            }
            latest = next;
        }

        let versions: Vec<i32> = block_on(service.get_quotation_versions("PRJ-QP", Some(1), None))
            .unwrap()
            .iter()
            .map(|q| q.version)
            .collect();
        let expected: Vec<i32> = (1..=latest.version).collect();
        prop_assert_eq!(versions, expected);
    }
}
