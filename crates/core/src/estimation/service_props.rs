//! Property-based tests for estimation versioning.
//!
//! - Versions per project are contiguous from 1
//! - `estimate_created` is raised by the first estimate and never cleared

use std::sync::Arc;

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::service::EstimationService;
use super::types::CreateEstimationInput;
use crate::testing::{MemoryLedger, block_on, seed_project};

fn cost() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn cost_rows() -> impl Strategy<Value = Vec<(Decimal, Decimal, Decimal, Decimal)>> {
    prop::collection::vec((cost(), cost(), cost(), cost()), 1..12)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// *For any* sequence of estimate requests on one project, the stored
    /// versions are exactly `1..=n` and the latest is `n`.
    #[test]
    fn prop_versions_are_contiguous(rows in cost_rows()) {
        let ledger = Arc::new(MemoryLedger::new());
        let project = seed_project(&ledger, "PRJ-P1");
        let service = EstimationService::new(ledger.clone(), ledger.clone());

        let (versions, latest, flag) = block_on(async {
            let mut flags = Vec::new();
            for (labor, material, service_cost, contingency) in &rows {
                service
                    .create_or_update_estimate(CreateEstimationInput {
                        project_ref: "PRJ-P1".to_string(),
                        labor_cost: *labor,
                        material_cost: *material,
                        service_cost: *service_cost,
                        contingency_cost: *contingency,
                        notes: None,
                        created_by: None,
                    })
                    .await
                    .unwrap();
                flags.push(ledger.project(project.id).estimate_created);
            }
            let versions: Vec<i32> = service
                .get_estimates_by_project("PRJ-P1")
                .await
                .unwrap()
                .iter()
                .map(|e| e.version)
                .collect();
            let latest = service.get_latest_estimate("PRJ-P1").await.unwrap();
            (versions, latest, flags)
        });

        let expected: Vec<i32> = (1..=i32::try_from(rows.len()).unwrap()).collect();
        prop_assert_eq!(&versions, &expected);
        prop_assert_eq!(latest.map(|e| e.version), expected.last().copied());
        prop_assert!(flag.iter().all(|f| *f));
    }

    /// *For any* estimate, `total_cost` equals the sum of its four budgets.
    #[test]
    fn prop_total_cost_is_sum(
        labor in cost(),
        material in cost(),
        service_cost in cost(),
        contingency in cost(),
    ) {
        let ledger = Arc::new(MemoryLedger::new());
        seed_project(&ledger, "PRJ-P2");
        let service = EstimationService::new(ledger.clone(), ledger.clone());

        let estimation = block_on(service.create_or_update_estimate(CreateEstimationInput {
            project_ref: "PRJ-P2".to_string(),
            labor_cost: labor,
            material_cost: material,
            service_cost,
            contingency_cost: contingency,
            notes: None,
            created_by: None,
        }))
        .unwrap();

        prop_assert_eq!(
            estimation.total_cost,
            labor + material + service_cost + contingency
        );
    }
}
