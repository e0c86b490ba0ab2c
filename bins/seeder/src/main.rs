//! Database seeder for Estimo development and testing.
//!
//! Seeds the material catalog, a demo project, and its first estimation so
//! quotations and expenses can be exercised locally.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use estimo_core::estimation::{CreateEstimationInput, EstimationService};
use estimo_core::project::{CreateProjectInput, ProjectError, ProjectService};
use estimo_db::entities::materials;
use estimo_db::{EstimationRepository, ProjectRepository};
use estimo_shared::AppConfig;

/// Demo project business key.
const DEMO_PROJECT_CODE: &str = "DEMO-001";
/// Demo project manager (consistent for all seeds).
const DEMO_MANAGER_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0002);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    println!("Connecting to database...");
    let db = estimo_db::connect_with_config(&config.database).await?;

    println!("Seeding material catalog...");
    seed_materials(&db).await;

    println!("Seeding demo project...");
    seed_demo_project(&db).await?;

    println!("Seeding complete!");
    Ok(())
}

/// Seeds catalog materials with fixed ids so quotation items can reference them.
async fn seed_materials(db: &DatabaseConnection) {
    let catalog: [(u128, &str, &str, Decimal); 5] = [
        (0x0100, "Portland cement 50kg", "bag", dec!(68000)),
        (0x0101, "Reinforcing steel 10mm", "rod", dec!(92500)),
        (0x0102, "Red brick", "piece", dec!(850)),
        (0x0103, "River sand", "m3", dec!(275000)),
        (0x0104, "Ceramic tile 40x40", "m2", dec!(115000)),
    ];

    for (id, name, unit, unit_price) in catalog {
        let id = Uuid::from_u128(id);
        if materials::Entity::find_by_id(id)
            .one(db)
            .await
            .ok()
            .flatten()
            .is_some()
        {
            println!("  Material {name} already exists, skipping...");
            continue;
        }

        let material = materials::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            unit: Set(Some(unit.to_string())),
            unit_price: Set(Some(unit_price)),
            created_at: Set(Utc::now().into()),
        };

        if let Err(e) = material.insert(db).await {
            eprintln!("Failed to insert material {name}: {e}");
        } else {
            println!("  Created material: {name}");
        }
    }
}

/// Seeds the demo project and its first estimation version.
async fn seed_demo_project(db: &DatabaseConnection) -> anyhow::Result<()> {
    let projects = Arc::new(ProjectRepository::new(db.clone()));
    let project_service = ProjectService::new(projects.clone());

    let project = match project_service
        .create(CreateProjectInput {
            code: DEMO_PROJECT_CODE.to_string(),
            name: "Demo Warehouse Renovation".to_string(),
            status: None,
            manager_id: Some(DEMO_MANAGER_ID),
            client_name: Some("Demo Client".to_string()),
        })
        .await
    {
        Ok(project) => project,
        Err(ProjectError::DuplicateCode(_)) => {
            println!("  Demo project already exists, skipping...");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    println!("  Created project: {}", project.code);

    let estimations = EstimationService::new(Arc::new(EstimationRepository::new(db.clone())), projects);
    let estimation = estimations
        .create_or_update_estimate(CreateEstimationInput {
            project_ref: project.code.clone(),
            labor_cost: dec!(120000000),
            material_cost: dec!(240000000),
            service_cost: dec!(35000000),
            contingency_cost: dec!(20000000),
            notes: Some("Initial baseline".to_string()),
            created_by: Some(DEMO_MANAGER_ID),
        })
        .await?;
    println!(
        "  Created estimation v{} (total {})",
        estimation.version, estimation.total_cost
    );

    Ok(())
}
