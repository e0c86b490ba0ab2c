//! In-memory collaborators for unit and property tests.
//!
//! `MemoryLedger` implements every repository trait over `Mutex<HashMap>`
//! and enforces the same uniqueness keys as the database.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use crate::artifact::{ArtifactError, ArtifactGenerator, artifact_key};
use crate::catalog::{CatalogError, MaterialCatalog};
use crate::estimation::{
    EstimationError, EstimationFilter, EstimationRepository, EstimationStatus, Estimation,
};
use crate::finance::{FinanceError, FinanceLedger, FinanceSummary};
use crate::notification::{Notification, NotificationError, Notifier};
use crate::project::{Project, ProjectDirectory, ProjectError, ProjectStatus};
use crate::quotation::{
    LaborItem, MaterialItem, Quotation, QuotationError, QuotationFilter, QuotationItems,
    QuotationLifecycle, QuotationRepository, QuotationStatus, price_items,
};
use crate::spend::{Expense, ExpenseCategory, ExpenseFilter, ExpenseRepository, SpendError};
use estimo_shared::types::PageRequest;

/// Drive a future to completion on a fresh current-thread runtime.
pub fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

#[derive(Default)]
struct State {
    projects: HashMap<Uuid, Project>,
    estimations: HashMap<Uuid, Estimation>,
    quotations: HashMap<Uuid, Quotation>,
    expenses: HashMap<Uuid, Expense>,
    summary: Option<FinanceSummary>,
}

/// In-memory ledger store.
#[derive(Default)]
pub struct MemoryLedger {
    state: Mutex<State>,
    pending_conflicts: AtomicU32,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` version inserts fail with a conflict.
    pub fn inject_conflicts(&self, n: u32) {
        self.pending_conflicts.store(n, Ordering::SeqCst);
    }

    fn take_conflict(&self) -> bool {
        self.pending_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    pub fn project(&self, id: Uuid) -> Project {
        self.state.lock().unwrap().projects[&id].clone()
    }

    pub fn project_by_code(&self, code: &str) -> Project {
        self.state
            .lock()
            .unwrap()
            .projects
            .values()
            .find(|p| p.code == code)
            .cloned()
            .unwrap()
    }

    pub fn estimations(&self) -> Vec<Estimation> {
        self.state
            .lock()
            .unwrap()
            .estimations
            .values()
            .cloned()
            .collect()
    }

    fn put_project(&self, project: Project) {
        self.state
            .lock()
            .unwrap()
            .projects
            .insert(project.id, project);
    }

    fn put_estimation(&self, estimation: Estimation) {
        let mut state = self.state.lock().unwrap();
        if let Some(project) = state.projects.get_mut(&estimation.project_id) {
            project.estimate_created = true;
        }
        state.estimations.insert(estimation.id, estimation);
    }
}

impl ProjectDirectory for MemoryLedger {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>, ProjectError> {
        Ok(self.state.lock().unwrap().projects.get(&id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Project>, ProjectError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .projects
            .values()
            .find(|p| p.code == code)
            .cloned())
    }

    async fn create(&self, project: Project) -> Result<Project, ProjectError> {
        let mut state = self.state.lock().unwrap();
        if state.projects.values().any(|p| p.code == project.code) {
            return Err(ProjectError::DuplicateCode(project.code));
        }
        state.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn list(&self) -> Result<Vec<Project>, ProjectError> {
        let mut projects: Vec<Project> =
            self.state.lock().unwrap().projects.values().cloned().collect();
        projects.sort_by_key(|p| p.created_at);
        Ok(projects)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ProjectStatus,
    ) -> Result<Option<Project>, ProjectError> {
        let mut state = self.state.lock().unwrap();
        Ok(state.projects.get_mut(&id).map(|p| {
            p.status = status;
            p.updated_at = Utc::now();
            p.clone()
        }))
    }
}

impl EstimationRepository for MemoryLedger {
    async fn latest_for_project(&self, project_id: Uuid) -> Result<Option<Estimation>, EstimationError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .estimations
            .values()
            .filter(|e| e.project_id == project_id)
            .max_by_key(|e| e.version)
            .cloned())
    }

    async fn find_by_version(
        &self,
        project_id: Uuid,
        version: i32,
    ) -> Result<Option<Estimation>, EstimationError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .estimations
            .values()
            .find(|e| e.project_id == project_id && e.version == version)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Estimation>, EstimationError> {
        Ok(self.state.lock().unwrap().estimations.get(&id).cloned())
    }

    async fn insert(
        &self,
        estimation: Estimation,
        first_for_project: bool,
    ) -> Result<Estimation, EstimationError> {
        let conflict = EstimationError::VersionConflict {
            project_id: estimation.project_id,
            version: estimation.version,
        };
        if self.take_conflict() {
            return Err(conflict);
        }

        let mut state = self.state.lock().unwrap();
        if state
            .estimations
            .values()
            .any(|e| e.project_id == estimation.project_id && e.version == estimation.version)
        {
            return Err(conflict);
        }
        if first_for_project {
            if let Some(project) = state.projects.get_mut(&estimation.project_id) {
                project.estimate_created = true;
            }
        }
        state.estimations.insert(estimation.id, estimation.clone());
        Ok(estimation)
    }

    async fn list(&self, filter: EstimationFilter) -> Result<Vec<Estimation>, EstimationError> {
        let mut estimations: Vec<Estimation> = self
            .state
            .lock()
            .unwrap()
            .estimations
            .values()
            .filter(|e| filter.project_id.is_none_or(|id| e.project_id == id))
            .filter(|e| filter.status.is_none_or(|s| e.status == s))
            .cloned()
            .collect();
        estimations.sort_by_key(|e| (e.created_at, e.version));
        Ok(estimations)
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: EstimationStatus,
        updated_at: chrono::DateTime<Utc>,
    ) -> Result<Option<Estimation>, EstimationError> {
        let mut state = self.state.lock().unwrap();
        Ok(state.estimations.get_mut(&id).map(|e| {
            e.status = status;
            e.updated_at = updated_at;
            e.clone()
        }))
    }
}

impl QuotationRepository for MemoryLedger {
    async fn latest_version(
        &self,
        project_id: Uuid,
        estimate_version: i32,
    ) -> Result<Option<i32>, QuotationError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .quotations
            .values()
            .filter(|q| q.project_id == project_id && q.estimate_version == estimate_version)
            .map(|q| q.version)
            .max())
    }

    async fn insert(&self, quotation: Quotation) -> Result<Quotation, QuotationError> {
        let conflict = QuotationError::VersionConflict {
            project_id: quotation.project_id,
            estimate_version: quotation.estimate_version,
            version: quotation.version,
        };
        if self.take_conflict() {
            return Err(conflict);
        }

        let mut state = self.state.lock().unwrap();
        if state.quotations.values().any(|q| {
            q.project_id == quotation.project_id
                && q.estimate_version == quotation.estimate_version
                && q.version == quotation.version
        }) {
            return Err(conflict);
        }
        state.quotations.insert(quotation.id, quotation.clone());
        Ok(quotation)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Quotation>, QuotationError> {
        Ok(self.state.lock().unwrap().quotations.get(&id).cloned())
    }

    async fn update_content(&self, quotation: Quotation) -> Result<Quotation, QuotationError> {
        let mut state = self.state.lock().unwrap();
        let stored = state
            .quotations
            .get_mut(&quotation.id)
            .ok_or(QuotationError::NotFound(quotation.id))?;
        QuotationLifecycle::ensure_mutable(stored)?;

        stored.items = quotation.items;
        stored.totals = quotation.totals;
        stored.remarks = quotation.remarks;
        stored.updated_by = quotation.updated_by;
        stored.updated_at = quotation.updated_at;
        Ok(stored.clone())
    }

    async fn mark_sent(
        &self,
        id: Uuid,
        sent_to: String,
        sent_at: DateTime<Utc>,
    ) -> Result<Quotation, QuotationError> {
        let mut state = self.state.lock().unwrap();
        let stored = state
            .quotations
            .get_mut(&id)
            .ok_or(QuotationError::NotFound(id))?;
        QuotationLifecycle::send(stored, sent_to, sent_at);
        Ok(stored.clone())
    }

    async fn lock(
        &self,
        id: Uuid,
        locked_at: DateTime<Utc>,
    ) -> Result<Option<Quotation>, QuotationError> {
        let mut state = self.state.lock().unwrap();
        let stored = state
            .quotations
            .get_mut(&id)
            .ok_or(QuotationError::NotFound(id))?;
        Ok(QuotationLifecycle::lock(stored, locked_at).then(|| stored.clone()))
    }

    async fn set_artifact_url(&self, id: Uuid, url: String) -> Result<bool, QuotationError> {
        let mut state = self.state.lock().unwrap();
        let stored = state
            .quotations
            .get_mut(&id)
            .ok_or(QuotationError::NotFound(id))?;
        if stored.locked {
            return Ok(false);
        }
        stored.artifact_url = Some(url);
        Ok(true)
    }

    async fn list(
        &self,
        filter: QuotationFilter,
        page: PageRequest,
    ) -> Result<(Vec<Quotation>, u64), QuotationError> {
        let mut matches: Vec<Quotation> = self
            .state
            .lock()
            .unwrap()
            .quotations
            .values()
            .filter(|q| filter.matches(q))
            .cloned()
            .collect();
        matches.sort_by(|a, b| (b.created_at, b.version).cmp(&(a.created_at, a.version)));

        let total = matches.len() as u64;
        let data = matches
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap())
            .take(usize::try_from(page.limit()).unwrap())
            .collect();
        Ok((data, total))
    }

    async fn list_versions(&self, filter: QuotationFilter) -> Result<Vec<Quotation>, QuotationError> {
        let mut matches: Vec<Quotation> = self
            .state
            .lock()
            .unwrap()
            .quotations
            .values()
            .filter(|q| filter.matches(q))
            .cloned()
            .collect();
        matches.sort_by_key(|q| (q.estimate_version, q.version));
        Ok(matches)
    }
}

impl ExpenseRepository for MemoryLedger {
    async fn insert(&self, expense: Expense) -> Result<Expense, SpendError> {
        self.state
            .lock()
            .unwrap()
            .expenses
            .insert(expense.id, expense.clone());
        Ok(expense)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Expense>, SpendError> {
        Ok(self.state.lock().unwrap().expenses.get(&id).cloned())
    }

    async fn update(&self, expense: Expense) -> Result<Expense, SpendError> {
        let mut state = self.state.lock().unwrap();
        let stored = state
            .expenses
            .get_mut(&expense.id)
            .ok_or(SpendError::NotFound(expense.id))?;
        *stored = expense.clone();
        Ok(expense)
    }

    async fn list(&self, filter: ExpenseFilter) -> Result<Vec<Expense>, SpendError> {
        let mut expenses: Vec<Expense> = self
            .state
            .lock()
            .unwrap()
            .expenses
            .values()
            .filter(|e| filter.project_id.is_none_or(|id| e.project_id == id))
            .filter(|e| filter.category.is_none_or(|c| e.category == c))
            .cloned()
            .collect();
        expenses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(expenses)
    }

    async fn totals_by_category(
        &self,
        project_id: Uuid,
    ) -> Result<HashMap<ExpenseCategory, Decimal>, SpendError> {
        let mut totals = HashMap::new();
        for expense in self
            .state
            .lock()
            .unwrap()
            .expenses
            .values()
            .filter(|e| e.project_id == project_id)
        {
            *totals.entry(expense.category).or_insert(Decimal::ZERO) += expense.amount;
        }
        Ok(totals)
    }
}

impl FinanceLedger for MemoryLedger {
    async fn summary(&self) -> Result<FinanceSummary, FinanceError> {
        let mut state = self.state.lock().unwrap();
        Ok(state
            .summary
            .get_or_insert_with(|| FinanceSummary {
                total_income: Decimal::ZERO,
                total_balance: Decimal::ZERO,
                updated_at: Utc::now(),
            })
            .clone())
    }

    async fn apply_delta(
        &self,
        income_delta: Decimal,
        balance_delta: Decimal,
    ) -> Result<FinanceSummary, FinanceError> {
        let mut state = self.state.lock().unwrap();
        let summary = state.summary.get_or_insert_with(|| FinanceSummary {
            total_income: Decimal::ZERO,
            total_balance: Decimal::ZERO,
            updated_at: Utc::now(),
        });
        summary.total_income += income_delta;
        summary.total_balance += balance_delta;
        summary.updated_at = Utc::now();
        Ok(summary.clone())
    }
}

/// Insert a project without a manager.
pub fn seed_project(ledger: &MemoryLedger, code: &str) -> Project {
    let mut project = sample_project();
    project.code = code.to_string();
    project.manager_id = None;
    ledger.put_project(project.clone());
    project
}

/// Insert a project managed by `manager_id`.
pub fn seed_project_with_manager(ledger: &MemoryLedger, code: &str, manager_id: Uuid) -> Project {
    let mut project = sample_project();
    project.code = code.to_string();
    project.manager_id = Some(manager_id);
    ledger.put_project(project.clone());
    project
}

/// Insert an estimation with `labor` as both labor and material budget.
pub fn seed_estimation(
    ledger: &MemoryLedger,
    project_id: Uuid,
    version: i32,
    labor: Decimal,
) -> Estimation {
    let estimation = sample_estimation(project_id, version, labor);
    ledger.put_estimation(estimation.clone());
    estimation
}

pub fn sample_project() -> Project {
    let now = Utc::now();
    Project {
        id: Uuid::new_v4(),
        code: "PRJ-2025-001".to_string(),
        name: "Plant expansion".to_string(),
        status: ProjectStatus::Active,
        manager_id: Some(Uuid::new_v4()),
        client_name: Some("Acme".to_string()),
        estimate_created: false,
        created_at: now,
        updated_at: now,
    }
}

/// Estimation with `labor` as both labor and material budget and no
/// service or contingency budget.
pub fn sample_estimation(project_id: Uuid, version: i32, labor: Decimal) -> Estimation {
    let now = Utc::now();
    Estimation {
        id: Uuid::new_v4(),
        project_id,
        version,
        labor_cost: labor,
        material_cost: labor,
        service_cost: Decimal::ZERO,
        contingency_cost: Decimal::ZERO,
        total_cost: labor + labor,
        status: EstimationStatus::Pending,
        notes: None,
        created_by: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn sample_expense(project_id: Uuid, amount: Decimal) -> Expense {
    let now = Utc::now();
    Expense {
        id: Uuid::new_v4(),
        project_id,
        category: ExpenseCategory::Labor,
        amount,
        description: "Crew wages".to_string(),
        proof_url: None,
        created_by: None,
        created_at: now,
        updated_at: now,
    }
}

/// A priced draft: Design 10h at 50 plus 5 cable at 20.
pub fn sample_quotation() -> Quotation {
    let (items, totals) = price_items(QuotationItems {
        labor_items: vec![LaborItem {
            task: "Design".to_string(),
            hours: dec!(10),
            rate: dec!(50),
            total: dec!(0),
        }],
        material_items: vec![MaterialItem {
            material_id: None,
            description: "Cable".to_string(),
            quantity: dec!(5),
            unit_price: dec!(20),
            total: dec!(0),
        }],
        ..QuotationItems::default()
    })
    .unwrap();
    let now = Utc::now();

    Quotation {
        id: Uuid::new_v4(),
        project_id: Uuid::new_v4(),
        estimate_version: 1,
        version: 1,
        status: QuotationStatus::Draft,
        locked: false,
        remarks: None,
        items,
        totals,
        artifact_url: None,
        sent_to: None,
        sent_at: None,
        locked_at: None,
        created_by: None,
        updated_by: None,
        created_at: now,
        updated_at: now,
    }
}

enum ArtifactMode {
    Ok,
    Fail,
    Hang,
}

/// Artifact generator with a fixed outcome.
pub struct StubArtifacts {
    mode: ArtifactMode,
}

impl StubArtifacts {
    pub fn ok() -> Self {
        Self {
            mode: ArtifactMode::Ok,
        }
    }

    pub fn failing() -> Self {
        Self {
            mode: ArtifactMode::Fail,
        }
    }

    pub fn hanging() -> Self {
        Self {
            mode: ArtifactMode::Hang,
        }
    }
}

impl ArtifactGenerator for StubArtifacts {
    async fn generate(&self, quotation: &Quotation) -> Result<String, ArtifactError> {
        match self.mode {
            ArtifactMode::Ok => Ok(format!("https://files.test/{}", artifact_key(quotation))),
            ArtifactMode::Fail => Err(ArtifactError::Render("renderer offline".to_string())),
            ArtifactMode::Hang => std::future::pending().await,
        }
    }
}

/// Artifact generator that locks the quotation while rendering, as a
/// concurrent `lock_quotation` would.
pub struct LockingArtifacts {
    ledger: Arc<MemoryLedger>,
}

impl LockingArtifacts {
    pub fn new(ledger: Arc<MemoryLedger>) -> Self {
        Self { ledger }
    }
}

impl ArtifactGenerator for LockingArtifacts {
    async fn generate(&self, quotation: &Quotation) -> Result<String, ArtifactError> {
        QuotationRepository::lock(&*self.ledger, quotation.id, Utc::now())
            .await
            .map_err(|e| ArtifactError::Render(e.to_string()))?;
        Ok(format!("https://files.test/late/{}", artifact_key(quotation)))
    }
}

/// Material catalog backed by a map.
#[derive(Default)]
pub struct StubCatalog {
    materials: HashMap<Uuid, String>,
    failing: bool,
}

impl StubCatalog {
    pub fn with_material(id: Uuid, name: &str) -> Self {
        let mut materials = HashMap::new();
        materials.insert(id, name.to_string());
        Self {
            materials,
            failing: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            materials: HashMap::new(),
            failing: true,
        }
    }
}

impl MaterialCatalog for StubCatalog {
    async fn describe(&self, material_id: Uuid) -> Result<Option<String>, CatalogError> {
        if self.failing {
            return Err(CatalogError::Unavailable("catalog offline".to_string()));
        }
        Ok(self.materials.get(&material_id).cloned())
    }
}

/// Notifier that records what it was asked to send.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    failing: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: true,
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), NotificationError> {
        if self.failing {
            return Err(NotificationError::Delivery("inbox offline".to_string()));
        }
        self.sent.lock().unwrap().push(notification);
        Ok(())
    }
}
