//! Initial database migration.
//!
//! Creates enums, project/estimation/quotation/expense tables with their
//! version uniqueness keys, the finance summary singleton, the notification
//! inbox, and the read-only tables monthly reports aggregate.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: PROJECTS & VERSION CHAINS
        // ============================================================
        db.execute_unprepared(PROJECTS_SQL).await?;
        db.execute_unprepared(ESTIMATIONS_SQL).await?;
        db.execute_unprepared(QUOTATIONS_SQL).await?;

        // ============================================================
        // PART 3: SPEND
        // ============================================================
        db.execute_unprepared(MATERIALS_SQL).await?;
        db.execute_unprepared(EXPENSES_SQL).await?;

        // ============================================================
        // PART 4: FINANCE
        // ============================================================
        db.execute_unprepared(FINANCE_SUMMARY_SQL).await?;
        db.execute_unprepared(INCOMES_SQL).await?;
        db.execute_unprepared(PAYMENTS_SQL).await?;
        db.execute_unprepared(PURCHASE_ORDERS_SQL).await?;

        // ============================================================
        // PART 5: NOTIFICATIONS
        // ============================================================
        db.execute_unprepared(NOTIFICATIONS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE project_status AS ENUM (
    'on_hold', 'active', 'in_progress', 'completed', 'cancelled'
);

CREATE TYPE estimation_status AS ENUM ('pending', 'approved', 'rejected');

CREATE TYPE quotation_status AS ENUM (
    'draft', 'sent', 'revised', 'confirmed', 'locked'
);

CREATE TYPE expense_category AS ENUM ('labor', 'procurement', 'transport', 'misc');

CREATE TYPE notification_priority AS ENUM ('low', 'normal', 'high', 'urgent');
";

const PROJECTS_SQL: &str = r"
CREATE TABLE projects (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    code VARCHAR(64) NOT NULL UNIQUE,
    name VARCHAR(255) NOT NULL,
    status project_status NOT NULL DEFAULT 'active',
    manager_id UUID,
    client_name VARCHAR(255),
    estimate_created BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_projects_created ON projects(created_at);
";

const ESTIMATIONS_SQL: &str = r"
CREATE TABLE estimations (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    project_id UUID NOT NULL REFERENCES projects(id) ON DELETE RESTRICT,
    version INTEGER NOT NULL,
    labor_cost NUMERIC(19, 2) NOT NULL DEFAULT 0,
    material_cost NUMERIC(19, 2) NOT NULL DEFAULT 0,
    service_cost NUMERIC(19, 2) NOT NULL DEFAULT 0,
    contingency_cost NUMERIC(19, 2) NOT NULL DEFAULT 0,
    total_cost NUMERIC(19, 2) NOT NULL DEFAULT 0,
    status estimation_status NOT NULL DEFAULT 'pending',
    notes TEXT,
    created_by UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_estimation_version_positive CHECK (version >= 1),
    CONSTRAINT chk_estimation_costs_non_negative CHECK (
        labor_cost >= 0 AND material_cost >= 0
        AND service_cost >= 0 AND contingency_cost >= 0
    ),
    CONSTRAINT uq_estimations_project_version UNIQUE (project_id, version)
);

CREATE INDEX idx_estimations_status ON estimations(status);
CREATE INDEX idx_estimations_created ON estimations(created_at);
";

const QUOTATIONS_SQL: &str = r"
CREATE TABLE quotations (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    project_id UUID NOT NULL REFERENCES projects(id) ON DELETE RESTRICT,
    estimate_version INTEGER NOT NULL,
    version INTEGER NOT NULL,
    status quotation_status NOT NULL DEFAULT 'draft',
    locked BOOLEAN NOT NULL DEFAULT false,
    remarks TEXT,
    labor_items JSONB NOT NULL DEFAULT '[]',
    material_items JSONB NOT NULL DEFAULT '[]',
    service_items JSONB NOT NULL DEFAULT '[]',
    contingency_items JSONB NOT NULL DEFAULT '[]',
    tax_items JSONB NOT NULL DEFAULT '[]',
    subtotal NUMERIC(19, 2) NOT NULL DEFAULT 0,
    total_contingency NUMERIC(19, 2) NOT NULL DEFAULT 0,
    total_tax NUMERIC(19, 2) NOT NULL DEFAULT 0,
    grand_total NUMERIC(19, 2) NOT NULL DEFAULT 0,
    artifact_url TEXT,
    sent_to VARCHAR(255),
    sent_at TIMESTAMPTZ,
    locked_at TIMESTAMPTZ,
    created_by UUID,
    updated_by UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_quotation_version_positive CHECK (version >= 1),
    CONSTRAINT chk_quotation_grand_total CHECK (
        grand_total = subtotal + total_contingency + total_tax
    ),
    CONSTRAINT chk_quotation_locked_at CHECK (NOT locked OR locked_at IS NOT NULL),
    CONSTRAINT uq_quotations_project_estimate_version
        UNIQUE (project_id, estimate_version, version),
    CONSTRAINT fk_quotations_estimation
        FOREIGN KEY (project_id, estimate_version)
        REFERENCES estimations(project_id, version)
);

CREATE INDEX idx_quotations_status ON quotations(status);
CREATE INDEX idx_quotations_created ON quotations(created_at DESC);
";

const MATERIALS_SQL: &str = r"
CREATE TABLE materials (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    unit VARCHAR(32),
    unit_price NUMERIC(19, 2),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const EXPENSES_SQL: &str = r"
CREATE TABLE expenses (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    project_id UUID NOT NULL REFERENCES projects(id) ON DELETE RESTRICT,
    category expense_category NOT NULL,
    amount NUMERIC(19, 2) NOT NULL,
    description TEXT NOT NULL,
    proof_url TEXT,
    created_by UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_expense_amount_positive CHECK (amount > 0)
);

CREATE INDEX idx_expenses_project_category ON expenses(project_id, category);
CREATE INDEX idx_expenses_created ON expenses(created_at DESC);
";

const FINANCE_SUMMARY_SQL: &str = r"
CREATE TABLE finance_summary (
    id SMALLINT PRIMARY KEY DEFAULT 1,
    total_income NUMERIC(19, 2) NOT NULL DEFAULT 0,
    total_balance NUMERIC(19, 2) NOT NULL DEFAULT 0,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_finance_summary_singleton CHECK (id = 1)
);
";

const INCOMES_SQL: &str = r"
CREATE TABLE incomes (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    project_id UUID REFERENCES projects(id) ON DELETE SET NULL,
    amount NUMERIC(19, 2) NOT NULL,
    income_type VARCHAR(64) NOT NULL,
    method VARCHAR(64) NOT NULL,
    status VARCHAR(32) NOT NULL DEFAULT 'pending',
    received_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_incomes_received ON incomes(received_at) WHERE status = 'approved';
";

const PAYMENTS_SQL: &str = r"
CREATE TABLE payments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    project_id UUID REFERENCES projects(id) ON DELETE SET NULL,
    amount NUMERIC(19, 2) NOT NULL,
    status VARCHAR(32) NOT NULL DEFAULT 'pending',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_payments_created ON payments(created_at);
";

const PURCHASE_ORDERS_SQL: &str = r"
CREATE TABLE purchase_orders (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    project_id UUID REFERENCES projects(id) ON DELETE SET NULL,
    total_amount NUMERIC(19, 2) NOT NULL,
    status VARCHAR(32) NOT NULL DEFAULT 'draft',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_purchase_orders_created ON purchase_orders(created_at);
";

const NOTIFICATIONS_SQL: &str = r"
CREATE TABLE notifications (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    recipient_role VARCHAR(64),
    recipient_user_id UUID,
    event_type VARCHAR(64) NOT NULL,
    title VARCHAR(255) NOT NULL,
    message TEXT NOT NULL,
    related_entity_type VARCHAR(64),
    related_entity_id UUID,
    metadata JSONB NOT NULL DEFAULT '{}',
    priority notification_priority NOT NULL DEFAULT 'normal',
    read_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_notification_single_recipient CHECK (
        (recipient_role IS NULL) <> (recipient_user_id IS NULL)
    )
);

CREATE INDEX idx_notifications_role ON notifications(recipient_role, created_at DESC)
    WHERE recipient_role IS NOT NULL;
CREATE INDEX idx_notifications_user ON notifications(recipient_user_id, created_at DESC)
    WHERE recipient_user_id IS NOT NULL;
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS notifications CASCADE;
DROP TABLE IF EXISTS purchase_orders CASCADE;
DROP TABLE IF EXISTS payments CASCADE;
DROP TABLE IF EXISTS incomes CASCADE;
DROP TABLE IF EXISTS finance_summary CASCADE;
DROP TABLE IF EXISTS expenses CASCADE;
DROP TABLE IF EXISTS materials CASCADE;
DROP TABLE IF EXISTS quotations CASCADE;
DROP TABLE IF EXISTS estimations CASCADE;
DROP TABLE IF EXISTS projects CASCADE;

DROP TYPE IF EXISTS notification_priority;
DROP TYPE IF EXISTS expense_category;
DROP TYPE IF EXISTS quotation_status;
DROP TYPE IF EXISTS estimation_status;
DROP TYPE IF EXISTS project_status;
";
