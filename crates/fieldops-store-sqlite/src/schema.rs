//! SQL schema for the Fieldops SQLite store.
//!
//! Executed once at connection startup. Every table the entity catalog maps a
//! kind onto exists here, so catalog-driven lifecycle operations work across
//! all twelve kinds. Future migrations will be gated on `user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- ── Hierarchy tables ─────────────────────────────────────────────────────
-- cks_manager is the denormalised manager scope, maintained by the
-- assignment engine's cascade, not by a constraint.

CREATE TABLE IF NOT EXISTS managers (
    manager_id     TEXT PRIMARY KEY,
    name           TEXT NOT NULL,
    email          TEXT,
    phone          TEXT,
    territory      TEXT,
    status         TEXT NOT NULL DEFAULT 'active',   -- 'active' | 'unassigned'
    created_at     TEXT NOT NULL,                    -- ISO 8601 UTC
    updated_at     TEXT,
    archived_at    TEXT,
    archived_by    TEXT,
    archive_reason TEXT
);

CREATE TABLE IF NOT EXISTS contractors (
    contractor_id  TEXT PRIMARY KEY,
    name           TEXT NOT NULL,
    cks_manager    TEXT,            -- structural parent AND scope
    email          TEXT,
    phone          TEXT,
    status         TEXT NOT NULL DEFAULT 'unassigned',
    created_at     TEXT NOT NULL,
    updated_at     TEXT,
    archived_at    TEXT,
    archived_by    TEXT,
    archive_reason TEXT
);

CREATE TABLE IF NOT EXISTS customers (
    customer_id    TEXT PRIMARY KEY,
    name           TEXT NOT NULL,
    contractor_id  TEXT,            -- structural parent
    cks_manager    TEXT,            -- denormalised scope
    email          TEXT,
    phone          TEXT,
    status         TEXT NOT NULL DEFAULT 'unassigned',
    created_at     TEXT NOT NULL,
    updated_at     TEXT,
    archived_at    TEXT,
    archived_by    TEXT,
    archive_reason TEXT
);

CREATE TABLE IF NOT EXISTS centers (
    center_id      TEXT PRIMARY KEY,
    name           TEXT NOT NULL,
    customer_id    TEXT,            -- structural parent
    contractor_id  TEXT,            -- denormalised, copied from the customer
    cks_manager    TEXT,
    email          TEXT,
    phone          TEXT,
    status         TEXT NOT NULL DEFAULT 'unassigned',
    created_at     TEXT NOT NULL,
    updated_at     TEXT,
    archived_at    TEXT,
    archived_by    TEXT,
    archive_reason TEXT
);

CREATE TABLE IF NOT EXISTS crew (
    crew_id         TEXT PRIMARY KEY,
    name            TEXT NOT NULL,
    role            TEXT,
    assigned_center TEXT,           -- structural parent
    cks_manager     TEXT,
    email           TEXT,
    phone           TEXT,
    status          TEXT NOT NULL DEFAULT 'unassigned',
    created_at      TEXT NOT NULL,
    updated_at      TEXT,
    archived_at     TEXT,
    archived_by     TEXT,
    archive_reason  TEXT
);

CREATE INDEX IF NOT EXISTS contractors_manager_idx ON contractors(cks_manager);
CREATE INDEX IF NOT EXISTS customers_contractor_idx ON customers(contractor_id);
CREATE INDEX IF NOT EXISTS customers_manager_idx    ON customers(cks_manager);
CREATE INDEX IF NOT EXISTS centers_customer_idx     ON centers(customer_id);
CREATE INDEX IF NOT EXISTS centers_manager_idx      ON centers(cks_manager);
CREATE INDEX IF NOT EXISTS crew_center_idx          ON crew(assigned_center);
CREATE INDEX IF NOT EXISTS crew_manager_idx         ON crew(cks_manager);

-- ── Other catalog-mapped tables ──────────────────────────────────────────

CREATE TABLE IF NOT EXISTS warehouses (
    warehouse_id   TEXT PRIMARY KEY,
    name           TEXT NOT NULL,
    email          TEXT,
    phone          TEXT,
    status         TEXT NOT NULL DEFAULT 'active',
    created_at     TEXT NOT NULL,
    updated_at     TEXT,
    archived_at    TEXT,
    archived_by    TEXT,
    archive_reason TEXT
);

CREATE TABLE IF NOT EXISTS orders (
    order_id       TEXT PRIMARY KEY,
    name           TEXT NOT NULL,
    status         TEXT NOT NULL DEFAULT 'active',
    created_at     TEXT NOT NULL,
    updated_at     TEXT,
    archived_at    TEXT,
    archived_by    TEXT,
    archive_reason TEXT
);

-- Shared by the report and feedback kinds.
CREATE TABLE IF NOT EXISTS reports (
    report_id      TEXT PRIMARY KEY,
    name           TEXT NOT NULL,
    status         TEXT NOT NULL DEFAULT 'active',
    created_at     TEXT NOT NULL,
    updated_at     TEXT,
    archived_at    TEXT,
    archived_by    TEXT,
    archive_reason TEXT
);

-- Active service instances (scoped SRV ids).
CREATE TABLE IF NOT EXISTS services (
    service_id     TEXT PRIMARY KEY,
    name           TEXT NOT NULL,
    center_id      TEXT,
    status         TEXT NOT NULL DEFAULT 'active',
    created_at     TEXT NOT NULL,
    updated_at     TEXT,
    archived_at    TEXT,
    archived_by    TEXT,
    archive_reason TEXT
);

-- Catalog service definitions (unscoped SRV ids).
CREATE TABLE IF NOT EXISTS catalog_services (
    service_id     TEXT PRIMARY KEY,
    name           TEXT NOT NULL,
    status         TEXT NOT NULL DEFAULT 'active',
    created_at     TEXT NOT NULL,
    updated_at     TEXT,
    archived_at    TEXT,
    archived_by    TEXT,
    archive_reason TEXT
);

CREATE TABLE IF NOT EXISTS product_catalog (
    product_id     TEXT PRIMARY KEY,
    name           TEXT NOT NULL,
    status         TEXT NOT NULL DEFAULT 'active',
    created_at     TEXT NOT NULL,
    updated_at     TEXT,
    archived_at    TEXT,
    archived_by    TEXT,
    archive_reason TEXT
);

-- ── Activity log ─────────────────────────────────────────────────────────
-- Strictly append-only. No UPDATE or DELETE is ever issued against this
-- table; hard-deletion events carry the deleted row in metadata.snapshot.

CREATE TABLE IF NOT EXISTS system_activity (
    activity_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    activity_type TEXT NOT NULL,
    description   TEXT NOT NULL,
    actor_id      TEXT NOT NULL,
    actor_role    TEXT NOT NULL,
    target_id     TEXT,
    target_type   TEXT,
    metadata      TEXT,            -- JSON or NULL
    created_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS activity_target_idx ON system_activity(target_id, target_type);
CREATE INDEX IF NOT EXISTS activity_type_idx   ON system_activity(activity_type);

-- Per-user hide flags; never affect the audit record itself.
CREATE TABLE IF NOT EXISTS activity_dismissals (
    activity_id INTEGER NOT NULL REFERENCES system_activity(activity_id),
    user_id     TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    UNIQUE (activity_id, user_id)
);

PRAGMA user_version = 1;
";
