//! Initial database migration.
//!
//! Creates the enums, chart-of-accounts tables, fiscal years, journals,
//! treasury documents and instruments, plus the triggers and partial unique
//! indexes that back the application rules.

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
        // PART 2: CHART OF ACCOUNTS
        // ============================================================
        db.execute_unprepared(CODES_SQL).await?;
        db.execute_unprepared(CODES_TRIGGER_SQL).await?;
        db.execute_unprepared(DETAILS_SQL).await?;
        db.execute_unprepared(DETAIL_LEVELS_SQL).await?;

        // ============================================================
        // PART 3: FISCAL YEARS & SETTINGS
        // ============================================================
        db.execute_unprepared(FISCAL_YEARS_SQL).await?;
        db.execute_unprepared(SETTINGS_SQL).await?;

        // ============================================================
        // PART 4: JOURNALS
        // ============================================================
        db.execute_unprepared(JOURNALS_SQL).await?;
        db.execute_unprepared(JOURNAL_ITEMS_SQL).await?;
        db.execute_unprepared(INVOICES_SQL).await?;

        // ============================================================
        // PART 5: TREASURY RESOURCES & INSTRUMENTS
        // ============================================================
        db.execute_unprepared(TREASURY_RESOURCES_SQL).await?;
        db.execute_unprepared(CHECKS_SQL).await?;
        db.execute_unprepared(INSTRUMENT_LINKS_SQL).await?;

        // ============================================================
        // PART 6: RECEIPTS & PAYMENTS
        // ============================================================
        db.execute_unprepared(RECEIPTS_SQL).await?;
        db.execute_unprepared(PAYMENTS_SQL).await?;

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
CREATE TYPE code_kind AS ENUM ('group', 'general', 'specific');
CREATE TYPE code_nature AS ENUM ('debit', 'credit');
CREATE TYPE detail_kind AS ENUM ('user_managed', 'system_managed');
CREATE TYPE journal_status AS ENUM ('draft', 'temporary', 'permanent');
CREATE TYPE document_status AS ENUM ('temporary', 'sent');
CREATE TYPE instrument_type AS ENUM ('cash', 'card', 'transfer', 'check');
CREATE TYPE check_type AS ENUM ('incoming', 'outgoing');
CREATE TYPE check_status AS ENUM ('created', 'issued', 'incashbox');
CREATE TYPE checkbook_status AS ENUM ('active', 'exhausted');
";

const CODES_SQL: &str = r"
CREATE TABLE codes (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    code VARCHAR(32) NOT NULL,
    title VARCHAR(255) NOT NULL,
    kind code_kind NOT NULL,
    parent_id UUID REFERENCES codes(id) ON DELETE RESTRICT,
    is_active BOOLEAN NOT NULL DEFAULT true,
    nature code_nature,
    can_have_details BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_codes_code UNIQUE (code),
    CONSTRAINT chk_codes_group_format CHECK (kind <> 'group' OR code ~ '^[0-9]{2}$')
);

CREATE INDEX idx_codes_parent ON codes(parent_id);
";

const CODES_TRIGGER_SQL: &str = r"
CREATE OR REPLACE FUNCTION codes_parent_kind_check()
RETURNS TRIGGER AS $$
DECLARE
    v_parent_kind code_kind;
BEGIN
    IF NEW.kind = 'group' THEN
        IF NEW.parent_id IS NOT NULL THEN
            RAISE EXCEPTION 'group code % cannot have a parent', NEW.code;
        END IF;
        RETURN NEW;
    END IF;

    IF NEW.parent_id IS NULL THEN
        RAISE EXCEPTION '% code % requires a parent', NEW.kind, NEW.code;
    END IF;

    SELECT kind INTO v_parent_kind FROM codes WHERE id = NEW.parent_id;

    IF NEW.kind = 'general' AND v_parent_kind IS DISTINCT FROM 'group' THEN
        RAISE EXCEPTION 'general code % must have a group parent', NEW.code;
    END IF;

    IF NEW.kind = 'specific' AND v_parent_kind IS DISTINCT FROM 'general' THEN
        RAISE EXCEPTION 'specific code % must have a general parent', NEW.code;
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER codes_parent_kind_check
    BEFORE INSERT OR UPDATE OF kind, parent_id ON codes
    FOR EACH ROW EXECUTE FUNCTION codes_parent_kind_check();
";

const DETAILS_SQL: &str = r"
CREATE TABLE details (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    code VARCHAR(4) NOT NULL,
    title VARCHAR(255) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    kind detail_kind NOT NULL DEFAULT 'user_managed',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_details_code UNIQUE (code),
    CONSTRAINT chk_details_code_format CHECK (code ~ '^[0-9]{4}$')
);
";

const DETAIL_LEVELS_SQL: &str = r"
CREATE TABLE detail_levels (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    code VARCHAR(32) NOT NULL,
    title VARCHAR(255) NOT NULL,
    parent_id UUID REFERENCES detail_levels(id) ON DELETE RESTRICT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_detail_levels_parent ON detail_levels(parent_id);

CREATE TABLE details_detail_levels (
    detail_id UUID NOT NULL REFERENCES details(id) ON DELETE CASCADE,
    detail_level_id UUID NOT NULL REFERENCES detail_levels(id) ON DELETE RESTRICT,
    is_primary BOOLEAN NOT NULL DEFAULT false,
    position INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (detail_id, detail_level_id)
);

CREATE UNIQUE INDEX uq_details_detail_levels_primary
    ON details_detail_levels(detail_id) WHERE is_primary;
CREATE INDEX idx_details_detail_levels_level ON details_detail_levels(detail_level_id);
";

const FISCAL_YEARS_SQL: &str = r"
CREATE TABLE fiscal_years (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(100) NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    is_closed BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_fiscal_year_dates CHECK (end_date > start_date),
    CONSTRAINT uq_fiscal_years_start UNIQUE (start_date)
);

-- At most one open fiscal year
CREATE UNIQUE INDEX uq_fiscal_years_single_open ON fiscal_years ((true)) WHERE is_closed = false;
";

const SETTINGS_SQL: &str = r"
CREATE TABLE settings (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    code VARCHAR(100) NOT NULL,
    special_id UUID,
    value TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_settings_code UNIQUE (code)
);
";

const JOURNALS_SQL: &str = r"
CREATE TABLE journals (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    fiscal_year_id UUID NOT NULL REFERENCES fiscal_years(id) ON DELETE RESTRICT,
    ref_no VARCHAR(64),
    code VARCHAR(64),
    serial_no BIGINT GENERATED BY DEFAULT AS IDENTITY,
    date DATE NOT NULL,
    description TEXT,
    journal_type VARCHAR(50),
    provider VARCHAR(100),
    status journal_status NOT NULL DEFAULT 'draft',
    reverses_journal_id UUID REFERENCES journals(id) ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_journals_ref_no UNIQUE (fiscal_year_id, ref_no),
    -- Deferrable so a single UPDATE can permute codes
    CONSTRAINT uq_journals_code UNIQUE (fiscal_year_id, code) DEFERRABLE INITIALLY IMMEDIATE
);

CREATE INDEX idx_journals_fy_date ON journals(fiscal_year_id, date);
CREATE INDEX idx_journals_status ON journals(status);
";

const JOURNAL_ITEMS_SQL: &str = r"
CREATE TABLE journal_items (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    journal_id UUID NOT NULL REFERENCES journals(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    code_id UUID NOT NULL REFERENCES codes(id) ON DELETE RESTRICT,
    detail_id UUID REFERENCES details(id) ON DELETE RESTRICT,
    party_id UUID,
    debit NUMERIC(20, 4) NOT NULL DEFAULT 0,
    credit NUMERIC(20, 4) NOT NULL DEFAULT 0,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_journal_items_debit CHECK (debit >= 0),
    CONSTRAINT chk_journal_items_credit CHECK (credit >= 0)
);

CREATE INDEX idx_journal_items_journal ON journal_items(journal_id, position);
CREATE INDEX idx_journal_items_code ON journal_items(code_id);
CREATE INDEX idx_journal_items_detail ON journal_items(detail_id);
";

const INVOICES_SQL: &str = r"
CREATE TABLE invoices (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    fiscal_year_id UUID NOT NULL REFERENCES fiscal_years(id) ON DELETE RESTRICT,
    number VARCHAR(32) NOT NULL,
    date DATE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_invoices_number UNIQUE (fiscal_year_id, number)
);
";

const TREASURY_RESOURCES_SQL: &str = r"
CREATE TABLE cashboxes (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    title VARCHAR(255) NOT NULL,
    handler_detail_id UUID NOT NULL REFERENCES details(id) ON DELETE RESTRICT,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_cashboxes_handler UNIQUE (handler_detail_id)
);

CREATE TABLE bank_accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    title VARCHAR(255) NOT NULL,
    account_number VARCHAR(64) NOT NULL,
    handler_detail_id UUID NOT NULL REFERENCES details(id) ON DELETE RESTRICT,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_bank_accounts_handler UNIQUE (handler_detail_id)
);

CREATE TABLE card_readers (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    title VARCHAR(255) NOT NULL,
    bank_account_id UUID REFERENCES bank_accounts(id) ON DELETE SET NULL,
    terminal_no VARCHAR(64),
    handler_detail_id UUID NOT NULL REFERENCES details(id) ON DELETE RESTRICT,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_card_readers_handler UNIQUE (handler_detail_id)
);
";

const CHECKS_SQL: &str = r"
CREATE TABLE checkbooks (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    bank_account_id UUID NOT NULL REFERENCES bank_accounts(id) ON DELETE RESTRICT,
    series VARCHAR(32) NOT NULL,
    start_number BIGINT NOT NULL,
    page_count INTEGER NOT NULL,
    status checkbook_status NOT NULL DEFAULT 'active',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_checkbooks_start CHECK (start_number >= 1),
    CONSTRAINT chk_checkbooks_pages CHECK (page_count >= 1)
);

CREATE TABLE checks (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    check_type check_type NOT NULL,
    checkbook_id UUID REFERENCES checkbooks(id) ON DELETE RESTRICT,
    number VARCHAR(32) NOT NULL,
    issuer VARCHAR(255),
    beneficiary VARCHAR(255),
    amount NUMERIC(20, 4) NOT NULL,
    status check_status NOT NULL,
    issue_date DATE NOT NULL,
    due_date DATE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_checks_amount CHECK (amount > 0),
    CONSTRAINT uq_checks_checkbook_number UNIQUE (checkbook_id, number)
);
";

const INSTRUMENT_LINKS_SQL: &str = r"
CREATE TABLE instrument_links (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    instrument_type instrument_type NOT NULL,
    card_reader_id UUID REFERENCES card_readers(id) ON DELETE CASCADE,
    bank_account_id UUID REFERENCES bank_accounts(id) ON DELETE CASCADE,
    check_id UUID REFERENCES checks(id) ON DELETE CASCADE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    -- Exactly one source, matching the type
    CONSTRAINT chk_instrument_links_source CHECK (
        (instrument_type = 'card' AND card_reader_id IS NOT NULL
            AND bank_account_id IS NULL AND check_id IS NULL)
        OR (instrument_type = 'transfer' AND bank_account_id IS NOT NULL
            AND card_reader_id IS NULL AND check_id IS NULL)
        OR (instrument_type = 'check' AND check_id IS NOT NULL
            AND card_reader_id IS NULL AND bank_account_id IS NULL)
    )
);

CREATE UNIQUE INDEX uq_instrument_links_card ON instrument_links(card_reader_id)
    WHERE card_reader_id IS NOT NULL;
CREATE UNIQUE INDEX uq_instrument_links_transfer ON instrument_links(bank_account_id)
    WHERE bank_account_id IS NOT NULL;
CREATE UNIQUE INDEX uq_instrument_links_check ON instrument_links(check_id)
    WHERE check_id IS NOT NULL;
";

const RECEIPTS_SQL: &str = r"
CREATE TABLE receipts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    number VARCHAR(32) NOT NULL,
    status document_status NOT NULL DEFAULT 'temporary',
    date DATE NOT NULL,
    fiscal_year_id UUID REFERENCES fiscal_years(id) ON DELETE RESTRICT,
    detail_id UUID NOT NULL REFERENCES details(id) ON DELETE RESTRICT,
    special_code_id UUID REFERENCES codes(id) ON DELETE RESTRICT,
    description TEXT,
    total_amount NUMERIC(20, 4) NOT NULL,
    cashbox_id UUID REFERENCES cashboxes(id) ON DELETE RESTRICT,
    journal_id UUID REFERENCES journals(id) ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_receipts_total CHECK (total_amount > 0),
    CONSTRAINT uq_receipts_number UNIQUE (fiscal_year_id, number)
);

CREATE TABLE receipt_items (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    receipt_id UUID NOT NULL REFERENCES receipts(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    instrument_type instrument_type NOT NULL,
    amount NUMERIC(20, 4) NOT NULL,
    reference VARCHAR(255),
    related_instrument_id UUID REFERENCES instrument_links(id) ON DELETE RESTRICT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_receipt_items_amount CHECK (amount > 0)
);

CREATE INDEX idx_receipt_items_receipt ON receipt_items(receipt_id, position);
CREATE INDEX idx_receipts_journal ON receipts(journal_id);
";

const PAYMENTS_SQL: &str = r"
CREATE TABLE payments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    number VARCHAR(32) NOT NULL,
    status document_status NOT NULL DEFAULT 'temporary',
    date DATE NOT NULL,
    fiscal_year_id UUID REFERENCES fiscal_years(id) ON DELETE RESTRICT,
    detail_id UUID NOT NULL REFERENCES details(id) ON DELETE RESTRICT,
    special_code_id UUID REFERENCES codes(id) ON DELETE RESTRICT,
    description TEXT,
    total_amount NUMERIC(20, 4) NOT NULL,
    cashbox_id UUID REFERENCES cashboxes(id) ON DELETE RESTRICT,
    journal_id UUID REFERENCES journals(id) ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_payments_total CHECK (total_amount > 0),
    CONSTRAINT uq_payments_number UNIQUE (fiscal_year_id, number)
);

CREATE TABLE payment_items (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    payment_id UUID NOT NULL REFERENCES payments(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    instrument_type instrument_type NOT NULL,
    amount NUMERIC(20, 4) NOT NULL,
    reference VARCHAR(255),
    related_instrument_id UUID REFERENCES instrument_links(id) ON DELETE RESTRICT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_payment_items_amount CHECK (amount > 0)
);

CREATE INDEX idx_payment_items_payment ON payment_items(payment_id, position);
CREATE INDEX idx_payments_journal ON payments(journal_id);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS payment_items CASCADE;
DROP TABLE IF EXISTS payments CASCADE;
DROP TABLE IF EXISTS receipt_items CASCADE;
DROP TABLE IF EXISTS receipts CASCADE;
DROP TABLE IF EXISTS instrument_links CASCADE;
DROP TABLE IF EXISTS checks CASCADE;
DROP TABLE IF EXISTS checkbooks CASCADE;
DROP TABLE IF EXISTS card_readers CASCADE;
DROP TABLE IF EXISTS bank_accounts CASCADE;
DROP TABLE IF EXISTS cashboxes CASCADE;
DROP TABLE IF EXISTS invoices CASCADE;
DROP TABLE IF EXISTS journal_items CASCADE;
DROP TABLE IF EXISTS journals CASCADE;
DROP TABLE IF EXISTS settings CASCADE;
DROP TABLE IF EXISTS fiscal_years CASCADE;
DROP TABLE IF EXISTS details_detail_levels CASCADE;
DROP TABLE IF EXISTS detail_levels CASCADE;
DROP TABLE IF EXISTS details CASCADE;
DROP TABLE IF EXISTS codes CASCADE;

DROP FUNCTION IF EXISTS codes_parent_kind_check() CASCADE;

DROP TYPE IF EXISTS checkbook_status;
DROP TYPE IF EXISTS check_status;
DROP TYPE IF EXISTS check_type;
DROP TYPE IF EXISTS instrument_type;
DROP TYPE IF EXISTS document_status;
DROP TYPE IF EXISTS journal_status;
DROP TYPE IF EXISTS detail_kind;
DROP TYPE IF EXISTS code_nature;
DROP TYPE IF EXISTS code_kind;
";
