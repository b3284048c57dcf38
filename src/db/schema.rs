use rusqlite::Connection;

/// Create every table and index. Safe to run on every startup.
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- Support codes: 6-digit customer-facing tokens.
        -- `code` is only unique among active, unexpired rows, so there is no
        -- UNIQUE constraint; the issuer enforces it inside a write transaction.
        -- Rows are never deleted; expiry is evaluated at read time.
        CREATE TABLE IF NOT EXISTS support_codes (
            id TEXT PRIMARY KEY,
            code TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'inactive')),
            customer_name TEXT NOT NULL,
            customer_email TEXT,
            customer_phone TEXT,
            session_notes TEXT,
            created_at INTEGER NOT NULL,
            expires_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_support_codes_lookup ON support_codes(code, status, expires_at);
        CREATE INDEX IF NOT EXISTS idx_support_codes_created ON support_codes(created_at);

        -- Generated installer bundles. Append-only: a stale row is never
        -- rewritten, a fresh row is added instead. Customer fields are a
        -- snapshot taken at build time.
        CREATE TABLE IF NOT EXISTS client_packages (
            id TEXT PRIMARY KEY,
            support_code_id TEXT NOT NULL REFERENCES support_codes(id),
            support_code TEXT NOT NULL,
            package_path TEXT NOT NULL,
            package_name TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            downloaded_at INTEGER,
            customer_name TEXT NOT NULL,
            customer_email TEXT,
            customer_phone TEXT,
            session_notes TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_client_packages_code ON client_packages(support_code, created_at);
        CREATE INDEX IF NOT EXISTS idx_client_packages_code_id ON client_packages(support_code_id, created_at);

        -- Customer machines, created when the installed agent calls home
        CREATE TABLE IF NOT EXISTS devices (
            id TEXT PRIMARY KEY,
            support_code TEXT,
            customer_name TEXT,
            device_name TEXT NOT NULL,
            os TEXT,
            last_seen INTEGER NOT NULL,
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_devices_last_seen ON devices(last_seen);
        CREATE INDEX IF NOT EXISTS idx_devices_created ON devices(created_at);

        -- One row per technician connection attempt
        CREATE TABLE IF NOT EXISTS connection_logs (
            id TEXT PRIMARY KEY,
            device_id TEXT NOT NULL REFERENCES devices(id),
            technician_id TEXT,
            connection_type TEXT NOT NULL DEFAULT 'desktop',
            started_at INTEGER NOT NULL,
            ended_at INTEGER,
            duration INTEGER,
            status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'ended'))
        );
        CREATE INDEX IF NOT EXISTS idx_connection_logs_device ON connection_logs(device_id);
        CREATE INDEX IF NOT EXISTS idx_connection_logs_active ON connection_logs(id) WHERE status = 'active';
        "#,
    )
}
