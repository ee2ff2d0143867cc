use sqlx::SqlitePool;

/// Schema is created idempotently at startup; there is no separate migration
/// tooling for the single SQLite file this service owns.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE COLLATE NOCASE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'user',
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS rooms (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        room_number TEXT NOT NULL UNIQUE,
        room_type TEXT,
        floor INTEGER,
        size REAL,
        rent_price REAL NOT NULL DEFAULT 0,
        deposit REAL NOT NULL DEFAULT 0,
        water_price REAL NOT NULL DEFAULT 0,
        electricity_price REAL NOT NULL DEFAULT 0,
        status TEXT NOT NULL DEFAULT 'available',
        facilities TEXT,
        cover_image TEXT,
        images TEXT,
        description TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tenants (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER REFERENCES users(id),
        fullname TEXT NOT NULL,
        email TEXT UNIQUE,
        phone TEXT,
        emergency_contact TEXT,
        id_card TEXT,
        vehicle_info TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS contracts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        tenant_id INTEGER NOT NULL REFERENCES tenants(id),
        room_id INTEGER NOT NULL REFERENCES rooms(id),
        start_date TEXT NOT NULL,
        end_date TEXT NOT NULL,
        rent_amount REAL NOT NULL DEFAULT 0,
        deposit_amount REAL NOT NULL DEFAULT 0,
        status TEXT NOT NULL DEFAULT 'active',
        guarantor TEXT,
        note TEXT,
        document TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS utility_bills (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        contract_id INTEGER NOT NULL REFERENCES contracts(id),
        water_usage REAL NOT NULL DEFAULT 0,
        water_price REAL NOT NULL DEFAULT 0,
        electricity_usage REAL NOT NULL DEFAULT 0,
        electricity_price REAL NOT NULL DEFAULT 0,
        total_amount REAL NOT NULL DEFAULT 0,
        billing_date TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending',
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS bookings (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        room_id INTEGER NOT NULL REFERENCES rooms(id),
        name TEXT NOT NULL,
        phone TEXT,
        email TEXT,
        check_in_date TEXT NOT NULL,
        duration INTEGER NOT NULL DEFAULT 1,
        special_requests TEXT,
        status TEXT NOT NULL DEFAULT 'pending',
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS payments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        contract_id INTEGER NOT NULL REFERENCES contracts(id),
        amount REAL NOT NULL DEFAULT 0,
        slip_image TEXT,
        payment_date TEXT NOT NULL,
        method TEXT NOT NULL DEFAULT 'cash',
        status TEXT NOT NULL DEFAULT 'pending',
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS maintenance_requests (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        room_id INTEGER NOT NULL REFERENCES rooms(id),
        description TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending',
        technician TEXT,
        reported_at TEXT NOT NULL,
        resolved_at TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS checkins (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        contract_id INTEGER NOT NULL REFERENCES contracts(id),
        checkin_date TEXT NOT NULL,
        water_meter REAL NOT NULL DEFAULT 0,
        electricity_meter REAL NOT NULL DEFAULT 0,
        condition_notes TEXT,
        photos TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS checkouts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        contract_id INTEGER NOT NULL REFERENCES contracts(id),
        checkout_date TEXT NOT NULL,
        water_meter REAL NOT NULL DEFAULT 0,
        electricity_meter REAL NOT NULL DEFAULT 0,
        condition_notes TEXT,
        photos TEXT,
        deposit_deduction REAL NOT NULL DEFAULT 0,
        deposit_refund REAL NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS notifications (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id),
        notification_type TEXT NOT NULL,
        message TEXT NOT NULL,
        is_read INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS reports (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        content TEXT,
        created_by INTEGER REFERENCES users(id),
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS backups (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        table_name TEXT NOT NULL,
        row_id INTEGER NOT NULL,
        data TEXT NOT NULL,
        deleted_by INTEGER REFERENCES users(id),
        created_at TEXT NOT NULL
    )
    "#,
];

pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
