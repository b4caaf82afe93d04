use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create roles table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS roles (
            role_id BIGSERIAL PRIMARY KEY,
            role_name VARCHAR(50) NOT NULL UNIQUE
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create users table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            user_id BIGSERIAL PRIMARY KEY,
            username VARCHAR(50) NOT NULL UNIQUE,
            password VARCHAR(255) NOT NULL,
            email VARCHAR(100) NULL UNIQUE,
            phone VARCHAR(20) NULL UNIQUE,
            real_name VARCHAR(50) NULL,
            status SMALLINT NOT NULL DEFAULT 1,
            created_at TIMESTAMP NULL,
            updated_at TIMESTAMP NULL,
            last_login_at TIMESTAMP NULL,
            role_id BIGINT NULL REFERENCES roles(role_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create patients table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS patients (
            patient_id BIGSERIAL PRIMARY KEY,
            user_id BIGINT NOT NULL UNIQUE REFERENCES users(user_id),
            name VARCHAR(50) NOT NULL,
            gender SMALLINT NULL,
            birthday DATE NULL,
            id_card VARCHAR(18) NULL UNIQUE,
            address VARCHAR(255) NULL,
            emergency_contact VARCHAR(50) NULL,
            emergency_phone VARCHAR(20) NULL,
            created_at TIMESTAMP NULL,
            updated_at TIMESTAMP NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create departments table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS departments (
            dept_id BIGSERIAL PRIMARY KEY,
            dept_name VARCHAR(50) NOT NULL UNIQUE,
            description VARCHAR(255) NULL,
            parent_id BIGINT NULL,
            sort_order INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NULL,
            updated_at TIMESTAMP NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create doctors table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS doctors (
            doctor_id BIGSERIAL PRIMARY KEY,
            user_id BIGINT NOT NULL UNIQUE REFERENCES users(user_id),
            doctor_name VARCHAR(50) NOT NULL,
            dept_id BIGINT NOT NULL REFERENCES departments(dept_id),
            title VARCHAR(50) NULL,
            specialty VARCHAR(100) NULL,
            introduction TEXT NULL,
            available_status SMALLINT NOT NULL DEFAULT 1,
            created_at TIMESTAMP NULL,
            updated_at TIMESTAMP NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create doctor_schedules table. Capacity is derived by counting
    // non-cancelled appointments at decision time; there is no persisted
    // booked counter to drift.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS doctor_schedules (
            schedule_id BIGSERIAL PRIMARY KEY,
            doctor_id BIGINT NOT NULL REFERENCES doctors(doctor_id),
            work_date DATE NOT NULL,
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            max_appointments INTEGER NOT NULL DEFAULT 20,
            status SMALLINT NOT NULL DEFAULT 1,
            created_at TIMESTAMP NULL,
            updated_at TIMESTAMP NULL,
            CONSTRAINT valid_work_period CHECK (end_time > start_time)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create appointments table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS appointments (
            appt_id BIGSERIAL PRIMARY KEY,
            patient_id BIGINT NOT NULL REFERENCES patients(patient_id),
            doctor_id BIGINT NOT NULL REFERENCES doctors(doctor_id),
            schedule_id BIGINT NOT NULL REFERENCES doctor_schedules(schedule_id),
            appt_time TIMESTAMP NOT NULL,
            status SMALLINT NOT NULL DEFAULT 0,
            symptom_desc TEXT NULL,
            created_at TIMESTAMP NULL,
            updated_at TIMESTAMP NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create records and record_templates tables
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS records (
            id VARCHAR(24) PRIMARY KEY,
            dept_id BIGINT NOT NULL,
            doctor_id BIGINT NOT NULL,
            patient_id BIGINT NULL,
            patient_name VARCHAR(100) NULL,
            created_at TIMESTAMP NOT NULL,
            status VARCHAR(20) NOT NULL DEFAULT 'draft',
            template_id BIGINT NULL,
            chief_complaint TEXT NULL,
            diagnosis TEXT NULL,
            prescriptions_json TEXT NULL,
            labs_json TEXT NULL,
            imaging_json TEXT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS record_templates (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(100) NOT NULL,
            scope VARCHAR(50) NOT NULL,
            fields_json TEXT NULL,
            defaults_json TEXT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create medicines and stock ledger tables
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS medicines (
            medicine_id BIGSERIAL PRIMARY KEY,
            medicine_name VARCHAR(100) NOT NULL,
            specification VARCHAR(100) NOT NULL,
            dosage_form VARCHAR(50) NOT NULL,
            manufacturer VARCHAR(100) NOT NULL,
            unit VARCHAR(20) NOT NULL,
            price DOUBLE PRECISION NOT NULL DEFAULT 0,
            warning_stock INTEGER NOT NULL DEFAULT 50,
            created_at TIMESTAMP NULL,
            updated_at TIMESTAMP NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS medicine_stocks (
            stock_id BIGSERIAL PRIMARY KEY,
            medicine_id BIGINT NOT NULL UNIQUE REFERENCES medicines(medicine_id),
            current_stock INTEGER NOT NULL DEFAULT 0,
            last_stock_in_time TIMESTAMP NULL,
            last_stock_out_time TIMESTAMP NULL,
            created_at TIMESTAMP NULL,
            updated_at TIMESTAMP NULL,
            CONSTRAINT non_negative_stock CHECK (current_stock >= 0)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS inventory_batches (
            id BIGSERIAL PRIMARY KEY,
            medicine_id BIGINT NOT NULL REFERENCES medicines(medicine_id),
            batch_no VARCHAR(50) NOT NULL,
            quantity INTEGER NOT NULL DEFAULT 0,
            received_at DATE NOT NULL,
            expiry_date DATE NULL,
            created_at TIMESTAMP NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS inventory_logs (
            id BIGSERIAL PRIMARY KEY,
            type VARCHAR(8) NOT NULL,
            medicine_id BIGINT NOT NULL REFERENCES medicines(medicine_id),
            quantity INTEGER NOT NULL DEFAULT 0,
            time TIMESTAMP NULL,
            note VARCHAR(255) NULL,
            batch_no VARCHAR(50) NULL,
            created_at TIMESTAMP NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create prescription tables
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pharmacy_prescriptions (
            id VARCHAR(32) PRIMARY KEY,
            patient VARCHAR(50) NOT NULL,
            department VARCHAR(50) NOT NULL,
            doctor VARCHAR(50) NOT NULL,
            created_at TIMESTAMP NULL,
            status VARCHAR(20) NOT NULL DEFAULT 'pending'
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS prescription_items (
            id BIGSERIAL PRIMARY KEY,
            prescription_id VARCHAR(32) NOT NULL REFERENCES pharmacy_prescriptions(id),
            medicine_id BIGINT NOT NULL REFERENCES medicines(medicine_id),
            name VARCHAR(100) NULL,
            qty INTEGER NOT NULL DEFAULT 1,
            unit VARCHAR(20) NULL,
            price DOUBLE PRECISION NOT NULL DEFAULT 0
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create supplier tables
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS suppliers (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(100) NOT NULL,
            contact VARCHAR(50) NULL,
            phone VARCHAR(30) NULL,
            address VARCHAR(255) NULL,
            created_at TIMESTAMP NULL,
            updated_at TIMESTAMP NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS supplier_orders (
            id VARCHAR(32) PRIMARY KEY,
            supplier_id BIGINT NOT NULL REFERENCES suppliers(id),
            created_at TIMESTAMP NOT NULL,
            status VARCHAR(20) NOT NULL DEFAULT 'pending',
            amount DOUBLE PRECISION NOT NULL DEFAULT 0
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS supplier_order_items (
            id BIGSERIAL PRIMARY KEY,
            order_id VARCHAR(32) NOT NULL REFERENCES supplier_orders(id),
            medicine_id BIGINT NOT NULL REFERENCES medicines(medicine_id),
            name VARCHAR(100) NULL,
            qty INTEGER NOT NULL DEFAULT 1,
            unit VARCHAR(20) NULL,
            price DOUBLE PRECISION NOT NULL DEFAULT 0
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_doctors_dept_id ON doctors(dept_id);
        CREATE INDEX IF NOT EXISTS idx_schedules_doctor_id ON doctor_schedules(doctor_id);
        CREATE INDEX IF NOT EXISTS idx_schedules_work_date ON doctor_schedules(work_date);
        CREATE INDEX IF NOT EXISTS idx_appointments_patient_id ON appointments(patient_id);
        CREATE INDEX IF NOT EXISTS idx_appointments_doctor_id ON appointments(doctor_id);
        CREATE INDEX IF NOT EXISTS idx_appointments_schedule_id ON appointments(schedule_id);
        CREATE INDEX IF NOT EXISTS idx_appointments_appt_time ON appointments(appt_time);
        CREATE INDEX IF NOT EXISTS idx_records_status ON records(status);
        CREATE INDEX IF NOT EXISTS idx_records_created_at ON records(created_at);
        CREATE INDEX IF NOT EXISTS idx_records_template_id ON records(template_id);
        CREATE INDEX IF NOT EXISTS idx_inventory_logs_medicine_id ON inventory_logs(medicine_id);
        CREATE INDEX IF NOT EXISTS idx_inventory_batches_medicine_id ON inventory_batches(medicine_id);
        CREATE INDEX IF NOT EXISTS idx_prescription_items_prescription_id ON prescription_items(prescription_id);
        CREATE INDEX IF NOT EXISTS idx_supplier_order_items_order_id ON supplier_order_items(order_id);
        "#,
    )
    .execute(pool)
    .await?;

    // Seed the built-in roles
    sqlx::query(
        r#"
        INSERT INTO roles (role_id, role_name)
        VALUES (1, 'ADMIN'), (2, 'DOCTOR'), (3, 'PATIENT')
        ON CONFLICT (role_id) DO NOTHING;
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema initialized successfully.");
    Ok(())
}
