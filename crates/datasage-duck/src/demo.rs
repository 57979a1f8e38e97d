//! Demo dataset for a fresh database
//!
//! Creates `employees`, `departments` and `customers` when they are missing
//! and fills each one only while it is empty, so seeding is idempotent.

use duckdb::{params, Connection};
use tracing::info;

use crate::{DuckError, DuckStore};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS employees (
    id INTEGER PRIMARY KEY,
    name VARCHAR NOT NULL,
    department VARCHAR,
    salary DOUBLE,
    hire_date DATE
);
CREATE TABLE IF NOT EXISTS departments (
    id INTEGER PRIMARY KEY,
    name VARCHAR NOT NULL,
    manager VARCHAR
);
CREATE TABLE IF NOT EXISTS customers (
    customer_id INTEGER PRIMARY KEY,
    first_name VARCHAR,
    last_name VARCHAR,
    phone VARCHAR,
    email VARCHAR,
    street VARCHAR,
    city VARCHAR,
    state VARCHAR,
    zip_code VARCHAR
);
";

const EMPLOYEES: &[(i32, &str, &str, f64, &str)] = &[
    (1, "Alice Smith", "Engineering", 85000.0, "2021-06-01"),
    (2, "Bob Johnson", "Marketing", 72000.0, "2022-03-15"),
    (3, "Carol Lee", "Engineering", 92000.0, "2020-11-20"),
    (4, "David Brown", "Sales", 68000.0, "2023-01-10"),
];

const DEPARTMENTS: &[(i32, &str, &str)] = &[
    (1, "Engineering", "Alice Smith"),
    (2, "Marketing", "Bob Johnson"),
    (3, "Sales", "David Brown"),
];

type CustomerRow = (
    i32,
    &'static str,
    &'static str,
    Option<&'static str>,
    Option<&'static str>,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
);

const CUSTOMERS: &[CustomerRow] = &[
    (1, "Debra", "Burks", None, Some("debra.burks@example.com"), "9273 Thorne Ave", "Orchard Park", "NY", "14127"),
    (2, "Kasha", "Todd", None, Some("kasha.todd@example.com"), "910 Vine Street", "Campbell", "CA", "95008"),
    (3, "Tameka", "Fisher", None, Some("tameka.fisher@example.com"), "769C Honey Creek St", "Redondo Beach", "CA", "90278"),
    (4, "Daryl", "Spence", None, Some("daryl.spence@example.com"), "988 Pearl Lane", "Uniondale", "NY", "11553"),
    (5, "Charolette", "Rice", Some("(916) 381-6003"), Some("charolette.rice@example.com"), "107 River Dr", "Sacramento", "CA", "95820"),
    (6, "Lyndsey", "Bean", None, Some("lyndsey.bean@example.com"), "769 West Road", "Fairport", "NY", "14450"),
    (7, "Latasha", "Hays", Some("(716) 986-3359"), Some("latasha.hays@example.com"), "7014 Manor Station Rd", "Buffalo", "NY", "14215"),
    (8, "Jacquline", "Duncan", None, Some("jacquline.duncan@example.com"), "15 Brown St", "Jackson Heights", "NY", "11372"),
    (9, "Genoveva", "Baldwin", None, Some("genoveva.baldwin@example.com"), "8550 Spruce Drive", "Port Washington", "NY", "11050"),
    (10, "Pamelia", "Newman", None, Some("pamelia.newman@example.com"), "476 Chestnut Ave", "Monroe", "NY", "10950"),
    (11, "Deshawn", "Mendoza", None, Some("deshawn.mendoza@example.com"), "8790 Cobblestone Street", "Monsey", "NY", "10952"),
    (12, "Robby", "Sykes", Some("(516) 583-7761"), Some("robby.sykes@example.com"), "486 Rock Maple Street", "Hempstead", "NY", "11550"),
    (13, "Lashawn", "Ortiz", None, Some("lashawn.ortiz@example.com"), "27 Washington Rd", "Longview", "TX", "75604"),
    (14, "Boyd", "Irwin", None, Some("boyd.irwin@example.com"), "477 Arch Drive", "Garland", "TX", "75043"),
    (15, "Anna", "Rivera", Some("(408) 555-0199"), None, "31 Orchard Way", "Campbell", "CA", "95008"),
];

/// Row counts inserted by [`seed`]; zero means the table already had data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub employees: usize,
    pub departments: usize,
    pub customers: usize,
}

/// Create and fill the demo tables
pub fn seed(store: &DuckStore) -> Result<SeedSummary, DuckError> {
    let conn = store.connection();
    conn.execute_batch(SCHEMA)?;

    let mut summary = SeedSummary::default();

    if is_empty(conn, "employees")? {
        let mut stmt = conn.prepare(
            "INSERT INTO employees (id, name, department, salary, hire_date) \
             VALUES (?, ?, ?, ?, CAST(? AS DATE))",
        )?;
        for (id, name, department, salary, hire_date) in EMPLOYEES {
            summary.employees += stmt.execute(params![id, name, department, salary, hire_date])?;
        }
    }

    if is_empty(conn, "departments")? {
        let mut stmt =
            conn.prepare("INSERT INTO departments (id, name, manager) VALUES (?, ?, ?)")?;
        for (id, name, manager) in DEPARTMENTS {
            summary.departments += stmt.execute(params![id, name, manager])?;
        }
    }

    if is_empty(conn, "customers")? {
        let mut stmt = conn.prepare(
            "INSERT INTO customers \
             (customer_id, first_name, last_name, phone, email, street, city, state, zip_code) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )?;
        for (id, first, last, phone, email, street, city, state, zip) in CUSTOMERS {
            summary.customers +=
                stmt.execute(params![id, first, last, phone, email, street, city, state, zip])?;
        }
    }

    info!(
        employees = summary.employees,
        departments = summary.departments,
        customers = summary.customers,
        "Seeded demo data"
    );
    Ok(summary)
}

fn is_empty(conn: &Connection, table: &str) -> Result<bool, DuckError> {
    let sql = format!("SELECT COUNT(*) FROM {}", datasage_core::store::quote_ident(table));
    let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
    Ok(count == 0)
}
