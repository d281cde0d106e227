//! Industry catalogue and benchmark reference data

use crate::db::sqlite::models::{BenchmarkKey, Industry};
use crate::diagnosis::{BenchmarkRow, RatioName, RatioSet};
use crate::error::Result;
use rusqlite::{params, params_from_iter, types::Value, Connection, OptionalExtension};

/// Comma-separated ratio column list in canonical order
fn ratio_columns() -> String {
    RatioName::ALL
        .iter()
        .map(|r| r.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// List all industries ordered by code
pub fn list_industries(conn: &Connection) -> Result<Vec<Industry>> {
    let mut stmt = conn.prepare("SELECT code, name FROM industries ORDER BY code")?;
    let industries = stmt
        .query_map([], |row| {
            Ok(Industry {
                code: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(industries)
}

/// Resolve an industry's display name
pub fn get_industry_name(conn: &Connection, code: &str) -> Result<Option<String>> {
    let name = conn
        .query_row("SELECT name FROM industries WHERE code = ?1", [code], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(name)
}

/// Insert or rename industries in one transaction
pub fn upsert_industries(conn: &mut Connection, industries: &[Industry]) -> Result<usize> {
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO industries (code, name) VALUES (?1, ?2)
             ON CONFLICT(code) DO UPDATE SET name = excluded.name",
        )?;
        for industry in industries {
            stmt.execute(params![industry.code, industry.name])?;
        }
    }
    tx.commit()?;

    tracing::info!("Upserted {} industries", industries.len());
    Ok(industries.len())
}

/// Look up the valid benchmark row for (industry, year, firm size)
pub fn find_benchmark(
    conn: &Connection,
    industry_code: &str,
    year: i32,
    firm_size_type: &str,
) -> Result<Option<BenchmarkRow>> {
    let sql = format!(
        "SELECT b.industry_code, COALESCE(i.name, b.industry_code), b.year, b.firm_size_type, b.valid, {}
         FROM industry_benchmarks b
         LEFT JOIN industries i ON i.code = b.industry_code
         WHERE b.industry_code = ?1 AND b.year = ?2 AND b.firm_size_type = ?3 AND b.valid = 'Y'
         LIMIT 1",
        RatioName::ALL
            .iter()
            .map(|r| format!("b.{}", r.as_str()))
            .collect::<Vec<_>>()
            .join(", ")
    );

    let row = conn
        .query_row(&sql, params![industry_code, year, firm_size_type], |row| {
            let mut ratios = RatioSet::new();
            for (offset, name) in RatioName::ALL.iter().enumerate() {
                ratios.insert_opt(*name, row.get::<_, Option<f64>>(5 + offset)?);
            }

            Ok(BenchmarkRow {
                industry_code: row.get(0)?,
                industry_name: row.get(1)?,
                year: row.get(2)?,
                firm_size_type: row.get(3)?,
                valid: row.get::<_, String>(4)? == "Y",
                ratios,
            })
        })
        .optional()?;

    Ok(row)
}

/// List (year, firm size) pairs with a valid benchmark for an industry
pub fn list_benchmark_keys(conn: &Connection, industry_code: &str) -> Result<Vec<BenchmarkKey>> {
    let mut stmt = conn.prepare(
        "SELECT year, firm_size_type FROM industry_benchmarks
         WHERE industry_code = ?1 AND valid = 'Y'
         ORDER BY year DESC, firm_size_type",
    )?;
    let keys = stmt
        .query_map([industry_code], |row| {
            Ok(BenchmarkKey {
                year: row.get(0)?,
                firm_size_type: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(keys)
}

/// Insert or replace benchmark rows in one transaction
pub fn upsert_benchmarks(conn: &mut Connection, rows: &[BenchmarkRow]) -> Result<usize> {
    let columns = ratio_columns();
    let placeholders = (5..5 + RatioName::ALL.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");
    let updates = RatioName::ALL
        .iter()
        .map(|r| format!("{0} = excluded.{0}", r.as_str()))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!(
        "INSERT INTO industry_benchmarks (industry_code, year, firm_size_type, valid, {columns})
         VALUES (?1, ?2, ?3, ?4, {placeholders})
         ON CONFLICT(industry_code, year, firm_size_type) DO UPDATE SET
           valid = excluded.valid, {updates}, updated_at = datetime('now')"
    );

    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(&sql)?;
        for row in rows {
            let mut values: Vec<Value> = vec![
                Value::Text(row.industry_code.clone()),
                Value::Integer(i64::from(row.year)),
                Value::Text(row.firm_size_type.clone()),
                Value::Text(if row.valid { "Y" } else { "N" }.to_string()),
            ];
            values.extend(RatioName::ALL.iter().map(|name| {
                row.ratios
                    .get(*name)
                    .map(Value::Real)
                    .unwrap_or(Value::Null)
            }));
            stmt.execute(params_from_iter(values))?;
        }
    }
    tx.commit()?;

    tracing::info!("Upserted {} benchmark rows", rows.len());
    Ok(rows.len())
}
