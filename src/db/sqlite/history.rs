//! Diagnosis history
//!
//! Each diagnosis is kept as an opaque JSON blob. The summary columns next
//! to it are copies used only for filtering and listing.

use crate::db::sqlite::models::{
    HistoryFilter, HistoryRecord, HistoryStats, HistorySummary,
};
use crate::diagnosis::{DiagnosisResult, RiskLevel};
use crate::error::Result;
use rusqlite::{params, types::Type, Connection, OptionalExtension, Row, ToSql};

fn parse_risk(row: &Row<'_>, idx: usize) -> rusqlite::Result<RiskLevel> {
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e: String| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

/// WHERE clause and its parameters for a filter
fn where_clause(filter: &HistoryFilter) -> (String, Vec<Box<dyn ToSql>>) {
    let mut conditions = Vec::new();
    let mut params: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(risk) = filter.risk_level {
        conditions.push("risk_level = ?");
        params.push(Box::new(risk.as_str().to_string()));
    }

    if let Some(code) = &filter.industry_code {
        conditions.push("industry_code = ?");
        params.push(Box::new(code.clone()));
    }

    if let Some(company) = &filter.company {
        conditions.push("instr(company_name, ?) > 0");
        params.push(Box::new(company.clone()));
    }

    let clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (clause, params)
}

/// Store a diagnosis and return its id
pub fn insert_diagnosis(
    conn: &Connection,
    industry_code: &str,
    result: &DiagnosisResult,
) -> Result<i64> {
    let result_json = serde_json::to_string(result)?;

    conn.execute(
        r#"
        INSERT INTO diagnosis_history
            (company_name, industry_code, industry_name, year, firm_size_type, risk_level, result_json)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        params![
            result.company_name,
            industry_code,
            result.industry_name,
            result.year,
            result.firm_size_type,
            result.risk_level.as_str(),
            result_json
        ],
    )?;

    let id = conn.last_insert_rowid();
    tracing::debug!(
        "Stored diagnosis id={} company={} risk={}",
        id,
        result.company_name,
        result.risk_level
    );

    Ok(id)
}

/// List history newest first
pub fn list_history(
    conn: &Connection,
    filter: &HistoryFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<HistorySummary>> {
    let (clause, mut params_vec) = where_clause(filter);
    params_vec.push(Box::new(limit));
    params_vec.push(Box::new(offset));

    let sql = format!(
        r#"
        SELECT id, company_name, industry_code, industry_name, year, firm_size_type,
               risk_level, created_at
        FROM diagnosis_history
        {}
        ORDER BY created_at DESC, id DESC
        LIMIT ? OFFSET ?
        "#,
        clause
    );

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();

    let rows = stmt
        .query_map(params_refs.as_slice(), |row| {
            Ok(HistorySummary {
                id: row.get(0)?,
                company_name: row.get(1)?,
                industry_code: row.get(2)?,
                industry_name: row.get(3)?,
                year: row.get(4)?,
                firm_size_type: row.get(5)?,
                risk_level: parse_risk(row, 6)?,
                created_at: row.get(7)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Count history rows matching a filter
pub fn count_history(conn: &Connection, filter: &HistoryFilter) -> Result<i64> {
    let (clause, params_vec) = where_clause(filter);
    let sql = format!("SELECT COUNT(*) FROM diagnosis_history {}", clause);
    let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();

    let count = conn.query_row(&sql, params_refs.as_slice(), |row| row.get(0))?;
    Ok(count)
}

/// Fetch one stored diagnosis
pub fn get_history(conn: &Connection, id: i64) -> Result<Option<HistoryRecord>> {
    let row = conn
        .query_row(
            "SELECT id, industry_code, created_at, result_json FROM diagnosis_history WHERE id = ?1",
            [id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )
        .optional()?;

    match row {
        Some((id, industry_code, created_at, result_json)) => Ok(Some(HistoryRecord {
            id,
            industry_code,
            created_at,
            result: serde_json::from_str(&result_json)?,
        })),
        None => Ok(None),
    }
}

/// Delete one record, returns whether it existed
pub fn delete_history(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM diagnosis_history WHERE id = ?1", [id])?;
    Ok(deleted > 0)
}

/// Totals per risk tier
pub fn history_stats(conn: &Connection) -> Result<HistoryStats> {
    let mut stmt =
        conn.prepare("SELECT risk_level, COUNT(*) FROM diagnosis_history GROUP BY risk_level")?;
    let counts = stmt
        .query_map([], |row| Ok((parse_risk(row, 0)?, row.get::<_, i64>(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut stats = HistoryStats::default();
    for (risk, count) in counts {
        match risk {
            RiskLevel::High => stats.high = count,
            RiskLevel::Medium => stats.medium = count,
            RiskLevel::Low => stats.low = count,
        }
        stats.total += count;
    }

    Ok(stats)
}
