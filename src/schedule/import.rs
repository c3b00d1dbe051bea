use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::schedule::generator::ScheduleRow;

/// one spreadsheet row as exported by the bank: `N° Cuota`, `Fecha`, `Cuota`,
/// `Interés`, `Capital`, `Seguro`, `Saldo Final`. Cells arrive as text; the
/// splitting itself is the caller's concern.
#[derive(Debug, Clone, PartialEq)]
pub struct RawScheduleRow {
    pub period: String,
    pub date: String,
    pub payment: String,
    pub interest: String,
    pub capital: String,
    pub insurance: String,
    pub ending_balance: String,
}

/// schedule rebuilt from a spreadsheet, with the figures the table implies
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedSchedule {
    pub rows: Vec<ScheduleRow>,
    /// first row's total payment, taken as the loan's flat monthly payment
    pub derived_payment: Money,
    /// first row's ending balance plus its capital portion
    pub derived_principal: Money,
    pub total_payable: Money,
}

/// parse a numeric cell, stripping thousands separators and currency noise
pub fn parse_amount(cell: &str) -> Result<Money> {
    let cleaned: String = cell
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | ' ' | '\u{a0}'))
        .collect();

    if cleaned.is_empty() {
        return Ok(Money::ZERO);
    }

    Decimal::from_str(&cleaned)
        .map(Money::from_decimal)
        .map_err(|_| LedgerError::InvalidImport {
            message: format!("unparseable amount cell: {cell:?}"),
        })
}

fn parse_period(cell: &str) -> Result<u32> {
    cell.trim()
        .parse::<u32>()
        .map_err(|_| LedgerError::InvalidImport {
            message: format!("unparseable period cell: {cell:?}"),
        })
}

/// parse a `Fecha` cell as dd/mm/yyyy; empty cells are tolerated
fn parse_date(cell: &str) -> Result<Option<DateTime<Utc>>> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    NaiveDate::parse_from_str(trimmed, "%d/%m/%Y")
        .map(|d| Some(d.and_time(NaiveTime::MIN).and_utc()))
        .map_err(|_| LedgerError::InvalidImport {
            message: format!("unparseable date cell: {cell:?}"),
        })
}

/// rebuild an amortization table from spreadsheet rows
///
/// The derived monthly payment is the first row's `Cuota`; the derived
/// principal is the first row's `Saldo Final` plus its `Capital`.
pub fn import_schedule(raw_rows: &[RawScheduleRow]) -> Result<ImportedSchedule> {
    if raw_rows.is_empty() {
        return Err(LedgerError::InvalidImport {
            message: "schedule has no rows".to_string(),
        });
    }

    let mut rows = Vec::with_capacity(raw_rows.len());
    let mut total_payable = Money::ZERO;

    for raw in raw_rows {
        let row = ScheduleRow {
            period: parse_period(&raw.period)?,
            due_date: parse_date(&raw.date)?,
            payment: parse_amount(&raw.payment)?,
            interest: parse_amount(&raw.interest)?,
            capital: parse_amount(&raw.capital)?,
            insurance: parse_amount(&raw.insurance)?,
            balance: parse_amount(&raw.ending_balance)?,
        };
        total_payable += row.payment;
        rows.push(row);
    }

    let first = &rows[0];
    let derived_payment = first.payment;
    let derived_principal = first.balance + first.capital;

    Ok(ImportedSchedule {
        rows,
        derived_payment,
        derived_principal,
        total_payable,
    })
}
