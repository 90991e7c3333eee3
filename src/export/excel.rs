//! Excel出力

use super::{matched_columns, AUDIT_COLUMNS};
use crate::error::{AuctionError, Result};
use crate::pipeline::Reconciliation;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::path::Path;

pub const MATCHED_SHEET: &str = "auction";
pub const AUDIT_SHEET: &str = "match_list";

pub fn write_matched(reconciliation: &Reconciliation, path: &Path) -> Result<()> {
    build_matched(reconciliation, path).map_err(|e| output_error(path, e))
}

pub fn write_audit(reconciliation: &Reconciliation, path: &Path) -> Result<()> {
    build_audit(reconciliation, path).map_err(|e| output_error(path, e))
}

fn build_matched(reconciliation: &Reconciliation, path: &Path) -> std::result::Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(MATCHED_SHEET)?;

    let columns = matched_columns(reconciliation);
    for (col, name) in columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, name.as_str(), &header)?;
    }

    for (i, row) in reconciliation.matched.iter().enumerate() {
        let r = (i + 1) as u32;
        for (col, value) in row.record.fields.iter().enumerate() {
            worksheet.write_string(r, col as u16, value.as_str())?;
        }
        let col = row.record.fields.len() as u16;
        worksheet.write_string(r, col, row.search_term.as_str())?;
        worksheet.write_number(r, col + 1, row.match_score)?;
    }

    workbook.save(path)?;
    Ok(())
}

fn build_audit(reconciliation: &Reconciliation, path: &Path) -> std::result::Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(AUDIT_SHEET)?;

    for (col, name) in AUDIT_COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &header)?;
    }

    for (i, row) in reconciliation.audit.iter().enumerate() {
        let r = (i + 1) as u32;
        worksheet.write_string(r, 0, row.original.as_str())?;
        worksheet.write_string(r, 1, row.cleaned.as_str())?;
        worksheet.write_string(r, 2, row.matched_name.as_str())?;
        worksheet.write_number(r, 3, row.score)?;
    }

    workbook.save(path)?;
    Ok(())
}

fn output_error(path: &Path, e: XlsxError) -> AuctionError {
    AuctionError::OutputWrite(format!("{}: {}", path.display(), e))
}
