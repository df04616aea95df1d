//! Spreadsheet onboarding.
//!
//! Shops arrive with exported sheets, one row per vehicle, Thai column
//! headers. Import is deliberately tolerant about phone numbers and dates
//! (the engine fail-closes on those later) but refuses rows without a
//! license plate: a blank key means the sheet is misaligned, and silently
//! dropping the row would lose a customer.

use std::io::Read;

use serde::{Deserialize, Deserializer};

use crate::dates;
use crate::renewals::domain::{
    InstallmentPolicy, InstallmentStatus, LicensePlate, NotifyStatus, RenewalRecord, RenewalStatus,
};

/// Import failures. Row numbers count the header as row 1, matching what a
/// spreadsheet application shows.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("row {row}: license plate is missing")]
    MissingPlate { row: usize },
    #[error("row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Deserialize)]
struct CustomerRow {
    #[serde(rename = "ทะเบียนรถ", default)]
    plate: String,
    #[serde(rename = "ชื่อลูกค้า", default, deserialize_with = "empty_string_as_none")]
    customer_name: Option<String>,
    #[serde(rename = "เบอร์โทร", default, deserialize_with = "empty_string_as_none")]
    phone: Option<String>,
    #[serde(
        rename = "วันที่ชำระล่าสุด",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    register_date: Option<String>,
}

/// Read a customer sheet into storable renewal records.
///
/// Every imported record starts out `รอดำเนินการ` with a clear notified
/// flag; the first batch run derives the real bucket from the register date.
pub fn import_renewals<R: Read>(reader: R) -> Result<Vec<RenewalRecord>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for (index, row) in csv_reader.deserialize::<CustomerRow>().enumerate() {
        let row_number = index + 2;
        let row = row?;
        let plate = LicensePlate::parse(&row.plate)
            .map_err(|_| ImportError::MissingPlate { row: row_number })?;
        records.push(RenewalRecord {
            plate,
            customer_name: row.customer_name.unwrap_or_default(),
            phone: row.phone.unwrap_or_default(),
            register_date: row.register_date.unwrap_or_default(),
            status: RenewalStatus::Pending,
            notify_status: NotifyStatus::default(),
        });
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct PolicyRow {
    #[serde(rename = "ทะเบียนรถ", default)]
    plate: String,
    #[serde(rename = "บริษัทประกัน", default)]
    insurance_company: String,
    #[serde(rename = "เบี้ยประกัน", default)]
    premium: u32,
    #[serde(rename = "จำนวนงวด", default)]
    installment_count: u32,
    #[serde(rename = "งวดที่ชำระแล้ว", default)]
    paid_installments: u32,
    #[serde(rename = "วันเริ่มสัญญา", default, deserialize_with = "empty_string_as_none")]
    start_date: Option<String>,
    #[serde(rename = "วันที่ชำระ", default)]
    payment_day: u32,
}

/// Read an installment-policy sheet.
///
/// Sheets record how many installments are already paid but not when, so
/// the payment log is reconstructed at one month per installment from the
/// start date. Plan shape problems (no installments, impossible payment
/// day) reject the row; an unreadable start date survives and simply never
/// signals a due day.
pub fn import_policies<R: Read>(reader: R) -> Result<Vec<InstallmentPolicy>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut policies = Vec::new();

    for (index, row) in csv_reader.deserialize::<PolicyRow>().enumerate() {
        let row_number = index + 2;
        let row = row?;
        let plate = LicensePlate::parse(&row.plate)
            .map_err(|_| ImportError::MissingPlate { row: row_number })?;
        if row.installment_count == 0 {
            return Err(ImportError::InvalidRow {
                row: row_number,
                reason: "installment plan needs at least one installment".to_string(),
            });
        }
        if !(1..=31).contains(&row.payment_day) {
            return Err(ImportError::InvalidRow {
                row: row_number,
                reason: format!("payment day {} is not a calendar day", row.payment_day),
            });
        }

        let paid = row.paid_installments.min(row.installment_count);
        let start_date = row.start_date.unwrap_or_default();
        let mut paid_dates = std::collections::BTreeMap::new();
        if let Some(start) = dates::parse_date(&start_date) {
            for installment in 1..=paid {
                if let Some(paid_on) = dates::add_months(start, installment - 1) {
                    paid_dates.insert(installment, dates::format_display(paid_on));
                }
            }
        }

        let status = if paid >= row.installment_count {
            InstallmentStatus::Completed
        } else {
            InstallmentStatus::InProgress
        };
        policies.push(InstallmentPolicy {
            plate,
            insurance_company: row.insurance_company,
            premium: row.premium,
            installment_count: row.installment_count,
            current_installment: paid,
            start_date,
            payment_day: row.payment_day,
            paid_dates,
            status,
            notify_status: NotifyStatus::default(),
        });
    }

    Ok(policies)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
