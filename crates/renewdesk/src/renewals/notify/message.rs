//! Outbound message templates.
//!
//! Fixed Thai-language texts; every template carries the license plate and
//! any date in `DD/MM/YYYY` display form.

use chrono::NaiveDate;

use crate::dates;
use crate::renewals::domain::LicensePlate;

/// Tax-renewal reminder for a record inside the due-soon window.
pub fn renewal_reminder(plate: &LicensePlate, expiry: NaiveDate, days_remaining: i64) -> String {
    let expiry_display = dates::format_display(expiry);
    if days_remaining == 0 {
        format!(
            "แจ้งเตือน: ภาษีรถทะเบียน {} ครบกำหนดวันนี้ ({}) กรุณาติดต่อร้านเพื่อต่อภาษี",
            plate, expiry_display
        )
    } else {
        format!(
            "แจ้งเตือน: ภาษีรถทะเบียน {} จะครบกำหนดวันที่ {} (เหลืออีก {} วัน) กรุณาติดต่อร้านเพื่อต่อภาษี",
            plate, expiry_display, days_remaining
        )
    }
}

/// Reminder that an installment payment falls due today.
pub fn installment_due_reminder(plate: &LicensePlate, installment: u32, count: u32) -> String {
    format!(
        "แจ้งเตือน: ค่างวดประกันรถทะเบียน {} งวดที่ {}/{} ครบกำหนดชำระวันนี้",
        plate, installment, count
    )
}

/// Reminder that the whole installment plan's coverage is about to run out
/// (or just ran out).
pub fn policy_expiry_reminder(plate: &LicensePlate, expiry: NaiveDate, days_remaining: i64) -> String {
    let expiry_display = dates::format_display(expiry);
    if days_remaining < 0 {
        format!(
            "แจ้งเตือน: ประกันผ่อนชำระรถทะเบียน {} ครบสัญญาไปแล้วเมื่อวันที่ {} กรุณาติดต่อร้านเพื่อต่ออายุ",
            plate, expiry_display
        )
    } else {
        format!(
            "แจ้งเตือน: ประกันผ่อนชำระรถทะเบียน {} จะครบสัญญาวันที่ {} (เหลืออีก {} วัน) กรุณาติดต่อร้านเพื่อต่ออายุ",
            plate, expiry_display, days_remaining
        )
    }
}
