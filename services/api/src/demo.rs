use crate::infra::{parse_cli_date, seed_from_sheets, InMemoryRenewalStore, LoggingDispatcher};
use chrono::{Datelike, Local, Months, NaiveDate};
use clap::Args;
use renewdesk::dates;
use renewdesk::error::AppError;
use renewdesk::renewals::{
    EngineError, InstallmentPolicy, InstallmentStatus, LicensePlate, NotificationEngine,
    NotifyRunReport, NotifyStatus, NotifyWindow, RenewalOverview, RenewalRecord, RenewalStatus,
    RenewalStore,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct NotifyArgs {
    /// Evaluation date (DD/MM/YYYY or YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_cli_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Customer sheet (CSV) to load before the pass
    #[arg(long)]
    pub(crate) customers: Option<PathBuf>,
    /// Installment policy sheet (CSV) to load before the pass
    #[arg(long)]
    pub(crate) policies: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date for the walkthrough (defaults to today)
    #[arg(long, value_parser = parse_cli_date)]
    pub(crate) today: Option<NaiveDate>,
}

fn engine_over(
    store: Arc<InMemoryRenewalStore>,
) -> NotificationEngine<InMemoryRenewalStore, LoggingDispatcher> {
    NotificationEngine::new(store, Arc::new(LoggingDispatcher), NotifyWindow::default())
}

pub(crate) fn run_notify_run(args: NotifyArgs) -> Result<(), AppError> {
    let NotifyArgs {
        today,
        customers,
        policies,
    } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let store = Arc::new(InMemoryRenewalStore::default());
    let (customer_count, policy_count) =
        seed_from_sheets(&store, customers.as_deref(), policies.as_deref())?;
    println!(
        "Loaded {} customers and {} installment policies",
        customer_count, policy_count
    );

    let engine = engine_over(store);
    let outcome = engine.run(today)?;
    render_run_report(&outcome);
    Ok(())
}

pub(crate) fn run_notify_report(args: NotifyArgs) -> Result<(), AppError> {
    let NotifyArgs {
        today,
        customers,
        policies,
    } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let store = Arc::new(InMemoryRenewalStore::default());
    seed_from_sheets(&store, customers.as_deref(), policies.as_deref())?;

    let engine = engine_over(store);
    let overview = engine.overview(today)?;
    render_overview(&overview);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    println!("Renewal reminder demo (evaluated {})", dates::format_display(today));
    let store = Arc::new(InMemoryRenewalStore::default());
    seed_demo_data(&store, today)?;

    let engine = engine_over(store);

    println!("\n== Counter overview ==");
    render_overview(&engine.overview(today)?);

    println!("\n== First notification pass ==");
    render_run_report(&engine.run(today)?);

    println!("\n== Second pass, same day (nothing repeats) ==");
    render_run_report(&engine.run(today)?);

    println!("\n== Customer pays installment 3, another customer renews ==");
    let plan_plate = LicensePlate::parse("1กก777").map_err(EngineError::from)?;
    let paid = engine.record_installment_payment(&plan_plate, 3, today)?;
    println!(
        "- plan {}: {}/{} paid, status {}",
        paid.plate,
        paid.paid_count(),
        paid.installment_count,
        paid.status.label()
    );
    let renewal_plate = LicensePlate::parse("กข1234").map_err(EngineError::from)?;
    let renewed = engine.record_renewal(&renewal_plate, today)?;
    println!(
        "- record {}: status {}, new period from {}",
        renewed.plate,
        renewed.status.label(),
        renewed.register_date
    );

    println!("\n== Pass after the visits (both cycles are closed) ==");
    render_run_report(&engine.run(today)?);

    Ok(())
}

/// Seed a store with dates placed relative to `today` so every bucket shows
/// up no matter which day the demo runs on.
fn seed_demo_data(store: &InMemoryRenewalStore, today: NaiveDate) -> Result<(), AppError> {
    let due_soon = today
        .checked_sub_months(Months::new(11))
        .unwrap_or(today);
    let overdue = today
        .checked_sub_months(Months::new(13))
        .unwrap_or(today);
    let fresh = today.checked_sub_months(Months::new(2)).unwrap_or(today);

    let records = [
        ("กข1234", "สมชาย ใจดี", "081-234-5678", dates::format_display(due_soon)),
        ("ขค5678", "สมหญิง รักดี", "0899999999", dates::format_display(overdue)),
        ("2ฮฮ99", "วิชัย มั่นคง", "0861112222", dates::format_display(fresh)),
        ("ชม1111", "ประยุทธ มั่งมี", "ไม่มีเบอร์", dates::format_display(due_soon)),
    ];
    for (plate, name, phone, register_date) in records {
        let record = RenewalRecord {
            plate: LicensePlate::parse(plate).map_err(EngineError::from)?,
            customer_name: name.to_string(),
            phone: phone.to_string(),
            register_date,
            status: RenewalStatus::Pending,
            notify_status: NotifyStatus::default(),
        };
        store.insert_renewal(record).map_err(EngineError::from)?;
    }

    let plan_start = today.checked_sub_months(Months::new(2)).unwrap_or(today);
    let mut paid_dates = std::collections::BTreeMap::new();
    paid_dates.insert(1, dates::format_display(plan_start));
    paid_dates.insert(
        2,
        dates::format_display(dates::add_months(plan_start, 1).unwrap_or(plan_start)),
    );
    let policy = InstallmentPolicy {
        plate: LicensePlate::parse("1กก777").map_err(EngineError::from)?,
        insurance_company: "วิริยะประกันภัย".to_string(),
        premium: 18000,
        installment_count: 6,
        current_installment: 2,
        start_date: dates::format_display(plan_start),
        payment_day: today.day(),
        paid_dates,
        status: InstallmentStatus::InProgress,
        notify_status: NotifyStatus::default(),
    };
    store.insert_policy(policy).map_err(EngineError::from)?;

    let plan_record = RenewalRecord {
        plate: LicensePlate::parse("1กก777").map_err(EngineError::from)?,
        customer_name: "อารีย์ พานิช".to_string(),
        phone: "0812223333".to_string(),
        register_date: dates::format_display(fresh),
        status: RenewalStatus::Pending,
        notify_status: NotifyStatus::default(),
    };
    store.insert_renewal(plan_record).map_err(EngineError::from)?;

    Ok(())
}

fn render_overview(overview: &RenewalOverview) {
    println!("Due-list overview for {}", overview.today_display);
    println!(
        "- {} renewal records | {} installment policies",
        overview.renewal_total, overview.policy_total
    );
    println!(
        "- buckets: {} due soon | {} overdue | {} not due | {} unreadable",
        overview.buckets.due_soon,
        overview.buckets.overdue,
        overview.buckets.not_due,
        overview.buckets.unclassifiable
    );

    if overview.due_list.is_empty() {
        println!("\nDue list: empty");
    } else {
        println!("\nDue list");
        for entry in &overview.due_list {
            let contact = if entry.contactable {
                "contactable"
            } else {
                "no usable phone"
            };
            println!(
                "- {} | {} | expires {} ({} days) | {} | {}{}",
                entry.plate,
                entry.customer_name,
                entry.expiry_display,
                entry.days_remaining,
                entry.status_label,
                contact,
                if entry.notified { " | แจ้งแล้ว" } else { "" }
            );
        }
    }

    if !overview.policy_watch.is_empty() {
        println!("\nInstallment watch list");
        for entry in &overview.policy_watch {
            let next = match entry.next_installment {
                Some(n) => format!("next installment {}", n),
                None => "fully paid".to_string(),
            };
            let expiry = match &entry.expiry_display {
                Some(display) => format!("coverage ends {}", display),
                None => "coverage end unknown".to_string(),
            };
            println!(
                "- {} | {} | {}/{} paid | {} | {} | {}",
                entry.plate,
                entry.insurance_company,
                entry.paid_count,
                entry.installment_count,
                next,
                expiry,
                entry.status_label
            );
        }
    }
}

fn render_run_report(outcome: &NotifyRunReport) {
    println!("Notification pass for {}", dates::format_display(outcome.today));
    println!(
        "- scanned {} | selected {} | sent {} | already notified {} | failed {}",
        outcome.scanned, outcome.selected, outcome.sent, outcome.already_notified, outcome.failed
    );
    if outcome.reclassified > 0 {
        println!("- refreshed {} stored statuses", outcome.reclassified);
    }

    if outcome.notifications.is_empty() {
        println!("- no messages dispatched");
    } else {
        println!("\nMessages");
        for notification in &outcome.notifications {
            println!(
                "- [{}] {} -> {}: {}",
                notification.kind.label(),
                notification.plate,
                notification.phone,
                notification.message
            );
        }
    }
}
