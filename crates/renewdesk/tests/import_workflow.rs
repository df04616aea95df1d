//! Spreadsheet import scenarios: Thai-headed CSV exports in, storable
//! records out, and a selection pass over freshly imported data.

mod customer_sheet {
    use renewdesk::renewals::{import_renewals, ImportError, RenewalStatus};

    #[test]
    fn imports_rows_with_thai_headers() {
        let sheet = "\
ทะเบียนรถ,ชื่อลูกค้า,เบอร์โทร,วันที่ชำระล่าสุด
กข 1234,สมชาย ใจดี,081-234-5678,15/01/2024
ขค5678,สมหญิง รักดี,ไม่มีเบอร์,
1กก777,,0899999999,2024-03-05
";
        let records = import_renewals(sheet.as_bytes()).expect("sheet imports");

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].plate.as_str(), "กข1234");
        assert_eq!(records[0].phone, "081-234-5678");
        assert_eq!(records[0].register_date, "15/01/2024");

        // Messy contact details and blank dates survive import untouched;
        // the notification pass fail-closes on them later.
        assert_eq!(records[1].phone, "ไม่มีเบอร์");
        assert!(records[1].contact_phone().is_none());
        assert_eq!(records[1].register_date, "");
        assert!(records[1].register_date().is_none());

        assert_eq!(records[2].customer_name, "");
        assert!(records[2].register_date().is_some());

        for record in &records {
            assert_eq!(record.status, RenewalStatus::Pending);
            assert!(!record.notify_status.is_notified());
        }
    }

    #[test]
    fn a_blank_plate_fails_with_the_sheet_row_number() {
        let sheet = "\
ทะเบียนรถ,ชื่อลูกค้า,เบอร์โทร,วันที่ชำระล่าสุด
กข1234,สมชาย,0812345678,15/01/2024
   ,สมหญิง,0899999999,20/02/2024
";
        let err = import_renewals(sheet.as_bytes()).expect_err("blank plate rejected");
        assert!(matches!(err, ImportError::MissingPlate { row: 3 }));
    }
}

mod policy_sheet {
    use renewdesk::renewals::{import_policies, ImportError, InstallmentStatus};

    #[test]
    fn reconstructs_monthly_paid_dates_from_the_start() {
        let sheet = "\
ทะเบียนรถ,บริษัทประกัน,เบี้ยประกัน,จำนวนงวด,งวดที่ชำระแล้ว,วันเริ่มสัญญา,วันที่ชำระ
1กก777,วิริยะประกันภัย,12000,6,2,05/01/2024,5
";
        let policies = import_policies(sheet.as_bytes()).expect("sheet imports");

        assert_eq!(policies.len(), 1);
        let policy = &policies[0];
        assert_eq!(policy.installment_count, 6);
        assert_eq!(policy.current_installment, 2);
        assert_eq!(policy.status, InstallmentStatus::InProgress);
        assert_eq!(policy.paid_dates.len(), 2);
        assert_eq!(policy.paid_dates.get(&1).map(String::as_str), Some("05/01/2024"));
        assert_eq!(policy.paid_dates.get(&2).map(String::as_str), Some("05/02/2024"));
    }

    #[test]
    fn fully_paid_sheets_arrive_completed() {
        let sheet = "\
ทะเบียนรถ,บริษัทประกัน,เบี้ยประกัน,จำนวนงวด,งวดที่ชำระแล้ว,วันเริ่มสัญญา,วันที่ชำระ
2ขค88,กรุงเทพประกันภัย,9000,3,5,10/02/2024,10
";
        let policies = import_policies(sheet.as_bytes()).expect("sheet imports");

        // Paid counts beyond the plan clamp to the plan length.
        assert_eq!(policies[0].status, InstallmentStatus::Completed);
        assert_eq!(policies[0].current_installment, 3);
        assert_eq!(policies[0].paid_dates.len(), 3);
    }

    #[test]
    fn plan_shape_problems_reject_the_row() {
        let no_installments = "\
ทะเบียนรถ,บริษัทประกัน,เบี้ยประกัน,จำนวนงวด,งวดที่ชำระแล้ว,วันเริ่มสัญญา,วันที่ชำระ
กข1234,วิริยะ,12000,0,0,05/01/2024,5
";
        assert!(matches!(
            import_policies(no_installments.as_bytes()),
            Err(ImportError::InvalidRow { row: 2, .. })
        ));

        let bad_day = "\
ทะเบียนรถ,บริษัทประกัน,เบี้ยประกัน,จำนวนงวด,งวดที่ชำระแล้ว,วันเริ่มสัญญา,วันที่ชำระ
กข1234,วิริยะ,12000,6,0,05/01/2024,5
ขค5678,วิริยะ,9000,6,0,05/01/2024,32
";
        assert!(matches!(
            import_policies(bad_day.as_bytes()),
            Err(ImportError::InvalidRow { row: 3, .. })
        ));
    }

    #[test]
    fn unreadable_start_dates_survive_without_a_payment_log() {
        let sheet = "\
ทะเบียนรถ,บริษัทประกัน,เบี้ยประกัน,จำนวนงวด,งวดที่ชำระแล้ว,วันเริ่มสัญญา,วันที่ชำระ
กข1234,วิริยะ,12000,6,2,ต้นปีที่แล้ว,5
";
        let policies = import_policies(sheet.as_bytes()).expect("sheet imports");

        assert_eq!(policies[0].start_date, "ต้นปีที่แล้ว");
        assert!(policies[0].start_date().is_none());
        assert!(policies[0].paid_dates.is_empty());
        // The stored paid count is still what the sheet said.
        assert_eq!(policies[0].current_installment, 2);
    }
}

mod selection_after_import {
    use chrono::NaiveDate;
    use renewdesk::renewals::notify::select_for_notification;
    use renewdesk::renewals::{
        import_policies, import_renewals, NotificationKind, NotifyLedger, NotifyWindow,
    };

    #[test]
    fn imported_sheets_feed_the_notification_pass() {
        let customers = "\
ทะเบียนรถ,ชื่อลูกค้า,เบอร์โทร,วันที่ชำระล่าสุด
กข1234,สมชาย ใจดี,081-234-5678,15/01/2024
ขค5678,สมหญิง รักดี,-,15/01/2024
";
        let policies_sheet = "\
ทะเบียนรถ,บริษัทประกัน,เบี้ยประกัน,จำนวนงวด,งวดที่ชำระแล้ว,วันเริ่มสัญญา,วันที่ชำระ
กข1234,วิริยะประกันภัย,24000,12,6,20/05/2024,20
";
        let records = import_renewals(customers.as_bytes()).expect("customers import");
        let policies = import_policies(policies_sheet.as_bytes()).expect("policies import");

        let today = NaiveDate::from_ymd_opt(2024, 11, 20).expect("valid date");
        let selected = select_for_notification(
            &records,
            &policies,
            &NotifyLedger::new(),
            &NotifyLedger::new(),
            today,
            &NotifyWindow::default(),
        );

        // The due installment outranks the 56-days-out tax renewal;
        // the customer without a usable phone is absent entirely.
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].kind, NotificationKind::InstallmentDue);
        assert_eq!(selected[0].installment, Some(7));
        assert!(selected[0].message.contains("งวดที่ 7/12"));
        assert_eq!(selected[1].kind, NotificationKind::TaxRenewal);
        assert_eq!(selected[1].days_remaining, 56);
        assert!(selected[1].message.contains("15/01/2025"));
    }
}
