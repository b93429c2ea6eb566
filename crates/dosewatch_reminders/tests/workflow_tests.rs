
use chrono::Duration;
use dosewatch_common::models::{DeliveryStatus, ReminderChannel};
use dosewatch_common::services::DeliveryError;
use dosewatch_reminders::catalog::{create_medication, CreateMedicationRequest};
use dosewatch_reminders::links::SnoozeLinkQuery;
use dosewatch_reminders::selector::{claim, select_due};
use dosewatch_reminders::{run_dispatch_cycle, snooze, snooze_from_link, ReminderError};
use fixtures::{
    base_time, harness, harness_with_links, medication, profile, subscription, PUBLIC_BASE_URL,
};

fn count(
    history: &[dosewatch_common::models::ReminderHistory],
    channel: ReminderChannel,
    status: DeliveryStatus,
) -> usize {
    history
        .iter()
        .filter(|row| row.channel == channel && row.status == status)
        .count()
}

#[tokio::test]
async fn test_lisinopril_push_and_email_then_rescheduled() {
    let h = harness().await;
    let now = base_time();
    h.seed_profile(&profile("u1", true, false, true)).await;
    h.seed_medication(&medication("m1", "u1", 12, Some(now - Duration::minutes(1))))
        .await;
    h.seed_subscription(&subscription("s1", "u1", "https://push.example.com/a"))
        .await;

    let report = run_dispatch_cycle(&h.ctx).await.unwrap();

    assert_eq!(report.claimed, 1);
    assert_eq!(report.attempts, 2);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.rescheduled, 1);

    let pushes = h.push.sent();
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].0, "https://push.example.com/a");
    assert_eq!(pushes[0].1.body, "Time to take Lisinopril (10mg)");
    assert_eq!(pushes[0].1.tag.as_deref(), Some("medication-m1"));

    let emails = h.email.sent();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].to, "ana@example.com");
    assert_eq!(emails[0].subject, "Time to take Lisinopril!");
    assert!(emails[0].html.contains("Next reminder will be in 12 hours"));

    assert!(h.sms.sent().is_empty());

    let history = h.history("m1").await;
    assert_eq!(history.len(), 2);
    assert_eq!(count(&history, ReminderChannel::Push, DeliveryStatus::Success), 1);
    assert_eq!(count(&history, ReminderChannel::Email, DeliveryStatus::Success), 1);
    assert!(history.iter().all(|row| row.user_id.as_deref() == Some("u1")));

    assert_eq!(h.next_reminder("m1").await, Some(now + Duration::hours(12)));
}

#[tokio::test]
async fn test_disabled_medication_is_never_selected() {
    let h = harness().await;
    let past = base_time() - Duration::hours(2);
    let mut med = medication("m1", "u1", 8, Some(past));
    med.reminder_enabled = false;
    h.seed_profile(&profile("u1", true, true, true)).await;
    h.seed_medication(&med).await;

    let report = run_dispatch_cycle(&h.ctx).await.unwrap();

    assert_eq!(report.due, 0);
    assert!(h.email.sent().is_empty());
    assert!(h.history("m1").await.is_empty());
    assert_eq!(h.next_reminder("m1").await, Some(past));
}

#[tokio::test]
async fn test_future_reminder_is_not_due() {
    let h = harness().await;
    let later = base_time() + Duration::minutes(5);
    h.seed_medication(&medication("m1", "u1", 8, Some(later))).await;

    let report = run_dispatch_cycle(&h.ctx).await.unwrap();

    assert_eq!(report.due, 0);
    assert_eq!(h.next_reminder("m1").await, Some(later));
}

#[tokio::test]
async fn test_missing_contact_writes_no_history_but_reschedules() {
    let h = harness().await;
    let mut owner = profile("u1", true, true, false);
    owner.email = None;
    owner.phone_number = Some("   ".to_string());
    h.seed_profile(&owner).await;
    h.seed_medication(&medication("m1", "u1", 6, Some(base_time()))).await;

    let report = run_dispatch_cycle(&h.ctx).await.unwrap();

    assert_eq!(report.claimed, 1);
    assert_eq!(report.attempts, 0);
    assert!(h.history("m1").await.is_empty());
    assert_eq!(
        h.next_reminder("m1").await,
        Some(base_time() + Duration::hours(6))
    );
}

#[tokio::test]
async fn test_user_without_profile_gets_push_only() {
    let h = harness().await;
    h.seed_medication(&medication("m1", "u1", 4, Some(base_time()))).await;
    h.seed_subscription(&subscription("s1", "u1", "https://push.example.com/a"))
        .await;

    let report = run_dispatch_cycle(&h.ctx).await.unwrap();

    assert_eq!(report.attempts, 1);
    assert_eq!(h.push.sent().len(), 1);
    assert!(h.email.sent().is_empty());
}

#[tokio::test]
async fn test_frequency_text_drives_the_next_reminder() {
    let h = harness().await;
    let created = create_medication(
        &h.ctx,
        CreateMedicationRequest {
            user_id: "u1".to_string(),
            name: "Amoxicillin".to_string(),
            dosage: "500mg".to_string(),
            frequency: Some("Every 8 hours".to_string()),
            interval_hours: None,
            time_of_day: vec![],
            notes: None,
            image_url: None,
            reminder_enabled: true,
            next_reminder: Some(base_time() - Duration::minutes(1)),
        },
    )
    .await
    .unwrap();
    assert_eq!(created.interval_hours, 8);

    run_dispatch_cycle(&h.ctx).await.unwrap();

    assert_eq!(
        h.next_reminder(&created.id).await,
        Some(base_time() + Duration::hours(8))
    );
}

#[tokio::test]
async fn test_gone_subscription_is_removed_without_success_row() {
    let h = harness().await;
    h.seed_profile(&profile("u1", false, false, true)).await;
    h.seed_medication(&medication("m1", "u1", 12, Some(base_time()))).await;
    h.seed_subscription(&subscription("s1", "u1", "https://push.example.com/live"))
        .await;
    h.seed_subscription(&subscription("s2", "u1", "https://push.example.com/expired"))
        .await;
    h.push.mark_gone("https://push.example.com/expired");

    let report = run_dispatch_cycle(&h.ctx).await.unwrap();

    assert_eq!(report.attempts, 2);
    assert_eq!(report.subscriptions_removed, 1);

    let remaining = h.subscriptions("u1").await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].endpoint, "https://push.example.com/live");

    let history = h.history("m1").await;
    assert_eq!(count(&history, ReminderChannel::Push, DeliveryStatus::Success), 1);
    assert_eq!(count(&history, ReminderChannel::Push, DeliveryStatus::Failed), 1);
    let failed = history
        .iter()
        .find(|row| row.status == DeliveryStatus::Failed)
        .unwrap();
    assert!(failed.error_message.as_deref().unwrap().contains("410"));
}

#[tokio::test]
async fn test_email_failure_does_not_block_sms() {
    let h = harness().await;
    h.seed_profile(&profile("u1", true, true, false)).await;
    h.seed_medication(&medication("m1", "u1", 12, Some(base_time()))).await;
    h.email.fail_with(DeliveryError::Rejected {
        status: 422,
        message: "invalid from address".to_string(),
    });

    let report = run_dispatch_cycle(&h.ctx).await.unwrap();

    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(h.sms.sent().len(), 1);
    assert_eq!(h.sms.sent()[0].to, "+15550001111");
    assert_eq!(
        h.sms.sent()[0].body,
        "Time to take Lisinopril (10mg). Next reminder in 12 hours."
    );

    let history = h.history("m1").await;
    let failed = history
        .iter()
        .find(|row| row.channel == ReminderChannel::Email)
        .unwrap();
    assert_eq!(failed.status, DeliveryStatus::Failed);
    assert!(failed
        .error_message
        .as_deref()
        .unwrap()
        .contains("invalid from address"));
    assert_eq!(count(&history, ReminderChannel::Sms, DeliveryStatus::Success), 1);

    // A failed channel still reschedules; nothing is retried in place.
    assert_eq!(
        h.next_reminder("m1").await,
        Some(base_time() + Duration::hours(12))
    );
}

#[tokio::test]
async fn test_second_cycle_does_not_redispatch() {
    let h = harness().await;
    h.seed_profile(&profile("u1", true, false, false)).await;
    h.seed_medication(&medication("m1", "u1", 12, Some(base_time()))).await;

    let first = run_dispatch_cycle(&h.ctx).await.unwrap();
    let second = run_dispatch_cycle(&h.ctx).await.unwrap();

    assert_eq!(first.claimed, 1);
    assert_eq!(second.due, 0);
    assert_eq!(h.email.sent().len(), 1);
}

#[tokio::test]
async fn test_claimed_reminder_is_skipped_until_lease_expires() {
    let h = harness().await;
    h.seed_profile(&profile("u1", true, false, false)).await;
    h.seed_medication(&medication("m1", "u1", 12, Some(base_time()))).await;

    // Another cycle claims the row and dies before rescheduling.
    let due = select_due(&h.ctx, base_time()).await.unwrap();
    assert_eq!(due.len(), 1);
    assert!(claim(&h.ctx, &due[0]).await.unwrap().is_some());

    let during_lease = run_dispatch_cycle(&h.ctx).await.unwrap();
    assert_eq!(during_lease.claimed, 0);
    assert!(h.email.sent().is_empty());

    h.clock.advance(h.ctx.settings.claim_lease + Duration::seconds(1));
    let after_lease = run_dispatch_cycle(&h.ctx).await.unwrap();
    assert_eq!(after_lease.claimed, 1);
    assert_eq!(h.email.sent().len(), 1);
}

#[tokio::test]
async fn test_racing_claims_have_one_winner() {
    let h = harness().await;
    h.seed_medication(&medication("m1", "u1", 12, Some(base_time()))).await;

    let due = select_due(&h.ctx, base_time()).await.unwrap();
    let (a, b) = tokio::join!(claim(&h.ctx, &due[0]), claim(&h.ctx, &due[0]));
    let winners = [a.unwrap(), b.unwrap()].iter().filter(|c| c.is_some()).count();
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn test_snooze_moves_reminder_and_confirms_by_email() {
    let h = harness().await;
    h.seed_profile(&profile("u1", true, false, true)).await;
    h.seed_medication(&medication("m1", "u1", 12, Some(base_time()))).await;

    let response = snooze(&h.ctx, "m1", 3.0).await.unwrap();

    let expected = base_time() + Duration::hours(3);
    assert!(response.success);
    assert_eq!(response.next_reminder, expected);
    assert_eq!(h.next_reminder("m1").await, Some(expected));

    let emails = h.email.sent();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].subject, "Reminder Snoozed");
    assert!(emails[0].html.contains("Your reminder for Lisinopril has been snoozed."));

    let history = h.history("m1").await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].channel, ReminderChannel::Snooze);
    assert_eq!(history[0].status, DeliveryStatus::Success);
}

#[tokio::test]
async fn test_snooze_accepts_fractional_hours() {
    let h = harness().await;
    h.seed_medication(&medication("m1", "u1", 12, Some(base_time()))).await;

    let response = snooze(&h.ctx, "m1", 0.25).await.unwrap();

    assert_eq!(response.next_reminder, base_time() + Duration::minutes(15));
    // No profile means no email preference.
    assert!(h.email.sent().is_empty());
}

#[tokio::test]
async fn test_snooze_survives_confirmation_failure() {
    let h = harness().await;
    h.seed_profile(&profile("u1", true, false, false)).await;
    h.seed_medication(&medication("m1", "u1", 12, Some(base_time()))).await;
    h.email
        .fail_with(DeliveryError::Transport("connection reset".to_string()));

    let response = snooze(&h.ctx, "m1", 1.0).await.unwrap();

    assert_eq!(response.next_reminder, base_time() + Duration::hours(1));
    assert_eq!(h.history("m1").await.len(), 1);
}

#[tokio::test]
async fn test_snooze_rejects_bad_input() {
    let h = harness().await;
    h.seed_medication(&medication("m1", "u1", 12, Some(base_time()))).await;

    for hours in [0.0, -2.0, f64::NAN, 169.0] {
        let err = snooze(&h.ctx, "m1", hours).await.unwrap_err();
        assert!(matches!(err, ReminderError::Validation(_)), "{} hours", hours);
    }
    assert!(matches!(
        snooze(&h.ctx, "missing", 1.0).await.unwrap_err(),
        ReminderError::NotFound(_)
    ));
    assert_eq!(h.next_reminder("m1").await, Some(base_time()));
    assert!(h.history("m1").await.is_empty());
}

fn parse_link(link: &str) -> SnoozeLinkQuery {
    let prefix = format!("{}/api/reminders/snooze-link?", PUBLIC_BASE_URL);
    let query = link.strip_prefix(&prefix).expect("link points at the API");
    serde_urlencoded::from_str(query).expect("link query parses")
}

#[tokio::test]
async fn test_sms_carries_working_snooze_links() {
    let h = harness_with_links().await;
    h.seed_profile(&profile("u1", false, true, false)).await;
    h.seed_medication(&medication("m1", "u1", 12, Some(base_time()))).await;

    run_dispatch_cycle(&h.ctx).await.unwrap();

    let body = h.sms.sent()[0].body.clone();
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[2].starts_with("Snooze 3h: "));

    let query = parse_link(lines[2].trim_start_matches("Snooze 3h: "));
    assert_eq!(query.medication_id, "m1");
    assert_eq!(query.hours, 3);

    h.clock.advance(Duration::minutes(10));
    let response = snooze_from_link(&h.ctx, &query).await.unwrap();
    assert_eq!(
        response.next_reminder,
        base_time() + Duration::minutes(10) + Duration::hours(3)
    );
}

#[tokio::test]
async fn test_tampered_or_expired_link_is_refused() {
    let h = harness_with_links().await;
    h.seed_profile(&profile("u1", false, true, false)).await;
    h.seed_medication(&medication("m1", "u1", 12, Some(base_time()))).await;
    run_dispatch_cycle(&h.ctx).await.unwrap();

    let body = h.sms.sent()[0].body.clone();
    let first = body.lines().nth(1).unwrap().trim_start_matches("Snooze 1h: ");
    let query = parse_link(first);

    let mut tampered = query.clone();
    tampered.hours = 24;
    assert!(matches!(
        snooze_from_link(&h.ctx, &tampered).await.unwrap_err(),
        ReminderError::Unauthorized(_)
    ));

    h.clock.advance(h.ctx.settings.snooze_link_ttl + Duration::minutes(1));
    assert!(matches!(
        snooze_from_link(&h.ctx, &query).await.unwrap_err(),
        ReminderError::Unauthorized(_)
    ));
}

#[tokio::test]
async fn test_links_disabled_without_signer() {
    let h = harness().await;
    let query = SnoozeLinkQuery {
        medication_id: "m1".to_string(),
        hours: 1,
        expires: base_time().timestamp() + 3600,
        signature: "00".to_string(),
    };
    assert!(matches!(
        snooze_from_link(&h.ctx, &query).await.unwrap_err(),
        ReminderError::Unauthorized(_)
    ));
}

#[tokio::test]
async fn test_slow_cycle_never_lets_an_overlapping_cycle_resend() {
    let h = harness().await;
    for (id, user) in [("m1", "u1"), ("m2", "u2"), ("m3", "u3")] {
        h.seed_profile(&profile(user, true, false, false)).await;
        h.seed_medication(&medication(id, user, 12, Some(base_time())))
            .await;
    }
    // Every send eats two thirds of the 300s lease.
    h.email.take_time(h.clock.clone(), Duration::seconds(200));
    let gate = h.email.hold_send(2);

    let ctx = h.ctx.clone();
    let slow = tokio::spawn(async move { run_dispatch_cycle(&ctx).await });
    gate.reached.notified().await;

    // 400s in, the first cycle is still sending m2.
    let overlapping = run_dispatch_cycle(&h.ctx).await.unwrap();
    gate.release.notify_one();
    let slow = slow.await.unwrap().unwrap();

    assert_eq!(overlapping.claimed, 1);
    assert_eq!(slow.claimed, 2);
    assert_eq!(h.email.sent().len(), 3);
    for id in ["m1", "m2", "m3"] {
        assert_eq!(h.history(id).await.len(), 1, "{} sent once", id);
    }
}

#[tokio::test]
async fn test_snooze_during_dispatch_is_kept() {
    let h = harness().await;
    h.seed_profile(&profile("u1", true, false, false)).await;
    h.seed_medication(&medication("m1", "u1", 12, Some(base_time()))).await;
    let gate = h.email.hold_send(1);

    let ctx = h.ctx.clone();
    let cycle = tokio::spawn(async move { run_dispatch_cycle(&ctx).await });
    gate.reached.notified().await;

    let snoozed = snooze(&h.ctx, "m1", 3.0).await.unwrap();
    gate.release.notify_one();
    let report = cycle.await.unwrap().unwrap();

    assert_eq!(report.claimed, 1);
    assert_eq!(report.rescheduled, 0);
    assert_eq!(snoozed.next_reminder, base_time() + Duration::hours(3));
    assert_eq!(h.next_reminder("m1").await, Some(snoozed.next_reminder));
}

#[tokio::test]
async fn test_due_query_failure_aborts_the_cycle() {
    let h = harness().await;
    h.execute("DROP TABLE medications").await;

    let err = run_dispatch_cycle(&h.ctx).await.unwrap_err();
    assert!(matches!(err, ReminderError::Database(_)));
}

#[tokio::test]
async fn test_reschedule_failure_aborts_the_cycle() {
    let h = harness().await;
    for (id, user) in [("m1", "u1"), ("m2", "u2")] {
        h.seed_profile(&profile(user, true, false, false)).await;
        h.seed_medication(&medication(id, user, 12, Some(base_time())))
            .await;
    }
    let gate = h.email.hold_send(1);

    let ctx = h.ctx.clone();
    let cycle = tokio::spawn(async move { run_dispatch_cycle(&ctx).await });
    gate.reached.notified().await;
    h.execute("DROP TABLE medications").await;
    gate.release.notify_one();

    let err = cycle.await.unwrap().unwrap_err();
    assert!(matches!(err, ReminderError::Database(_)));
    // m2 is never reached.
    assert_eq!(h.email.sent().len(), 1);
}

#[tokio::test]
async fn test_snooze_fails_when_the_update_fails() {
    let h = harness().await;
    h.seed_medication(&medication("m1", "u1", 12, Some(base_time()))).await;
    h.execute(
        "CREATE TRIGGER medications_read_only BEFORE UPDATE ON medications \
         BEGIN SELECT RAISE(ABORT, 'medications are read-only'); END",
    )
    .await;

    let err = snooze(&h.ctx, "m1", 3.0).await.unwrap_err();
    assert!(matches!(err, ReminderError::Database(_)));
    assert_eq!(h.next_reminder("m1").await, Some(base_time()));
    assert!(h.history("m1").await.is_empty());
}

#[tokio::test]
async fn test_snooze_fails_when_history_cannot_be_written() {
    let h = harness().await;
    h.seed_medication(&medication("m1", "u1", 12, Some(base_time()))).await;
    h.execute("DROP TABLE reminder_history").await;

    let err = snooze(&h.ctx, "m1", 3.0).await.unwrap_err();
    assert!(matches!(err, ReminderError::Database(_)));
}
