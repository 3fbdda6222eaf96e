use std::sync::Arc;
use std::thread;

use chrono::NaiveDate;

use super::common::{fixture, submission};
use crate::workflows::placement::domain::{RequestStatus, UserId};
use crate::workflows::placement::PlacementError;

#[test]
fn submission_is_stored_pending_and_alerts_the_admin() {
    let f = fixture();

    let view = f
        .requests
        .submit(&f.camille, submission("Camille Aubert", "camille@stagehub.local"))
        .unwrap();
    assert_eq!(view.status, "pending");
    assert_eq!(view.student_id, "u-camille");
    assert!(view.supervisor_id.is_none());

    let emails = f.messenger.emails();
    assert_eq!(emails.len(), 1);
    assert!(emails[0].subject.contains("Internship request"));
}

#[test]
fn teachers_cannot_submit_requests() {
    let f = fixture();
    let outcome = f
        .requests
        .submit(&f.berger, submission("alice Berger", "berger@stagehub.local"));
    assert!(matches!(outcome, Err(PlacementError::Forbidden(_))));
}

#[test]
fn submission_fields_are_validated() {
    let f = fixture();

    let blank_name = submission("  ", "camille@stagehub.local");
    assert!(matches!(
        f.requests.submit(&f.camille, blank_name),
        Err(PlacementError::Validation(_))
    ));

    let bad_email = submission("Camille Aubert", "not-an-address");
    assert!(matches!(
        f.requests.submit(&f.camille, bad_email),
        Err(PlacementError::Validation(_))
    ));

    let mut blank_company = submission("Camille Aubert", "camille@stagehub.local");
    blank_company.company = String::new();
    assert!(matches!(
        f.requests.submit(&f.camille, blank_company),
        Err(PlacementError::Validation(_))
    ));

    let mut inverted_dates = submission("Camille Aubert", "camille@stagehub.local");
    inverted_dates.starts_on = NaiveDate::from_ymd_opt(2026, 3, 20).expect("valid date");
    inverted_dates.ends_on = NaiveDate::from_ymd_opt(2026, 1, 12).expect("valid date");
    assert!(matches!(
        f.requests.submit(&f.camille, inverted_dates),
        Err(PlacementError::Validation(_))
    ));
}

#[test]
fn unknown_supervisor_reference_is_rejected() {
    let f = fixture();

    let mut sub = submission("Camille Aubert", "camille@stagehub.local");
    sub.supervisor_id = Some(UserId("u-ghost".to_string()));
    assert!(matches!(
        f.requests.submit(&f.camille, sub),
        Err(PlacementError::NotFound("supervisor"))
    ));
}

#[test]
fn supervisor_must_be_a_teacher() {
    let f = fixture();

    let mut sub = submission("Camille Aubert", "camille@stagehub.local");
    sub.supervisor_id = Some(f.lina.id.clone());
    assert!(matches!(
        f.requests.submit(&f.camille, sub),
        Err(PlacementError::Validation(_))
    ));
}

#[test]
fn partner_must_be_another_existing_student() {
    let f = fixture();

    let mut own_partner = submission("Camille Aubert", "camille@stagehub.local");
    own_partner.partner_id = Some(f.camille.id.clone());
    assert!(matches!(
        f.requests.submit(&f.camille, own_partner),
        Err(PlacementError::Validation(_))
    ));

    let mut ghost_partner = submission("Camille Aubert", "camille@stagehub.local");
    ghost_partner.partner_id = Some(UserId("u-ghost".to_string()));
    assert!(matches!(
        f.requests.submit(&f.camille, ghost_partner),
        Err(PlacementError::NotFound("partner"))
    ));

    let mut teacher_partner = submission("Camille Aubert", "camille@stagehub.local");
    teacher_partner.partner_id = Some(f.moreau.id.clone());
    assert!(matches!(
        f.requests.submit(&f.camille, teacher_partner),
        Err(PlacementError::Validation(_))
    ));
}

#[test]
fn supervisor_name_is_snapshotted_at_submission() {
    let f = fixture();

    let mut sub = submission("Camille Aubert", "camille@stagehub.local");
    sub.supervisor_id = Some(f.berger.id.clone());
    let view = f.requests.submit(&f.camille, sub).unwrap();
    assert_eq!(view.supervisor_name.as_deref(), Some("alice Berger"));
}

#[test]
fn a_student_holds_at_most_one_active_request() {
    let f = fixture();

    f.requests
        .submit(&f.camille, submission("Camille Aubert", "camille@stagehub.local"))
        .unwrap();
    assert!(matches!(
        f.requests
            .submit(&f.camille, submission("Camille Aubert", "camille@stagehub.local")),
        Err(PlacementError::Conflict(_))
    ));
}

#[test]
fn rejection_releases_the_owner_for_a_new_attempt() {
    let f = fixture();

    let first = f
        .requests
        .submit(&f.camille, submission("Camille Aubert", "camille@stagehub.local"))
        .unwrap();
    f.requests
        .set_status(&f.admin, &first.id, RequestStatus::Rejected)
        .unwrap();

    let second = f
        .requests
        .submit(&f.camille, submission("Camille Aubert", "camille@stagehub.local"))
        .unwrap();
    assert_ne!(second.id, first.id);
}

#[test]
fn claimed_partner_cannot_be_named_again() {
    let f = fixture();

    let mut first = submission("Camille Aubert", "camille@stagehub.local");
    first.partner_id = Some(f.lina.id.clone());
    f.requests.submit(&f.camille, first).unwrap();

    // Lina is claimed as a partner, so Théo may neither name her...
    let mut second = submission("Théo Garnier", "theo@stagehub.local");
    second.partner_id = Some(f.lina.id.clone());
    assert!(matches!(
        f.requests.submit(&f.theo, second),
        Err(PlacementError::Conflict(_))
    ));

    // ...nor may she file a request of her own while claimed.
    // (She is a claimed partner, not an owner, so her own submission
    // naming no partner is still allowed.)
    let lone = f
        .requests
        .submit(&f.lina, submission("Lina Benali", "lina@stagehub.local"))
        .unwrap();
    assert_eq!(lone.status, "pending");
}

#[test]
fn partner_who_owns_an_active_request_is_rejected() {
    let f = fixture();

    f.requests
        .submit(&f.lina, submission("Lina Benali", "lina@stagehub.local"))
        .unwrap();

    let mut sub = submission("Camille Aubert", "camille@stagehub.local");
    sub.partner_id = Some(f.lina.id.clone());
    assert!(matches!(
        f.requests.submit(&f.camille, sub),
        Err(PlacementError::Conflict(_))
    ));
}

#[test]
fn concurrent_claims_on_one_supervisor_admit_exactly_one_request() {
    let f = fixture();
    let requests = Arc::new(f.requests);

    let camille = f.camille.clone();
    let theo = f.theo.clone();
    let berger_id = f.berger.id.clone();

    let handles: Vec<_> = [(camille, "Camille Aubert"), (theo, "Théo Garnier")]
        .into_iter()
        .map(|(actor, name)| {
            let requests = requests.clone();
            let supervisor = berger_id.clone();
            let name = name.to_string();
            thread::spawn(move || {
                let mut sub = submission(&name, "student@stagehub.local");
                sub.supervisor_id = Some(supervisor);
                requests.submit(&actor, sub)
            })
        })
        .collect();

    let outcomes: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("submission thread panicked"))
        .collect();

    let accepted = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    assert_eq!(accepted, 1);
    assert!(outcomes
        .iter()
        .any(|outcome| matches!(outcome, Err(PlacementError::Conflict(_)))));
}

#[test]
fn decisions_notify_the_student_including_reopening() {
    let f = fixture();

    let view = f
        .requests
        .submit(&f.camille, submission("Camille Aubert", "camille@stagehub.local"))
        .unwrap();

    let approved = f
        .requests
        .set_status(&f.admin, &view.id, RequestStatus::Approved)
        .unwrap();
    assert_eq!(approved.status, "approved");

    let reopened = f
        .requests
        .set_status(&f.admin, &view.id, RequestStatus::Pending)
        .unwrap();
    assert_eq!(reopened.status, "pending");

    let inbox = f.center.inbox(&f.camille).unwrap();
    assert_eq!(inbox.len(), 2);
    assert_eq!(inbox[0].title, "Internship request reopened");
    assert_eq!(inbox[1].title, "Internship request approved");
}

#[test]
fn only_admins_decide_requests() {
    let f = fixture();
    let view = f
        .requests
        .submit(&f.camille, submission("Camille Aubert", "camille@stagehub.local"))
        .unwrap();

    assert!(matches!(
        f.requests.set_status(&f.camille, &view.id, RequestStatus::Approved),
        Err(PlacementError::Forbidden(_))
    ));
}

#[test]
fn get_and_listings_enforce_ownership() {
    let f = fixture();
    let view = f
        .requests
        .submit(&f.camille, submission("Camille Aubert", "camille@stagehub.local"))
        .unwrap();

    assert!(f.requests.get(&f.camille, &view.id).is_ok());
    assert!(f.requests.get(&f.admin, &view.id).is_ok());
    assert!(matches!(
        f.requests.get(&f.theo, &view.id),
        Err(PlacementError::Forbidden(_))
    ));

    assert_eq!(f.requests.list_mine(&f.camille).unwrap().len(), 1);
    assert!(f.requests.list_mine(&f.theo).unwrap().is_empty());
    assert_eq!(f.requests.list_all(&f.admin).unwrap().len(), 1);
    assert!(matches!(
        f.requests.list_all(&f.camille),
        Err(PlacementError::Forbidden(_))
    ));
}
