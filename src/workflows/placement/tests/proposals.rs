use super::common::{draft, fixture};
use crate::workflows::placement::domain::{ProposalStatus, ReviewStatus};
use crate::workflows::placement::proposals::ReviewDecision;
use crate::workflows::placement::repository::ProposalRepository;
use crate::workflows::placement::PlacementError;

#[test]
fn first_submission_starts_available_and_pending_review() {
    let f = fixture();

    let view = f.proposals.submit(&f.berger, draft("Networks")).unwrap();
    assert_eq!(view.status, "available");
    assert_eq!(view.review, "pending");
    assert_eq!(view.teacher_id, "u-berger");

    let emails = f.messenger.emails();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].to, "admin@stagehub.local");
    assert!(emails[0].subject.contains("awaiting review"));
}

#[test]
fn students_cannot_submit_proposals() {
    let f = fixture();
    let outcome = f.proposals.submit(&f.camille, draft("Networks"));
    assert!(matches!(outcome, Err(PlacementError::Forbidden(_))));
}

#[test]
fn blank_title_is_rejected() {
    let f = fixture();
    let outcome = f.proposals.submit(&f.berger, draft("   "));
    assert!(matches!(outcome, Err(PlacementError::Validation(_))));
}

#[test]
fn resubmission_overwrites_the_active_row_and_restarts_review() {
    let f = fixture();

    let first = f.proposals.submit(&f.berger, draft("Networks")).unwrap();
    f.proposals
        .set_approval(&f.admin, &first.id, ReviewDecision::Approve)
        .unwrap();

    let second = f.proposals.submit(&f.berger, draft("Embedded Linux")).unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.subject_title, "Embedded Linux");
    assert_eq!(second.review, "pending");

    // Still exactly one row for the teacher.
    let mine = f.proposals.list_mine(&f.berger).unwrap();
    assert_eq!(mine.len(), 1);
}

#[test]
fn assigned_proposal_cannot_be_resubmitted_updated_or_archived() {
    let f = fixture();

    let view = f.proposals.submit(&f.berger, draft("Networks")).unwrap();
    f.proposals
        .set_status(&f.admin, &view.id, ProposalStatus::Assigned)
        .unwrap();

    assert!(matches!(
        f.proposals.submit(&f.berger, draft("Embedded Linux")),
        Err(PlacementError::Conflict(_))
    ));
    assert!(matches!(
        f.proposals.update(&f.berger, &view.id, draft("Embedded Linux")),
        Err(PlacementError::Conflict(_))
    ));
    assert!(matches!(
        f.proposals.archive(&f.berger, &view.id),
        Err(PlacementError::Conflict(_))
    ));
    assert!(matches!(
        f.proposals.delete(&f.berger, &view.id),
        Err(PlacementError::Conflict(_))
    ));
}

#[test]
fn approval_stamps_the_reviewer_and_clears_any_rejection_reason() {
    let f = fixture();

    let view = f.proposals.submit(&f.berger, draft("Networks")).unwrap();
    let rejected = f
        .proposals
        .set_approval(
            &f.admin,
            &view.id,
            ReviewDecision::Reject {
                reason: Some("too broad".to_string()),
            },
        )
        .unwrap();
    assert_eq!(rejected.review, "rejected");
    assert_eq!(rejected.rejection_reason.as_deref(), Some("too broad"));

    let approved = f
        .proposals
        .set_approval(&f.admin, &view.id, ReviewDecision::Approve)
        .unwrap();
    assert_eq!(approved.review, "approved");
    assert!(approved.rejection_reason.is_none());

    let stored = f.store.fetch(&view.id).unwrap().unwrap();
    assert_eq!(stored.review.status, ReviewStatus::Approved);
    assert_eq!(stored.review.approved_by.as_ref(), Some(&f.admin.id));
    assert!(stored.review.approved_at.is_some());

    // Teacher received one notification per verdict.
    let inbox = f.center.inbox(&f.berger).unwrap();
    assert_eq!(inbox.len(), 2);
    assert_eq!(inbox[0].title, "Proposal approved");
    assert_eq!(inbox[1].title, "Proposal rejected");
}

#[test]
fn only_admins_review_or_move_proposals() {
    let f = fixture();
    let view = f.proposals.submit(&f.berger, draft("Networks")).unwrap();

    assert!(matches!(
        f.proposals.set_approval(&f.berger, &view.id, ReviewDecision::Approve),
        Err(PlacementError::Forbidden(_))
    ));
    assert!(matches!(
        f.proposals.set_status(&f.camille, &view.id, ProposalStatus::Archived),
        Err(PlacementError::Forbidden(_))
    ));
}

#[test]
fn status_change_notifies_the_owning_teacher() {
    let f = fixture();
    let view = f.proposals.submit(&f.berger, draft("Networks")).unwrap();

    f.proposals
        .set_status(&f.admin, &view.id, ProposalStatus::Archived)
        .unwrap();

    let inbox = f.center.inbox(&f.berger).unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].title, "Proposal status changed");
    assert!(inbox[0].body.contains("archived"));
}

#[test]
fn owner_edit_restarts_review() {
    let f = fixture();

    let view = f.proposals.submit(&f.berger, draft("Networks")).unwrap();
    f.proposals
        .set_approval(&f.admin, &view.id, ReviewDecision::Approve)
        .unwrap();

    let edited = f
        .proposals
        .update(&f.berger, &view.id, draft("Network Security"))
        .unwrap();
    assert_eq!(edited.subject_title, "Network Security");
    assert_eq!(edited.review, "pending");
}

#[test]
fn only_the_owner_edits_archives_or_deletes() {
    let f = fixture();
    let view = f.proposals.submit(&f.berger, draft("Networks")).unwrap();

    assert!(matches!(
        f.proposals.update(&f.moreau, &view.id, draft("Robotics")),
        Err(PlacementError::Forbidden(_))
    ));
    assert!(matches!(
        f.proposals.archive(&f.moreau, &view.id),
        Err(PlacementError::Forbidden(_))
    ));
    assert!(matches!(
        f.proposals.delete(&f.moreau, &view.id),
        Err(PlacementError::Forbidden(_))
    ));
}

#[test]
fn archiving_frees_the_teacher_for_a_fresh_submission() {
    let f = fixture();

    let first = f.proposals.submit(&f.berger, draft("Networks")).unwrap();
    f.proposals.archive(&f.berger, &first.id).unwrap();

    let second = f.proposals.submit(&f.berger, draft("Embedded Linux")).unwrap();
    assert_ne!(second.id, first.id);

    let mine = f.proposals.list_mine(&f.berger).unwrap();
    assert_eq!(mine.len(), 2);
}

#[test]
fn delete_removes_the_row() {
    let f = fixture();

    let view = f.proposals.submit(&f.berger, draft("Networks")).unwrap();
    f.proposals.delete(&f.berger, &view.id).unwrap();

    assert!(matches!(
        f.proposals.get(&f.berger, &view.id),
        Err(PlacementError::NotFound("proposal"))
    ));
}

#[test]
fn get_is_owner_or_admin_only() {
    let f = fixture();
    let view = f.proposals.submit(&f.berger, draft("Networks")).unwrap();

    assert!(f.proposals.get(&f.berger, &view.id).is_ok());
    assert!(f.proposals.get(&f.admin, &view.id).is_ok());
    assert!(matches!(
        f.proposals.get(&f.moreau, &view.id),
        Err(PlacementError::Forbidden(_))
    ));
}

#[test]
fn list_all_is_admin_only() {
    let f = fixture();
    f.proposals.submit(&f.berger, draft("Networks")).unwrap();
    f.proposals.submit(&f.moreau, draft("Robotics")).unwrap();

    assert_eq!(f.proposals.list_all(&f.admin).unwrap().len(), 2);
    assert!(matches!(
        f.proposals.list_all(&f.berger),
        Err(PlacementError::Forbidden(_))
    ));
}
