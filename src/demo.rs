use chrono::NaiveDate;
use stagehub::config::ContactConfig;
use stagehub::error::AppError;
use stagehub::workflows::placement::{
    Actor, MemoryStore, ProposalDraft, ProposalStatus, RequestStatus, RequestSubmission,
    ReviewDecision, Role, UserId, UserRecord,
};

fn seed_user(store: &MemoryStore, id: &str, name: &str, role: Role, classe: Option<&str>) -> Actor {
    store.add_user(UserRecord {
        id: UserId(id.to_string()),
        display_name: name.to_string(),
        email: format!("{id}@stagehub.local"),
        phone: None,
        role,
        classe: classe.map(str::to_string),
    });
    Actor::new(UserId(id.to_string()), role)
}

/// Walk the allocation scenario end to end and print each step.
pub(crate) fn run() -> Result<(), AppError> {
    let contact = ContactConfig {
        admin_email: "admin@stagehub.local".to_string(),
        admin_sms: None,
    };
    let store = MemoryStore::new();
    let state = crate::build_placement_state(&store, &contact);

    let admin = seed_user(&store, "u-admin", "Direction", Role::Admin, None);
    let tissier = seed_user(&store, "u-tissier", "Nadia Tissier", Role::Teacher, None);
    seed_user(&store, "u-moreau", "Bruno Moreau", Role::Teacher, None);
    let camille = seed_user(&store, "u-camille", "Camille Aubert", Role::Student, Some("BTS-SN2"));
    let theo = seed_user(&store, "u-theo", "Théo Garnier", Role::Student, Some("BTS-SN2"));
    seed_user(&store, "u-lina", "Lina Benali", Role::Student, Some("BTS-SN2"));

    println!("Internship placement demo");

    println!("\n1. Nadia Tissier submits a subject proposal");
    let proposal = state.proposals.submit(
        &tissier,
        ProposalDraft {
            subject_title: "IoT Monitoring".to_string(),
            description: "Sensor fleet supervision dashboard".to_string(),
        },
    )?;
    println!("   -> proposal {} is {} / review {}", proposal.id.0, proposal.status, proposal.review);

    println!("\n2. The administrator approves it and keeps it available");
    let proposal = state.proposals.set_approval(
        &admin,
        &proposal.id,
        ReviewDecision::Approve,
    )?;
    println!("   -> review is now {}", proposal.review);

    println!("\n3. Available supervisors");
    for slot in state.resolver.available_supervisors()? {
        println!("   - {} ({})", slot.display_name, slot.subject_title);
    }

    println!("\n4. Camille Aubert requests an internship supervised by Nadia Tissier");
    let request = state.requests.submit(
        &camille,
        RequestSubmission {
            student_name: "Camille Aubert".to_string(),
            contact_email: "camille@stagehub.local".to_string(),
            contact_phone: None,
            company: "Altitude Systèmes".to_string(),
            starts_on: NaiveDate::from_ymd_opt(2026, 1, 12).expect("valid date"),
            ends_on: NaiveDate::from_ymd_opt(2026, 3, 20).expect("valid date"),
            partner_id: Some(UserId("u-lina".to_string())),
            supervisor_id: Some(tissier.id.clone()),
        },
    )?;
    println!("   -> request {} is {}", request.id.0, request.status);

    println!("\n5. Available supervisors after the claim");
    let slots = state.resolver.available_supervisors()?;
    if slots.is_empty() {
        println!("   (none)");
    }
    for slot in &slots {
        println!("   - {} ({})", slot.display_name, slot.subject_title);
    }

    println!("\n6. The administrator approves the request");
    let request = state
        .requests
        .set_status(&admin, &request.id, RequestStatus::Approved)?;
    println!("   -> request {} is {}", request.id.0, request.status);
    let proposal = state
        .proposals
        .set_status(&admin, &proposal.id, ProposalStatus::Assigned)?;
    println!("   -> proposal {} is {}", proposal.id.0, proposal.status);

    println!("\n7. Théo Garnier tries to claim the same supervisor");
    let outcome = state.requests.submit(
        &theo,
        RequestSubmission {
            student_name: "Théo Garnier".to_string(),
            contact_email: "theo@stagehub.local".to_string(),
            contact_phone: None,
            company: "Ateliers Roche".to_string(),
            starts_on: NaiveDate::from_ymd_opt(2026, 1, 12).expect("valid date"),
            ends_on: NaiveDate::from_ymd_opt(2026, 3, 20).expect("valid date"),
            partner_id: None,
            supervisor_id: Some(tissier.id.clone()),
        },
    );
    match outcome {
        Err(err) => println!("   -> rejected: {err}"),
        Ok(view) => println!("   -> unexpectedly accepted request {}", view.id.0),
    }

    println!("\n8. Camille's notification inbox");
    for notification in state.center.inbox(&camille)? {
        println!("   - [{}] {}", notification.kind.label(), notification.title);
    }

    Ok(())
}
