use std::io::Cursor;

use concord_core::{
    Category, ItemCatalog, Nav, SessionController, SessionError, SessionPhase,
};

fn three_item_catalog() -> ItemCatalog {
    let data = "\
coding_id,quotation,variable
I1,Tight labor markets drive wage pressure,Inflation
I2,Despite low unemployment no acceleration,Employment
I3,Some modest pass-through at best,Growth
";
    ItemCatalog::from_reader(Cursor::new(data), "test").unwrap()
}

fn session() -> SessionController {
    SessionController::new(three_item_catalog())
}

#[test]
fn starts_awaiting_coder() {
    let s = session();
    assert_eq!(s.phase(), SessionPhase::AwaitingCoder);
    assert_eq!(s.cursor(), 0);
    assert!(s.coder_id().is_none());
}

#[test]
fn set_coder_transitions_to_browsing() {
    let mut s = session();
    s.set_coder_id("Alice").unwrap();
    assert_eq!(s.phase(), SessionPhase::Browsing);
    assert_eq!(s.coder_id(), Some("Alice"));
}

#[test]
fn set_coder_on_empty_catalog_is_immediately_exhausted() {
    let cat = ItemCatalog::from_reader(Cursor::new("coding_id,quotation\n"), "test").unwrap();
    let mut s = SessionController::new(cat);
    s.set_coder_id("Alice").unwrap();
    assert_eq!(s.phase(), SessionPhase::Exhausted);
}

#[test]
fn resaving_an_item_overwrites_and_keeps_one_judgment() {
    // Scenario A: save(I1, steep) then revisit and save(I1, flat)
    let mut s = session();
    s.set_coder_id("Alice").unwrap();
    s.save(Category::Steep, None).unwrap();
    assert_eq!(s.cursor(), 1);

    s.navigate(Nav::Prev);
    s.save(Category::Flat, Some("changed my mind".to_string())).unwrap();

    assert_eq!(s.store().len(), 1);
    let j = s.store().get("I1").unwrap();
    assert_eq!(j.category, Category::Flat);
    assert_eq!(j.coder_id, "Alice");
    assert_eq!(s.cursor(), 1); // back at I2
}

#[test]
fn coder_identity_is_locked_after_first_commit() {
    let mut s = session();
    s.set_coder_id("Alice").unwrap();

    // same name again: Ok no-op
    s.set_coder_id("Alice").unwrap();
    // different name: rejected, lock unchanged
    let err = s.set_coder_id("Mallory").unwrap_err();
    assert!(matches!(err, SessionError::CoderLocked { ref locked } if locked == "Alice"));
    assert_eq!(s.coder_id(), Some("Alice"));

    s.save(Category::None, None).unwrap();
    assert_eq!(s.store().get("I1").unwrap().coder_id, "Alice");
}

#[test]
fn empty_coder_name_is_rejected() {
    let mut s = session();
    assert!(matches!(
        s.set_coder_id("   "),
        Err(SessionError::EmptyCoderName)
    ));
    assert_eq!(s.phase(), SessionPhase::AwaitingCoder);
}

#[test]
fn save_without_coder_is_unauthorized() {
    let mut s = session();
    assert!(matches!(
        s.save(Category::Steep, None),
        Err(SessionError::Unauthorized)
    ));
    assert!(s.store().is_empty());
}

#[test]
fn prev_at_zero_is_a_noop() {
    // Scenario D
    let mut s = session();
    s.set_coder_id("Alice").unwrap();
    assert_eq!(s.navigate(Nav::Prev), 0);
    assert_eq!(s.phase(), SessionPhase::Browsing);
}

#[test]
fn cursor_never_leaves_bounds() {
    let mut s = session();
    s.set_coder_id("Alice").unwrap();
    for nav in [
        Nav::Prev,
        Nav::Next,
        Nav::Next,
        Nav::Next,
        Nav::Next,
        Nav::Goto(99),
        Nav::Prev,
        Nav::Goto(0),
        Nav::Prev,
    ] {
        let cursor = s.navigate(nav);
        assert!(cursor <= s.catalog().len());
    }
}

#[test]
fn goto_clamps_to_the_exhausted_position() {
    let mut s = session();
    s.set_coder_id("Alice").unwrap();
    assert_eq!(s.navigate(Nav::Goto(99)), 3);
    assert_eq!(s.phase(), SessionPhase::Exhausted);
    assert!(s.current_item().is_none());

    // explicit navigation leaves the terminal state
    assert_eq!(s.navigate(Nav::Goto(1)), 1);
    assert_eq!(s.phase(), SessionPhase::Browsing);
}

#[test]
fn save_on_last_item_stays_put_until_explicit_next() {
    // Scenario E
    let mut s = session();
    s.set_coder_id("Alice").unwrap();
    s.navigate(Nav::Goto(2));
    s.save(Category::Moderate, None).unwrap();

    assert_eq!(s.cursor(), 2);
    assert_eq!(s.phase(), SessionPhase::Browsing);
    assert!(s.store().contains("I3"));

    assert_eq!(s.navigate(Nav::Next), 3);
    assert_eq!(s.phase(), SessionPhase::Exhausted);
}

#[test]
fn save_when_exhausted_reports_no_current_item() {
    let mut s = session();
    s.set_coder_id("Alice").unwrap();
    s.navigate(Nav::Goto(3));
    assert!(matches!(
        s.save(Category::None, None),
        Err(SessionError::NoCurrentItem)
    ));
}

#[test]
fn resume_locks_coder_from_data_and_jumps_to_first_uncoded() {
    // Scenario B: rows for I1 (Bob) and unknown I9
    let mut s = session();
    let resume = "\
coding_id,coder_name,classification,notes
I1,Bob,moderate,resumed
I9,Bob,steep,
";
    let report = s.resume_import(Cursor::new(resume)).unwrap();
    assert_eq!(report.accepted, 1);
    assert_eq!(report.rejected, 1);
    assert!(report.message.contains("1 rows referenced unknown items"));

    assert_eq!(s.coder_id(), Some("Bob"));
    assert_eq!(s.cursor(), 1); // I2 is the first uncoded item
    assert_eq!(s.phase(), SessionPhase::Browsing);
    assert_eq!(s.generation(), 1);

    // every imported judgment refers to a catalog item
    for j in s.store().all() {
        assert!(s.catalog().index_of(&j.item_id).is_some());
    }
}

#[test]
fn resume_with_zero_overlap_leaves_everything_untouched() {
    // Scenario C
    let mut s = session();
    s.set_coder_id("Alice").unwrap();
    s.save(Category::Steep, None).unwrap();
    let generation_before = s.generation();

    let err = s
        .resume_import(Cursor::new(
            "coding_id,coder_name,classification\nX1,Bob,flat\nX2,Bob,steep\n",
        ))
        .unwrap_err();
    assert!(matches!(err, SessionError::NoMatch));
    assert_eq!(s.store().len(), 1);
    assert_eq!(s.store().get("I1").unwrap().category, Category::Steep);
    assert_eq!(s.coder_id(), Some("Alice"));
    assert_eq!(s.generation(), generation_before);
}

#[test]
fn malformed_resume_fails_before_any_replacement() {
    let mut s = session();
    s.set_coder_id("Alice").unwrap();
    s.save(Category::Flat, None).unwrap();

    let err = s
        .resume_import(Cursor::new("coding_id,notes\nI1,hello\n"))
        .unwrap_err();
    assert!(matches!(err, SessionError::MalformedImport { .. }));
    assert_eq!(s.store().len(), 1);
    assert_eq!(s.store().get("I1").unwrap().category, Category::Flat);
}

#[test]
fn resume_does_not_relock_an_existing_coder() {
    let mut s = session();
    s.set_coder_id("Alice").unwrap();
    s.resume_import(Cursor::new(
        "coding_id,coder_name,classification\nI1,Bob,flat\n",
    ))
    .unwrap();
    assert_eq!(s.coder_id(), Some("Alice"));
    // imported rows keep the identity found in the file
    assert_eq!(s.store().get("I1").unwrap().coder_id, "Bob");
}

#[test]
fn fully_coded_resume_goes_straight_to_exhausted() {
    let mut s = session();
    let resume = "\
coding_id,coder_name,classification
I1,Bob,steep
I2,Bob,flat
I3,Bob,none
";
    let report = s.resume_import(Cursor::new(resume)).unwrap();
    assert_eq!(report.accepted, 3);
    assert_eq!(s.cursor(), 3);
    assert_eq!(s.phase(), SessionPhase::Exhausted);
}

#[test]
fn exported_results_resume_into_a_fresh_session() {
    let mut first = session();
    first.set_coder_id("Alice").unwrap();
    first.save(Category::Steep, Some("clear causal language".to_string())).unwrap();
    first.save(Category::Flat, None).unwrap();

    let mut bytes = Vec::new();
    concord_core::write_csv(first.store(), &mut bytes).unwrap();

    let mut second = session();
    let report = second.resume_import(Cursor::new(bytes)).unwrap();
    assert_eq!(report.accepted, 2);
    assert_eq!(report.rejected, 0);
    assert_eq!(second.coder_id(), Some("Alice"));
    assert_eq!(second.cursor(), 2); // I3 still uncoded
    assert_eq!(second.store().get("I1").unwrap().category, Category::Steep);
    assert_eq!(
        second.store().get("I1").unwrap().note.as_deref(),
        Some("clear causal language")
    );
}

#[test]
fn each_resume_bumps_the_generation_token() {
    let mut s = session();
    let resume = "coding_id,coder_name,classification\nI1,Bob,flat\n";
    s.resume_import(Cursor::new(resume)).unwrap();
    s.resume_import(Cursor::new(resume)).unwrap();
    assert_eq!(s.generation(), 2);
}
