use drugstore_core::db::open_db_in_memory;
use drugstore_core::{
    DispensaryChip, DispensaryService, DispensarySession, Drug, DrugForm, DrugRepository,
    FilterState, RepoError, SqliteDrugRepository,
};
use rusqlite::Connection;
use std::collections::BTreeSet;

fn seed(repo: &SqliteDrugRepository<'_>) -> Vec<Drug> {
    let mut drugs = vec![
        Drug::new("Aspirin Cardio", "mg", DrugForm::Oral).with_stock(100.0),
        Drug::new("aspirin i.v.", "ml", DrugForm::Injection).with_stock(20.0),
        Drug::new("Paracetamol Sirup", "ml", DrugForm::OralLiquid).with_stock(500.0),
        Drug::new("Fentanyl Pflaster", "Stk", DrugForm::Plaster).with_stock(10.0),
        Drug::new("Ölbad Zusatz", "ml", DrugForm::OralLiquid).with_stock(5.0),
        Drug::new("Ibuprofen", "mg", DrugForm::Oral)
            .with_stock(80.0)
            .with_substance("Ibuprofen"),
    ];
    drugs[1].is_favorite = true;
    drugs[3].is_favorite = true;
    for drug in &drugs {
        repo.create_drug(drug).unwrap();
    }
    drugs
}

fn titles(drugs: &[Drug]) -> Vec<&str> {
    drugs.iter().map(|drug| drug.title.as_str()).collect()
}

#[test]
fn default_filter_returns_every_drug_in_title_order() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteDrugRepository::try_new(&mut conn).unwrap();
    seed(&repo);

    let items = repo.query_items(&FilterState::default()).unwrap();
    assert_eq!(
        titles(&items),
        vec![
            "Aspirin Cardio",
            "aspirin i.v.",
            "Fentanyl Pflaster",
            "Ibuprofen",
            "Paracetamol Sirup",
            "Ölbad Zusatz",
        ]
    );
}

#[test]
fn category_and_search_scenario() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteDrugRepository::try_new(&mut conn).unwrap();
    seed(&repo);

    let mut filter = FilterState::new();
    filter.toggle_filter(DrugForm::Oral);
    filter.set_search_filter("asp");

    let items = repo.query_items(&filter).unwrap();
    // the favorite injection also contains "asp" but has the wrong category
    assert_eq!(titles(&items), vec!["Aspirin Cardio"]);
}

#[test]
fn favorites_only_excludes_non_favorites() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteDrugRepository::try_new(&mut conn).unwrap();
    seed(&repo);

    let mut filter = FilterState::new();
    filter.toggle_favorites();
    let items = repo.query_items(&filter).unwrap();
    assert_eq!(titles(&items), vec!["aspirin i.v.", "Fentanyl Pflaster"]);
    assert!(items.iter().all(|drug| drug.is_favorite));
}

#[test]
fn search_ignores_case_beyond_ascii() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteDrugRepository::try_new(&mut conn).unwrap();
    seed(&repo);

    let mut filter = FilterState::new();
    filter.set_search_filter("ÖLBAD");
    let items = repo.query_items(&filter).unwrap();
    assert_eq!(titles(&items), vec!["Ölbad Zusatz"]);
}

#[test]
fn query_agrees_with_linear_scan_for_every_filter_combination() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteDrugRepository::try_new(&mut conn).unwrap();
    let drugs = seed(&repo);

    for favorites in [false, true] {
        for mask in 0u8..16 {
            for term in ["", "asp", "SIRUP", "zzz"] {
                let mut filter = FilterState::new();
                if favorites {
                    filter.toggle_favorites();
                }
                for (bit, form) in DrugForm::ALL.iter().enumerate() {
                    if mask & (1 << bit) != 0 {
                        filter.toggle_filter(*form);
                    }
                }
                filter.set_search_filter(term);

                let queried = repo
                    .query_items(&filter)
                    .unwrap()
                    .into_iter()
                    .map(|drug| drug.uuid)
                    .collect::<BTreeSet<_>>();
                let scanned = drugs
                    .iter()
                    .filter(|drug| filter.matches(*drug))
                    .map(|drug| drug.uuid)
                    .collect::<BTreeSet<_>>();
                assert_eq!(queried, scanned, "favorites={favorites} mask={mask} term={term}");
            }
        }
    }
}

#[test]
fn favorites_can_be_added_and_removed() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteDrugRepository::try_new(&mut conn).unwrap();
    let service = DispensaryService::new(repo);
    let drug = Drug::new("Ibuprofen", "mg", DrugForm::Oral);
    service.create_drug(&drug).unwrap();

    service.add_to_favorites(drug.uuid).unwrap();
    assert!(service.get_drug(drug.uuid).unwrap().unwrap().is_favorite);

    service.remove_from_favorites(drug.uuid).unwrap();
    assert!(!service.get_drug(drug.uuid).unwrap().unwrap().is_favorite);

    let missing = Drug::new("Missing", "mg", DrugForm::Oral);
    let err = service.add_to_favorites(missing.uuid).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == missing.uuid));
}

#[test]
fn create_rejects_invalid_drug() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteDrugRepository::try_new(&mut conn).unwrap();

    let err = repo
        .create_drug(&Drug::new(" ", "mg", DrugForm::Oral))
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn read_path_rejects_corrupt_rows() {
    let mut conn = open_db_in_memory().unwrap();
    let drug = Drug::new("Aspirin", "mg", DrugForm::Oral);
    {
        let repo = SqliteDrugRepository::try_new(&mut conn).unwrap();
        repo.create_drug(&drug).unwrap();
    }
    corrupt_favorite_flag(&conn, &drug.uuid.to_string());

    let repo = SqliteDrugRepository::try_new(&mut conn).unwrap();
    let err = repo.get_drug(drug.uuid).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn read_path_reports_blank_persisted_title_as_invalid_data() {
    let mut conn = open_db_in_memory().unwrap();
    let drug = Drug::new("Aspirin", "mg", DrugForm::Oral);
    {
        let repo = SqliteDrugRepository::try_new(&mut conn).unwrap();
        repo.create_drug(&drug).unwrap();
    }
    conn.execute(
        "UPDATE drugs SET title = '  ' WHERE uuid = ?1;",
        [drug.uuid.to_string()],
    )
    .unwrap();

    let repo = SqliteDrugRepository::try_new(&mut conn).unwrap();
    let err = repo.get_drug(drug.uuid).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
    let err = repo.query_items(&FilterState::new()).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn session_refresh_follows_chip_and_search_edits() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteDrugRepository::try_new(&mut conn).unwrap();
    seed(&repo);
    let service = DispensaryService::new(repo);
    let mut session = DispensarySession::new();

    assert_eq!(session.refresh(&service).unwrap().len(), 6);

    session.toggle_chip(DispensaryChip::Favorite);
    assert_eq!(
        titles(session.refresh(&service).unwrap()),
        vec!["aspirin i.v.", "Fentanyl Pflaster"]
    );

    session.search("pflaster");
    assert_eq!(
        titles(session.refresh(&service).unwrap()),
        vec!["Fentanyl Pflaster"]
    );

    session.toggle_chip(DispensaryChip::Form(DrugForm::Oral));
    session.refresh(&service).unwrap();
    assert!(session.is_empty_view());
}

fn corrupt_favorite_flag(conn: &Connection, uuid: &str) {
    // bypass the CHECK constraint to simulate a row written by a broken client
    conn.execute_batch("PRAGMA ignore_check_constraints = ON;")
        .unwrap();
    conn.execute("UPDATE drugs SET is_favorite = 7 WHERE uuid = ?1;", [uuid])
        .unwrap();
}
