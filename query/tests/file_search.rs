use assetdex_catalog::{FileEntry, Package, SourceKind, SqliteCatalog, TagTarget};
use assetdex_query::{
    FilterState, PackageFilter, PackageSort, QueryCompiler, QueryConfig, RangeFilter,
    TagSelector, run_file_query, run_package_query,
};
use pretty_assertions::assert_eq;

fn compiler() -> QueryCompiler {
    QueryCompiler::new(QueryConfig::default()).expect("default config is valid")
}

/// 40 car prefabs (5 of them toys) in a vehicles package, plus noise that
/// must never match the car search.
fn vehicle_catalog() -> SqliteCatalog {
    let catalog = SqliteCatalog::open_in_memory().expect("open catalog");
    let vehicles = catalog
        .insert_package(
            &Package::new(1, "Vehicle Pack", SourceKind::StorePackage)
                .with_category("Art/Vehicles")
                .with_publisher("Road Works"),
        )
        .expect("insert vehicles");
    let hidden = {
        let mut package = Package::new(2, "Old Cars", SourceKind::Directory);
        package.exclude = true;
        catalog.insert_package(&package).expect("insert hidden")
    };
    let props = catalog
        .insert_package(
            &Package::new(3, "Props", SourceKind::Archive).with_category("Art/Props"),
        )
        .expect("insert props");

    for i in 0..35 {
        catalog
            .insert_file(&FileEntry::new(vehicles, format!("Vehicles/car_{i:02}.prefab")))
            .expect("insert car");
    }
    for i in 0..5 {
        catalog
            .insert_file(&FileEntry::new(vehicles, format!("Vehicles/toy_car_{i}.prefab")))
            .expect("insert toy");
    }
    catalog
        .insert_file(&FileEntry::new(vehicles, "Textures/car_paint.png"))
        .expect("insert texture");
    catalog
        .insert_file(&FileEntry::new(hidden, "Legacy/car_old.prefab"))
        .expect("insert excluded");
    catalog
        .insert_file(&FileEntry::new(props, "Props/tree.prefab"))
        .expect("insert prop");
    catalog
}

#[test]
fn second_page_of_car_prefabs() {
    let catalog = vehicle_catalog();
    let filter = FilterState {
        phrase: "+car -toy".to_string(),
        file_type: Some("Prefabs".to_string()),
        page_size: 25,
        page: 2,
        ..Default::default()
    };

    let page = run_file_query(&compiler(), &catalog, &filter);

    assert_eq!(page.error, None);
    assert_eq!(page.total, 35);
    assert_eq!(page.page_count(), 2);
    assert_eq!(page.rows.len(), 10);
    let paths: Vec<&str> = page.rows.iter().map(|row| row.file.path.as_str()).collect();
    let expected: Vec<String> = (25..35).map(|i| format!("Vehicles/car_{i:02}.prefab")).collect();
    assert_eq!(paths, expected.iter().map(String::as_str).collect::<Vec<_>>());
    assert!(page.rows.iter().all(|row| row.package.display_name == "Vehicle Pack"));
}

#[test]
fn pages_cover_total_exactly() {
    let catalog = vehicle_catalog();
    let compiler = compiler();
    for page_size in [1u32, 7, 10, 40, 41] {
        let mut seen = 0u64;
        let mut page_no = 1;
        loop {
            let page = run_file_query(
                &compiler,
                &catalog,
                &FilterState {
                    phrase: "car".to_string(),
                    file_type: Some("prefab".to_string()),
                    page: page_no,
                    page_size,
                    ..Default::default()
                },
            );
            assert_eq!(page.total, 40);
            if page.rows.is_empty() {
                assert_eq!(u64::from(page_no - 1), page.page_count(), "size {page_size}");
                break;
            }
            seen += page.rows.len() as u64;
            page_no += 1;
        }
        assert_eq!(seen, 40, "size {page_size}");
    }
}

#[test]
fn excluded_packages_need_opt_in() {
    let catalog = vehicle_catalog();
    let compiler = compiler();
    let base = FilterState {
        phrase: "~car_old".to_string(),
        ..Default::default()
    };
    assert_eq!(run_file_query(&compiler, &catalog, &base).total, 0);

    let maintenance = FilterState {
        include_excluded: true,
        ..base
    };
    let page = run_file_query(&compiler, &catalog, &maintenance);
    assert_eq!(page.total, 1);
    assert_eq!(page.rows[0].package.display_name, "Old Cars");
}

#[test]
fn underscore_is_literal() {
    let catalog = SqliteCatalog::open_in_memory().expect("open catalog");
    let package = catalog
        .insert_package(&Package::new(1, "Signs", SourceKind::Directory))
        .expect("insert package");
    for path in ["Signs/stop_sign.png", "Signs/stopXsign.png"] {
        catalog
            .insert_file(&FileEntry::new(package, path))
            .expect("insert file");
    }

    let page = run_file_query(
        &compiler(),
        &catalog,
        &FilterState {
            phrase: "stop_sign".to_string(),
            ..Default::default()
        },
    );
    assert_eq!(page.total, 1);
    assert_eq!(page.rows[0].file.file_name, "stop_sign.png");
}

#[test]
fn malformed_raw_predicate_becomes_an_error_page() {
    let catalog = vehicle_catalog();
    let compiler = QueryCompiler::new(QueryConfig {
        allow_raw_predicates: true,
        ..Default::default()
    })
    .expect("config");

    let page = run_file_query(
        &compiler,
        &catalog,
        &FilterState {
            phrase: "=f.size >>> 3".to_string(),
            ..Default::default()
        },
    );
    assert!(page.rows.is_empty());
    assert_eq!(page.total, 0);
    let message = page.error.expect("store error is surfaced");
    assert!(message.contains("syntax error"), "{message}");

    let ok = run_file_query(
        &compiler,
        &catalog,
        &FilterState {
            phrase: "=f.file_type = 'png'".to_string(),
            ..Default::default()
        },
    );
    assert_eq!(ok.error, None);
    assert_eq!(ok.total, 1);
}

#[test]
fn raw_predicate_is_refused_without_opt_in() {
    let catalog = vehicle_catalog();
    let page = run_file_query(
        &compiler(),
        &catalog,
        &FilterState {
            phrase: "=1 = 1".to_string(),
            ..Default::default()
        },
    );
    assert!(page.rows.is_empty());
    assert!(page.error.is_some());
}

#[test]
fn tag_facets_join_or_exclude() {
    let catalog = vehicle_catalog();
    let compiler = compiler();
    let favorite = catalog.insert_tag("favorite", "#ff0").expect("insert tag");
    for file_id in [1, 2, 3] {
        catalog
            .assign_tag(favorite, TagTarget::File, file_id)
            .expect("assign tag");
    }

    let tagged = run_file_query(
        &compiler,
        &catalog,
        &FilterState {
            file_tag: TagSelector::Tag(favorite),
            ..Default::default()
        },
    );
    assert_eq!(tagged.total, 3);

    let untagged = run_file_query(
        &compiler,
        &catalog,
        &FilterState {
            file_tag: TagSelector::Untagged,
            ..Default::default()
        },
    );
    // 42 visible files, 3 of them tagged.
    assert_eq!(untagged.total, 39);
}

#[test]
fn ranges_skip_files_without_a_value() {
    let catalog = SqliteCatalog::open_in_memory().expect("open catalog");
    let package = catalog
        .insert_package(&Package::new(1, "Textures", SourceKind::Directory))
        .expect("insert package");
    for (path, width) in [("a.png", Some(64)), ("b.png", Some(512)), ("c.png", None)] {
        let mut file = FileEntry::new(package, path);
        file.width = width;
        catalog.insert_file(&file).expect("insert file");
    }
    let compiler = compiler();

    let small = run_file_query(
        &compiler,
        &catalog,
        &FilterState {
            width: RangeFilter::at_most("128"),
            ..Default::default()
        },
    );
    assert_eq!(small.total, 1);
    assert_eq!(small.rows[0].file.path, "a.png");

    let unparsed = run_file_query(
        &compiler,
        &catalog,
        &FilterState {
            width: RangeFilter::at_most("wide"),
            ..Default::default()
        },
    );
    assert_eq!(unparsed.total, 3);
}

#[test]
fn category_facet_matches_safe_names() {
    let catalog = vehicle_catalog();
    let page = run_file_query(
        &compiler(),
        &catalog,
        &FilterState {
            category: Some("Art/Props".to_string()),
            ..Default::default()
        },
    );
    assert_eq!(page.total, 1);
    assert_eq!(page.rows[0].file.path, "Props/tree.prefab");
}

#[test]
fn package_listing_is_ordered_and_filtered() {
    let catalog = vehicle_catalog();
    let listing = run_package_query(
        &compiler(),
        &catalog,
        &PackageFilter {
            sort: PackageSort::Name,
            ..Default::default()
        },
    );
    assert_eq!(listing.error, None);
    let names: Vec<&str> = listing
        .rows
        .iter()
        .map(|package| package.display_name.as_str())
        .collect();
    assert_eq!(names, vec!["Props", "Vehicle Pack"]);
    assert_eq!(listing.page_count(), 1);
}
