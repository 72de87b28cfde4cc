use chrono::NaiveDate;
use newsdesk_core::db::open_db_in_memory;
use newsdesk_core::{
    ChildFilter, FolderStore, GranularityConfig, NewNode, NodeKind, NodePermissions, NodeStore,
    ReSorter, SqliteNodeRepository, SqliteSettingsRepository, StoreError,
};
use uuid::Uuid;

fn setup() -> rusqlite::Connection {
    open_db_in_memory().unwrap()
}

#[test]
fn insert_appends_sort_index_per_parent() {
    let conn = setup();
    let repo = SqliteNodeRepository::try_new(&conn).unwrap();

    let root = repo.insert_node(&NewNode::news_folder(None, "News")).unwrap();
    let first = repo
        .insert_node(&NewNode::news_folder(Some(root.id), "2023"))
        .unwrap();
    let second = repo
        .insert_node(&NewNode::page(Some(root.id), "About"))
        .unwrap();

    assert_eq!(root.sort_index, 0);
    assert_eq!(first.sort_index, 0);
    assert_eq!(second.sort_index, 1);
    assert_eq!(second.parent_id, Some(root.id));
    assert!(root.is_news_folder());
    assert!(!second.is_news_folder());
}

#[test]
fn insert_rejects_missing_parent() {
    let conn = setup();
    let repo = SqliteNodeRepository::try_new(&conn).unwrap();
    let missing = Uuid::new_v4();

    let err = repo
        .insert_node(&NewNode::page(Some(missing), "Orphan"))
        .unwrap_err();
    assert!(matches!(err, StoreError::NodeNotFound(id) if id == missing));
}

#[test]
fn publish_date_round_trips_without_timezone_shift() {
    let conn = setup();
    let repo = SqliteNodeRepository::try_new(&conn).unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 12, 31)
        .unwrap()
        .and_hms_opt(23, 30, 0)
        .unwrap();

    let item = repo
        .insert_node(&NewNode::news_item(None, "Year end", Some(date)))
        .unwrap();
    assert_eq!(item.kind, NodeKind::NewsItem);
    assert_eq!(item.publish_date, Some(date));

    repo.update_publish_date(item.id, None).unwrap();
    let reloaded = repo.get_node(item.id).unwrap().unwrap();
    assert_eq!(reloaded.publish_date, None);
}

#[test]
fn ancestors_are_nearest_first() {
    let conn = setup();
    let repo = SqliteNodeRepository::try_new(&conn).unwrap();

    let site = repo.insert_node(&NewNode::page(None, "Site")).unwrap();
    let news = repo
        .insert_node(&NewNode::news_folder(Some(site.id), "News"))
        .unwrap();
    let year = repo
        .insert_node(&NewNode::news_folder(Some(news.id), "2024"))
        .unwrap();
    let item = repo
        .insert_node(&NewNode::news_item(Some(year.id), "Item", None))
        .unwrap();

    let ids: Vec<_> = repo
        .get_ancestors(item.id)
        .unwrap()
        .into_iter()
        .map(|node| node.id)
        .collect();
    assert_eq!(ids, vec![year.id, news.id, site.id]);
    assert!(repo.get_ancestors(site.id).unwrap().is_empty());
}

#[test]
fn ancestors_of_unknown_node_is_not_found() {
    let conn = setup();
    let repo = SqliteNodeRepository::try_new(&conn).unwrap();

    let err = repo.get_ancestors(Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, StoreError::NodeNotFound(_)));
}

#[test]
fn list_children_filters_and_orders_by_title_desc() {
    let conn = setup();
    let repo = SqliteNodeRepository::try_new(&conn).unwrap();

    let root = repo.insert_node(&NewNode::news_folder(None, "News")).unwrap();
    repo.insert_node(&NewNode::news_folder(Some(root.id), "2022"))
        .unwrap();
    repo.insert_node(&NewNode::news_folder(Some(root.id), "2024"))
        .unwrap();
    repo.insert_node(&NewNode::folder(Some(root.id), "Archive"))
        .unwrap();
    repo.insert_node(&NewNode::news_item(Some(root.id), "Loose item", None))
        .unwrap();

    let titles = |filter| -> Vec<String> {
        repo.list_children(root.id, filter)
            .unwrap()
            .into_iter()
            .map(|node| node.title)
            .collect()
    };
    assert_eq!(titles(ChildFilter::NewsFolders), vec!["2024", "2022"]);
    assert_eq!(titles(ChildFilter::NewsItems), vec!["Loose item"]);
    assert_eq!(
        titles(ChildFilter::All),
        vec!["Loose item", "Archive", "2024", "2022"]
    );
}

#[test]
fn find_child_by_title_ignores_non_news_folders() {
    let conn = setup();
    let repo = SqliteNodeRepository::try_new(&conn).unwrap();

    let root = repo.insert_node(&NewNode::news_folder(None, "News")).unwrap();
    repo.insert_node(&NewNode::folder(Some(root.id), "2024"))
        .unwrap();
    repo.insert_node(&NewNode::page(Some(root.id), "2024"))
        .unwrap();

    assert!(repo.find_child_by_title(root.id, "2024").unwrap().is_none());

    let lookup = repo.find_or_create_folder(root.id, "2024").unwrap();
    assert!(lookup.created);
    assert!(lookup.folder.is_news_folder());
    assert!(!lookup.folder.hidden);

    let again = repo.find_or_create_folder(root.id, "2024").unwrap();
    assert!(!again.created);
    assert_eq!(again.folder.id, lookup.folder.id);
}

#[test]
fn created_date_folders_carry_date_folder_permissions() {
    let conn = setup();
    let repo = SqliteNodeRepository::try_new(&conn).unwrap();

    let root = repo.insert_node(&NewNode::news_folder(None, "News")).unwrap();
    assert_eq!(root.permissions, NodePermissions::default());

    let year = repo.create_folder(root.id, "2024").unwrap();
    let month = repo.find_or_create_folder(year.id, "07").unwrap().folder;
    for folder in [&year, &month] {
        assert_eq!(folder.permissions, NodePermissions::DATE_FOLDER);
        assert_eq!(folder.permissions.owner_id, 1);
        assert_eq!(folder.permissions.group_id, 1);
        assert_eq!(folder.permissions.user, 31);
        assert_eq!(folder.permissions.group, 31);
        assert_eq!(folder.permissions.everybody, 1);
    }

    let stored = repo.get_node(month.id).unwrap().unwrap();
    assert_eq!(stored.permissions, NodePermissions::DATE_FOLDER);
}

#[test]
fn resort_orders_children_descending_by_title() {
    let conn = setup();
    let repo = SqliteNodeRepository::try_new(&conn).unwrap();

    let root = repo.insert_node(&NewNode::news_folder(None, "News")).unwrap();
    let y2023 = repo.create_folder(root.id, "2023").unwrap();
    let y2024 = repo.create_folder(root.id, "2024").unwrap();
    let y2022 = repo.create_folder(root.id, "2022").unwrap();

    let report = ReSorter::new(&repo).resort(&[root.id, root.id]).unwrap();
    assert_eq!(report.folders, 1);

    let index_of = |id| repo.get_node(id).unwrap().unwrap().sort_index;
    assert_eq!(index_of(y2024.id), 0);
    assert_eq!(index_of(y2023.id), 1);
    assert_eq!(index_of(y2022.id), 2);

    let second = ReSorter::new(&repo).resort(&[root.id]).unwrap();
    assert_eq!(second.updated, 0);
}

#[test]
fn resort_of_empty_folder_is_noop() {
    let conn = setup();
    let repo = SqliteNodeRepository::try_new(&conn).unwrap();
    let root = repo.insert_node(&NewNode::news_folder(None, "News")).unwrap();

    let report = ReSorter::new(&repo).resort(&[root.id]).unwrap();
    assert_eq!(report.folders, 1);
    assert_eq!(report.updated, 0);
}

#[test]
fn settings_default_to_year_only_and_persist() {
    let conn = setup();
    let settings = SqliteSettingsRepository::try_new(&conn).unwrap();

    assert_eq!(settings.load().unwrap(), GranularityConfig::YEAR);

    settings.save(&GranularityConfig::DAY).unwrap();
    assert_eq!(settings.load().unwrap(), GranularityConfig::DAY);

    settings.save(&GranularityConfig::MONTH).unwrap();
    assert_eq!(settings.load().unwrap(), GranularityConfig::MONTH);
}

#[test]
fn granularity_config_parses_camel_case_keys() {
    let config: GranularityConfig = serde_json::from_str(r#"{"sortByMonth": true}"#).unwrap();
    assert_eq!(config, GranularityConfig::MONTH);

    let config: GranularityConfig =
        serde_json::from_str(r#"{"sortByMonth": true, "sortByDay": true}"#).unwrap();
    assert_eq!(config, GranularityConfig::DAY);
}
