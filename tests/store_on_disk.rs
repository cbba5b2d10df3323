use blog_post_store::{BlogPost, BlogPostStore, StoreError, UNKNOWN_ID};
use tempfile::TempDir;

fn db_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

fn titles(store: &BlogPostStore) -> Vec<String> {
    store
        .get_all_blog_posts()
        .unwrap()
        .into_iter()
        .map(|post| post.title)
        .collect()
}

#[test]
fn reopen_continues_ids_after_highest_stored() {
    let dir = db_dir();
    let path = dir.path().join("nested").join("BlogPost.sqlite");

    {
        let store = BlogPostStore::open_with_version(&path, 1).unwrap();
        for title in ["A", "B", "C"] {
            store.add_blog_post(&BlogPost::with_title(title)).unwrap();
        }
        store.delete_blog_post(&BlogPost::with_title("b")).unwrap();
    }

    let store = BlogPostStore::open_with_version(&path, 1).unwrap();
    assert_eq!(titles(&store), vec!["A", "C"]);

    let stored = store
        .add_blog_post(&BlogPost::with_title("D"))
        .unwrap()
        .unwrap();
    assert_eq!(stored.id, 3);
}

#[test]
fn reopening_with_higher_version_wipes_posts() {
    let dir = db_dir();
    let path = dir.path().join("BlogPost.sqlite");

    {
        let store = BlogPostStore::open_with_version(&path, 1).unwrap();
        store.add_blog_post(&BlogPost::with_title("Old")).unwrap();
    }

    let store = BlogPostStore::open_with_version(&path, 2).unwrap();
    assert_eq!(store.get_blog_posts_count().unwrap(), 0);
    assert_eq!(store.schema_version().unwrap(), 2);

    let stored = store
        .add_blog_post(&BlogPost::with_title("New"))
        .unwrap()
        .unwrap();
    assert_eq!(stored.id, 0);
}

#[test]
fn reopening_with_lower_version_keeps_posts() {
    let dir = db_dir();
    let path = dir.path().join("BlogPost.sqlite");

    {
        let store = BlogPostStore::open_with_version(&path, 3).unwrap();
        store.add_blog_post(&BlogPost::with_title("Kept")).unwrap();
    }

    let store = BlogPostStore::open_with_version(&path, 1).unwrap();
    assert_eq!(titles(&store), vec!["Kept"]);
    assert_eq!(store.schema_version().unwrap(), 3);
}

#[test]
fn hello_scenario_keeps_first_id() {
    let dir = db_dir();
    let path = dir.path().join("BlogPost.sqlite");
    let store = BlogPostStore::open_with_version(&path, 1).unwrap();

    let first = store
        .add_blog_post(&BlogPost::with_title("Hello"))
        .unwrap()
        .unwrap();
    store.add_blog_post(&BlogPost::with_title("hello")).unwrap();

    assert_eq!(store.get_blog_posts_count().unwrap(), 1);
    let found = store
        .find_blog_post_row_id(&BlogPost::with_title("HELLO"))
        .unwrap();
    assert_eq!(found, first.id);
    assert_ne!(found, UNKNOWN_ID);
}

#[test]
fn non_positive_versions_are_rejected_before_touching_the_file() {
    let dir = db_dir();
    let path = dir.path().join("BlogPost.sqlite");

    {
        let store = BlogPostStore::open_with_version(&path, 1).unwrap();
        store.add_blog_post(&BlogPost::with_title("Survivor")).unwrap();
    }

    for version in [0, -3] {
        let err = BlogPostStore::open_with_version(&path, version)
            .err()
            .expect("non-positive version should be rejected");
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::InvalidConfig { .. })
        ));
    }

    let store = BlogPostStore::open_with_version(&path, 1).unwrap();
    assert_eq!(titles(&store), vec!["Survivor"]);
    assert_eq!(store.schema_version().unwrap(), 1);
}
