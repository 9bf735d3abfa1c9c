use folio_intl::interpolate::values;
use folio_intl::relay::{ Avatar, ReviewSubmission };
use folio_intl::{ Locale, LocaleStore, MemoryPreferences, TranslationTree };
use serde_json::Value;

fn store(locale: Locale) -> LocaleStore {
    let tree = TranslationTree::bundled().unwrap();
    LocaleStore::with_locale(tree, Box::new(MemoryPreferences::new()), locale)
}

fn leaf_paths(node: &Value, prefix: &str, out: &mut Vec<String>) {
    match node {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                leaf_paths(child, &path, out);
            }
        }
        _ => out.push(prefix.to_string()),
    }
}

#[test]
fn both_locales_share_the_same_keys() {
    let tree = TranslationTree::bundled().unwrap();
    let mut en = Vec::new();
    let mut es = Vec::new();
    leaf_paths(tree.root(Locale::En).unwrap(), "", &mut en);
    leaf_paths(tree.root(Locale::Es).unwrap(), "", &mut es);
    en.sort();
    es.sort();

    assert!(!en.is_empty());
    assert_eq!(en, es);
}

#[test]
fn every_leaf_translates_to_its_configured_string() {
    for locale in Locale::ALL {
        let store = store(locale);
        let root = store.tree().root(locale).unwrap();
        let mut paths = Vec::new();
        leaf_paths(root, "", &mut paths);

        for path in paths {
            let expected = path
                .split('.')
                .try_fold(root, |node, segment| node.get(segment))
                .and_then(Value::as_str)
                .unwrap();
            assert_eq!(store.t(&path), expected, "{} in {}", path, locale);
        }
    }
}

#[test]
fn welcome_message_interpolates_user() {
    let vars = values([("user", "Ada")]);
    assert_eq!(store(Locale::En).t_with("login.welcomeMessage", &vars), "Welcome, Ada");
    assert_eq!(store(Locale::Es).t_with("login.welcomeMessage", &vars), "Bienvenido, Ada");
    assert_eq!(store(Locale::En).t("login.welcomeMessage"), "Welcome, {user}");
}

#[test]
fn submission_errors_point_at_existing_messages() {
    let review = ReviewSubmission {
        name: "Ada".into(),
        review: "Nice".into(),
        avatar: Some(Avatar { file_name: "me.tiff".into(), size: 10 }),
        ..Default::default()
    };
    let err = review.validate().unwrap_err();
    let key = err.message_key();

    let store = store(Locale::En);
    assert_ne!(store.t(key), key);
    assert_ne!(store.t("profile.requiredFields"), "profile.requiredFields");
}
