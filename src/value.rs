//! Conversions into [`Value`]s for templating.

use crate::page::Page;
use crate::post::Post;
use gtmpl::Value;
use std::collections::HashMap;

impl From<&Post> for Value {
    /// Converts a [`Post`] into a [`Value::Object`] with the fields `id`,
    /// `title`, `date`, `url`, `body`, `serie_url`, and `serie_name`. The
    /// series fields are empty when the post doesn't belong to a series.
    fn from(p: &Post) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("id".to_owned(), Value::String(p.id.clone()));
        m.insert("title".to_owned(), Value::String(p.title.clone()));
        m.insert("date".to_owned(), Value::String(p.date.clone()));
        m.insert("url".to_owned(), Value::String(p.url.to_string()));
        m.insert("body".to_owned(), Value::String(p.body.clone()));
        let (serie_url, serie_name) = match p.series_record() {
            Some(record) => (record.url, record.name),
            None => (String::new(), String::new()),
        };
        m.insert("serie_url".to_owned(), Value::String(serie_url));
        m.insert("serie_name".to_owned(), Value::String(serie_name));
        Value::Object(m)
    }
}

impl From<&Page> for Value {
    /// Converts a [`Page`]'s context into a [`Value::Object`].
    fn from(p: &Page) -> Value {
        Value::Object(
            p.context
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        )
    }
}

/// Converts YAML data (e.g., from `_data`) into a [`Value`]. Mapping keys
/// which aren't scalars are dropped.
pub fn from_yaml(yaml: &serde_yaml::Value) -> Value {
    use serde_yaml::Value as Yaml;
    match yaml {
        Yaml::Null => Value::Nil,
        Yaml::Bool(b) => Value::Bool(*b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                Value::from(n.as_f64().unwrap_or_default())
            }
        }
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Sequence(items) => Value::Array(items.iter().map(from_yaml).collect()),
        Yaml::Mapping(mapping) => Value::Object(
            mapping
                .iter()
                .filter_map(|(k, v)| yaml_key(k).map(|k| (k, from_yaml(v))))
                .collect(),
        ),
    }
}

fn yaml_key(key: &serde_yaml::Value) -> Option<String> {
    use serde_yaml::Value as Yaml;
    match key {
        Yaml::String(s) => Some(s.clone()),
        Yaml::Bool(b) => Some(b.to_string()),
        Yaml::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn object(value: Value) -> HashMap<String, Value> {
        match value {
            Value::Object(m) => m,
            other => panic!("wanted an object; found {:?}", other),
        }
    }

    fn string(value: &Value) -> &str {
        match value {
            Value::String(s) => s,
            other => panic!("wanted a string; found {:?}", other),
        }
    }

    #[test]
    fn test_page_to_value() {
        let mut context = BTreeMap::new();
        context.insert("serie_url".to_owned(), "go".to_owned());
        let page = Page {
            path: PathBuf::from("series/go/index.html"),
            layout: "serie_posts".to_owned(),
            context,
        };
        let m = object(Value::from(&page));
        assert_eq!(1, m.len());
        assert_eq!("go", string(&m["serie_url"]));
    }

    #[test]
    fn test_from_yaml() {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str("- url: go\n  name: Go Series\n  count: 3\n  draft: ~\n").unwrap();
        let mut items = match from_yaml(&yaml) {
            Value::Array(items) => items,
            other => panic!("wanted an array; found {:?}", other),
        };
        assert_eq!(1, items.len());
        let m = object(items.remove(0));
        assert_eq!("go", string(&m["url"]));
        assert_eq!("Go Series", string(&m["name"]));
        assert!(matches!(m["count"], Value::Number(_)));
        assert!(matches!(m["draft"], Value::Nil));
    }
}
