//! 初回起動時の一括投入データ
//!
//! 入力は `status → category → [{id, title, description}]` の入れ子構造で、
//! これを ID ごとのフラットな Todo に展開する。

use crate::errors::DomainError;
use crate::todo::{Todo, TodoId, TodoStatus};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

#[derive(Debug, Clone, Deserialize)]
pub struct SeedEntry {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// JSON オブジェクトをキーの出現順のまま保持する
#[derive(Debug, Clone)]
struct Ordered<V>(Vec<(String, V)>);

impl<V> Default for Ordered<V> {
    fn default() -> Self {
        Ordered(Vec::new())
    }
}

impl<'de, V> Deserialize<'de> for Ordered<V>
where
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OrderedVisitor<V>(PhantomData<V>);

        impl<'de, V> Visitor<'de> for OrderedVisitor<V>
        where
            V: Deserialize<'de>,
        {
            type Value = Ordered<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry()? {
                    entries.push(entry);
                }
                Ok(Ordered(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor(PhantomData))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct SeedDocument(Ordered<Ordered<Vec<SeedEntry>>>);

impl SeedDocument {
    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        serde_json::from_str(json)
            .map_err(|e| DomainError::Validation(format!("Invalid seed document: {e}")))
    }

    /// 入れ子構造を展開する。同じ ID が複数回現れた場合は文書中で後に現れた方が勝つ。
    pub fn flatten(self) -> Result<Vec<Todo>, DomainError> {
        let SeedDocument(Ordered(statuses)) = self;
        let mut by_id = BTreeMap::new();

        for (status_key, Ordered(categories)) in statuses {
            let status: TodoStatus = status_key.parse()?;
            for (category, entries) in categories {
                for entry in entries {
                    let id = TodoId::new(entry.id)?;
                    by_id.insert(
                        id,
                        Todo {
                            id,
                            title: entry.title,
                            description: entry.description.unwrap_or_default(),
                            category: category.clone(),
                            status,
                        },
                    );
                }
            }
        }

        Ok(by_id.into_values().collect())
    }
}
