//! PUT /todos/:id の部分更新
//!
//! 各フィールドは「未指定 / 明示的 null / 値」の三状態を持つ。
//! 未指定のフィールドは保存済みの値をそのまま残し、null は既定値に戻す。

use crate::errors::DomainError;
use crate::todo::{Todo, TodoStatus, DEFAULT_CATEGORY};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 三状態フィールド
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> Field<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Absent
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Field::Value(v),
            None => Field::Null,
        }
    }
}

// キー自体が無い場合は `#[serde(default)]` により Absent になる
impl<'de, T> Deserialize<'de> for Field<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Field::from)
    }
}

impl<T> Serialize for Field<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Field::Value(v) => v.serialize(serializer),
            Field::Absent | Field::Null => serializer.serialize_none(),
        }
    }
}

/// Todo の部分更新内容。id は更新対象外のため持たない。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoPatch {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub title: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub description: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub category: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub status: Field<TodoStatus>,
}

impl TodoPatch {
    /// ステータスのみを変更するパッチ
    pub fn status(status: TodoStatus) -> Self {
        Self {
            status: Field::Value(status),
            ..Self::default()
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Field::Value(title.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_absent()
            && self.description.is_absent()
            && self.category.is_absent()
            && self.status.is_absent()
    }

    /// 保存済みレコードにパッチを適用した新しいレコードを返す
    pub fn apply(self, current: &Todo) -> Result<Todo, DomainError> {
        let mut merged = current.clone();

        match self.title {
            Field::Absent => {}
            Field::Null => {
                return Err(DomainError::Validation(
                    "Title cannot be null".to_string(),
                ))
            }
            Field::Value(title) if title.is_empty() => {
                return Err(DomainError::Validation(
                    "Title cannot be empty".to_string(),
                ))
            }
            Field::Value(title) => merged.title = title,
        }

        match self.description {
            Field::Absent => {}
            Field::Null => merged.description = String::new(),
            Field::Value(description) => merged.description = description,
        }

        match self.category {
            Field::Absent => {}
            Field::Null => merged.category = DEFAULT_CATEGORY.to_string(),
            Field::Value(category) => merged.category = category,
        }

        match self.status {
            Field::Absent => {}
            Field::Null => merged.status = TodoStatus::default(),
            Field::Value(status) => merged.status = status,
        }

        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::todo::TodoId;

    fn stored() -> Todo {
        Todo {
            id: TodoId::new(7).unwrap(),
            title: "Write report".into(),
            description: "quarterly".into(),
            category: "work".into(),
            status: TodoStatus::NotStarted,
        }
    }

    #[test]
    fn absent_null_and_value_are_distinguished() {
        let patch: TodoPatch =
            serde_json::from_str(r#"{"description": null, "status": "completed"}"#).unwrap();

        assert_eq!(patch.title, Field::Absent);
        assert_eq!(patch.description, Field::Null);
        assert_eq!(patch.category, Field::Absent);
        assert_eq!(patch.status, Field::Value(TodoStatus::Completed));
    }

    #[test]
    fn apply_only_touches_present_fields() {
        let merged = TodoPatch::status(TodoStatus::Completed)
            .apply(&stored())
            .unwrap();

        assert_eq!(merged.status, TodoStatus::Completed);
        assert_eq!(merged.title, "Write report");
        assert_eq!(merged.description, "quarterly");
        assert_eq!(merged.category, "work");
        assert_eq!(merged.id.value(), 7);
    }

    #[test]
    fn null_resets_to_defaults() {
        let patch: TodoPatch =
            serde_json::from_str(r#"{"description": null, "category": null, "status": null}"#)
                .unwrap();
        let merged = patch.apply(&stored()).unwrap();

        assert_eq!(merged.description, "");
        assert_eq!(merged.category, "general");
        assert_eq!(merged.status, TodoStatus::InProgress);
    }

    #[test]
    fn title_cannot_be_cleared() {
        let null_title: TodoPatch = serde_json::from_str(r#"{"title": null}"#).unwrap();
        assert!(null_title.apply(&stored()).is_err());
        assert!(TodoPatch::title("").apply(&stored()).is_err());
    }

    #[test]
    fn whitespace_title_is_kept() {
        let merged = TodoPatch::title("  ").apply(&stored()).unwrap();
        assert_eq!(merged.title, "  ");
    }

    #[test]
    fn unknown_fields_and_id_are_ignored() {
        let patch: TodoPatch = serde_json::from_str(r#"{"id": 99, "owner": "x"}"#).unwrap();
        assert!(patch.is_empty());
        assert_eq!(patch.apply(&stored()).unwrap(), stored());
    }

    #[test]
    fn serialize_skips_absent_fields() {
        let json = serde_json::to_value(TodoPatch::status(TodoStatus::Completed)).unwrap();
        assert_eq!(json, serde_json::json!({"status": "completed"}));

        let clear = TodoPatch {
            description: Field::Null,
            ..TodoPatch::default()
        };
        assert_eq!(
            serde_json::to_value(clear).unwrap(),
            serde_json::json!({"description": null})
        );
    }

    // プロパティベーステスト: パッチに含まれないフィールドは常に保持される
    mod prop {
        use super::*;
        use proptest::prelude::*;

        fn any_status() -> impl Strategy<Value = TodoStatus> {
            prop_oneof![
                Just(TodoStatus::NotStarted),
                Just(TodoStatus::InProgress),
                Just(TodoStatus::Completed),
            ]
        }

        fn any_text_field() -> impl Strategy<Value = Field<String>> {
            prop_oneof![
                Just(Field::Absent),
                Just(Field::Null),
                "[a-z]{0,16}".prop_map(Field::Value),
            ]
        }

        fn any_patch() -> impl Strategy<Value = TodoPatch> {
            (
                prop_oneof![Just(Field::Absent), "[a-z]{1,16}".prop_map(Field::Value)],
                any_text_field(),
                any_text_field(),
                prop_oneof![
                    Just(Field::Absent),
                    Just(Field::Null),
                    any_status().prop_map(Field::Value)
                ],
            )
                .prop_map(|(title, description, category, status)| TodoPatch {
                    title,
                    description,
                    category,
                    status,
                })
        }

        proptest! {
            #[test]
            fn fields_follow_patch_or_keep_previous(patch in any_patch(), status in any_status()) {
                let mut current = stored();
                current.status = status;
                let merged = patch.clone().apply(&current).unwrap();

                prop_assert_eq!(merged.id, current.id);
                match patch.title {
                    Field::Value(t) => prop_assert_eq!(&merged.title, &t),
                    _ => prop_assert_eq!(&merged.title, &current.title),
                }
                match patch.description {
                    Field::Absent => prop_assert_eq!(&merged.description, &current.description),
                    Field::Null => prop_assert_eq!(merged.description.as_str(), ""),
                    Field::Value(d) => prop_assert_eq!(&merged.description, &d),
                }
                match patch.category {
                    Field::Absent => prop_assert_eq!(&merged.category, &current.category),
                    Field::Null => prop_assert_eq!(merged.category.as_str(), DEFAULT_CATEGORY),
                    Field::Value(c) => prop_assert_eq!(&merged.category, &c),
                }
                match patch.status {
                    Field::Absent => prop_assert_eq!(merged.status, current.status),
                    Field::Null => prop_assert_eq!(merged.status, TodoStatus::default()),
                    Field::Value(s) => prop_assert_eq!(merged.status, s),
                }
            }
        }
    }
}
