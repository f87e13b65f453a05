use crate::store::{RecordStore, StoreError};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::config::Region;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;
use domain::{Todo, TodoId, TodoStatus};
use shared::Config;
use std::collections::HashMap;
use tracing::{debug, error};

const SK_PREFIX: &str = "TODO#";

#[derive(Clone)]
pub struct DynamoDbClient {
    client: Client,
    table_name: String,
}

impl DynamoDbClient {
    pub async fn new(config: &Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.aws_region.clone()));

        // DynamoDB Local などへの接続先上書き
        if let Some(endpoint) = &config.dynamodb_endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let aws_config = loader.load().await;
        let client = Client::new(&aws_config);

        Self {
            client,
            table_name: config.dynamodb_table.clone(),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

/// DynamoDB 上の Todo コレクション
///
/// 1 テーブルに複数の名前空間を同居させる単一テーブル設計。
/// PK = `NS#{namespace}`, SK = `TODO#{id}`（ID は 20 桁ゼロ埋め）。
#[derive(Clone)]
pub struct DynamoDbRecordStore {
    db: DynamoDbClient,
    namespace: String,
}

impl DynamoDbRecordStore {
    pub fn new(db: DynamoDbClient, namespace: impl Into<String>) -> Self {
        Self {
            db,
            namespace: namespace.into(),
        }
    }

    fn pk(&self) -> String {
        partition_key(&self.namespace)
    }

    /// 条件付き書き込み。条件を満たさなかった場合は `false`。
    async fn conditional_put(&self, todo: &Todo, condition: &str) -> Result<bool, StoreError> {
        let result = self
            .db
            .client()
            .put_item()
            .table_name(self.db.table_name())
            .set_item(Some(self.item(todo)))
            .condition_expression(condition)
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e)
                if e
                    .as_service_error()
                    .is_some_and(|se| se.is_conditional_check_failed_exception()) =>
            {
                debug!(todo_id = %todo.id, condition, "Conditional write rejected");
                Ok(false)
            }
            Err(e) => Err(StoreError::DynamoDb(DisplayErrorContext(&e).to_string())),
        }
    }

    fn item(&self, todo: &Todo) -> HashMap<String, AttributeValue> {
        let mut item = todo_to_attributes(todo);
        item.insert("PK".to_string(), AttributeValue::S(self.pk()));
        item.insert("SK".to_string(), AttributeValue::S(sort_key(todo.id)));
        item
    }
}

#[async_trait]
impl RecordStore for DynamoDbRecordStore {
    async fn fetch_one(&self, id: TodoId) -> Result<Option<Todo>, StoreError> {
        let output = self
            .db
            .client()
            .get_item()
            .table_name(self.db.table_name())
            .key("PK", AttributeValue::S(self.pk()))
            .key("SK", AttributeValue::S(sort_key(id)))
            .send()
            .await
            .map_err(|e| StoreError::DynamoDb(DisplayErrorContext(&e).to_string()))?;

        output.item().map(item_to_todo).transpose()
    }

    async fn fetch_all(&self) -> Result<Vec<Todo>, StoreError> {
        let mut todos = Vec::new();
        let mut start_key = None;

        loop {
            let output = self
                .db
                .client()
                .query()
                .table_name(self.db.table_name())
                .key_condition_expression("PK = :pk AND begins_with(SK, :sk_prefix)")
                .expression_attribute_values(":pk", AttributeValue::S(self.pk()))
                .expression_attribute_values(
                    ":sk_prefix",
                    AttributeValue::S(SK_PREFIX.to_string()),
                )
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| StoreError::DynamoDb(DisplayErrorContext(&e).to_string()))?;

            todos.extend(items_to_todos(output.items())?);

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        debug!(count = todos.len(), namespace = %self.namespace, "Fetched todos");
        Ok(todos)
    }

    async fn insert(&self, todo: &Todo) -> Result<bool, StoreError> {
        self.conditional_put(todo, "attribute_not_exists(SK)").await
    }

    async fn replace(&self, todo: &Todo) -> Result<bool, StoreError> {
        self.conditional_put(todo, "attribute_exists(SK)").await
    }

    async fn write(&self, todo: &Todo) -> Result<(), StoreError> {
        self.db
            .client()
            .put_item()
            .table_name(self.db.table_name())
            .set_item(Some(self.item(todo)))
            .send()
            .await
            .map_err(|e| StoreError::DynamoDb(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }

    async fn delete(&self, id: TodoId) -> Result<Option<Todo>, StoreError> {
        let output = self
            .db
            .client()
            .delete_item()
            .table_name(self.db.table_name())
            .key("PK", AttributeValue::S(self.pk()))
            .key("SK", AttributeValue::S(sort_key(id)))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(|e| StoreError::DynamoDb(DisplayErrorContext(&e).to_string()))?;

        output.attributes().map(item_to_todo).transpose()
    }
}

fn partition_key(namespace: &str) -> String {
    format!("NS#{namespace}")
}

fn sort_key(id: TodoId) -> String {
    format!("{SK_PREFIX}{:020}", id.value())
}

fn todo_to_attributes(todo: &Todo) -> HashMap<String, AttributeValue> {
    HashMap::from([
        ("id".to_string(), AttributeValue::N(todo.id.to_string())),
        ("title".to_string(), AttributeValue::S(todo.title.clone())),
        (
            "description".to_string(),
            AttributeValue::S(todo.description.clone()),
        ),
        ("category".to_string(), AttributeValue::S(todo.category.clone())),
        (
            "status".to_string(),
            AttributeValue::S(todo.status.as_str().to_string()),
        ),
    ])
}

/// 1 件でも解釈できない項目があれば全体を失敗させる
fn items_to_todos(items: &[HashMap<String, AttributeValue>]) -> Result<Vec<Todo>, StoreError> {
    items
        .iter()
        .map(|item| {
            item_to_todo(item).map_err(|e| {
                error!(
                    sk = item.get("SK").and_then(|v| v.as_s().ok()).map(String::as_str),
                    error = %e,
                    "Failed to decode todo item"
                );
                e
            })
        })
        .collect()
}

fn item_to_todo(item: &HashMap<String, AttributeValue>) -> Result<Todo, StoreError> {
    let string = |name: &str| -> Result<String, StoreError> {
        item.get(name)
            .and_then(|v| v.as_s().ok())
            .cloned()
            .ok_or_else(|| StoreError::CorruptRecord(format!("missing attribute '{name}'")))
    };

    let id = item
        .get("id")
        .and_then(|v| v.as_n().ok())
        .ok_or_else(|| StoreError::CorruptRecord("missing attribute 'id'".to_string()))?
        .parse::<TodoId>()
        .map_err(|e| StoreError::CorruptRecord(e.to_string()))?;

    let status = string("status")?
        .parse::<TodoStatus>()
        .map_err(|e| StoreError::CorruptRecord(e.to_string()))?;

    Ok(Todo {
        id,
        title: string("title")?,
        description: string("description").unwrap_or_default(),
        category: string("category")?,
        status,
    })
}
