use aws_config::SdkConfig;
use aws_sdk_dynamodb::{
    error::DisplayErrorContext,
    types::{AttributeValue, ReturnValue},
    Client,
};
use std::collections::HashMap;
use trip_relay_types::{
    export::async_trait::async_trait, KeyedStore, PartialUpdate, Record, UpdateOutcome, Value,
};

use crate::{from_item, stream_err, to_attribute, to_key_attribute, AwsErr, AwsResult};

#[derive(Debug, Clone)]
/// A DynamoDB table with a single-attribute partition key.
pub struct DynamoStore {
    client: Client,
    table: String,
    key_field: String,
}

#[derive(Debug, Clone, PartialEq)]
/// The parts of an `UpdateItem` request that set a group of fields.
///
/// Field names go through placeholders (`#f0`, `#f1`, ...), so any attribute name is safe,
/// reserved words included.
pub struct UpdateExpression {
    pub expression: String,
    pub condition: String,
    pub names: HashMap<String, String>,
    pub values: HashMap<String, AttributeValue>,
}

#[async_trait]
impl KeyedStore for DynamoStore {
    type Error = AwsErr;

    async fn get(&self, key: &Value) -> AwsResult<Option<Record>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(&self.key_field, to_key_attribute(key).map_err(stream_err)?)
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| stream_err(AwsErr::DynamoDb(DisplayErrorContext(&e).to_string())))?;
        Ok(output.item().map(from_item))
    }

    async fn update(&self, update: &PartialUpdate) -> AwsResult<UpdateOutcome> {
        let UpdateExpression {
            expression,
            condition,
            names,
            values,
        } = UpdateExpression::new(&self.key_field, update.fields());
        log::debug!("{} {expression}", self.table);

        let output = self
            .client
            .update_item()
            .table_name(&self.table)
            .key(
                &self.key_field,
                to_key_attribute(update.key()).map_err(stream_err)?,
            )
            .update_expression(expression)
            .condition_expression(condition)
            .set_expression_attribute_names(Some(names))
            .set_expression_attribute_values(Some(values))
            .return_values(ReturnValue::UpdatedNew)
            .send()
            .await
            .map_err(|e| {
                let condition_failed = e
                    .as_service_error()
                    .map(|e| e.is_conditional_check_failed_exception())
                    .unwrap_or(false);
                stream_err(if condition_failed {
                    AwsErr::ConditionFailed(update.key().to_string())
                } else {
                    AwsErr::DynamoDb(DisplayErrorContext(&e).to_string())
                })
            })?;

        Ok(UpdateOutcome {
            changed: output.attributes().map(from_item).unwrap_or_default(),
        })
    }
}

impl DynamoStore {
    pub fn new<T: Into<String>, K: Into<String>>(
        config: &SdkConfig,
        table: T,
        key_field: K,
    ) -> Self {
        Self::from_client(Client::new(config), table, key_field)
    }

    pub fn from_client<T: Into<String>, K: Into<String>>(
        client: Client,
        table: T,
        key_field: K,
    ) -> Self {
        Self {
            client,
            table: table.into(),
            key_field: key_field.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn key_field(&self) -> &str {
        &self.key_field
    }
}

impl UpdateExpression {
    /// `SET #f0 = :v0, #f1 = :v1, ...`, conditioned on the key attribute existing.
    pub fn new(key_field: &str, fields: &Record) -> Self {
        let mut names = HashMap::new();
        let mut values = HashMap::new();
        let mut assignments = Vec::new();
        names.insert("#k".to_owned(), key_field.to_owned());
        for (i, (field, value)) in fields.iter().enumerate() {
            names.insert(format!("#f{i}"), field.to_owned());
            values.insert(format!(":v{i}"), to_attribute(value));
            assignments.push(format!("#f{i} = :v{i}"));
        }
        Self {
            expression: format!("SET {}", assignments.join(", ")),
            condition: "attribute_exists(#k)".to_owned(),
            names,
            values,
        }
    }
}
