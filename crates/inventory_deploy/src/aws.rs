//! [`ControlPlane`] over the AWS SDK.
//!
//! Every call blocks on a runtime owned by the control plane, so the
//! orchestrator stays synchronous.

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;

use aws_config::{BehaviorVersion, Region};
use aws_sdk_apigatewayv2::types::{Cors, IntegrationType, ProtocolType};
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType,
    TableStatus as DynamoTableStatus,
};
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::{Environment, FunctionCode, LastUpdateStatus, Runtime, State};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketLocationConstraint, CreateBucketConfiguration, Event, FilterRule, FilterRuleName,
    IndexDocument, LambdaFunctionConfiguration, NotificationConfiguration,
    NotificationConfigurationFilter, S3KeyFilter, Tagging, WebsiteConfiguration,
};
use tracing::debug;

use crate::control_plane::{
    ApiSummary, ControlPlane, CorsRules, FunctionSpec, HttpApi, InvokePermission, StorageTrigger,
    TableSpec, TableStatus, Tags,
};
use crate::error::CloudError;

/// Region whose buckets must be created without a location constraint.
const DEFAULT_BUCKET_REGION: &str = "us-east-1";
const DEFAULT_STAGE: &str = "$default";
const PROXY_PAYLOAD_VERSION: &str = "2.0";
const INVOKE_ACTION: &str = "lambda:InvokeFunction";
const NO_TAG_SET: &str = "NoSuchTagSet";

pub struct AwsControlPlane {
    runtime: tokio::runtime::Runtime,
    region: String,
    iam: aws_sdk_iam::Client,
    sts: aws_sdk_sts::Client,
    dynamodb: aws_sdk_dynamodb::Client,
    s3: aws_sdk_s3::Client,
    sns: aws_sdk_sns::Client,
    lambda: aws_sdk_lambda::Client,
    apigateway: aws_sdk_apigatewayv2::Client,
}

impl AwsControlPlane {
    /// Resolves credentials from the default provider chain for `region`.
    pub fn connect(runtime: tokio::runtime::Runtime, region: &str) -> Self {
        let sdk_config = runtime.block_on(
            aws_config::defaults(BehaviorVersion::latest())
                .region(Region::new(region.to_string()))
                .load(),
        );
        debug!(region, "AWS clients configured");

        Self {
            region: region.to_string(),
            iam: aws_sdk_iam::Client::new(&sdk_config),
            sts: aws_sdk_sts::Client::new(&sdk_config),
            dynamodb: aws_sdk_dynamodb::Client::new(&sdk_config),
            s3: aws_sdk_s3::Client::new(&sdk_config),
            sns: aws_sdk_sns::Client::new(&sdk_config),
            lambda: aws_sdk_lambda::Client::new(&sdk_config),
            apigateway: aws_sdk_apigatewayv2::Client::new(&sdk_config),
            runtime,
        }
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

fn sdk_failure(operation: &'static str, error: &impl std::error::Error) -> CloudError {
    CloudError::service(operation, DisplayErrorContext(error).to_string())
}

fn conflict_or_failure<E, R>(
    operation: &'static str,
    resource: &str,
    error: SdkError<E, R>,
    is_conflict: impl FnOnce(&E) -> bool,
) -> CloudError
where
    E: std::error::Error + 'static,
    R: Debug,
{
    if error.as_service_error().is_some_and(is_conflict) {
        CloudError::AlreadyExists(resource.to_string())
    } else {
        sdk_failure(operation, &error)
    }
}

fn missing_or_failure<E, R>(
    operation: &'static str,
    resource: &str,
    error: SdkError<E, R>,
    is_missing: impl FnOnce(&E) -> bool,
) -> CloudError
where
    E: std::error::Error + 'static,
    R: Debug,
{
    if error.as_service_error().is_some_and(is_missing) {
        CloudError::NotFound(resource.to_string())
    } else {
        sdk_failure(operation, &error)
    }
}

/// Accepts SDK accessors for both required (`&str`) and optional members.
fn required_str<'a>(value: impl Into<Option<&'a str>>) -> Option<&'a str> {
    value.into()
}

fn missing_field(operation: &'static str, field: &str) -> CloudError {
    CloudError::service(operation, format!("response did not include {field}"))
}

fn tag_map(tags: &Tags) -> HashMap<String, String> {
    tags.iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

impl ControlPlane for AwsControlPlane {
    fn role_arn(&self, role_name: &str) -> Result<String, CloudError> {
        let output = self
            .block_on(self.iam.get_role().role_name(role_name).send())
            .map_err(|error| {
                missing_or_failure("iam:GetRole", role_name, error, |e| {
                    e.is_no_such_entity_exception()
                })
            })?;
        output
            .role()
            .and_then(|role| required_str(role.arn()))
            .map(str::to_string)
            .ok_or_else(|| CloudError::NotFound(role_name.to_string()))
    }

    fn account_id(&self) -> Result<String, CloudError> {
        let output = self
            .block_on(self.sts.get_caller_identity().send())
            .map_err(|error| sdk_failure("sts:GetCallerIdentity", &error))?;
        output
            .account()
            .map(str::to_string)
            .ok_or_else(|| missing_field("sts:GetCallerIdentity", "account"))
    }

    fn create_table(&self, table: &TableSpec) -> Result<(), CloudError> {
        const OPERATION: &str = "dynamodb:CreateTable";
        let build = |error: aws_sdk_dynamodb::error::BuildError| sdk_failure(OPERATION, &error);

        let mut request = self
            .dynamodb
            .create_table()
            .table_name(&table.name)
            .billing_mode(BillingMode::PayPerRequest);
        for (attribute, key_type) in [
            (&table.partition_key, KeyType::Hash),
            (&table.sort_key, KeyType::Range),
        ] {
            request = request
                .key_schema(
                    KeySchemaElement::builder()
                        .attribute_name(attribute)
                        .key_type(key_type)
                        .build()
                        .map_err(build)?,
                )
                .attribute_definitions(
                    AttributeDefinition::builder()
                        .attribute_name(attribute)
                        .attribute_type(ScalarAttributeType::S)
                        .build()
                        .map_err(build)?,
                );
        }
        for (key, value) in &table.tags {
            request = request.tags(
                aws_sdk_dynamodb::types::Tag::builder()
                    .key(key)
                    .value(value)
                    .build()
                    .map_err(build)?,
            );
        }

        self.block_on(request.send()).map_err(|error| {
            conflict_or_failure(OPERATION, &table.name, error, |e| {
                e.is_resource_in_use_exception()
            })
        })?;
        Ok(())
    }

    fn table_status(&self, table_name: &str) -> Result<TableStatus, CloudError> {
        let result = self.block_on(self.dynamodb.describe_table().table_name(table_name).send());
        let output = match result {
            Ok(output) => output,
            Err(error)
                if error
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_not_found_exception()) =>
            {
                return Ok(TableStatus::Missing);
            }
            Err(error) => return Err(sdk_failure("dynamodb:DescribeTable", &error)),
        };

        let status = match output.table().and_then(|table| table.table_status()) {
            Some(DynamoTableStatus::Active) => TableStatus::Active,
            Some(DynamoTableStatus::Creating) => TableStatus::Creating,
            Some(DynamoTableStatus::Updating) => TableStatus::Updating,
            Some(DynamoTableStatus::Deleting) => TableStatus::Deleting,
            Some(other) => TableStatus::Other(other.as_str().to_string()),
            None => TableStatus::Other("unknown".to_string()),
        };
        Ok(status)
    }

    fn delete_table(&self, table_name: &str) -> Result<(), CloudError> {
        self.block_on(self.dynamodb.delete_table().table_name(table_name).send())
            .map_err(|error| {
                missing_or_failure("dynamodb:DeleteTable", table_name, error, |e| {
                    e.is_resource_not_found_exception()
                })
            })?;
        Ok(())
    }

    fn create_bucket(&self, bucket: &str, tags: &Tags) -> Result<(), CloudError> {
        let mut request = self.s3.create_bucket().bucket(bucket);
        if self.region != DEFAULT_BUCKET_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }
        self.block_on(request.send()).map_err(|error| {
            conflict_or_failure("s3:CreateBucket", bucket, error, |e| {
                e.is_bucket_already_owned_by_you()
            })
        })?;

        if tags.is_empty() {
            return Ok(());
        }
        const OPERATION: &str = "s3:PutBucketTagging";
        let build = |error: aws_sdk_s3::error::BuildError| sdk_failure(OPERATION, &error);
        let tag_set = tags
            .iter()
            .map(|(key, value)| {
                aws_sdk_s3::types::Tag::builder()
                    .key(key)
                    .value(value)
                    .build()
                    .map_err(build)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let tagging = Tagging::builder()
            .set_tag_set(Some(tag_set))
            .build()
            .map_err(build)?;
        self.block_on(
            self.s3
                .put_bucket_tagging()
                .bucket(bucket)
                .tagging(tagging)
                .send(),
        )
        .map_err(|error| sdk_failure(OPERATION, &error))?;
        Ok(())
    }

    fn remove_public_access_block(&self, bucket: &str) -> Result<(), CloudError> {
        self.block_on(self.s3.delete_public_access_block().bucket(bucket).send())
            .map_err(|error| sdk_failure("s3:DeletePublicAccessBlock", &error))?;
        Ok(())
    }

    fn configure_website(&self, bucket: &str, index_document: &str) -> Result<(), CloudError> {
        const OPERATION: &str = "s3:PutBucketWebsite";
        let index = IndexDocument::builder()
            .suffix(index_document)
            .build()
            .map_err(|error| sdk_failure(OPERATION, &error))?;
        let website = WebsiteConfiguration::builder().index_document(index).build();
        self.block_on(
            self.s3
                .put_bucket_website()
                .bucket(bucket)
                .website_configuration(website)
                .send(),
        )
        .map_err(|error| sdk_failure(OPERATION, &error))?;
        Ok(())
    }

    fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<(), CloudError> {
        self.block_on(self.s3.put_bucket_policy().bucket(bucket).policy(policy).send())
            .map_err(|error| sdk_failure("s3:PutBucketPolicy", &error))?;
        Ok(())
    }

    fn put_storage_trigger(
        &self,
        bucket: &str,
        trigger: &StorageTrigger,
    ) -> Result<(), CloudError> {
        const OPERATION: &str = "s3:PutBucketNotificationConfiguration";
        let filter = NotificationConfigurationFilter::builder()
            .key(
                S3KeyFilter::builder()
                    .filter_rules(
                        FilterRule::builder()
                            .name(FilterRuleName::Suffix)
                            .value(&trigger.suffix)
                            .build(),
                    )
                    .build(),
            )
            .build();
        let function = LambdaFunctionConfiguration::builder()
            .lambda_function_arn(&trigger.function_arn)
            .set_events(Some(
                trigger
                    .events
                    .iter()
                    .map(|event| Event::from(event.as_str()))
                    .collect(),
            ))
            .filter(filter)
            .build()
            .map_err(|error| sdk_failure(OPERATION, &error))?;
        let configuration = NotificationConfiguration::builder()
            .lambda_function_configurations(function)
            .build();

        self.block_on(
            self.s3
                .put_bucket_notification_configuration()
                .bucket(bucket)
                .notification_configuration(configuration)
                .send(),
        )
        .map_err(|error| sdk_failure(OPERATION, &error))?;
        Ok(())
    }

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), CloudError> {
        self.block_on(
            self.s3
                .put_object()
                .bucket(bucket)
                .key(key)
                .body(ByteStream::from(body))
                .set_content_type(content_type.map(str::to_string))
                .send(),
        )
        .map_err(|error| sdk_failure("s3:PutObject", &error))?;
        Ok(())
    }

    fn list_buckets(&self) -> Result<Vec<String>, CloudError> {
        let output = self
            .block_on(self.s3.list_buckets().send())
            .map_err(|error| sdk_failure("s3:ListBuckets", &error))?;
        Ok(output
            .buckets()
            .iter()
            .filter_map(|bucket| bucket.name())
            .map(str::to_string)
            .collect())
    }

    fn bucket_tags(&self, bucket: &str) -> Result<Tags, CloudError> {
        let result = self.block_on(self.s3.get_bucket_tagging().bucket(bucket).send());
        let output = match result {
            Ok(output) => output,
            Err(error) if error.code() == Some(NO_TAG_SET) => return Ok(Tags::new()),
            Err(error) => return Err(sdk_failure("s3:GetBucketTagging", &error)),
        };
        Ok(output
            .tag_set()
            .iter()
            .filter_map(|tag| Some((required_str(tag.key())?, required_str(tag.value())?)))
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect())
    }

    fn list_object_keys(&self, bucket: &str) -> Result<Vec<String>, CloudError> {
        self.block_on(async {
            let mut keys = Vec::new();
            let mut pages = self
                .s3
                .list_objects_v2()
                .bucket(bucket)
                .into_paginator()
                .send();
            while let Some(page) = pages.next().await {
                let page = page.map_err(|error| sdk_failure("s3:ListObjectsV2", &error))?;
                keys.extend(
                    page.contents()
                        .iter()
                        .filter_map(|object| object.key())
                        .map(str::to_string),
                );
            }
            Ok(keys)
        })
    }

    fn delete_object(&self, bucket: &str, key: &str) -> Result<(), CloudError> {
        self.block_on(self.s3.delete_object().bucket(bucket).key(key).send())
            .map_err(|error| sdk_failure("s3:DeleteObject", &error))?;
        Ok(())
    }

    fn delete_bucket(&self, bucket: &str) -> Result<(), CloudError> {
        self.block_on(self.s3.delete_bucket().bucket(bucket).send())
            .map_err(|error| sdk_failure("s3:DeleteBucket", &error))?;
        Ok(())
    }

    fn create_topic(&self, name: &str, tags: &Tags) -> Result<String, CloudError> {
        const OPERATION: &str = "sns:CreateTopic";
        let tags = tags
            .iter()
            .map(|(key, value)| {
                aws_sdk_sns::types::Tag::builder()
                    .key(key)
                    .value(value)
                    .build()
                    .map_err(|error| sdk_failure(OPERATION, &error))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let output = self
            .block_on(
                self.sns
                    .create_topic()
                    .name(name)
                    .set_tags(Some(tags))
                    .send(),
            )
            .map_err(|error| sdk_failure(OPERATION, &error))?;
        output
            .topic_arn()
            .map(str::to_string)
            .ok_or_else(|| missing_field(OPERATION, "topic ARN"))
    }

    fn subscribe_email(&self, topic_arn: &str, email: &str) -> Result<(), CloudError> {
        self.block_on(
            self.sns
                .subscribe()
                .topic_arn(topic_arn)
                .protocol("email")
                .endpoint(email)
                .send(),
        )
        .map_err(|error| sdk_failure("sns:Subscribe", &error))?;
        Ok(())
    }

    fn list_topics(&self) -> Result<Vec<String>, CloudError> {
        self.block_on(async {
            let mut arns = Vec::new();
            let mut pages = self.sns.list_topics().into_paginator().send();
            while let Some(page) = pages.next().await {
                let page = page.map_err(|error| sdk_failure("sns:ListTopics", &error))?;
                arns.extend(
                    page.topics()
                        .iter()
                        .filter_map(|topic| topic.topic_arn())
                        .map(str::to_string),
                );
            }
            Ok(arns)
        })
    }

    fn topic_tags(&self, topic_arn: &str) -> Result<Tags, CloudError> {
        let output = self
            .block_on(
                self.sns
                    .list_tags_for_resource()
                    .resource_arn(topic_arn)
                    .send(),
            )
            .map_err(|error| sdk_failure("sns:ListTagsForResource", &error))?;
        Ok(output
            .tags()
            .iter()
            .filter_map(|tag| Some((required_str(tag.key())?, required_str(tag.value())?)))
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect())
    }

    fn delete_topic(&self, topic_arn: &str) -> Result<(), CloudError> {
        self.block_on(self.sns.delete_topic().topic_arn(topic_arn).send())
            .map_err(|error| sdk_failure("sns:DeleteTopic", &error))?;
        Ok(())
    }

    fn create_function(&self, function: &FunctionSpec) -> Result<(), CloudError> {
        let code = FunctionCode::builder()
            .zip_file(Blob::new(function.archive.clone()))
            .build();
        self.block_on(
            self.lambda
                .create_function()
                .function_name(&function.name)
                .runtime(Runtime::from(function.runtime.as_str()))
                .role(&function.role_arn)
                .handler(&function.handler)
                .timeout(function.timeout_secs)
                .code(code)
                .environment(function_environment(function))
                .set_tags(Some(tag_map(&function.tags)))
                .send(),
        )
        .map_err(|error| {
            conflict_or_failure("lambda:CreateFunction", &function.name, error, |e| {
                e.is_resource_conflict_exception()
            })
        })?;
        Ok(())
    }

    fn update_function_code(&self, name: &str, archive: &[u8]) -> Result<(), CloudError> {
        self.block_on(
            self.lambda
                .update_function_code()
                .function_name(name)
                .zip_file(Blob::new(archive.to_vec()))
                .send(),
        )
        .map_err(|error| sdk_failure("lambda:UpdateFunctionCode", &error))?;
        Ok(())
    }

    fn update_function_configuration(&self, function: &FunctionSpec) -> Result<(), CloudError> {
        self.block_on(
            self.lambda
                .update_function_configuration()
                .function_name(&function.name)
                .runtime(Runtime::from(function.runtime.as_str()))
                .role(&function.role_arn)
                .handler(&function.handler)
                .timeout(function.timeout_secs)
                .environment(function_environment(function))
                .send(),
        )
        .map_err(|error| sdk_failure("lambda:UpdateFunctionConfiguration", &error))?;
        Ok(())
    }

    fn function_update_in_progress(&self, name: &str) -> Result<bool, CloudError> {
        let output = self
            .block_on(
                self.lambda
                    .get_function_configuration()
                    .function_name(name)
                    .send(),
            )
            .map_err(|error| sdk_failure("lambda:GetFunctionConfiguration", &error))?;
        Ok(output.last_update_status() == Some(&LastUpdateStatus::InProgress)
            || output.state() == Some(&State::Pending))
    }

    fn function_arn(&self, name: &str) -> Result<String, CloudError> {
        const OPERATION: &str = "lambda:GetFunctionConfiguration";
        let output = self
            .block_on(
                self.lambda
                    .get_function_configuration()
                    .function_name(name)
                    .send(),
            )
            .map_err(|error| {
                missing_or_failure(OPERATION, name, error, |e| {
                    e.is_resource_not_found_exception()
                })
            })?;
        output
            .function_arn()
            .map(str::to_string)
            .ok_or_else(|| missing_field(OPERATION, "function ARN"))
    }

    fn add_invoke_permission(&self, permission: &InvokePermission) -> Result<(), CloudError> {
        self.block_on(
            self.lambda
                .add_permission()
                .function_name(&permission.function_name)
                .statement_id(&permission.statement_id)
                .action(INVOKE_ACTION)
                .principal(&permission.principal)
                .source_arn(&permission.source_arn)
                .send(),
        )
        .map_err(|error| {
            conflict_or_failure(
                "lambda:AddPermission",
                &permission.statement_id,
                error,
                |e| e.is_resource_conflict_exception(),
            )
        })?;
        Ok(())
    }

    fn delete_function(&self, name: &str) -> Result<(), CloudError> {
        self.block_on(self.lambda.delete_function().function_name(name).send())
            .map_err(|error| {
                missing_or_failure("lambda:DeleteFunction", name, error, |e| {
                    e.is_resource_not_found_exception()
                })
            })?;
        Ok(())
    }

    fn create_http_api(
        &self,
        name: &str,
        cors: &CorsRules,
        tags: &Tags,
    ) -> Result<HttpApi, CloudError> {
        const OPERATION: &str = "apigatewayv2:CreateApi";
        let cors = Cors::builder()
            .set_allow_origins(Some(cors.allow_origins.clone()))
            .set_allow_methods(Some(cors.allow_methods.clone()))
            .set_allow_headers(Some(cors.allow_headers.clone()))
            .build();
        let output = self
            .block_on(
                self.apigateway
                    .create_api()
                    .name(name)
                    .protocol_type(ProtocolType::Http)
                    .cors_configuration(cors)
                    .set_tags(Some(tag_map(tags)))
                    .send(),
            )
            .map_err(|error| sdk_failure(OPERATION, &error))?;

        let api_id = output
            .api_id()
            .ok_or_else(|| missing_field(OPERATION, "API id"))?;
        let endpoint = output
            .api_endpoint()
            .ok_or_else(|| missing_field(OPERATION, "API endpoint"))?;
        Ok(HttpApi {
            api_id: api_id.to_string(),
            endpoint: endpoint.to_string(),
        })
    }

    fn create_default_stage(&self, api_id: &str) -> Result<(), CloudError> {
        self.block_on(
            self.apigateway
                .create_stage()
                .api_id(api_id)
                .stage_name(DEFAULT_STAGE)
                .auto_deploy(true)
                .send(),
        )
        .map_err(|error| sdk_failure("apigatewayv2:CreateStage", &error))?;
        Ok(())
    }

    fn create_proxy_integration(
        &self,
        api_id: &str,
        function_arn: &str,
    ) -> Result<String, CloudError> {
        const OPERATION: &str = "apigatewayv2:CreateIntegration";
        let output = self
            .block_on(
                self.apigateway
                    .create_integration()
                    .api_id(api_id)
                    .integration_type(IntegrationType::AwsProxy)
                    .integration_uri(function_arn)
                    .payload_format_version(PROXY_PAYLOAD_VERSION)
                    .send(),
            )
            .map_err(|error| sdk_failure(OPERATION, &error))?;
        output
            .integration_id()
            .map(str::to_string)
            .ok_or_else(|| missing_field(OPERATION, "integration id"))
    }

    fn create_route(&self, api_id: &str, route_key: &str, target: &str) -> Result<(), CloudError> {
        self.block_on(
            self.apigateway
                .create_route()
                .api_id(api_id)
                .route_key(route_key)
                .target(target)
                .send(),
        )
        .map_err(|error| {
            conflict_or_failure("apigatewayv2:CreateRoute", route_key, error, |e| {
                e.is_conflict_exception()
            })
        })?;
        Ok(())
    }

    fn list_apis(&self) -> Result<Vec<ApiSummary>, CloudError> {
        self.block_on(async {
            let mut apis = Vec::new();
            let mut next_token: Option<String> = None;
            loop {
                let output = self
                    .apigateway
                    .get_apis()
                    .set_next_token(next_token.take())
                    .send()
                    .await
                    .map_err(|error| sdk_failure("apigatewayv2:GetApis", &error))?;

                for api in output.items() {
                    let (Some(api_id), Some(name)) = (api.api_id(), required_str(api.name())) else {
                        continue;
                    };
                    apis.push(ApiSummary {
                        api_id: api_id.to_string(),
                        name: name.to_string(),
                        tags: api
                            .tags()
                            .map(|tags| {
                                tags.iter()
                                    .map(|(key, value)| (key.clone(), value.clone()))
                                    .collect()
                            })
                            .unwrap_or_default(),
                    });
                }

                match output.next_token() {
                    Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                    _ => break,
                }
            }
            Ok(apis)
        })
    }

    fn delete_api(&self, api_id: &str) -> Result<(), CloudError> {
        self.block_on(self.apigateway.delete_api().api_id(api_id).send())
            .map_err(|error| {
                missing_or_failure("apigatewayv2:DeleteApi", api_id, error, |e| {
                    e.is_not_found_exception()
                })
            })?;
        Ok(())
    }
}

fn function_environment(function: &FunctionSpec) -> Environment {
    Environment::builder()
        .set_variables(Some(
            function
                .environment
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        ))
        .build()
}
