mod config;
mod courses;
mod dynamodb;
mod logging;
mod utils;

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use futures_util::TryStreamExt;
use tracing::info;

use crate::config::{AppConfig, Backend};
use crate::courses::{sample_courses, Course, GPA_ATTRIBUTE, SEMESTER_KEY};
use crate::dynamodb::{
    Condition, Connection, DynamoDbConnector, FieldType, InMemoryStore, StoreConnector, Table,
    TableClient,
};

const GPA_THRESHOLD: f64 = 3.5;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let config = AppConfig::from_env().context("failed to read configuration")?;
    logging::init_logging(config.log_level)?;

    match config.backend {
        Backend::Aws => {
            let connection = Connection::connect(
                &config.profile,
                &config.region,
                config.endpoint_url.as_deref(),
            )
            .await?;
            info!(
                "Connected with profile '{}' to {}",
                connection.profile(),
                connection.region()
            );
            let client = TableClient::new(DynamoDbConnector::new(&connection), config.wait);
            run(&client, &config).await
        }
        Backend::Memory => {
            info!("Running against the in-memory store");
            let client = TableClient::new(InMemoryStore::new(), config.wait);
            run(&client, &config).await
        }
    }
}

/// Create-or-wait, describe, insert the sample courses, then scan by GPA.
async fn run<C: StoreConnector>(client: &TableClient<C>, config: &AppConfig) -> Result<()> {
    let table = Table::new(&config.table_name, SEMESTER_KEY, FieldType::String)
        .with_throughput(config.throughput);

    client
        .ensure_table(&table)
        .await
        .with_context(|| format!("failed to provision table '{}'", table.name()))?;

    let description = client.describe_table(table.name()).await?;
    info!("Table description: {description}");

    for course in sample_courses() {
        let ack = client.put_item(&table, course.to_item()?).await?;
        info!("Put '{}' into '{}'", course.semester, ack.table_name);
    }

    let condition = Condition::greater_than(GPA_ATTRIBUTE, GPA_THRESHOLD);
    let mut matches = std::pin::pin!(client.scan(table.name(), &condition));
    let mut found = 0;
    while let Some(item) = matches.try_next().await? {
        let course = Course::from_item(item)?;
        info!(
            "Scan result: {} gpa={} subjects={:?}",
            course.semester, course.gpa, course.subjects
        );
        found += 1;
    }
    info!("{found} semesters with gpa > {GPA_THRESHOLD}");

    Ok(())
}
