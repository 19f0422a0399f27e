use crate::config::{AppConfig, StorageBackend};
use crate::services::storage::{FileStorageService, LocalFileStorage, S3FileStorage};
use anyhow::Context;
use aws_sdk_s3::config::Region;
use std::sync::Arc;
use tracing::info;

pub async fn setup_storage(config: &AppConfig) -> anyhow::Result<Arc<dyn FileStorageService>> {
    match config.storage_backend {
        StorageBackend::Local => {
            info!(
                "💾 Local Storage: {} (served at {})",
                config.local_storage_path, config.public_base_url
            );
            tokio::fs::create_dir_all(&config.local_storage_path)
                .await
                .with_context(|| format!("creating {}", config.local_storage_path))?;
            Ok(Arc::new(LocalFileStorage::new(
                &config.local_storage_path,
                &config.public_base_url,
            )))
        }
        StorageBackend::S3 => setup_s3(config).await,
    }
}

async fn setup_s3(config: &AppConfig) -> anyhow::Result<Arc<dyn FileStorageService>> {
    let endpoint_url = config
        .s3_endpoint
        .clone()
        .context("S3_ENDPOINT must be set")?;
    let access_key = config
        .s3_access_key
        .clone()
        .context("S3_ACCESS_KEY must be set")?;
    let secret_key = config
        .s3_secret_key
        .clone()
        .context("S3_SECRET_KEY must be set")?;
    let bucket = config.s3_bucket.clone();

    info!("☁️  S3 Storage: {} (Bucket: {})", endpoint_url, bucket);

    let aws_config = aws_config::from_env()
        .endpoint_url(&endpoint_url)
        .region(Region::new("us-east-1"))
        .credentials_provider(aws_sdk_s3::config::Credentials::new(
            access_key, secret_key, None, None, "static",
        ))
        .load()
        .await;

    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(true)
        .build();

    let s3_client = aws_sdk_s3::Client::from_conf(s3_config);

    // Ensure bucket exists
    match s3_client.head_bucket().bucket(&bucket).send().await {
        Ok(_) => info!("✅ Bucket '{}' is ready", bucket),
        Err(_) => {
            info!("🪣 Bucket '{}' not found, creating...", bucket);
            if let Err(e) = s3_client.create_bucket().bucket(&bucket).send().await {
                tracing::error!("❌ Failed to create bucket '{}': {}", bucket, e);
            } else {
                info!("✅ Bucket '{}' created successfully", bucket);
            }
        }
    }

    let public_url = config
        .s3_public_url
        .clone()
        .unwrap_or_else(|| format!("{}/{}", endpoint_url.trim_end_matches('/'), bucket));

    Ok(Arc::new(S3FileStorage::new(s3_client, bucket, &public_url)))
}
